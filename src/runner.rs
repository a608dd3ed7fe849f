//! Runner command inference.

use std::path::Path;

/// Command used when the workspace carries no binstub.
const DEFAULT_COMMAND: &str = "bundle exec rspec";
/// Command used when `bin/rspec` exists at the workspace root.
const BINSTUB_COMMAND: &str = "bundle exec bin/rspec";

/// The shell command used to execute specs.
///
/// A configured command always wins. Otherwise the workspace root is probed
/// for a `bin/rspec` binstub; without one the plain gem executable is used.
pub fn runner_command(workspace_root: &Path, configured: Option<&str>) -> String {
    if let Some(command) = configured {
        let trimmed = command.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    if workspace_root.join("bin").join("rspec").is_file() {
        BINSTUB_COMMAND.to_string()
    } else {
        DEFAULT_COMMAND.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn configured_command_wins() {
        let td = tempfile::tempdir().unwrap();
        assert_eq!(
            runner_command(td.path(), Some("docker compose run web rspec")),
            "docker compose run web rspec"
        );
    }

    #[test]
    fn blank_configured_command_falls_through() {
        let td = tempfile::tempdir().unwrap();
        assert_eq!(runner_command(td.path(), Some("   ")), DEFAULT_COMMAND);
        assert_eq!(runner_command(td.path(), Some("")), DEFAULT_COMMAND);
    }

    #[test]
    fn binstub_is_preferred_when_present() {
        let td = tempfile::tempdir().unwrap();
        fs::create_dir(td.path().join("bin")).unwrap();
        fs::write(td.path().join("bin/rspec"), "#!/usr/bin/env ruby\n").unwrap();
        assert_eq!(runner_command(td.path(), None), BINSTUB_COMMAND);
    }

    #[test]
    fn bare_command_without_binstub() {
        let td = tempfile::tempdir().unwrap();
        assert_eq!(runner_command(td.path(), None), DEFAULT_COMMAND);
    }

    #[test]
    fn binstub_directory_does_not_count() {
        let td = tempfile::tempdir().unwrap();
        fs::create_dir_all(td.path().join("bin/rspec")).unwrap();
        assert_eq!(runner_command(td.path(), None), DEFAULT_COMMAND);
    }
}
