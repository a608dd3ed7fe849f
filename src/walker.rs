//! Spec-file walker with gitignore support and default exclusions.
//!
//! Wraps the `ignore` crate's `WalkBuilder` to enumerate `*_spec.rb` files:
//! - Respects `.gitignore` rules
//! - Skips common dependency/artifact directories by default
//! - Skips hidden files/directories except `.github`
//! - Returns paths sorted for deterministic output

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use ignore::overrides::OverrideBuilder;

/// Directories that are always excluded from walks, regardless of `.gitignore`.
const DEFAULT_EXCLUSIONS: &[&str] = &["vendor", "node_modules", "tmp", "log", "coverage"];

/// Hidden directory names that are NOT excluded (i.e., they are allowed
/// even though hidden directories are otherwise skipped).
const HIDDEN_ALLOWLIST: &[&str] = &[".github"];

/// Whether a path names a spec file by the `*_spec.rb` convention.
pub fn is_spec_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with("_spec.rb"))
}

/// All spec files under `root`, sorted.
///
/// Used both for directory arguments to structure discovery and for
/// expanding childless directory selections during command resolution.
pub fn spec_files_under<P: AsRef<Path>>(root: P) -> Vec<PathBuf> {
    SpecWalker::new(root).collect_paths()
}

/// A file-system walker that respects `.gitignore`, applies default
/// exclusions, and keeps only spec files.
pub struct SpecWalker {
    root: PathBuf,
}

impl SpecWalker {
    /// Create a new walker rooted at the given path.
    ///
    /// The path may be a subdirectory of a repository; the walker will still
    /// respect `.gitignore` files from parent directories.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Build the underlying `WalkBuilder` with all our configuration applied.
    fn make_builder(&self) -> WalkBuilder {
        let mut builder = WalkBuilder::new(&self.root);

        // Let the ignore crate handle .gitignore, .ignore, etc.
        builder.standard_filters(true);

        // We disable the built-in hidden filter because we need a more
        // nuanced policy (skip hidden except for allowlisted names).
        builder.hidden(false);

        // Build overrides that negate (exclude) the default directories.
        // In the overrides system, a glob WITHOUT `!` means "include only",
        // and a glob WITH `!` means "exclude".  We want to exclude these dirs.
        let mut overrides = OverrideBuilder::new(&self.root);
        for dir in DEFAULT_EXCLUSIONS {
            // The `!` prefix in override globs means "exclude this pattern".
            let pattern = format!("!{dir}/");
            overrides
                .add(&pattern)
                .expect("default exclusion pattern should be valid");
        }
        builder.overrides(overrides.build().expect("override builder should succeed"));

        // Custom filter: skip hidden entries (name starts with `.`) unless
        // they appear in the allowlist.
        builder.filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            if name.starts_with('.') {
                // The root entry itself (depth 0) always passes through.
                if entry.depth() == 0 {
                    return true;
                }
                return HIDDEN_ALLOWLIST.iter().any(|a| *a == &*name);
            }
            true
        });

        builder
    }

    /// Walk the file tree and collect spec-file paths, sorted.
    pub fn collect_paths(&self) -> Vec<PathBuf> {
        let builder = self.make_builder();
        let mut paths = Vec::new();
        for result in builder.build() {
            let entry = match result {
                Ok(e) => e,
                Err(_) => continue,
            };
            if entry.file_type().is_some_and(|ft| ft.is_file()) && is_spec_file(entry.path()) {
                paths.push(entry.into_path());
            }
        }
        paths.sort();
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Helper: create a temporary directory tree for testing.
    struct TestDir {
        dir: tempfile::TempDir,
    }

    impl TestDir {
        fn new() -> Self {
            Self {
                dir: tempfile::tempdir().unwrap(),
            }
        }

        fn path(&self) -> &Path {
            self.dir.path()
        }

        /// Create a file (and any necessary parent directories).
        fn create_file(&self, relative: &str) {
            let p = self.dir.path().join(relative);
            if let Some(parent) = p.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&p, "describe \"X\" do\nend\n").unwrap();
        }
    }

    /// Collect paths relative to the test root.
    fn relative(root: &Path, paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .filter_map(|p| {
                p.strip_prefix(root)
                    .ok()
                    .map(|r| r.to_string_lossy().into_owned())
            })
            .collect()
    }

    #[test]
    fn spec_file_naming() {
        assert!(is_spec_file(Path::new("spec/foo_spec.rb")));
        assert!(is_spec_file(Path::new("/abs/deep/bar_spec.rb")));
        assert!(!is_spec_file(Path::new("spec/spec_helper.rb")));
        assert!(!is_spec_file(Path::new("lib/foo.rb")));
        assert!(!is_spec_file(Path::new("spec")));
    }

    #[test]
    fn collects_only_spec_files() {
        let td = TestDir::new();
        td.create_file("spec/a_spec.rb");
        td.create_file("spec/models/b_spec.rb");
        td.create_file("spec/spec_helper.rb");
        td.create_file("lib/a.rb");

        let rel = relative(td.path(), &spec_files_under(td.path()));
        assert_eq!(rel, vec!["spec/a_spec.rb", "spec/models/b_spec.rb"]);
    }

    #[test]
    fn output_is_sorted() {
        let td = TestDir::new();
        td.create_file("spec/z_spec.rb");
        td.create_file("spec/a_spec.rb");
        td.create_file("spec/m_spec.rb");

        let rel = relative(td.path(), &spec_files_under(td.path()));
        assert_eq!(rel, vec!["spec/a_spec.rb", "spec/m_spec.rb", "spec/z_spec.rb"]);
    }

    #[test]
    fn respects_gitignore() {
        let td = TestDir::new();
        // The ignore crate only respects .gitignore inside a git repository,
        // so we need a .git directory in the temp root.
        fs::create_dir(td.path().join(".git")).unwrap();
        td.create_file("spec/keep_spec.rb");
        td.create_file("generated/skip_spec.rb");
        fs::write(td.path().join(".gitignore"), "generated/\n").unwrap();

        let rel = relative(td.path(), &spec_files_under(td.path()));
        assert!(rel.contains(&"spec/keep_spec.rb".to_string()));
        assert!(!rel.iter().any(|p| p.starts_with("generated")));
    }

    #[test]
    fn skips_default_exclusions() {
        let td = TestDir::new();
        td.create_file("spec/a_spec.rb");
        td.create_file("vendor/bundle/gems/x/spec/x_spec.rb");
        td.create_file("node_modules/pkg/y_spec.rb");
        td.create_file("tmp/t_spec.rb");
        td.create_file("coverage/c_spec.rb");

        let rel = relative(td.path(), &spec_files_under(td.path()));
        assert_eq!(rel, vec!["spec/a_spec.rb"]);
    }

    #[test]
    fn skips_hidden_except_github() {
        let td = TestDir::new();
        td.create_file("spec/visible_spec.rb");
        td.create_file(".hidden/secret_spec.rb");
        td.create_file(".github/meta_spec.rb");

        let rel = relative(td.path(), &spec_files_under(td.path()));
        assert!(rel.contains(&"spec/visible_spec.rb".to_string()));
        assert!(rel.iter().any(|p| p.starts_with(".github")));
        assert!(!rel.iter().any(|p| p.starts_with(".hidden")));
    }
}
