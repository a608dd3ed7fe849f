//! Configuration file parsing, defaults, and merging.
//!
//! Configuration is loaded in layers (last wins):
//! 1. Built-in defaults
//! 2. Global config from `~/.spex/config.toml`
//! 3. Per-workspace config from `<workspace>/.spex/config.toml`
//!
//! Each layer only overrides fields it explicitly sets; absent fields
//! are left at their previous value.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Public config types (fully resolved, no Options except where unset means
// "infer")
// ---------------------------------------------------------------------------

/// Top-level configuration, fully resolved with defaults applied.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    pub runner: RunnerConfig,
    pub output: OutputConfig,
}

/// Runner-related settings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunnerConfig {
    /// Explicit runner command. When unset, the workspace root is probed
    /// for a `bin/rspec` binstub.
    pub command: Option<String>,
    /// Log the full shell command behind every run affordance.
    pub debug: bool,
}

/// Output / display settings.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    /// Default output format: `"text"` or `"json"`.
    pub format: String,
    /// Color mode: `"auto"`, `"always"`, or `"never"`.
    pub color: String,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            color: "auto".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Option-based overlay types (for partial deserialization)
// ---------------------------------------------------------------------------

/// Mirror of [`Config`] where every field is `Option`, so we can
/// deserialize a partial TOML file and overlay only the keys that are
/// present.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigOverlay {
    runner: Option<RunnerOverlay>,
    output: Option<OutputOverlay>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RunnerOverlay {
    command: Option<String>,
    debug: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OutputOverlay {
    format: Option<String>,
    color: Option<String>,
}

// ---------------------------------------------------------------------------
// Merge helpers
// ---------------------------------------------------------------------------

impl Config {
    /// Apply an overlay on top of this config, replacing only the fields
    /// that are `Some` in the overlay.
    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        if let Some(r) = overlay.runner {
            if let Some(v) = r.command {
                self.runner.command = Some(v);
            }
            if let Some(v) = r.debug {
                self.runner.debug = v;
            }
        }
        if let Some(out) = overlay.output {
            if let Some(v) = out.format {
                self.output.format = v;
            }
            if let Some(v) = out.color {
                self.output.color = v;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Return the user's home directory.
fn home_dir() -> Option<PathBuf> {
    #[allow(deprecated)]
    std::env::home_dir()
}

/// Parse a TOML string into a [`ConfigOverlay`], producing a clear error
/// message on malformed input.
fn parse_overlay(contents: &str, path: &Path) -> Result<ConfigOverlay> {
    toml::from_str(contents)
        .with_context(|| format!("failed to parse config file: {}", path.display()))
}

/// Try to read a config file and parse it as an overlay.
/// Returns `Ok(None)` if the file does not exist.
fn load_overlay(path: &Path) -> Result<Option<ConfigOverlay>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let overlay = parse_overlay(&contents, path)?;
            Ok(Some(overlay))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(anyhow::anyhow!(
            "failed to read config file {}: {}",
            path.display(),
            e
        )),
    }
}

impl Config {
    /// Load configuration by merging layers:
    /// defaults -> global (`~/.spex/config.toml`) -> per-workspace
    /// (`<workspace>/.spex/config.toml`).
    ///
    /// If `workspace_root` is `None`, only the global config (if any) is
    /// applied on top of defaults.
    pub fn load(workspace_root: Option<&Path>) -> Result<Config> {
        let global_dir = home_dir().map(|h| h.join(".spex"));
        Self::load_with_global_dir(global_dir.as_deref(), workspace_root)
    }

    /// Internal: load config with an explicit global config directory.
    ///
    /// This allows tests to supply a temporary directory instead of the
    /// real `~/.spex` without mutating environment variables.
    fn load_with_global_dir(
        global_dir: Option<&Path>,
        workspace_root: Option<&Path>,
    ) -> Result<Config> {
        let mut config = Config::default();

        // Layer 2: global config
        if let Some(dir) = global_dir {
            let global_path = dir.join("config.toml");
            if let Some(overlay) = load_overlay(&global_path)? {
                config.apply_overlay(overlay);
            }
        }

        // Layer 3: per-workspace config
        if let Some(root) = workspace_root {
            let workspace_config_path = root.join(".spex").join("config.toml");
            if let Some(overlay) = load_overlay(&workspace_config_path)? {
                config.apply_overlay(overlay);
            }
        }

        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
