//! Application error types and user-facing error formatting.
//!
//! Provides structured error types for the two fallible layers:
//! - [`DiscoveryError`] for file reading / parsing failures
//! - [`ResolveError`] for malformed selection input
//! - [`SpexError`] as the unified top-level error type
//!
//! The [`SpexError`] type carries contextual hints and exit codes so that
//! `main()` can present human-readable diagnostics on stderr without ever
//! exposing raw panics or debug formatting.
//!
//! Nothing in the traversal/resolution core itself is fatal: classification
//! misses, malformed argument shapes, and unresolvable selection records are
//! all absorbed silently. These types cover the application shell around it.

use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Exit codes
// ---------------------------------------------------------------------------

/// Process exit codes.
///
/// * `0` - success
/// * `1` - general runtime error
/// * `2` - usage / argument error (bad CLI invocation)
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_USAGE: i32 = 2;

// ---------------------------------------------------------------------------
// Layer-specific error types
// ---------------------------------------------------------------------------

/// Errors arising while turning a source file into a syntax tree.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// The source file could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The parser produced no tree for the file.
    #[error("cannot parse {path} as Ruby")]
    Parse { path: PathBuf },
}

/// Errors arising from selection input to the command resolver.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The selection JSON could not be deserialized.
    #[error("invalid selection: {0}")]
    InvalidSelection(#[from] serde_json::Error),

    /// The selection source (file or stdin) could not be read.
    #[error("cannot read selection: {0}")]
    Read(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Unified application error
// ---------------------------------------------------------------------------

/// Unified error type for the entire application.
///
/// Allows callers to propagate any layer's error through a single `Result`
/// type while still enabling pattern matching on the specific variant.
#[derive(Error, Debug)]
pub enum SpexError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A usage / argument error (exit code 2).
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SpexError {
    /// Return the appropriate process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            SpexError::Usage(_) => EXIT_USAGE,
            _ => EXIT_ERROR,
        }
    }

    /// Return an optional human-readable hint that may help the user fix
    /// the problem.  Returns `None` when no specific guidance applies.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            SpexError::Discovery(DiscoveryError::Read { .. }) => {
                Some("verify the file exists and is readable")
            }
            SpexError::Discovery(DiscoveryError::Parse { .. }) => {
                Some("the file may not be valid Ruby source")
            }
            SpexError::Resolve(ResolveError::InvalidSelection(_)) => {
                Some("selections are JSON arrays of test items, as printed by `spex map --json`")
            }
            SpexError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Some("verify the file or directory exists")
            }
            SpexError::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                Some("check file permissions")
            }
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_error() -> DiscoveryError {
        DiscoveryError::Parse {
            path: PathBuf::from("spec/foo_spec.rb"),
        }
    }

    #[test]
    fn exit_code_usage() {
        let err = SpexError::Usage("bad flag".into());
        assert_eq!(err.exit_code(), EXIT_USAGE);
    }

    #[test]
    fn exit_code_general() {
        let err = SpexError::Discovery(parse_error());
        assert_eq!(err.exit_code(), EXIT_ERROR);
    }

    #[test]
    fn exit_code_io() {
        let err = SpexError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.exit_code(), EXIT_ERROR);
    }

    #[test]
    fn hint_unreadable_file() {
        let err = SpexError::Discovery(DiscoveryError::Read {
            path: PathBuf::from("spec/foo_spec.rb"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        });
        assert!(err.hint().unwrap().contains("readable"));
    }

    #[test]
    fn hint_invalid_selection_mentions_map() {
        let bad: serde_json::Error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = SpexError::Resolve(ResolveError::InvalidSelection(bad));
        assert!(err.hint().unwrap().contains("spex map --json"));
    }

    #[test]
    fn hint_io_not_found() {
        let err = SpexError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(err.hint().unwrap().contains("exists"));
    }

    #[test]
    fn hint_io_permission() {
        let err = SpexError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "nope",
        ));
        assert!(err.hint().unwrap().contains("permissions"));
    }

    #[test]
    fn hint_none_for_other() {
        let err = SpexError::Other(anyhow::anyhow!("something went wrong"));
        assert!(err.hint().is_none());
    }

    #[test]
    fn display_no_debug_formatting() {
        let err = SpexError::Discovery(parse_error());
        let msg = format!("{err}");
        // Should be the human-readable message, not Debug output
        assert_eq!(msg, "cannot parse spec/foo_spec.rb as Ruby");
        assert!(!msg.contains("DiscoveryError"));
        assert!(!msg.contains("Parse"));
    }

    #[test]
    fn display_usage_error() {
        let err = SpexError::Usage("missing required argument: path".into());
        assert_eq!(format!("{err}"), "missing required argument: path");
    }

    #[test]
    fn spex_error_from_discovery_error() {
        let err: SpexError = parse_error().into();
        assert!(matches!(
            err,
            SpexError::Discovery(DiscoveryError::Parse { .. })
        ));
    }

    #[test]
    fn spex_error_from_resolve_error() {
        let bad: serde_json::Error = serde_json::from_str::<serde_json::Value>("[").unwrap_err();
        let err: SpexError = ResolveError::InvalidSelection(bad).into();
        assert!(matches!(err, SpexError::Resolve(_)));
    }

    #[test]
    fn spex_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SpexError = io_err.into();
        assert!(matches!(err, SpexError::Io(_)));
    }
}
