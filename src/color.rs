//! ANSI styling for grep-shaped output rows.
//!
//! Two concerns live here: the escape constants for each element of a row
//! (`file`, `line`, separator, kind token), and the decision whether to
//! emit them at all. The decision follows the informal ecosystem contract,
//! highest priority first: `NO_COLOR` set, `CLICOLOR_FORCE=1`, the
//! config's `color` value, `CLICOLOR=0`, and finally TTY detection on
//! stdout.

// ---------------------------------------------------------------------------
// Row element styles
// ---------------------------------------------------------------------------

/// Reset all attributes.
pub const RESET: &str = "\x1b[0m";
/// File paths: magenta + bold.
pub const FILE: &str = "\x1b[35m\x1b[1m";
/// Line numbers: green.
pub const LINE_NO: &str = "\x1b[32m";
/// Separators (colons): cyan.
pub const SEP: &str = "\x1b[36m";
/// Kind tokens (`group`, `example`, outline kinds, `let`/`subject` words,
/// lens action codes): blue. Labels after the token stay unstyled.
pub const KIND: &str = "\x1b[34m";

// ---------------------------------------------------------------------------
// Color decision
// ---------------------------------------------------------------------------

/// The environment inputs to the color decision, captured once per run.
#[derive(Debug, Clone)]
pub struct ColorEnv {
    /// `NO_COLOR` is set, to any value.
    pub no_color: bool,
    /// Value of `CLICOLOR_FORCE`, when set.
    pub force: Option<String>,
    /// Value of `CLICOLOR`, when set.
    pub clicolor: Option<String>,
    /// Stdout is a terminal.
    pub tty: bool,
}

impl ColorEnv {
    /// Snapshot the real process environment and stdout.
    pub fn capture() -> Self {
        use std::io::IsTerminal;
        Self {
            no_color: std::env::var_os("NO_COLOR").is_some(),
            force: std::env::var("CLICOLOR_FORCE").ok(),
            clicolor: std::env::var("CLICOLOR").ok(),
            tty: std::io::stdout().is_terminal(),
        }
    }

    /// Apply the precedence chain against a config `color` value
    /// (`"auto"`, `"always"`/`"true"`, `"never"`/`"false"`; anything else
    /// behaves like `"auto"`).
    pub fn decide(&self, config_color: &str) -> bool {
        if self.no_color {
            return false;
        }
        if self.force.as_deref() == Some("1") {
            return true;
        }
        match config_color {
            "always" | "true" => return true,
            "never" | "false" => return false,
            _ => {}
        }
        if self.clicolor.as_deref() == Some("0") {
            return false;
        }
        self.tty
    }
}

/// Whether output rows should carry ANSI codes, given the config setting.
pub fn resolve_color(config_color: &str) -> bool {
    ColorEnv::capture().decide(config_color)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn env(no_color: bool, force: Option<&str>, clicolor: Option<&str>, tty: bool) -> ColorEnv {
        ColorEnv {
            no_color,
            force: force.map(str::to_string),
            clicolor: clicolor.map(str::to_string),
            tty,
        }
    }

    #[test]
    fn no_color_wins_over_everything() {
        assert!(!env(true, Some("1"), None, true).decide("always"));
    }

    #[test]
    fn force_beats_config_never() {
        assert!(env(false, Some("1"), None, false).decide("never"));
    }

    #[test]
    fn force_requires_the_value_one() {
        // CLICOLOR_FORCE=0 is not a force; the chain keeps going.
        assert!(!env(false, Some("0"), None, false).decide("auto"));
    }

    #[test]
    fn config_always_needs_no_tty() {
        assert!(env(false, None, None, false).decide("always"));
        assert!(env(false, None, None, false).decide("true"));
    }

    #[test]
    fn config_never_ignores_the_tty() {
        assert!(!env(false, None, None, true).decide("never"));
        assert!(!env(false, None, None, true).decide("false"));
    }

    #[test]
    fn config_always_beats_clicolor_zero() {
        assert!(env(false, None, Some("0"), false).decide("always"));
    }

    #[test]
    fn clicolor_zero_disables_on_a_tty() {
        assert!(!env(false, None, Some("0"), true).decide("auto"));
    }

    #[test]
    fn auto_follows_the_tty() {
        assert!(env(false, None, None, true).decide("auto"));
        assert!(!env(false, None, None, false).decide("auto"));
    }

    #[test]
    fn unrecognized_config_value_behaves_like_auto() {
        assert!(env(false, None, None, true).decide("sometimes"));
        assert!(!env(false, None, None, false).decide("sometimes"));
    }

    #[test]
    fn styles_are_pairwise_distinct() {
        let styles = [FILE, LINE_NO, SEP, KIND];
        for (i, a) in styles.iter().enumerate() {
            for b in &styles[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
