//! Output formatting: grep-compatible (default) and JSON Lines (`--json`).
//!
//! All result data flows through a [`Formatter`] which writes to an
//! arbitrary [`std::io::Write`] destination (typically stdout).
//! Hints and errors always go to stderr via [`print_hint`] and [`print_error`].
//!
//! Tree-shaped results (test items, outline symbols) serialize as one JSON
//! object per root with nested `children`, so `spex map --json` output can
//! be fed back to `spex resolve` unchanged.

use std::fmt::Display;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::color;
use crate::defs::SpecDefinition;
use crate::lens::RunAffordance;
use crate::outline::OutlineSymbol;
use crate::types::{file_uri, Range, TestItem};

// ---------------------------------------------------------------------------
// Serializable output types
// ---------------------------------------------------------------------------

/// A discovered test group or example, with its nested children.
#[derive(Debug, Clone, Serialize)]
pub struct ItemOutput {
    pub id: String,
    pub label: String,
    /// `"group"` or `"example"`.
    pub kind: String,
    /// Workspace-relative path for display.
    pub file: String,
    /// `file://` URI of the absolute source path.
    pub uri: String,
    pub range: Range,
    pub tags: Vec<String>,
    pub children: Vec<ItemOutput>,
}

/// A run affordance anchored to a group or example.
#[derive(Debug, Clone, Serialize)]
pub struct LensOutput {
    /// Display title (`Run`, `Run In Terminal`, `Debug`).
    pub title: String,
    /// Machine-readable action code (`test`, `test_in_terminal`, `debug`).
    pub code: String,
    pub kind: String,
    pub id: String,
    pub label: String,
    pub file: String,
    /// 1-based line, matching the locator embedded in `command`.
    pub line: usize,
    pub command: String,
}

/// A document-outline symbol, with its nested children.
#[derive(Debug, Clone, Serialize)]
pub struct OutlineOutput {
    pub name: String,
    /// `"module"`, `"class"`, or `"method"`.
    pub kind: String,
    pub file: String,
    pub range: Range,
    pub children: Vec<OutlineOutput>,
}

/// A `let` / `subject` helper declaration.
#[derive(Debug, Clone, Serialize)]
pub struct DefOutput {
    pub name: String,
    /// The DSL word as written (`let`, `let!`, `subject`, `subject!`).
    pub call: String,
    pub file: String,
    pub line: usize,
}

/// A single runner command produced by `spex resolve`.
#[derive(Debug, Clone, Serialize)]
pub struct CommandOutput {
    pub command: String,
}

/// Summary line for `spex report` after the event stream closes.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub forwarded: usize,
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

/// Render a path relative to the workspace root for display.
///
/// Paths outside the root keep their absolute form.
pub fn display_path(path: &Path, workspace_root: &Path) -> String {
    path.strip_prefix(workspace_root)
        .unwrap_or(path)
        .display()
        .to_string()
}

impl ItemOutput {
    /// Build an `ItemOutput` subtree from a discovered [`TestItem`].
    pub fn from_item(item: &TestItem, workspace_root: &Path) -> Self {
        Self {
            id: item.id.clone(),
            label: item.label.clone(),
            kind: item.kind.to_string(),
            file: display_path(&item.path, workspace_root),
            uri: file_uri(&item.path),
            range: item.range,
            tags: item.tags.clone(),
            children: item
                .children
                .iter()
                .map(|c| ItemOutput::from_item(c, workspace_root))
                .collect(),
        }
    }
}

impl LensOutput {
    /// Build a `LensOutput` from a collected [`RunAffordance`].
    pub fn from_affordance(lens: &RunAffordance, workspace_root: &Path) -> Self {
        Self {
            title: lens.action.title().to_string(),
            code: lens.action.code().to_string(),
            kind: lens.kind.to_string(),
            id: lens.id.clone(),
            label: lens.label.clone(),
            file: display_path(&lens.path, workspace_root),
            line: lens.range.start.line + 1,
            command: lens.command.clone(),
        }
    }
}

impl OutlineOutput {
    /// Build an `OutlineOutput` subtree from an [`OutlineSymbol`].
    pub fn from_symbol(symbol: &OutlineSymbol, file: &str) -> Self {
        Self {
            name: symbol.name.clone(),
            kind: symbol.kind.as_str().to_string(),
            file: file.to_string(),
            range: symbol.range,
            children: symbol
                .children
                .iter()
                .map(|c| OutlineOutput::from_symbol(c, file))
                .collect(),
        }
    }
}

impl DefOutput {
    /// Build a `DefOutput` from a collected [`SpecDefinition`].
    pub fn from_definition(def: &SpecDefinition, file: &str) -> Self {
        Self {
            name: def.name.clone(),
            call: def.call.clone(),
            file: file.to_string(),
            line: def.range.start.line + 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Formatter
// ---------------------------------------------------------------------------

/// Output formatter that can render results in either grep-compatible text
/// or JSON Lines (one JSON object per line).
pub struct Formatter<W: Write> {
    writer: W,
    json: bool,
    color: bool,
}

impl<W: Write> Formatter<W> {
    /// Create a new formatter.
    ///
    /// * `writer` - The destination for output (e.g. `std::io::stdout()`).
    /// * `json`   - When `true`, emit JSON Lines; otherwise, emit grep-style text.
    /// * `color`  - When `true`, emit ANSI color codes in grep-style output.
    pub fn new(writer: W, json: bool, color: bool) -> Self {
        Self { writer, json, color }
    }

    // -- Color helper methods -----------------------------------------------

    /// Write a file path, colorized if color is enabled.
    fn write_file(&mut self, path: &str) -> std::io::Result<()> {
        if self.color {
            write!(self.writer, "{}{}{}", color::FILE, path, color::RESET)
        } else {
            write!(self.writer, "{}", path)
        }
    }

    /// Write a line number, colorized if color is enabled.
    fn write_line_no(&mut self, line: impl Display) -> std::io::Result<()> {
        if self.color {
            write!(self.writer, "{}{}{}", color::LINE_NO, line, color::RESET)
        } else {
            write!(self.writer, "{}", line)
        }
    }

    /// Write a separator (`:`) colorized if color is enabled.
    fn write_sep(&mut self) -> std::io::Result<()> {
        if self.color {
            write!(self.writer, "{}:{}", color::SEP, color::RESET)
        } else {
            write!(self.writer, ":")
        }
    }

    /// Write a kind token (item kind, DSL word, lens code), colorized if
    /// color is enabled. The label that follows stays unstyled.
    fn write_kind(&mut self, kind: &str) -> std::io::Result<()> {
        if self.color {
            write!(self.writer, "{}{}{}", color::KIND, kind, color::RESET)
        } else {
            write!(self.writer, "{}", kind)
        }
    }

    // -- Result formatting --------------------------------------------------

    /// Format a discovered test item and its subtree.
    ///
    /// Grep format: `file:line:  [indent]kind label`, one line per item,
    /// children indented two spaces per level. JSON: the whole subtree as
    /// one nested object on a single line.
    pub fn format_item(&mut self, item: &ItemOutput) -> std::io::Result<()> {
        if self.json {
            let line = serde_json::to_string(item)
                .map_err(std::io::Error::other)?;
            writeln!(self.writer, "{line}")
        } else {
            self.format_item_text(item, 0)
        }
    }

    fn format_item_text(&mut self, item: &ItemOutput, depth: usize) -> std::io::Result<()> {
        // Two spaces base indent, then two more per nesting level.
        let padding = "  ".repeat(depth + 1);
        self.write_file(&item.file)?;
        self.write_sep()?;
        self.write_line_no(item.range.start.line + 1)?;
        self.write_sep()?;
        write!(self.writer, "{padding}")?;
        self.write_kind(&item.kind)?;
        writeln!(self.writer, " {}", item.label)?;
        for child in &item.children {
            self.format_item_text(child, depth + 1)?;
        }
        Ok(())
    }

    /// Format a single run affordance.
    ///
    /// Grep format: `file:line:  [code] command`.
    pub fn format_lens(&mut self, lens: &LensOutput) -> std::io::Result<()> {
        if self.json {
            let line = serde_json::to_string(lens)
                .map_err(std::io::Error::other)?;
            writeln!(self.writer, "{line}")
        } else {
            self.write_file(&lens.file)?;
            self.write_sep()?;
            self.write_line_no(lens.line)?;
            self.write_sep()?;
            write!(self.writer, "  [")?;
            self.write_kind(&lens.code)?;
            writeln!(self.writer, "] {}", lens.command)
        }
    }

    /// Format an outline symbol and its subtree.
    ///
    /// Grep format: `file:line:  [indent]kind name`, matching the test-item
    /// layout. JSON: one nested object per root.
    pub fn format_outline(&mut self, symbol: &OutlineOutput) -> std::io::Result<()> {
        if self.json {
            let line = serde_json::to_string(symbol)
                .map_err(std::io::Error::other)?;
            writeln!(self.writer, "{line}")
        } else {
            self.format_outline_text(symbol, 0)
        }
    }

    fn format_outline_text(&mut self, symbol: &OutlineOutput, depth: usize) -> std::io::Result<()> {
        let padding = "  ".repeat(depth + 1);
        self.write_file(&symbol.file)?;
        self.write_sep()?;
        self.write_line_no(symbol.range.start.line + 1)?;
        self.write_sep()?;
        write!(self.writer, "{padding}")?;
        self.write_kind(&symbol.kind)?;
        writeln!(self.writer, " {}", symbol.name)?;
        for child in &symbol.children {
            self.format_outline_text(child, depth + 1)?;
        }
        Ok(())
    }

    /// Format a single helper declaration.
    ///
    /// Grep format: `file:line:  call name`.
    pub fn format_definition(&mut self, def: &DefOutput) -> std::io::Result<()> {
        if self.json {
            let line = serde_json::to_string(def)
                .map_err(std::io::Error::other)?;
            writeln!(self.writer, "{line}")
        } else {
            self.write_file(&def.file)?;
            self.write_sep()?;
            self.write_line_no(def.line)?;
            self.write_sep()?;
            write!(self.writer, "  ")?;
            self.write_kind(&def.call)?;
            writeln!(self.writer, " {}", def.name)
        }
    }

    /// Format a single resolved runner command.
    ///
    /// Grep format: the bare command, ready for a shell.
    pub fn format_command(&mut self, cmd: &CommandOutput) -> std::io::Result<()> {
        if self.json {
            let line = serde_json::to_string(cmd)
                .map_err(std::io::Error::other)?;
            writeln!(self.writer, "{line}")
        } else {
            writeln!(self.writer, "{}", cmd.command)
        }
    }

    /// Format the end-of-stream summary for `spex report`.
    pub fn format_report_summary(&mut self, summary: &ReportSummary) -> std::io::Result<()> {
        if self.json {
            let line = serde_json::to_string(summary)
                .map_err(std::io::Error::other)?;
            writeln!(self.writer, "{line}")
        } else {
            writeln!(self.writer, "forwarded: {}", summary.forwarded)
        }
    }
}

// ---------------------------------------------------------------------------
// Stderr helpers
// ---------------------------------------------------------------------------

/// Print a hint message to stderr (suppressed when `json` is true).
pub fn print_hint(msg: &str, json: bool) {
    if !json {
        eprintln!("hint: {msg}");
    }
}

/// Print an error message to stderr.
pub fn print_error(msg: &str) {
    eprintln!("error: {msg}");
}

/// Format a [`SpexError`] to stderr with structured `error:` / `hint:` lines.
///
/// * Always prints `error: <message>` to stderr.
/// * When `json` is `false` and the error carries a contextual hint, also
///   prints `hint: <suggestion>` to stderr.
/// * Returns the appropriate process exit code.
pub fn format_error(err: &crate::errors::SpexError, json: bool) -> i32 {
    print_error(&format!("{err}"));
    if let Some(hint) = err.hint() {
        print_hint(hint, json);
    }
    err.exit_code()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
