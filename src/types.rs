//! Shared types and data structures.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Framework facet carried by every emitted item and required on every
/// selection record the resolver will act on.
pub const FRAMEWORK_TAG: &str = "framework:rspec";

/// Facet tag for group items (describe/context/feature).
pub const TAG_GROUP: &str = "test_group";
/// Facet tag for leaf example items (it/specify/example/scenario).
pub const TAG_CASE: &str = "test_case";
/// Facet tag for whole-file selection records.
pub const TAG_FILE: &str = "test_file";
/// Facet tag for class-shaped selection records (treated like files).
pub const TAG_CLASS: &str = "test_class";
/// Facet tag for directory selection records.
pub const TAG_DIR: &str = "test_dir";

/// Whether a test item is a nesting scope or a leaf test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Group,
    Example,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ItemKind::Group => "group",
            ItemKind::Example => "example",
        };
        write!(f, "{s}")
    }
}

/// A 0-based source position (line and character), editor convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

/// A 0-based, end-exclusive source range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(
        start_line: usize,
        start_character: usize,
        end_line: usize,
        end_character: usize,
    ) -> Self {
        Self {
            start: Position {
                line: start_line,
                character: start_character,
            },
            end: Position {
                line: end_line,
                character: end_character,
            },
        }
    }
}

/// One discovered test group or example.
///
/// Items form a tree: groups own their children in source order, examples
/// are always leaves. The `id` is a path of position tokens joined with
/// `::` (e.g. `./spec/foo_spec.rb:1::./spec/foo_spec.rb:2`), which keeps
/// sibling items with identical labels distinct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestItem {
    pub id: String,
    pub label: String,
    pub kind: ItemKind,
    /// Absolute path of the source file; rendered as a `file://` URI in
    /// protocol output.
    pub path: PathBuf,
    pub range: Range,
    pub tags: Vec<String>,
    pub children: Vec<TestItem>,
}

impl TestItem {
    /// Build an item with the facet tags implied by its kind.
    pub fn new(id: String, label: String, kind: ItemKind, path: PathBuf, range: Range) -> Self {
        let facet = match kind {
            ItemKind::Group => TAG_GROUP,
            ItemKind::Example => TAG_CASE,
        };
        Self {
            id,
            label,
            kind,
            path,
            range,
            tags: vec![FRAMEWORK_TAG.to_string(), facet.to_string()],
            children: Vec::new(),
        }
    }

    /// Attach a child, preserving source order.
    pub fn add(&mut self, child: TestItem) {
        self.children.push(child);
    }

    /// Total number of items in this subtree, self included.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(TestItem::subtree_len).sum::<usize>()
    }
}

/// Render a path as a `file://` URI.
pub fn file_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}

/// Extract a filesystem path from a selection record's `uri` field.
///
/// Accepts `file://` URIs and bare paths. Returns `None` for empty input,
/// which callers treat as an unresolvable record to drop.
pub fn uri_to_path(uri: &str) -> Option<PathBuf> {
    let path = uri.strip_prefix("file://").unwrap_or(uri);
    if path.is_empty() {
        return None;
    }
    Some(PathBuf::from(path))
}
