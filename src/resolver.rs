//! Selection-to-command reduction.
//!
//! Takes an arbitrary selection of test items, possibly pruned (a directory
//! without its file children materialized, a file exploded into individual
//! cases, one group picked out of a tree), and reduces it to the smallest
//! list of runner invocations covering exactly the requested scope.
//!
//! Groups become one `runner file:line` command each, in encounter order,
//! because the runner expands a group to its whole subtree by itself. Files
//! and leaf cases accumulate into locators that are batched into a single
//! trailing invocation, since the runner accepts many location arguments in
//! one process.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::types::{self, FRAMEWORK_TAG, TAG_CLASS, TAG_DIR, TAG_FILE, TAG_GROUP, TestItem};
use crate::walker;

// ---------------------------------------------------------------------------
// Selection records
// ---------------------------------------------------------------------------

/// One record of a caller's selection, in the shape `map --json` prints.
///
/// Records are opaque to everything but their tags, uri, start line and
/// children; unknown fields are tolerated and ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<SelectionRange>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub children: Vec<SelectionItem>,
}

/// The start line is all resolution reads from a range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SelectionRange {
    pub start: SelectionPosition,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SelectionPosition {
    pub line: usize,
}

impl SelectionItem {
    fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// 0-based start line, when the record carries a range.
    fn start_line(&self) -> Option<usize> {
        self.range.map(|r| r.start.line)
    }
}

impl From<&TestItem> for SelectionItem {
    fn from(item: &TestItem) -> Self {
        Self {
            id: item.id.clone(),
            uri: types::file_uri(&item.path),
            range: Some(SelectionRange {
                start: SelectionPosition {
                    line: item.range.start.line,
                },
            }),
            tags: item.tags.clone(),
            children: item.children.iter().map(SelectionItem::from).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Reduce a selection to runner commands.
///
/// Breadth-first over the records: directories expand to spec files when
/// they carry no children, files fall back to whole-file locators when not
/// exploded, groups emit their own command immediately, and leaf cases
/// collect `file:line` locators. Emits group commands in encounter order
/// followed by at most one batched command for all accumulated locators.
///
/// Nothing here is fatal: records without the framework tag, with an
/// unresolvable uri, or missing a required range are dropped and resolution
/// continues. An empty selection yields an empty list.
pub fn resolve(selection: &[SelectionItem], runner: &str) -> Vec<String> {
    let mut queue: VecDeque<&SelectionItem> = selection.iter().collect();
    let mut commands: Vec<String> = Vec::new();
    let mut seen_commands: HashSet<String> = HashSet::new();
    let mut locators: Vec<String> = Vec::new();
    let mut seen_locators: HashSet<String> = HashSet::new();

    while let Some(item) = queue.pop_front() {
        if !item.has_tag(FRAMEWORK_TAG) {
            continue;
        }
        let Some(path) = types::uri_to_path(&item.uri) else {
            continue;
        };

        if item.has_tag(TAG_DIR) {
            if item.children.is_empty() {
                for file in walker::spec_files_under(&path) {
                    push_unique(
                        file.display().to_string(),
                        &mut locators,
                        &mut seen_locators,
                    );
                }
            } else {
                queue.extend(item.children.iter());
            }
        } else if item.has_tag(TAG_FILE) || item.has_tag(TAG_CLASS) {
            if item.children.is_empty() {
                push_unique(
                    path.display().to_string(),
                    &mut locators,
                    &mut seen_locators,
                );
            } else {
                queue.extend(item.children.iter());
            }
        } else if item.has_tag(TAG_GROUP) {
            // The runner expands a group itself; children are never visited.
            if let Some(line) = item.start_line() {
                let command = format!("{runner} {}:{}", path.display(), line + 1);
                push_unique(command, &mut commands, &mut seen_commands);
            }
        } else if let Some(line) = item.start_line() {
            push_unique(
                format!("{}:{}", path.display(), line + 1),
                &mut locators,
                &mut seen_locators,
            );
        }
    }

    if !locators.is_empty() {
        commands.push(format!("{runner} {}", locators.join(" ")));
    }
    commands
}

fn push_unique(value: String, order: &mut Vec<String>, seen: &mut HashSet<String>) {
    if seen.insert(value.clone()) {
        order.push(value);
    }
}
