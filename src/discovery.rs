//! Test structure discovery.
//!
//! One depth-first walk over a file's syntax tree produces the tree of
//! [`TestItem`]s: groups own their children, examples are leaves, and every
//! item's id is the `::`-joined chain of `./path:line` tokens from the root
//! group down. Position tokens, not labels, carry identity, so sibling
//! items with identical descriptions never collide.
//!
//! The walk does enter work and leave work in one recursive function: a
//! valid group is created before descending and attached to its parent
//! after, which pairs each push with the pop of the same call node. All
//! other node kinds are transparent, so examples nested under an invalid
//! group still surface in the enclosing valid one.

use std::path::{Path, PathBuf};

use tree_sitter::{Node, Tree};

use crate::classifier::{self, CallKind, GroupForm};
use crate::errors::DiscoveryError;
use crate::ruby::{self, SpecCall};
use crate::types::{ItemKind, TestItem};

/// Parse a spec file and discover its test structure.
pub fn discover_file(path: &Path, workspace_root: &Path) -> Result<Vec<TestItem>, DiscoveryError> {
    let (tree, source) = ruby::parse_file(path)?;
    Ok(discover_tree(&tree, &source, path, workspace_root))
}

/// Discover test structure in an already-parsed tree.
///
/// Returns the top-level groups in source order. A file with no recognized
/// calls yields an empty list, never an error.
pub fn discover_tree(
    tree: &Tree,
    source: &[u8],
    path: &Path,
    workspace_root: &Path,
) -> Vec<TestItem> {
    let mut traversal = Traversal {
        src: source,
        path,
        prefix: location_prefix(path, workspace_root),
        anonymous: 0,
    };
    let mut roots = Vec::new();
    traversal.visit(tree.root_node(), None, &mut roots);
    roots
}

/// The `./path` half of a location token, shared by every item in a file.
///
/// Paths outside the workspace keep their absolute form so ids stay
/// resolvable, just not workspace-relative.
fn location_prefix(path: &Path, workspace_root: &Path) -> String {
    match path.strip_prefix(workspace_root) {
        Ok(relative) => format!("./{}", relative.display()),
        Err(_) => path.display().to_string(),
    }
}

/// Traversal-scoped state: the source being read, the token prefix, and
/// the anonymous-label counter. One instance per walk, discarded after.
struct Traversal<'a> {
    src: &'a [u8],
    path: &'a Path,
    prefix: String,
    anonymous: usize,
}

impl Traversal<'_> {
    fn visit(&mut self, node: Node, mut parent: Option<&mut TestItem>, roots: &mut Vec<TestItem>) {
        if let Some(call) = SpecCall::cast(node)
            && let Some(kind) = classifier::classify(call.method_name(self.src))
        {
            match kind {
                CallKind::Group(GroupForm::Standard)
                    if classifier::valid_group(&call, self.src) =>
                {
                    let parent_id = parent.as_deref().map(|p| p.id.as_str());
                    let mut group = self.new_item(&call, ItemKind::Group, parent_id);
                    self.visit_children(node, Some(&mut group), roots);
                    match parent {
                        Some(p) => p.add(group),
                        None => roots.push(group),
                    }
                    return;
                }
                CallKind::Example => {
                    // Examples outside any group have no runnable scope and
                    // are not emitted. Shared groups and invalid groups fall
                    // through: not emitted, but their subtrees are walked.
                    if let Some(p) = parent.as_deref_mut() {
                        let example = self.new_item(&call, ItemKind::Example, Some(p.id.as_str()));
                        p.add(example);
                    }
                }
                CallKind::Group(_) => {}
            }
        }
        self.visit_children(node, parent, roots);
    }

    fn visit_children(
        &mut self,
        node: Node,
        mut parent: Option<&mut TestItem>,
        roots: &mut Vec<TestItem>,
    ) {
        for i in 0..node.child_count() {
            if let Some(child) = node.child(i as u32) {
                self.visit(child, parent.as_deref_mut(), roots);
            }
        }
    }

    fn new_item(&mut self, call: &SpecCall, kind: ItemKind, parent_id: Option<&str>) -> TestItem {
        let token = format!("{}:{}", self.prefix, ruby::start_line(call.node()));
        let id = match parent_id {
            Some(pid) => format!("{pid}::{token}"),
            None => token,
        };
        let label = classifier::extract_label(call, self.src, &mut self.anonymous);
        TestItem::new(
            id,
            label,
            kind,
            PathBuf::from(self.path),
            ruby::range_of(call.node()),
        )
    }
}
