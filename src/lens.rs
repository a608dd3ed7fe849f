//! Inline run affordances.
//!
//! Walks one spec file and emits three affordances per runnable item (Run,
//! Run In Terminal, Debug), each anchored to the item's source range and
//! carrying the shell command that executes exactly that item.
//!
//! This walk is looser than structure discovery on purpose: the runner will
//! happily execute a floating example by line, so examples get affordances
//! even outside any group and regardless of receiver. Groups still pass the
//! usual validity gate, and shared groups get none because they only run
//! when included elsewhere.

use std::path::{Path, PathBuf};

use tree_sitter::{Node, Tree};

use crate::classifier::{self, CallKind, GroupForm};
use crate::errors::DiscoveryError;
use crate::ruby::{self, SpecCall};
use crate::types::{ItemKind, Range};

/// What activating an affordance does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LensAction {
    Run,
    RunInTerminal,
    Debug,
}

impl LensAction {
    /// All actions, in presentation order.
    pub const ALL: [LensAction; 3] = [
        LensAction::Run,
        LensAction::RunInTerminal,
        LensAction::Debug,
    ];

    /// Display title.
    pub fn title(self) -> &'static str {
        match self {
            LensAction::Run => "Run",
            LensAction::RunInTerminal => "Run In Terminal",
            LensAction::Debug => "Debug",
        }
    }

    /// Machine-readable action code.
    pub fn code(self) -> &'static str {
        match self {
            LensAction::Run => "test",
            LensAction::RunInTerminal => "test_in_terminal",
            LensAction::Debug => "debug",
        }
    }
}

/// One run affordance anchored to a group or example.
#[derive(Debug, Clone)]
pub struct RunAffordance {
    pub id: String,
    pub label: String,
    pub kind: ItemKind,
    pub action: LensAction,
    /// Absolute source path, as embedded in `command`.
    pub path: PathBuf,
    /// Full shell command: `<runner> <path>:<line>`.
    pub command: String,
    pub range: Range,
}

/// Parse a spec file and collect its run affordances.
pub fn lenses_for_file(
    path: &Path,
    workspace_root: &Path,
    runner: &str,
) -> Result<Vec<RunAffordance>, DiscoveryError> {
    let (tree, source) = ruby::parse_file(path)?;
    Ok(lenses_for_tree(&tree, &source, path, workspace_root, runner))
}

/// Collect run affordances from an already-parsed tree, in source order.
pub fn lenses_for_tree(
    tree: &Tree,
    source: &[u8],
    path: &Path,
    workspace_root: &Path,
    runner: &str,
) -> Vec<RunAffordance> {
    let prefix = match path.strip_prefix(workspace_root) {
        Ok(relative) => format!("./{}", relative.display()),
        Err(_) => path.display().to_string(),
    };
    let mut walk = LensWalk {
        src: source,
        path,
        prefix,
        runner,
        id_stack: Vec::new(),
        anonymous: 0,
        out: Vec::new(),
    };
    walk.visit(tree.root_node());
    walk.out
}

struct LensWalk<'a> {
    src: &'a [u8],
    path: &'a Path,
    prefix: String,
    runner: &'a str,
    /// Ids of the open valid groups, innermost last.
    id_stack: Vec<String>,
    anonymous: usize,
    out: Vec<RunAffordance>,
}

impl LensWalk<'_> {
    fn visit(&mut self, node: Node) {
        let mut pushed = false;
        if let Some(call) = SpecCall::cast(node)
            && let Some(kind) = classifier::classify(call.method_name(self.src))
        {
            match kind {
                CallKind::Group(GroupForm::Standard)
                    if classifier::valid_group(&call, self.src) =>
                {
                    let id = self.emit(&call, ItemKind::Group);
                    self.id_stack.push(id);
                    pushed = true;
                }
                CallKind::Example => {
                    self.emit(&call, ItemKind::Example);
                }
                CallKind::Group(_) => {}
            }
        }
        for i in 0..node.child_count() {
            if let Some(child) = node.child(i as u32) {
                self.visit(child);
            }
        }
        if pushed {
            self.id_stack.pop();
        }
    }

    /// Emit the three affordances for one item; returns the item's id.
    fn emit(&mut self, call: &SpecCall, kind: ItemKind) -> String {
        let line = ruby::start_line(call.node());
        let token = format!("{}:{}", self.prefix, line);
        let id = match self.id_stack.last() {
            Some(parent) => format!("{parent}::{token}"),
            None => token,
        };
        let label = classifier::extract_label(call, self.src, &mut self.anonymous);
        let command = format!("{} {}:{}", self.runner, self.path.display(), line);
        let range = ruby::range_of(call.node());

        for action in LensAction::ALL {
            self.out.push(RunAffordance {
                id: id.clone(),
                label: label.clone(),
                kind,
                action,
                path: self.path.to_path_buf(),
                command: command.clone(),
                range,
            });
        }
        id
    }
}
