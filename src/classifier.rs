//! Classification of spec-DSL calls.
//!
//! Decides whether a call node introduces a group (`describe`, `context`,
//! `feature`, plus the `shared_*` forms), an example (`it`, `specify`,
//! `example`, `scenario`), or is an ordinary method call, and extracts a
//! human-readable label from the first argument.
//!
//! Classification is a name lookup plus a validity predicate, never
//! dispatch on node types. Label extraction is total: every recognized
//! call gets a label, with placeholders for non-literal and absent
//! arguments.

use tree_sitter::Node;

use crate::ruby::{self, SpecCall};

/// The only receiver a group call may carry (`RSpec.describe`).
pub const DSL_NAMESPACE: &str = "RSpec";

// ---------------------------------------------------------------------------
// Call kinds
// ---------------------------------------------------------------------------

/// How a group-introducing call is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupForm {
    /// `describe`, `context`, `feature`: a directly runnable nesting scope.
    Standard,
    /// `shared_examples`, `shared_context`, `shared_examples_for`: a reusable
    /// block that only runs when included elsewhere. Listed in outlines,
    /// excluded from run discovery.
    Shared,
}

/// The DSL role of one call node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Group(GroupForm),
    Example,
}

/// Map a bare method name to its DSL role, if any.
pub fn classify(method: &str) -> Option<CallKind> {
    match method {
        "describe" | "context" | "feature" => Some(CallKind::Group(GroupForm::Standard)),
        "shared_examples" | "shared_context" | "shared_examples_for" => {
            Some(CallKind::Group(GroupForm::Shared))
        }
        "it" | "specify" | "example" | "scenario" => Some(CallKind::Example),
        _ => None,
    }
}

/// Whether a group call is well formed.
///
/// A group must carry a block, and its receiver, when present, must be the
/// DSL namespace. `describe "X"` with no block is a forward declaration the
/// runner would reject, and `Foo.describe` is an unrelated method that
/// happens to share a name; both are skipped without comment.
pub fn valid_group(call: &SpecCall, src: &[u8]) -> bool {
    call.has_block()
        && match call.receiver_text(src) {
            None => true,
            Some(receiver) => receiver == DSL_NAMESPACE,
        }
}

// ---------------------------------------------------------------------------
// Label extraction
// ---------------------------------------------------------------------------

/// Extract the display label for a group or example call.
///
/// First matching shape wins: string literal content, symbol name, full
/// constant path, `<name>` for an implicit-subject call or bare identifier,
/// raw source text for anything else. Argument-less calls get a placeholder
/// numbered by `anonymous`, which the caller scopes to one traversal so
/// placeholders never repeat within a file.
pub fn extract_label(call: &SpecCall, src: &[u8], anonymous: &mut usize) -> String {
    let Some(arg) = call.first_argument() else {
        *anonymous += 1;
        return format!("<unnamed-{anonymous}>");
    };
    match arg.kind() {
        "string" => string_label(arg, src),
        "simple_symbol" => ruby::node_text(arg, src)
            .trim_start_matches(':')
            .to_string(),
        "delimited_symbol" => symbol_content(arg, src),
        "constant" | "scope_resolution" => ruby::node_text(arg, src).to_string(),
        "call" | "identifier" => angle_label(arg, src),
        _ => ruby::node_text(arg, src).to_string(),
    }
}

/// Label for outline symbols.
///
/// Returns `None` for argument-less calls, which are omitted from outlines
/// rather than given placeholders. Unlike [`extract_label`], symbols and
/// constants keep their source spelling here.
pub fn outline_label(call: &SpecCall, src: &[u8]) -> Option<String> {
    let arg = call.first_argument()?;
    let label = match arg.kind() {
        "string" => string_label(arg, src),
        "call" | "identifier" => angle_label(arg, src),
        _ => ruby::node_text(arg, src).to_string(),
    };
    Some(label)
}

/// Content of a string literal, or its raw quoted text when the literal
/// interpolates or escapes (the reader sees what the file says).
fn string_label(node: Node, src: &[u8]) -> String {
    let mut content = String::new();
    let mut plain = true;
    for i in 0..node.named_child_count() {
        if let Some(child) = node.named_child(i as u32) {
            if child.kind() == "string_content" {
                content.push_str(ruby::node_text(child, src));
            } else {
                plain = false;
            }
        }
    }
    if !plain || content.is_empty() {
        return ruby::node_text(node, src).to_string();
    }
    content
}

/// Name of a `:"quoted symbol"`, read from its content children.
pub(crate) fn symbol_content(node: Node, src: &[u8]) -> String {
    let mut content = String::new();
    for i in 0..node.named_child_count() {
        if let Some(child) = node.named_child(i as u32)
            && child.kind() == "string_content"
        {
            content.push_str(ruby::node_text(child, src));
        }
    }
    if content.is_empty() {
        return ruby::node_text(node, src).to_string();
    }
    content
}

/// `<name>` rendering for an implicit-subject argument such as
/// `describe described_class do`.
fn angle_label(node: Node, src: &[u8]) -> String {
    let name = match node.kind() {
        "call" => ruby::field_text(node, "method", src).unwrap_or(""),
        _ => ruby::node_text(node, src),
    };
    if name.is_empty() {
        return format!("<{}>", ruby::node_text(node, src));
    }
    format!("<{name}>")
}
