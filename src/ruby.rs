//! Ruby parsing front end.
//!
//! Thin layer over Tree-sitter: parser construction, file parsing, and a
//! [`SpecCall`] view of `call` nodes that exposes the pieces the classifier
//! and the structure builder care about (method name, receiver, first
//! argument, block presence).
//!
//! Tree-sitter's Ruby grammar uses a single `call` node kind for every
//! invocation shape, with optional `receiver`, `arguments` and `block`
//! fields. Bare DSL calls like `it "works" do` are `call` nodes too.

use std::path::Path;

use tree_sitter::{Node, Parser, Tree};

use crate::errors::DiscoveryError;
use crate::types::{Position, Range};

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Create a new [`Parser`] configured for Ruby.
pub fn get_parser() -> Parser {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_ruby::LANGUAGE.into())
        .expect("Error loading Ruby grammar");
    parser
}

/// Parse Ruby source held in memory.
///
/// Returns `None` when the parser fails to produce a tree.
pub fn parse_source(source: &[u8]) -> Option<Tree> {
    let mut parser = get_parser();
    parser.parse(source, None)
}

/// Parse a Ruby file, returning the syntax tree and the raw source bytes.
pub fn parse_file(path: &Path) -> Result<(Tree, Vec<u8>), DiscoveryError> {
    let source = std::fs::read(path).map_err(|source| DiscoveryError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let tree = parse_source(&source).ok_or_else(|| DiscoveryError::Parse {
        path: path.to_path_buf(),
    })?;
    Ok((tree, source))
}

// ---------------------------------------------------------------------------
// Node helpers
// ---------------------------------------------------------------------------

/// Source text of a node, or `""` when the byte range is not valid UTF-8.
pub fn node_text<'a>(node: Node, src: &'a [u8]) -> &'a str {
    node.utf8_text(src).unwrap_or("")
}

/// Text of a field child, when the field is present.
pub fn field_text<'a>(node: Node, field: &str, src: &'a [u8]) -> Option<&'a str> {
    node.child_by_field_name(field).map(|n| node_text(n, src))
}

/// The 0-based display range covered by a node.
pub fn range_of(node: Node) -> Range {
    let start = node.start_position();
    let end = node.end_position();
    Range {
        start: Position {
            line: start.row,
            character: start.column,
        },
        end: Position {
            line: end.row,
            character: end.column,
        },
    }
}

/// The 1-based line a node starts on, as editors and runners display it.
pub fn start_line(node: Node) -> usize {
    node.start_position().row + 1
}

// ---------------------------------------------------------------------------
// Call facade
// ---------------------------------------------------------------------------

/// A `call` node viewed through the spec-DSL lens.
#[derive(Clone, Copy)]
pub struct SpecCall<'t> {
    node: Node<'t>,
}

impl<'t> SpecCall<'t> {
    /// View a node as a method call, or `None` for any other node kind.
    pub fn cast(node: Node<'t>) -> Option<Self> {
        if node.kind() == "call" && node.child_by_field_name("method").is_some() {
            Some(Self { node })
        } else {
            None
        }
    }

    /// The underlying syntax node.
    pub fn node(&self) -> Node<'t> {
        self.node
    }

    /// The bare method name (`describe`, `it`, ...).
    pub fn method_name<'a>(&self, src: &'a [u8]) -> &'a str {
        field_text(self.node, "method", src).unwrap_or("")
    }

    /// Source text of the receiver, when one exists (`RSpec` in
    /// `RSpec.describe`).
    pub fn receiver_text<'a>(&self, src: &'a [u8]) -> Option<&'a str> {
        field_text(self.node, "receiver", src)
    }

    /// The first positional argument, when an argument list exists.
    pub fn first_argument(&self) -> Option<Node<'t>> {
        self.node
            .child_by_field_name("arguments")
            .and_then(|args| args.named_child(0u32))
    }

    /// The attached `do ... end` or `{ ... }` block, when present.
    pub fn block(&self) -> Option<Node<'t>> {
        self.node.child_by_field_name("block")
    }

    /// Whether the call carries a block.
    pub fn has_block(&self) -> bool {
        self.block().is_some()
    }

    /// Number of positional arguments.
    pub fn argument_count(&self) -> usize {
        self.node
            .child_by_field_name("arguments")
            .map(|args| args.named_child_count())
            .unwrap_or(0)
    }
}
