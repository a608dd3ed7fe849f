//! Document-outline extraction for spec files.
//!
//! Produces the symbol tree an editor shows for one file: DSL groups
//! (including the `shared_*` forms) as module symbols, named examples as
//! method symbols, and plain Ruby structure (`class`, `module`, `def`)
//! interleaved where it appears. Anonymous examples are omitted here; the
//! outline names what the author named.

use std::path::Path;

use tree_sitter::{Node, Tree};

use crate::classifier::{self, CallKind};
use crate::errors::DiscoveryError;
use crate::ruby::{self, SpecCall};
use crate::types::Range;

/// Editor-facing symbol categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Module,
    Class,
    Method,
}

impl SymbolKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SymbolKind::Module => "module",
            SymbolKind::Class => "class",
            SymbolKind::Method => "method",
        }
    }
}

/// One outline entry; containers hold their children in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineSymbol {
    pub name: String,
    pub kind: SymbolKind,
    pub range: Range,
    pub children: Vec<OutlineSymbol>,
}

/// Parse a file and extract its outline.
pub fn outline_file(path: &Path) -> Result<Vec<OutlineSymbol>, DiscoveryError> {
    let (tree, source) = ruby::parse_file(path)?;
    Ok(outline_tree(&tree, &source))
}

/// Extract the outline of an already-parsed tree.
pub fn outline_tree(tree: &Tree, source: &[u8]) -> Vec<OutlineSymbol> {
    let walk = OutlineWalk { src: source };
    let mut roots = Vec::new();
    walk.visit(tree.root_node(), &mut roots);
    roots
}

struct OutlineWalk<'a> {
    src: &'a [u8],
}

impl OutlineWalk<'_> {
    fn visit(&self, node: Node, out: &mut Vec<OutlineSymbol>) {
        match node.kind() {
            "class" => self.container(node, SymbolKind::Class, out),
            "module" => self.container(node, SymbolKind::Module, out),
            "method" | "singleton_method" => self.container(node, SymbolKind::Method, out),
            "call" => self.dsl_call(node, out),
            _ => self.visit_children(node, out),
        }
    }

    fn visit_children(&self, node: Node, out: &mut Vec<OutlineSymbol>) {
        for i in 0..node.child_count() {
            if let Some(child) = node.child(i as u32) {
                self.visit(child, out);
            }
        }
    }

    /// Plain Ruby structure: named nodes become symbols that own whatever
    /// their bodies contain, unnamed ones are transparent.
    fn container(&self, node: Node, kind: SymbolKind, out: &mut Vec<OutlineSymbol>) {
        let Some(name) = ruby::field_text(node, "name", self.src) else {
            self.visit_children(node, out);
            return;
        };
        let mut symbol = OutlineSymbol {
            name: name.to_string(),
            kind,
            range: ruby::range_of(node),
            children: Vec::new(),
        };
        self.visit_children(node, &mut symbol.children);
        out.push(symbol);
    }

    fn dsl_call(&self, node: Node, out: &mut Vec<OutlineSymbol>) {
        if let Some(call) = SpecCall::cast(node)
            && let Some(kind) = classifier::classify(call.method_name(self.src))
        {
            match kind {
                // Shared forms appear here even though discovery skips them;
                // same validity gate either way.
                CallKind::Group(_) if classifier::valid_group(&call, self.src) => {
                    if let Some(name) = classifier::outline_label(&call, self.src) {
                        let mut symbol = OutlineSymbol {
                            name,
                            kind: SymbolKind::Module,
                            range: ruby::range_of(node),
                            children: Vec::new(),
                        };
                        self.visit_children(node, &mut symbol.children);
                        out.push(symbol);
                        return;
                    }
                }
                CallKind::Example => {
                    if let Some(name) = classifier::outline_label(&call, self.src) {
                        out.push(OutlineSymbol {
                            name,
                            kind: SymbolKind::Method,
                            range: ruby::range_of(node),
                            children: Vec::new(),
                        });
                    }
                }
                CallKind::Group(_) => {}
            }
        }
        self.visit_children(node, out);
    }
}
