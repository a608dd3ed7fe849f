//! Memoized-helper definition discovery.
//!
//! Finds `let`/`let!`/`subject`/`subject!` declarations in a spec file so a
//! reference like `user` inside an example can jump to `let(:user) { ... }`.
//! Lookup is same-file only; a helper defined in a shared context elsewhere
//! is out of scope here.

use std::path::Path;

use tree_sitter::{Node, Tree};

use crate::classifier;
use crate::errors::DiscoveryError;
use crate::ruby::{self, SpecCall};
use crate::types::Range;

/// One helper declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecDefinition {
    /// Method name the declaration introduces.
    pub name: String,
    /// The DSL word as written (`let`, `let!`, `subject`, `subject!`).
    pub call: String,
    /// Source range of the declaration's block body.
    pub range: Range,
}

/// Parse a file and collect its helper declarations, in source order.
pub fn definitions_in_file(path: &Path) -> Result<Vec<SpecDefinition>, DiscoveryError> {
    let (tree, source) = ruby::parse_file(path)?;
    Ok(definitions_in_tree(&tree, &source))
}

/// Collect helper declarations from an already-parsed tree.
pub fn definitions_in_tree(tree: &Tree, source: &[u8]) -> Vec<SpecDefinition> {
    let mut out = Vec::new();
    collect(tree.root_node(), source, &mut out);
    out
}

/// All declarations matching `name`, in source order.
///
/// Sibling groups may declare the same name; every match is returned and
/// the caller decides which scope applies.
pub fn find_definition<'a>(
    definitions: &'a [SpecDefinition],
    name: &str,
) -> Vec<&'a SpecDefinition> {
    definitions.iter().filter(|d| d.name == name).collect()
}

fn collect(node: Node, src: &[u8], out: &mut Vec<SpecDefinition>) {
    if let Some(call) = SpecCall::cast(node)
        && call.receiver_text(src).is_none()
    {
        match call.method_name(src) {
            method @ ("let" | "let!") => {
                // A let without a block or with anything but one name
                // argument defines nothing.
                if let Some(block) = call.block()
                    && call.argument_count() == 1
                    && let Some(name) = helper_name(call.first_argument(), src)
                {
                    out.push(SpecDefinition {
                        name,
                        call: method.to_string(),
                        range: ruby::range_of(block),
                    });
                }
            }
            method @ ("subject" | "subject!") => {
                if let Some(block) = call.block() {
                    let name = if call.argument_count() == 1 {
                        helper_name(call.first_argument(), src)
                    } else {
                        Some("subject".to_string())
                    };
                    if let Some(name) = name {
                        out.push(SpecDefinition {
                            name,
                            call: method.to_string(),
                            range: ruby::range_of(block),
                        });
                    }
                }
            }
            _ => {}
        }
    }
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i as u32) {
            collect(child, src, out);
        }
    }
}

/// The declared name: symbol content, or a string's raw quoted text.
fn helper_name(arg: Option<Node>, src: &[u8]) -> Option<String> {
    let arg = arg?;
    match arg.kind() {
        "simple_symbol" => Some(
            ruby::node_text(arg, src)
                .trim_start_matches(':')
                .to_string(),
        ),
        "delimited_symbol" => Some(classifier::symbol_content(arg, src)),
        "string" => Some(ruby::node_text(arg, src).to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definitions(src: &str) -> Vec<SpecDefinition> {
        let tree = ruby::parse_source(src.as_bytes()).unwrap();
        definitions_in_tree(&tree, src.as_bytes())
    }

    #[test]
    fn let_with_symbol_name() {
        let defs = definitions("describe \"D\" do\n  let(:user) { build(:user) }\nend\n");
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "user");
        assert_eq!(defs[0].call, "let");
        assert_eq!(defs[0].range.start.line, 1);
    }

    #[test]
    fn bang_variants_are_recognized() {
        let src = "describe \"D\" do\n  let!(:admin) { create(:admin) }\n  subject!(:run) { described_class.call }\nend\n";
        let defs = definitions(src);
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].call, "let!");
        assert_eq!(defs[0].name, "admin");
        assert_eq!(defs[1].call, "subject!");
        assert_eq!(defs[1].name, "run");
    }

    #[test]
    fn blockless_let_defines_nothing() {
        assert!(definitions("describe \"D\" do\n  let(:user)\nend\n").is_empty());
    }

    #[test]
    fn let_requires_exactly_one_argument() {
        assert!(definitions("describe \"D\" do\n  let { 1 }\nend\n").is_empty());
        assert!(definitions("describe \"D\" do\n  let(:a, :b) { 1 }\nend\n").is_empty());
    }

    #[test]
    fn let_with_non_name_argument_is_skipped() {
        assert!(definitions("describe \"D\" do\n  let(42) { 1 }\nend\n").is_empty());
    }

    #[test]
    fn string_names_keep_their_quotes() {
        let defs = definitions("describe \"D\" do\n  let(\"thing\") { 1 }\nend\n");
        assert_eq!(defs[0].name, "\"thing\"");
    }

    #[test]
    fn bare_subject_gets_the_implicit_name() {
        let defs = definitions("describe \"D\" do\n  subject { described_class.new }\nend\n");
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "subject");
        assert_eq!(defs[0].call, "subject");
    }

    #[test]
    fn named_subject_uses_the_argument() {
        let defs = definitions("describe \"D\" do\n  subject(:account) { build(:account) }\nend\n");
        assert_eq!(defs[0].name, "account");
    }

    #[test]
    fn receiver_qualified_calls_are_ignored() {
        assert!(definitions("config.let(:x) { 1 }\n").is_empty());
        assert!(definitions("helper.subject { 1 }\n").is_empty());
    }

    #[test]
    fn lookup_returns_all_matches_in_source_order() {
        let src = "describe \"A\" do\n  let(:user) { 1 }\nend\n\ndescribe \"B\" do\n  let(:user) { 2 }\n  let(:other) { 3 }\nend\n";
        let defs = definitions(src);
        assert_eq!(defs.len(), 3);
        let matches = find_definition(&defs, "user");
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].range.start.line, 1);
        assert_eq!(matches[1].range.start.line, 5);
        assert!(find_definition(&defs, "missing").is_empty());
    }

    #[test]
    fn quoted_symbol_names_use_their_content() {
        let defs = definitions("describe \"D\" do\n  let(:\"two words\") { 1 }\nend\n");
        assert_eq!(defs[0].name, "two words");
    }
}
