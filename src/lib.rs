//! spex: RSpec test-structure discovery and run-command resolution.
//!
//! Parses spec files with tree-sitter, discovers the tree of example
//! groups and examples, and reduces selections over that tree to minimal
//! runner invocations. The binary front-end lives in `main.rs`; everything
//! else is library code so integration tests can drive it directly.

pub mod classifier;
pub mod cli;
pub mod color;
pub mod config;
pub mod defs;
pub mod discovery;
pub mod errors;
pub mod lens;
pub mod outline;
pub mod output;
pub mod reporter;
pub mod resolver;
pub mod router;
pub mod ruby;
pub mod runner;
pub mod types;
pub mod walker;
