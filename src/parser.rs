//! Go language parser using tree-sitter
//!
//! Thin wrapper around the [tree-sitter-go](https://github.com/tree-sitter/tree-sitter-go)
//! grammar. The concrete tree it returns is turned into the printer's syntax
//! tree by [`crate::lower`].
//!
//! # Example
//!
//! ```rust
//! use gopretty::parser::parse;
//!
//! let tree = parse("package main\n\nfunc main() {}\n").unwrap();
//! assert_eq!(tree.root_node().kind(), "source_file");
//! ```

use once_cell::sync::Lazy;
use tree_sitter::{Language, Parser, Tree};

/// The Go language definition for tree-sitter
pub static GO_LANGUAGE: Lazy<Language> = Lazy::new(|| tree_sitter_go::LANGUAGE.into());

/// Parse Go source code into a concrete syntax tree
///
/// The parser recovers from syntax errors; malformed regions show up as
/// `ERROR` nodes in the returned tree instead of failing the parse.
pub fn parse(source: &str) -> anyhow::Result<Tree> {
    let mut parser = Parser::new();
    parser.set_language(&GO_LANGUAGE)?;
    parser
        .parse(source, None)
        .ok_or_else(|| anyhow::anyhow!("Failed to parse Go source"))
}
