//! # gopretty - comment-preserving Go pretty printer
//!
//! gopretty prints Go source code from a syntax tree plus an ordered stream of
//! comments and newline markers. It normalizes white space, keeps every
//! comment and the blank lines that matter, parenthesizes expressions by
//! operator precedence, and aligns columns (declaration values, struct field
//! types, trailing comments) with elastic tab stops. Optionally the output is
//! an HTML page where package-level identifiers link to their declaration.
//!
//! Go files are parsed with [tree-sitter](https://tree-sitter.github.io/tree-sitter/)
//! and the [tree-sitter-go](https://github.com/tree-sitter/tree-sitter-go) grammar.
//!
//! ## Usage
//!
//! ### As a Library
//!
//! ```rust
//! use gopretty::formatter::{FormatOptions, format_source};
//!
//! let source = "package main\nfunc main() {\nprintln(  \"hi\" )\n}\n";
//! let opts = FormatOptions {
//!     tab_width: 4,
//!     use_tabs: false,
//!     ..FormatOptions::default()
//! };
//!
//! let formatted = format_source(source, &opts).unwrap();
//! assert_eq!(formatted, "package main\nfunc main() {\n    println(\"hi\")\n}\n");
//! ```
//!
//! A syntax tree built by other means is printed with [`printer::print`].
//!
//! ### As a CLI Tool
//!
//! `gopretty fmt [PATHS]` formats `.go` files, `gopretty debug FILE` dumps the
//! concrete syntax tree. See `gopretty --help`.
//!
//! ## Modules
//!
//! - [`token`] - positions, tokens with their precedence, comments
//! - [`ast`] - the syntax tree the printer walks
//! - [`printer`] - the print session
//! - [`tabwriter`] - column alignment of the printer output
//! - [`parser`] and [`lower`] - the tree-sitter front end
//! - [`formatter`] - options and the source-to-source entry point

pub mod ast;
pub mod token;

/// Comment-preserving printer
pub mod printer;

/// Elastic tab stops
pub mod tabwriter;

/// Tree-sitter based Go parser
pub mod parser;

/// Concrete tree to syntax tree conversion
pub mod lower;

/// Formatting options and public API
pub mod formatter;

/// Syntax tree dump
pub mod debug;
