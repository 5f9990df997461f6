//! Formatting entry point and options
//!
//! [`format_source`] runs the whole pipeline on one source file: tree-sitter
//! parse, lowering into the printer's syntax tree, and a print session into a
//! string.
//!
//! # Example
//!
//! ```rust
//! use gopretty::formatter::{FormatOptions, format_source};
//!
//! let opts = FormatOptions::default();
//! let formatted = format_source("package main\nvar x   =  1+2*3\n", &opts).unwrap();
//! assert_eq!(formatted, "package main\nvar x\t= 1 + 2*3\n");
//! ```

use anyhow::{Context, Result, bail};
use log::{debug, warn};

use crate::lower::lower;
use crate::parser::parse;
use crate::printer;

/// What the command line tool does with a formatted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Print the formatted file.
    #[default]
    Stdout,
    /// Rewrite the file in place.
    Write,
    /// Only report whether the file would change.
    Check,
}

/// Options of a print session. All of them are read-only while printing.
#[derive(Debug, Clone)]
pub struct FormatOptions {
    /// Tab stop width, also the minimum width of an aligned column.
    pub tab_width: usize,
    /// Pad columns with tabs rather than blanks.
    pub use_tabs: bool,
    /// Keep blank lines of the source where a line break is expected.
    pub respect_newlines: bool,
    /// Maximum number of consecutive newlines.
    pub max_newlines: usize,
    pub comments: bool,
    /// Also print the semicolon before a closing brace.
    pub optional_semicolons: bool,
    /// Emit an HTML page with anchors and links instead of plain text.
    pub html: bool,
    /// Spell `import`, `const`, `type` and `func` as `def`.
    pub def_keywords: bool,
    /// Prefix tokens and comments with their source position.
    pub debug_positions: bool,
    pub mode: Mode,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            tab_width: 8,
            use_tabs: true,
            respect_newlines: true,
            max_newlines: 3,
            comments: true,
            optional_semicolons: false,
            html: false,
            def_keywords: false,
            debug_positions: false,
            mode: Mode::Stdout,
        }
    }
}

/// Format Go source code
///
/// Syntax errors are not fatal: malformed parts of the file print as `BadExpr`,
/// `BadStat` or `BadDecl`. Since that loses source text, a file with syntax
/// errors is rejected in [`Mode::Write`].
///
/// # Errors
///
/// Fails if the source has no package clause, if it has syntax errors in
/// write mode, or if printing fails.
pub fn format_source(input: &str, opts: &FormatOptions) -> Result<String> {
    let tree = parse(input)?;
    if tree.root_node().has_error() {
        if opts.mode == Mode::Write {
            bail!("refusing to rewrite a file with syntax errors");
        }
        warn!("source has syntax errors, malformed parts print as placeholders");
    }

    let program = lower(&tree, input)?;
    debug!(
        "package {}: {} declarations, {} comments and line breaks",
        program.name.name,
        program.decls.len(),
        program.comments.len()
    );

    let mut out = Vec::with_capacity(input.len());
    printer::print(&mut out, opts, &program).context("printing failed")?;
    String::from_utf8(out).context("printer produced invalid UTF-8")
}
