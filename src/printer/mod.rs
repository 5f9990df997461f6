//! Comment-preserving printer
//!
//! A print session walks one [`Program`] top to bottom. Every token goes
//! through [`Printer::tagged_string`], the only place that writes output. It
//! resolves what the callers merely scheduled:
//!
//! 1. the pending separator (blank, tab, comma or semicolon),
//! 2. comments and newline markers positioned before the token,
//! 3. the semantic state (scope opening/closing, list elements) and the
//!    pending newline count, which may grow with blank lines seen in the source,
//! 4. the token text itself, HTML-escaped in HTML mode.
//!
//! Output goes to a [`TabWriter`]; the printer only emits `'\t'` where a column
//! begins and leaves the alignment to it.

mod decl;
mod expr;
mod stmt;

use std::borrow::Cow;
use std::io::{self, Write};

use thiserror::Error;

use crate::ast::{Expr, Ident, Program};
use crate::formatter::FormatOptions;
use crate::tabwriter::TabWriter;
use crate::token::{Comment, CommentKind, LOWEST_PREC, Pos, Token};

/// Where import paths link to in HTML mode.
const PACKAGE_URL_PREFIX: &str = "/pkg/";

#[derive(Debug, Error)]
pub enum PrintError {
    #[error("print error: {0}")]
    Io(#[from] io::Error),
    #[error("comment {index} at position {pos} is not after its predecessor")]
    UnorderedComments { index: usize, pos: Pos },
}

pub type PrintResult = Result<(), PrintError>;

/// Punctuation or white space printed in front of the next token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Separator {
    None,
    Blank,
    Tab,
    Comma,
    Semicolon,
}

/// Controls indentation, scope level and blank line handling of the next token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Normal,
    OpeningScope,
    ClosingScope,
    InsideList,
}

/// White space the separator left at the end of the output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Trailing {
    Nothing,
    Blank,
    Tab,
}

pub struct Printer<'a, W: Write> {
    out: W,
    opts: &'a FormatOptions,
    html: bool,

    comments: &'a [Comment],
    cindex: usize,
    cpos: Pos,

    lastpos: Pos,
    level: usize,
    indentation: usize,
    /// Newlines written since the last visible text.
    newline_run: usize,

    opt_semi: bool,
    separator: Separator,
    newlines: usize,

    state: State,
    laststate: State,

    prec: i32,
}

impl<'a, W: Write> Printer<'a, W> {
    pub fn new(out: W, opts: &'a FormatOptions, comments: &'a [Comment]) -> Result<Self, PrintError> {
        if let Some(i) = comments.windows(2).position(|w| w[0].pos >= w[1].pos) {
            return Err(PrintError::UnorderedComments {
                index: i + 1,
                pos: comments[i + 1].pos,
            });
        }
        Ok(Self {
            out,
            opts,
            html: opts.html,
            comments,
            cindex: 0,
            cpos: comments.first().map_or(Pos::INFINITY, |c| c.pos),
            lastpos: Pos::UNKNOWN,
            level: 0,
            indentation: 0,
            newline_run: 0,
            opt_semi: false,
            separator: Separator::None,
            newlines: 0,
            state: State::Normal,
            laststate: State::Normal,
            prec: LOWEST_PREC,
        })
    }

    /// Flushes the output and returns the underlying writer.
    pub fn finish(mut self) -> Result<W, PrintError> {
        self.out.flush()?;
        Ok(self.out)
    }

    fn has_comment(&self, pos: Pos) -> bool {
        self.opts.comments && self.cpos < pos
    }

    fn next_comment(&mut self) {
        self.cindex += 1;
        self.cpos = self
            .comments
            .get(self.cindex)
            .map_or(Pos::INFINITY, |c| c.pos);
    }

    fn html_escape<'s>(&self, s: &'s str) -> Cow<'s, str> {
        if self.html && s.contains(['<', '&']) {
            Cow::Owned(s.replace('&', "&amp;").replace('<', "&lt;"))
        } else {
            Cow::Borrowed(s)
        }
    }

    fn write_raw(&mut self, s: &str) -> PrintResult {
        if s.is_empty() {
            return Ok(());
        }
        if s.contains(|c: char| !c.is_whitespace()) {
            self.newline_run = 0;
        }
        self.out.write_all(s.as_bytes())?;
        Ok(())
    }

    fn newline(&mut self, n: usize) -> PrintResult {
        let max = self.opts.max_newlines;
        let n = n.min(max.saturating_sub(self.newline_run));
        if n > 0 {
            for _ in 0..n {
                self.out.write_all(b"\n")?;
            }
            for _ in 0..self.indentation {
                self.out.write_all(b"\t")?;
            }
            self.newline_run += n;
        }
        Ok(())
    }

    fn dedent(&mut self) {
        debug_assert!(self.indentation > 0, "indentation below zero");
        self.indentation = self.indentation.saturating_sub(1);
    }

    /// Whether the token at `pos` will start a new line, either because
    /// newlines are pending or because of the comments in front of it.
    fn line_break_ahead(&self, pos: Pos) -> bool {
        if self.newlines > 0 {
            return true;
        }
        if !self.opts.comments {
            return false;
        }
        let mut after_newline = false;
        for c in self.comments[self.cindex..].iter().take_while(|c| c.pos < pos) {
            match c.kind() {
                CommentKind::Newline => {
                    if self.opts.respect_newlines && self.state == State::InsideList {
                        return true;
                    }
                    after_newline = true;
                }
                CommentKind::Line => return true,
                CommentKind::Block if after_newline => return true,
                CommentKind::Block => {}
            }
        }
        false
    }

    /// Writes the pending separator. Blanks are left out at the end of a line.
    fn flush_separator(&mut self, pos: Pos) -> Result<Trailing, PrintError> {
        let trailing = match self.separator {
            Separator::None => Trailing::Nothing,
            Separator::Blank if self.line_break_ahead(pos) => Trailing::Nothing,
            Separator::Blank => {
                self.write_raw(" ")?;
                Trailing::Blank
            }
            Separator::Tab => {
                self.write_raw("\t")?;
                Trailing::Tab
            }
            Separator::Comma => self.punctuation(pos, ",")?,
            // no semicolons at the top level
            Separator::Semicolon if self.level > 0 => self.punctuation(pos, ";")?,
            Separator::Semicolon => Trailing::Nothing,
        };
        self.separator = Separator::None;
        Ok(trailing)
    }

    fn punctuation(&mut self, pos: Pos, p: &str) -> Result<Trailing, PrintError> {
        self.write_raw(p)?;
        if self.line_break_ahead(pos) {
            Ok(Trailing::Nothing)
        } else {
            self.write_raw(" ")?;
            Ok(Trailing::Blank)
        }
    }

    /// Prints the comments that come before `pos` and returns the number of
    /// trailing newline markers that were not followed by a comment.
    fn interleave_comments(&mut self, pos: Pos, trailing: Trailing) -> Result<usize, PrintError> {
        let comments = self.comments;
        let mut nlcount = 0;
        while self.has_comment(pos) {
            let comment = &comments[self.cindex];
            let kind = comment.kind();
            if kind == CommentKind::Newline {
                nlcount += 1;
                self.next_comment();
                continue;
            }

            let mut text = untabify(&comment.text);
            if nlcount > 0 || self.cpos.is_unknown() {
                // only white space before the comment on its line,
                // or the file starts with it
                if !self.opts.respect_newlines && !self.cpos.is_unknown() {
                    nlcount = 1;
                }
                self.newline(nlcount)?;
                nlcount = 0;
                // Deliberately lowers the pending count: the line breaks after
                // the comment decide how far the next token moves, so a
                // comment stays attached to what follows it.
                self.newlines = self.newlines.min(1);
            } else if kind == CommentKind::Line {
                // next cell, unless a scope was just opened: a cell break
                // would indent the whole scope like the next column
                if self.laststate == State::OpeningScope {
                    match trailing {
                        Trailing::Blank => self.write_raw(" ")?,
                        Trailing::Tab => {}
                        Trailing::Nothing => self.write_raw("  ")?,
                    }
                } else if trailing != Trailing::Tab {
                    self.write_raw("\t")?;
                }
            } else {
                if trailing == Trailing::Nothing {
                    self.write_raw(" ")?;
                }
                if !self.line_break_ahead(pos) {
                    text.to_mut().push(' ');
                }
            }

            if self.opts.debug_positions {
                let marker = format!("[{}]", self.cpos);
                self.write_raw(&marker)?;
            }
            let escaped = self.html_escape(&text).into_owned();
            self.write_raw(&escaped)?;

            if kind == CommentKind::Line && self.newlines == 0 {
                self.newlines = 1;
            }
            self.next_comment();
        }
        Ok(nlcount)
    }

    /// The single emission primitive. `tag` and `endtag` are markup and are
    /// written as is; `s` is the token text.
    pub(crate) fn tagged_string(&mut self, pos: Pos, tag: &str, s: &str, endtag: &str) -> PrintResult {
        let pos = if pos.is_unknown() { self.lastpos } else { pos };

        // separators and comments are printed in the previous state
        let trailing = self.flush_separator(pos)?;
        let nlcount = self.interleave_comments(pos, trailing)?;

        if self.state == State::ClosingScope {
            self.dedent();
        }

        // Blank lines in the source are only honoured where a newline is
        // expected anyway; token positions are too coarse to trust them
        // anywhere else.
        if self.opts.respect_newlines
            && (self.newlines > 0 || self.state == State::InsideList)
            && nlcount > self.newlines
        {
            self.newlines = nlcount;
        }
        let newlines = std::mem::take(&mut self.newlines);
        self.newline(newlines)?;

        if self.opts.debug_positions {
            self.write_raw(&format!("[{pos}]"))?;
        }
        let text = self.html_escape(s).into_owned();
        self.write_raw(tag)?;
        self.write_raw(&text)?;
        self.write_raw(endtag)?;

        match self.state {
            State::OpeningScope => {
                self.level += 1;
                self.indentation += 1;
            }
            State::ClosingScope => {
                debug_assert!(self.level > 0, "scope level below zero");
                self.level = self.level.saturating_sub(1);
            }
            State::Normal | State::InsideList => {}
        }
        self.laststate = self.state;
        self.state = State::Normal;

        self.opt_semi = false;
        self.lastpos = pos.advance(s.len());
        Ok(())
    }

    pub(crate) fn string(&mut self, pos: Pos, s: &str) -> PrintResult {
        self.tagged_string(pos, "", s, "")
    }

    pub(crate) fn token(&mut self, pos: Pos, tok: Token) -> PrintResult {
        self.string(pos, tok.as_str())
    }

    /// Declaration keyword, spelled `def` in the experimental mode.
    pub(crate) fn keyword(&mut self, pos: Pos, tok: Token) -> PrintResult {
        let generic = matches!(tok, Token::Import | Token::Const | Token::Type | Token::Func);
        if self.opts.def_keywords && generic {
            self.string(pos, "def")
        } else {
            self.token(pos, tok)
        }
    }

    pub(crate) fn html_prologue(&mut self, title: &str) -> PrintResult {
        if self.html {
            let title = self.html_escape(title).into_owned();
            let prologue = format!(
                "<html>\n<head>\n\t<meta http-equiv=\"Content-Type\" content=\"text/html; charset=UTF-8\">\n\t<title>{title}</title>\n</head>\n<body>\n<pre>\n"
            );
            self.tagged_string(Pos::UNKNOWN, &prologue, "", "")?;
        }
        Ok(())
    }

    pub(crate) fn html_epilogue(&mut self) -> PrintResult {
        if self.html {
            self.tagged_string(Pos::UNKNOWN, "</pre>\n</body>\n</html>\n", "", "")?;
        }
        Ok(())
    }

    /// Identifier, wrapped in an anchor when its declaration site is known.
    pub(crate) fn html_identifier(&mut self, x: &Ident) -> PrintResult {
        match x.obj {
            Some(obj) if self.html => {
                let id = obj.id;
                if x.pos == obj.decl_pos {
                    let tag = format!("<a name=\"id{id}\">");
                    self.tagged_string(x.pos, &tag, &x.name, "</a>")
                } else {
                    let tag = format!("<a href=\"#id{id}\">");
                    self.tagged_string(x.pos, &tag, &x.name, "</a>")
                }
            }
            _ => self.string(x.pos, &x.name),
        }
    }

    /// Quoted import path, linked to the package documentation in HTML mode.
    pub(crate) fn html_package_name(&mut self, pos: Pos, name: &str) -> PrintResult {
        let unquoted = name
            .len()
            .checked_sub(1)
            .filter(|&end| end >= 1)
            .and_then(|end| name.get(1..end));
        match unquoted {
            Some(path) if self.html => {
                let href = self.html_escape(path).into_owned();
                let tag = format!("\"<a href=\"{PACKAGE_URL_PREFIX}{href}\">");
                self.tagged_string(pos, &tag, path, "</a>\"")
            }
            _ => self.string(pos, name),
        }
    }
}

/// Collapses every run of tabs to a single tab. Tabs inside comments are cell
/// breaks for the tab writer; collapsing them keeps reformatting stable.
fn untabify(s: &str) -> Cow<'_, str> {
    if !s.contains("\t\t") {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    let mut prev_tab = false;
    for c in s.chars() {
        if c == '\t' && prev_tab {
            continue;
        }
        prev_tab = c == '\t';
        out.push(c);
    }
    Cow::Owned(out)
}

fn sink<W: Write>(writer: W, opts: &FormatOptions) -> TabWriter<W> {
    let pad_char = if opts.use_tabs { b'\t' } else { b' ' };
    TabWriter::new(writer, opts.tab_width, opts.tab_width, 1, pad_char, opts.html)
}

/// Prints a whole program, its comments included, and flushes the output.
///
/// If an error is returned the output written so far is incomplete and
/// should be discarded.
pub fn print<W: Write>(writer: W, opts: &FormatOptions, program: &Program) -> PrintResult {
    let mut p = Printer::new(sink(writer, opts), opts, &program.comments)?;
    p.html_prologue(&format!("package {}", program.name.name))?;
    p.program(program)?;
    // trailing comments and pending newlines
    p.string(Pos::INFINITY, "")?;
    p.html_epilogue()?;
    p.finish()?;
    Ok(())
}

/// [`print`] with default options apart from HTML mode.
pub fn print_program<W: Write>(writer: W, html: bool, program: &Program) -> PrintResult {
    let opts = FormatOptions {
        html,
        ..FormatOptions::default()
    };
    print(writer, &opts, program)
}

/// Prints a lone expression, without comments.
pub fn print_expr<W: Write>(writer: W, opts: &FormatOptions, x: &Expr) -> PrintResult {
    let mut p = Printer::new(sink(writer, opts), opts, &[])?;
    p.expr(x)?;
    p.finish()?;
    Ok(())
}

/// Prints a lone token.
pub fn print_token<W: Write>(writer: W, opts: &FormatOptions, pos: Pos, tok: Token) -> PrintResult {
    let mut p = Printer::new(sink(writer, opts), opts, &[])?;
    p.token(pos, tok)?;
    p.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests;
