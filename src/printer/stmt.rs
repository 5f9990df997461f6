use std::io::Write;

use super::{PrintResult, Printer, Separator, State};
use crate::ast::*;
use crate::token::{Pos, Token};

impl<W: Write> Printer<'_, W> {
    pub(crate) fn stat(&mut self, s: &Stat) -> PrintResult {
        match s {
            Stat::If(s) => self.if_stat(s),
            Stat::For(s) => self.for_stat(s),
            Stat::Switch(s) => self.switch_stat(s),
            Stat::Select(s) => self.select_stat(s),
            Stat::Case(s) => self.case_clause(s),
            Stat::ControlFlow(s) => self.control_flow_stat(s),
            Stat::Expression(s) => self.expression_stat(s),
            Stat::Declaration(d) => self.decl(d),
            Stat::Composite(b) => self.block(b, true),
            Stat::Empty(pos) => self.string(*pos, ""),
            Stat::Bad(pos) => self.string(*pos, "BadStat"),
            Stat::Label(s) => self.label_decl(s),
        }
    }

    fn statement_list(&mut self, list: &[Stat]) -> PrintResult {
        for (i, s) in list.iter().enumerate() {
            if i == 0 {
                self.newlines = 1;
            } else if !self.opt_semi {
                self.separator = Separator::Semicolon;
            }
            self.stat(s)?;
            self.newlines = 1;
            self.state = State::InsideList;
        }
        Ok(())
    }

    /// Brace block. Without `indent` the statements stay at the level of the
    /// enclosing construct, as case clauses do.
    pub(crate) fn block(&mut self, b: &Block, indent: bool) -> PrintResult {
        self.state = State::OpeningScope;
        self.token(b.pos, Token::LBrace)?;
        if !indent {
            self.dedent();
        }
        self.statement_list(&b.list)?;
        if !indent {
            self.indentation += 1;
        }
        self.separator = if self.opts.optional_semicolons && !b.list.is_empty() && !self.opt_semi {
            Separator::Semicolon
        } else {
            Separator::None
        };
        self.state = State::ClosingScope;
        self.token(b.end, Token::RBrace)?;
        self.opt_semi = true;
        Ok(())
    }

    fn label_decl(&mut self, s: &LabelDecl) -> PrintResult {
        self.dedent();
        self.html_identifier(&s.label)?;
        self.token(s.pos, Token::Colon)?;
        self.indentation += 1;
        // the labelled statement follows without a separator
        self.opt_semi = true;
        Ok(())
    }

    fn expression_stat(&mut self, s: &ExpressionStat) -> PrintResult {
        match s.kind {
            ExprStatKind::Plain => {
                if let Some(x) = &s.expr {
                    self.expr(x)?;
                }
            }
            ExprStatKind::Inc | ExprStatKind::Dec => {
                if let Some(x) = &s.expr {
                    self.expr(x)?;
                }
                let tok = if s.kind == ExprStatKind::Inc {
                    Token::Inc
                } else {
                    Token::Dec
                };
                self.token(s.pos, tok)?;
            }
            ExprStatKind::Return | ExprStatKind::Go | ExprStatKind::Defer => {
                let tok = match s.kind {
                    ExprStatKind::Return => Token::Return,
                    ExprStatKind::Go => Token::Go,
                    _ => Token::Defer,
                };
                self.token(s.pos, tok)?;
                if let Some(x) = &s.expr {
                    self.separator = Separator::Blank;
                    self.expr(x)?;
                }
            }
        }
        Ok(())
    }

    /// Header of `if`, `for` and `switch`. Without init and post statements
    /// only the condition is printed; otherwise every semicolon is printed as
    /// a token, so `for ; cond; post` keeps its empty parts visible.
    fn control_clause(
        &mut self,
        is_for: bool,
        init: Option<&Stat>,
        expr: Option<&Expr>,
        post: Option<&Stat>,
    ) -> PrintResult {
        self.separator = Separator::Blank;
        if init.is_none() && post.is_none() {
            if let Some(x) = expr {
                self.expr(x)?;
            }
        } else {
            if let Some(init) = init {
                self.stat(init)?;
                self.separator = Separator::None;
            }
            self.token(Pos::UNKNOWN, Token::Semicolon)?;
            self.separator = Separator::Blank;
            if let Some(x) = expr {
                self.expr(x)?;
                self.separator = Separator::None;
            }
            if is_for {
                self.token(Pos::UNKNOWN, Token::Semicolon)?;
                self.separator = Separator::Blank;
                if let Some(post) = post {
                    self.stat(post)?;
                }
            }
        }
        self.separator = Separator::Blank;
        Ok(())
    }

    fn if_stat(&mut self, s: &IfStat) -> PrintResult {
        self.token(s.pos, Token::If)?;
        self.control_clause(false, s.init.as_deref(), Some(&s.cond), None)?;
        self.block(&s.body, true)?;
        if let Some(else_branch) = &s.else_branch {
            self.separator = Separator::Blank;
            self.token(Pos::UNKNOWN, Token::Else)?;
            self.separator = Separator::Blank;
            self.stat(else_branch)?;
        }
        Ok(())
    }

    fn for_stat(&mut self, s: &ForStat) -> PrintResult {
        self.token(s.pos, Token::For)?;
        self.control_clause(true, s.init.as_deref(), s.cond.as_ref(), s.post.as_deref())?;
        self.block(&s.body, true)
    }

    fn case_clause(&mut self, s: &CaseClause) -> PrintResult {
        match &s.expr {
            Some(x) => {
                self.token(s.pos, Token::Case)?;
                self.separator = Separator::Blank;
                self.expr(x)?;
            }
            None => self.token(s.pos, Token::Default)?,
        }
        self.token(s.colon, Token::Colon)?;
        self.opt_semi = true;
        self.indentation += 1;
        self.statement_list(&s.body)?;
        self.dedent();
        self.newlines = 1;
        Ok(())
    }

    fn switch_stat(&mut self, s: &SwitchStat) -> PrintResult {
        self.token(s.pos, Token::Switch)?;
        self.control_clause(false, s.init.as_deref(), s.tag.as_ref(), None)?;
        self.block(&s.body, false)
    }

    fn select_stat(&mut self, s: &SelectStat) -> PrintResult {
        self.token(s.pos, Token::Select)?;
        self.separator = Separator::Blank;
        self.block(&s.body, false)
    }

    fn control_flow_stat(&mut self, s: &ControlFlowStat) -> PrintResult {
        self.token(s.pos, s.tok)?;
        if let Some(label) = &s.label {
            self.separator = Separator::Blank;
            self.html_identifier(label)?;
        }
        Ok(())
    }
}
