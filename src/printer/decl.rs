use std::io::Write;

use super::{PrintResult, Printer, Separator, State};
use crate::ast::*;
use crate::token::{Pos, Token};

impl<W: Write> Printer<'_, W> {
    pub(crate) fn decl(&mut self, d: &Decl) -> PrintResult {
        match d {
            Decl::Import(d) => self.import_decl(d),
            Decl::Const(d) => self.value_decl(Token::Const, d),
            Decl::Type(d) => self.type_decl(d),
            Decl::Var(d) => self.value_decl(Token::Var, d),
            Decl::Func(d) => self.func_decl(d),
            Decl::List(d) => self.decl_list(d),
            Decl::Bad(pos) => self.string(*pos, "BadDecl"),
        }
    }

    fn import_decl(&mut self, d: &ImportDecl) -> PrintResult {
        let grouped = d.pos.is_unknown();
        if !grouped {
            self.keyword(d.pos, Token::Import)?;
            self.separator = Separator::Blank;
        }
        match &d.name {
            Some(name) => {
                self.html_identifier(name)?;
                self.separator = if grouped { Separator::Tab } else { Separator::Blank };
            }
            None if grouped => {
                // empty name cell keeps the paths of a group aligned; it sits
                // at the path so the comments in front of it come first
                let at = match &d.path {
                    Expr::BasicLit(lit) => lit.pos,
                    _ => Pos::UNKNOWN,
                };
                self.string(at, "")?;
                self.separator = Separator::Tab;
            }
            None => {}
        }
        match &d.path {
            Expr::BasicLit(lit) if lit.value.starts_with(['"', '`']) => {
                self.html_package_name(lit.pos, &lit.value)?;
            }
            // only for odd imports such as `import "a" "b"`
            path => self.expr(path)?,
        }
        self.newlines = 2;
        Ok(())
    }

    fn value_decl(&mut self, keyword: Token, d: &ValueDecl) -> PrintResult {
        if !d.pos.is_unknown() {
            self.keyword(d.pos, keyword)?;
            self.separator = Separator::Blank;
        }
        self.idents(&d.idents)?;
        if let Some(typ) = &d.typ {
            self.separator = Separator::Blank;
            self.expr(typ)?;
        }
        if let Some(vals) = &d.vals {
            self.separator = Separator::Tab;
            self.token(Pos::UNKNOWN, Token::Assign)?;
            self.separator = Separator::Blank;
            self.expr(vals)?;
        }
        self.newlines = 2;
        Ok(())
    }

    fn type_decl(&mut self, d: &TypeDecl) -> PrintResult {
        if !d.pos.is_unknown() {
            self.keyword(d.pos, Token::Type)?;
            self.separator = Separator::Blank;
        }
        self.html_identifier(&d.name)?;
        if !d.type_params.is_empty() {
            self.parameters(&d.type_params, Token::LBrack, Token::RBrack)?;
        }
        self.separator = Separator::Blank;
        if d.alias {
            self.token(Pos::UNKNOWN, Token::Assign)?;
            self.separator = Separator::Blank;
        }
        self.expr(&d.typ)?;
        self.newlines = 2;
        Ok(())
    }

    fn func_decl(&mut self, d: &FuncDecl) -> PrintResult {
        self.keyword(d.pos, Token::Func)?;
        self.separator = Separator::Blank;
        if let Some(recv) = &d.recv {
            self.token(Pos::UNKNOWN, Token::LParen)?;
            if let Some(name) = recv.idents.first() {
                self.html_identifier(name)?;
                self.separator = Separator::Blank;
            }
            self.expr(&recv.typ)?;
            self.token(Pos::UNKNOWN, Token::RParen)?;
            self.separator = Separator::Blank;
        }
        self.html_identifier(&d.name)?;
        if !d.type_params.is_empty() {
            self.parameters(&d.type_params, Token::LBrack, Token::RBrack)?;
        }
        self.signature(&d.sig)?;
        if let Some(body) = &d.body {
            self.separator = Separator::Blank;
            self.block(body, true)?;
        }
        self.newlines = 2;
        Ok(())
    }

    fn decl_list(&mut self, d: &DeclList) -> PrintResult {
        self.keyword(d.pos, d.tok)?;
        self.separator = Separator::Blank;

        self.state = State::OpeningScope;
        self.token(Pos::UNKNOWN, Token::LParen)?;
        if !d.list.is_empty() {
            self.newlines = 1;
            for (i, entry) in d.list.iter().enumerate() {
                if i > 0 {
                    self.separator = Separator::Semicolon;
                }
                self.decl(entry)?;
                self.newlines = 1;
            }
        }
        self.state = State::ClosingScope;
        self.token(d.end, Token::RParen)?;
        self.opt_semi = true;
        self.newlines = 2;
        Ok(())
    }

    pub(crate) fn program(&mut self, p: &Program) -> PrintResult {
        self.token(p.pos, Token::Package)?;
        self.separator = Separator::Blank;
        self.html_identifier(&p.name)?;
        self.newlines = 1;
        for d in &p.decls {
            self.decl(d)?;
        }
        self.newlines = 1;
        Ok(())
    }
}
