use std::io::Write;

use super::{PrintResult, Printer, Separator, State};
use crate::ast::*;
use crate::token::{HIGHEST_PREC, LOWEST_PREC, Pos, Token, UNARY_PREC};

/// Lowest precedence printed without blanks when nested in a looser operator.
const COMPACT_PREC: i32 = 5;

impl<W: Write> Printer<'_, W> {
    pub(crate) fn expr(&mut self, x: &Expr) -> PrintResult {
        self.expr1(x, LOWEST_PREC)
    }

    /// Prints `x` in a context of precedence `prec`.
    pub(crate) fn expr1(&mut self, x: &Expr, prec: i32) -> PrintResult {
        let saved = std::mem::replace(&mut self.prec, prec);
        let result = match x {
            Expr::Bad(pos) => self.string(*pos, "BadExpr"),
            Expr::Ident(x) => self.html_identifier(x),
            Expr::Binary(x) => self.binary_expr(x),
            Expr::Unary(x) => self.unary_expr(x),
            Expr::BasicLit(x) => self.string(x.pos, &x.value),
            Expr::FunctionLit(x) => self.function_lit(x),
            Expr::Group(x) => self.group(x),
            Expr::Selector(x) => self.selector(x),
            Expr::TypeGuard(x) => self.type_guard(x),
            Expr::Index(x) => self.index(x),
            Expr::Slice(x) => self.slice(x),
            Expr::Call(x) => self.call(x),
            Expr::CompositeLit(x) => self.composite_lit(x),
            Expr::Ellipsis(x) => self.ellipsis(x),
            Expr::ArrayType(x) => self.array_type(x),
            Expr::StructType(x) => self.struct_type(x),
            Expr::PointerType(x) => self.pointer_type(x),
            Expr::FunctionType(x) => self.function_type(x),
            Expr::InterfaceType(x) => self.interface_type(x),
            Expr::MapType(x) => self.map_type(x),
            Expr::ChannelType(x) => self.channel_type(x),
        };
        self.prec = saved;
        result
    }

    fn binary_expr(&mut self, x: &BinaryExpr) -> PrintResult {
        if x.op == Token::Comma {
            // lists space differently from operators
            self.expr(&x.x)?;
            self.token(x.pos, Token::Comma)?;
            self.separator = Separator::Blank;
            self.state = State::InsideList;
            return self.expr(&x.y);
        }

        let prec = x.op.precedence();
        let parens = prec < self.prec;
        // `a + b*c`; never before a unary operand, `a - -b` must not become `a--b`
        let compact = prec >= COMPACT_PREC
            && self.prec >= 0
            && prec > self.prec
            && !matches!(*x.y, Expr::Unary(_));

        // keys and values of a composite literal are full expressions
        let operand_prec = if x.op == Token::Colon { LOWEST_PREC } else { prec };

        if parens {
            self.token(Pos::UNKNOWN, Token::LParen)?;
        }
        self.expr1(&x.x, operand_prec)?;
        if !compact && x.op != Token::Colon {
            self.separator = Separator::Blank;
        }
        self.token(x.pos, x.op)?;
        if !compact {
            self.separator = Separator::Blank;
        }
        self.expr1(&x.y, operand_prec)?;
        if parens {
            self.token(Pos::UNKNOWN, Token::RParen)?;
        }
        Ok(())
    }

    fn unary_expr(&mut self, x: &UnaryExpr) -> PrintResult {
        let parens = UNARY_PREC < self.prec;
        if parens {
            self.token(Pos::UNKNOWN, Token::LParen)?;
        }
        self.token(x.pos, x.op)?;
        let fused = match &*x.x {
            Expr::Unary(inner) => matches!(
                (x.op, inner.op),
                (Token::Sub, Token::Sub)
                    | (Token::Add, Token::Add)
                    | (Token::And, Token::And)
                    | (Token::And, Token::Xor)
            ),
            _ => false,
        };
        if x.op == Token::Range || fused {
            self.separator = Separator::Blank;
        }
        self.expr1(&x.x, UNARY_PREC)?;
        if parens {
            self.token(Pos::UNKNOWN, Token::RParen)?;
        }
        Ok(())
    }

    fn function_lit(&mut self, x: &FunctionLit) -> PrintResult {
        self.token(x.pos, Token::Func)?;
        self.signature(&x.sig)?;
        self.separator = Separator::Blank;
        self.block(&x.body, true)?;
        self.newlines = 0;
        Ok(())
    }

    fn group(&mut self, x: &Group) -> PrintResult {
        self.token(x.pos, Token::LParen)?;
        self.expr(&x.x)?;
        self.token(Pos::UNKNOWN, Token::RParen)
    }

    fn selector(&mut self, x: &Selector) -> PrintResult {
        self.expr1(&x.x, HIGHEST_PREC)?;
        self.token(x.pos, Token::Period)?;
        self.html_identifier(&x.sel)
    }

    fn type_guard(&mut self, x: &TypeGuard) -> PrintResult {
        self.expr1(&x.x, HIGHEST_PREC)?;
        self.token(x.pos, Token::Period)?;
        self.token(Pos::UNKNOWN, Token::LParen)?;
        match &x.typ {
            Some(typ) => self.expr(typ)?,
            None => self.token(Pos::UNKNOWN, Token::Type)?,
        }
        self.token(Pos::UNKNOWN, Token::RParen)
    }

    fn index(&mut self, x: &Index) -> PrintResult {
        self.expr1(&x.x, HIGHEST_PREC)?;
        self.token(x.pos, Token::LBrack)?;
        self.expr1(&x.index, 0)?;
        self.token(Pos::UNKNOWN, Token::RBrack)
    }

    fn slice(&mut self, x: &SliceExpr) -> PrintResult {
        self.expr1(&x.x, HIGHEST_PREC)?;
        self.token(x.pos, Token::LBrack)?;
        if let Some(lo) = &x.lo {
            self.expr1(lo, 0)?;
        }
        self.token(Pos::UNKNOWN, Token::Colon)?;
        if let Some(hi) = &x.hi {
            self.expr1(hi, 0)?;
        }
        if let Some(max) = &x.max {
            self.token(Pos::UNKNOWN, Token::Colon)?;
            self.expr1(max, 0)?;
        }
        self.token(Pos::UNKNOWN, Token::RBrack)
    }

    fn call(&mut self, x: &Call) -> PrintResult {
        self.expr1(&x.func, HIGHEST_PREC)?;
        self.token(x.pos, Token::LParen)?;
        if let Some(args) = &x.args {
            self.expr(args)?;
        }
        if let Some(pos) = x.ellipsis {
            self.token(pos, Token::Ellipsis)?;
        }
        self.token(Pos::UNKNOWN, Token::RParen)
    }

    fn composite_lit(&mut self, x: &CompositeLit) -> PrintResult {
        if let Some(typ) = &x.typ {
            self.expr1(typ, HIGHEST_PREC)?;
        }
        let Some(elts) = &x.elts else {
            self.token(x.pos, Token::LBrace)?;
            return self.token(x.end, Token::RBrace);
        };
        // elements continued on later lines are indented; the brace itself
        // keeps the state of an enclosing list
        self.token(x.pos, Token::LBrace)?;
        self.level += 1;
        self.indentation += 1;
        self.expr(elts)?;
        if self.line_break_ahead(x.end) {
            // a closing brace on a line of its own needs a trailing comma
            self.separator = Separator::Comma;
            self.newlines = self.newlines.max(1);
        }
        self.state = State::ClosingScope;
        self.token(x.end, Token::RBrace)
    }

    fn ellipsis(&mut self, x: &Ellipsis) -> PrintResult {
        self.token(x.pos, Token::Ellipsis)?;
        if let Some(elt) = &x.elt {
            self.expr(elt)?;
        }
        Ok(())
    }

    fn array_type(&mut self, x: &ArrayType) -> PrintResult {
        self.token(x.pos, Token::LBrack)?;
        if let Some(len) = &x.len {
            self.expr(len)?;
        }
        self.token(Pos::UNKNOWN, Token::RBrack)?;
        self.expr(&x.elt)
    }

    fn struct_type(&mut self, x: &StructType) -> PrintResult {
        self.token(x.pos, Token::Struct)?;
        self.fields(&x.fields, x.end, false)
    }

    fn pointer_type(&mut self, x: &PointerType) -> PrintResult {
        self.token(x.pos, Token::Mul)?;
        self.expr(&x.base)
    }

    fn function_type(&mut self, x: &FunctionType) -> PrintResult {
        self.token(x.pos, Token::Func)?;
        self.signature(&x.sig)
    }

    fn interface_type(&mut self, x: &InterfaceType) -> PrintResult {
        self.token(x.pos, Token::Interface)?;
        self.fields(&x.methods, x.end, true)
    }

    fn map_type(&mut self, x: &MapType) -> PrintResult {
        self.token(x.pos, Token::Map)?;
        self.token(Pos::UNKNOWN, Token::LBrack)?;
        self.expr(&x.key)?;
        self.token(Pos::UNKNOWN, Token::RBrack)?;
        self.expr(&x.value)
    }

    fn channel_type(&mut self, x: &ChannelType) -> PrintResult {
        match x.dir {
            ChanDir::Both => self.token(x.pos, Token::Chan)?,
            ChanDir::Recv => {
                self.token(x.pos, Token::Arrow)?;
                self.token(Pos::UNKNOWN, Token::Chan)?;
            }
            ChanDir::Send => {
                self.token(x.pos, Token::Chan)?;
                self.token(Pos::UNKNOWN, Token::Arrow)?;
            }
        }
        self.separator = Separator::Blank;
        self.expr(&x.value)
    }

    pub(crate) fn idents(&mut self, list: &[Ident]) -> PrintResult {
        for (i, x) in list.iter().enumerate() {
            if i > 0 {
                self.token(Pos::UNKNOWN, Token::Comma)?;
                self.separator = Separator::Blank;
                self.state = State::InsideList;
            }
            self.html_identifier(x)?;
        }
        Ok(())
    }

    /// Parameter, result or type parameter list between `open` and `close`.
    pub(crate) fn parameters(&mut self, list: &[Field], open: Token, close: Token) -> PrintResult {
        self.token(Pos::UNKNOWN, open)?;
        for (i, par) in list.iter().enumerate() {
            if i > 0 {
                self.separator = Separator::Comma;
            }
            if !par.idents.is_empty() {
                self.idents(&par.idents)?;
                self.separator = Separator::Blank;
            }
            self.expr(&par.typ)?;
        }
        self.token(Pos::UNKNOWN, close)
    }

    pub(crate) fn signature(&mut self, sig: &Signature) -> PrintResult {
        self.parameters(&sig.params, Token::LParen, Token::RParen)?;
        let Some(result) = &sig.result else {
            return Ok(());
        };
        self.separator = Separator::Blank;
        if let [single] = result.as_slice() {
            // a lone unnamed result needs no parentheses, unless it is a
            // function type whose own result would become ambiguous
            if single.idents.is_empty() && !matches!(single.typ, Expr::FunctionType(_)) {
                return self.expr(&single.typ);
            }
        }
        self.parameters(result, Token::LParen, Token::RParen)
    }

    /// Body of a struct or interface type.
    fn fields(&mut self, list: &[Field], end: Pos, is_interface: bool) -> PrintResult {
        self.state = State::OpeningScope;
        self.separator = Separator::Blank;
        self.token(Pos::UNKNOWN, Token::LBrace)?;

        if !list.is_empty() {
            self.newlines = 1;
            for (i, field) in list.iter().enumerate() {
                if i > 0 {
                    self.separator = Separator::Semicolon;
                    self.newlines = 1;
                }
                let method = match &field.typ {
                    Expr::FunctionType(f) if is_interface => Some(&f.sig),
                    _ => None,
                };
                if !field.idents.is_empty() {
                    self.idents(&field.idents)?;
                    if method.is_none() {
                        self.separator = Separator::Tab;
                    }
                }
                match method {
                    Some(sig) => self.signature(sig)?,
                    None => self.expr(&field.typ)?,
                }
                if let (Some(tag), false) = (&field.tag, is_interface) {
                    self.separator = Separator::Tab;
                    self.expr(tag)?;
                }
            }
            self.newlines = 1;
        }

        self.state = State::ClosingScope;
        self.token(end, Token::RBrace)?;
        self.opt_semi = true;
        Ok(())
    }
}
