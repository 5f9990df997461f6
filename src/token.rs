//! Positions, tokens and comments
//!
//! The printer never looks at source text directly. Everything it knows about
//! the original layout arrives as byte positions on tokens and as an ordered
//! stream of [`Comment`]s, where a comment whose text is a single `"\n"` marks a
//! newline seen in the source.

use std::fmt;

/// Byte offset into the original source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pos(pub u32);

impl Pos {
    /// Position of a synthetic token; the printer substitutes its own estimate.
    pub const UNKNOWN: Pos = Pos(0);
    /// Smallest synthetic position, below any position of a real token.
    pub const SYNTHETIC: Pos = Pos(1);
    /// Position past every comment, used once no comments remain.
    pub const INFINITY: Pos = Pos(1 << 30);

    pub fn new(offset: usize) -> Self {
        Pos(offset.min(Self::INFINITY.0 as usize - 1) as u32)
    }

    pub fn is_unknown(self) -> bool {
        self == Self::UNKNOWN
    }

    /// Rough position of the byte following `len` bytes of text at `self`.
    pub fn advance(self, len: usize) -> Pos {
        Pos(self.0.saturating_add(len as u32).min(Self::INFINITY.0))
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Precedence context of a full expression; nothing is parenthesized.
pub const LOWEST_PREC: i32 = -1;
/// Precedence of every unary operator.
pub const UNARY_PREC: i32 = 7;
/// Precedence of primary expressions (operands of selectors, calls, indexes).
pub const HIGHEST_PREC: i32 = 8;

/// Keywords, operators and delimiters the printer emits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Token {
    // operators
    Add,
    Sub,
    Mul,
    Quo,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    AndNot,
    AddAssign,
    SubAssign,
    MulAssign,
    QuoAssign,
    RemAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    ShlAssign,
    ShrAssign,
    AndNotAssign,
    LAnd,
    LOr,
    Arrow,
    Inc,
    Dec,
    Eql,
    Lss,
    Gtr,
    Assign,
    Not,
    Neq,
    Leq,
    Geq,
    Define,
    Ellipsis,
    Tilde,

    // delimiters
    LParen,
    LBrack,
    LBrace,
    Comma,
    Period,
    RParen,
    RBrack,
    RBrace,
    Semicolon,
    Colon,

    // keywords
    Break,
    Case,
    Chan,
    Const,
    Continue,
    Default,
    Defer,
    Else,
    Fallthrough,
    For,
    Func,
    Go,
    Goto,
    If,
    Import,
    Interface,
    Map,
    Package,
    Range,
    Return,
    Select,
    Struct,
    Switch,
    Type,
    Var,
}

impl Token {
    pub fn as_str(self) -> &'static str {
        use Token::*;
        match self {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Quo => "/",
            Rem => "%",
            And => "&",
            Or => "|",
            Xor => "^",
            Shl => "<<",
            Shr => ">>",
            AndNot => "&^",
            AddAssign => "+=",
            SubAssign => "-=",
            MulAssign => "*=",
            QuoAssign => "/=",
            RemAssign => "%=",
            AndAssign => "&=",
            OrAssign => "|=",
            XorAssign => "^=",
            ShlAssign => "<<=",
            ShrAssign => ">>=",
            AndNotAssign => "&^=",
            LAnd => "&&",
            LOr => "||",
            Arrow => "<-",
            Inc => "++",
            Dec => "--",
            Eql => "==",
            Lss => "<",
            Gtr => ">",
            Assign => "=",
            Not => "!",
            Neq => "!=",
            Leq => "<=",
            Geq => ">=",
            Define => ":=",
            Ellipsis => "...",
            Tilde => "~",
            LParen => "(",
            LBrack => "[",
            LBrace => "{",
            Comma => ",",
            Period => ".",
            RParen => ")",
            RBrack => "]",
            RBrace => "}",
            Semicolon => ";",
            Colon => ":",
            Break => "break",
            Case => "case",
            Chan => "chan",
            Const => "const",
            Continue => "continue",
            Default => "default",
            Defer => "defer",
            Else => "else",
            Fallthrough => "fallthrough",
            For => "for",
            Func => "func",
            Go => "go",
            Goto => "goto",
            If => "if",
            Import => "import",
            Interface => "interface",
            Map => "map",
            Package => "package",
            Range => "range",
            Return => "return",
            Select => "select",
            Struct => "struct",
            Switch => "switch",
            Type => "type",
            Var => "var",
        }
    }

    /// Binary precedence of the token, or [`LOWEST_PREC`] for tokens that are
    /// not binary operators (assignments and the like).
    pub fn precedence(self) -> i32 {
        use Token::*;
        match self {
            Colon => 0,
            LOr => 1,
            LAnd => 2,
            Arrow => 3,
            Eql | Neq | Lss | Leq | Gtr | Geq => 4,
            Add | Sub | Or | Xor => 5,
            Mul | Quo | Rem | Shl | Shr | And | AndNot => 6,
            _ => LOWEST_PREC,
        }
    }

    /// Looks up an operator or delimiter by its spelling.
    pub fn from_operator(s: &str) -> Option<Token> {
        use Token::*;
        let tok = match s {
            "+" => Add,
            "-" => Sub,
            "*" => Mul,
            "/" => Quo,
            "%" => Rem,
            "&" => And,
            "|" => Or,
            "^" => Xor,
            "<<" => Shl,
            ">>" => Shr,
            "&^" => AndNot,
            "+=" => AddAssign,
            "-=" => SubAssign,
            "*=" => MulAssign,
            "/=" => QuoAssign,
            "%=" => RemAssign,
            "&=" => AndAssign,
            "|=" => OrAssign,
            "^=" => XorAssign,
            "<<=" => ShlAssign,
            ">>=" => ShrAssign,
            "&^=" => AndNotAssign,
            "&&" => LAnd,
            "||" => LOr,
            "<-" => Arrow,
            "++" => Inc,
            "--" => Dec,
            "==" => Eql,
            "<" => Lss,
            ">" => Gtr,
            "=" => Assign,
            "!" => Not,
            "!=" => Neq,
            "<=" => Leq,
            ">=" => Geq,
            ":=" => Define,
            "..." => Ellipsis,
            "~" => Tilde,
            "," => Comma,
            ":" => Colon,
            _ => return None,
        };
        Some(tok)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommentKind {
    /// Synthetic marker for a newline in the source.
    Newline,
    /// `//`-style, runs to the end of the line.
    Line,
    /// `/*`-style, may sit in the middle of a line.
    Block,
}

/// A comment or newline marker at a source position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Comment {
    pub pos: Pos,
    pub text: String,
}

impl Comment {
    pub fn new(pos: Pos, text: impl Into<String>) -> Self {
        Self {
            pos,
            text: text.into(),
        }
    }

    pub fn newline(pos: Pos) -> Self {
        Self::new(pos, "\n")
    }

    pub fn kind(&self) -> CommentKind {
        if self.text == "\n" {
            CommentKind::Newline
        } else if self.text.starts_with("//") {
            CommentKind::Line
        } else {
            CommentKind::Block
        }
    }
}
