//! Syntax tree consumed by the printer
//!
//! Three closed node categories mirror the Go grammar: [`Expr`] (which also
//! covers types), [`Stat`] and [`Decl`]. The tree is read-only input for a print
//! session. Malformed input is represented by the `Bad` variants, which print as
//! placeholders.
//!
//! Expression lists are not a node of their own: `a, b, c` is the left-nested
//! binary expression `(a , b) , c` using [`Token::Comma`], and `key: value` in a
//! composite literal is a binary expression using [`Token::Colon`].

use crate::token::{Comment, Pos, Token};

/// Declaration site of an identifier, supplied by whoever resolved names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObjRef {
    pub id: u32,
    pub decl_pos: Pos,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ident {
    pub pos: Pos,
    pub name: String,
    pub obj: Option<ObjRef>,
}

impl Ident {
    pub fn new(pos: Pos, name: impl Into<String>) -> Self {
        Self {
            pos,
            name: name.into(),
            obj: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Bad(Pos),
    Ident(Ident),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    BasicLit(BasicLit),
    FunctionLit(FunctionLit),
    Group(Group),
    Selector(Selector),
    TypeGuard(TypeGuard),
    Index(Index),
    Slice(SliceExpr),
    Call(Call),
    CompositeLit(CompositeLit),
    Ellipsis(Ellipsis),
    ArrayType(ArrayType),
    StructType(StructType),
    PointerType(PointerType),
    FunctionType(FunctionType),
    InterfaceType(InterfaceType),
    MapType(MapType),
    ChannelType(ChannelType),
}

#[derive(Clone, Debug, PartialEq)]
pub struct BinaryExpr {
    /// Position of the operator.
    pub pos: Pos,
    pub op: Token,
    pub x: Box<Expr>,
    pub y: Box<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnaryExpr {
    pub pos: Pos,
    pub op: Token,
    pub x: Box<Expr>,
}

/// Literal kept verbatim: numbers, runes, strings, `nil`, `true`, `iota`.
#[derive(Clone, Debug, PartialEq)]
pub struct BasicLit {
    pub pos: Pos,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionLit {
    pub pos: Pos,
    pub sig: Signature,
    pub body: Block,
}

/// Explicit parentheses from the source.
#[derive(Clone, Debug, PartialEq)]
pub struct Group {
    pub pos: Pos,
    pub x: Box<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Selector {
    /// Position of the period.
    pub pos: Pos,
    pub x: Box<Expr>,
    pub sel: Ident,
}

/// `x.(T)`, or `x.(type)` in a type switch when `typ` is `None`.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeGuard {
    pub pos: Pos,
    pub x: Box<Expr>,
    pub typ: Option<Box<Expr>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Index {
    /// Position of the opening bracket.
    pub pos: Pos,
    pub x: Box<Expr>,
    pub index: Box<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SliceExpr {
    pub pos: Pos,
    pub x: Box<Expr>,
    pub lo: Option<Box<Expr>>,
    pub hi: Option<Box<Expr>>,
    pub max: Option<Box<Expr>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    /// Position of the opening parenthesis.
    pub pos: Pos,
    pub func: Box<Expr>,
    pub args: Option<Box<Expr>>,
    /// Position of a trailing `...` on the last argument.
    pub ellipsis: Option<Pos>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CompositeLit {
    /// Position of the opening brace.
    pub pos: Pos,
    /// Elided for nested literals such as the elements of `[]T{{1}, {2}}`.
    pub typ: Option<Box<Expr>>,
    pub elts: Option<Box<Expr>>,
    pub end: Pos,
}

/// `...` in an array length, or `...T` for a variadic parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct Ellipsis {
    pub pos: Pos,
    pub elt: Option<Box<Expr>>,
}

/// `[N]T`, or `[]T` when `len` is `None`.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayType {
    pub pos: Pos,
    pub len: Option<Box<Expr>>,
    pub elt: Box<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StructType {
    pub pos: Pos,
    pub fields: Vec<Field>,
    /// Position of the closing brace.
    pub end: Pos,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PointerType {
    pub pos: Pos,
    pub base: Box<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionType {
    pub pos: Pos,
    pub sig: Signature,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InterfaceType {
    pub pos: Pos,
    pub methods: Vec<Field>,
    pub end: Pos,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MapType {
    pub pos: Pos,
    pub key: Box<Expr>,
    pub value: Box<Expr>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Recv,
    Send,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChannelType {
    pub pos: Pos,
    pub dir: ChanDir,
    pub value: Box<Expr>,
}

/// A parameter, result, struct field or interface method.
///
/// Several names may share one type. Only struct fields carry a tag.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub idents: Vec<Ident>,
    pub typ: Expr,
    pub tag: Option<Expr>,
}

impl Field {
    pub fn new(idents: Vec<Ident>, typ: Expr) -> Self {
        Self {
            idents,
            typ,
            tag: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Signature {
    pub params: Vec<Field>,
    pub result: Option<Vec<Field>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    /// Position of the opening brace.
    pub pos: Pos,
    pub list: Vec<Stat>,
    /// Position of the closing brace.
    pub end: Pos,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stat {
    If(IfStat),
    For(ForStat),
    Switch(SwitchStat),
    Select(SelectStat),
    Case(CaseClause),
    ControlFlow(ControlFlowStat),
    Expression(ExpressionStat),
    Declaration(Decl),
    Composite(Block),
    Empty(Pos),
    Bad(Pos),
    Label(LabelDecl),
}

#[derive(Clone, Debug, PartialEq)]
pub struct IfStat {
    pub pos: Pos,
    pub init: Option<Box<Stat>>,
    pub cond: Expr,
    pub body: Block,
    /// Either another `IfStat` or a `Composite` block.
    pub else_branch: Option<Box<Stat>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ForStat {
    pub pos: Pos,
    pub init: Option<Box<Stat>>,
    /// Condition, or the whole `k, v := range x` clause.
    pub cond: Option<Expr>,
    pub post: Option<Box<Stat>>,
    pub body: Block,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SwitchStat {
    pub pos: Pos,
    pub init: Option<Box<Stat>>,
    pub tag: Option<Expr>,
    /// Holds only `Stat::Case` entries.
    pub body: Block,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SelectStat {
    pub pos: Pos,
    pub body: Block,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CaseClause {
    pub pos: Pos,
    /// `None` for `default`.
    pub expr: Option<Expr>,
    pub colon: Pos,
    pub body: Vec<Stat>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ControlFlowStat {
    pub pos: Pos,
    /// One of `break`, `continue`, `goto`, `fallthrough`.
    pub tok: Token,
    pub label: Option<Ident>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExprStatKind {
    Plain,
    Inc,
    Dec,
    Return,
    Go,
    Defer,
}

/// Expression used as a statement. Assignments and sends are binary
/// expressions with the assignment or `<-` operator.
#[derive(Clone, Debug, PartialEq)]
pub struct ExpressionStat {
    /// Position of the keyword or postfix operator.
    pub pos: Pos,
    pub kind: ExprStatKind,
    pub expr: Option<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LabelDecl {
    /// Position of the colon.
    pub pos: Pos,
    pub label: Ident,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Decl {
    Import(ImportDecl),
    Const(ValueDecl),
    Type(TypeDecl),
    Var(ValueDecl),
    Func(FuncDecl),
    List(DeclList),
    Bad(Pos),
}

/// A position of [`Pos::UNKNOWN`] on a single declaration means it is an entry
/// of a [`DeclList`] and prints without its keyword.
#[derive(Clone, Debug, PartialEq)]
pub struct ImportDecl {
    pub pos: Pos,
    pub name: Option<Ident>,
    pub path: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ValueDecl {
    pub pos: Pos,
    pub idents: Vec<Ident>,
    pub typ: Option<Expr>,
    pub vals: Option<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeDecl {
    pub pos: Pos,
    pub name: Ident,
    pub type_params: Vec<Field>,
    pub alias: bool,
    pub typ: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FuncDecl {
    pub pos: Pos,
    pub recv: Option<Field>,
    pub name: Ident,
    pub type_params: Vec<Field>,
    pub sig: Signature,
    pub body: Option<Block>,
}

/// Parenthesized group `const ( ... )`, `var`, `type` or `import`.
#[derive(Clone, Debug, PartialEq)]
pub struct DeclList {
    pub pos: Pos,
    pub tok: Token,
    pub list: Vec<Decl>,
    /// Position of the closing parenthesis.
    pub end: Pos,
}

/// A source file: package clause, declarations, and the position-sorted
/// comment stream (including newline markers).
#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    pub pos: Pos,
    pub name: Ident,
    pub decls: Vec<Decl>,
    pub comments: Vec<Comment>,
}

impl Expr {
    pub fn ident(pos: Pos, name: impl Into<String>) -> Expr {
        Expr::Ident(Ident::new(pos, name))
    }

    pub fn lit(pos: Pos, value: impl Into<String>) -> Expr {
        Expr::BasicLit(BasicLit {
            pos,
            value: value.into(),
        })
    }

    pub fn binary(pos: Pos, op: Token, x: Expr, y: Expr) -> Expr {
        Expr::Binary(BinaryExpr {
            pos,
            op,
            x: Box::new(x),
            y: Box::new(y),
        })
    }

    pub fn unary(pos: Pos, op: Token, x: Expr) -> Expr {
        Expr::Unary(UnaryExpr {
            pos,
            op,
            x: Box::new(x),
        })
    }

    /// Folds `first` and the `(comma position, element)` pairs into a
    /// left-nested comma expression.
    pub fn list(first: Expr, rest: impl IntoIterator<Item = (Pos, Expr)>) -> Expr {
        rest.into_iter()
            .fold(first, |acc, (comma, next)| Expr::binary(comma, Token::Comma, acc, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_nests_to_the_left() {
        let list = Expr::list(
            Expr::ident(Pos(1), "a"),
            [
                (Pos(2), Expr::ident(Pos(4), "b")),
                (Pos(5), Expr::ident(Pos(7), "c")),
            ],
        );
        let Expr::Binary(outer) = list else {
            panic!("expected a comma expression");
        };
        assert_eq!(outer.pos, Pos(5));
        assert!(matches!(*outer.x, Expr::Binary(ref inner) if inner.op == Token::Comma));
        assert!(matches!(*outer.y, Expr::Ident(ref id) if id.name == "c"));
    }

    #[test]
    fn list_of_one_is_the_element() {
        let single = Expr::list(Expr::ident(Pos(1), "a"), []);
        assert_eq!(single, Expr::ident(Pos(1), "a"));
    }
}
