//! Lowering of the tree-sitter concrete tree into the printer's syntax tree
//!
//! Besides the tree itself this produces the comment stream the printer
//! interleaves with the tokens: every comment node, and a newline marker for
//! every line break of the source that is not inside a comment or a string
//! literal.
//!
//! Package-level names (functions, types, constants and variables) receive an
//! object id in a first pass. Identifiers spelled like one of them refer to it,
//! which is all the printer needs for HTML cross references.
//!
//! Syntax errors do not abort lowering. `ERROR` nodes turn into the `Bad`
//! variants and are reported with a warning.

use std::collections::HashMap;
use std::ops::Range;

use anyhow::{Result, bail};
use log::warn;
use tree_sitter::{Node, Tree};

use crate::ast::*;
use crate::token::{Comment, Pos, Token};

/// Converts a parsed Go source file into a [`Program`].
pub fn lower(tree: &Tree, source: &str) -> Result<Program> {
    let root = tree.root_node();
    let mut lowerer = Lowerer {
        src: source,
        objects: HashMap::new(),
    };
    lowerer.collect_objects(root);
    lowerer.program(root)
}

fn pos(node: Node) -> Pos {
    Pos::new(node.start_byte())
}

/// Position of the last byte of `node`, its closing delimiter.
fn last(node: Node) -> Pos {
    Pos::new(node.end_byte().saturating_sub(1))
}

fn is_comment(node: Node) -> bool {
    node.kind() == "comment"
}

/// Named children, without comments.
fn named(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|n| !is_comment(*n))
        .collect()
}

/// All children, without comments.
fn children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.children(&mut cursor).filter(|n| !is_comment(*n)).collect()
}

fn field_all<'t>(node: Node<'t>, name: &str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children_by_field_name(name, &mut cursor).collect()
}

/// First anonymous child spelled `kind`.
fn punct<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    children(node)
        .into_iter()
        .find(|n| !n.is_named() && n.kind() == kind)
}

/// Statement list of a block or case clause; newer grammars wrap it in a
/// `statement_list` node.
fn statements(nodes: Vec<Node>) -> Vec<Node> {
    nodes
        .into_iter()
        .flat_map(|n| {
            if n.kind() == "statement_list" {
                named(n)
            } else {
                vec![n]
            }
        })
        .collect()
}

struct Lowerer<'s> {
    src: &'s str,
    objects: HashMap<String, ObjRef>,
}

impl<'s> Lowerer<'s> {
    fn text(&self, node: Node) -> &'s str {
        self.src.get(node.byte_range()).unwrap_or("")
    }

    fn warn_error(&self, node: Node) {
        let at = node.start_position();
        warn!(
            "malformed or unsupported {} at {}:{}: {:?}",
            node.kind(),
            at.row + 1,
            at.column + 1,
            self.text(node).lines().next().unwrap_or("")
        );
    }

    // ---- objects --------------------------------------------------------

    fn collect_objects(&mut self, root: Node) {
        let mut names = Vec::new();
        for decl in named(root) {
            match decl.kind() {
                "function_declaration" => names.extend(decl.child_by_field_name("name")),
                "type_declaration" => {
                    for spec in named(decl) {
                        names.extend(spec.child_by_field_name("name"));
                    }
                }
                "const_declaration" | "var_declaration" => {
                    for spec in value_specs(decl) {
                        names.extend(field_all(spec, "name"));
                    }
                }
                _ => {}
            }
        }
        for name in names {
            let text = self.text(name);
            if text == "_" || self.objects.contains_key(text) {
                continue;
            }
            let id = self.objects.len() as u32 + 1;
            self.objects.insert(
                text.to_string(),
                ObjRef {
                    id,
                    decl_pos: pos(name),
                },
            );
        }
    }

    fn ident(&self, node: Node) -> Ident {
        let name = self.text(node);
        let obj = match node.kind() {
            "identifier" | "type_identifier" => self.objects.get(name).copied(),
            _ => None,
        };
        Ident {
            pos: pos(node),
            name: name.to_string(),
            obj,
        }
    }

    fn idents(&self, nodes: Vec<Node>) -> Vec<Ident> {
        nodes.into_iter().map(|n| self.ident(n)).collect()
    }

    // ---- comments -------------------------------------------------------

    fn comments(&self, root: Node) -> Vec<Comment> {
        let mut comments = Vec::new();
        let mut opaque = Vec::new();
        self.scan_opaque(root, &mut comments, &mut opaque);

        let mut ranges = opaque.iter().peekable();
        for (i, byte) in self.src.bytes().enumerate() {
            while ranges.peek().is_some_and(|r| r.end <= i) {
                ranges.next();
            }
            if byte == b'\n' && !ranges.peek().is_some_and(|r| r.contains(&i)) {
                comments.push(Comment::newline(Pos::new(i)));
            }
        }
        comments.sort_by_key(|c| c.pos);
        comments
    }

    /// Collects comments and the byte ranges whose newlines are text, not
    /// layout: comments and string literals. Ranges come out in source order.
    fn scan_opaque(&self, node: Node, comments: &mut Vec<Comment>, opaque: &mut Vec<Range<usize>>) {
        match node.kind() {
            "comment" => {
                let text = self.text(node).trim_end_matches(['\r', '\n']);
                comments.push(Comment::new(pos(node), text));
                opaque.push(node.byte_range());
            }
            "raw_string_literal" | "interpreted_string_literal" | "rune_literal" => {
                opaque.push(node.byte_range());
            }
            _ => {
                let mut cursor = node.walk();
                for child in node.children(&mut cursor) {
                    self.scan_opaque(child, comments, opaque);
                }
            }
        }
    }

    // ---- declarations ---------------------------------------------------

    fn program(&self, root: Node) -> Result<Program> {
        let mut package = None;
        let mut decls = Vec::new();
        for node in named(root) {
            match node.kind() {
                "package_clause" => {
                    let Some(name) = named(node).into_iter().next() else {
                        bail!("package clause without a name");
                    };
                    package = Some((pos(node), self.ident(name)));
                }
                _ => decls.push(self.decl(node)),
            }
        }
        let Some((pos, name)) = package else {
            bail!("missing package clause");
        };
        Ok(Program {
            pos,
            name,
            decls,
            comments: self.comments(root),
        })
    }

    fn decl(&self, node: Node) -> Decl {
        match node.kind() {
            "import_declaration" => self.import_decl(node),
            "const_declaration" => self.value_decls(node, Token::Const),
            "var_declaration" => self.value_decls(node, Token::Var),
            "type_declaration" => self.type_decls(node),
            "function_declaration" | "method_declaration" => self.func_decl(node),
            _ => {
                self.warn_error(node);
                Decl::Bad(pos(node))
            }
        }
    }

    /// `import`, `const`, `var` or `type` followed by either a single spec or
    /// a parenthesized group of them.
    fn group(&self, node: Node, tok: Token, specs: Vec<Node>, f: impl Fn(Pos, Node) -> Decl) -> Decl {
        let keyword = pos(node);
        let open = punct(node, "(").or_else(|| {
            named(node)
                .into_iter()
                .find_map(|n| punct(n, "(").filter(|_| n.kind().ends_with("_list")))
        });
        match open {
            None if specs.len() == 1 => f(keyword, specs[0]),
            _ => {
                let close = node.end_byte().saturating_sub(1);
                Decl::List(DeclList {
                    pos: keyword,
                    tok,
                    list: specs.into_iter().map(|s| f(Pos::UNKNOWN, s)).collect(),
                    end: Pos::new(close),
                })
            }
        }
    }

    fn import_decl(&self, node: Node) -> Decl {
        let specs = named(node)
            .into_iter()
            .flat_map(|n| match n.kind() {
                "import_spec_list" => named(n),
                _ => vec![n],
            })
            .collect();
        self.group(node, Token::Import, specs, |keyword, spec| {
            if spec.kind() != "import_spec" {
                self.warn_error(spec);
                return Decl::Bad(pos(spec));
            }
            let path = match spec.child_by_field_name("path") {
                Some(path) => Expr::lit(pos(path), self.text(path)),
                None => Expr::Bad(pos(spec)),
            };
            Decl::Import(ImportDecl {
                pos: keyword,
                name: spec.child_by_field_name("name").map(|n| self.ident(n)),
                path,
            })
        })
    }

    fn value_decls(&self, node: Node, tok: Token) -> Decl {
        let specs = value_specs(node);
        self.group(node, tok, specs, |keyword, spec| {
            let decl = ValueDecl {
                pos: keyword,
                idents: self.idents(field_all(spec, "name")),
                typ: spec.child_by_field_name("type").map(|t| self.expr(t)),
                vals: spec.child_by_field_name("value").and_then(|v| self.list(v)),
            };
            if tok == Token::Const {
                Decl::Const(decl)
            } else {
                Decl::Var(decl)
            }
        })
    }

    fn type_decls(&self, node: Node) -> Decl {
        let specs = named(node);
        self.group(node, Token::Type, specs, |keyword, spec| {
            let (Some(name), Some(typ)) = (
                spec.child_by_field_name("name"),
                spec.child_by_field_name("type"),
            ) else {
                self.warn_error(spec);
                return Decl::Bad(pos(spec));
            };
            Decl::Type(TypeDecl {
                pos: keyword,
                name: self.ident(name),
                type_params: self.type_params(spec),
                alias: spec.kind() == "type_alias",
                typ: self.expr(typ),
            })
        })
    }

    fn func_decl(&self, node: Node) -> Decl {
        let Some(name) = node.child_by_field_name("name") else {
            self.warn_error(node);
            return Decl::Bad(pos(node));
        };
        let recv = node
            .child_by_field_name("receiver")
            .and_then(|r| self.parameters(r).into_iter().next());
        Decl::Func(FuncDecl {
            pos: pos(node),
            recv,
            name: self.ident(name),
            type_params: self.type_params(node),
            sig: self.signature(node),
            body: node.child_by_field_name("body").map(|b| self.block(b)),
        })
    }

    fn type_params(&self, node: Node) -> Vec<Field> {
        let Some(list) = node.child_by_field_name("type_parameters") else {
            return Vec::new();
        };
        named(list)
            .into_iter()
            .map(|par| {
                let typ = match par.child_by_field_name("type") {
                    Some(t) => self.expr(t),
                    None => Expr::Bad(pos(par)),
                };
                Field::new(self.idents(field_all(par, "name")), typ)
            })
            .collect()
    }

    /// Parameters and result of a function, method, literal or type.
    fn signature(&self, node: Node) -> Signature {
        let params = node
            .child_by_field_name("parameters")
            .map(|p| self.parameters(p))
            .unwrap_or_default();
        let result = node.child_by_field_name("result").and_then(|r| {
            if r.kind() == "parameter_list" {
                Some(self.parameters(r)).filter(|list| !list.is_empty())
            } else {
                Some(vec![Field::new(Vec::new(), self.expr(r))])
            }
        });
        Signature { params, result }
    }

    fn parameters(&self, list: Node) -> Vec<Field> {
        named(list)
            .into_iter()
            .map(|par| {
                let idents = self.idents(field_all(par, "name"));
                let typ = match par.child_by_field_name("type") {
                    Some(t) => self.expr(t),
                    None => Expr::Bad(pos(par)),
                };
                let typ = match punct(par, "...") {
                    Some(dots) => Expr::Ellipsis(Ellipsis {
                        pos: pos(dots),
                        elt: Some(Box::new(typ)),
                    }),
                    None => typ,
                };
                Field::new(idents, typ)
            })
            .collect()
    }

    // ---- statements -----------------------------------------------------

    fn block(&self, node: Node) -> Block {
        let mut list = Vec::new();
        for s in statements(named(node)) {
            self.stat(s, &mut list);
        }
        Block {
            pos: pos(node),
            list,
            end: last(node),
        }
    }

    /// Appends the statement(s) for `node`; a labeled statement yields the
    /// label and the statement it labels.
    fn stat(&self, node: Node, out: &mut Vec<Stat>) {
        let stat = match node.kind() {
            "labeled_statement" => {
                let label = node.child_by_field_name("label");
                let colon = punct(node, ":");
                if let (Some(label), Some(colon)) = (label, colon) {
                    out.push(Stat::Label(LabelDecl {
                        pos: pos(colon),
                        label: self.ident(label),
                    }));
                }
                if let Some(inner) = named(node).into_iter().find(|n| n.kind() != "label_name") {
                    self.stat(inner, out);
                }
                return;
            }
            "expression_statement" => match named(node).into_iter().next() {
                Some(x) => plain(self.expr(x)),
                None => Stat::Bad(pos(node)),
            },
            "send_statement" => plain(self.send(node)),
            "inc_statement" | "dec_statement" => {
                let (kind, op) = if node.kind() == "inc_statement" {
                    (ExprStatKind::Inc, "++")
                } else {
                    (ExprStatKind::Dec, "--")
                };
                Stat::Expression(ExpressionStat {
                    pos: punct(node, op).map_or(last(node), pos),
                    kind,
                    expr: named(node).into_iter().next().map(|x| self.expr(x)),
                })
            }
            "assignment_statement" | "short_var_declaration" => plain(self.assignment(node)),
            "return_statement" | "go_statement" | "defer_statement" => {
                let kind = match node.kind() {
                    "return_statement" => ExprStatKind::Return,
                    "go_statement" => ExprStatKind::Go,
                    _ => ExprStatKind::Defer,
                };
                Stat::Expression(ExpressionStat {
                    pos: pos(node),
                    kind,
                    expr: named(node).into_iter().next().and_then(|x| self.list(x)),
                })
            }
            "break_statement" | "continue_statement" | "goto_statement" | "fallthrough_statement" => {
                let tok = match node.kind() {
                    "break_statement" => Token::Break,
                    "continue_statement" => Token::Continue,
                    "goto_statement" => Token::Goto,
                    _ => Token::Fallthrough,
                };
                Stat::ControlFlow(ControlFlowStat {
                    pos: pos(node),
                    tok,
                    label: named(node).into_iter().next().map(|l| self.ident(l)),
                })
            }
            "if_statement" => self.if_stat(node),
            "for_statement" => self.for_stat(node),
            "expression_switch_statement" | "type_switch_statement" => self.switch_stat(node),
            "select_statement" => Stat::Select(SelectStat {
                pos: pos(node),
                body: self.case_block(node),
            }),
            "block" => Stat::Composite(self.block(node)),
            "empty_statement" => Stat::Empty(pos(node)),
            "const_declaration" | "var_declaration" | "type_declaration" => {
                Stat::Declaration(self.decl(node))
            }
            _ => {
                self.warn_error(node);
                Stat::Bad(pos(node))
            }
        };
        out.push(stat);
    }

    /// A simple statement used as init or post part of a control clause.
    fn simple_stat(&self, node: Option<Node>) -> Option<Box<Stat>> {
        let mut out = Vec::new();
        self.stat(node?, &mut out);
        out.pop().map(Box::new)
    }

    fn send(&self, node: Node) -> Expr {
        let arrow = punct(node, "<-").map_or(Pos::UNKNOWN, pos);
        match (
            node.child_by_field_name("channel"),
            node.child_by_field_name("value"),
        ) {
            (Some(ch), Some(v)) => Expr::binary(arrow, Token::Arrow, self.expr(ch), self.expr(v)),
            _ => Expr::Bad(pos(node)),
        }
    }

    fn assignment(&self, node: Node) -> Expr {
        let op = match node.child_by_field_name("operator") {
            Some(op) => Some(op),
            None => punct(node, ":="),
        };
        let lhs = node.child_by_field_name("left").and_then(|l| self.list(l));
        let rhs = node.child_by_field_name("right").and_then(|r| self.list(r));
        match (op, lhs, rhs) {
            (Some(op), Some(lhs), Some(rhs)) => match Token::from_operator(self.text(op)) {
                Some(tok) => Expr::binary(pos(op), tok, lhs, rhs),
                None => Expr::Bad(pos(node)),
            },
            _ => Expr::Bad(pos(node)),
        }
    }

    fn if_stat(&self, node: Node) -> Stat {
        let cond = match node.child_by_field_name("condition") {
            Some(c) => self.expr(c),
            None => Expr::Bad(pos(node)),
        };
        let body = match node.child_by_field_name("consequence") {
            Some(b) => self.block(b),
            None => empty_block(last(node)),
        };
        let else_branch = node.child_by_field_name("alternative").map(|alt| {
            Box::new(if alt.kind() == "if_statement" {
                self.if_stat(alt)
            } else {
                Stat::Composite(self.block(alt))
            })
        });
        Stat::If(IfStat {
            pos: pos(node),
            init: self.simple_stat(node.child_by_field_name("initializer")),
            cond,
            body,
            else_branch,
        })
    }

    fn for_stat(&self, node: Node) -> Stat {
        let body = match node.child_by_field_name("body") {
            Some(b) => self.block(b),
            None => empty_block(last(node)),
        };
        let header = named(node).into_iter().find(|n| n.kind() != "block");
        let (init, cond, post) = match header {
            None => (None, None, None),
            Some(h) if h.kind() == "for_clause" => (
                self.simple_stat(h.child_by_field_name("initializer")),
                h.child_by_field_name("condition").map(|c| self.expr(c)),
                self.simple_stat(h.child_by_field_name("update")),
            ),
            Some(h) if h.kind() == "range_clause" => (None, Some(self.range(h)), None),
            Some(h) => (None, Some(self.expr(h)), None),
        };
        Stat::For(ForStat {
            pos: pos(node),
            init,
            cond,
            post,
            body,
        })
    }

    /// `k, v := range x` as `(k, v) := (range x)`.
    fn range(&self, node: Node) -> Expr {
        let range = punct(node, "range").map_or(pos(node), pos);
        let x = match node.child_by_field_name("right") {
            Some(r) => self.expr(r),
            None => Expr::Bad(pos(node)),
        };
        let x = Expr::unary(range, Token::Range, x);
        let lhs = node.child_by_field_name("left").and_then(|l| self.list(l));
        let op = punct(node, ":=").or_else(|| punct(node, "="));
        match (lhs, op) {
            (Some(lhs), Some(op)) => match Token::from_operator(self.text(op)) {
                Some(tok) => Expr::binary(pos(op), tok, lhs, x),
                None => Expr::Bad(pos(node)),
            },
            _ => x,
        }
    }

    fn switch_stat(&self, node: Node) -> Stat {
        let value = node.child_by_field_name("value").map(|v| self.expr(v));
        let tag = if node.kind() == "type_switch_statement" {
            let guard = Expr::TypeGuard(TypeGuard {
                pos: punct(node, ".").map_or(Pos::UNKNOWN, pos),
                x: Box::new(value.unwrap_or(Expr::Bad(pos(node)))),
                typ: None,
            });
            let alias = node.child_by_field_name("alias").and_then(|a| self.list(a));
            match (alias, punct(node, ":=")) {
                (Some(alias), Some(op)) => Some(Expr::binary(pos(op), Token::Define, alias, guard)),
                _ => Some(guard),
            }
        } else {
            value
        };
        Stat::Switch(SwitchStat {
            pos: pos(node),
            init: self.simple_stat(node.child_by_field_name("initializer")),
            tag,
            body: self.case_block(node),
        })
    }

    /// The braces and case clauses of a switch or select statement.
    fn case_block(&self, node: Node) -> Block {
        let open = punct(node, "{").map_or(Pos::UNKNOWN, pos);
        let list = named(node)
            .into_iter()
            .filter(|n| n.kind().ends_with("_case") || n.is_error())
            .map(|n| self.case_clause(n))
            .collect();
        Block {
            pos: open,
            list,
            end: last(node),
        }
    }

    fn case_clause(&self, node: Node) -> Stat {
        let Some(colon) = punct(node, ":") else {
            self.warn_error(node);
            return Stat::Bad(pos(node));
        };
        let all = children(node);
        let split = all
            .iter()
            .position(|n| n.id() == colon.id())
            .unwrap_or(all.len());
        let (head, tail) = all.split_at(split);

        let expr = match node.kind() {
            "default_case" => None,
            "communication_case" => node
                .child_by_field_name("communication")
                .map(|c| self.communication(c)),
            "expression_case" => node.child_by_field_name("value").and_then(|v| self.list(v)),
            // type cases list their types directly
            _ => self.comma_list(head),
        };

        let mut body = Vec::new();
        let stats = tail.iter().copied().filter(|n| n.is_named()).collect();
        for s in statements(stats) {
            self.stat(s, &mut body);
        }
        Stat::Case(CaseClause {
            pos: pos(node),
            expr,
            colon: pos(colon),
            body,
        })
    }

    fn communication(&self, node: Node) -> Expr {
        if node.kind() == "send_statement" {
            return self.send(node);
        }
        let Some(right) = node.child_by_field_name("right") else {
            return Expr::Bad(pos(node));
        };
        let rhs = self.expr(right);
        let lhs = node.child_by_field_name("left").and_then(|l| self.list(l));
        let op = punct(node, ":=").or_else(|| punct(node, "="));
        match (lhs, op) {
            (Some(lhs), Some(op)) => match Token::from_operator(self.text(op)) {
                Some(tok) => Expr::binary(pos(op), tok, lhs, rhs),
                None => Expr::Bad(pos(node)),
            },
            _ => rhs,
        }
    }

    // ---- expressions and types ------------------------------------------

    /// Left-nested comma list of the named nodes in `nodes`, using the
    /// positions of the commas between them.
    fn comma_list(&self, nodes: &[Node]) -> Option<Expr> {
        let mut first = None;
        let mut rest = Vec::new();
        let mut comma = Pos::UNKNOWN;
        for &n in nodes {
            if !n.is_named() {
                if n.kind() == "," {
                    comma = pos(n);
                }
                continue;
            }
            let x = self.expr(n);
            if first.is_none() {
                first = Some(x);
            } else {
                rest.push((comma, x));
            }
        }
        first.map(|first| Expr::list(first, rest))
    }

    /// An `expression_list` node, or a single expression where the grammar
    /// allows either.
    fn list(&self, node: Node) -> Option<Expr> {
        match node.kind() {
            "expression_list" => self.comma_list(&children(node)),
            _ => Some(self.expr(node)),
        }
    }

    fn field_expr(&self, node: Node, name: &str) -> Box<Expr> {
        Box::new(match node.child_by_field_name(name) {
            Some(x) => self.expr(x),
            None => Expr::Bad(pos(node)),
        })
    }

    fn expr(&self, node: Node) -> Expr {
        match node.kind() {
            "identifier" | "type_identifier" | "field_identifier" | "package_identifier"
            | "label_name" | "blank_identifier" | "dot" => Expr::Ident(self.ident(node)),
            "int_literal" | "float_literal" | "imaginary_literal" | "rune_literal"
            | "interpreted_string_literal" | "raw_string_literal" | "nil" | "true" | "false"
            | "iota" => Expr::lit(pos(node), self.text(node)),
            "parenthesized_expression" | "parenthesized_type" => Expr::Group(Group {
                pos: pos(node),
                x: Box::new(match named(node).into_iter().next() {
                    Some(x) => self.expr(x),
                    None => Expr::Bad(pos(node)),
                }),
            }),
            "unary_expression" => {
                let op = node
                    .child_by_field_name("operator")
                    .and_then(|op| Token::from_operator(self.text(op)));
                match op {
                    Some(op) => Expr::Unary(UnaryExpr {
                        pos: pos(node),
                        op,
                        x: self.field_expr(node, "operand"),
                    }),
                    None => Expr::Bad(pos(node)),
                }
            }
            "binary_expression" => {
                let op = node.child_by_field_name("operator");
                match op.and_then(|op| Token::from_operator(self.text(op)).map(|t| (op, t))) {
                    Some((op, tok)) => Expr::Binary(BinaryExpr {
                        pos: pos(op),
                        op: tok,
                        x: self.field_expr(node, "left"),
                        y: self.field_expr(node, "right"),
                    }),
                    None => Expr::Bad(pos(node)),
                }
            }
            "selector_expression" => match node.child_by_field_name("field") {
                Some(field) => Expr::Selector(Selector {
                    pos: punct(node, ".").map_or(Pos::UNKNOWN, pos),
                    x: self.field_expr(node, "operand"),
                    sel: self.ident(field),
                }),
                None => Expr::Bad(pos(node)),
            },
            "qualified_type" => match (
                node.child_by_field_name("package"),
                node.child_by_field_name("name"),
            ) {
                (Some(pkg), Some(name)) => Expr::Selector(Selector {
                    pos: punct(node, ".").map_or(Pos::UNKNOWN, pos),
                    x: Box::new(Expr::Ident(self.ident(pkg))),
                    sel: self.ident(name),
                }),
                _ => Expr::Bad(pos(node)),
            },
            "index_expression" => Expr::Index(Index {
                pos: punct(node, "[").map_or(Pos::UNKNOWN, pos),
                x: self.field_expr(node, "operand"),
                index: self.field_expr(node, "index"),
            }),
            "slice_expression" => Expr::Slice(SliceExpr {
                pos: punct(node, "[").map_or(Pos::UNKNOWN, pos),
                x: self.field_expr(node, "operand"),
                lo: node.child_by_field_name("start").map(|x| Box::new(self.expr(x))),
                hi: node.child_by_field_name("end").map(|x| Box::new(self.expr(x))),
                max: node.child_by_field_name("capacity").map(|x| Box::new(self.expr(x))),
            }),
            "call_expression" => self.call(node),
            "type_assertion_expression" => Expr::TypeGuard(TypeGuard {
                pos: punct(node, ".").map_or(Pos::UNKNOWN, pos),
                x: self.field_expr(node, "operand"),
                typ: Some(self.field_expr(node, "type")),
            }),
            "type_conversion_expression" => Expr::Call(Call {
                pos: punct(node, "(").map_or(Pos::UNKNOWN, pos),
                func: self.field_expr(node, "type"),
                args: Some(self.field_expr(node, "operand")),
                ellipsis: None,
            }),
            "type_instantiation_expression" | "generic_type" => self.instantiation(node),
            "composite_literal" => match node.child_by_field_name("body") {
                Some(body) => self.composite(Some(self.field_expr(node, "type")), body),
                None => Expr::Bad(pos(node)),
            },
            "literal_value" => self.composite(None, node),
            "literal_element" => match named(node).into_iter().next() {
                Some(x) => self.expr(x),
                None => Expr::Bad(pos(node)),
            },
            "keyed_element" => {
                let parts = named(node);
                match (parts.first(), parts.get(1)) {
                    (Some(&k), Some(&v)) => Expr::binary(
                        punct(node, ":").map_or(Pos::UNKNOWN, pos),
                        Token::Colon,
                        self.expr(k),
                        self.expr(v),
                    ),
                    _ => Expr::Bad(pos(node)),
                }
            }
            "func_literal" => Expr::FunctionLit(FunctionLit {
                pos: pos(node),
                sig: self.signature(node),
                body: match node.child_by_field_name("body") {
                    Some(b) => self.block(b),
                    None => empty_block(last(node)),
                },
            }),
            "pointer_type" => Expr::PointerType(PointerType {
                pos: pos(node),
                base: Box::new(self.only_child(node)),
            }),
            "array_type" => Expr::ArrayType(ArrayType {
                pos: pos(node),
                len: Some(self.field_expr(node, "length")),
                elt: self.field_expr(node, "element"),
            }),
            "implicit_length_array_type" => Expr::ArrayType(ArrayType {
                pos: pos(node),
                len: Some(Box::new(Expr::Ellipsis(Ellipsis {
                    pos: punct(node, "...").map_or(Pos::UNKNOWN, pos),
                    elt: None,
                }))),
                elt: self.field_expr(node, "element"),
            }),
            "slice_type" => Expr::ArrayType(ArrayType {
                pos: pos(node),
                len: None,
                elt: self.field_expr(node, "element"),
            }),
            "map_type" => Expr::MapType(MapType {
                pos: pos(node),
                key: self.field_expr(node, "key"),
                value: self.field_expr(node, "value"),
            }),
            "channel_type" => {
                let tokens: Vec<_> = children(node)
                    .into_iter()
                    .filter(|n| !n.is_named())
                    .map(|n| n.kind())
                    .collect();
                let dir = match tokens.as_slice() {
                    ["<-", ..] => ChanDir::Recv,
                    [_, "<-", ..] => ChanDir::Send,
                    _ => ChanDir::Both,
                };
                Expr::ChannelType(ChannelType {
                    pos: pos(node),
                    dir,
                    value: self.field_expr(node, "value"),
                })
            }
            "function_type" => Expr::FunctionType(FunctionType {
                pos: pos(node),
                sig: self.signature(node),
            }),
            "struct_type" => {
                let list = named(node).into_iter().next();
                Expr::StructType(StructType {
                    pos: pos(node),
                    fields: list.map(|l| self.struct_fields(l)).unwrap_or_default(),
                    end: last(node),
                })
            }
            "interface_type" => Expr::InterfaceType(InterfaceType {
                pos: pos(node),
                methods: named(node)
                    .into_iter()
                    .map(|elem| self.interface_elem(elem))
                    .collect(),
                end: last(node),
            }),
            "negated_type" => Expr::unary(pos(node), Token::Tilde, self.only_child(node)),
            "type_elem" | "type_constraint" | "constraint_elem" => self.union(node),
            _ => {
                self.warn_error(node);
                Expr::Bad(pos(node))
            }
        }
    }

    fn only_child(&self, node: Node) -> Expr {
        match named(node).into_iter().next() {
            Some(x) => self.expr(x),
            None => Expr::Bad(pos(node)),
        }
    }

    /// `A | B | ~C` in constraints.
    fn union(&self, node: Node) -> Expr {
        let mut terms = named(node).into_iter();
        let Some(first) = terms.next() else {
            return Expr::Bad(pos(node));
        };
        let bars: Vec<_> = children(node)
            .into_iter()
            .filter(|n| n.kind() == "|")
            .map(pos)
            .collect();
        terms.zip(bars).fold(self.expr(first), |acc, (t, bar)| {
            Expr::binary(bar, Token::Or, acc, self.expr(t))
        })
    }

    /// `T[A, B]`, a generic type or an explicit instantiation.
    fn instantiation(&self, node: Node) -> Expr {
        let parts = named(node);
        let Some((&typ, rest)) = parts.split_first() else {
            return Expr::Bad(pos(node));
        };
        let (open, index) = match rest {
            [args] if args.kind() == "type_arguments" => {
                (punct(*args, "["), self.comma_list(&children(*args)))
            }
            _ => {
                let all = children(node);
                let open = all.iter().position(|n| n.kind() == "[").unwrap_or(all.len());
                (all.get(open).copied(), self.comma_list(&all[open..]))
            }
        };
        Expr::Index(Index {
            pos: open.map_or(Pos::UNKNOWN, pos),
            x: Box::new(self.expr(typ)),
            index: Box::new(index.unwrap_or(Expr::Bad(pos(node)))),
        })
    }

    fn call(&self, node: Node) -> Expr {
        let mut func = self.field_expr(node, "function");
        if let Some(targs) = node.child_by_field_name("type_arguments") {
            func = Box::new(Expr::Index(Index {
                pos: punct(targs, "[").map_or(Pos::UNKNOWN, pos),
                x: func,
                index: Box::new(self.comma_list(&children(targs)).unwrap_or(Expr::Bad(pos(targs)))),
            }));
        }
        let Some(args) = node.child_by_field_name("arguments") else {
            return Expr::Bad(pos(node));
        };
        let mut ellipsis = None;
        let items: Vec<_> = children(args)
            .into_iter()
            .map(|n| {
                if n.kind() == "variadic_argument" {
                    ellipsis = punct(n, "...").map(pos);
                    named(n).into_iter().next().unwrap_or(n)
                } else {
                    n
                }
            })
            .collect();
        // older grammars put the dots straight into the argument list
        if let Some(dots) = items.iter().find(|n| n.kind() == "...") {
            ellipsis = Some(pos(*dots));
        }
        Expr::Call(Call {
            pos: pos(args),
            func,
            args: self.comma_list(&items).map(Box::new),
            ellipsis,
        })
    }

    fn composite(&self, typ: Option<Box<Expr>>, body: Node) -> Expr {
        Expr::CompositeLit(CompositeLit {
            pos: pos(body),
            typ,
            elts: self.comma_list(&children(body)).map(Box::new),
            end: last(body),
        })
    }

    fn struct_fields(&self, list: Node) -> Vec<Field> {
        named(list)
            .into_iter()
            .map(|decl| {
                let idents = self.idents(field_all(decl, "name"));
                let mut typ = match decl.child_by_field_name("type") {
                    Some(t) => self.expr(t),
                    None => Expr::Bad(pos(decl)),
                };
                if idents.is_empty() {
                    if let Some(star) = punct(decl, "*") {
                        typ = Expr::PointerType(PointerType {
                            pos: pos(star),
                            base: Box::new(typ),
                        });
                    }
                }
                Field {
                    idents,
                    typ,
                    tag: decl.child_by_field_name("tag").map(|t| self.expr(t)),
                }
            })
            .collect()
    }

    fn interface_elem(&self, elem: Node) -> Field {
        match (elem.kind(), elem.child_by_field_name("name")) {
            ("method_elem" | "method_spec", Some(name)) => Field::new(
                vec![self.ident(name)],
                Expr::FunctionType(FunctionType {
                    pos: pos(name),
                    sig: self.signature(elem),
                }),
            ),
            _ => Field::new(Vec::new(), self.expr(elem)),
        }
    }
}

fn value_specs(decl: Node) -> Vec<Node> {
    named(decl)
        .into_iter()
        .flat_map(|n| match n.kind() {
            "var_spec_list" | "const_spec_list" => named(n),
            _ => vec![n],
        })
        .collect()
}

fn plain(x: Expr) -> Stat {
    Stat::Expression(ExpressionStat {
        pos: Pos::UNKNOWN,
        kind: ExprStatKind::Plain,
        expr: Some(x),
    })
}

fn empty_block(at: Pos) -> Block {
    Block {
        pos: at,
        list: Vec::new(),
        end: at,
    }
}
