use super::*;
use crate::ast::*;

const U: Pos = Pos::UNKNOWN;

fn spaces() -> FormatOptions {
    FormatOptions {
        tab_width: 4,
        use_tabs: false,
        ..FormatOptions::default()
    }
}

fn render(opts: &FormatOptions, program: &Program) -> String {
    let mut out = Vec::new();
    print(&mut out, opts, program).unwrap();
    String::from_utf8(out).unwrap()
}

fn render_expr(opts: &FormatOptions, x: &Expr) -> String {
    let mut out = Vec::new();
    print_expr(&mut out, opts, x).unwrap();
    String::from_utf8(out).unwrap()
}

fn id(name: &str) -> Expr {
    Expr::ident(U, name)
}

fn program(decls: Vec<Decl>, comments: Vec<Comment>) -> Program {
    Program {
        pos: Pos(0),
        name: Ident::new(Pos(8), "main"),
        decls,
        comments,
    }
}

fn value(pos: Pos, name: (Pos, &str), typ: Option<Expr>, val: Option<(Pos, &str)>) -> ValueDecl {
    ValueDecl {
        pos,
        idents: vec![Ident::new(name.0, name.1)],
        typ,
        vals: val.map(|(p, v)| Expr::lit(p, v)),
    }
}

fn func(body: Vec<Stat>) -> Decl {
    Decl::Func(FuncDecl {
        pos: U,
        recv: None,
        name: Ident::new(U, "f"),
        type_params: Vec::new(),
        sig: Signature::default(),
        body: Some(Block {
            pos: U,
            list: body,
            end: U,
        }),
    })
}

fn plain(x: Expr) -> Stat {
    Stat::Expression(ExpressionStat {
        pos: U,
        kind: ExprStatKind::Plain,
        expr: Some(x),
    })
}

fn define(name: &str, val: &str) -> Stat {
    plain(Expr::binary(U, Token::Define, id(name), Expr::lit(U, val)))
}

fn call(name: &str) -> Expr {
    Expr::Call(Call {
        pos: U,
        func: Box::new(id(name)),
        args: None,
        ellipsis: None,
    })
}

fn block(list: Vec<Stat>) -> Block {
    Block {
        pos: U,
        list,
        end: U,
    }
}

#[test]
fn tighter_operand_is_compact() {
    let x = Expr::binary(
        U,
        Token::Add,
        id("x"),
        Expr::binary(U, Token::Mul, id("y"), id("z")),
    );
    assert_eq!(render_expr(&spaces(), &x), "x + y*z");
}

#[test]
fn looser_operand_is_parenthesized() {
    let x = Expr::binary(
        U,
        Token::Mul,
        Expr::binary(U, Token::Add, id("x"), id("y")),
        id("z"),
    );
    assert_eq!(render_expr(&spaces(), &x), "(x + y) * z");
}

#[test]
fn unary_operands_keep_their_blanks() {
    let x = Expr::binary(
        U,
        Token::Add,
        id("x"),
        Expr::binary(U, Token::Mul, id("y"), Expr::unary(U, Token::Sub, id("z"))),
    );
    assert_eq!(render_expr(&spaces(), &x), "x + y * -z");

    let negneg = Expr::unary(U, Token::Sub, Expr::unary(U, Token::Sub, id("a")));
    assert_eq!(render_expr(&spaces(), &negneg), "- -a");
}

#[test]
fn lists_and_key_values() {
    let kv = |k: &str, v: &str| Expr::binary(U, Token::Colon, id(k), Expr::lit(U, v));
    let lit = Expr::CompositeLit(CompositeLit {
        pos: U,
        typ: Some(Box::new(id("T"))),
        elts: Some(Box::new(Expr::list(kv("a", "1"), [(U, kv("b", "2"))]))),
        end: U,
    });
    assert_eq!(render_expr(&spaces(), &lit), "T{a: 1, b: 2}");
}

#[test]
fn single_blank_line_between_declarations() {
    // package main\n\nconst A = 1\n\nvar B int\n
    let p = program(
        vec![
            Decl::Const(value(Pos(14), (Pos(20), "A"), None, Some((Pos(24), "1")))),
            Decl::Var(value(Pos(27), (Pos(31), "B"), Some(Expr::ident(Pos(33), "int")), None)),
        ],
        [12, 13, 25, 26, 36]
            .into_iter()
            .map(|p| Comment::newline(Pos(p)))
            .collect(),
    );
    assert_eq!(
        render(&spaces(), &p),
        "package main\n\nconst A = 1\n\nvar B int\n"
    );
}

#[test]
fn consecutive_newlines_are_capped() {
    let decls = vec![
        Decl::Const(value(Pos(13), (Pos(19), "A"), None, Some((Pos(23), "1")))),
        Decl::Var(value(Pos(30), (Pos(34), "B"), Some(Expr::ident(Pos(36), "int")), None)),
    ];
    let comments: Vec<_> = (24..30).chain([39]).map(|p| Comment::newline(Pos(p))).collect();
    let p = program(decls, comments);
    assert_eq!(
        render(&spaces(), &p),
        "package main\nconst A = 1\n\n\nvar B int\n"
    );

    let opts = FormatOptions {
        respect_newlines: false,
        ..spaces()
    };
    assert_eq!(render(&opts, &p), "package main\nconst A = 1\n\nvar B int\n");
}

#[test]
fn semicolons_only_inside_scopes() {
    let p = program(vec![func(vec![define("x", "1"), define("y", "2")])], Vec::new());
    assert_eq!(
        render(&spaces(), &p),
        "package main\nfunc f() {\n    x := 1;\n    y := 2\n}\n"
    );

    let opts = FormatOptions {
        optional_semicolons: true,
        ..spaces()
    };
    assert_eq!(
        render(&opts, &p),
        "package main\nfunc f() {\n    x := 1;\n    y := 2;\n}\n"
    );
}

#[test]
fn grouped_declarations_align_in_columns() {
    let p = program(
        vec![Decl::List(DeclList {
            pos: U,
            tok: Token::Const,
            list: vec![
                Decl::Const(value(U, (U, "A"), None, Some((U, "1")))),
                Decl::Const(value(U, (U, "B"), None, Some((U, "22")))),
            ],
            end: U,
        })],
        Vec::new(),
    );
    assert_eq!(
        render(&spaces(), &p),
        "package main\nconst (\n    A   = 1;\n    B   = 22\n)\n"
    );
    // with tabs the raw cell structure survives
    assert_eq!(
        render(&FormatOptions::default(), &p),
        "package main\nconst (\n\tA\t= 1;\n\tB\t= 22\n)\n"
    );
}

#[test]
fn struct_fields_align() {
    let field = |name: &str, typ: &str| Field::new(vec![Ident::new(U, name)], id(typ));
    let p = program(
        vec![Decl::Type(TypeDecl {
            pos: Pos::SYNTHETIC,
            name: Ident::new(U, "T"),
            type_params: Vec::new(),
            alias: false,
            typ: Expr::StructType(StructType {
                pos: U,
                fields: vec![field("a", "int"), field("bc", "string")],
                end: U,
            }),
        })],
        Vec::new(),
    );
    assert_eq!(
        render(&spaces(), &p),
        "package main\ntype T struct {\n    a   int;\n    bc  string\n}\n"
    );
}

#[test]
fn for_clause_prints_its_semicolons() {
    let inc = Stat::Expression(ExpressionStat {
        pos: U,
        kind: ExprStatKind::Inc,
        expr: Some(id("i")),
    });
    let stat = Stat::For(ForStat {
        pos: U,
        init: Some(Box::new(define("i", "0"))),
        cond: Some(Expr::binary(U, Token::Lss, id("i"), id("n"))),
        post: Some(Box::new(inc)),
        body: block(Vec::new()),
    });
    let p = program(vec![func(vec![stat])], Vec::new());
    assert_eq!(
        render(&spaces(), &p),
        "package main\nfunc f() {\n    for i := 0; i < n; i++ {}\n}\n"
    );
}

#[test]
fn if_else_blocks_indent() {
    let ret = Stat::Expression(ExpressionStat {
        pos: U,
        kind: ExprStatKind::Return,
        expr: None,
    });
    let stat = Stat::If(IfStat {
        pos: U,
        init: None,
        cond: id("x"),
        body: block(vec![ret]),
        else_branch: Some(Box::new(Stat::Composite(block(vec![plain(call("y"))])))),
    });
    let p = program(vec![func(vec![stat])], Vec::new());
    assert_eq!(
        render(&spaces(), &p),
        "package main\nfunc f() {\n    if x {\n        return\n    } else {\n        y()\n    }\n}\n"
    );
}

#[test]
fn case_clauses_sit_at_switch_level() {
    let stat = Stat::Switch(SwitchStat {
        pos: U,
        init: None,
        tag: Some(id("x")),
        body: block(vec![
            Stat::Case(CaseClause {
                pos: U,
                expr: Some(Expr::lit(U, "1")),
                colon: U,
                body: vec![plain(call("y"))],
            }),
            Stat::Case(CaseClause {
                pos: U,
                expr: None,
                colon: U,
                body: Vec::new(),
            }),
        ]),
    });
    let p = program(vec![func(vec![stat])], Vec::new());
    assert_eq!(
        render(&spaces(), &p),
        "package main\nfunc f() {\n    switch x {\n    case 1:\n        y();\n    default:\n    }\n}\n"
    );
}

#[test]
fn line_comment_keeps_blank_line_above() {
    // package main\n\n// Doc\nconst A = 1\n
    let p = program(
        vec![Decl::Const(value(Pos(21), (Pos(27), "A"), None, Some((Pos(31), "1"))))],
        vec![
            Comment::newline(Pos(12)),
            Comment::newline(Pos(13)),
            Comment::new(Pos(14), "// Doc"),
            Comment::newline(Pos(20)),
            Comment::newline(Pos(32)),
        ],
    );
    assert_eq!(
        render(&spaces(), &p),
        "package main\n\n// Doc\nconst A = 1\n"
    );
}

#[test]
fn line_comment_then_blank_line_keeps_both() {
    // package main\n\n// Doc\n\nconst A = 1\n
    let p = program(
        vec![Decl::Const(value(Pos(22), (Pos(28), "A"), None, Some((Pos(32), "1"))))],
        vec![
            Comment::newline(Pos(12)),
            Comment::newline(Pos(13)),
            Comment::new(Pos(14), "// Doc"),
            Comment::newline(Pos(20)),
            Comment::newline(Pos(21)),
            Comment::newline(Pos(33)),
        ],
    );
    assert_eq!(
        render(&spaces(), &p),
        "package main\n\n// Doc\n\nconst A = 1\n"
    );
}

#[test]
fn ignored_blank_lines_leave_one_break_before_a_comment() {
    // package main\n\n\n// Doc\nconst A = 1\n
    let p = program(
        vec![Decl::Const(value(Pos(22), (Pos(28), "A"), None, Some((Pos(32), "1"))))],
        vec![
            Comment::newline(Pos(12)),
            Comment::newline(Pos(13)),
            Comment::newline(Pos(14)),
            Comment::new(Pos(15), "// Doc"),
            Comment::newline(Pos(21)),
            Comment::newline(Pos(33)),
        ],
    );
    let opts = FormatOptions {
        respect_newlines: false,
        ..spaces()
    };
    assert_eq!(render(&opts, &p), "package main\n// Doc\nconst A = 1\n");
    assert_eq!(
        render(&spaces(), &p),
        "package main\n\n\n// Doc\nconst A = 1\n"
    );
}

#[test]
fn block_comment_before_line_break_has_no_trailing_blank() {
    // package main\n\nvar a int /* note */\nvar b int\n
    let p = program(
        vec![
            Decl::Var(value(Pos(14), (Pos(18), "a"), Some(Expr::ident(Pos(20), "int")), None)),
            Decl::Var(value(Pos(35), (Pos(39), "b"), Some(Expr::ident(Pos(41), "int")), None)),
        ],
        vec![
            Comment::newline(Pos(12)),
            Comment::newline(Pos(13)),
            Comment::new(Pos(24), "/* note */"),
            Comment::newline(Pos(34)),
            Comment::newline(Pos(44)),
        ],
    );
    assert_eq!(
        render(&spaces(), &p),
        "package main\n\nvar a int /* note */\n\nvar b int\n"
    );
}

#[test]
fn block_comment_stays_on_its_line() {
    let p = Program {
        pos: Pos(0),
        name: Ident::new(Pos(16), "main"),
        decls: Vec::new(),
        comments: vec![Comment::new(Pos(8), "/* c */"), Comment::newline(Pos(20))],
    };
    assert_eq!(render(&spaces(), &p), "package /* c */ main\n");
}

#[test]
fn comments_can_be_suppressed() {
    let p = Program {
        pos: Pos(0),
        name: Ident::new(Pos(16), "main"),
        decls: Vec::new(),
        comments: vec![Comment::new(Pos(8), "/* c */"), Comment::newline(Pos(20))],
    };
    let opts = FormatOptions {
        comments: false,
        ..spaces()
    };
    assert_eq!(render(&opts, &p), "package main\n");
}

#[test]
fn tab_runs_in_comments_collapse() {
    assert_eq!(untabify("//\ta\t\t\tb"), "//\ta\tb");
    assert!(matches!(untabify("// a\tb"), Cow::Borrowed(_)));
}

#[test]
fn html_mode_escapes_text() {
    let opts = FormatOptions {
        html: true,
        ..spaces()
    };
    let x = Expr::binary(U, Token::LAnd, Expr::binary(U, Token::Lss, id("a"), id("b")), id("c"));
    assert_eq!(render_expr(&opts, &x), "a &lt; b &amp;&amp; c");
}

#[test]
fn html_identifiers_link_to_their_declaration() {
    let opts = FormatOptions {
        html: true,
        ..spaces()
    };
    let obj = Some(ObjRef {
        id: 3,
        decl_pos: Pos(5),
    });
    let decl = Expr::Ident(Ident {
        pos: Pos(5),
        name: "x".into(),
        obj,
    });
    let usage = Expr::Ident(Ident {
        pos: Pos(9),
        name: "x".into(),
        obj,
    });
    assert_eq!(render_expr(&opts, &decl), "<a name=\"id3\">x</a>");
    assert_eq!(render_expr(&opts, &usage), "<a href=\"#id3\">x</a>");
    // plain text mode ignores the declaration site
    assert_eq!(render_expr(&spaces(), &usage), "x");
}

#[test]
fn html_program_is_wrapped() {
    let opts = FormatOptions {
        html: true,
        ..spaces()
    };
    let out = render(&opts, &program(Vec::new(), Vec::new()));
    assert!(out.starts_with("<html>\n<head>\n"));
    assert!(out.contains("<title>package main</title>"));
    assert!(out.contains("<pre>\npackage main\n</pre>\n"));
    assert!(out.ends_with("</html>\n"));
}

#[test]
fn malformed_nodes_print_placeholders() {
    assert_eq!(render_expr(&spaces(), &Expr::Bad(U)), "BadExpr");

    let p = program(vec![Decl::Bad(U)], Vec::new());
    assert_eq!(render(&spaces(), &p), "package main\nBadDecl\n");

    let p = program(vec![func(vec![Stat::Bad(U)])], Vec::new());
    assert_eq!(render(&spaces(), &p), "package main\nfunc f() {\n    BadStat\n}\n");
}

#[test]
fn def_keyword_replaces_declaration_keywords() {
    let opts = FormatOptions {
        def_keywords: true,
        ..spaces()
    };
    let p = program(
        vec![Decl::Func(FuncDecl {
            pos: U,
            recv: None,
            name: Ident::new(U, "f"),
            type_params: Vec::new(),
            sig: Signature::default(),
            body: None,
        })],
        Vec::new(),
    );
    assert_eq!(render(&opts, &p), "package main\ndef f()\n");
}

#[test]
fn unordered_comments_are_rejected() {
    let p = program(
        Vec::new(),
        vec![Comment::new(Pos(20), "// b"), Comment::new(Pos(10), "// a")],
    );
    let err = print(Vec::new(), &spaces(), &p).unwrap_err();
    assert!(matches!(err, PrintError::UnorderedComments { index: 1, pos: Pos(10) }));
}

#[test]
fn function_typed_result_keeps_parentheses() {
    let func_type = |result: Option<Vec<Field>>| {
        Expr::FunctionType(FunctionType {
            pos: U,
            sig: Signature {
                params: Vec::new(),
                result,
            },
        })
    };
    let returns_func = func_type(Some(vec![Field::new(Vec::new(), func_type(None))]));
    assert_eq!(render_expr(&spaces(), &returns_func), "func() (func())");

    let returns_int = func_type(Some(vec![Field::new(Vec::new(), id("int"))]));
    assert_eq!(render_expr(&spaces(), &returns_int), "func() int");
}

#[test]
fn print_program_uses_default_layout() {
    let p = program(
        vec![Decl::Var(value(Pos(14), (Pos(18), "a"), None, Some((Pos(22), "1"))))],
        Vec::new(),
    );
    let mut out = Vec::new();
    print_program(&mut out, false, &p).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "package main\nvar a\t= 1\n");

    let mut out = Vec::new();
    print_program(&mut out, true, &p).unwrap();
    let page = String::from_utf8(out).unwrap();
    assert!(page.starts_with("<html>\n"));
    assert!(page.contains("<pre>\npackage main\nvar a\t= 1\n</pre>\n"));
}

#[test]
fn lone_token() {
    let mut out = Vec::new();
    print_token(&mut out, &spaces(), U, Token::Arrow).unwrap();
    assert_eq!(out, b"<-");
}
