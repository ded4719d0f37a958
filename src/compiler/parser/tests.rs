use super::expression::expression;
use super::statement::statement;
use super::tokenstream::TokenStream;
use super::*;
use crate::compiler::ast::*;
use crate::compiler::lexer::{tokens::Token, Lexer};
use crate::diagnostics::config::TracingConfig;

fn lex(text: &str) -> Vec<Token> {
    Lexer::new(text)
        .tokenize()
        .into_iter()
        .collect::<Result<Vec<Token>, _>>()
        .expect("Expected valid tokens")
}

fn parse_expr(text: &str) -> Expression {
    let tokens = lex(text);
    let mut stream = TokenStream::new(&tokens);
    let exp = expression(&mut stream)
        .expect("Expected valid expression")
        .expect("Expected an expression");
    assert!(stream.peek().is_none(), "Unparsed tokens after {}", text);
    exp
}

fn parse_stmt(text: &str) -> Statement {
    let tokens = lex(text);
    let mut stream = TokenStream::new(&tokens);
    statement(&mut stream)
        .expect("Expected valid statement")
        .expect("Expected a statement")
}

fn parse_program(text: &str) -> Program {
    parse(&lex(text), TracingConfig::Off).expect("Expected valid program")
}

fn parse_error(text: &str) -> CompilerError<ParserError> {
    parse(&lex(text), TracingConfig::Off).expect_err("Expected a parser error")
}

#[test]
fn parse_unary_operators() {
    for (text, expected) in vec![("-a", UnaryOperator::Minus), ("!a", UnaryOperator::Not)] {
        match parse_expr(text).kind {
            ExprKind::Unary(op, operand) => {
                assert_eq!(op, expected);
                assert_eq!(*operand, Expression::name(1, "a"));
            }
            e => panic!("Expected unary operator for {}, got {:?}", text, e),
        }
    }
}

#[test]
fn parse_double_negate() {
    let exp = parse_expr("- -a");
    assert_eq!(
        exp,
        Expression::unary(
            1,
            UnaryOperator::Minus,
            Expression::unary(1, UnaryOperator::Minus, Expression::name(1, "a"))
        )
    );
}

#[test]
fn parse_binary_operators() {
    for (text, expected) in vec![
        ("2+2", BinaryOperator::Add),
        ("2-2", BinaryOperator::Sub),
        ("2*2", BinaryOperator::Mul),
        ("2/2", BinaryOperator::Div),
        ("2%2", BinaryOperator::Mod),
        ("2^2", BinaryOperator::Pow),
        ("2==2", BinaryOperator::Eq),
        ("2!=2", BinaryOperator::NEq),
        ("2<2", BinaryOperator::Ls),
        ("2<=2", BinaryOperator::LsEq),
        ("2>2", BinaryOperator::Gr),
        ("2>=2", BinaryOperator::GrEq),
        ("true&&false", BinaryOperator::BAnd),
        ("true||false", BinaryOperator::BOr),
    ] {
        match parse_expr(text).kind {
            ExprKind::Binary(op, _, _) => assert_eq!(op, expected, "{}", text),
            e => panic!("Expected binary operator for {}, got {:?}", text, e),
        }
    }
}

#[test]
fn parse_precedence() {
    let exp = parse_expr("1 + 2 * 3");
    assert_eq!(
        exp,
        Expression::binary(
            1,
            BinaryOperator::Add,
            Expression::integer(1, 1),
            Expression::binary(
                1,
                BinaryOperator::Mul,
                Expression::integer(1, 2),
                Expression::integer(1, 3)
            )
        )
    );

    // comparisons bind looser than arithmetic and tighter than logic
    let exp = parse_expr("a < b + 1 && c");
    match exp.kind {
        ExprKind::Binary(BinaryOperator::BAnd, l, _) => match l.kind {
            ExprKind::Binary(BinaryOperator::Ls, _, r) => {
                assert!(matches!(r.kind, ExprKind::Binary(BinaryOperator::Add, _, _)))
            }
            e => panic!("Expected <, got {:?}", e),
        },
        e => panic!("Expected &&, got {:?}", e),
    }
}

#[test]
fn parse_subtraction_is_left_associative() {
    let exp = parse_expr("5 - 3 - 1");
    assert_eq!(
        exp,
        Expression::binary(
            1,
            BinaryOperator::Sub,
            Expression::binary(
                1,
                BinaryOperator::Sub,
                Expression::integer(1, 5),
                Expression::integer(1, 3)
            ),
            Expression::integer(1, 1)
        )
    );
}

#[test]
fn parse_power_and_assign_are_right_associative() {
    let exp = parse_expr("2 ^ 3 ^ 2");
    match exp.kind {
        ExprKind::Binary(BinaryOperator::Pow, l, r) => {
            assert_eq!(*l, Expression::integer(1, 2));
            assert!(matches!(r.kind, ExprKind::Binary(BinaryOperator::Pow, _, _)));
        }
        e => panic!("Expected ^, got {:?}", e),
    }

    let exp = parse_expr("a = b = 3");
    match exp.kind {
        ExprKind::Assign(l, r) => {
            assert_eq!(*l, Expression::name(1, "a"));
            assert!(matches!(r.kind, ExprKind::Assign(_, _)));
        }
        e => panic!("Expected =, got {:?}", e),
    }
}

#[test]
fn parse_postfix_and_access() {
    let exp = parse_expr("a[i][j]++");
    match exp.kind {
        ExprKind::Unary(UnaryOperator::Increment, operand) => match operand.kind {
            ExprKind::Index { base, indices } => {
                assert_eq!(*base, Expression::name(1, "a"));
                assert_eq!(
                    indices,
                    vec![Expression::name(1, "i"), Expression::name(1, "j")]
                );
            }
            e => panic!("Expected index, got {:?}", e),
        },
        e => panic!("Expected ++, got {:?}", e),
    }

    let exp = parse_expr("f(1, g(), x)");
    match exp.kind {
        ExprKind::Call(f, args) => {
            assert_eq!(*f, Expression::name(1, "f"));
            assert_eq!(args.len(), 3);
            assert!(matches!(args[1].kind, ExprKind::Call(_, ref a) if a.is_empty()));
        }
        e => panic!("Expected call, got {:?}", e),
    }
}

#[test]
fn parse_group_keeps_parentheses() {
    let exp = parse_expr("(1 + 2) * 3");
    match exp.kind {
        ExprKind::Binary(BinaryOperator::Mul, l, _) => {
            assert!(matches!(l.kind, ExprKind::Group(_)))
        }
        e => panic!("Expected *, got {:?}", e),
    }
}

#[test]
fn parse_literals() {
    assert_eq!(parse_expr("'a'").kind, ExprKind::Character('a'));
    assert_eq!(parse_expr("true").kind, ExprKind::Boolean(true));
    assert_eq!(
        parse_expr("\"hi\\n\"").kind,
        ExprKind::StringLiteral("hi\\n".into())
    );
}

#[test]
fn parse_declarations() {
    let program = parse_program(
        "x: integer = 5;
        s: string;
        a: array [3] integer = {1, 2, 3};
        b: array [] boolean;
        f: function void (n: integer, xs: array [] char);
        main: function integer () = {
            return 0;
        }",
    );

    let decls = &program.decls;
    assert_eq!(decls.len(), 6);
    assert_eq!(decls[0].name, "x");
    assert_eq!(decls[0].ty, Type::Integer);
    assert_eq!(
        decls[0].value,
        Some(Initializer::Expr(Expression::integer(1, 5)))
    );
    assert_eq!(decls[1].ty, Type::String);
    assert_eq!(decls[1].value, None);
    assert_eq!(decls[2].line, 3);
    assert_eq!(decls[2].ty, Type::Array(Box::new(Type::Integer), 3));
    assert!(matches!(decls[2].value, Some(Initializer::List(ref l)) if l.len() == 3));
    assert_eq!(decls[3].ty, Type::Array(Box::new(Type::Boolean), 0));

    match &decls[4].ty {
        Type::Function(ret, params) => {
            assert_eq!(**ret, Type::Void);
            assert_eq!(params.len(), 2);
            assert_eq!(
                params.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
                vec!["n", "xs"]
            );
        }
        ty => panic!("Expected function type, got {}", ty),
    }
    assert_eq!(decls[4].code, None);

    let code = decls[5].code.as_ref().expect("Expected a function body");
    assert_eq!(code.len(), 1);
    assert!(matches!(code[0].kind, StmtKind::Return { value: Some(_), .. }));
}

#[test]
fn parse_statements() {
    let stmt = parse_stmt("if (a) print a; else { return; }");
    match stmt.kind {
        StmtKind::IfElse {
            cond,
            body,
            else_body,
        } => {
            assert_eq!(cond, Expression::name(1, "a"));
            assert!(matches!(body.kind, StmtKind::Print(ref e) if e.len() == 1));
            assert!(matches!(
                else_body.map(|e| e.kind),
                Some(StmtKind::Block(ref s)) if s.len() == 1
            ));
        }
        s => panic!("Expected if, got {:?}", s),
    }

    let stmt = parse_stmt("for (i = 0; i < 10; i++) { print i, \" \"; }");
    assert!(matches!(
        stmt.kind,
        StmtKind::For {
            init: Some(_),
            cond: Some(_),
            step: Some(_),
            ..
        }
    ));

    let stmt = parse_stmt("for (;;) x;");
    assert!(matches!(
        stmt.kind,
        StmtKind::For {
            init: None,
            cond: None,
            step: None,
            ..
        }
    ));

    let stmt = parse_stmt("while (x > 0) x--;");
    assert!(matches!(
        stmt.kind,
        StmtKind::For {
            init: None,
            cond: Some(_),
            step: None,
            ..
        }
    ));

    let stmt = parse_stmt("print;");
    assert_eq!(stmt.kind, StmtKind::Print(vec![]));

    let stmt = parse_stmt("y: auto = x;");
    assert!(matches!(stmt.kind, StmtKind::Decl(ref d) if d.ty == Type::Auto));
}

#[test]
fn parse_dangling_else_binds_to_inner_if() {
    let stmt = parse_stmt("if (a) if (b) x; else y;");
    match stmt.kind {
        StmtKind::IfElse {
            body, else_body, ..
        } => {
            assert!(else_body.is_none());
            assert!(matches!(
                body.kind,
                StmtKind::IfElse {
                    else_body: Some(_),
                    ..
                }
            ));
        }
        s => panic!("Expected if, got {:?}", s),
    }
}

#[test]
fn parse_missing_semicolon() {
    let err = parse_error("x: integer = 5\ny: integer;");
    assert_eq!(err.line(), 2);
    assert_eq!(
        *err.kind(),
        ParserError::ExpectedButFound(vec![Lex::Semicolon], Some(Lex::Identifier("y".into())))
    );
}

#[test]
fn parse_nested_function_body_is_an_error() {
    let err = parse_error(
        "main: function void () = {
            inner: function void () = { }
        }",
    );
    assert_eq!(
        err,
        CompilerError::new(2, ParserError::FnBodyNotGlobal("inner".into()))
    );
}

#[test]
fn parse_top_level_statement_is_an_error() {
    let err = parse_error("print 5;");
    assert_eq!(err, CompilerError::new(1, ParserError::Locked(Some(Lex::Print))));
}

#[test]
fn parse_array_size_must_be_literal() {
    let err = parse_error("a: array [n] integer;");
    assert_eq!(*err.kind(), ParserError::ArrayExpectedIntLiteral);
}

#[test]
fn parse_missing_type() {
    let err = parse_error("a: = 5;");
    assert_eq!(*err.kind(), ParserError::ExpectedType(Some(Lex::Assign)));
}

#[test]
fn printed_program_parses_to_same_program() {
    let text = "g: integer = -3;
        msg: string = \"value: \";
        nums: array [3] integer = {1, 2, 3};
        square: function integer (x: integer);
        square: function integer (x: integer) = {
            return x * x;
        }
        main: function integer () = {
            i: integer;
            for (i = 0; i < 3; i++) {
                if (nums[i] % 2 == 0) print msg, square(nums[i]), '\\n';
                else {
                    print - -i, (i + 1) ^ 2;
                }
            }
            while (g < 0) g++;
            return 0;
        }";
    let first = parse_program(text).to_string();
    let second = parse_program(&first).to_string();
    assert_eq!(first, second);
}
