use super::lexer::Lexer;
use super::tokens::{Lex, Primitive, Token};
use super::LexerError;
use Lex::*;

fn lex(text: &str) -> Vec<Token> {
    Lexer::new(text)
        .tokenize()
        .into_iter()
        .collect::<Result<Vec<Token>, _>>()
        .expect("Expected valid tokens")
}

#[test]
fn test_integer() {
    let tokens = lex("5");
    assert_eq!(tokens, vec![Token::new(1, Integer(5))]);
}

#[test]
fn test_invalid_number() {
    let tokens = Lexer::new("5x").tokenize();
    assert_eq!(tokens.len(), 1);
    let err = tokens[0].clone().expect_err("Expected error for invalid integer");
    assert_eq!(*err.kind(), LexerError::InvalidInteger);
}

#[test]
fn test_integer_out_of_range() {
    let tokens = Lexer::new("99999999999999999999").tokenize();
    assert!(matches!(
        tokens[0].as_ref().map_err(|e| e.kind()),
        Err(LexerError::IntegerOutOfRange(_))
    ));
}

#[test]
fn test_string_literal() {
    let tokens = lex("\"hello\\n\"");
    assert_eq!(tokens, vec![Token::new(1, StringLiteral("hello\\n".into()))]);
}

#[test]
fn test_string_with_newline() {
    let tokens = Lexer::new("\"a\nb\"").tokenize();
    assert_eq!(
        tokens[0].clone().map_err(|e| e.inner()),
        Err(LexerError::StringNewline)
    );
}

#[test]
fn test_unterminated_string() {
    let tokens = Lexer::new("\"abc").tokenize();
    assert_eq!(
        tokens[0].clone().map_err(|e| e.inner()),
        Err(LexerError::UnterminatedString)
    );
}

#[test]
fn test_char_literals() {
    for (text, expected) in [
        ("'a'", 'a'),
        ("'\\n'", '\n'),
        ("'\\0'", '\0'),
        ("'\\\\'", '\\'),
        ("'\\''", '\''),
    ]
    .iter()
    {
        let tokens = lex(text);
        assert_eq!(tokens, vec![Token::new(1, Character(*expected))], "{}", text);
    }
}

#[test]
fn test_identifier() {
    for text in ["x", "y", "x_5", "_tmp"].iter() {
        let tokens = lex(text);
        assert_eq!(tokens, vec![Token::new(1, Identifier((*text).into()))]);
    }
}

#[test]
fn test_identifier_too_long() {
    let text = "a".repeat(256);
    let tokens = Lexer::new(&text).tokenize();
    assert!(tokens[0].is_err());
    assert!(lex(&"a".repeat(255)).len() == 1);
}

#[test]
fn test_keywords() {
    for (text, expected) in [
        ("array", Array),
        ("function", Function),
        ("if", If),
        ("else", Else),
        ("for", For),
        ("while", While),
        ("print", Print),
        ("return", Return),
        ("true", Bool(true)),
        ("false", Bool(false)),
        ("integer", Lex::Primitive(Primitive::Integer)),
        ("boolean", Lex::Primitive(Primitive::Boolean)),
        ("char", Lex::Primitive(Primitive::Char)),
        ("string", Lex::Primitive(Primitive::String)),
        ("void", Lex::Primitive(Primitive::Void)),
        ("auto", Lex::Primitive(Primitive::Auto)),
        ("integers", Identifier("integers".into())),
    ]
    .iter()
    {
        let tokens = lex(text);
        assert_eq!(tokens, vec![Token::new(1, expected.clone())], "{}", text);
    }
}

#[test]
fn test_operator() {
    for (text, expected) in [
        ("++", Increment),
        ("--", Decrement),
        ("!", Not),
        ("^", Pow),
        ("*", Mul),
        ("/", Div),
        ("%", Mod),
        ("+", Add),
        ("-", Minus),
        ("<", Ls),
        ("<=", LsEq),
        (">", Gr),
        (">=", GrEq),
        ("==", Eq),
        ("!=", NEq),
        ("&&", BAnd),
        ("||", BOr),
        ("=", Assign),
        (":", Colon),
        (";", Semicolon),
        (",", Comma),
        ("(", LParen),
        (")", RParen),
        ("[", LBracket),
        ("]", RBracket),
        ("{", LBrace),
        ("}", RBrace),
    ]
    .iter()
    {
        let tokens = lex(text);
        assert_eq!(tokens, vec![Token::new(1, expected.clone())], "{}", text);
    }
}

#[test]
fn test_multiple_tokens() {
    let tokens = lex("x: integer = 5;");
    assert_eq!(
        tokens,
        vec![
            Token::new(1, Identifier("x".into())),
            Token::new(1, Colon),
            Token::new(1, Lex::Primitive(Primitive::Integer)),
            Token::new(1, Assign),
            Token::new(1, Integer(5)),
            Token::new(1, Semicolon),
        ]
    );
}

#[test]
fn test_comments_and_lines() {
    let text = "// first line\nx /* spans\ntwo lines */ y\n\nz";
    let tokens = lex(text);
    assert_eq!(
        tokens,
        vec![
            Token::new(2, Identifier("x".into())),
            Token::new(3, Identifier("y".into())),
            Token::new(5, Identifier("z".into())),
        ]
    );
}

#[test]
fn test_unterminated_comment() {
    let tokens = Lexer::new("x /* never closed").tokenize();
    assert_eq!(tokens.len(), 2);
    assert_eq!(
        tokens[1].clone().map_err(|e| e.inner()),
        Err(LexerError::UnterminatedComment)
    );
}

#[test]
fn test_locked() {
    let tokens = Lexer::new("x @ y").tokenize();
    assert_eq!(tokens.len(), 2);
    assert_eq!(
        tokens[1].clone().map_err(|e| e.inner()),
        Err(LexerError::Locked(Some('@')))
    );
}

#[test]
fn test_scan_names() {
    let names: Vec<String> = lex("x: integer = 'a' + \"s\";")
        .iter()
        .map(|t| t.s.scan_name())
        .collect();
    assert_eq!(
        names,
        vec![
            "IDENTIFIER x",
            "COLON",
            "INTEGER",
            "ASSIGNMENT",
            "CHARACTER_LITERAL a",
            "PLUS",
            "STRING_LITERAL s",
            "SEMICOLON"
        ]
    );
}
