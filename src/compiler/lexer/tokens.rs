#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Primitive {
    Integer,
    Boolean,
    Char,
    String,
    Void,
    Auto,
}

impl std::fmt::Display for Primitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Primitive::Integer => f.write_str("integer"),
            Primitive::Boolean => f.write_str("boolean"),
            Primitive::Char => f.write_str("char"),
            Primitive::String => f.write_str("string"),
            Primitive::Void => f.write_str("void"),
            Primitive::Auto => f.write_str("auto"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Lex {
    Integer(i64),
    Bool(bool),
    Character(char),
    /// Text between the quotes with escape sequences left as written
    StringLiteral(String),
    Identifier(String),
    Primitive(Primitive),
    Array,
    Function,
    If,
    Else,
    For,
    While,
    Print,
    Return,
    Increment,
    Decrement,
    Not,
    Pow,
    Mul,
    Div,
    Mod,
    Add,
    Minus,
    Ls,
    LsEq,
    Gr,
    GrEq,
    Eq,
    NEq,
    BAnd,
    BOr,
    Assign,
    Colon,
    Semicolon,
    Comma,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
}

impl Lex {
    /// The name of this token in the listing printed by the scan stage.
    pub fn scan_name(&self) -> String {
        use Lex::*;
        match self {
            Integer(i) => format!("INTEGER_LITERAL {}", i),
            Character(c) => format!("CHARACTER_LITERAL {}", escape_char(*c)),
            StringLiteral(s) => format!("STRING_LITERAL {}", s),
            Identifier(id) => format!("IDENTIFIER {}", id),
            Bool(true) => "TRUE".into(),
            Bool(false) => "FALSE".into(),
            Primitive(self::Primitive::Integer) => "INTEGER".into(),
            Primitive(self::Primitive::Boolean) => "BOOLEAN".into(),
            Primitive(self::Primitive::Char) => "CHARACTER".into(),
            Primitive(self::Primitive::String) => "STRING".into(),
            Primitive(self::Primitive::Void) => "VOID".into(),
            Primitive(self::Primitive::Auto) => "AUTO".into(),
            Array => "ARRAY".into(),
            Function => "FUNCTION".into(),
            If => "IF".into(),
            Else => "ELSE".into(),
            For => "FOR".into(),
            While => "WHILE".into(),
            Print => "PRINT".into(),
            Return => "RETURN".into(),
            Increment => "INCREMENT".into(),
            Decrement => "DECREMENT".into(),
            Not => "LOGIC_NOT".into(),
            Pow => "EXP".into(),
            Mul => "MULT".into(),
            Div => "DIV".into(),
            Mod => "MODULUS".into(),
            Add => "PLUS".into(),
            Minus => "MINUS".into(),
            Ls => "LT".into(),
            LsEq => "LE".into(),
            Gr => "GT".into(),
            GrEq => "GE".into(),
            Eq => "EQ".into(),
            NEq => "NEQ".into(),
            BAnd => "LOGIC_AND".into(),
            BOr => "LOGIC_OR".into(),
            Assign => "ASSIGNMENT".into(),
            Colon => "COLON".into(),
            Semicolon => "SEMICOLON".into(),
            Comma => "COMMA".into(),
            LParen => "LEFT_PARENTHESIS".into(),
            RParen => "RIGHT_PARENTHESIS".into(),
            LBracket => "LEFT_SQUARE".into(),
            RBracket => "RIGHT_SQUARE".into(),
            LBrace => "LEFT_CURLY".into(),
            RBrace => "RIGHT_CURLY".into(),
        }
    }
}

fn escape_char(c: char) -> String {
    match c {
        '\n' => "\\n".into(),
        '\0' => "\\0".into(),
        '\\' => "\\\\".into(),
        c => c.to_string(),
    }
}

impl std::fmt::Display for Lex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Lex::*;
        match self {
            Integer(i) => f.write_str(&format!("literal {}", i)),
            Bool(b) => f.write_str(&format!("literal {}", b)),
            Character(c) => f.write_str(&format!("literal '{}'", escape_char(*c))),
            StringLiteral(str) => f.write_str(&format!("literal \"{}\"", str)),
            Identifier(id) => f.write_str(&format!("identifier {}", id)),
            Primitive(p) => f.write_str(&format!("{}", p)),
            Array => f.write_str("array"),
            Function => f.write_str("function"),
            If => f.write_str("if"),
            Else => f.write_str("else"),
            For => f.write_str("for"),
            While => f.write_str("while"),
            Print => f.write_str("print"),
            Return => f.write_str("return"),
            Increment => f.write_str("++"),
            Decrement => f.write_str("--"),
            Not => f.write_str("!"),
            Pow => f.write_str("^"),
            Mul => f.write_str("*"),
            Div => f.write_str("/"),
            Mod => f.write_str("%"),
            Add => f.write_str("+"),
            Minus => f.write_str("-"),
            Ls => f.write_str("<"),
            LsEq => f.write_str("<="),
            Gr => f.write_str(">"),
            GrEq => f.write_str(">="),
            Eq => f.write_str("=="),
            NEq => f.write_str("!="),
            BAnd => f.write_str("&&"),
            BOr => f.write_str("||"),
            Assign => f.write_str("="),
            Colon => f.write_str(":"),
            Semicolon => f.write_str(";"),
            Comma => f.write_str(","),
            LParen => f.write_str("("),
            RParen => f.write_str(")"),
            LBracket => f.write_str("["),
            RBracket => f.write_str("]"),
            LBrace => f.write_str("{"),
            RBrace => f.write_str("}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Line number the token starts on
    pub l: u32,

    /// The value of the token
    pub s: Lex,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("L{}: {}", self.l, self.s))
    }
}

impl Token {
    pub fn new(l: u32, s: Lex) -> Token {
        Token { l, s }
    }

    /// Compares only the kind of the two tokens, ignoring any value they carry.
    pub fn token_eq(&self, a: &Lex) -> bool {
        std::mem::discriminant(&self.s) == std::mem::discriminant(a)
    }
}
