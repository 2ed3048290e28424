use std::fmt;

use phf::phf_map;

pub(super) static KEYWORDS: phf::Map<&str, TokenKind> = phf_map! {
    "class" => TokenKind::Class,
    "if" => TokenKind::If,
    "new" => TokenKind::New,
    "foreach" => TokenKind::Foreach,
    "const" => TokenKind::Const,
    "float" => TokenKind::Float,
    "null" => TokenKind::Null,
    "in" => TokenKind::In,
    "public" => TokenKind::Public,
    "private" => TokenKind::Private,
    "return" => TokenKind::Return,
    "this" => TokenKind::This,
    "using" => TokenKind::Using,
    "char" => TokenKind::Char,
    "else" => TokenKind::Else,
    "int" => TokenKind::Int,
    "static" => TokenKind::Static,
    "namespace" => TokenKind::Namespace,
    "void" => TokenKind::Void,
    "ref" => TokenKind::Ref,
    "out" => TokenKind::Out,
    "read" => TokenKind::Read,
    "write" => TokenKind::Write,
    "writeln" => TokenKind::Writeln,
};

pub(super) static TWO_SYMBOLS_TOKENS: phf::Map<&str, TokenKind> = phf_map! {
    "<=" => TokenKind::RelOp,
    ">=" => TokenKind::RelOp,
    "==" => TokenKind::CondOp,
    "!=" => TokenKind::CondOp,
    "+=" => TokenKind::AssignOp,
    "-=" => TokenKind::AssignOp,
    "*=" => TokenKind::AssignOp,
    "/=" => TokenKind::AssignOp,
    "%=" => TokenKind::AssignOp,
    "&&" => TokenKind::AndOp,
    "||" => TokenKind::OrOp,
};

pub(super) static ONE_SYMBOL_TOKENS: phf::Map<char, TokenKind> = phf_map! {
    '<' => TokenKind::RelOp,
    '>' => TokenKind::RelOp,
    '!' => TokenKind::UnaryNot,
    '+' => TokenKind::AddOp,
    '-' => TokenKind::SignOp,
    '*' => TokenKind::MulOp,
    '/' => TokenKind::MulOp,
    '=' => TokenKind::AssignOp,
    '&' => TokenKind::BandOp,
    '|' => TokenKind::BorOp,
    '(' => TokenKind::LeftParen,
    ')' => TokenKind::RightParen,
    '{' => TokenKind::LeftBrace,
    '}' => TokenKind::RightBrace,
    '[' => TokenKind::LeftBracket,
    ']' => TokenKind::RightBracket,
    ',' => TokenKind::Comma,
    ':' => TokenKind::Colon,
    ';' => TokenKind::SemiColon,
    '.' => TokenKind::Period,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Class,
    If,
    New,
    Foreach,
    Const,
    Float,
    Null,
    In,
    Public,
    Private,
    Return,
    This,
    Using,
    Char,
    Else,
    Int,
    Static,
    Namespace,
    Void,
    Ref,
    Out,
    Read,
    Write,
    Writeln,

    RelOp,
    CondOp,
    UnaryNot,
    AddOp,
    SignOp,
    MulOp,
    AssignOp,
    OrOp,
    BorOp,
    AndOp,
    BandOp,

    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Comma,
    Colon,
    SemiColon,
    Period,

    Number,
    NumFloat,
    Literal,
    Identifier,
    Comment,
    Unknown,
    Eof,
}

impl TokenKind {
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Class => "class",
            TokenKind::If => "if",
            TokenKind::New => "new",
            TokenKind::Foreach => "foreach",
            TokenKind::Const => "const",
            TokenKind::Float => "float",
            TokenKind::Null => "null",
            TokenKind::In => "in",
            TokenKind::Public => "public",
            TokenKind::Private => "private",
            TokenKind::Return => "return",
            TokenKind::This => "this",
            TokenKind::Using => "using",
            TokenKind::Char => "char",
            TokenKind::Else => "else",
            TokenKind::Int => "int",
            TokenKind::Static => "static",
            TokenKind::Namespace => "namespace",
            TokenKind::Void => "void",
            TokenKind::Ref => "ref",
            TokenKind::Out => "out",
            TokenKind::Read => "read",
            TokenKind::Write => "write",
            TokenKind::Writeln => "writeln",
            TokenKind::RelOp => "relop",
            TokenKind::CondOp => "condop",
            TokenKind::UnaryNot => "unarynot",
            TokenKind::AddOp => "addop",
            TokenKind::SignOp => "signop",
            TokenKind::MulOp => "mulop",
            TokenKind::AssignOp => "assignop",
            TokenKind::OrOp => "orop",
            TokenKind::BorOp => "borop",
            TokenKind::AndOp => "andop",
            TokenKind::BandOp => "bandop",
            TokenKind::LeftParen => "lparen",
            TokenKind::RightParen => "rparen",
            TokenKind::LeftBrace => "lbrace",
            TokenKind::RightBrace => "rbrace",
            TokenKind::LeftBracket => "lbracket",
            TokenKind::RightBracket => "rbracket",
            TokenKind::Comma => "comma",
            TokenKind::Colon => "colon",
            TokenKind::SemiColon => "semicolon",
            TokenKind::Period => "period",
            TokenKind::Number => "number",
            TokenKind::NumFloat => "numfloat",
            TokenKind::Literal => "literal",
            TokenKind::Identifier => "identifier",
            TokenKind::Comment => "comment",
            TokenKind::Unknown => "unknown",
            TokenKind::Eof => "eof",
        }
    }

    /// `int`, `float`, `char` or `void`.
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            TokenKind::Int | TokenKind::Float | TokenKind::Char | TokenKind::Void
        )
    }

    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            TokenKind::Public | TokenKind::Private | TokenKind::Static
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub int_value: i32,
    pub float_value: f64,
    /// Body of a quoted literal, without the quotes.
    pub literal: String,
    pub line: u32,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: u32) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            int_value: 0,
            float_value: 0.0,
            literal: String::new(),
            line,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}
