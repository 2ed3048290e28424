use std::fmt;

use crate::lexer::TokenKind;

/// Type of a value held by a variable or constant, or returned by a method.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueType {
    Int,
    Char,
    Float,
    Void,
    Empty,
}

impl ValueType {
    pub fn sizeof(&self) -> i32 {
        match self {
            ValueType::Int => 2,
            ValueType::Float => 4,
            ValueType::Char => 1,
            ValueType::Void | ValueType::Empty => 0,
        }
    }

    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Int => Some(ValueType::Int),
            TokenKind::Float => Some(ValueType::Float),
            TokenKind::Char => Some(ValueType::Char),
            TokenKind::Void => Some(ValueType::Void),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Int => "int",
            ValueType::Char => "char",
            ValueType::Float => "float",
            ValueType::Void => "void",
            ValueType::Empty => "",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PassingMode {
    #[default]
    ByValue,
    ByReference,
    ByOut,
}

impl PassingMode {
    pub fn from_token(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Ref => PassingMode::ByReference,
            TokenKind::Out => PassingMode::ByOut,
            _ => PassingMode::ByValue,
        }
    }

    /// `"ref "`, `"out "` or nothing, ready to prefix a declaration.
    pub fn prefix(&self) -> &'static str {
        match self {
            PassingMode::ByValue => "",
            PassingMode::ByReference => "ref ",
            PassingMode::ByOut => "out ",
        }
    }
}

/// Value bound to a constant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LiteralValue {
    Int(i32),
    Float(f64),
    Char(char),
}

impl fmt::Display for LiteralValue {
    /// Chars render as their code point; TAC only carries numbers.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Int(v) => write!(f, "{}", v),
            LiteralValue::Float(v) => write!(f, "{}", v),
            LiteralValue::Char(c) => write!(f, "{}", *c as u32),
        }
    }
}
