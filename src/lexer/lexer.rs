use log::{trace, warn};

use crate::error::{CompileError, CompileResult};

use super::{
    token::{KEYWORDS, ONE_SYMBOL_TOKENS, TWO_SYMBOLS_TOKENS},
    Token, TokenKind,
};

/// Pull-based scanner: hands out one token per call to [`Lexer::next_token`].
#[derive(Debug)]
pub struct Lexer {
    chars: Vec<char>,
    index: usize,
    line: u32,
    filename: String,
}

impl Lexer {
    pub fn new(source: &str, filename: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            index: 0,
            line: 1,
            filename: filename.to_string(),
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    fn peek_2(&self) -> Option<char> {
        self.chars.get(self.index + 1).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                self.line += 1;
            } else if !c.is_whitespace() {
                break;
            }
            self.index += 1;
        }
    }

    /// Scans the next token. Once the input is exhausted every call yields `Eof`.
    pub fn next_token(&mut self) -> CompileResult<Token> {
        self.skip_whitespace();

        let Some(c) = self.peek() else {
            return Ok(Token::new(TokenKind::Eof, "", self.line));
        };

        let token = if c == '/' && self.peek_2() == Some('/') {
            self.comment()
        } else if c.is_ascii_digit() {
            self.number()?
        } else if c.is_alphabetic() || c == '_' {
            self.word()
        } else if c == '"' || c == '\'' {
            self.literal(c)
        } else {
            self.operator(c)
        };

        trace!("{}:{} {} '{}'", self.filename, token.line, token.kind, token.lexeme);
        Ok(token)
    }

    /// Drains the input into a vector, stopping after `Eof`.
    pub fn tokenize(source: &str, filename: &str) -> CompileResult<Vec<Token>> {
        let mut lexer = Lexer::new(source, filename);
        let mut tokens = vec![];
        loop {
            let token = lexer.next_token()?;
            let eof = token.is(TokenKind::Eof);
            tokens.push(token);
            if eof {
                return Ok(tokens);
            }
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let start = self.index;
        while self.peek().is_some_and(&pred) {
            self.index += 1;
        }
        self.chars[start..self.index].iter().collect()
    }

    fn comment(&mut self) -> Token {
        let text = self.take_while(|c| c != '\n');
        Token::new(TokenKind::Comment, text, self.line)
    }

    fn word(&mut self) -> Token {
        let s = self.take_while(|c| c.is_alphanumeric() || c == '_');
        let kind = KEYWORDS.get(s.as_str()).copied().unwrap_or(TokenKind::Identifier);
        Token::new(kind, s, self.line)
    }

    fn number(&mut self) -> CompileResult<Token> {
        let s = self.take_while(|c| c.is_ascii_digit() || c == '.');
        let malformed = || CompileError::MalformedNumber {
            file: self.filename.clone(),
            line: self.line,
            lexeme: s.clone(),
        };

        if s.contains('.') {
            if s.matches('.').count() > 1 {
                return Err(malformed());
            }
            let value: f64 = s.parse().map_err(|_| malformed())?;
            let mut token = Token::new(TokenKind::NumFloat, s.clone(), self.line);
            token.float_value = value;
            Ok(token)
        } else {
            let value: i32 = s.parse().map_err(|_| malformed())?;
            let mut token = Token::new(TokenKind::Number, s.clone(), self.line);
            token.int_value = value;
            Ok(token)
        }
    }

    fn literal(&mut self, quote: char) -> Token {
        self.index += 1;
        let body = self.take_while(|c| c != quote && c != '\n');

        if self.peek() == Some(quote) {
            self.index += 1;
        } else {
            warn!(
                "{}:{}: unterminated literal, expecting {}",
                self.filename, self.line, quote
            );
        }

        let mut token = Token::new(
            TokenKind::Literal,
            format!("{quote}{body}{quote}"),
            self.line,
        );
        token.literal = body;
        token
    }

    fn operator(&mut self, c: char) -> Token {
        if let Some(c2) = self.peek_2() {
            let pair: String = [c, c2].iter().collect();
            if let Some(kind) = TWO_SYMBOLS_TOKENS.get(pair.as_str()) {
                self.index += 2;
                return Token::new(*kind, pair, self.line);
            }
        }

        self.index += 1;
        let kind = ONE_SYMBOL_TOKENS.get(&c).copied().unwrap_or(TokenKind::Unknown);
        Token::new(kind, c.to_string(), self.line)
    }
}
