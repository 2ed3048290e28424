use log::debug;

use crate::{
    analyzer::{LiteralValue, PassingMode, SymbolId, SymbolKind, ValueType},
    codegen::{Instr, Operand},
    error::CompileResult,
    lexer::TokenKind,
};

use super::Parser;

impl Parser {
    /// type = "int" | "float" | "char" | "void"
    pub(super) fn parse_type(&mut self) -> CompileResult<ValueType> {
        let Some(ty) = ValueType::from_token(self.token.kind) else {
            return Err(self.mismatch("a type"));
        };
        self.advance()?;
        Ok(ty)
    }

    fn starts_member(&self, class: &str) -> bool {
        let kind = self.token.kind;
        kind.is_modifier()
            || kind.is_type()
            || kind == TokenKind::Const
            || (kind == TokenKind::Identifier && self.token.lexeme == class)
    }

    /// member* inside the body of `class`
    pub(super) fn parse_members(&mut self, class: &str) -> CompileResult<()> {
        while self.starts_member(class) {
            self.parse_member(class)?;
        }
        Ok(())
    }

    /// member = modifier* const_decl
    ///        | modifier* class_name "(" params ")" "{" body "}"
    ///        | modifier* type ident "(" params ")" "{" body "}"
    ///        | modifier* type ident ("," ident)* ";"
    fn parse_member(&mut self, class: &str) -> CompileResult<()> {
        self.parse_modifiers()?;

        if self.check(TokenKind::Const) {
            return self.parse_const_decl();
        }

        if self.check(TokenKind::Identifier)
            && self.token.lexeme == class
            && self.peek_kind()? == TokenKind::LeftParen
        {
            return self.parse_constructor(class);
        }

        let ty = self.parse_type()?;
        if self.check(TokenKind::Identifier) && self.peek_kind()? == TokenKind::LeftParen {
            self.parse_method(ty)
        } else {
            self.parse_variable_list(ty)
        }
    }

    /// ident ("," ident)* ";", after the type has been read
    fn parse_variable_list(&mut self, ty: ValueType) -> CompileResult<()> {
        loop {
            let name = self.token.lexeme.clone();
            if !self.check(TokenKind::Identifier) {
                return Err(self.mismatch(TokenKind::Identifier.name()));
            }
            self.add_symbol(&name, SymbolKind::variable(ty))?;
            self.advance()?;
            if !self.consume(TokenKind::Comma)? {
                break;
            }
        }
        self.expect(TokenKind::SemiColon)?;
        Ok(())
    }

    /// const_decl = "const" type const_assign ("," const_assign)* ";"
    pub(super) fn parse_const_decl(&mut self) -> CompileResult<()> {
        self.expect(TokenKind::Const)?;
        let ty = self.parse_type()?;
        loop {
            self.parse_const_assign(ty)?;
            if !self.consume(TokenKind::Comma)? {
                break;
            }
        }
        self.expect(TokenKind::SemiColon)?;
        Ok(())
    }

    /// const_assign = ident "=" "-"? (number | numfloat | literal)
    fn parse_const_assign(&mut self, ty: ValueType) -> CompileResult<()> {
        let name = self.expect_ident()?;
        let op = self.expect(TokenKind::AssignOp)?;
        if op.lexeme != "=" {
            return Err(self.mismatch("="));
        }

        let negative = self.consume(TokenKind::SignOp)?;
        let value = match self.token.kind {
            TokenKind::Number if ty == ValueType::Float => {
                LiteralValue::Float(self.token.int_value as f64)
            }
            TokenKind::Number => LiteralValue::Int(self.token.int_value),
            TokenKind::NumFloat => LiteralValue::Float(self.token.float_value),
            TokenKind::Literal if !negative => match self.token.literal.chars().next() {
                Some(c) => LiteralValue::Char(c),
                None => return Err(self.mismatch("a character")),
            },
            _ => return Err(self.mismatch("a constant value")),
        };
        let value = match (negative, value) {
            (true, LiteralValue::Int(v)) => LiteralValue::Int(-v),
            (true, LiteralValue::Float(v)) => LiteralValue::Float(-v),
            (_, v) => v,
        };

        self.add_symbol(&name, SymbolKind::Constant { ty, value })?;
        self.advance()?;
        Ok(())
    }

    /// ident "(" params ")" "{" body "}", after the return type
    fn parse_method(&mut self, return_ty: ValueType) -> CompileResult<()> {
        let name = self.token.lexeme.clone();
        let id = self.add_symbol(&name, SymbolKind::method(return_ty))?;
        let qualified = self.qualified_name(id);
        self.advance()?;

        let is_main = name == "Main";
        if is_main {
            self.state.entry = Some(qualified.clone());
        }
        self.state.in_main = is_main;

        self.tac.emit(Instr::Proc(qualified.clone()));
        self.open_params(id)?;
        self.parse_params()?;
        self.close_params()?;
        self.parse_body()?;
        self.close_scope()?;
        self.tac.emit(Instr::Endp(qualified));

        self.state.in_main = false;
        Ok(())
    }

    /// Constructor: frame size is everything declared at its depth.
    fn parse_constructor(&mut self, class: &str) -> CompileResult<()> {
        let id = self.add_symbol(class, SymbolKind::method(ValueType::Void))?;
        let qualified = self.qualified_name(id);
        self.advance()?;

        self.tac.emit(Instr::Proc(qualified.clone()));
        self.open_params(id)?;
        self.parse_params()?;
        self.close_params()?;
        self.parse_body()?;

        let size = self.symbols.depth_size(self.state.depth);
        self.set_frame_size(id, size);
        self.close_scope()?;
        self.tac.emit(Instr::Endp(qualified));
        Ok(())
    }

    fn set_frame_size(&mut self, id: SymbolId, size: i32) {
        debug!("{} frame size {}", self.symbols[id].name, size);
        if let Some(symbol) = self.symbols.get_mut(id) {
            symbol.set_size_of_locals(size);
        }
    }

    /// params = (mode type ident ("," mode type ident)*)?
    /// mode   = ("ref" | "out")?
    fn parse_params(&mut self) -> CompileResult<()> {
        if self.check(TokenKind::RightParen) {
            return Ok(());
        }

        loop {
            let mode = PassingMode::from_token(self.token.kind);
            if mode != PassingMode::ByValue {
                self.advance()?;
            }
            let ty = self.parse_type()?;

            let name = self.token.lexeme.clone();
            if !self.check(TokenKind::Identifier) {
                return Err(self.mismatch(TokenKind::Identifier.name()));
            }
            self.add_symbol(
                &name,
                SymbolKind::Variable {
                    ty,
                    mode,
                    location: 0,
                },
            )?;
            self.advance()?;

            if !self.consume(TokenKind::Comma)? {
                return Ok(());
            }
        }
    }

    /// body = "{" local_decl* stmt* ("return" expr? ";")?
    ///
    /// The closing brace is left for the caller.
    fn parse_body(&mut self) -> CompileResult<()> {
        self.open_body()?;
        self.parse_local_decls()?;
        self.parse_stmts()?;
        if self.check(TokenKind::Return) {
            self.parse_return()?;
        }
        Ok(())
    }

    /// local_decl = const_decl | type ident ("," ident)* ";"
    fn parse_local_decls(&mut self) -> CompileResult<()> {
        loop {
            if self.check(TokenKind::Const) {
                self.parse_const_decl()?;
            } else if self.token.kind.is_type() {
                let ty = self.parse_type()?;
                self.parse_variable_list(ty)?;
            } else {
                return Ok(());
            }
        }
    }

    /// return = "return" expr? ";"
    fn parse_return(&mut self) -> CompileResult<()> {
        self.expect(TokenKind::Return)?;
        if !self.check(TokenKind::SemiColon) {
            let value = self.parse_expr()?;
            if !self.state.in_main {
                self.tac.emit(Instr::Assign {
                    dest: Operand::Accumulator,
                    src: value,
                });
            }
        }
        self.expect(TokenKind::SemiColon)?;
        Ok(())
    }
}
