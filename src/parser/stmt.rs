use std::collections::VecDeque;

use crate::{
    codegen::{BinOp, Instr, Operand},
    error::CompileResult,
    lexer::TokenKind,
};

use super::{expr::identity, Parser};

impl Parser {
    fn starts_stmt(&self) -> bool {
        matches!(
            self.token.kind,
            TokenKind::Identifier | TokenKind::Read | TokenKind::Write | TokenKind::Writeln
        )
    }

    /// stmt* where stmt = (assign_stmt | io_stmt) ";"
    pub(super) fn parse_stmts(&mut self) -> CompileResult<()> {
        while self.starts_stmt() {
            self.parse_stmt()?;
            self.expect(TokenKind::SemiColon)?;
        }
        Ok(())
    }

    fn parse_stmt(&mut self) -> CompileResult<()> {
        match self.token.kind {
            TokenKind::Identifier => self.parse_assign_stmt(),
            TokenKind::Read => self.parse_read(),
            TokenKind::Write | TokenKind::Writeln => self.parse_write(),
            _ => Err(self.mismatch("a statement")),
        }
    }

    /// `ident (` or `ident .`: a call rather than a variable.
    fn at_call(&mut self) -> CompileResult<bool> {
        Ok(self.check(TokenKind::Identifier)
            && matches!(
                self.peek_kind()?,
                TokenKind::Period | TokenKind::LeftParen
            ))
    }

    /// assign_stmt = ident assignop (call | expr)
    ///             | call
    ///
    /// `x op= e` is `x = x op e`, computed straight into `x`.
    fn parse_assign_stmt(&mut self) -> CompileResult<()> {
        if self.at_call()? {
            return self.parse_call();
        }

        let name = self.token.lexeme.clone();
        let target = self.resolve_read(&name)?;
        if self.symbols[target].is_constant() {
            return Err(self.assign_to_constant(&name));
        }
        let dest = self.operand_of(target);
        self.advance()?;

        if !self.check(TokenKind::AssignOp) {
            return Err(self.mismatch(TokenKind::AssignOp.name()));
        }
        let compound = match self.token.lexeme.as_str() {
            "=" => None,
            "+=" => Some(BinOp::Add),
            "-=" => Some(BinOp::Sub),
            "*=" => Some(BinOp::Mul),
            "/=" => Some(BinOp::Div),
            _ => return Err(self.mismatch("=, +=, -=, *= or /=")),
        };
        self.advance()?;

        let src = if self.at_call()? {
            self.parse_call()?;
            if compound.is_some() {
                // `x op= F()` loads `x` into `_AX` first, so park the result.
                let temp = self.new_temp();
                self.tac.emit(Instr::Assign {
                    dest: temp.clone(),
                    src: Operand::Accumulator,
                });
                temp
            } else {
                Operand::Accumulator
            }
        } else {
            self.parse_expr()?
        };
        let instr = match compound.map(|op| (op, identity(&dest, op, &src))) {
            None => Instr::Assign { dest, src },
            Some((_, Some(same))) => Instr::Assign { dest, src: same },
            Some((op, None)) => Instr::Binary {
                dest: dest.clone(),
                left: dest,
                op,
                right: src,
            },
        };
        self.tac.emit(instr);
        Ok(())
    }

    /// call = ident ("." ident)? "(" (expr ("," expr)*)? ")"
    ///
    /// Each argument's push goes in front of the ones before it, so the first
    /// argument is pushed last and lands at `_BP+4` in the callee.
    pub(super) fn parse_call(&mut self) -> CompileResult<()> {
        let first = self.expect_ident()?;
        let (qualifier, method) = if self.consume(TokenKind::Period)? {
            (Some(first), self.expect_ident()?)
        } else {
            (None, first)
        };

        self.expect(TokenKind::LeftParen)?;
        let mut pushes = VecDeque::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                let arg = self.parse_expr()?;
                pushes.push_front(Instr::Push(arg));
                if !self.consume(TokenKind::Comma)? {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen)?;

        for push in pushes {
            self.tac.emit(push);
        }
        let target = self.call_target(qualifier.as_deref(), &method);
        self.tac.emit(Instr::Call(target));
        Ok(())
    }

    fn call_target(&self, qualifier: Option<&str>, method: &str) -> String {
        if let Some(class) = qualifier {
            return format!("{}.{}", class, method);
        }
        if let Some(id) = self.symbols.lookup(method) {
            if self.symbols[id].is_method() {
                return self.qualified_name(id);
            }
        }
        match self.state.current_class.and_then(|id| self.symbols.get(id)) {
            Some(class) => format!("{}.{}", class.name, method),
            None => method.to_string(),
        }
    }

    /// read = "read" "(" ident ("," ident)* ")"
    fn parse_read(&mut self) -> CompileResult<()> {
        self.expect(TokenKind::Read)?;
        self.expect(TokenKind::LeftParen)?;
        loop {
            let name = self.token.lexeme.clone();
            if !self.check(TokenKind::Identifier) {
                return Err(self.mismatch(TokenKind::Identifier.name()));
            }
            let id = self.resolve_io(&name, "read")?;
            if self.symbols[id].is_constant() {
                return Err(self.assign_to_constant(&name));
            }
            let dest = self.operand_of(id);
            self.tac.emit(Instr::ReadInt(dest));
            self.advance()?;

            if !self.consume(TokenKind::Comma)? {
                break;
            }
        }
        self.expect(TokenKind::RightParen)?;
        Ok(())
    }

    /// write   = "write" "(" write_item ("," write_item)* ")"
    /// writeln = "writeln" "(" (write_item ("," write_item)*)? ")"
    fn parse_write(&mut self) -> CompileResult<()> {
        let newline = self.check(TokenKind::Writeln);
        self.advance()?;
        self.expect(TokenKind::LeftParen)?;

        if !(newline && self.check(TokenKind::RightParen)) {
            loop {
                self.parse_write_item()?;
                if !self.consume(TokenKind::Comma)? {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen)?;

        if newline {
            self.tac.emit(Instr::WriteLn);
        }
        Ok(())
    }

    /// write_item = ident | number | numfloat | literal
    fn parse_write_item(&mut self) -> CompileResult<()> {
        let instr = match self.token.kind {
            TokenKind::Identifier => {
                let id = self.resolve_io(&self.token.lexeme, "write")?;
                Instr::WriteInt(self.operand_of(id))
            }
            TokenKind::Number | TokenKind::NumFloat => {
                Instr::WriteInt(Operand::Literal(self.token.lexeme.clone()))
            }
            TokenKind::Literal => {
                let label = self.strings.intern(&self.token.lexeme).to_string();
                Instr::WriteStr(label)
            }
            _ => return Err(self.mismatch("an identifier, number or literal")),
        };
        self.tac.emit(instr);
        self.advance()?;
        Ok(())
    }
}
