use crate::{
    codegen::{BinOp, Instr, Operand},
    error::CompileResult,
    lexer::TokenKind,
};

use super::Parser;

impl Parser {
    /// The operator at the current token if it is one of `kinds`.
    fn binop_at(&self, kinds: &[TokenKind]) -> Option<BinOp> {
        if kinds.contains(&self.token.kind) {
            BinOp::from_lexeme(&self.token.lexeme)
        } else {
            None
        }
    }

    /// expr = term (("+" | "-" | "||") term)*
    pub(super) fn parse_expr(&mut self) -> CompileResult<Operand> {
        let mut left = self.parse_term()?;
        while let Some(op) = self.binop_at(&[TokenKind::AddOp, TokenKind::SignOp, TokenKind::OrOp])
        {
            self.advance()?;
            let right = self.parse_term()?;
            left = self.fold(left, op, right);
        }
        Ok(left)
    }

    /// term = factor (("*" | "/" | "&&") factor)*
    fn parse_term(&mut self) -> CompileResult<Operand> {
        let mut left = self.parse_factor()?;
        while let Some(op) = self.binop_at(&[TokenKind::MulOp, TokenKind::AndOp]) {
            self.advance()?;
            let right = self.parse_factor()?;
            left = self.fold(left, op, right);
        }
        Ok(left)
    }

    /// factor = ident | number | numfloat | "(" expr ")" | "-" factor
    fn parse_factor(&mut self) -> CompileResult<Operand> {
        match self.token.kind {
            TokenKind::Identifier => {
                let name = self.token.lexeme.clone();
                let id = self.resolve_read(&name)?;
                self.advance()?;
                Ok(self.operand_of(id))
            }
            TokenKind::Number | TokenKind::NumFloat => {
                let literal = Operand::Literal(self.token.lexeme.clone());
                self.advance()?;
                Ok(literal)
            }
            TokenKind::LeftParen => {
                self.advance()?;
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RightParen)?;
                Ok(inner)
            }
            TokenKind::SignOp => {
                self.advance()?;
                let operand = self.parse_factor()?;
                Ok(self.negate(operand))
            }
            _ => Err(self.mismatch("an identifier, number, ( or -")),
        }
    }

    fn negate(&mut self, operand: Operand) -> Operand {
        match operand {
            Operand::Literal(text) => match text.strip_prefix('-') {
                Some(positive) => Operand::Literal(positive.to_string()),
                None => Operand::Literal(format!("-{}", text)),
            },
            src => {
                let dest = self.new_temp();
                self.tac.emit(Instr::Negate {
                    dest: dest.clone(),
                    src,
                });
                dest
            }
        }
    }

    /// Applies `op` to two resolved operands, leaving the result in a new
    /// temporary unless the operation is an identity.
    pub(super) fn fold(&mut self, left: Operand, op: BinOp, right: Operand) -> Operand {
        if let Some(same) = identity(&left, op, &right) {
            return same;
        }

        let dest = self.new_temp();
        self.tac.emit(Instr::Binary {
            dest: dest.clone(),
            left,
            op,
            right,
        });
        dest
    }
}

/// `x + 0`, `0 + x`, `x - 0`, `x * 1`, `1 * x` and `x / 1` reduce to `x`.
pub(super) fn identity(left: &Operand, op: BinOp, right: &Operand) -> Option<Operand> {
    match op {
        BinOp::Add if right.is_zero() => Some(left.clone()),
        BinOp::Add if left.is_zero() => Some(right.clone()),
        BinOp::Sub if right.is_zero() => Some(left.clone()),
        BinOp::Mul if right.is_one() => Some(left.clone()),
        BinOp::Mul if left.is_one() => Some(right.clone()),
        BinOp::Div if right.is_one() => Some(left.clone()),
        _ => None,
    }
}
