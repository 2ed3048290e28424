use std::fmt;

use log::trace;

use crate::analyzer::frame_slot;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Or,
    And,
}

impl BinOp {
    pub fn from_lexeme(s: &str) -> Option<Self> {
        match s {
            "+" => Some(BinOp::Add),
            "-" => Some(BinOp::Sub),
            "*" => Some(BinOp::Mul),
            "/" => Some(BinOp::Div),
            "||" => Some(BinOp::Or),
            "&&" => Some(BinOp::And),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Or => "|",
            BinOp::And => "&",
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Something a TAC instruction reads or writes.
#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    /// Numeric literal text, possibly signed.
    Literal(String),
    /// Slot relative to the frame base, `_BP+4` / `_BP-2`.
    Frame(i32),
    /// Class-scope variable, addressed by name.
    Global(String),
    /// `_AX`, where methods leave their return value.
    Accumulator,
}

impl Operand {
    pub fn literal(value: impl fmt::Display) -> Self {
        Operand::Literal(value.to_string())
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Operand::Literal(_))
    }

    pub fn numeric_value(&self) -> Option<f64> {
        match self {
            Operand::Literal(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.numeric_value() == Some(0.0)
    }

    pub fn is_one(&self) -> bool {
        self.numeric_value() == Some(1.0)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Literal(s) | Operand::Global(s) => f.write_str(s),
            Operand::Frame(offset) => f.write_str(&frame_slot(*offset)),
            Operand::Accumulator => f.write_str("_AX"),
        }
    }
}

/// One three-address instruction.
#[derive(Clone, Debug, PartialEq)]
pub enum Instr {
    Proc(String),
    Endp(String),
    Push(Operand),
    Call(String),
    Binary {
        dest: Operand,
        left: Operand,
        op: BinOp,
        right: Operand,
    },
    Assign {
        dest: Operand,
        src: Operand,
    },
    Negate {
        dest: Operand,
        src: Operand,
    },
    ReadInt(Operand),
    WriteInt(Operand),
    WriteStr(String),
    WriteLn,
    Start(String),
}

impl Instr {
    /// `x + 1` / `1 + x` on a non-literal: lowered to `inc`.
    pub fn is_increment(&self) -> bool {
        match self {
            Instr::Binary {
                left,
                op: BinOp::Add,
                right,
                ..
            } => (right.is_one() && !left.is_literal()) || (left.is_one() && !right.is_literal()),
            _ => false,
        }
    }

    /// `x - 1` on a non-literal: lowered to `dec`.
    pub fn is_decrement(&self) -> bool {
        match self {
            Instr::Binary {
                left,
                op: BinOp::Sub,
                right,
                ..
            } => right.is_one() && !left.is_literal(),
            _ => false,
        }
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::Proc(name) => write!(f, "PROC {}", name),
            Instr::Endp(name) => write!(f, "ENDP {}", name),
            Instr::Push(op) => write!(f, "  PUSH {}", op),
            Instr::Call(name) => write!(f, "  CALL {}", name),
            Instr::Binary {
                dest,
                left,
                op,
                right,
            } => write!(f, "  {} = {} {} {}", dest, left, op, right),
            Instr::Assign { dest, src } => write!(f, "  {} = {}", dest, src),
            Instr::Negate { dest, src } => write!(f, "  {} = -{}", dest, src),
            Instr::ReadInt(op) => write!(f, "  RDI {}", op),
            Instr::WriteInt(op) => write!(f, "  WRI {}", op),
            Instr::WriteStr(label) => write!(f, "  WRS {}", label),
            Instr::WriteLn => write!(f, "  WRLN"),
            Instr::Start(name) => write!(f, "START {}", name),
        }
    }
}

/// Append-only sink of emitted instructions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tac {
    instrs: Vec<Instr>,
}

impl Tac {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, instr: Instr) {
        trace!("{}", instr);
        self.instrs.push(instr);
    }

    pub fn instrs(&self) -> &[Instr] {
        &self.instrs
    }

    pub fn len(&self) -> usize {
        self.instrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }

    /// Rendered lines with the indentation trimmed, handy for matching.
    pub fn lines(&self) -> Vec<String> {
        self.instrs
            .iter()
            .map(|i| i.to_string().trim().to_string())
            .collect()
    }
}

impl fmt::Display for Tac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instr in &self.instrs {
            writeln!(f, "{}", instr)?;
        }
        Ok(())
    }
}
