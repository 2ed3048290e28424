use log::warn;

use crate::analyzer::{StringTable, SymbolKind, SymbolTable};

use super::{BinOp, Instr, Operand, Tac};

/// Lowers TAC to 16-bit MASM, linked against `io.asm` for console I/O.
pub struct Codegen<'a> {
    symbols: &'a SymbolTable,
    strings: &'a StringTable,
    filename: &'a str,
    out: String,
}

/// `Foo.Bar` -> `Foo_Bar`
fn proc_name(qualified: &str) -> String {
    qualified.replace('.', "_")
}

/// Register-free operand text: `[bp-2]`, `count`, `5`, `ax`.
fn address(op: &Operand) -> String {
    match op {
        Operand::Literal(s) => immediate(s),
        Operand::Global(s) => s.clone(),
        Operand::Frame(offset) if *offset < 0 => format!("[bp{}]", offset),
        Operand::Frame(offset) => format!("[bp+{}]", offset),
        Operand::Accumulator => "ax".to_string(),
    }
}

/// 16-bit immediates only; float literals are truncated toward zero.
fn immediate(literal: &str) -> String {
    if !literal.contains('.') {
        return literal.to_string();
    }
    match literal.parse::<f64>() {
        Ok(value) => {
            let word = value.trunc() as i16;
            warn!("float literal {} truncated to {}", literal, word);
            word.to_string()
        }
        Err(_) => {
            warn!("cannot lower literal {}, using 0", literal);
            "0".to_string()
        }
    }
}

/// Like [`address`], but sized for instructions with no register operand.
fn memory(op: &Operand) -> String {
    match op {
        Operand::Frame(_) => format!("word ptr {}", address(op)),
        _ => address(op),
    }
}

impl<'a> Codegen<'a> {
    pub fn new(symbols: &'a SymbolTable, strings: &'a StringTable, filename: &'a str) -> Self {
        Self {
            symbols,
            strings,
            filename,
            out: String::new(),
        }
    }

    pub fn generate(mut self, tac: &Tac) -> String {
        self.gen_header();
        self.gen_data_segment();
        self.gen_code_segment();
        for instr in tac.instrs() {
            self.gen_instr(instr);
        }
        self.out
    }

    fn emit(&mut self, line: impl AsRef<str>) {
        self.out.push_str(line.as_ref());
        self.out.push('\n');
    }

    fn gen_header(&mut self) {
        self.emit(format!("; {}", self.filename));
        self.emit("    .model small");
        self.emit("    .586");
        self.emit("    .stack 100h");
        self.emit("");
    }

    fn gen_data_segment(&mut self) {
        self.emit("; data segment");
        self.emit("    .data");

        for entry in self.strings.entries() {
            let text = &entry.text;
            let body = text.get(1..text.len().saturating_sub(1)).unwrap_or_default();
            let body = body.replace('"', "\", 34, \"");
            self.emit(format!("{} DB \"{}\", '$'", entry.label, body));
        }

        let mut globals: Vec<&str> = vec![];
        for symbol in self.symbols.symbols_at_depth(1) {
            if matches!(symbol.kind, SymbolKind::Variable { .. })
                && !globals.contains(&symbol.name.as_str())
            {
                globals.push(&symbol.name);
            }
        }
        for name in globals {
            self.emit(format!("{} dw ?", name));
        }

        self.emit("");
    }

    fn gen_code_segment(&mut self) {
        self.emit("; code segment");
        self.emit("    .code");
        self.emit("    include io.asm");
    }

    /// (locals, params) in bytes for the method named `Class.Method`.
    fn frame(&self, qualified: &str) -> (i32, i32) {
        let method = qualified
            .split_once('.')
            .and_then(|(class, method)| self.symbols.find_method(class, method));
        match method {
            Some(m) => (m.size_of_locals(), m.size_of_params()),
            None => {
                warn!("no method record for {}, assuming an empty frame", qualified);
                (0, 0)
            }
        }
    }

    fn gen_instr(&mut self, instr: &Instr) {
        match instr {
            Instr::Proc(name) => {
                let (locals, _) = self.frame(name);
                self.emit(format!("{} proc", proc_name(name)));
                self.emit("    push bp");
                self.emit("    mov bp, sp");
                if locals != 0 {
                    self.emit(format!("    sub sp, {}", locals));
                }
            }
            Instr::Endp(name) => {
                let (locals, params) = self.frame(name);
                if locals != 0 {
                    self.emit(format!("    add sp, {}", locals));
                }
                self.emit("    pop bp");
                if params == 0 {
                    self.emit("    ret");
                } else {
                    self.emit(format!("    ret {}", params));
                }
                self.emit(format!("{} endp", proc_name(name)));
            }
            Instr::Push(op) => self.emit(format!("    push {}", memory(op))),
            Instr::Call(name) => self.emit(format!("    call {}", proc_name(name))),
            Instr::Binary { .. } if instr.is_increment() || instr.is_decrement() => {
                self.gen_step(instr)
            }
            Instr::Binary {
                dest,
                left,
                op,
                right,
            } => self.gen_binary(dest, left, *op, right),
            Instr::Assign { dest, src } => self.gen_move(dest, src),
            Instr::Negate { dest, src } => {
                self.emit(format!("    mov ax, {}", address(src)));
                self.emit("    neg ax");
                self.emit(format!("    mov {}, ax", address(dest)));
            }
            Instr::ReadInt(dest) => {
                self.emit("    push bx");
                self.emit("    call readint");
                self.emit(format!("    mov {}, bx", address(dest)));
                self.emit("    pop bx");
            }
            Instr::WriteInt(src) => {
                self.emit(format!("    mov ax, {}", address(src)));
                self.emit("    call writeint");
            }
            Instr::WriteStr(label) => {
                self.emit("    push dx");
                self.emit(format!("    mov dx, OFFSET {}", label));
                self.emit("    call writestr");
                self.emit("    pop dx");
            }
            Instr::WriteLn => self.emit("    call writeln"),
            Instr::Start(entry) => self.gen_start(entry),
        }
    }

    /// `x = y + 1` / `x = y - 1`: `inc`/`dec`, in place when `x` is `y`.
    fn gen_step(&mut self, instr: &Instr) {
        let Instr::Binary {
            dest,
            left,
            op,
            right,
        } = instr
        else {
            return;
        };
        let mnemonic = if *op == BinOp::Add { "inc" } else { "dec" };
        let src = if right.is_one() && !left.is_literal() {
            left
        } else {
            right
        };

        if src == dest {
            self.emit(format!("    {} {}", mnemonic, memory(dest)));
        } else {
            self.emit(format!("    mov ax, {}", address(src)));
            self.emit(format!("    {} ax", mnemonic));
            self.emit(format!("    mov {}, ax", address(dest)));
        }
    }

    fn gen_binary(&mut self, dest: &Operand, left: &Operand, op: BinOp, right: &Operand) {
        match op {
            BinOp::Add if right.is_zero() => return self.gen_move(dest, left),
            BinOp::Add if left.is_zero() => return self.gen_move(dest, right),
            BinOp::Sub if right.is_zero() => return self.gen_move(dest, left),
            BinOp::Mul if left.is_zero() || right.is_zero() => {
                return self.emit(format!("    mov {}, 0", memory(dest)))
            }
            BinOp::Mul if right.is_one() => return self.gen_move(dest, left),
            BinOp::Mul if left.is_one() => return self.gen_move(dest, right),
            BinOp::Div if left.is_zero() => {
                return self.emit(format!("    mov {}, 0", memory(dest)))
            }
            BinOp::Div if right.is_one() => return self.gen_move(dest, left),
            _ => {}
        }

        match op {
            BinOp::Mul | BinOp::Div => {
                self.emit("    push bx");
                self.emit(format!("    mov ax, {}", address(left)));
                self.emit(format!("    mov bx, {}", address(right)));
                if op == BinOp::Mul {
                    self.emit("    imul bx");
                } else {
                    self.emit("    cwd");
                    self.emit("    idiv bx");
                }
                self.emit(format!("    mov {}, ax", address(dest)));
                self.emit("    pop bx");
            }
            BinOp::Add | BinOp::Sub | BinOp::Or | BinOp::And => {
                let mnemonic = match op {
                    BinOp::Add => "add",
                    BinOp::Sub => "sub",
                    BinOp::Or => "or",
                    _ => "and",
                };
                self.emit(format!("    mov ax, {}", address(left)));
                self.emit(format!("    {} ax, {}", mnemonic, address(right)));
                self.emit(format!("    mov {}, ax", address(dest)));
            }
        }
    }

    fn gen_move(&mut self, dest: &Operand, src: &Operand) {
        if dest == src {
            return;
        }
        if *dest == Operand::Accumulator {
            self.emit(format!("    mov ax, {}", address(src)));
        } else if *src == Operand::Accumulator {
            self.emit(format!("    mov {}, ax", address(dest)));
        } else {
            self.emit(format!("    mov ax, {}", address(src)));
            self.emit(format!("    mov {}, ax", address(dest)));
        }
    }

    fn gen_start(&mut self, entry: &str) {
        self.emit("start proc");
        self.emit("    mov ax, @data");
        self.emit("    mov ds, ax");
        self.emit(format!("    call {}", proc_name(entry)));
        self.emit("    mov al, 0");
        self.emit("    mov ah, 4ch");
        self.emit("    int 21h");
        self.emit("start endp");
        self.emit("    end start");
    }
}
