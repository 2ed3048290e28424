pub mod analyzer;
pub mod codegen;
pub mod error;
pub mod lexer;
pub mod parser;

use analyzer::{StringTable, SymbolTable};
use codegen::{Codegen, Tac};
use error::CompileResult;
use parser::Parser;

/// Everything a successful run produces.
#[derive(Debug)]
pub struct Compilation {
    pub tac: Tac,
    /// What survives the parse: namespace, classes, their members.
    pub symbols: SymbolTable,
    pub strings: StringTable,
    /// `Class.Main`
    pub entry: String,
    pub warnings: Vec<String>,
}

impl Compilation {
    pub fn assembly(&self, filename: &str) -> String {
        Codegen::new(&self.symbols, &self.strings, filename).generate(&self.tac)
    }

    /// Depths 0 and 1 of the symbol table followed by the string pool.
    pub fn symbol_report(&self) -> String {
        format!(
            "{}\n{}\n{}",
            self.symbols.write_table(0),
            self.symbols.write_table(1),
            self.strings
        )
    }
}

pub fn compile(source: &str, filename: &str) -> CompileResult<Compilation> {
    Parser::new(source, filename)?.parse()
}
