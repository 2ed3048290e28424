use crate::analyzer::SymbolId;

use super::local_variables::LocalVariables;

/// Everything the translator mutates besides the tables themselves.
#[derive(Clone, Debug, Default)]
pub struct ParserState {
    /// 0 = global/namespace, 1 = class body, 2+ = parameter list and method body.
    pub depth: usize,
    pub locals: LocalVariables,
    /// Record whose scope is currently open.
    pub parent: Option<SymbolId>,
    /// Most recently inserted record.
    pub current: Option<SymbolId>,
    pub current_class: Option<SymbolId>,
    pub current_method: Option<SymbolId>,
    pub in_params: bool,
    pub in_main: bool,
    /// `Class.Main`, once seen.
    pub entry: Option<String>,
}

impl ParserState {
    pub fn new() -> Self {
        Self::default()
    }
}
