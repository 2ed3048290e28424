mod decl;
mod expr;
mod local_variables;
mod parser;
mod state;
mod stmt;

pub use local_variables::*;
pub use parser::*;
pub use state::*;
