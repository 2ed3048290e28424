mod string_table;
mod symbol;
mod symbol_table;
mod ty;

pub use string_table::*;
pub use symbol::*;
pub use symbol_table::*;
pub use ty::*;
