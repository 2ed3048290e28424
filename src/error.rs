use thiserror::Error;

/// A fatal condition that stops the translation of a compilation unit.
///
/// There is no partial output: once one of these is produced, the TAC
/// emitted so far is discarded.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{file}:{line}: expecting {expected} but found {found}")]
    Mismatch {
        file: String,
        line: u32,
        expected: String,
        found: String,
    },

    #[error("{file}:{line}: duplicate symbol \"{name}\"")]
    Duplicate {
        file: String,
        line: u32,
        name: String,
    },

    #[error("{file}:{line}: attempt to {access} undeclared variable {name}")]
    UndeclaredTarget {
        file: String,
        line: u32,
        access: &'static str,
        name: String,
    },

    #[error("{file}:{line}: \"{lexeme}\" is an invalid number")]
    MalformedNumber {
        file: String,
        line: u32,
        lexeme: String,
    },

    #[error("{file}:{line}: cannot assign to constant \"{name}\"")]
    AssignToConstant {
        file: String,
        line: u32,
        name: String,
    },

    #[error("Main() not found in {file}")]
    MissingMain { file: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CompileError {
    /// Source line the error points at, if it has one.
    pub fn line(&self) -> Option<u32> {
        match self {
            CompileError::Mismatch { line, .. }
            | CompileError::Duplicate { line, .. }
            | CompileError::UndeclaredTarget { line, .. }
            | CompileError::MalformedNumber { line, .. }
            | CompileError::AssignToConstant { line, .. } => Some(*line),
            CompileError::MissingMain { .. } | CompileError::Io(_) => None,
        }
    }
}

pub type CompileResult<T> = Result<T, CompileError>;
