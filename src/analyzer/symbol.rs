use std::fmt;

use super::{LiteralValue, PassingMode, ValueType};

/// Stable handle to a record in the [`SymbolTable`](super::SymbolTable) arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub(crate) usize);

/// What a name denotes, with the fields that only make sense for that entity.
#[derive(Clone, Debug, PartialEq)]
pub enum SymbolKind {
    Variable {
        ty: ValueType,
        mode: PassingMode,
        /// 1-based position in the owning method's parameter list, 0 for locals.
        location: usize,
    },
    Constant {
        ty: ValueType,
        value: LiteralValue,
    },
    Method {
        return_ty: ValueType,
        num_params: usize,
        size_of_locals: i32,
        size_of_params: i32,
    },
    Class {
        size_of_locals: i32,
    },
    Namespace,
    /// Placeholder synthesized for an undeclared name.
    Empty,
}

impl SymbolKind {
    pub fn variable(ty: ValueType) -> Self {
        SymbolKind::Variable {
            ty,
            mode: PassingMode::ByValue,
            location: 0,
        }
    }

    pub fn method(return_ty: ValueType) -> Self {
        SymbolKind::Method {
            return_ty,
            num_params: 0,
            size_of_locals: 0,
            size_of_params: 0,
        }
    }

    pub fn class() -> Self {
        SymbolKind::Class { size_of_locals: 0 }
    }

    /// Bytes a record of this kind occupies in a frame or data segment.
    /// Placeholders take a word so each gets its own slot.
    pub fn size(&self) -> i32 {
        match self {
            SymbolKind::Variable { ty, .. } => ty.sizeof(),
            SymbolKind::Empty => ValueType::Int.sizeof(),
            SymbolKind::Constant { .. }
            | SymbolKind::Method { .. }
            | SymbolKind::Class { .. }
            | SymbolKind::Namespace => 0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SymbolKind::Variable { .. } => "variable",
            SymbolKind::Constant { .. } => "constant",
            SymbolKind::Method { .. } => "method",
            SymbolKind::Class { .. } => "class",
            SymbolKind::Namespace => "namespace",
            SymbolKind::Empty => "empty",
        }
    }
}

/// One declared or synthesized entity.
#[derive(Clone, Debug, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub depth: usize,
    pub offset: i32,
    pub size: i32,
    pub owner: Option<SymbolId>,
    /// Children summary captured when the owning scope closed.
    pub children: String,
}

impl Symbol {
    pub fn new(name: &str, kind: SymbolKind, depth: usize) -> Self {
        Self {
            name: name.to_string(),
            size: kind.size(),
            kind,
            depth,
            offset: 0,
            owner: None,
            children: String::new(),
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self.kind {
            SymbolKind::Variable { ty, .. } | SymbolKind::Constant { ty, .. } => ty,
            SymbolKind::Method { return_ty, .. } => return_ty,
            _ => ValueType::Empty,
        }
    }

    pub fn passing_mode(&self) -> PassingMode {
        match self.kind {
            SymbolKind::Variable { mode, .. } => mode,
            _ => PassingMode::ByValue,
        }
    }

    pub fn location(&self) -> usize {
        match self.kind {
            SymbolKind::Variable { location, .. } => location,
            _ => 0,
        }
    }

    pub fn num_params(&self) -> usize {
        match self.kind {
            SymbolKind::Method { num_params, .. } => num_params,
            _ => 0,
        }
    }

    pub fn size_of_locals(&self) -> i32 {
        match self.kind {
            SymbolKind::Method { size_of_locals, .. } | SymbolKind::Class { size_of_locals } => {
                size_of_locals
            }
            _ => self.size,
        }
    }

    pub fn size_of_params(&self) -> i32 {
        match self.kind {
            SymbolKind::Method { size_of_params, .. } => size_of_params,
            _ => 0,
        }
    }

    pub fn constant_value(&self) -> Option<LiteralValue> {
        match self.kind {
            SymbolKind::Constant { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self.kind, SymbolKind::Constant { .. })
    }

    pub fn is_method(&self) -> bool {
        matches!(self.kind, SymbolKind::Method { .. })
    }

    pub fn is_class(&self) -> bool {
        matches!(self.kind, SymbolKind::Class { .. })
    }

    /// Adds to a class's or method's locals total. No-op for other kinds.
    pub fn grow_locals(&mut self, bytes: i32) {
        if let SymbolKind::Method { size_of_locals, .. } | SymbolKind::Class { size_of_locals } =
            &mut self.kind
        {
            *size_of_locals += bytes;
        }
    }

    pub fn set_size_of_locals(&mut self, bytes: i32) {
        if let SymbolKind::Method { size_of_locals, .. } | SymbolKind::Class { size_of_locals } =
            &mut self.kind
        {
            *size_of_locals = bytes;
        }
    }

    /// Registers a parameter of `bytes` on a method and returns its position.
    pub fn add_param(&mut self, bytes: i32) -> usize {
        match &mut self.kind {
            SymbolKind::Method {
                num_params,
                size_of_params,
                ..
            } => {
                *num_params += 1;
                *size_of_params += bytes;
                *num_params
            }
            _ => 0,
        }
    }
}

/// `_BP+4`, `_BP-2`.
pub fn frame_slot(offset: i32) -> String {
    if offset < 0 {
        format!("_BP{}", offset)
    } else {
        format!("_BP+{}", offset)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            SymbolKind::Variable { ty, mode, .. } => {
                write!(f, "{}", mode.prefix())?;
                if *ty != ValueType::Empty {
                    write!(f, "{} ", ty)?;
                }
                write!(f, "{}\t//size:{} offset:{}", self.name, self.size, self.offset)?;
            }
            SymbolKind::Constant { ty, value } => {
                write!(
                    f,
                    "const {} {}\t//size:{} offset:{} value:{}",
                    ty, self.name, self.size, self.offset, value
                )?;
            }
            SymbolKind::Method {
                return_ty,
                num_params,
                size_of_locals,
                ..
            } => {
                if *return_ty != ValueType::Empty {
                    write!(f, "{} ", return_ty)?;
                }
                write!(
                    f,
                    "{}() \t//size:{} params:{} offset:{}{}",
                    self.name, size_of_locals, num_params, self.offset, self.children
                )?;
            }
            SymbolKind::Class { size_of_locals } => {
                write!(
                    f,
                    "class {} \t//size:{}{}",
                    self.name, size_of_locals, self.children
                )?;
            }
            SymbolKind::Namespace | SymbolKind::Empty => {
                write!(
                    f,
                    "{}, type:{} offset:{}",
                    self.name,
                    self.kind.name(),
                    self.offset
                )?;
            }
        }

        if self.location() > 0 {
            write!(f, " location:{}", self.location())?;
        }
        Ok(())
    }
}
