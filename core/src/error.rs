use std::fmt;
use std::sync::Arc;

use crate::resolve::SlotKind;
use crate::vm::FrameId;

pub type Result<T, E = LocalsError> = std::result::Result<T, E>;

/// Failure of a slot store or live mapping operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalsError {
    /// The name is none of the frame's local, cell or free variables.
    KeyNotDeclared { name: Arc<str> },
    /// The name is declared but its slot currently holds no value.
    NameUnbound { name: Arc<str> },
    /// Store-level form of `NameUnbound`, before the index is mapped back to a name.
    Unbound { index: usize },
    /// An index fell outside the declared range for its slot kind.
    IndexOutOfRange {
        kind: SlotKind,
        index: usize,
        start: usize,
        end: usize,
    },
    /// The frame has terminated and its storage was reclaimed.
    InvalidFrame { frame: FrameId },
    /// No frame is executing on this thread.
    NoCurrentFrame,
    /// Code metadata declares the same name twice.
    DuplicateName { name: Arc<str> },
    /// A frame was handed the wrong number of cells for its free variables.
    FreeCellCount { expected: usize, found: usize },
    /// A closure tried to capture a fast local instead of a cell.
    NotACell { name: Arc<str> },
}

impl LocalsError {
    pub fn key_not_declared(name: &str) -> Self {
        Self::KeyNotDeclared { name: Arc::from(name) }
    }

    pub fn name_unbound(name: &str) -> Self {
        Self::NameUnbound { name: Arc::from(name) }
    }

    /// Lookup failures a caller may want to swallow (`get_or`, `setdefault`).
    pub fn is_lookup_error(&self) -> bool {
        matches!(self, Self::KeyNotDeclared { .. } | Self::NameUnbound { .. })
    }
}

impl fmt::Display for LocalsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyNotDeclared { name } => write!(f, "'{}' is not a variable of this frame", name),
            Self::NameUnbound { name } => write!(f, "variable '{}' is referenced before assignment", name),
            Self::Unbound { index } => write!(f, "slot {} is unbound", index),
            Self::IndexOutOfRange { kind, index, start, end } => {
                write!(f, "{} slot index {} out of range {}..{}", kind, index, start, end)
            }
            Self::InvalidFrame { frame } => write!(f, "frame {} is no longer live", frame),
            Self::NoCurrentFrame => write!(f, "no frame is executing on this thread"),
            Self::DuplicateName { name } => write!(f, "variable '{}' is declared more than once", name),
            Self::FreeCellCount { expected, found } => {
                write!(f, "expected {} cells for free variables, got {}", expected, found)
            }
            Self::NotACell { name } => write!(f, "variable '{}' is not a cell or free variable", name),
        }
    }
}

impl std::error::Error for LocalsError {}
