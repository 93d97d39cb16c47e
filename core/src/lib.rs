//! Live read/write views into a call frame's local, cell and free variables.

pub mod error;
pub mod locals;
pub mod resolve;
pub mod rt;
pub mod util;
pub mod val;
pub mod vm;

pub use error::{LocalsError, Result};
pub use locals::{LiveLocals, livelocals, livelocals_uncached, weak_livelocals};
pub use resolve::{CodeMeta, SlotKind, SlotRef, SlotResolver};
pub use rt::{Generator, generator_locals};
pub use val::Val;
pub use vm::{Frame, FrameGuard, FrameId, VarCell};
