use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::val::Val;

/// Indirection cell backing a cell or free variable.
///
/// One cell is shared by the frame that defines the variable and by every
/// closure frame that captures it, so a write through any of them is seen by
/// all. Frames never replace a cell, only its contents.
#[derive(Default)]
pub struct VarCell {
    contents: Mutex<Option<Val>>,
}

impl VarCell {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_value(value: Val) -> Arc<Self> {
        Arc::new(Self {
            contents: Mutex::new(Some(value)),
        })
    }

    #[inline]
    fn lock(&self) -> MutexGuard<'_, Option<Val>> {
        // Every critical section is a single swap or clone, never half-applied.
        self.contents.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A new reference to the contents, or `None` while the cell is empty.
    #[inline]
    pub fn get(&self) -> Option<Val> {
        self.lock().clone()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lock().is_none()
    }

    /// Swaps in `value` and hands back the previous contents. The previous
    /// contents are returned, not dropped, so that the caller releases them
    /// after the cell lock is gone.
    #[inline]
    pub fn replace(&self, value: Option<Val>) -> Option<Val> {
        std::mem::replace(&mut *self.lock(), value)
    }

    #[inline]
    pub fn take(&self) -> Option<Val> {
        self.lock().take()
    }
}

impl fmt::Debug for VarCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.lock() {
            Some(v) => write!(f, "VarCell({:?})", v),
            None => write!(f, "VarCell(<empty>)"),
        }
    }
}
