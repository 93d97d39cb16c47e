//! Raw get/set/clear over a frame's slot storage.
//!
//! Every operation re-validates the frame's liveness and the slot index
//! against the declared ranges before it touches storage; callers (the
//! resolver included) are not trusted to hand in a valid `SlotRef`.
//!
//! Writes follow acquire-then-release: `store` takes ownership of the new
//! value through its by-value parameter, swaps it into the slot and returns
//! the previous occupant as a [`Displaced`] value. The previous occupant is
//! only released when the caller lets go of `Displaced`, which is always after
//! the storage lock has been dropped.

use std::sync::{Arc, MutexGuard};

use tracing::trace;

use crate::error::{LocalsError, Result};
use crate::resolve::{SlotKind, SlotRef};
use crate::val::Val;

use super::cell::VarCell;
use super::frame::{Frame, FrameStorage};

/// Value pushed out of a slot by `store` or `clear`.
#[must_use = "dropping a Displaced releases the previous value; call `release` to make that explicit"]
#[derive(Debug, Default)]
pub struct Displaced(Option<Val>);

impl Displaced {
    /// True when the slot was unbound before the operation.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// Releases the previous occupant.
    #[inline]
    pub fn release(self) {
        drop(self)
    }

    #[inline]
    pub fn into_inner(self) -> Option<Val> {
        self.0
    }
}

enum Access<'f> {
    Fast { storage: MutexGuard<'f, FrameStorage>, index: usize },
    Cell(Arc<VarCell>),
}

/// Validated access to one frame's storage.
pub struct SlotStore<'f> {
    frame: &'f Frame,
}

impl<'f> SlotStore<'f> {
    #[inline]
    pub(crate) fn new(frame: &'f Frame) -> Self {
        Self { frame }
    }

    /// Declared index range for a slot kind.
    fn range(&self, kind: SlotKind) -> (usize, usize) {
        let code = self.frame.code();
        match kind {
            SlotKind::Local => (0, code.nlocals()),
            SlotKind::Cell | SlotKind::Free => (code.nlocals(), code.nslots()),
        }
    }

    fn out_of_range(&self, slot: SlotRef) -> LocalsError {
        let (start, end) = self.range(slot.kind);
        LocalsError::IndexOutOfRange {
            kind: slot.kind,
            index: slot.index,
            start,
            end,
        }
    }

    /// Liveness and bounds checks, then either the locked storage (fast slot)
    /// or the slot's cell with the frame lock already released.
    fn access(&self, slot: SlotRef) -> Result<Access<'f>> {
        let storage = self.frame.lock();
        if !storage.alive {
            return Err(LocalsError::InvalidFrame { frame: self.frame.id() });
        }
        let (start, end) = self.range(slot.kind);
        if slot.index < start || slot.index >= end {
            return Err(self.out_of_range(slot));
        }
        match slot.kind {
            SlotKind::Local => Ok(Access::Fast {
                storage,
                index: slot.index,
            }),
            SlotKind::Cell | SlotKind::Free => storage
                .cells
                .get(slot.index - start)
                .map(|cell| Access::Cell(Arc::clone(cell)))
                .ok_or_else(|| self.out_of_range(slot)),
        }
    }

    fn fast<'s>(&self, storage: &'s mut FrameStorage, index: usize) -> Result<&'s mut Option<Val>> {
        let frame = self.frame;
        storage.fast.get_mut(index).ok_or_else(|| {
            let code = frame.code();
            LocalsError::IndexOutOfRange {
                kind: SlotKind::Local,
                index,
                start: 0,
                end: code.nlocals(),
            }
        })
    }

    /// A new reference to the slot's value; the slot keeps its own.
    pub fn load(&self, slot: SlotRef) -> Result<Val> {
        let value = match self.access(slot)? {
            Access::Fast { mut storage, index } => self.fast(&mut storage, index)?.clone(),
            Access::Cell(cell) => cell.get(),
        };
        value.ok_or(LocalsError::Unbound { index: slot.index })
    }

    pub fn is_bound(&self, slot: SlotRef) -> Result<bool> {
        Ok(match self.access(slot)? {
            Access::Fast { mut storage, index } => self.fast(&mut storage, index)?.is_some(),
            Access::Cell(cell) => !cell.is_empty(),
        })
    }

    /// Binds `value`, returning whatever the slot held before.
    ///
    /// On error nothing was written and `value` is dropped.
    pub fn store(&self, slot: SlotRef, value: Val) -> Result<Displaced> {
        let previous = match self.access(slot)? {
            Access::Fast { mut storage, index } => self.fast(&mut storage, index)?.replace(value),
            Access::Cell(cell) => cell.replace(Some(value)),
        };
        trace!(frame = %self.frame.id(), kind = %slot.kind, index = slot.index, "slot stored");
        Ok(Displaced(previous))
    }

    /// Unbinds the slot. Clearing an unbound slot succeeds and displaces nothing.
    pub fn clear(&self, slot: SlotRef) -> Result<Displaced> {
        let previous = match self.access(slot)? {
            Access::Fast { mut storage, index } => self.fast(&mut storage, index)?.take(),
            Access::Cell(cell) => cell.take(),
        };
        trace!(frame = %self.frame.id(), kind = %slot.kind, index = slot.index, "slot cleared");
        Ok(Displaced(previous))
    }

    /// The indirection cell behind a cell or free slot.
    pub fn cell(&self, slot: SlotRef) -> Result<Arc<VarCell>> {
        if !slot.kind.is_indirect() {
            let code = self.frame.code();
            return Err(LocalsError::IndexOutOfRange {
                kind: slot.kind,
                index: slot.index,
                start: code.nlocals(),
                end: code.nslots(),
            });
        }
        match self.access(slot)? {
            Access::Cell(cell) => Ok(cell),
            Access::Fast { .. } => Err(self.out_of_range(slot)),
        }
    }
}
