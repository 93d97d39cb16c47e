use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace};

use crate::error::{LocalsError, Result};
use crate::resolve::{CodeMeta, SlotKind, SlotRef};
use crate::val::Val;

use super::cell::VarCell;
use super::store::SlotStore;

static NEXT_FRAME_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a frame, stable for the frame's whole life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(u64);

impl FrameId {
    fn next() -> Self {
        Self(NEXT_FRAME_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

/// Storage of a live frame.
///
/// `fast` holds the local slots `[0, nlocals)`; `cells` holds the cell and
/// free slots `[nlocals, nslots)` in order. Both ranges are emptied when the
/// frame terminates.
pub(crate) struct FrameStorage {
    pub(crate) alive: bool,
    pub(crate) fast: Vec<Option<Val>>,
    pub(crate) cells: Vec<Arc<VarCell>>,
}

/// Activation record of one in-progress execution of a routine.
pub struct Frame {
    id: FrameId,
    code: Arc<CodeMeta>,
    storage: Mutex<FrameStorage>,
}

impl Frame {
    /// Frame for code without free variables. Cell variables start as fresh,
    /// empty cells; locals start unbound.
    pub fn new(code: Arc<CodeMeta>) -> Result<Arc<Self>> {
        Self::with_free_cells(code, Vec::new())
    }

    /// Frame for a closure body: `free_cells` are the captured cells of the
    /// enclosing scopes, one per free variable, in declaration order.
    pub fn with_free_cells(code: Arc<CodeMeta>, free_cells: Vec<Arc<VarCell>>) -> Result<Arc<Self>> {
        if free_cells.len() != code.nfree() {
            return Err(LocalsError::FreeCellCount {
                expected: code.nfree(),
                found: free_cells.len(),
            });
        }
        let mut cells = Vec::with_capacity(code.ncells() + code.nfree());
        cells.extend((0..code.ncells()).map(|_| VarCell::new()));
        cells.extend(free_cells);
        let storage = FrameStorage {
            alive: true,
            fast: vec![None; code.nlocals()],
            cells,
        };
        let frame = Arc::new(Self {
            id: FrameId::next(),
            code,
            storage: Mutex::new(storage),
        });
        debug!(
            frame = %frame.id,
            code = %frame.code.name(),
            nlocals = frame.code.nlocals(),
            ncells = frame.code.ncells(),
            nfree = frame.code.nfree(),
            "frame created"
        );
        Ok(frame)
    }

    #[inline]
    pub fn id(&self) -> FrameId {
        self.id
    }

    #[inline]
    pub fn code(&self) -> &Arc<CodeMeta> {
        &self.code
    }

    #[inline]
    pub(crate) fn lock(&self) -> MutexGuard<'_, FrameStorage> {
        // Storage is only ever touched by single swaps; a panic elsewhere cannot leave it torn.
        self.storage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Raw slot access for this frame.
    #[inline]
    pub fn store(&self) -> SlotStore<'_> {
        SlotStore::new(self)
    }

    pub fn is_alive(&self) -> bool {
        self.lock().alive
    }

    /// Ends the frame: releases every value it owns, detaches its cells and
    /// rejects all further storage access with `InvalidFrame`.
    ///
    /// This also breaks a frame -> variable -> mapping -> frame cycle.
    pub fn terminate(&self) {
        let (fast, cells) = {
            let mut storage = self.lock();
            if !storage.alive {
                return;
            }
            storage.alive = false;
            (std::mem::take(&mut storage.fast), std::mem::take(&mut storage.cells))
        };
        debug!(frame = %self.id, code = %self.code.name(), "frame terminated");
        // Released outside the lock: a value's drop may reach back into this frame.
        drop(fast);
        drop(cells);
    }

    /// Cells of the named cell or free variables, for building a closure frame.
    pub fn closure_cells(&self, names: &[&str]) -> Result<Vec<Arc<VarCell>>> {
        let resolver = self.code.resolver();
        names
            .iter()
            .map(|name| {
                let slot = resolver
                    .resolve(name)
                    .ok_or_else(|| LocalsError::key_not_declared(name))?;
                if !slot.kind.is_indirect() {
                    return Err(LocalsError::NotACell { name: Arc::from(*name) });
                }
                self.store().cell(slot)
            })
            .collect()
    }

    // Bytecode-level access used by the code that owns the frame. Deref
    // indices live in the same flat index space as fast indices.

    pub fn load_fast(&self, index: usize) -> Result<Val> {
        self.store().load(SlotRef::local(index))
    }

    pub fn store_fast(&self, index: usize, value: Val) -> Result<()> {
        self.store().store(SlotRef::local(index), value)?.release();
        Ok(())
    }

    /// Fails with `Unbound` when the local is not assigned.
    pub fn delete_fast(&self, index: usize) -> Result<()> {
        self.delete_slot(SlotRef::local(index))
    }

    pub fn load_deref(&self, index: usize) -> Result<Val> {
        self.store().load(self.deref_slot(index))
    }

    pub fn store_deref(&self, index: usize, value: Val) -> Result<()> {
        self.store().store(self.deref_slot(index), value)?.release();
        Ok(())
    }

    pub fn delete_deref(&self, index: usize) -> Result<()> {
        self.delete_slot(self.deref_slot(index))
    }

    fn deref_slot(&self, index: usize) -> SlotRef {
        let kind = if index < self.code.nlocals() + self.code.ncells() {
            SlotKind::Cell
        } else {
            SlotKind::Free
        };
        SlotRef::new(kind, index)
    }

    fn delete_slot(&self, slot: SlotRef) -> Result<()> {
        let displaced = self.store().clear(slot)?;
        if displaced.is_empty() {
            return Err(LocalsError::Unbound { index: slot.index });
        }
        displaced.release();
        Ok(())
    }
}

impl Drop for Frame {
    fn drop(&mut self) {
        trace!(frame = %self.id, code = %self.code.name(), "frame dropped");
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("id", &self.id)
            .field("code", &self.code.name())
            .field("alive", &self.is_alive())
            .finish()
    }
}
