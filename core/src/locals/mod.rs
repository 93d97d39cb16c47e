//! Live, name-addressed view over a frame's variables.
//!
//! A [`LiveLocals`] never caches values: every lookup goes through the
//! frame's slot store, so it always sees what the frame's own code last wrote
//! and the frame's code sees what the mapping last wrote. Only names declared
//! by the frame's code are reachable; the mapping cannot create new slots.

use std::fmt;
use std::sync::{Arc, Weak};

use tracing::trace;

use crate::error::{LocalsError, Result};
use crate::resolve::{CodeMeta, SlotRef};
use crate::val::Val;
use crate::vm::{Frame, FrameId, current_frame};

mod cache;
mod iter;

pub use cache::is_interned;
pub use iter::{Items, Keys, Values};


enum FrameRef {
    Strong(Arc<Frame>),
    Weak(Weak<Frame>),
}

/// Living view of a frame's fast, cell and free variables.
///
/// The default variant keeps its frame alive. A frame variable that holds
/// the frame's own mapping therefore forms a cycle; `Frame::terminate`
/// breaks it, and [`weak_livelocals`] avoids it.
pub struct LiveLocals {
    frame: FrameRef,
    id: FrameId,
    code: Arc<CodeMeta>,
    interned: bool,
}

impl LiveLocals {
    fn strong(frame: Arc<Frame>, interned: bool) -> Self {
        Self {
            id: frame.id(),
            code: Arc::clone(frame.code()),
            frame: FrameRef::Strong(frame),
            interned,
        }
    }

    fn weak(frame: &Arc<Frame>) -> Self {
        Self {
            id: frame.id(),
            code: Arc::clone(frame.code()),
            frame: FrameRef::Weak(Arc::downgrade(frame)),
            interned: false,
        }
    }

    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.id
    }

    #[inline]
    pub fn code(&self) -> &Arc<CodeMeta> {
        &self.code
    }

    #[inline]
    pub fn is_weak(&self) -> bool {
        matches!(self.frame, FrameRef::Weak(_))
    }

    /// The observed frame, or `None` once a weak view's frame is gone.
    pub fn frame(&self) -> Option<Arc<Frame>> {
        match &self.frame {
            FrameRef::Strong(frame) => Some(Arc::clone(frame)),
            FrameRef::Weak(frame) => frame.upgrade(),
        }
    }

    fn with_frame<R>(&self, f: impl FnOnce(&Frame) -> Result<R>) -> Result<R> {
        match &self.frame {
            FrameRef::Strong(frame) => f(frame),
            FrameRef::Weak(frame) => match frame.upgrade() {
                Some(frame) => f(&frame),
                None => Err(LocalsError::InvalidFrame { frame: self.id }),
            },
        }
    }

    fn resolve(&self, name: &str) -> Result<SlotRef> {
        self.code
            .resolver()
            .resolve(name)
            .ok_or_else(|| LocalsError::key_not_declared(name))
    }

    /// Store-level `Unbound` becomes `NameUnbound` carrying the declared name.
    fn name_error(&self, err: LocalsError) -> LocalsError {
        match err {
            LocalsError::Unbound { index } => match self.code.resolver().name_of(index) {
                Some(name) => LocalsError::NameUnbound { name: Arc::clone(name) },
                None => LocalsError::Unbound { index },
            },
            other => other,
        }
    }

    /// Value of a declared variable.
    ///
    /// `KeyNotDeclared` for names the frame does not declare, `NameUnbound`
    /// for declared variables that are not currently assigned.
    pub fn get(&self, name: &str) -> Result<Val> {
        let slot = self.resolve(name)?;
        self.with_frame(|frame| frame.store().load(slot))
            .map_err(|err| self.name_error(err))
    }

    /// Assigns a declared variable; the frame's code sees the new value on its
    /// next read. Undeclared names fail with `KeyNotDeclared`.
    pub fn set(&self, name: &str, value: Val) -> Result<()> {
        let slot = self.resolve(name)?;
        let displaced = self.with_frame(|frame| frame.store().store(slot, value))?;
        trace!(frame = %self.id, var = name, kind = %slot.kind, "livelocals set");
        displaced.release();
        Ok(())
    }

    /// Unassigns a declared variable. Deleting a variable that is already
    /// unassigned fails with `NameUnbound` and changes nothing.
    pub fn delete(&self, name: &str) -> Result<()> {
        let slot = self.resolve(name)?;
        let displaced = self.with_frame(|frame| frame.store().clear(slot))?;
        if displaced.is_empty() {
            return Err(LocalsError::name_unbound(name));
        }
        trace!(frame = %self.id, var = name, kind = %slot.kind, "livelocals delete");
        displaced.release();
        Ok(())
    }

    /// True when `name` is declared and currently assigned.
    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name)
            .and_then(|slot| self.with_frame(|frame| frame.store().is_bound(slot)))
            .unwrap_or(false)
    }

    /// True when the frame declares `name`, assigned or not.
    #[inline]
    pub fn is_declared(&self, name: &str) -> bool {
        self.code.resolver().resolve(name).is_some()
    }

    /// Names of assigned variables in declaration order (locals, cells, free).
    pub fn keys(&self) -> Keys<'_> {
        Keys::new(self)
    }

    pub fn values(&self) -> Values<'_> {
        Values::new(self)
    }

    /// `(name, value)` for every assigned variable, read as iteration advances.
    pub fn items(&self) -> Items<'_> {
        Items::new(self)
    }

    /// Number of assigned variables.
    pub fn len(&self) -> usize {
        self.keys().count()
    }

    pub fn is_empty(&self) -> bool {
        self.keys().next().is_none()
    }

    /// Unassigns every declared variable. Unlike `delete`, already unassigned
    /// variables are skipped, so calling this twice is fine.
    pub fn clear_all(&self) -> Result<()> {
        let resolver = self.code.resolver();
        self.with_frame(|frame| {
            let store = frame.store();
            for index in 0..resolver.len() {
                if let Some(slot) = resolver.slot_at(index) {
                    store.clear(slot)?.release();
                }
            }
            Ok(())
        })?;
        trace!(frame = %self.id, "livelocals cleared");
        Ok(())
    }

    /// Value of `name` if declared and assigned, otherwise `default`.
    pub fn get_or(&self, name: &str, default: Val) -> Result<Val> {
        match self.get(name) {
            Err(err) if err.is_lookup_error() => Ok(default),
            other => other,
        }
    }

    /// Assigns each pair whose name is declared; other names are skipped.
    /// Returns how many variables were assigned.
    pub fn update<I, K, V>(&self, pairs: I) -> Result<usize>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Val>,
    {
        let mut assigned = 0;
        for (name, value) in pairs {
            let name = name.as_ref();
            if self.is_declared(name) {
                self.set(name, value.into())?;
                assigned += 1;
            }
        }
        Ok(assigned)
    }

    /// Current value of an assigned variable. An unassigned declared variable
    /// is first assigned `default`. An undeclared name just yields `default`.
    pub fn setdefault(&self, name: &str, default: Val) -> Result<Val> {
        match self.get(name) {
            Ok(value) => Ok(value),
            Err(LocalsError::KeyNotDeclared { .. }) => Ok(default),
            Err(LocalsError::NameUnbound { .. }) => {
                self.set(name, default.clone())?;
                Ok(default)
            }
            Err(err) => Err(err),
        }
    }

    /// Slot read used by the iterators: `Ok(None)` for an unassigned slot.
    fn read_slot(&self, slot: SlotRef) -> Result<Option<Val>> {
        match self.with_frame(|frame| frame.store().load(slot)) {
            Ok(value) => Ok(Some(value)),
            Err(LocalsError::Unbound { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

impl Drop for LiveLocals {
    fn drop(&mut self) {
        if self.interned {
            cache::forget(self.id);
        }
    }
}

impl fmt::Display for LiveLocals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<livelocals for frame at {}>", self.id)
    }
}

impl fmt::Debug for LiveLocals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveLocals")
            .field("frame", &self.id)
            .field("code", self.code.name())
            .field("weak", &self.is_weak())
            .finish()
    }
}

fn target_frame(frame: Option<&Arc<Frame>>) -> Result<Arc<Frame>> {
    let frame = match frame {
        Some(frame) => Arc::clone(frame),
        None => current_frame().ok_or(LocalsError::NoCurrentFrame)?,
    };
    if !frame.is_alive() {
        return Err(LocalsError::InvalidFrame { frame: frame.id() });
    }
    Ok(frame)
}

/// Live view of `frame`, or of the frame currently executing on this thread
/// when `frame` is `None`.
///
/// Views are interned: while a view for a frame is alive, asking again for
/// the same frame returns that same view.
pub fn livelocals(frame: Option<&Arc<Frame>>) -> Result<Arc<LiveLocals>> {
    let frame = target_frame(frame)?;
    Ok(cache::intern(&frame, |frame| LiveLocals::strong(frame, true)))
}

/// Like [`livelocals`] but always builds a fresh, non-interned view.
pub fn livelocals_uncached(frame: Option<&Arc<Frame>>) -> Result<Arc<LiveLocals>> {
    let frame = target_frame(frame)?;
    Ok(Arc::new(LiveLocals::strong(frame, false)))
}

/// View that does not keep its frame alive. Once the frame is dropped every
/// storage operation fails with `InvalidFrame`.
pub fn weak_livelocals(frame: Option<&Arc<Frame>>) -> Result<Arc<LiveLocals>> {
    let frame = target_frame(frame)?;
    Ok(Arc::new(LiveLocals::weak(&frame)))
}
