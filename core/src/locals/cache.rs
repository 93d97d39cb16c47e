use std::sync::{Arc, Weak};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use once_cell::sync::Lazy;
use tracing::trace;

use crate::vm::{Frame, FrameId};

use super::LiveLocals;

// Frames hand out one view at a time. Entries are weak so the cache never
// keeps a view (and through it, a frame) alive.
static LOCALS_CACHE: Lazy<DashMap<FrameId, Weak<LiveLocals>>> = Lazy::new(DashMap::new);

pub(super) fn intern<F>(frame: &Arc<Frame>, make: F) -> Arc<LiveLocals>
where
    F: FnOnce(Arc<Frame>) -> LiveLocals,
{
    match LOCALS_CACHE.entry(frame.id()) {
        Entry::Occupied(mut entry) => {
            if let Some(found) = entry.get().upgrade() {
                trace!(frame = %frame.id(), "livelocals cache hit");
                return found;
            }
            let fresh = Arc::new(make(Arc::clone(frame)));
            entry.insert(Arc::downgrade(&fresh));
            trace!(frame = %frame.id(), "livelocals cache refreshed");
            fresh
        }
        Entry::Vacant(entry) => {
            let fresh = Arc::new(make(Arc::clone(frame)));
            entry.insert(Arc::downgrade(&fresh));
            trace!(frame = %frame.id(), "livelocals cache miss");
            fresh
        }
    }
}

/// Drops the entry for `frame` unless a newer live view replaced it.
pub(super) fn forget(frame: FrameId) {
    LOCALS_CACHE.remove_if(&frame, |_, view| view.strong_count() == 0);
}

/// True while an interned view of `frame` is alive.
pub fn is_interned(frame: FrameId) -> bool {
    LOCALS_CACHE
        .get(&frame)
        .is_some_and(|view| view.strong_count() > 0)
}
