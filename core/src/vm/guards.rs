use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::trace;

use super::frame::{Frame, FrameId};

thread_local! {
    static CURRENT_FRAMES: RefCell<Vec<Arc<Frame>>> = const { RefCell::new(Vec::new()) };
}

/// Marks a frame as executing on this thread until the guard is dropped.
///
/// Guards nest: the innermost entered frame is the current one.
pub struct FrameGuard {
    frame: FrameId,
    // Tied to the thread whose stack it pushed onto.
    _not_send: PhantomData<*const ()>,
}

impl FrameGuard {
    pub fn enter(frame: &Arc<Frame>) -> Self {
        CURRENT_FRAMES.with(|stack| stack.borrow_mut().push(Arc::clone(frame)));
        trace!(frame = %frame.id(), "frame entered");
        Self {
            frame: frame.id(),
            _not_send: PhantomData,
        }
    }
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        let popped = CURRENT_FRAMES.with(|stack| stack.borrow_mut().pop());
        debug_assert_eq!(popped.as_ref().map(|f| f.id()), Some(self.frame), "frame guards dropped out of order");
        trace!(frame = %self.frame, "frame left");
        // The popped handle may be the last one; drop it after the stack borrow ends.
        drop(popped);
    }
}

/// The innermost frame entered on this thread.
pub fn current_frame() -> Option<Arc<Frame>> {
    CURRENT_FRAMES.with(|stack| stack.borrow().last().cloned())
}

/// Number of frames entered on this thread.
pub fn frame_depth() -> usize {
    CURRENT_FRAMES.with(|stack| stack.borrow().len())
}
