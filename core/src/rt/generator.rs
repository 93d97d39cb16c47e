use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{LocalsError, Result};
use crate::locals::{LiveLocals, livelocals};
use crate::val::Val;
use crate::vm::{Frame, FrameGuard, FrameId};

/// One step of a generator body. Returns `Some(value)` to yield and suspend,
/// `None` once the body has finished.
pub type GeneratorStep = Box<dyn FnMut(&Arc<Frame>) -> Option<Val> + Send>;

/// A suspended routine that owns its frame between resumptions.
///
/// While suspended, the frame can be observed and edited through
/// [`generator_locals`]; the next resumption sees those edits.
pub struct Generator {
    id: FrameId,
    frame: Option<Arc<Frame>>,
    step: GeneratorStep,
    yielded: usize,
}

impl Generator {
    pub fn new<F>(frame: Arc<Frame>, step: F) -> Self
    where
        F: FnMut(&Arc<Frame>) -> Option<Val> + Send + 'static,
    {
        Self {
            id: frame.id(),
            frame: Some(frame),
            step: Box::new(step),
            yielded: 0,
        }
    }

    /// Id of the generator's frame, kept after the frame is gone.
    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.id
    }

    /// The suspended frame; `None` after the generator finished.
    #[inline]
    pub fn frame(&self) -> Option<&Arc<Frame>> {
        self.frame.as_ref()
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.frame.is_none()
    }

    /// Runs the body until its next yield with the frame entered as current.
    /// The frame is terminated when the body finishes.
    pub fn resume(&mut self) -> Option<Val> {
        let frame = self.frame.as_ref().map(Arc::clone)?;
        let yielded = {
            let _guard = FrameGuard::enter(&frame);
            (self.step)(&frame)
        };
        match yielded {
            Some(value) => {
                self.yielded += 1;
                Some(value)
            }
            None => {
                debug!(frame = %frame.id(), yields = self.yielded, "generator finished");
                self.frame = None;
                frame.terminate();
                None
            }
        }
    }
}

impl Iterator for Generator {
    type Item = Val;

    fn next(&mut self) -> Option<Val> {
        self.resume()
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("frame", &self.id)
            .field("finished", &self.is_finished())
            .field("yielded", &self.yielded)
            .finish()
    }
}

/// Live view of a suspended generator's frame. Fails with `InvalidFrame`
/// once the generator has finished.
pub fn generator_locals(generator: &Generator) -> Result<Arc<LiveLocals>> {
    match generator.frame() {
        Some(frame) => livelocals(Some(frame)),
        None => Err(LocalsError::InvalidFrame { frame: generator.id }),
    }
}
