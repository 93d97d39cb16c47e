//! Frame model: activation records, their slot storage and the indirection
//! cells shared between closures.
//!
//! The code that owns a frame and any live mapping over it go through the same
//! [`SlotStore`], so a write from either side is what the other reads next.

mod cell;
mod frame;
mod guards;
mod store;

pub use cell::VarCell;
pub use frame::{Frame, FrameId};
pub use guards::{FrameGuard, current_frame, frame_depth};
pub use store::{Displaced, SlotStore};

#[cfg(test)]
mod vm_test;
