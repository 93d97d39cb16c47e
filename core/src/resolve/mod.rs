//! Name resolution from variable names to frame storage slots.

pub mod slots;

#[cfg(test)]
mod slots_test;

pub use slots::{CodeMeta, SlotKind, SlotRef, SlotResolver};
