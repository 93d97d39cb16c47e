pub(super) use crate::{
    error::LocalsError,
    resolve::{CodeMeta, SlotKind, SlotRef},
    val::Val,
    vm::{Frame, FrameGuard, VarCell, current_frame, frame_depth},
};
pub(super) use std::sync::Arc;

/// `locals = [x, y]`, `cellvars = [c]`, `freevars = [f]`, with `f` bound to a
/// fresh cell holding `"outer"`.
pub(super) fn sample_frame() -> (Arc<Frame>, Arc<VarCell>) {
    let code = CodeMeta::new("sample", &["x", "y"], &["c"], &["f"]).expect("code");
    let outer = VarCell::with_value(Val::from("outer"));
    let frame = Frame::with_free_cells(code, vec![Arc::clone(&outer)]).expect("frame");
    (frame, outer)
}

mod frame;
mod store;
