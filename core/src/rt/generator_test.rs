#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::error::LocalsError;
    use crate::locals::livelocals;
    use crate::resolve::CodeMeta;
    use crate::rt::{Generator, generator_locals};
    use crate::val::Val;
    use crate::vm::Frame;

    /// Counts `i` from 0 while `i < limit`, yielding each `i`.
    fn counter(limit: i64) -> Generator {
        let code = CodeMeta::with_locals("counter", &["i", "limit"]).expect("code");
        let frame = Frame::new(code).expect("frame");
        frame.store_fast(0, Val::Int(0)).expect("i");
        frame.store_fast(1, Val::Int(limit)).expect("limit");
        Generator::new(frame, |frame: &Arc<Frame>| {
            let i = frame.load_fast(0).ok()?.as_int()?;
            let limit = frame.load_fast(1).ok()?.as_int()?;
            if i >= limit {
                return None;
            }
            frame.store_fast(0, Val::Int(i + 1)).ok()?;
            Some(Val::Int(i))
        })
    }

    #[test]
    fn test_edits_between_resumptions_are_seen_by_the_body() {
        let mut generator = counter(10);
        assert_eq!(generator.resume(), Some(Val::Int(0)));
        assert_eq!(generator.resume(), Some(Val::Int(1)));

        let ll = generator_locals(&generator).expect("suspended frame");
        assert_eq!(ll.get("i"), Ok(Val::Int(2)));
        ll.set("i", Val::Int(8)).expect("skip ahead");

        assert_eq!(generator.resume(), Some(Val::Int(8)));
        assert_eq!(generator.resume(), Some(Val::Int(9)));
        assert_eq!(generator.resume(), None);
        assert!(generator.is_finished());
    }

    #[test]
    fn test_finished_generator_has_no_locals() {
        let mut generator = counter(1);
        let ll = generator_locals(&generator).expect("suspended frame");
        assert_eq!(generator.by_ref().collect::<Vec<_>>(), vec![Val::Int(0)]);

        let invalid = LocalsError::InvalidFrame {
            frame: generator.frame_id(),
        };
        assert_eq!(generator_locals(&generator).map(|_| ()), Err(invalid.clone()));
        // An existing view sees the frame as terminated.
        assert_eq!(ll.get("i"), Err(invalid));
    }

    #[test]
    fn test_body_runs_with_its_frame_current() {
        let code = CodeMeta::with_locals("introspect", &["seen"]).expect("code");
        let frame = Frame::new(code).expect("frame");
        let mut generator = Generator::new(frame, |frame: &Arc<Frame>| {
            let ll = livelocals(None).ok()?;
            if ll.frame_id() != frame.id() || ll.contains("seen") {
                return None;
            }
            ll.set("seen", Val::Bool(true)).ok()?;
            Some(Val::Nil)
        });

        assert_eq!(generator.resume(), Some(Val::Nil));
        let ll = generator_locals(&generator).expect("view");
        assert_eq!(ll.get("seen"), Ok(Val::Bool(true)));
        assert_eq!(generator.resume(), None);
    }
}
