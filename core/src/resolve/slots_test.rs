#[cfg(test)]
mod tests {
    use crate::error::LocalsError;
    use crate::resolve::slots::*;

    fn sample_code() -> std::sync::Arc<CodeMeta> {
        CodeMeta::new("sample", &["x", "y"], &["c"], &["f", "g"]).expect("well-formed code")
    }

    #[test]
    fn test_resolve_assigns_ranges_in_declaration_order() {
        let code = sample_code();
        let resolver = code.resolver();

        assert_eq!(resolver.resolve("x"), Some(SlotRef::new(SlotKind::Local, 0)));
        assert_eq!(resolver.resolve("y"), Some(SlotRef::new(SlotKind::Local, 1)));
        assert_eq!(resolver.resolve("c"), Some(SlotRef::new(SlotKind::Cell, 2)));
        assert_eq!(resolver.resolve("f"), Some(SlotRef::new(SlotKind::Free, 3)));
        assert_eq!(resolver.resolve("g"), Some(SlotRef::new(SlotKind::Free, 4)));
        assert_eq!(resolver.resolve("missing"), None);
        assert_eq!(code.nslots(), 5);
    }

    #[test]
    fn test_name_of_round_trips_every_declared_name() {
        let code = sample_code();
        let resolver = code.resolver();
        for name in resolver.declared_names() {
            let slot = resolver.resolve(name).expect("declared name resolves");
            assert_eq!(resolver.name_of(slot.index), Some(name));
        }
        assert_eq!(resolver.name_of(5), None);
    }

    #[test]
    fn test_slot_at_matches_range_boundaries() {
        let code = sample_code();
        let resolver = code.resolver();
        assert_eq!(resolver.slot_at(1).map(|s| s.kind), Some(SlotKind::Local));
        assert_eq!(resolver.slot_at(2).map(|s| s.kind), Some(SlotKind::Cell));
        assert_eq!(resolver.slot_at(3).map(|s| s.kind), Some(SlotKind::Free));
        assert_eq!(resolver.slot_at(5), None);
        assert_eq!(resolver.cells_start(), 2);
        assert_eq!((resolver.nlocals(), resolver.ncells(), resolver.nfree()), (2, 1, 2));
    }

    #[test]
    fn test_declared_names_concatenate_locals_cells_free() {
        let code = sample_code();
        let names: Vec<&str> = code.resolver().declared_names().iter().map(|n| n.as_ref()).collect();
        assert_eq!(names, vec!["x", "y", "c", "f", "g"]);
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let err = CodeMeta::new("dup", &["a", "a"], &[], &[]).expect_err("duplicate local");
        assert_eq!(err, LocalsError::DuplicateName { name: "a".into() });

        let err = CodeMeta::new("dup", &["a"], &["a"], &[]).expect_err("local shadowing a cell");
        assert!(matches!(err, LocalsError::DuplicateName { .. }));

        let err = CodeMeta::new("dup", &[], &["a"], &["a"]).expect_err("cell shadowing a free var");
        assert!(matches!(err, LocalsError::DuplicateName { .. }));
    }

    #[test]
    fn test_empty_code_has_no_slots() {
        let code = CodeMeta::with_locals("empty", &[]).expect("empty code");
        assert!(code.resolver().is_empty());
        assert_eq!(code.resolver().slot_at(0), None);
    }
}
