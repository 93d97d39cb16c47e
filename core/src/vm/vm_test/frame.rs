use super::*;

#[test]
fn fast_and_deref_ops_mirror_store() {
    let (frame, _) = sample_frame();
    frame.store_fast(0, Val::Int(1)).expect("store_fast");
    assert_eq!(frame.load_fast(0), Ok(Val::Int(1)));
    frame.delete_fast(0).expect("delete_fast");
    assert_eq!(frame.delete_fast(0), Err(LocalsError::Unbound { index: 0 }));

    frame.store_deref(2, Val::from("cell")).expect("store_deref");
    assert_eq!(frame.load_deref(2), Ok(Val::from("cell")));
    assert_eq!(frame.load_deref(3), Ok(Val::from("outer")));
    frame.delete_deref(3).expect("delete_deref");
    assert_eq!(frame.load_deref(3), Err(LocalsError::Unbound { index: 3 }));
}

#[test]
fn free_cell_count_must_match_code() {
    let code = CodeMeta::new("inner", &[], &[], &["a", "b"]).expect("code");
    let err = Frame::with_free_cells(Arc::clone(&code), vec![VarCell::new()]).expect_err("one cell short");
    assert_eq!(err, LocalsError::FreeCellCount { expected: 2, found: 1 });
    assert!(Frame::new(code).is_err());
}

#[test]
fn closure_cells_share_bindings_between_frames() {
    let outer_code = CodeMeta::new("outer", &["n"], &["shared"], &[]).expect("code");
    let outer = Frame::new(outer_code).expect("outer frame");
    outer.store_deref(1, Val::Int(10)).expect("store");

    let inner_code = CodeMeta::new("inner", &[], &[], &["shared"]).expect("code");
    let cells = outer.closure_cells(&["shared"]).expect("capture");
    let inner = Frame::with_free_cells(inner_code, cells).expect("inner frame");

    assert_eq!(inner.load_deref(0), Ok(Val::Int(10)));
    inner.store_deref(0, Val::Int(11)).expect("store");
    assert_eq!(outer.load_deref(1), Ok(Val::Int(11)));

    assert_eq!(
        outer.closure_cells(&["n"]).expect_err("fast locals are not cells"),
        LocalsError::NotACell { name: "n".into() }
    );
    assert!(matches!(
        outer.closure_cells(&["nope"]),
        Err(LocalsError::KeyNotDeclared { .. })
    ));
}

#[test]
fn terminate_releases_values_once() {
    let (frame, _) = sample_frame();
    let value = Val::from(vec![1]);
    let list = match &value {
        Val::List(list) => Arc::clone(list),
        _ => unreachable!(),
    };
    frame.store_fast(0, value).expect("store");
    assert_eq!(Arc::strong_count(&list), 2);

    frame.terminate();
    assert!(!frame.is_alive());
    assert_eq!(Arc::strong_count(&list), 1);
    frame.terminate();
    assert_eq!(frame.load_fast(0), Err(LocalsError::InvalidFrame { frame: frame.id() }));
}

#[test]
fn frame_guards_nest() {
    let (a, _) = sample_frame();
    let (b, _) = sample_frame();
    let depth = frame_depth();
    {
        let _ga = FrameGuard::enter(&a);
        assert_eq!(current_frame().map(|f| f.id()), Some(a.id()));
        {
            let _gb = FrameGuard::enter(&b);
            assert_eq!(current_frame().map(|f| f.id()), Some(b.id()));
            assert_eq!(frame_depth(), depth + 2);
        }
        assert_eq!(current_frame().map(|f| f.id()), Some(a.id()));
    }
    assert_eq!(frame_depth(), depth);
}

#[test]
fn frame_ids_are_unique() {
    let (a, _) = sample_frame();
    let (b, _) = sample_frame();
    assert_ne!(a.id(), b.id());
    assert!(b.id().get() > a.id().get());
    assert_eq!(a.id().to_string(), format!("0x{:08x}", a.id().get()));
}
