use super::*;

#[test]
fn load_of_fresh_slots_reports_unbound() {
    let (frame, _) = sample_frame();
    let store = frame.store();
    assert_eq!(store.load(SlotRef::local(0)), Err(LocalsError::Unbound { index: 0 }));
    assert_eq!(
        store.load(SlotRef::new(SlotKind::Cell, 2)),
        Err(LocalsError::Unbound { index: 2 })
    );
    assert_eq!(store.load(SlotRef::new(SlotKind::Free, 3)), Ok(Val::from("outer")));
}

#[test]
fn store_returns_previous_occupant() {
    let (frame, _) = sample_frame();
    let store = frame.store();
    let first = store.store(SlotRef::local(1), Val::Int(1)).expect("store");
    assert!(first.is_empty());
    let second = store.store(SlotRef::local(1), Val::Int(2)).expect("store");
    assert_eq!(second.into_inner(), Some(Val::Int(1)));
    assert_eq!(store.load(SlotRef::local(1)), Ok(Val::Int(2)));
}

#[test]
fn storing_the_current_value_again_keeps_it_alive() {
    let (frame, _) = sample_frame();
    let store = frame.store();
    store.store(SlotRef::local(0), Val::from(vec![1, 2, 3])).expect("store").release();

    // Re-store the only reference the slot owns.
    let same = store.load(SlotRef::local(0)).expect("load");
    store.store(SlotRef::local(0), same).expect("store").release();
    assert_eq!(store.load(SlotRef::local(0)), Ok(Val::from(vec![1, 2, 3])));
}

#[test]
fn clear_is_idempotent() {
    let (frame, _) = sample_frame();
    let store = frame.store();
    store.store(SlotRef::local(0), Val::Int(5)).expect("store").release();
    let cleared = store.clear(SlotRef::local(0)).expect("clear");
    assert_eq!(cleared.into_inner(), Some(Val::Int(5)));
    let again = store.clear(SlotRef::local(0)).expect("clear again");
    assert!(again.is_empty());
    assert_eq!(store.is_bound(SlotRef::local(0)), Ok(false));
}

#[test]
fn cell_writes_go_to_the_shared_cell() {
    let (frame, outer) = sample_frame();
    let store = frame.store();
    store
        .store(SlotRef::new(SlotKind::Free, 3), Val::Int(9))
        .expect("store")
        .release();
    assert_eq!(outer.get(), Some(Val::Int(9)));

    store.clear(SlotRef::new(SlotKind::Free, 3)).expect("clear").release();
    assert!(outer.is_empty());

    // The cell object itself is never swapped out.
    let cell = store.cell(SlotRef::new(SlotKind::Free, 3)).expect("cell");
    assert!(Arc::ptr_eq(&cell, &outer));
}

#[test]
fn bounds_are_checked_per_kind() {
    let (frame, _) = sample_frame();
    let store = frame.store();
    assert_eq!(
        store.load(SlotRef::local(2)),
        Err(LocalsError::IndexOutOfRange {
            kind: SlotKind::Local,
            index: 2,
            start: 0,
            end: 2
        })
    );
    assert_eq!(
        store.store(SlotRef::new(SlotKind::Cell, 1), Val::Nil).map(|d| d.is_empty()),
        Err(LocalsError::IndexOutOfRange {
            kind: SlotKind::Cell,
            index: 1,
            start: 2,
            end: 4
        })
    );
    assert!(matches!(
        store.clear(SlotRef::new(SlotKind::Free, 4)),
        Err(LocalsError::IndexOutOfRange { index: 4, .. })
    ));
    assert!(matches!(
        store.cell(SlotRef::local(0)),
        Err(LocalsError::IndexOutOfRange { .. })
    ));
}

#[test]
fn failed_store_leaves_slot_untouched() {
    let (frame, _) = sample_frame();
    let store = frame.store();
    store.store(SlotRef::local(0), Val::Int(1)).expect("store").release();
    assert!(store.store(SlotRef::local(7), Val::Int(2)).is_err());
    assert_eq!(store.load(SlotRef::local(0)), Ok(Val::Int(1)));
}

#[test]
fn terminated_frame_rejects_access() {
    let (frame, outer) = sample_frame();
    frame.terminate();
    let store = frame.store();
    let invalid = Err(LocalsError::InvalidFrame { frame: frame.id() });
    assert_eq!(store.load(SlotRef::local(0)), invalid);
    assert!(matches!(
        store.store(SlotRef::local(0), Val::Int(1)),
        Err(LocalsError::InvalidFrame { .. })
    ));
    // The shared cell outlives the frame that captured it.
    assert_eq!(outer.get(), Some(Val::from("outer")));
}
