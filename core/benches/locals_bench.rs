use criterion::{Criterion, criterion_group, criterion_main};
use livelocals_core::{CodeMeta, Frame, LiveLocals, Val, VarCell, livelocals, livelocals_uncached};
use std::hint::black_box;
use std::sync::Arc;

// Frame with `n` fast locals, `n / 4` cell variables and two free variables,
// every slot bound.
fn build_frame(n: usize) -> Arc<Frame> {
    let locals: Vec<String> = (0..n).map(|i| format!("l{}", i)).collect();
    let cells: Vec<String> = (0..n / 4).map(|i| format!("c{}", i)).collect();
    let locals: Vec<&str> = locals.iter().map(String::as_str).collect();
    let cells: Vec<&str> = cells.iter().map(String::as_str).collect();
    let code = CodeMeta::new("bench", &locals, &cells, &["f0", "f1"]).unwrap();
    let free = vec![VarCell::with_value(Val::Int(0)), VarCell::with_value(Val::Int(1))];
    let frame = Frame::with_free_cells(code, free).unwrap();
    let ll = livelocals_uncached(Some(&frame)).unwrap();
    for (i, name) in locals.iter().chain(cells.iter()).enumerate() {
        ll.set(name, Val::Int(i as i64)).unwrap();
    }
    frame
}

fn bench_get_set(c: &mut Criterion) {
    let frame = build_frame(64);
    let ll = livelocals(Some(&frame)).unwrap();

    c.bench_function("livelocals_get_local", |b| b.iter(|| black_box(ll.get(black_box("l63")).unwrap())));
    c.bench_function("livelocals_get_free", |b| b.iter(|| black_box(ll.get(black_box("f1")).unwrap())));
    c.bench_function("livelocals_set_local", |b| {
        b.iter(|| ll.set(black_box("l10"), Val::Int(7)).unwrap())
    });
    c.bench_function("livelocals_set_cell", |b| {
        b.iter(|| ll.set(black_box("c3"), Val::Int(7)).unwrap())
    });
}

fn bench_iteration(c: &mut Criterion) {
    let frame = build_frame(64);
    let ll = livelocals(Some(&frame)).unwrap();

    c.bench_function("livelocals_items", |b| b.iter(|| black_box(ll.items().count())));
    c.bench_function("livelocals_len", |b| b.iter(|| black_box(ll.len())));
}

fn bench_lookup(c: &mut Criterion) {
    let frame = build_frame(16);

    // Interned path: the view is alive, so every call hits the cache.
    let held: Arc<LiveLocals> = livelocals(Some(&frame)).unwrap();
    c.bench_function("livelocals_interned_lookup", |b| {
        b.iter(|| black_box(livelocals(Some(&frame)).unwrap()))
    });
    drop(held);

    c.bench_function("livelocals_uncached_build", |b| {
        b.iter(|| black_box(livelocals_uncached(Some(&frame)).unwrap()))
    });
}

criterion_group!(benches, bench_get_set, bench_iteration, bench_lookup);
criterion_main!(benches);
