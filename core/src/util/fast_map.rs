//! Fx-hashed collections for short string keys (variable names, frame ids).

pub type FastHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

#[inline]
pub fn fast_hash_map_with_capacity<K, V>(capacity: usize) -> FastHashMap<K, V> {
    rustc_hash::FxHashMap::with_capacity_and_hasher(capacity, Default::default())
}
