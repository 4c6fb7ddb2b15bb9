//! # ordart
//!
//! An in-memory Adaptive Radix Tree (ART) with pluggable, order-preserving key codecs.
//!
//! ## Features
//!
//! - **O(k) operations**: insert, search, and delete run in O(k) time where k is the
//!   (transformed) key length, independent of the number of entries in the tree.
//! - **Path compression**: single-child chains are collapsed into one compressed prefix.
//! - **Adaptive fan-out**: inner nodes grow from a 4-slot array up through 16, 48, and finally a
//!   direct 256-slot table as children accumulate, and shrink back down as they're removed.
//! - **Pluggable key codecs**: any [`KeyCodec`] implementation can drive the tree — bytes,
//!   strings, every integer width (signed and unsigned), IEEE-754 floats with a total order, and
//!   locale-agnostic string collation are all provided, plus 2- and 3-way composition.
//! - **Range and prefix enumeration**: `all`, `backward`, `prefix`, `range`, `top_k`, and
//!   `bottom_k` all walk the tree lazily, one leaf at a time.
//!
//! ## Example
//!
//! ```rust
//! use ordart::new_string_tree;
//!
//! let mut tree = new_string_tree();
//!
//! tree.insert("hello".to_string(), 1);
//! tree.insert("hello:foo".to_string(), 2);
//!
//! assert_eq!(tree.search(&"hello".to_string()), Some(&1));
//!
//! let entries: Vec<_> = tree.prefix(&"hello".to_string()).collect();
//! assert_eq!(entries.len(), 2);
//!
//! let removed = tree.delete(&"hello".to_string());
//! assert_eq!(removed, Some(1));
//! ```
//!
//! ## Key requirements
//!
//! A [`KeyCodec`]'s `transform` must be a total, deterministic, order-preserving injection: for
//! any two domain keys `a <= b`, the transformed bytes must satisfy
//! `transform(a).1 <= transform(b).1` lexicographically. The tree does not validate this; a codec
//! that violates it produces a structurally sound but incorrectly ordered tree (see
//! [`codec::KeyCodec`]'s documentation).

mod arena;
pub mod codec;
pub mod collation;
pub mod compound;
mod iter;
mod leaf;
mod node;
mod search;
mod tree;

pub use codec::{
    BytesCodec, F32Codec, F64Codec, I8Codec, I16Codec, I32Codec, I64Codec, KeyCodec, StringCodec,
    U8Codec, U16Codec, U32Codec, U64Codec, UsizeCodec,
};
pub use collation::{CollationCodec, CollationConfig, Strength};
pub use compound::{Compound2, Compound3};

use crate::tree::RawTree;

/// An in-memory Adaptive Radix Tree keyed by `C::Key`, storing values of type `V`.
///
/// `Tree` is not `Send` or `Sync` by declaration; whether it happens to satisfy either
/// automatically depends on `C` and `V`. It performs no internal synchronization, so callers
/// needing concurrent access must supply their own (a `Mutex` or `RwLock` around the whole tree).
///
/// # Example
///
/// ```rust
/// use ordart::new_unsigned_u64_tree;
///
/// let mut tree = new_unsigned_u64_tree();
/// tree.insert(7, "seven");
///
/// assert_eq!(tree.search(&7), Some(&"seven"));
/// ```
pub struct Tree<C: KeyCodec, V> {
    codec: C,
    raw: RawTree<V>,
}

impl<C: KeyCodec, V> Tree<C, V> {
    /// Creates a new empty tree driven by `codec`.
    pub fn new(codec: C) -> Self {
        Self {
            codec,
            raw: RawTree::default(),
        }
    }

    /// Creates a new empty tree driven by `codec`, pre-allocating arena capacity for `capacity`
    /// leaves.
    pub fn with_capacity(codec: C, capacity: usize) -> Self {
        Self {
            codec,
            raw: RawTree::with_capacity(capacity),
        }
    }

    /// The number of key-value pairs currently stored.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree holds no entries.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Inserts `value` under `key`, returning the previous value if `key` was already present.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ordart::new_bytes_tree;
    /// use bytes::Bytes;
    ///
    /// let mut tree = new_bytes_tree();
    /// assert_eq!(tree.insert(Bytes::from_static(b"k"), 1), None);
    /// assert_eq!(tree.insert(Bytes::from_static(b"k"), 2), Some(1));
    /// ```
    pub fn insert(&mut self, key: C::Key, value: V) -> Option<V> {
        let (original, transformed) = self.codec.transform(&key);
        self.raw.insert(original, transformed, value)
    }

    /// Looks up `key`, returning a reference to its value if present.
    pub fn search(&self, key: &C::Key) -> Option<&V> {
        let (original, transformed) = self.codec.transform(key);
        self.raw.search(&original, &transformed)
    }

    /// Removes `key`, returning its value if it was present.
    pub fn delete(&mut self, key: &C::Key) -> Option<V> {
        let (original, transformed) = self.codec.transform(key);
        self.raw.delete(&original, &transformed)
    }

    /// The entry with the smallest key in the tree's order, or `None` if the tree is empty.
    pub fn minimum(&self) -> Option<(C::Key, &V)> {
        self.raw.minimum().map(|(orig, v)| (self.codec.restore(orig), v))
    }

    /// The entry with the largest key in the tree's order, or `None` if the tree is empty.
    pub fn maximum(&self) -> Option<(C::Key, &V)> {
        self.raw.maximum().map(|(orig, v)| (self.codec.restore(orig), v))
    }

    /// All entries, ascending by key order.
    pub fn all(&self) -> impl Iterator<Item = (C::Key, &V)> + '_ {
        let inner = iter::Iter {
            inner: iter::RawIter::new(&self.raw.arena, self.raw.root, false),
        };
        inner.map(move |(orig, v)| (self.codec.restore(orig), v))
    }

    /// All entries, descending by key order.
    pub fn backward(&self) -> impl Iterator<Item = (C::Key, &V)> + '_ {
        let inner = iter::Backward {
            inner: iter::RawIter::new(&self.raw.arena, self.raw.root, true),
        };
        inner.map(move |(orig, v)| (self.codec.restore(orig), v))
    }

    /// All entries whose key shares `prefix`'s transformed-byte representation as a leading
    /// segment, ascending by key order.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ordart::new_string_tree;
    ///
    /// let mut tree = new_string_tree();
    /// tree.insert("user:1".to_string(), "alice");
    /// tree.insert("user:2".to_string(), "bob");
    /// tree.insert("post:1".to_string(), "hello");
    ///
    /// let users: Vec<_> = tree.prefix(&"user:".to_string()).collect();
    /// assert_eq!(users.len(), 2);
    /// ```
    pub fn prefix(&self, prefix: &C::Key) -> impl Iterator<Item = (C::Key, &V)> + '_ {
        let tp = self.codec.transform_prefix(prefix);
        let node = self.raw.locate_prefix_node(&tp);
        let inner = iter::Prefix {
            inner: iter::RawIter::new(&self.raw.arena, node, false),
            needle: tp,
        };
        inner.map(move |(orig, v)| (self.codec.restore(orig), v))
    }

    /// All entries whose key lies in `[start, end]` inclusive, ascending by key order.
    ///
    /// If `start` transforms to bytes that lexicographically follow `end`'s, the two are swapped
    /// (§4.4.6: "degenerate range arguments" are not an error).
    pub fn range(&self, start: &C::Key, end: &C::Key) -> impl Iterator<Item = (C::Key, &V)> + '_ {
        let mut t_start = self.codec.transform(start).1;
        let mut t_end = self.codec.transform(end).1;
        if t_start > t_end {
            std::mem::swap(&mut t_start, &mut t_end);
        }
        let probe_len = tree::common_prefix_len(&t_start, &t_end);
        let node = self.raw.locate_prefix_node(&t_start[..probe_len]);
        let inner = iter::RangeIter {
            inner: iter::RawIter::new(&self.raw.arena, node, false),
            start: t_start,
            end: t_end,
        };
        inner.map(move |(orig, v)| (self.codec.restore(orig), v))
    }

    /// The `k` largest entries, descending by key order.
    pub fn top_k(&self, k: usize) -> impl Iterator<Item = (C::Key, &V)> + '_ {
        self.backward().take(k)
    }

    /// The `k` smallest entries, ascending by key order.
    pub fn bottom_k(&self, k: usize) -> impl Iterator<Item = (C::Key, &V)> + '_ {
        self.all().take(k)
    }
}

/// A tree over raw byte-string keys, ordered lexicographically.
pub fn new_bytes_tree<V>() -> Tree<BytesCodec, V> {
    Tree::new(BytesCodec)
}

/// A tree over UTF-8 string keys, ordered lexicographically by byte value.
pub fn new_string_tree<V>() -> Tree<StringCodec, V> {
    Tree::new(StringCodec)
}

/// A tree over `u8` keys.
pub fn new_unsigned_u8_tree<V>() -> Tree<U8Codec, V> {
    Tree::new(U8Codec)
}

/// A tree over `u16` keys.
pub fn new_unsigned_u16_tree<V>() -> Tree<U16Codec, V> {
    Tree::new(U16Codec)
}

/// A tree over `u32` keys.
pub fn new_unsigned_u32_tree<V>() -> Tree<U32Codec, V> {
    Tree::new(U32Codec)
}

/// A tree over `u64` keys.
pub fn new_unsigned_u64_tree<V>() -> Tree<U64Codec, V> {
    Tree::new(U64Codec)
}

/// A tree over `usize` keys.
pub fn new_unsigned_usize_tree<V>() -> Tree<UsizeCodec, V> {
    Tree::new(UsizeCodec)
}

/// A tree over `i8` keys.
pub fn new_signed_i8_tree<V>() -> Tree<I8Codec, V> {
    Tree::new(I8Codec)
}

/// A tree over `i16` keys.
pub fn new_signed_i16_tree<V>() -> Tree<I16Codec, V> {
    Tree::new(I16Codec)
}

/// A tree over `i32` keys.
pub fn new_signed_i32_tree<V>() -> Tree<I32Codec, V> {
    Tree::new(I32Codec)
}

/// A tree over `i64` keys.
pub fn new_signed_i64_tree<V>() -> Tree<I64Codec, V> {
    Tree::new(I64Codec)
}

/// A tree over `f64` keys, total-ordered (`NaN` sorts lowest, then `-inf`, ascending finite
/// values with `+0.0`/`-0.0` collapsed to one entry, then `+inf`).
///
/// # Example
///
/// ```rust
/// use ordart::new_float64_tree;
///
/// let mut tree = new_float64_tree();
/// for (i, v) in [1.0, 2.0, -1.0, -2.0, 0.0, -0.0, f64::INFINITY, f64::NEG_INFINITY, f64::NAN]
///     .into_iter()
///     .enumerate()
/// {
///     tree.insert(v, i);
/// }
/// let keys: Vec<f64> = tree.all().map(|(k, _)| k).collect();
/// assert!(keys[0].is_nan());
/// assert_eq!(keys[1], f64::NEG_INFINITY);
/// assert_eq!(*keys.last().unwrap(), f64::INFINITY);
/// // +0.0 and -0.0 are the same key: nine insertions, eight surviving entries.
/// assert_eq!(tree.len(), 8);
/// ```
pub fn new_float64_tree<V>() -> Tree<F64Codec, V> {
    Tree::new(F64Codec)
}

/// A tree over `f32` keys, identical ordering scheme to [`new_float64_tree`] at half the width.
pub fn new_float32_tree<V>() -> Tree<F32Codec, V> {
    Tree::new(F32Codec)
}

/// A tree over `String` keys ordered by locale-agnostic collation at [`Strength::default`].
pub fn new_collation_tree<V>() -> Tree<CollationCodec, V> {
    Tree::new(CollationCodec::new())
}

/// A tree over `String` keys ordered by locale-agnostic collation at a chosen [`Strength`].
pub fn new_collation_tree_with_strength<V>(strength: Strength) -> Tree<CollationCodec, V> {
    Tree::new(CollationCodec::with_strength(strength))
}

/// A tree over `String` keys ordered by locale-agnostic collation under a full
/// [`CollationConfig`] (strength, the `numeric` digit-run extension, and a locale tag).
///
/// # Example
///
/// ```rust
/// use ordart::{new_collation_tree_with_config, CollationConfig};
///
/// let mut tree = new_collation_tree_with_config(CollationConfig::new().with_numeric(true));
/// for s in ["9", "11", "1"] {
///     tree.insert(s.to_string(), ());
/// }
/// let keys: Vec<String> = tree.all().map(|(k, _)| k).collect();
/// assert_eq!(keys, vec!["1".to_string(), "9".to_string(), "11".to_string()]);
/// ```
pub fn new_collation_tree_with_config<V>(config: CollationConfig) -> Tree<CollationCodec, V> {
    Tree::new(CollationCodec::with_config(config))
}

/// A tree keyed by the concatenation of two codecs: ordered first by `a`, then by `b`.
pub fn new_compound2_tree<A: KeyCodec, B: KeyCodec, V>(a: A, b: B) -> Tree<Compound2<A, B>, V> {
    Tree::new(Compound2::new(a, b))
}

/// A tree keyed by the concatenation of three codecs: ordered first by `a`, then `b`, then `c`.
pub fn new_compound3_tree<A: KeyCodec, B: KeyCodec, C: KeyCodec, V>(
    a: A,
    b: B,
    c: C,
) -> Tree<Compound3<A, B, C>, V> {
    Tree::new(Compound3::new(a, b, c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn insert_search_delete_round_trip() {
        let mut tree = new_string_tree();
        assert_eq!(tree.insert("a".to_string(), 1), None);
        assert_eq!(tree.insert("b".to_string(), 2), None);
        assert_eq!(tree.search(&"a".to_string()), Some(&1));
        assert_eq!(tree.delete(&"a".to_string()), Some(1));
        assert_eq!(tree.search(&"a".to_string()), None);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn insert_overwrites_existing_key() {
        let mut tree = new_bytes_tree();
        tree.insert(Bytes::from_static(b"k"), 1);
        assert_eq!(tree.insert(Bytes::from_static(b"k"), 2), Some(1));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.search(&Bytes::from_static(b"k")), Some(&2));
    }

    #[test]
    fn empty_tree_has_no_minimum_or_maximum() {
        let tree: Tree<BytesCodec, i32> = new_bytes_tree();
        assert_eq!(tree.minimum(), None);
        assert_eq!(tree.maximum(), None);
    }

    #[test]
    fn minimum_and_maximum_track_insertions() {
        let mut tree = new_unsigned_u32_tree();
        for v in [5u32, 1, 9, 3] {
            tree.insert(v, v);
        }
        assert_eq!(tree.minimum(), Some((1, &1)));
        assert_eq!(tree.maximum(), Some((9, &9)));
    }

    #[test]
    fn all_visits_every_entry_in_ascending_order() {
        let mut tree = new_unsigned_u32_tree();
        for v in [5u32, 1, 9, 3, 7] {
            tree.insert(v, v);
        }
        let keys: Vec<u32> = tree.all().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![1, 3, 5, 7, 9]);
    }

    #[test]
    fn backward_visits_every_entry_in_descending_order() {
        let mut tree = new_unsigned_u32_tree();
        for v in [5u32, 1, 9, 3, 7] {
            tree.insert(v, v);
        }
        let keys: Vec<u32> = tree.backward().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![9, 7, 5, 3, 1]);
    }

    #[test]
    fn prefix_matches_only_entries_sharing_the_prefix() {
        let mut tree = new_string_tree();
        tree.insert("user:1".to_string(), 1);
        tree.insert("user:2".to_string(), 2);
        tree.insert("post:1".to_string(), 3);
        let mut users: Vec<_> = tree.prefix(&"user:".to_string()).map(|(k, _)| k).collect();
        users.sort();
        assert_eq!(users, vec!["user:1".to_string(), "user:2".to_string()]);
    }

    #[test]
    fn range_is_inclusive_on_both_ends() {
        let mut tree = new_unsigned_u32_tree();
        for v in 0u32..10 {
            tree.insert(v, v);
        }
        let keys: Vec<u32> = tree.range(&3, &6).map(|(k, _)| k).collect();
        assert_eq!(keys, vec![3, 4, 5, 6]);
    }

    #[test]
    fn range_swaps_reversed_endpoints() {
        let mut tree = new_unsigned_u32_tree();
        for v in 0u32..10 {
            tree.insert(v, v);
        }
        let keys: Vec<u32> = tree.range(&6, &3).map(|(k, _)| k).collect();
        assert_eq!(keys, vec![3, 4, 5, 6]);
    }

    #[test]
    fn top_k_and_bottom_k_return_the_expected_extremes() {
        let mut tree = new_unsigned_u32_tree();
        for v in 0u32..10 {
            tree.insert(v, v);
        }
        let top: Vec<u32> = tree.top_k(3).map(|(k, _)| k).collect();
        let bottom: Vec<u32> = tree.bottom_k(3).map(|(k, _)| k).collect();
        assert_eq!(top, vec![9, 8, 7]);
        assert_eq!(bottom, vec![0, 1, 2]);
    }

    #[test]
    fn deleting_a_leaf_collapses_its_parent() {
        let mut tree = new_string_tree();
        tree.insert("aa".to_string(), 1);
        tree.insert("ab".to_string(), 2);
        assert_eq!(tree.delete(&"aa".to_string()), Some(1));
        assert_eq!(tree.search(&"ab".to_string()), Some(&2));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn compound_key_orders_by_first_component_then_second() {
        let mut tree = new_compound2_tree(U32Codec, BytesCodec);
        tree.insert((2, Bytes::from_static(b"a")), "two-a");
        tree.insert((1, Bytes::from_static(b"z")), "one-z");
        let keys: Vec<_> = tree.all().map(|(k, _)| k).collect();
        assert_eq!(keys[0].0, 1);
        assert_eq!(keys[1].0, 2);
    }
}
