//! The terminal record of a root-to-leaf walk.

use bytes::Bytes;

/// Holds the caller-visible key bytes, the order-preserving transformed bytes the tree actually
/// indexes on, and the value payload.
///
/// For codecs whose transform is the identity on bytes (lexicographic, numeric), `original` and
/// `transformed` alias the same backing allocation: cloning a [`Bytes`] bumps a refcount rather
/// than copying.
pub(crate) struct Leaf<V> {
    original: Bytes,
    transformed: Bytes,
    value: V,
}

impl<V> Leaf<V> {
    pub(crate) fn new(original: Bytes, transformed: Bytes, value: V) -> Self {
        Self {
            original,
            transformed,
            value,
        }
    }

    pub(crate) fn original(&self) -> &Bytes {
        &self.original
    }

    pub(crate) fn transformed(&self) -> &Bytes {
        &self.transformed
    }

    pub(crate) fn value(&self) -> &V {
        &self.value
    }

    pub(crate) fn into_value(self) -> V {
        self.value
    }

    pub(crate) fn set_value(&mut self, value: V) -> V {
        std::mem::replace(&mut self.value, value)
    }
}
