//! Lazy depth-first enumeration over a [`crate::tree::RawTree`], and the public adapters built on
//! top of it: `all`, `backward`, `prefix`, and `range`.
//!
//! Each iterator is a stackful DFS cursor: a `Vec` of frames, each holding the byte-ordered
//! (or reverse-byte-ordered) children of one inner node plus a cursor into it. `next()` pops work
//! off the top frame and pushes a new one whenever it descends into another inner node, yielding
//! once it reaches a leaf. This mirrors the reference implementation's goroutine-backed
//! `iter.Seq2` without needing a second thread: Rust's `Iterator` already pulls values on demand.

use bytes::Bytes;

use crate::arena::{Arena, ChildRef};

struct Frame {
    children: Vec<ChildRef>,
    pos: usize,
}

/// Depth-first leaf cursor over an arena, walking children in ascending (or, reversed,
/// descending) byte order.
pub(crate) struct RawIter<'a, V> {
    arena: &'a Arena<V>,
    stack: Vec<Frame>,
    reverse: bool,
}

impl<'a, V> RawIter<'a, V> {
    pub(crate) fn new(arena: &'a Arena<V>, root: ChildRef, reverse: bool) -> Self {
        let mut stack = Vec::new();
        Self::push_frame(arena, root, reverse, &mut stack);
        Self { arena, stack, reverse }
    }

    fn push_frame(arena: &'a Arena<V>, node: ChildRef, reverse: bool, stack: &mut Vec<Frame>) {
        match node {
            ChildRef::None => {}
            ChildRef::Leaf(_) => stack.push(Frame {
                children: vec![node],
                pos: 0,
            }),
            _ => stack.push(Frame {
                children: arena.children_sorted(node, reverse),
                pos: 0,
            }),
        }
    }
}

impl<'a, V> Iterator for RawIter<'a, V> {
    type Item = (&'a Bytes, &'a Bytes, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = self.stack.last_mut()?;
            if frame.pos >= frame.children.len() {
                self.stack.pop();
                continue;
            }
            let child = frame.children[frame.pos];
            frame.pos += 1;
            match child {
                ChildRef::Leaf(idx) => {
                    let leaf = self.arena.leaf(idx);
                    return Some((leaf.original(), leaf.transformed(), leaf.value()));
                }
                _ => Self::push_frame(self.arena, child, self.reverse, &mut self.stack),
            }
        }
    }
}

/// Ascending enumeration of every `(original key, value)` pair. Backs `Tree::all`.
pub struct Iter<'a, V> {
    pub(crate) inner: RawIter<'a, V>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a Bytes, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(o, _, v)| (o, v))
    }
}

/// Descending enumeration of every `(original key, value)` pair. Backs `Tree::backward`.
pub struct Backward<'a, V> {
    pub(crate) inner: RawIter<'a, V>,
}

impl<'a, V> Iterator for Backward<'a, V> {
    type Item = (&'a Bytes, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(o, _, v)| (o, v))
    }
}

/// Ascending enumeration of every `(original key, value)` pair whose *transformed* bytes start
/// with a fixed transformed prefix. Filtering on transformed bytes (rather than original bytes)
/// is what makes `prefix` meaningful for codecs like [`crate::collation::CollationCodec`], where a
/// case-insensitive prefix query has no faithful expression in raw original-byte terms. Backs
/// `Tree::prefix`.
pub struct Prefix<'a, V> {
    pub(crate) inner: RawIter<'a, V>,
    pub(crate) needle: Bytes,
}

impl<'a, V> Iterator for Prefix<'a, V> {
    type Item = (&'a Bytes, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (original, transformed, value) = self.inner.next()?;
            if transformed.as_ref().starts_with(self.needle.as_ref()) {
                return Some((original, value));
            }
        }
    }
}

/// Ascending enumeration of every `(original key, value)` pair whose *transformed* bytes fall in
/// `[start, end]` inclusive. Filters on transformed rather than original bytes: comparing original
/// bytes directly would be wrong for codecs (e.g. collation) whose original-byte lexicographic
/// order does not match the codec's domain order, whereas the codec contract guarantees
/// transformed-byte order always does. Backs `Tree::range`.
pub struct RangeIter<'a, V> {
    pub(crate) inner: RawIter<'a, V>,
    pub(crate) start: Bytes,
    pub(crate) end: Bytes,
}

impl<'a, V> Iterator for RangeIter<'a, V> {
    type Item = (&'a Bytes, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (original, transformed, value) = self.inner.next()?;
            if transformed.as_ref() > self.end.as_ref() {
                self.inner.stack.clear();
                return None;
            }
            if transformed.as_ref() >= self.start.as_ref() {
                return Some((original, value));
            }
        }
    }
}
