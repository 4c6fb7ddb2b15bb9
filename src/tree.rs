//! The codec-agnostic ART engine: insert/search/delete/minimum/maximum plus the subtree-location
//! helpers that back prefix and range enumeration. Operates entirely on already-transformed byte
//! strings; [`crate::Tree`] is the codec-aware façade built on top of this.

use bytes::Bytes;

use crate::arena::{Arena, ChildRef};
use crate::leaf::Leaf;
use crate::node;

/// Returns the number of leading bytes `a` and `b` share.
pub(crate) fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    let n = a.len().min(b.len());
    for i in 0..n {
        if a[i] != b[i] {
            return i;
        }
    }
    n
}

/// Descends to the leaf reachable by always taking the smallest present byte.
fn minimum_leaf_ref<V>(arena: &Arena<V>, mut node: ChildRef) -> ChildRef {
    loop {
        match node {
            ChildRef::Leaf(_) => return node,
            ChildRef::None => unreachable!("minimum_leaf_ref called on an empty subtree"),
            _ => node = arena.first_child(node),
        }
    }
}

/// Descends to the leaf reachable by always taking the largest present byte.
fn maximum_leaf_ref<V>(arena: &Arena<V>, mut node: ChildRef) -> ChildRef {
    loop {
        match node {
            ChildRef::Leaf(_) => return node,
            ChildRef::None => unreachable!("maximum_leaf_ref called on an empty subtree"),
            _ => node = arena.last_child(node),
        }
    }
}

/// Extends [`crate::node::Header::check_prefix`] past the in-node buffer: when the bounded prefix
/// matches in full but the node's true `prefix_len` exceeds it, the remaining bytes are recovered
/// by descending to the subtree's minimum leaf (lazy expansion, §4.3).
pub(crate) fn prefix_mismatch<V>(arena: &Arena<V>, node: ChildRef, key: &[u8], depth: usize) -> usize {
    let header = node::header(arena, node);
    let bounded_max = (header.prefix_len as usize)
        .min(node::PREFIX_LEN)
        .min(key.len().saturating_sub(depth));
    let matched = header.check_prefix(key, depth);
    if matched < bounded_max || (header.prefix_len as usize) <= node::PREFIX_LEN {
        return matched;
    }

    let full_len = header.prefix_len as usize;
    let min_leaf = minimum_leaf_ref(arena, node);
    let leaf_t = match min_leaf {
        ChildRef::Leaf(idx) => arena.leaf(idx).transformed().clone(),
        _ => unreachable!(),
    };
    let mut i = matched;
    while i < full_len && depth + i < key.len() {
        if leaf_t[depth + i] != key[depth + i] {
            break;
        }
        i += 1;
    }
    i
}

/// The portion of the ART engine that never looks at a domain key type, only at the
/// already-transformed (`Tᴷ`) and original (`Oᴷ`) byte strings the codec layer produced.
pub(crate) struct RawTree<V> {
    pub(crate) arena: Arena<V>,
    pub(crate) root: ChildRef,
    pub(crate) size: usize,
}

impl<V> Default for RawTree<V> {
    fn default() -> Self {
        Self {
            arena: Arena::default(),
            root: ChildRef::None,
            size: 0,
        }
    }
}

impl<V> RawTree<V> {
    pub(crate) fn with_capacity(cap: usize) -> Self {
        Self {
            arena: Arena::with_capacity(cap),
            root: ChildRef::None,
            size: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.size
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Inserts `(original, transformed, value)`, returning the previous value when `original`
    /// already maps to a leaf. See §4.4.1.
    pub(crate) fn insert(&mut self, original: Bytes, transformed: Bytes, value: V) -> Option<V> {
        if self.root.is_none() {
            self.root = self.arena.insert_leaf(Leaf::new(original, transformed, value));
            self.size += 1;
            return None;
        }
        let (new_root, old) = self.insert_rec(self.root, &original, &transformed, 0, value);
        self.root = new_root;
        old
    }

    fn insert_rec(
        &mut self,
        node: ChildRef,
        original: &Bytes,
        transformed: &Bytes,
        depth: usize,
        value: V,
    ) -> (ChildRef, Option<V>) {
        match node {
            ChildRef::Leaf(idx) => self.insert_into_leaf(idx, node, original, transformed, depth, value),
            ChildRef::None => unreachable!("insert_rec called on an empty slot"),
            _ => self.insert_into_inner(node, original, transformed, depth, value),
        }
    }

    fn insert_into_leaf(
        &mut self,
        idx: u32,
        node: ChildRef,
        original: &Bytes,
        transformed: &Bytes,
        depth: usize,
        value: V,
    ) -> (ChildRef, Option<V>) {
        if self.arena.leaf(idx).original().as_ref() == original.as_ref() {
            let old = self.arena.leaf_mut(idx).set_value(value);
            return (node, Some(old));
        }

        let leaf_t = self.arena.leaf(idx).transformed().clone();
        let prefix_len = common_prefix_len(&leaf_t[depth..], &transformed[depth..]);
        let split = depth + prefix_len;

        if split >= leaf_t.len() || split >= transformed.len() {
            // Two distinct original keys produced identical transformed bytes: a non-injective
            // codec transform (e.g. a collation collision, §4.1). There is no diverging byte to
            // split on; the contract calls this undefined ordering, so we resolve it the same way
            // as an exact match rather than read past either buffer.
            let old = self.arena.leaf_mut(idx).set_value(value);
            return (node, Some(old));
        }

        let new_prefix_src = &transformed[depth..split];
        let new_node = node::new_n4(&mut self.arena, prefix_len as u32, new_prefix_src);
        let new_leaf = self
            .arena
            .insert_leaf(Leaf::new(original.clone(), transformed.clone(), value));

        let leaf_byte = leaf_t[split];
        let new_byte = transformed[split];
        let new_node = node::add_child(&mut self.arena, new_node, leaf_byte, node);
        let new_node = node::add_child(&mut self.arena, new_node, new_byte, new_leaf);
        self.size += 1;
        (new_node, None)
    }

    fn insert_into_inner(
        &mut self,
        node: ChildRef,
        original: &Bytes,
        transformed: &Bytes,
        depth: usize,
        value: V,
    ) -> (ChildRef, Option<V>) {
        let prefix_len = node::header(&self.arena, node).prefix_len as usize;
        let mut depth = depth;

        if prefix_len > 0 {
            let prefix_diff = prefix_mismatch(&self.arena, node, transformed, depth);
            if prefix_diff < prefix_len {
                let new_node = self.split_node(node, original, transformed, depth, prefix_diff, value);
                return (new_node, None);
            }
            depth += prefix_len;
        }

        debug_assert!(depth < transformed.len(), "transformed keys must not run out mid-descent");
        let b = transformed[depth];
        let child = self.arena.find_child(node, b);
        if child.is_none() {
            let new_leaf = self
                .arena
                .insert_leaf(Leaf::new(original.clone(), transformed.clone(), value));
            self.size += 1;
            (node::add_child(&mut self.arena, node, b, new_leaf), None)
        } else {
            let (new_child, old) = self.insert_rec(child, original, transformed, depth + 1, value);
            if new_child != child {
                node::set_child(&mut self.arena, node, b, new_child);
            }
            (node, old)
        }
    }

    /// Splits `node`'s compressed prefix at `prefix_diff`, installing a fresh N4 above both `node`
    /// (shifted) and a brand-new leaf for the inserted key (§4.4.1, the "Else: split" branch).
    fn split_node(
        &mut self,
        node: ChildRef,
        original: &Bytes,
        transformed: &Bytes,
        depth: usize,
        prefix_diff: usize,
        value: V,
    ) -> ChildRef {
        let old_header = node::header(&self.arena, node).clone();
        let new_prefix_src = &transformed[depth..depth + prefix_diff];
        let new_parent = node::new_n4(&mut self.arena, prefix_diff as u32, new_prefix_src);

        // When the old prefix is longer than the bounded buffer (lazy expansion), both the edge
        // byte and the shifted remainder must be recovered from the subtree's minimum leaf rather
        // than the buffer, which only ever stores the prefix's first `PREFIX_LEN` bytes.
        let min_leaf_transformed = if prefix_diff >= node::PREFIX_LEN
            || (old_header.prefix_len as usize) > node::PREFIX_LEN
        {
            match minimum_leaf_ref(&self.arena, node) {
                ChildRef::Leaf(idx) => Some(self.arena.leaf(idx).transformed().clone()),
                _ => unreachable!(),
            }
        } else {
            None
        };

        let old_edge_byte = if prefix_diff < node::PREFIX_LEN {
            old_header.prefix[prefix_diff]
        } else {
            min_leaf_transformed.as_ref().unwrap()[depth + prefix_diff]
        };

        let shift_from = prefix_diff + 1;
        let mut shifted = [0u8; node::PREFIX_LEN];
        if let Some(min_t) = &min_leaf_transformed {
            for i in 0..node::PREFIX_LEN {
                let src = depth + shift_from + i;
                if src < min_t.len() {
                    shifted[i] = min_t[src];
                } else {
                    break;
                }
            }
        } else {
            for i in 0..node::PREFIX_LEN {
                if shift_from + i < node::PREFIX_LEN {
                    shifted[i] = old_header.prefix[shift_from + i];
                } else {
                    break;
                }
            }
        }
        let new_old_prefix_len = old_header.prefix_len - prefix_diff as u32 - 1;
        {
            let header_mut = node::header_mut(&mut self.arena, node);
            header_mut.prefix_len = new_old_prefix_len;
            header_mut.prefix = shifted;
        }

        let new_parent = node::add_child(&mut self.arena, new_parent, old_edge_byte, node);

        let new_leaf = self
            .arena
            .insert_leaf(Leaf::new(original.clone(), transformed.clone(), value));
        let new_byte = transformed[depth + prefix_diff];
        let new_parent = node::add_child(&mut self.arena, new_parent, new_byte, new_leaf);
        self.size += 1;
        new_parent
    }

    /// Looks up `original`/`transformed` and returns the stored value, per §4.4.2.
    pub(crate) fn search(&self, original: &[u8], transformed: &[u8]) -> Option<&V> {
        let mut node = self.root;
        let mut depth = 0usize;
        loop {
            match node {
                ChildRef::None => return None,
                ChildRef::Leaf(idx) => {
                    let leaf = self.arena.leaf(idx);
                    return if leaf.original().as_ref() == original {
                        Some(leaf.value())
                    } else {
                        None
                    };
                }
                _ => {
                    let header = node::header(&self.arena, node);
                    let bounded_max = (header.prefix_len as usize)
                        .min(node::PREFIX_LEN)
                        .min(transformed.len().saturating_sub(depth));
                    let matched = header.check_prefix(transformed, depth);
                    if matched < bounded_max {
                        return None;
                    }
                    depth += header.prefix_len as usize;
                    if depth >= transformed.len() {
                        return None;
                    }
                    let b = transformed[depth];
                    node = self.arena.find_child(node, b);
                    depth += 1;
                }
            }
        }
    }

    /// Removes the leaf for `original`/`transformed`, returning its value. §4.4.3.
    pub(crate) fn delete(&mut self, original: &[u8], transformed: &[u8]) -> Option<V> {
        match self.root {
            ChildRef::None => None,
            ChildRef::Leaf(idx) => {
                if self.arena.leaf(idx).original().as_ref() == original {
                    let leaf = self.arena.remove_leaf(idx);
                    self.root = ChildRef::None;
                    self.size -= 1;
                    Some(leaf.into_value())
                } else {
                    None
                }
            }
            _ => {
                let (new_root, removed) = self.delete_rec(self.root, original, transformed, 0);
                self.root = new_root;
                if removed.is_some() {
                    self.size -= 1;
                }
                removed
            }
        }
    }

    fn delete_rec(
        &mut self,
        node: ChildRef,
        original: &[u8],
        transformed: &[u8],
        depth: usize,
    ) -> (ChildRef, Option<V>) {
        let header = node::header(&self.arena, node).clone();
        let mut depth = depth;
        if header.prefix_len > 0 {
            let bounded_max = (header.prefix_len as usize)
                .min(node::PREFIX_LEN)
                .min(transformed.len().saturating_sub(depth));
            let matched = header.check_prefix(transformed, depth);
            if matched < bounded_max {
                return (node, None);
            }
            depth += header.prefix_len as usize;
        }
        if depth >= transformed.len() {
            return (node, None);
        }
        let b = transformed[depth];
        let child = self.arena.find_child(node, b);
        match child {
            ChildRef::None => (node, None),
            ChildRef::Leaf(idx) => {
                if self.arena.leaf(idx).original().as_ref() == original {
                    let leaf = self.arena.remove_leaf(idx);
                    let new_node = node::delete_child(&mut self.arena, node, b);
                    let new_node = self.maybe_collapse(new_node);
                    (new_node, Some(leaf.into_value()))
                } else {
                    (node, None)
                }
            }
            _ => {
                let (new_child, removed) = self.delete_rec(child, original, transformed, depth + 1);
                if removed.is_none() {
                    (node, None)
                } else {
                    debug_assert!(
                        !new_child.is_none(),
                        "an inner node's sole child must collapse into it, never vanish"
                    );
                    if new_child != child {
                        node::set_child(&mut self.arena, node, b, new_child);
                    }
                    (node, removed)
                }
            }
        }
    }

    /// If `node` now has exactly one child (invariant #5), absorbs it: a leaf child replaces
    /// `node` outright, an inner-node child absorbs `node`'s prefix and replaces it. §4.3.
    fn maybe_collapse(&mut self, node: ChildRef) -> ChildRef {
        if node.is_none() || node.is_leaf() {
            return node;
        }
        let Some((byte, child)) = node::single_child(&self.arena, node) else {
            return node;
        };
        match child {
            ChildRef::Leaf(_) => {
                node::free_node(&mut self.arena, node);
                child
            }
            _ => {
                let parent_header = node::header(&self.arena, node).clone();
                let child_header = node::header(&self.arena, child).clone();

                let mut combined = Vec::with_capacity(node::PREFIX_LEN);
                let parent_copy_len = (parent_header.prefix_len as usize).min(node::PREFIX_LEN);
                combined.extend_from_slice(&parent_header.prefix[..parent_copy_len]);
                if combined.len() < node::PREFIX_LEN {
                    combined.push(byte);
                }
                if combined.len() < node::PREFIX_LEN {
                    let remaining = node::PREFIX_LEN - combined.len();
                    let child_copy_len = remaining.min(child_header.prefix_len as usize).min(node::PREFIX_LEN);
                    combined.extend_from_slice(&child_header.prefix[..child_copy_len]);
                }

                let new_prefix_len = parent_header.prefix_len + 1 + child_header.prefix_len;
                let mut buf = [0u8; node::PREFIX_LEN];
                let n = combined.len().min(node::PREFIX_LEN);
                buf[..n].copy_from_slice(&combined[..n]);

                let child_header_mut = node::header_mut(&mut self.arena, child);
                child_header_mut.prefix_len = new_prefix_len;
                child_header_mut.prefix = buf;

                node::free_node(&mut self.arena, node);
                child
            }
        }
    }

    /// The leaf with the smallest transformed key, per §4.4.4.
    pub(crate) fn minimum(&self) -> Option<(&Bytes, &V)> {
        if self.root.is_none() {
            return None;
        }
        match minimum_leaf_ref(&self.arena, self.root) {
            ChildRef::Leaf(idx) => {
                let leaf = self.arena.leaf(idx);
                Some((leaf.original(), leaf.value()))
            }
            _ => unreachable!(),
        }
    }

    /// The leaf with the largest transformed key, per §4.4.4.
    pub(crate) fn maximum(&self) -> Option<(&Bytes, &V)> {
        if self.root.is_none() {
            return None;
        }
        match maximum_leaf_ref(&self.arena, self.root) {
            ChildRef::Leaf(idx) => {
                let leaf = self.arena.leaf(idx);
                Some((leaf.original(), leaf.value()))
            }
            _ => unreachable!(),
        }
    }

    /// Walks from the root matching `tp` against each node's compressed prefix, stopping at the
    /// first node whose prefix diverges from `tp` or whose cumulative matched depth equals
    /// `tp.len()` — the "lowest common parent" of §4.4.5 step 2.
    pub(crate) fn locate_prefix_node(&self, tp: &[u8]) -> ChildRef {
        let mut node = self.root;
        let mut depth = 0usize;
        loop {
            match node {
                ChildRef::None => return ChildRef::None,
                ChildRef::Leaf(_) => return node,
                _ => {
                    let prefix_len = node::header(&self.arena, node).prefix_len as usize;
                    if prefix_len > 0 {
                        let diff = prefix_mismatch(&self.arena, node, tp, depth);
                        if diff < prefix_len {
                            return if depth + diff >= tp.len() {
                                node
                            } else {
                                ChildRef::None
                            };
                        }
                        depth += prefix_len;
                    }
                    if depth >= tp.len() {
                        return node;
                    }
                    let b = tp[depth];
                    let child = self.arena.find_child(node, b);
                    if child.is_none() {
                        return ChildRef::None;
                    }
                    node = child;
                    depth += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(prefix_len: usize, suffix: u8) -> Bytes {
        let mut v = vec![b'a'; prefix_len];
        v.push(suffix);
        Bytes::from(v)
    }

    /// §3 invariant 1 / §4.3 lazy expansion: a shared prefix longer than the bounded in-node
    /// buffer (`node::PREFIX_LEN` = 10) is only partially stored, yet both `search` and the
    /// `prefix_mismatch` machinery that backs insert/delete/range still resolve correctly by
    /// consulting the subtree's minimum leaf for the overflow bytes.
    #[test]
    fn long_shared_prefix_is_lazily_expanded_and_still_searchable() {
        let mut tree: RawTree<u8> = RawTree::default();
        let keys: Vec<Bytes> = (0..4u8).map(|b| key(20, b)).collect();
        for (i, k) in keys.iter().enumerate() {
            assert_eq!(tree.insert(k.clone(), k.clone(), i as u8), None);
        }
        assert_eq!(tree.len(), 4);

        let ChildRef::N4(root_idx) = tree.root else {
            panic!("expected the root to be an N4 over the shared 20-byte prefix")
        };
        assert!(
            tree.arena.n4[root_idx as usize].header.prefix_len as usize > node::PREFIX_LEN,
            "the root's true prefix length must exceed the bounded buffer to exercise lazy expansion"
        );

        for (i, k) in keys.iter().enumerate() {
            assert_eq!(tree.search(k, k), Some(&(i as u8)));
        }

        // A key that diverges inside the lazily-expanded region (past the bounded 10-byte
        // buffer, at byte 15) but still dispatches to a real child byte at depth 20 must not be
        // reported as found: `search`'s bounded `check_prefix` trusts the unchecked remainder, so
        // it is the final leaf-equality check against the original bytes that must catch this.
        let mut diverging = vec![b'a'; 20];
        diverging[15] = b'z';
        diverging.push(0); // dispatches to the same child as `keys[0]`
        let diverging = Bytes::from(diverging);
        assert_eq!(tree.search(&diverging, &diverging), None);
    }

    /// §4.3 collapse: deleting down to a single grandchild concatenates the surviving edge byte
    /// and the child's own prefix into one combined compressed prefix on the parent's parent,
    /// rather than leaving a degenerate single-child inner node behind (invariant 5).
    #[test]
    fn deleting_siblings_collapses_through_multiple_levels() {
        let mut tree: RawTree<u8> = RawTree::default();
        // Two keys diverge at byte 20 (from a 20-byte shared prefix), and one of those two
        // branches itself diverges again a few bytes later.
        let a = key(20, b'x');
        let b = {
            let mut v = vec![b'a'; 20];
            v.push(b'y');
            v.extend_from_slice(b"111");
            Bytes::from(v)
        };
        let c = {
            let mut v = vec![b'a'; 20];
            v.push(b'y');
            v.extend_from_slice(b"222");
            Bytes::from(v)
        };
        for (i, k) in [&a, &b, &c].into_iter().enumerate() {
            tree.insert(k.clone(), k.clone(), i as u8);
        }
        assert_eq!(tree.len(), 3);

        // Removing `a` leaves only the `y`-branch inner node below the root, which itself has two
        // children (`b`, `c`) -- no collapse should fire yet.
        assert_eq!(tree.delete(&a, &a), Some(0));
        assert_eq!(tree.search(&b, &b), Some(&1));
        assert_eq!(tree.search(&c, &c), Some(&2));

        // Now remove `b`; the `y`-branch node drops to a single leaf child (`c`) and must
        // collapse away entirely, leaving `c` reachable directly.
        assert_eq!(tree.delete(&b, &b), Some(1));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.search(&c, &c), Some(&2));
        assert!(matches!(tree.root, ChildRef::Leaf(_)));
    }

    #[test]
    fn common_prefix_len_matches_naive_scan() {
        assert_eq!(common_prefix_len(b"hello", b"help"), 3);
        assert_eq!(common_prefix_len(b"abc", b"abc"), 3);
        assert_eq!(common_prefix_len(b"", b"abc"), 0);
    }
}
