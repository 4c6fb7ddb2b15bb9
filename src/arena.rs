//! Per-kind slab storage and the tagged child reference that ties it together.
//!
//! Every node kind (leaf, N4, N16, N48, N256) lives in its own [`slab::Slab`]. A [`ChildRef`] is a
//! small `Copy` value carrying a kind tag and a `u32` index into the matching slab, the safe,
//! arena-indexed stand-in for a raw tagged pointer.

use slab::Slab;

use crate::leaf::Leaf;
use crate::node::{NodeN4, NodeN16, NodeN48, NodeN256};

/// Identifies either an absent child, a leaf, or one of the four inner-node kinds, plus the arena
/// slot that holds it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum ChildRef {
    None,
    Leaf(u32),
    N4(u32),
    N16(u32),
    N48(u32),
    N256(u32),
}

impl ChildRef {
    pub(crate) fn is_none(&self) -> bool {
        matches!(self, ChildRef::None)
    }

    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self, ChildRef::Leaf(_))
    }
}

impl Default for ChildRef {
    fn default() -> Self {
        ChildRef::None
    }
}

/// One slab per node kind, plus one for leaves.
pub(crate) struct Arena<V> {
    pub(crate) leaves: Slab<Leaf<V>>,
    pub(crate) n4: Slab<NodeN4>,
    pub(crate) n16: Slab<NodeN16>,
    pub(crate) n48: Slab<NodeN48>,
    pub(crate) n256: Slab<NodeN256>,
}

impl<V> Default for Arena<V> {
    fn default() -> Self {
        Self {
            leaves: Slab::new(),
            n4: Slab::new(),
            n16: Slab::new(),
            n48: Slab::new(),
            n256: Slab::new(),
        }
    }
}

impl<V> Arena<V> {
    pub(crate) fn with_capacity(cap: usize) -> Self {
        Self {
            leaves: Slab::with_capacity(cap),
            n4: Slab::with_capacity(cap / 2 + 1),
            n16: Slab::with_capacity(cap / 8 + 1),
            n48: Slab::with_capacity(cap / 32 + 1),
            n256: Slab::with_capacity(cap / 64 + 1),
        }
    }

    pub(crate) fn insert_leaf(&mut self, leaf: Leaf<V>) -> ChildRef {
        ChildRef::Leaf(self.leaves.insert(leaf) as u32)
    }

    pub(crate) fn leaf(&self, idx: u32) -> &Leaf<V> {
        &self.leaves[idx as usize]
    }

    pub(crate) fn leaf_mut(&mut self, idx: u32) -> &mut Leaf<V> {
        &mut self.leaves[idx as usize]
    }

    pub(crate) fn remove_leaf(&mut self, idx: u32) -> Leaf<V> {
        self.leaves.remove(idx as usize)
    }

    /// Looks up the child for byte `b` under `node`, dispatching on node kind.
    pub(crate) fn find_child(&self, node: ChildRef, b: u8) -> ChildRef {
        match node {
            ChildRef::N4(idx) => self.n4[idx as usize].find_child(b),
            ChildRef::N16(idx) => self.n16[idx as usize].find_child(b),
            ChildRef::N48(idx) => self.n48[idx as usize].find_child(b),
            ChildRef::N256(idx) => self.n256[idx as usize].find_child(b),
            ChildRef::Leaf(_) | ChildRef::None => {
                unreachable!("find_child called on a non-inner reference")
            }
        }
    }

    /// Returns the smallest-byte child reference of an inner node (used by `minimum`).
    pub(crate) fn first_child(&self, node: ChildRef) -> ChildRef {
        match node {
            ChildRef::N4(idx) => self.n4[idx as usize].children[0],
            ChildRef::N16(idx) => self.n16[idx as usize].children[0],
            ChildRef::N48(idx) => {
                let n = &self.n48[idx as usize];
                let slot = n.keys.iter().position(|&k| k != 0).expect("non-empty n48");
                n.children[(n.keys[slot] - 1) as usize]
            }
            ChildRef::N256(idx) => {
                let n = &self.n256[idx as usize];
                let b = n
                    .children
                    .iter()
                    .position(|c| !c.is_none())
                    .expect("non-empty n256");
                n.children[b]
            }
            ChildRef::Leaf(_) | ChildRef::None => {
                unreachable!("first_child called on a non-inner reference")
            }
        }
    }

    /// Returns the largest-byte child reference of an inner node (used by `maximum`).
    pub(crate) fn last_child(&self, node: ChildRef) -> ChildRef {
        match node {
            ChildRef::N4(idx) => {
                let n = &self.n4[idx as usize];
                n.children[n.header.children_len as usize - 1]
            }
            ChildRef::N16(idx) => {
                let n = &self.n16[idx as usize];
                n.children[n.header.children_len as usize - 1]
            }
            ChildRef::N48(idx) => {
                let n = &self.n48[idx as usize];
                let slot = n
                    .keys
                    .iter()
                    .rposition(|&k| k != 0)
                    .expect("non-empty n48");
                n.children[(n.keys[slot] - 1) as usize]
            }
            ChildRef::N256(idx) => {
                let n = &self.n256[idx as usize];
                let b = n
                    .children
                    .iter()
                    .rposition(|c| !c.is_none())
                    .expect("non-empty n256");
                n.children[b]
            }
            ChildRef::Leaf(_) | ChildRef::None => {
                unreachable!("last_child called on a non-inner reference")
            }
        }
    }

    pub(crate) fn prefix_len(&self, node: ChildRef) -> u32 {
        match node {
            ChildRef::N4(idx) => self.n4[idx as usize].header.prefix_len,
            ChildRef::N16(idx) => self.n16[idx as usize].header.prefix_len,
            ChildRef::N48(idx) => self.n48[idx as usize].header.prefix_len,
            ChildRef::N256(idx) => self.n256[idx as usize].header.prefix_len,
            ChildRef::Leaf(_) | ChildRef::None => 0,
        }
    }

    pub(crate) fn children_len(&self, node: ChildRef) -> usize {
        match node {
            ChildRef::N4(idx) => self.n4[idx as usize].header.children_len as usize,
            ChildRef::N16(idx) => self.n16[idx as usize].header.children_len as usize,
            ChildRef::N48(idx) => self.n48[idx as usize].header.children_len as usize,
            ChildRef::N256(idx) => self.n256[idx as usize].header.children_len as usize,
            ChildRef::Leaf(_) | ChildRef::None => 0,
        }
    }

    /// Returns `node`'s children in byte order (ascending), or reverse-byte order when
    /// `reverse` is set. N4/N16 already store children sorted by key; N48/N256 are scanned
    /// byte-by-byte since their internal slot layout is not itself ordered.
    pub(crate) fn children_sorted(&self, node: ChildRef, reverse: bool) -> Vec<ChildRef> {
        let mut out = match node {
            ChildRef::N4(idx) => {
                let n = &self.n4[idx as usize];
                n.children[..n.header.children_len as usize].to_vec()
            }
            ChildRef::N16(idx) => {
                let n = &self.n16[idx as usize];
                n.children[..n.header.children_len as usize].to_vec()
            }
            ChildRef::N48(idx) => {
                let n = &self.n48[idx as usize];
                (0..256)
                    .filter_map(|b| {
                        let slot = n.keys[b];
                        (slot != 0).then(|| n.children[(slot - 1) as usize])
                    })
                    .collect()
            }
            ChildRef::N256(idx) => {
                let n = &self.n256[idx as usize];
                n.children.iter().copied().filter(|c| !c.is_none()).collect()
            }
            ChildRef::Leaf(_) | ChildRef::None => Vec::new(),
        };
        if reverse {
            out.reverse();
        }
        out
    }
}
