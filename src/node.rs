//! The four ART inner-node layouts: fan-out-adaptive byte-to-child dispatch tables sharing a
//! common compressed-prefix header.

use crate::arena::{Arena, ChildRef};
use crate::search;

/// In-node prefix buffer length. Prefixes longer than this are only partially stored; the
/// remainder is recovered lazily from the subtree's minimum leaf (`prefix_mismatch` in
/// `src/tree.rs`).
pub(crate) const PREFIX_LEN: usize = 10;

pub(crate) const MIN_N4: u8 = 2;
pub(crate) const MAX_N4: u8 = 4;
pub(crate) const MAX_N16: u8 = 16;
pub(crate) const DEMOTE_N16: u8 = 3;
pub(crate) const MAX_N48: u8 = 48;
pub(crate) const DEMOTE_N48: u8 = 12;
pub(crate) const DEMOTE_N256: u16 = 37;

/// The header shared by every inner-node kind.
#[derive(Clone, Default)]
pub(crate) struct Header {
    pub(crate) prefix_len: u32,
    pub(crate) children_len: u16,
    pub(crate) prefix: [u8; PREFIX_LEN],
}

impl Header {
    fn with_prefix(prefix_len: u32, full_prefix: &[u8]) -> Self {
        let mut prefix = [0u8; PREFIX_LEN];
        let copy_len = full_prefix.len().min(PREFIX_LEN);
        prefix[..copy_len].copy_from_slice(&full_prefix[..copy_len]);
        Self {
            prefix_len,
            children_len: 0,
            prefix,
        }
    }

    /// Compares the bounded (in-node) prefix against `key[depth..]`, returning the number of
    /// matching leading bytes. Does not consult the subtree minimum leaf: callers that must
    /// handle `prefix_len > PREFIX_LEN` use `prefix_mismatch` in `src/tree.rs` instead.
    pub(crate) fn check_prefix(&self, key: &[u8], depth: usize) -> usize {
        let max_cmp = (self.prefix_len as usize)
            .min(PREFIX_LEN)
            .min(key.len().saturating_sub(depth));
        for i in 0..max_cmp {
            if self.prefix[i] != key[depth + i] {
                return i;
            }
        }
        max_cmp
    }
}

pub(crate) struct NodeN4 {
    pub(crate) header: Header,
    pub(crate) keys: u32,
    pub(crate) children: [ChildRef; 4],
}

impl NodeN4 {
    fn new(prefix_len: u32, full_prefix: &[u8]) -> Self {
        Self {
            header: Header::with_prefix(prefix_len, full_prefix),
            keys: 0,
            children: [ChildRef::None; 4],
        }
    }

    pub(crate) fn find_child(&self, b: u8) -> ChildRef {
        match search::search_node4(self.keys, b) {
            Some(i) if i < self.header.children_len as usize => self.children[i],
            _ => ChildRef::None,
        }
    }

    pub(crate) fn keys_slice(&self) -> Vec<u8> {
        (0..self.header.children_len as usize)
            .map(|i| search::get_at_pos(self.keys, i))
            .collect()
    }

    /// Returns `Some((byte, child))` iff this node has exactly one child.
    pub(crate) fn single_child(&self) -> Option<(u8, ChildRef)> {
        if self.header.children_len == 1 {
            Some((search::get_at_pos(self.keys, 0), self.children[0]))
        } else {
            None
        }
    }
}

pub(crate) struct NodeN16 {
    pub(crate) header: Header,
    pub(crate) keys: [u8; 16],
    pub(crate) children: [ChildRef; 16],
}

impl NodeN16 {
    fn new(prefix_len: u32, full_prefix: &[u8]) -> Self {
        Self {
            header: Header::with_prefix(prefix_len, full_prefix),
            keys: [0u8; 16],
            children: [ChildRef::None; 16],
        }
    }

    pub(crate) fn find_child(&self, b: u8) -> ChildRef {
        match search::search_node16(&self.keys, self.header.children_len as u8, b) {
            Some(i) => self.children[i],
            None => ChildRef::None,
        }
    }
}

pub(crate) struct NodeN48 {
    pub(crate) header: Header,
    /// `keys[b] == 0` means absent; otherwise the child lives at `children[keys[b] - 1]`.
    pub(crate) keys: [u8; 256],
    pub(crate) children: [ChildRef; 48],
}

impl NodeN48 {
    fn new(prefix_len: u32, full_prefix: &[u8]) -> Self {
        Self {
            header: Header::with_prefix(prefix_len, full_prefix),
            keys: [0u8; 256],
            children: [ChildRef::None; 48],
        }
    }

    pub(crate) fn find_child(&self, b: u8) -> ChildRef {
        let i = self.keys[b as usize];
        if i == 0 {
            ChildRef::None
        } else {
            self.children[(i - 1) as usize]
        }
    }
}

pub(crate) struct NodeN256 {
    pub(crate) header: Header,
    pub(crate) children: [ChildRef; 256],
}

impl NodeN256 {
    fn new(prefix_len: u32, full_prefix: &[u8]) -> Self {
        Self {
            header: Header::with_prefix(prefix_len, full_prefix),
            children: [ChildRef::None; 256],
        }
    }

    pub(crate) fn find_child(&self, b: u8) -> ChildRef {
        self.children[b as usize]
    }
}

/// Builds a fresh N4 node (the kind every split/leaf-divergence creates) and inserts it into the
/// arena, returning its [`ChildRef`].
pub(crate) fn new_n4<V>(arena: &mut Arena<V>, prefix_len: u32, full_prefix: &[u8]) -> ChildRef {
    ChildRef::N4(arena.n4.insert(NodeN4::new(prefix_len, full_prefix)) as u32)
}

pub(crate) fn header<'a, V>(arena: &'a Arena<V>, node: ChildRef) -> &'a Header {
    match node {
        ChildRef::N4(i) => &arena.n4[i as usize].header,
        ChildRef::N16(i) => &arena.n16[i as usize].header,
        ChildRef::N48(i) => &arena.n48[i as usize].header,
        ChildRef::N256(i) => &arena.n256[i as usize].header,
        ChildRef::Leaf(_) | ChildRef::None => unreachable!("header() on a non-inner reference"),
    }
}

pub(crate) fn header_mut<'a, V>(arena: &'a mut Arena<V>, node: ChildRef) -> &'a mut Header {
    match node {
        ChildRef::N4(i) => &mut arena.n4[i as usize].header,
        ChildRef::N16(i) => &mut arena.n16[i as usize].header,
        ChildRef::N48(i) => &mut arena.n48[i as usize].header,
        ChildRef::N256(i) => &mut arena.n256[i as usize].header,
        ChildRef::Leaf(_) | ChildRef::None => {
            unreachable!("header_mut() on a non-inner reference")
        }
    }
}

/// Inserts `child` keyed by byte `b` under `node`, promoting to the next-larger kind if full.
/// Returns the (possibly new) [`ChildRef`] the caller must write back into `node`'s slot.
pub(crate) fn add_child<V>(arena: &mut Arena<V>, node: ChildRef, b: u8, child: ChildRef) -> ChildRef {
    match node {
        ChildRef::N4(idx) => add_child_n4(arena, idx, b, child),
        ChildRef::N16(idx) => add_child_n16(arena, idx, b, child),
        ChildRef::N48(idx) => add_child_n48(arena, idx, b, child),
        ChildRef::N256(idx) => add_child_n256(arena, idx, b, child),
        ChildRef::Leaf(_) | ChildRef::None => unreachable!("add_child on a non-inner reference"),
    }
}

fn add_child_n4<V>(arena: &mut Arena<V>, idx: u32, b: u8, child: ChildRef) -> ChildRef {
    let n = &mut arena.n4[idx as usize];
    let len = n.header.children_len as u8;
    if len < MAX_N4 {
        let pos = search::insert_pos_node4(n.keys, b, len);
        search::shift_up_from(&mut n.keys, pos, len as usize);
        for i in (pos..len as usize).rev() {
            n.children[i + 1] = n.children[i];
        }
        search::set_at_pos(&mut n.keys, pos, b);
        n.children[pos] = child;
        n.header.children_len += 1;
        ChildRef::N4(idx)
    } else {
        // Promote to N16.
        let old = &arena.n4[idx as usize];
        let mut n16 = NodeN16::new(old.header.prefix_len, &old.header.prefix);
        n16.header.prefix_len = old.header.prefix_len;
        n16.header.children_len = old.header.children_len;
        for i in 0..MAX_N4 as usize {
            n16.keys[i] = search::get_at_pos(old.keys, i);
            n16.children[i] = old.children[i];
        }
        arena.n4.remove(idx as usize);
        let new_idx = arena.n16.insert(n16) as u32;
        add_child_n16(arena, new_idx, b, child)
    }
}

fn add_child_n16<V>(arena: &mut Arena<V>, idx: u32, b: u8, child: ChildRef) -> ChildRef {
    let n = &mut arena.n16[idx as usize];
    let len = n.header.children_len as u8;
    if len < MAX_N16 {
        let pos = match search::search_node16(&n.keys, len, b) {
            Some(_) => unreachable!("duplicate key insert into node16"),
            None => {
                // Find sorted insertion position (linear scan mirrors the reference's searchNode16
                // fallback semantics for insertion).
                (0..len as usize)
                    .find(|&i| b < n.keys[i])
                    .unwrap_or(len as usize)
            }
        };
        for i in (pos..len as usize).rev() {
            n.keys[i + 1] = n.keys[i];
            n.children[i + 1] = n.children[i];
        }
        n.keys[pos] = b;
        n.children[pos] = child;
        n.header.children_len += 1;
        ChildRef::N16(idx)
    } else {
        let old = &arena.n16[idx as usize];
        let mut n48 = NodeN48::new(old.header.prefix_len, &old.header.prefix);
        n48.header.prefix_len = old.header.prefix_len;
        n48.header.children_len = old.header.children_len;
        n48.children[..MAX_N16 as usize].copy_from_slice(&old.children);
        for i in 0..old.header.children_len as usize {
            n48.keys[old.keys[i] as usize] = (i + 1) as u8;
        }
        arena.n16.remove(idx as usize);
        let new_idx = arena.n48.insert(n48) as u32;
        add_child_n48(arena, new_idx, b, child)
    }
}

fn add_child_n48<V>(arena: &mut Arena<V>, idx: u32, b: u8, child: ChildRef) -> ChildRef {
    let n = &mut arena.n48[idx as usize];
    if n.header.children_len < MAX_N48 as u16 {
        let pos = n
            .children
            .iter()
            .position(|c| c.is_none())
            .expect("node48 below capacity has a free slot");
        n.children[pos] = child;
        n.keys[b as usize] = (pos + 1) as u8;
        n.header.children_len += 1;
        ChildRef::N48(idx)
    } else {
        let old = &arena.n48[idx as usize];
        let mut n256 = NodeN256::new(old.header.prefix_len, &old.header.prefix);
        n256.header.prefix_len = old.header.prefix_len;
        n256.header.children_len = old.header.children_len;
        for i in 0..256usize {
            if old.keys[i] != 0 {
                n256.children[i] = old.children[(old.keys[i] - 1) as usize];
            }
        }
        arena.n48.remove(idx as usize);
        let new_idx = arena.n256.insert(n256) as u32;
        add_child_n256(arena, new_idx, b, child)
    }
}

fn add_child_n256<V>(arena: &mut Arena<V>, idx: u32, b: u8, child: ChildRef) -> ChildRef {
    let n = &mut arena.n256[idx as usize];
    debug_assert!(
        n.children[b as usize].is_none(),
        "add_child_n256 called for an occupied byte"
    );
    n.children[b as usize] = child;
    n.header.children_len += 1;
    ChildRef::N256(idx)
}

/// Removes the child keyed by `b` under `node`, demoting to a smaller kind if the fan-out drops
/// below the kind's hysteresis threshold. Returns the (possibly new, possibly unchanged)
/// [`ChildRef`] the caller must write back into `node`'s slot.
pub(crate) fn delete_child<V>(arena: &mut Arena<V>, node: ChildRef, b: u8) -> ChildRef {
    match node {
        ChildRef::N4(idx) => delete_child_n4(arena, idx, b),
        ChildRef::N16(idx) => delete_child_n16(arena, idx, b),
        ChildRef::N48(idx) => delete_child_n48(arena, idx, b),
        ChildRef::N256(idx) => delete_child_n256(arena, idx, b),
        ChildRef::Leaf(_) | ChildRef::None => {
            unreachable!("delete_child on a non-inner reference")
        }
    }
}

fn delete_child_n4<V>(arena: &mut Arena<V>, idx: u32, b: u8) -> ChildRef {
    let n = &mut arena.n4[idx as usize];
    let len = n.header.children_len as usize;
    if let Some(pos) = search::search_node4(n.keys, b).filter(|&p| p < len) {
        search::shift_down_from(&mut n.keys, pos, len);
        for i in pos..len - 1 {
            n.children[i] = n.children[i + 1];
        }
        n.children[len - 1] = ChildRef::None;
        n.header.children_len -= 1;
    }
    ChildRef::N4(idx)
}

fn delete_child_n16<V>(arena: &mut Arena<V>, idx: u32, b: u8) -> ChildRef {
    let len = arena.n16[idx as usize].header.children_len;
    if let Some(pos) = search::search_node16(&arena.n16[idx as usize].keys, len as u8, b) {
        let n = &mut arena.n16[idx as usize];
        for i in pos..(len as usize - 1) {
            n.keys[i] = n.keys[i + 1];
            n.children[i] = n.children[i + 1];
        }
        n.children[len as usize - 1] = ChildRef::None;
        n.header.children_len -= 1;
    }
    if arena.n16[idx as usize].header.children_len == DEMOTE_N16 as u16 {
        let old = &arena.n16[idx as usize];
        let mut n4 = NodeN4::new(old.header.prefix_len, &old.header.prefix);
        n4.header.prefix_len = old.header.prefix_len;
        n4.header.children_len = old.header.children_len;
        for i in 0..old.header.children_len as usize {
            search::set_at_pos(&mut n4.keys, i, old.keys[i]);
            n4.children[i] = old.children[i];
        }
        arena.n16.remove(idx as usize);
        ChildRef::N4(arena.n4.insert(n4) as u32)
    } else {
        ChildRef::N16(idx)
    }
}

fn delete_child_n48<V>(arena: &mut Arena<V>, idx: u32, b: u8) -> ChildRef {
    let n = &mut arena.n48[idx as usize];
    let slot = n.keys[b as usize];
    if slot != 0 {
        n.children[(slot - 1) as usize] = ChildRef::None;
        n.keys[b as usize] = 0;
        n.header.children_len -= 1;
    }
    if arena.n48[idx as usize].header.children_len == DEMOTE_N48 as u16 {
        let old = &arena.n48[idx as usize];
        let mut n16 = NodeN16::new(old.header.prefix_len, &old.header.prefix);
        n16.header.prefix_len = old.header.prefix_len;
        let mut count = 0u8;
        for byte in 0..256usize {
            if old.keys[byte] != 0 {
                n16.keys[count as usize] = byte as u8;
                n16.children[count as usize] = old.children[(old.keys[byte] - 1) as usize];
                count += 1;
            }
        }
        n16.header.children_len = count as u16;
        arena.n48.remove(idx as usize);
        ChildRef::N16(arena.n16.insert(n16) as u32)
    } else {
        ChildRef::N48(idx)
    }
}

fn delete_child_n256<V>(arena: &mut Arena<V>, idx: u32, b: u8) -> ChildRef {
    let n = &mut arena.n256[idx as usize];
    if !n.children[b as usize].is_none() {
        n.children[b as usize] = ChildRef::None;
        n.header.children_len -= 1;
    }
    if arena.n256[idx as usize].header.children_len == DEMOTE_N256 {
        let old = &arena.n256[idx as usize];
        let mut n48 = NodeN48::new(old.header.prefix_len, &old.header.prefix);
        n48.header.prefix_len = old.header.prefix_len;
        let mut count = 0u8;
        for byte in 0..256usize {
            if !old.children[byte].is_none() {
                n48.children[count as usize] = old.children[byte];
                n48.keys[byte] = count + 1;
                count += 1;
            }
        }
        n48.header.children_len = count as u16;
        arena.n256.remove(idx as usize);
        ChildRef::N48(arena.n48.insert(n48) as u32)
    } else {
        ChildRef::N256(idx)
    }
}

/// Removes `node` from its slab without inspecting its contents. Callers must have already
/// extracted anything they need (header, children) before calling this.
pub(crate) fn free_node<V>(arena: &mut Arena<V>, node: ChildRef) {
    match node {
        ChildRef::N4(idx) => {
            arena.n4.remove(idx as usize);
        }
        ChildRef::N16(idx) => {
            arena.n16.remove(idx as usize);
        }
        ChildRef::N48(idx) => {
            arena.n48.remove(idx as usize);
        }
        ChildRef::N256(idx) => {
            arena.n256.remove(idx as usize);
        }
        ChildRef::Leaf(_) | ChildRef::None => {
            unreachable!("free_node on a non-inner reference")
        }
    }
}

/// Overwrites the child keyed by `b` under `node` in place, without touching `children_len` or
/// triggering promotion/demotion. Used by recursive insert/delete to write back a child whose
/// identity changed (promoted, demoted, or collapsed) one level down.
pub(crate) fn set_child<V>(arena: &mut Arena<V>, node: ChildRef, b: u8, new_child: ChildRef) {
    match node {
        ChildRef::N4(idx) => {
            let n = &mut arena.n4[idx as usize];
            if let Some(pos) = search::search_node4(n.keys, b) {
                if pos < n.header.children_len as usize {
                    n.children[pos] = new_child;
                }
            }
        }
        ChildRef::N16(idx) => {
            let n = &mut arena.n16[idx as usize];
            if let Some(pos) = search::search_node16(&n.keys, n.header.children_len as u8, b) {
                n.children[pos] = new_child;
            }
        }
        ChildRef::N48(idx) => {
            let n = &mut arena.n48[idx as usize];
            let slot = n.keys[b as usize];
            if slot != 0 {
                n.children[(slot - 1) as usize] = new_child;
            }
        }
        ChildRef::N256(idx) => {
            arena.n256[idx as usize].children[b as usize] = new_child;
        }
        ChildRef::Leaf(_) | ChildRef::None => unreachable!("set_child on a non-inner reference"),
    }
}

/// Returns `Some((byte, child))` iff `node` has exactly one remaining child (collapse candidate).
pub(crate) fn single_child<V>(arena: &Arena<V>, node: ChildRef) -> Option<(u8, ChildRef)> {
    match node {
        ChildRef::N4(idx) => arena.n4[idx as usize].single_child(),
        ChildRef::N16(idx) => {
            let n = &arena.n16[idx as usize];
            (n.header.children_len == 1).then(|| (n.keys[0], n.children[0]))
        }
        ChildRef::N48(idx) => {
            let n = &arena.n48[idx as usize];
            if n.header.children_len != 1 {
                return None;
            }
            let byte = n.keys.iter().position(|&k| k != 0)?;
            Some((byte as u8, n.children[(n.keys[byte] - 1) as usize]))
        }
        ChildRef::N256(idx) => {
            let n = &arena.n256[idx as usize];
            if n.header.children_len != 1 {
                return None;
            }
            let byte = n.children.iter().position(|c| !c.is_none())?;
            Some((byte as u8, n.children[byte]))
        }
        ChildRef::Leaf(_) | ChildRef::None => None,
    }
}
