//! Locale-agnostic, strength-configurable string collation.
//!
//! No crate in the Rust ecosystem exposes raw Unicode-Collation-Algorithm sort-key bytes (the
//! widely used `icu_collator` crate only offers a pairwise `compare`, which cannot drive an ART
//! edge dispatch — that needs an actual per-key byte transform). This module instead builds a
//! simplified collation key out of Unicode normalization: NFD-decompose, then, depending on
//! strength, fold case and/or drop combining marks before appending the remaining codepoints.
//! This approximates primary/secondary/tertiary-strength UCA comparison for the common case of
//! Latin-script text; it is not a conformant UCA implementation for scripts with non-trivial
//! collation reordering (see DESIGN.md). The reference implementation's `collate.Numeric` option
//! (treating embedded digit runs as numbers, so `"9" < "11"`) is reproduced independently of
//! strength/case handling: maximal digit runs are length-prefixed rather than emitted verbatim, so
//! that comparing transformed bytes compares magnitude before lexicographic digit order.

use bytes::Bytes;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::codec::KeyCodec;

/// How many levels of distinction the collation key preserves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Strength {
    /// Case- and accent-insensitive: `"a"`, `"A"`, and `"á"` all collate equal.
    Primary,
    /// Accent-sensitive, case-insensitive: `"a"` and `"A"` equal, `"á"` distinct.
    #[default]
    Secondary,
    /// Fully distinguishing (case and accents both significant).
    Tertiary,
}

/// Collator configuration, mirroring the reference implementation's functional-option surface
/// (`WithCollator`, a `*collate.Collator` built from `collate.New(language, opts...)`): a locale
/// tag, a strength, and the `collate.Numeric` flag.
///
/// `locale` is accepted but does not currently affect ordering — this codec has no script-specific
/// reordering tables (see the module doc and DESIGN.md); it is carried on the config so the public
/// surface names the same three knobs the reference implementation exposes.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CollationConfig {
    pub locale: Option<String>,
    pub strength: Strength,
    pub numeric: bool,
}

impl CollationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strength(mut self, strength: Strength) -> Self {
        self.strength = strength;
        self
    }

    pub fn with_numeric(mut self, numeric: bool) -> Self {
        self.numeric = numeric;
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

/// A digit-run marker byte. Maximal ASCII-digit runs are replaced by `[MARKER, len, digits...]`
/// when [`CollationConfig::numeric`] is set, so runs compare by magnitude (length, then digit
/// value) rather than lexicographically digit-by-digit. Collides with a literal `0x01` byte in the
/// input, an accepted restriction in the same spirit as the `0x00` terminator restriction on
/// [`crate::codec::BytesCodec`].
const DIGIT_RUN_MARKER: u8 = 0x01;

/// String collation codec, configurable via [`CollationConfig`].
///
/// Mirrors the reference implementation's functional-option `WithCollator` pattern: the whole
/// configuration is captured once, at construction, and held for the tree's lifetime.
#[derive(Clone)]
pub struct CollationCodec {
    config: CollationConfig,
}

impl Default for CollationCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl CollationCodec {
    pub fn new() -> Self {
        Self {
            config: CollationConfig::default(),
        }
    }

    pub fn with_strength(strength: Strength) -> Self {
        Self {
            config: CollationConfig::new().with_strength(strength),
        }
    }

    pub fn with_config(config: CollationConfig) -> Self {
        Self { config }
    }

    fn sort_key(&self, s: &str) -> Vec<u8> {
        let decomposed: Vec<char> = s.nfd().collect();
        let mut key = Vec::with_capacity(s.len() + 1);
        let mut i = 0usize;
        while i < decomposed.len() {
            let c = decomposed[i];
            if self.config.numeric && c.is_ascii_digit() {
                let start = i;
                while i < decomposed.len() && decomposed[i].is_ascii_digit() {
                    i += 1;
                }
                push_digit_run(&mut key, &decomposed[start..i]);
                continue;
            }
            if self.config.strength == Strength::Primary && is_combining_mark(c) {
                i += 1;
                continue;
            }
            let folded = if self.config.strength == Strength::Tertiary {
                c
            } else {
                c.to_lowercase().next().unwrap_or(c)
            };
            let mut buf = [0u8; 4];
            key.extend_from_slice(folded.encode_utf8(&mut buf).as_bytes());
            i += 1;
        }
        key.push(0);
        key
    }
}

/// Strips leading zeros (keeping at least one digit) and emits `[MARKER, len, digits...]`. Two
/// digit runs with no leading zeros compare correctly byte-for-byte: a shorter run is numerically
/// smaller, and same-length runs already compare correctly as ASCII digit bytes.
fn push_digit_run(key: &mut Vec<u8>, run: &[char]) {
    let mut digits: Vec<u8> = run.iter().map(|&c| c as u8).collect();
    while digits.len() > 1 && digits[0] == b'0' {
        digits.remove(0);
    }
    key.push(DIGIT_RUN_MARKER);
    key.push(digits.len().min(u8::MAX as usize) as u8);
    key.extend_from_slice(&digits);
}

impl KeyCodec for CollationCodec {
    type Key = String;

    fn transform(&self, key: &String) -> (Bytes, Bytes) {
        let original = Bytes::from(key.clone().into_bytes());
        let transformed = Bytes::from(self.sort_key(key));
        (original, transformed)
    }

    fn restore(&self, original: &Bytes) -> String {
        String::from_utf8(original.to_vec()).expect("collation codec only stores valid UTF-8")
    }

    fn transform_prefix(&self, key: &String) -> Bytes {
        let mut key_bytes = self.sort_key(key);
        key_bytes.pop();
        Bytes::from(key_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_strength_ignores_case_and_accents() {
        let codec = CollationCodec::with_strength(Strength::Primary);
        assert_eq!(
            codec.transform(&"resume".to_string()).1,
            codec.transform(&"RESUME".to_string()).1
        );
        assert_eq!(
            codec.transform(&"resume".to_string()).1,
            codec.transform(&"r\u{e9}sum\u{e9}".to_string()).1
        );
    }

    #[test]
    fn secondary_strength_ignores_case_but_not_accents() {
        let codec = CollationCodec::with_strength(Strength::Secondary);
        assert_eq!(
            codec.transform(&"cafe".to_string()).1,
            codec.transform(&"CAFE".to_string()).1
        );
        assert_ne!(
            codec.transform(&"cafe".to_string()).1,
            codec.transform(&"caf\u{e9}".to_string()).1
        );
    }

    #[test]
    fn tertiary_strength_distinguishes_everything() {
        let codec = CollationCodec::with_strength(Strength::Tertiary);
        assert_ne!(
            codec.transform(&"resume".to_string()).1,
            codec.transform(&"RESUME".to_string()).1
        );
    }

    #[test]
    fn default_collation_sorts_digit_runs_lexicographically() {
        let codec = CollationCodec::default();
        let one = codec.transform(&"1".to_string()).1;
        let eleven = codec.transform(&"11".to_string()).1;
        let nine = codec.transform(&"9".to_string()).1;
        assert!(one < eleven);
        assert!(eleven < nine);
    }

    #[test]
    fn numeric_flag_orders_digit_runs_by_magnitude() {
        let codec = CollationCodec::with_config(
            CollationConfig::new().with_locale("en").with_numeric(true),
        );
        let one = codec.transform(&"1".to_string()).1;
        let nine = codec.transform(&"9".to_string()).1;
        let eleven = codec.transform(&"11".to_string()).1;
        assert!(one < nine);
        assert!(nine < eleven);
    }

    #[test]
    fn numeric_flag_strips_leading_zeros() {
        let codec = CollationCodec::with_config(CollationConfig::new().with_numeric(true));
        let one = codec.transform(&"1".to_string()).1;
        let zero_one = codec.transform(&"01".to_string()).1;
        assert_eq!(one, zero_one);
    }

    #[test]
    fn numeric_flag_still_applies_strength_outside_digit_runs() {
        let codec = CollationCodec::with_config(
            CollationConfig::new().with_strength(Strength::Primary).with_numeric(true),
        );
        assert_eq!(
            codec.transform(&"item9".to_string()).1,
            codec.transform(&"ITEM9".to_string()).1
        );
    }
}
