//! Bit-level views over key types.
//!
//! A [`KeyAnalyzer`] lets [`PatriciaTrie`](super::PatriciaTrie) treat a key as
//! a sequence of fixed-width elements, read MSB first. Bits past the end of a
//! key read as 0, so a shorter key behaves like its zero-padded extension.

use std::cmp::Ordering;

/// Result of comparing two keys bit by bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BitIndex {
    /// Position of the most significant differing bit, counted from the start
    /// of the compared regions.
    Differs(usize),
    /// All compared bits match and at least one of them is set.
    Equal,
    /// Every compared bit on both sides is zero (e.g. two empty keys).
    AllNull,
}

impl BitIndex {
    /// True when the two regions cannot be told apart at the bit level.
    #[inline]
    pub fn is_equal(self) -> bool {
        matches!(self, BitIndex::Equal | BitIndex::AllNull)
    }
}

/// How a key type is laid out as bits.
///
/// All offsets and lengths are in bits.
pub trait KeyAnalyzer {
    /// The borrowed key form the trie is queried with.
    type Key: ?Sized;

    /// Width of one key element in bits.
    fn bits_per_element(&self) -> usize;

    /// Total length of `key` in bits.
    fn length(&self, key: &Self::Key) -> usize;

    /// Tests bit `bit_index` of `key`. Bits at or past `length_in_bits` read as 0.
    fn is_bit_set(&self, key: &Self::Key, bit_index: usize, length_in_bits: usize) -> bool;

    /// Finds the first differing bit between two key regions, treating
    /// positions past either region's end as 0.
    fn bit_index(
        &self,
        key: &Self::Key,
        key_offset: usize,
        key_length: usize,
        other: &Self::Key,
        other_offset: usize,
        other_length: usize,
    ) -> BitIndex;

    /// True iff the region of `prefix` is a literal prefix of `key`.
    ///
    /// # Panics
    ///
    /// Panics if the region does not fall on element boundaries.
    fn is_prefix(
        &self,
        prefix: &Self::Key,
        offset_in_bits: usize,
        length_in_bits: usize,
        key: &Self::Key,
    ) -> bool;

    /// Total lexicographic order over keys, consistent with bit order.
    fn compare(&self, a: &Self::Key, b: &Self::Key) -> Ordering;
}

/// Converts a bit region into an element range, enforcing alignment.
#[inline]
fn element_span(offset_in_bits: usize, length_in_bits: usize, width: usize) -> (usize, usize) {
    assert!(
        offset_in_bits % width == 0 && length_in_bits % width == 0,
        "bit region {offset_in_bits}+{length_in_bits} is not aligned to {width}-bit elements"
    );
    (offset_in_bits / width, length_in_bits / width)
}

/// Shared scan behind both analyzers. Elements are widened to `u32`.
fn first_difference(
    mut a: impl Iterator<Item = u32>,
    mut b: impl Iterator<Item = u32>,
    width: usize,
) -> BitIndex {
    let mut all_null = true;
    let mut i = 0usize;
    loop {
        let (x, y) = match (a.next(), b.next()) {
            (None, None) => break,
            (x, y) => (x.unwrap_or(0), y.unwrap_or(0)),
        };
        if x != y {
            let in_element = (x ^ y).leading_zeros() as usize - (32 - width);
            return BitIndex::Differs(i * width + in_element);
        }
        if x != 0 {
            all_null = false;
        }
        i += 1;
    }
    if all_null {
        BitIndex::AllNull
    } else {
        BitIndex::Equal
    }
}

#[inline]
fn element_bit(element: u32, bit_in_element: usize, width: usize) -> bool {
    element & (1u32 << (width - 1 - bit_in_element)) != 0
}

// =============================================================================
// Character keys
// =============================================================================

/// Analyzer for string keys, one element per UTF-16 code unit (16 bits).
///
/// Every bit read re-encodes the key up to that position. For hot lookups
/// prefer [`Utf16KeyAnalyzer`] over keys encoded once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StringKeyAnalyzer;

impl StringKeyAnalyzer {
    pub const BITS_PER_ELEMENT: usize = 16;
}

impl KeyAnalyzer for StringKeyAnalyzer {
    type Key = str;

    #[inline]
    fn bits_per_element(&self) -> usize {
        Self::BITS_PER_ELEMENT
    }

    fn length(&self, key: &str) -> usize {
        key.encode_utf16().count() * Self::BITS_PER_ELEMENT
    }

    fn is_bit_set(&self, key: &str, bit_index: usize, length_in_bits: usize) -> bool {
        if bit_index >= length_in_bits {
            return false;
        }
        let width = Self::BITS_PER_ELEMENT;
        match key.encode_utf16().nth(bit_index / width) {
            Some(unit) => element_bit(u32::from(unit), bit_index % width, width),
            None => false,
        }
    }

    fn bit_index(
        &self,
        key: &str,
        key_offset: usize,
        key_length: usize,
        other: &str,
        other_offset: usize,
        other_length: usize,
    ) -> BitIndex {
        let width = Self::BITS_PER_ELEMENT;
        let (ks, kn) = element_span(key_offset, key_length, width);
        let (os, on) = element_span(other_offset, other_length, width);
        first_difference(
            key.encode_utf16().skip(ks).take(kn).map(u32::from),
            other.encode_utf16().skip(os).take(on).map(u32::from),
            width,
        )
    }

    fn is_prefix(&self, prefix: &str, offset_in_bits: usize, length_in_bits: usize, key: &str) -> bool {
        let (start, n) = element_span(offset_in_bits, length_in_bits, Self::BITS_PER_ELEMENT);
        let mut key_units = key.encode_utf16();
        prefix
            .encode_utf16()
            .skip(start)
            .take(n)
            .all(|unit| key_units.next() == Some(unit))
    }

    fn compare(&self, a: &str, b: &str) -> Ordering {
        a.encode_utf16().cmp(b.encode_utf16())
    }
}

// =============================================================================
// Pre-encoded UTF-16 keys
// =============================================================================

/// Analyzer for keys already encoded as UTF-16 code units.
///
/// Orders and discriminates exactly like [`StringKeyAnalyzer`], but reads a
/// bit in constant time instead of re-encoding the string. Use it when keys
/// are looked up often enough to be worth encoding once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Utf16KeyAnalyzer;

impl KeyAnalyzer for Utf16KeyAnalyzer {
    type Key = [u16];

    #[inline]
    fn bits_per_element(&self) -> usize {
        StringKeyAnalyzer::BITS_PER_ELEMENT
    }

    #[inline]
    fn length(&self, key: &[u16]) -> usize {
        key.len() * StringKeyAnalyzer::BITS_PER_ELEMENT
    }

    #[inline]
    fn is_bit_set(&self, key: &[u16], bit_index: usize, length_in_bits: usize) -> bool {
        if bit_index >= length_in_bits {
            return false;
        }
        match key.get(bit_index / 16) {
            Some(&unit) => element_bit(u32::from(unit), bit_index % 16, 16),
            None => false,
        }
    }

    fn bit_index(
        &self,
        key: &[u16],
        key_offset: usize,
        key_length: usize,
        other: &[u16],
        other_offset: usize,
        other_length: usize,
    ) -> BitIndex {
        let (ks, kn) = element_span(key_offset, key_length, 16);
        let (os, on) = element_span(other_offset, other_length, 16);
        first_difference(
            key.iter().skip(ks).take(kn).map(|&u| u32::from(u)),
            other.iter().skip(os).take(on).map(|&u| u32::from(u)),
            16,
        )
    }

    fn is_prefix(&self, prefix: &[u16], offset_in_bits: usize, length_in_bits: usize, key: &[u16]) -> bool {
        let (start, n) = element_span(offset_in_bits, length_in_bits, 16);
        let start = start.min(prefix.len());
        let end = (start + n).min(prefix.len());
        key.starts_with(&prefix[start..end])
    }

    #[inline]
    fn compare(&self, a: &[u16], b: &[u16]) -> Ordering {
        a.cmp(b)
    }
}

// =============================================================================
// Byte keys
// =============================================================================

/// Analyzer for byte-array keys, 8 bits per element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ByteKeyAnalyzer;

impl ByteKeyAnalyzer {
    pub const BITS_PER_ELEMENT: usize = 8;
}

impl KeyAnalyzer for ByteKeyAnalyzer {
    type Key = [u8];

    #[inline]
    fn bits_per_element(&self) -> usize {
        Self::BITS_PER_ELEMENT
    }

    #[inline]
    fn length(&self, key: &[u8]) -> usize {
        key.len() * Self::BITS_PER_ELEMENT
    }

    #[inline]
    fn is_bit_set(&self, key: &[u8], bit_index: usize, length_in_bits: usize) -> bool {
        if bit_index >= length_in_bits {
            return false;
        }
        match key.get(bit_index / 8) {
            Some(&byte) => element_bit(u32::from(byte), bit_index % 8, 8),
            None => false,
        }
    }

    fn bit_index(
        &self,
        key: &[u8],
        key_offset: usize,
        key_length: usize,
        other: &[u8],
        other_offset: usize,
        other_length: usize,
    ) -> BitIndex {
        let (ks, kn) = element_span(key_offset, key_length, 8);
        let (os, on) = element_span(other_offset, other_length, 8);
        first_difference(
            key.iter().skip(ks).take(kn).map(|&b| u32::from(b)),
            other.iter().skip(os).take(on).map(|&b| u32::from(b)),
            8,
        )
    }

    fn is_prefix(&self, prefix: &[u8], offset_in_bits: usize, length_in_bits: usize, key: &[u8]) -> bool {
        let (start, n) = element_span(offset_in_bits, length_in_bits, 8);
        let start = start.min(prefix.len());
        let end = (start + n).min(prefix.len());
        key.starts_with(&prefix[start..end])
    }

    #[inline]
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        a.cmp(b)
    }
}
