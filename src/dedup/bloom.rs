//! Bloom-ed words: a fixed-width prefix key plus an optional pooled suffix.
//!
//! The first eight bytes of a word are packed big-endian into a `u64`
//! (shorter words are zero-padded), so ordering the prefix as an unsigned
//! integer equals ordering those bytes lexicographically. Words longer than
//! the prefix keep their remainder in the arena's string pool,
//! NUL-terminated, referenced by offset. The combined order - prefix first,
//! then suffix bytes with "no suffix" least - is exactly bytewise word
//! order, which is what keeps poured runs mergeable.

use std::cmp::Ordering;

/// Width of the inline prefix in bytes.
pub const PREFIX_LEN: usize = 8;

/// Sentinel offset for words that fit entirely in the prefix.
pub const NO_SUFFIX: u64 = u64::MAX;

/// Fixed-size key embedded in every arena item.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BloomKey {
    /// First eight word bytes, big-endian, zero-padded.
    pub prefix: u64,
    /// Region-absolute offset of the NUL-terminated suffix, or [`NO_SUFFIX`].
    pub suffix_off: u64,
}

impl BloomKey {
    pub fn has_suffix(&self) -> bool {
        self.suffix_off != NO_SUFFIX
    }
}

/// Pack the leading word bytes into the prefix integer.
pub fn prefix_of(word: &[u8]) -> u64 {
    let mut prefix = 0u64;
    for i in 0..PREFIX_LEN {
        let b = word.get(i).copied().unwrap_or(0);
        prefix = (prefix << 8) | u64::from(b);
    }
    prefix
}

/// The part of the word that does not fit in the prefix.
pub fn suffix_of(word: &[u8]) -> &[u8] {
    if word.len() > PREFIX_LEN {
        &word[PREFIX_LEN..]
    } else {
        &[]
    }
}

/// Read-only view of the arena's string pool, able to resolve, compare and
/// reconstruct keys whose suffixes live inside it.
pub struct SuffixPool<'a> {
    /// Region-absolute offset of `bytes[0]`.
    base: usize,
    bytes: &'a [u8],
}

impl<'a> SuffixPool<'a> {
    pub fn new(base: usize, bytes: &'a [u8]) -> Self {
        Self { base, bytes }
    }

    /// Suffix bytes of `key`, without the NUL terminator.
    fn suffix(&self, key: &BloomKey) -> &'a [u8] {
        debug_assert!(key.has_suffix());
        let tail = &self.bytes[key.suffix_off as usize - self.base..];
        let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
        &tail[..end]
    }

    /// Total order over keys; equals bytewise order of the original words.
    pub fn compare(&self, a: &BloomKey, b: &BloomKey) -> Ordering {
        a.prefix.cmp(&b.prefix).then_with(|| {
            match (a.has_suffix(), b.has_suffix()) {
                (false, false) => Ordering::Equal,
                (false, true) => Ordering::Less,
                (true, false) => Ordering::Greater,
                (true, true) => self.suffix(a).cmp(self.suffix(b)),
            }
        })
    }

    /// Rebuild the original word bytes.
    pub fn reconstruct(&self, key: &BloomKey) -> Vec<u8> {
        let mut word = Vec::with_capacity(PREFIX_LEN + 8);
        for i in (0..PREFIX_LEN).rev() {
            let b = ((key.prefix >> (8 * i)) & 0xff) as u8;
            if b == 0 {
                // Zero padding; words never contain NUL.
                break;
            }
            word.push(b);
        }
        if key.has_suffix() {
            word.extend_from_slice(self.suffix(key));
        }
        word
    }
}
