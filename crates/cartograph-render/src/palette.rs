use cartograph_common::{CartographError, Result};
use std::collections::BTreeMap;
use std::fmt;

pub const SECTION_VOLUME: usize = 16 * 16 * 16;
pub const DEFAULT_MIN_BITS: u32 = 4;
/// Widest index a packed word stream is read with.
pub const MAX_BITS: u32 = 32;

/// One voxel's type, compared by content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockState {
    pub name: String,
    pub properties: BTreeMap<String, String>,
}

impl BlockState {
    pub fn new(name: impl Into<String>) -> Self {
        BlockState {
            name: name.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

impl fmt::Display for BlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.properties.is_empty() {
            let props: Vec<String> = self
                .properties
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            write!(f, "[{}]", props.join(","))?;
        }
        Ok(())
    }
}

/// Ordered block states used by one section.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    entries: Vec<BlockState>,
}

impl Palette {
    pub fn new(entries: Vec<BlockState>) -> Self {
        Palette { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BlockState> {
        self.entries.get(index)
    }

    pub fn bit_width(&self, min_bits: u32) -> u32 {
        bit_width(self.entries.len(), min_bits)
    }
}

/// Bits per packed index for a palette of `len` entries:
/// `max(min_bits, ceil(log2(len)))`.
pub fn bit_width(len: usize, min_bits: u32) -> u32 {
    let needed = if len <= 1 {
        0
    } else {
        usize::BITS - (len - 1).leading_zeros()
    };
    needed.max(min_bits)
}

/// Number of 64-bit words holding `count` indices of `width` bits with no
/// padding between words.
pub fn packed_len(count: usize, width: u32) -> usize {
    (count * width as usize + 63) / 64
}

/// Reads index `i` from a stream of `width`-bit values packed LSB-first
/// across consecutive words.
#[inline]
pub fn extract(words: &[u64], i: usize, width: u32) -> u32 {
    let bit = i * width as usize;
    let word = bit / 64;
    let offset = (bit % 64) as u32;
    let mask = (1u64 << width) - 1;

    if offset == 0 {
        (words[word] & mask) as u32
    } else if offset + width <= 64 {
        ((words[word] >> offset) & mask) as u32
    } else {
        // low bits from the top of this word, high bits from the next
        let low = words[word] >> offset;
        let high = words[word + 1] << (64 - offset);
        ((low | high) & mask) as u32
    }
}

/// Decodes all indices of a section, checking the word count first.
pub fn unpack(words: &[u64], width: u32, count: usize) -> Result<Vec<u16>> {
    let expected = packed_len(count, width);
    if words.len() != expected {
        return Err(CartographError::PackedLengthMismatch {
            expected,
            actual: words.len(),
        });
    }
    Ok((0..count).map(|i| extract(words, i, width) as u16).collect())
}

/// Packs indices the same way [`extract`] reads them.
pub fn pack(indices: &[u32], width: u32) -> Vec<u64> {
    let mut words = vec![0u64; packed_len(indices.len(), width)];
    let mask = (1u64 << width) - 1;
    for (i, &value) in indices.iter().enumerate() {
        let value = value as u64 & mask;
        let bit = i * width as usize;
        let word = bit / 64;
        let offset = (bit % 64) as u32;
        words[word] |= value << offset;
        if offset + width > 64 {
            words[word + 1] |= value >> (64 - offset);
        }
    }
    words
}
