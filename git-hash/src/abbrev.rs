use std::{cmp::Ordering, fmt};

use crate::{AbbreviationError, ObjectId};

const MIN_LEN: usize = 4;
const MAX_LEN: usize = 40;

/// A partial, prefix-comparable view of an [`ObjectId`], holding only the leading `n` hex
/// digits (4 <= n <= 40) and comparing full ids against that prefix without ever materializing
/// the full hex string.
#[derive(Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbbreviatedObjectId {
    prefix_len: u8,
    words: [u32; 5],
}

/// Number of significant hex digits contributed by word `word_index` (0-based) of an
/// abbreviation of length `prefix_len`, clamped to `[0, 8]`.
const fn digits_in_word(prefix_len: u8, word_index: usize) -> u8 {
    let consumed = word_index as i32 * 8;
    let remaining = prefix_len as i32 - consumed;
    if remaining <= 0 {
        0
    } else if remaining >= 8 {
        8
    } else {
        remaining as u8
    }
}

const fn word_mask(prefix_len: u8, word_index: usize) -> u32 {
    let digits = digits_in_word(prefix_len, word_index);
    if digits == 0 {
        0
    } else if digits == 8 {
        u32::MAX
    } else {
        u32::MAX << (32 - 4 * digits as u32)
    }
}

impl AbbreviatedObjectId {
    /// Build an abbreviation of the given length from a full object id.
    pub fn new(prefix_len: usize, source: &ObjectId) -> Result<Self, AbbreviationError> {
        if !(MIN_LEN..=MAX_LEN).contains(&prefix_len) {
            return Err(AbbreviationError::InvalidLength { length: prefix_len });
        }
        let prefix_len = prefix_len as u8;
        let mut words = [0u32; 5];
        for (i, word) in words.iter_mut().enumerate() {
            *word = source.words()[i] & word_mask(prefix_len, i);
        }
        Ok(Self { prefix_len, words })
    }

    /// Parse an abbreviation from a bare hex prefix (4..=40 characters, any case).
    pub fn from_hex(hex: impl AsRef<[u8]>) -> Result<Self, AbbreviationError> {
        let hex = hex.as_ref();
        if !(MIN_LEN..=MAX_LEN).contains(&hex.len()) {
            return Err(AbbreviationError::InvalidLength { length: hex.len() });
        }
        let source = ObjectId::from_hex_len(hex, hex.len()).map_err(|err| match err {
            crate::Error::InvalidHexCharacter { byte, position } => {
                AbbreviationError::InvalidHexCharacter { byte, position }
            }
            crate::Error::InvalidHexLength { length } => {
                AbbreviationError::InvalidLength { length }
            }
            crate::Error::InvalidByteLength { length } => {
                AbbreviationError::InvalidLength { length }
            }
        })?;
        Self::new(hex.len(), &source)
    }

    /// The number of significant hex digits in this abbreviation.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.prefix_len as usize
    }

    /// An abbreviation never has zero significant digits (minimum length is 4).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Compare a full object id's prefix against this abbreviation. Returns
    /// [`Ordering::Equal`] if `full` starts with this abbreviation.
    #[must_use]
    pub fn prefix_compare(&self, full: &ObjectId) -> Ordering {
        for i in 0..5 {
            let mask = word_mask(self.prefix_len, i);
            let full_word = full.words()[i] & mask;
            match full_word.cmp(&self.words[i]) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        Ordering::Equal
    }

    /// Convenience wrapping [`AbbreviatedObjectId::prefix_compare`] as a boolean.
    #[must_use]
    pub fn is_prefix_of(&self, full: &ObjectId) -> bool {
        self.prefix_compare(full) == Ordering::Equal
    }
}

impl fmt::Display for AbbreviatedObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut full_hex = [0u8; MAX_LEN];
        // Reconstruct a full id from the masked words purely to reuse its hex encoder; the
        // trailing, insignificant digits are then truncated away.
        let reconstructed = ObjectId::from_words(self.words);
        reconstructed.to_hex_into(&mut full_hex);
        let hex = std::str::from_utf8(&full_hex[..self.len()]).expect("hex table is ASCII");
        f.write_str(hex)
    }
}

impl fmt::Debug for AbbreviatedObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AbbreviatedObjectId({self})")
    }
}

impl std::str::FromStr for AbbreviatedObjectId {
    type Err = AbbreviationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const S1_HEX: &str = "ca978112ca1bbdcafac231b39a23dc4da786eff8";

    #[test]
    fn prefix_compares_equal_for_matching_id() {
        let id = ObjectId::from_hex(S1_HEX).unwrap();
        let abbrev = AbbreviatedObjectId::from_hex("ca97").unwrap();
        assert_eq!(abbrev.prefix_compare(&id), Ordering::Equal);
        assert!(abbrev.is_prefix_of(&id));
    }

    #[test]
    fn prefix_compares_unequal_for_other_id() {
        let other = ObjectId::from_hex("cb00000000000000000000000000000000000000").unwrap();
        let abbrev = AbbreviatedObjectId::from_hex("ca97").unwrap();
        assert_eq!(abbrev.prefix_compare(&other), Ordering::Less);
    }

    #[test]
    fn rejects_out_of_range_length() {
        assert_eq!(
            AbbreviatedObjectId::from_hex("abc"),
            Err(AbbreviationError::InvalidLength { length: 3 })
        );
        assert_eq!(
            AbbreviatedObjectId::from_hex("a".repeat(41)),
            Err(AbbreviationError::InvalidLength { length: 41 })
        );
    }

    #[test]
    fn display_round_trips_digits() {
        let abbrev = AbbreviatedObjectId::from_hex("abcde").unwrap();
        assert_eq!(abbrev.to_string(), "abcde");
        assert_eq!(abbrev.len(), 5);
    }

    #[test]
    fn full_length_abbreviation_matches_exact_id() {
        let id = ObjectId::from_hex(S1_HEX).unwrap();
        let abbrev = AbbreviatedObjectId::new(40, &id).unwrap();
        assert!(abbrev.is_prefix_of(&id));
        assert_eq!(abbrev.to_string(), S1_HEX);
    }

    #[test]
    fn mask_spans_word_boundary_correctly() {
        // 9 hex digits: first word fully significant, second word contributes one nibble.
        let base = "123456789abcdef0000000000000000000000000";
        assert_eq!(base.len(), 42);
        let base = &base[..40];
        let id = ObjectId::from_hex(base).unwrap();
        let abbrev = AbbreviatedObjectId::new(9, &id).unwrap();
        assert!(abbrev.is_prefix_of(&id));

        let mut differs_in_10th_digit = base.to_string();
        differs_in_10th_digit.replace_range(9..10, "b");
        let differs_in_10th_digit = ObjectId::from_hex(&differs_in_10th_digit).unwrap();
        assert!(abbrev.is_prefix_of(&differs_in_10th_digit));

        let mut differs_in_9th_digit = base.to_string();
        differs_in_9th_digit.replace_range(8..9, "0");
        let differs_in_9th_digit = ObjectId::from_hex(&differs_in_9th_digit).unwrap();
        assert!(!abbrev.is_prefix_of(&differs_in_9th_digit));
    }
}
