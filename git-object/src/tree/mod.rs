use std::{cmp::Ordering, fmt, io};

use bstr::{BStr, BString, ByteSlice};
use git_hash::ObjectId;

mod error;
pub use error::Error;

/// A discretized, well-known git tree-entry mode. Every valid [`EntryMode`] maps to exactly one
/// of these; converting the other way may lose information git itself never distinguishes (e.g.
/// `"040000"` vs `"40000"`).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Ord, PartialOrd, Hash)]
#[repr(u16)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntryKind {
    /// A tree (directory).
    Tree = 0o040_000,
    /// A non-executable file.
    Blob = 0o100_644,
    /// An executable file.
    BlobExecutable = 0o100_755,
    /// A symbolic link.
    Link = 0o120_000,
    /// A commit, recording a git submodule.
    Commit = 0o160_000,
}

/// Mask selecting the "object type" bits of a tree-entry mode, discarding permission bits.
const IFMT: u16 = 0o170_000;

const fn kind_from_value(mode: u16) -> Option<EntryKind> {
    match mode & IFMT {
        0o100_000 => {
            if mode & 0o000_100 == 0o000_100 {
                Some(EntryKind::BlobExecutable)
            } else {
                Some(EntryKind::Blob)
            }
        }
        0o120_000 => Some(EntryKind::Link),
        0o040_000 => Some(EntryKind::Tree),
        0o160_000 => Some(EntryKind::Commit),
        _ => None,
    }
}

impl EntryKind {
    /// The octal digits git writes for this kind in a tree record, with no leading zero.
    #[must_use]
    pub fn as_octal_bytes(&self) -> &'static [u8] {
        match self {
            Self::Tree => b"40000",
            Self::Blob => b"100644",
            Self::BlobExecutable => b"100755",
            Self::Link => b"120000",
            Self::Commit => b"160000",
        }
    }
}

/// The mode of an entry in a tree, stored both as the canonical numeric value and as the exact
/// byte representation git writes (which may omit a leading zero).
#[derive(Clone, Copy, PartialEq, Eq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntryMode {
    value: u16,
    representation: [u8; 6],
    representation_len: u8,
}

impl fmt::Debug for EntryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryMode(0o{})", self.as_bstr())
    }
}

impl EntryMode {
    /// Discretize this mode's well-known kind, dropping permission-bit noise.
    ///
    /// # Panics
    /// If this mode was built via [`EntryMode::from_bits_unchecked`] with bits that do not
    /// correspond to any [`EntryKind`] (only reachable internally, never from parsed input).
    #[must_use]
    pub fn kind(&self) -> EntryKind {
        kind_from_value(self.value).expect("EntryMode always holds a validated value")
    }

    /// True if this mode is [`EntryKind::Tree`].
    #[must_use]
    pub fn is_tree(&self) -> bool {
        self.kind() == EntryKind::Tree
    }

    /// True if this mode is [`EntryKind::Commit`] (a submodule).
    #[must_use]
    pub fn is_commit(&self) -> bool {
        self.kind() == EntryKind::Commit
    }

    /// True if this mode is [`EntryKind::Link`].
    #[must_use]
    pub fn is_link(&self) -> bool {
        self.kind() == EntryKind::Link
    }

    /// True if this mode is any kind of blob (executable or not).
    #[must_use]
    pub fn is_blob(&self) -> bool {
        matches!(self.kind(), EntryKind::Blob | EntryKind::BlobExecutable)
    }

    /// The exact bytes git would write for this mode (no leading zero, unless the mode was
    /// parsed from input that had one and is being round-tripped in permissive contexts).
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.representation[..self.representation_len as usize]
    }

    /// [`EntryMode::as_bytes`] as a [`BStr`].
    #[must_use]
    pub fn as_bstr(&self) -> &BStr {
        self.as_bytes().as_bstr()
    }

    /// The raw numeric mode value.
    #[must_use]
    pub const fn value(&self) -> u16 {
        self.value
    }

    /// True if this mode's on-disk representation carried a leading zero (e.g. `"040000"`
    /// rather than `"40000"`), which the checker flags via `ZeroPaddedFileMode`.
    #[must_use]
    pub fn is_zero_padded(&self) -> bool {
        self.representation_len > 1 && self.representation[0] == b'0'
    }

    fn with_representation(kind: EntryKind, representation: &[u8]) -> Self {
        let mut buf = [0u8; 6];
        buf[..representation.len()].copy_from_slice(representation);
        Self { value: kind as u16, representation: buf, representation_len: representation.len() as u8 }
    }
}

impl From<EntryKind> for EntryMode {
    fn from(kind: EntryKind) -> Self {
        Self::with_representation(kind, kind.as_octal_bytes())
    }
}

/// Parse octal mode digits (no leading/trailing delimiters) into a numeric mode, rejecting
/// anything that is not 1-6 octal digits whose value corresponds to a known [`EntryKind`].
///
/// Unlike the teacher implementation this intentionally records whether a leading zero was
/// present, since the checker (§4.5, `ZeroPaddedFileMode`) must be able to tell.
pub(crate) fn parse_mode(digits: &[u8]) -> Result<EntryMode, Error> {
    if digits.is_empty() || digits.len() > 6 {
        return Err(Error::InvalidMode);
    }
    let mut value: u32 = 0;
    for &b in digits {
        if !(b'0'..=b'7').contains(&b) {
            return Err(Error::InvalidMode);
        }
        value = (value << 3) | u32::from(b - b'0');
    }
    let kind = kind_from_value(value as u16).filter(|_| value <= u32::from(u16::MAX)).ok_or(Error::UnknownType)?;
    Ok(EntryMode::with_representation(kind, digits))
}

/// A borrowed entry in a [`TreeRef`].
#[derive(PartialEq, Eq, Debug, Hash, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntryRef<'a> {
    /// This entry's mode.
    pub mode: EntryMode,
    /// The entry's name within its parent tree; never contains `/` or NUL.
    pub filename: &'a BStr,
    /// The id of the object this entry names. Copied out of the source buffer rather than
    /// borrowed, since a 20-byte id is cheaper to copy than to keep a second lifetime around for.
    pub oid: ObjectId,
}

/// An owned entry in a [`Tree`].
#[derive(PartialEq, Eq, Debug, Hash, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entry {
    /// This entry's mode.
    pub mode: EntryMode,
    /// The entry's name within its parent tree; never contains `/` or NUL.
    pub filename: BString,
    /// The id of the object this entry names.
    pub oid: ObjectId,
}

/// Compare two tree-entry names the way git orders and validates tree records (§4.6): as if each
/// name were followed by one virtual terminator byte — `/` for a tree entry, `0x00` otherwise —
/// then compared byte-by-byte unsigned.
fn compare_entry_names(a_name: &BStr, a_is_tree: bool, b_name: &BStr, b_is_tree: bool) -> Ordering {
    let common = a_name.len().min(b_name.len());
    a_name[..common].cmp(&b_name[..common]).then_with(|| {
        let a_terminator = a_name.get(common).copied().unwrap_or(if a_is_tree { b'/' } else { 0 });
        let b_terminator = b_name.get(common).copied().unwrap_or(if b_is_tree { b'/' } else { 0 });
        a_terminator.cmp(&b_terminator)
    })
}

impl PartialOrd for EntryRef<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EntryRef<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_entry_names(self.filename, self.mode.is_tree(), other.filename, other.mode.is_tree())
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_entry_names(
            self.filename.as_bstr(),
            self.mode.is_tree(),
            other.filename.as_bstr(),
            other.mode.is_tree(),
        )
    }
}

/// A borrowed, canonically-encoded tree object: an ordered list of entries, each a
/// `(mode, name, id)` triple.
#[derive(PartialEq, Eq, Debug, Hash, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeRef<'a> {
    /// This tree's entries, in the order they appeared in the canonical byte stream.
    pub entries: Vec<EntryRef<'a>>,
}

/// An owned tree object.
#[derive(PartialEq, Eq, Debug, Hash, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tree {
    /// This tree's entries, kept sorted in git's tree order (§4.6).
    pub entries: Vec<Entry>,
}

impl<'a> TreeRef<'a> {
    /// Parse a canonical tree object: a back-to-back sequence of
    /// `<mode> SP <name> 0x00 <20-byte id>` records until the buffer is exhausted.
    ///
    /// This is a structural parse only — it does not enforce sort order or reject duplicate or
    /// disguised names; use [`crate::checker::ObjectChecker`] for that.
    pub fn from_bytes(mut data: &'a [u8]) -> Result<Self, Error> {
        let mut entries = Vec::new();
        while !data.is_empty() {
            let space = data.iter().position(|&b| b == b' ').ok_or(Error::MissingModeDelimiter)?;
            let mode = parse_mode(&data[..space])?;
            let rest = &data[space + 1..];
            let nul = rest.iter().position(|&b| b == 0).ok_or(Error::MissingNameTerminator)?;
            let filename = rest[..nul].as_bstr();
            let after_name = &rest[nul + 1..];
            if after_name.len() < git_hash::RAW_LEN {
                return Err(Error::TruncatedObjectId);
            }
            let oid = ObjectId::from_raw(&after_name[..git_hash::RAW_LEN]).map_err(|_| Error::TruncatedObjectId)?;
            entries.push(EntryRef { mode, filename, oid });
            data = &after_name[git_hash::RAW_LEN..];
        }
        Ok(Self { entries })
    }
}

impl crate::WriteTo for Tree {
    fn write_to(&self, mut out: impl io::Write) -> io::Result<()> {
        for entry in &self.entries {
            out.write_all(entry.mode.as_bytes())?;
            out.write_all(b" ")?;
            out.write_all(&entry.filename)?;
            out.write_all(b"\0")?;
            out.write_all(&entry.oid.to_raw())?;
        }
        Ok(())
    }

    fn size(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.mode.as_bytes().len() + 1 + e.filename.len() + 1 + git_hash::RAW_LEN)
            .sum()
    }

    fn kind(&self) -> crate::Kind {
        crate::Kind::Tree
    }
}

impl From<TreeRef<'_>> for Tree {
    fn from(value: TreeRef<'_>) -> Self {
        Self {
            entries: value
                .entries
                .into_iter()
                .map(|e| Entry { mode: e.mode, filename: e.filename.to_owned(), oid: e.oid })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(mode: EntryKind, name: &'static str) -> Entry {
        Entry { mode: mode.into(), filename: name.into(), oid: ObjectId::null() }
    }

    #[test]
    fn tree_name_sorts_after_same_prefix_blob() {
        // "a" (blob) < "a/" (tree) because a virtual '/' beats the blob's virtual NUL.
        let blob = entry(EntryKind::Blob, "a");
        let tree = entry(EntryKind::Tree, "a");
        assert_eq!(blob.cmp(&tree), Ordering::Less);
    }

    #[test]
    fn sorts_lexicographically_when_no_prefix_relation() {
        let a = entry(EntryKind::Blob, "alpha");
        let b = entry(EntryKind::Blob, "beta");
        assert_eq!(a.cmp(&b), Ordering::Less);
    }

    #[test]
    fn parse_mode_rejects_unknown_type_bits() {
        assert_eq!(parse_mode(b"100000"), Err(Error::UnknownType));
    }

    #[test]
    fn parse_mode_accepts_with_and_without_leading_zero() {
        assert_eq!(parse_mode(b"40000").unwrap().kind(), EntryKind::Tree);
        assert_eq!(parse_mode(b"040000").unwrap().kind(), EntryKind::Tree);
    }

    #[test]
    fn is_zero_padded_detects_a_leading_zero() {
        assert!(!parse_mode(b"40000").unwrap().is_zero_padded());
        assert!(parse_mode(b"040000").unwrap().is_zero_padded());
        assert!(!parse_mode(b"100644").unwrap().is_zero_padded());
    }

    #[test]
    fn round_trips_through_bytes() {
        use crate::WriteTo;

        let tree = Tree {
            entries: vec![
                entry(EntryKind::Blob, "a"),
                entry(EntryKind::Tree, "a"),
                entry(EntryKind::Blob, "b"),
            ],
        };
        let mut buf = Vec::new();
        tree.write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), tree.size());
        let parsed = TreeRef::from_bytes(&buf).unwrap();
        assert_eq!(parsed.entries.len(), 3);
        assert_eq!(parsed.entries[0].filename, "a");
        assert_eq!(parsed.entries[1].mode.kind(), EntryKind::Tree);
    }
}
