//! Fixed values that every implementation of this object format must agree on (§4.8).

/// Length of a raw, binary object id in bytes.
pub const OBJECT_ID_RAW_LEN: usize = git_hash::RAW_LEN;
/// Length of a hex-encoded object id in characters.
pub const OBJECT_ID_HEX_LEN: usize = git_hash::HEX_LEN;

/// The four-byte magic preceding a pack file's version and object count.
pub const PACK_SIGNATURE: &[u8; 4] = b"PACK";

/// Numeric type codes used in pack entry headers.
pub mod type_code {
    /// A commit object.
    pub const COMMIT: u8 = 1;
    /// A tree object.
    pub const TREE: u8 = 2;
    /// A blob object.
    pub const BLOB: u8 = 3;
    /// A tag object.
    pub const TAG: u8 = 4;
    /// An offset-delta object.
    pub const OFS_DELTA: u8 = 6;
    /// A ref-delta object.
    pub const REF_DELTA: u8 = 7;
}

/// The id of the canonical empty blob (`git hash-object -t blob --stdin < /dev/null`).
pub const EMPTY_BLOB_ID_HEX: &str = "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391";
/// The id of the canonical empty tree.
pub const EMPTY_TREE_ID_HEX: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

/// Byte tokens for the header lines recognized by commit and tag parsing.
pub mod header {
    pub const TREE: &[u8] = b"tree";
    pub const PARENT: &[u8] = b"parent";
    pub const AUTHOR: &[u8] = b"author";
    pub const COMMITTER: &[u8] = b"committer";
    pub const ENCODING: &[u8] = b"encoding";
    pub const OBJECT: &[u8] = b"object";
    pub const TYPE: &[u8] = b"type";
    pub const TAG: &[u8] = b"tag";
    pub const TAGGER: &[u8] = b"tagger";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_blob_and_tree_ids_are_the_right_length() {
        assert_eq!(EMPTY_BLOB_ID_HEX.len(), OBJECT_ID_HEX_LEN);
        assert_eq!(EMPTY_TREE_ID_HEX.len(), OBJECT_ID_HEX_LEN);
        assert!(git_hash::ObjectId::from_hex(EMPTY_BLOB_ID_HEX).is_ok());
        assert!(git_hash::ObjectId::from_hex(EMPTY_TREE_ID_HEX).is_ok());
    }
}
