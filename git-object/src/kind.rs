use bstr::BString;

/// The four object kinds git's object model distinguishes.
#[derive(PartialEq, Eq, Debug, Hash, Ord, PartialOrd, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
pub enum Kind {
    Tree,
    Blob,
    Commit,
    Tag,
}

/// The error returned by [`Kind::from_bytes`].
#[derive(Debug, thiserror::Error, Eq, PartialEq, Clone)]
pub enum Error {
    /// `kind` was not one of `tree`, `blob`, `commit`, `tag`.
    #[error("unknown object kind: {0:?}")]
    InvalidObjectKind(BString),
}

impl Kind {
    /// Parse a `Kind` from the type token used in loose object headers and tag `type` lines.
    pub fn from_bytes(s: &[u8]) -> Result<Self, Error> {
        Ok(match s {
            b"tree" => Self::Tree,
            b"blob" => Self::Blob,
            b"commit" => Self::Commit,
            b"tag" => Self::Tag,
            _ => return Err(Error::InvalidObjectKind(s.into())),
        })
    }

    /// The type token this kind is written as in loose object headers and tag `type` lines.
    #[must_use]
    pub fn to_bytes(&self) -> &'static [u8] {
        match self {
            Self::Tree => b"tree",
            Self::Blob => b"blob",
            Self::Commit => b"commit",
            Self::Tag => b"tag",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(std::str::from_utf8(self.to_bytes()).expect("type tokens are ASCII"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_all_kinds() {
        for (bytes, kind) in [
            (b"tree".as_slice(), Kind::Tree),
            (b"blob", Kind::Blob),
            (b"commit", Kind::Commit),
            (b"tag", Kind::Tag),
        ] {
            assert_eq!(Kind::from_bytes(bytes).unwrap(), kind);
            assert_eq!(kind.to_bytes(), bytes);
        }
    }

    #[test]
    fn rejects_unknown_kind() {
        assert!(Kind::from_bytes(b"blorb").is_err());
    }
}
