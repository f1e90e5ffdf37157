/// The error returned by [`super::TreeRef::from_bytes`] and mode parsing.
#[derive(Debug, thiserror::Error, Eq, PartialEq, Clone, Copy)]
#[allow(missing_docs)]
pub enum Error {
    #[error("a tree record's mode must be 1-6 octal digits")]
    InvalidMode,
    #[error("a tree record's mode does not correspond to a known entry kind")]
    UnknownType,
    #[error("expected a space after a tree record's mode")]
    MissingModeDelimiter,
    #[error("expected a NUL byte after a tree record's name")]
    MissingNameTerminator,
    #[error("a tree record's object id was truncated")]
    TruncatedObjectId,
}
