/// The error returned when an [`ObjectId`][crate::ObjectId] cannot be constructed from raw or
/// hexadecimal input.
#[derive(Debug, thiserror::Error, Eq, PartialEq, Clone, Copy)]
#[allow(missing_docs)]
pub enum Error {
    #[error("object ids must be 20 bytes long, got {length}")]
    InvalidByteLength { length: usize },
    #[error("object ids must be 40 hex characters long, got {length}")]
    InvalidHexLength { length: usize },
    #[error("invalid hex character {byte:#04x} at position {position}")]
    InvalidHexCharacter { byte: u8, position: usize },
}

/// The error returned when an [`AbbreviatedObjectId`][crate::AbbreviatedObjectId] is constructed
/// with an invalid length or invalid hex content.
#[derive(Debug, thiserror::Error, Eq, PartialEq, Clone, Copy)]
#[allow(missing_docs)]
pub enum AbbreviationError {
    #[error("abbreviation length must be between 4 and 40, got {length}")]
    InvalidLength { length: usize },
    #[error("invalid hex character {byte:#04x} at position {position}")]
    InvalidHexCharacter { byte: u8, position: usize },
}
