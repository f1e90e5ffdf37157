//! Validation of the ASCII-safe name tokens that appear inside git objects: tag names and,
//! more generally, the reference-name grammar tag names are a subset of (`git check-ref-format`).
//!
//! This crate does not know about object bytes or headers — that's [`git-object`]'s job, which
//! calls into here for the single "is this a legal name token" question.

use bstr::{BStr, ByteSlice};

/// Validates reference names per `git check-ref-format`, a slightly richer grammar than tag
/// names (it permits `/`-separated components such as `refs/heads/main`).
pub mod reference {
    use super::{component_is_valid, Error};
    use bstr::{BStr, ByteSlice};

    /// Validate `name` as a full reference name (e.g. `refs/heads/main`), returning it back on
    /// success for ergonomic chaining.
    pub fn name(name: &BStr) -> Result<&BStr, Error> {
        if name.is_empty() {
            return Err(Error::Empty);
        }
        if name.first() == Some(&b'/') || name.last() == Some(&b'/') {
            return Err(Error::StartsOrEndsWithSlash);
        }
        for component in name.split(|b| *b == b'/') {
            component_is_valid(component.as_bstr())?;
        }
        Ok(name)
    }
}

/// Validates tag names, a subset of [`reference`] names that additionally forbids `/`.
pub mod tag {
    use super::{component_is_valid, Error};
    use bstr::{BStr, ByteSlice};

    /// Validate `name` as a tag name (e.g. `v1.2.3`). Tag names are reference-name components:
    /// they must not contain `/`.
    pub fn name(name: &BStr) -> Result<&BStr, Error> {
        if name.is_empty() {
            return Err(Error::Empty);
        }
        if name.contains(&b'/') {
            return Err(Error::ContainsSlash);
        }
        component_is_valid(name)?;
        Ok(name)
    }
}

/// The error returned when a name fails [`reference::name`] or [`tag::name`] validation.
#[derive(Debug, thiserror::Error, Eq, PartialEq, Clone)]
#[allow(missing_docs)]
pub enum Error {
    #[error("names must not be empty")]
    Empty,
    #[error("reference names must not start or end with '/'")]
    StartsOrEndsWithSlash,
    #[error("tag names must not contain '/'")]
    ContainsSlash,
    #[error("names must not contain a '.' followed directly by another '.'")]
    DoubleDot,
    #[error("names must not start with '.'")]
    StartsWithDot,
    #[error("names must not end with '.lock'")]
    EndsWithDotLock,
    #[error("names must not end with '.'")]
    EndsWithDot,
    #[error("names must not contain ASCII control characters, space, or one of '~^:?*[\\\\'")]
    InvalidByte { byte: u8 },
    #[error("names must not contain the sequence '@{{'")]
    AtOpenBrace,
    #[error("names must not be exactly '@'")]
    SoleAt,
}

fn component_is_valid(component: &BStr) -> Result<(), Error> {
    if component.is_empty() {
        return Err(Error::Empty);
    }
    if component == "@" {
        return Err(Error::SoleAt);
    }
    if component.first() == Some(&b'.') {
        return Err(Error::StartsWithDot);
    }
    if component.ends_with(b".lock") {
        return Err(Error::EndsWithDotLock);
    }
    if component.last() == Some(&b'.') {
        return Err(Error::EndsWithDot);
    }
    if component.windows(2).any(|pair| pair == b"..") {
        return Err(Error::DoubleDot);
    }
    if component.windows(2).any(|pair| pair == b"@{") {
        return Err(Error::AtOpenBrace);
    }
    for &byte in component.iter() {
        if byte.is_ascii_control() || byte == b' ' || matches!(byte, b'~' | b'^' | b':' | b'?' | b'*' | b'[' | b'\\') {
            return Err(Error::InvalidByte { byte });
        }
    }
    Ok(())
}
