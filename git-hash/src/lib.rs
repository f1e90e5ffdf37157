//! 160-bit git object identifiers: construction, comparison, hex/raw encoding, and efficient
//! prefix ("abbreviated") comparison, independent of any particular hash algorithm's internals.
//!
//! This crate deliberately knows nothing about how an [`ObjectId`] was produced (SHA-1, a
//! streaming hasher, a pack index lookup) — it only models the value and its well-defined total
//! order, matching the narrow, leaf-level role `gix-hash` plays in the wider corpus.

mod abbrev;
mod error;
mod oid;

pub use abbrev::AbbreviatedObjectId;
pub use error::{AbbreviationError, Error};
pub use oid::{ObjectId, ZERO_ID};

/// Object ids are always 20 raw bytes / 40 hex characters; the SHA-1 digest length used
/// throughout this implementation (§4.8).
pub const RAW_LEN: usize = 20;

/// Number of hex characters in a full object id name.
pub const HEX_LEN: usize = 40;
