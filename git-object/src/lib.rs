//! Canonical git objects: the commit, tree, tag, and blob byte formats, their encoders and
//! decoders, and a [`checker::ObjectChecker`] validating that format independent of object
//! identity or reachability.

use std::io;

pub mod checker;
pub mod commit;
pub mod constants;
mod encode;
mod kind;
pub mod tag;
pub mod tree;

pub use commit::{Commit, CommitRef};
pub use kind::{Error as KindError, Kind};
pub use tag::{Tag, TagRef};
pub use tree::{Entry, EntryRef, Tree, TreeRef};

pub use bstr;
pub use git_hash as hash;

/// Common behavior for every owned object type: write its canonical encoding, know its encoded
/// size up front, and report its own [`Kind`].
pub trait WriteTo {
    /// Write this object's canonical byte encoding to `out`.
    fn write_to(&self, out: impl io::Write) -> io::Result<()>;

    /// The exact number of bytes [`WriteTo::write_to`] will write.
    fn size(&self) -> usize;

    /// This object's kind.
    fn kind(&self) -> Kind;
}
