use git_hash::ObjectId;

use super::ErrorKind;

/// A single detected format violation, carrying enough context for a caller to decide what to do
/// with it without re-deriving it from a string (§7a).
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct Violation {
    /// Which rule was violated.
    pub kind: ErrorKind,
    /// The id of the offending object, if known at the point the violation was detected (a
    /// commit/tag's own id is usually known; a tree entry's is not until the tree itself hashes).
    pub oid: Option<ObjectId>,
    /// A human-readable description, safe to show directly to a user.
    pub message: String,
}

impl Violation {
    pub(crate) fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, oid: None, message: message.into() }
    }

    pub(crate) fn with_oid(mut self, oid: ObjectId) -> Self {
        self.oid = Some(oid);
        self
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.oid {
            Some(oid) => write!(f, "{oid}: {}: {}", self.kind, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for Violation {}
