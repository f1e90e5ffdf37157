/// The full taxonomy of object-format violations this core can detect (§7 "Object validation").
///
/// Each variant names one distinct rule; the checker reports violations as [`super::Violation`]
/// values carrying one of these rather than a free-form message, so callers can filter or ignore
/// specific rule classes (the checker's "ignore set", §4.5) without string matching.
#[derive(Debug, Eq, PartialEq, Hash, Clone, Copy)]
#[allow(missing_docs)]
pub enum ErrorKind {
    NullSha1,
    DuplicateEntries,
    TreeNotSorted,
    ZeroPaddedFileMode,
    EmptyName,
    FullPathname,
    HasDot,
    HasDotDot,
    HasDotGit,
    BadObjectSha1,
    BadParentSha1,
    BadTreeSha1,
    MissingAuthor,
    MissingCommitter,
    MissingObject,
    MissingTree,
    MissingTypeEntry,
    MissingTagEntry,
    BadDate,
    BadEmail,
    BadTimezone,
    MissingEmail,
    MissingSpaceBeforeDate,
    UnknownType,
    Win32BadName,
    BadUtf8,
    GitmodulesBlob,
    GitmodulesLarge,
    GitmodulesName,
    GitmodulesParse,
    GitmodulesPath,
    GitmodulesSymlink,
    GitmodulesUrl,
}

impl ErrorKind {
    /// Whether Git itself treats this rule as fatal by default (vs. a warning some tools
    /// downgrade). Mirrors upstream Git's `fsck.<msg-id>` default severities; the checker's
    /// caller can still override via the ignore set (§4.5).
    #[must_use]
    pub fn is_fatal_by_default(self) -> bool {
        !matches!(
            self,
            Self::ZeroPaddedFileMode | Self::GitmodulesLarge | Self::GitmodulesUrl | Self::BadUtf8
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}
