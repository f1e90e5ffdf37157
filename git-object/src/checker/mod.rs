//! Format-only validation of commit, tag, tree, and blob objects against git's canonical byte
//! encoding (§4.5). Checks here never touch object identity or reachability — only shape.

use std::collections::HashSet;

use bstr::ByteSlice;
use git_hash::ObjectId;

use crate::tree::EntryKind;

mod error_kind;
mod gitmodules;
mod options;
mod violation;
mod win32;

pub use error_kind::ErrorKind;
pub use options::Options;
pub use violation::Violation;


/// A `.gitmodules` blob located while checking a tree, handed back to the caller to validate
/// separately via [`check_gitmodules`] (§4.5, last bullet).
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub struct GitmoduleEntry {
    /// The tree that contained this entry.
    pub containing_tree_id: Option<ObjectId>,
    /// The id of the `.gitmodules` blob.
    pub blob_id: ObjectId,
}

/// The outcome of checking a tree: non-fatal violations plus any `.gitmodules` entries found.
#[derive(Debug, Default)]
pub struct TreeCheckOutcome {
    /// Violations that were in the ignore set and therefore did not halt the check.
    pub violations: Vec<Violation>,
    /// `.gitmodules` entries found, for the caller to check with [`check_gitmodules`].
    pub gitmodules: Vec<GitmoduleEntry>,
}

/// Validates canonical object byte buffers against git's format (§4.5).
///
/// A fresh checker enforces every rule fatally. Use [`ObjectChecker::ignore`] to downgrade
/// specific rules to "report and continue" and [`ObjectChecker::skip`] to exempt specific object
/// ids entirely (mirroring `git fsck --skip-list` / `.fsckignore`\-style exceptions).
#[derive(Debug, Default, Clone)]
pub struct ObjectChecker {
    ignore: HashSet<ErrorKind>,
    skip: HashSet<ObjectId>,
    options: Options,
}

impl ObjectChecker {
    /// A checker using Git's default severities: most rules are fatal, a handful
    /// ([`ErrorKind::is_fatal_by_default`] returning `false`) merely report and continue.
    #[must_use]
    pub fn new() -> Self {
        let mut checker = Self::default();
        for kind in [
            ErrorKind::NullSha1,
            ErrorKind::DuplicateEntries,
            ErrorKind::TreeNotSorted,
            ErrorKind::ZeroPaddedFileMode,
            ErrorKind::EmptyName,
            ErrorKind::FullPathname,
            ErrorKind::HasDot,
            ErrorKind::HasDotDot,
            ErrorKind::HasDotGit,
            ErrorKind::BadObjectSha1,
            ErrorKind::BadParentSha1,
            ErrorKind::BadTreeSha1,
            ErrorKind::MissingAuthor,
            ErrorKind::MissingCommitter,
            ErrorKind::MissingObject,
            ErrorKind::MissingTree,
            ErrorKind::MissingTypeEntry,
            ErrorKind::MissingTagEntry,
            ErrorKind::BadDate,
            ErrorKind::BadEmail,
            ErrorKind::BadTimezone,
            ErrorKind::MissingEmail,
            ErrorKind::MissingSpaceBeforeDate,
            ErrorKind::UnknownType,
            ErrorKind::Win32BadName,
            ErrorKind::BadUtf8,
            ErrorKind::GitmodulesBlob,
            ErrorKind::GitmodulesLarge,
            ErrorKind::GitmodulesName,
            ErrorKind::GitmodulesParse,
            ErrorKind::GitmodulesPath,
            ErrorKind::GitmodulesSymlink,
            ErrorKind::GitmodulesUrl,
        ] {
            if !kind.is_fatal_by_default() {
                checker.ignore.insert(kind);
            }
        }
        checker
    }

    /// Downgrade `kind` from fatal to "report and continue".
    pub fn ignore(&mut self, kind: ErrorKind) -> &mut Self {
        self.ignore.insert(kind);
        self
    }

    /// Exempt `id` from reporting entirely.
    pub fn skip(&mut self, id: ObjectId) -> &mut Self {
        self.skip.insert(id);
        self
    }

    /// Set the per-platform strictness flags (§4.5).
    pub fn with_options(&mut self, options: Options) -> &mut Self {
        self.options = options;
        self
    }

    fn report(&self, violations: &mut Vec<Violation>, oid: Option<ObjectId>, violation: Violation) -> Result<(), Violation> {
        if oid.is_some_and(|oid| self.skip.contains(&oid)) {
            return Ok(());
        }
        let violation = match oid {
            Some(oid) => violation.with_oid(oid),
            None => violation,
        };
        if self.ignore.contains(&violation.kind) {
            violations.push(violation);
            Ok(())
        } else {
            Err(violation)
        }
    }

    /// Blobs carry no structural constraints of their own; this always succeeds (§4.5).
    pub fn check_blob(&self, _data: &[u8]) -> Result<(), Violation> {
        Ok(())
    }

    /// Validate the *content* of a blob already identified as `.gitmodules` by
    /// [`ObjectChecker::check_tree`] (§4.5a). A second, independent pass: `check_tree` only
    /// notices the file's name, never its contents.
    #[must_use]
    pub fn check_gitmodules(&self, blob: &[u8]) -> Vec<Violation> {
        gitmodules::check(blob)
    }

    /// Validate a canonical commit buffer's required headers and their order.
    pub fn check_commit(&self, oid: Option<ObjectId>, data: &[u8]) -> Result<Vec<Violation>, Violation> {
        tracing::debug!(?oid, len = data.len(), "checking commit");
        let mut violations = Vec::new();

        let commit = crate::CommitRef::from_bytes(data).map_err(|err| self.commit_error_to_violation(oid, &err))?;
        if commit.tree == ObjectId::null() {
            self.report(&mut violations, oid, Violation::new(ErrorKind::BadTreeSha1, "tree id must not be the null id"))?;
        }
        for parent in &commit.parents {
            if *parent == ObjectId::null() {
                self.report(&mut violations, oid, Violation::new(ErrorKind::BadParentSha1, "parent id must not be the null id"))?;
            }
        }
        Ok(violations)
    }

    fn commit_error_to_violation(&self, oid: Option<ObjectId>, err: &crate::commit::Error) -> Violation {
        use crate::commit::Error as E;
        let kind = match err {
            E::MissingTree => ErrorKind::MissingTree,
            E::BadTreeId => ErrorKind::BadTreeSha1,
            E::BadParentId => ErrorKind::BadParentSha1,
            E::MissingAuthor => ErrorKind::MissingAuthor,
            E::MissingCommitter => ErrorKind::MissingCommitter,
            E::BadAuthor(actor_err) => return self.person_ident_violation(oid, actor_err),
            E::TruncatedHeader => ErrorKind::MissingTree,
        };
        let violation = Violation::new(kind, err.to_string());
        match oid {
            Some(oid) => violation.with_oid(oid),
            None => violation,
        }
    }

    fn person_ident_violation(&self, oid: Option<ObjectId>, err: &git_actor::Error) -> Violation {
        use git_actor::Error as E;
        let kind = match err {
            E::MissingEmail => ErrorKind::MissingEmail,
            E::BadEmail => ErrorKind::BadEmail,
            E::Time(time_err) => match time_err {
                git_actor::TimeError::MissingSpaceBeforeDate => ErrorKind::MissingSpaceBeforeDate,
                git_actor::TimeError::BadDate => ErrorKind::BadDate,
                git_actor::TimeError::BadTimezone => ErrorKind::BadTimezone,
            },
        };
        let violation = Violation::new(kind, err.to_string());
        match oid {
            Some(oid) => violation.with_oid(oid),
            None => violation,
        }
    }

    /// Validate a canonical tag buffer's required headers and name.
    pub fn check_tag(&self, oid: Option<ObjectId>, data: &[u8]) -> Result<Vec<Violation>, Violation> {
        tracing::debug!(?oid, len = data.len(), "checking tag");
        let mut violations = Vec::new();

        let tag = crate::TagRef::from_bytes(data).map_err(|err| self.tag_error_to_violation(oid, &err))?;
        if tag.name.is_empty() {
            self.report(&mut violations, oid, Violation::new(ErrorKind::MissingTagEntry, "tag name must not be empty"))?;
        }
        Ok(violations)
    }

    fn tag_error_to_violation(&self, oid: Option<ObjectId>, err: &crate::tag::Error) -> Violation {
        use crate::tag::Error as E;
        let kind = match err {
            E::MissingObject => ErrorKind::MissingObject,
            E::BadObjectId => ErrorKind::BadObjectSha1,
            E::MissingTypeEntry | E::BadTargetKind(_) => ErrorKind::MissingTypeEntry,
            E::MissingTagEntry => ErrorKind::MissingTagEntry,
            E::BadTagger(actor_err) => return self.person_ident_violation(oid, actor_err),
            E::StartsWithDash | E::InvalidName(_) => ErrorKind::MissingTagEntry,
            E::TruncatedHeader => ErrorKind::MissingObject,
        };
        let violation = Violation::new(kind, err.to_string());
        match oid {
            Some(oid) => violation.with_oid(oid),
            None => violation,
        }
    }

    /// Validate a canonical tree buffer: sort order, name legality, mode legality, and the
    /// absence of the null id, collecting `.gitmodules` entries along the way.
    pub fn check_tree(&self, oid: Option<ObjectId>, data: &[u8]) -> Result<TreeCheckOutcome, Violation> {
        tracing::debug!(?oid, len = data.len(), "checking tree");
        let mut outcome = TreeCheckOutcome::default();

        let tree = crate::TreeRef::from_bytes(data).map_err(|err| {
            let kind = match err {
                crate::tree::Error::InvalidMode | crate::tree::Error::UnknownType => ErrorKind::UnknownType,
                crate::tree::Error::MissingModeDelimiter
                | crate::tree::Error::MissingNameTerminator
                | crate::tree::Error::TruncatedObjectId => ErrorKind::EmptyName,
            };
            Violation::new(kind, err.to_string())
        })?;

        let mut previous: Option<&crate::tree::EntryRef<'_>> = None;
        let mut seen_names: HashSet<Vec<u8>> = HashSet::new();

        for entry in &tree.entries {
            if entry.filename.is_empty() {
                self.report(&mut outcome.violations, oid, Violation::new(ErrorKind::EmptyName, "a tree entry's name must not be empty"))?;
            }
            if entry.filename.contains(&b'/') {
                self.report(&mut outcome.violations, oid, Violation::new(ErrorKind::FullPathname, "a tree entry's name must not contain '/'"))?;
            }
            if entry.oid == ObjectId::null() {
                self.report(&mut outcome.violations, oid, Violation::new(ErrorKind::NullSha1, "a tree entry's id must not be the null id"))?;
            }
            self.check_name(oid, entry.filename, &mut outcome.violations)?;

            let key = entry.filename.to_vec();
            if !seen_names.insert(key) {
                self.report(&mut outcome.violations, oid, Violation::new(ErrorKind::DuplicateEntries, format!("duplicate tree entry name {:?}", entry.filename)))?;
            }

            if let Some(previous) = previous {
                if previous.cmp(entry) != std::cmp::Ordering::Less {
                    self.report(&mut outcome.violations, oid, Violation::new(ErrorKind::TreeNotSorted, "tree entries are not in git's sort order"))?;
                }
            }
            previous = Some(entry);

            if entry.mode.is_zero_padded() {
                self.report(&mut outcome.violations, oid, Violation::new(ErrorKind::ZeroPaddedFileMode, format!("tree entry {:?} has a zero-padded file mode {:?}", entry.filename, entry.mode.as_bstr())))?;
            }

            if entry.filename.eq_ignore_ascii_case(b".gitmodules") {
                match entry.mode.kind() {
                    EntryKind::Blob | EntryKind::BlobExecutable => {
                        outcome.gitmodules.push(GitmoduleEntry { containing_tree_id: oid, blob_id: entry.oid });
                    }
                    EntryKind::Link => {
                        self.report(&mut outcome.violations, oid, Violation::new(ErrorKind::GitmodulesSymlink, "'.gitmodules' must not be a symlink"))?;
                    }
                    EntryKind::Tree | EntryKind::Commit => {
                        self.report(&mut outcome.violations, oid, Violation::new(ErrorKind::GitmodulesBlob, "'.gitmodules' must be a regular file"))?;
                    }
                }
            }
        }

        Ok(outcome)
    }

    fn check_name(&self, oid: Option<ObjectId>, name: &bstr::BStr, violations: &mut Vec<Violation>) -> Result<(), Violation> {
        if name == "." {
            self.report(violations, oid, Violation::new(ErrorKind::HasDot, "a tree entry must not be named '.'"))?;
        }
        if name == ".." {
            self.report(violations, oid, Violation::new(ErrorKind::HasDotDot, "a tree entry must not be named '..'"))?;
        }
        if win32::is_dot_git_disguise(name, self.options) {
            self.report(violations, oid, Violation::new(ErrorKind::HasDotGit, format!("tree entry name {name:?} disguises '.git'")))?;
        }
        if self.options.contains(Options::WINDOWS_SAFE) && win32::is_windows_unsafe(name) {
            self.report(violations, oid, Violation::new(ErrorKind::Win32BadName, format!("tree entry name {name:?} is not valid on Windows")))?;
        }
        if name.to_str().is_err() {
            self.report(violations, oid, Violation::new(ErrorKind::BadUtf8, format!("tree entry name {name:?} is not valid UTF-8")))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_bytes(mode: &[u8], name: &[u8], oid: ObjectId) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(mode);
        buf.push(b' ');
        buf.extend_from_slice(name);
        buf.push(0);
        buf.extend_from_slice(&oid.to_raw());
        buf
    }

    #[test]
    fn accepts_well_formed_tree() {
        let checker = ObjectChecker::new();
        let id = ObjectId::from_hex("ca978112ca1bbdcafac231b39a23dc4da786eff8").unwrap();
        let mut data = entry_bytes(b"100644", b"a", id);
        data.extend(entry_bytes(b"40000", b"a", id));
        data.extend(entry_bytes(b"100644", b"b", id));
        let outcome = checker.check_tree(None, &data).unwrap();
        assert!(outcome.violations.is_empty());
    }

    #[test]
    fn rejects_unsorted_tree_as_fatal_by_default() {
        let checker = ObjectChecker::new();
        let id = ObjectId::from_hex("ca978112ca1bbdcafac231b39a23dc4da786eff8").unwrap();
        let mut data = entry_bytes(b"100644", b"b", id);
        data.extend(entry_bytes(b"100644", b"a", id));
        let err = checker.check_tree(None, &data).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TreeNotSorted);
    }

    #[test]
    fn ignored_rule_is_collected_instead_of_fatal() {
        let mut checker = ObjectChecker::new();
        checker.ignore(ErrorKind::TreeNotSorted);
        let id = ObjectId::from_hex("ca978112ca1bbdcafac231b39a23dc4da786eff8").unwrap();
        let mut data = entry_bytes(b"100644", b"b", id);
        data.extend(entry_bytes(b"100644", b"a", id));
        let outcome = checker.check_tree(None, &data).unwrap();
        assert_eq!(outcome.violations.len(), 1);
        assert_eq!(outcome.violations[0].kind, ErrorKind::TreeNotSorted);
    }

    #[test]
    fn rejects_null_id_entry() {
        let checker = ObjectChecker::new();
        let data = entry_bytes(b"100644", b"a", ObjectId::null());
        let err = checker.check_tree(None, &data).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NullSha1);
    }

    #[test]
    fn rejects_duplicate_names() {
        let checker = ObjectChecker::new();
        let id = ObjectId::from_hex("ca978112ca1bbdcafac231b39a23dc4da786eff8").unwrap();
        let mut data = entry_bytes(b"100644", b"a", id);
        data.extend(entry_bytes(b"100644", b"a", id));
        let err = checker.check_tree(None, &data).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::DuplicateEntries | ErrorKind::TreeNotSorted));
    }

    #[test]
    fn finds_gitmodules_entry() {
        let checker = ObjectChecker::new();
        let id = ObjectId::from_hex("ca978112ca1bbdcafac231b39a23dc4da786eff8").unwrap();
        let containing = ObjectId::from_hex("cb978112ca1bbdcafac231b39a23dc4da786eff8").unwrap();
        let data = entry_bytes(b"100644", b".gitmodules", id);
        let outcome = checker.check_tree(Some(containing), &data).unwrap();
        assert_eq!(outcome.gitmodules.len(), 1);
        assert_eq!(outcome.gitmodules[0].blob_id, id);
    }

    #[test]
    fn reports_zero_padded_file_mode() {
        let checker = ObjectChecker::new();
        let id = ObjectId::from_hex("ca978112ca1bbdcafac231b39a23dc4da786eff8").unwrap();
        let data = entry_bytes(b"040000", b"a", id);
        let outcome = checker.check_tree(None, &data).unwrap();
        assert!(outcome.violations.iter().any(|v| v.kind == ErrorKind::ZeroPaddedFileMode));
    }

    #[test]
    fn dotgitmodules_as_symlink_is_fatal_by_default() {
        let checker = ObjectChecker::new();
        let id = ObjectId::from_hex("ca978112ca1bbdcafac231b39a23dc4da786eff8").unwrap();
        let data = entry_bytes(b"120000", b".gitmodules", id);
        let err = checker.check_tree(None, &data).unwrap_err();
        assert_eq!(err.kind, ErrorKind::GitmodulesSymlink);
    }

    #[test]
    fn dotgitmodules_as_tree_is_reported_not_collected_as_a_blob() {
        let checker = ObjectChecker::new();
        let id = ObjectId::from_hex("ca978112ca1bbdcafac231b39a23dc4da786eff8").unwrap();
        let data = entry_bytes(b"40000", b".gitmodules", id);
        let outcome = checker.check_tree(None, &data).unwrap();
        assert!(outcome.gitmodules.is_empty());
        assert!(outcome.violations.iter().any(|v| v.kind == ErrorKind::GitmodulesBlob));
    }

    #[test]
    fn blob_always_accepted() {
        assert!(ObjectChecker::new().check_blob(b"anything at all\0\xff").is_ok());
    }

    #[test]
    fn commit_requires_tree_header() {
        let err = ObjectChecker::new().check_commit(None, b"author a <a@b> 1 +0000\n").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingTree);
    }
}
