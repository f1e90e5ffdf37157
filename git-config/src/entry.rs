use std::path::PathBuf;

use bstr::BString;

/// A config value as stored on a [`super::ConfigEntry`]: present with content, present but
/// empty (`key =`), or entirely absent (a bare `key` with no `=`) — three states a plain
/// `Option<BString>` cannot tell apart, and git's own semantics do distinguish (§3).
#[derive(Debug, Eq, PartialEq, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// No `=` appeared at all; the key is implicitly `true` when read as a boolean.
    #[default]
    Missing,
    /// An `=` appeared but the value, after unescaping, is the empty string.
    Empty,
    /// An `=` appeared with content.
    Present(BString),
}

impl Value {
    /// This value's content, or `None` for [`Value::Missing`]/[`Value::Empty`].
    #[must_use]
    pub fn as_bstr(&self) -> Option<&bstr::BStr> {
        match self {
            Self::Present(v) => Some(v.as_ref()),
            Self::Missing | Self::Empty => None,
        }
    }
}

/// Where an entry's text came from: the snapshot's own bytes, or a file spliced in via
/// `include.path`/`includeIf.<cond>.path` (§4.3a).
#[derive(Debug, Eq, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConfigSource {
    /// This snapshot's own text.
    Local,
    /// Spliced in from the named include file.
    Include(PathBuf),
}

/// A condition on an `includeIf.<condition>.path` key that this core cannot evaluate itself,
/// since doing so requires filesystem or git-directory context it deliberately does not have
/// (§4.4a).
#[derive(Debug, Eq, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Unevaluated(pub String);

/// One physical line of a parsed config file (§3). A section-header line has `section` (and
/// maybe `subsection`) but no `key`; a key-value line inherits its section/subsection from the
/// nearest preceding section header.
#[derive(Debug, Eq, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfigEntry {
    /// Bytes preceding this entry's meaningful content on its line (indentation, blank lines).
    pub prefix: BString,
    /// The section this entry belongs to, lowercased for comparison but stored as seen.
    pub section: Option<BString>,
    /// The subsection, if any; case-sensitive and stored verbatim.
    pub subsection: Option<BString>,
    /// The key, for a key-value entry.
    pub key: Option<BString>,
    /// The value, for a key-value entry.
    pub value: Value,
    /// Trailing comment/whitespace bytes, preserved verbatim for byte-exact round-trip.
    pub suffix: BString,
    /// Set when this entry was spliced in via an include.
    pub included_from: Option<ConfigSource>,
    /// Set on an `includeIf.<condition>.path` entry whose condition this core could not
    /// evaluate itself.
    pub unresolved_condition: Option<Unevaluated>,
}

impl ConfigEntry {
    /// True if this is a section-header entry (no `key`).
    #[must_use]
    pub fn is_section_header(&self) -> bool {
        self.section.is_some() && self.key.is_none()
    }

    pub(crate) fn section_header(section: impl Into<BString>, subsection: Option<BString>) -> Self {
        Self {
            prefix: BString::default(),
            section: Some(section.into()),
            subsection,
            key: None,
            value: Value::Missing,
            suffix: BString::default(),
            included_from: None,
            unresolved_condition: None,
        }
    }

    pub(crate) fn key_value(section: BString, subsection: Option<BString>, key: impl Into<BString>, value: Value) -> Self {
        Self {
            prefix: BString::default(),
            section: Some(section),
            subsection,
            key: Some(key.into()),
            value,
            suffix: BString::default(),
            included_from: None,
            unresolved_condition: None,
        }
    }

    pub(crate) fn matches(&self, section: &str, subsection: Option<&str>, key: Option<&str>) -> bool {
        let Some(entry_section) = &self.section else { return false };
        if !entry_section.eq_ignore_ascii_case(section.as_bytes()) {
            return false;
        }
        let subsection_matches = match (subsection, &self.subsection) {
            (None, None) => true,
            (Some(wanted), Some(have)) => have.as_slice() == wanted.as_bytes(),
            _ => false,
        };
        if !subsection_matches {
            return false;
        }
        match key {
            None => true,
            Some(key) => self.key.as_deref().is_some_and(|k| k.eq_ignore_ascii_case(key.as_bytes())),
        }
    }

    /// Like [`ConfigEntry::matches`], but refuses anything spliced in via an include: those
    /// entries are read-only from this snapshot's point of view (§4.3 mutation invariant iv).
    pub(crate) fn matches_local(&self, section: &str, subsection: Option<&str>, key: Option<&str>) -> bool {
        self.included_from.is_none() && self.matches(section, subsection, key)
    }
}
