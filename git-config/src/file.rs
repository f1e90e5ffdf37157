use std::collections::HashMap;
use std::sync::Mutex;

use bstr::{BStr, BString, ByteSlice};
use once_cell::sync::OnceCell;

use crate::{
    entry::{ConfigEntry, ConfigSource, Value},
    parser, value, Error,
};

type CacheKey = (String, Option<BString>, String);

/// A borrowed view of one `[name "subsection"]` header, yielded by [`File::sections`].
#[derive(Debug, Clone, Copy)]
pub struct SectionRef<'a> {
    pub name: &'a BStr,
    pub subsection: Option<&'a BStr>,
}

/// An immutable, copy-on-write snapshot of a parsed git config (§4.3). Mutating methods return
/// the snapshot unchanged and instead hand back a new `File` with the edit applied — callers who
/// want "mutate in place" reassign (`file = file.set_string(...)`), matching how the rest of this
/// core treats config state as a value, not a mutable object with hidden sharing.
pub struct File {
    entries: Vec<ConfigEntry>,
    lookup_cache: OnceCell<Mutex<HashMap<CacheKey, Option<BString>>>>,
}

impl std::fmt::Debug for File {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("File").field("entries", &self.entries).finish()
    }
}

impl Clone for File {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            lookup_cache: OnceCell::new(),
        }
    }
}

const MAX_INCLUDE_DEPTH: usize = 10;

impl File {
    /// Parse `data` as git config text (§4.4). Does not resolve `include`/`includeIf`; call
    /// [`File::resolve_includes`] for that once the caller has a filesystem to consult.
    #[tracing::instrument(level = "trace", skip(data), fields(len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, Error> {
        let entries = parser::parse(data)?;
        Ok(Self { entries, lookup_cache: OnceCell::new() })
    }

    fn cache(&self) -> &Mutex<HashMap<CacheKey, Option<BString>>> {
        self.lookup_cache.get_or_init(|| Mutex::new(HashMap::new()))
    }

    fn raw_value(&self, section: &str, subsection: Option<&str>, key: &str) -> Option<BString> {
        let cache_key: CacheKey = (section.to_ascii_lowercase(), subsection.map(Into::into), key.to_ascii_lowercase());
        if let Some(hit) = self.cache().lock().unwrap().get(&cache_key) {
            return hit.clone();
        }
        let found = self
            .entries
            .iter()
            .rev()
            .find(|e| e.matches(section, subsection, Some(key)))
            .and_then(|e| match &e.value {
                Value::Present(v) => Some(v.clone()),
                Value::Missing => Some(BString::from("true")),
                Value::Empty => Some(BString::default()),
            });
        self.cache().lock().unwrap().insert(cache_key, found.clone());
        found
    }

    /// The raw string value of `section[.subsection].key`, last-entry-wins (§4.3).
    #[must_use]
    pub fn get_string(&self, section: &str, subsection: Option<&str>, key: &str) -> Option<BString> {
        self.raw_value(section, subsection, key)
    }

    /// A borrowed view of `section[.subsection].key`'s last value, without going through the
    /// memoizing cache or allocating a copy. Used by callers, like `.gitmodules` content
    /// validation, that only need to inspect the bytes once.
    #[must_use]
    pub fn value(&self, section: &str, subsection: Option<&str>, key: &str) -> Option<&BStr> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.matches(section, subsection, Some(key)))
            .and_then(|e| e.value.as_bstr())
    }

    /// Every distinct `(name, subsection)` header this file defines, in first-seen order.
    pub fn sections(&self) -> impl Iterator<Item = SectionRef<'_>> {
        let mut seen: Vec<(&BStr, Option<&BStr>)> = Vec::new();
        for entry in &self.entries {
            if let Some(section) = &entry.section {
                let pair = (section.as_bstr(), entry.subsection.as_deref().map(ByteSlice::as_bstr));
                if !seen.contains(&pair) {
                    seen.push(pair);
                }
            }
        }
        seen.into_iter().map(|(name, subsection)| SectionRef { name, subsection })
    }

    /// Every value of `section[.subsection].key` in file order, for multi-valued keys like
    /// `remote.<name>.fetch`.
    #[must_use]
    pub fn get_string_list(&self, section: &str, subsection: Option<&str>, key: &str) -> Vec<BString> {
        self.entries
            .iter()
            .filter(|e| e.matches(section, subsection, Some(key)))
            .filter_map(|e| match &e.value {
                Value::Present(v) => Some(v.clone()),
                Value::Missing => Some(BString::from("true")),
                Value::Empty => Some(BString::default()),
            })
            .collect()
    }

    pub fn get_boolean(&self, section: &str, subsection: Option<&str>, key: &str) -> Result<Option<bool>, Error> {
        self.raw_value(section, subsection, key).as_deref().map(value::parse_bool).transpose()
    }

    pub fn get_int(&self, section: &str, subsection: Option<&str>, key: &str) -> Result<Option<i64>, Error> {
        self.raw_value(section, subsection, key).as_deref().map(value::parse_int).transpose()
    }

    pub fn get_int_in_range(
        &self,
        section: &str,
        subsection: Option<&str>,
        key: &str,
        min: i64,
        max: i64,
    ) -> Result<Option<i64>, Error> {
        self.raw_value(section, subsection, key)
            .as_deref()
            .map(|v| value::parse_int_in_range(v, min, max))
            .transpose()
    }

    pub fn get_enum<'a>(
        &self,
        section: &str,
        subsection: Option<&str>,
        key: &str,
        variants: &[&'a str],
    ) -> Option<&'a str> {
        let raw = self.raw_value(section, subsection, key)?;
        value::match_enum(raw.as_bstr(), variants)
    }

    pub fn get_time_unit(
        &self,
        section: &str,
        subsection: Option<&str>,
        key: &str,
        want_unit: value::TimeUnit,
    ) -> Result<Option<u64>, Error> {
        self.raw_value(section, subsection, key)
            .as_deref()
            .map(|v| value::parse_time_unit(v, want_unit))
            .transpose()
    }

    #[must_use]
    pub fn get_ref_specs(&self, section: &str, subsection: Option<&str>, key: &str) -> Vec<value::RefSpec> {
        self.get_string_list(section, subsection, key)
            .iter()
            .map(|raw| value::parse_ref_spec(raw.as_bstr()))
            .collect()
    }

    /// The `(section, subsection)` pairs present, in first-seen order.
    #[must_use]
    pub fn get_sections(&self) -> Vec<(BString, Option<BString>)> {
        let mut seen = Vec::new();
        for entry in &self.entries {
            if let Some(section) = &entry.section {
                let pair = (section.clone(), entry.subsection.clone());
                if !seen.contains(&pair) {
                    seen.push(pair);
                }
            }
        }
        seen
    }

    #[must_use]
    pub fn get_subsections(&self, section: &str) -> Vec<BString> {
        self.get_sections()
            .into_iter()
            .filter(|(s, _)| s.eq_ignore_ascii_case(section.as_bytes()))
            .filter_map(|(_, sub)| sub)
            .collect()
    }

    #[must_use]
    pub fn get_names(&self, section: &str, subsection: Option<&str>) -> Vec<BString> {
        let mut names = Vec::new();
        for entry in &self.entries {
            if entry.matches(section, subsection, None) {
                if let Some(key) = &entry.key {
                    if !names.contains(key) {
                        names.push(key.clone());
                    }
                }
            }
        }
        names
    }

    /// All entries, in file order, including comment/blank "entries" used to preserve layout.
    #[must_use]
    pub fn entries(&self) -> &[ConfigEntry] {
        &self.entries
    }

    fn with_entries(entries: Vec<ConfigEntry>) -> Self {
        Self { entries, lookup_cache: OnceCell::new() }
    }

    /// Set (or append) `section[.subsection].key = value`, replacing the last matching entry if
    /// one exists so that last-wins readers see the new value, or appending a new section header
    /// and key-value pair otherwise.
    #[must_use]
    pub fn set_string(&self, section: &str, subsection: Option<&str>, key: &str, new_value: impl Into<BString>) -> Self {
        let mut entries = self.entries.clone();
        let new_value = new_value.into();
        if let Some(existing) = entries.iter_mut().rev().find(|e| e.matches_local(section, subsection, Some(key))) {
            existing.value = Value::Present(new_value);
        } else {
            ensure_section_header(&mut entries, section, subsection);
            entries.push(ConfigEntry::key_value(
                section.into(),
                subsection.map(Into::into),
                key.to_ascii_lowercase(),
                Value::Present(new_value),
            ));
        }
        Self::with_entries(entries)
    }

    #[must_use]
    pub fn set_boolean(&self, section: &str, subsection: Option<&str>, key: &str, new_value: bool) -> Self {
        self.set_string(section, subsection, key, if new_value { "true" } else { "false" })
    }

    #[must_use]
    pub fn set_int(&self, section: &str, subsection: Option<&str>, key: &str, new_value: i64) -> Self {
        self.set_string(section, subsection, key, new_value.to_string())
    }

    #[must_use]
    pub fn set_enum(&self, section: &str, subsection: Option<&str>, key: &str, new_value: &str) -> Self {
        self.set_string(section, subsection, key, new_value)
    }

    /// Append another value for a multi-valued key (e.g. a second `remote.origin.fetch`) rather
    /// than replacing the existing one.
    #[must_use]
    pub fn set_string_list(&self, section: &str, subsection: Option<&str>, key: &str, values: &[impl AsRef<[u8]>]) -> Self {
        let mut entries = self.entries.clone();
        ensure_section_header(&mut entries, section, subsection);
        entries.retain(|e| !e.matches_local(section, subsection, Some(key)));
        let insert_at = entries
            .iter()
            .rposition(|e| e.section.as_deref().is_some_and(|s| s.eq_ignore_ascii_case(section.as_bytes())))
            .map_or(entries.len(), |i| i + 1);
        let mut tail = Vec::new();
        for v in values {
            tail.push(ConfigEntry::key_value(
                section.into(),
                subsection.map(Into::into),
                key.to_ascii_lowercase(),
                Value::Present(BString::from(v.as_ref().to_vec())),
            ));
        }
        entries.splice(insert_at..insert_at, tail);
        Self::with_entries(entries)
    }

    /// Remove the last matching `section[.subsection].key` entry, if any.
    #[must_use]
    pub fn unset(&self, section: &str, subsection: Option<&str>, key: &str) -> Self {
        let mut entries = self.entries.clone();
        if let Some(pos) = entries.iter().rposition(|e| e.matches_local(section, subsection, Some(key))) {
            entries.remove(pos);
        }
        Self::with_entries(entries)
    }

    /// Remove every entry belonging to `section[.subsection]`, header included. Entries spliced
    /// in from an include are left in place; they belong to the included file, not this one.
    #[must_use]
    pub fn unset_section(&self, section: &str, subsection: Option<&str>) -> Self {
        let mut entries = self.entries.clone();
        entries.retain(|e| !e.matches_local(section, subsection, None));
        Self::with_entries(entries)
    }

    /// Serialize back to text, byte-exact for any entry that was never touched (§4.4).
    #[must_use]
    pub fn to_bytes(&self) -> BString {
        crate::format::format(&self.entries)
    }

    /// Layer `overlay` on top of `self`: `overlay`'s entries are appended after `self`'s, so
    /// last-wins lookups see `overlay` values first when both define the same key (§4.3).
    #[must_use]
    pub fn layered(&self, overlay: &File) -> Self {
        let mut entries = self.entries.clone();
        entries.extend(overlay.entries.iter().cloned());
        Self::with_entries(entries)
    }

    /// Splice resolved `include.path`/`includeIf.<cond>.path` targets into the snapshot.
    /// `resolve` is handed each path-like value, keyed by whether it came from a plain
    /// `include.path` (condition `None`) or an `includeIf.<condition>.path`; it returns `None` to
    /// leave that include unresolved (the caller couldn't find or didn't want to follow it) or
    /// `Some(bytes)` to splice the parsed target in immediately after the include key. Recursion
    /// deeper than 10 levels is rejected the way upstream git rejects include cycles.
    pub fn resolve_includes(
        &self,
        mut resolve: impl FnMut(&BStr, Option<&str>) -> Option<(std::path::PathBuf, Vec<u8>)>,
    ) -> Result<Self, Error> {
        self.resolve_includes_at_depth(&mut resolve, 0)
    }

    fn resolve_includes_at_depth(
        &self,
        resolve: &mut impl FnMut(&BStr, Option<&str>) -> Option<(std::path::PathBuf, Vec<u8>)>,
        depth: usize,
    ) -> Result<Self, Error> {
        if depth > MAX_INCLUDE_DEPTH {
            return Err(Error::TooManyIncludeRecursions { limit: MAX_INCLUDE_DEPTH });
        }
        let mut entries = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            entries.push(entry.clone());
            let is_plain_include = entry.key.as_deref().is_some_and(|k| k.eq_ignore_ascii_case(b"path"))
                && entry.section.as_deref().is_some_and(|s| s.eq_ignore_ascii_case(b"include"));
            let condition = entry.unresolved_condition.as_ref().map(|c| c.0.as_str());
            if !is_plain_include && condition.is_none() {
                continue;
            }
            let Some(path_value) = entry.value.as_bstr() else { continue };
            if let Some((source, bytes)) = resolve(path_value, condition) {
                let child = File::from_bytes(&bytes)?.resolve_includes_at_depth(resolve, depth + 1)?;
                for mut spliced in child.entries {
                    spliced.included_from = Some(ConfigSource::Include(source.clone()));
                    entries.push(spliced);
                }
            }
        }
        Ok(Self::with_entries(entries))
    }
}

fn ensure_section_header(entries: &mut Vec<ConfigEntry>, section: &str, subsection: Option<&str>) {
    let exists = entries.iter().any(|e| e.is_section_header() && e.matches(section, subsection, None));
    if !exists {
        entries.push(ConfigEntry::section_header(section, subsection.map(BString::from)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_last_value_for_duplicate_keys() {
        let file = File::from_bytes(b"[core]\n\tbare = false\n\tbare = true\n").unwrap();
        assert_eq!(file.get_boolean("core", None, "bare").unwrap(), Some(true));
    }

    #[test]
    fn set_string_appends_new_section_when_missing() {
        let file = File::from_bytes(b"").unwrap().set_string("core", None, "bare", "true");
        assert_eq!(file.get_string("core", None, "bare").as_deref(), Some(b"true".as_bstr()));
    }

    #[test]
    fn set_string_replaces_existing_value_in_place() {
        let file = File::from_bytes(b"[core]\n\tbare = false\n").unwrap().set_string("core", None, "bare", "true");
        assert_eq!(file.get_string("core", None, "bare").as_deref(), Some(b"true".as_bstr()));
        assert_eq!(file.get_string_list("core", None, "bare").len(), 1);
    }

    #[test]
    fn unset_removes_last_matching_entry() {
        let file = File::from_bytes(b"[core]\n\tbare = true\n").unwrap().unset("core", None, "bare");
        assert_eq!(file.get_string("core", None, "bare"), None);
    }

    #[test]
    fn layered_overlay_wins_lookups() {
        let base = File::from_bytes(b"[core]\n\tbare = false\n").unwrap();
        let overlay = File::from_bytes(b"[core]\n\tbare = true\n").unwrap();
        assert_eq!(base.layered(&overlay).get_boolean("core", None, "bare").unwrap(), Some(true));
    }

    #[test]
    fn resolve_includes_splices_target_after_the_include_key() {
        let file = File::from_bytes(b"[include]\n\tpath = other.config\n").unwrap();
        let resolved = file
            .resolve_includes(|path, cond| {
                assert_eq!(path, "other.config");
                assert!(cond.is_none());
                Some((std::path::PathBuf::from("other.config"), b"[core]\n\tbare = true\n".to_vec()))
            })
            .unwrap();
        assert_eq!(resolved.get_boolean("core", None, "bare").unwrap(), Some(true));
    }

    #[test]
    fn resolve_includes_leaves_conditional_include_for_caller_to_decide() {
        let file = File::from_bytes(b"[includeIf \"gitdir:/work/\"]\n\tpath = work.config\n").unwrap();
        let resolved = file.resolve_includes(|_, _| None).unwrap();
        assert_eq!(resolved.get_sections().len(), 1);
    }

    fn included_bare_config() -> File {
        File::from_bytes(b"[include]\n\tpath = other.config\n")
            .unwrap()
            .resolve_includes(|_, _| Some((std::path::PathBuf::from("other.config"), b"[core]\n\tbare = true\n".to_vec())))
            .unwrap()
    }

    #[test]
    fn set_string_does_not_touch_an_included_entry() {
        let file = included_bare_config().set_string("core", None, "bare", "false");
        // the include's own value is untouched; the new local value is appended separately.
        assert_eq!(file.get_string_list("core", None, "bare"), vec![BString::from("true"), BString::from("false")]);
    }

    #[test]
    fn unset_does_not_remove_an_included_entry() {
        let file = included_bare_config().unset("core", None, "bare");
        assert_eq!(file.get_boolean("core", None, "bare").unwrap(), Some(true));
    }

    #[test]
    fn unset_section_does_not_remove_an_included_section() {
        let file = included_bare_config().unset_section("core", None);
        assert_eq!(file.get_boolean("core", None, "bare").unwrap(), Some(true));
    }

    #[test]
    fn get_sections_lists_unique_pairs_in_order() {
        let file = File::from_bytes(b"[core]\n\tbare = true\n[remote \"origin\"]\n\turl = x\n").unwrap();
        assert_eq!(
            file.get_sections(),
            vec![(BString::from("core"), None), (BString::from("remote"), Some(BString::from("origin")))]
        );
    }
}
