use bstr::{BStr, ByteSlice};

use super::Options;

/// HFS+ ignorable code points that can be interleaved into `.git` to produce a name that looks
/// different to git but resolves to the same file on a case/Unicode-insensitive HFS+ volume.
const HFS_IGNORABLE_RANGES: [(u32, u32); 4] = [
    (0x200C, 0x200F),
    (0x202A, 0x202E),
    (0x206A, 0x206F),
    (0xFEFF, 0xFEFF),
];

fn strip_hfs_ignorables(name: &BStr) -> Vec<char> {
    name.to_str_lossy()
        .chars()
        .filter(|c| !HFS_IGNORABLE_RANGES.iter().any(|&(lo, hi)| (lo..=hi).contains(&(*c as u32))))
        .collect()
}

/// NTFS short-form (8.3) aliases that resolve to `.git` on Windows despite not spelling it out.
const NTFS_DOTGIT_ALIASES: &[&str] = &["git~1", "git~2", "git~3", "git~4"];

/// True if `name`, once HFS+-ignorable code points are stripped (when `MAC_SAFE` is set) or
/// compared against known NTFS aliases (when `WINDOWS_SAFE` is set), resolves to `.git`.
pub(super) fn is_dot_git_disguise(name: &BStr, options: Options) -> bool {
    if name.eq_ignore_ascii_case(b".git") {
        return true;
    }
    if options.contains(Options::MAC_SAFE) {
        let stripped: String = strip_hfs_ignorables(name).into_iter().collect();
        if stripped.eq_ignore_ascii_case(".git") {
            return true;
        }
    }
    if options.contains(Options::WINDOWS_SAFE) {
        let lower = name.to_str_lossy().to_lowercase();
        if NTFS_DOTGIT_ALIASES.contains(&lower.as_str()) {
            return true;
        }
    }
    false
}

/// Windows device names reserved regardless of extension (`CON`, `CON.txt`, ...).
const RESERVED_DEVICE_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8", "COM9", "LPT1",
    "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// True if `name` would be rejected or silently mangled by a Windows filesystem: a reserved
/// device name, a trailing space or dot, or one of `" * : < > ? \ |` or a control byte.
pub(super) fn is_windows_unsafe(name: &BStr) -> bool {
    if name.iter().any(|&b| b < 0x20 || matches!(b, b'"' | b'*' | b':' | b'<' | b'>' | b'?' | b'\\' | b'|')) {
        return true;
    }
    if name.last().is_some_and(|&b| b == b' ' || b == b'.') {
        return true;
    }
    let stem = name.to_str_lossy();
    let stem = stem.split('.').next().unwrap_or_default();
    RESERVED_DEVICE_NAMES.iter().any(|reserved| reserved.eq_ignore_ascii_case(stem))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_plain_dot_git_case_insensitively() {
        assert!(is_dot_git_disguise(".GIT".as_bytes().as_bstr(), Options::empty()));
    }

    #[test]
    fn detects_hfs_ignorable_disguise_only_when_mac_safe() {
        let disguised = "\u{200C}.git".as_bytes().as_bstr();
        assert!(!is_dot_git_disguise(disguised, Options::empty()));
        assert!(is_dot_git_disguise(disguised, Options::MAC_SAFE));
    }

    #[test]
    fn detects_ntfs_alias_only_when_windows_safe() {
        let alias = "git~1".as_bytes().as_bstr();
        assert!(!is_dot_git_disguise(alias, Options::empty()));
        assert!(is_dot_git_disguise(alias, Options::WINDOWS_SAFE));
    }

    #[test]
    fn rejects_reserved_device_names() {
        assert!(is_windows_unsafe("CON".as_bytes().as_bstr()));
        assert!(is_windows_unsafe("con.txt".as_bytes().as_bstr()));
        assert!(!is_windows_unsafe("console".as_bytes().as_bstr()));
    }

    #[test]
    fn rejects_trailing_space_or_dot_and_forbidden_bytes() {
        assert!(is_windows_unsafe("trailing ".as_bytes().as_bstr()));
        assert!(is_windows_unsafe("trailing.".as_bytes().as_bstr()));
        assert!(is_windows_unsafe("bad:name".as_bytes().as_bstr()));
    }
}
