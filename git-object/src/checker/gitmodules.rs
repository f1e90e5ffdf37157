use bstr::ByteSlice;

use super::{ErrorKind, Violation};

/// Blobs above this size are rejected outright (`GitmodulesLarge`), matching upstream Git's
/// guard against using submodule config as a denial-of-service vector during clone/fetch.
pub const MAX_GITMODULES_SIZE: usize = 100 * 1024;

/// Validate the *content* of a blob already identified as `.gitmodules` by the tree checker
/// (§4.5a). This is a second, independent pass: the tree checker only notices the file's name.
#[must_use]
pub(super) fn check(blob: &[u8]) -> Vec<Violation> {
    let mut violations = Vec::new();

    if blob.len() > MAX_GITMODULES_SIZE {
        violations.push(Violation::new(ErrorKind::GitmodulesLarge, format!("{} bytes exceeds the {MAX_GITMODULES_SIZE}-byte limit", blob.len())));
    }

    let file = match git_config::File::from_bytes(blob) {
        Ok(file) => file,
        Err(err) => {
            violations.push(Violation::new(ErrorKind::GitmodulesParse, err.to_string()));
            return violations;
        }
    };

    for section in file.sections() {
        if section.name != "submodule" {
            continue;
        }
        let Some(name) = section.subsection else { continue };
        if name.contains_str("..") || name.starts_with(b"-") {
            violations.push(Violation::new(
                ErrorKind::GitmodulesName,
                format!("submodule name {name:?} must not traverse paths or start with '-'"),
            ));
        }

        if let Some(path) = file.value("submodule", Some(name.to_str_lossy().as_ref()), "path") {
            if path.contains_str("..") || path.starts_with(b"/") {
                violations.push(Violation::new(
                    ErrorKind::GitmodulesPath,
                    format!("submodule.{name}.path {path:?} must be a relative in-worktree path"),
                ));
            }
        }

        if let Some(url) = file.value("submodule", Some(name.to_str_lossy().as_ref()), "url") {
            if url.starts_with(b"ext::") || url.starts_with(b"-") {
                violations.push(Violation::new(
                    ErrorKind::GitmodulesUrl,
                    format!("submodule.{name}.url {url:?} looks like a local-command URL, which is disallowed"),
                ));
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_gitmodules() {
        let blob = b"[submodule \"lib\"]\n\tpath = lib\n\turl = https://example.com/lib.git\n";
        assert!(check(blob).is_empty());
    }

    #[test]
    fn rejects_path_traversal_in_path_value() {
        let blob = b"[submodule \"lib\"]\n\tpath = ../../etc\n\turl = https://example.com/lib.git\n";
        let violations = check(blob);
        assert!(violations.iter().any(|v| v.kind == ErrorKind::GitmodulesPath));
    }

    #[test]
    fn rejects_ext_command_urls() {
        let blob = b"[submodule \"lib\"]\n\tpath = lib\n\turl = ext::sh -c touch% pwned\n";
        let violations = check(blob);
        assert!(violations.iter().any(|v| v.kind == ErrorKind::GitmodulesUrl));
    }

    #[test]
    fn rejects_oversized_blob() {
        let blob = vec![b'#'; MAX_GITMODULES_SIZE + 1];
        let violations = check(&blob);
        assert!(violations.iter().any(|v| v.kind == ErrorKind::GitmodulesLarge));
    }

    #[test]
    fn reports_parse_errors() {
        let violations = check(b"[submodule\npath = x");
        assert!(violations.iter().any(|v| v.kind == ErrorKind::GitmodulesParse));
    }
}
