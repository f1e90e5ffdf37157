use bstr::{BString, ByteSlice};

use crate::entry::{ConfigEntry, Value};

/// Render `entries` back to config text. An entry that was never mutated carries its original
/// `prefix`/`suffix` bytes, so this round-trips byte-exact for an untouched [`super::File`]; a
/// freshly constructed or edited entry falls back to a conventional rendering (tab-indented,
/// quoted only when the value needs it).
pub(crate) fn format(entries: &[ConfigEntry]) -> BString {
    let mut out = Vec::new();
    for entry in entries {
        if entry.is_section_header() {
            format_section_header(&mut out, entry);
        } else if entry.key.is_some() {
            format_key_value(&mut out, entry);
        } else {
            out.extend_from_slice(&entry.prefix);
            out.extend_from_slice(&entry.suffix);
            out.push(b'\n');
        }
    }
    out.into()
}

fn format_section_header(out: &mut Vec<u8>, entry: &ConfigEntry) {
    out.extend_from_slice(&entry.prefix);
    out.push(b'[');
    if let Some(section) = &entry.section {
        out.extend_from_slice(section);
    }
    if let Some(subsection) = &entry.subsection {
        out.extend_from_slice(b" \"");
        escape_subsection_into(out, subsection);
        out.push(b'"');
    }
    out.push(b']');
    out.extend_from_slice(&entry.suffix);
    out.push(b'\n');
}

fn format_key_value(out: &mut Vec<u8>, entry: &ConfigEntry) {
    if entry.prefix.is_empty() {
        out.extend_from_slice(b"\t");
    } else {
        out.extend_from_slice(&entry.prefix);
    }
    if let Some(key) = &entry.key {
        out.extend_from_slice(key);
    }
    match &entry.value {
        Value::Missing => {}
        Value::Empty => out.extend_from_slice(b" ="),
        Value::Present(v) => {
            out.extend_from_slice(b" = ");
            write_value(out, v);
        }
    }
    out.extend_from_slice(&entry.suffix);
    out.push(b'\n');
}

fn needs_quoting(value: &[u8]) -> bool {
    value.first().is_some_and(u8::is_ascii_whitespace)
        || value.last().is_some_and(u8::is_ascii_whitespace)
        || value.contains(&b'#')
        || value.contains(&b';')
}

fn write_value(out: &mut Vec<u8>, value: &[u8]) {
    let quote = needs_quoting(value);
    if quote {
        out.push(b'"');
    }
    for &byte in value {
        match byte {
            b'\n' => out.extend_from_slice(b"\\n"),
            b'\t' => out.extend_from_slice(b"\\t"),
            0x08 => out.extend_from_slice(b"\\b"),
            b'\\' => out.extend_from_slice(b"\\\\"),
            b'"' => out.extend_from_slice(b"\\\""),
            other => out.push(other),
        }
    }
    if quote {
        out.push(b'"');
    }
}

fn escape_subsection_into(out: &mut Vec<u8>, subsection: &[u8]) {
    for &byte in subsection {
        match byte {
            b'\\' => out.extend_from_slice(b"\\\\"),
            b'"' => out.extend_from_slice(b"\\\""),
            other => out.push(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::File;

    #[test]
    fn round_trips_untouched_entries_byte_exact() {
        let original: &[u8] = b"[core]\n\tbare = true ; keep me\n";
        let file = File::from_bytes(original).unwrap();
        assert_eq!(file.to_bytes().as_slice(), original);
    }

    #[test]
    fn round_trips_a_bare_key_with_trailing_whitespace_and_comment() {
        let original: &[u8] = b"[core]\n\tbare   ; keep me\n";
        let file = File::from_bytes(original).unwrap();
        assert_eq!(file.to_bytes().as_slice(), original);
    }

    #[test]
    fn quotes_value_with_leading_or_trailing_whitespace() {
        let mut out = Vec::new();
        write_value(&mut out, b" leading");
        assert_eq!(out, b"\" leading\"");
    }

    #[test]
    fn appended_entry_renders_with_tab_indent() {
        let file = File::from_bytes(b"").unwrap().set_string("core", None, "bare", "true");
        let text = file.to_bytes();
        assert!(text.as_slice().contains_str(b"\tbare = true"));
    }

    #[test]
    fn escapes_quotes_in_subsection_name() {
        let mut out = Vec::new();
        escape_subsection_into(&mut out, b"my\"origin");
        assert_eq!(out, b"my\\\"origin");
    }
}
