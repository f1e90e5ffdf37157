use bstr::{BString, ByteSlice};

use crate::{
    entry::{ConfigEntry, Unevaluated, Value},
    Error,
};

struct Lines<'a> {
    data: &'a [u8],
    line: usize,
}

impl<'a> Lines<'a> {
    fn new(data: &'a [u8]) -> Self {
        match unicode_bom::Bom::from(data) {
            unicode_bom::Bom::Utf8 => Self { data: &data[3..], line: 1 },
            _ => Self { data, line: 1 },
        }
    }
}

/// Parse git config text into an ordered sequence of [`ConfigEntry`] values (§4.4). This is a
/// structural parse only; `include`/`includeIf` splicing happens in a later, separate pass
/// (§4.4a) since it needs filesystem access this crate deliberately does not have.
pub(crate) fn parse(data: &[u8]) -> Result<Vec<ConfigEntry>, Error> {
    let lexer = Lines::new(data);
    let mut entries = Vec::new();
    let mut rest = lexer.data;
    let mut line_no = lexer.line;

    let mut section: Option<BString> = None;
    let mut subsection: Option<BString> = None;

    while !rest.is_empty() {
        let (line, remainder) = split_line(rest);
        rest = remainder;

        let trimmed_start = line.len() - line.trim_start().len();
        let prefix = line[..trimmed_start].as_bstr().to_owned();
        let content = line[trimmed_start..].as_bstr();

        if content.is_empty() || content.starts_with(b";") || content.starts_with(b"#") {
            let mut entry = ConfigEntry::section_header(BString::default(), None);
            entry.section = None;
            entry.prefix = prefix;
            entry.suffix = content.to_owned();
            entries.push(entry);
            line_no += 1;
            continue;
        }

        if content.starts_with(b"[") {
            let (name, sub, suffix) = parse_section_header(content, line_no)?;
            section = Some(name.clone());
            subsection = sub.clone();
            let mut entry = ConfigEntry::section_header(name, sub);
            entry.prefix = prefix;
            entry.suffix = suffix;
            entries.push(entry);
            line_no += 1;
            continue;
        }

        let Some(current_section) = section.clone() else {
            return Err(Error::InvalidLine { line: line_no });
        };
        let (key, value, suffix) = parse_key_value(content, line_no)?;
        let mut entry = ConfigEntry::key_value(current_section, subsection.clone(), key.clone(), value);
        entry.prefix = prefix;
        entry.suffix = suffix;

        if key.eq_ignore_ascii_case(b"path")
            && entry.section.as_deref().is_some_and(|s| s.eq_ignore_ascii_case(b"include"))
        {
            // plain include.path: left for `resolve_includes` to splice.
        } else if let Some(cond) = include_if_condition(entry.section.as_deref(), &key) {
            entry.unresolved_condition = Some(Unevaluated(cond));
        }

        entries.push(entry);
        line_no += 1;
    }

    Ok(entries)
}

fn include_if_condition(section: Option<&bstr::BStr>, key: &BString) -> Option<String> {
    let section = section?;
    let lower = section.to_str_lossy().to_lowercase();
    let (name, condition) = lower.split_once('.')?;
    if name != "includeif" || !key.eq_ignore_ascii_case(b"path") {
        return None;
    }
    Some(condition.to_string())
}

fn split_line(data: &[u8]) -> (&[u8], &[u8]) {
    match data.iter().position(|&b| b == b'\n') {
        Some(pos) => (&data[..pos], &data[pos + 1..]),
        None => (data, &[]),
    }
}

fn parse_section_header(content: &bstr::BStr, line: usize) -> Result<(BString, Option<BString>, BString), Error> {
    let close = content.find_byte(b']').ok_or(Error::BadGroupHeader { line })?;
    let inner = &content[1..close];
    let suffix = content[close + 1..].to_owned();

    if let Some(quote_start) = inner.find_byte(b'"') {
        let name = inner[..quote_start].trim_end().as_bstr();
        if !name.iter().all(|&b| b.is_ascii_alphanumeric() || b == b'.' || b == b'-') || name.is_empty() {
            return Err(Error::BadGroupHeader { line });
        }
        let quoted = &inner[quote_start..];
        if !quoted.ends_with(b"\"") || quoted.len() < 2 {
            return Err(Error::BadSectionEntry { line });
        }
        let subsection = unescape_subsection(&quoted[1..quoted.len() - 1], line)?;
        Ok((name.to_owned(), Some(subsection), suffix))
    } else {
        let name = inner.trim_end().as_bstr();
        if name.is_empty() || !name.iter().all(|&b| b.is_ascii_alphanumeric() || b == b'.' || b == b'-') {
            return Err(Error::BadGroupHeader { line });
        }
        Ok((name.to_owned(), None, suffix))
    }
}

fn unescape_subsection(raw: &[u8], line: usize) -> Result<BString, Error> {
    let mut out = Vec::with_capacity(raw.len());
    let mut iter = raw.iter().copied();
    while let Some(b) = iter.next() {
        if b == b'\n' {
            return Err(Error::SubsectionContainsNewline { line });
        }
        if b == 0 {
            return Err(Error::SubsectionContainsNullByte { line });
        }
        if b == b'\\' {
            match iter.next() {
                Some(b'\\') => out.push(b'\\'),
                Some(b'"') => out.push(b'"'),
                Some(other) => out.push(other),
                None => return Err(Error::EndOfFileInEscape { line }),
            }
        } else {
            out.push(b);
        }
    }
    Ok(out.into())
}

fn parse_key_value(content: &bstr::BStr, line: usize) -> Result<(BString, Value, BString), Error> {
    let key_end = content
        .iter()
        .position(|&b| b == b'=' || b == b' ' || b == b'\t' || b == b';' || b == b'#')
        .unwrap_or(content.len());
    let key = &content[..key_end];
    if key.is_empty() || !key.iter().all(|&b| b.is_ascii_alphanumeric() || b == b'-') {
        return Err(Error::BadEntryName { line });
    }

    let untrimmed_rest = content[key_end..].as_bstr();
    let rest = untrimmed_rest.trim_start().as_bstr();
    if rest.is_empty() || rest.starts_with(b";") || rest.starts_with(b"#") {
        // Keep every byte between the key and EOL/comment verbatim (including whitespace
        // that `rest` itself trimmed away) so a bare key round-trips byte-exact (§8, invariant 1).
        return Ok((key.to_owned(), Value::Missing, untrimmed_rest.to_owned()));
    }
    if !rest.starts_with(b"=") {
        return Err(Error::BadEntryDelimiter { line });
    }
    let value_part = content[key_end..].as_bstr();
    let eq_pos = value_part.find_byte(b'=').expect("checked above");
    let (value, suffix) = parse_value(&value_part[eq_pos + 1..], line)?;
    Ok((key.to_owned(), value, suffix))
}

fn parse_value(raw: &[u8], line: usize) -> Result<(Value, BString), Error> {
    let mut out = Vec::new();
    let mut in_quotes = false;
    let mut iter = raw.iter().copied().peekable();
    let mut suffix_start = raw.len();

    while let Some(b) = iter.next() {
        match b {
            b'"' => in_quotes = !in_quotes,
            b'\\' => match iter.next() {
                Some(b'n') => out.push(b'\n'),
                Some(b't') => out.push(b'\t'),
                Some(b'b') => out.push(0x08),
                Some(b'\\') => out.push(b'\\'),
                Some(b'"') => out.push(b'"'),
                Some(b'\n') => {}
                Some(b'\r') if iter.peek() == Some(&b'\n') => {
                    iter.next();
                }
                Some(other) => return Err(Error::BadEscape { line, escaped: other as char }),
                None => return Err(Error::EndOfFileInEscape { line }),
            },
            b'\n' if in_quotes => return Err(Error::NewlineInQuotes { line }),
            0 => return Err(Error::ValueContainsNullByte { line }),
            b';' | b'#' if !in_quotes => {
                let comment_at = raw.len() - iter.clone().collect::<Vec<_>>().len() - 1;
                suffix_start = comment_at;
                while suffix_start > 0 && matches!(raw[suffix_start - 1], b' ' | b'\t') {
                    suffix_start -= 1;
                }
                break;
            }
            other => out.push(other),
        }
    }

    let suffix = raw[suffix_start.min(raw.len())..].as_bstr().to_owned();
    let trimmed = out.as_bstr().trim().as_bstr().to_owned();
    if trimmed.is_empty() {
        Ok((Value::Empty, suffix))
    } else {
        Ok((Value::Present(trimmed), suffix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_section_and_key() {
        let entries = parse(b"[core]\n\tbare = true\n").unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].is_section_header());
        assert_eq!(entries[1].key.as_deref(), Some("bare".as_bytes()));
        assert_eq!(entries[1].value, Value::Present("true".into()));
    }

    #[test]
    fn parses_subsection_with_escapes() {
        let entries = parse(b"[remote \"my\\\"origin\"]\n\turl = git@example.com:x.git\n").unwrap();
        assert_eq!(entries[0].subsection.as_deref(), Some(&b"my\"origin"[..]));
    }

    #[test]
    fn bare_key_yields_missing_sentinel() {
        let entries = parse(b"[core]\n\tbare\n").unwrap();
        assert_eq!(entries[1].value, Value::Missing);
    }

    #[test]
    fn comment_after_value_is_kept_as_suffix() {
        let entries = parse(b"[core]\n\tbare = true ; a comment\n").unwrap();
        assert_eq!(entries[1].value, Value::Present("true".into()));
        assert!(entries[1].suffix.ends_with(b"; a comment"));
    }

    #[test]
    fn rejects_key_before_any_section() {
        assert_eq!(parse(b"bare = true\n"), Err(Error::InvalidLine { line: 1 }));
    }

    #[test]
    fn flags_include_if_condition_as_unevaluated() {
        let entries = parse(b"[includeIf \"gitdir:/work/\"]\n\tpath = work.config\n").unwrap();
        assert_eq!(entries[1].unresolved_condition, Some(Unevaluated("gitdir:/work/".into())));
    }

    #[test]
    fn strips_leading_utf8_bom() {
        let mut data = vec![0xEF, 0xBB, 0xBF];
        data.extend_from_slice(b"[core]\n\tbare = true\n");
        let entries = parse(&data).unwrap();
        assert!(entries[0].is_section_header());
    }
}
