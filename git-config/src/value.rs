use bstr::{BStr, ByteSlice};

use crate::Error;

/// Parse a git-style boolean (§4.3: case-insensitive `yes`/`true`/`on`/`1` vs.
/// `no`/`false`/`off`/`0`/empty).
pub(crate) fn parse_bool(value: &BStr) -> Result<bool, Error> {
    let lower = value.to_str_lossy().to_lowercase();
    match lower.as_str() {
        "yes" | "true" | "on" | "1" => Ok(true),
        "no" | "false" | "off" | "0" | "" => Ok(false),
        _ => Err(Error::InvalidBoolean(lower)),
    }
}

/// Parse an integer carrying an optional `k`/`m`/`g` (or uppercase) unit suffix meaning
/// `* 1024`, `* 1024^2`, `* 1024^3` respectively.
pub(crate) fn parse_int(value: &BStr) -> Result<i64, Error> {
    let text = value.to_str_lossy();
    let text = text.trim();
    let (digits, multiplier) = match text.as_bytes().last() {
        Some(b'k' | b'K') => (&text[..text.len() - 1], 1024i64),
        Some(b'm' | b'M') => (&text[..text.len() - 1], 1024 * 1024),
        Some(b'g' | b'G') => (&text[..text.len() - 1], 1024 * 1024 * 1024),
        _ => (text, 1),
    };
    let base: i64 = digits.trim().parse().map_err(|_| Error::IntegerOutOfRange)?;
    base.checked_mul(multiplier).ok_or(Error::IntegerOutOfRange)
}

pub(crate) fn parse_int_in_range(value: &BStr, min: i64, max: i64) -> Result<i64, Error> {
    let parsed = parse_int(value)?;
    if parsed < min || parsed > max {
        return Err(Error::InvalidIntegerRange { min, max });
    }
    Ok(parsed)
}

/// Match `value` against one of `variants` after normalizing `_`/`-` to a space and comparing
/// case-insensitively, the convention `core.abbrev`-style enum values use.
pub(crate) fn match_enum<'a>(value: &BStr, variants: &[&'a str]) -> Option<&'a str> {
    let normalize = |s: &str| s.to_lowercase().replace(['_', '-'], " ");
    let have = normalize(&value.to_str_lossy());
    variants.iter().copied().find(|candidate| normalize(candidate) == have)
}

/// A unit a caller can request a parsed duration be converted into (§4.3 `get_time_unit`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
}

impl TimeUnit {
    fn nanos_per_unit(self) -> u128 {
        match self {
            Self::Nanoseconds => 1,
            Self::Microseconds => 1_000,
            Self::Milliseconds => 1_000_000,
            Self::Seconds => 1_000_000_000,
            Self::Minutes => 60 * 1_000_000_000,
            Self::Hours => 3_600 * 1_000_000_000,
            Self::Days => 86_400 * 1_000_000_000,
            Self::Weeks => 604_800 * 1_000_000_000,
        }
    }
}

/// Parse "<N> <unit>" where unit is one of {ns, us/µs, ms, s, m, h, d, w} (seconds assumed when
/// no unit suffix is given), then convert the result to `want_unit` (§4.3 `get_time_unit`).
pub(crate) fn parse_time_unit(value: &BStr, want_unit: TimeUnit) -> Result<u64, Error> {
    let text = value.to_str_lossy();
    let text = text.trim();
    let unit_len = ["ns", "us", "µs", "ms"]
        .iter()
        .find(|u| text.ends_with(*u))
        .map(|u| u.len())
        .or_else(|| ["s", "m", "h", "d", "w"].iter().find(|u| text.ends_with(*u)).map(|u| u.len()));

    let (digits, source_unit) = match unit_len {
        Some(unit_len) => {
            let (digits, unit) = text.split_at(text.len() - unit_len);
            let source_unit = match unit {
                "ns" => TimeUnit::Nanoseconds,
                "us" | "µs" => TimeUnit::Microseconds,
                "ms" => TimeUnit::Milliseconds,
                "s" => TimeUnit::Seconds,
                "m" => TimeUnit::Minutes,
                "h" => TimeUnit::Hours,
                "d" => TimeUnit::Days,
                "w" => TimeUnit::Weeks,
                _ => return Err(Error::InvalidTimeUnit(text.to_string())),
            };
            (digits, source_unit)
        }
        None => (text, TimeUnit::Seconds),
    };
    let amount: u64 = digits.trim().parse().map_err(|_| Error::InvalidTimeUnit(text.to_string()))?;
    let nanos = u128::from(amount) * source_unit.nanos_per_unit();
    Ok((nanos / want_unit.nanos_per_unit()) as u64)
}

/// A single `src:dst` (or `+src:dst` force-form) refspec, the minimal structure §4.3's
/// `get_ref_specs` needs; full fetch/push refspec semantics live outside this core's scope.
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct RefSpec {
    pub force: bool,
    pub source: bstr::BString,
    pub destination: bstr::BString,
}

pub(crate) fn parse_ref_spec(value: &BStr) -> RefSpec {
    let (force, rest) = match value.strip_prefix(b"+") {
        Some(rest) => (true, rest.as_bstr()),
        None => (false, value),
    };
    match rest.find_byte(b':') {
        Some(pos) => RefSpec {
            force,
            source: rest[..pos].to_owned(),
            destination: rest[pos + 1..].to_owned(),
        },
        None => RefSpec {
            force,
            source: rest.to_owned(),
            destination: bstr::BString::default(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_accepts_common_spellings() {
        assert_eq!(parse_bool("YES".into()).unwrap(), true);
        assert_eq!(parse_bool("0".into()).unwrap(), false);
        assert_eq!(parse_bool("".into()).unwrap(), false);
        assert!(parse_bool("maybe".into()).is_err());
    }

    #[test]
    fn int_applies_unit_suffix() {
        assert_eq!(parse_int("4k".into()).unwrap(), 4096);
        assert_eq!(parse_int("2M".into()).unwrap(), 2 * 1024 * 1024);
        assert_eq!(parse_int("10".into()).unwrap(), 10);
    }

    #[test]
    fn int_in_range_rejects_out_of_bounds() {
        assert!(parse_int_in_range("300".into(), 0, 255).is_err());
        assert_eq!(parse_int_in_range("10".into(), 0, 255).unwrap(), 10);
    }

    #[test]
    fn enum_normalizes_separators() {
        let variants = ["auto", "always", "never"];
        assert_eq!(match_enum("Always".into(), &variants), Some("always"));
    }

    #[test]
    fn time_unit_converts_to_requested_unit() {
        assert_eq!(parse_time_unit("5m".into(), TimeUnit::Seconds).unwrap(), 300);
        assert_eq!(parse_time_unit("2h".into(), TimeUnit::Seconds).unwrap(), 7200);
        assert_eq!(parse_time_unit("30".into(), TimeUnit::Seconds).unwrap(), 30);
        assert_eq!(parse_time_unit("2h".into(), TimeUnit::Minutes).unwrap(), 120);
        assert_eq!(parse_time_unit("1500ms".into(), TimeUnit::Seconds).unwrap(), 1);
        assert_eq!(parse_time_unit("1s".into(), TimeUnit::Milliseconds).unwrap(), 1_000);
    }

    #[test]
    fn ref_spec_splits_force_and_colon() {
        let spec = parse_ref_spec("+refs/heads/*:refs/remotes/origin/*".into());
        assert!(spec.force);
        assert_eq!(spec.source, "refs/heads/*");
        assert_eq!(spec.destination, "refs/remotes/origin/*");
    }
}
