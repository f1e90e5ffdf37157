use std::{fmt, io};

/// The sign of a timezone offset, kept distinct from the numeric offset itself so that the
/// otherwise-unrepresentable `-0000` (a zero offset that is nonetheless negative) round-trips.
#[derive(Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
pub enum Sign {
    Plus,
    Minus,
}

/// A Unix timestamp paired with the timezone offset (in seconds) under which it should be
/// displayed, as embedded in commit and tag header lines.
#[derive(Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Time {
    /// Seconds since 1970-01-01 00:00:00 UTC.
    pub seconds: u32,
    /// Offset from UTC in seconds; its magnitude, combined with `sign`, reproduces `±HHMM`.
    pub offset: i32,
    /// The sign of `offset`, needed to preserve `-0000` which a bare signed integer would lose.
    pub sign: Sign,
}

/// The error returned by [`Time::from_bytes`].
#[derive(Debug, thiserror::Error, Eq, PartialEq, Clone)]
#[allow(missing_docs)]
pub enum Error {
    #[error("a person identity line must have a space before the timestamp")]
    MissingSpaceBeforeDate,
    #[error("the timestamp could not be parsed as a decimal integer")]
    BadDate,
    #[error("the timezone offset could not be parsed as '+HHMM' or '-HHMM'")]
    BadTimezone,
}

impl Time {
    /// Build a timestamp from an offset expressed in minutes east of UTC, the unit most
    /// constructors work with (local-time APIs, [`crate::Signature::now_with_zone`]).
    #[must_use]
    pub fn new(seconds: u32, offset_minutes: i32) -> Self {
        let offset = offset_minutes * 60;
        let sign = if offset_minutes < 0 { Sign::Minus } else { Sign::Plus };
        Self { seconds, offset, sign }
    }

    /// Parse the `<epoch> SP <±HHMM>` tail of a person identity line.
    pub fn from_bytes(input: &[u8]) -> Result<Self, Error> {
        let mut parts = input.splitn(2, |&b| b == b' ');
        let epoch = parts.next().filter(|s| !s.is_empty()).ok_or(Error::MissingSpaceBeforeDate)?;
        let tz = parts.next().ok_or(Error::MissingSpaceBeforeDate)?;

        let epoch_str = std::str::from_utf8(epoch).map_err(|_| Error::BadDate)?;
        let seconds: u32 = epoch_str.parse().map_err(|_| Error::BadDate)?;

        if tz.len() != 5 {
            return Err(Error::BadTimezone);
        }
        let sign = match tz[0] {
            b'+' => Sign::Plus,
            b'-' => Sign::Minus,
            _ => return Err(Error::BadTimezone),
        };
        let tz_str = std::str::from_utf8(&tz[1..]).map_err(|_| Error::BadTimezone)?;
        let hhmm: i32 = tz_str.parse().map_err(|_| Error::BadTimezone)?;
        let hours = hhmm / 100;
        let minutes = hhmm % 100;
        let magnitude = hours * 3600 + minutes * 60;
        let offset = match sign {
            Sign::Plus => magnitude,
            Sign::Minus => -magnitude,
        };
        Ok(Self { seconds, offset, sign })
    }

    /// Serialize as `<epoch> SP ±HHMM`, matching the tail of a person identity line.
    pub fn write_to(&self, mut out: impl io::Write) -> io::Result<()> {
        let mut buf = itoa::Buffer::new();
        out.write_all(buf.format(self.seconds).as_bytes())?;
        out.write_all(b" ")?;
        out.write_all(&[match self.sign {
            Sign::Plus => b'+',
            Sign::Minus => b'-',
        }])?;

        const SECONDS_PER_HOUR: i32 = 3600;
        let offset = self.offset.abs();
        let hours = offset / SECONDS_PER_HOUR;
        let minutes = (offset - hours * SECONDS_PER_HOUR) / 60;
        assert!(hours < 25, "timezone offset spans more than a day: {hours}");

        if hours < 10 {
            out.write_all(b"0")?;
        }
        out.write_all(buf.format(hours).as_bytes())?;
        if minutes < 10 {
            out.write_all(b"0")?;
        }
        out.write_all(buf.format(minutes).as_bytes())?;
        Ok(())
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = Vec::new();
        self.write_to(&mut buf).expect("writing to a Vec never fails");
        f.write_str(std::str::from_utf8(&buf).expect("Time serializes to ASCII"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_positive_offset() {
        let time = Time::new(1_700_000_000, 90);
        assert_eq!(time.to_string(), "1700000000 +0130");
        assert_eq!(Time::from_bytes(time.to_string().as_bytes()).unwrap(), time);
    }

    #[test]
    fn round_trips_negative_offset() {
        let time = Time::new(1_700_000_000, -480);
        assert_eq!(time.to_string(), "1700000000 -0800");
    }

    #[test]
    fn preserves_minus_zero() {
        let time = Time { seconds: 0, offset: 0, sign: Sign::Minus };
        assert_eq!(time.to_string(), "0 -0000");
        assert_eq!(Time::from_bytes(b"0 -0000").unwrap(), time);
    }

    #[test]
    fn rejects_malformed_timezone() {
        assert_eq!(Time::from_bytes(b"123 +1"), Err(Error::BadTimezone));
        assert_eq!(Time::from_bytes(b"123 x0000"), Err(Error::BadTimezone));
        assert_eq!(Time::from_bytes(b"abc +0000"), Err(Error::BadDate));
    }
}
