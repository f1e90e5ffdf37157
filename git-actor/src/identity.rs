use std::{fmt, io};

use bstr::{BStr, BString, ByteSlice};

use crate::Time;

/// The identity of a git actor (an author, committer, or tagger): a name, an email address, and
/// the instant at which the action was taken.
///
/// Name and email are stored verbatim and only sanitized on serialization — parsing never
/// silently rewrites input, matching gitoxide's own signature handling.
///
/// Equality and hashing consider only `name`, `email`, and `time.seconds` — the timezone offset
/// is display metadata, not part of an actor's identity at an instant.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Signature {
    /// The actor's display name.
    pub name: BString,
    /// The actor's email address, without surrounding `<` `>`.
    pub email: BString,
    /// When the action was taken.
    pub time: Time,
}

/// The error returned by [`Signature::from_bytes`].
#[derive(Debug, thiserror::Error, Eq, PartialEq, Clone)]
#[allow(missing_docs)]
pub enum Error {
    #[error("a person identity line must contain an email address enclosed in '<' and '>'")]
    MissingEmail,
    #[error("the email address must not be empty")]
    BadEmail,
    #[error(transparent)]
    Time(#[from] crate::time::Error),
}

impl Signature {
    /// Build a signature for `name`/`email` using the current wall-clock time and the system's
    /// local timezone offset.
    #[must_use]
    pub fn now(name: impl Into<BString>, email: impl Into<BString>) -> Self {
        let now = jiff::Zoned::now();
        let offset_minutes = now.offset().seconds() / 60;
        Self::now_with_zone(name, email, offset_minutes)
    }

    /// Build a signature for `name`/`email` using the current wall-clock time and an explicit
    /// timezone offset expressed in minutes east of UTC.
    #[must_use]
    pub fn now_with_zone(name: impl Into<BString>, email: impl Into<BString>, offset_minutes: i32) -> Self {
        let seconds = jiff::Timestamp::now().as_second().max(0) as u32;
        Self { name: name.into(), email: email.into(), time: Time::new(seconds, offset_minutes) }
    }

    /// Return this signature's instant, bridging to the `Time`/`Sign` pair embedded by the
    /// commit and tag writers.
    #[must_use]
    pub fn to_time(&self) -> Time {
        self.time
    }

    /// Parse a `<name> SP "<" <email> ">" SP <epoch> SP <±HHMM>` person identity line.
    pub fn from_bytes(input: &[u8]) -> Result<Self, Error> {
        let open = input.find_byte(b'<').ok_or(Error::MissingEmail)?;
        let close = input[open..].find_byte(b'>').map(|pos| open + pos).ok_or(Error::MissingEmail)?;

        let name = input[..open].trim_end().to_vec().into();
        let email = &input[open + 1..close];
        if email.is_empty() {
            return Err(Error::BadEmail);
        }

        let rest = input[close + 1..].trim_start();
        let time = Time::from_bytes(rest)?;

        Ok(Self { name, email: email.into(), time })
    }

    /// Serialize as `<name> SP "<" <email> ">" SP <epoch> SP <±HHMM>`, sanitizing name and email
    /// by trimming surrounding whitespace (`<= 0x20`) and stripping `\n`, `<`, `>`.
    pub fn write_to(&self, mut out: impl io::Write) -> io::Result<()> {
        out.write_all(&sanitize(&self.name))?;
        out.write_all(b" <")?;
        out.write_all(&sanitize(&self.email))?;
        out.write_all(b"> ")?;
        self.time.write_to(&mut out)
    }
}

fn sanitize(value: &BStr) -> BString {
    let trimmed = value.trim_with(|c| c as u32 <= 0x20);
    trimmed.iter().copied().filter(|&b| b != b'\n' && b != b'<' && b != b'>').collect::<Vec<u8>>().into()
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.email == other.email && self.time.seconds == other.time.seconds
    }
}

impl Eq for Signature {}

impl std::hash::Hash for Signature {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.email.hash(state);
        self.time.seconds.hash(state);
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = Vec::new();
        self.write_to(&mut buf).expect("writing to a Vec never fails");
        f.write_str(std::str::from_utf8(&buf).expect("a sanitized signature serializes to valid UTF-8 given UTF-8 input"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_bytes() {
        let line = b"A U Thor <author@example.com> 1700000000 +0130";
        let sig = Signature::from_bytes(line).unwrap();
        assert_eq!(sig.name, "A U Thor");
        assert_eq!(sig.email, "author@example.com");
        assert_eq!(sig.to_string().as_bytes(), line);
    }

    #[test]
    fn sanitizes_angle_brackets_and_newlines_on_write() {
        let sig = Signature {
            name: "Evil <Name>\n".into(),
            email: "a@b.com".into(),
            time: Time::new(0, 0),
        };
        assert_eq!(sig.to_string(), "EvilName <a@b.com> 0 +0000");
    }

    #[test]
    fn rejects_missing_email() {
        assert_eq!(Signature::from_bytes(b"A U Thor 1700000000 +0000"), Err(Error::MissingEmail));
    }

    #[test]
    fn rejects_empty_email() {
        assert_eq!(Signature::from_bytes(b"A U Thor <> 1700000000 +0000"), Err(Error::BadEmail));
    }

    #[test]
    fn equality_and_hash_ignore_timezone_offset() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let a = Signature::from_bytes(b"A U Thor <a@b.com> 1700000000 +0000").unwrap();
        let b = Signature::from_bytes(b"A U Thor <a@b.com> 1700000000 +0200").unwrap();
        assert_eq!(a, b, "offset differs but name/email/epoch agree");

        let mut hasher_a = DefaultHasher::new();
        a.hash(&mut hasher_a);
        let mut hasher_b = DefaultHasher::new();
        b.hash(&mut hasher_b);
        assert_eq!(hasher_a.finish(), hasher_b.finish());

        let c = Signature::from_bytes(b"Other Name <a@b.com> 1700000000 +0000").unwrap();
        assert_ne!(a, c, "names differ so signatures are unequal");
    }
}
