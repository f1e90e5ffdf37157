use std::io;

use bstr::{BStr, BString, ByteSlice};
use git_actor::Signature;
use git_hash::ObjectId;

use crate::{encode, encode::NL, Kind};

/// The error returned while decoding a tag with [`TagRef::from_bytes`], or while writing one
/// whose name fails validation.
#[derive(Debug, thiserror::Error, Eq, PartialEq, Clone)]
#[allow(missing_docs)]
pub enum Error {
    #[error("a tag must start with an 'object' header")]
    MissingObject,
    #[error("expected a header line terminated by a newline")]
    TruncatedHeader,
    #[error("'object' header did not contain a valid object id")]
    BadObjectId,
    #[error("a tag must have a 'type' header naming the target's kind")]
    MissingTypeEntry,
    #[error("'type' header named an unknown object kind")]
    BadTargetKind(#[from] crate::kind::Error),
    #[error("a tag must have a 'tag' header naming the tag")]
    MissingTagEntry,
    #[error("'tagger' header was not a valid person identity")]
    BadTagger(#[from] git_actor::Error),
    #[error("tag names must not start with a dash")]
    StartsWithDash,
    #[error("the tag name is not a valid reference name")]
    InvalidName(#[from] git_validate::Error),
}

/// A borrowed, canonically-encoded tag object.
#[derive(PartialEq, Eq, Debug, Hash, Clone)]
pub struct TagRef<'a> {
    /// The id of the object this tag points at.
    pub target: ObjectId,
    /// The kind of the object `target` points at.
    pub target_kind: Kind,
    /// The tag's name.
    pub name: &'a BStr,
    /// The person who created the tag, absent for lightweight-style annotated tags some tools
    /// produce without one.
    pub tagger: Option<Signature>,
    /// The tag message, verbatim.
    pub message: &'a BStr,
    /// A trailing PGP signature block, if present.
    pub pgp_signature: Option<&'a BStr>,
}

/// An owned tag object.
#[derive(PartialEq, Eq, Debug, Hash, Clone)]
pub struct Tag {
    /// The id of the object this tag points at.
    pub target: ObjectId,
    /// The kind of the object `target` points at.
    pub target_kind: Kind,
    /// The tag's name.
    pub name: BString,
    /// The person who created the tag.
    pub tagger: Option<Signature>,
    /// The tag message, verbatim.
    pub message: BString,
    /// A trailing PGP signature block, if present.
    pub pgp_signature: Option<BString>,
}

fn split_header_line(data: &[u8]) -> Result<(&[u8], &[u8], &[u8]), Error> {
    let key_end = data.iter().position(|&b| b == b' ').ok_or(Error::TruncatedHeader)?;
    let value_end = data.iter().position(|&b| b == b'\n').ok_or(Error::TruncatedHeader)?;
    Ok((&data[..key_end], &data[key_end + 1..value_end], &data[value_end + 1..]))
}

impl<'a> TagRef<'a> {
    /// Decode a canonical tag object.
    pub fn from_bytes(data: &'a [u8]) -> Result<Self, Error> {
        let (key, value, rest) = split_header_line(data)?;
        if key != b"object" {
            return Err(Error::MissingObject);
        }
        let target = ObjectId::from_hex(value).map_err(|_| Error::BadObjectId)?;

        let (key, value, rest) = split_header_line(rest)?;
        if key != b"type" {
            return Err(Error::MissingTypeEntry);
        }
        let target_kind = Kind::from_bytes(value).map_err(Error::BadTargetKind)?;

        let (key, value, mut rest) = split_header_line(rest)?;
        if key != b"tag" {
            return Err(Error::MissingTagEntry);
        }
        let name = value.as_bstr();

        let mut tagger = None;
        if let Ok((key, value, after)) = split_header_line(rest) {
            if key == b"tagger" {
                tagger = Some(Signature::from_bytes(value)?);
                rest = after;
            }
        }

        let message = if let Some(after_blank) = rest.strip_prefix(b"\n") { after_blank } else { rest };

        // A PGP signature block, if any, is appended after the message body separated by its
        // own blank line; we do not parse its contents, only carry it opaquely.
        const SIGNATURE_MARKER: &[u8] = b"\n-----BEGIN PGP SIGNATURE-----";
        let (message, pgp_signature) = match message.windows(SIGNATURE_MARKER.len()).position(|w| w == SIGNATURE_MARKER) {
            Some(pos) => (&message[..pos], Some(message[pos + 1..].as_bstr())),
            None => (message, None),
        };

        Ok(Self { target, target_kind, name, tagger, message: message.as_bstr(), pgp_signature })
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        io::Error::new(io::ErrorKind::Other, err)
    }
}

fn validated_name(name: &BStr) -> Result<&BStr, Error> {
    git_validate::tag::name(name)?;
    if name[0] == b'-' {
        return Err(Error::StartsWithDash);
    }
    Ok(name)
}

impl crate::WriteTo for Tag {
    fn write_to(&self, mut out: impl io::Write) -> io::Result<()> {
        encode::trusted_header_id(b"object", &self.target, &mut out)?;
        encode::trusted_header_field(b"type", self.target_kind.to_bytes(), &mut out)?;
        encode::header_field(b"tag", validated_name(self.name.as_bstr())?, &mut out)?;
        if let Some(tagger) = &self.tagger {
            encode::trusted_header_signature(b"tagger", tagger, &mut out)?;
        }

        out.write_all(NL)?;
        out.write_all(&self.message)?;
        if let Some(signature) = &self.pgp_signature {
            out.write_all(NL)?;
            out.write_all(signature)?;
        }
        Ok(())
    }

    fn size(&self) -> usize {
        b"object".len() + 1 + git_hash::HEX_LEN + 1
            + b"type".len() + 1 + self.target_kind.to_bytes().len() + 1
            + b"tag".len() + 1 + self.name.len() + 1
            + self.tagger.as_ref().map_or(0, |t| b"tagger".len() + 1 + t.to_string().len() + 1)
            + 1
            + self.message.len()
            + self.pgp_signature.as_ref().map_or(0, |s| 1 + s.len())
    }

    fn kind(&self) -> Kind {
        Kind::Tag
    }
}

impl From<TagRef<'_>> for Tag {
    fn from(value: TagRef<'_>) -> Self {
        Self {
            target: value.target,
            target_kind: value.target_kind,
            name: value.name.to_owned(),
            tagger: value.tagger,
            message: value.message.to_owned(),
            pgp_signature: value.pgp_signature.map(BStr::to_owned),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagger() -> Signature {
        Signature { name: "A U Thor".into(), email: "a@example.com".into(), time: git_actor::Time::new(1_700_000_000, 0) }
    }

    #[test]
    fn round_trips_with_tagger_and_message() {
        use crate::WriteTo;

        let tag = Tag {
            target: ObjectId::null(),
            target_kind: Kind::Commit,
            name: "v1.0.0".into(),
            tagger: Some(tagger()),
            message: "release\n".into(),
            pgp_signature: None,
        };
        let mut buf = Vec::new();
        tag.write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), tag.size());

        let parsed = TagRef::from_bytes(&buf).unwrap();
        assert_eq!(parsed.name, "v1.0.0");
        assert_eq!(parsed.target_kind, Kind::Commit);
        assert_eq!(parsed.message, "release\n");
    }

    #[test]
    fn rejects_tag_names_starting_with_dash() {
        let tag = Tag {
            target: ObjectId::null(),
            target_kind: Kind::Commit,
            name: "-evil".into(),
            tagger: None,
            message: "".into(),
            pgp_signature: None,
        };
        let mut buf = Vec::new();
        assert_eq!(tag.write_to(&mut buf).unwrap_err().to_string(), Error::StartsWithDash.to_string());
    }

    #[test]
    fn separates_trailing_pgp_signature() {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"object ");
        buf.extend_from_slice(ObjectId::null().name().as_bytes());
        buf.extend_from_slice(b"\ntype commit\ntag v1\n\nmsg\n-----BEGIN PGP SIGNATURE-----\nabc\n-----END PGP SIGNATURE-----\n");
        let parsed = TagRef::from_bytes(&buf).unwrap();
        assert_eq!(parsed.message, "msg");
        assert!(parsed.pgp_signature.unwrap().starts_with(b"-----BEGIN PGP SIGNATURE-----"));
    }
}
