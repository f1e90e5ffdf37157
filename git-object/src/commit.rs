use std::io;

use bstr::{BStr, BString, ByteSlice};
use git_actor::Signature;
use git_hash::ObjectId;
use smallvec::SmallVec;

use crate::encode;

/// The error returned while decoding a commit with [`CommitRef::from_bytes`].
#[derive(Debug, thiserror::Error, Eq, PartialEq, Clone)]
#[allow(missing_docs)]
pub enum Error {
    #[error("a commit must start with a 'tree' header")]
    MissingTree,
    #[error("expected a header line terminated by a newline")]
    TruncatedHeader,
    #[error("'tree' header did not contain a valid object id")]
    BadTreeId,
    #[error("'parent' header did not contain a valid object id")]
    BadParentId,
    #[error("a commit must have an 'author' header")]
    MissingAuthor,
    #[error("a commit must have a 'committer' header")]
    MissingCommitter,
    #[error("'author' header was not a valid person identity")]
    BadAuthor(#[from] git_actor::Error),
}

/// An extra, non-required header line such as `encoding` or `gpgsig`.
pub type ExtraHeader<'a> = (&'a BStr, std::borrow::Cow<'a, BStr>);

/// A borrowed, canonically-encoded commit object.
#[derive(PartialEq, Eq, Debug, Hash, Clone)]
pub struct CommitRef<'a> {
    /// The id of the tree this commit records.
    pub tree: ObjectId,
    /// Zero or more parent commit ids, in header order.
    pub parents: SmallVec<[ObjectId; 1]>,
    /// The commit's author.
    pub author: Signature,
    /// The commit's committer.
    pub committer: Signature,
    /// Additional header lines that are neither `tree`, `parent`, `author`, nor `committer`
    /// (`encoding`, `gpgsig`, `mergetag`, ...), in header order.
    pub extra_headers: Vec<(&'a BStr, std::borrow::Cow<'a, BStr>)>,
    /// The commit message, verbatim (everything after the blank line separating it from the
    /// headers).
    pub message: &'a BStr,
}

/// An owned commit object.
#[derive(PartialEq, Eq, Debug, Hash, Clone)]
pub struct Commit {
    /// The id of the tree this commit records.
    pub tree: ObjectId,
    /// Zero or more parent commit ids, in header order.
    pub parents: SmallVec<[ObjectId; 1]>,
    /// The commit's author.
    pub author: Signature,
    /// The commit's committer.
    pub committer: Signature,
    /// Additional header lines that are neither `tree`, `parent`, `author`, nor `committer`.
    pub extra_headers: Vec<(BString, BString)>,
    /// The commit message, verbatim.
    pub message: BString,
}

fn split_header_line(data: &[u8]) -> Result<(&[u8], &[u8], &[u8]), Error> {
    let key_end = data.iter().position(|&b| b == b' ').ok_or(Error::TruncatedHeader)?;
    let value_end = data.iter().position(|&b| b == b'\n').ok_or(Error::TruncatedHeader)?;
    Ok((&data[..key_end], &data[key_end + 1..value_end], &data[value_end + 1..]))
}

impl<'a> CommitRef<'a> {
    /// Decode a canonical commit object.
    pub fn from_bytes(mut data: &'a [u8]) -> Result<Self, Error> {
        let (key, value, rest) = split_header_line(data)?;
        if key != b"tree" {
            return Err(Error::MissingTree);
        }
        let tree = ObjectId::from_hex(value).map_err(|_| Error::BadTreeId)?;
        data = rest;

        let mut parents = SmallVec::new();
        loop {
            let (key, value, rest) = split_header_line(data)?;
            if key != b"parent" {
                break;
            }
            parents.push(ObjectId::from_hex(value).map_err(|_| Error::BadParentId)?);
            data = rest;
        }

        let (key, value, rest) = split_header_line(data)?;
        if key != b"author" {
            return Err(Error::MissingAuthor);
        }
        let author = Signature::from_bytes(value)?;
        data = rest;

        let (key, value, rest) = split_header_line(data)?;
        if key != b"committer" {
            return Err(Error::MissingCommitter);
        }
        let committer = Signature::from_bytes(value)?;
        data = rest;

        let mut extra_headers = Vec::new();
        let message = loop {
            if data.starts_with(b"\n") {
                break &data[1..];
            }
            let (key, value, rest) = split_header_line(data)?;
            extra_headers.push((key.as_bstr(), std::borrow::Cow::Borrowed(value.as_bstr())));
            data = rest;
            if data.is_empty() {
                break data;
            }
        };

        Ok(Self { tree, parents, author, committer, extra_headers, message: message.as_bstr() })
    }
}

impl crate::WriteTo for Commit {
    fn write_to(&self, mut out: impl io::Write) -> io::Result<()> {
        encode::trusted_header_id(b"tree", &self.tree, &mut out)?;
        for parent in &self.parents {
            encode::trusted_header_id(b"parent", parent, &mut out)?;
        }
        encode::trusted_header_signature(b"author", &self.author, &mut out)?;
        encode::trusted_header_signature(b"committer", &self.committer, &mut out)?;
        for (key, value) in &self.extra_headers {
            encode::trusted_header_field(key, value, &mut out)?;
        }
        out.write_all(encode::NL)?;
        out.write_all(&self.message)
    }

    fn size(&self) -> usize {
        let mut size = b"tree".len() + 1 + git_hash::HEX_LEN + 1;
        size += self.parents.len() * (b"parent".len() + 1 + git_hash::HEX_LEN + 1);
        size += b"author".len() + 1 + self.author.to_string().len() + 1;
        size += b"committer".len() + 1 + self.committer.to_string().len() + 1;
        size += self.extra_headers.iter().map(|(k, v)| k.len() + 1 + v.len() + 1).sum::<usize>();
        size + 1 + self.message.len()
    }

    fn kind(&self) -> crate::Kind {
        crate::Kind::Commit
    }
}

impl From<CommitRef<'_>> for Commit {
    fn from(value: CommitRef<'_>) -> Self {
        Self {
            tree: value.tree,
            parents: value.parents,
            author: value.author,
            committer: value.committer,
            extra_headers: value
                .extra_headers
                .into_iter()
                .map(|(k, v)| (k.to_owned(), v.into_owned()))
                .collect(),
            message: value.message.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signature(epoch: u32) -> Signature {
        Signature { name: "A U Thor".into(), email: "a@example.com".into(), time: git_actor::Time::new(epoch, 0) }
    }

    #[test]
    fn round_trips_minimal_commit() {
        use crate::WriteTo;

        let commit = Commit {
            tree: ObjectId::null(),
            parents: SmallVec::new(),
            author: signature(1_700_000_000),
            committer: signature(1_700_000_001),
            extra_headers: Vec::new(),
            message: "initial commit\n".into(),
        };
        let mut buf = Vec::new();
        commit.write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), commit.size());

        let parsed = CommitRef::from_bytes(&buf).unwrap();
        assert_eq!(parsed.tree, ObjectId::null());
        assert_eq!(parsed.parents.len(), 0);
        assert_eq!(parsed.message, "initial commit\n");
    }

    #[test]
    fn round_trips_multiple_parents_and_extra_headers() {
        use crate::WriteTo;

        let commit = Commit {
            tree: ObjectId::null(),
            parents: SmallVec::from_vec(vec![ObjectId::null(), ObjectId::null()]),
            author: signature(1),
            committer: signature(2),
            extra_headers: vec![("encoding".into(), "ISO-8859-1".into())],
            message: "merge\n".into(),
        };
        let mut buf = Vec::new();
        commit.write_to(&mut buf).unwrap();
        let parsed = CommitRef::from_bytes(&buf).unwrap();
        assert_eq!(parsed.parents.len(), 2);
        assert_eq!(parsed.extra_headers, vec![("encoding".as_bytes().as_bstr(), std::borrow::Cow::Borrowed("ISO-8859-1".as_bytes().as_bstr()))]);
    }

    #[test]
    fn rejects_missing_tree_header() {
        assert_eq!(CommitRef::from_bytes(b"author x <y@z> 1 +0000\n"), Err(Error::MissingTree));
    }
}
