use std::io;

use bstr::BStr;

/// A single newline, terminating every header line.
pub const NL: &[u8] = b"\n";
const SPACE: &[u8] = b" ";

/// Write `key SP value LF`, assuming `key` is already known to be a valid header token and
/// `value` has already been validated by the caller (hence "trusted").
pub fn trusted_header_field(key: &[u8], value: &[u8], mut out: impl io::Write) -> io::Result<()> {
    out.write_all(key)?;
    out.write_all(SPACE)?;
    out.write_all(value)?;
    out.write_all(NL)
}

/// Write `key SP value LF` where `value` is untrusted and may itself need validation; currently
/// identical to [`trusted_header_field`] since validation happens at the call site before the
/// bytes ever reach here, but kept distinct so a future caller can tell trusted and untrusted
/// writes apart at a glance.
pub fn header_field(key: &[u8], value: &BStr, out: impl io::Write) -> io::Result<()> {
    trusted_header_field(key, value, out)
}

/// Write `key SP <40-hex-id> LF`.
pub fn trusted_header_id(key: &[u8], id: &git_hash::ObjectId, mut out: impl io::Write) -> io::Result<()> {
    out.write_all(key)?;
    out.write_all(SPACE)?;
    let mut hex = [0u8; git_hash::HEX_LEN];
    id.to_hex_into(&mut hex);
    out.write_all(&hex)?;
    out.write_all(NL)
}

/// Write `key SP <signature> LF`, where `<signature>` is a [`git_actor::Signature`] in its
/// `NAME " <" EMAIL "> " EPOCH " " ±HHMM` form.
pub fn trusted_header_signature(key: &[u8], signature: &git_actor::Signature, mut out: impl io::Write) -> io::Result<()> {
    out.write_all(key)?;
    out.write_all(SPACE)?;
    signature.write_to(&mut out)?;
    out.write_all(NL)
}
