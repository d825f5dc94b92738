//! Text form of shares.
//!
//! A share string is `IITTAA` followed by one token per secret byte, where `II`
//! is the participant index and `TT` the threshold, both as two uppercase hex
//! digits, and `AA` is a fixed format tag. Each token is the share value in two
//! uppercase hex digits, or `G0` for the field value 256.

use core::fmt;

use crate::constants::{
    FORMAT_MARKER, HEADER_LEN, SENTINEL_TOKEN, SENTINEL_VALUE, TOKEN_LEN, TRANSPORT_TERMINATOR,
};
use crate::error::{Result, SplitError};
use crate::random::EntropyStrength;

/// Length of one share string for a secret of `secret_len` bytes, saturating
/// at `usize::MAX` so an impossible size fails at allocation instead.
pub fn share_len(secret_len: usize) -> usize {
    secret_len.saturating_mul(TOKEN_LEN).saturating_add(HEADER_LEN)
}

pub(crate) fn push_header(out: &mut String, index: usize, threshold: usize) {
    out.push_str(&hex::encode_upper([index as u8]));
    out.push_str(&hex::encode_upper([threshold as u8]));
    out.push_str(FORMAT_MARKER);
}

pub(crate) fn push_token(out: &mut String, value: u32) {
    if value == SENTINEL_VALUE {
        out.push_str(SENTINEL_TOKEN);
    } else {
        debug_assert!(value < SENTINEL_VALUE, "share value {} outside GF(257)", value);
        out.push_str(&hex::encode_upper([value as u8]));
    }
}

/// Concatenates the shares, one per line, into a single NUL-terminated buffer.
///
/// The buffer is exactly `sum(len) + n + 1` bytes long.
///
/// # Examples
///
/// ```rust
/// use shard_split::encoding::serialize;
///
/// let buf = serialize(&["0102AA30", "0202AA31"]).unwrap();
/// assert_eq!(buf, b"0102AA30\n0202AA31\n\0");
/// ```
pub fn serialize<S: AsRef<str>>(shares: &[S]) -> Result<Vec<u8>> {
    let size = shares
        .iter()
        .fold(1usize, |acc, s| acc.saturating_add(s.as_ref().len() + 1));

    let mut buf = Vec::new();
    buf.try_reserve_exact(size)?;
    for share in shares {
        buf.extend_from_slice(share.as_ref().as_bytes());
        buf.push(b'\n');
    }
    buf.push(TRANSPORT_TERMINATOR);

    Ok(buf)
}

/// The complete output of one split: `n` share strings in participant order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareSet {
    threshold: usize,
    shares: Vec<String>,
    entropy: EntropyStrength,
}

impl ShareSet {
    pub(crate) fn new(threshold: usize, shares: Vec<String>, entropy: EntropyStrength) -> Self {
        ShareSet {
            threshold,
            shares,
            entropy,
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn len(&self) -> usize {
        self.shares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    pub fn shares(&self) -> &[String] {
        &self.shares
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.shares.iter()
    }

    /// Strength of the coefficient source at the end of the split. Anything but
    /// `Cryptographic` means the shares must not protect a real secret.
    pub fn entropy(&self) -> EntropyStrength {
        self.entropy
    }

    /// The transport buffer, see [`serialize`].
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serialize(&self.shares)
    }
}

impl fmt::Display for ShareSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for share in &self.shares {
            writeln!(f, "{}", share)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ShareSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.shares.iter()
    }
}

/// A share string broken back into numbers. Decoding stops there; no
/// reconstruction is attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedShare {
    pub index: u8,
    pub threshold: u8,
    pub values: Vec<u32>,
}

fn decode_pair(pair: &str) -> Result<u8> {
    let bytes = hex::decode(pair)
        .map_err(|err| SplitError::MalformedShare(format!("bad hex pair {:?}: {}", pair, err)))?;
    Ok(bytes[0])
}

/// Parses one share string, accepting the `G0` sentinel token.
pub fn parse_share(share: &str) -> Result<ParsedShare> {
    let share = share.trim_end_matches(['\n', '\r']);
    if !share.is_ascii() {
        return Err(SplitError::MalformedShare("non-ASCII share".to_string()));
    }
    if share.len() < HEADER_LEN || (share.len() - HEADER_LEN) % TOKEN_LEN != 0 {
        return Err(SplitError::MalformedShare(format!(
            "unexpected length {}",
            share.len()
        )));
    }
    if &share[4..HEADER_LEN] != FORMAT_MARKER {
        return Err(SplitError::MalformedShare(format!(
            "missing {} marker",
            FORMAT_MARKER
        )));
    }

    let index = decode_pair(&share[0..2])?;
    let threshold = decode_pair(&share[2..4])?;
    if index == 0 || threshold == 0 {
        return Err(SplitError::MalformedShare(
            "index and threshold must be non-zero".to_string(),
        ));
    }

    let body = &share[HEADER_LEN..];
    let mut values = Vec::with_capacity(body.len() / TOKEN_LEN);
    for start in (0..body.len()).step_by(TOKEN_LEN) {
        let token = &body[start..start + TOKEN_LEN];
        if token == SENTINEL_TOKEN {
            values.push(SENTINEL_VALUE);
        } else {
            values.push(decode_pair(token)? as u32);
        }
    }

    Ok(ParsedShare {
        index,
        threshold,
        values,
    })
}
