//! Keys
//!
//! The closed set of fixed-width key variants an index can hold. Ordering,
//! text encoding (index file) and binary encoding (index cache) live here;
//! everything else is written against [`Key`] without per-variant logic.

use std::fmt;
use std::io::{self, Write};

use bytes::{Buf, BufMut};
use thiserror::Error;

/// Width of a token key in bytes
pub const TOKEN_LEN: usize = 32;

/// A lookup key
///
/// The derived ordering compares `Int` keys numerically and `Token` keys
/// lexicographically over all 32 bytes; trailing zero bytes are significant.
/// Across variants every `Int` sorts before every `Token`, which keeps the
/// order total even though an index only ever holds one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Int(i32),
    Token([u8; TOKEN_LEN]),
}

/// Which variant of [`Key`] an index holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyKind {
    #[default]
    Int,
    Token,
}

/// Failure to turn text or bytes into a key
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseKeyError {
    #[error("invalid numeric key {0:?}")]
    InvalidInt(String),

    #[error("token key must be 32 bytes, got {0}")]
    TokenLength(usize),
}

impl KeyKind {
    /// Tag used in cache file names
    pub fn tag(self) -> &'static str {
        match self {
            KeyKind::Int => "i32",
            KeyKind::Token => "token32",
        }
    }

    /// Tag byte stored in the cache header
    pub(crate) fn code(self) -> u8 {
        match self {
            KeyKind::Int => 1,
            KeyKind::Token => 2,
        }
    }

    /// Width of the binary encoding
    pub fn encoded_len(self) -> usize {
        match self {
            KeyKind::Int => 4,
            KeyKind::Token => TOKEN_LEN,
        }
    }
}

impl Key {
    /// Build a token key, zero-padding inputs shorter than 32 bytes
    pub fn token(bytes: &[u8]) -> Result<Key, ParseKeyError> {
        if bytes.len() > TOKEN_LEN {
            return Err(ParseKeyError::TokenLength(bytes.len()));
        }
        let mut token = [0u8; TOKEN_LEN];
        token[..bytes.len()].copy_from_slice(bytes);
        Ok(Key::Token(token))
    }

    pub fn kind(&self) -> KeyKind {
        match self {
            Key::Int(_) => KeyKind::Int,
            Key::Token(_) => KeyKind::Token,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Key::Int(v) => Some(*v),
            Key::Token(_) => None,
        }
    }

    pub fn as_token(&self) -> Option<&[u8; TOKEN_LEN]> {
        match self {
            Key::Int(_) => None,
            Key::Token(t) => Some(t),
        }
    }

    // =========================================================================
    // Text Encoding (index file)
    // =========================================================================

    /// Write the key as it appears in the first field of an index line
    pub fn write_text<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match self {
            Key::Int(v) => write!(out, "{}", v),
            Key::Token(t) => out.write_all(t),
        }
    }

    /// Parse the first field of an index line
    ///
    /// Numeric keys also accept values in `2^31..2^32`, reinterpreted as the
    /// two's-complement `i32`, for indexes that store keys as unsigned text.
    pub fn parse_text(field: &[u8], kind: KeyKind) -> Result<Key, ParseKeyError> {
        match kind {
            KeyKind::Int => {
                let invalid = || ParseKeyError::InvalidInt(String::from_utf8_lossy(field).into_owned());
                let text = std::str::from_utf8(field).map_err(|_| invalid())?;
                if let Ok(v) = text.parse::<i32>() {
                    return Ok(Key::Int(v));
                }
                text.parse::<u32>()
                    .map(|v| Key::Int(v as i32))
                    .map_err(|_| invalid())
            }
            KeyKind::Token => {
                let token: [u8; TOKEN_LEN] = field
                    .try_into()
                    .map_err(|_| ParseKeyError::TokenLength(field.len()))?;
                Ok(Key::Token(token))
            }
        }
    }

    // =========================================================================
    // Binary Encoding (index cache)
    // =========================================================================

    /// Append the fixed-width little-endian encoding
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        match self {
            Key::Int(v) => buf.put_i32_le(*v),
            Key::Token(t) => buf.put_slice(t),
        }
    }

    /// Read a key of `kind` from the front of `buf`
    ///
    /// `buf` must hold at least `kind.encoded_len()` bytes.
    pub fn decode<B: Buf>(kind: KeyKind, buf: &mut B) -> Key {
        match kind {
            KeyKind::Int => Key::Int(buf.get_i32_le()),
            KeyKind::Token => {
                let mut token = [0u8; TOKEN_LEN];
                buf.copy_to_slice(&mut token);
                Key::Token(token)
            }
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(v) => write!(f, "{}", v),
            Key::Token(t) => {
                let end = t.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
                write!(f, "{}", String::from_utf8_lossy(&t[..end]))
            }
        }
    }
}

impl From<i32> for Key {
    fn from(v: i32) -> Self {
        Key::Int(v)
    }
}

impl From<[u8; TOKEN_LEN]> for Key {
    fn from(t: [u8; TOKEN_LEN]) -> Self {
        Key::Token(t)
    }
}
