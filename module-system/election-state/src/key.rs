//! Composite keys.
//!
//! A composite key is a sequence of string parts framed into a single byte
//! string. Every part is written as a big-endian `u32` length followed by the
//! part's bytes, so the encoding is unambiguous whatever the parts contain and
//! the encoding of the first `n` parts of a key is a prefix of the key itself.
//! Two encodings of different part lists never share that relationship unless
//! one list is a prefix of the other, which is what makes prefix scans over a
//! partial key exact.

use byteorder::{BigEndian, ByteOrder};
use thiserror::Error;

const LEN_BYTES: usize = 4;

/// Types that can be split into the string parts of a composite key.
pub trait KeyParts {
    /// Returns the parts of the key, outermost first.
    fn key_parts(&self) -> Vec<&str>;
}

impl KeyParts for str {
    fn key_parts(&self) -> Vec<&str> {
        vec![self]
    }
}

impl KeyParts for String {
    fn key_parts(&self) -> Vec<&str> {
        vec![self.as_str()]
    }
}

impl<A: AsRef<str>, B: AsRef<str>> KeyParts for (A, B) {
    fn key_parts(&self) -> Vec<&str> {
        vec![self.0.as_ref(), self.1.as_ref()]
    }
}

impl<T: AsRef<str>> KeyParts for [T] {
    fn key_parts(&self) -> Vec<&str> {
        self.iter().map(AsRef::as_ref).collect()
    }
}

/// Errors raised while encoding or decoding a composite key.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum KeyError {
    /// A part contains a control byte (`0x00..=0x1f` or `0x7f`).
    #[error("key part {index} contains the reserved byte 0x{byte:02x}")]
    InvalidKeyPart {
        /// Position of the offending part.
        index: usize,
        /// The offending byte.
        byte: u8,
    },
    /// A part does not fit in the length prefix.
    #[error("key part {index} is too long")]
    KeyPartTooLong {
        /// Position of the offending part.
        index: usize,
    },
    /// The bytes are not a valid composite key.
    #[error("malformed composite key: {0}")]
    Malformed(&'static str),
}

/// Encodes and decodes composite keys.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CompositeKeyCodec;

impl CompositeKeyCodec {
    /// Encodes all parts of `key`.
    pub fn encode<K: KeyParts + ?Sized>(&self, key: &K) -> Result<Vec<u8>, KeyError> {
        let parts = key.key_parts();
        let mut encoded = Vec::with_capacity(parts.iter().map(|p| p.len() + LEN_BYTES).sum());

        for (index, part) in parts.into_iter().enumerate() {
            validate_part(index, part)?;
            let len = u32::try_from(part.len()).map_err(|_| KeyError::KeyPartTooLong { index })?;

            let mut len_bytes = [0u8; LEN_BYTES];
            BigEndian::write_u32(&mut len_bytes, len);
            encoded.extend_from_slice(&len_bytes);
            encoded.extend_from_slice(part.as_bytes());
        }

        Ok(encoded)
    }

    /// Encodes the leading parts of a key for a prefix scan.
    ///
    /// The result is a prefix of the encoding of every key that starts with
    /// exactly these parts, and of no other key.
    pub fn prefix<K: KeyParts + ?Sized>(&self, partial_key: &K) -> Result<Vec<u8>, KeyError> {
        self.encode(partial_key)
    }

    /// Splits an encoded key back into its parts.
    pub fn decode(&self, mut bytes: &[u8]) -> Result<Vec<String>, KeyError> {
        let mut parts = Vec::new();

        while !bytes.is_empty() {
            if bytes.len() < LEN_BYTES {
                return Err(KeyError::Malformed("truncated length prefix"));
            }
            let len = BigEndian::read_u32(&bytes[..LEN_BYTES]) as usize;
            bytes = &bytes[LEN_BYTES..];

            if bytes.len() < len {
                return Err(KeyError::Malformed("truncated key part"));
            }
            let part = std::str::from_utf8(&bytes[..len])
                .map_err(|_| KeyError::Malformed("key part is not valid UTF-8"))?;
            validate_part(parts.len(), part)?;

            parts.push(part.to_owned());
            bytes = &bytes[len..];
        }

        Ok(parts)
    }
}

fn validate_part(index: usize, part: &str) -> Result<(), KeyError> {
    match part.bytes().find(|b| b.is_ascii_control()) {
        Some(byte) => Err(KeyError::InvalidKeyPart { index, byte }),
        None => Ok(()),
    }
}
