//! Textbook RSA signatures.
//!
//! The message is hashed, the digest is read as a big-endian number `h` and the
//! signature is `h^d mod n`. Verification raises the signature to `e` and
//! compares the result with `h`. There is no padding, so signing is
//! deterministic and the scheme is only fit for learning purposes.
//!
//! A key whose modulus is not larger than the digest can still sign, but its
//! signatures never verify: `s^e mod n` is always below `n` while `h` is not.
//!
//! # Usage
//! ```
//! use rsa_sig::{rsa::generate_rsa_pair, sign};
//!
//! let (public, private) = generate_rsa_pair(1024).unwrap();
//!
//! let signature = sign::sign(b"attack at dawn", &private);
//!
//! assert!(sign::verify(Some(&signature), b"attack at dawn", &public));
//! assert!(!sign::verify(Some(&signature), b"attack at dusk", &public));
//! assert!(!sign::verify(None, b"attack at dawn", &public));
//! ```
use std::fmt;

use num_bigint::BigUint;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::rsa::{RsaPrivate, RsaPublic};

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("signature is not valid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature(BigUint);

impl Signature {
    pub fn new(value: BigUint) -> Self {
        Self(value)
    }

    /// Get a reference to the signature's value.
    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    /// Big-endian bytes without leading zeroes
    pub fn to_bytes_be(&self) -> Vec<u8> {
        self.0.to_bytes_be()
    }

    pub fn from_bytes_be(bytes: &[u8]) -> Self {
        Self(BigUint::from_bytes_be(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes_be())
    }

    pub fn from_hex(s: &str) -> Result<Self, SignatureError> {
        let bytes = hex::decode(s)?;
        Ok(Self::from_bytes_be(&bytes))
    }
}

impl From<BigUint> for Signature {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Hashes the message with `D` and reads the digest as a big-endian number
pub fn hash_message<D: Digest>(message: &[u8]) -> BigUint {
    BigUint::from_bytes_be(&D::digest(message))
}

/// Signs `message` hashed with SHA-256
pub fn sign(message: &[u8], key: &RsaPrivate) -> Signature {
    sign_with::<Sha256>(message, key)
}

/// h(m)^d mod n
pub fn sign_with<D: Digest>(message: &[u8], key: &RsaPrivate) -> Signature {
    let hashed = hash_message::<D>(message);
    Signature(key.sign_raw(&hashed))
}

/// Checks that `signature` was made over `message` (hashed with SHA-256) by the
/// owner of `key`. A missing signature is never valid.
pub fn verify(signature: Option<&Signature>, message: &[u8], key: &RsaPublic) -> bool {
    verify_with::<Sha256>(signature, message, key)
}

/// s^e mod n = h(m)
pub fn verify_with<D: Digest>(
    signature: Option<&Signature>,
    message: &[u8],
    key: &RsaPublic,
) -> bool {
    let Some(signature) = signature else {
        return false;
    };
    let hashed = hash_message::<D>(message);
    key.verify_raw(&signature.0) == hashed
}
