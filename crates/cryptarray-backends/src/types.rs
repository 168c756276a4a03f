//! Opaque handle types exchanged across the backend boundary
//!
//! The core never inspects payloads or key material; it only moves these
//! handles between calls. All handles are backend-issued and only meaningful
//! to the backend that produced them.

use std::fmt;

/// Handle to one backend payload (a ciphertext or an encoded plaintext).
///
/// A payload encodes exactly one SIMD slot vector of `total_slots` reals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PayloadHandle(pub u64);

impl PayloadHandle {
    /// Create a new payload handle
    pub const fn new(id: u64) -> Self {
        PayloadHandle(id)
    }

    /// Get the internal ID
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PayloadHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "payload{}", self.0)
    }
}

/// Handle to backend-held rotation/evaluation key material.
///
/// Each key handle is produced by exactly one of the `gen_*` calls on
/// [`FheBackend`](crate::FheBackend) and is only accepted by the matching
/// `eval_*` call; presenting it elsewhere is a
/// [`KeyMismatch`](crate::BackendError::KeyMismatch) error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyHandle(pub u64);

impl KeyHandle {
    /// Create a new key handle
    pub const fn new(id: u64) -> Self {
        KeyHandle(id)
    }

    /// Get the internal ID
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for KeyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "key{}", self.0)
    }
}

/// Handle to a backend public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKeyHandle(pub u64);

impl PublicKeyHandle {
    pub const fn new(id: u64) -> Self {
        PublicKeyHandle(id)
    }

    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PublicKeyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pk{}", self.0)
    }
}

/// Handle to a backend secret key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SecretKeyHandle(pub u64);

impl SecretKeyHandle {
    pub const fn new(id: u64) -> Self {
        SecretKeyHandle(id)
    }

    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SecretKeyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sk{}", self.0)
    }
}

/// A public/secret key pair as issued by [`FheBackend::key_gen`](crate::FheBackend::key_gen).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPair {
    pub public: PublicKeyHandle,
    pub secret: SecretKeyHandle,
}

/// Matrix-vector product style.
///
/// Names follow the packing of (matrix, vector, result):
/// `Crc` multiplies a row-major matrix by a column-major vector,
/// `Rcr` multiplies a column-major matrix by a row-major vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatVecStyle {
    /// Matrix row-major, vector column-major (tiled).
    Crc,
    /// Matrix column-major, vector row-major.
    Rcr,
}

impl fmt::Display for MatVecStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatVecStyle::Crc => write!(f, "CRC"),
            MatVecStyle::Rcr => write!(f, "RCR"),
        }
    }
}
