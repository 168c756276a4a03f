//! Backend implementations for cryptarray homomorphic evaluation
//!
//! This crate provides:
//! - **Backend Trait**: Pluggable homomorphic-evaluation interface
//! - **Clear Backend**: Plaintext reference implementation for testing
//! - **Handle Types**: Opaque payload and key handles
//!
//! # Usage
//!
//! ```rust
//! use cryptarray_backends::{ClearBackend, FheBackend};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Create a clear backend with 8 SIMD slots
//! let mut backend = ClearBackend::new(8)?;
//! let pair = backend.key_gen()?;
//!
//! // Encrypt a slot vector and sum within 4-slot blocks
//! let payload = backend.encrypt(pair.public, &[1.0, 2.0, 3.0, 4.0, 0.0, 0.0, 0.0, 0.0])?;
//! let key = backend.gen_col_sum_key(pair.secret, 4)?;
//! let summed = backend.eval_col_sum(payload, key)?;
//!
//! let slots = backend.decrypt(summed, pair.secret)?;
//! assert_eq!(slots[0], 10.0);
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod clear;
pub mod error;
pub mod types;

pub use backend::FheBackend;
pub use clear::ClearBackend;
pub use error::{BackendError, Result};
pub use types::{KeyHandle, KeyPair, MatVecStyle, PayloadHandle, PublicKeyHandle, SecretKeyHandle};
