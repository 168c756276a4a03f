//! # cryptarray-core - Encrypted tensor packing and dispatch
//!
//! Treat encrypted or plaintext numeric arrays as tensors and run
//! array-style operations (elementwise arithmetic, reductions, cumulative
//! sums, transpose, matrix and matrix-vector products) on data packed into
//! the fixed-width SIMD slot vectors of a leveled homomorphic-encryption
//! backend.
//!
//! ## Architecture
//!
//! Four layers, leaves first:
//!
//! 1. [`layout`] resolves how a logical array maps onto a power-of-two slot
//!    block inside the scheme's slot budget.
//! 2. [`codec`] is the pure bidirectional mapping between logical
//!    coordinates and flat slot positions.
//! 3. [`tensor`] wraps one backend payload with its packing metadata and a
//!    lazily populated rotation-key cache.
//! 4. [`keys`] and [`ops`] decide, from packing metadata alone, which
//!    backend calls and which rotation keys each operation needs, then
//!    dispatch and re-derive result metadata.
//!
//! The policy in [`keys`] is the load-bearing piece: a wrong key family does
//! not crash, it silently decodes wrong numbers.
//!
//! ## Example
//!
//! ```rust
//! use cryptarray_core::{ops, Axis, CryptoContext, PackOptions, UnpackForm};
//!
//! # fn main() -> cryptarray_core::Result<()> {
//! let mut ctx = CryptoContext::with_clear_backend(16)?;
//! let pair = ctx.key_gen()?;
//!
//! // Pack a 3x3 matrix; the block pads to 4x4.
//! let values: Vec<f64> = (1..=9).map(f64::from).collect();
//! let mut matrix = ctx.encrypt_matrix(pair.public, &values, 3, 3, PackOptions::default())?;
//!
//! // Column sums need the strided rowkey; generate it, then reduce.
//! ctx.gen_reduction_key(pair.secret, &mut matrix, Some(Axis::Rows))?;
//! let sums = ops::sum(&mut ctx, &matrix, Some(Axis::Rows))?;
//!
//! let result = sums.decrypt(&ctx, pair.secret, UnpackForm::OriginalShape)?;
//! assert_eq!(result, vec![12.0, 15.0, 18.0]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! Every operation is a blocking call into the backend; there is no internal
//! scheduling or cancellation. Tensors are immutable apart from the key
//! cache, which is not internally synchronized: concurrent first-use
//! population of the same entry is the caller's responsibility.

pub mod block;
pub mod codec;
pub mod context;
pub mod error;
pub mod keys;
pub mod layout;
pub mod ops;
pub mod tensor;

// Re-export primary types
pub use block::BlockTensor;
pub use codec::UnpackForm;
pub use context::{CryptoContext, PackOptions};
pub use error::{Error, Result};
pub use keys::{Axis, Capability, KeyCache};
pub use layout::{EncodingOrder, LogicalShape, PackMode, SlotLayout};
pub use tensor::{DataKind, TensorHandle};

// The backend boundary, re-exported for callers that construct contexts
// over their own engines.
pub use cryptarray_backends::{
    ClearBackend, FheBackend, KeyHandle, KeyPair, MatVecStyle, PayloadHandle, PublicKeyHandle,
    SecretKeyHandle,
};
