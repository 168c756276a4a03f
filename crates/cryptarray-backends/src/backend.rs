//! Backend trait for homomorphic slot-vector evaluation
//!
//! This trait is the boundary between cryptarray's packing/dispatch layer and
//! a leveled homomorphic-encryption engine. Every call is opaque: the core
//! hands over flat slot vectors and handles, and never inspects ciphertexts,
//! key material, or scheme parameters.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    FheBackend Trait                      │
//! │  - encode / encrypt / decrypt                            │
//! │  - eval_add / eval_sub / eval_mul (+ scalar)             │
//! │  - gen_* rotation-key calls (one per capability)         │
//! │  - eval_* keyed data-movement calls                      │
//! └─────────────────────┬───────────────────────────────────┘
//!                       │
//!         ┌─────────────┼──────────────┐
//!         ▼             ▼              ▼
//!   ┌───────────┐ ┌───────────┐ ┌────────────┐
//!   │   Clear   │ │   CKKS    │ │    BGV     │
//!   │ (testing) │ │  engine   │ │   engine   │
//!   └───────────┘ └───────────┘ └────────────┘
//! ```
//!
//! # Key discipline
//!
//! Each data-movement evaluation (strided sums, prefix sums, transpose, block
//! matrix product) requires key material generated by the matching `gen_*`
//! call with the same parameters. Backends must reject a [`KeyHandle`]
//! presented to the wrong evaluation call or generated with different
//! parameters; silently accepting one would yield numerically wrong slots,
//! not an error.
//!
//! # Execution model
//!
//! All calls are blocking and synchronous. The backend owns all cryptographic
//! state; callers hold handles only, and dropping a handle without calling
//! [`FheBackend::release`] leaves the payload alive until the backend itself
//! is dropped.

use crate::error::Result;
use crate::types::{KeyHandle, KeyPair, MatVecStyle, PayloadHandle, PublicKeyHandle, SecretKeyHandle};

/// Slot-vector evaluation engine.
///
/// Implementations must be deterministic with respect to slot arithmetic up to
/// the scheme's approximation error; cryptarray's dispatcher relies on the
/// documented slot semantics of each `eval_*` call.
pub trait FheBackend {
    /// Number of SIMD slots in every payload (fixed by the scheme, power of two).
    fn total_slots(&self) -> usize;

    /// Generate a fresh public/secret key pair.
    fn key_gen(&mut self) -> Result<KeyPair>;

    // ============================================================================================
    // Encode / encrypt / decrypt
    // ============================================================================================

    /// Encode a slot vector as an unencrypted plaintext payload.
    ///
    /// `values.len()` must equal [`total_slots`](Self::total_slots).
    fn encode(&mut self, values: &[f64]) -> Result<PayloadHandle>;

    /// Encrypt a slot vector under `public_key`.
    ///
    /// `values.len()` must equal [`total_slots`](Self::total_slots).
    fn encrypt(&mut self, public_key: PublicKeyHandle, values: &[f64]) -> Result<PayloadHandle>;

    /// Decrypt (or decode) a payload back to its flat slot vector.
    fn decrypt(&mut self, payload: PayloadHandle, secret_key: SecretKeyHandle) -> Result<Vec<f64>>;

    /// Release a payload's backend resources.
    fn release(&mut self, payload: PayloadHandle) -> Result<()>;

    // ============================================================================================
    // Elementwise arithmetic
    // ============================================================================================

    /// Slotwise addition: `out[k] = a[k] + b[k]`.
    fn eval_add(&mut self, a: PayloadHandle, b: PayloadHandle) -> Result<PayloadHandle>;

    /// Slotwise subtraction: `out[k] = a[k] - b[k]`.
    fn eval_sub(&mut self, a: PayloadHandle, b: PayloadHandle) -> Result<PayloadHandle>;

    /// Slotwise multiplication: `out[k] = a[k] * b[k]`.
    fn eval_mul(&mut self, a: PayloadHandle, b: PayloadHandle) -> Result<PayloadHandle>;

    /// Scalar multiplication: `out[k] = a[k] * scalar`.
    fn eval_mul_scalar(&mut self, a: PayloadHandle, scalar: f64) -> Result<PayloadHandle>;

    // ============================================================================================
    // Rotation-key generation (one call per capability)
    // ============================================================================================

    /// Keys for summing with stride `ncols` across a `batch_size`-slot range.
    fn gen_row_sum_key(
        &mut self,
        secret_key: SecretKeyHandle,
        ncols: usize,
        batch_size: usize,
    ) -> Result<KeyHandle>;

    /// Keys for summing each contiguous `ncols`-slot block.
    fn gen_col_sum_key(&mut self, secret_key: SecretKeyHandle, ncols: usize) -> Result<KeyHandle>;

    /// Keys for prefix sums with stride `ncols` (accumulating rows).
    fn gen_accumulate_rows_key(&mut self, secret_key: SecretKeyHandle, ncols: usize) -> Result<KeyHandle>;

    /// Keys for prefix sums within each `ncols`-slot block (accumulating columns).
    fn gen_accumulate_cols_key(&mut self, secret_key: SecretKeyHandle, ncols: usize) -> Result<KeyHandle>;

    /// Keys for transposing a `block_size × block_size` slot block.
    fn gen_transpose_key(&mut self, secret_key: SecretKeyHandle, block_size: usize) -> Result<KeyHandle>;

    /// Keys for the square matrix product over `ncols × ncols` slot blocks.
    fn gen_matmul_key(&mut self, secret_key: SecretKeyHandle, ncols: usize) -> Result<KeyHandle>;

    /// Keys for the all-slot total sum.
    fn gen_sum_key(&mut self, secret_key: SecretKeyHandle) -> Result<KeyHandle>;

    // ============================================================================================
    // Keyed data-movement evaluation
    // ============================================================================================

    /// Strided sum: `out[k] = Σ_t in[(k + t·ncols) mod batch_size]`
    /// for `t in 0..batch_size/ncols`, using keys from
    /// [`gen_row_sum_key`](Self::gen_row_sum_key).
    fn eval_row_sum(&mut self, payload: PayloadHandle, key: KeyHandle) -> Result<PayloadHandle>;

    /// Block sum: every slot of each `ncols`-slot block becomes that block's
    /// sum, using keys from [`gen_col_sum_key`](Self::gen_col_sum_key).
    fn eval_col_sum(&mut self, payload: PayloadHandle, key: KeyHandle) -> Result<PayloadHandle>;

    /// Strided prefix sum: `out[k] = in[k] + out[k - ncols]`, using keys from
    /// [`gen_accumulate_rows_key`](Self::gen_accumulate_rows_key).
    fn eval_cumsum_rows(&mut self, payload: PayloadHandle, key: KeyHandle) -> Result<PayloadHandle>;

    /// In-block prefix sum along each `ncols`-slot block, using keys from
    /// [`gen_accumulate_cols_key`](Self::gen_accumulate_cols_key).
    fn eval_cumsum_cols(&mut self, payload: PayloadHandle, key: KeyHandle) -> Result<PayloadHandle>;

    /// Re-encode the payload for the flipped encoding order, using keys from
    /// [`gen_transpose_key`](Self::gen_transpose_key).
    ///
    /// The caller flips its recorded row/column order together with this
    /// call; the two sides compose to a logical transpose.
    fn eval_transpose(&mut self, payload: PayloadHandle, key: KeyHandle) -> Result<PayloadHandle>;

    /// Square matrix product over each `ncols × ncols` row-major slot block,
    /// using keys from [`gen_matmul_key`](Self::gen_matmul_key).
    fn eval_square_matmul(
        &mut self,
        a: PayloadHandle,
        b: PayloadHandle,
        key: KeyHandle,
    ) -> Result<PayloadHandle>;

    /// Matrix-vector product in the given style: slotwise multiply then the
    /// style's reduction (block sum for [`MatVecStyle::Crc`], strided sum for
    /// [`MatVecStyle::Rcr`]). The key must match the style's reduction.
    fn eval_mat_vec(
        &mut self,
        matrix: PayloadHandle,
        vector: PayloadHandle,
        key: KeyHandle,
        style: MatVecStyle,
    ) -> Result<PayloadHandle>;

    /// Total sum: every slot becomes the sum of all slots, using keys from
    /// [`gen_sum_key`](Self::gen_sum_key).
    fn eval_total_sum(&mut self, payload: PayloadHandle, key: KeyHandle) -> Result<PayloadHandle>;
}
