//! Crypto context: backend ownership and tensor construction
//!
//! [`CryptoContext`] owns the homomorphic backend behind an
//! `Arc<RwLock<Box<dyn FheBackend>>>` and exposes the construction and
//! decryption entry points. Operations themselves live in [`crate::ops`] as
//! free functions taking the context.

use std::sync::Arc;

use parking_lot::RwLock;

use cryptarray_backends::{
    ClearBackend, FheBackend, KeyHandle, KeyPair, MatVecStyle, PayloadHandle, PublicKeyHandle,
    SecretKeyHandle,
};

use crate::codec;
use crate::error::{Error, Result};
use crate::keys::{self, Axis, Capability};
use crate::layout::{self, EncodingOrder, LogicalShape, PackMode};
use crate::tensor::{DataKind, TensorHandle};

/// Packing choices for a construction entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackOptions {
    pub order: EncodingOrder,
    pub mode: PackMode,
    /// Explicit block-size override, e.g. to align a vector's padded row
    /// length with a matrix's row count for a matrix-vector product.
    pub target_block: Option<usize>,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            order: EncodingOrder::RowMajor,
            mode: PackMode::ZeroPad,
            target_block: None,
        }
    }
}

impl PackOptions {
    pub fn with_order(order: EncodingOrder) -> Self {
        Self { order, ..Self::default() }
    }

    pub fn order(mut self, order: EncodingOrder) -> Self {
        self.order = order;
        self
    }

    pub fn mode(mut self, mode: PackMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn target_block(mut self, block: usize) -> Self {
        self.target_block = Some(block);
        self
    }
}

/// Owns the backend and hands out packed tensors.
pub struct CryptoContext {
    pub(crate) backend: Arc<RwLock<Box<dyn FheBackend + Send + Sync>>>,
    total_slots: usize,
}

impl CryptoContext {
    /// Wrap an already constructed backend.
    pub fn new(backend: Box<dyn FheBackend + Send + Sync>) -> Self {
        let total_slots = backend.total_slots();
        Self {
            backend: Arc::new(RwLock::new(backend)),
            total_slots,
        }
    }

    /// Convenience constructor over the plaintext reference backend.
    pub fn with_clear_backend(total_slots: usize) -> Result<Self> {
        let backend = ClearBackend::new(total_slots)?;
        Ok(Self::new(Box::new(backend)))
    }

    /// Slot count of every payload under this context.
    pub fn total_slots(&self) -> usize {
        self.total_slots
    }

    /// Generate a fresh backend key pair.
    pub fn key_gen(&self) -> Result<KeyPair> {
        Ok(self.backend.write().key_gen()?)
    }

    // ============================================================================================
    // Construction and decryption entry points
    // ============================================================================================

    /// Encrypt a 2-D array given as a row-major element slice.
    #[tracing::instrument(skip(self, values, public_key))]
    pub fn encrypt_matrix(
        &self,
        public_key: PublicKeyHandle,
        values: &[f64],
        rows: usize,
        cols: usize,
        opts: PackOptions,
    ) -> Result<TensorHandle> {
        self.build(Some(public_key), values, LogicalShape::matrix(rows, cols), opts)
    }

    /// Encrypt a 1-D array.
    pub fn encrypt_vector(
        &self,
        public_key: PublicKeyHandle,
        values: &[f64],
        opts: PackOptions,
    ) -> Result<TensorHandle> {
        self.build(Some(public_key), values, LogicalShape::vector(values.len()), opts)
    }

    /// Encode a 2-D array as an unencrypted plaintext tensor.
    pub fn encode_matrix(
        &self,
        values: &[f64],
        rows: usize,
        cols: usize,
        opts: PackOptions,
    ) -> Result<TensorHandle> {
        self.build(None, values, LogicalShape::matrix(rows, cols), opts)
    }

    /// Encode a 1-D array as an unencrypted plaintext tensor.
    pub fn encode_vector(&self, values: &[f64], opts: PackOptions) -> Result<TensorHandle> {
        self.build(None, values, LogicalShape::vector(values.len()), opts)
    }

    fn build(
        &self,
        public_key: Option<PublicKeyHandle>,
        values: &[f64],
        shape: LogicalShape,
        opts: PackOptions,
    ) -> Result<TensorHandle> {
        let layout = layout::resolve(shape, self.total_slots, opts.target_block, opts.order, opts.mode)?;
        let slots = codec::pack(values, shape, opts.order, opts.mode, &layout)?;
        let mut backend = self.backend.write();
        let (payload, kind) = match public_key {
            Some(pk) => (backend.encrypt(pk, &slots)?, DataKind::Ciphertext),
            None => (backend.encode(&slots)?, DataKind::Plaintext),
        };
        tracing::debug!(%payload, %shape, block_size = layout.block_size, %kind, "packed tensor");
        Ok(TensorHandle::new(payload, kind, shape, opts.order, opts.mode, layout))
    }

    pub(crate) fn decrypt_slots(
        &self,
        payload: PayloadHandle,
        secret_key: SecretKeyHandle,
    ) -> Result<Vec<f64>> {
        Ok(self.backend.write().decrypt(payload, secret_key)?)
    }

    /// Release a tensor's backend payload. The handle must not be used
    /// afterwards.
    pub fn release(&self, tensor: &TensorHandle) -> Result<()> {
        Ok(self.backend.write().release(tensor.payload())?)
    }

    // ============================================================================================
    // Rotation-key generation
    // ============================================================================================

    /// Generate backend key material for one capability.
    pub fn generate(&self, secret_key: SecretKeyHandle, capability: Capability) -> Result<KeyHandle> {
        let mut backend = self.backend.write();
        let handle = match capability {
            Capability::RowKey { ncols, batch_size } => {
                backend.gen_row_sum_key(secret_key, ncols, batch_size)?
            }
            Capability::ColKey { ncols } => backend.gen_col_sum_key(secret_key, ncols)?,
            Capability::AccumulateRows { ncols } => {
                backend.gen_accumulate_rows_key(secret_key, ncols)?
            }
            Capability::AccumulateCols { ncols } => {
                backend.gen_accumulate_cols_key(secret_key, ncols)?
            }
            Capability::TransposeKeys { block_size } => {
                backend.gen_transpose_key(secret_key, block_size)?
            }
            Capability::MatmulKeys { ncols } => backend.gen_matmul_key(secret_key, ncols)?,
            Capability::SumKey { .. } => backend.gen_sum_key(secret_key)?,
        };
        tracing::debug!(%capability, %handle, "generated rotation key");
        Ok(handle)
    }

    fn generate_into(
        &self,
        secret_key: SecretKeyHandle,
        tensor: &mut TensorHandle,
        capability: Capability,
    ) -> Result<()> {
        let handle = self.generate(secret_key, capability)?;
        tensor.keys_mut().insert(capability, handle);
        Ok(())
    }

    /// Generate and cache the key a sum or mean over `axis` will need.
    /// `None` covers the no-axis total reduction.
    pub fn gen_reduction_key(
        &self,
        secret_key: SecretKeyHandle,
        tensor: &mut TensorHandle,
        axis: Option<Axis>,
    ) -> Result<()> {
        let capability = match axis {
            None => keys::total_reduction(tensor.batch_size()),
            Some(axis) => keys::reduction(tensor.order(), axis, tensor.ncols(), tensor.batch_size()),
        };
        self.generate_into(secret_key, tensor, capability)
    }

    /// Generate and cache the key a cumulative sum over `axis` will need.
    pub fn gen_cumulative_key(
        &self,
        secret_key: SecretKeyHandle,
        tensor: &mut TensorHandle,
        axis: Axis,
    ) -> Result<()> {
        let capability = keys::cumulative(tensor.order(), axis, tensor.ncols());
        self.generate_into(secret_key, tensor, capability)
    }

    /// Generate and cache the transpose key for this tensor's block size.
    pub fn gen_transpose_key(
        &self,
        secret_key: SecretKeyHandle,
        tensor: &mut TensorHandle,
    ) -> Result<()> {
        let capability = keys::transpose(tensor.ncols());
        self.generate_into(secret_key, tensor, capability)
    }

    /// Generate and cache the square matrix-product key.
    pub fn gen_matmul_key(
        &self,
        secret_key: SecretKeyHandle,
        tensor: &mut TensorHandle,
    ) -> Result<()> {
        let capability = keys::square_matmul(tensor.ncols());
        self.generate_into(secret_key, tensor, capability)
    }

    /// Generate and cache the reduction key a matrix-vector product in the
    /// given style needs on the matrix operand.
    pub fn gen_matvec_key(
        &self,
        secret_key: SecretKeyHandle,
        matrix: &mut TensorHandle,
        style: MatVecStyle,
    ) -> Result<()> {
        let capability = match style {
            MatVecStyle::Crc => Capability::ColKey { ncols: matrix.ncols() },
            MatVecStyle::Rcr => Capability::RowKey {
                ncols: matrix.nrows(),
                batch_size: matrix.batch_size(),
            },
        };
        self.generate_into(secret_key, matrix, capability)
    }
}

impl CryptoContext {
    pub(crate) fn check_batch(&self, tensor: &TensorHandle) -> Result<()> {
        if tensor.batch_size() != self.total_slots {
            return Err(Error::ShapeMismatch(format!(
                "tensor batch size {} does not match context slot count {}",
                tensor.batch_size(),
                self.total_slots
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::UnpackForm;

    #[test]
    fn test_encrypt_decrypt_matrix() -> Result<()> {
        let ctx = CryptoContext::with_clear_backend(16)?;
        let pair = ctx.key_gen()?;
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let tensor = ctx.encrypt_matrix(pair.public, &values, 2, 3, PackOptions::default())?;
        assert_eq!(tensor.ncols(), 4);
        let got = tensor.decrypt(&ctx, pair.secret, UnpackForm::OriginalShape)?;
        assert_eq!(got, values);
        Ok(())
    }

    #[test]
    fn test_encode_plaintext_vector() -> Result<()> {
        let ctx = CryptoContext::with_clear_backend(8)?;
        let pair = ctx.key_gen()?;
        let tensor = ctx.encode_vector(
            &[1.0, 2.0, 3.0],
            PackOptions::with_order(EncodingOrder::ColMajor),
        )?;
        assert_eq!(tensor.kind(), DataKind::Plaintext);
        let got = tensor.decrypt(&ctx, pair.secret, UnpackForm::OriginalShape)?;
        assert_eq!(got, vec![1.0, 2.0, 3.0]);
        Ok(())
    }

    #[test]
    fn test_reduction_key_lands_in_cache() -> Result<()> {
        let ctx = CryptoContext::with_clear_backend(16)?;
        let pair = ctx.key_gen()?;
        let values = [0.0; 9];
        let mut tensor = ctx.encrypt_matrix(pair.public, &values, 3, 3, PackOptions::default())?;
        assert!(tensor.keys().is_empty());
        ctx.gen_reduction_key(pair.secret, &mut tensor, Some(Axis::Rows))?;
        assert!(tensor
            .keys()
            .contains(Capability::RowKey { ncols: 4, batch_size: 16 }));
        Ok(())
    }
}
