//! Clear (plaintext) reference backend
//!
//! Evaluates every backend call directly on `Vec<f64>` slot vectors, with no
//! cryptography. Key handles record the parameters they were generated with
//! and every keyed evaluation checks them, so the key discipline of a real
//! engine is enforced even though no rotation keys exist. This is the backend
//! the test suite runs against.

use std::collections::{HashMap, HashSet};

use crate::backend::FheBackend;
use crate::error::{BackendError, Result};
use crate::types::{KeyHandle, KeyPair, MatVecStyle, PayloadHandle, PublicKeyHandle, SecretKeyHandle};

/// Parameters recorded at key generation, checked at every keyed evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyInfo {
    RowSum { ncols: usize, batch: usize },
    ColSum { ncols: usize },
    CumRows { ncols: usize },
    CumCols { ncols: usize },
    Transpose { block: usize },
    Matmul { ncols: usize },
    Sum,
}

impl KeyInfo {
    fn describe(&self) -> String {
        match self {
            KeyInfo::RowSum { ncols, batch } => format!("row-sum(ncols={ncols}, batch={batch})"),
            KeyInfo::ColSum { ncols } => format!("col-sum(ncols={ncols})"),
            KeyInfo::CumRows { ncols } => format!("cumsum-rows(ncols={ncols})"),
            KeyInfo::CumCols { ncols } => format!("cumsum-cols(ncols={ncols})"),
            KeyInfo::Transpose { block } => format!("transpose(block={block})"),
            KeyInfo::Matmul { ncols } => format!("matmul(ncols={ncols})"),
            KeyInfo::Sum => "total-sum".to_string(),
        }
    }
}

/// Plaintext backend over flat `f64` slot vectors.
///
/// Payloads are stored in a handle map; "encryption" stores the slots as-is
/// but still demands a valid key pair, and decryption demands the matching
/// secret key, so callers exercise the same handle flow a real engine needs.
pub struct ClearBackend {
    slots: usize,
    payloads: HashMap<u64, Vec<f64>>,
    keys: HashMap<u64, KeyInfo>,
    public_keys: HashSet<u64>,
    secret_keys: HashSet<u64>,
    next_payload: u64,
    next_key: u64,
    next_keypair: u64,
}

impl ClearBackend {
    /// Create a backend with the given slot count (must be a power of two).
    pub fn new(total_slots: usize) -> Result<Self> {
        if total_slots == 0 || !total_slots.is_power_of_two() {
            return Err(BackendError::InvalidParameters(format!(
                "total_slots must be a nonzero power of two, got {total_slots}"
            )));
        }
        Ok(Self {
            slots: total_slots,
            payloads: HashMap::new(),
            keys: HashMap::new(),
            public_keys: HashSet::new(),
            secret_keys: HashSet::new(),
            next_payload: 1,
            next_key: 1,
            next_keypair: 1,
        })
    }

    fn store(&mut self, values: Vec<f64>) -> PayloadHandle {
        let handle = PayloadHandle::new(self.next_payload);
        self.next_payload += 1;
        self.payloads.insert(handle.id(), values);
        handle
    }

    fn store_key(&mut self, info: KeyInfo) -> KeyHandle {
        let handle = KeyHandle::new(self.next_key);
        self.next_key += 1;
        self.keys.insert(handle.id(), info);
        handle
    }

    fn slots_of(&self, payload: PayloadHandle) -> Result<&Vec<f64>> {
        self.payloads
            .get(&payload.id())
            .ok_or(BackendError::InvalidPayloadHandle(payload.id()))
    }

    fn key_of(&self, key: KeyHandle) -> Result<KeyInfo> {
        self.keys
            .get(&key.id())
            .copied()
            .ok_or(BackendError::InvalidKeyHandle(key.id()))
    }

    fn check_secret(&self, secret_key: SecretKeyHandle) -> Result<()> {
        if self.secret_keys.contains(&secret_key.id()) {
            Ok(())
        } else {
            Err(BackendError::InvalidSecretKey(secret_key.id()))
        }
    }

    fn check_len(&self, values: &[f64]) -> Result<()> {
        if values.len() != self.slots {
            return Err(BackendError::SlotCountMismatch {
                expected: self.slots,
                actual: values.len(),
            });
        }
        Ok(())
    }

    fn key_mismatch(expected: &str, actual: KeyInfo) -> BackendError {
        BackendError::KeyMismatch {
            expected: expected.to_string(),
            actual: actual.describe(),
        }
    }

    fn binary_op(
        &mut self,
        a: PayloadHandle,
        b: PayloadHandle,
        op: impl Fn(f64, f64) -> f64,
    ) -> Result<PayloadHandle> {
        let lhs = self.slots_of(a)?;
        let rhs = self.slots_of(b)?;
        let out: Vec<f64> = lhs.iter().zip(rhs.iter()).map(|(&x, &y)| op(x, y)).collect();
        Ok(self.store(out))
    }

    /// Strided sum within each `batch`-slot region: every slot gains the
    /// values at offsets `k + t*ncols (mod batch)` from its region.
    fn strided_sum(src: &[f64], ncols: usize, batch: usize) -> Vec<f64> {
        let rotations = batch / ncols;
        let mut out = vec![0.0; src.len()];
        for region in 0..src.len() / batch {
            let base = region * batch;
            for k in 0..batch {
                let mut acc = 0.0;
                for t in 0..rotations {
                    acc += src[base + (k + t * ncols) % batch];
                }
                out[base + k] = acc;
            }
        }
        out
    }

    /// Every slot of each contiguous `ncols`-slot block becomes its block sum.
    fn block_sum(src: &[f64], ncols: usize) -> Vec<f64> {
        let mut out = vec![0.0; src.len()];
        for (block_idx, block) in src.chunks(ncols).enumerate() {
            let total: f64 = block.iter().sum();
            for k in 0..block.len() {
                out[block_idx * ncols + k] = total;
            }
        }
        out
    }
}

impl FheBackend for ClearBackend {
    fn total_slots(&self) -> usize {
        self.slots
    }

    fn key_gen(&mut self) -> Result<KeyPair> {
        let id = self.next_keypair;
        self.next_keypair += 1;
        self.public_keys.insert(id);
        self.secret_keys.insert(id);
        let pair = KeyPair {
            public: PublicKeyHandle::new(id),
            secret: SecretKeyHandle::new(id),
        };
        tracing::debug!(keypair = id, "generated clear key pair");
        Ok(pair)
    }

    fn encode(&mut self, values: &[f64]) -> Result<PayloadHandle> {
        self.check_len(values)?;
        Ok(self.store(values.to_vec()))
    }

    fn encrypt(&mut self, public_key: PublicKeyHandle, values: &[f64]) -> Result<PayloadHandle> {
        if !self.public_keys.contains(&public_key.id()) {
            return Err(BackendError::InvalidPublicKey(public_key.id()));
        }
        self.check_len(values)?;
        let handle = self.store(values.to_vec());
        tracing::debug!(%public_key, %handle, "encrypted payload");
        Ok(handle)
    }

    fn decrypt(&mut self, payload: PayloadHandle, secret_key: SecretKeyHandle) -> Result<Vec<f64>> {
        self.check_secret(secret_key)?;
        Ok(self.slots_of(payload)?.clone())
    }

    fn release(&mut self, payload: PayloadHandle) -> Result<()> {
        self.payloads
            .remove(&payload.id())
            .map(|_| ())
            .ok_or(BackendError::InvalidPayloadHandle(payload.id()))
    }

    fn eval_add(&mut self, a: PayloadHandle, b: PayloadHandle) -> Result<PayloadHandle> {
        self.binary_op(a, b, |x, y| x + y)
    }

    fn eval_sub(&mut self, a: PayloadHandle, b: PayloadHandle) -> Result<PayloadHandle> {
        self.binary_op(a, b, |x, y| x - y)
    }

    fn eval_mul(&mut self, a: PayloadHandle, b: PayloadHandle) -> Result<PayloadHandle> {
        self.binary_op(a, b, |x, y| x * y)
    }

    fn eval_mul_scalar(&mut self, a: PayloadHandle, scalar: f64) -> Result<PayloadHandle> {
        let out: Vec<f64> = self.slots_of(a)?.iter().map(|&x| x * scalar).collect();
        Ok(self.store(out))
    }

    fn gen_row_sum_key(
        &mut self,
        secret_key: SecretKeyHandle,
        ncols: usize,
        batch_size: usize,
    ) -> Result<KeyHandle> {
        self.check_secret(secret_key)?;
        if ncols == 0
            || batch_size == 0
            || batch_size % ncols != 0
            || self.slots % batch_size != 0
        {
            return Err(BackendError::InvalidParameters(format!(
                "row-sum key needs ncols dividing batch_size dividing {}, got ncols={ncols}, batch_size={batch_size}",
                self.slots
            )));
        }
        Ok(self.store_key(KeyInfo::RowSum { ncols, batch: batch_size }))
    }

    fn gen_col_sum_key(&mut self, secret_key: SecretKeyHandle, ncols: usize) -> Result<KeyHandle> {
        self.check_secret(secret_key)?;
        if ncols == 0 || self.slots % ncols != 0 {
            return Err(BackendError::InvalidParameters(format!(
                "col-sum key needs ncols dividing {}, got {ncols}",
                self.slots
            )));
        }
        Ok(self.store_key(KeyInfo::ColSum { ncols }))
    }

    fn gen_accumulate_rows_key(&mut self, secret_key: SecretKeyHandle, ncols: usize) -> Result<KeyHandle> {
        self.check_secret(secret_key)?;
        if ncols == 0 || self.slots % ncols != 0 {
            return Err(BackendError::InvalidParameters(format!(
                "cumsum-rows key needs ncols dividing {}, got {ncols}",
                self.slots
            )));
        }
        Ok(self.store_key(KeyInfo::CumRows { ncols }))
    }

    fn gen_accumulate_cols_key(&mut self, secret_key: SecretKeyHandle, ncols: usize) -> Result<KeyHandle> {
        self.check_secret(secret_key)?;
        if ncols == 0 || self.slots % ncols != 0 {
            return Err(BackendError::InvalidParameters(format!(
                "cumsum-cols key needs ncols dividing {}, got {ncols}",
                self.slots
            )));
        }
        Ok(self.store_key(KeyInfo::CumCols { ncols }))
    }

    fn gen_transpose_key(&mut self, secret_key: SecretKeyHandle, block_size: usize) -> Result<KeyHandle> {
        self.check_secret(secret_key)?;
        if block_size == 0 || self.slots % (block_size * block_size) != 0 {
            return Err(BackendError::InvalidParameters(format!(
                "transpose key needs block_size^2 dividing {}, got block_size={block_size}",
                self.slots
            )));
        }
        Ok(self.store_key(KeyInfo::Transpose { block: block_size }))
    }

    fn gen_matmul_key(&mut self, secret_key: SecretKeyHandle, ncols: usize) -> Result<KeyHandle> {
        self.check_secret(secret_key)?;
        if ncols == 0 || self.slots % (ncols * ncols) != 0 {
            return Err(BackendError::InvalidParameters(format!(
                "matmul key needs ncols^2 dividing {}, got ncols={ncols}",
                self.slots
            )));
        }
        Ok(self.store_key(KeyInfo::Matmul { ncols }))
    }

    fn gen_sum_key(&mut self, secret_key: SecretKeyHandle) -> Result<KeyHandle> {
        self.check_secret(secret_key)?;
        Ok(self.store_key(KeyInfo::Sum))
    }

    fn eval_row_sum(&mut self, payload: PayloadHandle, key: KeyHandle) -> Result<PayloadHandle> {
        let info = self.key_of(key)?;
        let KeyInfo::RowSum { ncols, batch } = info else {
            return Err(Self::key_mismatch("row-sum", info));
        };
        let src = self.slots_of(payload)?;
        let out = Self::strided_sum(src, ncols, batch);
        Ok(self.store(out))
    }

    fn eval_col_sum(&mut self, payload: PayloadHandle, key: KeyHandle) -> Result<PayloadHandle> {
        let info = self.key_of(key)?;
        let KeyInfo::ColSum { ncols } = info else {
            return Err(Self::key_mismatch("col-sum", info));
        };
        let src = self.slots_of(payload)?;
        let out = Self::block_sum(src, ncols);
        Ok(self.store(out))
    }

    fn eval_cumsum_rows(&mut self, payload: PayloadHandle, key: KeyHandle) -> Result<PayloadHandle> {
        let info = self.key_of(key)?;
        let KeyInfo::CumRows { ncols } = info else {
            return Err(Self::key_mismatch("cumsum-rows", info));
        };
        let mut out = self.slots_of(payload)?.clone();
        for k in ncols..out.len() {
            out[k] += out[k - ncols];
        }
        Ok(self.store(out))
    }

    fn eval_cumsum_cols(&mut self, payload: PayloadHandle, key: KeyHandle) -> Result<PayloadHandle> {
        let info = self.key_of(key)?;
        let KeyInfo::CumCols { ncols } = info else {
            return Err(Self::key_mismatch("cumsum-cols", info));
        };
        let mut out = self.slots_of(payload)?.clone();
        for block in out.chunks_mut(ncols) {
            for k in 1..block.len() {
                block[k] += block[k - 1];
            }
        }
        Ok(self.store(out))
    }

    fn eval_transpose(&mut self, payload: PayloadHandle, key: KeyHandle) -> Result<PayloadHandle> {
        let info = self.key_of(key)?;
        let KeyInfo::Transpose { block: _ } = info else {
            return Err(Self::key_mismatch("transpose", info));
        };
        // The row-major slots of a block are exactly the column-major slots of
        // its transpose, so re-encoding for the flipped order moves nothing.
        // The caller flips its recorded order alongside this call.
        let out = self.slots_of(payload)?.clone();
        Ok(self.store(out))
    }

    fn eval_square_matmul(
        &mut self,
        a: PayloadHandle,
        b: PayloadHandle,
        key: KeyHandle,
    ) -> Result<PayloadHandle> {
        let info = self.key_of(key)?;
        let KeyInfo::Matmul { ncols } = info else {
            return Err(Self::key_mismatch("matmul", info));
        };
        let lhs = self.slots_of(a)?.clone();
        let rhs = self.slots_of(b)?.clone();
        let n = ncols;
        let mut out = vec![0.0; self.slots];
        for block_idx in 0..self.slots / (n * n) {
            let base = block_idx * n * n;
            for i in 0..n {
                for j in 0..n {
                    let mut acc = 0.0;
                    for k in 0..n {
                        acc += lhs[base + i * n + k] * rhs[base + k * n + j];
                    }
                    out[base + i * n + j] = acc;
                }
            }
        }
        Ok(self.store(out))
    }

    fn eval_mat_vec(
        &mut self,
        matrix: PayloadHandle,
        vector: PayloadHandle,
        key: KeyHandle,
        style: MatVecStyle,
    ) -> Result<PayloadHandle> {
        let info = self.key_of(key)?;
        let lhs = self.slots_of(matrix)?;
        let rhs = self.slots_of(vector)?;
        let product: Vec<f64> = lhs.iter().zip(rhs.iter()).map(|(&x, &y)| x * y).collect();
        let out = match (style, info) {
            (MatVecStyle::Crc, KeyInfo::ColSum { ncols }) => Self::block_sum(&product, ncols),
            (MatVecStyle::Crc, other) => return Err(Self::key_mismatch("col-sum", other)),
            (MatVecStyle::Rcr, KeyInfo::RowSum { ncols, batch }) => {
                Self::strided_sum(&product, ncols, batch)
            }
            (MatVecStyle::Rcr, other) => return Err(Self::key_mismatch("row-sum", other)),
        };
        tracing::debug!(%style, "evaluated matrix-vector product");
        Ok(self.store(out))
    }

    fn eval_total_sum(&mut self, payload: PayloadHandle, key: KeyHandle) -> Result<PayloadHandle> {
        let info = self.key_of(key)?;
        let KeyInfo::Sum = info else {
            return Err(Self::key_mismatch("total-sum", info));
        };
        let total: f64 = self.slots_of(payload)?.iter().sum();
        Ok(self.store(vec![total; self.slots]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn backend_with_payload(slots: usize, values: &[f64]) -> Result<(ClearBackend, PayloadHandle, KeyPair)> {
        let mut backend = ClearBackend::new(slots)?;
        let pair = backend.key_gen()?;
        let payload = backend.encrypt(pair.public, values)?;
        Ok((backend, payload, pair))
    }

    #[test]
    fn test_encrypt_decrypt_round_trip() -> Result<()> {
        let values: Vec<f64> = (0..16).map(|k| k as f64).collect();
        let (mut backend, payload, pair) = backend_with_payload(16, &values)?;
        let decrypted = backend.decrypt(payload, pair.secret)?;
        assert_eq!(decrypted, values);
        Ok(())
    }

    #[test]
    fn test_slot_count_rejected() -> Result<()> {
        let mut backend = ClearBackend::new(8)?;
        let err = backend.encode(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            BackendError::SlotCountMismatch { expected: 8, actual: 2 }
        ));
        Ok(())
    }

    #[test]
    fn test_non_power_of_two_slots_rejected() {
        assert!(ClearBackend::new(12).is_err());
        assert!(ClearBackend::new(0).is_err());
    }

    #[test]
    fn test_elementwise_arithmetic() -> Result<()> {
        let mut backend = ClearBackend::new(4)?;
        let pair = backend.key_gen()?;
        let a = backend.encrypt(pair.public, &[1.0, 2.0, 3.0, 4.0])?;
        let b = backend.encrypt(pair.public, &[10.0, 20.0, 30.0, 40.0])?;

        let sum = backend.eval_add(a, b)?;
        assert_eq!(backend.decrypt(sum, pair.secret)?, vec![11.0, 22.0, 33.0, 44.0]);

        let diff = backend.eval_sub(b, a)?;
        assert_eq!(backend.decrypt(diff, pair.secret)?, vec![9.0, 18.0, 27.0, 36.0]);

        let prod = backend.eval_mul(a, b)?;
        assert_eq!(backend.decrypt(prod, pair.secret)?, vec![10.0, 40.0, 90.0, 160.0]);

        let scaled = backend.eval_mul_scalar(a, 0.5)?;
        assert_eq!(backend.decrypt(scaled, pair.secret)?, vec![0.5, 1.0, 1.5, 2.0]);
        Ok(())
    }

    #[test]
    fn test_row_sum_is_strided() -> Result<()> {
        // Two logical columns, stride 2 over 8 slots.
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let (mut backend, payload, pair) = backend_with_payload(8, &values)?;
        let key = backend.gen_row_sum_key(pair.secret, 2, 8)?;
        let out = backend.eval_row_sum(payload, key)?;
        let slots = backend.decrypt(out, pair.secret)?;
        // Even slots hold 1+3+5+7, odd slots hold 2+4+6+8.
        assert_eq!(slots, vec![16.0, 20.0, 16.0, 20.0, 16.0, 20.0, 16.0, 20.0]);
        Ok(())
    }

    #[test]
    fn test_col_sum_is_blockwise() -> Result<()> {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let (mut backend, payload, pair) = backend_with_payload(8, &values)?;
        let key = backend.gen_col_sum_key(pair.secret, 4)?;
        let out = backend.eval_col_sum(payload, key)?;
        let slots = backend.decrypt(out, pair.secret)?;
        assert_eq!(slots, vec![10.0, 10.0, 10.0, 10.0, 26.0, 26.0, 26.0, 26.0]);
        Ok(())
    }

    #[test]
    fn test_cumsum_rows_prefix_with_stride() -> Result<()> {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let (mut backend, payload, pair) = backend_with_payload(8, &values)?;
        let key = backend.gen_accumulate_rows_key(pair.secret, 2)?;
        let out = backend.eval_cumsum_rows(payload, key)?;
        let slots = backend.decrypt(out, pair.secret)?;
        assert_eq!(slots, vec![1.0, 2.0, 4.0, 6.0, 9.0, 12.0, 16.0, 20.0]);
        Ok(())
    }

    #[test]
    fn test_cumsum_cols_prefix_within_block() -> Result<()> {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let (mut backend, payload, pair) = backend_with_payload(8, &values)?;
        let key = backend.gen_accumulate_cols_key(pair.secret, 4)?;
        let out = backend.eval_cumsum_cols(payload, key)?;
        let slots = backend.decrypt(out, pair.secret)?;
        assert_eq!(slots, vec![1.0, 3.0, 6.0, 10.0, 5.0, 11.0, 18.0, 26.0]);
        Ok(())
    }

    #[test]
    fn test_square_matmul_per_block() -> Result<()> {
        // [[1,2],[3,4]] * [[5,6],[7,8]] = [[19,22],[43,50]], tiled twice.
        let a_vals = [1.0, 2.0, 3.0, 4.0, 1.0, 2.0, 3.0, 4.0];
        let b_vals = [5.0, 6.0, 7.0, 8.0, 5.0, 6.0, 7.0, 8.0];
        let mut backend = ClearBackend::new(8)?;
        let pair = backend.key_gen()?;
        let a = backend.encrypt(pair.public, &a_vals)?;
        let b = backend.encrypt(pair.public, &b_vals)?;
        let key = backend.gen_matmul_key(pair.secret, 2)?;
        let out = backend.eval_square_matmul(a, b, key)?;
        let slots = backend.decrypt(out, pair.secret)?;
        for (got, want) in slots.iter().zip([19.0, 22.0, 43.0, 50.0, 19.0, 22.0, 43.0, 50.0]) {
            assert_relative_eq!(*got, want);
        }
        Ok(())
    }

    #[test]
    fn test_total_sum_fills_all_slots() -> Result<()> {
        let values = [1.0, 2.0, 3.0, 4.0];
        let (mut backend, payload, pair) = backend_with_payload(4, &values)?;
        let key = backend.gen_sum_key(pair.secret)?;
        let out = backend.eval_total_sum(payload, key)?;
        assert_eq!(backend.decrypt(out, pair.secret)?, vec![10.0; 4]);
        Ok(())
    }

    #[test]
    fn test_row_sum_key_batch_must_divide_slots() -> Result<()> {
        let mut backend = ClearBackend::new(16)?;
        let pair = backend.key_gen()?;
        // A batch that leaves a tail region would silently skip those slots.
        let err = backend.gen_row_sum_key(pair.secret, 2, 6).unwrap_err();
        assert!(matches!(err, BackendError::InvalidParameters(_)));
        let err = backend.gen_row_sum_key(pair.secret, 2, 32).unwrap_err();
        assert!(matches!(err, BackendError::InvalidParameters(_)));

        // A dividing sub-batch sums each region independently.
        let values: Vec<f64> = (0..16).map(|k| k as f64).collect();
        let payload = backend.encrypt(pair.public, &values)?;
        let key = backend.gen_row_sum_key(pair.secret, 2, 8)?;
        let out = backend.eval_row_sum(payload, key)?;
        let slots = backend.decrypt(out, pair.secret)?;
        assert_eq!(&slots[0..2], &[12.0, 16.0]);
        assert_eq!(&slots[8..10], &[44.0, 48.0]);
        Ok(())
    }

    #[test]
    fn test_wrong_key_kind_rejected() -> Result<()> {
        let values = [0.0; 8];
        let (mut backend, payload, pair) = backend_with_payload(8, &values)?;
        let col_key = backend.gen_col_sum_key(pair.secret, 4)?;
        let err = backend.eval_row_sum(payload, col_key).unwrap_err();
        assert!(matches!(err, BackendError::KeyMismatch { .. }));
        Ok(())
    }

    #[test]
    fn test_mat_vec_crc_uses_block_sum() -> Result<()> {
        // 2x2 row-major matrix against a column-tiled vector.
        let m_vals = [1.0, 2.0, 3.0, 4.0];
        let v_vals = [5.0, 6.0, 5.0, 6.0];
        let mut backend = ClearBackend::new(4)?;
        let pair = backend.key_gen()?;
        let m = backend.encrypt(pair.public, &m_vals)?;
        let v = backend.encrypt(pair.public, &v_vals)?;
        let key = backend.gen_col_sum_key(pair.secret, 2)?;
        let out = backend.eval_mat_vec(m, v, key, MatVecStyle::Crc)?;
        let slots = backend.decrypt(out, pair.secret)?;
        // Row dots 1*5+2*6=17 and 3*5+4*6=39, each filling its block.
        assert_eq!(slots, vec![17.0, 17.0, 39.0, 39.0]);
        Ok(())
    }

    #[test]
    fn test_release_invalidates_handle() -> Result<()> {
        let (mut backend, payload, pair) = backend_with_payload(4, &[0.0; 4])?;
        backend.release(payload)?;
        let err = backend.decrypt(payload, pair.secret).unwrap_err();
        assert!(matches!(err, BackendError::InvalidPayloadHandle(_)));
        Ok(())
    }
}
