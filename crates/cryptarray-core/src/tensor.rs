//! Tensor metadata model
//!
//! A [`TensorHandle`] wraps exactly one backend payload with the packing
//! metadata needed to interpret it and a lazily populated rotation-key cache.
//! Everything except the key cache is fixed at construction; operations never
//! mutate a handle, they build new ones with re-derived metadata.

use cryptarray_backends::{PayloadHandle, SecretKeyHandle};
use serde::{Deserialize, Serialize};

use crate::codec::{self, UnpackForm};
use crate::context::CryptoContext;
use crate::error::Result;
use crate::keys::KeyCache;
use crate::layout::{EncodingOrder, LogicalShape, PackMode, SlotLayout};

/// Whether the payload is an encoded plaintext or a ciphertext.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataKind {
    Plaintext,
    Ciphertext,
}

impl DataKind {
    /// Kind of a result combining two operands; ciphertext is contagious.
    pub(crate) fn combine(self, other: DataKind) -> DataKind {
        if self == DataKind::Ciphertext || other == DataKind::Ciphertext {
            DataKind::Ciphertext
        } else {
            DataKind::Plaintext
        }
    }
}

impl std::fmt::Display for DataKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataKind::Plaintext => write!(f, "plaintext"),
            DataKind::Ciphertext => write!(f, "ciphertext"),
        }
    }
}

/// One packed array: a backend payload plus the metadata to interpret it.
#[derive(Debug)]
pub struct TensorHandle {
    payload: PayloadHandle,
    kind: DataKind,
    shape: LogicalShape,
    order: EncodingOrder,
    mode: PackMode,
    layout: SlotLayout,
    keys: KeyCache,
}

impl TensorHandle {
    pub(crate) fn new(
        payload: PayloadHandle,
        kind: DataKind,
        shape: LogicalShape,
        order: EncodingOrder,
        mode: PackMode,
        layout: SlotLayout,
    ) -> Self {
        Self {
            payload,
            kind,
            shape,
            order,
            mode,
            layout,
            keys: KeyCache::new(),
        }
    }

    pub fn payload(&self) -> PayloadHandle {
        self.payload
    }

    pub fn kind(&self) -> DataKind {
        self.kind
    }

    pub fn shape(&self) -> LogicalShape {
        self.shape
    }

    pub fn order(&self) -> EncodingOrder {
        self.order
    }

    pub fn mode(&self) -> PackMode {
        self.mode
    }

    pub fn layout(&self) -> SlotLayout {
        self.layout
    }

    /// Padded column count. Rows and columns share the square block, so this
    /// always equals the block size.
    pub fn ncols(&self) -> usize {
        self.layout.block_size
    }

    /// Padded row count; equals [`ncols`](Self::ncols) by the same square-block rule.
    pub fn nrows(&self) -> usize {
        self.layout.block_size
    }

    /// Slot count of the payload.
    pub fn batch_size(&self) -> usize {
        self.layout.total_slots
    }

    /// The rotation-key cache, the handle's only mutable state.
    pub fn keys(&self) -> &KeyCache {
        &self.keys
    }

    pub fn keys_mut(&mut self) -> &mut KeyCache {
        &mut self.keys
    }

    /// Decrypt the payload and invert the packing per the requested form.
    pub fn decrypt(
        &self,
        ctx: &CryptoContext,
        secret_key: SecretKeyHandle,
        form: UnpackForm,
    ) -> Result<Vec<f64>> {
        let slots = ctx.decrypt_slots(self.payload, secret_key)?;
        codec::unpack(&slots, self.shape, self.order, &self.layout, form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout;

    #[test]
    fn test_accessors_report_square_block() -> Result<()> {
        let shape = LogicalShape::matrix(3, 2);
        let layout = layout::resolve(
            shape,
            32,
            None,
            EncodingOrder::RowMajor,
            PackMode::ZeroPad,
        )?;
        let tensor = TensorHandle::new(
            PayloadHandle::new(7),
            DataKind::Ciphertext,
            shape,
            EncodingOrder::RowMajor,
            PackMode::ZeroPad,
            layout,
        );
        assert_eq!(tensor.ncols(), 4);
        assert_eq!(tensor.nrows(), 4);
        assert_eq!(tensor.batch_size(), 32);
        assert_eq!(tensor.shape(), shape);
        assert!(tensor.keys().is_empty());
        Ok(())
    }

    #[test]
    fn test_kind_combination() {
        assert_eq!(
            DataKind::Plaintext.combine(DataKind::Ciphertext),
            DataKind::Ciphertext
        );
        assert_eq!(
            DataKind::Plaintext.combine(DataKind::Plaintext),
            DataKind::Plaintext
        );
    }
}
