//! Multi-payload block tensors
//!
//! An array too large for one slot block is split into a grid of
//! `block_size x block_size` tiles, each packed into its own payload. The
//! grid is an owned ordered sequence of tensors plus an explicit index from
//! logical block coordinates to sequence position.

use std::collections::HashMap;

use cryptarray_backends::PublicKeyHandle;

use crate::codec::UnpackForm;
use crate::context::{CryptoContext, PackOptions};
use crate::error::{Error, Result};
use crate::layout::{EncodingOrder, LogicalShape, PackMode};
use crate::ops;
use crate::tensor::TensorHandle;

/// A logical matrix spanning a grid of per-block payloads.
#[derive(Debug)]
pub struct BlockTensor {
    blocks: Vec<TensorHandle>,
    index: HashMap<(usize, usize), usize>,
    shape: LogicalShape,
    block_size: usize,
    grid_rows: usize,
    grid_cols: usize,
}

impl BlockTensor {
    /// Encrypt a row-major `rows x cols` array, splitting it into
    /// `block_size`-sized tiles. Edge tiles are zero-padded.
    pub fn encrypt(
        ctx: &CryptoContext,
        public_key: PublicKeyHandle,
        values: &[f64],
        rows: usize,
        cols: usize,
        block_size: usize,
    ) -> Result<Self> {
        let shape = LogicalShape::matrix(rows, cols);
        if values.len() != shape.len() {
            return Err(Error::ShapeMismatch(format!(
                "shape {shape} holds {} elements, got {}",
                shape.len(),
                values.len()
            )));
        }
        if !block_size.is_power_of_two() {
            return Err(Error::Configuration(format!(
                "block size {block_size} must be a power of two"
            )));
        }

        let grid_rows = rows.div_ceil(block_size);
        let grid_cols = cols.div_ceil(block_size);
        let mut blocks = Vec::with_capacity(grid_rows * grid_cols);
        let mut index = HashMap::new();
        let mut tile = vec![0.0; block_size * block_size];

        for br in 0..grid_rows {
            for bc in 0..grid_cols {
                let tile_rows = block_size.min(rows - br * block_size);
                let tile_cols = block_size.min(cols - bc * block_size);
                tile.iter_mut().for_each(|v| *v = 0.0);
                for i in 0..tile_rows {
                    for j in 0..tile_cols {
                        tile[i * block_size + j] =
                            values[(br * block_size + i) * cols + (bc * block_size + j)];
                    }
                }
                let opts = PackOptions::with_order(EncodingOrder::RowMajor)
                    .mode(PackMode::ZeroPad)
                    .target_block(block_size);
                let tensor =
                    ctx.encrypt_matrix(public_key, &tile, block_size, block_size, opts)?;
                index.insert((br, bc), blocks.len());
                blocks.push(tensor);
            }
        }
        tracing::debug!(%shape, block_size, grid_rows, grid_cols, "split into block tensor");
        Ok(Self { blocks, index, shape, block_size, grid_rows, grid_cols })
    }

    pub fn shape(&self) -> LogicalShape {
        self.shape
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Grid extent as `(block_rows, block_cols)`.
    pub fn grid(&self) -> (usize, usize) {
        (self.grid_rows, self.grid_cols)
    }

    /// The tensor holding logical block `(block_row, block_col)`.
    pub fn block(&self, block_row: usize, block_col: usize) -> Option<&TensorHandle> {
        self.index.get(&(block_row, block_col)).map(|&i| &self.blocks[i])
    }

    fn check_compatible(&self, other: &Self) -> Result<()> {
        if self.shape != other.shape || self.block_size != other.block_size {
            return Err(Error::ShapeMismatch(format!(
                "block tensors disagree: {} (block {}) vs {} (block {})",
                self.shape, self.block_size, other.shape, other.block_size
            )));
        }
        Ok(())
    }

    fn zip(
        &self,
        ctx: &mut CryptoContext,
        other: &Self,
        op: impl Fn(&mut CryptoContext, &TensorHandle, &TensorHandle) -> Result<TensorHandle>,
    ) -> Result<Self> {
        self.check_compatible(other)?;
        let mut blocks = Vec::with_capacity(self.blocks.len());
        for (a, b) in self.blocks.iter().zip(other.blocks.iter()) {
            blocks.push(op(ctx, a, b)?);
        }
        Ok(Self {
            blocks,
            index: self.index.clone(),
            shape: self.shape,
            block_size: self.block_size,
            grid_rows: self.grid_rows,
            grid_cols: self.grid_cols,
        })
    }

    /// Blockwise elementwise sum.
    pub fn add(&self, ctx: &mut CryptoContext, other: &Self) -> Result<Self> {
        self.zip(ctx, other, ops::add)
    }

    /// Blockwise elementwise difference.
    pub fn sub(&self, ctx: &mut CryptoContext, other: &Self) -> Result<Self> {
        self.zip(ctx, other, ops::sub)
    }

    /// Blockwise elementwise product.
    pub fn mul(&self, ctx: &mut CryptoContext, other: &Self) -> Result<Self> {
        self.zip(ctx, other, ops::mul)
    }

    /// Decrypt every block and reassemble the logical row-major array.
    pub fn decrypt(
        &self,
        ctx: &CryptoContext,
        secret_key: cryptarray_backends::SecretKeyHandle,
    ) -> Result<Vec<f64>> {
        let mut out = vec![0.0; self.shape.len()];
        for (&(br, bc), &pos) in &self.index {
            let tile = self.blocks[pos].decrypt(ctx, secret_key, UnpackForm::OriginalShape)?;
            let tile_rows = self.block_size.min(self.shape.rows - br * self.block_size);
            let tile_cols = self.block_size.min(self.shape.cols - bc * self.block_size);
            for i in 0..tile_rows {
                for j in 0..tile_cols {
                    out[(br * self.block_size + i) * self.shape.cols + (bc * self.block_size + j)] =
                        tile[i * self.block_size + j];
                }
            }
        }
        Ok(out)
    }
}
