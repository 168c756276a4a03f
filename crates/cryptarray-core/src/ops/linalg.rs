//! Transpose and matrix products
//!
//! The transpose leans on a layout identity: the row-major slots of a block
//! are the col-major slots of its transpose. The backend re-encodes the
//! payload for the flipped order while the dispatcher flips the recorded
//! order and swaps the logical shape; together that is the transpose.

use cryptarray_backends::MatVecStyle;

use crate::context::CryptoContext;
use crate::error::{Error, Result};
use crate::keys::{self, Capability};
use crate::layout::{EncodingOrder, LogicalShape, PackMode};
use crate::tensor::TensorHandle;

/// Transpose a matrix. Applying it twice restores the original shape and
/// encoding order.
#[tracing::instrument(skip(ctx, tensor), fields(shape = %tensor.shape(), order = %tensor.order()))]
pub fn transpose(ctx: &mut CryptoContext, tensor: &TensorHandle) -> Result<TensorHandle> {
    ctx.check_batch(tensor)?;
    if !tensor.shape().is_matrix() {
        return Err(Error::ShapeMismatch(format!(
            "transpose needs a matrix operand, got shape {}",
            tensor.shape()
        )));
    }
    let capability = keys::transpose(tensor.ncols());
    let key = tensor.keys().require(capability)?;
    let payload = ctx.backend.write().eval_transpose(tensor.payload(), key)?;
    let shape = LogicalShape::matrix(tensor.shape().cols, tensor.shape().rows);
    Ok(TensorHandle::new(
        payload,
        tensor.kind(),
        shape,
        tensor.order().flipped(),
        tensor.mode(),
        tensor.layout(),
    ))
}

/// Square matrix product over equal row-major blocks.
///
/// The key may sit in either operand's cache; both operands must share the
/// block size and be row-major, and the result is row-major.
#[tracing::instrument(skip(ctx, a, b), fields(a = %a.shape(), b = %b.shape()))]
pub fn matmul(ctx: &mut CryptoContext, a: &TensorHandle, b: &TensorHandle) -> Result<TensorHandle> {
    ctx.check_batch(a)?;
    ctx.check_batch(b)?;
    if !a.shape().is_matrix() || !b.shape().is_matrix() {
        return Err(Error::ShapeMismatch(format!(
            "matrix product needs matrix operands, got {} and {}",
            a.shape(),
            b.shape()
        )));
    }
    if a.order() != b.order() {
        return Err(Error::OrderMismatch(format!(
            "matrix-product operands are packed {} and {}",
            a.order(),
            b.order()
        )));
    }
    if a.order() != EncodingOrder::RowMajor {
        return Err(Error::OrderMismatch(
            "the square matrix product evaluates row-major blocks; transpose col-major operands first"
                .to_string(),
        ));
    }
    if a.ncols() != b.ncols() {
        return Err(Error::ShapeMismatch(format!(
            "matrix-product operands use block sizes {} and {}",
            a.ncols(),
            b.ncols()
        )));
    }
    if a.shape().cols != b.shape().rows {
        return Err(Error::ShapeMismatch(format!(
            "inner dimensions disagree: {} x {}",
            a.shape(),
            b.shape()
        )));
    }

    let capability = keys::square_matmul(a.ncols());
    let key = match a.keys().get(capability) {
        Some(key) => key,
        None => b.keys().require(capability)?,
    };
    let payload = ctx.backend.write().eval_square_matmul(a.payload(), b.payload(), key)?;
    // A zero-padded operand zeroes every block past the first in the block
    // product, so a mixed-mode result is genuinely zero-padded.
    let (mode, layout) = if a.mode() == b.mode() {
        (a.mode(), a.layout())
    } else {
        (PackMode::ZeroPad, a.layout().without_replication())
    };
    Ok(TensorHandle::new(
        payload,
        a.kind().combine(b.kind()),
        LogicalShape::matrix(a.shape().rows, b.shape().cols),
        EncodingOrder::RowMajor,
        mode,
        layout,
    ))
}

/// Matrix-vector product. The style is read off the operand orders:
///
/// - row-major matrix x col-major tiled vector (CRC): a slotwise product
///   followed by an in-block colkey sum leaves each row's dot product
///   filling its block, so the result is a row-major vector.
/// - col-major matrix x row-major vector (RCR): the vector must be packed
///   with its padded row length (`target_cols`) equal to the matrix's row
///   count; the strided rowkey sum leaves the result contiguous, a
///   col-major vector.
///
/// Any other order pairing is rejected.
#[tracing::instrument(skip(ctx, matrix, vector), fields(matrix = %matrix.shape(), vector = %vector.shape()))]
pub fn matvec(ctx: &mut CryptoContext, matrix: &TensorHandle, vector: &TensorHandle) -> Result<TensorHandle> {
    ctx.check_batch(matrix)?;
    ctx.check_batch(vector)?;
    if !matrix.shape().is_matrix() || !vector.shape().is_vector() {
        return Err(Error::ShapeMismatch(format!(
            "matrix-vector product needs a matrix and a vector, got {} and {}",
            matrix.shape(),
            vector.shape()
        )));
    }
    let style = match (matrix.order(), vector.order()) {
        (EncodingOrder::RowMajor, EncodingOrder::ColMajor) => MatVecStyle::Crc,
        (EncodingOrder::ColMajor, EncodingOrder::RowMajor) => MatVecStyle::Rcr,
        (m, v) => {
            return Err(Error::OrderMismatch(format!(
                "matrix-vector product needs complementary orders, got matrix {m} and vector {v}"
            )))
        }
    };
    if vector.ncols() != matrix.nrows() {
        return Err(Error::ShapeMismatch(format!(
            "vector's padded row length {} must equal the matrix's row block {}; pack the vector with that target block",
            vector.ncols(),
            matrix.nrows()
        )));
    }
    if vector.shape().rows != matrix.shape().cols {
        return Err(Error::ShapeMismatch(format!(
            "cannot multiply {} by a length-{} vector",
            matrix.shape(),
            vector.shape().rows
        )));
    }

    let (capability, order) = match style {
        MatVecStyle::Crc => {
            if vector.mode() != PackMode::TileReplicate {
                return Err(Error::Configuration(
                    "the CRC matrix-vector product needs a tile-replicated vector".to_string(),
                ));
            }
            (Capability::ColKey { ncols: matrix.ncols() }, EncodingOrder::RowMajor)
        }
        MatVecStyle::Rcr => (
            Capability::RowKey { ncols: matrix.nrows(), batch_size: matrix.batch_size() },
            EncodingOrder::ColMajor,
        ),
    };
    let key = matrix.keys().require(capability)?;
    let payload = ctx
        .backend
        .write()
        .eval_mat_vec(matrix.payload(), vector.payload(), key, style)?;
    tracing::debug!(%style, %capability, "matrix-vector product");
    Ok(TensorHandle::new(
        payload,
        matrix.kind().combine(vector.kind()),
        LogicalShape::vector(matrix.shape().rows),
        order,
        PackMode::ZeroPad,
        matrix.layout().without_replication(),
    ))
}
