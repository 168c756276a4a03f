//! Reductions and cumulative sums
//!
//! The axis/order policy decides between two backend primitives. A strided
//! rowkey sum gathers values spread `block_size` apart, leaving the results
//! contiguous, so its output is a col-major vector. A colkey block sum fills
//! each block with that block's total, which is exactly the row-major 1-D
//! encoding. Getting either of these labels wrong would not fail; it would
//! decode the wrong slots.

use crate::context::CryptoContext;
use crate::error::{Error, Result};
use crate::keys::{self, Axis, Capability};
use crate::layout::{EncodingOrder, LogicalShape, PackMode};
use crate::tensor::TensorHandle;

/// Sum a tensor along `axis`, or over every element when `axis` is `None`.
///
/// Requires the matching reduction key in the tensor's cache; fails with
/// `MissingKey` before touching the backend otherwise.
#[tracing::instrument(skip(ctx, tensor), fields(shape = %tensor.shape(), order = %tensor.order()))]
pub fn sum(ctx: &mut CryptoContext, tensor: &TensorHandle, axis: Option<Axis>) -> Result<TensorHandle> {
    ctx.check_batch(tensor)?;
    let Some(axis) = axis else {
        let capability = keys::total_reduction(tensor.batch_size());
        let key = tensor.keys().require(capability)?;
        let payload = ctx.backend.write().eval_total_sum(tensor.payload(), key)?;
        // Scalar result, readable at slot zero.
        return Ok(TensorHandle::new(
            payload,
            tensor.kind(),
            LogicalShape::vector(1),
            EncodingOrder::ColMajor,
            PackMode::ZeroPad,
            tensor.layout().without_replication(),
        ));
    };

    if !tensor.shape().is_matrix() {
        return Err(Error::UnsupportedAxis(format!(
            "{axis} on a 1-D tensor; only the no-axis total sum applies"
        )));
    }

    let capability = keys::reduction(tensor.order(), axis, tensor.ncols(), tensor.batch_size());
    let key = tensor.keys().require(capability)?;
    let strided = matches!(capability, Capability::RowKey { .. });
    let payload = {
        let mut backend = ctx.backend.write();
        if strided {
            backend.eval_row_sum(tensor.payload(), key)?
        } else {
            backend.eval_col_sum(tensor.payload(), key)?
        }
    };
    let len = match axis {
        Axis::Rows => tensor.shape().cols,
        Axis::Cols => tensor.shape().rows,
    };
    let order = if strided { EncodingOrder::ColMajor } else { EncodingOrder::RowMajor };
    tracing::debug!(%capability, len, %order, "axis reduction");
    Ok(TensorHandle::new(
        payload,
        tensor.kind(),
        LogicalShape::vector(len),
        order,
        PackMode::ZeroPad,
        tensor.layout().without_replication(),
    ))
}

/// Mean along `axis` (or of every element): a sum followed by a backend-side
/// scalar division by the logical, unpadded element count.
pub fn mean(ctx: &mut CryptoContext, tensor: &TensorHandle, axis: Option<Axis>) -> Result<TensorHandle> {
    let summed = sum(ctx, tensor, axis)?;
    let count = match axis {
        None => tensor.shape().len(),
        Some(Axis::Rows) => tensor.shape().rows,
        Some(Axis::Cols) => tensor.shape().cols,
    };
    let payload = ctx
        .backend
        .write()
        .eval_mul_scalar(summed.payload(), 1.0 / count as f64)?;
    let result = TensorHandle::new(
        payload,
        summed.kind(),
        summed.shape(),
        summed.order(),
        summed.mode(),
        summed.layout(),
    );
    ctx.release(&summed)?;
    Ok(result)
}

/// Cumulative sum along `axis`; packing metadata is unchanged.
#[tracing::instrument(skip(ctx, tensor), fields(shape = %tensor.shape(), order = %tensor.order()))]
pub fn cumulative_sum(ctx: &mut CryptoContext, tensor: &TensorHandle, axis: Axis) -> Result<TensorHandle> {
    ctx.check_batch(tensor)?;
    if !tensor.shape().is_matrix() {
        return Err(Error::UnsupportedAxis(format!(
            "cumulative sum over {axis} needs a 2-D tensor"
        )));
    }
    let capability = keys::cumulative(tensor.order(), axis, tensor.ncols());
    let key = tensor.keys().require(capability)?;
    let strided = matches!(capability, Capability::AccumulateRows { .. });
    let payload = {
        let mut backend = ctx.backend.write();
        if strided {
            backend.eval_cumsum_rows(tensor.payload(), key)?
        } else {
            backend.eval_cumsum_cols(tensor.payload(), key)?
        }
    };
    Ok(TensorHandle::new(
        payload,
        tensor.kind(),
        tensor.shape(),
        tensor.order(),
        tensor.mode(),
        tensor.layout(),
    ))
}
