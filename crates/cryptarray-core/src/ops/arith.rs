//! Elementwise arithmetic over packed tensors
//!
//! These need no rotation keys; the backend evaluates slotwise and the
//! result inherits the operands' packing. Mixing a plaintext operand with a
//! ciphertext one is allowed and yields a ciphertext.

use crate::context::CryptoContext;
use crate::error::{Error, Result};
use crate::tensor::TensorHandle;

/// Check two operands agree on everything an elementwise op cares about.
///
/// Pad modes must match too: combining a zero-padded payload with a tiled
/// one leaves replicas in the result's pad slots, so neither mode label
/// would be truthful and a later strided reduction would decode wrong
/// numbers without any error.
fn check_elementwise(ctx: &CryptoContext, a: &TensorHandle, b: &TensorHandle) -> Result<()> {
    ctx.check_batch(a)?;
    ctx.check_batch(b)?;
    if a.shape() != b.shape() {
        return Err(Error::ShapeMismatch(format!(
            "elementwise operands have shapes {} and {}",
            a.shape(),
            b.shape()
        )));
    }
    if a.order() != b.order() {
        return Err(Error::OrderMismatch(format!(
            "elementwise operands are packed {} and {}",
            a.order(),
            b.order()
        )));
    }
    if a.ncols() != b.ncols() {
        return Err(Error::ShapeMismatch(format!(
            "elementwise operands use block sizes {} and {}",
            a.ncols(),
            b.ncols()
        )));
    }
    if a.mode() != b.mode() {
        return Err(Error::ShapeMismatch(format!(
            "elementwise operands use pad modes {} and {}; repack one operand",
            a.mode(),
            b.mode()
        )));
    }
    Ok(())
}

fn derive(a: &TensorHandle, b: &TensorHandle, payload: cryptarray_backends::PayloadHandle) -> TensorHandle {
    TensorHandle::new(payload, a.kind().combine(b.kind()), a.shape(), a.order(), a.mode(), a.layout())
}

/// Elementwise sum of two tensors.
#[tracing::instrument(skip(ctx, a, b), fields(shape = %a.shape()))]
pub fn add(ctx: &mut CryptoContext, a: &TensorHandle, b: &TensorHandle) -> Result<TensorHandle> {
    check_elementwise(ctx, a, b)?;
    let payload = ctx.backend.write().eval_add(a.payload(), b.payload())?;
    Ok(derive(a, b, payload))
}

/// Elementwise difference `a - b`.
#[tracing::instrument(skip(ctx, a, b), fields(shape = %a.shape()))]
pub fn sub(ctx: &mut CryptoContext, a: &TensorHandle, b: &TensorHandle) -> Result<TensorHandle> {
    check_elementwise(ctx, a, b)?;
    let payload = ctx.backend.write().eval_sub(a.payload(), b.payload())?;
    Ok(derive(a, b, payload))
}

/// Elementwise (Hadamard) product.
#[tracing::instrument(skip(ctx, a, b), fields(shape = %a.shape()))]
pub fn mul(ctx: &mut CryptoContext, a: &TensorHandle, b: &TensorHandle) -> Result<TensorHandle> {
    check_elementwise(ctx, a, b)?;
    let payload = ctx.backend.write().eval_mul(a.payload(), b.payload())?;
    Ok(derive(a, b, payload))
}

/// Multiply every element by a scalar.
#[tracing::instrument(skip(ctx, a), fields(shape = %a.shape()))]
pub fn mul_scalar(ctx: &mut CryptoContext, a: &TensorHandle, scalar: f64) -> Result<TensorHandle> {
    ctx.check_batch(a)?;
    let payload = ctx.backend.write().eval_mul_scalar(a.payload(), scalar)?;
    Ok(TensorHandle::new(payload, a.kind(), a.shape(), a.order(), a.mode(), a.layout()))
}
