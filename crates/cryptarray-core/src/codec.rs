//! Packing and unpacking codec
//!
//! Pure, stateless mapping between logical array coordinates and flat slot
//! positions. Element `(i, j)` lands at `i * block_size + j` under row-major
//! order and `j * block_size + i` under col-major order. A 1-D row-major
//! array replicates element `i` across all of row `i`; a 1-D col-major array
//! is contiguous. Under `TileReplicate` the packed block repeats with period
//! `block_size` (1-D col-major) or `block_size^2` (everything else), under
//! `ZeroPad` the remaining slots stay zero.
//!
//! Round-trip law: `unpack(pack(x))` restores `x` on the logical extent for
//! every supported shape, order, and mode.

use crate::error::{Error, Result};
use crate::layout::{block_span, EncodingOrder, LogicalShape, PackMode, SlotLayout};

/// Output form of an unpack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnpackForm {
    /// The raw slot vector, pads and replicas included.
    Flat,
    /// Logical elements only, emitted in row-major order of the shape.
    OriginalShape,
}

/// Flat slot index of logical element `(i, j)`.
pub fn slot_index(i: usize, j: usize, order: EncodingOrder, block_size: usize) -> usize {
    match order {
        EncodingOrder::RowMajor => i * block_size + j,
        EncodingOrder::ColMajor => j * block_size + i,
    }
}

/// Pack a logical array (row-major element slice) into a full slot vector.
pub fn pack(
    values: &[f64],
    shape: LogicalShape,
    order: EncodingOrder,
    mode: PackMode,
    layout: &SlotLayout,
) -> Result<Vec<f64>> {
    if values.len() != shape.len() {
        return Err(Error::ShapeMismatch(format!(
            "shape {shape} holds {} elements, got {}",
            shape.len(),
            values.len()
        )));
    }

    let block = layout.block_size;
    let span = block_span(shape, order, block);
    let mut base = vec![0.0; span];

    if shape.is_vector() {
        match order {
            EncodingOrder::RowMajor => {
                // Element i fills row i; the free column coordinate is replicated.
                for (i, &v) in values.iter().enumerate() {
                    for j in 0..block {
                        base[i * block + j] = v;
                    }
                }
            }
            EncodingOrder::ColMajor => {
                base[..values.len()].copy_from_slice(values);
            }
        }
    } else {
        for i in 0..shape.rows {
            for j in 0..shape.cols {
                base[slot_index(i, j, order, block)] = values[i * shape.cols + j];
            }
        }
    }

    let mut slots = vec![0.0; layout.total_slots];
    match mode {
        PackMode::ZeroPad => {
            slots[..span].copy_from_slice(&base);
        }
        PackMode::TileReplicate => {
            for chunk in slots.chunks_mut(span) {
                chunk.copy_from_slice(&base[..chunk.len()]);
            }
        }
    }
    Ok(slots)
}

/// Invert the packing, restricted to the logical extent.
///
/// `Flat` returns the slots untouched; `OriginalShape` reads each logical
/// element back from its slot and discards pads and replicas.
pub fn unpack(
    slots: &[f64],
    shape: LogicalShape,
    order: EncodingOrder,
    layout: &SlotLayout,
    form: UnpackForm,
) -> Result<Vec<f64>> {
    if slots.len() != layout.total_slots {
        return Err(Error::ShapeMismatch(format!(
            "expected {} slots, got {}",
            layout.total_slots,
            slots.len()
        )));
    }
    if let UnpackForm::Flat = form {
        return Ok(slots.to_vec());
    }

    let block = layout.block_size;
    let mut out = Vec::with_capacity(shape.len());
    if shape.is_vector() {
        match order {
            EncodingOrder::RowMajor => {
                for i in 0..shape.rows {
                    out.push(slots[i * block]);
                }
            }
            EncodingOrder::ColMajor => {
                out.extend_from_slice(&slots[..shape.rows]);
            }
        }
    } else {
        for i in 0..shape.rows {
            for j in 0..shape.cols {
                out.push(slots[slot_index(i, j, order, block)]);
            }
        }
    }
    Ok(out)
}
