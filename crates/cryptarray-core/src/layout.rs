//! Shape and slot-layout resolution
//!
//! Decides how a logical 1-D or 2-D array maps onto a power-of-two slot block
//! inside a fixed SIMD slot budget. Choosing the wrong block size or tile
//! count does not crash anything downstream, it silently produces wrong
//! numbers, so every rule here fails loudly at construction instead.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Logical (pre-padding) shape of an array.
///
/// Vectors carry their length in `rows` with `cols == 1`; the single free
/// coordinate of a 1-D array is its row coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalShape {
    pub rows: usize,
    pub cols: usize,
    pub ndim: usize,
}

impl LogicalShape {
    /// 1-D shape of the given length.
    pub const fn vector(len: usize) -> Self {
        Self { rows: len, cols: 1, ndim: 1 }
    }

    /// 2-D shape.
    pub const fn matrix(rows: usize, cols: usize) -> Self {
        Self { rows, cols, ndim: 2 }
    }

    /// Number of logical elements.
    pub const fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub const fn is_vector(&self) -> bool {
        self.ndim == 1
    }

    pub const fn is_matrix(&self) -> bool {
        self.ndim == 2
    }
}

impl std::fmt::Display for LogicalShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_vector() {
            write!(f, "({},)", self.rows)
        } else {
            write!(f, "({}, {})", self.rows, self.cols)
        }
    }
}

/// Slot ordering of packed elements. Diagonal packing is reserved upstream
/// and intentionally absent here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncodingOrder {
    /// `(i, j)` maps to `i * block_size + j`; a 1-D element is replicated
    /// across its row.
    RowMajor,
    /// `(i, j)` maps to `j * block_size + i`; a 1-D array is contiguous.
    ColMajor,
}

impl EncodingOrder {
    /// The order a transpose re-labels this payload as.
    pub const fn flipped(self) -> Self {
        match self {
            EncodingOrder::RowMajor => EncodingOrder::ColMajor,
            EncodingOrder::ColMajor => EncodingOrder::RowMajor,
        }
    }
}

impl std::fmt::Display for EncodingOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodingOrder::RowMajor => write!(f, "row-major"),
            EncodingOrder::ColMajor => write!(f, "col-major"),
        }
    }
}

/// What fills the slots beyond the logical extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PackMode {
    /// Out-of-extent slots are zero.
    ZeroPad,
    /// The packed block repeats across the remaining slots.
    TileReplicate,
}

impl std::fmt::Display for PackMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackMode::ZeroPad => write!(f, "zero-pad"),
            PackMode::TileReplicate => write!(f, "tile-replicate"),
        }
    }
}

/// Resolved placement of one logical array inside a slot vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotLayout {
    /// Slot count of every payload, fixed by the backend scheme.
    pub total_slots: usize,
    /// Padded row/column length, a power of two >= max(rows, cols).
    pub block_size: usize,
    /// Tile count under `TileReplicate`, 1 under `ZeroPad`.
    pub replication_count: usize,
}

impl SlotLayout {
    /// Layout of a derived payload whose pad slots no longer tile; a
    /// zero-pad result carries a replication count of 1 even when an
    /// operand was tiled.
    pub fn without_replication(self) -> Self {
        Self { replication_count: 1, ..self }
    }
}

/// Slots one packed block occupies before padding or replication.
///
/// A row-major 1-D array replicates each element across its row, so its block
/// is two-dimensional even though the data is not.
pub(crate) fn block_span(shape: LogicalShape, order: EncodingOrder, block_size: usize) -> usize {
    if shape.is_vector() && order == EncodingOrder::ColMajor {
        block_size
    } else {
        block_size * block_size
    }
}

/// Resolve the slot layout for an array of the given shape.
///
/// `block_size` is the smallest power of two >= `max(rows, cols)`, unless
/// `target_block` supplies a larger power of two explicitly. The blanket
/// capacity rule is `total_slots >= block span`; under `TileReplicate` the
/// span must additionally divide `total_slots` a whole number of times.
pub fn resolve(
    shape: LogicalShape,
    total_slots: usize,
    target_block: Option<usize>,
    order: EncodingOrder,
    mode: PackMode,
) -> Result<SlotLayout> {
    if shape.is_empty() {
        return Err(Error::Configuration(format!("empty shape {shape}")));
    }
    if shape.is_vector() && shape.cols != 1 {
        return Err(Error::Configuration(format!(
            "1-D shape must have cols == 1, got {shape}"
        )));
    }

    let min_block = shape.rows.max(shape.cols).next_power_of_two();
    let block_size = match target_block {
        None => min_block,
        Some(target) => {
            if !target.is_power_of_two() || target < min_block {
                return Err(Error::Configuration(format!(
                    "target block size {target} must be a power of two >= {min_block} for shape {shape}"
                )));
            }
            target
        }
    };

    // A single-slot row cannot distinguish replication from padding.
    if shape.is_vector() && order == EncodingOrder::RowMajor && block_size == 1 {
        return Err(Error::Configuration(
            "1-D row-major packing with block size 1 is ambiguous".to_string(),
        ));
    }

    let span = block_span(shape, order, block_size);
    if span > total_slots {
        return Err(Error::Capacity(format!(
            "shape {shape} needs a {span}-slot block but only {total_slots} slots are available"
        )));
    }

    let replication_count = match mode {
        PackMode::ZeroPad => 1,
        PackMode::TileReplicate => {
            let period = if shape.is_vector() { block_size } else { block_size * block_size };
            if total_slots % period != 0 || total_slots / period == 0 {
                return Err(Error::Capacity(format!(
                    "tile period {period} does not divide {total_slots} slots for shape {shape}"
                )));
            }
            total_slots / period
        }
    };

    Ok(SlotLayout { total_slots, block_size, replication_count })
}
