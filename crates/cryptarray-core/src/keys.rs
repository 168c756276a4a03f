//! Rotation-key capabilities and the key-requirement policy
//!
//! Every data-movement operation needs backend key material generated for a
//! specific stride, block, or batch. The mapping from `(operation, axis,
//! order)` to the required capability is the load-bearing correctness
//! contract of the whole crate: a wrong entry here does not fail, it decodes
//! to wrong numbers. The table lives in the small pure functions below and
//! nowhere else.

use std::collections::HashMap;

use cryptarray_backends::KeyHandle;

use crate::error::{Error, Result};
use crate::layout::EncodingOrder;

/// Reduction / accumulation axis.
///
/// `Rows` is axis 0 (collapsing rows, yielding one value per column) and
/// `Cols` is axis 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Rows,
    Cols,
}

impl Axis {
    pub const fn index(self) -> usize {
        match self {
            Axis::Rows => 0,
            Axis::Cols => 1,
        }
    }

    pub fn from_index(index: usize) -> Result<Self> {
        match index {
            0 => Ok(Axis::Rows),
            1 => Ok(Axis::Cols),
            other => Err(Error::UnsupportedAxis(format!(
                "axis {other} is outside {{0, 1}}"
            ))),
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "axis {}", self.index())
    }
}

/// A rotation-key capability, keyed by the exact parameters the backend
/// generation call takes.
///
/// Cache entries are only ever read under the same signature they were
/// written with; two capabilities differing in any parameter are distinct
/// keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Strided sums across the batch (`gen_row_sum_key`).
    RowKey { ncols: usize, batch_size: usize },
    /// Sums within each contiguous block (`gen_col_sum_key`).
    ColKey { ncols: usize },
    /// Strided prefix sums (`gen_accumulate_rows_key`).
    AccumulateRows { ncols: usize },
    /// In-block prefix sums (`gen_accumulate_cols_key`).
    AccumulateCols { ncols: usize },
    /// Block transpose re-encoding (`gen_transpose_key`).
    TransposeKeys { block_size: usize },
    /// Square block matrix product (`gen_matmul_key`).
    MatmulKeys { ncols: usize },
    /// All-slot total sum (`gen_sum_key`).
    SumKey { batch_size: usize },
}

impl Capability {
    /// The context call that generates this capability, named in
    /// `MissingKey` messages so the caller knows exactly what to run.
    pub fn generation_hint(&self) -> String {
        match self {
            Capability::RowKey { ncols, batch_size } => {
                format!("gen_row_sum_key(secret_key, ncols={ncols}, batch_size={batch_size})")
            }
            Capability::ColKey { ncols } => format!("gen_col_sum_key(secret_key, ncols={ncols})"),
            Capability::AccumulateRows { ncols } => {
                format!("gen_accumulate_rows_key(secret_key, ncols={ncols})")
            }
            Capability::AccumulateCols { ncols } => {
                format!("gen_accumulate_cols_key(secret_key, ncols={ncols})")
            }
            Capability::TransposeKeys { block_size } => {
                format!("gen_transpose_key(secret_key, block_size={block_size})")
            }
            Capability::MatmulKeys { ncols } => format!("gen_matmul_key(secret_key, ncols={ncols})"),
            Capability::SumKey { .. } => "gen_sum_key(secret_key)".to_string(),
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::RowKey { ncols, batch_size } => {
                write!(f, "rowkey(ncols={ncols}, batch_size={batch_size})")
            }
            Capability::ColKey { ncols } => write!(f, "colkey(ncols={ncols})"),
            Capability::AccumulateRows { ncols } => write!(f, "accumulate-rows(ncols={ncols})"),
            Capability::AccumulateCols { ncols } => write!(f, "accumulate-cols(ncols={ncols})"),
            Capability::TransposeKeys { block_size } => {
                write!(f, "transpose-keys(block_size={block_size})")
            }
            Capability::MatmulKeys { ncols } => write!(f, "matmul-keys(ncols={ncols})"),
            Capability::SumKey { batch_size } => write!(f, "sumkey(batch_size={batch_size})"),
        }
    }
}

/// Capability required for an axis reduction.
///
/// | Order     | Axis 0                      | Axis 1                      |
/// |-----------|-----------------------------|-----------------------------|
/// | row-major | rowkey(ncols, batch_size)   | colkey(ncols)               |
/// | col-major | colkey(nrows)               | rowkey(nrows, batch_size)   |
///
/// `ncols` and `nrows` both equal the padded block size, so one parameter
/// serves both rows of the table.
pub fn reduction(order: EncodingOrder, axis: Axis, block_size: usize, batch_size: usize) -> Capability {
    match (order, axis) {
        (EncodingOrder::RowMajor, Axis::Rows) | (EncodingOrder::ColMajor, Axis::Cols) => {
            Capability::RowKey { ncols: block_size, batch_size }
        }
        (EncodingOrder::RowMajor, Axis::Cols) | (EncodingOrder::ColMajor, Axis::Rows) => {
            Capability::ColKey { ncols: block_size }
        }
    }
}

/// Capability required for a cumulative sum; the order/axis swap mirrors
/// [`reduction`].
pub fn cumulative(order: EncodingOrder, axis: Axis, block_size: usize) -> Capability {
    match (order, axis) {
        (EncodingOrder::RowMajor, Axis::Rows) | (EncodingOrder::ColMajor, Axis::Cols) => {
            Capability::AccumulateRows { ncols: block_size }
        }
        (EncodingOrder::RowMajor, Axis::Cols) | (EncodingOrder::ColMajor, Axis::Rows) => {
            Capability::AccumulateCols { ncols: block_size }
        }
    }
}

/// Capability required for the no-axis total reduction.
pub fn total_reduction(batch_size: usize) -> Capability {
    Capability::SumKey { batch_size }
}

/// Capability required for a transpose, independent of order.
pub fn transpose(block_size: usize) -> Capability {
    Capability::TransposeKeys { block_size }
}

/// Capability required for the square matrix product; both operands must
/// share `ncols` and encoding order, checked by the dispatcher.
pub fn square_matmul(ncols: usize) -> Capability {
    Capability::MatmulKeys { ncols }
}

/// Lazily populated capability-to-key-handle cache carried by each tensor.
///
/// Not internally synchronized; concurrent first-use population of the same
/// entry is a caller responsibility.
#[derive(Debug, Clone, Default)]
pub struct KeyCache {
    entries: HashMap<Capability, KeyHandle>,
}

impl KeyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, capability: Capability, key: KeyHandle) {
        self.entries.insert(capability, key);
    }

    pub fn get(&self, capability: Capability) -> Option<KeyHandle> {
        self.entries.get(&capability).copied()
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.entries.contains_key(&capability)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a capability, failing with the exact generation call to run
    /// when it is absent. Dispatch is fail-closed: callers return this error
    /// before issuing any backend evaluation.
    pub fn require(&self, capability: Capability) -> Result<KeyHandle> {
        self.get(capability).ok_or_else(|| Error::MissingKey {
            capability: capability.to_string(),
            hint: capability.generation_hint(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduction_policy_table() {
        // Row-major: axis 0 strides, axis 1 stays in-block.
        assert_eq!(
            reduction(EncodingOrder::RowMajor, Axis::Rows, 4, 16),
            Capability::RowKey { ncols: 4, batch_size: 16 }
        );
        assert_eq!(
            reduction(EncodingOrder::RowMajor, Axis::Cols, 4, 16),
            Capability::ColKey { ncols: 4 }
        );
        // Col-major swaps the two.
        assert_eq!(
            reduction(EncodingOrder::ColMajor, Axis::Rows, 4, 16),
            Capability::ColKey { ncols: 4 }
        );
        assert_eq!(
            reduction(EncodingOrder::ColMajor, Axis::Cols, 4, 16),
            Capability::RowKey { ncols: 4, batch_size: 16 }
        );
    }

    #[test]
    fn test_cumulative_policy_table() {
        assert_eq!(
            cumulative(EncodingOrder::RowMajor, Axis::Rows, 8),
            Capability::AccumulateRows { ncols: 8 }
        );
        assert_eq!(
            cumulative(EncodingOrder::RowMajor, Axis::Cols, 8),
            Capability::AccumulateCols { ncols: 8 }
        );
        assert_eq!(
            cumulative(EncodingOrder::ColMajor, Axis::Rows, 8),
            Capability::AccumulateCols { ncols: 8 }
        );
        assert_eq!(
            cumulative(EncodingOrder::ColMajor, Axis::Cols, 8),
            Capability::AccumulateRows { ncols: 8 }
        );
    }

    #[test]
    fn test_policy_is_deterministic() {
        for _ in 0..3 {
            assert_eq!(
                reduction(EncodingOrder::RowMajor, Axis::Rows, 4, 16),
                reduction(EncodingOrder::RowMajor, Axis::Rows, 4, 16)
            );
        }
        assert_eq!(transpose(8), Capability::TransposeKeys { block_size: 8 });
        assert_eq!(square_matmul(4), Capability::MatmulKeys { ncols: 4 });
        assert_eq!(total_reduction(32), Capability::SumKey { batch_size: 32 });
    }

    #[test]
    fn test_missing_key_names_generation_call() {
        let cache = KeyCache::new();
        let err = cache
            .require(Capability::RowKey { ncols: 4, batch_size: 16 })
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("rowkey(ncols=4, batch_size=16)"));
        assert!(message.contains("gen_row_sum_key(secret_key, ncols=4, batch_size=16)"));
    }

    #[test]
    fn test_cache_distinguishes_parameters() {
        let mut cache = KeyCache::new();
        cache.insert(Capability::ColKey { ncols: 4 }, KeyHandle::new(1));
        assert!(cache.contains(Capability::ColKey { ncols: 4 }));
        assert!(!cache.contains(Capability::ColKey { ncols: 8 }));
        assert!(cache.require(Capability::ColKey { ncols: 8 }).is_err());
    }

    #[test]
    fn test_axis_from_index() {
        assert_eq!(Axis::from_index(0).unwrap(), Axis::Rows);
        assert_eq!(Axis::from_index(1).unwrap(), Axis::Cols);
        assert!(matches!(Axis::from_index(2), Err(Error::UnsupportedAxis(_))));
    }
}
