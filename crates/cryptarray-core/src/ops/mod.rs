//! Operation dispatch over packed tensors
//!
//! Free functions taking a [`CryptoContext`](crate::context::CryptoContext)
//! plus tensor operands. Each one validates operand compatibility from
//! packing metadata alone, looks up the rotation keys the policy demands,
//! invokes the backend, and re-derives the result's metadata. Dispatch is
//! fail-closed: a missing key aborts before any backend evaluation runs.
//!
//! - [`arith`] - Elementwise arithmetic (add, sub, mul, scalar multiply)
//! - [`reduce`] - Reductions and cumulative sums (sum, mean, cumulative_sum)
//! - [`linalg`] - Linear algebra (transpose, matmul, matvec)

pub mod arith;
pub mod linalg;
pub mod reduce;

pub use arith::{add, mul, mul_scalar, sub};
pub use linalg::{matmul, matvec, transpose};
pub use reduce::{cumulative_sum, mean, sum};
