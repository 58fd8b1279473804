//! The LU decomposition without pivoting of a matrix $A$ is such that:
//! $$A = LU,$$
//! where $L$ is a unit lower triangular matrix and $U$ is an upper triangular matrix.
//!
//! No rows are exchanged, so the decomposition only exists when every leading principal minor is
//! nonzero. This is the case for diagonally dominant matrices, and the caller is expected to know
//! it holds. A zero pivot is reported through [`FactorResult`](crate::FactorResult), but a merely
//! small pivot is not.

pub mod compute;
pub mod solve;
