//! LU decomposition.

pub mod no_pivoting;
