//! Per-matrix numerical kernels.
//!
//! Each kernel works on a single matrix view and takes its scratch memory from a [`PodStack`].
//! The functions ending in `_req` report how much scratch a kernel needs for a given shape, so
//! the batched drivers can size one arena for the whole batch up front.

use crate::{mat, ComplexField, MatMut};
use dyn_stack::{PodStack, SizeOverflow, StackReq};

pub mod block_tridiag;
pub mod evd;
pub mod householder;
pub mod lu;
pub mod matmul;
pub mod qr;
pub mod triangular_solve;

/// Alignment of every scratch buffer carved out of a stack.
pub const CACHELINE_ALIGN: usize = 64;

/// Returns the stack requirements for creating a temporary matrix with the given dimensions.
#[inline]
pub fn temp_mat_req<E: ComplexField>(nrows: usize, ncols: usize) -> Result<StackReq, SizeOverflow> {
    let size = nrows.checked_mul(ncols).ok_or(SizeOverflow)?;
    StackReq::try_new_aligned::<E>(size, CACHELINE_ALIGN)
}

/// Creates a temporary matrix of zero values, from the given memory stack.
///
/// # Panics
/// Panics if the stack is too small, see [`temp_mat_req`].
#[track_caller]
pub fn temp_mat_zeroed<E: ComplexField>(
    nrows: usize,
    ncols: usize,
    stack: PodStack<'_>,
) -> (MatMut<'_, E>, PodStack<'_>) {
    let (alloc, stack) = stack.make_aligned_raw::<E>(nrows * ncols, CACHELINE_ALIGN);
    alloc.fill(E::zero());
    (
        mat::from_column_major_slice_mut(alloc, nrows, ncols, nrows),
        stack,
    )
}
