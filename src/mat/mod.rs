//! Strided column-major matrix views.
//!
//! Every factorization in this crate works in place on a caller-owned buffer, so the views here
//! are thin `(pointer, dimensions, strides)` triples over borrowed memory. Strides are signed,
//! which lets [`MatRef::transpose`] and [`MatRef::reverse_rows_and_cols`] produce views without
//! copying.

use crate::ComplexField;
use core::{marker::PhantomData, ptr::NonNull};
use equator::assert;
use reborrow::*;

struct MatImpl<E> {
    ptr: NonNull<E>,
    nrows: usize,
    ncols: usize,
    row_stride: isize,
    col_stride: isize,
}

unsafe impl<E: Sync> Sync for MatImpl<E> {}
unsafe impl<E: Send> Send for MatImpl<E> {}

impl<E> Copy for MatImpl<E> {}
impl<E> Clone for MatImpl<E> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> MatImpl<E> {
    #[inline(always)]
    fn overflowing_ptr_at(self, row: usize, col: usize) -> *mut E {
        self.ptr
            .as_ptr()
            .wrapping_offset(row as isize * self.row_stride)
            .wrapping_offset(col as isize * self.col_stride)
    }
}

mod matref;
pub use matref::{from_column_major_slice, from_raw_parts, MatRef};

mod matmut;
pub use matmut::{from_column_major_slice_mut, from_raw_parts_mut, MatMut};

mod matown;
pub use matown::Mat;

/// Number of elements a column-major `nrows x ncols` matrix with leading dimension `ld` spans.
#[inline]
pub fn column_major_extent(nrows: usize, ncols: usize, ld: usize) -> Option<usize> {
    if nrows == 0 || ncols == 0 {
        return Some(0);
    }
    usize::checked_mul(ld, ncols - 1)?.checked_add(nrows)
}

#[track_caller]
#[inline]
fn from_column_major_slice_assert(nrows: usize, ncols: usize, ld: usize, len: usize) {
    let extent = column_major_extent(nrows, ncols, ld).unwrap_or(usize::MAX);
    assert!(all(ld >= nrows, extent <= len));
}

/// Frobenius norm of a matrix.
pub fn norm_frobenius<E: ComplexField>(mat: MatRef<'_, E>) -> E::Real {
    let mut acc = E::Real::zero();
    for j in 0..mat.ncols() {
        for i in 0..mat.nrows() {
            acc = acc + mat.read(i, j).abs2();
        }
    }
    crate::RealField::sqrt(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use equator::assert;

    #[test]
    fn extent_of_strided_storage() {
        assert_eq!(column_major_extent(3, 4, 5), Some(18));
        assert_eq!(column_major_extent(0, 4, 5), Some(0));
        assert_eq!(column_major_extent(3, 0, 5), Some(0));
        assert_eq!(column_major_extent(1, usize::MAX, usize::MAX), None);
    }

    #[test]
    fn views_share_storage() {
        let mut data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        {
            let mut m = from_column_major_slice_mut(&mut data, 2, 3, 2);
            let (_, _, _, mut br) = m.rb_mut().split_at(1, 1);
            br.write(0, 1, -6.0);
            assert_eq!(m.rb().transpose().read(2, 1), -6.0);
            assert_eq!(m.rb().reverse_rows_and_cols().read(0, 0), -6.0);
            assert_eq!(m.rb().reverse_rows_and_cols().read(1, 2), 1.0);
        }
        assert_eq!(data[5], -6.0);

        let m = from_column_major_slice(&data, 2, 3, 2);
        let owned = m.to_owned();
        assert_eq!(owned[(1, 1)], 4.0);
        assert_eq!(owned.nrows(), 2);
    }
}
