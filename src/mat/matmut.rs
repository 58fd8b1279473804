use super::*;
use equator::assert;

/// Mutable view over a matrix, similar to a mutable reference to a 2D strided [prim@slice].
pub struct MatMut<'a, E> {
    pub(super) inner: MatImpl<E>,
    pub(super) __marker: PhantomData<&'a mut E>,
}

impl<'short, E> Reborrow<'short> for MatMut<'_, E> {
    type Target = MatRef<'short, E>;

    #[inline]
    fn rb(&'short self) -> Self::Target {
        unsafe {
            super::from_raw_parts(
                self.inner.ptr.as_ptr(),
                self.inner.nrows,
                self.inner.ncols,
                self.inner.row_stride,
                self.inner.col_stride,
            )
        }
    }
}

impl<'short, E> ReborrowMut<'short> for MatMut<'_, E> {
    type Target = MatMut<'short, E>;

    #[inline]
    fn rb_mut(&'short mut self) -> Self::Target {
        MatMut {
            inner: self.inner,
            __marker: PhantomData,
        }
    }
}

impl<'a, E> IntoConst for MatMut<'a, E> {
    type Target = MatRef<'a, E>;

    #[inline]
    fn into_const(self) -> Self::Target {
        MatRef {
            inner: self.inner,
            __marker: PhantomData,
        }
    }
}

impl<E: core::fmt::Debug + Copy> core::fmt::Debug for MatMut<'_, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.rb(), f)
    }
}

impl<'a, E> MatMut<'a, E> {
    #[inline(always)]
    pub fn nrows(&self) -> usize {
        self.inner.nrows
    }

    #[inline(always)]
    pub fn ncols(&self) -> usize {
        self.inner.ncols
    }

    #[inline(always)]
    pub fn row_stride(&self) -> isize {
        self.inner.row_stride
    }

    #[inline(always)]
    pub fn col_stride(&self) -> isize {
        self.inner.col_stride
    }

    #[inline(always)]
    pub fn as_ptr_mut(self) -> *mut E {
        self.inner.ptr.as_ptr()
    }

    #[inline(always)]
    pub fn overflowing_ptr_at_mut(self, row: usize, col: usize) -> *mut E {
        self.inner.overflowing_ptr_at(row, col)
    }

    #[inline(always)]
    unsafe fn from_const(mat: MatRef<'_, E>) -> Self {
        MatMut {
            inner: mat.inner,
            __marker: PhantomData,
        }
    }

    /// Returns a view over the submatrix starting at indices `(row_start, col_start)`, and with
    /// dimensions `(nrows, ncols)`.
    ///
    /// # Safety
    /// Same requirements as [`MatRef::submatrix_unchecked`].
    #[inline(always)]
    #[track_caller]
    pub unsafe fn submatrix_unchecked(
        self,
        row_start: usize,
        col_start: usize,
        nrows: usize,
        ncols: usize,
    ) -> Self {
        Self::from_const(
            self.into_const()
                .submatrix_unchecked(row_start, col_start, nrows, ncols),
        )
    }

    /// Returns a view over the submatrix starting at indices `(row_start, col_start)`, and with
    /// dimensions `(nrows, ncols)`.
    #[inline(always)]
    #[track_caller]
    pub fn submatrix(self, row_start: usize, col_start: usize, nrows: usize, ncols: usize) -> Self {
        unsafe { Self::from_const(self.into_const().submatrix(row_start, col_start, nrows, ncols)) }
    }

    /// Splits the matrix into four corner parts in the following order: top left, top right,
    /// bottom left, bottom right.
    #[inline(always)]
    #[track_caller]
    pub fn split_at(self, row: usize, col: usize) -> (Self, Self, Self, Self) {
        let (tl, tr, bl, br) = self.into_const().split_at(row, col);
        unsafe {
            (
                Self::from_const(tl),
                Self::from_const(tr),
                Self::from_const(bl),
                Self::from_const(br),
            )
        }
    }

    #[inline(always)]
    #[track_caller]
    pub fn split_at_row(self, row: usize) -> (Self, Self) {
        let (top, bot) = self.into_const().split_at_row(row);
        unsafe { (Self::from_const(top), Self::from_const(bot)) }
    }

    #[inline(always)]
    #[track_caller]
    pub fn split_at_col(self, col: usize) -> (Self, Self) {
        let (left, right) = self.into_const().split_at_col(col);
        unsafe { (Self::from_const(left), Self::from_const(right)) }
    }

    #[inline(always)]
    #[track_caller]
    pub fn col(self, j: usize) -> Self {
        unsafe { Self::from_const(self.into_const().col(j)) }
    }

    #[inline(always)]
    #[track_caller]
    pub fn row(self, i: usize) -> Self {
        unsafe { Self::from_const(self.into_const().row(i)) }
    }

    #[inline(always)]
    #[must_use]
    pub fn transpose(self) -> Self {
        unsafe { Self::from_const(self.into_const().transpose()) }
    }

    #[inline(always)]
    #[must_use]
    pub fn reverse_rows_and_cols(self) -> Self {
        unsafe { Self::from_const(self.into_const().reverse_rows_and_cols()) }
    }
}

impl<'a, E: Copy> MatMut<'a, E> {
    #[inline(always)]
    #[track_caller]
    pub fn read(&self, row: usize, col: usize) -> E {
        self.rb().read(row, col)
    }

    /// # Safety
    /// `row < self.nrows()` and `col < self.ncols()`.
    #[inline(always)]
    pub unsafe fn read_unchecked(&self, row: usize, col: usize) -> E {
        self.rb().read_unchecked(row, col)
    }

    /// Writes the value to the element at the given indices, with bound checks.
    #[inline(always)]
    #[track_caller]
    pub fn write(&mut self, row: usize, col: usize, value: E) {
        assert!(all(row < self.nrows(), col < self.ncols()));
        unsafe { self.write_unchecked(row, col, value) }
    }

    /// # Safety
    /// `row < self.nrows()` and `col < self.ncols()`.
    #[inline(always)]
    pub unsafe fn write_unchecked(&mut self, row: usize, col: usize, value: E) {
        *self.rb_mut().overflowing_ptr_at_mut(row, col) = value;
    }

    /// Fills the matrix with `value`.
    pub fn fill(&mut self, value: E) {
        for j in 0..self.ncols() {
            for i in 0..self.nrows() {
                unsafe { self.write_unchecked(i, j, value) };
            }
        }
    }

    /// Copies the values from `other` into `self`.
    ///
    /// # Panics
    /// The dimensions of `self` and `other` must match.
    #[track_caller]
    pub fn copy_from(&mut self, other: MatRef<'_, E>) {
        assert!(all(self.nrows() == other.nrows(), self.ncols() == other.ncols()));
        for j in 0..self.ncols() {
            for i in 0..self.nrows() {
                unsafe { self.write_unchecked(i, j, other.read_unchecked(i, j)) };
            }
        }
    }
}

impl<'a, E: crate::ComplexField> MatMut<'a, E> {
    #[inline]
    pub fn fill_zero(&mut self) {
        self.fill(E::zero())
    }
}

/// Creates a `MatMut` from pointers to the matrix data, dimensions, and strides.
///
/// # Safety
/// Same as [`from_raw_parts`](super::from_raw_parts), and in addition the elements must not be
/// accessed through any other pointer for the lifetime `'a`, and no two index pairs may map to
/// the same element.
#[inline(always)]
pub unsafe fn from_raw_parts_mut<'a, E>(
    ptr: *mut E,
    nrows: usize,
    ncols: usize,
    row_stride: isize,
    col_stride: isize,
) -> MatMut<'a, E> {
    MatMut::from_const(super::from_raw_parts(
        ptr, nrows, ncols, row_stride, col_stride,
    ))
}

/// Creates a `MatMut` from a column-major slice with leading dimension `ld`.
///
/// # Panics
/// Panics if `ld < nrows` or if the slice is too short.
#[track_caller]
#[inline(always)]
pub fn from_column_major_slice_mut<E>(
    slice: &mut [E],
    nrows: usize,
    ncols: usize,
    ld: usize,
) -> MatMut<'_, E> {
    from_column_major_slice_assert(nrows, ncols, ld, slice.len());
    unsafe { from_raw_parts_mut(slice.as_mut_ptr(), nrows, ncols, 1, ld as isize) }
}
