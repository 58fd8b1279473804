use super::*;
use equator::assert;
use crate::mat::Mat;

/// Immutable view over a matrix, similar to an immutable reference to a 2D strided [prim@slice].
pub struct MatRef<'a, E> {
    pub(super) inner: MatImpl<E>,
    pub(super) __marker: PhantomData<&'a E>,
}

impl<E> Clone for MatRef<'_, E> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for MatRef<'_, E> {}

impl<'short, E> Reborrow<'short> for MatRef<'_, E> {
    type Target = MatRef<'short, E>;

    #[inline]
    fn rb(&'short self) -> Self::Target {
        *self
    }
}

impl<'short, E> ReborrowMut<'short> for MatRef<'_, E> {
    type Target = MatRef<'short, E>;

    #[inline]
    fn rb_mut(&'short mut self) -> Self::Target {
        *self
    }
}

impl<E> IntoConst for MatRef<'_, E> {
    type Target = Self;

    #[inline]
    fn into_const(self) -> Self::Target {
        self
    }
}

impl<E: core::fmt::Debug + Copy> core::fmt::Debug for MatRef<'_, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut list = f.debug_list();
        for i in 0..self.nrows() {
            let row: Vec<E> = (0..self.ncols()).map(|j| self.read(i, j)).collect();
            list.entry(&row);
        }
        list.finish()
    }
}

impl<'a, E> MatRef<'a, E> {
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
    pub fn as_ptr(self) -> *const E {
        self.inner.ptr.as_ptr()
    }

    /// Returns a pointer to the element at the given indices, which may be out of bounds.
    #[inline(always)]
    pub fn overflowing_ptr_at(self, row: usize, col: usize) -> *const E {
        self.inner.overflowing_ptr_at(row, col)
    }

    /// Returns a view over the submatrix starting at indices `(row_start, col_start)`, and with
    /// dimensions `(nrows, ncols)`.
    ///
    /// # Safety
    /// The behavior is undefined if any of the following conditions are violated:
    /// * `row_start <= self.nrows()`.
    /// * `col_start <= self.ncols()`.
    /// * `nrows <= self.nrows() - row_start`.
    /// * `ncols <= self.ncols() - col_start`.
    #[inline(always)]
    #[track_caller]
    pub unsafe fn submatrix_unchecked(
        self,
        row_start: usize,
        col_start: usize,
        nrows: usize,
        ncols: usize,
    ) -> Self {
        equator::debug_assert!(all(
            row_start <= self.nrows(),
            col_start <= self.ncols(),
            nrows <= self.nrows() - row_start,
            ncols <= self.ncols() - col_start,
        ));
        from_raw_parts(
            self.overflowing_ptr_at(row_start, col_start),
            nrows,
            ncols,
            self.row_stride(),
            self.col_stride(),
        )
    }

    /// Returns a view over the submatrix starting at indices `(row_start, col_start)`, and with
    /// dimensions `(nrows, ncols)`.
    ///
    /// # Panics
    /// Panics if the submatrix does not fit inside `self`.
    #[inline(always)]
    #[track_caller]
    pub fn submatrix(self, row_start: usize, col_start: usize, nrows: usize, ncols: usize) -> Self {
        assert!(all(
            row_start <= self.nrows(),
            col_start <= self.ncols(),
            nrows <= self.nrows() - row_start,
            ncols <= self.ncols() - col_start,
        ));
        unsafe { self.submatrix_unchecked(row_start, col_start, nrows, ncols) }
    }

    /// Splits the matrix into four corner parts in the following order: top left, top right,
    /// bottom left, bottom right.
    #[inline(always)]
    #[track_caller]
    pub fn split_at(self, row: usize, col: usize) -> (Self, Self, Self, Self) {
        assert!(all(row <= self.nrows(), col <= self.ncols()));
        let (m, n) = (self.nrows(), self.ncols());
        unsafe {
            (
                self.submatrix_unchecked(0, 0, row, col),
                self.submatrix_unchecked(0, col, row, n - col),
                self.submatrix_unchecked(row, 0, m - row, col),
                self.submatrix_unchecked(row, col, m - row, n - col),
            )
        }
    }

    /// Splits the matrix horizontally at the given row into the top and bottom parts.
    #[inline(always)]
    #[track_caller]
    pub fn split_at_row(self, row: usize) -> (Self, Self) {
        let (top, _, bot, _) = self.split_at(row, 0);
        let n = self.ncols();
        unsafe {
            (
                top.with_ncols_unchecked(n),
                bot.with_ncols_unchecked(n),
            )
        }
    }

    /// Splits the matrix vertically at the given column into the left and right parts.
    #[inline(always)]
    #[track_caller]
    pub fn split_at_col(self, col: usize) -> (Self, Self) {
        let (_, _, left, right) = self.split_at(0, col);
        let m = self.nrows();
        unsafe { (left.with_nrows_unchecked(m), right.with_nrows_unchecked(m)) }
    }

    #[inline(always)]
    unsafe fn with_ncols_unchecked(self, ncols: usize) -> Self {
        from_raw_parts(
            self.as_ptr(),
            self.nrows(),
            ncols,
            self.row_stride(),
            self.col_stride(),
        )
    }

    #[inline(always)]
    unsafe fn with_nrows_unchecked(self, nrows: usize) -> Self {
        from_raw_parts(
            self.as_ptr(),
            nrows,
            self.ncols(),
            self.row_stride(),
            self.col_stride(),
        )
    }

    /// Returns the `j`-th column as an `nrows x 1` view.
    #[inline(always)]
    #[track_caller]
    pub fn col(self, j: usize) -> Self {
        assert!(j < self.ncols());
        unsafe { self.submatrix_unchecked(0, j, self.nrows(), 1) }
    }

    /// Returns the `i`-th row as a `1 x ncols` view.
    #[inline(always)]
    #[track_caller]
    pub fn row(self, i: usize) -> Self {
        assert!(i < self.nrows());
        unsafe { self.submatrix_unchecked(i, 0, 1, self.ncols()) }
    }

    #[inline(always)]
    #[must_use]
    pub fn transpose(self) -> Self {
        unsafe {
            from_raw_parts(
                self.as_ptr(),
                self.ncols(),
                self.nrows(),
                self.col_stride(),
                self.row_stride(),
            )
        }
    }

    /// Returns a view over `self`, with the rows and the columns in reversed order.
    ///
    /// For a square matrix this maps the upper triangle onto the lower triangle of the view.
    #[inline(always)]
    #[must_use]
    pub fn reverse_rows_and_cols(self) -> Self {
        let nrows = self.nrows();
        let ncols = self.ncols();
        let ptr = self.overflowing_ptr_at(nrows.saturating_sub(1), ncols.saturating_sub(1));
        unsafe {
            from_raw_parts(
                ptr,
                nrows,
                ncols,
                -self.row_stride(),
                -self.col_stride(),
            )
        }
    }
}

impl<'a, E: Copy> MatRef<'a, E> {
    /// Reads the value of the element at the given indices, with bound checks.
    #[inline(always)]
    #[track_caller]
    pub fn read(&self, row: usize, col: usize) -> E {
        assert!(all(row < self.nrows(), col < self.ncols()));
        unsafe { self.read_unchecked(row, col) }
    }

    /// Reads the value of the element at the given indices.
    ///
    /// # Safety
    /// `row < self.nrows()` and `col < self.ncols()`.
    #[inline(always)]
    pub unsafe fn read_unchecked(&self, row: usize, col: usize) -> E {
        *self.overflowing_ptr_at(row, col)
    }

    /// Returns an owned copy of the matrix.
    pub fn to_owned(&self) -> Mat<E>
    where
        E: crate::ComplexField,
    {
        Mat::from_fn(self.nrows(), self.ncols(), |i, j| unsafe {
            self.read_unchecked(i, j)
        })
    }
}

/// Creates a `MatRef` from pointers to the matrix data, dimensions, and strides.
///
/// # Safety
/// For each `i < nrows` and `j < ncols`, `ptr.offset(i * row_stride + j * col_stride)` must
/// point to a valid initialized element that is not mutated for the lifetime `'a`.
#[inline(always)]
pub unsafe fn from_raw_parts<'a, E>(
    ptr: *const E,
    nrows: usize,
    ncols: usize,
    row_stride: isize,
    col_stride: isize,
) -> MatRef<'a, E> {
    MatRef {
        inner: MatImpl {
            ptr: NonNull::new_unchecked(ptr as *mut E),
            nrows,
            ncols,
            row_stride,
            col_stride,
        },
        __marker: PhantomData,
    }
}

/// Creates a `MatRef` from a column-major slice with leading dimension `ld`.
///
/// # Panics
/// Panics if `ld < nrows` or if the slice is too short.
#[track_caller]
#[inline(always)]
pub fn from_column_major_slice<E>(
    slice: &[E],
    nrows: usize,
    ncols: usize,
    ld: usize,
) -> MatRef<'_, E> {
    from_column_major_slice_assert(nrows, ncols, ld, slice.len());
    unsafe { from_raw_parts(slice.as_ptr(), nrows, ncols, 1, ld as isize) }
}
