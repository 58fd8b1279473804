use crate::{
    linalg::{
        householder::{apply_householder_on_the_left, make_householder_in_place},
        temp_mat_req, temp_mat_zeroed,
    },
    ComplexField, MatMut, Parallelism,
};
use dyn_stack::{PodStack, SizeOverflow, StackReq};
use equator::assert;
use reborrow::*;

/// Computes the size and alignment of the workspace required by [`qr_in_place_unblocked`].
pub fn qr_in_place_unblocked_req<E: ComplexField>(
    nrows: usize,
    ncols: usize,
) -> Result<StackReq, SizeOverflow> {
    let _ = nrows;
    temp_mat_req::<E>(1, ncols)
}

/// Computes the QR decomposition of `matrix` one column at a time.
///
/// On exit, the upper trapezoidal part of `matrix` holds `R`. The strictly lower part of column
/// `k` holds the essential part of the reflector `H(k)`, and `householder_factor[k]` its factor,
/// so that `Q = H(0) * H(1) * ... * H(min(m, n) - 1)`. The diagonal of `R` is real.
///
/// # Panics
///
/// Panics if `householder_factor` is not a column vector of length `min(m, n)`.
#[track_caller]
pub fn qr_in_place_unblocked<E: ComplexField>(
    matrix: MatMut<'_, E>,
    householder_factor: MatMut<'_, E>,
    parallelism: Parallelism,
    stack: PodStack<'_>,
) {
    let m = matrix.nrows();
    let n = matrix.ncols();
    let size = m.min(n);
    assert!(all(
        householder_factor.nrows() == size,
        householder_factor.ncols() == 1,
    ));

    let mut matrix = matrix;
    let mut householder_factor = householder_factor;
    let (mut work, _) = temp_mat_zeroed::<E>(1, n, stack);

    for k in 0..size {
        let mat_rem = matrix.rb_mut().submatrix(k, k, m - k, n - k);
        let (_, _, first_col, last_cols) = mat_rem.split_at(0, 1);
        let (mut head, mut tail) = first_col.split_at_row(1);

        let (tau, beta) = make_householder_in_place(tail.rb_mut(), head.read(0, 0));
        head.write(0, 0, E::from_real(beta));
        householder_factor.write(k, 0, tau);

        let ncols = last_cols.ncols();
        apply_householder_on_the_left(
            tail.rb(),
            tau.conj(),
            last_cols,
            work.rb_mut().submatrix(0, 0, 1, ncols),
            parallelism,
        );
    }
}
