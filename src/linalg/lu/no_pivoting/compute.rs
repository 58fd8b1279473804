use crate::{
    linalg::{matmul::matmul, triangular_solve::solve_unit_lower_triangular_in_place},
    ComplexField, Conj, FactorResult, MatMut, Parallelism,
};
use dyn_stack::{SizeOverflow, StackReq};
use equator::debug_assert;
use reborrow::*;

/// Default number of columns below which the recursive variant switches to the unblocked one.
pub const DEFAULT_RECURSION_THRESHOLD: usize = 16;

#[inline]
// we want remainder to be a multiple of register size
fn blocksize(n: usize) -> usize {
    let base_rem = n / 2;
    n - if n >= 32 {
        (base_rem + 15) / 16 * 16
    } else if n >= 16 {
        (base_rem + 7) / 8 * 8
    } else if n >= 8 {
        (base_rem + 3) / 4 * 4
    } else {
        base_rem
    }
}

/// Computes the size and alignment of the workspace required to compute the LU decomposition of
/// an `m x n` matrix without pivoting. The decomposition works entirely in place.
pub fn lu_in_place_req<E: ComplexField>(
    m: usize,
    n: usize,
    parallelism: Parallelism,
) -> Result<StackReq, SizeOverflow> {
    let _ = (m, n, parallelism);
    Ok(StackReq::empty())
}

/// Computes the LU decomposition of `matrix` one column at a time.
///
/// Works on any shape. At each of the `min(m, n)` steps, the subdiagonal part of the current
/// column is divided by the pivot and the trailing matrix receives a rank one update. A pivot
/// that is exactly zero is recorded and the division is skipped, leaving the column as is.
pub fn lu_in_place_unblocked<E: ComplexField>(matrix: MatMut<'_, E>) -> FactorResult {
    let mut matrix = matrix;
    let m = matrix.nrows();
    let n = matrix.ncols();
    let size = m.min(n);

    let mut result = FactorResult::new(size);

    for j in 0..size {
        let pivot = unsafe { matrix.read_unchecked(j, j) };
        if pivot.is_zero() {
            result.record_singular(j);
        } else {
            let inv = pivot.inv();
            for i in j + 1..m {
                unsafe {
                    let v = matrix.read_unchecked(i, j);
                    matrix.write_unchecked(i, j, v * inv);
                }
            }
        }

        let (_, top_right, bottom_left, bottom_right) = matrix.rb_mut().split_at(j + 1, j + 1);
        matmul(
            bottom_right,
            bottom_left.rb().col(j),
            top_right.rb().row(j),
            Some(E::one()),
            -E::one(),
            Conj::No,
            Conj::No,
            Parallelism::None,
        );
    }

    result
}

fn lu_recursive<E: ComplexField>(
    matrix: MatMut<'_, E>,
    recursion_threshold: usize,
    parallelism: Parallelism,
) -> FactorResult {
    let mut matrix = matrix;
    let m = matrix.nrows();
    let n = matrix.ncols();
    debug_assert!(m >= n);

    if n <= recursion_threshold.max(1) {
        return lu_in_place_unblocked(matrix);
    }

    let bs = blocksize(n);

    let head = lu_recursive(
        matrix.rb_mut().split_at_col(bs).0,
        recursion_threshold,
        parallelism,
    );

    let (top_left, mut top_right, bottom_left, mut bottom_right) = matrix.split_at(bs, bs);
    solve_unit_lower_triangular_in_place(top_left.rb(), top_right.rb_mut(), parallelism);
    matmul(
        bottom_right.rb_mut(),
        bottom_left.rb(),
        top_right.rb(),
        Some(E::one()),
        -E::one(),
        Conj::No,
        Conj::No,
        parallelism,
    );

    let tail = lu_recursive(bottom_right, recursion_threshold, parallelism);
    head.then(tail.offset(bs))
}

/// Computes the LU decomposition of `matrix` without pivoting, in place.
///
/// The strictly lower part of the first `min(m, n)` columns receives the unit lower triangular
/// factor `L`, and the upper part of the first `min(m, n)` rows receives `U`. Panels with more
/// than `recursion_threshold` columns are split in two, so that most of the work is done by
/// matrix products.
pub fn lu_in_place<E: ComplexField>(
    matrix: MatMut<'_, E>,
    recursion_threshold: usize,
    parallelism: Parallelism,
) -> FactorResult {
    let mut matrix = matrix;
    let m = matrix.nrows();
    let n = matrix.ncols();
    let size = m.min(n);

    let result = lu_recursive(
        matrix.rb_mut().split_at_col(size).0,
        recursion_threshold,
        parallelism,
    );

    if n > m {
        let (left, right) = matrix.split_at_col(size);
        solve_unit_lower_triangular_in_place(left.rb(), right, parallelism);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{c32, c64, mat::norm_frobenius, Mat, MatRef, RealField};
    use rand::random;

    fn reconstruct<E: ComplexField>(lu: MatRef<'_, E>) -> Mat<E> {
        let m = lu.nrows();
        let n = lu.ncols();
        let size = m.min(n);
        Mat::from_fn(m, n, |i, j| {
            let mut sum = E::zero();
            for p in 0..size.min(i + 1).min(j + 1) {
                let l = if p == i { E::one() } else { lu.read(i, p) };
                sum = sum + l * lu.read(p, j);
            }
            sum
        })
    }

    fn dominant<E: ComplexField>(m: usize, n: usize) -> Mat<E> {
        let scale = E::from_f64((m.max(n)) as f64);
        Mat::from_fn(m, n, |i, j| {
            let x = E::from_real_imag(
                E::Real::from_f64(random::<f64>() - 0.5),
                E::Real::from_f64(random::<f64>() - 0.5),
            );
            if i == j {
                x + scale
            } else {
                x
            }
        })
    }

    fn check_reconstruction<E: ComplexField>(
        m: usize,
        n: usize,
        threshold: usize,
        unblocked: bool,
    ) {
        let a = dominant::<E>(m, n);
        let mut lu = a.clone();
        let result = if unblocked {
            lu_in_place_unblocked(lu.as_mut())
        } else {
            lu_in_place(lu.as_mut(), threshold, Parallelism::Rayon(0))
        };
        assert_eq!(result.completed_steps, m.min(n));
        assert_eq!(result.info(), 0);

        let rec = reconstruct(lu.as_ref());
        let diff = Mat::from_fn(m, n, |i, j| rec.read(i, j) - a.read(i, j));
        let err = norm_frobenius(diff.as_ref()) / norm_frobenius(a.as_ref());
        let tol = E::Real::from_f64(m.min(n).max(1) as f64 * 10.0) * E::Real::epsilon();
        assert!(err <= tol, "{m}x{n}: {err:?} > {tol:?}");
    }

    #[test]
    fn reconstructs_input() {
        for (m, n) in [
            (1, 1),
            (2, 2),
            (4, 4),
            (8, 3),
            (3, 8),
            (20, 20),
            (33, 17),
            (17, 33),
            (64, 64),
            (100, 57),
        ] {
            check_reconstruction::<f64>(m, n, DEFAULT_RECURSION_THRESHOLD, false);
            check_reconstruction::<c64>(m, n, 4, false);
            check_reconstruction::<f32>(m, n, DEFAULT_RECURSION_THRESHOLD, true);
            check_reconstruction::<c32>(m, n, 2, false);
        }
    }

    #[test]
    fn records_first_zero_pivot_and_completes() {
        for threshold in [1, 4, DEFAULT_RECURSION_THRESHOLD] {
            let n = 24;
            let mut a = Mat::from_fn(n, n, |i, j| if i == j { 400.0 } else { -4.0 });
            for zero_col in [n / 2, n - 1] {
                for i in 0..n {
                    a.write(i, zero_col, 0.0);
                }
            }

            let result = lu_in_place(a.as_mut(), threshold, Parallelism::None);
            assert_eq!(result.first_singular_step, Some(n / 2));
            assert_eq!(result.info(), (n / 2 + 1) as i32);
            assert_eq!(result.completed_steps, n);
            assert!(a.read(0, 0) == 400.0);
        }
    }

    #[test]
    fn zero_pivot_leaves_column_unscaled() {
        let values = [[0.0, 1.0, 2.0], [3.0, 4.0, 5.0], [6.0, 7.0, 9.0]];
        let mut a = Mat::from_fn(3, 3, |i, j| values[i][j]);
        let result = lu_in_place_unblocked(a.as_mut());
        assert_eq!(result.info(), 1);
        assert_eq!(a.read(1, 0), 3.0);
        assert_eq!(a.read(2, 0), 6.0);
        // the trailing update still uses the unscaled column
        assert_eq!(a.read(1, 1), 4.0 - 3.0 * 1.0);
    }
}
