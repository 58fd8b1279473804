use crate::{
    linalg::triangular_solve::{
        solve_unit_lower_triangular_in_place, solve_upper_triangular_in_place,
    },
    ComplexField, MatMut, MatRef, Parallelism,
};
use equator::assert;
use reborrow::*;

/// Given the LU factors of a square matrix $A$, computes $A^{-1} X$ and stores the result in
/// `rhs`.
///
/// # Panics
///
/// - Panics if `lu_factors` is not square.
/// - Panics if `rhs.nrows() != lu_factors.nrows()`.
#[track_caller]
pub fn solve_in_place<E: ComplexField>(
    lu_factors: MatRef<'_, E>,
    rhs: MatMut<'_, E>,
    parallelism: Parallelism,
) {
    assert!(all(
        lu_factors.nrows() == lu_factors.ncols(),
        rhs.nrows() == lu_factors.nrows(),
    ));
    let mut rhs = rhs;
    solve_unit_lower_triangular_in_place(lu_factors, rhs.rb_mut(), parallelism);
    solve_upper_triangular_in_place(lu_factors, rhs, parallelism);
}

#[cfg(test)]
mod tests {
    use super::*;
    use equator::assert;
    use crate::{linalg::lu::no_pivoting::compute::lu_in_place, linalg::matmul::matmul, Conj, Mat};
    use assert_approx_eq::assert_approx_eq;
    use rand::random;

    #[test]
    fn solves_dominant_system() {
        let n = 45;
        let k = 3;
        let a = Mat::from_fn(n, n, |i, j| {
            if i == j {
                n as f64 + random::<f64>()
            } else {
                random::<f64>()
            }
        });
        let x = Mat::from_fn(n, k, |_, _| random::<f64>());
        let mut rhs = Mat::zeros(n, k);
        matmul(
            rhs.as_mut(),
            a.as_ref(),
            x.as_ref(),
            None,
            1.0,
            Conj::No,
            Conj::No,
            Parallelism::None,
        );

        let mut lu = a.clone();
        lu_in_place(lu.as_mut(), 8, Parallelism::None);
        solve_in_place(lu.as_ref(), rhs.as_mut(), Parallelism::None);

        for j in 0..k {
            for i in 0..n {
                assert_approx_eq!(rhs.read(i, j), x.read(i, j), 1e-10);
            }
        }
    }
}
