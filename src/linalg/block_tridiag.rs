//! Block-tridiagonal LU decomposition without pivoting, and the corresponding solve.
//!
//! The system is made of `nblocks` block rows of size `nb`:
//!
//! ```notcode
//! | B0 C0             |
//! | A0 B1 C1          |
//! |    A1 B2 C2       |
//! |       .. .. ..    |
//! |          An-2 Bn-1|
//! ```
//!
//! Each of `a`, `b` and `c` stores its blocks side by side, block `k` occupying the columns
//! `k * nb..(k + 1) * nb`. The last block of `a` and `c` is never accessed.
//!
//! The factorization is `M = L * U`, where `L` is block lower bidiagonal with the subdiagonal
//! blocks `Ak` and the factored diagonal blocks `B'k = Bk - Ak-1 * C'k-1`, and `U` is block
//! upper bidiagonal with identity diagonal blocks and the superdiagonal blocks
//! `C'k = B'k^-1 * Ck`. `B'k` overwrites `b` as its LU factors, and `C'k` overwrites `c`.

use crate::{
    linalg::{
        lu::no_pivoting::{compute::lu_in_place, solve::solve_in_place as lu_solve_in_place},
        matmul::matmul,
    },
    ComplexField, Conj, FactorResult, MatMut, MatRef, Parallelism,
};
use equator::assert;
use reborrow::*;

/// Computes the block LU decomposition in place.
///
/// A diagonal block that turns out singular is recorded at its global position `k * nb + j`, the
/// factorization then continues with non-finite values in the following blocks.
///
/// # Panics
///
/// Panics if the matrices are not `nb x (nb * nblocks)`.
#[track_caller]
pub fn factor_in_place<E: ComplexField>(
    nb: usize,
    nblocks: usize,
    a: MatRef<'_, E>,
    b: MatMut<'_, E>,
    c: MatMut<'_, E>,
    recursion_threshold: usize,
    parallelism: Parallelism,
) -> FactorResult {
    let width = nb * nblocks;
    assert!(all(
        a.nrows() == nb,
        a.ncols() == width,
        b.nrows() == nb,
        b.ncols() == width,
        c.nrows() == nb,
        c.ncols() == width,
    ));

    let mut b = b;
    let mut c = c;
    let mut result = FactorResult::new(0);

    for k in 0..nblocks {
        let (c_done, mut c_rest) = c.rb_mut().split_at_col(k * nb);
        let mut b_k = b.rb_mut().submatrix(0, k * nb, nb, nb);

        if k > 0 {
            matmul(
                b_k.rb_mut(),
                a.submatrix(0, (k - 1) * nb, nb, nb),
                c_done.rb().submatrix(0, (k - 1) * nb, nb, nb),
                Some(E::one()),
                -E::one(),
                Conj::No,
                Conj::No,
                parallelism,
            );
        }

        let block = lu_in_place(b_k.rb_mut(), recursion_threshold, parallelism);
        result = result.then(block.offset(k * nb));

        if k + 1 < nblocks {
            lu_solve_in_place(
                b_k.rb(),
                c_rest.rb_mut().submatrix(0, 0, nb, nb),
                parallelism,
            );
        }
    }

    result
}

/// Solves `M * X = rhs` using the factors computed by [`factor_in_place`], overwriting `rhs`.
///
/// `rhs` stores the `nblocks` blocks of `nb x nrhs` side by side, block `k` occupying the columns
/// `k * nrhs..(k + 1) * nrhs`.
///
/// # Panics
///
/// Panics if the dimensions are inconsistent.
#[track_caller]
pub fn solve_in_place<E: ComplexField>(
    nb: usize,
    nblocks: usize,
    nrhs: usize,
    a: MatRef<'_, E>,
    b: MatRef<'_, E>,
    c: MatRef<'_, E>,
    rhs: MatMut<'_, E>,
    parallelism: Parallelism,
) {
    let width = nb * nblocks;
    assert!(all(
        a.nrows() == nb,
        a.ncols() == width,
        b.nrows() == nb,
        b.ncols() == width,
        c.nrows() == nb,
        c.ncols() == width,
        rhs.nrows() == nb,
        rhs.ncols() == nrhs * nblocks,
    ));

    let mut rhs = rhs;

    // forward substitution with the block lower bidiagonal factor
    for k in 0..nblocks {
        let (x_done, mut x_rest) = rhs.rb_mut().split_at_col(k * nrhs);
        let mut x_k = x_rest.rb_mut().submatrix(0, 0, nb, nrhs);
        if k > 0 {
            matmul(
                x_k.rb_mut(),
                a.submatrix(0, (k - 1) * nb, nb, nb),
                x_done.rb().submatrix(0, (k - 1) * nrhs, nb, nrhs),
                Some(E::one()),
                -E::one(),
                Conj::No,
                Conj::No,
                parallelism,
            );
        }
        lu_solve_in_place(b.submatrix(0, k * nb, nb, nb), x_k, parallelism);
    }

    // backward substitution with the unit block upper bidiagonal factor
    for k in (0..nblocks.saturating_sub(1)).rev() {
        let (mut x_head, x_next) = rhs.rb_mut().split_at_col((k + 1) * nrhs);
        matmul(
            x_head.rb_mut().submatrix(0, k * nrhs, nb, nrhs),
            c.submatrix(0, k * nb, nb, nb),
            x_next.rb().submatrix(0, 0, nb, nrhs),
            Some(E::one()),
            -E::one(),
            Conj::No,
            Conj::No,
            parallelism,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use equator::assert;
    use crate::{c64, Mat, RealField};
    use rand::random;

    /// Dense `M * X` for a block-tridiagonal `M` given by its blocks.
    fn apply<E: ComplexField>(
        nb: usize,
        nblocks: usize,
        nrhs: usize,
        a: &Mat<E>,
        b: &Mat<E>,
        c: &Mat<E>,
        x: &Mat<E>,
    ) -> Mat<E> {
        let mut out = Mat::<E>::zeros(nb, nrhs * nblocks);
        for k in 0..nblocks {
            let mut out_k = out.as_mut().submatrix(0, k * nrhs, nb, nrhs);
            let mut acc = |blocks: &Mat<E>, block: usize, x_block: usize| {
                matmul(
                    out_k.rb_mut(),
                    blocks.as_ref().submatrix(0, block * nb, nb, nb),
                    x.as_ref().submatrix(0, x_block * nrhs, nb, nrhs),
                    Some(E::one()),
                    E::one(),
                    Conj::No,
                    Conj::No,
                    Parallelism::None,
                )
            };
            if k > 0 {
                acc(a, k - 1, k - 1);
            }
            acc(b, k, k);
            if k + 1 < nblocks {
                acc(c, k, k + 1);
            }
        }
        out
    }

    fn random_system<E: ComplexField>(nb: usize, nblocks: usize) -> (Mat<E>, Mat<E>, Mat<E>) {
        let rand = || {
            E::from_real_imag(
                E::Real::from_f64(random::<f64>() - 0.5),
                E::Real::from_f64(random::<f64>() - 0.5),
            )
        };
        let diag = E::from_f64(4.0 * nb as f64);
        let a = Mat::from_fn(nb, nb * nblocks, |_, _| rand());
        let b = Mat::from_fn(nb, nb * nblocks, |i, j| {
            if i == j % nb {
                rand() + diag
            } else {
                rand()
            }
        });
        let c = Mat::from_fn(nb, nb * nblocks, |_, _| rand());
        (a, b, c)
    }

    fn check_round_trip<E: ComplexField>(nb: usize, nblocks: usize, nrhs: usize) {
        let (a, b, c) = random_system::<E>(nb, nblocks);
        let x = Mat::from_fn(nb, nrhs * nblocks, |_, _| {
            E::from_real_imag(
                E::Real::from_f64(random::<f64>()),
                E::Real::from_f64(random::<f64>()),
            )
        });
        let rhs = apply(nb, nblocks, nrhs, &a, &b, &c, &x);

        let mut b_fact = b.clone();
        let mut c_fact = c.clone();
        let result = factor_in_place(
            nb,
            nblocks,
            a.as_ref(),
            b_fact.as_mut(),
            c_fact.as_mut(),
            4,
            Parallelism::None,
        );
        assert!(result.first_singular_step == None);
        assert_eq!(result.completed_steps, nb * nblocks);

        // the unused trailing block of c is left alone
        for j in (nblocks - 1) * nb..nblocks * nb {
            for i in 0..nb {
                assert!(c_fact.read(i, j) == c.read(i, j));
            }
        }

        let mut sol = rhs.clone();
        solve_in_place(
            nb,
            nblocks,
            nrhs,
            a.as_ref(),
            b_fact.as_ref(),
            c_fact.as_ref(),
            sol.as_mut(),
            Parallelism::None,
        );

        let tol = E::Real::from_f64((nb * nblocks) as f64 * 100.0) * E::Real::epsilon();
        for j in 0..nrhs * nblocks {
            for i in 0..nb {
                let err = (sol.read(i, j) - x.read(i, j)).abs();
                assert!(err <= tol);
            }
        }
    }

    #[test]
    fn factor_then_solve_round_trip() {
        for (nb, nblocks, nrhs) in [(1, 1, 1), (2, 5, 1), (5, 1, 3), (4, 6, 2), (20, 4, 7)] {
            check_round_trip::<f64>(nb, nblocks, nrhs);
            check_round_trip::<c64>(nb, nblocks, nrhs);
        }
    }

    #[test]
    fn singular_block_reports_global_position() {
        let nb = 3;
        let nblocks = 4;
        // with a zero coupling, block 2 is factored as given
        let a = Mat::<f64>::zeros(nb, nb * nblocks);
        let mut b = Mat::from_fn(nb, nb * nblocks, |i, j| if i == j % nb { 400.0 } else { -4.0 });
        let mut c = Mat::from_fn(nb, nb * nblocks, |_, _| -4.0);
        for i in 0..nb {
            b.write(i, 2 * nb + 1, 0.0);
        }
        let result = factor_in_place(
            nb,
            nblocks,
            a.as_ref(),
            b.as_mut(),
            c.as_mut(),
            16,
            Parallelism::None,
        );
        assert_eq!(result.info(), (2 * nb + 1 + 1) as i32);
        assert_eq!(result.completed_steps, nb * nblocks);
    }
}
