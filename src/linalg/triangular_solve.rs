//! Triangular solves with multiple right-hand sides.

use crate::{join_raw, linalg::matmul::matmul, ComplexField, Conj, MatMut, MatRef, Parallelism};
use equator::{assert, debug_assert};
use reborrow::*;

#[inline]
fn recursion_threshold() -> usize {
    16
}

#[inline]
fn blocksize(n: usize) -> usize {
    // we want remainder to be a multiple of register size
    let base_rem = n / 2;
    n - if n >= 32 {
        (base_rem + 15) / 16 * 16
    } else if n >= 16 {
        (base_rem + 7) / 8 * 8
    } else {
        base_rem
    }
}

/// Computes the solution of `triangular_lower * X = rhs`, and stores the result in `rhs`.
///
/// `triangular_lower` is interpreted as a lower triangular matrix, and its diagonal elements are
/// implicitly considered to be `1.0`. Its upper triangular part and diagonal are not accessed.
///
/// # Panics
///
///  - Panics if `triangular_lower` is not a square matrix.
///  - Panics if `rhs.nrows() != triangular_lower.ncols()`
#[track_caller]
pub fn solve_unit_lower_triangular_in_place<E: ComplexField>(
    triangular_lower: MatRef<'_, E>,
    rhs: MatMut<'_, E>,
    parallelism: Parallelism,
) {
    assert!(all(
        triangular_lower.nrows() == triangular_lower.ncols(),
        rhs.nrows() == triangular_lower.ncols(),
    ));
    solve_unit_lower_impl(triangular_lower, rhs, parallelism);
}

/// Computes the solution of `triangular_upper * X = rhs`, and stores the result in `rhs`.
///
/// `triangular_upper` is interpreted as an upper triangular matrix. Its strictly lower triangular
/// part is not accessed. A zero on the diagonal produces non-finite values, it is not detected.
///
/// # Panics
///
///  - Panics if `triangular_upper` is not a square matrix.
///  - Panics if `rhs.nrows() != triangular_upper.ncols()`
#[track_caller]
pub fn solve_upper_triangular_in_place<E: ComplexField>(
    triangular_upper: MatRef<'_, E>,
    rhs: MatMut<'_, E>,
    parallelism: Parallelism,
) {
    assert!(all(
        triangular_upper.nrows() == triangular_upper.ncols(),
        rhs.nrows() == triangular_upper.ncols(),
    ));
    solve_upper_impl(triangular_upper, rhs, parallelism);
}

fn solve_unit_lower_impl<E: ComplexField>(
    tril: MatRef<'_, E>,
    rhs: MatMut<'_, E>,
    parallelism: Parallelism,
) {
    let n = tril.nrows();
    let k = rhs.ncols();
    let mut rhs = rhs;

    if k > 64 && n <= 128 {
        let (rhs_left, rhs_right) = rhs.split_at_col(k / 2);
        join_raw(
            |parallelism| solve_unit_lower_impl(tril, rhs_left, parallelism),
            |parallelism| solve_unit_lower_impl(tril, rhs_right, parallelism),
            parallelism,
        );
        return;
    }

    debug_assert!(rhs.nrows() == n);

    if n <= recursion_threshold() {
        for j in 0..k {
            for i in 0..n {
                let x = unsafe { rhs.read_unchecked(i, j) };
                for r in i + 1..n {
                    unsafe {
                        let v = rhs.read_unchecked(r, j) - tril.read_unchecked(r, i) * x;
                        rhs.write_unchecked(r, j, v);
                    }
                }
            }
        }
        return;
    }

    let bs = blocksize(n);
    let (tril_top_left, _, tril_bot_left, tril_bot_right) = tril.split_at(bs, bs);
    let (mut rhs_top, mut rhs_bot) = rhs.rb_mut().split_at_row(bs);

    solve_unit_lower_impl(tril_top_left, rhs_top.rb_mut(), parallelism);
    matmul(
        rhs_bot.rb_mut(),
        tril_bot_left,
        rhs_top.rb(),
        Some(E::one()),
        -E::one(),
        Conj::No,
        Conj::No,
        parallelism,
    );
    solve_unit_lower_impl(tril_bot_right, rhs_bot, parallelism);
}

fn solve_upper_impl<E: ComplexField>(
    triu: MatRef<'_, E>,
    rhs: MatMut<'_, E>,
    parallelism: Parallelism,
) {
    let n = triu.nrows();
    let k = rhs.ncols();
    let mut rhs = rhs;

    if k > 64 && n <= 128 {
        let (rhs_left, rhs_right) = rhs.split_at_col(k / 2);
        join_raw(
            |parallelism| solve_upper_impl(triu, rhs_left, parallelism),
            |parallelism| solve_upper_impl(triu, rhs_right, parallelism),
            parallelism,
        );
        return;
    }

    debug_assert!(rhs.nrows() == n);

    if n <= recursion_threshold() {
        for j in 0..k {
            for i in (0..n).rev() {
                let x = unsafe { rhs.read_unchecked(i, j) * triu.read_unchecked(i, i).inv() };
                unsafe { rhs.write_unchecked(i, j, x) };
                for r in 0..i {
                    unsafe {
                        let v = rhs.read_unchecked(r, j) - triu.read_unchecked(r, i) * x;
                        rhs.write_unchecked(r, j, v);
                    }
                }
            }
        }
        return;
    }

    let bs = blocksize(n);
    let (triu_top_left, triu_top_right, _, triu_bot_right) = triu.split_at(bs, bs);
    let (mut rhs_top, mut rhs_bot) = rhs.rb_mut().split_at_row(bs);

    solve_upper_impl(triu_bot_right, rhs_bot.rb_mut(), parallelism);
    matmul(
        rhs_top.rb_mut(),
        triu_top_right,
        rhs_bot.rb(),
        Some(E::one()),
        -E::one(),
        Conj::No,
        Conj::No,
        parallelism,
    );
    solve_upper_impl(triu_top_left, rhs_top, parallelism);
}

#[cfg(test)]
mod tests {
    use super::*;
    use equator::assert;
    use crate::{c64, Mat};
    use assert_approx_eq::assert_approx_eq;
    use rand::random;

    #[test]
    fn unit_lower_then_upper() {
        for n in [1, 5, 16, 37, 90] {
            for k in [1, 3, 70] {
                let lu = Mat::from_fn(n, n, |i, j| {
                    if i == j {
                        c64::new(4.0 + random::<f64>(), 0.0)
                    } else {
                        c64::new(random::<f64>() * 0.1, random::<f64>() * 0.1)
                    }
                });
                let x = Mat::from_fn(n, k, |_, _| c64::new(random(), random()));

                // rhs = L * U * x
                let mut ux = Mat::<c64>::zeros(n, k);
                for j in 0..k {
                    for i in 0..n {
                        let mut sum = c64::new(0.0, 0.0);
                        for p in i..n {
                            sum += lu.read(i, p) * x.read(p, j);
                        }
                        ux.write(i, j, sum);
                    }
                }
                let mut rhs = Mat::<c64>::zeros(n, k);
                for j in 0..k {
                    for i in 0..n {
                        let mut sum = ux.read(i, j);
                        for p in 0..i {
                            sum += lu.read(i, p) * ux.read(p, j);
                        }
                        rhs.write(i, j, sum);
                    }
                }

                solve_unit_lower_triangular_in_place(lu.as_ref(), rhs.as_mut(), Parallelism::None);
                solve_upper_triangular_in_place(lu.as_ref(), rhs.as_mut(), Parallelism::Rayon(0));

                for j in 0..k {
                    for i in 0..n {
                        assert_approx_eq!(rhs.read(i, j).re, x.read(i, j).re, 1e-10);
                        assert_approx_eq!(rhs.read(i, j).im, x.read(i, j).im, 1e-10);
                    }
                }
            }
        }
    }
}
