//! Matrix multiplication.

use crate::{ComplexField, Conj, MatMut, MatRef, Parallelism};
use equator::assert;
use reborrow::*;

/// Below this number of multiply-adds, products are computed with a plain loop instead of going
/// through `gemm`'s packing machinery.
const SMALL_MATMUL_THRESHOLD: usize = 16 * 16 * 16;

/// Computes the matrix product `[alpha * acc] + beta * op(lhs) * op(rhs)` and stores the result in
/// `acc`.
///
/// Performs the operation:
/// - `acc = beta * op(lhs) * op(rhs)` if `alpha` is `None` (in this case, the preexisting values
///   in `acc` are not read, so it is allowed to be a view over uninitialized values if
///   `E: Copy`),
/// - `acc = alpha * acc + beta * op(lhs) * op(rhs)` if `alpha` is `Some(_)`,
///
/// where `op(x)` is `x` or its conjugate depending on `conj_lhs` and `conj_rhs`.
///
/// # Panics
///
/// Panics if the matrix dimensions are not compatible for matrix multiplication.
/// i.e.
///  - `acc.nrows() == lhs.nrows()`
///  - `acc.ncols() == rhs.ncols()`
///  - `lhs.ncols() == rhs.nrows()`
#[track_caller]
pub fn matmul<E: ComplexField>(
    acc: MatMut<'_, E>,
    lhs: MatRef<'_, E>,
    rhs: MatRef<'_, E>,
    alpha: Option<E>,
    beta: E,
    conj_lhs: Conj,
    conj_rhs: Conj,
    parallelism: Parallelism,
) {
    assert!(all(
        acc.nrows() == lhs.nrows(),
        acc.ncols() == rhs.ncols(),
        lhs.ncols() == rhs.nrows(),
    ));

    let mut acc = acc;
    let m = acc.nrows();
    let n = acc.ncols();
    let k = lhs.ncols();

    if m == 0 || n == 0 {
        return;
    }

    if k == 0 {
        match alpha {
            None => acc.fill_zero(),
            Some(alpha) => {
                for j in 0..n {
                    for i in 0..m {
                        unsafe {
                            let v = acc.read_unchecked(i, j);
                            acc.write_unchecked(i, j, alpha * v)
                        };
                    }
                }
            }
        }
        return;
    }

    let conj = |x: E, c: Conj| if c.is_conj() { x.conj() } else { x };

    if m.saturating_mul(n).saturating_mul(k) <= SMALL_MATMUL_THRESHOLD {
        for j in 0..n {
            for i in 0..m {
                let mut sum = E::zero();
                for p in 0..k {
                    unsafe {
                        sum = sum
                            + conj(lhs.read_unchecked(i, p), conj_lhs)
                                * conj(rhs.read_unchecked(p, j), conj_rhs);
                    }
                }
                unsafe {
                    let value = match alpha {
                        Some(alpha) => alpha * acc.read_unchecked(i, j) + beta * sum,
                        None => beta * sum,
                    };
                    acc.write_unchecked(i, j, value);
                }
            }
        }
        return;
    }

    let gemm_parallelism = match parallelism {
        Parallelism::None => gemm::Parallelism::None,
        Parallelism::Rayon(0) => gemm::Parallelism::Rayon(rayon::current_num_threads()),
        Parallelism::Rayon(n_threads) => gemm::Parallelism::Rayon(n_threads),
    };

    unsafe {
        gemm::gemm(
            m,
            n,
            k,
            acc.rb_mut().as_ptr_mut(),
            acc.col_stride(),
            acc.row_stride(),
            alpha.is_some(),
            lhs.as_ptr(),
            lhs.col_stride(),
            lhs.row_stride(),
            rhs.as_ptr(),
            rhs.col_stride(),
            rhs.row_stride(),
            alpha.unwrap_or(E::zero()),
            beta,
            false,
            conj_lhs.is_conj(),
            conj_rhs.is_conj(),
            gemm_parallelism,
        )
    }
}

/// Returns `sum(op(lhs[i]) * rhs[i])` over two column vectors, where `op` optionally conjugates.
#[track_caller]
pub fn inner_prod_with_conj<E: ComplexField>(
    lhs: MatRef<'_, E>,
    conj_lhs: Conj,
    rhs: MatRef<'_, E>,
) -> E {
    assert!(all(
        lhs.ncols() == 1,
        rhs.ncols() == 1,
        lhs.nrows() == rhs.nrows(),
    ));
    let mut acc = E::zero();
    for i in 0..lhs.nrows() {
        let l = unsafe { lhs.read_unchecked(i, 0) };
        let l = if conj_lhs.is_conj() { l.conj() } else { l };
        acc = acc + l * unsafe { rhs.read_unchecked(i, 0) };
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use equator::assert;
    use crate::{c64, Mat};
    use assert_approx_eq::assert_approx_eq;
    use rand::random;

    fn naive(lhs: &Mat<c64>, rhs: &Mat<c64>, conj_lhs: bool) -> Mat<c64> {
        Mat::from_fn(lhs.nrows(), rhs.ncols(), |i, j| {
            let mut sum = c64::new(0.0, 0.0);
            for p in 0..lhs.ncols() {
                let l = lhs.read(i, p);
                sum += if conj_lhs { l.conj() } else { l } * rhs.read(p, j);
            }
            sum
        })
    }

    #[test]
    fn matches_naive_product_small_and_large() {
        for (m, n, k) in [(3, 4, 5), (40, 33, 21), (1, 70, 64)] {
            let lhs = Mat::from_fn(m, k, |_, _| c64::new(random(), random()));
            let rhs = Mat::from_fn(k, n, |_, _| c64::new(random(), random()));
            let init = Mat::from_fn(m, n, |_, _| c64::new(random(), random()));

            for conj_lhs in [Conj::No, Conj::Yes] {
                let mut acc = init.clone();
                matmul(
                    acc.as_mut(),
                    lhs.as_ref(),
                    rhs.as_ref(),
                    Some(c64::new(2.0, 0.0)),
                    c64::new(-1.0, 0.5),
                    conj_lhs,
                    Conj::No,
                    Parallelism::Rayon(0),
                );

                let target = naive(&lhs, &rhs, conj_lhs.is_conj());
                for j in 0..n {
                    for i in 0..m {
                        let expected =
                            init.read(i, j) * 2.0 + target.read(i, j) * c64::new(-1.0, 0.5);
                        assert_approx_eq!(acc.read(i, j).re, expected.re, 1e-10);
                        assert_approx_eq!(acc.read(i, j).im, expected.im, 1e-10);
                    }
                }
            }
        }
    }

    #[test]
    fn empty_inner_dimension_scales_accumulator() {
        let lhs = Mat::<f64>::zeros(3, 0);
        let rhs = Mat::<f64>::zeros(0, 2);
        let mut acc = Mat::from_fn(3, 2, |i, j| (i + j) as f64);
        matmul(
            acc.as_mut(),
            lhs.as_ref(),
            rhs.as_ref(),
            Some(3.0),
            1.0,
            Conj::No,
            Conj::No,
            Parallelism::None,
        );
        assert_eq!(acc.read(2, 1), 9.0);

        matmul(
            acc.as_mut(),
            lhs.as_ref(),
            rhs.as_ref(),
            None,
            1.0,
            Conj::No,
            Conj::No,
            Parallelism::None,
        );
        assert_eq!(acc.read(2, 1), 0.0);
    }
}
