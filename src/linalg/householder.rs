//! Elementary reflectors.
//!
//! A reflector is stored as its scalar factor `tau` and its essential part `v`, the trailing
//! entries of a vector whose head is implicitly `1`. It represents the transform
//! `H = I - tau * [1; v] * [1; v]^H`.

use crate::{linalg::matmul::matmul, ComplexField, Conj, MatMut, MatRef, Parallelism, RealField};
use equator::assert;
use reborrow::*;

/// Euclidean norm of a column vector.
///
/// Entries are scaled by the largest magnitude before squaring, so tiny or huge inputs neither
/// underflow nor overflow.
pub fn norm_l2<E: ComplexField>(col: MatRef<'_, E>) -> E::Real {
    let zero = E::Real::zero();
    let mut max = zero;
    for i in 0..col.nrows() {
        max = max.max(unsafe { col.read_unchecked(i, 0) }.abs());
    }
    if max == zero {
        return zero;
    }

    let inv = max.inv();
    let mut acc = zero;
    for i in 0..col.nrows() {
        acc = acc + unsafe { col.read_unchecked(i, 0) }.scale_real(inv).abs2();
    }
    max * acc.sqrt()
}

/// `sqrt(a^2 + b^2)` for nonnegative `a` and `b`, without intermediate overflow.
#[inline]
fn hypot<T: RealField>(a: T, b: T) -> T {
    let max = a.max(b);
    if max == T::zero() {
        return max;
    }
    let min = if a >= b { b } else { a };
    let ratio = min / max;
    max * (T::one() + ratio * ratio).sqrt()
}

/// `1 / value`, computed without squaring the magnitude of `value`.
#[inline]
fn scaled_inv<E: ComplexField>(value: E) -> E {
    let inv_abs = value.abs().inv();
    value.scale_real(inv_abs).conj().scale_real(inv_abs)
}

/// Computes a reflector `H` such that `H^H * [head; tail] = [beta; 0]` where `beta` is real.
///
/// `tail` is overwritten with the essential part of the reflector. Returns `(tau, beta)`.
/// When `tail` is zero and `head` is real, `tau` is zero and `H` is the identity.
#[track_caller]
pub fn make_householder_in_place<E: ComplexField>(
    essential: MatMut<'_, E>,
    head: E,
) -> (E, E::Real) {
    assert!(essential.ncols() == 1);
    let mut essential = essential;

    let tail_norm = norm_l2(essential.rb());
    let (head_re, head_im) = head.into_real_imag();
    let zero = E::Real::zero();

    if tail_norm == zero && head_im == zero {
        return (E::zero(), head_re);
    }

    let norm = hypot(head.abs(), tail_norm);
    let beta = if head_re >= zero { -norm } else { norm };

    let tau = E::from_real_imag((beta - head_re) / beta, -head_im / beta);
    let scale = scaled_inv(head - E::from_real(beta));
    for i in 0..essential.nrows() {
        unsafe {
            let v = essential.read_unchecked(i, 0);
            essential.write_unchecked(i, 0, v * scale);
        }
    }

    (tau, beta)
}

/// Computes `matrix := (I - tau * [1; v] * [1; v]^H) * matrix`, where `v` is `essential`.
///
/// `work` must be a `1 x matrix.ncols()` scratch row.
#[track_caller]
pub fn apply_householder_on_the_left<E: ComplexField>(
    essential: MatRef<'_, E>,
    tau: E,
    matrix: MatMut<'_, E>,
    work: MatMut<'_, E>,
    parallelism: Parallelism,
) {
    assert!(all(
        essential.ncols() == 1,
        essential.nrows() + 1 == matrix.nrows(),
        work.nrows() == 1,
        work.ncols() == matrix.ncols(),
    ));

    if tau.is_zero() || matrix.ncols() == 0 {
        return;
    }

    let mut work = work;
    let (mut first_row, mut bottom) = matrix.split_at_row(1);

    // work = [1; v]^H * matrix
    work.copy_from(first_row.rb());
    matmul(
        work.rb_mut(),
        essential.transpose(),
        bottom.rb(),
        Some(E::one()),
        E::one(),
        Conj::Yes,
        Conj::No,
        parallelism,
    );

    for j in 0..work.ncols() {
        unsafe {
            let v = first_row.read_unchecked(0, j) - tau * work.read_unchecked(0, j);
            first_row.write_unchecked(0, j, v);
        }
    }
    matmul(
        bottom.rb_mut(),
        essential,
        work.rb(),
        Some(E::one()),
        -tau,
        Conj::No,
        Conj::No,
        parallelism,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use equator::assert;
    use crate::{c64, Mat};
    use assert_approx_eq::assert_approx_eq;
    use rand::random;

    #[test]
    fn reflector_annihilates_tail() {
        for n in [1, 2, 7] {
            let x = Mat::from_fn(n + 1, 1, |_, _| c64::new(random(), random()));
            let mut essential = Mat::from_fn(n, 1, |i, _| x.read(i + 1, 0));
            let (tau, beta) = make_householder_in_place(essential.as_mut(), x.read(0, 0));

            // H^H x = (I - conj(tau) u u^H) x
            let mut hx = x.clone();
            let mut work = Mat::<c64>::zeros(1, 1);
            apply_householder_on_the_left(
                essential.as_ref(),
                tau.conj(),
                hx.as_mut(),
                work.as_mut(),
                Parallelism::None,
            );

            assert_approx_eq!(hx.read(0, 0).re, beta, 1e-12);
            assert_approx_eq!(hx.read(0, 0).im, 0.0, 1e-12);
            for i in 1..n + 1 {
                assert_approx_eq!(hx.read(i, 0).norm(), 0.0, 1e-12);
            }
        }
    }

    #[test]
    fn norm_does_not_underflow_or_overflow() {
        for scale in [1e-170, 1.0, 1e160] {
            let x = Mat::from_fn(3, 1, |i, _| c64::new(scale * (i + 1) as f64, -scale));
            let expected = scale * 17.0f64.sqrt();
            assert!((norm_l2(x.as_ref()) - expected).abs() <= 1e-14 * expected);
        }
        let x = Mat::from_fn(2, 1, |i, _| if i == 0 { 3e-30f32 } else { 4e-30f32 });
        assert!((norm_l2(x.as_ref()) - 5e-30).abs() <= 1e-6 * 5e-30);
    }

    #[test]
    fn reflector_of_extreme_vectors() {
        for scale in [1e-170, 1e160] {
            let x = Mat::from_fn(4, 1, |i, _| c64::new(scale * (i as f64 + 0.5), scale));
            let mut essential = Mat::from_fn(3, 1, |i, _| x.read(i + 1, 0));
            let (tau, beta) = make_householder_in_place(essential.as_mut(), x.read(0, 0));
            assert!(tau != c64::new(0.0, 0.0));
            assert!((beta.abs() - norm_l2(x.as_ref())).abs() <= 1e-14 * beta.abs());

            let mut hx = x.clone();
            let mut work = Mat::<c64>::zeros(1, 1);
            apply_householder_on_the_left(
                essential.as_ref(),
                tau.conj(),
                hx.as_mut(),
                work.as_mut(),
                Parallelism::None,
            );
            for i in 1..4 {
                assert!(hx.read(i, 0).norm() <= 1e-14 * beta.abs());
            }
        }
    }

    #[test]
    fn zero_tail_with_real_head_is_identity() {
        let mut essential = Mat::<f64>::zeros(3, 1);
        let (tau, beta) = make_householder_in_place(essential.as_mut(), -2.5);
        assert_eq!(tau, 0.0);
        assert_eq!(beta, -2.5);
    }
}
