// Algorithm ported from Eigen, a lightweight C++ template library
// for linear algebra.
//
// Copyright (C) 2008-2010 Gael Guennebaud <gael.guennebaud@inria.fr>
// Copyright (C) 2010 Jitse Niesen <jitse@maths.leeds.ac.uk>
//
// This Source Code Form is subject to the terms of the Mozilla
// Public License v. 2.0. If a copy of the MPL was not distributed
// with this file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::RealField;
use equator::assert;

/// Maximum number of implicit QR sweeps per eigenvalue.
pub const MAX_SWEEPS_PER_EIGENVALUE: usize = 30;

struct GivensRotation<E> {
    c: E,
    s: E,
}

impl<E: RealField> GivensRotation<E> {
    fn make_givens(p: E, q: E) -> Self {
        let zero = E::zero();
        let one = E::one();
        if q == zero {
            Self {
                c: if p < zero { -one } else { one },
                s: zero,
            }
        } else if p == zero {
            Self {
                c: zero,
                s: if q < zero { -one } else { one },
            }
        } else if p.abs() > q.abs() {
            let t = q / p;
            let mut u = (one + t * t).sqrt();
            if p < zero {
                u = -u;
            }
            let c = u.inv();
            let s = -t * c;
            Self { c, s }
        } else {
            let t = p / q;
            let mut u = (one + t * t).sqrt();
            if q < zero {
                u = -u;
            }
            let s = -u.inv();
            let c = -t * s;
            Self { c, s }
        }
    }
}

/// Computes the eigenvalues of the real symmetric tridiagonal matrix with diagonal `diag` and
/// subdiagonal `offdiag`, using the implicit QR algorithm with Wilkinson shifts.
///
/// On exit `diag` holds the eigenvalues in ascending order and `offdiag` is destroyed.
/// Returns the number of subdiagonal entries that did not converge to zero within
/// `MAX_SWEEPS_PER_EIGENVALUE * n` sweeps. In that case `diag` is left unsorted.
#[track_caller]
pub fn compute_tridiag_real_eigenvalues_qr_algorithm<E: RealField>(
    diag: &mut [E],
    offdiag: &mut [E],
    epsilon: E,
    consider_zero_threshold: E,
) -> usize {
    let n = diag.len();
    if n <= 1 {
        return 0;
    }
    assert!(offdiag.len() == n - 1);

    let zero = E::zero();
    let max_iter = MAX_SWEEPS_PER_EIGENVALUE * n;

    let mut end = n - 1;
    let mut start;
    let mut iter = 0;

    while end > 0 {
        for i in 0..end {
            if offdiag[i].abs() < consider_zero_threshold
                || offdiag[i].abs() <= epsilon * (diag[i].abs() + diag[i + 1].abs())
            {
                offdiag[i] = zero;
            }
        }

        while end > 0 && offdiag[end - 1] == zero {
            end -= 1;
        }

        if end == 0 {
            break;
        }

        iter += 1;
        if iter > max_iter {
            return offdiag[..end].iter().filter(|e| **e != zero).count();
        }

        start = end - 1;
        while start > 0 && offdiag[start - 1] != zero {
            start -= 1;
        }

        // Wilkinson shift.
        let td = (diag[end - 1] - diag[end]) * E::from_f64(0.5);
        let e = offdiag[end - 1];
        let mut mu = diag[end];

        if td == zero {
            mu = mu - e.abs();
        } else if e != zero {
            let e2 = e * e;
            let h = (td * td + e2).sqrt();
            let h = if td > zero { h } else { -h };
            if e2 == zero {
                mu = mu - e / ((td + h) / e);
            } else {
                mu = mu - e2 / (td + h);
            }
        }

        let mut x = diag[start] - mu;
        let mut z = offdiag[start];

        let mut k = start;
        while k < end && z != zero {
            let rot = GivensRotation::make_givens(x, z);
            let (c, s) = (rot.c, rot.s);

            // T = G^T T G
            let sdk = s * diag[k] + c * offdiag[k];
            let dkp1 = s * offdiag[k] + c * diag[k + 1];

            diag[k] = c * (c * diag[k] - s * offdiag[k]) - s * (c * offdiag[k] - s * diag[k + 1]);
            diag[k + 1] = s * sdk + c * dkp1;
            offdiag[k] = c * sdk - s * dkp1;

            if k > start {
                offdiag[k - 1] = c * offdiag[k - 1] - s * z;
            }

            x = offdiag[k];
            if k < end - 1 {
                z = -s * offdiag[k + 1];
                offdiag[k + 1] = c * offdiag[k + 1];
            }

            k += 1;
        }
    }

    diag.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(core::cmp::Ordering::Equal));
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use equator::assert;
    use assert_approx_eq::assert_approx_eq;

    #[track_caller]
    fn test_eigenvalues(diag: &[f64], offdiag: &[f64], expected: &[f64]) {
        let mut d = diag.to_vec();
        let mut e = offdiag.to_vec();
        let unconverged = compute_tridiag_real_eigenvalues_qr_algorithm(
            &mut d,
            &mut e,
            f64::EPSILON,
            f64::MIN_POSITIVE,
        );
        assert_eq!(unconverged, 0);
        for (computed, expected) in d.iter().zip(expected) {
            assert_approx_eq!(*computed, *expected, 1e-12);
        }

        // eigenvalues preserve the trace
        let trace: f64 = diag.iter().sum();
        assert_approx_eq!(d.iter().sum::<f64>(), trace, 1e-12);
    }

    #[test]
    fn test_evd_2_0() {
        test_eigenvalues(&[1.0, 1.0], &[0.0], &[1.0, 1.0]);
    }

    #[test]
    fn test_evd_2_1() {
        test_eigenvalues(&[2.0, 2.0], &[1.0], &[1.0, 3.0]);
    }

    #[test]
    fn test_evd_3_decoupled() {
        test_eigenvalues(&[5.0, 3.0, -1.0], &[0.0, 0.0], &[-1.0, 3.0, 5.0]);
    }

    #[test]
    fn test_evd_laplacian() {
        // the 1d laplacian has eigenvalues 2 - 2 cos(k pi / (n + 1))
        let n = 12;
        let diag = vec![2.0; n];
        let offdiag = vec![-1.0; n - 1];
        let expected: Vec<f64> = (1..=n)
            .map(|k| 2.0 - 2.0 * (k as f64 * core::f64::consts::PI / (n + 1) as f64).cos())
            .collect();
        test_eigenvalues(&diag, &offdiag, &expected);
    }

    #[test]
    fn test_glued_wilkinson() {
        let diag = [
            3.0, 2.0, 1.0, 0.0, 1.0, 2.0, 3.0, 3.0, 2.0, 1.0, 0.0, 1.0, 2.0, 3.0,
        ];
        let x = 1e-6;
        let offdiag = [
            1.0, 1.0, 1.0, 1.0, 1.0, 1.0, x, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0,
        ];
        let mut d = diag.to_vec();
        let mut e = offdiag.to_vec();
        let unconverged = compute_tridiag_real_eigenvalues_qr_algorithm(
            &mut d,
            &mut e,
            f64::EPSILON,
            f64::MIN_POSITIVE,
        );
        assert_eq!(unconverged, 0);
        for w in d.windows(2) {
            assert!(w[0] <= w[1]);
        }
        assert_approx_eq!(d.iter().sum::<f64>(), diag.iter().sum::<f64>(), 1e-10);
    }
}
