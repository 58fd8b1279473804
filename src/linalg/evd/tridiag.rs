//! Reduction of a symmetric or Hermitian matrix to real symmetric tridiagonal form.
//!
//! Only the triangle selected by [`Side`] is referenced, the other one is neither read nor
//! written. For [`Side::Lower`], the reflector `H(i)` annihilates `A(i+2.., i)` and its essential
//! part is stored there. For [`Side::Upper`], the reflectors are built from the last column
//! backwards and stored above the superdiagonal, so that `Q = H(n-2) * ... * H(0)`.
//!
//! The upper variant is computed by running the lower kernels on the view of the matrix with
//! reversed rows and columns, which maps the upper triangle onto the lower one.

use crate::{
    linalg::{
        householder::{apply_householder_on_the_left, make_householder_in_place},
        matmul::{inner_prod_with_conj, matmul},
        temp_mat_req, temp_mat_zeroed,
    },
    ComplexField, Conj, MatMut, MatRef, Parallelism, Side,
};
use dyn_stack::{PodStack, SizeOverflow, StackReq};
use equator::assert;
use reborrow::*;

/// Tuning parameters of the blocked reduction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct TridiagParams {
    /// Number of reflectors accumulated before each trailing update.
    pub blocksize: usize,
    /// Matrices of at most this dimension are reduced by the unblocked algorithm.
    pub crossover: usize,
}

impl Default for TridiagParams {
    fn default() -> Self {
        Self {
            blocksize: 32,
            crossover: 128,
        }
    }
}

impl TridiagParams {
    pub fn new(blocksize: usize, crossover: usize) -> Self {
        Self {
            blocksize,
            crossover,
        }
    }
}

const HER2K_BLOCKSIZE: usize = 32;

/// Computes the size and alignment of the workspace required by
/// [`tridiagonalize_in_place_unblocked`].
pub fn tridiagonalize_in_place_unblocked_req<E: ComplexField>(
    n: usize,
) -> Result<StackReq, SizeOverflow> {
    temp_mat_req::<E>(n, 1)
}

/// Computes the size and alignment of the workspace required by [`tridiagonalize_in_place`].
pub fn tridiagonalize_in_place_req<E: ComplexField>(
    n: usize,
    params: TridiagParams,
) -> Result<StackReq, SizeOverflow> {
    let unblocked = tridiagonalize_in_place_unblocked_req::<E>(n)?;
    if !uses_blocked(n, params) {
        return Ok(unblocked);
    }
    let nb = params.blocksize;
    StackReq::try_any_of([
        unblocked,
        StackReq::try_all_of([temp_mat_req::<E>(n, nb)?, temp_mat_req::<E>(nb, 1)?])?,
    ])
}

#[inline]
fn uses_blocked(n: usize, params: TridiagParams) -> bool {
    params.blocksize > 1 && params.crossover.max(params.blocksize) < n
}

#[track_caller]
fn check_dims<E: ComplexField>(
    a: &MatMut<'_, E>,
    diag: &MatMut<'_, E::Real>,
    offdiag: &MatMut<'_, E::Real>,
    tau: &MatMut<'_, E>,
) {
    let n = a.nrows();
    let n1 = n.saturating_sub(1);
    assert!(all(
        a.ncols() == n,
        diag.nrows() == n,
        diag.ncols() == 1,
        offdiag.nrows() == n1,
        offdiag.ncols() == 1,
        tau.nrows() == n1,
        tau.ncols() == 1,
    ));
}

/// Reduces the self-adjoint matrix `a` to tridiagonal form one column at a time.
///
/// On exit, `diag` holds the diagonal of `T`, `offdiag` its subdiagonal, `tau` the reflector
/// factors, and the referenced triangle of `a` the essential parts of the reflectors.
#[track_caller]
pub fn tridiagonalize_in_place_unblocked<E: ComplexField>(
    uplo: Side,
    a: MatMut<'_, E>,
    diag: MatMut<'_, E::Real>,
    offdiag: MatMut<'_, E::Real>,
    tau: MatMut<'_, E>,
    stack: PodStack<'_>,
) {
    check_dims(&a, &diag, &offdiag, &tau);
    match uplo {
        Side::Lower => tridiag_unblocked_lower(a, diag, offdiag, tau, stack),
        Side::Upper => tridiag_unblocked_lower(
            a.reverse_rows_and_cols(),
            diag.reverse_rows_and_cols(),
            offdiag.reverse_rows_and_cols(),
            tau.reverse_rows_and_cols(),
            stack,
        ),
    }
}

/// Reduces the self-adjoint matrix `a` to tridiagonal form.
///
/// Same output as [`tridiagonalize_in_place_unblocked`]. Matrices larger than the crossover
/// dimension are processed by panels of `params.blocksize` reflectors, each followed by a rank
/// `2 * blocksize` update of the trailing matrix.
#[track_caller]
pub fn tridiagonalize_in_place<E: ComplexField>(
    uplo: Side,
    a: MatMut<'_, E>,
    diag: MatMut<'_, E::Real>,
    offdiag: MatMut<'_, E::Real>,
    tau: MatMut<'_, E>,
    params: TridiagParams,
    parallelism: Parallelism,
    stack: PodStack<'_>,
) {
    check_dims(&a, &diag, &offdiag, &tau);
    match uplo {
        Side::Lower => tridiag_blocked_lower(a, diag, offdiag, tau, params, parallelism, stack),
        Side::Upper => tridiag_blocked_lower(
            a.reverse_rows_and_cols(),
            diag.reverse_rows_and_cols(),
            offdiag.reverse_rows_and_cols(),
            tau.reverse_rows_and_cols(),
            params,
            parallelism,
            stack,
        ),
    }
}

#[inline]
fn make_diag_real<E: ComplexField>(a: &mut MatMut<'_, E>, i: usize) {
    let v = a.read(i, i);
    a.write(i, i, E::from_real(v.real()));
}

/// `out = A * v`, where `A` is self-adjoint and only its lower triangle is read.
fn hemv_lower<E: ComplexField>(out: MatMut<'_, E>, a: MatRef<'_, E>, v: MatRef<'_, E>) {
    let mut out = out;
    let m = a.nrows();
    out.fill_zero();
    for j in 0..m {
        unsafe {
            let vj = v.read_unchecked(j, 0);
            let ajj = E::from_real(a.read_unchecked(j, j).real());
            let mut acc = out.read_unchecked(j, 0) + ajj * vj;
            for i in j + 1..m {
                let aij = a.read_unchecked(i, j);
                let oi = out.read_unchecked(i, 0);
                out.write_unchecked(i, 0, oi + aij * vj);
                acc = acc + aij.conj() * v.read_unchecked(i, 0);
            }
            out.write_unchecked(j, 0, acc);
        }
    }
}

/// `A -= v * x^H + x * v^H`, updating only the lower triangle and keeping the diagonal real.
fn her2_lower<E: ComplexField>(a: MatMut<'_, E>, v: MatRef<'_, E>, x: MatRef<'_, E>) {
    let mut a = a;
    let m = a.nrows();
    for j in 0..m {
        unsafe {
            let vj = v.read_unchecked(j, 0).conj();
            let xj = x.read_unchecked(j, 0).conj();
            for i in j..m {
                let update = v.read_unchecked(i, 0) * xj + x.read_unchecked(i, 0) * vj;
                let aij = a.read_unchecked(i, j);
                a.write_unchecked(i, j, aij - update);
            }
        }
        make_diag_real(&mut a, j);
    }
}

/// `A -= v * w^H + w * v^H`, updating only the lower triangle and keeping the diagonal real.
fn her2k_lower<E: ComplexField>(
    a: MatMut<'_, E>,
    v: MatRef<'_, E>,
    w: MatRef<'_, E>,
    parallelism: Parallelism,
) {
    let mut a = a;
    let m = a.nrows();
    let k = v.ncols();

    let mut col = 0;
    while col < m {
        let bs = HER2K_BLOCKSIZE.min(m - col);
        let below = m - col - bs;

        {
            let mut dst = a.rb_mut().submatrix(col + bs, col, below, bs);
            for (lhs, rhs) in [(v, w), (w, v)] {
                matmul(
                    dst.rb_mut(),
                    lhs.submatrix(col + bs, 0, below, k),
                    rhs.submatrix(col, 0, bs, k).transpose(),
                    Some(E::one()),
                    -E::one(),
                    Conj::No,
                    Conj::Yes,
                    parallelism,
                );
            }
        }

        for j in col..col + bs {
            for i in j..col + bs {
                let mut update = E::zero();
                for p in 0..k {
                    unsafe {
                        update = update
                            + v.read_unchecked(i, p) * w.read_unchecked(j, p).conj()
                            + w.read_unchecked(i, p) * v.read_unchecked(j, p).conj();
                    }
                }
                let aij = a.read(i, j);
                a.write(i, j, aij - update);
            }
            make_diag_real(&mut a, j);
        }

        col += bs;
    }
}

fn tridiag_unblocked_lower<E: ComplexField>(
    a: MatMut<'_, E>,
    diag: MatMut<'_, E::Real>,
    offdiag: MatMut<'_, E::Real>,
    tau: MatMut<'_, E>,
    stack: PodStack<'_>,
) {
    let mut a = a;
    let mut diag = diag;
    let mut offdiag = offdiag;
    let mut tau = tau;

    let n = a.nrows();
    if n == 0 {
        return;
    }

    let (mut work, _) = temp_mat_zeroed::<E>(n, 1, stack);

    make_diag_real(&mut a, 0);
    for i in 0..n - 1 {
        let m = n - i - 1;
        let head = a.read(i + 1, i);
        let (tau_i, beta) =
            make_householder_in_place(a.rb_mut().submatrix(i + 2, i, m - 1, 1), head);
        offdiag.write(i, 0, beta);

        if tau_i.is_zero() {
            make_diag_real(&mut a, i + 1);
        } else {
            a.write(i + 1, i, E::one());
            let (_, _, left, a22) = a.rb_mut().split_at(i + 1, i + 1);
            let v = left.into_const().col(i);
            let mut x = work.rb_mut().submatrix(0, 0, m, 1);

            // x = tau * A22 * v - (tau^2 / 2) * (v^H * A22 * v) * v
            hemv_lower(x.rb_mut(), a22.rb(), v);
            for r in 0..m {
                let xr = x.read(r, 0);
                x.write(r, 0, tau_i * xr);
            }
            let alpha = E::from_f64(-0.5) * tau_i * inner_prod_with_conj(x.rb(), Conj::Yes, v);
            for r in 0..m {
                let xr = x.read(r, 0);
                x.write(r, 0, xr + alpha * v.read(r, 0));
            }

            her2_lower(a22, v, x.rb());
        }

        a.write(i + 1, i, E::from_real(beta));
        diag.write(i, 0, a.read(i, i).real());
        tau.write(i, 0, tau_i);
    }
    diag.write(n - 1, 0, a.read(n - 1, n - 1).real());
}

/// Reduces the first `w.ncols()` columns of `a` and accumulates the matrix `W` such that the
/// trailing matrix update is `A22 - V * W^H - W * V^H`.
fn panel_lower<E: ComplexField>(
    a: MatMut<'_, E>,
    offdiag: MatMut<'_, E::Real>,
    tau: MatMut<'_, E>,
    w: MatMut<'_, E>,
    tmp: MatMut<'_, E>,
    parallelism: Parallelism,
) {
    let mut a = a;
    let mut offdiag = offdiag;
    let mut tau = tau;
    let mut w = w;
    let mut tmp = tmp;

    let m = a.nrows();
    let nb = w.ncols();

    for j in 0..nb {
        make_diag_real(&mut a, j);
        if j > 0 {
            let (_, _, a_left, mut a_right) = a.rb_mut().split_at(j, j);
            matmul(
                a_right.rb_mut().col(0),
                a_left.rb(),
                w.rb().submatrix(j, 0, 1, j).transpose(),
                Some(E::one()),
                -E::one(),
                Conj::No,
                Conj::Yes,
                parallelism,
            );
            matmul(
                a_right.rb_mut().col(0),
                w.rb().submatrix(j, 0, m - j, j),
                a_left.rb().row(0).transpose(),
                Some(E::one()),
                -E::one(),
                Conj::No,
                Conj::Yes,
                parallelism,
            );
        }
        make_diag_real(&mut a, j);

        if j + 1 >= m {
            continue;
        }

        let head = a.read(j + 1, j);
        let (tau_j, beta) =
            make_householder_in_place(a.rb_mut().submatrix(j + 2, j, m - j - 2, 1), head);
        offdiag.write(j, 0, beta);
        tau.write(j, 0, tau_j);
        a.write(j + 1, j, E::one());

        let (_, _, left, trailing) = a.rb().split_at(j + 1, j + 1);
        let v = left.col(j);
        let a_prev = left.submatrix(0, 0, m - j - 1, j);

        let (_, _, w_left, w_right) = w.rb_mut().split_at(j + 1, j);
        let mut wj = w_right.col(0);

        hemv_lower(wj.rb_mut(), trailing, v);
        if j > 0 {
            let mut t = tmp.rb_mut().submatrix(0, 0, j, 1);
            for (basis, other) in [(w_left.rb(), a_prev), (a_prev, w_left.rb())] {
                matmul(
                    t.rb_mut(),
                    basis.transpose(),
                    v,
                    None,
                    E::one(),
                    Conj::Yes,
                    Conj::No,
                    parallelism,
                );
                matmul(
                    wj.rb_mut(),
                    other,
                    t.rb(),
                    Some(E::one()),
                    -E::one(),
                    Conj::No,
                    Conj::No,
                    parallelism,
                );
            }
        }

        for r in 0..m - j - 1 {
            let x = wj.read(r, 0);
            wj.write(r, 0, tau_j * x);
        }
        let alpha = E::from_f64(-0.5) * tau_j * inner_prod_with_conj(wj.rb(), Conj::Yes, v);
        for r in 0..m - j - 1 {
            let x = wj.read(r, 0);
            wj.write(r, 0, x + alpha * v.read(r, 0));
        }
    }
}

fn tridiag_blocked_lower<E: ComplexField>(
    a: MatMut<'_, E>,
    diag: MatMut<'_, E::Real>,
    offdiag: MatMut<'_, E::Real>,
    tau: MatMut<'_, E>,
    params: TridiagParams,
    parallelism: Parallelism,
    stack: PodStack<'_>,
) {
    let mut a = a;
    let mut diag = diag;
    let mut offdiag = offdiag;
    let mut tau = tau;
    let mut stack = stack;

    let n = a.nrows();
    let mut i = 0;

    if uses_blocked(n, params) {
        let nb = params.blocksize;
        let nx = params.crossover.max(nb);

        let (mut w, stack) = temp_mat_zeroed::<E>(n, nb, stack.rb_mut());
        let (mut tmp, _) = temp_mat_zeroed::<E>(nb, 1, stack);

        while i + nx < n {
            let m = n - i;
            panel_lower(
                a.rb_mut().submatrix(i, i, m, m),
                offdiag.rb_mut().submatrix(i, 0, nb, 1),
                tau.rb_mut().submatrix(i, 0, nb, 1),
                w.rb_mut().submatrix(0, 0, m, nb),
                tmp.rb_mut(),
                parallelism,
            );

            let (_, _, panel, trailing) = a.rb_mut().submatrix(i, i, m, m).split_at(nb, nb);
            her2k_lower(
                trailing,
                panel.rb(),
                w.rb().submatrix(nb, 0, m - nb, nb),
                parallelism,
            );

            for j in i..i + nb {
                let e = offdiag.read(j, 0);
                a.write(j + 1, j, E::from_real(e));
                diag.write(j, 0, a.read(j, j).real());
            }
            i += nb;
        }
    }

    let m = n - i;
    tridiag_unblocked_lower(
        a.submatrix(i, i, m, m),
        diag.submatrix(i, 0, m, 1),
        offdiag.submatrix(i, 0, m.saturating_sub(1), 1),
        tau.submatrix(i, 0, m.saturating_sub(1), 1),
        stack,
    );
}

/// Computes the size and alignment of the workspace required by [`generate_q_in_place`].
pub fn generate_q_in_place_req<E: ComplexField>(n: usize) -> Result<StackReq, SizeOverflow> {
    temp_mat_req::<E>(1, n)
}

/// Overwrites `a`, which holds the output of a tridiagonal reduction with the same `uplo`, with
/// the unitary matrix `Q` such that `A = Q * T * Q^H`.
///
/// Both triangles of `a` are written.
#[track_caller]
pub fn generate_q_in_place<E: ComplexField>(
    uplo: Side,
    a: MatMut<'_, E>,
    tau: MatRef<'_, E>,
    parallelism: Parallelism,
    stack: PodStack<'_>,
) {
    let n = a.nrows();
    assert!(all(
        a.ncols() == n,
        tau.nrows() == n.saturating_sub(1),
        tau.ncols() == 1,
    ));
    match uplo {
        Side::Lower => generate_q_lower(a, tau, parallelism, stack),
        Side::Upper => generate_q_lower(
            a.reverse_rows_and_cols(),
            tau.reverse_rows_and_cols(),
            parallelism,
            stack,
        ),
    }
}

fn generate_q_lower<E: ComplexField>(
    a: MatMut<'_, E>,
    tau: MatRef<'_, E>,
    parallelism: Parallelism,
    stack: PodStack<'_>,
) {
    let mut a = a;
    let n = a.nrows();
    if n == 0 {
        return;
    }

    // the reflector of column i becomes the reflector of column i + 1 of the trailing block
    for j in (1..n).rev() {
        a.write(0, j, E::zero());
        for i in j + 1..n {
            let v = a.read(i, j - 1);
            a.write(i, j, v);
        }
    }
    a.write(0, 0, E::one());
    for i in 1..n {
        a.write(i, 0, E::zero());
    }

    let (mut work, _) = temp_mat_zeroed::<E>(1, n, stack);
    let mut q = a.submatrix(1, 1, n - 1, n - 1);
    let k = n - 1;

    for i in (0..k).rev() {
        let tau_i = tau.read(i, 0);
        if i + 1 < k {
            q.write(i, i, E::one());
            let (_, _, left, right) = q.rb_mut().split_at(i, i + 1);
            apply_householder_on_the_left(
                left.rb().submatrix(1, i, k - i - 1, 1),
                tau_i,
                right,
                work.rb_mut().submatrix(0, 0, 1, k - i - 1),
                parallelism,
            );
        }
        for r in i + 1..k {
            let v = q.read(r, i);
            q.write(r, i, -tau_i * v);
        }
        q.write(i, i, E::one() - tau_i);
        for r in 0..i {
            q.write(r, i, E::zero());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use equator::assert;
    use crate::{c64, mat::norm_frobenius, Mat, RealField};
    use dyn_stack::GlobalPodBuffer;
    use rand::random;

    macro_rules! make_stack {
        ($req: expr) => {
            ::dyn_stack::PodStack::new(&mut GlobalPodBuffer::new($req.unwrap()))
        };
    }

    fn random_hermitian<E: ComplexField>(n: usize) -> Mat<E> {
        let b = Mat::from_fn(n, n, |_, _| {
            E::from_real_imag(
                E::Real::from_f64(random::<f64>() - 0.5),
                E::Real::from_f64(random::<f64>() - 0.5),
            )
        });
        Mat::from_fn(n, n, |i, j| b.read(i, j) + b.read(j, i).conj())
    }

    fn in_referenced_triangle(uplo: Side, i: usize, j: usize) -> bool {
        match uplo {
            Side::Lower => i >= j,
            Side::Upper => i <= j,
        }
    }

    fn check<E: ComplexField>(n: usize, uplo: Side, params: Option<TridiagParams>) {
        let a = random_hermitian::<E>(n);
        let sentinel = E::from_f64(f64::NAN);

        let mut factors = Mat::from_fn(n, n, |i, j| {
            if in_referenced_triangle(uplo, i, j) {
                a.read(i, j)
            } else {
                sentinel
            }
        });
        let mut diag = Mat::<E::Real>::zeros(n, 1);
        let mut offdiag = Mat::<E::Real>::zeros(n.saturating_sub(1), 1);
        let mut tau = Mat::<E>::zeros(n.saturating_sub(1), 1);

        match params {
            Some(params) => tridiagonalize_in_place(
                uplo,
                factors.as_mut(),
                diag.as_mut(),
                offdiag.as_mut(),
                tau.as_mut(),
                params,
                Parallelism::None,
                make_stack!(tridiagonalize_in_place_req::<E>(n, params)),
            ),
            None => tridiagonalize_in_place_unblocked(
                uplo,
                factors.as_mut(),
                diag.as_mut(),
                offdiag.as_mut(),
                tau.as_mut(),
                make_stack!(tridiagonalize_in_place_unblocked_req::<E>(n)),
            ),
        }

        for j in 0..n {
            for i in 0..n {
                if !in_referenced_triangle(uplo, i, j) {
                    assert!(factors.read(i, j) != factors.read(i, j));
                }
            }
        }

        let mut q = factors.clone();
        generate_q_in_place(
            uplo,
            q.as_mut(),
            tau.as_ref(),
            Parallelism::None,
            make_stack!(generate_q_in_place_req::<E>(n)),
        );

        let t = Mat::from_fn(n, n, |i, j| {
            if i == j {
                E::from_real(diag.read(i, 0))
            } else if i == j + 1 {
                E::from_real(offdiag.read(j, 0))
            } else if j == i + 1 {
                E::from_real(offdiag.read(i, 0))
            } else {
                E::zero()
            }
        });

        let mut qt = Mat::<E>::zeros(n, n);
        matmul(
            qt.as_mut(),
            q.as_ref(),
            t.as_ref(),
            None,
            E::one(),
            Conj::No,
            Conj::No,
            Parallelism::None,
        );
        let mut qtq = Mat::<E>::zeros(n, n);
        matmul(
            qtq.as_mut(),
            qt.as_ref(),
            q.as_ref().transpose(),
            None,
            E::one(),
            Conj::No,
            Conj::Yes,
            Parallelism::None,
        );
        let mut qhq = Mat::<E>::zeros(n, n);
        matmul(
            qhq.as_mut(),
            q.as_ref().transpose(),
            q.as_ref(),
            None,
            E::one(),
            Conj::Yes,
            Conj::No,
            Parallelism::None,
        );

        let scale = norm_frobenius(a.as_ref()).max(E::Real::one());
        let tol = E::Real::from_f64(n.max(1) as f64 * 30.0) * E::Real::epsilon();

        let diff = Mat::from_fn(n, n, |i, j| qtq.read(i, j) - a.read(i, j));
        let err = norm_frobenius(diff.as_ref()) / scale;
        assert!(err <= tol);

        let diff = Mat::from_fn(n, n, |i, j| {
            qhq.read(i, j) - if i == j { E::one() } else { E::zero() }
        });
        let err = norm_frobenius(diff.as_ref());
        assert!(err <= tol);
    }

    #[test]
    fn unblocked_reduction() {
        for n in [0, 1, 2, 3, 4, 9, 31] {
            for uplo in [Side::Lower, Side::Upper] {
                check::<f64>(n, uplo, None);
                check::<c64>(n, uplo, None);
            }
        }
    }

    #[test]
    fn blocked_reduction() {
        for (n, params) in [
            (10, TridiagParams::new(3, 2)),
            (23, TridiagParams::new(4, 6)),
            (70, TridiagParams::new(8, 16)),
            (130, TridiagParams::default()),
            (200, TridiagParams::new(32, 40)),
        ] {
            for uplo in [Side::Lower, Side::Upper] {
                check::<f64>(n, uplo, Some(params));
                check::<c64>(n, uplo, Some(params));
            }
        }
    }

    #[test]
    fn blocked_matches_unblocked() {
        let n = 40;
        let params = TridiagParams::new(5, 8);
        let a = random_hermitian::<c64>(n);

        let mut outputs = Vec::new();
        for blocked in [false, true] {
            let mut factors = a.clone();
            let mut diag = Mat::<f64>::zeros(n, 1);
            let mut offdiag = Mat::<f64>::zeros(n - 1, 1);
            let mut tau = Mat::<c64>::zeros(n - 1, 1);
            if blocked {
                tridiagonalize_in_place(
                    Side::Lower,
                    factors.as_mut(),
                    diag.as_mut(),
                    offdiag.as_mut(),
                    tau.as_mut(),
                    params,
                    Parallelism::None,
                    make_stack!(tridiagonalize_in_place_req::<c64>(n, params)),
                );
            } else {
                tridiagonalize_in_place_unblocked(
                    Side::Lower,
                    factors.as_mut(),
                    diag.as_mut(),
                    offdiag.as_mut(),
                    tau.as_mut(),
                    make_stack!(tridiagonalize_in_place_unblocked_req::<c64>(n)),
                );
            }
            outputs.push((diag, offdiag, tau));
        }

        let (d0, e0, t0) = &outputs[0];
        let (d1, e1, t1) = &outputs[1];
        for i in 0..n {
            assert!((d0.read(i, 0) - d1.read(i, 0)).abs() < 1e-10);
        }
        for i in 0..n - 1 {
            assert!((e0.read(i, 0) - e1.read(i, 0)).abs() < 1e-10);
            assert!((t0.read(i, 0) - t1.read(i, 0)).abs() < 1e-10);
        }
    }
}
