use super::{launch, status_code, Variant};
use crate::{
    arg_check::{self, ArgCheck},
    batch::{BatchMut, BatchRef},
    error::Result,
    handle::Handle,
    linalg::{
        evd::{
            tridiag::{
                generate_q_in_place, generate_q_in_place_req, tridiagonalize_in_place,
                tridiagonalize_in_place_req, tridiagonalize_in_place_unblocked,
                tridiagonalize_in_place_unblocked_req,
            },
            tridiag_qr_algorithm::compute_tridiag_real_eigenvalues_qr_algorithm,
        },
        temp_mat_req, temp_mat_zeroed,
    },
    mat::{from_column_major_slice, from_column_major_slice_mut},
    workspace::WorkspacePlan,
    ComplexField, RealField, Side,
};
use dyn_stack::StackReq;

fn vector<E>(data: &mut [E], len: usize) -> crate::MatMut<'_, E> {
    from_column_major_slice_mut(data, len, 1, len.max(1))
}

/// Validated sizes of a call on `n x n` self-adjoint matrices.
struct SymDims {
    n: usize,
    lda: usize,
    batch_count: usize,
    span_a: usize,
}

fn sym_dims<E>(
    handle: &Handle,
    n: isize,
    a: &BatchMut<'_, E>,
    lda: isize,
    batch_count: isize,
) -> Result<SymDims> {
    handle.check()?;
    let n = arg_check::dim(n, "n")?;
    let batch_count = arg_check::dim(batch_count, "batch_count")?;
    let lda = arg_check::leading_dim(lda, n, "lda")?;
    let span_a = arg_check::span(n, n, lda, "a")?;
    a.check_layout(span_a, batch_count, "a")?;
    Ok(SymDims {
        n,
        lda,
        batch_count,
        span_a,
    })
}

fn sym_plan(
    handle: &Handle,
    n: usize,
    batch_count: usize,
    stages_status: bool,
    lane: StackReq,
) -> Result<WorkspacePlan> {
    if ArgCheck::from_dims(&[n, batch_count]) == ArgCheck::QuickReturn {
        return Ok(WorkspacePlan::empty());
    }
    Ok(WorkspacePlan::new(
        batch_count,
        stages_status,
        lane,
        handle.parallelism(),
        handle.params().optim_mem_limit,
    )?)
}

/// Plans the workspace of [`reduce_sym_tridiagonal`] or [`reduce_sym_tridiagonal_unblocked`].
pub fn reduce_sym_tridiagonal_plan<E: ComplexField>(
    handle: &Handle,
    n: usize,
    batch_count: usize,
    variant: Variant,
) -> Result<WorkspacePlan> {
    let lane = match variant {
        Variant::Unblocked => tridiagonalize_in_place_unblocked_req::<E>(n)?,
        Variant::Blocked => tridiagonalize_in_place_req::<E>(n, handle.params().tridiag())?,
    };
    sym_plan(handle, n, batch_count, false, lane)
}

/// Plans the workspace of [`generate_tridiagonal_q`].
pub fn generate_tridiagonal_q_plan<E: ComplexField>(
    handle: &Handle,
    n: usize,
    batch_count: usize,
) -> Result<WorkspacePlan> {
    sym_plan(handle, n, batch_count, false, generate_q_in_place_req::<E>(n)?)
}

/// Plans the workspace of [`symmetric_eigenvalues`].
pub fn symmetric_eigenvalues_plan<E: ComplexField>(
    handle: &Handle,
    n: usize,
    batch_count: usize,
) -> Result<WorkspacePlan> {
    let lane = StackReq::try_all_of([
        temp_mat_req::<E>(n.saturating_sub(1), 1)?,
        tridiagonalize_in_place_req::<E>(n, handle.params().tridiag())?,
    ])?;
    sym_plan(handle, n, batch_count, true, lane)
}

/// Reduces every `n x n` symmetric or Hermitian matrix of the batch to real symmetric
/// tridiagonal form `T = Q^H * A * Q`.
///
/// Only the triangle selected by `uplo` is referenced. On exit, `d` holds the `n` diagonal
/// entries of `T`, `e` its `n - 1` offdiagonal entries, `tau` the factors of the `n - 1`
/// elementary reflectors whose product is `Q`, and the referenced triangle of `a` their
/// essential parts. Matrices larger than the crossover of the handle parameters are reduced by
/// panels.
pub fn reduce_sym_tridiagonal<E: ComplexField>(
    handle: &mut Handle,
    uplo: Side,
    n: isize,
    a: BatchMut<'_, E>,
    lda: isize,
    d: BatchMut<'_, E::Real>,
    e: BatchMut<'_, E::Real>,
    tau: BatchMut<'_, E>,
    batch_count: isize,
) -> Result<()> {
    log::trace!("reduce_sym_tridiagonal: uplo={uplo:?} n={n} lda={lda} batch_count={batch_count}");
    reduce_sym_tridiagonal_imp(handle, uplo, n, a, lda, d, e, tau, batch_count, Variant::Blocked)
}

/// Same as [`reduce_sym_tridiagonal`], always reducing one column at a time.
pub fn reduce_sym_tridiagonal_unblocked<E: ComplexField>(
    handle: &mut Handle,
    uplo: Side,
    n: isize,
    a: BatchMut<'_, E>,
    lda: isize,
    d: BatchMut<'_, E::Real>,
    e: BatchMut<'_, E::Real>,
    tau: BatchMut<'_, E>,
    batch_count: isize,
) -> Result<()> {
    log::trace!(
        "reduce_sym_tridiagonal_unblocked: uplo={uplo:?} n={n} lda={lda} batch_count={batch_count}"
    );
    reduce_sym_tridiagonal_imp(handle, uplo, n, a, lda, d, e, tau, batch_count, Variant::Unblocked)
}

fn reduce_sym_tridiagonal_imp<E: ComplexField>(
    handle: &mut Handle,
    uplo: Side,
    n: isize,
    a: BatchMut<'_, E>,
    lda: isize,
    d: BatchMut<'_, E::Real>,
    e: BatchMut<'_, E::Real>,
    tau: BatchMut<'_, E>,
    batch_count: isize,
    variant: Variant,
) -> Result<()> {
    let SymDims {
        n,
        lda,
        batch_count,
        span_a,
    } = sym_dims(handle, n, &a, lda, batch_count)?;
    let n1 = n.saturating_sub(1);
    d.check_layout(n, batch_count, "d")?;
    e.check_layout(n1, batch_count, "e")?;
    tau.check_layout(n1, batch_count, "tau")?;

    if ArgCheck::from_dims(&[n, batch_count]) == ArgCheck::QuickReturn {
        return Ok(());
    }
    if !handle.is_memory_size_query() {
        a.check_buffers(span_a, batch_count, "a")?;
        d.check_buffers(n, batch_count, "d")?;
        e.check_buffers(n1, batch_count, "e")?;
        tau.check_buffers(n1, batch_count, "tau")?;
    }

    let plan = reduce_sym_tridiagonal_plan::<E>(handle, n, batch_count, variant)?;
    let params = handle.params().tridiag();

    launch(
        handle,
        &plan,
        batch_count,
        None,
        || {
            let a = a.into_slices(span_a, batch_count);
            let d = d.into_slices(n, batch_count);
            let e = e.into_slices(n1, batch_count);
            let tau = tau.into_slices(n1, batch_count);
            a.into_iter().zip(d).zip(e).zip(tau).collect::<Vec<_>>()
        },
        |(((a, d), e), tau), parallelism, stack| {
            let a = from_column_major_slice_mut(a, n, n, lda);
            match variant {
                Variant::Unblocked => tridiagonalize_in_place_unblocked(
                    uplo,
                    a,
                    vector(d, n),
                    vector(e, n1),
                    vector(tau, n1),
                    stack,
                ),
                Variant::Blocked => tridiagonalize_in_place(
                    uplo,
                    a,
                    vector(d, n),
                    vector(e, n1),
                    vector(tau, n1),
                    params,
                    parallelism,
                    stack,
                ),
            }
            0
        },
    )
}

/// Overwrites every matrix of the batch, which holds the output of [`reduce_sym_tridiagonal`]
/// with the same `uplo`, with the `n x n` unitary matrix `Q` such that `A = Q * T * Q^H`.
pub fn generate_tridiagonal_q<E: ComplexField>(
    handle: &mut Handle,
    uplo: Side,
    n: isize,
    a: BatchMut<'_, E>,
    lda: isize,
    tau: BatchRef<'_, E>,
    batch_count: isize,
) -> Result<()> {
    log::trace!("generate_tridiagonal_q: uplo={uplo:?} n={n} lda={lda} batch_count={batch_count}");

    let SymDims {
        n,
        lda,
        batch_count,
        span_a,
    } = sym_dims(handle, n, &a, lda, batch_count)?;
    let n1 = n.saturating_sub(1);
    tau.check_layout(n1, batch_count, "tau")?;

    if ArgCheck::from_dims(&[n, batch_count]) == ArgCheck::QuickReturn {
        return Ok(());
    }
    if !handle.is_memory_size_query() {
        a.check_buffers(span_a, batch_count, "a")?;
        tau.check_buffers(n1, batch_count, "tau")?;
    }

    let plan = generate_tridiagonal_q_plan::<E>(handle, n, batch_count)?;

    launch(
        handle,
        &plan,
        batch_count,
        None,
        || {
            let a = a.into_slices(span_a, batch_count);
            let tau = tau.into_slices(n1, batch_count);
            a.into_iter().zip(tau).collect::<Vec<_>>()
        },
        |(a, tau), parallelism, stack| {
            generate_q_in_place(
                uplo,
                from_column_major_slice_mut(a, n, n, lda),
                from_column_major_slice(tau, n1, 1, n1.max(1)),
                parallelism,
                stack,
            );
            0
        },
    )
}

/// Computes the eigenvalues of every `n x n` symmetric or Hermitian matrix of the batch.
///
/// Only the triangle selected by `uplo` is referenced, and it is destroyed. On exit, `d` holds
/// the eigenvalues in ascending order and `e` is destroyed. `info[i]` receives `0`, or the
/// number of offdiagonal entries of the tridiagonal form of matrix `i` that did not converge to
/// zero, in which case its eigenvalues are left unordered.
pub fn symmetric_eigenvalues<E: ComplexField>(
    handle: &mut Handle,
    uplo: Side,
    n: isize,
    a: BatchMut<'_, E>,
    lda: isize,
    d: BatchMut<'_, E::Real>,
    e: BatchMut<'_, E::Real>,
    info: &mut [i32],
    batch_count: isize,
) -> Result<()> {
    log::trace!("symmetric_eigenvalues: uplo={uplo:?} n={n} lda={lda} batch_count={batch_count}");

    let SymDims {
        n,
        lda,
        batch_count,
        span_a,
    } = sym_dims(handle, n, &a, lda, batch_count)?;
    let n1 = n.saturating_sub(1);
    d.check_layout(n, batch_count, "d")?;
    e.check_layout(n1, batch_count, "e")?;

    if ArgCheck::from_dims(&[n, batch_count]) == ArgCheck::QuickReturn {
        return Ok(());
    }
    if !handle.is_memory_size_query() {
        a.check_buffers(span_a, batch_count, "a")?;
        d.check_buffers(n, batch_count, "d")?;
        e.check_buffers(n1, batch_count, "e")?;
        arg_check::info_len(info, batch_count)?;
    }

    let plan = symmetric_eigenvalues_plan::<E>(handle, n, batch_count)?;
    let params = handle.params().tridiag();

    launch(
        handle,
        &plan,
        batch_count,
        Some(info),
        || {
            let a = a.into_slices(span_a, batch_count);
            let d = d.into_slices(n, batch_count);
            let e = e.into_slices(n1, batch_count);
            a.into_iter().zip(d).zip(e).collect::<Vec<_>>()
        },
        |((a, d), e), parallelism, stack| {
            let (tau, stack) = temp_mat_zeroed::<E>(n1, 1, stack);
            tridiagonalize_in_place(
                uplo,
                from_column_major_slice_mut(a, n, n, lda),
                vector(&mut *d, n),
                vector(&mut *e, n1),
                tau,
                params,
                parallelism,
                stack,
            );
            let unconverged = compute_tridiag_real_eigenvalues_qr_algorithm(
                d,
                e,
                E::Real::epsilon(),
                E::Real::min_positive(),
            );
            status_code(unconverged)
        },
    )
}
