use super::launch;
use crate::{
    arg_check::{self, ArgCheck},
    batch::BatchMut,
    error::Result,
    handle::Handle,
    linalg::qr::no_pivoting::compute::{qr_in_place_unblocked, qr_in_place_unblocked_req},
    mat::from_column_major_slice_mut,
    workspace::WorkspacePlan,
    ComplexField,
};

/// Plans the workspace of [`factor_qr_unblocked`].
pub fn factor_qr_unblocked_plan<E: ComplexField>(
    handle: &Handle,
    m: usize,
    n: usize,
    batch_count: usize,
) -> Result<WorkspacePlan> {
    if ArgCheck::from_dims(&[m, n, batch_count]) == ArgCheck::QuickReturn {
        return Ok(WorkspacePlan::empty());
    }
    Ok(WorkspacePlan::new(
        batch_count,
        false,
        qr_in_place_unblocked_req::<E>(m, n)?,
        handle.parallelism(),
        handle.params().optim_mem_limit,
    )?)
}

/// Computes the Householder QR decomposition of every `m x n` matrix of the batch, in place.
///
/// On exit, the upper trapezoidal part of `a` holds `R`, and the strictly lower part together
/// with `tau` (of length `min(m, n)`) the elementary reflectors whose product is `Q`.
pub fn factor_qr_unblocked<E: ComplexField>(
    handle: &mut Handle,
    m: isize,
    n: isize,
    a: BatchMut<'_, E>,
    lda: isize,
    tau: BatchMut<'_, E>,
    batch_count: isize,
) -> Result<()> {
    log::trace!("factor_qr_unblocked: m={m} n={n} lda={lda} batch_count={batch_count}");

    handle.check()?;
    let m = arg_check::dim(m, "m")?;
    let n = arg_check::dim(n, "n")?;
    let batch_count = arg_check::dim(batch_count, "batch_count")?;
    let lda = arg_check::leading_dim(lda, m, "lda")?;
    let span_a = arg_check::span(m, n, lda, "a")?;
    let size = m.min(n);
    a.check_layout(span_a, batch_count, "a")?;
    tau.check_layout(size, batch_count, "tau")?;

    if ArgCheck::from_dims(&[m, n, batch_count]) == ArgCheck::QuickReturn {
        return Ok(());
    }
    if !handle.is_memory_size_query() {
        a.check_buffers(span_a, batch_count, "a")?;
        tau.check_buffers(size, batch_count, "tau")?;
    }

    let plan = factor_qr_unblocked_plan::<E>(handle, m, n, batch_count)?;

    launch(
        handle,
        &plan,
        batch_count,
        None,
        || {
            let a = a.into_slices(span_a, batch_count);
            let tau = tau.into_slices(size, batch_count);
            a.into_iter().zip(tau).collect::<Vec<_>>()
        },
        |(a, tau), parallelism, stack| {
            qr_in_place_unblocked(
                from_column_major_slice_mut(a, m, n, lda),
                from_column_major_slice_mut(tau, size, 1, size),
                parallelism,
                stack,
            );
            0
        },
    )
}
