use super::{launch, Variant};
use crate::{
    arg_check::{self, ArgCheck},
    batch::BatchMut,
    error::Result,
    handle::Handle,
    linalg::lu::no_pivoting::compute::{lu_in_place, lu_in_place_req, lu_in_place_unblocked},
    mat::from_column_major_slice_mut,
    workspace::WorkspacePlan,
    ComplexField,
};

/// Plans the workspace of [`factor_lu_nopivot`] and [`factor_lu_nopivot_unblocked`].
pub fn factor_lu_nopivot_plan<E: ComplexField>(
    handle: &Handle,
    m: usize,
    n: usize,
    batch_count: usize,
) -> Result<WorkspacePlan> {
    if ArgCheck::from_dims(&[m, n, batch_count]) == ArgCheck::QuickReturn {
        return Ok(WorkspacePlan::empty());
    }
    let params = handle.params();
    let lane = lu_in_place_req::<E>(m, n, handle.parallelism())?;
    Ok(WorkspacePlan::new(
        batch_count,
        true,
        lane,
        handle.parallelism(),
        params.optim_mem_limit,
    )?)
}

/// Computes the LU decomposition without pivoting of every `m x n` matrix of the batch, in
/// place.
///
/// `info[i]` receives `0`, or the 1-indexed step at which the first exactly-zero pivot of
/// matrix `i` was met. The factorization runs to completion past such a pivot, leaving the
/// corresponding column of `L` unscaled.
pub fn factor_lu_nopivot<E: ComplexField>(
    handle: &mut Handle,
    m: isize,
    n: isize,
    a: BatchMut<'_, E>,
    lda: isize,
    info: &mut [i32],
    batch_count: isize,
) -> Result<()> {
    log::trace!("factor_lu_nopivot: m={m} n={n} lda={lda} batch_count={batch_count}");
    factor_lu_nopivot_imp(handle, m, n, a, lda, info, batch_count, Variant::Blocked)
}

/// Same as [`factor_lu_nopivot`], always eliminating one column at a time.
pub fn factor_lu_nopivot_unblocked<E: ComplexField>(
    handle: &mut Handle,
    m: isize,
    n: isize,
    a: BatchMut<'_, E>,
    lda: isize,
    info: &mut [i32],
    batch_count: isize,
) -> Result<()> {
    log::trace!("factor_lu_nopivot_unblocked: m={m} n={n} lda={lda} batch_count={batch_count}");
    factor_lu_nopivot_imp(handle, m, n, a, lda, info, batch_count, Variant::Unblocked)
}

fn factor_lu_nopivot_imp<E: ComplexField>(
    handle: &mut Handle,
    m: isize,
    n: isize,
    a: BatchMut<'_, E>,
    lda: isize,
    info: &mut [i32],
    batch_count: isize,
    variant: Variant,
) -> Result<()> {
    handle.check()?;
    let m = arg_check::dim(m, "m")?;
    let n = arg_check::dim(n, "n")?;
    let batch_count = arg_check::dim(batch_count, "batch_count")?;
    let lda = arg_check::leading_dim(lda, m, "lda")?;
    let span = arg_check::span(m, n, lda, "a")?;
    a.check_layout(span, batch_count, "a")?;

    if ArgCheck::from_dims(&[m, n, batch_count]) == ArgCheck::QuickReturn {
        return Ok(());
    }
    if !handle.is_memory_size_query() {
        a.check_buffers(span, batch_count, "a")?;
        arg_check::info_len(info, batch_count)?;
    }

    let plan = factor_lu_nopivot_plan::<E>(handle, m, n, batch_count)?;
    let recursion_threshold = handle.params().lu_recursion_threshold;

    launch(
        handle,
        &plan,
        batch_count,
        Some(info),
        || a.into_slices(span, batch_count),
        |a, parallelism, _| {
            let a = from_column_major_slice_mut(a, m, n, lda);
            match variant {
                Variant::Unblocked => lu_in_place_unblocked(a),
                Variant::Blocked => lu_in_place(a, recursion_threshold, parallelism),
            }
            .info()
        },
    )
}
