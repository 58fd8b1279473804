use super::launch;
use crate::{
    arg_check::{self, ArgCheck},
    batch::{BatchMut, BatchRef},
    error::{Error, Result},
    handle::Handle,
    linalg::block_tridiag::{factor_in_place, solve_in_place},
    mat::{from_column_major_slice, from_column_major_slice_mut},
    workspace::WorkspacePlan,
    ComplexField,
};
use dyn_stack::StackReq;

/// Plans the workspace of [`factor_block_tridiagonal`].
pub fn factor_block_tridiagonal_plan<E: ComplexField>(
    handle: &Handle,
    nb: usize,
    nblocks: usize,
    batch_count: usize,
) -> Result<WorkspacePlan> {
    if ArgCheck::from_dims(&[nb, nblocks, batch_count]) == ArgCheck::QuickReturn {
        return Ok(WorkspacePlan::empty());
    }
    Ok(WorkspacePlan::new(
        batch_count,
        true,
        StackReq::empty(),
        handle.parallelism(),
        handle.params().optim_mem_limit,
    )?)
}

/// Plans the workspace of [`solve_block_tridiagonal`].
pub fn solve_block_tridiagonal_plan<E: ComplexField>(
    handle: &Handle,
    nb: usize,
    nblocks: usize,
    nrhs: usize,
    batch_count: usize,
) -> Result<WorkspacePlan> {
    if ArgCheck::from_dims(&[nb, nblocks, nrhs, batch_count]) == ArgCheck::QuickReturn {
        return Ok(WorkspacePlan::empty());
    }
    Ok(WorkspacePlan::new(
        batch_count,
        false,
        StackReq::empty(),
        handle.parallelism(),
        handle.params().optim_mem_limit,
    )?)
}

/// Sizes shared by the factorization and the solve.
struct BlockDims {
    nb: usize,
    nblocks: usize,
    batch_count: usize,
    width: usize,
}

fn block_dims(handle: &Handle, nb: isize, nblocks: isize, batch_count: isize) -> Result<BlockDims> {
    handle.check()?;
    let nb = arg_check::dim(nb, "nb")?;
    let nblocks = arg_check::dim(nblocks, "nblocks")?;
    let batch_count = arg_check::dim(batch_count, "batch_count")?;
    let width = nb
        .checked_mul(nblocks)
        .ok_or(Error::InvalidSize { argument: "nblocks" })?;
    Ok(BlockDims {
        nb,
        nblocks,
        batch_count,
        width,
    })
}

/// Computes the block LU decomposition without pivoting of every block-tridiagonal matrix of
/// the batch, in place.
///
/// `a`, `b` and `c` hold the subdiagonal, diagonal and superdiagonal blocks, each as an
/// `nb x (nb * nblocks)` matrix with the blocks side by side. `b` is overwritten with the LU
/// factors of the updated diagonal blocks, and `c` with `B'k^-1 * Ck`. `a` is only read.
///
/// `info[i]` receives `0`, or the 1-indexed global position `k * nb + j + 1` of the first
/// exactly-zero pivot of matrix `i`.
pub fn factor_block_tridiagonal<E: ComplexField>(
    handle: &mut Handle,
    nb: isize,
    nblocks: isize,
    a: BatchRef<'_, E>,
    lda: isize,
    b: BatchMut<'_, E>,
    ldb: isize,
    c: BatchMut<'_, E>,
    ldc: isize,
    info: &mut [i32],
    batch_count: isize,
) -> Result<()> {
    log::trace!(
        "factor_block_tridiagonal: nb={nb} nblocks={nblocks} lda={lda} ldb={ldb} ldc={ldc} \
         batch_count={batch_count}"
    );

    let BlockDims {
        nb,
        nblocks,
        batch_count,
        width,
    } = block_dims(handle, nb, nblocks, batch_count)?;
    let lda = arg_check::leading_dim(lda, nb, "lda")?;
    let ldb = arg_check::leading_dim(ldb, nb, "ldb")?;
    let ldc = arg_check::leading_dim(ldc, nb, "ldc")?;
    let span_a = arg_check::span(nb, width, lda, "a")?;
    let span_b = arg_check::span(nb, width, ldb, "b")?;
    let span_c = arg_check::span(nb, width, ldc, "c")?;
    a.check_layout(span_a, batch_count, "a")?;
    b.check_layout(span_b, batch_count, "b")?;
    c.check_layout(span_c, batch_count, "c")?;

    if ArgCheck::from_dims(&[nb, nblocks, batch_count]) == ArgCheck::QuickReturn {
        return Ok(());
    }
    if !handle.is_memory_size_query() {
        a.check_buffers(span_a, batch_count, "a")?;
        b.check_buffers(span_b, batch_count, "b")?;
        c.check_buffers(span_c, batch_count, "c")?;
        arg_check::info_len(info, batch_count)?;
    }

    let plan = factor_block_tridiagonal_plan::<E>(handle, nb, nblocks, batch_count)?;
    let recursion_threshold = handle.params().lu_recursion_threshold;

    launch(
        handle,
        &plan,
        batch_count,
        Some(info),
        || {
            let a = a.into_slices(span_a, batch_count);
            let b = b.into_slices(span_b, batch_count);
            let c = c.into_slices(span_c, batch_count);
            a.into_iter().zip(b).zip(c).collect::<Vec<_>>()
        },
        |((a, b), c), parallelism, _| {
            factor_in_place(
                nb,
                nblocks,
                from_column_major_slice(a, nb, width, lda),
                from_column_major_slice_mut(b, nb, width, ldb),
                from_column_major_slice_mut(c, nb, width, ldc),
                recursion_threshold,
                parallelism,
            )
            .info()
        },
    )
}

/// Solves `M * X = rhs` for every matrix of the batch, using the factors computed by
/// [`factor_block_tridiagonal`].
///
/// `x` holds the right-hand sides on entry and the solutions on exit, as an
/// `nb x (nrhs * nblocks)` matrix with the `nb x nrhs` blocks side by side. No singularity is
/// detected.
pub fn solve_block_tridiagonal<E: ComplexField>(
    handle: &mut Handle,
    nb: isize,
    nblocks: isize,
    nrhs: isize,
    a: BatchRef<'_, E>,
    lda: isize,
    b: BatchRef<'_, E>,
    ldb: isize,
    c: BatchRef<'_, E>,
    ldc: isize,
    x: BatchMut<'_, E>,
    ldx: isize,
    batch_count: isize,
) -> Result<()> {
    log::trace!(
        "solve_block_tridiagonal: nb={nb} nblocks={nblocks} nrhs={nrhs} lda={lda} ldb={ldb} \
         ldc={ldc} ldx={ldx} batch_count={batch_count}"
    );

    let BlockDims {
        nb,
        nblocks,
        batch_count,
        width,
    } = block_dims(handle, nb, nblocks, batch_count)?;
    let nrhs = arg_check::dim(nrhs, "nrhs")?;
    let lda = arg_check::leading_dim(lda, nb, "lda")?;
    let ldb = arg_check::leading_dim(ldb, nb, "ldb")?;
    let ldc = arg_check::leading_dim(ldc, nb, "ldc")?;
    let ldx = arg_check::leading_dim(ldx, nb, "ldx")?;
    let x_width = nrhs
        .checked_mul(nblocks)
        .ok_or(Error::InvalidSize { argument: "nrhs" })?;
    let span_a = arg_check::span(nb, width, lda, "a")?;
    let span_b = arg_check::span(nb, width, ldb, "b")?;
    let span_c = arg_check::span(nb, width, ldc, "c")?;
    let span_x = arg_check::span(nb, x_width, ldx, "x")?;
    a.check_layout(span_a, batch_count, "a")?;
    b.check_layout(span_b, batch_count, "b")?;
    c.check_layout(span_c, batch_count, "c")?;
    x.check_layout(span_x, batch_count, "x")?;

    if ArgCheck::from_dims(&[nb, nblocks, nrhs, batch_count]) == ArgCheck::QuickReturn {
        return Ok(());
    }
    if !handle.is_memory_size_query() {
        a.check_buffers(span_a, batch_count, "a")?;
        b.check_buffers(span_b, batch_count, "b")?;
        c.check_buffers(span_c, batch_count, "c")?;
        x.check_buffers(span_x, batch_count, "x")?;
    }

    let plan = solve_block_tridiagonal_plan::<E>(handle, nb, nblocks, nrhs, batch_count)?;

    launch(
        handle,
        &plan,
        batch_count,
        None,
        || {
            let a = a.into_slices(span_a, batch_count);
            let b = b.into_slices(span_b, batch_count);
            let c = c.into_slices(span_c, batch_count);
            let x = x.into_slices(span_x, batch_count);
            a.into_iter().zip(b).zip(c).zip(x).collect::<Vec<_>>()
        },
        |(((a, b), c), x), parallelism, _| {
            solve_in_place(
                nb,
                nblocks,
                nrhs,
                from_column_major_slice(a, nb, width, lda),
                from_column_major_slice(b, nb, width, ldb),
                from_column_major_slice(c, nb, width, ldc),
                from_column_major_slice_mut(x, nb, x_width, ldx),
                parallelism,
            );
            0
        },
    )
}
