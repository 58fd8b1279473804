//! Batched drivers.
//!
//! Every driver follows the same sequence. The arguments are validated first, in the order
//! handle, sizes, quick return, buffers. In size-query mode the memory requirement of the call
//! is then recorded in the handle and nothing else happens. Otherwise the workspace is planned,
//! allocated from the handle and carved into lanes, the kernel runs on every matrix of the batch
//! in parallel, and the staged per-matrix status is copied into the caller's status array.
//!
//! A call returns an error only for usage or memory problems, in which case no output is
//! written. Singular matrices are reported through the status array.

use crate::{
    error::Result,
    handle::Handle,
    status::publish,
    workspace::{Workspace, WorkspacePlan},
    Parallelism,
};
use dyn_stack::PodStack;
use rayon::prelude::*;
use reborrow::*;

mod block_tridiag;
mod lu;
mod qr;
mod tridiag;

pub use block_tridiag::{
    factor_block_tridiagonal, factor_block_tridiagonal_plan, solve_block_tridiagonal,
    solve_block_tridiagonal_plan,
};
pub use lu::{factor_lu_nopivot, factor_lu_nopivot_plan, factor_lu_nopivot_unblocked};
pub use qr::{factor_qr_unblocked, factor_qr_unblocked_plan};
pub use tridiag::{
    generate_tridiagonal_q, generate_tridiagonal_q_plan, reduce_sym_tridiagonal,
    reduce_sym_tridiagonal_plan, reduce_sym_tridiagonal_unblocked, symmetric_eigenvalues,
    symmetric_eigenvalues_plan,
};

/// Algorithm variant of the drivers that offer both.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Variant {
    /// One column at a time.
    Unblocked,
    /// Recursive or panel-based, above the thresholds of the handle parameters.
    Blocked,
}

/// Records the plan in size-query mode, otherwise runs `kernel` on every item of the batch.
///
/// `items` is only called when the kernel runs, so the buffers are never touched during a size
/// query. The value returned by `kernel` is staged and published into `info`, when given.
pub(crate) fn launch<T: Send>(
    handle: &mut Handle,
    plan: &WorkspacePlan,
    batch_count: usize,
    info: Option<&mut [i32]>,
    items: impl FnOnce() -> Vec<T>,
    kernel: impl Sync + Fn(T, Parallelism, PodStack<'_>) -> i32,
) -> Result<()> {
    let req = plan.req()?;
    if handle.is_memory_size_query() {
        return handle.record_memory_size(req);
    }

    let parallelism = handle.parallelism();
    // a batch of one gets the whole thread budget inside the kernel
    let kernel_parallelism = if batch_count == 1 {
        parallelism
    } else {
        Parallelism::None
    };

    let stack = handle.device_malloc(req)?;
    let Workspace { status, lanes } = Workspace::new(stack, plan, batch_count);

    let items = items();
    let n_lanes = lanes.len().max(1);
    let group_size = items.len().div_ceil(n_lanes).max(1);

    let mut slots = status.iter_mut();
    let mut groups: Vec<Vec<(T, Option<&mut i32>)>> = (0..n_lanes).map(|_| Vec::new()).collect();
    for (idx, item) in items.into_iter().enumerate() {
        groups[idx / group_size].push((item, slots.next()));
    }

    let run_group = |mut stack: PodStack<'_>, group: Vec<(T, Option<&mut i32>)>| {
        for (item, slot) in group {
            let value = kernel(item, kernel_parallelism, stack.rb_mut());
            if let Some(slot) = slot {
                *slot = value;
            }
        }
    };

    match parallelism {
        Parallelism::Rayon(_) if batch_count > 1 => {
            lanes
                .into_par_iter()
                .zip(groups.into_par_iter())
                .for_each(|(stack, group)| run_group(stack, group));
        }
        _ => {
            for (stack, group) in lanes.into_iter().zip(groups) {
                run_group(stack, group);
            }
        }
    }

    if let Some(info) = info {
        publish(status, info);
    }
    Ok(())
}

#[inline]
pub(crate) fn status_code(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
