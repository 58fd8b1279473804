//! Workspace planning and carving.
//!
//! A batched call needs two buffers, in this order: the staging area for the per-matrix status
//! entries, and the kernel scratch. The scratch is split into lanes, each exclusively owned by
//! one worker while it processes its share of the batch.

use crate::{linalg::CACHELINE_ALIGN, parallelism_degree, Parallelism};
use dyn_stack::{PodStack, SizeOverflow, StackReq};

/// Memory layout of one batched call.
///
/// Depends only on the shapes, the batch count, the variant, and the handle configuration.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WorkspacePlan {
    status: StackReq,
    lane: StackReq,
    lanes: usize,
    optim_mem: bool,
}

impl WorkspacePlan {
    /// Plan of a call that needs no memory.
    #[inline]
    pub fn empty() -> Self {
        Self {
            status: StackReq::empty(),
            lane: StackReq::empty(),
            lanes: 0,
            optim_mem: false,
        }
    }

    /// Plans a call over `batch_count` matrices, each needing `lane` bytes of scratch.
    ///
    /// Every matrix gets its own lane when the whole batch fits in `optim_mem_limit` bytes.
    /// Otherwise one lane is allocated per thread and reused across matrices.
    pub fn new(
        batch_count: usize,
        stages_status: bool,
        lane: StackReq,
        parallelism: Parallelism,
        optim_mem_limit: usize,
    ) -> Result<Self, SizeOverflow> {
        if batch_count == 0 {
            return Ok(Self::empty());
        }

        let status = if stages_status {
            StackReq::try_new_aligned::<i32>(batch_count, CACHELINE_ALIGN)?
        } else {
            StackReq::empty()
        };

        let per_matrix = lane.unaligned_bytes_required();
        let optim_mem = per_matrix
            .checked_mul(batch_count)
            .is_some_and(|bytes| bytes <= optim_mem_limit);
        let lanes = if optim_mem {
            batch_count
        } else {
            batch_count.min(parallelism_degree(parallelism))
        };

        let plan = Self {
            status,
            lane,
            lanes,
            optim_mem,
        };
        plan.req()?;

        log::debug!(
            "workspace plan: {} strategy, {lanes} lane(s) of {per_matrix} bytes",
            if optim_mem { "optimized" } else { "minimal" },
        );
        Ok(plan)
    }

    /// Whether every matrix of the batch gets its own scratch lane.
    #[inline]
    pub fn optim_mem(&self) -> bool {
        self.optim_mem
    }

    /// Number of scratch lanes.
    #[inline]
    pub fn lanes(&self) -> usize {
        self.lanes
    }

    /// Byte sizes of the status staging area and of the kernel scratch, in that order.
    pub fn sizes(&self) -> Result<[usize; 2], SizeOverflow> {
        Ok([
            self.status.unaligned_bytes_required(),
            self.work_req()?.unaligned_bytes_required(),
        ])
    }

    fn work_req(&self) -> Result<StackReq, SizeOverflow> {
        StackReq::try_all_of(core::iter::repeat(self.lane).take(self.lanes))
    }

    /// Requirement of the single block holding every buffer of the plan.
    pub fn req(&self) -> Result<StackReq, SizeOverflow> {
        StackReq::try_all_of([self.status, self.work_req()?])
    }
}

/// Buffers of one batched call, carved out of a single block.
pub struct Workspace<'a> {
    /// Staged status entries, published into the caller's status array at the end of the call.
    pub status: &'a mut [i32],
    /// Kernel scratch, one stack per lane.
    pub lanes: Vec<PodStack<'a>>,
}

impl<'a> Workspace<'a> {
    /// Carves the buffers described by `plan` out of `stack`.
    ///
    /// `status_len` entries are staged, and zeroed.
    ///
    /// # Panics
    ///
    /// Panics if `stack` is smaller than `plan.req()`.
    #[track_caller]
    pub fn new(stack: PodStack<'a>, plan: &WorkspacePlan, status_len: usize) -> Self {
        let status_len = if plan.status == StackReq::empty() {
            0
        } else {
            status_len
        };
        let (status, mut stack) = stack.make_aligned_raw::<i32>(status_len, CACHELINE_ALIGN);
        status.fill(0);

        let mut lanes = Vec::with_capacity(plan.lanes);
        for _ in 0..plan.lanes {
            let (mem, rest) = stack.make_aligned_raw::<u8>(
                plan.lane.size_bytes(),
                plan.lane.align_bytes(),
            );
            lanes.push(PodStack::new(mem));
            stack = rest;
        }

        Self { status, lanes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dyn_stack::GlobalPodBuffer;

    #[test]
    fn strategy_follows_memory_limit() {
        let lane = StackReq::new_aligned::<f64>(1000, CACHELINE_ALIGN);

        let plan = WorkspacePlan::new(16, true, lane, Parallelism::Rayon(4), 1 << 20).unwrap();
        assert!(plan.optim_mem());
        assert_eq!(plan.lanes(), 16);

        let plan = WorkspacePlan::new(16, true, lane, Parallelism::Rayon(4), 1 << 10).unwrap();
        assert!(!plan.optim_mem());
        assert_eq!(plan.lanes(), 4);

        let plan = WorkspacePlan::new(3, false, lane, Parallelism::Rayon(4), 0).unwrap();
        assert_eq!(plan.lanes(), 3);
        assert_eq!(plan.sizes().unwrap()[0], 0);
    }

    #[test]
    fn empty_batch_needs_nothing() {
        let lane = StackReq::new::<f64>(64);
        let plan = WorkspacePlan::new(0, true, lane, Parallelism::None, usize::MAX).unwrap();
        assert_eq!(plan, WorkspacePlan::empty());
        assert_eq!(plan.sizes().unwrap(), [0, 0]);
    }

    #[test]
    fn carved_buffers_fit() {
        let lane = StackReq::new_aligned::<f64>(10, CACHELINE_ALIGN);
        let plan = WorkspacePlan::new(5, true, lane, Parallelism::None, usize::MAX).unwrap();
        let mut mem = GlobalPodBuffer::new(plan.req().unwrap());
        let workspace = Workspace::new(PodStack::new(&mut mem), &plan, 5);
        assert_eq!(workspace.status, [0; 5]);
        assert_eq!(workspace.lanes.len(), 5);
        for lane in workspace.lanes {
            let (buf, _) = lane.make_aligned_raw::<f64>(10, CACHELINE_ALIGN);
            assert_eq!(buf.len(), 10);
        }
    }
}
