//! Per-matrix factorization outcome.

/// Outcome of factoring a single matrix.
///
/// Factorizations never stop at a singular pivot. They run all their steps and remember where
/// the first exactly-zero pivot was met, so the factors stay well defined for inspection.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FactorResult {
    /// Number of elimination steps that were performed.
    pub completed_steps: usize,
    /// Zero-based index of the first step whose pivot was exactly zero.
    pub first_singular_step: Option<usize>,
}

impl FactorResult {
    #[inline]
    pub fn new(completed_steps: usize) -> Self {
        Self {
            completed_steps,
            first_singular_step: None,
        }
    }

    #[inline]
    pub fn is_singular(&self) -> bool {
        self.first_singular_step.is_some()
    }

    /// Records a singular pivot at `step`, keeping the earliest one.
    #[inline]
    pub fn record_singular(&mut self, step: usize) {
        if self.first_singular_step.is_none() {
            self.first_singular_step = Some(step);
        }
    }

    /// Shifts the step indices of a result computed on a trailing submatrix.
    #[inline]
    pub fn offset(self, offset: usize) -> Self {
        Self {
            completed_steps: self.completed_steps + offset,
            first_singular_step: self.first_singular_step.map(|step| step + offset),
        }
    }

    /// Combines `self` with the result of the steps that follow it.
    ///
    /// `later` must already be expressed in the global step numbering, see [`Self::offset`].
    #[inline]
    pub fn then(self, later: Self) -> Self {
        Self {
            completed_steps: later.completed_steps.max(self.completed_steps),
            first_singular_step: self.first_singular_step.or(later.first_singular_step),
        }
    }

    /// Status-array encoding: `0` on success, otherwise the 1-indexed first singular step.
    #[inline]
    pub fn info(&self) -> i32 {
        match self.first_singular_step {
            None => 0,
            Some(step) => i32::try_from(step + 1).unwrap_or(i32::MAX),
        }
    }
}

/// Copies the staged per-matrix results into the caller's status array.
///
/// This is the only place a status array is written, once per call.
pub(crate) fn publish(staged: &[i32], info: &mut [i32]) {
    info[..staged.len()].copy_from_slice(staged);
}
