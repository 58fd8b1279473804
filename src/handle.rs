//! Execution context of the batched drivers.
//!
//! A [`Handle`] holds the parallelism strategy, the tuning parameters, and the memory pool that
//! workspaces are carved from. It also implements the size-query mode, in which calls only
//! record how much memory they would need:
//!
//! ```
//! use faer_batch::{batched, BatchMut, Handle, Parallelism};
//!
//! let mut handle = Handle::new(Parallelism::None);
//! let mut info = [0; 8];
//!
//! handle.start_memory_size_query().unwrap();
//! batched::reduce_sym_tridiagonal::<f64>(
//!     &mut handle,
//!     faer_batch::Side::Lower,
//!     200,
//!     BatchMut::Strided { data: &mut [], stride: 200 * 200 },
//!     200,
//!     BatchMut::Strided { data: &mut [], stride: 200 },
//!     BatchMut::Strided { data: &mut [], stride: 199 },
//!     BatchMut::Strided { data: &mut [], stride: 199 },
//!     8,
//! )
//! .unwrap();
//! batched::factor_lu_nopivot::<f64>(
//!     &mut handle,
//!     64,
//!     64,
//!     BatchMut::Strided { data: &mut [], stride: 64 * 64 },
//!     64,
//!     &mut info,
//!     8,
//! )
//! .unwrap();
//! let bytes = handle.stop_memory_size_query().unwrap();
//!
//! // later calls are served from one pool of `bytes` bytes
//! handle.set_memory_size(bytes).unwrap();
//! ```

use crate::{
    error::{Error, Result},
    linalg::evd::tridiag::TridiagParams,
    Parallelism,
};
use dyn_stack::{GlobalPodBuffer, PodStack, StackReq};

/// Alignment of the memory pool.
pub const MEMORY_ALIGN: usize = 128;

/// Tuning parameters of the batched drivers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct SolverParams {
    /// Number of columns below which the LU decomposition stops recursing.
    pub lu_recursion_threshold: usize,
    /// Number of reflectors accumulated per panel by the blocked tridiagonal reduction.
    pub tridiag_blocksize: usize,
    /// Matrices of at most this dimension are reduced to tridiagonal form by the unblocked
    /// algorithm.
    pub tridiag_crossover: usize,
    /// Batches whose scratch fits in this many bytes give one scratch lane to every matrix.
    pub optim_mem_limit: usize,
}

impl Default for SolverParams {
    #[inline]
    fn default() -> Self {
        Self {
            lu_recursion_threshold: 16,
            tridiag_blocksize: 32,
            tridiag_crossover: 128,
            optim_mem_limit: 64 << 20,
        }
    }
}

impl SolverParams {
    #[inline]
    pub fn tridiag(&self) -> TridiagParams {
        TridiagParams::new(self.tridiag_blocksize, self.tridiag_crossover)
    }
}

enum MemoryPool {
    /// Grown on demand and retained across calls.
    OnDemand(Option<GlobalPodBuffer>),
    /// Fixed size, set by [`Handle::set_memory_size`].
    UserManaged(GlobalPodBuffer),
}

/// Execution context of the batched drivers.
pub struct Handle {
    parallelism: Parallelism,
    params: SolverParams,
    pool: MemoryPool,
    size_query: Option<StackReq>,
}

impl core::fmt::Debug for Handle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Handle")
            .field("parallelism", &self.parallelism)
            .field("params", &self.params)
            .field("memory_size", &self.memory_size())
            .field("user_managed", &self.is_user_managed())
            .field("size_query", &self.size_query.is_some())
            .finish()
    }
}

impl Handle {
    /// Creates a handle with default parameters and an on-demand memory pool.
    #[inline]
    pub fn new(parallelism: Parallelism) -> Self {
        Self::with_params(parallelism, SolverParams::default())
    }

    #[inline]
    pub fn with_params(parallelism: Parallelism, params: SolverParams) -> Self {
        Self {
            parallelism,
            params,
            pool: MemoryPool::OnDemand(None),
            size_query: None,
        }
    }

    #[inline]
    pub fn parallelism(&self) -> Parallelism {
        self.parallelism
    }

    #[inline]
    pub fn set_parallelism(&mut self, parallelism: Parallelism) {
        self.parallelism = parallelism;
    }

    #[inline]
    pub fn params(&self) -> SolverParams {
        self.params
    }

    #[inline]
    pub fn set_params(&mut self, params: SolverParams) {
        self.params = params;
    }

    /// Checks that the handle can run a call.
    pub fn check(&self) -> Result<()> {
        let params = &self.params;
        if params.lu_recursion_threshold == 0 || params.tridiag_blocksize == 0 {
            return Err(Error::InvalidHandle);
        }
        Ok(())
    }

    /// Enters size-query mode. Calls made until [`Self::stop_memory_size_query`] only validate
    /// their sizes and record their memory requirement.
    pub fn start_memory_size_query(&mut self) -> Result<()> {
        if self.size_query.is_some() {
            return Err(Error::InvalidHandle);
        }
        self.size_query = Some(StackReq::empty());
        Ok(())
    }

    /// Leaves size-query mode and returns the number of bytes a pool needs to serve every call
    /// made in the meantime.
    pub fn stop_memory_size_query(&mut self) -> Result<usize> {
        match self.size_query.take() {
            Some(req) => Ok(req.unaligned_bytes_required()),
            None => Err(Error::InvalidHandle),
        }
    }

    #[inline]
    pub fn is_memory_size_query(&self) -> bool {
        self.size_query.is_some()
    }

    /// Records the requirement of a call made in size-query mode.
    ///
    /// The calls are sequential, so they can share the same memory.
    pub(crate) fn record_memory_size(&mut self, req: StackReq) -> Result<()> {
        match self.size_query {
            Some(recorded) => {
                self.size_query = Some(recorded.try_or(req)?);
                log::debug!(
                    "size query: call needs {} bytes",
                    req.unaligned_bytes_required(),
                );
                Ok(())
            }
            None => Err(Error::InvalidHandle),
        }
    }

    /// Installs a user-managed pool of `bytes` bytes, reused by later calls. Calls that need
    /// more memory fail with [`Error::MemoryError`].
    ///
    /// `bytes == 0` releases the pool and goes back to allocating on demand.
    pub fn set_memory_size(&mut self, bytes: usize) -> Result<()> {
        if self.size_query.is_some() {
            return Err(Error::InvalidHandle);
        }
        if bytes == 0 {
            self.pool = MemoryPool::OnDemand(None);
            return Ok(());
        }

        // release the old pool before allocating the new one
        self.pool = MemoryPool::OnDemand(None);
        let req = StackReq::try_new_aligned::<u8>(bytes, MEMORY_ALIGN)?;
        let buffer = GlobalPodBuffer::try_new(req)
            .map_err(|_| Error::MemoryError { required: bytes })?;
        self.pool = MemoryPool::UserManaged(buffer);
        Ok(())
    }

    /// Size of the current pool in bytes.
    pub fn memory_size(&self) -> usize {
        match &self.pool {
            MemoryPool::OnDemand(None) => 0,
            MemoryPool::OnDemand(Some(buffer)) | MemoryPool::UserManaged(buffer) => buffer.len(),
        }
    }

    #[inline]
    pub fn is_user_managed(&self) -> bool {
        matches!(self.pool, MemoryPool::UserManaged(_))
    }

    /// Provides a stack that can hold `req`.
    ///
    /// The on-demand pool is grown if needed, a user-managed pool is never resized.
    pub fn device_malloc(&mut self, req: StackReq) -> Result<PodStack<'_>> {
        let required = req.unaligned_bytes_required();
        match &mut self.pool {
            MemoryPool::UserManaged(buffer) => {
                if buffer.len() < required {
                    return Err(Error::MemoryError { required });
                }
                Ok(PodStack::new(buffer))
            }
            MemoryPool::OnDemand(pool) => {
                let grow = pool.as_ref().map_or(true, |buffer| buffer.len() < required);
                if grow {
                    // drop the old block first so both are never alive at once
                    *pool = None;
                    let block = StackReq::try_new_aligned::<u8>(required, MEMORY_ALIGN)?;
                    let buffer = GlobalPodBuffer::try_new(block)
                        .map_err(|_| Error::MemoryError { required })?;
                    log::debug!("memory pool grown to {} bytes", buffer.len());
                    *pool = Some(buffer);
                }
                match pool {
                    Some(buffer) => Ok(PodStack::new(buffer)),
                    None => Err(Error::MemoryError { required }),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_query_state_machine() {
        let mut handle = Handle::new(Parallelism::None);
        assert_eq!(handle.stop_memory_size_query(), Err(Error::InvalidHandle));

        handle.start_memory_size_query().unwrap();
        assert_eq!(handle.start_memory_size_query(), Err(Error::InvalidHandle));
        assert_eq!(handle.set_memory_size(64), Err(Error::InvalidHandle));

        handle.record_memory_size(StackReq::new::<u8>(100)).unwrap();
        handle.record_memory_size(StackReq::new::<u8>(40)).unwrap();
        assert_eq!(handle.stop_memory_size_query(), Ok(100));
        assert!(!handle.is_memory_size_query());
        assert!(handle.record_memory_size(StackReq::empty()).is_err());
    }

    #[test]
    fn user_managed_pool_is_never_grown() {
        let mut handle = Handle::new(Parallelism::None);
        handle.set_memory_size(256).unwrap();
        assert!(handle.is_user_managed());
        assert!(handle.memory_size() >= 256);

        assert!(handle.device_malloc(StackReq::new::<u8>(256)).is_ok());
        assert_eq!(
            handle.device_malloc(StackReq::new::<u8>(1 << 20)).err(),
            Some(Error::MemoryError { required: 1 << 20 })
        );

        handle.set_memory_size(0).unwrap();
        assert!(!handle.is_user_managed());
        assert!(handle.device_malloc(StackReq::new::<u8>(1 << 20)).is_ok());
        assert!(handle.memory_size() >= 1 << 20);
    }

    #[test]
    fn on_demand_pool_is_retained() {
        let mut handle = Handle::new(Parallelism::None);
        let req = StackReq::new_aligned::<f64>(1000, 64);

        let first = {
            let stack = handle.device_malloc(req).unwrap();
            stack.make_aligned_raw::<u8>(1, 1).0.as_ptr() as usize
        };
        let size = handle.memory_size();
        assert!(size >= req.unaligned_bytes_required());

        let second = {
            let stack = handle.device_malloc(req).unwrap();
            stack.make_aligned_raw::<u8>(1, 1).0.as_ptr() as usize
        };
        assert_eq!(first, second);
        assert_eq!(handle.memory_size(), size);

        // smaller requests are served from the same block
        assert!(handle.device_malloc(StackReq::new::<u8>(16)).is_ok());
        assert_eq!(handle.memory_size(), size);
    }

    #[test]
    fn invalid_params_invalidate_the_handle() {
        let mut params = SolverParams::default();
        params.tridiag_blocksize = 0;
        let handle = Handle::with_params(Parallelism::None, params);
        assert_eq!(handle.check(), Err(Error::InvalidHandle));
        assert_eq!(Handle::new(Parallelism::Rayon(0)).check(), Ok(()));
    }
}
