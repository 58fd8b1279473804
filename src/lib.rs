//! `faer-batch` factors batches of small and medium dense matrices in place.
//!
//! The library provides LAPACK-style kernels that are applied independently to every matrix of a
//! batch:
//! - LU decomposition without pivoting ([`batched::factor_lu_nopivot`]),
//! - block-tridiagonal LU decomposition and solve
//!   ([`batched::factor_block_tridiagonal`], [`batched::solve_block_tridiagonal`]),
//! - reduction of a symmetric or Hermitian matrix to real tridiagonal form
//!   ([`batched::reduce_sym_tridiagonal`]), the generation of the corresponding unitary factor,
//!   and the computation of its eigenvalues,
//! - Householder QR decomposition ([`batched::factor_qr_unblocked`]).
//!
//! Every operation accepts its matrices through a [`BatchMut`] or [`BatchRef`], which either
//! holds a single buffer, an array of independent buffers, or one contiguous buffer with a fixed
//! stride between consecutive matrices. Scratch memory is requested from a [`Handle`], which can
//! also report how much memory a sequence of calls needs without running them.
//!
//! Singular matrices are not reported as errors. Factorizations run to completion and write the
//! 1-indexed position of the first zero pivot of each matrix into a caller-provided status array.
//!
//! # Example
//!
//! ```
//! use faer_batch::{batched, BatchMut, Handle, Parallelism};
//!
//! let mut handle = Handle::new(Parallelism::None);
//!
//! // two 2x2 matrices stored one after the other
//! let mut a = [4.0, 1.0, 2.0, 3.0, 0.0, 1.0, 1.0, 0.0];
//! let mut info = [-1; 2];
//!
//! batched::factor_lu_nopivot::<f64>(
//!     &mut handle,
//!     2,
//!     2,
//!     BatchMut::Strided { data: &mut a, stride: 4 },
//!     2,
//!     &mut info,
//!     2,
//! )
//! .unwrap();
//!
//! assert_eq!(info, [0, 1]);
//! ```

#![allow(clippy::too_many_arguments)]

pub mod arg_check;
pub mod batch;
pub mod batched;
pub mod error;
pub mod handle;
pub mod linalg;
pub mod mat;
pub mod scalar;
pub mod status;
pub mod workspace;

pub use batch::{BatchMut, BatchRef};
pub use error::{Error, Result};
pub use handle::{Handle, SolverParams};
pub use mat::{Mat, MatMut, MatRef};
pub use scalar::{c32, c64, ComplexField, RealField};
pub use status::FactorResult;

/// Specifies whether the triangular lower or upper part of a matrix should be accessed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    /// Lower half should be accessed.
    Lower,
    /// Upper half should be accessed.
    Upper,
}

/// Whether a matrix should be implicitly conjugated when read or not.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Conj {
    /// Do conjugate.
    Yes,
    /// Do not conjugate.
    No,
}

impl Conj {
    #[inline]
    pub fn is_conj(self) -> bool {
        self == Conj::Yes
    }
}

/// Parallelism strategy that can be passed to most of the routines in the library.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Parallelism {
    /// No parallelism.
    ///
    /// The code is executed sequentially on the same thread that calls a function
    /// and passes this argument.
    None,
    /// Rayon parallelism.
    ///
    /// The code is possibly executed in parallel on the current thread, as well as the currently
    /// active rayon thread pool.
    ///
    /// The contained value represents a hint about the number of threads an implementation should
    /// use, but there is no way to guarantee how many or which threads will be used.
    ///
    /// A value of `0` treated as equivalent to `rayon::current_num_threads()`.
    Rayon(usize),
}

/// Runs `op_a` and `op_b`, possibly in parallel, splitting the thread budget between them.
pub fn join_raw(
    op_a: impl Send + FnOnce(Parallelism),
    op_b: impl Send + FnOnce(Parallelism),
    parallelism: Parallelism,
) {
    match parallelism {
        Parallelism::None => {
            op_a(parallelism);
            op_b(parallelism);
        }
        Parallelism::Rayon(n_threads) => {
            let n_threads = if n_threads > 0 {
                n_threads
            } else {
                rayon::current_num_threads()
            };
            if n_threads == 1 {
                op_a(Parallelism::None);
                op_b(Parallelism::None);
            } else {
                let parallelism = Parallelism::Rayon(n_threads - n_threads / 2);
                rayon::join(|| op_a(parallelism), || op_b(parallelism));
            }
        }
    }
}

/// Number of threads a routine may use under the given strategy.
#[inline]
pub fn parallelism_degree(parallelism: Parallelism) -> usize {
    match parallelism {
        Parallelism::None => 1,
        Parallelism::Rayon(0) => rayon::current_num_threads(),
        Parallelism::Rayon(n_threads) => n_threads,
    }
}
