//! Symmetric and Hermitian eigenvalue building blocks.
//!
//! A self-adjoint matrix $A$ is first reduced to a real symmetric tridiagonal matrix $T$ with
//! $$A = Q T Q^H,$$
//! where $Q$ is a product of elementary reflectors, see [`tridiag`]. The eigenvalues of $T$,
//! and thus of $A$, are then computed with an implicit QR iteration, see
//! [`tridiag_qr_algorithm`].

pub mod tridiag;
pub mod tridiag_qr_algorithm;
