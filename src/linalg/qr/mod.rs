//! The QR decomposition of a matrix $A$ is a factorization
//! $$A = QR,$$
//! where $Q$ is a unitary matrix, and $R$ is an upper trapezoidal matrix.

pub mod no_pivoting;
