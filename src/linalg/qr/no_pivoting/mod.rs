//! The QR decomposition without pivoting. $Q$ is stored implicitly as a sequence of
//! elementary reflectors, see [`crate::linalg::householder`].

pub mod compute;
