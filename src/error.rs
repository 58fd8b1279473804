//! Errors returned by the batched drivers.
//!
//! Numerical singularities are never reported here, see [`crate::status`].

use dyn_stack::SizeOverflow;

/// Usage or resource error of a batched call. No output is written when one is returned.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The handle is not in a state that allows the requested operation.
    #[error("the handle is in an invalid state for this operation")]
    InvalidHandle,
    /// A dimension, leading dimension, stride or batch count is illegal.
    #[error("invalid size for argument `{argument}`")]
    InvalidSize { argument: &'static str },
    /// A buffer required by nonzero sizes is missing or too short.
    #[error("missing or too short buffer for argument `{argument}`")]
    InvalidPointer { argument: &'static str },
    /// The workspace could not be allocated, or does not fit in the user-managed pool.
    #[error("failed to provide {required} bytes of workspace")]
    MemoryError {
        /// Number of bytes requested, `usize::MAX` if the size computation overflowed.
        required: usize,
    },
}

impl From<SizeOverflow> for Error {
    #[inline]
    fn from(_: SizeOverflow) -> Self {
        Error::MemoryError {
            required: usize::MAX,
        }
    }
}

/// Result type of the batched drivers.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_argument() {
        let err = Error::InvalidSize { argument: "lda" };
        assert_eq!(err.to_string(), "invalid size for argument `lda`");
        assert_eq!(
            Error::from(SizeOverflow),
            Error::MemoryError {
                required: usize::MAX
            }
        );
    }
}
