//! Argument validation shared by the batched drivers.
//!
//! The drivers check, in order, the handle, the sizes, whether the call is a no-op, and finally
//! the buffers. Buffer checks are skipped while the handle is in size-query mode.

use crate::{
    error::{Error, Result},
    mat::column_major_extent,
};

/// Outcome of a successful validation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArgCheck {
    /// The arguments are legal and there is work to do.
    Continue,
    /// A dimension or the batch count is zero. Nothing is read or written.
    QuickReturn,
}

impl ArgCheck {
    /// Quick return if any of `values` is zero.
    #[inline]
    pub fn from_dims(values: &[usize]) -> Self {
        if values.contains(&0) {
            ArgCheck::QuickReturn
        } else {
            ArgCheck::Continue
        }
    }
}

/// Converts a signed dimension, rejecting negative values.
#[inline]
pub fn dim(value: isize, argument: &'static str) -> Result<usize> {
    usize::try_from(value).map_err(|_| Error::InvalidSize { argument })
}

/// Converts a signed leading dimension, which must be at least `nrows`.
#[inline]
pub fn leading_dim(value: isize, nrows: usize, argument: &'static str) -> Result<usize> {
    let ld = dim(value, argument)?;
    if ld < nrows {
        Err(Error::InvalidSize { argument })
    } else {
        Ok(ld)
    }
}

/// Number of elements spanned by one matrix of the batch.
#[inline]
pub fn span(nrows: usize, ncols: usize, ld: usize, argument: &'static str) -> Result<usize> {
    column_major_extent(nrows, ncols, ld).ok_or(Error::InvalidSize { argument })
}

/// Checks that the status array has one entry per batch element.
#[inline]
pub fn info_len(info: &[i32], batch_count: usize) -> Result<()> {
    if info.len() < batch_count {
        Err(Error::InvalidPointer { argument: "info" })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes() {
        assert_eq!(dim(3, "m"), Ok(3));
        assert_eq!(dim(-1, "m"), Err(Error::InvalidSize { argument: "m" }));
        assert_eq!(leading_dim(4, 4, "lda"), Ok(4));
        assert_eq!(
            leading_dim(3, 4, "lda"),
            Err(Error::InvalidSize { argument: "lda" })
        );
        // empty matrices accept any leading dimension, since they quick-return
        assert_eq!(leading_dim(0, 0, "lda"), Ok(0));
        assert_eq!(span(3, 2, 5, "a"), Ok(8));
        assert!(span(2, usize::MAX, usize::MAX, "a").is_err());
    }

    #[test]
    fn quick_return_on_any_zero() {
        assert_eq!(ArgCheck::from_dims(&[3, 0, 2]), ArgCheck::QuickReturn);
        assert_eq!(ArgCheck::from_dims(&[3, 1, 2]), ArgCheck::Continue);
        assert!(info_len(&[0; 2], 3).is_err());
    }
}
