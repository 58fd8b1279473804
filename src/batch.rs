//! Batch layouts.
//!
//! A batch is a set of same-shaped column-major matrices, passed either as one buffer, as an
//! array of independent buffers, or as one contiguous buffer with a fixed stride between
//! consecutive matrices. Vectors are batched the same way, as `len x 1` matrices.

use crate::error::{Error, Result};

/// Mutable batch of matrices.
#[derive(Debug)]
pub enum BatchMut<'a, E> {
    /// A single matrix. Only valid with a batch count of `1`.
    Single(&'a mut [E]),
    /// One independent buffer per matrix. Extra buffers past the batch count are ignored.
    Batched(Vec<&'a mut [E]>),
    /// Matrix `i` starts at `data[i * stride]`.
    Strided { data: &'a mut [E], stride: isize },
}

/// Read-only batch of matrices.
///
/// Unlike [`BatchMut`], the matrices of a strided batch may overlap. A stride of `0` uses the
/// same matrix for every batch element.
#[derive(Copy, Clone, Debug)]
pub enum BatchRef<'a, E> {
    /// A single matrix. Only valid with a batch count of `1`.
    Single(&'a [E]),
    /// One independent buffer per matrix. Extra buffers past the batch count are ignored.
    Batched(&'a [&'a [E]]),
    /// Matrix `i` starts at `data[i * stride]`.
    Strided { data: &'a [E], stride: isize },
}

#[inline]
fn strided_len(span: usize, stride: usize, batch_count: usize) -> Option<usize> {
    if batch_count == 0 || span == 0 {
        return Some(0);
    }
    stride.checked_mul(batch_count - 1)?.checked_add(span)
}

impl<'a, E> BatchMut<'a, E> {
    /// Checks the layout against the size of one matrix, without looking at the buffers.
    ///
    /// Matrices of a mutable batch must not overlap.
    pub fn check_layout(
        &self,
        span: usize,
        batch_count: usize,
        argument: &'static str,
    ) -> Result<()> {
        match *self {
            BatchMut::Single(_) if batch_count > 1 => Err(Error::InvalidSize { argument }),
            BatchMut::Strided { stride, .. } => {
                if stride < 0 || (batch_count > 1 && span > 0 && (stride as usize) < span) {
                    Err(Error::InvalidSize { argument })
                } else {
                    Ok(())
                }
            }
            _ => Ok(()),
        }
    }

    /// Checks that the buffers can hold `batch_count` matrices spanning `span` elements.
    pub fn check_buffers(
        &self,
        span: usize,
        batch_count: usize,
        argument: &'static str,
    ) -> Result<()> {
        let ok = match self {
            BatchMut::Single(data) => data.len() >= span,
            BatchMut::Batched(ptrs) => {
                ptrs.len() >= batch_count && ptrs[..batch_count].iter().all(|m| m.len() >= span)
            }
            BatchMut::Strided { data, stride } => strided_len(span, *stride as usize, batch_count)
                .is_some_and(|len| data.len() >= len),
        };
        if ok {
            Ok(())
        } else {
            Err(Error::InvalidPointer { argument })
        }
    }

    /// Splits the batch into one slice of `span` elements per matrix.
    ///
    /// # Panics
    ///
    /// Panics if the layout or buffers were not checked with the same arguments.
    #[track_caller]
    pub fn into_slices(self, span: usize, batch_count: usize) -> Vec<&'a mut [E]> {
        if span == 0 {
            return (0..batch_count).map(|_| <&mut [E]>::default()).collect();
        }
        match self {
            BatchMut::Single(data) => vec![&mut data[..span]],
            BatchMut::Batched(ptrs) => ptrs
                .into_iter()
                .take(batch_count)
                .map(|m| &mut m[..span])
                .collect(),
            BatchMut::Strided { data, stride } => {
                let stride = stride as usize;
                let mut out = Vec::with_capacity(batch_count);
                let mut rest = data;
                for i in 0..batch_count {
                    let rest_len = rest.len();
                    let step = if i + 1 == batch_count { rest_len } else { stride };
                    let (head, tail) = core::mem::take(&mut rest).split_at_mut(step);
                    out.push(&mut head[..span]);
                    rest = tail;
                }
                out
            }
        }
    }
}

impl<'a, E> BatchRef<'a, E> {
    /// Checks the layout against the size of one matrix, without looking at the buffers.
    pub fn check_layout(
        &self,
        _span: usize,
        batch_count: usize,
        argument: &'static str,
    ) -> Result<()> {
        match *self {
            BatchRef::Single(_) if batch_count > 1 => Err(Error::InvalidSize { argument }),
            BatchRef::Strided { stride, .. } if stride < 0 => Err(Error::InvalidSize { argument }),
            _ => Ok(()),
        }
    }

    /// Checks that the buffers can hold `batch_count` matrices spanning `span` elements.
    pub fn check_buffers(
        &self,
        span: usize,
        batch_count: usize,
        argument: &'static str,
    ) -> Result<()> {
        let ok = match *self {
            BatchRef::Single(data) => data.len() >= span,
            BatchRef::Batched(ptrs) => {
                ptrs.len() >= batch_count && ptrs[..batch_count].iter().all(|m| m.len() >= span)
            }
            BatchRef::Strided { data, stride } => {
                strided_len(span, stride as usize, batch_count).is_some_and(|len| data.len() >= len)
            }
        };
        if ok {
            Ok(())
        } else {
            Err(Error::InvalidPointer { argument })
        }
    }

    /// Returns one slice of `span` elements per matrix.
    ///
    /// # Panics
    ///
    /// Panics if the layout or buffers were not checked with the same arguments.
    #[track_caller]
    pub fn into_slices(self, span: usize, batch_count: usize) -> Vec<&'a [E]> {
        if span == 0 {
            return (0..batch_count).map(|_| <&[E]>::default()).collect();
        }
        match self {
            BatchRef::Single(data) => vec![&data[..span]],
            BatchRef::Batched(ptrs) => ptrs[..batch_count].iter().map(|m| &m[..span]).collect(),
            BatchRef::Strided { data, stride } => {
                let stride = stride as usize;
                (0..batch_count)
                    .map(|i| &data[i * stride..][..span])
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strided_split() {
        let mut data: Vec<i32> = (0..11).collect();
        let batch = BatchMut::Strided {
            data: &mut data,
            stride: 4,
        };
        batch.check_layout(3, 3, "a").unwrap();
        batch.check_buffers(3, 3, "a").unwrap();
        let slices = batch.into_slices(3, 3);
        assert_eq!(slices.len(), 3);
        assert_eq!(*slices[1], [4, 5, 6]);
        assert_eq!(*slices[2], [8, 9, 10]);
    }

    #[test]
    fn overlapping_mutable_batch_is_rejected() {
        let mut data = [0.0f64; 8];
        let batch = BatchMut::Strided {
            data: &mut data,
            stride: 2,
        };
        assert_eq!(
            batch.check_layout(4, 2, "a"),
            Err(Error::InvalidSize { argument: "a" })
        );
        assert_eq!(batch.check_layout(4, 1, "a"), Ok(()));

        let negative = BatchMut::Strided {
            data: &mut data,
            stride: -4,
        };
        assert!(negative.check_layout(4, 1, "a").is_err());
    }

    #[test]
    fn short_buffers_are_invalid_pointers() {
        let mut a = [0.0f32; 4];
        let mut b = [0.0f32; 3];
        let batch = BatchMut::Batched(vec![&mut a[..], &mut b[..]]);
        assert_eq!(
            batch.check_buffers(4, 2, "a"),
            Err(Error::InvalidPointer { argument: "a" })
        );
        assert_eq!(batch.check_buffers(4, 1, "a"), Ok(()));

        let single = BatchMut::Single(&mut a);
        assert!(single.check_layout(4, 2, "a").is_err());
        assert!(single.check_buffers(5, 1, "a").is_err());
    }

    #[test]
    fn broadcast_read_only_batch() {
        let data = [1, 2, 3];
        let batch = BatchRef::Strided {
            data: &data,
            stride: 0,
        };
        batch.check_layout(3, 4, "a").unwrap();
        batch.check_buffers(3, 4, "a").unwrap();
        let slices = batch.into_slices(3, 4);
        assert!(slices.iter().all(|s| *s == [1, 2, 3]));
    }
}
