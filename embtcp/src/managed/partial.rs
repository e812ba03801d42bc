use core::ops::{Deref, DerefMut};

/// Refer to a part of some container.
///
/// Useful to create a dynamically sized storage over a statically sized backing buffer. The
/// receive buffer of each connection is a `Partial` over its reserved chunk: received bytes are
/// appended to the logical end and truncated at the capacity of the chunk.
///
/// ```
/// # use embtcp::managed::Partial;
/// let mut bytes = [0; 4];
/// let mut storage = Partial::new(&mut bytes[..]);
///
/// assert_eq!(storage.extend_truncated(b"abc"), 3);
/// assert_eq!(storage.extend_truncated(b"def"), 1);
/// assert_eq!(storage.as_slice(), b"abcd");
/// ```
#[derive(Clone, Debug)]
pub struct Partial<C> {
    inner: C,
    end: usize,
}

impl<C> Partial<C> {
    /// Make an instance that initially refers to an empty part.
    pub fn new(container: C) -> Self {
        Partial {
            inner: container,
            end: 0,
        }
    }

    /// Get the claimed length.
    pub fn len(&self) -> usize {
        self.end
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.end == 0
    }

    /// Forget all logically active elements.
    pub fn clear(&mut self) {
        self.end = 0;
    }
}

impl<C, T> Partial<C>
    where C: Deref<Target=[T]>
{
    /// Check how many elements can be referred to at most.
    pub fn capacity(&self) -> usize {
        self.inner.len()
    }

    /// Get the logically active elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        &self.inner[..self.end]
    }
}

impl<C, T> Partial<C>
    where C: Deref<Target=[T]> + DerefMut, T: Copy,
{
    /// Append as many elements as still fit, returning how many were taken.
    ///
    /// Elements beyond the capacity are silently dropped.
    pub fn extend_truncated(&mut self, data: &[T]) -> usize {
        let free = &mut self.inner[self.end..];
        let count = free.len().min(data.len());
        free[..count].copy_from_slice(&data[..count]);
        self.end += count;
        count
    }
}
