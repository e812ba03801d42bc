/// Hands out equally sized chunks of one preallocated byte region.
///
/// Chunks are only ever split off, never returned. A connection slot reserves its receive buffer
/// the first time it is opened and keeps it for the lifetime of the endpoint, so a region of
/// `slots * chunk` bytes suffices for any sequence of opens.
///
/// ```
/// # use embtcp::managed::Pool;
/// let mut memory = [0; 1024];
/// let mut pool = Pool::new(&mut memory[..], 512);
///
/// assert_eq!(pool.reserve().map(|c| c.len()), Some(512));
/// assert_eq!(pool.reserve().map(|c| c.len()), Some(512));
/// assert!(pool.reserve().is_none());
/// ```
#[derive(Debug)]
pub struct Pool<'a> {
    rest: &'a mut [u8],
    chunk: usize,
}

impl<'a> Pool<'a> {
    /// Create a pool over a region, handing out chunks of `chunk` bytes.
    pub fn new(memory: &'a mut [u8], chunk: usize) -> Self {
        Pool {
            rest: memory,
            chunk,
        }
    }

    /// Split off the next chunk.
    ///
    /// Returns `None` when the region is exhausted.
    pub fn reserve(&mut self) -> Option<&'a mut [u8]> {
        if self.chunk == 0 || self.rest.len() < self.chunk {
            return None;
        }

        let rest = core::mem::replace(&mut self.rest, &mut []);
        let (chunk, rest) = rest.split_at_mut(self.chunk);
        self.rest = rest;
        Some(chunk)
    }
}
