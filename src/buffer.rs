//! Size-capped receive buffer for response bodies.

use std::collections::TryReserveError;

/// Capacity a fresh buffer starts with.
pub const INITIAL_CAPACITY: usize = 4096;

/// Default ceiling for a buffered response body.
pub const DEFAULT_MAX_RESPONSE_SIZE: usize = 32 * 1024;

/// Append-only byte accumulator that grows by doubling up to a hard limit.
///
/// Bytes past the limit are dropped and the buffer is flagged as truncated;
/// callers check [`ResponseBuffer::is_truncated`] before trusting the contents.
#[derive(Debug)]
pub struct ResponseBuffer {
    data: Vec<u8>,
    limit: usize,
    truncated: bool,
}

impl ResponseBuffer {
    /// Allocate an empty buffer that will never hold more than `limit` bytes.
    pub fn with_limit(limit: usize) -> Result<Self, TryReserveError> {
        let mut data = Vec::new();
        data.try_reserve_exact(INITIAL_CAPACITY.min(limit))?;
        Ok(Self {
            data,
            limit,
            truncated: false,
        })
    }

    /// Append a chunk, growing as needed.
    ///
    /// Returns the number of bytes kept. Once the limit is hit the buffer is
    /// marked truncated and later chunks are ignored.
    pub fn append(&mut self, chunk: &[u8]) -> Result<usize, TryReserveError> {
        if self.truncated {
            return Ok(0);
        }

        let room = self.limit - self.data.len();
        let keep = chunk.len().min(room);
        if keep < chunk.len() {
            self.truncated = true;
        }
        if keep == 0 {
            return Ok(0);
        }

        let needed = self.data.len() + keep;
        if needed > self.data.capacity() {
            let mut grown = self.data.capacity().max(1);
            while grown < needed {
                grown = grown.saturating_mul(2);
            }
            let grown = grown.min(self.limit);
            self.data.try_reserve_exact(grown - self.data.len())?;
        }

        self.data.extend_from_slice(&chunk[..keep]);
        Ok(keep)
    }

    /// Number of bytes currently held.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// `true` when nothing has been received.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes allocated for the buffer.
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Configured ceiling.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Whether any incoming bytes were dropped at the ceiling.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// View the buffered bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Take ownership of the buffered bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}
