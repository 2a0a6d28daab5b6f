//! Byte-buffer pool that bounds allocation under sustained codec load.
//!
//! The JSON engine reads sources byte-by-byte; handing it a pooled buffered
//! reader keeps per-operation allocation flat. The lock covers only list
//! manipulation, never the caller's use of a buffer.

use parking_lot::Mutex;
use std::io::{Read, Write};

/// Capacity of each pooled buffer in bytes.
pub const BUFFER_CAPACITY: usize = 512;

/// Maximum number of buffers the pool retains; recycled buffers beyond this
/// are dropped.
pub const MAX_POOLED: usize = 16;

/// A bounded pool of fixed-capacity byte buffers.
#[derive(Debug, Default)]
pub struct BufferPool {
    buffers: Mutex<Vec<Vec<u8>>>,
}

impl BufferPool {
    /// An empty pool; buffers are allocated lazily on first take.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pop a pooled buffer, or allocate a fresh one when the pool is empty.
    /// The returned buffer is empty with capacity [`BUFFER_CAPACITY`].
    #[must_use]
    pub fn take(&self) -> Vec<u8> {
        self.buffers
            .lock()
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(BUFFER_CAPACITY))
    }

    /// Return a buffer to the pool. Cleared before reuse; dropped when the
    /// pool already holds [`MAX_POOLED`] buffers or the buffer was grown past
    /// [`BUFFER_CAPACITY`].
    pub fn recycle(&self, mut buffer: Vec<u8>) {
        if buffer.capacity() > BUFFER_CAPACITY {
            return;
        }
        buffer.clear();
        let mut buffers = self.buffers.lock();
        if buffers.len() < MAX_POOLED {
            buffers.push(buffer);
        }
    }

    /// Number of buffers currently pooled.
    #[must_use]
    pub fn pooled(&self) -> usize {
        self.buffers.lock().len()
    }
}

/// Buffered writer over a byte sink using a pooled buffer. The buffer goes
/// back to the pool when the writer is finished or dropped.
pub(crate) struct PooledWriter<'a, W: Write> {
    pool: &'a BufferPool,
    buffer: Vec<u8>,
    sink: W,
}

impl<'a, W: Write> PooledWriter<'a, W> {
    pub(crate) fn new(pool: &'a BufferPool, sink: W) -> Self {
        Self {
            pool,
            buffer: pool.take(),
            sink,
        }
    }

    fn flush_buffer(&mut self) -> std::io::Result<()> {
        if !self.buffer.is_empty() {
            self.sink.write_all(&self.buffer)?;
            self.buffer.clear();
        }
        Ok(())
    }

    /// Flush buffered bytes and the sink itself.
    pub(crate) fn finish(mut self) -> std::io::Result<()> {
        self.flush_buffer()?;
        self.sink.flush()
    }
}

impl<W: Write> Write for PooledWriter<'_, W> {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        if self.buffer.len() + data.len() > BUFFER_CAPACITY {
            self.flush_buffer()?;
        }
        if data.len() >= BUFFER_CAPACITY {
            // Oversized chunk, bypass the buffer.
            self.sink.write_all(data)?;
        } else {
            self.buffer.extend_from_slice(data);
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_buffer()?;
        self.sink.flush()
    }
}

impl<W: Write> Drop for PooledWriter<'_, W> {
    fn drop(&mut self) {
        self.pool.recycle(std::mem::take(&mut self.buffer));
    }
}

/// Buffered reader over a byte source using a pooled buffer. The buffer goes
/// back to the pool on drop.
pub(crate) struct PooledReader<'a, R: Read> {
    pool: &'a BufferPool,
    buffer: Vec<u8>,
    pos: usize,
    filled: usize,
    source: R,
}

impl<'a, R: Read> PooledReader<'a, R> {
    pub(crate) fn new(pool: &'a BufferPool, source: R) -> Self {
        let mut buffer = pool.take();
        buffer.resize(BUFFER_CAPACITY, 0);
        Self {
            pool,
            buffer,
            pos: 0,
            filled: 0,
            source,
        }
    }
}

impl<R: Read> Read for PooledReader<'_, R> {
    fn read(&mut self, out: &mut [u8]) -> std::io::Result<usize> {
        if self.pos == self.filled {
            self.filled = self.source.read(&mut self.buffer)?;
            self.pos = 0;
            if self.filled == 0 {
                return Ok(0);
            }
        }
        let n = out.len().min(self.filled - self.pos);
        out[..n].copy_from_slice(&self.buffer[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl<R: Read> Drop for PooledReader<'_, R> {
    fn drop(&mut self) {
        self.pool.recycle(std::mem::take(&mut self.buffer));
    }
}
