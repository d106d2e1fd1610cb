//! Frame-at-a-time writing of raw sample streams

use neurofilt_core::domain::frame::{frame_bytes, samples_to_ne_bytes, RawSample};
use std::io::{self, Write};

/// Writes frames of `N` native-endian samples to a byte sink
pub struct FrameWriter<W, const N: usize> {
    inner: W,
    buffer: Vec<u8>,
}

impl<W: Write, const N: usize> FrameWriter<W, N> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            buffer: vec![0; frame_bytes(N)],
        }
    }

    /// Write one frame, channel 0 first
    pub fn write_frame(&mut self, frame: &[RawSample; N]) -> io::Result<()> {
        samples_to_ne_bytes(frame, &mut self.buffer);
        self.inner.write_all(&self.buffer)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
