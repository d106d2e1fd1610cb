//! Frame-at-a-time reading of raw sample streams

use neurofilt_core::domain::frame::{frame_bytes, samples_from_ne_bytes, RawSample, SAMPLE_BYTES};
use std::io::{self, ErrorKind, Read};
use tracing::debug;

/// Outcome of one frame read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRead {
    /// A complete frame was read
    Frame,
    /// The source is exhausted. `trailing_bytes` (< one frame) were left over
    /// and discarded.
    End { trailing_bytes: usize },
}

impl FrameRead {
    /// Whole samples in the discarded tail; a dangling odd byte counts as none
    pub fn trailing_samples(&self) -> usize {
        match self {
            Self::Frame => 0,
            Self::End { trailing_bytes } => trailing_bytes / SAMPLE_BYTES,
        }
    }
}

/// Reads frames of `N` native-endian samples from a byte source
pub struct FrameReader<R, const N: usize> {
    inner: R,
    buffer: Vec<u8>,
}

impl<R: Read, const N: usize> FrameReader<R, N> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buffer: vec![0; frame_bytes(N)],
        }
    }

    /// Read the next complete frame into `frame`.
    ///
    /// End-of-stream, clean or in the middle of a frame, is reported as
    /// [`FrameRead::End`]; a partial frame is never handed out. Any other I/O
    /// error is returned as is.
    pub fn read_frame(&mut self, frame: &mut [RawSample; N]) -> io::Result<FrameRead> {
        let mut filled = 0;

        while filled < self.buffer.len() {
            match self.inner.read(&mut self.buffer[filled..]) {
                Ok(0) => {
                    if filled > 0 {
                        debug!(trailing_bytes = filled, "Discarding partial trailing frame");
                    }
                    return Ok(FrameRead::End {
                        trailing_bytes: filled,
                    });
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        samples_from_ne_bytes(&self.buffer, frame);
        Ok(FrameRead::Frame)
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}
