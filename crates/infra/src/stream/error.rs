use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that abort a pass over a frame stream
///
/// A short trailing frame is not an error, and neither is a deadline miss.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Source could not be opened; nothing was processed
    #[error("Failed to open source {}: {source}", .path.display())]
    OpenSource { path: PathBuf, source: io::Error },

    /// Sink could not be opened; nothing was processed
    #[error("Failed to open sink {}: {source}", .path.display())]
    OpenSink { path: PathBuf, source: io::Error },

    /// Source failed for a reason other than end-of-stream
    #[error("Read error at frame {frame}: {source}")]
    Read { frame: u64, source: io::Error },

    #[error("Write error at frame {frame}: {source}")]
    Write { frame: u64, source: io::Error },

    #[error("Failed to flush sink: {0}")]
    Flush(#[source] io::Error),
}

impl PipelineError {
    /// Whether the run failed before touching any frame
    pub fn is_open_failure(&self) -> bool {
        matches!(self, Self::OpenSource { .. } | Self::OpenSink { .. })
    }
}
