//! Sequential frame streams
//!
//! Frames are read and written strictly in order, without seeking:
//! - [`reader`]/[`writer`]: raw frame framing over `Read`/`Write`
//! - [`pipeline`]: the decode → filter → encode loop with deadline monitoring
//! - [`preview`]: console dump of leading frames
//! - [`compare`]: raw versus filtered signal statistics

pub mod compare;
pub mod error;
pub mod pipeline;
pub mod preview;
pub mod reader;
pub mod writer;

pub use compare::{compare_files, stream_stats};
pub use error::{PipelineError, Result};
pub use pipeline::{PipelineState, RunSummary, StreamingPipeline};
pub use preview::{Preview, Tee};
pub use reader::{FrameRead, FrameReader};
pub use writer::FrameWriter;
