//! Neurofilt infrastructure: binary frame streams and the filtering pipeline
//!
//! Sources and sinks are any `Read`/`Write`; file helpers open local paths.

pub mod stream;
