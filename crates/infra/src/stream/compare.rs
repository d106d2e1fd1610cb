//! Raw versus filtered stream statistics

use super::error::{PipelineError, Result};
use super::reader::{FrameRead, FrameReader};
use neurofilt_core::domain::{RawSample, SignalStats, StreamComparison};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, instrument};

/// Accumulate statistics over every complete frame of `source`
pub fn stream_stats<const N: usize, R: Read>(source: R) -> Result<SignalStats> {
    let mut reader: FrameReader<R, N> = FrameReader::new(source);
    let mut frame = [0 as RawSample; N];
    let mut stats = SignalStats::new();

    loop {
        let read = reader
            .read_frame(&mut frame)
            .map_err(|source| PipelineError::Read {
                frame: stats.frames,
                source,
            })?;
        if let FrameRead::End { .. } = read {
            break;
        }
        stats.push_frame(&frame);
    }

    Ok(stats)
}

fn file_stats<const N: usize>(path: &Path) -> Result<SignalStats> {
    let file = File::open(path).map_err(|source| PipelineError::OpenSource {
        path: path.to_path_buf(),
        source,
    })?;
    let stats = stream_stats::<N, _>(BufReader::new(file))?;
    debug!(path = %path.display(), frames = stats.frames, "Collected stream statistics");
    Ok(stats)
}

/// Compare a raw recording with its filtered counterpart
#[instrument(fields(input = %input.display(), output = %output.display()))]
pub fn compare_files<const N: usize>(input: &Path, output: &Path) -> Result<StreamComparison> {
    Ok(StreamComparison::new(
        file_stats::<N>(input)?,
        file_stats::<N>(output)?,
    ))
}
