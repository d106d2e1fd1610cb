//! Streaming filter pipeline
//!
//! Drives one pass over a raw frame stream:
//!
//! ```text
//! Idle -> Opening -> Streaming { read -> decode -> filter -> encode -> write }* -> Draining -> Closed
//! ```
//!
//! A closed pipeline may run again, starting over from `Opening`.
//! The pass ends when the source is exhausted; a trailing partial frame is
//! dropped. Each frame's decode/filter/encode window is timed once and handed
//! to the [`DeadlineMonitor`].

use super::error::{PipelineError, Result};
use super::reader::{FrameRead, FrameReader};
use super::writer::FrameWriter;
use neurofilt_core::domain::{
    BiquadCoeffs, DeadlineMonitor, FilterBank, PipelineConfig, RawSample, TimingStats,
    NUM_CHANNELS,
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

/// Lifecycle of a filtering run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineState {
    Idle,
    Opening,
    Streaming,
    Draining,
    Closed,
}

impl PipelineState {
    /// Whether a run may move from `self` to `next`
    pub fn can_transition_to(self, next: PipelineState) -> bool {
        use PipelineState::*;

        matches!(
            (self, next),
            (Idle | Closed, Opening)
                | (Opening, Streaming | Closed)
                | (Streaming, Draining | Closed)
                | (Draining, Closed)
        )
    }
}

/// Result of a completed run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Frames read, filtered and written
    pub frames: u64,
    /// Samples of a trailing partial frame that were dropped
    pub discarded_samples: usize,
    pub timing: TimingStats,
}

/// Filters a stream of `N`-channel frames through one [`FilterBank`]
pub struct StreamingPipeline<const N: usize = NUM_CHANNELS> {
    bank: FilterBank<N>,
    monitor: DeadlineMonitor,
    state: PipelineState,
}

impl<const N: usize> StreamingPipeline<N> {
    pub fn new(coeffs: BiquadCoeffs, budget: Duration) -> Self {
        Self {
            bank: FilterBank::new(coeffs),
            monitor: DeadlineMonitor::new(budget, N),
            state: PipelineState::Idle,
        }
    }

    /// Pipeline with the fixed notch and the configured frame budget
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(BiquadCoeffs::NEURAL_NOTCH, config.realtime_budget())
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn bank(&self) -> &FilterBank<N> {
        &self.bank
    }

    fn transition(&mut self, next: PipelineState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal pipeline transition {:?} -> {:?}",
            self.state,
            next
        );
        debug!(from = ?self.state, to = ?next, "Pipeline state change");
        self.state = next;
    }

    /// Open `input` for reading and `output` for writing, then [`run`](Self::run).
    ///
    /// The source is opened first, so a missing input never creates the
    /// output file.
    #[instrument(skip(self, input, output), fields(input = %input.display(), output = %output.display()))]
    pub fn run_files(&mut self, input: &Path, output: &Path) -> Result<RunSummary> {
        self.transition(PipelineState::Opening);

        let opened = File::open(input)
            .map_err(|source| PipelineError::OpenSource {
                path: input.to_path_buf(),
                source,
            })
            .and_then(|source_file| {
                let sink_file = File::create(output).map_err(|source| PipelineError::OpenSink {
                    path: output.to_path_buf(),
                    source,
                })?;
                Ok((source_file, sink_file))
            });

        let (source_file, sink_file) = match opened {
            Ok(files) => files,
            Err(e) => {
                self.transition(PipelineState::Closed);
                return Err(e);
            }
        };

        self.run(BufReader::new(source_file), BufWriter::new(sink_file))
    }

    /// Filter every complete frame of `source` into `sink`.
    ///
    /// Channel states and timing start from zero on every call. Read errors
    /// other than end-of-stream and all write errors abort the run.
    #[instrument(skip(self, source, sink), fields(channels = N))]
    pub fn run<R: Read, W: Write>(&mut self, source: R, sink: W) -> Result<RunSummary> {
        if self.state != PipelineState::Opening {
            self.transition(PipelineState::Opening);
        }
        self.bank.reset();
        self.monitor = DeadlineMonitor::new(self.monitor.budget(), N);

        let result = self.stream(source, sink);
        self.transition(PipelineState::Closed);

        let summary = result?;
        info!(
            frames = summary.frames,
            discarded_samples = summary.discarded_samples,
            violations = summary.timing.violations,
            "Filtering run complete"
        );
        Ok(summary)
    }

    fn stream<R: Read, W: Write>(&mut self, source: R, sink: W) -> Result<RunSummary> {
        let mut reader: FrameReader<R, N> = FrameReader::new(source);
        let mut writer: FrameWriter<W, N> = FrameWriter::new(sink);
        let mut input = [0 as RawSample; N];
        let mut output = [0 as RawSample; N];
        let mut frame: u64 = 0;

        self.transition(PipelineState::Streaming);

        let discarded_samples = loop {
            let read = reader
                .read_frame(&mut input)
                .map_err(|source| PipelineError::Read { frame, source })?;
            if let FrameRead::End { .. } = read {
                break read.trailing_samples();
            }

            let start = Instant::now();
            self.bank.process_frame(&input, &mut output);
            self.monitor.record(frame, start.elapsed());

            writer
                .write_frame(&output)
                .map_err(|source| PipelineError::Write { frame, source })?;
            frame += 1;
        };

        self.transition(PipelineState::Draining);
        writer.flush().map_err(PipelineError::Flush)?;

        Ok(RunSummary {
            frames: frame,
            discarded_samples,
            timing: self.monitor.stats(),
        })
    }
}

impl<const N: usize> Default for StreamingPipeline<N> {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}
