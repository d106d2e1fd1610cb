//! Raw-data preview utility
//!
//! Dumps a header and the leading frames of a raw recording as text, to the
//! console and optionally mirrored into a file. Shares the frame format with
//! the pipeline but none of its filter state.

use super::error::{PipelineError, Result};
use super::reader::{FrameRead, FrameReader};
use neurofilt_core::domain::{RawSample, NUM_CHANNELS};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::{info, instrument};

/// Writes everything to two sinks
pub struct Tee<A, B> {
    first: A,
    second: B,
}

impl<A: Write, B: Write> Tee<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    pub fn into_inner(self) -> (A, B) {
        (self.first, self.second)
    }
}

impl<A: Write, B: Write> Write for Tee<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.first.write_all(buf)?;
        self.second.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.first.flush()?;
        self.second.flush()
    }
}

/// Text preview of the first frames of an `N`-channel stream
#[derive(Debug, Clone, Copy)]
pub struct Preview<const N: usize = NUM_CHANNELS> {
    frames: usize,
    channels_shown: usize,
}

impl<const N: usize> Preview<N> {
    /// Channels printed per frame unless overridden
    pub const DEFAULT_CHANNELS_SHOWN: usize = 8;

    pub fn new(frames: usize) -> Self {
        Self {
            frames,
            channels_shown: Self::DEFAULT_CHANNELS_SHOWN.min(N),
        }
    }

    pub fn with_channels_shown(mut self, channels: usize) -> Self {
        self.channels_shown = channels.min(N);
        self
    }

    pub fn header() -> String {
        format!("Neural Data ({} channels, 16-bit samples)", N)
    }

    /// Write the preview of `source` to `out`.
    ///
    /// Returns the number of frames shown. A source shorter than the
    /// requested frame count ends the preview with a notice, not an error.
    pub fn write<R: Read, W: Write>(&self, source: R, out: &mut W) -> Result<usize> {
        let mut reader: FrameReader<R, N> = FrameReader::new(source);
        let mut frame = [0 as RawSample; N];

        emit(out, 0, &Self::header())?;

        let mut shown = 0;
        while shown < self.frames {
            let read = reader
                .read_frame(&mut frame)
                .map_err(|source| PipelineError::Read {
                    frame: shown as u64,
                    source,
                })?;
            if let FrameRead::End { .. } = read {
                emit(out, shown as u64, "Error reading data or reached end of file")?;
                break;
            }

            emit(out, shown as u64, &self.format_frame(shown + 1, &frame))?;
            shown += 1;
        }

        out.flush().map_err(PipelineError::Flush)?;
        Ok(shown)
    }

    /// Preview the file at `input` on stdout, mirrored into `save` if given.
    #[instrument(skip(self, input, save), fields(input = %input.display()))]
    pub fn write_file(&self, input: &Path, save: Option<&Path>) -> Result<usize> {
        let source = File::open(input).map_err(|source| PipelineError::OpenSource {
            path: input.to_path_buf(),
            source,
        })?;
        let source = BufReader::new(source);
        let stdout = io::stdout().lock();

        match save {
            Some(path) => {
                let mirror = File::create(path).map_err(|source| PipelineError::OpenSink {
                    path: path.to_path_buf(),
                    source,
                })?;
                let mut out = Tee::new(stdout, BufWriter::new(mirror));
                let shown = self.write(source, &mut out)?;
                info!(path = %path.display(), "Preview saved");
                Ok(shown)
            }
            None => {
                let mut out = stdout;
                self.write(source, &mut out)
            }
        }
    }

    // "Sample 3: 12 -7 0 ..." (1-based)
    fn format_frame(&self, index: usize, frame: &[RawSample; N]) -> String {
        let mut text = format!("Sample {}:", index);
        for value in &frame[..self.channels_shown] {
            text.push(' ');
            text.push_str(&value.to_string());
        }
        if self.channels_shown < N {
            text.push_str(" ...");
        }
        text
    }
}

fn emit<W: Write>(out: &mut W, frame: u64, text: &str) -> Result<()> {
    writeln!(out, "{}", text).map_err(|source| PipelineError::Write { frame, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn to_bytes(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_ne_bytes()).collect()
    }

    fn render<const N: usize>(preview: Preview<N>, samples: &[i16]) -> (usize, String) {
        let mut out = Vec::new();
        let shown = preview.write(Cursor::new(to_bytes(samples)), &mut out).unwrap();
        (shown, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_header() {
        assert_eq!(
            Preview::<256>::header(),
            "Neural Data (256 channels, 16-bit samples)"
        );
    }

    #[test]
    fn test_shows_requested_frames() {
        let (shown, text) = render(Preview::<2>::new(2), &[1, 2, 3, 4, 5, 6]);

        assert_eq!(shown, 2);
        assert_eq!(
            text,
            "Neural Data (2 channels, 16-bit samples)\nSample 1: 1 2\nSample 2: 3 4\n"
        );
    }

    #[test]
    fn test_short_source_ends_with_notice() {
        let (shown, text) = render(Preview::<2>::new(10), &[1, 2, 3]);

        assert_eq!(shown, 1);
        assert!(text.ends_with("Sample 1: 1 2\nError reading data or reached end of file\n"));
    }

    #[test]
    fn test_truncates_wide_frames() {
        let (_, text) = render(Preview::<4>::new(1).with_channels_shown(2), &[9, 8, 7, 6]);
        assert!(text.contains("Sample 1: 9 8 ...\n"));
    }

    #[test]
    fn test_tee_writes_both() {
        let mut tee = Tee::new(Vec::new(), Vec::new());
        tee.write_all(b"hello").unwrap();
        tee.flush().unwrap();

        let (a, b) = tee.into_inner();
        assert_eq!(a, b"hello");
        assert_eq!(b, b"hello");
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Preview::<4>::new(1)
            .write_file(&dir.path().join("missing.dat"), None)
            .unwrap_err();
        assert!(matches!(err, PipelineError::OpenSource { .. }));
    }

    #[test]
    fn test_write_file_mirrors_to_save_path() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("raw.dat");
        let saved = dir.path().join("preview.txt");
        std::fs::write(&input, to_bytes(&[1, 2, 3, 4])).unwrap();

        let shown = Preview::<2>::new(5).write_file(&input, Some(&saved)).unwrap();

        assert_eq!(shown, 2);
        let text = std::fs::read_to_string(&saved).unwrap();
        assert!(text.starts_with("Neural Data (2 channels, 16-bit samples)\n"));
        assert!(text.contains("Sample 2: 3 4\n"));
    }
}
