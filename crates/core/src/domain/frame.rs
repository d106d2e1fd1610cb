//! Frame layout and sample codec
//!
//! A frame is one time instant across all channels: `N` consecutive signed
//! 16-bit samples in native byte order, no header and no delimiters. The
//! filter works in `f32`, so every sample is widened on the way in and
//! saturated back to 16 bits on the way out.

/// Number of channels recorded by the acquisition device
pub const NUM_CHANNELS: usize = 256;

/// Storage representation of one sample
pub type RawSample = i16;

/// Width of one stored sample in bytes
pub const SAMPLE_BYTES: usize = std::mem::size_of::<RawSample>();

/// Largest value representable after encoding
pub const SAMPLE_MAX: f32 = RawSample::MAX as f32;

/// Smallest value representable after encoding
pub const SAMPLE_MIN: f32 = RawSample::MIN as f32;

/// Number of bytes occupied by one frame of `channels` samples
#[must_use]
pub const fn frame_bytes(channels: usize) -> usize {
    channels * SAMPLE_BYTES
}

/// Widen a stored sample to the working representation.
///
/// Exact: every 16-bit integer is representable in `f32`.
#[inline]
#[must_use]
pub fn decode_sample(raw: RawSample) -> f32 {
    f32::from(raw)
}

/// Narrow a working sample back to storage.
///
/// Clamps to `[SAMPLE_MIN, SAMPLE_MAX]` and then truncates toward zero, so
/// filter overshoot saturates instead of wrapping. NaN encodes as 0.
#[inline]
#[must_use]
pub fn encode_sample(value: f32) -> RawSample {
    value.clamp(SAMPLE_MIN, SAMPLE_MAX) as RawSample
}

/// Unpack native-endian bytes into samples.
///
/// `bytes` must hold exactly `samples.len() * SAMPLE_BYTES` bytes.
pub fn samples_from_ne_bytes(bytes: &[u8], samples: &mut [RawSample]) {
    debug_assert_eq!(bytes.len(), samples.len() * SAMPLE_BYTES);

    for (sample, chunk) in samples.iter_mut().zip(bytes.chunks_exact(SAMPLE_BYTES)) {
        *sample = RawSample::from_ne_bytes([chunk[0], chunk[1]]);
    }
}

/// Pack samples into native-endian bytes.
///
/// `bytes` must hold exactly `samples.len() * SAMPLE_BYTES` bytes.
pub fn samples_to_ne_bytes(samples: &[RawSample], bytes: &mut [u8]) {
    debug_assert_eq!(bytes.len(), samples.len() * SAMPLE_BYTES);

    for (chunk, sample) in bytes.chunks_exact_mut(SAMPLE_BYTES).zip(samples) {
        chunk.copy_from_slice(&sample.to_ne_bytes());
    }
}
