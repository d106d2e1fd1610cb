//! Neurofilt core: the numeric side of the neural filtering pipeline
//!
//! Filtering, sample codec, deadline accounting and analysis over frames of
//! samples, plus the run configuration. Frame stream plumbing lives in the
//! `neurofilt-infra` crate.

pub mod domain;
