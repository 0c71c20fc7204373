//! Error taxonomy for the analysis stages
//!
//! Decode problems are recovered locally and reported as [`DecodeSkip`]
//! records. Everything else aborts only the stage that raised it.

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpectrumError {
    #[error("Invalid band-pass spec: {reason} (low={low_cutoff} Hz, high={high_cutoff} Hz, sample_rate={sample_rate} Hz, order={order})")]
    InvalidFilterSpec {
        low_cutoff: f64,
        high_cutoff: f64,
        sample_rate: f64,
        order: usize,
        reason: &'static str,
    },

    #[error("Unstable filter (order={order}, max pole radius={max_pole_radius}): {reason}")]
    UnstableFilter {
        order: usize,
        max_pole_radius: f64,
        reason: &'static str,
    },

    #[error("Insufficient samples for {stage}: need at least {required}, got {actual}")]
    InsufficientSamples {
        stage: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("No samples reached {stage}; check the capture and decoder output")]
    EmptyInput { stage: &'static str },

    #[error("Invalid parameter {name}={value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("FFT processing failed: {0}")]
    Transform(String),
}

impl From<realfft::FftError> for SpectrumError {
    fn from(err: realfft::FftError) -> Self {
        SpectrumError::Transform(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SpectrumError>;

/// Why a capture line was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Line had the wrong number of whitespace-separated tokens
    TokenCount { expected: usize, found: usize },

    /// A token did not parse as a number
    NotNumeric,

    /// Parsed, but NaN or infinite
    NonFinite,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::TokenCount { expected, found } => {
                write!(f, "expected {} token(s), found {}", expected, found)
            }
            SkipReason::NotNumeric => write!(f, "not a number"),
            SkipReason::NonFinite => write!(f, "non-finite value"),
        }
    }
}

/// A single malformed capture line that was skipped during decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeSkip {
    /// 1-based line number in the capture
    pub line_number: usize,

    /// Raw line content
    pub line: String,

    pub reason: SkipReason,
}

impl fmt::Display for DecodeSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} ({:?})", self.line_number, self.reason, self.line)
    }
}
