//! Serial Spectrum - voltage capture and spectral analysis
//!
//! Captures newline-delimited readings from a serial device, decodes them
//! into samples and computes a full-signal magnitude spectrum plus a
//! linear and decibel STFT spectrogram, optionally after a zero-phase
//! Butterworth band-pass.

// Suppress PyO3 non-local impl warnings (harmless macro-generated code)
#![cfg_attr(feature = "python", allow(non_local_definitions))]

pub mod capture;
pub mod config;
pub mod error;
pub mod export;
pub mod filters;
pub mod pipeline;
pub mod spectrum;

#[cfg(feature = "python")]
pub mod python_bindings;

pub use capture::{decode_lines, ChannelMode, DecodedCapture};
pub use config::Config;
pub use error::{DecodeSkip, SkipReason, SpectrumError};
pub use filters::{bandpass_filter, BandpassFilter, FilterSpec, WindowType};
pub use pipeline::{AnalysisReport, Pipeline};
pub use spectrum::{analyze, stft, to_decibel, MagnitudeSpectrum, Spectrogram, SpectrumAnalyzer};
