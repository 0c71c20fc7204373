//! Spectral analysis with FFT

pub mod fft;
pub mod windowing;
pub mod analysis;
pub mod spectrogram;
pub mod stft;

pub use fft::{FftEngine, FullFftEngine};
pub use analysis::{analyze, MagnitudeSpectrum, SpectrumAnalyzer};
pub use spectrogram::{to_decibel, to_decibel_with, DecibelScale, Scale, Spectrogram, DEFAULT_DB_FLOOR};
pub use stft::{stft, Stft, StftConfig};
