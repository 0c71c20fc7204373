//! Short-time Fourier transform
//!
//! Frames start every `hop_size` samples at t·hop, t = 0..ceil(len/hop).
//! Each frame is `window_size` samples, zero-padded past the end of the
//! sequence, multiplied by a periodic analysis window, then transformed.

use super::fft::FftEngine;
use super::spectrogram::{Scale, Spectrogram};
use super::windowing::{apply_window_inplace, extract_frame};
use crate::error::{Result, SpectrumError};
use crate::filters::windows::{generate_periodic_window, WindowType};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// STFT configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StftConfig {
    /// Samples per frame (FFT size)
    pub window_size: usize,

    /// Samples between frame starts
    pub hop_size: usize,

    /// Analysis window applied to every frame
    pub window_type: WindowType,
}

impl Default for StftConfig {
    fn default() -> Self {
        Self {
            window_size: 2048,
            hop_size: 512,
            window_type: WindowType::Hann,
        }
    }
}

impl StftConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_size < 2 {
            return Err(SpectrumError::InvalidParameter {
                name: "window_size",
                value: self.window_size as f64,
                reason: "must be at least 2 samples",
            });
        }
        if self.hop_size == 0 {
            return Err(SpectrumError::InvalidParameter {
                name: "hop_size",
                value: 0.0,
                reason: "must be at least 1 sample",
            });
        }
        Ok(())
    }

    /// Frames produced for a sequence of `len` samples
    pub fn num_frames(&self, len: usize) -> usize {
        len.div_ceil(self.hop_size)
    }

    pub fn num_bins(&self) -> usize {
        self.window_size / 2 + 1
    }
}

/// Reusable STFT processor
pub struct Stft {
    config: StftConfig,
    engine: FftEngine,
    window: Vec<f64>,
    frame: Vec<f64>,
    bins: Vec<f64>,
}

impl Stft {
    pub fn new(config: StftConfig) -> Result<Self> {
        config.validate()?;

        let engine = FftEngine::new(config.window_size);
        Ok(Self {
            window: generate_periodic_window(config.window_type, config.window_size),
            frame: vec![0.0; config.window_size],
            bins: vec![0.0; engine.num_bins()],
            engine,
            config,
        })
    }

    /// Magnitude spectrogram of a sample sequence
    ///
    /// # Returns
    /// Grid of shape `(window_size/2 + 1, ceil(len/hop_size))`
    pub fn compute(&mut self, samples: &[f64]) -> Result<Spectrogram> {
        if samples.is_empty() {
            return Err(SpectrumError::EmptyInput { stage: "STFT" });
        }
        if samples.len() < self.config.window_size {
            log::warn!(
                "Only {} samples for a {}-sample STFT window; frames are zero-padded",
                samples.len(),
                self.config.window_size
            );
        }

        let num_frames = self.config.num_frames(samples.len());
        let mut values = Array2::<f64>::zeros((self.config.num_bins(), num_frames));

        for t in 0..num_frames {
            extract_frame(samples, t * self.config.hop_size, &mut self.frame);
            apply_window_inplace(&mut self.frame, &self.window);
            self.engine.magnitude_into(&self.frame, &mut self.bins)?;

            for (k, &m) in self.bins.iter().enumerate() {
                values[[k, t]] = m;
            }
        }

        log::debug!(
            "STFT: {} samples -> {} bins x {} frames",
            samples.len(),
            self.config.num_bins(),
            num_frames
        );

        Ok(Spectrogram {
            values,
            window_size: self.config.window_size,
            hop_size: self.config.hop_size,
            scale: Scale::Linear,
        })
    }

    pub fn config(&self) -> &StftConfig {
        &self.config
    }
}

/// STFT magnitude grid with a periodic Hann window
pub fn stft(samples: &[f64], window_size: usize, hop_size: usize) -> Result<Spectrogram> {
    let config = StftConfig {
        window_size,
        hop_size,
        window_type: WindowType::Hann,
    };
    Stft::new(config)?.compute(samples)
}
