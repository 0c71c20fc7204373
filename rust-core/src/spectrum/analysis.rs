//! Full-signal spectral analyzer
//!
//! One unwindowed DFT over the entire sample sequence, reduced to the
//! single-sided half

use super::fft::FullFftEngine;
use crate::error::{Result, SpectrumError};

/// Single-sided magnitude spectrum as parallel frequency/magnitude arrays
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MagnitudeSpectrum {
    /// Frequency axis in Hz
    pub frequencies: Vec<f64>,

    /// |X[k]| at each frequency
    pub magnitudes: Vec<f64>,
}

impl MagnitudeSpectrum {
    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    /// `(frequency, magnitude)` pairs in ascending frequency order
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.frequencies
            .iter()
            .copied()
            .zip(self.magnitudes.iter().copied())
    }

    /// Strongest bin, optionally ignoring DC
    pub fn peak(&self, skip_dc: bool) -> Option<(f64, f64)> {
        let start = usize::from(skip_dc);
        self.iter()
            .skip(start)
            .fold(None, |best: Option<(f64, f64)>, (f, m)| match best {
                Some((_, best_m)) if best_m >= m => best,
                _ => Some((f, m)),
            })
    }
}

/// Linear axis from 0 to `sample_rate` inclusive with `n` points
fn frequency_axis(n: usize, sample_rate: f64) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let step = sample_rate / (n - 1) as f64;
            (0..n).map(|i| i as f64 * step).collect()
        }
    }
}

/// Full-signal spectrum analyzer
///
/// Keeps an FFT planner so repeated analyses of equal-length captures
/// reuse the same plan.
pub struct SpectrumAnalyzer {
    sample_rate: f64,
    engine: FullFftEngine,
}

impl SpectrumAnalyzer {
    /// Create new spectrum analyzer
    ///
    /// # Arguments
    /// * `sample_rate` - Fixed capture rate in Hz
    pub fn new(sample_rate: f64) -> Result<Self> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(SpectrumError::InvalidParameter {
                name: "sample_rate",
                value: sample_rate,
                reason: "must be a positive number of Hz",
            });
        }

        Ok(Self {
            sample_rate,
            engine: FullFftEngine::new(),
        })
    }

    /// Analyze a sample sequence
    ///
    /// # Arguments
    /// * `samples` - Entire sample sequence (not windowed, not padded)
    ///
    /// # Returns
    /// The first `samples.len() / 2` bins; for odd lengths the bin at the
    /// midpoint is dropped. Empty and single-sample input give an empty
    /// spectrum.
    pub fn analyze(&mut self, samples: &[f64]) -> MagnitudeSpectrum {
        let n = samples.len();
        let half = n / 2;

        let mut magnitudes = self.engine.magnitude(samples);
        magnitudes.truncate(half);

        let mut frequencies = frequency_axis(n, self.sample_rate);
        frequencies.truncate(half);

        log::debug!("Spectrum of {} samples: {} single-sided bins", n, half);

        MagnitudeSpectrum {
            frequencies,
            magnitudes,
        }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }
}

/// Analyze `samples` captured at `sample_rate`
pub fn analyze(samples: &[f64], sample_rate: f64) -> Result<MagnitudeSpectrum> {
    Ok(SpectrumAnalyzer::new(sample_rate)?.analyze(samples))
}
