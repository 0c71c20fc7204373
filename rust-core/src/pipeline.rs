//! Batch analysis pipeline
//!
//! samples → (optional) band-pass → full spectrum + STFT (linear, dB)
//!
//! The filter stage is a flag, not a second code path. Both transforms
//! always see the same sequence: filtered when the stage is enabled, raw
//! otherwise.

use crate::capture::DecodedCapture;
use crate::config::AnalysisConfig;
use crate::error::{Result, SpectrumError};
use crate::filters::BandpassFilter;
use crate::spectrum::{MagnitudeSpectrum, Spectrogram, SpectrumAnalyzer, Stft};

/// Everything one run hands to the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    /// Length of the analyzed sequence
    pub samples_analyzed: usize,

    /// Band-pass stage was applied
    pub filtered: bool,

    pub sample_rate: f64,

    /// Single-sided full-signal magnitude spectrum
    pub spectrum: MagnitudeSpectrum,

    /// Linear STFT magnitudes
    pub spectrogram: Spectrogram,

    /// Same grid in decibels
    pub spectrogram_db: Spectrogram,
}

/// Configured analysis pipeline
///
/// The band-pass filter is designed once at construction; runs are pure
/// functions of the input samples.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: AnalysisConfig,
    filter: Option<BandpassFilter>,
}

impl Pipeline {
    /// Validate the configuration and design the filter if enabled
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;

        let filter = if config.filter.enabled {
            Some(BandpassFilter::new(config.filter.spec(config.sample_rate))?)
        } else {
            None
        };

        Ok(Self { config, filter })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn filter(&self) -> Option<&BandpassFilter> {
        self.filter.as_ref()
    }

    /// Run the optional filter stage
    ///
    /// # Returns
    /// The filtered sequence, or a copy of the input when filtering is off
    pub fn prepare(&self, samples: &[f64]) -> Result<Vec<f64>> {
        if samples.is_empty() {
            return Err(SpectrumError::EmptyInput { stage: "analysis" });
        }

        match &self.filter {
            Some(filter) => filter.apply(samples),
            None => Ok(samples.to_vec()),
        }
    }

    /// Analyze a sample sequence
    pub fn run(&self, samples: &[f64]) -> Result<AnalysisReport> {
        let signal = self.prepare(samples)?;

        let spectrum = SpectrumAnalyzer::new(self.config.sample_rate)?.analyze(&signal);
        let spectrogram = Stft::new(self.config.stft)?.compute(&signal)?;
        let spectrogram_db = spectrogram.to_decibel(&self.config.decibel)?;

        log::info!(
            "Analyzed {} samples ({}): {} spectrum bins, {}x{} spectrogram",
            signal.len(),
            if self.filter.is_some() { "band-pass filtered" } else { "unfiltered" },
            spectrum.len(),
            spectrogram.num_bins(),
            spectrogram.num_frames()
        );

        Ok(AnalysisReport {
            samples_analyzed: signal.len(),
            filtered: self.filter.is_some(),
            sample_rate: self.config.sample_rate,
            spectrum,
            spectrogram,
            spectrogram_db,
        })
    }

    /// Analyze a decoded capture
    pub fn run_capture(&self, capture: &DecodedCapture) -> Result<AnalysisReport> {
        if !capture.skipped.is_empty() {
            log::warn!(
                "{} of {} capture lines were skipped during decoding",
                capture.skipped.len(),
                capture.lines_seen()
            );
        }
        self.run(&capture.samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterConfig;
    use crate::filters::bandpass_filter;
    use crate::spectrum::{analyze, stft, StftConfig};
    use std::f64::consts::PI;

    fn small_config(filter_enabled: bool) -> AnalysisConfig {
        AnalysisConfig {
            sample_rate: 100.0,
            filter: FilterConfig {
                enabled: filter_enabled,
                low_cutoff: 5.0,
                high_cutoff: 15.0,
                order: 3,
            },
            stft: StftConfig {
                window_size: 64,
                hop_size: 32,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn capture_signal() -> Vec<f64> {
        (0..400)
            .map(|n| {
                let t = n as f64 / 100.0;
                (2.0 * PI * 10.0 * t).sin() + 0.5 * (2.0 * PI * 40.0 * t).sin() + 0.3
            })
            .collect()
    }

    #[test]
    fn test_unfiltered_matches_direct_transforms() {
        let samples = capture_signal();
        let report = Pipeline::new(small_config(false)).unwrap().run(&samples).unwrap();

        assert!(!report.filtered);
        assert_eq!(report.spectrum, analyze(&samples, 100.0).unwrap());
        assert_eq!(report.spectrogram.values, stft(&samples, 64, 32).unwrap().values);
    }

    #[test]
    fn test_filtered_feeds_both_transforms() {
        let samples = capture_signal();
        let report = Pipeline::new(small_config(true)).unwrap().run(&samples).unwrap();
        let filtered = bandpass_filter(&samples, 5.0, 15.0, 100.0, 3).unwrap();

        assert!(report.filtered);
        assert_eq!(report.samples_analyzed, samples.len());
        assert_eq!(report.spectrum, analyze(&filtered, 100.0).unwrap());
        assert_eq!(report.spectrogram.values, stft(&filtered, 64, 32).unwrap().values);
    }

    #[test]
    fn test_decibel_grid_matches_linear() {
        let report = Pipeline::new(small_config(true)).unwrap().run(&capture_signal()).unwrap();

        assert_eq!(report.spectrogram_db.values.shape(), report.spectrogram.values.shape());
        for (db, m) in report.spectrogram_db.values.iter().zip(report.spectrogram.values.iter()) {
            assert_eq!(*db, 20.0 * m.max(1e-5).log10());
        }
    }

    #[test]
    fn test_idempotent_runs() {
        let pipeline = Pipeline::new(small_config(true)).unwrap();
        let samples = capture_signal();
        assert_eq!(pipeline.run(&samples).unwrap(), pipeline.run(&samples).unwrap());
    }

    #[test]
    fn test_empty_input_reported() {
        let pipeline = Pipeline::new(small_config(true)).unwrap();
        assert_eq!(
            pipeline.run(&[]).unwrap_err(),
            SpectrumError::EmptyInput { stage: "analysis" }
        );
    }

    #[test]
    fn test_short_input_fails_filter_stage_only() {
        let short = vec![1.0; 10];

        let filtered = Pipeline::new(small_config(true)).unwrap();
        assert!(matches!(
            filtered.run(&short),
            Err(SpectrumError::InsufficientSamples { required: 22, actual: 10, .. })
        ));

        let unfiltered = Pipeline::new(small_config(false)).unwrap();
        assert!(unfiltered.run(&short).is_ok());
    }

    #[test]
    fn test_invalid_filter_rejected_at_construction() {
        let mut config = small_config(true);
        config.filter.high_cutoff = 60.0;
        assert!(matches!(
            Pipeline::new(config),
            Err(SpectrumError::InvalidFilterSpec { .. })
        ));
    }
}
