//! Band-pass filtering and window functions

pub mod windows;
pub mod design;
pub mod iir;

pub use windows::{WindowType, generate_window, generate_periodic_window};
pub use design::{FilterSpec, design_butterworth_bandpass, magnitude_response};
pub use iir::{Biquad, SosFilter};

use crate::error::{Result, SpectrumError};

/// Zero-phase Butterworth band-pass filter
///
/// Designed once from a [`FilterSpec`], then applied to any number of
/// sample sequences. Output is time-aligned with the input.
#[derive(Debug, Clone)]
pub struct BandpassFilter {
    spec: FilterSpec,
    sos: SosFilter,
}

impl BandpassFilter {
    /// Validate the spec and design the filter
    pub fn new(spec: FilterSpec) -> Result<Self> {
        let sos = design_butterworth_bandpass(&spec)?;
        Ok(Self { spec, sos })
    }

    /// Filter a sample sequence
    ///
    /// # Arguments
    /// * `samples` - Input samples, at least [`BandpassFilter::min_input_len`] long
    ///
    /// # Returns
    /// Filtered samples (same length as input)
    pub fn apply(&self, samples: &[f64]) -> Result<Vec<f64>> {
        let filtered = self.sos.filtfilt(samples)?;
        log::debug!(
            "Band-pass {:.3}-{:.3} Hz applied to {} samples",
            self.spec.low_cutoff,
            self.spec.high_cutoff,
            samples.len()
        );
        Ok(filtered)
    }

    pub fn spec(&self) -> &FilterSpec {
        &self.spec
    }

    pub fn sos(&self) -> &SosFilter {
        &self.sos
    }

    /// Shortest sequence the zero-phase method accepts for this order
    pub fn min_input_len(&self) -> usize {
        self.sos.min_input_len()
    }
}

/// One-shot band-pass: validate, design and filter
///
/// The spec is checked before the input is looked at, so a bad spec is
/// reported as such even for empty input.
pub fn bandpass_filter(
    samples: &[f64],
    low_cutoff: f64,
    high_cutoff: f64,
    sample_rate: f64,
    order: usize,
) -> Result<Vec<f64>> {
    let spec = FilterSpec::new(low_cutoff, high_cutoff, sample_rate, order);
    spec.validate()?;

    if samples.is_empty() {
        return Err(SpectrumError::EmptyInput { stage: "band-pass filter" });
    }

    BandpassFilter::new(spec)?.apply(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn tone(freq: f64, sample_rate: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|n| (2.0 * PI * freq * n as f64 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_length_preserved() {
        let signal = tone(10.0, 100.0, 1000);
        for len in [34, 100, 999, 1000] {
            let out = bandpass_filter(&signal[..len], 0.1, 45.0, 100.0, 5).unwrap();
            assert_eq!(out.len(), len);
        }
    }

    #[test]
    fn test_minimum_length_for_order() {
        let filter = BandpassFilter::new(FilterSpec::new(0.1, 45.0, 100.0, 5)).unwrap();
        // 3 * (2 * 5 + 1) samples of padding on each edge
        assert_eq!(filter.min_input_len(), 34);

        let err = filter.apply(&[0.0; 33]).unwrap_err();
        assert_eq!(
            err,
            SpectrumError::InsufficientSamples {
                stage: "band-pass filter",
                required: 34,
                actual: 33,
            }
        );
    }

    #[test]
    fn test_invalid_spec_checked_before_input() {
        let err = bandpass_filter(&[], 0.0, 45.0, 100.0, 5).unwrap_err();
        assert!(matches!(err, SpectrumError::InvalidFilterSpec { .. }));

        let err = bandpass_filter(&[1.0; 100], 0.1, 50.0, 100.0, 5).unwrap_err();
        assert!(matches!(err, SpectrumError::InvalidFilterSpec { .. }));

        let err = bandpass_filter(&[], 0.1, 45.0, 100.0, 5).unwrap_err();
        assert!(matches!(err, SpectrumError::EmptyInput { .. }));
    }

    #[test]
    fn test_passes_band_rejects_out_of_band() {
        let sample_rate = 100.0;
        let len = 2000;
        let in_band = tone(10.0, sample_rate, len);
        let out_band = tone(40.0, sample_rate, len);
        let mixed: Vec<f64> = in_band.iter().zip(&out_band).map(|(a, b)| a + b).collect();

        let out = bandpass_filter(&mixed, 8.0, 12.0, sample_rate, 4).unwrap();

        // Away from the edges, output tracks the in-band tone without delay
        let max_err = out[200..1800]
            .iter()
            .zip(&in_band[200..1800])
            .map(|(y, x)| (y - x).abs())
            .fold(0.0, f64::max);
        assert!(max_err < 0.01, "max error {}", max_err);
    }

    #[test]
    fn test_no_amplification() {
        // 2.5 V offset, two in-band tones and a little wideband jitter
        let sample_rate = 100.0;
        let signal: Vec<f64> = (0..1000)
            .map(|n| {
                let t = n as f64 / sample_rate;
                let jitter = ((n * 7919) % 200) as f64 / 100.0 - 1.0;
                2.5 + (2.0 * PI * 8.0 * t).sin() + 0.2 * (2.0 * PI * 31.0 * t).sin() + 0.05 * jitter
            })
            .collect();
        let out = bandpass_filter(&signal, 0.1, 45.0, sample_rate, 5).unwrap();

        let peak_in = signal.iter().fold(0.0_f64, |m, x| m.max(x.abs()));
        let peak_out = out.iter().fold(0.0_f64, |m, x| m.max(x.abs()));
        assert!(out.iter().all(|y| y.is_finite()));
        assert!(peak_out <= peak_in, "peak out {} > peak in {}", peak_out, peak_in);

        // Offset removed, tones kept at their own level
        let interior = out[100..900].iter().fold(0.0_f64, |m, x| m.max(x.abs()));
        assert!(interior < 1.4, "interior peak {}", interior);
    }

    #[test]
    fn test_deterministic() {
        let signal = tone(3.0, 100.0, 300);
        let a = bandpass_filter(&signal, 1.0, 10.0, 100.0, 3).unwrap();
        let b = bandpass_filter(&signal, 1.0, 10.0, 100.0, 3).unwrap();
        assert_eq!(a, b);
    }
}
