//! Butterworth band-pass design
//!
//! Analog prototype → band-pass transform → bilinear transform with
//! pre-warped band edges → second-order sections. Sections are formed
//! directly from conjugate pole pairs, so no polynomial expansion of the
//! full transfer function is ever needed.

use super::iir::{Biquad, SosFilter};
use crate::error::{Result, SpectrumError};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Bilinear transform constant for frequencies normalized to Nyquist (2 * fs, fs = 2)
const BILINEAR_K: f64 = 4.0;

/// Band-pass filter specification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Lower cutoff in Hz
    pub low_cutoff: f64,

    /// Upper cutoff in Hz
    pub high_cutoff: f64,

    /// Sample rate in Hz
    pub sample_rate: f64,

    /// Butterworth order (number of second-order sections)
    pub order: usize,
}

impl FilterSpec {
    pub fn new(low_cutoff: f64, high_cutoff: f64, sample_rate: f64, order: usize) -> Self {
        Self {
            low_cutoff,
            high_cutoff,
            sample_rate,
            order,
        }
    }

    fn invalid(&self, reason: &'static str) -> SpectrumError {
        SpectrumError::InvalidFilterSpec {
            low_cutoff: self.low_cutoff,
            high_cutoff: self.high_cutoff,
            sample_rate: self.sample_rate,
            order: self.order,
            reason,
        }
    }

    pub fn nyquist(&self) -> f64 {
        self.sample_rate / 2.0
    }

    /// Validate and return cutoffs normalized to Nyquist
    ///
    /// # Returns
    /// `(low, high)` with `0 < low < high < 1`
    pub fn normalized(&self) -> Result<(f64, f64)> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(self.invalid("sample rate must be positive"));
        }
        if self.order == 0 {
            return Err(self.invalid("order must be at least 1"));
        }

        let low = self.low_cutoff / self.nyquist();
        let high = self.high_cutoff / self.nyquist();

        if !(low.is_finite() && high.is_finite()) {
            return Err(self.invalid("cutoffs must be finite"));
        }
        if low <= 0.0 {
            return Err(self.invalid("low cutoff must be above 0 Hz"));
        }
        if high >= 1.0 {
            return Err(self.invalid("high cutoff must be below Nyquist"));
        }
        if low >= high {
            return Err(self.invalid("low cutoff must be below high cutoff"));
        }

        Ok((low, high))
    }

    /// Check the spec without designing anything
    pub fn validate(&self) -> Result<()> {
        self.normalized().map(|_| ())
    }

    /// Frequency in Hz where the designed response peaks at unity gain
    ///
    /// Geometric mean of the pre-warped edges, mapped back through the
    /// bilinear transform.
    pub fn center_frequency(&self) -> Result<f64> {
        let (low, high) = self.normalized()?;
        let (w_low, w_high) = (prewarp(low), prewarp(high));
        let wo = (w_low * w_high).sqrt();
        let omega = 2.0 * (wo / BILINEAR_K).atan();
        Ok(omega * self.sample_rate / (2.0 * PI))
    }
}

/// Analog frequency for a Nyquist-normalized digital frequency
fn prewarp(normalized: f64) -> f64 {
    BILINEAR_K * (PI * normalized / 2.0).tan()
}

/// Map an analog pole to the z-plane
fn bilinear(s: Complex64) -> Complex64 {
    (BILINEAR_K + s) / (BILINEAR_K - s)
}

/// Analog low-pass prototype poles in the upper half plane, plus the real pole for odd orders
///
/// Butterworth poles sit on the left half of the unit circle:
/// s_k = exp(jπ(2k + n + 1) / 2n), k = 0..n-1
fn prototype_poles(order: usize) -> (Vec<Complex64>, Option<Complex64>) {
    let n = order;
    let mut upper = Vec::with_capacity(n / 2);
    let mut real = None;

    for k in 0..n {
        let angle = PI * (2 * k + n + 1) as f64 / (2 * n) as f64;
        let pole = Complex64::from_polar(1.0, angle);
        if pole.im.abs() < 1e-9 {
            real = Some(Complex64::new(pole.re, 0.0));
        } else if pole.im > 0.0 {
            upper.push(pole);
        }
    }

    (upper, real)
}

/// Low-pass → band-pass: each prototype pole becomes the two roots of
/// s² - p·bw·s + wo² = 0
fn bandpass_pair(pole: Complex64, wo: f64, bw: f64) -> (Complex64, Complex64) {
    let half = pole * (bw / 2.0);
    let root = (half * half - wo * wo).sqrt();
    (half + root, half - root)
}

/// Denominator of a section from two z-plane poles forming a real quadratic
fn section_denominator(p1: Complex64, p2: Complex64) -> [f64; 2] {
    [-(p1 + p2).re, (p1 * p2).re]
}

/// Design a Butterworth band-pass filter as second-order sections
///
/// # Algorithm
/// 1. Pre-warp the normalized band edges
/// 2. Place the order-n analog prototype poles
/// 3. Band-pass transform: every pole becomes a pair, n zeros land at s = 0
/// 4. Bilinear transform: zeros map to z = 1 and (from infinity) z = -1
/// 5. Group conjugate poles into n sections with numerator 1 - z^-2
/// 6. Spread the overall gain evenly across the sections
///
/// # Arguments
/// * `spec` - Cutoffs, sample rate and order
///
/// # Returns
/// Stable SOS cascade with unity gain at the band center
pub fn design_butterworth_bandpass(spec: &FilterSpec) -> Result<SosFilter> {
    let (low, high) = spec.normalized()?;
    let n = spec.order;

    let w_low = prewarp(low);
    let w_high = prewarp(high);
    let bw = w_high - w_low;
    let wo = (w_low * w_high).sqrt();

    let (upper, real) = prototype_poles(n);

    // Analog band-pass poles grouped per section
    let mut analog_pairs: Vec<(Complex64, Complex64)> = Vec::with_capacity(n);
    for pole in upper {
        let (q1, q2) = bandpass_pair(pole, wo, bw);
        analog_pairs.push((q1, q1.conj()));
        analog_pairs.push((q2, q2.conj()));
    }
    if let Some(pole) = real {
        analog_pairs.push(bandpass_pair(pole, wo, bw));
    }

    // Gain: k = bw^n · Π(K - z) / Π(K - p), with the n analog zeros at 0
    let mut gain = Complex64::new((bw * BILINEAR_K).powi(n as i32), 0.0);
    let mut denominators = Vec::with_capacity(n);
    for (q1, q2) in &analog_pairs {
        gain /= (BILINEAR_K - q1) * (BILINEAR_K - q2);
        denominators.push(section_denominator(bilinear(*q1), bilinear(*q2)));
    }

    let total_gain = gain.re;
    if !(total_gain.is_finite() && total_gain > 0.0) {
        return Err(SpectrumError::UnstableFilter {
            order: n,
            max_pole_radius: f64::NAN,
            reason: "degenerate filter gain",
        });
    }
    let section_gain = total_gain.powf(1.0 / n as f64);

    let sections = denominators
        .into_iter()
        .map(|a| Biquad::new([section_gain, 0.0, -section_gain], a))
        .collect();

    let filter = SosFilter::new(sections, n)?;

    log::debug!(
        "Designed order-{} Butterworth band-pass {:.3}-{:.3} Hz @ {} Hz (max pole radius {:.6})",
        n,
        spec.low_cutoff,
        spec.high_cutoff,
        spec.sample_rate,
        filter.max_pole_radius()
    );

    Ok(filter)
}

/// Magnitude response of a designed filter at frequencies in Hz
pub fn magnitude_response(filter: &SosFilter, frequencies_hz: &[f64], sample_rate: f64) -> Vec<f64> {
    let omegas: Vec<f64> = frequencies_hz
        .iter()
        .map(|&f| 2.0 * PI * f / sample_rate)
        .collect();

    filter
        .frequency_response(&omegas)
        .iter()
        .map(|h| h.norm())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eeg_spec() -> FilterSpec {
        FilterSpec::new(0.1, 45.0, 100.0, 5)
    }

    #[test]
    fn test_spec_rejects_band_edges() {
        let zero_low = FilterSpec::new(0.0, 45.0, 100.0, 5);
        let at_nyquist = FilterSpec::new(0.1, 50.0, 100.0, 5);
        let inverted = FilterSpec::new(30.0, 10.0, 100.0, 5);
        let no_order = FilterSpec::new(0.1, 45.0, 100.0, 0);

        for spec in [zero_low, at_nyquist, inverted, no_order] {
            assert!(matches!(
                design_butterworth_bandpass(&spec),
                Err(SpectrumError::InvalidFilterSpec { .. })
            ));
        }
    }

    #[test]
    fn test_invalid_spec_reports_values() {
        let err = FilterSpec::new(0.1, 50.0, 100.0, 5).validate().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("high=50"));
        assert!(message.contains("sample_rate=100"));
    }

    #[test]
    fn test_section_count_and_stability() {
        for order in 1..=8 {
            let filter = design_butterworth_bandpass(&FilterSpec::new(5.0, 20.0, 100.0, order)).unwrap();
            assert_eq!(filter.sections().len(), order);
            assert!(filter.max_pole_radius() < 1.0);
        }
    }

    #[test]
    fn test_unity_gain_at_center() {
        for spec in [eeg_spec(), FilterSpec::new(8.0, 12.0, 100.0, 4)] {
            let filter = design_butterworth_bandpass(&spec).unwrap();
            let center = spec.center_frequency().unwrap();
            let gain = magnitude_response(&filter, &[center], spec.sample_rate)[0];
            assert!((gain - 1.0).abs() < 1e-9, "center gain {}", gain);
        }
    }

    #[test]
    fn test_half_power_at_edges() {
        let spec = FilterSpec::new(8.0, 12.0, 100.0, 4);
        let filter = design_butterworth_bandpass(&spec).unwrap();
        let gains = magnitude_response(&filter, &[8.0, 12.0], spec.sample_rate);

        for g in gains {
            assert!((g - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-9, "edge gain {}", g);
        }
    }

    #[test]
    fn test_stopband_rejection() {
        let spec = FilterSpec::new(8.0, 12.0, 100.0, 4);
        let filter = design_butterworth_bandpass(&spec).unwrap();
        let gains = magnitude_response(&filter, &[0.0, 1.0, 30.0, 50.0], spec.sample_rate);

        assert!(gains[0] < 1e-9);
        assert!(gains[1] < 1e-3);
        assert!(gains[2] < 1e-3);
        assert!(gains[3] < 1e-9);
    }
}
