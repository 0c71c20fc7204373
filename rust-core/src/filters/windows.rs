//! Window functions for short-time spectral analysis
//!
//! All supported windows are cosine sums
//! w[n] = a0 - a1·cos(2πn/D) + a2·cos(4πn/D),
//! with D = M-1 for the symmetric form and D = M for the periodic form.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowType {
    /// Zero at both ends, ~31 dB sidelobes
    #[default]
    Hann,

    /// ~43 dB sidelobes, endpoints at 0.08
    Hamming,

    /// ~58 dB sidelobes, widest mainlobe
    Blackman,

    /// Frame passed through unchanged
    Rectangular,
}

impl WindowType {
    /// Cosine-sum coefficients `[a0, a1, a2]`
    fn coefficients(self) -> [f64; 3] {
        match self {
            WindowType::Hann => [0.5, 0.5, 0.0],
            WindowType::Hamming => [0.54, 0.46, 0.0],
            WindowType::Blackman => [0.42, 0.5, 0.08],
            WindowType::Rectangular => [1.0, 0.0, 0.0],
        }
    }
}

fn cosine_sum(window_type: WindowType, length: usize, denominator: f64) -> Vec<f64> {
    let [a0, a1, a2] = window_type.coefficients();
    (0..length)
        .map(|n| {
            let phase = 2.0 * PI * n as f64 / denominator;
            a0 - a1 * phase.cos() + a2 * (2.0 * phase).cos()
        })
        .collect()
}

/// Symmetric window of `length` samples, w[n] = w[M-1-n]
pub fn generate_window(window_type: WindowType, length: usize) -> Vec<f64> {
    match length {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => cosine_sum(window_type, length, (length - 1) as f64),
    }
}

/// Periodic (DFT-even) window of `length` samples
///
/// The symmetric window of length M+1 without its last point; STFT frames
/// use this form.
pub fn generate_periodic_window(window_type: WindowType, length: usize) -> Vec<f64> {
    let mut window = generate_window(window_type, length + 1);
    window.truncate(length);
    window
}
