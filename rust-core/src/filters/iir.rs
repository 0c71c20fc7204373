//! IIR filtering with cascaded second-order sections
//!
//! Each section runs in transposed direct form II. Zero-phase filtering
//! runs the cascade forward, then backward over an odd-extended copy of the
//! signal, starting both passes from steady-state initial conditions so the
//! edges do not ring.

use crate::error::{Result, SpectrumError};
use num_complex::Complex64;

/// One second-order section, normalized so a0 = 1
///
/// H(z) = (b0 + b1 z^-1 + b2 z^-2) / (1 + a1 z^-1 + a2 z^-2)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biquad {
    pub b: [f64; 3],
    pub a: [f64; 2],
}

impl Biquad {
    pub fn new(b: [f64; 3], a: [f64; 2]) -> Self {
        Self { b, a }
    }

    /// Process one sample, updating the two-element delay state
    #[inline]
    pub fn process_sample(&self, x: f64, state: &mut [f64; 2]) -> f64 {
        let y = self.b[0] * x + state[0];
        state[0] = self.b[1] * x - self.a[0] * y + state[1];
        state[1] = self.b[2] * x - self.a[1] * y;
        y
    }

    /// Gain at DC (z = 1)
    pub fn dc_gain(&self) -> f64 {
        (self.b[0] + self.b[1] + self.b[2]) / (1.0 + self.a[0] + self.a[1])
    }

    /// Delay state for a unit step that has settled
    pub fn step_state(&self) -> [f64; 2] {
        let [b0, b1, b2] = self.b;
        let [a1, a2] = self.a;
        let z0 = (b1 - a1 * b0 + b2 - a2 * b0) / (1.0 + a1 + a2);
        let z1 = (1.0 + a1) * z0 - (b1 - a1 * b0);
        [z0, z1]
    }

    /// Roots of z^2 + a1 z + a2
    pub fn poles(&self) -> [Complex64; 2] {
        let [a1, a2] = self.a;
        let disc = Complex64::new(a1 * a1 - 4.0 * a2, 0.0).sqrt();
        [(-a1 + disc) / 2.0, (-a1 - disc) / 2.0]
    }

    /// Frequency response at normalized angular frequency `omega` (rad/sample)
    pub fn response(&self, omega: f64) -> Complex64 {
        let z1 = Complex64::from_polar(1.0, -omega);
        let z2 = z1 * z1;
        let num = self.b[0] + self.b[1] * z1 + self.b[2] * z2;
        let den = 1.0 + self.a[0] * z1 + self.a[1] * z2;
        num / den
    }

    fn is_finite(&self) -> bool {
        self.b.iter().chain(self.a.iter()).all(|c| c.is_finite())
    }
}

/// Cascade of second-order sections
#[derive(Debug, Clone, PartialEq)]
pub struct SosFilter {
    sections: Vec<Biquad>,
    order: usize,
}

impl SosFilter {
    /// Wrap designed sections, rejecting unstable or non-finite cascades
    ///
    /// # Arguments
    /// * `sections` - Second-order sections, applied in order
    /// * `order` - Design order, carried for diagnostics
    pub fn new(sections: Vec<Biquad>, order: usize) -> Result<Self> {
        if sections.iter().any(|s| !s.is_finite()) {
            return Err(SpectrumError::UnstableFilter {
                order,
                max_pole_radius: f64::NAN,
                reason: "non-finite section coefficients",
            });
        }

        let max_pole_radius = sections
            .iter()
            .flat_map(|s| s.poles())
            .map(|p| p.norm())
            .fold(0.0, f64::max);

        if max_pole_radius >= 1.0 {
            return Err(SpectrumError::UnstableFilter {
                order,
                max_pole_radius,
                reason: "pole on or outside the unit circle",
            });
        }

        Ok(Self { sections, order })
    }

    pub fn sections(&self) -> &[Biquad] {
        &self.sections
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Largest pole modulus across all sections
    pub fn max_pole_radius(&self) -> f64 {
        self.sections
            .iter()
            .flat_map(|s| s.poles())
            .map(|p| p.norm())
            .fold(0.0, f64::max)
    }

    /// Run the cascade once, left to right
    ///
    /// # Arguments
    /// * `signal` - Input samples
    /// * `initial` - Optional per-section delay state (one entry per section)
    ///
    /// # Returns
    /// Filtered output samples (same length as input)
    pub fn process(&self, signal: &[f64], initial: Option<&[[f64; 2]]>) -> Vec<f64> {
        let mut states: Vec<[f64; 2]> = match initial {
            Some(zi) => zi.to_vec(),
            None => vec![[0.0; 2]; self.sections.len()],
        };

        signal
            .iter()
            .map(|&x| {
                self.sections
                    .iter()
                    .zip(states.iter_mut())
                    .fold(x, |acc, (section, state)| section.process_sample(acc, state))
            })
            .collect()
    }

    /// Steady-state initial conditions for a unit step through the cascade
    ///
    /// Each section's step state is scaled by the DC gain of the sections
    /// in front of it.
    pub fn initial_conditions(&self) -> Vec<[f64; 2]> {
        let mut scale = 1.0;
        self.sections
            .iter()
            .map(|section| {
                let [z0, z1] = section.step_state();
                let zi = [scale * z0, scale * z1];
                scale *= section.dc_gain();
                zi
            })
            .collect()
    }

    /// Number of samples reflected at each edge for zero-phase filtering
    pub fn pad_len(&self) -> usize {
        let n = self.sections.len();
        let trailing_b = self.sections.iter().filter(|s| s.b[2] == 0.0).count();
        let trailing_a = self.sections.iter().filter(|s| s.a[1] == 0.0).count();
        let ntaps = 2 * n + 1 - trailing_b.min(trailing_a);
        3 * ntaps
    }

    /// Shortest input `filtfilt` accepts
    pub fn min_input_len(&self) -> usize {
        self.pad_len() + 1
    }

    /// Zero-phase forward-backward filtering
    ///
    /// Output is time-aligned with the input and has the squared magnitude
    /// response of the cascade. The first and last few dozen samples carry
    /// an edge transient when the input has content near the band edges or
    /// Nyquist; it can exceed the input's own peak there.
    ///
    /// # Arguments
    /// * `signal` - Input samples, longer than [`SosFilter::pad_len`]
    ///
    /// # Returns
    /// Filtered samples (same length as input)
    pub fn filtfilt(&self, signal: &[f64]) -> Result<Vec<f64>> {
        let n = signal.len();
        let pad = self.pad_len();

        if n == 0 {
            return Err(SpectrumError::EmptyInput { stage: "band-pass filter" });
        }
        if n <= pad {
            return Err(SpectrumError::InsufficientSamples {
                stage: "band-pass filter",
                required: pad + 1,
                actual: n,
            });
        }

        let extended = odd_extend(signal, pad);
        let zi = self.initial_conditions();

        let scaled = |x0: f64| -> Vec<[f64; 2]> {
            zi.iter().map(|z| [z[0] * x0, z[1] * x0]).collect()
        };

        let mut forward = self.process(&extended, Some(&scaled(extended[0])));
        forward.reverse();
        let mut backward = self.process(&forward, Some(&scaled(forward[0])));
        backward.reverse();

        let output = backward[pad..pad + n].to_vec();

        if output.iter().any(|y| !y.is_finite()) {
            return Err(SpectrumError::UnstableFilter {
                order: self.order,
                max_pole_radius: self.max_pole_radius(),
                reason: "non-finite filter output",
            });
        }

        Ok(output)
    }

    /// Frequency response of the cascade at normalized angular frequencies
    ///
    /// # Arguments
    /// * `omegas` - Frequencies in rad/sample (0 to π)
    pub fn frequency_response(&self, omegas: &[f64]) -> Vec<Complex64> {
        omegas
            .iter()
            .map(|&w| {
                self.sections
                    .iter()
                    .fold(Complex64::new(1.0, 0.0), |acc, s| acc * s.response(w))
            })
            .collect()
    }
}

/// Odd extension: point-reflect `pad` samples about each endpoint
///
/// Requires `signal.len() > pad`.
fn odd_extend(signal: &[f64], pad: usize) -> Vec<f64> {
    let n = signal.len();
    let first = signal[0];
    let last = signal[n - 1];

    let mut extended = Vec::with_capacity(n + 2 * pad);
    extended.extend((1..=pad).rev().map(|i| 2.0 * first - signal[i]));
    extended.extend_from_slice(signal);
    extended.extend((1..=pad).map(|i| 2.0 * last - signal[n - 1 - i]));
    extended
}
