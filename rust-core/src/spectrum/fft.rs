//! FFT engines
//!
//! `FftEngine` uses realfft for fixed-size real frames (STFT).
//! `FullFftEngine` uses rustfft for one transform over an entire sample
//! sequence of arbitrary length.

use crate::error::Result;
use realfft::{RealFftPlanner, RealToComplex};
use rustfft::{num_complex::Complex, FftPlanner};
use std::sync::Arc;

/// FFT engine for fixed-size real-valued frames
pub struct FftEngine {
    /// FFT size (number of samples)
    fft_size: usize,

    /// Real FFT processor
    r2c: Arc<dyn RealToComplex<f64>>,

    /// Reusable input buffer
    input_buffer: Vec<f64>,

    /// Reusable output buffer (complex spectrum)
    output_buffer: Vec<Complex<f64>>,

    /// Reusable scratch buffer
    scratch: Vec<Complex<f64>>,
}

impl FftEngine {
    /// Create new FFT engine
    ///
    /// # Arguments
    /// * `fft_size` - FFT size (number of samples)
    pub fn new(fft_size: usize) -> Self {
        let mut planner = RealFftPlanner::<f64>::new();
        let r2c = planner.plan_fft_forward(fft_size);

        let input_buffer = r2c.make_input_vec();
        let output_buffer = r2c.make_output_vec();
        let scratch = r2c.make_scratch_vec();

        Self {
            fft_size,
            r2c,
            input_buffer,
            output_buffer,
            scratch,
        }
    }

    /// Compute FFT and write the magnitude spectrum into `out`
    ///
    /// # Arguments
    /// * `frame` - Input frame (zero-padded if shorter than fft_size)
    /// * `out` - Destination, `num_bins()` long
    pub fn magnitude_into(&mut self, frame: &[f64], out: &mut [f64]) -> Result<()> {
        let copy_len = frame.len().min(self.fft_size);
        self.input_buffer[..copy_len].copy_from_slice(&frame[..copy_len]);
        self.input_buffer[copy_len..].fill(0.0);

        self.r2c.process_with_scratch(
            &mut self.input_buffer,
            &mut self.output_buffer,
            &mut self.scratch,
        )?;

        for (dst, c) in out.iter_mut().zip(self.output_buffer.iter()) {
            *dst = c.norm();
        }

        Ok(())
    }

    /// Get number of frequency bins (fft_size/2 + 1 for real FFT)
    pub fn num_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }
}

/// Complex FFT over a whole sequence, reusing plans across lengths
pub struct FullFftEngine {
    planner: FftPlanner<f64>,
}

impl Default for FullFftEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FullFftEngine {
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
        }
    }

    /// Magnitude of every DFT bin of `signal` (no window, no padding)
    ///
    /// # Returns
    /// |X[k]| for k = 0..signal.len()
    pub fn magnitude(&mut self, signal: &[f64]) -> Vec<f64> {
        if signal.is_empty() {
            return Vec::new();
        }

        let fft = self.planner.plan_fft_forward(signal.len());
        let mut buffer: Vec<Complex<f64>> =
            signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
        fft.process(&mut buffer);

        buffer.iter().map(|c| c.norm()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_fft_dc_signal() {
        let mut fft = FftEngine::new(1024);

        // DC signal (constant), zero-padded
        let signal = vec![1.0; 100];
        let mut spectrum = vec![0.0; fft.num_bins()];
        fft.magnitude_into(&signal, &mut spectrum).unwrap();

        assert_eq!(spectrum.len(), 513);
        assert!((spectrum[0] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_fft_sine_wave() {
        let mut fft = FftEngine::new(1024);

        // Sine exactly on bin 64
        let signal: Vec<f64> = (0..1024)
            .map(|n| (2.0 * PI * 64.0 * n as f64 / 1024.0).sin())
            .collect();

        let mut spectrum = vec![0.0; fft.num_bins()];
        fft.magnitude_into(&signal, &mut spectrum).unwrap();

        let (peak_bin, &peak_mag) = spectrum
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .unwrap();

        assert_eq!(peak_bin, 64);
        // N/2 for a unit sine on a bin
        assert!((peak_mag - 512.0).abs() < 1e-6);
    }

    #[test]
    fn test_full_fft_odd_length() {
        let mut engine = FullFftEngine::new();
        let magnitude = engine.magnitude(&[1.0, 1.0, 1.0, 1.0, 1.0]);

        assert_eq!(magnitude.len(), 5);
        assert!((magnitude[0] - 5.0).abs() < 1e-12);
        assert!(magnitude[1..].iter().all(|&m| m < 1e-12));
    }

    #[test]
    fn test_full_fft_empty() {
        let mut engine = FullFftEngine::new();
        assert!(engine.magnitude(&[]).is_empty());
    }
}
