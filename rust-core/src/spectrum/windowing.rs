//! Frame extraction and windowing for short-time analysis
//!
//! Applies windows to time-domain frames before FFT to reduce spectral leakage

/// Copy `frame_len` samples starting at `start` into `frame`, zero-padding
/// past the end of the signal
///
/// # Arguments
/// * `signal` - Full sample sequence
/// * `start` - First sample index of the frame
/// * `frame` - Destination buffer; its length is the frame length
pub fn extract_frame(signal: &[f64], start: usize, frame: &mut [f64]) {
    let available = signal.len().saturating_sub(start).min(frame.len());

    if available > 0 {
        frame[..available].copy_from_slice(&signal[start..start + available]);
    }
    frame[available..].fill(0.0);
}

/// Multiply a frame by precomputed window coefficients in place
pub fn apply_window_inplace(frame: &mut [f64], window: &[f64]) {
    for (s, w) in frame.iter_mut().zip(window.iter()) {
        *s *= w;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::windows::{generate_window, WindowType};

    #[test]
    fn test_apply_window_inplace() {
        let mut frame = vec![1.0; 101];
        let window = generate_window(WindowType::Hamming, 101);
        apply_window_inplace(&mut frame, &window);

        assert!((frame[50] - 1.0).abs() < 1e-10);
        assert!(frame[0] < 0.1);
        assert!(frame[100] < 0.1);
    }

    #[test]
    fn test_extract_frame_padding() {
        let signal = [1.0, 2.0, 3.0, 4.0, 5.0];
        let mut frame = [9.0; 4];

        extract_frame(&signal, 0, &mut frame);
        assert_eq!(frame, [1.0, 2.0, 3.0, 4.0]);

        extract_frame(&signal, 3, &mut frame);
        assert_eq!(frame, [4.0, 5.0, 0.0, 0.0]);

        extract_frame(&signal, 8, &mut frame);
        assert_eq!(frame, [0.0; 4]);
    }
}
