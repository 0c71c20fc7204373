//! Spectrogram grid and decibel scaling

use crate::error::{Result, SpectrumError};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Default magnitude floor for decibel conversion (-100 dB)
pub const DEFAULT_DB_FLOOR: f64 = 1e-5;

/// Value scale of a spectrogram grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    Linear,
    Decibel,
}

/// Decibel conversion parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecibelScale {
    /// Magnitudes below this are clamped to it before the log
    pub floor: f64,

    /// If set, clamp output to at least `max_db - top_db`
    pub top_db: Option<f64>,
}

impl Default for DecibelScale {
    fn default() -> Self {
        Self {
            floor: DEFAULT_DB_FLOOR,
            top_db: None,
        }
    }
}

impl DecibelScale {
    pub fn validate(&self) -> Result<()> {
        if !(self.floor.is_finite() && self.floor > 0.0) {
            return Err(SpectrumError::InvalidParameter {
                name: "decibel.floor",
                value: self.floor,
                reason: "must be a positive finite magnitude",
            });
        }
        if let Some(top_db) = self.top_db {
            if !(top_db.is_finite() && top_db >= 0.0) {
                return Err(SpectrumError::InvalidParameter {
                    name: "decibel.top_db",
                    value: top_db,
                    reason: "must be a non-negative finite range",
                });
            }
        }
        Ok(())
    }
}

/// 20·log10(max(m, floor))
#[inline]
pub fn amplitude_to_db(magnitude: f64, floor: f64) -> f64 {
    20.0 * magnitude.max(floor).log10()
}

/// Convert a magnitude grid to decibels, same shape and indexing
///
/// # Arguments
/// * `grid` - Non-negative magnitudes
/// * `floor` - Positive clamp applied before the log
pub fn to_decibel(grid: &Array2<f64>, floor: f64) -> Result<Array2<f64>> {
    to_decibel_with(grid, &DecibelScale { floor, top_db: None })
}

/// Convert a magnitude grid to decibels with full scale options
pub fn to_decibel_with(grid: &Array2<f64>, scale: &DecibelScale) -> Result<Array2<f64>> {
    scale.validate()?;

    let mut db = grid.mapv(|m| amplitude_to_db(m, scale.floor));

    if let Some(top_db) = scale.top_db {
        let max_db = db.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if max_db.is_finite() {
            let lower = max_db - top_db;
            db.mapv_inplace(|v| v.max(lower));
        }
    }

    Ok(db)
}

/// Time × frequency magnitude grid
///
/// `values` is indexed `[frequency_bin, time_frame]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrogram {
    pub values: Array2<f64>,
    pub window_size: usize,
    pub hop_size: usize,
    pub scale: Scale,
}

impl Spectrogram {
    pub fn num_bins(&self) -> usize {
        self.values.nrows()
    }

    pub fn num_frames(&self) -> usize {
        self.values.ncols()
    }

    /// Bin center frequencies in Hz
    pub fn bin_frequencies(&self, sample_rate: f64) -> Vec<f64> {
        (0..self.num_bins())
            .map(|k| k as f64 * sample_rate / self.window_size as f64)
            .collect()
    }

    /// Frame start times in seconds
    pub fn frame_times(&self, sample_rate: f64) -> Vec<f64> {
        (0..self.num_frames())
            .map(|t| (t * self.hop_size) as f64 / sample_rate)
            .collect()
    }

    /// Decibel-scaled copy of this grid
    pub fn to_decibel(&self, scale: &DecibelScale) -> Result<Spectrogram> {
        Ok(Spectrogram {
            values: to_decibel_with(&self.values, scale)?,
            window_size: self.window_size,
            hop_size: self.hop_size,
            scale: Scale::Decibel,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_decibel_values() {
        let grid = array![[1.0, 10.0], [0.0, 100.0]];
        let db = to_decibel(&grid, 1e-5).unwrap();

        assert_eq!(db.shape(), grid.shape());
        assert!((db[[0, 0]] - 0.0).abs() < 1e-12);
        assert!((db[[0, 1]] - 20.0).abs() < 1e-12);
        assert!((db[[1, 0]] + 100.0).abs() < 1e-9);
        assert!((db[[1, 1]] - 40.0).abs() < 1e-12);
    }

    #[test]
    fn test_decibel_monotonic() {
        let floor = 1e-3;
        let magnitudes: Vec<f64> = (0..200).map(|i| i as f64 * 1e-4).collect();
        let db: Vec<f64> = magnitudes.iter().map(|&m| amplitude_to_db(m, floor)).collect();

        assert!(db.windows(2).all(|w| w[1] >= w[0]));
        assert!(db.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_floor_must_be_positive() {
        let grid = array![[1.0]];
        for floor in [0.0, -1.0, f64::NAN] {
            assert!(matches!(
                to_decibel(&grid, floor),
                Err(SpectrumError::InvalidParameter { name: "decibel.floor", .. })
            ));
        }
    }

    #[test]
    fn test_top_db_clamp() {
        let grid = array![[1000.0, 1.0, 0.001]];
        let scale = DecibelScale {
            floor: DEFAULT_DB_FLOOR,
            top_db: Some(80.0),
        };
        let db = to_decibel_with(&grid, &scale).unwrap();

        assert!((db[[0, 0]] - 60.0).abs() < 1e-9);
        assert!((db[[0, 1]] - 0.0).abs() < 1e-9);
        assert!((db[[0, 2]] + 20.0).abs() < 1e-9);

        let clamped = to_decibel_with(&array![[1000.0, 1e-5]], &scale).unwrap();
        assert!((clamped[[0, 1]] + 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_axes() {
        let spectrogram = Spectrogram {
            values: Array2::zeros((3, 2)),
            window_size: 4,
            hop_size: 4,
            scale: Scale::Linear,
        };

        assert_eq!(spectrogram.bin_frequencies(8.0), vec![0.0, 2.0, 4.0]);
        assert_eq!(spectrogram.frame_times(8.0), vec![0.0, 0.5]);
    }
}
