//! Python bindings for spectrum and spectrogram analysis

use numpy::{PyArray1, PyArray2, PyReadonlyArray1, PyReadonlyArray2};
use pyo3::prelude::*;

use super::filter_bindings::PyWindowType;
use crate::spectrum::{self, DecibelScale, Stft, StftConfig};

/// Single-sided magnitude spectrum of the whole signal
///
/// Returns:
///     (frequencies, magnitudes) as numpy arrays
#[pyfunction]
#[pyo3(signature = (signal, sample_rate=100.0))]
pub fn analyze<'py>(
    py: Python<'py>,
    signal: PyReadonlyArray1<f64>,
    sample_rate: f64,
) -> PyResult<(&'py PyArray1<f64>, &'py PyArray1<f64>)> {
    let result = spectrum::analyze(signal.as_slice()?, sample_rate)?;
    Ok((
        PyArray1::from_vec(py, result.frequencies),
        PyArray1::from_vec(py, result.magnitudes),
    ))
}

/// STFT magnitude grid
///
/// Returns:
///     2-D array indexed [frequency_bin, time_frame]
#[pyfunction]
#[pyo3(signature = (signal, window_size=2048, hop_size=512, window_type=PyWindowType::Hann))]
pub fn stft<'py>(
    py: Python<'py>,
    signal: PyReadonlyArray1<f64>,
    window_size: usize,
    hop_size: usize,
    window_type: PyWindowType,
) -> PyResult<&'py PyArray2<f64>> {
    let config = StftConfig {
        window_size,
        hop_size,
        window_type: window_type.into(),
    };
    let spectrogram = Stft::new(config)?.compute(signal.as_slice()?)?;
    Ok(PyArray2::from_owned_array(py, spectrogram.values))
}

/// Convert a magnitude grid to decibels
#[pyfunction]
#[pyo3(signature = (grid, floor=spectrum::DEFAULT_DB_FLOOR, top_db=None))]
pub fn to_decibel<'py>(
    py: Python<'py>,
    grid: PyReadonlyArray2<f64>,
    floor: f64,
    top_db: Option<f64>,
) -> PyResult<&'py PyArray2<f64>> {
    let scale = DecibelScale { floor, top_db };
    let db = spectrum::to_decibel_with(&grid.as_array().to_owned(), &scale)?;
    Ok(PyArray2::from_owned_array(py, db))
}
