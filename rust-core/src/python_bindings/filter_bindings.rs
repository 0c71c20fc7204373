//! Python bindings for band-pass filtering

use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::prelude::*;

use crate::filters::{self, BandpassFilter, FilterSpec, WindowType};

/// Window type enum exposed to Python
#[pyclass(name = "WindowType")]
#[derive(Clone)]
pub enum PyWindowType {
    Hann,
    Hamming,
    Blackman,
    Rectangular,
}

impl From<PyWindowType> for WindowType {
    fn from(py_win: PyWindowType) -> Self {
        match py_win {
            PyWindowType::Hann => WindowType::Hann,
            PyWindowType::Hamming => WindowType::Hamming,
            PyWindowType::Blackman => WindowType::Blackman,
            PyWindowType::Rectangular => WindowType::Rectangular,
        }
    }
}

/// Zero-phase Butterworth band-pass filter exposed to Python
#[pyclass(name = "BandpassFilter")]
pub struct PyBandpassFilter {
    filter: BandpassFilter,
}

#[pymethods]
impl PyBandpassFilter {
    /// Design a band-pass filter
    ///
    /// Args:
    ///     low_cutoff: Lower passband edge in Hz
    ///     high_cutoff: Upper passband edge in Hz
    ///     sample_rate: Sample rate in Hz
    ///     order: Prototype order
    #[new]
    #[pyo3(signature = (low_cutoff=0.1, high_cutoff=45.0, sample_rate=100.0, order=5))]
    fn new(low_cutoff: f64, high_cutoff: f64, sample_rate: f64, order: usize) -> PyResult<Self> {
        let spec = FilterSpec::new(low_cutoff, high_cutoff, sample_rate, order);
        Ok(Self {
            filter: BandpassFilter::new(spec)?,
        })
    }

    /// Filter a signal forward and backward
    ///
    /// Args:
    ///     signal: Input samples as numpy array
    ///
    /// Returns:
    ///     Filtered samples, same length as input
    fn apply<'py>(
        &self,
        py: Python<'py>,
        signal: PyReadonlyArray1<f64>,
    ) -> PyResult<&'py PyArray1<f64>> {
        let output = self.filter.apply(signal.as_slice()?)?;
        Ok(PyArray1::from_vec(py, output))
    }

    /// Shortest signal `apply` accepts
    fn min_input_len(&self) -> usize {
        self.filter.min_input_len()
    }

    /// Magnitude response at the given frequencies in Hz
    fn magnitude_response<'py>(
        &self,
        py: Python<'py>,
        frequencies: PyReadonlyArray1<f64>,
    ) -> PyResult<&'py PyArray1<f64>> {
        let response = filters::magnitude_response(
            self.filter.sos(),
            frequencies.as_slice()?,
            self.filter.spec().sample_rate,
        );
        Ok(PyArray1::from_vec(py, response))
    }
}

/// One-shot band-pass filter
#[pyfunction]
#[pyo3(signature = (signal, low_cutoff=0.1, high_cutoff=45.0, sample_rate=100.0, order=5))]
pub fn bandpass<'py>(
    py: Python<'py>,
    signal: PyReadonlyArray1<f64>,
    low_cutoff: f64,
    high_cutoff: f64,
    sample_rate: f64,
    order: usize,
) -> PyResult<&'py PyArray1<f64>> {
    let output = filters::bandpass_filter(
        signal.as_slice()?,
        low_cutoff,
        high_cutoff,
        sample_rate,
        order,
    )?;
    Ok(PyArray1::from_vec(py, output))
}
