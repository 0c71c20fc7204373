//! PyO3 bindings for Python integration

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::error::SpectrumError;

mod capture_bindings;
mod filter_bindings;
mod spectrum_bindings;

impl From<SpectrumError> for PyErr {
    fn from(err: SpectrumError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

/// Python module definition
#[pymodule]
fn serial_spectrum(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<filter_bindings::PyWindowType>()?;
    m.add_class::<filter_bindings::PyBandpassFilter>()?;

    m.add_function(wrap_pyfunction!(capture_bindings::decode_lines, m)?)?;
    m.add_function(wrap_pyfunction!(filter_bindings::bandpass, m)?)?;
    m.add_function(wrap_pyfunction!(spectrum_bindings::analyze, m)?)?;
    m.add_function(wrap_pyfunction!(spectrum_bindings::stft, m)?)?;
    m.add_function(wrap_pyfunction!(spectrum_bindings::to_decibel, m)?)?;

    Ok(())
}
