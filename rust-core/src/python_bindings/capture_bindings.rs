//! Python bindings for the line decoder

use numpy::PyArray1;
use pyo3::prelude::*;

use crate::capture::{self, ChannelMode};

/// Decode captured text lines into samples
///
/// Args:
///     lines: Captured lines, one reading per line
///     dual: Lines carry two readings; the first is kept
///
/// Returns:
///     (samples, skipped) where skipped is a list of (line_number, line, reason)
#[pyfunction]
#[pyo3(signature = (lines, dual=false))]
pub fn decode_lines<'py>(
    py: Python<'py>,
    lines: Vec<String>,
    dual: bool,
) -> PyResult<(&'py PyArray1<f64>, Vec<(usize, String, String)>)> {
    let mode = if dual { ChannelMode::Dual } else { ChannelMode::Single };
    let decoded = capture::decode_lines(lines, mode);

    let skipped = decoded
        .skipped
        .into_iter()
        .map(|s| (s.line_number, s.line, s.reason.to_string()))
        .collect();

    Ok((PyArray1::from_vec(py, decoded.samples), skipped))
}
