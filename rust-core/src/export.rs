//! CSV export of analysis results
//!
//! * `spectrum.csv` - `frequency_hz,magnitude`, one row per bin
//! * `spectrogram.csv` / `spectrogram_db.csv` - one row per frequency bin;
//!   the header carries the frame start times in seconds

use crate::pipeline::AnalysisReport;
use crate::spectrum::{MagnitudeSpectrum, Spectrogram};
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SPECTRUM_FILE: &str = "spectrum.csv";
pub const SPECTROGRAM_FILE: &str = "spectrogram.csv";
pub const SPECTROGRAM_DB_FILE: &str = "spectrogram_db.csv";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to create {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Serialize)]
struct SpectrumRow {
    frequency_hz: f64,
    magnitude: f64,
}

/// Write a magnitude spectrum as two columns
///
/// The header is written even when the spectrum has no bins.
pub fn write_spectrum<W: Write>(writer: W, spectrum: &MagnitudeSpectrum) -> Result<(), ExportError> {
    let mut csv = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    csv.write_record(["frequency_hz", "magnitude"])?;
    for (frequency_hz, magnitude) in spectrum.iter() {
        csv.serialize(SpectrumRow {
            frequency_hz,
            magnitude,
        })?;
    }
    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write a spectrogram grid, one row per frequency bin
pub fn write_spectrogram<W: Write>(
    writer: W,
    spectrogram: &Spectrogram,
    sample_rate: f64,
) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(spectrogram.num_frames() + 1);
    header.push("frequency_hz".to_string());
    header.extend(
        spectrogram
            .frame_times(sample_rate)
            .iter()
            .map(|t| format!("t={}", t)),
    );
    csv.write_record(&header)?;

    let frequencies = spectrogram.bin_frequencies(sample_rate);
    for (frequency, row) in frequencies.iter().zip(spectrogram.values.rows()) {
        let mut record = Vec::with_capacity(row.len() + 1);
        record.push(frequency.to_string());
        record.extend(row.iter().map(|v| v.to_string()));
        csv.write_record(&record)?;
    }

    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write all three result tables into `dir`
///
/// # Returns
/// Paths of the written files
pub fn export_report(dir: &Path, report: &AnalysisReport) -> Result<Vec<PathBuf>, ExportError> {
    fs::create_dir_all(dir).map_err(|source| ExportError::Create {
        path: dir.to_path_buf(),
        source,
    })?;

    let spectrum_path = dir.join(SPECTRUM_FILE);
    write_spectrum(create(&spectrum_path)?, &report.spectrum)?;

    let linear_path = dir.join(SPECTROGRAM_FILE);
    write_spectrogram(create(&linear_path)?, &report.spectrogram, report.sample_rate)?;

    let db_path = dir.join(SPECTROGRAM_DB_FILE);
    write_spectrogram(create(&db_path)?, &report.spectrogram_db, report.sample_rate)?;

    log::info!("Exported analysis tables to {}", dir.display());
    Ok(vec![spectrum_path, linear_path, db_path])
}

fn create(path: &Path) -> Result<fs::File, ExportError> {
    fs::File::create(path).map_err(|source| ExportError::Create {
        path: path.to_path_buf(),
        source,
    })
}
