//! Timed capture of sensor lines and decoding into samples

pub mod decoder;
pub mod recorder;
pub mod serial;

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub use decoder::{decode_file, decode_lines, ChannelMode, DecodedCapture};
pub use recorder::{capture_to_file, record, CaptureStats, WriteMode};
pub use serial::{capture_serial, list_ports, SerialSettings};

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Failed to open serial port {port}: {source}")]
    OpenPort {
        port: String,
        #[source]
        source: serialport::Error,
    },

    #[error("Failed to list serial ports: {0}")]
    ListPorts(#[source] serialport::Error),

    #[error("Failed to open capture artifact {}: {source}", .path.display())]
    Artifact {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Capture I/O error: {0}")]
    Io(#[from] io::Error),
}
