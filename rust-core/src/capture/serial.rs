//! Serial transport for sensor capture

use super::recorder::{capture_to_file, CaptureStats, WriteMode};
use super::CaptureError;
use serialport::SerialPort;
use std::path::Path;
use std::time::Duration;

/// Serial port settings
#[derive(Debug, Clone, PartialEq)]
pub struct SerialSettings {
    /// Port name (e.g. `/dev/ttyUSB0`, `COM8`)
    pub port: String,

    pub baud_rate: u32,

    /// Wait after opening; most boards reset when the port opens
    pub settle: Duration,

    /// Per-read timeout; bounds how late the capture deadline is noticed
    pub read_timeout: Duration,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 9600,
            settle: Duration::from_secs(3),
            read_timeout: Duration::from_millis(100),
        }
    }
}

/// Open the port and wait for the device to settle
pub fn open(settings: &SerialSettings) -> Result<Box<dyn SerialPort>, CaptureError> {
    let port = serialport::new(&settings.port, settings.baud_rate)
        .timeout(settings.read_timeout)
        .open()
        .map_err(|source| CaptureError::OpenPort {
            port: settings.port.clone(),
            source,
        })?;

    log::info!(
        "Opened {} at {} baud, settling for {:?}",
        settings.port,
        settings.baud_rate,
        settings.settle
    );
    std::thread::sleep(settings.settle);

    Ok(port)
}

/// Capture from a serial port into the artifact at `path`
///
/// The port is owned by this call and closed before it returns, whether
/// the capture completed, hit its deadline or failed.
///
/// # Arguments
/// * `settings` - Port name, baud rate and timing
/// * `path` - Capture artifact
/// * `mode` - Append to or truncate the artifact
/// * `duration` - Wall-clock capture budget
pub fn capture_serial(
    settings: &SerialSettings,
    path: &Path,
    mode: WriteMode,
    duration: Duration,
) -> Result<CaptureStats, CaptureError> {
    let port = open(settings)?;
    let result = capture_to_file(port, path, mode, duration);
    log::debug!("Released serial port {}", settings.port);
    result
}

/// Names of the serial ports present on this machine
pub fn list_ports() -> Result<Vec<String>, CaptureError> {
    let ports = serialport::available_ports().map_err(CaptureError::ListPorts)?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_port_reports_name() {
        let settings = SerialSettings {
            port: "/dev/does-not-exist-serial-spectrum".to_string(),
            settle: Duration::ZERO,
            ..Default::default()
        };

        match open(&settings) {
            Ok(_) => panic!("opened a port that does not exist"),
            Err(err) => assert!(err.to_string().contains("does-not-exist-serial-spectrum")),
        }
    }
}
