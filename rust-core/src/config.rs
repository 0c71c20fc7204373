//! Capture and analysis configuration
//!
//! Loaded from YAML. Every field has a default, so a partial file (or no
//! file at all) is valid. Values are validated up front; nothing is
//! silently replaced with a default when it is out of range.
//!
//! ```yaml
//! capture:
//!   port: /dev/ttyACM0
//!   duration_secs: 10
//!   write_mode: truncate
//!   channel_mode: dual
//! analysis:
//!   sample_rate: 100
//!   filter:
//!     enabled: true
//!     low_cutoff: 0.1
//!     high_cutoff: 45
//!     order: 5
//!   stft:
//!     window_size: 2048
//!     hop_size: 512
//! ```

use crate::capture::{ChannelMode, SerialSettings, WriteMode};
use crate::error::SpectrumError;
use crate::filters::FilterSpec;
use crate::spectrum::{DecibelScale, StftConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yml::Error),

    #[error("Invalid capture setting {name}={value}: {reason}")]
    InvalidCapture {
        name: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("Invalid analysis setting: {0}")]
    InvalidAnalysis(#[from] SpectrumError),
}

/// Serial capture settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub port: String,
    pub baud_rate: u32,

    /// Wall-clock capture budget in seconds
    pub duration_secs: f64,

    /// Delay after opening the port before reading
    pub settle_ms: u64,

    /// Per-read timeout
    pub read_timeout_ms: u64,

    /// Capture artifact, one reading per line
    pub output: PathBuf,

    pub write_mode: WriteMode,
    pub channel_mode: ChannelMode,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 9600,
            duration_secs: 10.0,
            settle_ms: 3000,
            read_timeout_ms: 100,
            output: PathBuf::from("capture.txt"),
            write_mode: WriteMode::Append,
            channel_mode: ChannelMode::Single,
        }
    }
}

impl CaptureConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port.trim().is_empty() {
            return Err(ConfigError::InvalidCapture {
                name: "port",
                value: self.port.clone(),
                reason: "port name is empty",
            });
        }
        if self.baud_rate == 0 {
            return Err(ConfigError::InvalidCapture {
                name: "baud_rate",
                value: "0".to_string(),
                reason: "must be positive",
            });
        }
        if !(self.duration_secs.is_finite() && self.duration_secs >= 0.0) {
            return Err(ConfigError::InvalidCapture {
                name: "duration_secs",
                value: self.duration_secs.to_string(),
                reason: "must be a non-negative number of seconds",
            });
        }
        if self.read_timeout_ms == 0 {
            return Err(ConfigError::InvalidCapture {
                name: "read_timeout_ms",
                value: "0".to_string(),
                reason: "must be positive so the capture deadline is observed",
            });
        }
        Ok(())
    }

    /// Capture budget; call after `validate`
    pub fn duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.duration_secs).unwrap_or(Duration::ZERO)
    }

    pub fn serial_settings(&self) -> SerialSettings {
        SerialSettings {
            port: self.port.clone(),
            baud_rate: self.baud_rate,
            settle: Duration::from_millis(self.settle_ms),
            read_timeout: Duration::from_millis(self.read_timeout_ms),
        }
    }
}

/// Band-pass stage settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Run the band-pass stage before analysis
    pub enabled: bool,

    pub low_cutoff: f64,
    pub high_cutoff: f64,
    pub order: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            low_cutoff: 0.1,
            high_cutoff: 45.0,
            order: 5,
        }
    }
}

impl FilterConfig {
    pub fn spec(&self, sample_rate: f64) -> FilterSpec {
        FilterSpec::new(self.low_cutoff, self.high_cutoff, sample_rate, self.order)
    }
}

/// Analysis parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Fixed capture rate in Hz (not measured from the transport)
    pub sample_rate: f64,

    pub filter: FilterConfig,
    pub stft: StftConfig,
    pub decibel: DecibelScale,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: 100.0,
            filter: FilterConfig::default(),
            stft: StftConfig::default(),
            decibel: DecibelScale::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), SpectrumError> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(SpectrumError::InvalidParameter {
                name: "sample_rate",
                value: self.sample_rate,
                reason: "must be a positive number of Hz",
            });
        }
        if self.filter.enabled {
            self.filter.spec(self.sample_rate).validate()?;
        }
        self.stft.validate()?;
        self.decibel.validate()
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub capture: CaptureConfig,
    pub analysis: AnalysisConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&text)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(text)?)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yml::to_string(self)?)
    }

    /// Check every section before any capture or analysis starts
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.capture.validate()?;
        self.analysis.validate()?;
        Ok(())
    }
}
