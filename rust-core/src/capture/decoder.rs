//! Line decoder for captured sensor text
//!
//! Turns raw capture lines into a sample sequence. Malformed lines are
//! skipped and reported, never fatal.

use crate::error::{DecodeSkip, SkipReason};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Channel retained in dual-channel mode (voltage channel A)
pub const RETAINED_CHANNEL: usize = 0;

/// Capture line layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelMode {
    /// One decimal number per line
    #[default]
    Single,

    /// Two whitespace-separated numbers per line; only channel A is kept
    Dual,
}

impl ChannelMode {
    /// Number of tokens a well-formed line carries
    pub fn tokens_per_line(&self) -> usize {
        match self {
            ChannelMode::Single => 1,
            ChannelMode::Dual => 2,
        }
    }
}

/// Decoded capture: samples in capture order plus every skipped line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedCapture {
    pub samples: Vec<f64>,
    pub skipped: Vec<DecodeSkip>,
}

impl DecodedCapture {
    /// Total lines seen by the decoder
    pub fn lines_seen(&self) -> usize {
        self.samples.len() + self.skipped.len()
    }
}

/// Parse one line into the retained sample value
///
/// # Arguments
/// * `line` - Raw line (surrounding whitespace is ignored)
/// * `mode` - Single or dual-channel layout
///
/// # Returns
/// The sample, or the reason the line must be skipped
pub fn decode_line(line: &str, mode: ChannelMode) -> Result<f64, SkipReason> {
    let expected = mode.tokens_per_line();
    let tokens: Vec<&str> = match mode {
        ChannelMode::Single => {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                Vec::new()
            } else {
                vec![trimmed]
            }
        }
        ChannelMode::Dual => line.split_whitespace().collect(),
    };

    if tokens.len() != expected {
        return Err(SkipReason::TokenCount {
            expected,
            found: tokens.len(),
        });
    }

    // Every token must be valid even though only one channel is kept
    let mut values = [0.0; 2];
    for (slot, token) in values.iter_mut().zip(tokens.iter()) {
        let value: f64 = token.parse().map_err(|_| SkipReason::NotNumeric)?;
        if !value.is_finite() {
            return Err(SkipReason::NonFinite);
        }
        *slot = value;
    }

    Ok(values[RETAINED_CHANNEL])
}

/// Decode a sequence of lines, preserving order
pub fn decode_lines<I, S>(lines: I, mode: ChannelMode) -> DecodedCapture
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut decoded = DecodedCapture::default();

    for (idx, line) in lines.into_iter().enumerate() {
        let line = line.as_ref();
        match decode_line(line, mode) {
            Ok(value) => decoded.samples.push(value),
            Err(reason) => {
                let skip = DecodeSkip {
                    line_number: idx + 1,
                    line: line.to_string(),
                    reason,
                };
                log::warn!("Skipping capture {}", skip);
                decoded.skipped.push(skip);
            }
        }
    }

    log::debug!(
        "Decoded {} samples ({} lines skipped)",
        decoded.samples.len(),
        decoded.skipped.len()
    );

    decoded
}

/// Decode every line from a reader
pub fn decode_reader<R: BufRead>(reader: R, mode: ChannelMode) -> io::Result<DecodedCapture> {
    // Bytes that are not UTF-8 become U+FFFD and fail to parse like any other bad token
    let mut lines = Vec::new();
    for raw in reader.split(b'\n') {
        let raw = raw?;
        let line = raw.strip_suffix(b"\r").unwrap_or(&raw[..]);
        lines.push(String::from_utf8_lossy(line).into_owned());
    }
    Ok(decode_lines(lines, mode))
}

/// Decode a persisted capture artifact
pub fn decode_file(path: &Path, mode: ChannelMode) -> io::Result<DecodedCapture> {
    let file = File::open(path)?;
    decode_reader(BufReader::new(file), mode)
}
