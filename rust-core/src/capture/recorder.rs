//! Time-bounded line recorder
//!
//! Copies newline-terminated lines from a byte source into the capture
//! artifact until the wall-clock budget is spent

use super::CaptureError;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;
use std::time::{Duration, Instant};

/// How the capture artifact is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Accumulate across sessions
    #[default]
    Append,

    /// Fresh session, previous content discarded
    Truncate,
}

/// Longest line kept; longer runs without `\n` are dropped up to the next newline
pub const MAX_LINE_BYTES: usize = 1024;

const READ_CHUNK: usize = 256;

/// Summary of one capture session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureStats {
    /// Lines written to the artifact
    pub lines_written: usize,

    /// Raw bytes received from the source
    pub bytes_read: usize,

    /// An unterminated line was pending when the budget ran out
    pub discarded_partial: bool,

    /// Lines dropped for exceeding [`MAX_LINE_BYTES`]
    pub overlong_lines: usize,

    /// Source reported end-of-stream before the budget ran out
    pub source_closed: bool,

    pub elapsed: Duration,
}

fn is_retryable(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}

fn write_line<W: Write>(writer: &mut W, raw: &[u8]) -> io::Result<()> {
    let text = String::from_utf8_lossy(raw);
    writeln!(writer, "{}", text.trim())
}

/// Splits a byte stream into lines, bounding the partial line
#[derive(Default)]
struct LineSplitter {
    pending: Vec<u8>,
    overlong: bool,
}

impl LineSplitter {
    fn feed<W: Write>(
        &mut self,
        bytes: &[u8],
        writer: &mut W,
        stats: &mut CaptureStats,
    ) -> io::Result<()> {
        for &byte in bytes {
            if byte == b'\n' {
                if !self.overlong {
                    write_line(writer, &self.pending)?;
                    stats.lines_written += 1;
                }
                self.pending.clear();
                self.overlong = false;
            } else if self.overlong {
                continue;
            } else if self.pending.len() < MAX_LINE_BYTES {
                self.pending.push(byte);
            } else {
                log::warn!("Dropping capture line longer than {} bytes", MAX_LINE_BYTES);
                stats.overlong_lines += 1;
                self.pending.clear();
                self.overlong = true;
            }
        }
        Ok(())
    }
}

/// Record lines from `reader` into `writer` for at most `duration`
///
/// The deadline is checked after every read, so a source that keeps
/// sending without ever completing a line still stops on time. Read
/// timeouts are retried; the source should be configured with a finite
/// read timeout. Reaching the deadline is not an error.
///
/// # Arguments
/// * `reader` - Byte source (serial port, file, ...)
/// * `writer` - Destination for trimmed lines, one per `\n`
/// * `duration` - Wall-clock capture budget
pub fn record<R: Read, W: Write>(
    mut reader: R,
    writer: &mut W,
    duration: Duration,
) -> Result<CaptureStats, CaptureError> {
    let mut buf = [0u8; READ_CHUNK];
    let mut lines = LineSplitter::default();
    let mut stats = CaptureStats::default();
    let start = Instant::now();

    while start.elapsed() < duration {
        let n = match reader.read(&mut buf) {
            Ok(0) => {
                stats.source_closed = true;
                break;
            }
            Ok(n) => n,
            Err(e) if is_retryable(&e) => continue,
            Err(e) => return Err(e.into()),
        };
        stats.bytes_read += n;
        lines.feed(&buf[..n], writer, &mut stats)?;
    }

    if !lines.pending.is_empty() && !lines.overlong {
        if stats.source_closed {
            // Final line of a closed source is complete even without '\n'
            write_line(writer, &lines.pending)?;
            stats.lines_written += 1;
        } else {
            log::debug!("Discarding {} byte partial line at deadline", lines.pending.len());
            stats.discarded_partial = true;
        }
    }

    writer.flush()?;
    stats.elapsed = start.elapsed();

    log::info!(
        "Captured {} lines ({} bytes) in {:.2?}",
        stats.lines_written,
        stats.bytes_read,
        stats.elapsed
    );

    Ok(stats)
}

/// Open the capture artifact according to the write mode
pub fn open_artifact(path: &Path, mode: WriteMode) -> Result<File, CaptureError> {
    let to_artifact_error = |source| CaptureError::Artifact {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(to_artifact_error)?;
    }

    let mut options = OpenOptions::new();
    options.create(true);
    match mode {
        WriteMode::Append => options.append(true),
        WriteMode::Truncate => options.write(true).truncate(true),
    };

    options.open(path).map_err(to_artifact_error)
}

/// Record from `reader` into the artifact at `path`
///
/// The file handle is scoped to this call and closed on every exit path.
pub fn capture_to_file<R: Read>(
    reader: R,
    path: &Path,
    mode: WriteMode,
    duration: Duration,
) -> Result<CaptureStats, CaptureError> {
    let file = open_artifact(path, mode)?;
    let mut writer = BufWriter::new(file);
    log::debug!("Recording to {} ({:?})", path.display(), mode);
    record(reader, &mut writer, duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Source that yields some bytes, then only times out
    struct StallingSource {
        data: Cursor<Vec<u8>>,
    }

    impl Read for StallingSource {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.data.read(buf)?;
            if n == 0 {
                std::thread::sleep(Duration::from_millis(2));
                return Err(io::Error::new(io::ErrorKind::TimedOut, "no data"));
            }
            Ok(n)
        }
    }

    #[test]
    fn test_record_until_source_closes() {
        let source = Cursor::new(b"1.0 2.0\r\n 3.0 4.0 \n5.0 6.0".to_vec());
        let mut out = Vec::new();

        let stats = record(source, &mut out, Duration::from_secs(5)).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "1.0 2.0\n3.0 4.0\n5.0 6.0\n");
        assert_eq!(stats.lines_written, 3);
        assert!(stats.source_closed);
        assert!(!stats.discarded_partial);
    }

    #[test]
    fn test_record_deadline_discards_partial() {
        let source = StallingSource {
            data: Cursor::new(b"1.5\n2.5\n3.".to_vec()),
        };
        let mut out = Vec::new();

        let stats = record(source, &mut out, Duration::from_millis(30)).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "1.5\n2.5\n");
        assert_eq!(stats.lines_written, 2);
        assert_eq!(stats.bytes_read, 10);
        assert!(stats.discarded_partial);
        assert!(!stats.source_closed);
        assert!(stats.elapsed >= Duration::from_millis(30));
    }

    /// Source that keeps sending digits and never a newline
    struct Babbler;

    impl Read for Babbler {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            std::thread::sleep(Duration::from_millis(1));
            buf[0] = b'7';
            Ok(1)
        }
    }

    #[test]
    fn test_deadline_holds_without_newlines() {
        let mut out = Vec::new();
        let stats = record(Babbler, &mut out, Duration::from_millis(20)).unwrap();

        assert!(stats.elapsed < Duration::from_millis(500), "ran for {:?}", stats.elapsed);
        assert!(stats.bytes_read > 0);
        assert_eq!(stats.lines_written, 0);
        assert!(!stats.source_closed);
        assert!(out.is_empty());
    }

    #[test]
    fn test_overlong_line_dropped() {
        let mut data = vec![b'7'; MAX_LINE_BYTES * 3];
        data.extend_from_slice(b"\n1.0\n");
        let mut out = Vec::new();

        let stats = record(Cursor::new(data), &mut out, Duration::from_secs(5)).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "1.0\n");
        assert_eq!(stats.lines_written, 1);
        assert_eq!(stats.overlong_lines, 1);
    }

    #[test]
    fn test_zero_budget_reads_nothing() {
        let mut out = Vec::new();
        let stats = record(Cursor::new(b"1\n".to_vec()), &mut out, Duration::ZERO).unwrap();

        assert_eq!(stats.lines_written, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_write_modes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session").join("capture.txt");
        let budget = Duration::from_secs(5);

        capture_to_file(Cursor::new(b"1\n2\n".to_vec()), &path, WriteMode::Append, budget).unwrap();
        capture_to_file(Cursor::new(b"3\n".to_vec()), &path, WriteMode::Append, budget).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "1\n2\n3\n");

        capture_to_file(Cursor::new(b"9\n".to_vec()), &path, WriteMode::Truncate, budget).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "9\n");
    }
}
