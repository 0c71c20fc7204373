//! serial-spectrum: capture voltage readings from a serial port and
//! analyze their frequency content

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serial_spectrum::capture::{self, ChannelMode, WriteMode};
use serial_spectrum::config::Config;
use serial_spectrum::export;
use serial_spectrum::pipeline::Pipeline;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "serial-spectrum", version)]
#[command(about = "Serial voltage capture and spectral analysis")]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List available serial ports
    Ports,

    /// Record readings to the capture artifact
    Capture(CaptureArgs),

    /// Analyze an existing capture artifact
    Analyze {
        /// Capture artifact (defaults to the configured output)
        #[arg(value_name = "INPUT")]
        input: Option<PathBuf>,

        #[command(flatten)]
        analysis: AnalyzeArgs,
    },

    /// Capture, then analyze the artifact (appended to unless --fresh)
    Run {
        #[command(flatten)]
        capture: CaptureArgs,

        #[command(flatten)]
        analysis: AnalyzeArgs,
    },
}

#[derive(Args)]
struct CaptureArgs {
    /// Serial port name
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate
    #[arg(short, long)]
    baud: Option<u32>,

    /// Capture duration in seconds
    #[arg(short, long)]
    duration: Option<f64>,

    /// Capture artifact path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Truncate the artifact instead of appending
    #[arg(long)]
    fresh: bool,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Skip the band-pass stage
    #[arg(long, conflicts_with = "filter")]
    no_filter: bool,

    /// Force the band-pass stage on
    #[arg(long)]
    filter: bool,

    /// Sample rate in Hz
    #[arg(long)]
    sample_rate: Option<f64>,

    /// Line format of the artifact
    #[arg(long, value_enum)]
    channels: Option<Channels>,

    /// Directory for the CSV tables
    #[arg(long, default_value = "spectrum-out")]
    out_dir: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
enum Channels {
    Single,
    Dual,
}

impl From<Channels> for ChannelMode {
    fn from(c: Channels) -> Self {
        match c {
            Channels::Single => ChannelMode::Single,
            Channels::Dual => ChannelMode::Dual,
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn apply_capture_args(config: &mut Config, args: &CaptureArgs) {
    if let Some(port) = &args.port {
        config.capture.port = port.clone();
    }
    if let Some(baud) = args.baud {
        config.capture.baud_rate = baud;
    }
    if let Some(duration) = args.duration {
        config.capture.duration_secs = duration;
    }
    if let Some(output) = &args.output {
        config.capture.output = output.clone();
    }
    if args.fresh {
        config.capture.write_mode = WriteMode::Truncate;
    }
}

fn apply_analyze_args(config: &mut Config, args: &AnalyzeArgs) {
    if args.no_filter {
        config.analysis.filter.enabled = false;
    } else if args.filter {
        config.analysis.filter.enabled = true;
    }
    if let Some(sample_rate) = args.sample_rate {
        config.analysis.sample_rate = sample_rate;
    }
    if let Some(channels) = args.channels {
        config.capture.channel_mode = channels.into();
    }
}

fn run_capture(config: &Config) -> Result<()> {
    let settings = config.capture.serial_settings();
    log::info!(
        "Capturing from {} at {} baud for {:.1} s into {} ({:?})",
        settings.port,
        settings.baud_rate,
        config.capture.duration_secs,
        config.capture.output.display(),
        config.capture.write_mode
    );

    let stats = capture::capture_serial(
        &settings,
        &config.capture.output,
        config.capture.write_mode,
        config.capture.duration(),
    )
    .with_context(|| format!("capturing from {}", settings.port))?;

    if stats.lines_written == 0 {
        log::warn!("No complete lines received from {}", settings.port);
    }
    Ok(())
}

fn run_analysis(config: &Config, input: &Path, out_dir: &Path) -> Result<()> {
    let decoded = capture::decode_file(input, config.capture.channel_mode)
        .with_context(|| format!("reading capture artifact {}", input.display()))?;
    log::info!(
        "Decoded {} samples from {} ({} lines skipped)",
        decoded.samples.len(),
        input.display(),
        decoded.skipped.len()
    );

    let pipeline = Pipeline::new(config.analysis).context("configuring analysis")?;
    let report = pipeline
        .run_capture(&decoded)
        .with_context(|| format!("analyzing {}", input.display()))?;

    if let Some((freq, mag)) = report.spectrum.peak(true) {
        log::info!("Spectral peak at {:.3} Hz (magnitude {:.3})", freq, mag);
    }

    let written = export::export_report(out_dir, &report)
        .with_context(|| format!("writing results to {}", out_dir.display()))?;
    for path in &written {
        println!("{}", path.display());
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Ports => {
            let ports = capture::list_ports().context("listing serial ports")?;
            if ports.is_empty() {
                log::warn!("No serial ports found");
            }
            for port in ports {
                println!("{}", port);
            }
        }
        Command::Capture(args) => {
            apply_capture_args(&mut config, &args);
            config.capture.validate().context("invalid capture configuration")?;
            run_capture(&config)?;
        }
        Command::Analyze { input, analysis } => {
            apply_analyze_args(&mut config, &analysis);
            config.validate().context("invalid configuration")?;
            let input = input.unwrap_or_else(|| config.capture.output.clone());
            run_analysis(&config, &input, &analysis.out_dir)?;
        }
        Command::Run { capture, analysis } => {
            apply_capture_args(&mut config, &capture);
            apply_analyze_args(&mut config, &analysis);
            config.validate().context("invalid configuration")?;
            run_capture(&config)?;
            let input = config.capture.output.clone();
            run_analysis(&config, &input, &analysis.out_dir)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_flags_apply() {
        let cli = Cli::parse_from([
            "serial-spectrum",
            "run",
            "--fresh",
            "--no-filter",
            "--duration",
            "2.5",
            "--channels",
            "dual",
        ]);
        let mut config = Config::default();

        match cli.command {
            Command::Run { capture, analysis } => {
                apply_capture_args(&mut config, &capture);
                apply_analyze_args(&mut config, &analysis);
            }
            _ => panic!("expected run"),
        }

        assert_eq!(config.capture.write_mode, WriteMode::Truncate);
        assert_eq!(config.capture.duration_secs, 2.5);
        assert_eq!(config.capture.channel_mode, ChannelMode::Dual);
        assert!(!config.analysis.filter.enabled);
    }

    #[test]
    fn test_filter_flags_conflict() {
        let result = Cli::try_parse_from(["serial-spectrum", "analyze", "--filter", "--no-filter"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_capture_ignores_analysis_settings() {
        let mut config = Config::default();
        config.analysis.filter.high_cutoff = 80.0;

        assert!(config.validate().is_err());
        config.capture.validate().unwrap();
    }
}
