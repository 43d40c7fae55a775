use std::io::{self, BufReader, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use tiltcomp::TiltProcessor;
use tiltcomp::config::{AxisSelection, TiltConfig};
use tiltcomp::output::{OutputFormat, create_formatter};
use tiltcomp::source::{CsvTraceSource, SampleSource, spawn_acquisition};

#[derive(Parser, Debug)]
#[command(name = "tiltcomp")]
#[command(about = "Separate gravity from linear acceleration in accelerometer traces", long_about = None)]
struct Args {
    /// CSV trace (timestamp_ns,x,y,z); reads stdin when omitted or "-"
    input: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Threshold smoothing coefficient (0.0-1.0)
    #[arg(short, long)]
    alpha: Option<f32>,

    /// Consecutive static samples required to latch gravity
    #[arg(short = 'n', long)]
    count_threshold: Option<usize>,

    /// Magnitude moving average window
    #[arg(short, long)]
    window: Option<usize>,

    /// Initial static-detection threshold in g
    #[arg(short, long)]
    threshold: Option<f32>,

    /// Axes to record in the plot history (e.g. "xyz", "z")
    #[arg(long)]
    axes: Option<AxisSelection>,

    /// Output format: text, json, csv
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Samples buffered between acquisition and processing
    #[arg(long, default_value_t = 64)]
    queue: usize,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn build_config(args: &Args) -> anyhow::Result<TiltConfig> {
    let mut config = match &args.config {
        Some(path) => TiltConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TiltConfig::default(),
    };

    if let Some(alpha) = args.alpha {
        config.separator.alpha = alpha;
    }
    if let Some(count) = args.count_threshold {
        config.separator.count_threshold = count;
    }
    if let Some(window) = args.window {
        config.separator.window_size = window;
    }
    if let Some(threshold) = args.threshold {
        config.separator.initial_threshold = threshold;
    }
    if let Some(axes) = args.axes {
        config.history.axes = axes;
    }

    config.validate()?;
    Ok(config)
}

fn open_source(input: Option<&PathBuf>) -> anyhow::Result<Box<dyn SampleSource>> {
    match input {
        Some(path) if path.as_os_str() != "-" => Ok(Box::new(CsvTraceSource::open(path)?)),
        _ => Ok(Box::new(CsvTraceSource::from_reader(BufReader::new(
            io::stdin(),
        )))),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = build_config(&args)?;
    log::info!(
        "alpha {}, count threshold {}, window {}, initial threshold {}",
        config.separator.alpha,
        config.separator.count_threshold,
        config.separator.window_size,
        config.separator.initial_threshold
    );

    let mut processor = TiltProcessor::new(&config)?;
    let mut source = spawn_acquisition(open_source(args.input.as_ref())?, args.queue.max(1))?;

    let formatter = create_formatter(args.format, args.verbose > 0);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Some(header) = formatter.header() {
        writeln!(out, "{}", header)?;
    }

    let count = processor.run(&mut source, |sample| {
        writeln!(out, "{}", formatter.format(sample))?;
        Ok(())
    })?;

    log::info!(
        "processed {} samples ({} duplicates dropped), final gravity {:?}",
        count,
        processor.duplicate_count(),
        processor.gravity()
    );
    if let Some(hz) = processor.update_frequency() {
        log::info!("update frequency {:.1} Hz", hz);
    }

    Ok(())
}
