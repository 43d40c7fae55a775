use clap::Parser;
use rolling_stats::Stats;
use serde::Serialize;
use std::path::PathBuf;

use tiltcomp::TiltProcessor;
use tiltcomp::config::TiltConfig;
use tiltcomp::source::CsvTraceSource;

#[derive(Parser, Debug)]
#[command(name = "analyze_trace")]
#[command(about = "Summarize gravity separation over accelerometer CSV traces", long_about = None)]
struct Args {
    /// CSV traces to analyze
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Output format: text, csv, json
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

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

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Csv,
    Json,
}

#[derive(Debug, Clone, Serialize)]
struct StatsSummary {
    count: usize,
    mean: f32,
    std_dev: f32,
    min: f32,
    max: f32,
}

impl StatsSummary {
    fn from_stats(stats: &Stats<f32>) -> Option<Self> {
        if stats.count == 0 {
            return None;
        }
        Some(Self {
            count: stats.count,
            mean: stats.mean,
            std_dev: stats.std_dev,
            min: stats.min,
            max: stats.max,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
struct FileAnalysis {
    filename: String,
    sample_count: usize,
    duplicates: usize,
    magnitude: Option<StatsSummary>,
    linear_magnitude: Option<StatsSummary>,
    sample_period_ms: Option<StatsSummary>,
    qualifying_fraction: Option<f32>,
    latch_events: usize,
    final_threshold: Option<f64>,
    final_gravity: Option<[f32; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl FileAnalysis {
    fn failed(filename: String, error: String) -> Self {
        Self {
            filename,
            sample_count: 0,
            duplicates: 0,
            magnitude: None,
            linear_magnitude: None,
            sample_period_ms: None,
            qualifying_fraction: None,
            latch_events: 0,
            final_threshold: None,
            final_gravity: None,
            error: Some(error),
        }
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

    let mut config = match &args.config {
        Some(path) => TiltConfig::load(path)?,
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
    config.validate()?;

    let results: Vec<FileAnalysis> = args
        .files
        .iter()
        .map(|path| {
            let filename = path.display().to_string();
            analyze_file(path, &config).unwrap_or_else(|e| {
                log::error!("{}: {:#}", filename, e);
                FileAnalysis::failed(filename, format!("{:#}", e))
            })
        })
        .collect();

    match args.format {
        OutputFormat::Text => print_text(&results, &config),
        OutputFormat::Csv => print_csv(&results),
        OutputFormat::Json => print_json(&results)?,
    }

    Ok(())
}

fn analyze_file(path: &PathBuf, config: &TiltConfig) -> anyhow::Result<FileAnalysis> {
    let mut source = CsvTraceSource::open(path)?;
    let mut processor = TiltProcessor::new(config)?;

    let mut magnitude_stats: Stats<f32> = Stats::new();
    let mut linear_stats: Stats<f32> = Stats::new();
    let mut period_stats: Stats<f32> = Stats::new();
    let mut qualifying = 0usize;
    let mut latch_events = 0usize;
    let mut was_latched = false;

    let sample_count = processor.run(&mut source, |sample| {
        let s = &sample.separation;
        if s.magnitude.is_finite() {
            magnitude_stats.update(s.magnitude);
        }
        let linear = s.linear.norm();
        if linear.is_finite() {
            linear_stats.update(linear);
        }
        if let Some(dt) = sample.dt_secs {
            period_stats.update(dt * 1000.0);
        }
        if s.qualifying {
            qualifying += 1;
        }
        // Count the start of each latched stretch, not every latched sample
        if s.latched && !was_latched {
            latch_events += 1;
        }
        was_latched = s.latched;
        Ok(())
    })?;

    log::info!(
        "{}: {} samples, {} latch events",
        path.display(),
        sample_count,
        latch_events
    );

    let processed = sample_count > 0;
    Ok(FileAnalysis {
        filename: path.display().to_string(),
        sample_count,
        duplicates: processor.duplicate_count(),
        magnitude: StatsSummary::from_stats(&magnitude_stats),
        linear_magnitude: StatsSummary::from_stats(&linear_stats),
        sample_period_ms: StatsSummary::from_stats(&period_stats),
        qualifying_fraction: processed.then(|| qualifying as f32 / sample_count as f32),
        latch_events,
        final_threshold: processed.then(|| processor.separator().threshold()),
        final_gravity: processed.then(|| processor.gravity().to_array()),
        error: None,
    })
}

fn print_text(results: &[FileAnalysis], config: &TiltConfig) {
    println!(
        "alpha {}, count threshold {}, window {}, initial threshold {}",
        config.separator.alpha,
        config.separator.count_threshold,
        config.separator.window_size,
        config.separator.initial_threshold
    );
    println!();
    println!(
        "{:<48} {:>8} {:>10} {:>10} {:>10} {:>8} {:>10}",
        "File", "Samples", "Mag mean", "Lin mean", "Static %", "Latches", "Threshold"
    );
    println!("{}", "-".repeat(110));

    for result in results {
        if let Some(ref error) = result.error {
            println!("{:<48} ERROR: {}", result.filename, error);
            continue;
        }

        let mag_mean = result
            .magnitude
            .as_ref()
            .map_or("-".to_string(), |s| format!("{:.4}", s.mean));
        let lin_mean = result
            .linear_magnitude
            .as_ref()
            .map_or("-".to_string(), |s| format!("{:.3}", s.mean));
        let static_pct = result
            .qualifying_fraction
            .map_or("-".to_string(), |f| format!("{:.1}", f * 100.0));
        let threshold = result
            .final_threshold
            .map_or("-".to_string(), |t| format!("{:.4}", t));

        println!(
            "{:<48} {:>8} {:>10} {:>10} {:>10} {:>8} {:>10}",
            result.filename,
            result.sample_count,
            mag_mean,
            lin_mean,
            static_pct,
            result.latch_events,
            threshold
        );
    }

    for result in results {
        if result.error.is_some() {
            continue;
        }

        eprintln!();
        eprintln!("Details for {}:", result.filename);
        if let Some(ref period) = result.sample_period_ms {
            let rate = if period.mean > 0.0 {
                1000.0 / period.mean
            } else {
                0.0
            };
            eprintln!(
                "  Sample period: {:.3} ± {:.3} ms ({:.1} Hz)",
                period.mean, period.std_dev, rate
            );
        }
        if let Some(ref linear) = result.linear_magnitude {
            eprintln!(
                "  Linear |a|: mean {:.3}, std {:.3}, max {:.3} m/s²",
                linear.mean, linear.std_dev, linear.max
            );
        }
        if let Some(gravity) = result.final_gravity {
            eprintln!(
                "  Final gravity: [{:.3}, {:.3}, {:.3}]",
                gravity[0], gravity[1], gravity[2]
            );
        }
        if result.duplicates > 0 {
            eprintln!("  Duplicate events dropped: {}", result.duplicates);
        }
    }
}

fn print_csv(results: &[FileAnalysis]) {
    println!(
        "filename,sample_count,magnitude_mean,magnitude_std,linear_mean,linear_max,period_ms,period_jitter_ms,qualifying_fraction,latch_events,final_threshold,gravity_x,gravity_y,gravity_z,error"
    );
    for result in results {
        let magnitude_mean = result
            .magnitude
            .as_ref()
            .map(|s| format!("{:.6}", s.mean))
            .unwrap_or_default();
        let magnitude_std = result
            .magnitude
            .as_ref()
            .map(|s| format!("{:.6}", s.std_dev))
            .unwrap_or_default();
        let linear_mean = result
            .linear_magnitude
            .as_ref()
            .map(|s| format!("{:.4}", s.mean))
            .unwrap_or_default();
        let linear_max = result
            .linear_magnitude
            .as_ref()
            .map(|s| format!("{:.4}", s.max))
            .unwrap_or_default();
        let period = result
            .sample_period_ms
            .as_ref()
            .map(|s| format!("{:.4}", s.mean))
            .unwrap_or_default();
        let jitter = result
            .sample_period_ms
            .as_ref()
            .map(|s| format!("{:.4}", s.std_dev))
            .unwrap_or_default();
        let fraction = result
            .qualifying_fraction
            .map(|f| format!("{:.4}", f))
            .unwrap_or_default();
        let threshold = result
            .final_threshold
            .map(|t| format!("{:.6}", t))
            .unwrap_or_default();
        let gravity = result
            .final_gravity
            .map(|g| format!("{:.4},{:.4},{:.4}", g[0], g[1], g[2]))
            .unwrap_or_else(|| ",,".to_string());
        let error = result.error.as_deref().unwrap_or("");

        println!(
            "{},{},{},{},{},{},{},{},{},{},{},{},{}",
            result.filename,
            result.sample_count,
            magnitude_mean,
            magnitude_std,
            linear_mean,
            linear_max,
            period,
            jitter,
            fraction,
            result.latch_events,
            threshold,
            gravity,
            error
        );
    }
}

fn print_json(results: &[FileAnalysis]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(results)?;
    println!("{}", json);
    Ok(())
}
