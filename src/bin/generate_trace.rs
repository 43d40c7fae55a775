use anyhow::{Context, Result};
use clap::Parser;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tiltcomp::simulation::{Segment, SensorNoiseConfig, TraceConfig, generate_trace, samples};
use tiltcomp::source::write_trace;

#[derive(Parser, Debug)]
#[command(name = "generate_trace")]
#[command(about = "Generate synthetic accelerometer traces for gravity separation testing")]
struct Args {
    /// TOML scenario file; a tilt/shake/tilt scenario is used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "data/synthetic")]
    output_dir: PathBuf,

    /// Number of traces to generate
    #[arg(short, long, default_value_t = 1)]
    trials: u32,

    /// Base seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Sample rate in Hz (overrides the scenario)
    #[arg(long)]
    sample_rate: Option<f32>,

    /// Sensor noise standard deviation in m/s² (overrides the scenario)
    #[arg(long)]
    noise: Option<f32>,

    /// Output filename prefix
    #[arg(long, default_value = "trace")]
    prefix: String,

    /// Generate manifest.json
    #[arg(long)]
    manifest: bool,
}

#[derive(Debug, serde::Serialize)]
struct ManifestEntry {
    file: String,
    trial: u32,
    seed: Option<u64>,
    samples: usize,
}

#[derive(Debug, serde::Serialize)]
struct Manifest {
    sample_rate_hz: f32,
    duration_secs: f32,
    noise_std_dev: Option<f32>,
    files: Vec<ManifestEntry>,
}

fn default_scenario() -> TraceConfig {
    TraceConfig::new(50.0)
        .with_segment(Segment::Static {
            duration_secs: 2.0,
            tilt_degrees: [0.0, 0.0],
        })
        .with_segment(Segment::Motion {
            duration_secs: 1.0,
            tilt_degrees: [0.0, 0.0],
            amplitude: [3.0, 1.0, 0.0],
            frequency_hz: 2.0,
        })
        .with_segment(Segment::Rotate {
            duration_secs: 2.0,
            from_degrees: [0.0, 0.0],
            to_degrees: [30.0, -20.0],
        })
        .with_segment(Segment::Static {
            duration_secs: 2.0,
            tilt_degrees: [30.0, -20.0],
        })
        .with_noise(SensorNoiseConfig::new(0.02))
}

fn load_scenario(path: &Path) -> Result<TraceConfig> {
    let content = fs::read_to_string(path).context("Failed to read scenario file")?;
    toml::from_str(&content).context("Failed to parse scenario file")
}

/// Seed for one trial; wraps rather than overflowing near `u64::MAX`
fn trial_seed(base: Option<u64>, trial: u32) -> Option<u64> {
    base.map(|base| base.wrapping_add(u64::from(trial)))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut scenario = match &args.config {
        Some(path) => load_scenario(path)?,
        None => default_scenario(),
    };

    if let Some(rate) = args.sample_rate {
        scenario.sample_rate_hz = rate;
    }
    if let Some(std_dev) = args.noise {
        let seed = scenario.noise.as_ref().and_then(|n| n.seed);
        scenario.noise = Some(SensorNoiseConfig { std_dev, seed });
    }

    fs::create_dir_all(&args.output_dir).context("Failed to create output directory")?;

    let mut entries = Vec::new();
    for trial in 0..args.trials {
        let mut trial_scenario = scenario.clone();
        let seed = trial_seed(args.seed, trial);
        if let (Some(seed), Some(noise)) = (seed, trial_scenario.noise.as_mut()) {
            noise.seed = Some(seed);
        }

        let trace = generate_trace(&trial_scenario)?;
        let filename = format!("{}_{:03}.csv", args.prefix, trial);
        let path = args.output_dir.join(&filename);

        let mut writer = BufWriter::new(
            File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?,
        );
        write_trace(&mut writer, &samples(&trace))
            .with_context(|| format!("Failed to write {}", path.display()))?;

        log::info!("wrote {} samples to {}", trace.len(), path.display());
        println!("{}", path.display());

        entries.push(ManifestEntry {
            file: filename,
            trial,
            seed: trial_scenario.noise.as_ref().and_then(|n| n.seed),
            samples: trace.len(),
        });
    }

    if args.manifest {
        let manifest = Manifest {
            sample_rate_hz: scenario.sample_rate_hz,
            duration_secs: scenario.total_duration_secs(),
            noise_std_dev: scenario.noise.as_ref().map(|n| n.std_dev),
            files: entries,
        };
        let manifest_path = args.output_dir.join("manifest.json");
        let json =
            serde_json::to_string_pretty(&manifest).context("Failed to serialize manifest")?;
        fs::write(&manifest_path, json).context("Failed to write manifest")?;
        println!("{}", manifest_path.display());
    }

    Ok(())
}
