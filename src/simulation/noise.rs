use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::error::{Result, TiltError};
use crate::sample::Vector3;

/// Additive white Gaussian sensor noise, applied independently per axis
#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SensorNoiseConfig {
    /// Standard deviation in m/s²
    pub std_dev: f32,
    /// Seed for reproducible traces; random when absent
    pub seed: Option<u64>,
}

impl SensorNoiseConfig {
    pub fn new(std_dev: f32) -> Self {
        Self {
            std_dev,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => rand::make_rng(),
    }
}

/// Stateful noise generator built from a [`SensorNoiseConfig`]
pub struct SensorNoise {
    rng: ChaCha8Rng,
    normal: Option<Normal<f64>>,
}

impl SensorNoise {
    pub fn new(config: &SensorNoiseConfig) -> Result<Self> {
        if !config.std_dev.is_finite() || config.std_dev < 0.0 {
            return Err(TiltError::Config(format!(
                "noise std_dev must be a non-negative finite number, got {}",
                config.std_dev
            )));
        }

        let normal = if config.std_dev > 0.0 {
            Some(
                Normal::new(0.0, config.std_dev as f64)
                    .map_err(|e| TiltError::Config(format!("invalid noise: {}", e)))?,
            )
        } else {
            None
        };

        Ok(Self {
            rng: create_rng(config.seed),
            normal,
        })
    }

    /// Add one draw of noise to each axis
    pub fn apply(&mut self, value: Vector3) -> Vector3 {
        match &self.normal {
            Some(normal) => Vector3::new(
                value.x + normal.sample(&mut self.rng) as f32,
                value.y + normal.sample(&mut self.rng) as f32,
                value.z + normal.sample(&mut self.rng) as f32,
            ),
            None => value,
        }
    }
}
