//! Configuration management
//!
//! Every hyperparameter of a run lives in one immutable [`Config`] that is
//! handed to constructors. Defaults reproduce the reference training run.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Network shapes
    pub model: ModelConfig,
    /// Optimizer and loop settings
    pub training: TrainingConfig,
    /// Dataset location
    pub data: DataConfig,
    /// Logging and snapshot cadence
    pub report: ReportConfig,
}

/// Network-related configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Latent vector width
    pub latent_dim: i64,
    /// Width of both hidden layers in each network
    pub hidden_dim: i64,
    /// Image side length (images are square)
    pub image_size: i64,
    /// Image channels
    pub channels: i64,
    /// Negative slope of the discriminator's leaky ReLU
    pub leaky_slope: f64,
}

impl ModelConfig {
    /// Flattened image width, `channels * image_size^2`
    pub fn image_dim(&self) -> i64 {
        self.channels * self.image_size * self.image_size
    }

    /// Shape of a single image, `[channels, size, size]`
    pub fn image_shape(&self) -> [i64; 3] {
        [self.channels, self.image_size, self.image_size]
    }
}

/// Training-related configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of passes over the dataset
    pub epochs: usize,
    /// Configured batch size; the last batch of an epoch may be smaller
    pub batch_size: usize,
    /// Adam learning rate, shared by both networks
    pub learning_rate: f64,
    /// Adam first-moment decay
    pub beta1: f64,
    /// Adam second-moment decay
    pub beta2: f64,
    /// Seed for parameter init, latent draws and shuffling
    pub seed: u64,
    /// Device: "auto", "cpu" or "cuda"
    pub device: String,
}

/// Data-related configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding the IDX files
    pub dir: String,
    /// Fetch missing files on first use
    pub download: bool,
    /// Mirror serving `<name>.gz`
    pub base_url: String,
}

/// Reporting-related configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Emit a progress line every N batches
    pub log_every: usize,
    /// Write a sample grid every N epochs
    pub snapshot_every: usize,
    /// Images per sample grid
    pub snapshot_samples: i64,
    /// Images per grid row
    pub grid_columns: i64,
    /// Directory for sample grids
    pub sample_dir: String,
    /// Directory for the saved generator
    pub output_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: ModelConfig {
                latent_dim: 100,
                hidden_dim: 256,
                image_size: 28,
                channels: 1,
                leaky_slope: 0.2,
            },
            training: TrainingConfig {
                epochs: 50,
                batch_size: 64,
                learning_rate: 2e-4,
                beta1: 0.5,
                beta2: 0.999,
                seed: 42,
                device: "auto".to_string(),
            },
            data: DataConfig {
                dir: "data/mnist".to_string(),
                download: true,
                base_url: "https://ossci-datasets.s3.amazonaws.com/mnist".to_string(),
            },
            report: ReportConfig {
                log_every: 200,
                snapshot_every: 10,
                snapshot_samples: 16,
                grid_columns: 4,
                sample_dir: "images".to_string(),
                output_dir: ".".to_string(),
            },
        }
    }
}

impl Config {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from TOML file
    pub fn from_toml(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_toml(&self, path: &str) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from JSON file
    pub fn from_json(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn save_json(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from `path`, picking the format by extension.
    ///
    /// A missing file yields the defaults.
    pub fn load_or_default(path: &str) -> anyhow::Result<Self> {
        if !Path::new(path).exists() {
            tracing::info!("Config file {} not found, using defaults", path);
            return Ok(Self::default());
        }
        let config = if path.ends_with(".toml") {
            Self::from_toml(path)?
        } else {
            Self::from_json(path)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Get device from configuration
    pub fn get_device(&self) -> tch::Device {
        match self.training.device.to_lowercase().as_str() {
            "cpu" => tch::Device::Cpu,
            "cuda" | "gpu" => {
                if tch::Cuda::is_available() {
                    tch::Device::Cuda(0)
                } else {
                    tracing::warn!("CUDA requested but not available, falling back to CPU");
                    tch::Device::Cpu
                }
            }
            _ => tch::Device::cuda_if_available(),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        let m = &self.model;
        if m.latent_dim <= 0 || m.hidden_dim <= 0 || m.image_size <= 0 || m.channels <= 0 {
            anyhow::bail!("Model dimensions must be > 0");
        }
        let t = &self.training;
        if t.epochs == 0 {
            anyhow::bail!("Number of epochs must be > 0");
        }
        if t.batch_size == 0 {
            anyhow::bail!("Batch size must be > 0");
        }
        if t.learning_rate <= 0.0 {
            anyhow::bail!("Learning rate must be > 0");
        }
        if !(0.0..1.0).contains(&t.beta1) || !(0.0..1.0).contains(&t.beta2) {
            anyhow::bail!("Adam betas must lie in [0, 1)");
        }
        let r = &self.report;
        if r.log_every == 0 || r.snapshot_every == 0 {
            anyhow::bail!("Reporting cadences must be > 0");
        }
        if r.snapshot_samples <= 0 || r.grid_columns <= 0 {
            anyhow::bail!("Snapshot sample count and grid columns must be > 0");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.model.latent_dim, 100);
        assert_eq!(config.model.hidden_dim, 256);
        assert_eq!(config.model.image_dim(), 784);
        assert_eq!(config.model.image_shape(), [1, 28, 28]);
        assert_eq!(config.training.epochs, 50);
        assert_eq!(config.training.batch_size, 64);
        assert_eq!(config.training.learning_rate, 0.0002);
        assert_eq!(config.training.beta1, 0.5);
        assert_eq!(config.training.beta2, 0.999);
        assert_eq!(config.training.seed, 42);
        assert_eq!(config.report.log_every, 200);
        assert_eq!(config.report.snapshot_every, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_toml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gan.toml");
        let path = path.to_str().unwrap();

        let mut config = Config::default();
        config.training.epochs = 3;
        config.save_toml(path).unwrap();

        let loaded = Config::load_or_default(path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let loaded = Config::load_or_default("/nonexistent/gan.json").unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.training.batch_size = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.training.beta1 = 1.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.report.log_every = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cpu_device() {
        let mut config = Config::default();
        config.training.device = "cpu".to_string();
        assert_eq!(config.get_device(), tch::Device::Cpu);
    }
}
