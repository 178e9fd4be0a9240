//! Artifacts that outlive a run
//!
//! A run leaves behind sample-grid PNGs and the trained generator weights.
//! The discriminator and optimizer state are discarded.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tch::Device;

use crate::model::Gan;
use crate::utils::config::ModelConfig;

/// File name of the saved generator weights
pub const GENERATOR_FILE: &str = "generator.pt";

/// Where the generator weights go under `output_dir`
pub fn generator_path(output_dir: &str) -> PathBuf {
    Path::new(output_dir).join(GENERATOR_FILE)
}

/// Sample grid path for a 0-based epoch index
pub fn epoch_snapshot_path(sample_dir: &str, epoch: usize) -> PathBuf {
    Path::new(sample_dir).join(format!("epoch_{}.png", epoch))
}

/// Sample grid path written after training completes
pub fn final_snapshot_path(sample_dir: &str) -> PathBuf {
    Path::new(sample_dir).join("final.png")
}

/// Save the generator parameters to `<output_dir>/generator.pt`
pub fn save_generator(gan: &Gan, output_dir: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir))?;
    let path = generator_path(output_dir);
    gan.save_generator(&path)
        .with_context(|| format!("Failed to save generator to {}", path.display()))?;
    tracing::info!("Saved generator to {}", path.display());
    Ok(path)
}

/// Build a model and restore generator weights from `path`
///
/// The discriminator keeps its fresh initialization.
pub fn load_generator(config: &ModelConfig, path: &Path, device: Device) -> Result<Gan> {
    let mut gan = Gan::new(config, device);
    gan.load_generator(path)
        .with_context(|| format!("Failed to load generator from {}", path.display()))?;
    tracing::info!("Loaded generator from {}", path.display());
    Ok(gan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config::Config;
    use tch::{Kind, Tensor};
    use tempfile::TempDir;

    #[test]
    fn test_generator_roundtrip_through_disk() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().to_str().unwrap();
        let config = Config::default().model;

        let gan = Gan::new(&config, Device::Cpu);
        let path = save_generator(&gan, out).unwrap();
        assert_eq!(path, generator_path(out));

        let restored = load_generator(&config, &path, Device::Cpu).unwrap();
        let z = Tensor::randn([3, 100], (Kind::Float, Device::Cpu));
        let a = gan.generator.generate(&z).unwrap();
        let b = restored.generator.generate(&z).unwrap();
        assert!(a.allclose(&b, 1e-6, 1e-6, false));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let config = Config::default().model;
        let path = Path::new("/nonexistent/generator.pt");
        assert!(load_generator(&config, path, Device::Cpu).is_err());
    }

    #[test]
    fn test_snapshot_names() {
        assert_eq!(epoch_snapshot_path("images", 10), PathBuf::from("images/epoch_10.png"));
        assert_eq!(final_snapshot_path("images"), PathBuf::from("images/final.png"));
    }
}
