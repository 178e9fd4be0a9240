//! GAN wrapper combining Generator and Discriminator
//!
//! Each network owns a separate `VarStore`, so an optimizer built from one
//! store can never touch the other network's parameters.

use anyhow::{bail, Result};
use std::path::Path;
use tch::{nn, nn::OptimizerConfig, nn::VarStore, Device, Tensor};

use super::discriminator::Discriminator;
use super::generator::Generator;
use crate::utils::config::{ModelConfig, TrainingConfig};

/// Generator and discriminator with their parameter stores
pub struct Gan {
    /// Generator network
    pub generator: Generator,
    /// Discriminator network
    pub discriminator: Discriminator,
    /// Variable store for generator
    pub gen_vs: VarStore,
    /// Variable store for discriminator
    pub disc_vs: VarStore,
    /// Device (CPU/GPU)
    pub device: Device,
}

impl Gan {
    /// Create both networks on `device`
    pub fn new(config: &ModelConfig, device: Device) -> Self {
        let gen_vs = VarStore::new(device);
        let disc_vs = VarStore::new(device);

        let generator = Generator::new(&gen_vs.root(), config);
        let discriminator = Discriminator::new(&disc_vs.root(), config);

        Self {
            generator,
            discriminator,
            gen_vs,
            disc_vs,
            device,
        }
    }

    /// Generate `num_samples` images from fresh latent draws
    pub fn generate(&self, num_samples: i64) -> Result<Tensor> {
        if num_samples < 1 {
            bail!("Sample count must be positive, got {}", num_samples);
        }
        self.generator.generate_random(num_samples, self.device)
    }

    /// Probability of being real
    pub fn discriminate(&self, images: &Tensor) -> Tensor {
        self.discriminator.discriminate(images)
    }

    /// Generator optimizer: Adam over generator parameters only
    pub fn gen_optimizer(&self, config: &TrainingConfig) -> Result<nn::Optimizer> {
        Ok(adam(config).build(&self.gen_vs, config.learning_rate)?)
    }

    /// Discriminator optimizer: Adam over discriminator parameters only
    pub fn disc_optimizer(&self, config: &TrainingConfig) -> Result<nn::Optimizer> {
        Ok(adam(config).build(&self.disc_vs, config.learning_rate)?)
    }

    /// Save generator weights
    pub fn save_generator<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.gen_vs.save(path)?;
        Ok(())
    }

    /// Load generator weights
    pub fn load_generator<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.gen_vs.load(path)?;
        Ok(())
    }

    /// Get latent dimension
    pub fn latent_dim(&self) -> i64 {
        self.generator.config().latent_dim
    }
}

fn adam(config: &TrainingConfig) -> nn::Adam {
    nn::Adam {
        beta1: config.beta1,
        beta2: config.beta2,
        wd: 0.0,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config::Config;

    #[test]
    fn test_gan_parameter_stores_are_disjoint() {
        let gan = Gan::new(&Config::default().model, Device::Cpu);

        let gen_vars = gan.gen_vs.trainable_variables();
        let disc_vars = gan.disc_vs.trainable_variables();
        // three linear layers each, weight + bias
        assert_eq!(gen_vars.len(), 6);
        assert_eq!(disc_vars.len(), 6);
        for g in &gen_vars {
            for d in &disc_vars {
                assert_ne!(g.data_ptr(), d.data_ptr());
            }
        }
    }

    #[test]
    fn test_gan_generate() {
        let gan = Gan::new(&Config::default().model, Device::Cpu);
        let samples = gan.generate(4).unwrap();
        assert_eq!(samples.size(), vec![4, 1, 28, 28]);
        assert_eq!(gan.discriminate(&samples).size(), vec![4, 1]);
        assert!(gan.generate(0).is_err());
        assert!(gan.generate(-3).is_err());
    }

    #[test]
    fn test_optimizers_build() {
        let config = Config::default();
        let gan = Gan::new(&config.model, Device::Cpu);
        assert!(gan.gen_optimizer(&config.training).is_ok());
        assert!(gan.disc_optimizer(&config.training).is_ok());
    }
}
