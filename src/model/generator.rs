//! Generator network
//!
//! Maps a batch of latent vectors to a batch of single-channel images.
//! Two ReLU hidden layers, a linear projection to the flattened image
//! width, then `tanh` so every pixel lands in [-1, 1].

use anyhow::{bail, Result};
use tch::{nn, nn::Module, Device, Kind, Tensor};

use super::stack::{Stack, Stage};
use crate::utils::config::ModelConfig;

/// Generator network
#[derive(Debug)]
pub struct Generator {
    config: ModelConfig,
    net: Stack,
}

impl Generator {
    /// Create a new Generator with its parameters registered under `vs`
    pub fn new(vs: &nn::Path, config: &ModelConfig) -> Self {
        let net = Stack::new()
            .push(Stage::Linear(nn::linear(
                vs / "fc1",
                config.latent_dim,
                config.hidden_dim,
                Default::default(),
            )))
            .push(Stage::Relu)
            .push(Stage::Linear(nn::linear(
                vs / "fc2",
                config.hidden_dim,
                config.hidden_dim,
                Default::default(),
            )))
            .push(Stage::Relu)
            .push(Stage::Linear(nn::linear(
                vs / "fc3",
                config.hidden_dim,
                config.image_dim(),
                Default::default(),
            )))
            .push(Stage::Tanh)
            .push(Stage::Reshape(
                [-1].into_iter().chain(config.image_shape()).collect(),
            ));

        Self {
            config: config.clone(),
            net,
        }
    }

    /// Generate images from noise
    ///
    /// # Arguments
    ///
    /// * `z` - Tensor of shape (batch_size, latent_dim)
    ///
    /// # Returns
    ///
    /// Tensor of shape (batch_size, channels, image_size, image_size)
    pub fn generate(&self, z: &Tensor) -> Result<Tensor> {
        let size = z.size();
        if size.len() != 2 || size[1] != self.config.latent_dim {
            bail!(
                "latent batch must have shape [B, {}], got {:?}",
                self.config.latent_dim,
                size
            );
        }
        Ok(self.net.forward(z))
    }

    /// Draw `num_samples` latent vectors and generate from them
    pub fn generate_random(&self, num_samples: i64, device: Device) -> Result<Tensor> {
        let z = Tensor::randn([num_samples, self.config.latent_dim], (Kind::Float, device));
        self.generate(&z)
    }

    /// Stage list, first to last
    pub fn stages(&self) -> &Stack {
        &self.net
    }

    /// Get configuration
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }
}

impl Module for Generator {
    fn forward(&self, xs: &Tensor) -> Tensor {
        self.net.forward(xs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config::Config;
    use tch::nn::VarStore;

    fn generator(vs: &VarStore) -> Generator {
        Generator::new(&vs.root(), &Config::default().model)
    }

    #[test]
    fn test_generator_output_shape_and_range() {
        let vs = VarStore::new(Device::Cpu);
        let gen = generator(&vs);

        for batch in [1i64, 7, 64] {
            let z = Tensor::randn([batch, 100], (Kind::Float, Device::Cpu));
            let images = gen.generate(&z).unwrap();

            assert_eq!(images.size(), vec![batch, 1, 28, 28]);
            assert!(images.min().double_value(&[]) >= -1.0);
            assert!(images.max().double_value(&[]) <= 1.0);
        }
    }

    #[test]
    fn test_generator_stage_shapes() {
        let vs = VarStore::new(Device::Cpu);
        let gen = generator(&vs);
        let z = Tensor::randn([5, 100], (Kind::Float, Device::Cpu));

        let stack = gen.stages();
        assert_eq!(stack.len(), 7);
        assert_eq!(stack.forward_through(1, &z).size(), vec![5, 256]);
        assert_eq!(stack.forward_through(3, &z).size(), vec![5, 256]);
        assert_eq!(stack.forward_through(5, &z).size(), vec![5, 784]);
        assert_eq!(stack.forward_through(6, &z).size(), vec![5, 784]);
        assert_eq!(stack.forward_through(7, &z).size(), vec![5, 1, 28, 28]);
    }

    #[test]
    fn test_generator_rejects_wrong_latent_width() {
        let vs = VarStore::new(Device::Cpu);
        let gen = generator(&vs);
        let z = Tensor::randn([4, 99], (Kind::Float, Device::Cpu));
        assert!(gen.generate(&z).is_err());
    }
}
