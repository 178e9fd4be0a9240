//! Discriminator network
//!
//! Scores each image with the probability that it came from the dataset.

use tch::{nn, nn::Module, Tensor};

use super::stack::{Stack, Stage};
use crate::utils::config::ModelConfig;

/// Discriminator network
///
/// Architecture:
/// 1. Flatten to `image_dim` features
/// 2. Two Linear + LeakyReLU(0.2) hidden layers
/// 3. Linear to one unit, then sigmoid
#[derive(Debug)]
pub struct Discriminator {
    config: ModelConfig,
    net: Stack,
}

impl Discriminator {
    /// Create a new Discriminator with its parameters registered under `vs`
    pub fn new(vs: &nn::Path, config: &ModelConfig) -> Self {
        let net = Stack::new()
            .push(Stage::Flatten)
            .push(Stage::Linear(nn::linear(
                vs / "fc1",
                config.image_dim(),
                config.hidden_dim,
                Default::default(),
            )))
            .push(Stage::LeakyRelu(config.leaky_slope))
            .push(Stage::Linear(nn::linear(
                vs / "fc2",
                config.hidden_dim,
                config.hidden_dim,
                Default::default(),
            )))
            .push(Stage::LeakyRelu(config.leaky_slope))
            .push(Stage::Linear(nn::linear(
                vs / "fc3",
                config.hidden_dim,
                1,
                Default::default(),
            )))
            .push(Stage::Sigmoid);

        Self {
            config: config.clone(),
            net,
        }
    }

    /// Probability of being real for each image, shape (batch_size, 1)
    pub fn discriminate(&self, images: &Tensor) -> Tensor {
        self.net.forward(images)
    }

    pub fn stages(&self) -> &Stack {
        &self.net
    }

    /// Get configuration
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }
}

impl Module for Discriminator {
    fn forward(&self, xs: &Tensor) -> Tensor {
        self.discriminate(xs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config::Config;
    use tch::{nn::VarStore, Device, Kind};

    #[test]
    fn test_discriminator_output_shape_and_range() {
        let vs = VarStore::new(Device::Cpu);
        let disc = Discriminator::new(&vs.root(), &Config::default().model);

        for batch in [1i64, 5, 64] {
            let images = Tensor::rand([batch, 1, 28, 28], (Kind::Float, Device::Cpu)) * 2.0 - 1.0;
            let probs = disc.discriminate(&images);

            assert_eq!(probs.size(), vec![batch, 1]);
            assert!(probs.min().double_value(&[]) > 0.0);
            assert!(probs.max().double_value(&[]) < 1.0);
        }
    }

    #[test]
    fn test_discriminator_is_idempotent() {
        let vs = VarStore::new(Device::Cpu);
        let disc = Discriminator::new(&vs.root(), &Config::default().model);
        let images = Tensor::randn([8, 1, 28, 28], (Kind::Float, Device::Cpu)).tanh();

        let first = disc.discriminate(&images);
        let second = disc.discriminate(&images);
        assert!(first.equal(&second));
    }

    #[test]
    fn test_discriminator_stage_shapes() {
        let vs = VarStore::new(Device::Cpu);
        let disc = Discriminator::new(&vs.root(), &Config::default().model);
        let images = Tensor::zeros([3, 1, 28, 28], (Kind::Float, Device::Cpu));

        let stack = disc.stages();
        assert_eq!(stack.forward_through(1, &images).size(), vec![3, 784]);
        assert_eq!(stack.forward_through(3, &images).size(), vec![3, 256]);
        assert_eq!(stack.forward_through(5, &images).size(), vec![3, 256]);
        assert_eq!(stack.forward_through(6, &images).size(), vec![3, 1]);
    }
}
