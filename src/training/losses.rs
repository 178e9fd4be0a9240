//! Loss functions for GAN training
//!
//! Binary cross entropy on discriminator probabilities, plus the per-batch
//! real/fake label tensors.

use anyhow::Result;
use tch::{Device, Kind, Reduction, Tensor};

/// Target labels for one batch
///
/// Built from the actual batch size, so the final partial batch of an
/// epoch gets matching shapes.
#[derive(Debug)]
pub struct Labels {
    /// All ones, shape (batch, 1)
    pub real: Tensor,
    /// All zeros, shape (batch, 1)
    pub fake: Tensor,
}

impl Labels {
    pub fn for_batch(batch_size: i64, device: Device) -> Self {
        Self {
            real: Tensor::ones([batch_size, 1], (Kind::Float, device)),
            fake: Tensor::zeros([batch_size, 1], (Kind::Float, device)),
        }
    }

    pub fn batch_size(&self) -> i64 {
        self.real.size()[0]
    }
}

/// Mean binary cross entropy between probabilities and targets
///
/// # Arguments
///
/// * `probs` - Discriminator output, shape (batch, 1), values in (0, 1)
/// * `targets` - Labels of the same shape
///
/// # Returns
///
/// Scalar loss tensor, or an error if any probability is outside [0, 1] (NaN included)
pub fn bce_loss(probs: &Tensor, targets: &Tensor) -> Result<Tensor> {
    Ok(probs.f_binary_cross_entropy::<Tensor>(targets, None, Reduction::Mean)?)
}

/// Discriminator loss: mean of the real-phase and fake-phase losses
pub fn discriminator_loss(real_loss: &Tensor, fake_loss: &Tensor) -> Tensor {
    (real_loss + fake_loss) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_match_batch_size() {
        for batch in [64i64, 17, 1] {
            let labels = Labels::for_batch(batch, Device::Cpu);
            assert_eq!(labels.real.size(), vec![batch, 1]);
            assert_eq!(labels.fake.size(), vec![batch, 1]);
            assert_eq!(labels.real.sum(Kind::Float).double_value(&[]), batch as f64);
            assert_eq!(labels.fake.abs().sum(Kind::Float).double_value(&[]), 0.0);
            assert_eq!(labels.batch_size(), batch);
        }
    }

    #[test]
    fn test_bce_known_value() {
        let probs = Tensor::full([4, 1], 0.5, (Kind::Float, Device::Cpu));
        let labels = Labels::for_batch(4, Device::Cpu);

        let loss = bce_loss(&probs, &labels.real).unwrap();
        assert_eq!(loss.size(), Vec::<i64>::new());
        assert!((loss.double_value(&[]) - std::f64::consts::LN_2).abs() < 1e-6);
    }

    #[test]
    fn test_perfect_discriminator() {
        let labels = Labels::for_batch(4, Device::Cpu);
        let real = Tensor::full([4, 1], 0.999, (Kind::Float, Device::Cpu));
        let fake = Tensor::full([4, 1], 0.001, (Kind::Float, Device::Cpu));

        let loss = discriminator_loss(
            &bce_loss(&real, &labels.real).unwrap(),
            &bce_loss(&fake, &labels.fake).unwrap(),
        );
        assert!(loss.double_value(&[]) < 0.01);
    }

    #[test]
    fn test_nan_probabilities_are_an_error() {
        let probs = Tensor::full([4, 1], f64::NAN, (Kind::Float, Device::Cpu));
        let labels = Labels::for_batch(4, Device::Cpu);
        assert!(bce_loss(&probs, &labels.real).is_err());
    }

    #[test]
    fn test_discriminator_loss_is_mean() {
        let a = Tensor::scalar_tensor(1.0, (Kind::Float, Device::Cpu));
        let b = Tensor::scalar_tensor(3.0, (Kind::Float, Device::Cpu));
        assert_eq!(discriminator_loss(&a, &b).double_value(&[]), 2.0);
    }
}
