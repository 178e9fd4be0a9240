//! Adversarial training loop
//!
//! Each step runs, strictly in order:
//! 1. score real images against the real label
//! 2. score a fresh fake batch, detached from the generator, against the fake label
//! 3. update the discriminator on the mean of both losses
//! 4. re-score the same fake batch with gradients intact, through the updated
//!    discriminator, against the real label
//! 5. update the generator
//!
//! The discriminator update must happen before the generator re-scores the
//! fake batch; swapping them changes training dynamics.

use anyhow::{bail, Context, Result};
use tch::{nn, Tensor};
use tracing::{debug, info, warn};

use super::losses::{bce_loss, discriminator_loss, Labels};
use super::metrics::{EpochAccumulator, StepLosses, TrainingMetrics};
use super::reporter::{BatchProgress, Reporter};
use crate::data::{DataLoader, LatentSampler};
use crate::model::Gan;
use crate::utils::config::TrainingConfig;

/// Generated images shared by both halves of a step
///
/// The same batch is shown to the discriminator with its graph severed and
/// to the generator loss with its graph intact.
#[derive(Debug)]
pub struct FakeBatch {
    images: Tensor,
}

impl FakeBatch {
    pub fn new(images: Tensor) -> Self {
        Self { images }
    }

    /// View with gradient tracking severed
    pub fn detached(&self) -> Tensor {
        self.images.detach()
    }

    /// View whose gradients flow back into the generator
    pub fn tracked(&self) -> &Tensor {
        &self.images
    }

    pub fn batch_size(&self) -> i64 {
        self.images.size()[0]
    }
}

/// Owns the model and both optimizers for the length of a run
pub struct AdversarialTrainer {
    config: TrainingConfig,
    gan: Gan,
    gen_opt: nn::Optimizer,
    disc_opt: nn::Optimizer,
    sampler: LatentSampler,
    metrics: TrainingMetrics,
}

impl AdversarialTrainer {
    /// Create a new trainer with Adam optimizers for each network
    pub fn new(gan: Gan, config: &TrainingConfig) -> Result<Self> {
        let gen_opt = gan.gen_optimizer(config)?;
        let disc_opt = gan.disc_optimizer(config)?;
        let sampler = LatentSampler::new(gan.latent_dim(), gan.device);

        Ok(Self {
            config: config.clone(),
            gan,
            gen_opt,
            disc_opt,
            sampler,
            metrics: TrainingMetrics::new(),
        })
    }

    /// Draw a latent batch and generate from it, keeping the graph
    pub fn fake_batch(&self, batch_size: i64) -> Result<FakeBatch> {
        let z = self.sampler.sample(batch_size);
        Ok(FakeBatch::new(self.gan.generator.generate(&z)?))
    }

    /// Phases 1-3: score real and detached fake images, update the discriminator
    ///
    /// Returns the discriminator loss.
    pub fn discriminator_phase(
        &mut self,
        real: &Tensor,
        fake: &FakeBatch,
        labels: &Labels,
    ) -> Result<f64> {
        let real_loss = bce_loss(&self.gan.discriminate(real), &labels.real)
            .context("discriminator loss on real images")?;
        let fake_loss = bce_loss(&self.gan.discriminate(&fake.detached()), &labels.fake)
            .context("discriminator loss on fake images")?;
        let d_loss = discriminator_loss(&real_loss, &fake_loss);
        let value = finite(&d_loss, "discriminator")?;

        self.disc_opt.zero_grad();
        d_loss.backward();
        self.disc_opt.step();
        self.metrics.disc_updates += 1;

        Ok(value)
    }

    /// Phases 4-5: re-score the tracked fake batch against the real label,
    /// update the generator
    ///
    /// Returns the generator loss.
    pub fn generator_phase(&mut self, fake: &FakeBatch, labels: &Labels) -> Result<f64> {
        let g_loss = bce_loss(&self.gan.discriminate(fake.tracked()), &labels.real)
            .context("generator loss")?;
        let value = finite(&g_loss, "generator")?;

        self.gen_opt.zero_grad();
        g_loss.backward();
        self.gen_opt.step();
        self.metrics.gen_updates += 1;

        Ok(value)
    }

    /// One full adversarial step on a batch of real images
    pub fn step(&mut self, real: &Tensor) -> Result<StepLosses> {
        let batch_size = real.size()[0];
        let labels = Labels::for_batch(batch_size, self.gan.device);

        let fake = self.fake_batch(batch_size)?;
        let d_loss = self.discriminator_phase(real, &fake, &labels)?;
        let g_loss = self.generator_phase(&fake, &labels)?;

        let losses = StepLosses { d_loss, g_loss };
        self.metrics.last_step = Some(losses);
        Ok(losses)
    }

    /// One pass over the loader
    pub fn train_epoch(
        &mut self,
        epoch: usize,
        loader: &mut DataLoader,
        reporter: &Reporter,
    ) -> Result<EpochAccumulator> {
        let total_batches = loader.num_batches();
        let mut acc = EpochAccumulator::default();

        for (batch_idx, batch) in loader.iter().enumerate() {
            let real = batch.to_tensor(self.gan.device)?;
            let losses = self
                .step(&real)
                .with_context(|| format!("epoch {} batch {}", epoch, batch_idx))?;
            acc.push(losses);

            reporter.on_batch(&BatchProgress {
                epoch,
                total_epochs: self.config.epochs,
                batch: batch_idx,
                total_batches,
                d_loss: losses.d_loss,
                g_loss: losses.g_loss,
            });
        }

        Ok(acc)
    }

    /// Train for the configured number of epochs
    ///
    /// Sample grids are written on the reporter's cadence and once more at
    /// the end. Persisting the generator is left to the caller.
    pub fn train(
        &mut self,
        loader: &mut DataLoader,
        reporter: &Reporter,
    ) -> Result<&TrainingMetrics> {
        info!(
            "Starting training for {} epochs, {} batches per epoch",
            self.config.epochs,
            loader.num_batches()
        );

        for epoch in 0..self.config.epochs {
            let acc = self.train_epoch(epoch, loader, reporter)?;
            self.metrics.record_epoch(&acc);

            let (d_mean, g_mean) = acc.means();
            info!(
                "Epoch {}/{} done: mean D_loss={:.4}, mean G_loss={:.4} over {} batches",
                epoch,
                self.config.epochs,
                d_mean,
                g_mean,
                acc.steps()
            );

            if self.metrics.check_mode_collapse(10) {
                warn!("Possible mode collapse: discriminator loss near zero, generator loss high");
            }

            if let Some(path) = reporter.on_epoch_end(epoch, &self.gan)? {
                debug!("Epoch {} snapshot at {}", epoch, path.display());
            }
        }

        reporter.finish(&self.gan)?;
        Ok(&self.metrics)
    }

    /// Get training metrics
    pub fn metrics(&self) -> &TrainingMetrics {
        &self.metrics
    }

    pub fn gan(&self) -> &Gan {
        &self.gan
    }

    /// Get configuration
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }
}

/// Scalar value of `loss`, or an error naming the phase if it is NaN or infinite
fn finite(loss: &Tensor, phase: &str) -> Result<f64> {
    let value = loss.double_value(&[]);
    if !value.is_finite() {
        bail!("{} loss is not finite ({})", phase, value);
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config::Config;
    use tch::{Device, Kind};

    fn trainer() -> AdversarialTrainer {
        let config = Config::default();
        let gan = Gan::new(&config.model, Device::Cpu);
        AdversarialTrainer::new(gan, &config.training).unwrap()
    }

    #[test]
    fn test_fake_batch_views() {
        let trainer = trainer();
        let fake = trainer.fake_batch(4).unwrap();
        assert_eq!(fake.batch_size(), 4);
        assert!(fake.tracked().requires_grad());
        assert!(!fake.detached().requires_grad());
    }

    #[test]
    fn test_step_counts_updates() {
        let mut trainer = trainer();
        let real = Tensor::rand([8, 1, 28, 28], (Kind::Float, Device::Cpu)) * 2.0 - 1.0;

        let losses = trainer.step(&real).unwrap();
        assert!(losses.d_loss.is_finite() && losses.d_loss > 0.0);
        assert!(losses.g_loss.is_finite() && losses.g_loss > 0.0);
        assert_eq!(trainer.metrics().disc_updates, 1);
        assert_eq!(trainer.metrics().gen_updates, 1);
        assert_eq!(trainer.metrics().last_step, Some(losses));
    }

    #[test]
    fn test_nan_loss_is_an_error() {
        let nan = Tensor::scalar_tensor(f64::NAN, (Kind::Float, Device::Cpu));
        assert!(finite(&nan, "generator").is_err());
        let ok = Tensor::scalar_tensor(0.5, (Kind::Float, Device::Cpu));
        assert_eq!(finite(&ok, "generator").unwrap(), 0.5);
    }

    #[test]
    fn test_nan_real_batch_fails_before_any_update() {
        let mut trainer = trainer();
        let real = Tensor::full([4, 1, 28, 28], f64::NAN, (Kind::Float, Device::Cpu));

        let err = trainer.step(&real).unwrap_err();
        assert!(format!("{:#}", err).contains("discriminator"));
        assert_eq!(trainer.metrics().disc_updates, 0);
        assert_eq!(trainer.metrics().gen_updates, 0);
        assert!(trainer.metrics().last_step.is_none());
    }
}
