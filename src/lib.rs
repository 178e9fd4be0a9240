//! # GAN for Handwritten Digits
//!
//! This crate provides a minimal fully-connected Generative Adversarial
//! Network trained on the MNIST training split.
//!
//! ## Modules
//!
//! - `data`: Dataset loading, download and batching, latent noise
//! - `model`: Generator and Discriminator built from stage lists
//! - `training`: Adversarial step, epoch loop, losses and reporting
//! - `utils`: Configuration, sample grids and saved weights

pub mod data;
pub mod model;
pub mod training;
pub mod utils;

pub use data::{Batch, DataLoader, LatentSampler, MnistDownloader, MnistImages};
pub use model::{Discriminator, Gan, Generator, Stack, Stage};
pub use training::{AdversarialTrainer, FakeBatch, Labels, Reporter, StepLosses, TrainingMetrics};
pub use utils::{load_generator, save_generator, Config};
