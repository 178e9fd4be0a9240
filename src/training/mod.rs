//! Training module for the GAN
//!
//! This module provides:
//! - The adversarial step and epoch loop
//! - Loss functions (Binary Cross Entropy) and label tensors
//! - Loss history and update counters
//! - Console and sample-grid reporting

mod trainer;
mod losses;
mod metrics;
mod reporter;

pub use trainer::{AdversarialTrainer, FakeBatch};
pub use losses::{bce_loss, discriminator_loss, Labels};
pub use metrics::{EpochAccumulator, StepLosses, TrainingMetrics};
pub use reporter::{BatchProgress, Reporter};
