//! Data module: the sample source for training
//!
//! This module provides:
//! - MNIST IDX parsing and first-use download
//! - DataLoader for shuffled batches of real images
//! - Latent noise sampling

mod mnist;
mod download;
mod loader;
mod latent;

pub use mnist::{normalize_pixel, MnistImages, TRAIN_IMAGES, TRAIN_LABELS};
pub use download::MnistDownloader;
pub use loader::{Batch, DataLoader, DataLoaderIter};
pub use latent::LatentSampler;
