//! DataLoader for batching and iterating over training images
//!
//! Provides batching for GAN training with support for:
//! - Seeded reshuffling at the start of every pass
//! - A smaller final batch when the dataset size is not a multiple of the batch size
//! - Iteration over batches

use anyhow::{Context, Result};
use ndarray::{Array1, Array3, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tch::{Device, Tensor};

use super::mnist::MnistImages;

/// One batch of real images with their (unused) labels
#[derive(Debug, Clone)]
pub struct Batch {
    /// (batch, rows, cols), values in [-1, 1]
    pub images: Array3<f32>,
    pub labels: Array1<u8>,
}

impl Batch {
    /// Number of images in this batch
    pub fn len(&self) -> usize {
        self.images.shape()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Images as a `[batch, 1, rows, cols]` float tensor on `device`
    pub fn to_tensor(&self, device: Device) -> Result<Tensor> {
        let shape = self.images.shape();
        let dims = [shape[0] as i64, 1, shape[1] as i64, shape[2] as i64];
        let images = self.images.as_standard_layout();
        let pixels = images
            .as_slice()
            .context("Batch images are not contiguous")?;
        Ok(Tensor::from_slice(pixels).view(dims).to_device(device))
    }
}

/// DataLoader for iterating over shuffled image batches
pub struct DataLoader {
    /// Full dataset of shape (num_images, rows, cols)
    images: Array3<f32>,
    labels: Array1<u8>,
    /// Batch size
    batch_size: usize,
    /// Whether to shuffle data each epoch
    shuffle: bool,
    /// Current indices for iteration
    indices: Vec<usize>,
    /// Current position in iteration
    current_idx: usize,
    rng: StdRng,
}

impl DataLoader {
    /// Create a new DataLoader
    ///
    /// # Arguments
    ///
    /// * `images` - 3D array of shape (num_images, rows, cols)
    /// * `labels` - one label per image
    /// * `batch_size` - Number of images per batch
    /// * `shuffle` - Whether to shuffle data each epoch
    /// * `seed` - Seed for the shuffling RNG
    pub fn new(
        images: Array3<f32>,
        labels: Array1<u8>,
        batch_size: usize,
        shuffle: bool,
        seed: u64,
    ) -> Self {
        let num_samples = images.shape()[0];
        Self {
            images,
            labels,
            batch_size: batch_size.max(1),
            shuffle,
            indices: (0..num_samples).collect(),
            current_idx: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Loader over the MNIST training split
    pub fn from_mnist(mnist: MnistImages, batch_size: usize, seed: u64) -> Self {
        Self::new(mnist.images, mnist.labels, batch_size, true, seed)
    }

    /// Get the number of batches per epoch, counting a final partial batch
    pub fn num_batches(&self) -> usize {
        self.num_samples().div_ceil(self.batch_size)
    }

    /// Get total number of samples
    pub fn num_samples(&self) -> usize {
        self.images.shape()[0]
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Reset for new epoch
    pub fn reset(&mut self) {
        self.current_idx = 0;
        if self.shuffle {
            self.indices.shuffle(&mut self.rng);
        }
    }

    /// Get next batch
    ///
    /// Returns None when epoch is complete
    pub fn next_batch(&mut self) -> Option<Batch> {
        let num_samples = self.indices.len();
        let start = self.current_idx;

        if start >= num_samples {
            return None;
        }

        let end = (start + self.batch_size).min(num_samples);
        let picked = &self.indices[start..end];

        let images = self.images.select(Axis(0), picked);
        let labels = self.labels.select(Axis(0), picked);

        self.current_idx = end;
        Some(Batch { images, labels })
    }

    /// Start a new pass and iterate over all of its batches
    pub fn iter(&mut self) -> DataLoaderIter<'_> {
        self.reset();
        DataLoaderIter { loader: self }
    }
}

/// Iterator adapter for DataLoader
pub struct DataLoaderIter<'a> {
    loader: &'a mut DataLoader,
}

impl<'a> Iterator for DataLoaderIter<'a> {
    type Item = Batch;

    fn next(&mut self) -> Option<Self::Item> {
        self.loader.next_batch()
    }
}
