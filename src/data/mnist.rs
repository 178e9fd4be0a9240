//! MNIST training split in IDX format
//!
//! Files may be stored raw or gzip-compressed. Pixels are normalized to
//! [-1, 1] at load time.

use anyhow::{anyhow, bail, Context, Result};
use byteorder::{BigEndian, ReadBytesExt};
use flate2::read::GzDecoder;
use ndarray::{Array1, Array3};
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

/// Training images file name (without `.gz`)
pub const TRAIN_IMAGES: &str = "train-images-idx3-ubyte";
/// Training labels file name (without `.gz`)
pub const TRAIN_LABELS: &str = "train-labels-idx1-ubyte";

const IMAGES_MAGIC: i32 = 2051;
const LABELS_MAGIC: i32 = 2049;

/// Raw IDX payload: dimension sizes plus the byte body
#[derive(Debug)]
struct IdxData {
    sizes: Vec<usize>,
    data: Vec<u8>,
}

impl IdxData {
    fn read(path: &Path, expected_magic: i32) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let mut contents = Vec::new();
        if path.extension().is_some_and(|ext| ext == "gz") {
            GzDecoder::new(file)
                .read_to_end(&mut contents)
                .with_context(|| format!("Gzip read error in {}", path.display()))?;
        } else {
            let mut file = file;
            file.read_to_end(&mut contents)?;
        }

        let mut r = Cursor::new(&contents);
        let magic = r.read_i32::<BigEndian>().context("Read magic")?;
        if magic != expected_magic {
            bail!("Invalid magic {} in {} (expected {})", magic, path.display(), expected_magic);
        }
        let num_dims = if magic == IMAGES_MAGIC { 3 } else { 1 };
        let mut sizes = Vec::with_capacity(num_dims);
        for _ in 0..num_dims {
            sizes.push(r.read_u32::<BigEndian>().context("Read dimension size")? as usize);
        }

        let mut data = Vec::new();
        r.read_to_end(&mut data)?;
        let expected = sizes
            .iter()
            .try_fold(1usize, |acc, &size| acc.checked_mul(size))
            .ok_or_else(|| anyhow!("{} has an oversized header {:?}", path.display(), sizes))?;
        if data.len() < expected {
            bail!("{} is truncated: {} of {} bytes", path.display(), data.len(), expected);
        }
        data.truncate(expected);
        Ok(Self { sizes, data })
    }
}

/// Path of `name` in `dir`, preferring the raw file over `name.gz`
pub fn locate(dir: &Path, name: &str) -> Option<PathBuf> {
    let raw = dir.join(name);
    if raw.is_file() {
        return Some(raw);
    }
    let gz = dir.join(format!("{}.gz", name));
    gz.is_file().then_some(gz)
}

/// Map a raw pixel byte to [-1, 1]
pub fn normalize_pixel(p: u8) -> f32 {
    p as f32 / 127.5 - 1.0
}

/// The training split, normalized
#[derive(Debug, Clone)]
pub struct MnistImages {
    /// (num_images, rows, cols), values in [-1, 1]
    pub images: Array3<f32>,
    /// Digit labels; unused by training
    pub labels: Array1<u8>,
}

impl MnistImages {
    /// Load the training split from `dir`
    pub fn load(dir: &Path) -> Result<Self> {
        let images_path = locate(dir, TRAIN_IMAGES)
            .ok_or_else(|| anyhow!("{} not found in {}", TRAIN_IMAGES, dir.display()))?;
        let labels_path = locate(dir, TRAIN_LABELS)
            .ok_or_else(|| anyhow!("{} not found in {}", TRAIN_LABELS, dir.display()))?;

        let images = IdxData::read(&images_path, IMAGES_MAGIC)?;
        let labels = IdxData::read(&labels_path, LABELS_MAGIC)?;
        if images.sizes[0] != labels.sizes[0] {
            bail!(
                "Image/label count mismatch: {} images, {} labels",
                images.sizes[0],
                labels.sizes[0]
            );
        }

        let pixels: Vec<f32> = images.data.iter().map(|&p| normalize_pixel(p)).collect();
        let shape = (images.sizes[0], images.sizes[1], images.sizes[2]);
        let images = Array3::from_shape_vec(shape, pixels)?;

        tracing::info!(
            "Loaded {} training images of {}x{} from {}",
            shape.0,
            shape.1,
            shape.2,
            dir.display()
        );

        Ok(Self {
            images,
            labels: Array1::from_vec(labels.data),
        })
    }

    pub fn len(&self) -> usize {
        self.images.shape()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
