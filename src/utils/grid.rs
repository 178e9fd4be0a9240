//! Image-grid rendering for generated samples

use anyhow::{Context, Result};
use std::path::Path;
use tch::{Device, Kind, Tensor};

/// Pixels of zero padding between and around grid cells
pub const GRID_PADDING: i64 = 2;

/// Arrange a `[N, 1, H, W]` batch into a single `[rows, cols]` grid in [0, 1]
///
/// Values are min-max normalized over the whole batch first. Cells are laid
/// out `columns` per row, left to right then top to bottom.
pub fn make_grid(images: &Tensor, columns: i64, padding: i64) -> Tensor {
    tch::no_grad(|| {
        let images = images.detach().to_device(Device::Cpu).to_kind(Kind::Float);
        let size = images.size();
        let (n, h, w) = (size[0], size[2], size[3]);

        let lo = images.min().double_value(&[]);
        let hi = images.max().double_value(&[]);
        let images = (images - lo) / (hi - lo).max(1e-5);

        let xmaps = columns.min(n).max(1);
        let ymaps = (n + xmaps - 1) / xmaps;
        let cell_h = h + padding;
        let cell_w = w + padding;
        let grid = Tensor::zeros(
            [ymaps * cell_h + padding, xmaps * cell_w + padding],
            (Kind::Float, Device::Cpu),
        );

        for k in 0..n {
            let (y, x) = (k / xmaps, k % xmaps);
            let mut cell = grid
                .narrow(0, y * cell_h + padding, h)
                .narrow(1, x * cell_w + padding, w);
            cell.copy_(&images.get(k).get(0));
        }
        grid
    })
}

/// Render `images` as a grayscale PNG grid at `path`
pub fn save_grid<P: AsRef<Path>>(images: &Tensor, columns: i64, path: P) -> Result<()> {
    let path = path.as_ref();
    let grid = make_grid(images, columns, GRID_PADDING);
    let (height, width) = (grid.size()[0] as u32, grid.size()[1] as u32);

    let bytes = (grid * 255.0 + 0.5).clamp(0.0, 255.0).to_kind(Kind::Uint8);
    let bytes = Vec::<u8>::try_from(bytes.flatten(0, -1))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    image::GrayImage::from_raw(width, height, bytes)
        .context("Grid buffer does not match its dimensions")?
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
