//! Progress lines and periodic sample grids

use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

use crate::model::Gan;
use crate::utils::config::ReportConfig;
use crate::utils::{epoch_snapshot_path, final_snapshot_path, save_grid};

/// Position and losses of the batch just trained
#[derive(Debug, Clone, Copy)]
pub struct BatchProgress {
    /// 0-based epoch
    pub epoch: usize,
    pub total_epochs: usize,
    /// 0-based batch within the epoch
    pub batch: usize,
    pub total_batches: usize,
    pub d_loss: f64,
    pub g_loss: f64,
}

impl BatchProgress {
    pub fn line(&self) -> String {
        format!(
            "[Epoch {}/{}] [Batch {}/{}] [D loss: {:.4}] [G loss: {:.4}]",
            self.epoch, self.total_epochs, self.batch, self.total_batches, self.d_loss, self.g_loss
        )
    }
}

/// Observes training and emits console lines and sample grids
#[derive(Debug, Clone)]
pub struct Reporter {
    config: ReportConfig,
}

impl Reporter {
    pub fn new(config: &ReportConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn should_log(&self, batch: usize) -> bool {
        batch % self.config.log_every == 0
    }

    pub fn should_snapshot(&self, epoch: usize) -> bool {
        epoch % self.config.snapshot_every == 0
    }

    /// Log a progress line when the batch index hits the cadence
    pub fn on_batch(&self, progress: &BatchProgress) {
        if self.should_log(progress.batch) {
            info!("{}", progress.line());
        }
    }

    /// Write `epoch_<epoch>.png` when the epoch hits the cadence
    pub fn on_epoch_end(&self, epoch: usize, gan: &Gan) -> Result<Option<PathBuf>> {
        if !self.should_snapshot(epoch) {
            return Ok(None);
        }
        let path = epoch_snapshot_path(&self.config.sample_dir, epoch);
        self.snapshot(gan, &path)?;
        Ok(Some(path))
    }

    /// Write `final.png` after training
    pub fn finish(&self, gan: &Gan) -> Result<PathBuf> {
        let path = final_snapshot_path(&self.config.sample_dir);
        self.snapshot(gan, &path)?;
        Ok(path)
    }

    fn snapshot(&self, gan: &Gan, path: &std::path::Path) -> Result<()> {
        let samples = tch::no_grad(|| gan.generate(self.config.snapshot_samples))?;
        save_grid(&samples, self.config.grid_columns, path)?;
        info!("Saved samples to {}", path.display());
        Ok(())
    }
}
