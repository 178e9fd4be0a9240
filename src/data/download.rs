//! First-use download of the MNIST training split
//!
//! Files are stored gzip-compressed exactly as served; [`super::mnist`]
//! decodes them on load.

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::info;

use super::mnist::{locate, TRAIN_IMAGES, TRAIN_LABELS};

/// Downloads missing IDX files from a mirror
#[derive(Debug, Clone)]
pub struct MnistDownloader {
    client: Client,
    base_url: String,
}

impl MnistDownloader {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Names of training files not yet present in `dir`
    pub fn missing(dir: &Path) -> Vec<&'static str> {
        [TRAIN_IMAGES, TRAIN_LABELS]
            .into_iter()
            .filter(|name| locate(dir, name).is_none())
            .collect()
    }

    /// Fetch every missing training file into `dir`
    pub async fn ensure(&self, dir: &Path) -> Result<()> {
        let missing = Self::missing(dir);
        if missing.is_empty() {
            return Ok(());
        }
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        for name in missing {
            self.fetch(name, dir).await?;
        }
        Ok(())
    }

    async fn fetch(&self, name: &str, dir: &Path) -> Result<PathBuf> {
        let url = format!("{}/{}.gz", self.base_url, name);
        info!("Downloading {}", url);

        let mut response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;
        if !response.status().is_success() {
            bail!("Download of {} failed with status {}", url, response.status());
        }

        let pb = ProgressBar::new(response.content_length().unwrap_or(0));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {bytes}/{total_bytes} {msg}")?
                .progress_chars("##-"),
        );
        pb.set_message(name.to_string());

        // renamed into place once the body is complete
        let dest = dir.join(format!("{}.gz", name));
        let partial = dir.join(format!("{}.gz.part", name));
        let mut file = tokio::fs::File::create(&partial).await?;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            pb.inc(chunk.len() as u64);
        }
        file.flush().await?;
        tokio::fs::rename(&partial, &dest).await?;

        pb.finish_with_message("done");
        info!("Saved {}", dest.display());
        Ok(dest)
    }
}
