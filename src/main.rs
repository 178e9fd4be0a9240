//! GAN for handwritten digits
//!
//! Main entry point providing CLI interface for:
//! - Training the GAN on MNIST
//! - Generating sample grids from a saved generator
//! - Writing a default configuration file

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::Path;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use mnist_gan::{
    data::{DataLoader, MnistDownloader, MnistImages},
    model::Gan,
    training::{AdversarialTrainer, Reporter},
    utils::{load_generator, save_generator, save_grid, Config},
};

/// Minimal GAN trained on handwritten digits
#[derive(Parser)]
#[command(name = "mnist_gan")]
#[command(version)]
#[command(about = "Train a fully-connected GAN on MNIST and sample from it")]
struct Cli {
    /// Path to configuration file (TOML or JSON); defaults apply if absent
    #[arg(short, long, default_value = "gan.toml")]
    config: String,

    /// Verbosity level
    #[arg(short, long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the GAN and save the generator
    Train {
        /// Directory holding (or receiving) the MNIST IDX files
        #[arg(short, long)]
        data_dir: Option<String>,

        /// Directory for the saved generator
        #[arg(short, long)]
        output_dir: Option<String>,

        /// Force CPU even if CUDA is available
        #[arg(long)]
        cpu: bool,
    },

    /// Write a sample grid from a saved generator
    Generate {
        /// Path to saved generator weights
        #[arg(short, long, default_value = "generator.pt")]
        model: String,

        /// Number of images in the grid
        #[arg(
            short,
            long,
            default_value = "16",
            value_parser = clap::value_parser!(i64).range(1..)
        )]
        num_samples: i64,

        /// Output PNG path
        #[arg(short, long, default_value = "samples.png")]
        output: String,
    },

    /// Initialize default configuration file
    Init {
        /// Output configuration file path
        #[arg(short, long, default_value = "gan.toml")]
        output: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = match cli.verbosity.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Train {
            data_dir,
            output_dir,
            cpu,
        } => {
            let mut config = Config::load_or_default(&cli.config)?;
            if let Some(dir) = data_dir {
                config.data.dir = dir;
            }
            if let Some(dir) = output_dir {
                config.report.output_dir = dir;
            }
            if cpu {
                config.training.device = "cpu".to_string();
            }
            train(&config).await?;
        }
        Commands::Generate {
            model,
            num_samples,
            output,
        } => {
            let config = Config::load_or_default(&cli.config)?;
            generate(&config, &model, num_samples, &output)?;
        }
        Commands::Init { output } => {
            init_config(&output)?;
        }
    }

    Ok(())
}

/// Train the GAN
async fn train(config: &Config) -> Result<()> {
    config.validate()?;

    let device = config.get_device();
    info!("Using device: {:?}", device);
    tch::manual_seed(config.training.seed as i64);

    // Load data, fetching it on first use
    let data_dir = Path::new(&config.data.dir);
    if config.data.download {
        MnistDownloader::new(&config.data.base_url)
            .ensure(data_dir)
            .await?;
    }
    let mnist = MnistImages::load(data_dir)?;
    let mut loader =
        DataLoader::from_mnist(mnist, config.training.batch_size, config.training.seed);
    info!(
        "DataLoader: {} batches of up to {} images",
        loader.num_batches(),
        loader.batch_size()
    );

    let gan = Gan::new(&config.model, device);
    info!(
        "Created GAN: latent_dim={}, hidden_dim={}, image_dim={}",
        config.model.latent_dim,
        config.model.hidden_dim,
        config.model.image_dim()
    );

    let reporter = Reporter::new(&config.report);
    let mut trainer = AdversarialTrainer::new(gan, &config.training)?;
    let metrics = trainer.train(&mut loader, &reporter)?;

    info!(
        "Training complete. Final epoch mean D_loss: {:.4}, G_loss: {:.4}",
        metrics.latest_disc_loss().unwrap_or(0.0),
        metrics.latest_gen_loss().unwrap_or(0.0)
    );

    save_generator(trainer.gan(), &config.report.output_dir)?;
    Ok(())
}

/// Write a grid of samples from a saved generator
fn generate(config: &Config, model_path: &str, num_samples: i64, output: &str) -> Result<()> {
    let device = config.get_device();
    let gan = load_generator(&config.model, Path::new(model_path), device)?;

    info!("Generating {} samples", num_samples);
    let samples = tch::no_grad(|| gan.generate(num_samples))?;
    save_grid(&samples, config.report.grid_columns, output)?;

    info!("Saved sample grid to {}", output);
    Ok(())
}

/// Initialize default configuration file
fn init_config(output_path: &str) -> Result<()> {
    let config = Config::default();

    if output_path.ends_with(".toml") {
        config.save_toml(output_path)?;
    } else {
        config.save_json(output_path)?;
    }

    info!("Created default configuration at {}", output_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_sample_count_must_be_positive() {
        for count in ["0", "-4"] {
            let args = ["mnist_gan", "generate", "--num-samples", count];
            assert!(Cli::try_parse_from(args).is_err());
        }

        let cli = Cli::try_parse_from(["mnist_gan", "generate", "-n", "9"]).unwrap();
        match cli.command {
            Commands::Generate { num_samples, .. } => assert_eq!(num_samples, 9),
            _ => panic!("expected generate"),
        }
    }
}
