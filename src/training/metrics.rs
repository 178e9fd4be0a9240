//! Training metrics for monitoring GAN progress
//!
//! Kept in memory only; nothing here is written to disk.

/// Losses from one adversarial step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepLosses {
    pub d_loss: f64,
    pub g_loss: f64,
}

/// Running sums over the steps of one epoch
#[derive(Debug, Clone, Copy, Default)]
pub struct EpochAccumulator {
    d_sum: f64,
    g_sum: f64,
    steps: usize,
}

impl EpochAccumulator {
    pub fn push(&mut self, losses: StepLosses) {
        self.d_sum += losses.d_loss;
        self.g_sum += losses.g_loss;
        self.steps += 1;
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Mean (d_loss, g_loss); zeros for an empty epoch
    pub fn means(&self) -> (f64, f64) {
        if self.steps == 0 {
            return (0.0, 0.0);
        }
        let n = self.steps as f64;
        (self.d_sum / n, self.g_sum / n)
    }
}

/// Metrics collected during training
#[derive(Debug, Clone, Default)]
pub struct TrainingMetrics {
    /// Mean generator loss per epoch
    pub gen_losses: Vec<f64>,
    /// Mean discriminator loss per epoch
    pub disc_losses: Vec<f64>,
    /// Losses of the most recent step
    pub last_step: Option<StepLosses>,
    /// Discriminator optimizer steps taken
    pub disc_updates: usize,
    /// Generator optimizer steps taken
    pub gen_updates: usize,
}

impl TrainingMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record epoch means
    pub fn record_epoch(&mut self, epoch: &EpochAccumulator) {
        let (disc_loss, gen_loss) = epoch.means();
        self.disc_losses.push(disc_loss);
        self.gen_losses.push(gen_loss);
    }

    /// Get number of recorded epochs
    pub fn num_epochs(&self) -> usize {
        self.gen_losses.len()
    }

    /// Get latest generator loss
    pub fn latest_gen_loss(&self) -> Option<f64> {
        self.gen_losses.last().copied()
    }

    /// Get latest discriminator loss
    pub fn latest_disc_loss(&self) -> Option<f64> {
        self.disc_losses.last().copied()
    }

    /// Check if training appears to have collapsed
    ///
    /// Heuristic: over the last `window` epochs the discriminator loss is
    /// near zero while the generator loss keeps climbing.
    pub fn check_mode_collapse(&self, window: usize) -> bool {
        if window == 0 || self.num_epochs() < window {
            return false;
        }

        let disc_ma = moving_average(&self.disc_losses, window);
        let gen_ma = moving_average(&self.gen_losses, window);

        disc_ma < 0.1 && gen_ma > 5.0
    }
}

/// Calculate moving average of last `window` values
fn moving_average(values: &[f64], window: usize) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let n = window.min(values.len());
    let sum: f64 = values.iter().rev().take(n).sum();
    sum / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn epoch(losses: &[(f64, f64)]) -> EpochAccumulator {
        let mut acc = EpochAccumulator::default();
        for &(d_loss, g_loss) in losses {
            acc.push(StepLosses { d_loss, g_loss });
        }
        acc
    }

    #[test]
    fn test_training_metrics() {
        let mut metrics = TrainingMetrics::new();

        metrics.record_epoch(&epoch(&[(0.8, 1.5), (0.6, 1.3)]));
        metrics.record_epoch(&epoch(&[(0.75, 1.3)]));

        assert_eq!(metrics.num_epochs(), 2);
        assert_eq!(metrics.latest_gen_loss(), Some(1.3));
        assert!((metrics.disc_losses[0] - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_empty_epoch_means() {
        assert_eq!(EpochAccumulator::default().means(), (0.0, 0.0));
    }

    #[test]
    fn test_mode_collapse_heuristic() {
        let mut metrics = TrainingMetrics::new();
        for _ in 0..3 {
            metrics.record_epoch(&epoch(&[(0.01, 8.0)]));
        }
        assert!(metrics.check_mode_collapse(3));
        assert!(!metrics.check_mode_collapse(4));

        metrics.record_epoch(&epoch(&[(0.7, 0.9)]));
        assert!(!metrics.check_mode_collapse(2));
    }

    #[test]
    fn test_moving_average() {
        assert_eq!(moving_average(&[1.0, 2.0, 3.0, 4.0], 2), 3.5);
        assert_eq!(moving_average(&[], 2), 0.0);
    }
}
