//! Training configuration

use crate::error::{AdversarioError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for a training run.
///
/// The defaults reproduce the reference hyperparameters; every constant of
/// the original procedure is exposed here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Number of epochs to run.
    pub epochs: usize,
    /// Width of the categorical latent code.
    pub n_classes: usize,
    /// Width of the continuous latent code.
    pub z_dim: usize,
    /// Flat width of one input example.
    pub input_width: usize,
    /// Hidden width of the reference networks.
    pub hidden: usize,
    /// Dropout probability of the encoder's stochastic layers.
    pub dropout: f32,
    /// Learning rate of the reconstruction phase (encoder + decoder).
    pub reconstruction_lr: f32,
    /// Learning rate of the regularization phase (discriminators + generator).
    pub regularization_lr: f32,
    /// Learning rate of the semi-supervised phase.
    pub classification_lr: f32,
    /// Evaluate and report every this many epochs.
    pub report_interval: usize,
    /// Seed for parameter initialization, priors and dropout.
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            epochs: 100,
            n_classes: 10,
            z_dim: 2,
            input_width: 784,
            hidden: 1000,
            dropout: 0.25,
            reconstruction_lr: 0.0006,
            regularization_lr: 0.0008,
            classification_lr: 0.001,
            report_interval: 10,
            seed: 10,
        }
    }
}

impl TrainConfig {
    /// Create a config with the reference defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the epoch count.
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Set the categorical code width.
    pub fn with_n_classes(mut self, n_classes: usize) -> Self {
        self.n_classes = n_classes;
        self
    }

    /// Set the continuous code width.
    pub fn with_z_dim(mut self, z_dim: usize) -> Self {
        self.z_dim = z_dim;
        self
    }

    /// Set the flat input width.
    pub fn with_input_width(mut self, input_width: usize) -> Self {
        self.input_width = input_width;
        self
    }

    /// Set the hidden width of the reference networks.
    pub fn with_hidden(mut self, hidden: usize) -> Self {
        self.hidden = hidden;
        self
    }

    /// Set the reporting interval.
    pub fn with_report_interval(mut self, report_interval: usize) -> Self {
        self.report_interval = report_interval;
        self
    }

    /// Set the run seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Validate dimensions and rates.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("epochs", self.epochs),
            ("n_classes", self.n_classes),
            ("z_dim", self.z_dim),
            ("input_width", self.input_width),
            ("hidden", self.hidden),
            ("report_interval", self.report_interval),
        ] {
            if value == 0 {
                return Err(AdversarioError::InvalidDimension { name, value });
            }
        }

        for (field, rate) in [
            ("reconstruction_lr", self.reconstruction_lr),
            ("regularization_lr", self.regularization_lr),
            ("classification_lr", self.classification_lr),
        ] {
            if !(rate > 0.0 && rate.is_finite()) {
                return Err(AdversarioError::ConfigValue {
                    field,
                    message: format!("must be a positive finite number, got {rate}"),
                });
            }
        }

        if !(0.0..1.0).contains(&self.dropout) {
            return Err(AdversarioError::ConfigValue {
                field: "dropout",
                message: format!("must be in [0, 1), got {}", self.dropout),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_rates() {
        let config = TrainConfig::default();
        assert_eq!(config.reconstruction_lr, 0.0006);
        assert_eq!(config.regularization_lr, 0.0008);
        assert_eq!(config.classification_lr, 0.001);
        assert_eq!(config.report_interval, 10);
        assert_eq!(config.seed, 10);
        config.validate().expect("defaults must validate");
    }

    #[test]
    fn builders_compose() {
        let config = TrainConfig::new()
            .with_epochs(5)
            .with_n_classes(4)
            .with_z_dim(3)
            .with_input_width(16)
            .with_hidden(32)
            .with_seed(99);
        assert_eq!(config.epochs, 5);
        assert_eq!(config.n_classes, 4);
        assert_eq!(config.z_dim, 3);
        assert_eq!(config.input_width, 16);
        assert_eq!(config.hidden, 32);
        assert_eq!(config.seed, 99);
    }

    #[test]
    fn validation_rejects_zero_dims_and_bad_rates() {
        assert!(TrainConfig::new().with_n_classes(0).validate().is_err());
        assert!(TrainConfig::new().with_z_dim(0).validate().is_err());

        let mut config = TrainConfig::new();
        config.classification_lr = 0.0;
        assert!(config.validate().is_err());

        let mut config = TrainConfig::new();
        config.dropout = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn serde_round_trip() {
        let config = TrainConfig::new().with_epochs(3).with_seed(7);
        let json = serde_json::to_string(&config).expect("serialize");
        let back: TrainConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.epochs, 3);
        assert_eq!(back.seed, 7);
        assert_eq!(back.hidden, config.hidden);
    }
}
