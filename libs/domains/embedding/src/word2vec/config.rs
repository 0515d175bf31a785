use strum::{Display, EnumString};
use thiserror::Error;

/// Which side of the window predicts the other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ModelKind {
    /// Context words predict the centre word
    #[default]
    Cbow,
}

/// Output layer approximation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Optimizer {
    #[default]
    NegativeSampling,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field} must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f64 },
}

/// Hyper-parameters for [`super::Word2Vec`]
#[derive(Debug, Clone, PartialEq)]
pub struct Word2VecConfig {
    pub dimension: usize,
    pub window: usize,
    /// Label only; CBOW is the one architecture implemented
    pub model: ModelKind,
    /// Label only; negative sampling is the one output layer implemented
    pub optimizer: Optimizer,
    pub negative_samples: usize,
    pub iterations: usize,
    pub initial_learning_rate: f32,
    pub min_count: usize,
    /// Frequent-word downsampling threshold; 0 disables it.
    pub subsample_threshold: f64,
    /// Fixed RNG seed for reproducible vectors.
    pub seed: Option<u64>,
}

impl Default for Word2VecConfig {
    fn default() -> Self {
        Self {
            dimension: 10,
            window: 5,
            model: ModelKind::Cbow,
            optimizer: Optimizer::NegativeSampling,
            negative_samples: 5,
            iterations: 15,
            initial_learning_rate: 0.025,
            min_count: 1,
            subsample_threshold: 1.0e-3,
            seed: None,
        }
    }
}

impl Word2VecConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn with_negative_samples(mut self, negative_samples: usize) -> Self {
        self.negative_samples = negative_samples;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_min_count(mut self, min_count: usize) -> Self {
        self.min_count = min_count;
        self
    }

    pub fn with_subsample_threshold(mut self, threshold: f64) -> Self {
        self.subsample_threshold = threshold;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let counts = [
            ("dimension", self.dimension),
            ("window", self.window),
            ("negative_samples", self.negative_samples),
            ("iterations", self.iterations),
            ("min_count", self.min_count),
        ];
        if let Some((field, _)) = counts.iter().find(|(_, v)| *v == 0) {
            return Err(ConfigError::Zero { field });
        }

        let lr = self.initial_learning_rate as f64;
        if !lr.is_finite() || lr <= 0.0 {
            return Err(ConfigError::NotPositive {
                field: "initial_learning_rate",
                value: lr,
            });
        }
        if !self.subsample_threshold.is_finite() || self.subsample_threshold < 0.0 {
            return Err(ConfigError::NotPositive {
                field: "subsample_threshold",
                value: self.subsample_threshold,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Word2VecConfig::default();
        assert_eq!(config.dimension, 10);
        assert_eq!(config.window, 5);
        assert_eq!(config.model, ModelKind::Cbow);
        assert_eq!(config.optimizer, Optimizer::NegativeSampling);
        assert_eq!(config.negative_samples, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let config = Word2VecConfig::new().with_dimension(0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::Zero { field: "dimension" })
        );
    }

    #[test]
    fn test_negative_subsample_rejected() {
        let config = Word2VecConfig::new().with_subsample_threshold(-1.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive { field: "subsample_threshold", .. })
        ));
    }

    #[test]
    fn test_model_kind_names() {
        assert_eq!(ModelKind::Cbow.to_string(), "cbow");
        assert_eq!(Optimizer::NegativeSampling.to_string(), "negative_sampling");
    }
}
