//! Pruning session configuration.

use prunus_core::{PruneError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for a magnitude pruning session.
///
/// Unknown keys are rejected when deserializing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PruningConfig {
    /// Percentile (0-100) of absolute weights to prune each round
    #[serde(default)]
    pub pruning_rate: Option<f64>,

    /// Session label attached to log events
    #[serde(default)]
    pub label: Option<String>,
}

impl PruningConfig {
    /// Config with the given pruning rate
    pub fn with_rate(pruning_rate: f64) -> Self {
        Self {
            pruning_rate: Some(pruning_rate),
            label: None,
        }
    }

    /// Attach a session label
    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Parse from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Validated pruning rate.
    ///
    /// Fails when the rate is missing, not finite, or outside [0, 100].
    pub fn rate(&self) -> Result<f64> {
        let rate = self.pruning_rate.ok_or_else(|| {
            PruneError::config("pruning_rate is required and can not be None")
        })?;
        validate_rate(rate)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.rate().map(|_| ())
    }
}

/// Check that `rate` is a usable percentile.
pub(crate) fn validate_rate(rate: f64) -> Result<f64> {
    if !rate.is_finite() {
        return Err(PruneError::config(format!(
            "pruning_rate must be finite, got {rate}"
        )));
    }
    if !(0.0..=100.0).contains(&rate) {
        return Err(PruneError::config(format!(
            "pruning_rate must be in [0, 100], got {rate}"
        )));
    }
    Ok(rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_rate() {
        let config = PruningConfig::with_rate(40.0).labeled("mlp");
        assert_eq!(config.rate().unwrap(), 40.0);
        assert_eq!(config.label.as_deref(), Some("mlp"));
    }

    #[test]
    fn test_missing_rate() {
        let config = PruningConfig::default();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, PruneError::Configuration(_)));
        assert!(err.to_string().contains("pruning_rate"));
    }

    #[test]
    fn test_out_of_range_rate() {
        assert!(PruningConfig::with_rate(-1.0).validate().is_err());
        assert!(PruningConfig::with_rate(100.5).validate().is_err());
        assert!(PruningConfig::with_rate(f64::NAN).validate().is_err());
        assert!(PruningConfig::with_rate(0.0).validate().is_ok());
        assert!(PruningConfig::with_rate(100.0).validate().is_ok());
    }

    #[test]
    fn test_from_json() {
        let config = PruningConfig::from_json(r#"{"pruning_rate": 25.5, "label": "run-1"}"#)
            .unwrap();
        assert_eq!(config.pruning_rate, Some(25.5));
        assert_eq!(config.label.as_deref(), Some("run-1"));
    }

    #[test]
    fn test_from_json_null_rate() {
        let config = PruningConfig::from_json(r#"{"pruning_rate": null}"#).unwrap();
        assert!(matches!(
            config.validate(),
            Err(PruneError::Configuration(_))
        ));
    }

    #[test]
    fn test_from_json_rejects_unknown_keys() {
        let err = PruningConfig::from_json(r#"{"pruning_rate": 10, "mask": [1, 0]}"#)
            .unwrap_err();
        assert!(matches!(err, PruneError::Serialization(_)));
        assert!(err.to_string().contains("mask"));
    }

    #[test]
    fn test_json_roundtrip() {
        let config = PruningConfig::with_rate(12.5).labeled("x");
        let back = PruningConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(config, back);
    }
}
