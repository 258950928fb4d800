//! Training configuration files.
//!
//! A config is a JSON object matching [`TrainConfig`]:
//!
//! ```json
//! {
//!   "layer_widths": [784, 20, 7, 5, 3, 10],
//!   "learning_rate": 0.003,
//!   "iterations": 2000,
//!   "lambda": 0.7,
//!   "report_every": 100,
//!   "verbose": true,
//!   "output_activation": "sigmoid",
//!   "seed": 1
//! }
//! ```
//!
//! `report_every`, `verbose`, `output_activation`, and `seed` are optional.

use std::path::Path;

use crate::{Error, Result, TrainConfig};

/// Parse and validate a config from a JSON string.
pub fn parse_config(s: &str) -> Result<TrainConfig> {
    let config: TrainConfig = serde_json::from_str(s)
        .map_err(|e| Error::InvalidConfig(format!("failed to parse config json: {e}")))?;
    config.validate()?;
    Ok(config)
}

/// Load and validate a config from a JSON file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<TrainConfig> {
    let p = path.as_ref();
    let s = std::fs::read_to_string(p)
        .map_err(|e| Error::Persistence(format!("failed to read {}: {e}", p.display())))?;
    parse_config(&s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OutputActivation;

    #[test]
    fn optional_fields_take_defaults() {
        let cfg = parse_config(
            r#"{"layer_widths":[4,3,2],"learning_rate":0.1,"iterations":10,"lambda":0.0}"#,
        )
        .unwrap();
        assert_eq!(cfg.report_every, 100);
        assert!(cfg.verbose);
        assert_eq!(cfg.output_activation, OutputActivation::Sigmoid);
        assert_eq!(cfg.seed, 1);
    }

    #[test]
    fn invalid_values_are_rejected_not_replaced() {
        let err = parse_config(
            r#"{"layer_widths":[4,3,2],"learning_rate":0.0,"iterations":10,"lambda":0.0}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));

        assert!(parse_config(r#"{"learning_rate":0.1,"iterations":10,"lambda":0.0}"#).is_err());
    }

    #[test]
    fn reads_output_activation() {
        let cfg = parse_config(
            r#"{"layer_widths":[4,3],"learning_rate":0.1,"iterations":1,"lambda":2.5,
                "output_activation":"softmax","verbose":false}"#,
        )
        .unwrap();
        assert_eq!(cfg.output_activation, OutputActivation::Softmax);
        assert!(!cfg.verbose);
        assert_eq!(cfg.lambda, 2.5);
    }
}
