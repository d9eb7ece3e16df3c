use serde::{Deserialize, Serialize};

use crate::{
    DEFAULT_PRECISION, DEFAULT_TOLERANCE, Error,
    algo::{partition::PartitionConfig, repair::RepairConfig},
    graph::BogusEdgeConfig,
};

/// Stage switches and numeric parameters of [`run_pipeline`](super::run_pipeline)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Landmark identity tolerance, used by readers when building the network
    pub tolerance: f64,
    /// Decimal places of crossing coordinates and edge weights
    pub precision: u32,
    pub repair_crossings: bool,
    /// Repair again after the bogus edge filter, unset leaves it to the input reader
    pub repair_after_filter: Option<bool>,
    pub max_repair_passes: Option<usize>,
    pub partition: PartitionConfig,
    pub bogus: BogusEdgeConfig,
    pub translate_x: i64,
    pub translate_y: i64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            precision: DEFAULT_PRECISION,
            repair_crossings: true,
            repair_after_filter: None,
            max_repair_passes: None,
            partition: PartitionConfig::default(),
            bogus: BogusEdgeConfig::default(),
            translate_x: 0,
            translate_y: 0,
        }
    }
}

impl PipelineConfig {
    /// Decimal keeps at most 28 fractional digits
    const MAX_PRECISION: u32 = 28;

    pub fn repair(&self) -> RepairConfig {
        RepairConfig {
            precision: self.precision,
            max_passes: self.max_repair_passes,
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(Error::InvalidData(format!(
                "Landmark tolerance must be a positive number, got {}",
                self.tolerance
            )));
        }

        if self.precision > Self::MAX_PRECISION {
            return Err(Error::InvalidData(format!(
                "Precision of {} decimals exceeds the supported {}",
                self.precision,
                Self::MAX_PRECISION
            )));
        }

        if self.partition.max_runs == 0 {
            return Err(Error::InvalidData(
                "At least one simplification run is required".to_string(),
            ));
        }

        if self.max_repair_passes == Some(0) {
            return Err(Error::InvalidData(
                "Repair pass budget must be at least one".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.repair().precision, 3);
        assert_eq!(config.partition.max_runs, 10);
    }

    #[test]
    fn rejects_nonsense() {
        let config = PipelineConfig {
            tolerance: 0.0,
            ..PipelineConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidData(_))));

        let config = PipelineConfig {
            precision: 40,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());

        let config = PipelineConfig {
            max_repair_passes: Some(0),
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"precision": 2, "partition": {"prune": false}}"#).unwrap();
        assert_eq!(config.precision, 2);
        assert!(!config.partition.prune);
        assert_eq!(config.partition.max_runs, 10);
        assert!(config.repair_crossings);
    }
}
