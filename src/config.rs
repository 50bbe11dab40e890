use crate::error::ConfigError;
use crate::grid::Grid3;
use crate::velocity::{ProblemType, DEFORMATION_PERIOD};
use crate::vof_sim::{SweepOrder, VofParams};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Run configuration of the advection benchmark, stored as JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub cells: [usize; 3],
    pub domain_length: [f64; 3],
    pub origin: [f64; 3],
    pub dt: f64,
    pub end_time: f64,
    /// Velocity selector; only `1` (deformation) is available.
    pub problem: i32,
    pub sphere_center: [f64; 3],
    pub sphere_radius: f64,
    pub init_samples: usize,
    pub clamp_volume_fraction: bool,
    pub alternate_sweeps: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            cells: [32, 32, 32],
            domain_length: [1.0; 3],
            origin: [0.0; 3],
            dt: 0.01,
            end_time: DEFORMATION_PERIOD,
            problem: 1,
            sphere_center: [0.35; 3],
            sphere_radius: 0.15,
            init_samples: 8,
            clamp_volume_fraction: false,
            alternate_sweeps: true,
        }
    }
}

impl SimConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: SimConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cells.iter().any(|n| *n == 0) {
            return Err(ConfigError::invalid(
                "cells",
                format!("{:?}", self.cells),
                "every axis needs at least one cell",
            ));
        }
        if self.domain_length.iter().any(|len| !(*len > 0.0)) {
            return Err(ConfigError::invalid(
                "domain_length",
                format!("{:?}", self.domain_length),
                "lengths must be positive",
            ));
        }
        if !(self.dt > 0.0) {
            return Err(ConfigError::invalid("dt", self.dt, "must be positive"));
        }
        if !(self.end_time >= 0.0) {
            return Err(ConfigError::invalid("end_time", self.end_time, "must not be negative"));
        }
        if !(self.sphere_radius > 0.0) {
            return Err(ConfigError::invalid(
                "sphere_radius",
                self.sphere_radius,
                "must be positive",
            ));
        }
        if self.init_samples == 0 {
            return Err(ConfigError::invalid("init_samples", 0, "must be at least 1"));
        }
        self.problem()?;
        Ok(())
    }

    pub fn problem(&self) -> Result<ProblemType, ConfigError> {
        ProblemType::try_from(self.problem)
    }

    pub fn grid(&self) -> Grid3 {
        Grid3::with_length(self.cells, self.domain_length, self.origin)
    }

    /// Number of steps needed to reach `end_time`; the last step may be shorter.
    pub fn step_count(&self) -> usize {
        (self.end_time / self.dt - 1e-9).ceil().max(0.0) as usize
    }

    pub fn to_params(&self) -> VofParams {
        VofParams {
            dt: self.dt,
            clamp_volume_fraction: self.clamp_volume_fraction,
            order: if self.alternate_sweeps {
                SweepOrder::Alternating
            } else {
                SweepOrder::Xyz
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.problem().ok(), Some(ProblemType::Deformation));
        assert_eq!(config.grid().dx(), [1.0 / 32.0; 3]);
        assert_eq!(config.step_count(), 300);
        assert_eq!(config.to_params().order, SweepOrder::Alternating);
    }

    #[test]
    fn invalid_dt_is_rejected() {
        let config = SimConfig {
            dt: 0.0,
            ..SimConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "dt"));
    }

    #[test]
    fn unknown_problem_is_rejected() {
        let config = SimConfig {
            problem: 4,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnsupportedProblem(4))
        ));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: SimConfig = serde_json::from_str(r#"{ "cells": [8, 8, 8], "dt": 0.05 }"#).unwrap();
        assert_eq!(config.cells, [8, 8, 8]);
        assert_eq!(config.dt, 0.05);
        assert_eq!(config.sphere_radius, 0.15);
        assert_eq!(config.step_count(), 60);
    }

    #[test]
    fn config_file_round_trip() {
        let path = std::env::temp_dir().join(format!("vof_sweep_config_{}.json", std::process::id()));
        let config = SimConfig {
            cells: [16, 8, 4],
            clamp_volume_fraction: true,
            ..SimConfig::default()
        };
        config.save_to_file(&path).unwrap();
        let loaded = SimConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = SimConfig::from_file("/nonexistent/vof_sweep.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
