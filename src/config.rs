use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_yaml::from_reader;

use crate::error::SolverError;
use crate::time_integrator::integrate::{Termination, DEFAULT_TOLERANCE};

/// Session settings read from YAML. Any of `y0`, `z0`, `h` may be left out
/// and supplied on the command line or at the prompt instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub y0: Option<f64>,
    #[serde(default)]
    pub z0: Option<f64>,
    #[serde(default)]
    pub h: Option<f64>,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default)]
    pub termination: Termination,
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            y0: None,
            z0: None,
            h: None,
            tolerance: DEFAULT_TOLERANCE,
            termination: Termination::default(),
        }
    }
}

impl SessionConfig {
    /// Values given here win over the ones already present.
    pub fn override_with(mut self, y0: Option<f64>, z0: Option<f64>, h: Option<f64>) -> Self {
        self.y0 = y0.or(self.y0);
        self.z0 = z0.or(self.z0);
        self.h = h.or(self.h);
        self
    }

    pub fn validate(&self) -> Result<(), SolverError> {
        if let Some(h) = self.h {
            check_step_size(h)?;
        }
        if !(self.tolerance > 0.0 && self.tolerance.is_finite()) {
            return Err(SolverError::InvalidTolerance(self.tolerance));
        }
        Ok(())
    }
}

pub fn check_step_size(h: f64) -> Result<f64, SolverError> {
    if h > 0.0 && h.is_finite() {
        Ok(h)
    } else {
        Err(SolverError::InvalidStepSize(h))
    }
}

pub fn load_session_config<P: AsRef<Path>>(path: P) -> Result<SessionConfig, SolverError> {
    let file = File::open(path)?;
    let config: SessionConfig = from_reader(file)?;
    config.validate()?;
    Ok(config)
}
