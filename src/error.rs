use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntegrationError {
    #[error("x = {x_target} is not reachable from x = 0 in whole steps of h = {h} (nearest is {nearest})")]
    UnreachableTarget { x_target: f64, h: f64, nearest: f64 },
    #[error("no step landed within {tolerance} of x = {x_target} after {max_steps} steps")]
    MaxStepsExceeded {
        x_target: f64,
        max_steps: usize,
        tolerance: f64,
    },
    #[error("x = {x_target} lies behind the starting point x = 0")]
    TargetBehindStart { x_target: f64 },
    #[error("target x must be finite, got {x_target}")]
    InvalidTarget { x_target: f64 },
    #[error("step size must be positive and finite, got {h}")]
    InvalidStepSize { h: f64 },
}

#[derive(Error, Debug)]
pub enum SolverError {
    #[error("step size must be positive and finite, got {0}")]
    InvalidStepSize(f64),
    #[error("tolerance must be positive and finite, got {0}")]
    InvalidTolerance(f64),
    #[error("initial condition must be finite, got y0 = {y0}, y'0 = {z0}")]
    InvalidInitialCondition { y0: f64, z0: f64 },
    #[error(transparent)]
    Integration(#[from] IntegrationError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("configuration error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("progress bar template: {0}")]
    Template(#[from] indicatif::style::TemplateError),
}
