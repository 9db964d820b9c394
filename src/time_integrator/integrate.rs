use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::IntegrationError;
use crate::ode_core::{
    derivative::{DerivativeModel, LinearForcedOde},
    state::{InitialCondition, State},
};
use crate::time_integrator::step::Scheme;

pub const DEFAULT_TOLERANCE: f64 = 1e-10;
pub const DEFAULT_MAX_STEPS: usize = 10_000_000;

/// How the stepping loop decides it has arrived at the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Termination {
    /// Exactly `round(x_target / h)` steps; the target must be a whole
    /// multiple of `h` up to the tolerance.
    #[default]
    StepCount,
    /// Whole steps of `h`, then one shorter step landing on the target.
    PartialFinalStep,
    /// Step while `|x - x_target|` exceeds the tolerance. Never terminates on
    /// its own when the target is not a multiple of `h`, hence the bound.
    Tolerance {
        #[serde(default = "default_max_steps")]
        max_steps: usize,
    },
}

fn default_max_steps() -> usize {
    DEFAULT_MAX_STEPS
}

#[derive(Debug, Clone)]
pub struct Integrator<M: DerivativeModel> {
    model: M,
    h: f64,
    tolerance: f64,
    termination: Termination,
}

impl<M: DerivativeModel> Integrator<M> {
    pub fn new(model: M, h: f64) -> Self {
        Integrator {
            model,
            h,
            tolerance: DEFAULT_TOLERANCE,
            termination: Termination::default(),
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_termination(mut self, termination: Termination) -> Self {
        self.termination = termination;
        self
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn step_size(&self) -> f64 {
        self.h
    }

    pub fn termination(&self) -> Termination {
        self.termination
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Integrates from `(0, y0, z0)` to `x_target` and returns the final state.
    pub fn integrate(
        &self,
        scheme: Scheme,
        ic: &InitialCondition,
        x_target: f64,
    ) -> Result<State, IntegrationError> {
        self.integrate_with(scheme, ic, x_target, |_| {})
    }

    /// Same as [`Integrator::integrate`] but keeps every visited state,
    /// the initial one included.
    pub fn trajectory(
        &self,
        scheme: Scheme,
        ic: &InitialCondition,
        x_target: f64,
    ) -> Result<Vec<State>, IntegrationError> {
        let mut states = Vec::new();
        self.integrate_with(scheme, ic, x_target, |s| states.push(*s))?;
        Ok(states)
    }

    pub fn integrate_with<F>(
        &self,
        scheme: Scheme,
        ic: &InitialCondition,
        x_target: f64,
        mut observer: F,
    ) -> Result<State, IntegrationError>
    where
        F: FnMut(&State),
    {
        let h = self.h;
        let tol = self.tolerance;

        if !(h > 0.0 && h.is_finite()) {
            return Err(IntegrationError::InvalidStepSize { h });
        }
        if !x_target.is_finite() {
            return Err(IntegrationError::InvalidTarget { x_target });
        }
        if x_target < -tol {
            return Err(IntegrationError::TargetBehindStart { x_target });
        }

        let mut state = ic.to_state();
        observer(&state);
        if x_target.abs() <= tol {
            return Ok(state);
        }

        let mut steps = 0_usize;
        match self.termination {
            Termination::StepCount => {
                let k = (x_target / h).round();
                let nearest = k * h;
                if (nearest - x_target).abs() > tol {
                    return Err(IntegrationError::UnreachableTarget { x_target, h, nearest });
                }

                for i in 1..=(k as usize) {
                    state = scheme.step(&self.model, &state, h);
                    state.x = i as f64 * h;
                    observer(&state);
                }
                steps = k as usize;
            }
            Termination::PartialFinalStep => {
                while x_target - state.x > tol {
                    let dx = h.min(x_target - state.x);
                    state = scheme.step(&self.model, &state, dx);
                    steps += 1;
                    observer(&state);
                }
            }
            Termination::Tolerance { max_steps } => {
                while (state.x - x_target).abs() > tol {
                    if steps == max_steps {
                        return Err(IntegrationError::MaxStepsExceeded {
                            x_target,
                            max_steps,
                            tolerance: tol,
                        });
                    }
                    state = scheme.step(&self.model, &state, h);
                    steps += 1;
                    observer(&state);
                }
            }
        }

        debug!("{} reached x = {} after {} steps", scheme, state.x, steps);
        Ok(state)
    }
}

/// Integrates `y'' - y = x` from `y(0) = y0`, `y'(0) = z0` to `x_target` and
/// returns `(y, y')` there.
pub fn integrate(
    scheme: Scheme,
    y0: f64,
    z0: f64,
    h: f64,
    x_target: f64,
) -> Result<(f64, f64), IntegrationError> {
    let state = Integrator::new(LinearForcedOde, h).integrate(
        scheme,
        &InitialCondition::new(y0, z0),
        x_target,
    )?;
    Ok((state.y(), state.z()))
}
