extern crate nalgebra as na;

use std::fmt;

use crate::ode_core::{derivative::DerivativeModel, state::State};

//TRAITS
pub trait StepScheme {
    /// Advances `state` by one step of size `h`. Non-finite values are
    /// passed through untouched.
    fn step(&self, model: &dyn DerivativeModel, state: &State, h: f64) -> State;

    fn order(&self) -> u32;
}

//STRUCTS
/// Improved Euler as a midpoint-slope predictor-corrector: a half-step Euler
/// predictor for both components, then a full step with the midpoint slopes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImprovedEuler;

/// Classical four-stage Runge-Kutta.
#[derive(Debug, Clone, Copy, Default)]
pub struct RungeKutta4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    ImprovedEuler,
    RungeKutta4,
}

//IMPLEMENTATIONS
impl StepScheme for ImprovedEuler {
    fn step(&self, model: &dyn DerivativeModel, state: &State, h: f64) -> State {
        let x = state.x;
        let u = state.u;

        let k1 = model.derivative(x, &u);
        let u_half = na::Vector2::new(u[0] + 0.5 * h * u[1], u[1] + 0.5 * h * k1[1]);

        let k2 = model.derivative(x + 0.5 * h, &u_half);
        State {
            x: x + h,
            u: u + h * k2,
        }
    }

    fn order(&self) -> u32 {
        2
    }
}

impl StepScheme for RungeKutta4 {
    fn step(&self, model: &dyn DerivativeModel, state: &State, h: f64) -> State {
        let x = state.x;
        let u = state.u;

        //stage 1
        let k1 = model.derivative(x, &u);
        //stage 2
        let k2 = model.derivative(x + 0.5 * h, &(u + 0.5 * h * k1));
        //stage 3
        let k3 = model.derivative(x + 0.5 * h, &(u + 0.5 * h * k2));
        //stage 4
        let k4 = model.derivative(x + h, &(u + h * k3));

        State {
            x: x + h,
            u: u + (h / 6.0) * (k1 + 2.0 * k2 + 2.0 * k3 + k4),
        }
    }

    fn order(&self) -> u32 {
        4
    }
}

impl Scheme {
    pub const ALL: [Scheme; 2] = [Scheme::ImprovedEuler, Scheme::RungeKutta4];

    pub fn name(&self) -> &'static str {
        match self {
            Scheme::ImprovedEuler => "Improved Euler",
            Scheme::RungeKutta4 => "Runge-Kutta",
        }
    }

    pub fn stepper(&self) -> &'static dyn StepScheme {
        match self {
            Scheme::ImprovedEuler => &ImprovedEuler,
            Scheme::RungeKutta4 => &RungeKutta4,
        }
    }

    pub fn order(&self) -> u32 {
        self.stepper().order()
    }

    pub fn step(&self, model: &dyn DerivativeModel, state: &State, h: f64) -> State {
        self.stepper().step(model, state, h)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ode_core::derivative::{HomogeneousOde, LinearForcedOde};
    use approx::assert_abs_diff_eq;

    #[test]
    fn improved_euler_single_step_by_hand() {
        // z_half = 0 + 0.05 * (1 + 0) = 0.05, y_half = 1
        // z_next = 0 + 0.1 * (1 + 0.05) = 0.105, y_next = 1 + 0.1 * 0.05 = 1.005
        let s = ImprovedEuler.step(&LinearForcedOde, &State::new(0.0, 1.0, 0.0), 0.1);
        assert_abs_diff_eq!(s.x, 0.1, epsilon = 1e-15);
        assert_abs_diff_eq!(s.y(), 1.005, epsilon = 1e-15);
        assert_abs_diff_eq!(s.z(), 0.105, epsilon = 1e-15);
    }

    #[test]
    fn runge_kutta_single_step_by_hand() {
        // y'' = y from (1, 0): one step reproduces the Taylor series of
        // cosh/sinh through h^4
        let h: f64 = 0.1;
        let s = RungeKutta4.step(&HomogeneousOde, &State::new(0.0, 1.0, 0.0), h);
        let y = 1.0 + h.powi(2) / 2.0 + h.powi(4) / 24.0;
        let z = h + h.powi(3) / 6.0;
        assert_abs_diff_eq!(s.y(), y, epsilon = 1e-15);
        assert_abs_diff_eq!(s.z(), z, epsilon = 1e-15);
    }

    #[test]
    fn schemes_report_their_order() {
        assert_eq!(Scheme::ImprovedEuler.order(), 2);
        assert_eq!(Scheme::RungeKutta4.order(), 4);
    }

    #[test]
    fn enum_dispatch_matches_struct() {
        let s0 = State::new(0.3, 0.2, -0.4);
        assert_eq!(
            Scheme::RungeKutta4.step(&LinearForcedOde, &s0, 0.05),
            RungeKutta4.step(&LinearForcedOde, &s0, 0.05)
        );
        assert_eq!(
            Scheme::ImprovedEuler.step(&LinearForcedOde, &s0, 0.05),
            ImprovedEuler.step(&LinearForcedOde, &s0, 0.05)
        );
    }

    #[test]
    fn nan_propagates_through_a_step() {
        for scheme in Scheme::ALL {
            let s = scheme.step(&LinearForcedOde, &State::new(0.0, f64::NAN, 0.0), 0.1);
            assert!(s.y().is_nan());
            assert!(!s.is_finite());
        }
    }
}
