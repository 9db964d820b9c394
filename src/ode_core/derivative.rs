extern crate nalgebra as na;

use crate::ode_core::state::{InitialCondition, State};

//TRAITS
/// Right-hand side of a second-order ODE written as the first-order pair
/// `y' = z`, `z' = g(x, y, z)`.
pub trait DerivativeModel {
    /// Returns `(dy/dx, dz/dx)` at `(x, u)`.
    fn derivative(&self, x: f64, u: &na::Vector2<f64>) -> na::Vector2<f64>;
}

pub trait AnalyticalSolution {
    fn exact(&self, ic: &InitialCondition, x: f64) -> State;
}

//STRUCTS
/// `y'' - y = x`
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearForcedOde;

/// `y'' - y = 0`, kept as a reference system for the schemes' tests.
#[cfg(test)]
#[derive(Debug, Clone, Copy, Default)]
pub struct HomogeneousOde;

//IMPLEMENTATIONS
impl DerivativeModel for LinearForcedOde {
    fn derivative(&self, x: f64, u: &na::Vector2<f64>) -> na::Vector2<f64> {
        na::Vector2::new(u[1], u[0] + x)
    }
}

#[cfg(test)]
impl DerivativeModel for HomogeneousOde {
    fn derivative(&self, _x: f64, u: &na::Vector2<f64>) -> na::Vector2<f64> {
        na::Vector2::new(u[1], u[0])
    }
}

impl AnalyticalSolution for LinearForcedOde {
    // y = A e^x + B e^-x - x
    fn exact(&self, ic: &InitialCondition, x: f64) -> State {
        let a = 0.5 * (ic.y0 + ic.z0 + 1.0);
        let b = 0.5 * (ic.y0 - ic.z0 - 1.0);
        let y = a * x.exp() + b * (-x).exp() - x;
        let z = a * x.exp() - b * (-x).exp() - 1.0;
        State::new(x, y, z)
    }
}

#[cfg(test)]
impl AnalyticalSolution for HomogeneousOde {
    fn exact(&self, ic: &InitialCondition, x: f64) -> State {
        let y = ic.y0 * x.cosh() + ic.z0 * x.sinh();
        let z = ic.y0 * x.sinh() + ic.z0 * x.cosh();
        State::new(x, y, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::Vector2;

    #[test]
    fn forced_derivative_returns_slope_and_curvature() {
        let d = LinearForcedOde.derivative(0.5, &Vector2::new(2.0, -1.0));
        assert_eq!(d, Vector2::new(-1.0, 2.5));
    }

    #[test]
    fn homogeneous_derivative_ignores_x() {
        let u = Vector2::new(3.0, 4.0);
        assert_eq!(
            HomogeneousOde.derivative(0.0, &u),
            HomogeneousOde.derivative(10.0, &u)
        );
    }

    #[test]
    fn exact_solution_matches_initial_condition() {
        let ic = InitialCondition::new(2.0, -1.0);
        let s = LinearForcedOde.exact(&ic, 0.0);
        assert_abs_diff_eq!(s.y(), 2.0, epsilon = 1e-14);
        assert_abs_diff_eq!(s.z(), -1.0, epsilon = 1e-14);
    }

    #[test]
    fn exact_solution_for_unit_start() {
        let ic = InitialCondition::new(1.0, 0.0);
        let s = LinearForcedOde.exact(&ic, 1.0);
        let e = std::f64::consts::E;
        assert_abs_diff_eq!(s.y(), e - 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s.z(), e - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn exact_solution_satisfies_the_ode() {
        // central difference of z against y + x
        let ic = InitialCondition::new(0.3, 0.7);
        let (x, d) = (0.8, 1e-5);
        let zp = LinearForcedOde.exact(&ic, x + d).z();
        let zm = LinearForcedOde.exact(&ic, x - d).z();
        let s = LinearForcedOde.exact(&ic, x);
        assert_abs_diff_eq!((zp - zm) / (2.0 * d), s.y() + x, epsilon = 1e-6);
    }
}
