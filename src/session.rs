use std::fmt;

use log::{info, warn};

use crate::config::check_step_size;
use crate::error::{IntegrationError, SolverError};
use crate::ode_core::{
    derivative::{DerivativeModel, LinearForcedOde},
    state::InitialCondition,
};
use crate::time_integrator::{
    integrate::{Integrator, Termination},
    step::Scheme,
};

/// One scheme's answer to a query, at full precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Approximation {
    pub scheme: Scheme,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryReport {
    pub x_target: f64,
    pub improved_euler: Approximation,
    pub runge_kutta: Approximation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingQuery,
    Done,
}

/// Holds the initial condition and step size for the lifetime of an
/// interactive session. Every query restarts from `x = 0`.
#[derive(Debug, Clone)]
pub struct QuerySession<M: DerivativeModel = LinearForcedOde> {
    ic: InitialCondition,
    integrator: Integrator<M>,
}

impl QuerySession<LinearForcedOde> {
    pub fn new(ic: InitialCondition, h: f64) -> Result<Self, SolverError> {
        QuerySession::with_model(LinearForcedOde, ic, h)
    }
}

impl<M: DerivativeModel> QuerySession<M> {
    pub fn with_model(model: M, ic: InitialCondition, h: f64) -> Result<Self, SolverError> {
        let h = check_step_size(h)?;
        if !(ic.y0.is_finite() && ic.z0.is_finite()) {
            return Err(SolverError::InvalidInitialCondition {
                y0: ic.y0,
                z0: ic.z0,
            });
        }
        info!("session started: y(0) = {}, y'(0) = {}, h = {}", ic.y0, ic.z0, h);
        Ok(QuerySession {
            ic,
            integrator: Integrator::new(model, h),
        })
    }

    pub fn with_termination(mut self, termination: Termination) -> Self {
        self.integrator = self.integrator.with_termination(termination);
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Result<Self, SolverError> {
        if !(tolerance > 0.0 && tolerance.is_finite()) {
            return Err(SolverError::InvalidTolerance(tolerance));
        }
        self.integrator = self.integrator.with_tolerance(tolerance);
        Ok(self)
    }

    pub fn initial_condition(&self) -> &InitialCondition {
        &self.ic
    }

    pub fn integrator(&self) -> &Integrator<M> {
        &self.integrator
    }

    pub fn step_size(&self) -> f64 {
        self.integrator.step_size()
    }

    pub fn solve(&self, scheme: Scheme, x_target: f64) -> Result<Approximation, IntegrationError> {
        let state = self.integrator.integrate(scheme, &self.ic, x_target)?;
        if !state.is_finite() {
            warn!(
                "{} produced a non-finite value at x = {}; h = {} may be too large",
                scheme,
                x_target,
                self.step_size()
            );
        }
        Ok(Approximation {
            scheme,
            y: state.y(),
            z: state.z(),
        })
    }

    pub fn serve(&self, x_target: f64) -> Result<QueryReport, IntegrationError> {
        Ok(QueryReport {
            x_target,
            improved_euler: self.solve(Scheme::ImprovedEuler, x_target)?,
            runge_kutta: self.solve(Scheme::RungeKutta4, x_target)?,
        })
    }
}

impl SessionState {
    /// Applies the operator's answer to "compute at a different x?".
    pub fn advance(self, answer: &str) -> SessionState {
        match self {
            SessionState::Done => SessionState::Done,
            SessionState::AwaitingQuery => {
                if answer.trim().eq_ignore_ascii_case("y") {
                    SessionState::AwaitingQuery
                } else {
                    SessionState::Done
                }
            }
        }
    }
}

impl fmt::Display for Approximation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "For the {} method: y={:.3}, and y'={:.3}",
            self.scheme, self.y, self.z
        )
    }
}

impl fmt::Display for QueryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "At x={:.3}", self.x_target)?;
        writeln!(f, "{}", self.improved_euler)?;
        write!(f, "{}", self.runge_kutta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_integrator::integrate::integrate;
    use approx::assert_abs_diff_eq;

    fn unit_session() -> QuerySession {
        QuerySession::new(InitialCondition::new(1.0, 0.0), 0.1).unwrap()
    }

    #[test]
    fn report_holds_both_schemes_at_full_precision() {
        let report = unit_session().serve(1.0).unwrap();
        let (y_e, z_e) = integrate(Scheme::ImprovedEuler, 1.0, 0.0, 0.1, 1.0).unwrap();
        let (y_r, z_r) = integrate(Scheme::RungeKutta4, 1.0, 0.0, 0.1, 1.0).unwrap();

        assert_eq!(report.improved_euler.scheme, Scheme::ImprovedEuler);
        assert_eq!(report.runge_kutta.scheme, Scheme::RungeKutta4);
        assert_eq!((report.improved_euler.y, report.improved_euler.z), (y_e, z_e));
        assert_eq!((report.runge_kutta.y, report.runge_kutta.z), (y_r, z_r));
    }

    #[test]
    fn report_renders_three_decimals() {
        let report = unit_session().serve(1.0).unwrap();
        assert_eq!(
            report.to_string(),
            "At x=1.000\n\
             For the Improved Euler method: y=1.714, and y'=1.714\n\
             For the Runge-Kutta method: y=1.718, and y'=1.718"
        );
    }

    #[test]
    fn queries_restart_from_the_initial_condition() {
        let session = unit_session();
        let first = session.serve(0.5).unwrap();
        let _ = session.serve(2.0).unwrap();
        let again = session.serve(0.5).unwrap();
        assert_eq!(first, again);

        let fresh = unit_session().serve(0.5).unwrap();
        assert_eq!(first, fresh);
    }

    #[test]
    fn zero_query_reports_initial_values() {
        let report = unit_session().serve(0.0).unwrap();
        assert_eq!((report.runge_kutta.y, report.runge_kutta.z), (1.0, 0.0));
        assert_eq!((report.improved_euler.y, report.improved_euler.z), (1.0, 0.0));
    }

    #[test]
    fn unreachable_query_is_an_error_not_a_hang() {
        let session = QuerySession::new(InitialCondition::new(1.0, 0.0), 0.3).unwrap();
        assert!(matches!(
            session.serve(1.0),
            Err(IntegrationError::UnreachableTarget { .. })
        ));

        let session = session.with_termination(Termination::PartialFinalStep);
        let report = session.serve(1.0).unwrap();
        assert_abs_diff_eq!(report.runge_kutta.y, std::f64::consts::E - 1.0, epsilon = 1e-3);
    }

    #[test]
    fn bad_session_parameters_are_rejected() {
        assert!(matches!(
            QuerySession::new(InitialCondition::new(1.0, 0.0), 0.0),
            Err(SolverError::InvalidStepSize(_))
        ));
        assert!(matches!(
            QuerySession::new(InitialCondition::new(f64::NAN, 0.0), 0.1),
            Err(SolverError::InvalidInitialCondition { .. })
        ));
        assert!(matches!(
            unit_session().with_tolerance(-1.0),
            Err(SolverError::InvalidTolerance(_))
        ));
    }

    #[test]
    fn state_machine_loops_on_yes_and_stops_otherwise() {
        let s = SessionState::AwaitingQuery;
        assert_eq!(s.advance("Y"), SessionState::AwaitingQuery);
        assert_eq!(s.advance(" y\n"), SessionState::AwaitingQuery);
        assert_eq!(s.advance("N"), SessionState::Done);
        assert_eq!(s.advance("yes"), SessionState::Done);
        assert_eq!(SessionState::Done.advance("y"), SessionState::Done);
    }
}
