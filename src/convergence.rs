use std::fs;
use std::path::Path;

use csv::Writer;
use log::info;
use serde::Serialize;

use crate::error::SolverError;
use crate::ode_core::{
    derivative::{AnalyticalSolution, DerivativeModel},
    state::{InitialCondition, State},
};
use crate::progress::progress_bar;
use crate::time_integrator::{integrate::Integrator, step::Scheme};

/// Errors of both schemes at one step size. Orders are measured against the
/// previous (twice as large) step size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvergenceRow {
    pub h: f64,
    pub steps: usize,
    pub err_euler: f64,
    pub err_rk4: f64,
    pub order_euler: Option<f64>,
    pub order_rk4: Option<f64>,
}

fn calc_err(approx: &State, exact: &State) -> f64 {
    (approx.y() - exact.y()).abs()
}

fn observed_order(err_coarse: f64, err_fine: f64) -> Option<f64> {
    if err_coarse > 0.0 && err_fine > 0.0 {
        Some((err_coarse / err_fine).log2())
    } else {
        None
    }
}

/// Runs both schemes at `h0, h0/2, ..., h0/2^(levels-1)`, where `h0` and the
/// tolerance and termination settings come from `base`, and compares `y` at
/// `x_target` with the closed-form solution.
pub fn convergence_study<M>(
    base: &Integrator<M>,
    ic: &InitialCondition,
    x_target: f64,
    levels: u32,
) -> Result<Vec<ConvergenceRow>, SolverError>
where
    M: DerivativeModel + AnalyticalSolution + Clone,
{
    let h0 = base.step_size();
    let exact = base.model().exact(ic, x_target);
    let step_sizes: Vec<f64> = (0..levels).map(|i| h0 / 2_f64.powi(i as i32)).collect();

    let pb = progress_bar(step_sizes.len() as u64)?;
    let mut rows: Vec<ConvergenceRow> = Vec::with_capacity(step_sizes.len());

    for h in step_sizes {
        pb.set_message(format!("h = {}", h));
        let integrator = Integrator::new(base.model().clone(), h)
            .with_tolerance(base.tolerance())
            .with_termination(base.termination());

        let euler = integrator.integrate(Scheme::ImprovedEuler, ic, x_target)?;

        // the initial state is observed too
        let mut visited = 0_usize;
        let rk4 =
            integrator.integrate_with(Scheme::RungeKutta4, ic, x_target, |_| visited += 1)?;

        let err_euler = calc_err(&euler, &exact);
        let err_rk4 = calc_err(&rk4, &exact);
        let (order_euler, order_rk4) = match rows.last() {
            Some(prev) => (
                observed_order(prev.err_euler, err_euler),
                observed_order(prev.err_rk4, err_rk4),
            ),
            None => (None, None),
        };

        rows.push(ConvergenceRow {
            h,
            steps: visited - 1,
            err_euler,
            err_rk4,
            order_euler,
            order_rk4,
        });
        pb.inc(1);
    }
    pb.finish_with_message("convergence study complete");

    Ok(rows)
}

pub fn write_convergence_csv<P: AsRef<Path>>(
    rows: &[ConvergenceRow],
    csv_path: P,
) -> Result<(), SolverError> {
    let csv_path = csv_path.as_ref();
    if let Some(parent) = csv_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut wtr = Writer::from_path(csv_path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;

    info!("wrote {} convergence rows to {}", rows.len(), csv_path.display());
    Ok(())
}
