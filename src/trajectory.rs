use std::fs;
use std::path::Path;

use csv::Writer;
use log::info;
use serde::Serialize;

use crate::error::SolverError;
use crate::ode_core::derivative::{AnalyticalSolution, DerivativeModel};
use crate::progress::progress_bar;
use crate::session::QuerySession;
use crate::time_integrator::step::Scheme;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectoryRow {
    pub x: f64,
    pub y_euler: f64,
    pub z_euler: f64,
    pub y_rk4: f64,
    pub z_rk4: f64,
    pub y_exact: f64,
    pub z_exact: f64,
}

/// Every step of both schemes from `x = 0` to `x_target`, next to the
/// closed-form solution.
pub fn trajectory_rows<M>(
    session: &QuerySession<M>,
    x_target: f64,
) -> Result<Vec<TrajectoryRow>, SolverError>
where
    M: DerivativeModel + AnalyticalSolution,
{
    let integrator = session.integrator();
    let ic = session.initial_condition();

    let euler = integrator.trajectory(Scheme::ImprovedEuler, ic, x_target)?;
    let rk4 = integrator.trajectory(Scheme::RungeKutta4, ic, x_target)?;

    let rows = euler
        .iter()
        .zip(rk4.iter())
        .map(|(e, r)| {
            let exact = integrator.model().exact(ic, r.x);
            TrajectoryRow {
                x: r.x,
                y_euler: e.y(),
                z_euler: e.z(),
                y_rk4: r.y(),
                z_rk4: r.z(),
                y_exact: exact.y(),
                z_exact: exact.z(),
            }
        })
        .collect();
    Ok(rows)
}

pub fn solve_trajectory<M, P>(
    session: &QuerySession<M>,
    x_target: f64,
    csv_path: P,
) -> Result<usize, SolverError>
where
    M: DerivativeModel + AnalyticalSolution,
    P: AsRef<Path>,
{
    let csv_path = csv_path.as_ref();
    let rows = trajectory_rows(session, x_target)?;

    if let Some(parent) = csv_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut wtr = Writer::from_path(csv_path)?;

    let pb = progress_bar(rows.len() as u64)?;
    for row in &rows {
        wtr.serialize(row)?;
        pb.inc(1);
    }
    wtr.flush()?;
    pb.finish_with_message("trajectory written");

    info!("wrote {} trajectory rows to {}", rows.len(), csv_path.display());
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ode_core::state::InitialCondition;
    use crate::time_integrator::integrate::Termination;
    use approx::assert_abs_diff_eq;
    use tempfile::tempdir;

    fn unit_session(h: f64) -> QuerySession {
        QuerySession::new(InitialCondition::new(1.0, 0.0), h).unwrap()
    }

    #[test]
    fn rows_start_at_initial_condition_and_end_at_target() {
        let session = unit_session(0.1);
        let rows = trajectory_rows(&session, 1.0).unwrap();
        assert_eq!(rows.len(), 11);

        let first = &rows[0];
        assert_eq!((first.x, first.y_euler, first.y_rk4, first.y_exact), (0.0, 1.0, 1.0, 1.0));

        let last = rows.last().unwrap();
        let report = session.serve(1.0).unwrap();
        assert_eq!(last.y_rk4, report.runge_kutta.y);
        assert_eq!(last.z_euler, report.improved_euler.z);
        assert_abs_diff_eq!(last.y_exact, std::f64::consts::E - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn partial_final_step_adds_a_short_last_row() {
        let session = unit_session(0.3).with_termination(Termination::PartialFinalStep);
        let rows = trajectory_rows(&session, 1.0).unwrap();
        assert_eq!(rows.len(), 5);
        assert_abs_diff_eq!(rows[4].x - rows[3].x, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn csv_is_written() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("solution.csv");
        let written = solve_trajectory(&unit_session(0.25), 1.0, &path).unwrap();
        assert_eq!(written, 5);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec!["x", "y_euler", "z_euler", "y_rk4", "z_rk4", "y_exact", "z_exact"]
        );
        assert_eq!(reader.records().count(), 5);
    }

    #[test]
    fn unreachable_target_writes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("never.csv");
        assert!(solve_trajectory(&unit_session(0.3), 1.0, &path).is_err());
        assert!(!path.exists());
    }
}
