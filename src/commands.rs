use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::Path;

use log::info;

use crate::config::SessionConfig;
use crate::console::{prompt_initial_values, run_query_loop, BANNER};
use crate::convergence::{convergence_study, write_convergence_csv};
use crate::error::SolverError;
use crate::ode_core::state::InitialCondition;
use crate::session::QuerySession;
use crate::time_integrator::step::Scheme;
use crate::trajectory::solve_trajectory;

pub const DEFAULT_Y0: f64 = 1.0;
pub const DEFAULT_Z0: f64 = 0.0;
pub const DEFAULT_H: f64 = 0.1;

pub fn build_session(
    config: &SessionConfig,
    ic: InitialCondition,
    h: f64,
) -> Result<QuerySession, SolverError> {
    Ok(QuerySession::new(ic, h)?
        .with_tolerance(config.tolerance)?
        .with_termination(config.termination))
}

/// Session from the config, with `y(0) = 1, y'(0) = 0, h = 0.1` for anything
/// left unset.
pub fn session_with_defaults(config: &SessionConfig) -> Result<QuerySession, SolverError> {
    let ic = InitialCondition::new(
        config.y0.unwrap_or(DEFAULT_Y0),
        config.z0.unwrap_or(DEFAULT_Z0),
    );
    build_session(config, ic, config.h.unwrap_or(DEFAULT_H))
}

/// Banner, prompts for whatever the config leaves open, then the query loop.
/// A bad step size or tolerance from the config is reported before any prompt.
pub fn interactive_with<R, W>(
    config: &SessionConfig,
    input: &mut R,
    output: &mut W,
) -> Result<usize, SolverError>
where
    R: BufRead,
    W: Write,
{
    config.validate()?;

    writeln!(output, "{}", BANNER)?;
    let Some((ic, h)) = prompt_initial_values(config, input, output)? else {
        return Ok(0);
    };

    let session = build_session(config, ic, h)?;
    run_query_loop(&session, input, output)
}

pub fn interactive(config: &SessionConfig) -> Result<(), Box<dyn Error>> {
    let stdin = io::stdin();
    let served = interactive_with(config, &mut stdin.lock(), &mut io::stdout())?;
    info!("session finished after {} queries", served);
    Ok(())
}

pub fn evaluate(config: &SessionConfig, x_target: f64) -> Result<(), Box<dyn Error>> {
    let session = session_with_defaults(config)?;
    let report = session.serve(x_target)?;
    println!("{}", report);
    Ok(())
}

pub fn conv_linear_forced(
    config: &SessionConfig,
    x_target: f64,
    h0: f64,
    levels: u32,
    csv_path: &Path,
) -> Result<(), Box<dyn Error>> {
    let session = session_with_defaults(&SessionConfig {
        h: Some(h0),
        ..config.clone()
    })?;

    let rows = convergence_study(
        session.integrator(),
        session.initial_condition(),
        x_target,
        levels,
    )?;
    write_convergence_csv(&rows, csv_path)?;

    println!("{}", nominal_orders());
    for row in &rows {
        println!(
            "h = {:<10} err_euler = {:<12.3e} err_rk4 = {:<12.3e} order_euler = {:<6} order_rk4 = {}",
            row.h,
            row.err_euler,
            row.err_rk4,
            format_order(row.order_euler),
            format_order(row.order_rk4)
        );
    }
    Ok(())
}

pub fn trajectory_linear_forced(
    config: &SessionConfig,
    x_target: f64,
    csv_path: &Path,
) -> Result<(), Box<dyn Error>> {
    let session = session_with_defaults(config)?;
    let written = solve_trajectory(&session, x_target, csv_path)?;
    println!("{} rows written to {}", written, csv_path.display());
    Ok(())
}

fn nominal_orders() -> String {
    let parts: Vec<String> = Scheme::ALL
        .iter()
        .map(|scheme| format!("{} {}", scheme, scheme.order()))
        .collect();
    format!("nominal order: {}", parts.join(", "))
}

fn format_order(order: Option<f64>) -> String {
    order.map_or_else(|| "-".to_string(), |p| format!("{:.2}", p))
}
