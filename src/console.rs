use std::io::{BufRead, Write};

use log::warn;

use crate::config::SessionConfig;
use crate::error::SolverError;
use crate::ode_core::{derivative::DerivativeModel, state::InitialCondition};
use crate::session::{QuerySession, SessionState};

pub const BANNER: &str = "For the initial value problem y'' - y = x";
const Y0_PROMPT: &str = "Enter the value of y at x=0: ";
const Z0_PROMPT: &str = "Enter the value of y' at x=0: ";
const H_PROMPT: &str = "Enter the step size for the numerical solution: ";
const X_PROMPT: &str = "At what value of x do you want to know y and y'? ";
const CONTINUE_PROMPT: &str = "Do you want to compute at a different x? (Y/N) ";

/// Writes `prompt` and reads one line. `None` on end of input.
fn prompt_line<R, W>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> Result<Option<String>, SolverError>
where
    R: BufRead,
    W: Write,
{
    write!(output, "{}", prompt)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Re-prompts until the operator types a finite number accepted by `accept`.
fn prompt_number<R, W, A>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
    accept: A,
) -> Result<Option<f64>, SolverError>
where
    R: BufRead,
    W: Write,
    A: Fn(f64) -> bool,
{
    loop {
        let Some(line) = prompt_line(input, output, prompt)? else {
            return Ok(None);
        };
        match line.parse::<f64>() {
            Ok(value) if value.is_finite() && accept(value) => return Ok(Some(value)),
            Ok(value) => writeln!(output, "{} is not allowed here, try again.", value)?,
            Err(_) => writeln!(output, "'{}' is not a number, try again.", line)?,
        }
    }
}

/// Fills in whatever the config does not already provide. `None` if input
/// ends before all three values are known.
pub fn prompt_initial_values<R, W>(
    config: &SessionConfig,
    input: &mut R,
    output: &mut W,
) -> Result<Option<(InitialCondition, f64)>, SolverError>
where
    R: BufRead,
    W: Write,
{
    let y0 = match config.y0 {
        Some(v) => v,
        None => match prompt_number(input, output, Y0_PROMPT, |_| true)? {
            Some(v) => v,
            None => return Ok(None),
        },
    };
    let z0 = match config.z0 {
        Some(v) => v,
        None => match prompt_number(input, output, Z0_PROMPT, |_| true)? {
            Some(v) => v,
            None => return Ok(None),
        },
    };
    let h = match config.h {
        Some(v) => v,
        None => match prompt_number(input, output, H_PROMPT, |v| v > 0.0)? {
            Some(v) => v,
            None => return Ok(None),
        },
    };
    Ok(Some((InitialCondition::new(y0, z0), h)))
}

/// Serves queries until the operator declines or input ends. Returns the
/// number of queries answered.
pub fn run_query_loop<M, R, W>(
    session: &QuerySession<M>,
    input: &mut R,
    output: &mut W,
) -> Result<usize, SolverError>
where
    M: DerivativeModel,
    R: BufRead,
    W: Write,
{
    let mut state = SessionState::AwaitingQuery;
    let mut served = 0;

    while state == SessionState::AwaitingQuery {
        let Some(x_target) = prompt_number(input, output, X_PROMPT, |_| true)? else {
            break;
        };

        match session.serve(x_target) {
            Ok(report) => {
                writeln!(output, "{}", report)?;
                served += 1;
            }
            Err(e) => {
                warn!("query at x = {} failed: {}", x_target, e);
                writeln!(output, "Cannot evaluate at x={}: {}", x_target, e)?;
            }
        }

        let Some(answer) = prompt_line(input, output, CONTINUE_PROMPT)? else {
            break;
        };
        state = state.advance(&answer);
    }

    Ok(served)
}
