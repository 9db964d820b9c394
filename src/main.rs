pub mod commands;
pub mod config;
pub mod console;
pub mod convergence;
pub mod error;
pub mod ode_core;
pub mod progress;
pub mod session;
pub mod time_integrator;
pub mod trajectory;

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

use config::{load_session_config, SessionConfig};

#[derive(Parser)]
#[command(name = "ivp_solver")]
#[command(about = "Improved Euler and Runge-Kutta solutions of y'' - y = x")]
#[command(version)]
struct Cli {
    /// YAML file with y0, z0, h, tolerance and termination
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SessionArgs {
    /// y at x = 0
    #[arg(long, allow_negative_numbers = true)]
    y0: Option<f64>,
    /// y' at x = 0
    #[arg(long, allow_negative_numbers = true)]
    z0: Option<f64>,
    /// Step size
    #[arg(long)]
    h: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask for the initial values, then answer queries until told to stop
    Query {
        #[command(flatten)]
        session: SessionArgs,
    },
    /// Evaluate both schemes once at x
    Eval {
        #[arg(long, allow_negative_numbers = true)]
        x: f64,
        #[command(flatten)]
        session: SessionArgs,
    },
    /// Error against the exact solution for successively halved step sizes
    Convergence {
        #[arg(long, default_value_t = 1.0)]
        x: f64,
        #[arg(long, default_value_t = 0.1)]
        h0: f64,
        #[arg(long, default_value_t = 6)]
        levels: u32,
        #[arg(long, default_value = "results/csv_files/convergence/conv_linear_forced.csv")]
        out: PathBuf,
    },
    /// Write every step of both schemes and the exact solution to CSV
    Trajectory {
        #[arg(long, default_value_t = 1.0)]
        x: f64,
        #[command(flatten)]
        session: SessionArgs,
        #[arg(long, default_value = "results/csv_files/plot_files/solution_linear_forced.csv")]
        out: PathBuf,
    },
}

impl SessionArgs {
    fn apply(&self, config: SessionConfig) -> SessionConfig {
        config.override_with(self.y0, self.z0, self.h)
    }
}

fn init_logger(verbose: u8) -> Result<(), log::SetLoggerError> {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logger(cli.verbose)?;

    let config = match &cli.config {
        Some(path) => load_session_config(path)?,
        None => SessionConfig::default(),
    };

    match cli.command {
        Commands::Query { session } => commands::interactive(&session.apply(config)),
        Commands::Eval { x, session } => commands::evaluate(&session.apply(config), x),
        Commands::Convergence { x, h0, levels, out } => {
            commands::conv_linear_forced(&config, x, h0, levels, &out)
        }
        Commands::Trajectory { x, session, out } => {
            commands::trajectory_linear_forced(&session.apply(config), x, &out)
        }
    }
}
