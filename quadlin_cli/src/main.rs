// quadlin_cli/src/main.rs

//! Command-line front end for quadrotor linearization and rotor
//! coefficient identification.
//!
//! `quadlin run --data assets/data/thrust_stand.toml` linearizes the
//! quadrotor at hover and then fits `k_f` and `k_m` from the recording.

mod cli;
mod config;
mod data;
mod error;
mod report;
mod synth;

use clap::Parser;
use cli::{Cli, Command, EstimateArgs, LinearizeArgs, ModelKind, SynthArgs};
use config::AppConfig;
use error::Result;
use quadlin_core::estimation::estimate_coefficients;
use quadlin_core::linearization::{linearize_at_hover, linearize_symbolic};
use quadlin_core::models::dynamics::{PlanarQuadrotor, Quadrotor, SymbolicDynamics};
use report::{EstimationReport, LinearizationReport, Report};
use std::process::ExitCode;
use synth::SynthOptions;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    // `RUST_LOG` wins over -v.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,quadlin={}", level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    // --- 1. Load Configuration ---
    let config = AppConfig::load(cli.config.as_deref())?;
    let mut report = Report::default();

    // --- 2. Dispatch ---
    match &cli.command {
        Command::Linearize(args) => {
            report.linearization = Some(linearize(args, &config)?);
        }
        Command::Estimate(args) => {
            report.estimation = Some(estimate(args, &config)?);
        }
        Command::Run(args) => {
            let linearize_args = LinearizeArgs {
                model: ModelKind::Quadrotor,
                symbolic: false,
            };
            report.linearization = Some(linearize(&linearize_args, &config)?);
            let estimate_args = EstimateArgs {
                data: args.data.clone(),
                curve: None,
            };
            report.estimation = Some(estimate(&estimate_args, &config)?);
        }
        Command::Synth(args) => {
            synthesize(args, &config)?;
            if cli.report.is_some() {
                warn!("--report has no effect for synth");
            }
            return Ok(());
        }
    }

    // --- 3. Optional Report File ---
    if let Some(path) = &cli.report {
        report.write(path)?;
    }
    Ok(())
}

fn linearize(args: &LinearizeArgs, config: &AppConfig) -> Result<LinearizationReport> {
    let model: Box<dyn SymbolicDynamics> = match args.model {
        ModelKind::Quadrotor => Box::new(Quadrotor),
        ModelKind::Planar => Box::new(PlanarQuadrotor),
    };
    info!(
        "Linearizing {} model ({} states, {} inputs)",
        model.name(),
        model.get_state_dim(),
        model.get_control_dim()
    );

    if args.symbolic {
        let jacobians = linearize_symbolic(model.as_ref())?;
        print!("{}", report::render_symbolic(&jacobians));
    }
    let linear = linearize_at_hover(model.as_ref(), &config.vehicle)?;
    print!("{}", report::render_linear_model(model.name(), &linear));

    Ok(LinearizationReport::new(model.name(), &linear))
}

fn estimate(args: &EstimateArgs, config: &AppConfig) -> Result<EstimationReport> {
    let data = data::load_thrust_stand(&args.data)?;
    let coefficients = estimate_coefficients(&data, &config.estimator)?;
    print!("{}", report::render_coefficients(&coefficients));

    let curve = match args.curve {
        Some(points) => {
            let max_command = data.thrusts.iter().copied().fold(0.0, f64::max);
            let curve = coefficients.fitted_curve(max_command, points);
            print!(
                "{}",
                report::render_curve(&coefficients, &curve, &data, &config.estimator)
            );
            curve
        }
        None => Vec::new(),
    };

    Ok(EstimationReport::new(coefficients, &curve))
}

fn synthesize(args: &SynthArgs, config: &AppConfig) -> Result<()> {
    let options = SynthOptions {
        k_f: args.k_f,
        levels: args.levels,
        trials: args.trials,
        noise: args.noise,
        seed: args.seed,
    };
    let dataset = synth::generate(&options, &config.estimator)?;
    data::save_thrust_stand(&args.output, &dataset)?;
    info!(
        "Wrote {} levels x {} trials to {}",
        dataset.len(),
        dataset.trials(),
        args.output.display()
    );
    Ok(())
}
