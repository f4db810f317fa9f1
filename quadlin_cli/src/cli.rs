// quadlin_cli/src/cli.rs

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Quadlin: quadrotor linearization and rotor coefficient identification.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional TOML file layered over the built-in vehicle and estimator defaults.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Raise log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Also write the results to this TOML file.
    #[arg(long, global = true)]
    pub report: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Linearize a model about hover and print A and B.
    Linearize(LinearizeArgs),
    /// Fit k_f and k_m from thrust-stand measurements.
    Estimate(EstimateArgs),
    /// Linearize the quadrotor, then fit the rotor coefficients.
    Run(RunArgs),
    /// Write a synthetic thrust-stand dataset.
    Synth(SynthArgs),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelKind {
    #[default]
    Quadrotor,
    Planar,
}

#[derive(Args, Debug, Clone)]
pub struct LinearizeArgs {
    #[arg(short, long, value_enum, default_value_t = ModelKind::Quadrotor)]
    pub model: ModelKind,

    /// Also print the unevaluated Jacobian entries.
    #[arg(long, default_value_t = false)]
    pub symbolic: bool,
}

#[derive(Args, Debug, Clone)]
pub struct EstimateArgs {
    /// Measurement file (.toml or .json) with `thrusts` and `grams`.
    #[arg(short, long)]
    pub data: PathBuf,

    /// Print this many samples of the fitted thrust curve.
    #[arg(long)]
    pub curve: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Measurement file (.toml or .json) with `thrusts` and `grams`.
    #[arg(short, long)]
    pub data: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct SynthArgs {
    /// Destination TOML file.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Thrust coefficient used to generate the masses.
    #[arg(long, default_value_t = 3.25e-11)]
    pub k_f: f64,

    /// Number of evenly spaced command levels in (0, 1].
    #[arg(long, default_value_t = 8)]
    pub levels: usize,

    /// Repeated trials per command level.
    #[arg(long, default_value_t = 3)]
    pub trials: usize,

    /// Standard deviation of the additive mass noise, in grams.
    #[arg(long, default_value_t = 0.0)]
    pub noise: f64,

    /// Seed for the noise generator.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}
