// quadlin_cli/src/synth.rs

//! Synthetic thrust-stand recordings generated from a known `k_f`.

use crate::error::{AppError, Result};
use nalgebra::{DMatrix, DVector};
use quadlin_core::estimation::{EstimatorSettings, ThrustStandData};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthOptions {
    pub k_f: f64,
    pub levels: usize,
    pub trials: usize,
    /// Standard deviation of the mass noise, in grams.
    pub noise: f64,
    pub seed: u64,
}

/// Masses that a stand would read for `k_f`, one column per trial.
///
/// Command levels are `i / levels` for `i = 1..=levels`. The generator is
/// seeded so that the same options always produce the same dataset.
pub fn generate(options: &SynthOptions, settings: &EstimatorSettings) -> Result<ThrustStandData> {
    if options.levels == 0 || options.trials == 0 {
        return Err(AppError::InvalidArgument(
            "levels and trials must both be at least 1".to_string(),
        ));
    }
    if !(options.k_f.is_finite() && options.k_f >= 0.0) {
        return Err(AppError::InvalidArgument(format!(
            "k_f must be non-negative, got {}",
            options.k_f
        )));
    }
    let noise = Normal::new(0.0, options.noise)
        .map_err(|e| AppError::InvalidArgument(format!("noise: {}", e)))?;
    let mut rng = ChaCha8Rng::seed_from_u64(options.seed);

    let scale = settings.command_scale();
    let grams_per_newton = 1.0 / settings.newtons_per_gram();
    let thrusts = DVector::from_fn(options.levels, |i, _| (i + 1) as f64 / options.levels as f64);

    // Filled column by column so trial j only draws after trial j-1.
    let mut grams = DMatrix::zeros(options.levels, options.trials);
    for j in 0..options.trials {
        for i in 0..options.levels {
            let force = options.k_f * (thrusts[i] * scale).powi(2);
            grams[(i, j)] = force * grams_per_newton + noise.sample(&mut rng);
        }
    }
    debug!(
        levels = options.levels,
        trials = options.trials,
        seed = options.seed,
        "generated synthetic recording"
    );

    Ok(ThrustStandData::new(thrusts, grams))
}
