// quadlin_core/src/estimation/mod.rs

//! Rotor coefficient estimation from thrust-stand data.
//!
//! The per-motor thrust model is `F = k_f * (c * 2^bits)^2` where `c` is the
//! command as a fraction of maximum rotor speed. The drag (torque)
//! coefficient follows from a fixed published ratio, `k_m = k_f / ratio`.

mod nnls;
mod thrust_stand;

pub use nnls::solve_nonnegative_least_squares;
pub use thrust_stand::{ThrustStandData, ThrustStandRecord};

use crate::error::EstimationError;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Ratio `k_f / k_m` published for the Crazyflie 2.x motor and propeller.
pub const DEFAULT_DRAG_RATIO: f64 = 40.7333;

/// Unit conventions of the thrust stand and the motor command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EstimatorSettings {
    /// Used to turn measured grams into newtons, in m/s^2.
    pub gravity: f64,
    /// The stand measures the whole vehicle; forces are divided evenly over the rotors.
    pub rotor_count: u32,
    /// Commands are scaled to `2^command_bits` before squaring.
    pub command_bits: u32,
    pub drag_ratio: f64,
}

impl Default for EstimatorSettings {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            rotor_count: 4,
            command_bits: 16,
            drag_ratio: DEFAULT_DRAG_RATIO,
        }
    }
}

impl EstimatorSettings {
    /// Newtons per motor for each gram on the scale: `g / (1000 * rotors)`.
    pub fn newtons_per_gram(&self) -> f64 {
        self.gravity / (1000.0 * self.rotor_count as f64)
    }

    /// Full-scale integer command, `2^command_bits`.
    pub fn command_scale(&self) -> f64 {
        2f64.powi(self.command_bits as i32)
    }

    fn validate(&self) -> Result<(), EstimationError> {
        // 2^1024 overflows an f64.
        if self.command_bits == 0 || self.command_bits >= f64::MAX_EXP as u32 {
            return Err(EstimationError::InvalidInput(format!(
                "command_bits must be in 1..{}, got {}",
                f64::MAX_EXP,
                self.command_bits
            )));
        }
        if self.rotor_count == 0 {
            return Err(EstimationError::InvalidInput(
                "rotor_count must be at least 1".to_string(),
            ));
        }
        if !(self.gravity.is_finite() && self.gravity > 0.0) {
            return Err(EstimationError::InvalidInput(format!(
                "gravity must be positive, got {}",
                self.gravity
            )));
        }
        if !(self.drag_ratio.is_finite() && self.drag_ratio > 0.0) {
            return Err(EstimationError::InvalidInput(format!(
                "drag_ratio must be positive, got {}",
                self.drag_ratio
            )));
        }
        Ok(())
    }
}

/// The fitted thrust and drag coefficients plus fit diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RotorCoefficients {
    /// Thrust coefficient, newtons per squared integer command.
    pub k_f: f64,
    /// Drag coefficient, `k_f / drag_ratio`.
    pub k_m: f64,
    /// Number of (command, force) pairs used in the fit.
    pub samples: usize,
    /// Root-mean-square force residual, in newtons per motor.
    pub rms_residual: f64,
    /// True when the non-negativity bound on `k_f` was active.
    pub bound_active: bool,
    /// The `2^bits` scale the coefficients were fitted against.
    pub command_scale: f64,
}

impl RotorCoefficients {
    /// Predicted per-motor force in newtons for a command fraction.
    pub fn thrust_at(&self, command: f64) -> f64 {
        self.k_f * (command * self.command_scale).powi(2)
    }

    /// Evenly spaced samples of the fitted curve on `[0, max_command]`.
    pub fn fitted_curve(&self, max_command: f64, points: usize) -> Vec<(f64, f64)> {
        match points {
            0 => Vec::new(),
            1 => vec![(max_command, self.thrust_at(max_command))],
            n => (0..n)
                .map(|i| {
                    let c = max_command * i as f64 / (n - 1) as f64;
                    (c, self.thrust_at(c))
                })
                .collect(),
        }
    }
}

/// Per-motor forces in newtons, same shape as `data.grams`.
pub fn measured_forces(data: &ThrustStandData, settings: &EstimatorSettings) -> DMatrix<f64> {
    data.grams.map(|g| g * settings.newtons_per_gram())
}

/// Fits `k_f >= 0` by least squares over every trial and derives `k_m`.
///
/// Inputs are validated before any arithmetic: shape first, then values,
/// then the design vector.
pub fn estimate_coefficients(
    data: &ThrustStandData,
    settings: &EstimatorSettings,
) -> Result<RotorCoefficients, EstimationError> {
    // --- 1. Shape ---
    if data.thrusts.nrows() != data.grams.nrows() {
        return Err(EstimationError::ShapeMismatch {
            commands: data.thrusts.nrows(),
            rows: data.grams.nrows(),
        });
    }
    if data.trials() == 0 {
        return Err(EstimationError::NoTrials);
    }

    // --- 2. Values ---
    settings.validate()?;
    if let Some((i, c)) = data
        .thrusts
        .iter()
        .enumerate()
        .find(|(_, c)| !c.is_finite() || **c < 0.0)
    {
        return Err(EstimationError::InvalidInput(format!(
            "command {} at row {} must be a non-negative fraction",
            c, i
        )));
    }
    if let Some(g) = data.grams.iter().find(|g| !g.is_finite()) {
        return Err(EstimationError::InvalidInput(format!(
            "measured mass {} is not finite",
            g
        )));
    }
    if data.thrusts.iter().any(|&c| c > 1.0) {
        warn!("command fractions above 1.0 found; check the data units");
    }

    // --- 3. Design vector x_i = (c_i * 2^bits)^2, one copy per trial ---
    let scale = settings.command_scale();
    let squared: Vec<f64> = data.thrusts.iter().map(|c| (c * scale).powi(2)).collect();
    if let Some((i, _)) = squared.iter().enumerate().find(|(_, x)| !x.is_finite()) {
        return Err(EstimationError::InvalidInput(format!(
            "command {} at row {} overflows when scaled and squared",
            data.thrusts[i], i
        )));
    }
    if squared.iter().all(|&x| x == 0.0) {
        return Err(EstimationError::DegenerateDesign);
    }

    // `grams` is column-major, so trials are laid out one after the other.
    let trials = data.trials();
    let design = DMatrix::from_iterator(
        squared.len() * trials,
        1,
        (0..trials).flat_map(|_| squared.iter().copied()),
    );
    let response = DVector::from_iterator(
        design.nrows(),
        measured_forces(data, settings).iter().copied(),
    );
    if !(design.norm().is_finite() && response.norm().is_finite()) {
        return Err(EstimationError::InvalidInput(
            "measurements are too large to fit in double precision".to_string(),
        ));
    }
    debug!(samples = design.nrows(), scale, "fitting thrust coefficient");

    // --- 4. Bounded solve ---
    let (solution, bound_active) = solve_nonnegative_least_squares(&design, &response)?;
    let k_f = solution[0];
    if bound_active {
        warn!("thrust coefficient clamped at zero; measured force does not grow with command");
    }

    let residual = response - &design * &solution;
    let rms_residual = (residual.norm_squared() / design.nrows() as f64).sqrt();

    Ok(RotorCoefficients {
        k_f,
        k_m: k_f / settings.drag_ratio,
        samples: design.nrows(),
        rms_residual,
        bound_active,
        command_scale: scale,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const K_F_TRUE: f64 = 3.25e-11;

    fn synthetic(thrusts: &[f64], k_f: f64) -> ThrustStandData {
        let scale = 2f64.powi(16);
        let grams: Vec<f64> = thrusts
            .iter()
            .map(|c| (k_f / 9.81 * 4000.0) * (c * scale).powi(2))
            .collect();
        let grams = DMatrix::from_fn(thrusts.len(), 3, |i, _| grams[i]);
        ThrustStandData::new(DVector::from_column_slice(thrusts), grams)
    }

    #[test]
    fn test_recovers_noise_free_coefficient() {
        let data = synthetic(&[0.25, 0.4, 0.55, 0.7, 0.85, 1.0], K_F_TRUE);
        let coeffs = estimate_coefficients(&data, &EstimatorSettings::default()).unwrap();

        assert_relative_eq!(coeffs.k_f, K_F_TRUE, max_relative = 1e-6);
        assert_eq!(coeffs.k_m, coeffs.k_f / 40.7333);
        assert_eq!(coeffs.samples, 18);
        assert!(!coeffs.bound_active);
        assert!(coeffs.rms_residual < 1e-9);
    }

    #[test]
    fn test_trials_average_out() {
        // Three trials at +/- delta around the true force give the same slope.
        let thrusts = [0.3, 0.6, 0.9];
        let base = synthetic(&thrusts, K_F_TRUE);
        let mut grams = base.grams.clone();
        for i in 0..thrusts.len() {
            grams[(i, 0)] -= 0.5;
            grams[(i, 2)] += 0.5;
        }
        let data = ThrustStandData::new(base.thrusts.clone(), grams);
        let coeffs = estimate_coefficients(&data, &EstimatorSettings::default()).unwrap();
        assert_relative_eq!(coeffs.k_f, K_F_TRUE, max_relative = 1e-9);
        assert!(coeffs.rms_residual > 0.0);
    }

    #[test]
    fn test_all_zero_commands_are_degenerate() {
        let data = ThrustStandData::new(DVector::zeros(4), DMatrix::from_element(4, 3, 12.0));
        assert_eq!(
            estimate_coefficients(&data, &EstimatorSettings::default()),
            Err(EstimationError::DegenerateDesign)
        );
    }

    #[test]
    fn test_shape_mismatch_is_reported_before_value_checks() {
        // The NaN and negative command would be invalid, but shape is checked first.
        let thrusts = DVector::from_vec(vec![0.1, -0.2, f64::NAN, 0.4, 0.5]);
        let grams = DMatrix::from_element(4, 3, 1.0);
        let data = ThrustStandData::new(thrusts, grams);
        assert_eq!(
            estimate_coefficients(&data, &EstimatorSettings::default()),
            Err(EstimationError::ShapeMismatch {
                commands: 5,
                rows: 4
            })
        );
    }

    #[test]
    fn test_negative_command_is_invalid() {
        let data = ThrustStandData::new(
            DVector::from_vec(vec![0.5, -0.1]),
            DMatrix::from_element(2, 3, 10.0),
        );
        assert!(matches!(
            estimate_coefficients(&data, &EstimatorSettings::default()),
            Err(EstimationError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_empty_trial_matrix_is_rejected() {
        let data = ThrustStandData::new(DVector::from_vec(vec![0.5]), DMatrix::zeros(1, 0));
        assert_eq!(
            estimate_coefficients(&data, &EstimatorSettings::default()),
            Err(EstimationError::NoTrials)
        );
    }

    #[test]
    fn test_decreasing_force_clamps_to_zero() {
        let data = ThrustStandData::new(
            DVector::from_vec(vec![0.2, 0.5, 0.8]),
            DMatrix::from_fn(3, 3, |i, _| -(i as f64) - 1.0),
        );
        let coeffs = estimate_coefficients(&data, &EstimatorSettings::default()).unwrap();
        assert_eq!(coeffs.k_f, 0.0);
        assert_eq!(coeffs.k_m, 0.0);
        assert!(coeffs.bound_active);
    }

    #[test]
    fn test_command_bits_out_of_range_are_invalid() {
        let data = synthetic(&[0.5, 1.0], K_F_TRUE);
        for bits in [0, 1024, 1100, u32::MAX] {
            let settings = EstimatorSettings {
                command_bits: bits,
                ..EstimatorSettings::default()
            };
            assert!(
                matches!(
                    estimate_coefficients(&data, &settings),
                    Err(EstimationError::InvalidInput(_))
                ),
                "command_bits = {bits} should be rejected"
            );
        }
    }

    #[test]
    fn test_command_that_overflows_the_design_is_invalid() {
        let data = ThrustStandData::new(
            DVector::from_vec(vec![1e300, 0.5]),
            DMatrix::from_element(2, 3, 10.0),
        );
        assert!(matches!(
            estimate_coefficients(&data, &EstimatorSettings::default()),
            Err(EstimationError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_non_finite_measurement_is_invalid() {
        let mut data = synthetic(&[0.5, 1.0], K_F_TRUE);
        data.grams[(1, 2)] = f64::INFINITY;
        assert!(matches!(
            estimate_coefficients(&data, &EstimatorSettings::default()),
            Err(EstimationError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_tiny_coefficient_is_not_clamped() {
        let k_f = 1e-25;
        let data = synthetic(&[0.25, 0.5, 0.75, 1.0], k_f);
        let coeffs = estimate_coefficients(&data, &EstimatorSettings::default()).unwrap();
        assert!(!coeffs.bound_active);
        assert_relative_eq!(coeffs.k_f, k_f, max_relative = 1e-6);
    }

    #[test]
    fn test_unit_conversion_matches_stand_convention() {
        let settings = EstimatorSettings::default();
        assert_relative_eq!(settings.newtons_per_gram(), 9.81 / 4000.0);
        assert_eq!(settings.command_scale(), 65536.0);
    }

    #[test]
    fn test_fitted_curve_passes_through_origin_and_full_scale() {
        let data = synthetic(&[0.5, 1.0], K_F_TRUE);
        let coeffs = estimate_coefficients(&data, &EstimatorSettings::default()).unwrap();
        let curve = coeffs.fitted_curve(1.0, 11);
        assert_eq!(curve.len(), 11);
        assert_eq!(curve[0], (0.0, 0.0));
        assert_relative_eq!(curve[10].1, K_F_TRUE * 65536f64.powi(2), max_relative = 1e-6);
    }
}
