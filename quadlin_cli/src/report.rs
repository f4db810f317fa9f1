// quadlin_cli/src/report.rs

//! Console rendering and the optional TOML report.

use crate::error::Result;
use quadlin_core::estimation::{
    measured_forces, EstimatorSettings, RotorCoefficients, ThrustStandData,
};
use quadlin_core::linearization::{LinearModel, SymbolicJacobians};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::info;

// =========================================================================
// == Report File ==
// =========================================================================

#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linearization: Option<LinearizationReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimation: Option<EstimationReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinearizationReport {
    pub model: String,
    pub states: Vec<String>,
    pub inputs: Vec<String>,
    /// Row-major.
    pub a: Vec<Vec<f64>>,
    /// Row-major.
    pub b: Vec<Vec<f64>>,
    pub couplings: Vec<CouplingEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CouplingEntry {
    pub matrix: String,
    pub row: usize,
    pub col: usize,
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EstimationReport {
    /// `[command, force]` samples of the fitted curve; empty unless requested.
    pub curve: Vec<[f64; 2]>,
    pub coefficients: RotorCoefficients,
}

impl LinearizationReport {
    pub fn new(model: &str, linear: &LinearModel) -> Self {
        let rows = |m: &nalgebra::DMatrix<f64>| -> Vec<Vec<f64>> {
            m.row_iter().map(|r| r.iter().copied().collect()).collect()
        };
        Self {
            model: model.to_string(),
            states: linear.state_layout.iter().map(|s| s.to_string()).collect(),
            inputs: linear.input_layout.iter().map(|u| u.to_string()).collect(),
            a: rows(&linear.a),
            b: rows(&linear.b),
            couplings: linear
                .nonzero_entries()
                .into_iter()
                .map(|c| CouplingEntry {
                    matrix: c.matrix.to_string(),
                    row: c.row,
                    col: c.col,
                    label: c.label,
                    value: c.value,
                })
                .collect(),
        }
    }
}

impl EstimationReport {
    pub fn new(coefficients: RotorCoefficients, curve: &[(f64, f64)]) -> Self {
        Self {
            curve: curve.iter().map(|&(c, f)| [c, f]).collect(),
            coefficients,
        }
    }
}

impl Report {
    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, toml::to_string_pretty(self)?)?;
        info!("Wrote report to {}", path.display());
        Ok(())
    }
}

// =========================================================================
// == Console Rendering ==
// =========================================================================

pub fn render_linear_model(model: &str, linear: &LinearModel) -> String {
    let mut out = String::new();
    let names = |v: Vec<String>| v.join(", ");
    let _ = writeln!(out, "== {} model linearized at hover ==", model);
    let _ = writeln!(
        out,
        "state  x = [{}]",
        names(linear.state_layout.iter().map(|s| s.to_string()).collect())
    );
    let _ = writeln!(
        out,
        "input  u = [{}]",
        names(linear.input_layout.iter().map(|u| u.to_string()).collect())
    );
    let _ = writeln!(out, "A ({0}x{0}):{1}", linear.state_dim(), linear.a);
    let _ = writeln!(
        out,
        "B ({}x{}):{}",
        linear.state_dim(),
        linear.input_dim(),
        linear.b
    );

    let _ = writeln!(out, "Non-zero couplings:");
    for c in linear.nonzero_entries() {
        let _ = writeln!(
            out,
            "  {}[{:>2},{:>2}]  {:<24} {:>14.6}",
            c.matrix, c.row, c.col, c.label, c.value
        );
    }
    out
}

pub fn render_symbolic(jacobians: &SymbolicJacobians) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Symbolic Jacobian entries (non-zero):");
    for (name, entries) in [("A", &jacobians.a), ("B", &jacobians.b)] {
        for (i, row) in entries.iter().enumerate() {
            for (j, entry) in row.iter().enumerate() {
                if !entry.is_const_zero() {
                    let _ = writeln!(out, "  {}[{:>2},{:>2}] = {}", name, i, j, entry);
                }
            }
        }
    }
    out
}

pub fn render_coefficients(coefficients: &RotorCoefficients) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== Rotor coefficients ==");
    let _ = writeln!(out, "  k_f          = {:.6e}", coefficients.k_f);
    let _ = writeln!(out, "  k_m          = {:.6e}", coefficients.k_m);
    let _ = writeln!(out, "  samples      = {}", coefficients.samples);
    let _ = writeln!(out, "  rms residual = {:.3e} N", coefficients.rms_residual);
    if coefficients.bound_active {
        let _ = writeln!(out, "  (k_f held at its lower bound of zero)");
    }
    out
}

/// The fitted curve, then each measured row beside its prediction.
pub fn render_curve(
    coefficients: &RotorCoefficients,
    curve: &[(f64, f64)],
    data: &ThrustStandData,
    settings: &EstimatorSettings,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Fitted thrust curve (per motor):");
    let _ = writeln!(out, "  {:>8}  {:>12}", "command", "force [N]");
    for (c, f) in curve {
        let _ = writeln!(out, "  {:>8.3}  {:>12.6}", c, f);
    }

    let forces = measured_forces(data, settings);
    let _ = writeln!(out, "Measured vs fitted:");
    for (i, c) in data.thrusts.iter().enumerate() {
        let trials: Vec<String> = forces.row(i).iter().map(|f| format!("{:.6}", f)).collect();
        let _ = writeln!(
            out,
            "  {:>8.3}  fit {:>10.6}  trials [{}]",
            c,
            coefficients.thrust_at(*c),
            trials.join(", ")
        );
    }
    out
}
