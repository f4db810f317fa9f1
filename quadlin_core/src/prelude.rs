// quadlin_core/src/prelude.rs

// --- Core Abstractions ---
pub use crate::models::dynamics::SymbolicDynamics;
pub use crate::symbolic::{Expr, Substitution, Symbol, SymbolKind};
pub use crate::types::{Control, State};

// --- Core Data Structures ---
pub use crate::frames::{FrameId, InputVariable, StateVariable};
pub use crate::models::parameters::PhysicalParameters;

// --- Errors ---
pub use crate::error::{EstimationError, JacobianKind, LinearizationError};

// --- Algorithms ---
pub use crate::estimation::{
    estimate_coefficients, EstimatorSettings, RotorCoefficients, ThrustStandData,
    ThrustStandRecord,
};
pub use crate::linearization::{
    linearize, linearize_at_hover, linearize_symbolic, LinearModel, OperatingPoint,
    SymbolicJacobians,
};

// --- Concrete Model Implementations ---
pub use crate::models::dynamics::{PlanarQuadrotor, Quadrotor};
