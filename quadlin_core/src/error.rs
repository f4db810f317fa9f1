// quadlin_core/src/error.rs

use thiserror::Error;

/// Which Jacobian an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JacobianKind {
    /// `A = ∂f/∂x`
    State,
    /// `B = ∂f/∂u`
    Input,
}

impl std::fmt::Display for JacobianKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JacobianKind::State => write!(f, "A"),
            JacobianKind::Input => write!(f, "B"),
        }
    }
}

/// Failures of the symbolic linearization pipeline.
///
/// Every variant is a deterministic consequence of a malformed model or an
/// incomplete substitution; none of them is worth retrying.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinearizationError {
    /// A symbol was still unbound when an entry was reduced to a number.
    #[error("substitution incomplete: symbol '{symbol}' remains in {matrix}[{row}, {col}]")]
    ResidualSymbol {
        symbol: String,
        matrix: JacobianKind,
        row: usize,
        col: usize,
    },

    /// An expression outside of any Jacobian (e.g. a numeric derivative
    /// evaluation) still contained an unbound symbol.
    #[error("substitution incomplete: symbol '{symbol}' is unbound")]
    UnboundSymbol { symbol: String },

    /// Differentiation was requested with respect to something that is not a
    /// function of time.
    #[error("cannot differentiate with respect to '{symbol}': it is not a time-varying quantity")]
    MalformedState { symbol: String },

    /// A physical constant the model depends on is zero, negative or not finite.
    #[error("physical constant '{symbol}' must be positive and finite, got {value}")]
    InvalidParameter { symbol: String, value: f64 },

    /// The model produced a different number of equations than it has states.
    #[error("model defines {equations} equations for {states} states")]
    DimensionMismatch { equations: usize, states: usize },

    /// A numeric vector passed in does not match the model layout.
    #[error("expected a {expected}-dimensional {what} vector, got {actual}")]
    VectorLength {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Failures of the rotor coefficient estimator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimationError {
    #[error("{commands} command levels but {rows} measurement rows")]
    ShapeMismatch { commands: usize, rows: usize },

    #[error("measurement row {row} has {found} trials, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("measurement table has no trial columns")]
    NoTrials,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("design vector is identically zero; the thrust coefficient is undefined")]
    DegenerateDesign,

    #[error("least-squares solve failed: {0}")]
    Solver(String),
}
