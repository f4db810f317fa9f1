// quadlin_core/src/models/dynamics/mod.rs

use crate::error::LinearizationError;
use crate::frames::{InputVariable, StateVariable};
use crate::symbolic::{Expr, Substitution, Symbol};
use crate::types::{Control, State};
use dyn_clone::DynClone;
use nalgebra::DMatrix;
use std::fmt::Debug;

pub mod planar;
pub mod quadrotor;

pub use planar::PlanarQuadrotor;
pub use quadrotor::Quadrotor;

/// A continuous-time model `x_dot = f(x, u)` written as symbolic expressions.
///
/// Implementors describe their state and input layouts and return one
/// expression per state giving its time derivative. Everything else,
/// numeric evaluation, linearization and finite-difference checks, is built
/// on top of `equations()`.
pub trait SymbolicDynamics: DynClone + Debug + Send + Sync {
    /// A short identifier, used in logs and reports.
    fn name(&self) -> &'static str;

    /// The ordered "schema" of the state vector. The order of this Vec
    /// defines the row and column indices of `A`.
    fn get_state_layout(&self) -> Vec<StateVariable>;

    /// The ordered layout of the control input vector `u`.
    fn get_input_layout(&self) -> Vec<InputVariable>;

    /// The physical constants the equations refer to.
    fn parameter_symbols(&self) -> Vec<Symbol>;

    /// The right-hand side `f(x, u)`, one expression per state.
    fn equations(&self) -> Vec<Expr>;

    /// The input that holds the model in equilibrium at the zero state,
    /// expressed in terms of the parameters (e.g. `m*g` for thrust).
    fn hover_input(&self) -> Vec<Expr>;

    /// Returns the total number of states (the length of the state vector `x`).
    fn get_state_dim(&self) -> usize {
        self.get_state_layout().len()
    }

    /// Returns the number of dimensions in the control input vector `u`.
    fn get_control_dim(&self) -> usize {
        self.get_input_layout().len()
    }

    fn state_symbols(&self) -> Vec<Symbol> {
        self.get_state_layout().iter().map(|v| v.symbol()).collect()
    }

    fn input_symbols(&self) -> Vec<Symbol> {
        self.get_input_layout().iter().map(|v| v.symbol()).collect()
    }

    /// Evaluates `x_dot = f(x, u)` numerically.
    ///
    /// `params` must bind every symbol in `parameter_symbols()`.
    fn get_derivatives(
        &self,
        x: &State,
        u: &Control,
        params: &Substitution,
    ) -> Result<State, LinearizationError> {
        let point = numeric_point(self, x, u)?;
        let values = self
            .equations()
            .iter()
            .map(|eq| eq.substitute(&point).substitute(params).evaluate())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(State::from_vec(values))
    }
}

// This macro automatically generates the implementation of `Clone` for `Box<dyn SymbolicDynamics>`.
dyn_clone::clone_trait_object!(SymbolicDynamics);

/// Binds a numeric state and input to the model's symbols.
fn numeric_point<M: SymbolicDynamics + ?Sized>(
    model: &M,
    x: &State,
    u: &Control,
) -> Result<Substitution, LinearizationError> {
    let states = model.state_symbols();
    let inputs = model.input_symbols();
    if x.nrows() != states.len() {
        return Err(LinearizationError::VectorLength {
            what: "state",
            expected: states.len(),
            actual: x.nrows(),
        });
    }
    if u.nrows() != inputs.len() {
        return Err(LinearizationError::VectorLength {
            what: "input",
            expected: inputs.len(),
            actual: u.nrows(),
        });
    }

    let mut point = Substitution::new();
    for (symbol, value) in states.into_iter().zip(x.iter()) {
        point.bind_value(symbol, *value);
    }
    for (symbol, value) in inputs.into_iter().zip(u.iter()) {
        point.bind_value(symbol, *value);
    }
    Ok(point)
}

/// Approximates `(A, B)` with forward differences around `(x, u)`.
///
/// This is the numeric counterpart of the symbolic linearization, useful to
/// cross-check a model's equations or to linearize away from hover.
pub fn numerical_jacobian(
    model: &dyn SymbolicDynamics,
    x: &State,
    u: &Control,
    params: &Substitution,
    epsilon: f64,
) -> Result<(DMatrix<f64>, DMatrix<f64>), LinearizationError> {
    let state_dim = model.get_state_dim();
    let control_dim = model.get_control_dim();
    let mut a_jac = DMatrix::zeros(state_dim, state_dim);
    let mut b_jac = DMatrix::zeros(state_dim, control_dim);

    // 1. Calculate the baseline state derivative with the current state and control.
    let x_dot_base = model.get_derivatives(x, u, params)?;

    // 2. Jacobian A (w.r.t. state x)
    for j in 0..state_dim {
        let mut x_perturbed = x.clone();
        x_perturbed[j] += epsilon;
        let x_dot_perturbed = model.get_derivatives(&x_perturbed, u, params)?;
        // (f(x+h) - f(x)) / h
        let derivative_column = (x_dot_perturbed - &x_dot_base) / epsilon;
        a_jac.column_mut(j).copy_from(&derivative_column);
    }

    // 3. Jacobian B (w.r.t. control u)
    for j in 0..control_dim {
        let mut u_perturbed = u.clone();
        u_perturbed[j] += epsilon;
        let x_dot_perturbed = model.get_derivatives(x, &u_perturbed, params)?;
        let derivative_column = (x_dot_perturbed - &x_dot_base) / epsilon;
        b_jac.column_mut(j).copy_from(&derivative_column);
    }

    Ok((a_jac, b_jac))
}
