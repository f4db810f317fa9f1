// quadlin_core/src/linearization.rs

//! Symbolic linearization of a [`SymbolicDynamics`] model about an operating point.

use crate::error::{JacobianKind, LinearizationError};
use crate::frames::{InputVariable, StateVariable};
use crate::models::dynamics::SymbolicDynamics;
use crate::models::parameters::PhysicalParameters;
use crate::symbolic::{Expr, Substitution};
use nalgebra::DMatrix;
use tracing::debug;

/// An assignment of every state and input symbol, possibly in terms of the
/// physical parameters (e.g. hover thrust `m*g`).
#[derive(Debug, Clone, PartialEq)]
pub struct OperatingPoint {
    assignment: Substitution,
}

impl OperatingPoint {
    pub fn new(assignment: Substitution) -> Self {
        Self { assignment }
    }

    /// Zero state with the model's own equilibrium input.
    pub fn hover(model: &dyn SymbolicDynamics) -> Self {
        let mut assignment = Substitution::new();
        for symbol in model.state_symbols() {
            assignment.bind_value(symbol, 0.0);
        }
        for (symbol, value) in model.input_symbols().into_iter().zip(model.hover_input()) {
            assignment.bind(symbol, value);
        }
        Self { assignment }
    }

    pub fn assignment(&self) -> &Substitution {
        &self.assignment
    }
}

/// The unevaluated Jacobians, entry by entry, in row-major order.
#[derive(Debug, Clone)]
pub struct SymbolicJacobians {
    pub state_layout: Vec<StateVariable>,
    pub input_layout: Vec<InputVariable>,
    pub a: Vec<Vec<Expr>>,
    pub b: Vec<Vec<Expr>>,
}

/// The numeric result of linearizing `x_dot = f(x, u)`:
/// `delta_x_dot = A * delta_x + B * delta_u`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    pub state_layout: Vec<StateVariable>,
    pub input_layout: Vec<InputVariable>,
    /// `A = ∂f/∂x`, N x N.
    pub a: DMatrix<f64>,
    /// `B = ∂f/∂u`, N x M.
    pub b: DMatrix<f64>,
}

/// One labelled, non-zero coupling of a linear model.
#[derive(Debug, Clone, PartialEq)]
pub struct Coupling {
    pub matrix: JacobianKind,
    pub row: usize,
    pub col: usize,
    /// e.g. `d(v_x)/d(theta)`
    pub label: String,
    pub value: f64,
}

impl LinearModel {
    pub fn state_dim(&self) -> usize {
        self.a.nrows()
    }

    pub fn input_dim(&self) -> usize {
        self.b.ncols()
    }

    /// Every non-zero entry of `A` then `B`, labelled with the derivative it represents.
    pub fn nonzero_entries(&self) -> Vec<Coupling> {
        let mut entries = Vec::new();
        for ((row, col), value) in indexed(&self.a) {
            if value != 0.0 {
                entries.push(Coupling {
                    matrix: JacobianKind::State,
                    row,
                    col,
                    label: format!(
                        "d({}_dot)/d({})",
                        self.state_layout[row], self.state_layout[col]
                    ),
                    value,
                });
            }
        }
        for ((row, col), value) in indexed(&self.b) {
            if value != 0.0 {
                entries.push(Coupling {
                    matrix: JacobianKind::Input,
                    row,
                    col,
                    label: format!(
                        "d({}_dot)/d({})",
                        self.state_layout[row], self.input_layout[col]
                    ),
                    value,
                });
            }
        }
        entries
    }
}

fn indexed(m: &DMatrix<f64>) -> impl Iterator<Item = ((usize, usize), f64)> + '_ {
    (0..m.nrows()).flat_map(move |i| (0..m.ncols()).map(move |j| ((i, j), m[(i, j)])))
}

/// Differentiates the model's equations without substituting anything.
pub fn linearize_symbolic(
    model: &dyn SymbolicDynamics,
) -> Result<SymbolicJacobians, LinearizationError> {
    let equations = model.equations();
    let states = model.state_symbols();
    let inputs = model.input_symbols();

    if equations.len() != states.len() {
        return Err(LinearizationError::DimensionMismatch {
            equations: equations.len(),
            states: states.len(),
        });
    }

    let a = equations
        .iter()
        .map(|f| states.iter().map(|x| f.derivative(x)).collect())
        .collect::<Result<Vec<Vec<_>>, _>>()?;
    let b = equations
        .iter()
        .map(|f| inputs.iter().map(|u| f.derivative(u)).collect())
        .collect::<Result<Vec<Vec<_>>, _>>()?;

    Ok(SymbolicJacobians {
        state_layout: model.get_state_layout(),
        input_layout: model.get_input_layout(),
        a,
        b,
    })
}

/// Linearizes `model` about `point` and reduces `A` and `B` to numbers.
///
/// Numeric values in `params` for the model's own constants must be positive
/// and finite. The operating point is substituted first, then `params`. Any
/// symbol left over after both substitutions is reported as
/// [`LinearizationError::ResidualSymbol`] with the offending entry.
pub fn linearize(
    model: &dyn SymbolicDynamics,
    point: &OperatingPoint,
    params: &Substitution,
) -> Result<LinearModel, LinearizationError> {
    check_parameters(model, params)?;
    let jacobians = linearize_symbolic(model)?;
    debug!(
        model = model.name(),
        states = jacobians.state_layout.len(),
        inputs = jacobians.input_layout.len(),
        "differentiated dynamics"
    );

    let a = evaluate_entries(&jacobians.a, JacobianKind::State, point, params)?;
    let b = evaluate_entries(&jacobians.b, JacobianKind::Input, point, params)?;

    Ok(LinearModel {
        state_layout: jacobians.state_layout,
        input_layout: jacobians.input_layout,
        a,
        b,
    })
}

/// Linearizes `model` at hover with the given physical constants.
pub fn linearize_at_hover(
    model: &dyn SymbolicDynamics,
    params: &PhysicalParameters,
) -> Result<LinearModel, LinearizationError> {
    linearize(model, &OperatingPoint::hover(model), &params.substitution())
}

/// Mass, gravity and inertia divide or scale every coupling; a zero or
/// non-finite value would turn entries of `A` and `B` into inf or NaN.
/// Unbound constants are left for [`evaluate_entries`] to locate.
fn check_parameters(
    model: &dyn SymbolicDynamics,
    params: &Substitution,
) -> Result<(), LinearizationError> {
    for symbol in model.parameter_symbols() {
        let Some(value) = params.get(&symbol).and_then(Expr::as_const) else {
            continue;
        };
        if !(value.is_finite() && value > 0.0) {
            return Err(LinearizationError::InvalidParameter {
                symbol: symbol.name().to_string(),
                value,
            });
        }
    }
    Ok(())
}

fn evaluate_entries(
    entries: &[Vec<Expr>],
    matrix: JacobianKind,
    point: &OperatingPoint,
    params: &Substitution,
) -> Result<DMatrix<f64>, LinearizationError> {
    let rows = entries.len();
    let cols = entries.first().map_or(0, Vec::len);
    let mut out = DMatrix::zeros(rows, cols);

    for (row, entry_row) in entries.iter().enumerate() {
        for (col, entry) in entry_row.iter().enumerate() {
            let reduced = entry.substitute(point.assignment()).substitute(params);
            out[(row, col)] = reduced.evaluate().map_err(|err| match err {
                LinearizationError::UnboundSymbol { symbol } => {
                    LinearizationError::ResidualSymbol {
                        symbol,
                        matrix,
                        row,
                        col,
                    }
                }
                other => other,
            })?;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames::FrameId;
    use crate::models::dynamics::{numerical_jacobian, PlanarQuadrotor, Quadrotor};
    use crate::models::parameters::symbols;
    use crate::symbolic::Symbol;
    use crate::types::{Control, State};
    use approx::assert_abs_diff_eq;
    use num_traits::Zero;

    fn assert_matrix_eq(actual: &DMatrix<f64>, expected: &DMatrix<f64>, epsilon: f64) {
        assert_eq!(actual.shape(), expected.shape());
        for i in 0..actual.nrows() {
            for j in 0..actual.ncols() {
                assert_abs_diff_eq!(actual[(i, j)], expected[(i, j)], epsilon = epsilon);
            }
        }
    }

    #[test]
    fn test_planar_matches_closed_form() {
        let params = PhysicalParameters {
            mass: 0.5,
            gravity: 9.81,
            ixx: 0.002,
            ..PhysicalParameters::default()
        };
        let lin = linearize_at_hover(&PlanarQuadrotor, &params).unwrap();

        let mut a = DMatrix::zeros(6, 6);
        a[(0, 3)] = 1.0;
        a[(1, 4)] = 1.0;
        a[(2, 5)] = 1.0;
        a[(3, 2)] = -params.gravity;
        let mut b = DMatrix::zeros(6, 2);
        b[(4, 0)] = 1.0 / params.mass;
        b[(5, 1)] = 1.0 / params.ixx;

        assert_matrix_eq(&lin.a, &a, 1e-9);
        assert_matrix_eq(&lin.b, &b, 1e-9);
    }

    #[test]
    fn test_quadrotor_hover_structure() {
        let params = PhysicalParameters::default();
        let lin = linearize_at_hover(&Quadrotor, &params).unwrap();
        assert_eq!(lin.a.shape(), (12, 12));
        assert_eq!(lin.b.shape(), (12, 4));

        // Upper-right 6x6 block: position rates from velocity, attitude rates from body rates.
        let upper_right = lin.a.view((0, 6), (6, 6)).into_owned();
        assert_eq!(upper_right, DMatrix::identity(6, 6));

        // Tilting produces horizontal acceleration; nothing else couples at hover.
        let mut expected_a = DMatrix::zeros(12, 12);
        expected_a.view_mut((0, 6), (6, 6)).fill_with_identity();
        expected_a[(6, 4)] = params.gravity; // v_x from pitch
        expected_a[(7, 3)] = -params.gravity; // v_y from roll
        assert_matrix_eq(&lin.a, &expected_a, 1e-9);

        let mut expected_b = DMatrix::zeros(12, 4);
        expected_b[(8, 0)] = 1.0 / params.mass;
        expected_b[(9, 1)] = 1.0 / params.ixx;
        expected_b[(10, 2)] = 1.0 / params.iyy;
        expected_b[(11, 3)] = 1.0 / params.izz;
        assert_matrix_eq(&lin.b, &expected_b, 1e-9);

        // Entries not implied by direct coupling are exactly zero, not merely small.
        for i in 0..12 {
            for j in 0..12 {
                if expected_a[(i, j)] == 0.0 {
                    assert_eq!(lin.a[(i, j)], 0.0, "A[{i}, {j}] should be exactly zero");
                }
            }
            for j in 0..4 {
                if expected_b[(i, j)] == 0.0 {
                    assert_eq!(lin.b[(i, j)], 0.0, "B[{i}, {j}] should be exactly zero");
                }
            }
        }
    }

    #[test]
    fn test_linearization_is_bit_identical_across_calls() {
        let params = PhysicalParameters::default();
        let first = linearize_at_hover(&Quadrotor, &params).unwrap();
        let second = linearize_at_hover(&Quadrotor, &params).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_symbolic_matches_finite_differences_at_hover() {
        let params = PhysicalParameters::default();
        let lin = linearize_at_hover(&Quadrotor, &params).unwrap();

        let x = State::zeros(12);
        let u = Control::from_vec(vec![params.hover_thrust(), 0.0, 0.0, 0.0]);
        let (a_fd, b_fd) =
            numerical_jacobian(&Quadrotor, &x, &u, &params.substitution(), 1e-6).unwrap();

        assert_matrix_eq(&lin.a, &a_fd, 1e-5);
        // B entries scale with 1/I (~7e4), so compare relative to magnitude.
        for i in 0..12 {
            for j in 0..4 {
                let scale = lin.b[(i, j)].abs().max(1.0);
                assert_abs_diff_eq!(lin.b[(i, j)] / scale, b_fd[(i, j)] / scale, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn test_missing_parameter_is_a_residual_symbol() {
        let mut params = PhysicalParameters::default().substitution();
        // Drop gravity by rebuilding without it.
        params = params
            .iter()
            .filter(|(s, _)| **s != symbols::gravity())
            .map(|(s, e)| (s.clone(), e.clone()))
            .collect();

        let err = linearize(
            &PlanarQuadrotor,
            &OperatingPoint::hover(&PlanarQuadrotor),
            &params,
        )
        .unwrap_err();
        assert!(
            matches!(
                err,
                LinearizationError::ResidualSymbol { ref symbol, matrix: JacobianKind::State, .. }
                    if symbol == "g"
            ),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn test_incomplete_operating_point_is_a_residual_symbol() {
        // Leave theta unbound: d(x_ddot)/d(theta) = -u_1 cos(theta) / m keeps it.
        let mut assignment = Substitution::new();
        for var in [
            StateVariable::Px(FrameId::World),
            StateVariable::Py(FrameId::World),
            StateVariable::Vx(FrameId::World),
            StateVariable::Vy(FrameId::World),
            StateVariable::PlanarRate,
        ] {
            assignment.bind_value(var.symbol(), 0.0);
        }
        assignment.bind(
            InputVariable::PlanarThrust.symbol(),
            symbols::mass().expr() * symbols::gravity().expr(),
        );
        assignment.bind(InputVariable::PlanarTorque.symbol(), Expr::zero());

        let err = linearize(
            &PlanarQuadrotor,
            &OperatingPoint::new(assignment),
            &PhysicalParameters::default().substitution(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            LinearizationError::ResidualSymbol {
                symbol: "theta".to_string(),
                matrix: JacobianKind::State,
                row: 3,
                col: 2,
            }
        );
    }

    /// A model that mistakenly lists a physical constant among its states.
    #[derive(Debug, Clone)]
    struct ConstantAsState;

    impl SymbolicDynamics for ConstantAsState {
        fn name(&self) -> &'static str {
            "constant-as-state"
        }
        fn get_state_layout(&self) -> Vec<StateVariable> {
            vec![StateVariable::Px(FrameId::World)]
        }
        fn get_input_layout(&self) -> Vec<InputVariable> {
            vec![]
        }
        fn state_symbols(&self) -> Vec<Symbol> {
            vec![symbols::mass()]
        }
        fn parameter_symbols(&self) -> Vec<Symbol> {
            vec![]
        }
        fn equations(&self) -> Vec<Expr> {
            vec![symbols::mass().expr()]
        }
        fn hover_input(&self) -> Vec<Expr> {
            vec![]
        }
    }

    #[test]
    fn test_non_time_varying_state_is_malformed() {
        let err = linearize_symbolic(&ConstantAsState).unwrap_err();
        assert_eq!(
            err,
            LinearizationError::MalformedState {
                symbol: "m".to_string()
            }
        );
    }

    #[test]
    fn test_zero_mass_is_rejected_before_evaluation() {
        let params = PhysicalParameters {
            mass: 0.0,
            ..PhysicalParameters::default()
        };
        assert_eq!(
            linearize_at_hover(&Quadrotor, &params).unwrap_err(),
            LinearizationError::InvalidParameter {
                symbol: "m".to_string(),
                value: 0.0
            }
        );
    }

    #[test]
    fn test_only_constants_the_model_uses_are_checked() {
        // The planar model never touches I_yy or I_zz.
        let params = PhysicalParameters {
            iyy: 0.0,
            izz: f64::NAN,
            ..PhysicalParameters::default()
        };
        assert!(linearize_at_hover(&PlanarQuadrotor, &params).is_ok());

        let params = PhysicalParameters {
            ixx: -1.0,
            ..PhysicalParameters::default()
        };
        assert!(matches!(
            linearize_at_hover(&PlanarQuadrotor, &params),
            Err(LinearizationError::InvalidParameter { ref symbol, .. }) if symbol == "I_xx"
        ));
    }

    #[test]
    fn test_nonzero_entries_are_labelled() {
        let lin = linearize_at_hover(&PlanarQuadrotor, &PhysicalParameters::default()).unwrap();
        let entries = lin.nonzero_entries();
        assert_eq!(entries.len(), 6);
        let tilt = entries
            .iter()
            .find(|c| c.matrix == JacobianKind::State && c.row == 3 && c.col == 2)
            .unwrap();
        assert_eq!(tilt.label, "d(v_x_dot)/d(theta)");
    }
}
