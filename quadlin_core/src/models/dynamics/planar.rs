// quadlin_core/src/models/dynamics/planar.rs

use crate::frames::layout::{planar_input_layout, planar_state_layout};
use crate::frames::{InputVariable, StateVariable};
use crate::models::dynamics::SymbolicDynamics;
use crate::models::parameters::symbols;
use crate::symbolic::{Expr, Symbol};
use num_traits::Zero;

/// Quadrotor restricted to a vertical plane.
///
/// ```text
/// x_ddot     = -u_1 sin(theta) / m
/// y_ddot     =  u_1 cos(theta) / m - g
/// theta_ddot =  u_2 / I_xx
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanarQuadrotor;

impl SymbolicDynamics for PlanarQuadrotor {
    fn name(&self) -> &'static str {
        "planar"
    }

    fn get_state_layout(&self) -> Vec<StateVariable> {
        planar_state_layout()
    }

    fn get_input_layout(&self) -> Vec<InputVariable> {
        planar_input_layout()
    }

    fn parameter_symbols(&self) -> Vec<Symbol> {
        vec![symbols::mass(), symbols::gravity(), symbols::ixx()]
    }

    fn equations(&self) -> Vec<Expr> {
        let s: Vec<Expr> = self.state_symbols().iter().map(Symbol::expr).collect();
        let u: Vec<Expr> = self.input_symbols().iter().map(Symbol::expr).collect();
        let theta = &s[2];
        let m = symbols::mass().expr();
        let g = symbols::gravity().expr();
        let inertia = symbols::ixx().expr();

        vec![
            s[3].clone(),
            s[4].clone(),
            s[5].clone(),
            -(u[0].clone() * Expr::sin(theta.clone())) / m.clone(),
            u[0].clone() * Expr::cos(theta.clone()) / m - g,
            u[1].clone() / inertia,
        ]
    }

    fn hover_input(&self) -> Vec<Expr> {
        vec![
            symbols::mass().expr() * symbols::gravity().expr(),
            Expr::zero(),
        ]
    }
}
