// quadlin_core/src/models/dynamics/quadrotor.rs

use crate::frames::layout::{quadrotor_input_layout, quadrotor_state_layout};
use crate::frames::{InputVariable, StateVariable};
use crate::models::dynamics::SymbolicDynamics;
use crate::models::parameters::symbols;
use crate::symbolic::{Expr, Symbol};
use nalgebra::{Matrix3, Vector3};
use num_traits::{One, Zero};

/// Rigid-body quadrotor with ZYX Euler attitude.
///
/// State `[x, y, z, phi, theta, psi, v_x, v_y, v_z, p, q, r]`, input
/// `[F, M_x, M_y, M_z]`. World z points up, thrust acts along body +z and the
/// inertia tensor is diagonal.
#[derive(Debug, Clone, Copy, Default)]
pub struct Quadrotor;

/// Body-to-world rotation `R = Rz(psi) * Ry(theta) * Rx(phi)`.
pub fn rotation_zyx(phi: &Expr, theta: &Expr, psi: &Expr) -> Matrix3<Expr> {
    let (sphi, cphi) = (Expr::sin(phi.clone()), Expr::cos(phi.clone()));
    let (sth, cth) = (Expr::sin(theta.clone()), Expr::cos(theta.clone()));
    let (spsi, cpsi) = (Expr::sin(psi.clone()), Expr::cos(psi.clone()));
    let (zero, one) = (Expr::zero(), Expr::one());

    #[rustfmt::skip]
    let rz = Matrix3::new(
        cpsi.clone(), -spsi.clone(), zero.clone(),
        spsi,         cpsi,          zero.clone(),
        zero.clone(), zero.clone(),  one.clone(),
    );
    #[rustfmt::skip]
    let ry = Matrix3::new(
        cth.clone(),  zero.clone(), sth.clone(),
        zero.clone(), one.clone(),  zero.clone(),
        -sth,         zero.clone(), cth,
    );
    #[rustfmt::skip]
    let rx = Matrix3::new(
        one,          zero.clone(), zero.clone(),
        zero.clone(), cphi.clone(), -sphi.clone(),
        zero,         sphi,         cphi,
    );

    rz * ry * rx
}

/// Maps body angular velocity to ZYX Euler angle rates.
pub fn euler_rate_map(phi: &Expr, theta: &Expr) -> Matrix3<Expr> {
    let (sphi, cphi) = (Expr::sin(phi.clone()), Expr::cos(phi.clone()));
    let tth = Expr::tan(theta.clone());
    let cth = Expr::cos(theta.clone());

    #[rustfmt::skip]
    let w = Matrix3::new(
        Expr::one(),  sphi.clone() * tth.clone(), cphi.clone() * tth,
        Expr::zero(), cphi.clone(),               -sphi.clone(),
        Expr::zero(), sphi / cth.clone(),         cphi / cth,
    );
    w
}

impl SymbolicDynamics for Quadrotor {
    fn name(&self) -> &'static str {
        "quadrotor"
    }

    fn get_state_layout(&self) -> Vec<StateVariable> {
        quadrotor_state_layout()
    }

    fn get_input_layout(&self) -> Vec<InputVariable> {
        quadrotor_input_layout()
    }

    fn parameter_symbols(&self) -> Vec<Symbol> {
        vec![
            symbols::mass(),
            symbols::gravity(),
            symbols::ixx(),
            symbols::iyy(),
            symbols::izz(),
        ]
    }

    fn equations(&self) -> Vec<Expr> {
        let s: Vec<Expr> = self.state_symbols().iter().map(Symbol::expr).collect();
        let u: Vec<Expr> = self.input_symbols().iter().map(Symbol::expr).collect();

        let (phi, theta, psi) = (&s[3], &s[4], &s[5]);
        let velocity = Vector3::new(s[6].clone(), s[7].clone(), s[8].clone());
        let omega = Vector3::new(s[9].clone(), s[10].clone(), s[11].clone());

        let thrust = u[0].clone();
        let moments = Vector3::new(u[1].clone(), u[2].clone(), u[3].clone());

        let m = symbols::mass().expr();
        let g = symbols::gravity().expr();
        let inertia = Vector3::new(
            symbols::ixx().expr(),
            symbols::iyy().expr(),
            symbols::izz().expr(),
        );

        // --- 1. Attitude kinematics ---
        let euler_rates = euler_rate_map(phi, theta) * omega.clone();

        // --- 2. Translational dynamics: rotated thrust plus gravity ---
        let thrust_body = Vector3::new(Expr::zero(), Expr::zero(), thrust);
        let thrust_world = rotation_zyx(phi, theta, psi) * thrust_body;
        let gravity_world = Vector3::new(Expr::zero(), Expr::zero(), g);
        let accel = thrust_world.map(|f| f / m.clone()) - gravity_world;

        // --- 3. Rotational dynamics: I * omega_dot = M - omega x (I * omega) ---
        let angular_momentum = omega.component_mul(&inertia);
        let gyroscopic = omega.cross(&angular_momentum);
        let net_moment = moments - gyroscopic;
        let omega_dot = Vector3::new(
            net_moment[0].clone() / inertia[0].clone(),
            net_moment[1].clone() / inertia[1].clone(),
            net_moment[2].clone() / inertia[2].clone(),
        );

        velocity
            .iter()
            .chain(euler_rates.iter())
            .chain(accel.iter())
            .chain(omega_dot.iter())
            .cloned()
            .collect()
    }

    fn hover_input(&self) -> Vec<Expr> {
        vec![
            symbols::mass().expr() * symbols::gravity().expr(),
            Expr::zero(),
            Expr::zero(),
            Expr::zero(),
        ]
    }
}
