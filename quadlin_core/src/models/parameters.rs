// quadlin_core/src/models/parameters.rs

use crate::symbolic::{Substitution, Symbol};
use serde::{Deserialize, Serialize};

/// Symbols for the fixed physical constants shared by every vehicle model.
pub mod symbols {
    use crate::symbolic::Symbol;

    pub fn mass() -> Symbol {
        Symbol::parameter("m")
    }

    pub fn gravity() -> Symbol {
        Symbol::parameter("g")
    }

    pub fn ixx() -> Symbol {
        Symbol::parameter("I_xx")
    }

    pub fn iyy() -> Symbol {
        Symbol::parameter("I_yy")
    }

    pub fn izz() -> Symbol {
        Symbol::parameter("I_zz")
    }
}

/// Numeric values for the physical constants of a rigid-body multirotor.
///
/// The defaults describe a Crazyflie 2.x class nano quadrotor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhysicalParameters {
    /// Vehicle mass in kg.
    pub mass: f64,
    /// Gravitational acceleration in m/s^2.
    pub gravity: f64,
    /// Principal moments of inertia in kg*m^2.
    pub ixx: f64,
    pub iyy: f64,
    pub izz: f64,
}

impl Default for PhysicalParameters {
    fn default() -> Self {
        Self {
            mass: 0.027,
            gravity: 9.81,
            ixx: 1.4e-5,
            iyy: 1.4e-5,
            izz: 2.17e-5,
        }
    }
}

impl PhysicalParameters {
    /// All five constants, bound to their symbols.
    pub fn substitution(&self) -> Substitution {
        let mut subs = Substitution::new();
        for (symbol, value) in self.bindings() {
            subs.bind_value(symbol, value);
        }
        subs
    }

    pub fn bindings(&self) -> [(Symbol, f64); 5] {
        [
            (symbols::mass(), self.mass),
            (symbols::gravity(), self.gravity),
            (symbols::ixx(), self.ixx),
            (symbols::iyy(), self.iyy),
            (symbols::izz(), self.izz),
        ]
    }

    /// Thrust needed to hold altitude, `m * g`.
    pub fn hover_thrust(&self) -> f64 {
        self.mass * self.gravity
    }
}
