// quadlin_core/src/frames.rs

use crate::symbolic::Symbol;
use std::fmt;

pub mod layout;

/// The coordinate frame a state variable is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameId {
    /// The inertial frame, z axis pointing up.
    World,
    /// The vehicle body frame, thrust along +z.
    Body,
}

/// An enum that defines every variable that can appear in a model's state vector.
/// The FrameId specifies which frame the variable is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateVariable {
    // --- Cartesian Position ---
    Px(FrameId),
    Py(FrameId),
    Pz(FrameId),
    // --- Euler Angles (ZYX convention, body relative to world) ---
    Roll,
    Pitch,
    Yaw,
    // --- Cartesian Velocity ---
    Vx(FrameId),
    Vy(FrameId),
    Vz(FrameId),
    // --- Angular Velocity ---
    Wx(FrameId),
    Wy(FrameId),
    Wz(FrameId),
    // --- In-plane attitude and rate, for planar models ---
    PlanarAngle,
    PlanarRate,
}

impl StateVariable {
    /// The conventional short name used for the variable's symbol.
    pub fn name(&self) -> &'static str {
        match self {
            StateVariable::Px(_) => "x",
            StateVariable::Py(_) => "y",
            StateVariable::Pz(_) => "z",
            StateVariable::Roll => "phi",
            StateVariable::Pitch => "theta",
            StateVariable::Yaw => "psi",
            StateVariable::Vx(_) => "v_x",
            StateVariable::Vy(_) => "v_y",
            StateVariable::Vz(_) => "v_z",
            // Body rates follow the aerospace p, q, r naming.
            StateVariable::Wx(FrameId::Body) => "p",
            StateVariable::Wy(FrameId::Body) => "q",
            StateVariable::Wz(FrameId::Body) => "r",
            StateVariable::Wx(FrameId::World) => "omega_x",
            StateVariable::Wy(FrameId::World) => "omega_y",
            StateVariable::Wz(FrameId::World) => "omega_z",
            StateVariable::PlanarAngle => "theta",
            StateVariable::PlanarRate => "omega",
        }
    }

    /// Every state variable is a function of time.
    pub fn symbol(&self) -> Symbol {
        Symbol::time_varying(self.name())
    }
}

impl fmt::Display for StateVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An enum for the actuation inputs a model accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputVariable {
    /// Collective thrust along body +z, in newtons.
    Thrust,
    /// Body moment about x, in newton-metres.
    MomentX,
    MomentY,
    MomentZ,
    /// Thrust of a planar model.
    PlanarThrust,
    /// Torque of a planar model about the out-of-plane axis.
    PlanarTorque,
}

impl InputVariable {
    pub fn name(&self) -> &'static str {
        match self {
            InputVariable::Thrust => "F",
            InputVariable::MomentX => "M_x",
            InputVariable::MomentY => "M_y",
            InputVariable::MomentZ => "M_z",
            InputVariable::PlanarThrust => "u_1",
            InputVariable::PlanarTorque => "u_2",
        }
    }

    pub fn symbol(&self) -> Symbol {
        Symbol::time_varying(self.name())
    }
}

impl fmt::Display for InputVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
