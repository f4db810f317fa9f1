// quadlin_core/src/frames/layout.rs
use crate::frames::{FrameId, InputVariable, StateVariable};

/// The dimension of the rigid-body quadrotor state vector.
pub const QUADROTOR_STATE_DIM: usize = 12;
/// Collective thrust plus three body moments.
pub const QUADROTOR_INPUT_DIM: usize = 4;

pub const PLANAR_STATE_DIM: usize = 6;
pub const PLANAR_INPUT_DIM: usize = 2;

/// Returns the 12-dimensional state layout of the rigid-body quadrotor.
///
/// The state is composed of:
/// - Position (3) in World Frame
/// - Orientation (3, ZYX Euler angles) from Body to World
/// - Velocity (3) in World Frame
/// - Angular velocity (3) in Body Frame
pub fn quadrotor_state_layout() -> Vec<StateVariable> {
    let world = FrameId::World;
    let body = FrameId::Body;

    vec![
        // --- Position (World Frame) --- indices 0-2
        StateVariable::Px(world),
        StateVariable::Py(world),
        StateVariable::Pz(world),
        // --- Orientation (Euler angles) --- indices 3-5
        StateVariable::Roll,
        StateVariable::Pitch,
        StateVariable::Yaw,
        // --- Velocity (World Frame) --- indices 6-8
        StateVariable::Vx(world),
        StateVariable::Vy(world),
        StateVariable::Vz(world),
        // --- Angular Velocity (Body Frame) --- indices 9-11
        StateVariable::Wx(body),
        StateVariable::Wy(body),
        StateVariable::Wz(body),
    ]
}

pub fn quadrotor_input_layout() -> Vec<InputVariable> {
    vec![
        InputVariable::Thrust,
        InputVariable::MomentX,
        InputVariable::MomentY,
        InputVariable::MomentZ,
    ]
}

/// Returns the 6-dimensional layout of the planar (vertical-plane) quadrotor:
/// horizontal and vertical position, in-plane attitude, and their rates.
pub fn planar_state_layout() -> Vec<StateVariable> {
    vec![
        StateVariable::Px(FrameId::World),
        StateVariable::Py(FrameId::World),
        StateVariable::PlanarAngle,
        StateVariable::Vx(FrameId::World),
        StateVariable::Vy(FrameId::World),
        StateVariable::PlanarRate,
    ]
}

pub fn planar_input_layout() -> Vec<InputVariable> {
    vec![InputVariable::PlanarThrust, InputVariable::PlanarTorque]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_layouts_have_documented_dimensions() {
        assert_eq!(quadrotor_state_layout().len(), QUADROTOR_STATE_DIM);
        assert_eq!(quadrotor_input_layout().len(), QUADROTOR_INPUT_DIM);
        assert_eq!(planar_state_layout().len(), PLANAR_STATE_DIM);
        assert_eq!(planar_input_layout().len(), PLANAR_INPUT_DIM);
    }

    #[test]
    fn test_symbol_names_are_unique_within_a_model() {
        let names: HashSet<_> = quadrotor_state_layout()
            .iter()
            .map(|v| v.name())
            .chain(quadrotor_input_layout().iter().map(|u| u.name()))
            .collect();
        assert_eq!(names.len(), QUADROTOR_STATE_DIM + QUADROTOR_INPUT_DIM);
    }
}
