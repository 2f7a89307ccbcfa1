//! Structured locomotion state and the flags selecting which of its fields
//! participate in the flat optimization vector.

use nalgebra::{DVector, Vector3};
use strider_core::FLOATING_BASE_DOF;

// ---------------------------------------------------------------------------
// LocomotionVariables
// ---------------------------------------------------------------------------

/// Selects which physical quantities participate in the flattened
/// optimization vector.
///
/// Fields whose flag is false are excluded from the flat vector entirely,
/// not zero-filled, so the vector's length varies with the active flag set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LocomotionVariables {
    pub time: bool,
    pub position: bool,
    pub velocity: bool,
    pub acceleration: bool,
    pub joint_force: bool,
    pub contact_position: bool,
    pub contact_force: bool,
}

impl LocomotionVariables {
    /// All seven quantities enabled (full optimization).
    #[must_use]
    pub const fn full() -> Self {
        Self {
            time: true,
            position: true,
            velocity: true,
            acceleration: true,
            joint_force: true,
            contact_position: true,
            contact_force: true,
        }
    }
}

// ---------------------------------------------------------------------------
// LocomotionState
// ---------------------------------------------------------------------------

/// Canonical structured robot state for whole-body trajectory optimization.
///
/// Generalized vectors stack the 6-DOF floating base ahead of the actuated
/// joints. The flat vector consumed by a numerical solver is a lossy,
/// order-dependent projection of this state gated by [`LocomotionVariables`].
#[derive(Debug, Clone, PartialEq)]
pub struct LocomotionState {
    pub time: f64,
    /// Generalized position (base pose + joint positions).
    pub position: DVector<f64>,
    /// Generalized velocity.
    pub velocity: DVector<f64>,
    /// Generalized acceleration.
    pub acceleration: DVector<f64>,
    /// Actuated joint forces.
    pub joint_forces: DVector<f64>,
    /// Contact position per end-effector.
    pub contact_positions: Vec<Vector3<f64>>,
    /// Contact force per end-effector.
    pub contact_forces: Vec<Vector3<f64>>,
}

impl LocomotionState {
    /// Zero state sized for a system with the given joint and end-effector
    /// counts.
    #[must_use]
    pub fn zeros(num_joints: usize, num_end_effectors: usize) -> Self {
        Self::filled(num_joints, num_end_effectors, 0.0)
    }

    /// State with every scalar set to `value`, sized like
    /// [`zeros`](Self::zeros). Useful for building bounds.
    #[must_use]
    pub fn filled(num_joints: usize, num_end_effectors: usize, value: f64) -> Self {
        let num_coords = FLOATING_BASE_DOF + num_joints;
        Self {
            time: value,
            position: DVector::from_element(num_coords, value),
            velocity: DVector::from_element(num_coords, value),
            acceleration: DVector::from_element(num_coords, value),
            joint_forces: DVector::from_element(num_joints, value),
            contact_positions: vec![Vector3::from_element(value); num_end_effectors],
            contact_forces: vec![Vector3::from_element(value); num_end_effectors],
        }
    }
}
