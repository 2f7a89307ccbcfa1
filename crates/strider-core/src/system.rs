use serde::{Deserialize, Serialize};

/// Degrees of freedom of the unactuated floating base (3 translation +
/// 3 rotation).
pub const FLOATING_BASE_DOF: usize = 6;

/// Rigid-body topology description of a floating-base robot.
///
/// Sizes the state, joint, and end-effector dimensions for the dynamical
/// system contract. Kinematic and dynamic primitives are supplied by an
/// external whole-body model, not by this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloatingBaseSystem {
    name: String,
    num_joints: usize,
    end_effectors: Vec<String>,
}

impl FloatingBaseSystem {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        num_joints: usize,
        end_effectors: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            num_joints,
            end_effectors,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of actuated joints, excluding the floating base.
    #[must_use]
    pub const fn num_joints(&self) -> usize {
        self.num_joints
    }

    #[must_use]
    pub fn num_end_effectors(&self) -> usize {
        self.end_effectors.len()
    }

    #[must_use]
    pub fn end_effector_names(&self) -> &[String] {
        &self.end_effectors
    }

    /// Dimension of the generalized coordinate vector (base + joints).
    #[must_use]
    pub const fn num_generalized_coordinates(&self) -> usize {
        FLOATING_BASE_DOF + self.num_joints
    }
}
