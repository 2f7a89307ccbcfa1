//! Dynamical-system constraint contract for external trajectory optimizers.
//!
//! Concrete robot dynamics models implement [`DynamicalSystem`]; the shared
//! non-virtual services (dimensions, bounds, starting state, and the
//! structured-state ↔ flat-vector transcription) live in [`SystemModel`].
//!
//! The flat vector layout is fixed:
//!
//! ```text
//! [ time | position | velocity | acceleration | joint_force
//!   | contact_position | contact_force ]
//! ```
//!
//! with each block present only when its [`LocomotionVariables`] flag is
//! enabled, so the vector's length is exactly the sum of the enabled block
//! dimensions.

use nalgebra::{DMatrix, DVector, Vector3};
use strider_core::{FloatingBaseSystem, StateError};

use crate::state::{LocomotionState, LocomotionVariables};

// ---------------------------------------------------------------------------
// DynamicalSystem
// ---------------------------------------------------------------------------

/// Constraint contract implemented per concrete robot dynamics model.
///
/// `compute` and `compute_jacobian` must be evaluated at the same state and
/// be consistent: the Jacobian is the derivative of the constraint vector
/// with respect to the flattened state. `bounds` defines the feasible region
/// of the constraint vector, typically equality (lower == upper) for
/// dynamics-consistency constraints.
pub trait DynamicalSystem {
    /// Evaluate the constraint vector at a state.
    fn compute(&self, state: &LocomotionState) -> DVector<f64>;

    /// Evaluate the constraint Jacobian with respect to the flattened state.
    fn compute_jacobian(&self, state: &LocomotionState) -> DMatrix<f64>;

    /// Lower and upper bounds of the constraint vector.
    fn bounds(&self) -> (DVector<f64>, DVector<f64>);
}

// ---------------------------------------------------------------------------
// SystemModel
// ---------------------------------------------------------------------------

/// Shared services for dynamical-system constraints.
///
/// Borrows the floating-base topology description from the caller; the model
/// never outlives it. All dimension queries and transcriptions fail with
/// [`StateError::MissingSystem`] until a system is bound.
#[derive(Debug, Clone)]
pub struct SystemModel<'a> {
    system: Option<&'a FloatingBaseSystem>,
    variables: LocomotionVariables,
    starting_state: LocomotionState,
    lower_state_bound: LocomotionState,
    upper_state_bound: LocomotionState,
}

impl<'a> SystemModel<'a> {
    /// Create a model with the given active variable set and no bound system.
    #[must_use]
    pub fn new(variables: LocomotionVariables) -> Self {
        Self {
            system: None,
            variables,
            starting_state: LocomotionState::zeros(0, 0),
            lower_state_bound: LocomotionState::filled(0, 0, f64::NEG_INFINITY),
            upper_state_bound: LocomotionState::filled(0, 0, f64::INFINITY),
        }
    }

    /// Bind the floating-base system used to size state, joint, and
    /// end-effector dimensions. Resets the starting state to zero and the
    /// state bounds to unbounded at the new dimensions.
    pub fn set_floating_base_system(&mut self, system: &'a FloatingBaseSystem) {
        let nj = system.num_joints();
        let nee = system.num_end_effectors();
        self.system = Some(system);
        self.starting_state = LocomotionState::zeros(nj, nee);
        self.lower_state_bound = LocomotionState::filled(nj, nee, f64::NEG_INFINITY);
        self.upper_state_bound = LocomotionState::filled(nj, nee, f64::INFINITY);
    }

    /// Set the structured per-field state bounds.
    pub fn set_state_bounds(&mut self, lower: LocomotionState, upper: LocomotionState) {
        self.lower_state_bound = lower;
        self.upper_state_bound = upper;
    }

    #[must_use]
    pub const fn state_bounds(&self) -> (&LocomotionState, &LocomotionState) {
        (&self.lower_state_bound, &self.upper_state_bound)
    }

    /// Set the state an optimizer initializes from.
    pub fn set_starting_state(&mut self, state: LocomotionState) {
        self.starting_state = state;
    }

    #[must_use]
    pub const fn starting_state(&self) -> &LocomotionState {
        &self.starting_state
    }

    #[must_use]
    pub const fn variables(&self) -> &LocomotionVariables {
        &self.variables
    }

    pub fn num_joints(&self) -> Result<usize, StateError> {
        Ok(self.system()?.num_joints())
    }

    pub fn num_end_effectors(&self) -> Result<usize, StateError> {
        Ok(self.system()?.num_end_effectors())
    }

    /// Length of the flat vector under the active variable set: the sum of
    /// the dimensions of the enabled fields only.
    pub fn dimension_of_state(&self) -> Result<usize, StateError> {
        let system = self.system()?;
        let num_coords = system.num_generalized_coordinates();
        let nj = system.num_joints();
        let nee = system.num_end_effectors();
        let vars = &self.variables;

        let mut dimension = 0;
        if vars.time {
            dimension += 1;
        }
        if vars.position {
            dimension += num_coords;
        }
        if vars.velocity {
            dimension += num_coords;
        }
        if vars.acceleration {
            dimension += num_coords;
        }
        if vars.joint_force {
            dimension += nj;
        }
        if vars.contact_position {
            dimension += 3 * nee;
        }
        if vars.contact_force {
            dimension += 3 * nee;
        }
        Ok(dimension)
    }

    /// Project a structured state into the flat vector.
    ///
    /// Fails with a dimension mismatch when a field of the state disagrees
    /// with the bound system's dimensions.
    pub fn from_locomotion_state(
        &self,
        state: &LocomotionState,
    ) -> Result<DVector<f64>, StateError> {
        let system = self.system()?;
        let num_coords = system.num_generalized_coordinates();
        let nj = system.num_joints();
        let nee = system.num_end_effectors();
        check_dimension(state.position.len(), num_coords)?;
        check_dimension(state.velocity.len(), num_coords)?;
        check_dimension(state.acceleration.len(), num_coords)?;
        check_dimension(state.joint_forces.len(), nj)?;
        check_dimension(state.contact_positions.len(), nee)?;
        check_dimension(state.contact_forces.len(), nee)?;

        let mut flat = Vec::with_capacity(self.dimension_of_state()?);
        let vars = &self.variables;
        if vars.time {
            flat.push(state.time);
        }
        if vars.position {
            flat.extend(state.position.iter());
        }
        if vars.velocity {
            flat.extend(state.velocity.iter());
        }
        if vars.acceleration {
            flat.extend(state.acceleration.iter());
        }
        if vars.joint_force {
            flat.extend(state.joint_forces.iter());
        }
        if vars.contact_position {
            for contact in &state.contact_positions {
                flat.extend(contact.iter());
            }
        }
        if vars.contact_force {
            for contact in &state.contact_forces {
                flat.extend(contact.iter());
            }
        }
        Ok(DVector::from_vec(flat))
    }

    /// Rebuild a structured state from a flat vector.
    ///
    /// Fields whose flag is disabled come back zeroed. A vector whose length
    /// disagrees with the active variable set is a configuration bug and
    /// fails hard.
    pub fn to_locomotion_state(
        &self,
        flat: &DVector<f64>,
    ) -> Result<LocomotionState, StateError> {
        let expected = self.dimension_of_state()?;
        check_dimension(flat.len(), expected)?;

        let system = self.system()?;
        let num_coords = system.num_generalized_coordinates();
        let nj = system.num_joints();
        let nee = system.num_end_effectors();
        let vars = &self.variables;

        let mut state = LocomotionState::zeros(nj, nee);
        let mut offset = 0;
        if vars.time {
            state.time = flat[0];
            offset += 1;
        }
        if vars.position {
            state.position.copy_from(&flat.rows(offset, num_coords));
            offset += num_coords;
        }
        if vars.velocity {
            state.velocity.copy_from(&flat.rows(offset, num_coords));
            offset += num_coords;
        }
        if vars.acceleration {
            state.acceleration.copy_from(&flat.rows(offset, num_coords));
            offset += num_coords;
        }
        if vars.joint_force {
            state.joint_forces.copy_from(&flat.rows(offset, nj));
            offset += nj;
        }
        if vars.contact_position {
            for contact in &mut state.contact_positions {
                *contact = Vector3::new(flat[offset], flat[offset + 1], flat[offset + 2]);
                offset += 3;
            }
        }
        if vars.contact_force {
            for contact in &mut state.contact_forces {
                *contact = Vector3::new(flat[offset], flat[offset + 1], flat[offset + 2]);
                offset += 3;
            }
        }
        Ok(state)
    }

    fn system(&self) -> Result<&'a FloatingBaseSystem, StateError> {
        self.system.ok_or(StateError::MissingSystem)
    }
}

const fn check_dimension(got: usize, expected: usize) -> Result<(), StateError> {
    if got == expected {
        Ok(())
    } else {
        Err(StateError::DimensionMismatch { expected, got })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn biped() -> FloatingBaseSystem {
        FloatingBaseSystem::new("biped", 2, vec!["left".into(), "right".into()])
    }

    fn bound_model(system: &FloatingBaseSystem, variables: LocomotionVariables) -> SystemModel<'_> {
        let mut model = SystemModel::new(variables);
        model.set_floating_base_system(system);
        model
    }

    #[test]
    fn queries_before_binding_fail() {
        let model = SystemModel::new(LocomotionVariables::full());
        assert_eq!(model.num_joints(), Err(StateError::MissingSystem));
        assert_eq!(model.dimension_of_state(), Err(StateError::MissingSystem));
        assert_eq!(
            model.to_locomotion_state(&DVector::zeros(3)),
            Err(StateError::MissingSystem)
        );
    }

    #[test]
    fn dimension_counts_enabled_fields_only() {
        let system = biped();
        // nq = 8, nj = 2, nee = 2
        let full = bound_model(&system, LocomotionVariables::full());
        assert_eq!(full.dimension_of_state().unwrap(), 1 + 3 * 8 + 2 + 6 + 6);

        let partial = bound_model(
            &system,
            LocomotionVariables {
                position: true,
                contact_force: true,
                ..LocomotionVariables::default()
            },
        );
        assert_eq!(partial.dimension_of_state().unwrap(), 8 + 6);
    }

    #[test]
    fn flat_round_trip_is_the_identity() {
        let system = biped();
        for variables in [
            LocomotionVariables::full(),
            LocomotionVariables {
                time: true,
                velocity: true,
                contact_position: true,
                ..LocomotionVariables::default()
            },
            LocomotionVariables {
                joint_force: true,
                ..LocomotionVariables::default()
            },
        ] {
            let model = bound_model(&system, variables);
            let dim = model.dimension_of_state().unwrap();
            let flat = DVector::from_fn(dim, |i, _| 0.5 + i as f64);
            let state = model.to_locomotion_state(&flat).unwrap();
            let recovered = model.from_locomotion_state(&state).unwrap();
            assert_relative_eq!(flat, recovered, epsilon = 1e-14);
        }
    }

    #[test]
    fn wrong_flat_length_is_a_hard_failure() {
        let system = biped();
        let model = bound_model(&system, LocomotionVariables::full());
        let expected = model.dimension_of_state().unwrap();
        let err = model
            .to_locomotion_state(&DVector::zeros(expected + 1))
            .unwrap_err();
        assert_eq!(
            err,
            StateError::DimensionMismatch {
                expected,
                got: expected + 1
            }
        );
    }

    #[test]
    fn mis_sized_state_is_a_hard_failure() {
        let system = biped();
        let model = bound_model(&system, LocomotionVariables::full());
        let wrong = LocomotionState::zeros(5, 2);
        assert!(matches!(
            model.from_locomotion_state(&wrong),
            Err(StateError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn binding_resets_bounds_and_starting_state() {
        let system = biped();
        let model = bound_model(&system, LocomotionVariables::full());
        let (lower, upper) = model.state_bounds();
        assert!(lower.position.iter().all(|v| *v == f64::NEG_INFINITY));
        assert!(upper.position.iter().all(|v| *v == f64::INFINITY));
        assert_eq!(model.starting_state().position.len(), 8);
    }

    // -- A concrete dynamical system exercising the contract --

    /// Vertical Newton constraint for a point-mass base with one contact:
    /// `m * a_z - f_z + m * g = 0`, over the {acceleration, contact_force}
    /// variable set.
    struct PointMassDynamics<'a> {
        model: SystemModel<'a>,
        mass: f64,
        gravity: f64,
    }

    impl PointMassDynamics<'_> {
        fn variables() -> LocomotionVariables {
            LocomotionVariables {
                acceleration: true,
                contact_force: true,
                ..LocomotionVariables::default()
            }
        }
    }

    impl DynamicalSystem for PointMassDynamics<'_> {
        fn compute(&self, state: &LocomotionState) -> DVector<f64> {
            let residual =
                self.mass * state.acceleration[2] - state.contact_forces[0].z
                    + self.mass * self.gravity;
            DVector::from_element(1, residual)
        }

        fn compute_jacobian(&self, state: &LocomotionState) -> DMatrix<f64> {
            let dim = self.model.dimension_of_state().unwrap();
            let mut jacobian = DMatrix::zeros(1, dim);
            // acceleration block starts at 0, contact-force block after it
            jacobian[(0, 2)] = self.mass;
            let force_offset = state.acceleration.len() + 2;
            jacobian[(0, force_offset)] = -1.0;
            jacobian
        }

        fn bounds(&self) -> (DVector<f64>, DVector<f64>) {
            // Dynamics consistency: equality constraint
            (DVector::zeros(1), DVector::zeros(1))
        }
    }

    #[test]
    fn jacobian_matches_finite_differences_of_the_constraint() {
        let system = FloatingBaseSystem::new("point", 0, vec!["foot".into()]);
        let dynamics = PointMassDynamics {
            model: bound_model(&system, PointMassDynamics::variables()),
            mass: 10.0,
            gravity: 9.81,
        };

        let dim = dynamics.model.dimension_of_state().unwrap();
        let flat = DVector::from_fn(dim, |i, _| 0.1 * (i as f64 + 1.0));
        let state = dynamics.model.to_locomotion_state(&flat).unwrap();
        let jacobian = dynamics.compute_jacobian(&state);
        assert_eq!(jacobian.ncols(), dim);

        let h = 1e-6;
        for col in 0..dim {
            let mut perturbed = flat.clone();
            perturbed[col] += h;
            let state_plus = dynamics.model.to_locomotion_state(&perturbed).unwrap();
            perturbed[col] -= 2.0 * h;
            let state_minus = dynamics.model.to_locomotion_state(&perturbed).unwrap();
            let fd =
                (dynamics.compute(&state_plus)[0] - dynamics.compute(&state_minus)[0]) / (2.0 * h);
            assert_relative_eq!(jacobian[(0, col)], fd, epsilon = 1e-4);
        }
    }

    #[test]
    fn equality_bounds_for_dynamics_consistency() {
        let system = FloatingBaseSystem::new("point", 0, vec!["foot".into()]);
        let dynamics = PointMassDynamics {
            model: bound_model(&system, PointMassDynamics::variables()),
            mass: 1.0,
            gravity: 9.81,
        };
        let (lower, upper) = dynamics.bounds();
        assert_eq!(lower, upper);
    }
}
