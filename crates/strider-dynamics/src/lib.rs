//! Dynamical-system constraint contract and reduced-order body preview for
//! legged trajectory optimization.
//!
//! Two pieces plug a contact plan into an external numerical optimizer:
//!
//! 1. **State transcription** — [`LocomotionState`] is the canonical
//!    structured robot state; [`SystemModel`] projects it to and from the
//!    flat vector a solver consumes, gated by [`LocomotionVariables`].
//! 2. **Constraint contract** — concrete robot dynamics implement
//!    [`DynamicalSystem`] (`compute`, `compute_jacobian`, `bounds`); the
//!    kernel assumes nothing about the solver beyond consistent dimensions.
//!
//! The [`LinearControlledSlipModel`] previews center-of-mass motion for one
//! stance phase in closed form (inverted pendulum in the plane, spring-mass
//! on the vertical), cheap enough to evaluate thousands of candidate
//! rollouts per planning cycle before committing to a full-body
//! optimization.

pub mod preview;
pub mod state;
pub mod system;

pub use preview::{
    LinearControlledSlipModel, ReducedBodyState, SlipControlParams, SlipProperties,
};
pub use state::{LocomotionState, LocomotionVariables};
pub use system::{DynamicalSystem, SystemModel};
