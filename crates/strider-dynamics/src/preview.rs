//! Closed-form reduced-order body model for fast trajectory previews.
//!
//! Two decoupled analytic sub-models are evaluated per stance phase, so a
//! preview at any time inside the phase is O(1) with no numerical
//! integration:
//!
//! - **Horizontal plane**: a linear inverted pendulum with natural frequency
//!   `ω_slip = sqrt(g / h)`, where `h` is the initial vertical offset between
//!   center of mass and center of pressure. The response is
//!
//!   ```text
//!   p(t) = β1 e^{ω t} + β2 e^{-ω t} + (Δcop / T) t + cop_0
//!   ```
//!
//!   with `β1, β2` solved from the initial offset, the initial velocity over
//!   the phase, and the planned center-of-pressure shift.
//!
//! - **Vertical axis**: a spring-loaded mass with natural frequency
//!   `ω_spring = sqrt(k / m)`, responding as
//!
//!   ```text
//!   z(t) = d1 cos(ω t) + d2 sin(ω t) + (Δl / T) t + l_0 - g / ω²
//!   ```
//!
//! The center of pressure is linearly interpolated from its initial position
//! toward `initial + planned shift` over the phase duration.

use log::warn;
use nalgebra::{Vector2, Vector3};
use strider_core::config::SlipConfig;

// ---------------------------------------------------------------------------
// Model data
// ---------------------------------------------------------------------------

/// Physical constants of the reduced body model, set once and reused across
/// contact phases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlipProperties {
    /// Gravitational acceleration magnitude in m/s^2.
    pub gravity: f64,
    /// Point mass in kg.
    pub mass: f64,
    /// Vertical spring stiffness in N/m.
    pub stiffness: f64,
}

impl SlipProperties {
    #[must_use]
    pub const fn new(gravity: f64, mass: f64, stiffness: f64) -> Self {
        Self {
            gravity,
            mass,
            stiffness,
        }
    }
}

impl From<SlipConfig> for SlipProperties {
    fn from(config: SlipConfig) -> Self {
        Self::new(config.gravity, config.mass, config.stiffness)
    }
}

/// Control inputs of one stance phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlipControlParams {
    /// Stance duration in seconds.
    pub duration: f64,
    /// Planned horizontal center-of-pressure shift over the phase.
    pub cop_shift: Vector2<f64>,
    /// Planned vertical pendulum-length shift over the phase.
    pub length_shift: f64,
}

impl SlipControlParams {
    #[must_use]
    pub const fn new(duration: f64, cop_shift: Vector2<f64>, length_shift: f64) -> Self {
        Self {
            duration,
            cop_shift,
            length_shift,
        }
    }
}

impl Default for SlipControlParams {
    fn default() -> Self {
        Self::new(0.0, Vector2::zeros(), 0.0)
    }
}

/// Reduced body state: center-of-mass motion and center of pressure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReducedBodyState {
    pub time: f64,
    pub com_pos: Vector3<f64>,
    pub com_vel: Vector3<f64>,
    pub com_acc: Vector3<f64>,
    pub cop: Vector3<f64>,
}

impl Default for ReducedBodyState {
    fn default() -> Self {
        Self {
            time: 0.0,
            com_pos: Vector3::zeros(),
            com_vel: Vector3::zeros(),
            com_acc: Vector3::zeros(),
            cop: Vector3::zeros(),
        }
    }
}

// ---------------------------------------------------------------------------
// LinearControlledSlipModel
// ---------------------------------------------------------------------------

/// Linear-controlled SLIP + spring-mass preview model.
///
/// [`init_response`](Self::init_response) recomputes every coefficient from
/// the phase's initial state and control parameters, so coefficients from a
/// previous phase never leak into a new one. Planning rollouts must stay
/// robust to misuse during search, so an unconfigured or uninitialized model
/// degrades to a warning and a no-op instead of failing.
#[derive(Debug, Clone)]
pub struct LinearControlledSlipModel {
    properties: Option<SlipProperties>,
    initial_state: ReducedBodyState,
    params: SlipControlParams,
    initial_length: f64,
    slip_omega: f64,
    spring_omega: f64,
    beta_1: Vector2<f64>,
    beta_2: Vector2<f64>,
    d_1: f64,
    d_2: f64,
    init_response: bool,
}

impl LinearControlledSlipModel {
    #[must_use]
    pub fn new() -> Self {
        Self {
            properties: None,
            initial_state: ReducedBodyState::default(),
            params: SlipControlParams::default(),
            initial_length: 0.0,
            slip_omega: 0.0,
            spring_omega: 0.0,
            beta_1: Vector2::zeros(),
            beta_2: Vector2::zeros(),
            d_1: 0.0,
            d_2: 0.0,
            init_response: false,
        }
    }

    /// Set the physical constants of the model.
    pub fn set_properties(&mut self, properties: SlipProperties) {
        self.properties = Some(properties);
    }

    #[must_use]
    pub fn properties(&self) -> Option<&SlipProperties> {
        self.properties.as_ref()
    }

    /// Initialize the analytic response of one stance phase.
    ///
    /// Must be called once per phase before [`compute_response`]
    /// (Self::compute_response). Degrades to a warning and no-op when the
    /// model properties were never set, when the phase duration is not
    /// positive, or when the center of mass does not start above the center
    /// of pressure.
    pub fn init_response(&mut self, state: &ReducedBodyState, params: &SlipControlParams) {
        let Some(properties) = self.properties else {
            warn!("cannot initialize the SLIP response: the model properties are not set");
            return;
        };
        if params.duration <= 0.0 {
            warn!(
                "cannot initialize the SLIP response: non-positive stance duration {}",
                params.duration
            );
            return;
        }
        let slip_height = state.com_pos.z - state.cop.z;
        if slip_height <= 0.0 {
            warn!(
                "cannot initialize the SLIP response: the CoM starts {slip_height} m \
                 below the CoP"
            );
            return;
        }

        self.initial_state = *state;
        self.params = *params;

        // Coefficients of the Spring Loaded Inverted Pendulum response
        self.slip_omega = (properties.gravity / slip_height).sqrt();
        let alpha = 2.0 * self.slip_omega * params.duration;
        let horizontal_projection = (state.com_pos - state.cop).xy();
        let horizontal_displacement = state.com_vel.xy() * params.duration;
        self.beta_1 = horizontal_projection / 2.0
            + (horizontal_displacement - params.cop_shift) / alpha;
        self.beta_2 = horizontal_projection / 2.0
            - (horizontal_displacement - params.cop_shift) / alpha;

        // Initial length of the pendulum
        self.initial_length = (state.com_pos - state.cop).norm();

        // Coefficients of the spring-mass response
        self.spring_omega = (properties.stiffness / properties.mass).sqrt();
        self.d_1 = state.com_pos.z - self.initial_length
            + properties.gravity / self.spring_omega.powi(2);
        self.d_2 = state.com_vel.z / self.spring_omega
            - params.length_shift / (self.spring_omega * params.duration);

        self.init_response = true;
    }

    /// Write the previewed state at `time` into `state`.
    ///
    /// A pure O(1) function of the elapsed time within the phase. Querying a
    /// time before the phase start leaves the state unchanged: previews only
    /// run forward during planning rollouts. Calling before
    /// [`init_response`](Self::init_response) warns and leaves the state
    /// unchanged.
    pub fn compute_response(&self, state: &mut ReducedBodyState, time: f64) {
        if !self.init_response {
            warn!("cannot compute the SLIP response: call init_response first");
            return;
        }
        if time < self.initial_state.time {
            return;
        }

        let dt = time - self.initial_state.time;
        let duration = self.params.duration;
        state.time = time;

        // Horizontal motion of the CoM from the SLIP system
        let omega = self.slip_omega;
        let growth = (omega * dt).exp();
        let decay = (-omega * dt).exp();
        let cop_rate = self.params.cop_shift / duration;
        let horizontal_pos = self.beta_1 * growth
            + self.beta_2 * decay
            + cop_rate * dt
            + self.initial_state.cop.xy();
        let horizontal_vel = self.beta_1 * omega * growth - self.beta_2 * omega * decay + cop_rate;
        let horizontal_acc =
            self.beta_1 * omega.powi(2) * growth + self.beta_2 * omega.powi(2) * decay;
        state.com_pos.x = horizontal_pos.x;
        state.com_pos.y = horizontal_pos.y;
        state.com_vel.x = horizontal_vel.x;
        state.com_vel.y = horizontal_vel.y;
        state.com_acc.x = horizontal_acc.x;
        state.com_acc.y = horizontal_acc.y;

        // Vertical motion of the CoM from the spring-mass system
        let properties = self
            .properties
            .expect("init_response checked the properties");
        let spring = self.spring_omega;
        let (sin, cos) = (spring * dt).sin_cos();
        let length_rate = self.params.length_shift / duration;
        state.com_pos.z = self.d_1 * cos
            + self.d_2 * sin
            + length_rate * dt
            + self.initial_length
            - properties.gravity / spring.powi(2);
        state.com_vel.z = -self.d_1 * spring * sin + self.d_2 * spring * cos + length_rate;
        state.com_acc.z =
            -self.d_1 * spring.powi(2) * cos - self.d_2 * spring.powi(2) * sin;

        // CoP interpolated linearly toward the planned shift
        let fraction = dt / duration;
        state.cop = self.initial_state.cop
            + fraction
                * Vector3::new(self.params.cop_shift.x, self.params.cop_shift.y, 0.0);
    }
}

impl Default for LinearControlledSlipModel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn properties() -> SlipProperties {
        SlipProperties::new(9.81, 1.0, 2000.0)
    }

    fn standing_state(height: f64) -> ReducedBodyState {
        ReducedBodyState {
            time: 0.0,
            com_pos: Vector3::new(0.1, -0.05, height),
            com_vel: Vector3::zeros(),
            com_acc: Vector3::zeros(),
            cop: Vector3::new(0.1, -0.05, 0.0),
        }
    }

    fn initialized_model(state: &ReducedBodyState, params: &SlipControlParams) -> LinearControlledSlipModel {
        let mut model = LinearControlledSlipModel::new();
        model.set_properties(properties());
        model.init_response(state, params);
        model
    }

    #[test]
    fn response_at_phase_start_reproduces_the_initial_state() {
        let initial = standing_state(0.6);
        let params = SlipControlParams::new(0.3, Vector2::zeros(), 0.0);
        let model = initialized_model(&initial, &params);

        let mut state = ReducedBodyState::default();
        model.compute_response(&mut state, 0.0);
        assert_relative_eq!(state.com_pos.x, initial.com_pos.x, epsilon = 1e-12);
        assert_relative_eq!(state.com_pos.y, initial.com_pos.y, epsilon = 1e-12);
        assert_relative_eq!(state.com_pos.z, initial.com_pos.z, epsilon = 1e-12);
        assert_relative_eq!(state.cop.x, initial.cop.x, epsilon = 1e-12);
        assert_relative_eq!(state.cop.y, initial.cop.y, epsilon = 1e-12);
        assert_relative_eq!(state.com_vel.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(state.com_vel.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn closed_form_velocity_matches_finite_differences_of_position() {
        let initial = ReducedBodyState {
            time: 0.0,
            com_pos: Vector3::new(0.02, 0.01, 0.55),
            com_vel: Vector3::new(0.3, -0.1, 0.05),
            com_acc: Vector3::zeros(),
            cop: Vector3::zeros(),
        };
        let params = SlipControlParams::new(0.4, Vector2::new(0.08, -0.03), 0.01);
        let model = initialized_model(&initial, &params);

        let h = 1e-6;
        for &t in &[0.05, 0.15, 0.25, 0.35] {
            let mut at = ReducedBodyState::default();
            let mut before = ReducedBodyState::default();
            let mut after = ReducedBodyState::default();
            model.compute_response(&mut at, t);
            model.compute_response(&mut before, t - h);
            model.compute_response(&mut after, t + h);

            for axis in 0..3 {
                let fd = (after.com_pos[axis] - before.com_pos[axis]) / (2.0 * h);
                assert_relative_eq!(at.com_vel[axis], fd, max_relative = 1e-4, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn closed_form_acceleration_matches_finite_differences_of_velocity() {
        let initial = ReducedBodyState {
            time: 0.0,
            com_pos: Vector3::new(-0.01, 0.04, 0.5),
            com_vel: Vector3::new(0.2, 0.1, -0.02),
            com_acc: Vector3::zeros(),
            cop: Vector3::zeros(),
        };
        let params = SlipControlParams::new(0.3, Vector2::new(0.05, 0.02), 0.0);
        let model = initialized_model(&initial, &params);

        let h = 1e-6;
        for &t in &[0.1, 0.2] {
            let mut at = ReducedBodyState::default();
            let mut before = ReducedBodyState::default();
            let mut after = ReducedBodyState::default();
            model.compute_response(&mut at, t);
            model.compute_response(&mut before, t - h);
            model.compute_response(&mut after, t + h);

            for axis in 0..3 {
                let fd = (after.com_vel[axis] - before.com_vel[axis]) / (2.0 * h);
                assert_relative_eq!(at.com_acc[axis], fd, max_relative = 1e-3, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn vertical_response_stays_a_bounded_oscillation() {
        let initial = standing_state(0.5);
        let params = SlipControlParams::new(0.3, Vector2::zeros(), 0.0);
        let model = initialized_model(&initial, &params);

        // With zero shifts the vertical response oscillates around the
        // spring equilibrium l0 - g/w^2 with a fixed amplitude.
        let omega = (properties().stiffness / properties().mass).sqrt();
        let equilibrium = 0.5 - properties().gravity / omega.powi(2);
        let amplitude = properties().gravity / omega.powi(2);

        let mut state = ReducedBodyState::default();
        for i in 0..=30 {
            let t = 0.01 * f64::from(i);
            model.compute_response(&mut state, t);
            assert!(
                (state.com_pos.z - equilibrium).abs() <= amplitude + 1e-9,
                "diverged at t={t}: z={}",
                state.com_pos.z
            );
        }
    }

    #[test]
    fn cop_interpolates_linearly_toward_the_planned_shift() {
        let initial = standing_state(0.6);
        let params = SlipControlParams::new(0.4, Vector2::new(0.1, -0.06), 0.0);
        let model = initialized_model(&initial, &params);

        let mut state = ReducedBodyState::default();
        model.compute_response(&mut state, 0.2);
        assert_relative_eq!(state.cop.x, initial.cop.x + 0.05, epsilon = 1e-12);
        assert_relative_eq!(state.cop.y, initial.cop.y - 0.03, epsilon = 1e-12);
        model.compute_response(&mut state, 0.4);
        assert_relative_eq!(state.cop.x, initial.cop.x + 0.1, epsilon = 1e-12);
        assert_relative_eq!(state.cop.z, initial.cop.z, epsilon = 1e-12);
    }

    #[test]
    fn query_before_the_phase_start_is_a_no_op() {
        let initial = ReducedBodyState {
            time: 1.0,
            ..standing_state(0.6)
        };
        let params = SlipControlParams::new(0.3, Vector2::zeros(), 0.0);
        let model = initialized_model(&initial, &params);

        let sentinel = ReducedBodyState {
            time: -7.0,
            com_pos: Vector3::new(9.0, 9.0, 9.0),
            com_vel: Vector3::new(8.0, 8.0, 8.0),
            com_acc: Vector3::new(7.0, 7.0, 7.0),
            cop: Vector3::new(6.0, 6.0, 6.0),
        };
        let mut state = sentinel;
        model.compute_response(&mut state, 0.5);
        assert_eq!(state, sentinel);
    }

    #[test]
    fn response_without_initialization_is_a_no_op() {
        let mut model = LinearControlledSlipModel::new();
        model.set_properties(properties());

        let sentinel = standing_state(0.6);
        let mut state = sentinel;
        model.compute_response(&mut state, 0.1);
        assert_eq!(state, sentinel);
    }

    #[test]
    fn initialization_without_properties_is_a_no_op() {
        let mut model = LinearControlledSlipModel::new();
        let params = SlipControlParams::new(0.3, Vector2::zeros(), 0.0);
        model.init_response(&standing_state(0.6), &params);

        let sentinel = standing_state(0.6);
        let mut state = sentinel;
        model.compute_response(&mut state, 0.1);
        assert_eq!(state, sentinel);
    }

    #[test]
    fn degenerate_phases_are_rejected_at_initialization() {
        let mut model = LinearControlledSlipModel::new();
        model.set_properties(properties());

        // Zero duration
        model.init_response(
            &standing_state(0.6),
            &SlipControlParams::new(0.0, Vector2::zeros(), 0.0),
        );
        let mut state = standing_state(0.6);
        let sentinel = state;
        model.compute_response(&mut state, 0.1);
        assert_eq!(state, sentinel);

        // CoM below the CoP
        let mut inverted = standing_state(0.6);
        inverted.com_pos.z = -0.1;
        model.init_response(
            &inverted,
            &SlipControlParams::new(0.3, Vector2::zeros(), 0.0),
        );
        model.compute_response(&mut state, 0.1);
        assert_eq!(state, sentinel);
    }

    #[test]
    fn each_initialization_fully_replaces_previous_coefficients() {
        let params = SlipControlParams::new(0.3, Vector2::new(0.05, 0.0), 0.0);
        let first = ReducedBodyState {
            com_vel: Vector3::new(0.4, 0.0, 0.0),
            ..standing_state(0.6)
        };
        let second = standing_state(0.5);

        let mut model = LinearControlledSlipModel::new();
        model.set_properties(properties());
        model.init_response(&first, &params);
        model.init_response(&second, &SlipControlParams::new(0.3, Vector2::zeros(), 0.0));

        // The second phase starts at rest with zero shifts, so the previewed
        // state at t=0 is exactly the second initial state: nothing of the
        // first phase's coefficients remains.
        let mut state = ReducedBodyState::default();
        model.compute_response(&mut state, 0.0);
        assert_relative_eq!(state.com_pos.x, second.com_pos.x, epsilon = 1e-12);
        assert_relative_eq!(state.com_pos.z, second.com_pos.z, epsilon = 1e-12);
        assert_relative_eq!(state.com_vel.x, 0.0, epsilon = 1e-12);
    }
}
