use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// StepRegion
// ---------------------------------------------------------------------------

/// Rectangular foothold search region around a nominal contact position, in
/// the robot's horizontal frame.
///
/// The region spans `[-max_backward, max_forward]` along the direction of
/// travel and `[-max_lateral, max_lateral]` sideways. All extents are
/// non-negative distances in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepRegion {
    pub max_forward: f64,
    pub max_backward: f64,
    pub max_lateral: f64,
}

impl StepRegion {
    #[must_use]
    pub const fn new(max_forward: f64, max_backward: f64, max_lateral: f64) -> Self {
        Self {
            max_forward,
            max_backward,
            max_lateral,
        }
    }

    /// True when every extent is non-negative, i.e. the region contains at
    /// least its own center.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.max_forward >= 0.0 && self.max_backward >= 0.0 && self.max_lateral >= 0.0
    }
}

// ---------------------------------------------------------------------------
// Robot
// ---------------------------------------------------------------------------

/// Planner-facing robot description.
///
/// The contact planner only queries geometry bounds from the robot; joint
/// transforms and whole-body Jacobians live in the kinematics collaborator
/// outside this kernel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Robot {
    name: String,
    step_region: StepRegion,
    nominal_step: f64,
}

impl Robot {
    /// Create a robot description.
    ///
    /// `nominal_step` is the preferred displacement between consecutive
    /// contacts when walking toward a target, in meters.
    #[must_use]
    pub fn new(name: impl Into<String>, step_region: StepRegion, nominal_step: f64) -> Self {
        Self {
            name: name.into(),
            step_region,
            nominal_step,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn step_region(&self) -> &StepRegion {
        &self.step_region
    }

    #[must_use]
    pub const fn nominal_step(&self) -> f64 {
        self.nominal_step
    }
}
