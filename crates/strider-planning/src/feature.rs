//! Capability contract for candidate-contact scoring plug-ins.

use nalgebra::Vector3;
use strider_core::Robot;
use strider_terrain::{CellKey, TerrainMap};

/// Everything a feature may inspect about one candidate contact.
#[derive(Debug, Clone, Copy)]
pub struct CandidateContext<'a> {
    /// Candidate contact position in world coordinates.
    pub position: Vector3<f64>,
    /// Candidate cell id under the terrain discretization.
    pub cell: CellKey,
    /// Terrain information bound to the planner.
    pub terrain: &'a TerrainMap,
}

/// A scoring plug-in for candidate contacts.
///
/// The planner combines per-feature rewards into a single candidate score as
/// a weighted sum. Features are evaluated in registration order, which keeps
/// diagnostics and tie-breaking deterministic even though the sum itself is
/// order-independent.
pub trait Feature {
    /// Human-readable name for this feature.
    fn name(&self) -> &str;

    /// Aggregation weight of this feature's reward.
    fn weight(&self) -> f64;

    /// Re-initialize against a new robot. Features may cache robot-specific
    /// geometry here.
    fn reset(&mut self, _robot: &Robot) {}

    /// Score a candidate contact. Higher rewards are better.
    fn evaluate(&self, context: &CandidateContext<'_>) -> f64;
}
