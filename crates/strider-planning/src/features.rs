//! Standard feature implementations for terrain-aware contact selection.

use nalgebra::Vector2;
use strider_core::Robot;

use crate::feature::{CandidateContext, Feature};

// ---------------------------------------------------------------------------
// TerrainCostFeature
// ---------------------------------------------------------------------------

/// Rewards low-cost terrain cells.
///
/// Returns the negated cell cost (negative so maximizing reward minimizes
/// cost). Cells absent from the cost map read as the terrain's average cost,
/// so unmapped ground is neither free nor impassable.
pub struct TerrainCostFeature {
    weight: f64,
}

impl TerrainCostFeature {
    #[must_use]
    pub const fn new(weight: f64) -> Self {
        Self { weight }
    }
}

impl Feature for TerrainCostFeature {
    fn name(&self) -> &str {
        "TerrainCostFeature"
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn evaluate(&self, context: &CandidateContext<'_>) -> f64 {
        -context.terrain.cost_at(context.cell)
    }
}

// ---------------------------------------------------------------------------
// ObstacleFeature
// ---------------------------------------------------------------------------

/// Penalizes candidate cells asserted as obstacles.
///
/// Returns `-1.0` for obstacle cells and `0.0` otherwise; the candidate's
/// position is rebucketed under the obstacle discretization, which may use a
/// coarser resolution than the terrain maps.
pub struct ObstacleFeature {
    weight: f64,
}

impl ObstacleFeature {
    #[must_use]
    pub const fn new(weight: f64) -> Self {
        Self { weight }
    }
}

impl Feature for ObstacleFeature {
    fn name(&self) -> &str {
        "ObstacleFeature"
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn reset(&mut self, _robot: &Robot) {}

    fn evaluate(&self, context: &CandidateContext<'_>) -> f64 {
        let cell = context
            .terrain
            .obstacle_space()
            .position_to_cell(&Vector2::new(context.position.x, context.position.y));
        if context.terrain.is_obstacle(cell) {
            -1.0
        } else {
            0.0
        }
    }
}
