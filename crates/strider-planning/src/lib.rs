// strider-planning: Contact selection from terrain features.

pub mod feature;
pub mod features;
pub mod planner;

pub use feature::{CandidateContext, Feature};
pub use features::{ObstacleFeature, TerrainCostFeature};
pub use planner::{ContactCandidate, ContactPlanning};
