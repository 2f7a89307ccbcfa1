// strider-terrain: Discretized terrain, obstacle, and height maps.

pub mod discretization;
pub mod terrain_map;

pub use discretization::{CellKey, SpaceDiscretization, StateKey};
pub use terrain_map::{RewardCell, TerrainMap};
