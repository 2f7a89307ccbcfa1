//! Sparse terrain cost, height, and obstacle maps keyed by cell id.
//!
//! Cells never supplied by perception stay out of the maps: cost lookups for
//! them fall back to the average cost of the known terrain, which gives
//! planners a conservative default instead of treating unmapped ground as
//! free or impassable. Height and obstacle lookups report unknown cells as
//! absent.

use std::collections::{HashMap, HashSet};

use log::debug;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use strider_core::{PlannerConfig, TerrainError};

use crate::discretization::{CellKey, SpaceDiscretization};

// ---------------------------------------------------------------------------
// RewardCell
// ---------------------------------------------------------------------------

/// A terrain evaluation at one cell, as produced by perception.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardCell {
    /// Cell id under the terrain discretization.
    pub cell: CellKey,
    /// Scalar terrain cost of placing a contact in this cell.
    pub reward: f64,
    /// Measured terrain height in meters; bucketed through the height
    /// resolution when installed.
    pub height: f64,
}

// ---------------------------------------------------------------------------
// TerrainMap
// ---------------------------------------------------------------------------

/// Terrain information shared by all contact planners in a planning cycle.
///
/// Owns two independent discretizations (terrain cost/height and obstacles)
/// and the three sparse maps built under them. Read-shared during a planning
/// cycle; mutated only between cycles when new perception data arrives.
#[derive(Debug, Clone)]
pub struct TerrainMap {
    terrain_discretization: SpaceDiscretization,
    obstacle_discretization: SpaceDiscretization,
    cost_map: HashMap<CellKey, f64>,
    height_map: HashMap<CellKey, f64>,
    obstacle_map: HashSet<CellKey>,
    average_cost: f64,
    terrain_information: bool,
    obstacle_information: bool,
}

impl TerrainMap {
    /// Create an empty map with the default resolutions.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(&PlannerConfig::default())
            .expect("default planner config has positive resolutions")
    }

    /// Create an empty map with the resolutions of a planner configuration.
    pub fn from_config(config: &PlannerConfig) -> Result<Self, TerrainError> {
        let mut terrain = SpaceDiscretization::new(
            config.terrain_plane_resolution,
            config.terrain_height_resolution,
        )?;
        let mut obstacle = SpaceDiscretization::new(
            config.obstacle_plane_resolution,
            config.obstacle_height_resolution,
        )?;
        terrain.set_state_resolution(
            config.state_position_resolution,
            config.state_angular_resolution,
        )?;
        obstacle.set_state_resolution(
            config.state_position_resolution,
            config.state_angular_resolution,
        )?;
        Ok(Self {
            terrain_discretization: terrain,
            obstacle_discretization: obstacle,
            cost_map: HashMap::new(),
            height_map: HashMap::new(),
            obstacle_map: HashSet::new(),
            average_cost: 0.0,
            terrain_information: false,
            obstacle_information: false,
        })
    }

    // -- Mutation (between planning cycles only) --

    /// Replace the terrain cost and height maps.
    ///
    /// The average cost becomes the arithmetic mean of the supplied rewards
    /// and is returned by [`cost_at`](Self::cost_at) for any unmapped cell.
    /// An empty sequence still marks terrain information as present and
    /// resets the average cost to `0.0`.
    pub fn set_reward_map(&mut self, reward_map: &[RewardCell]) {
        self.cost_map.clear();
        self.height_map.clear();
        let mut total = 0.0;
        for cell in reward_map {
            self.cost_map.insert(cell.cell, cell.reward);
            let key = self.terrain_discretization.height_to_key(cell.height);
            self.height_map
                .insert(cell.cell, self.terrain_discretization.key_to_height(key));
            total += cell.reward;
        }
        self.average_cost = if reward_map.is_empty() {
            0.0
        } else {
            total / reward_map.len() as f64
        };
        self.terrain_information = true;
        debug!(
            "installed terrain reward map: {} cells, average cost {:.4}",
            reward_map.len(),
            self.average_cost
        );
    }

    /// Replace the obstacle map.
    pub fn set_obstacle_map(&mut self, obstacle_map: &[CellKey]) {
        self.obstacle_map = obstacle_map.iter().copied().collect();
        self.obstacle_information = true;
        debug!("installed obstacle map: {} cells", self.obstacle_map.len());
    }

    /// Set the terrain resolution of the plane (`plane == true`) or height.
    ///
    /// Does not rebucket cells already stored; callers must not mix maps
    /// built under different resolutions.
    pub fn set_terrain_resolution(
        &mut self,
        resolution: f64,
        plane: bool,
    ) -> Result<(), TerrainError> {
        self.terrain_discretization.set_resolution(resolution, plane)
    }

    /// Set the obstacle resolution of the plane (`plane == true`) or height.
    pub fn set_obstacle_resolution(
        &mut self,
        resolution: f64,
        plane: bool,
    ) -> Result<(), TerrainError> {
        self.obstacle_discretization.set_resolution(resolution, plane)
    }

    /// Set the resolutions used for planner state-space queries on both
    /// discretizations.
    pub fn set_state_resolution(
        &mut self,
        position_resolution: f64,
        angular_resolution: f64,
    ) -> Result<(), TerrainError> {
        self.terrain_discretization
            .set_state_resolution(position_resolution, angular_resolution)?;
        self.obstacle_discretization
            .set_state_resolution(position_resolution, angular_resolution)
    }

    // -- Read access --

    /// Terrain cost map keyed by cell id.
    #[must_use]
    pub const fn cost_map(&self) -> &HashMap<CellKey, f64> {
        &self.cost_map
    }

    /// Terrain height map keyed by cell id.
    #[must_use]
    pub const fn height_map(&self) -> &HashMap<CellKey, f64> {
        &self.height_map
    }

    /// Obstacle cells keyed by cell id under the obstacle discretization.
    #[must_use]
    pub const fn obstacle_map(&self) -> &HashSet<CellKey> {
        &self.obstacle_map
    }

    /// Cost of a cell, falling back to the average terrain cost for cells
    /// absent from the cost map.
    #[must_use]
    pub fn cost_at(&self, cell: CellKey) -> f64 {
        self.cost_map.get(&cell).copied().unwrap_or(self.average_cost)
    }

    /// Height of a cell, or `None` when no height was asserted for it.
    #[must_use]
    pub fn height_at(&self, cell: CellKey) -> Option<f64> {
        self.height_map.get(&cell).copied()
    }

    /// Whether a cell was asserted as an obstacle. Unknown cells are not
    /// obstacles.
    #[must_use]
    pub fn is_obstacle(&self, cell: CellKey) -> bool {
        self.obstacle_map.contains(&cell)
    }

    /// Cost of the horizontal position under the terrain discretization,
    /// with the average-cost fallback.
    #[must_use]
    pub fn cost_at_position(&self, position: &Vector2<f64>) -> f64 {
        self.cost_at(self.terrain_discretization.position_to_cell(position))
    }

    /// Average cost over the installed reward map, used for unknown cells.
    #[must_use]
    pub const fn average_cost_of_terrain(&self) -> f64 {
        self.average_cost
    }

    /// Plane resolution of the terrain cost/height maps.
    #[must_use]
    pub const fn terrain_resolution(&self) -> f64 {
        self.terrain_discretization.plane_resolution()
    }

    /// Plane resolution of the obstacle map.
    #[must_use]
    pub const fn obstacle_resolution(&self) -> f64 {
        self.obstacle_discretization.plane_resolution()
    }

    /// Discrete space model of the terrain cost/height maps.
    #[must_use]
    pub const fn terrain_space(&self) -> &SpaceDiscretization {
        &self.terrain_discretization
    }

    /// Discrete space model of the obstacle map.
    #[must_use]
    pub const fn obstacle_space(&self) -> &SpaceDiscretization {
        &self.obstacle_discretization
    }

    /// True once a reward map has been installed, even an empty one.
    #[must_use]
    pub const fn is_terrain_information(&self) -> bool {
        self.terrain_information
    }

    /// True once an obstacle map has been installed, even an empty one.
    #[must_use]
    pub const fn is_obstacle_information(&self) -> bool {
        self.obstacle_information
    }
}

impl Default for TerrainMap {
    fn default() -> Self {
        Self::new()
    }
}
