//! Contact sequence selection over discretized terrain.
//!
//! The planner binds a robot and terrain, scores candidate footholds through
//! its registered features, and greedily walks a contact sequence toward a
//! target. The search is an anytime algorithm: the computation-time budget is
//! a cooperative deadline polled between candidate evaluations, and running
//! out of time returns the best sequence found so far instead of failing.

use std::time::Instant;

use log::{info, warn};
use nalgebra::{Vector2, Vector3};
use strider_core::{PlanningError, Robot};
use strider_terrain::{CellKey, TerrainMap};

use crate::feature::{CandidateContext, Feature};

// ---------------------------------------------------------------------------
// ContactCandidate
// ---------------------------------------------------------------------------

/// A selected contact: its cell, world position, and aggregate score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactCandidate {
    pub cell: CellKey,
    pub position: Vector3<f64>,
    pub score: f64,
}

// ---------------------------------------------------------------------------
// ContactPlanning
// ---------------------------------------------------------------------------

/// Orchestrates robot, terrain, and weighted features into contact sequences.
///
/// The robot and terrain are borrowed from the caller and rebound with
/// [`reset`](Self::reset); the planner never outlives them. Features are
/// evaluated in registration order.
pub struct ContactPlanning<'a> {
    robot: Option<&'a Robot>,
    terrain: Option<&'a TerrainMap>,
    features: Vec<Box<dyn Feature>>,
    computation_time: f64,
    contact_horizon: usize,
}

impl<'a> ContactPlanning<'a> {
    /// Create a planner with no bound robot or terrain, an unbounded
    /// computation time, and a single-step horizon.
    #[must_use]
    pub fn new() -> Self {
        Self {
            robot: None,
            terrain: None,
            features: Vec::new(),
            computation_time: f64::INFINITY,
            contact_horizon: 0,
        }
    }

    /// Rebind the robot and terrain and re-initialize every registered
    /// feature against the new robot.
    pub fn reset(&mut self, robot: &'a Robot, terrain: &'a TerrainMap) {
        info!("binding robot '{}' to the contact planner", robot.name());
        self.robot = Some(robot);
        self.terrain = Some(terrain);
        for feature in &mut self.features {
            feature.reset(robot);
        }
    }

    /// Append a scoring feature. Evaluation order follows registration order.
    pub fn add_feature(&mut self, feature: Box<dyn Feature>) {
        info!(
            "adding the {} feature with a weight of {:.3} to the contact planner",
            feature.name(),
            feature.weight()
        );
        self.features.push(feature);
    }

    /// Upper bound on the contact search in seconds.
    ///
    /// The search polls this deadline between candidate evaluations and
    /// returns the best sequence found so far once it is exceeded.
    pub fn set_computation_time(&mut self, seconds: f64) {
        info!("setting the allowed computation time of the contact search to {seconds}");
        self.computation_time = seconds;
    }

    /// Number of lookahead contacts beyond the next one. Zero means purely
    /// greedy single-contact planning.
    pub fn set_contact_horizon(&mut self, horizon: usize) {
        self.contact_horizon = horizon;
    }

    #[must_use]
    pub const fn computation_time(&self) -> f64 {
        self.computation_time
    }

    #[must_use]
    pub const fn contact_horizon(&self) -> usize {
        self.contact_horizon
    }

    #[must_use]
    pub fn num_features(&self) -> usize {
        self.features.len()
    }

    /// Aggregate score of one candidate: the weighted sum of every feature's
    /// reward, in registration order.
    #[must_use]
    pub fn score(&self, context: &CandidateContext<'_>) -> f64 {
        self.features
            .iter()
            .map(|feature| feature.weight() * feature.evaluate(context))
            .sum()
    }

    /// Plan a contact sequence from `start` toward `target`.
    ///
    /// Per horizon step, every cell of the robot's step region around the
    /// nominal next stance is scored and the best kept; the winning contact
    /// becomes the stance for the following step. Returns `horizon + 1`
    /// contacts, or fewer when the computation-time budget runs out first.
    pub fn plan_contacts(
        &self,
        start: &Vector2<f64>,
        target: &Vector2<f64>,
    ) -> Result<Vec<ContactCandidate>, PlanningError> {
        let robot = self.robot.ok_or(PlanningError::NotInitialized)?;
        let terrain = self.terrain.ok_or(PlanningError::NotInitialized)?;
        let region = robot.step_region();
        if !region.is_valid() {
            return Err(PlanningError::EmptySearchRegion);
        }

        let started = Instant::now();
        let resolution = terrain.terrain_space().plane_resolution();
        let n_forward = (region.max_forward / resolution).floor() as i64;
        let n_backward = (region.max_backward / resolution).floor() as i64;
        let n_lateral = (region.max_lateral / resolution).floor() as i64;

        let steps = self.contact_horizon + 1;
        let mut plan = Vec::with_capacity(steps);
        let mut current = *start;
        let mut timed_out = false;

        'steps: for _ in 0..steps {
            let to_target = target - current;
            let distance = to_target.norm();
            let forward = if distance > 1e-9 {
                to_target / distance
            } else {
                Vector2::new(1.0, 0.0)
            };
            let lateral = Vector2::new(-forward.y, forward.x);
            let step_center = current + forward * distance.min(robot.nominal_step());

            let mut best: Option<ContactCandidate> = None;
            for i in -n_backward..=n_forward {
                for j in -n_lateral..=n_lateral {
                    if started.elapsed().as_secs_f64() > self.computation_time {
                        timed_out = true;
                        if let Some(candidate) = best {
                            plan.push(candidate);
                        }
                        break 'steps;
                    }

                    let offset =
                        forward * (i as f64 * resolution) + lateral * (j as f64 * resolution);
                    let position_2d = step_center + offset;
                    let cell = terrain.terrain_space().position_to_cell(&position_2d);
                    let height = terrain.height_at(cell).unwrap_or(0.0);
                    let context = CandidateContext {
                        position: Vector3::new(position_2d.x, position_2d.y, height),
                        cell,
                        terrain,
                    };
                    let score = self.score(&context);
                    // Strict comparison keeps the first of tied candidates,
                    // so results are deterministic for a fixed registration
                    // and iteration order.
                    if best.is_none_or(|b| score > b.score) {
                        best = Some(ContactCandidate {
                            cell,
                            position: context.position,
                            score,
                        });
                    }
                }
            }

            // The region always contains its own center, so a finished step
            // has a winner.
            let candidate = best.expect("search region contains at least one cell");
            current = Vector2::new(candidate.position.x, candidate.position.y);
            plan.push(candidate);
        }

        if timed_out {
            warn!(
                "contact search exceeded its {:.3}s budget; returning {} of {} contacts",
                self.computation_time,
                plan.len(),
                steps
            );
        }
        Ok(plan)
    }
}

impl Default for ContactPlanning<'_> {
    fn default() -> Self {
        Self::new()
    }
}
