//! End-to-end contact selection over a configured terrain map.

use approx::assert_relative_eq;
use nalgebra::Vector2;
use strider_core::{PlannerConfig, Robot, StepRegion};
use strider_planning::{ContactPlanning, ObstacleFeature, TerrainCostFeature};
use strider_terrain::{RewardCell, TerrainMap};

fn terrain_from_toml() -> TerrainMap {
    let config = PlannerConfig::from_toml_str(
        r#"
        terrain_plane_resolution = 0.1
        obstacle_plane_resolution = 0.1
        "#,
    )
    .unwrap();
    TerrainMap::from_config(&config).unwrap()
}

#[test]
fn average_cost_backs_unmapped_terrain() {
    let mut terrain = terrain_from_toml();
    let cells = [
        RewardCell {
            cell: terrain
                .terrain_space()
                .position_to_cell(&Vector2::new(0.0, 0.0)),
            reward: 1.0,
            height: 0.0,
        },
        RewardCell {
            cell: terrain
                .terrain_space()
                .position_to_cell(&Vector2::new(1.0, 0.0)),
            reward: 3.0,
            height: 0.0,
        },
    ];
    terrain.set_reward_map(&cells);

    assert_relative_eq!(terrain.average_cost_of_terrain(), 2.0);
    assert_relative_eq!(terrain.cost_at_position(&Vector2::new(5.0, 5.0)), 2.0);
}

#[test]
fn planner_avoids_obstacles_and_expensive_cells() {
    let mut terrain = terrain_from_toml();

    // Cheap strip along y = -0.1, expensive elsewhere around the nominal
    // stance, and an obstacle sitting right on the nominal stance itself.
    let mut cells = Vec::new();
    for i in 0..=6 {
        let x = 0.1 * f64::from(i);
        for &(y, reward) in &[(-0.1, 0.5), (0.0, 4.0), (0.1, 4.0)] {
            cells.push(RewardCell {
                cell: terrain
                    .terrain_space()
                    .position_to_cell(&Vector2::new(x, y)),
                reward,
                height: 0.02,
            });
        }
    }
    terrain.set_reward_map(&cells);
    let blocked = terrain
        .obstacle_space()
        .position_to_cell(&Vector2::new(0.2, -0.1));
    terrain.set_obstacle_map(&[blocked]);

    let robot = Robot::new("quadruped", StepRegion::new(0.1, 0.1, 0.1), 0.2);
    let mut planner = ContactPlanning::new();
    planner.add_feature(Box::new(TerrainCostFeature::new(0.5)));
    planner.add_feature(Box::new(ObstacleFeature::new(10.0)));
    planner.reset(&robot, &terrain);
    planner.set_contact_horizon(1);

    let plan = planner
        .plan_contacts(&Vector2::zeros(), &Vector2::new(2.0, 0.0))
        .unwrap();
    assert_eq!(plan.len(), 2);
    for contact in &plan {
        let cell = terrain
            .obstacle_space()
            .position_to_cell(&Vector2::new(contact.position.x, contact.position.y));
        assert!(!terrain.is_obstacle(cell), "stepped on an obstacle");
        // Contacts inherit the bucketed terrain height
        assert_relative_eq!(contact.position.z, 0.02, epsilon = 1e-12);
    }
}
