//! Bidirectional mapping between continuous world coordinates and integer
//! cell ids.
//!
//! Coordinates are bucketed to the nearest cell center, so a coordinate and
//! its recovered center never differ by more than half the configured
//! resolution per axis. Cell ids are opaque: two discretizations with
//! different resolutions produce incompatible id spaces, and changing a
//! resolution invalidates the spatial meaning of previously issued ids.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use strider_core::TerrainError;

// ---------------------------------------------------------------------------
// Cell ids
// ---------------------------------------------------------------------------

/// Planar cell id: x and y bucket indices packed into the high and low
/// 32-bit halves of a `u64` (two's complement).
///
/// Valid over `±resolution * 2^31` meters per axis.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CellKey(u64);

impl CellKey {
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// State-space cell id: x and y bucket indices in 24-bit fields, yaw bucket
/// index in a 16-bit field.
///
/// Valid over `±position_resolution * 2^23` meters per axis; yaw is wrapped
/// to `(-pi, pi]` before bucketing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct StateKey(u64);

impl StateKey {
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

// ---------------------------------------------------------------------------
// SpaceDiscretization
// ---------------------------------------------------------------------------

/// Resolution-parameterized converter between world coordinates and cell ids.
///
/// Plane and height resolutions bucket the terrain maps; the state position
/// and angular resolutions bucket combined position/orientation queries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpaceDiscretization {
    plane_resolution: f64,
    height_resolution: f64,
    state_position_resolution: f64,
    angular_resolution: f64,
}

impl SpaceDiscretization {
    /// Default yaw bucket width: pi/32 rad.
    const DEFAULT_ANGULAR_RESOLUTION: f64 = std::f64::consts::PI / 32.0;

    /// Create a discretization with the given plane and height resolutions.
    ///
    /// The state position resolution starts equal to the plane resolution and
    /// the angular resolution at pi/32; both can be changed with
    /// [`set_state_resolution`](Self::set_state_resolution).
    pub fn new(plane_resolution: f64, height_resolution: f64) -> Result<Self, TerrainError> {
        check_resolution(plane_resolution)?;
        check_resolution(height_resolution)?;
        Ok(Self {
            plane_resolution,
            height_resolution,
            state_position_resolution: plane_resolution,
            angular_resolution: Self::DEFAULT_ANGULAR_RESOLUTION,
        })
    }

    /// Set the plane resolution (`plane == true`) or height resolution
    /// (`plane == false`).
    pub fn set_resolution(&mut self, resolution: f64, plane: bool) -> Result<(), TerrainError> {
        check_resolution(resolution)?;
        if plane {
            self.plane_resolution = resolution;
        } else {
            self.height_resolution = resolution;
        }
        Ok(())
    }

    /// Set the resolutions used by state-space queries.
    pub fn set_state_resolution(
        &mut self,
        position_resolution: f64,
        angular_resolution: f64,
    ) -> Result<(), TerrainError> {
        check_resolution(position_resolution)?;
        check_resolution(angular_resolution)?;
        self.state_position_resolution = position_resolution;
        self.angular_resolution = angular_resolution;
        Ok(())
    }

    #[must_use]
    pub const fn plane_resolution(&self) -> f64 {
        self.plane_resolution
    }

    #[must_use]
    pub const fn height_resolution(&self) -> f64 {
        self.height_resolution
    }

    #[must_use]
    pub const fn state_position_resolution(&self) -> f64 {
        self.state_position_resolution
    }

    #[must_use]
    pub const fn angular_resolution(&self) -> f64 {
        self.angular_resolution
    }

    // -- Plane mapping --

    /// Bucket a horizontal position into its cell id.
    #[must_use]
    pub fn position_to_cell(&self, position: &Vector2<f64>) -> CellKey {
        let x = coord_to_key(position.x, self.plane_resolution);
        let y = coord_to_key(position.y, self.plane_resolution);
        CellKey(pack_i32(x as i32) << 32 | pack_i32(y as i32))
    }

    /// Recover the center of a planar cell.
    #[must_use]
    pub fn cell_to_position(&self, cell: CellKey) -> Vector2<f64> {
        let x = (cell.0 >> 32) as u32 as i32;
        let y = cell.0 as u32 as i32;
        Vector2::new(
            f64::from(x) * self.plane_resolution,
            f64::from(y) * self.plane_resolution,
        )
    }

    // -- Height mapping --

    /// Bucket a height value into its key.
    #[must_use]
    pub fn height_to_key(&self, height: f64) -> i32 {
        coord_to_key(height, self.height_resolution) as i32
    }

    /// Recover the center height of a height bucket.
    #[must_use]
    pub fn key_to_height(&self, key: i32) -> f64 {
        f64::from(key) * self.height_resolution
    }

    // -- State-space mapping --

    /// Bucket a horizontal position and yaw into a state cell id.
    ///
    /// Yaw is wrapped to `(-pi, pi]` first, so two orientations that differ
    /// by a full turn share an id.
    #[must_use]
    pub fn state_to_cell(&self, position: &Vector2<f64>, yaw: f64) -> StateKey {
        let x = coord_to_key(position.x, self.state_position_resolution);
        let y = coord_to_key(position.y, self.state_position_resolution);
        let w = coord_to_key(wrap_angle(yaw), self.angular_resolution) as i16;
        StateKey(
            (pack_i32(x as i32) & MASK_24) << 40
                | (pack_i32(y as i32) & MASK_24) << 16
                | u64::from(w as u16),
        )
    }

    /// Recover the center position and yaw of a state cell.
    #[must_use]
    pub fn cell_to_state(&self, cell: StateKey) -> (Vector2<f64>, f64) {
        let x = sign_extend_24(cell.0 >> 40);
        let y = sign_extend_24(cell.0 >> 16);
        let w = cell.0 as u16 as i16;
        (
            Vector2::new(
                x as f64 * self.state_position_resolution,
                y as f64 * self.state_position_resolution,
            ),
            f64::from(w) * self.angular_resolution,
        )
    }
}

const MASK_24: u64 = 0xFF_FFFF;

fn check_resolution(resolution: f64) -> Result<(), TerrainError> {
    if resolution > 0.0 {
        Ok(())
    } else {
        Err(TerrainError::NonPositiveResolution { value: resolution })
    }
}

/// Nearest-center bucket index of a coordinate.
fn coord_to_key(coord: f64, resolution: f64) -> i64 {
    (coord / resolution).round() as i64
}

const fn pack_i32(value: i32) -> u64 {
    value as u32 as u64
}

fn sign_extend_24(raw: u64) -> i64 {
    let value = (raw & MASK_24) as i64;
    if value & 0x80_0000 == 0 {
        value
    } else {
        value - 0x100_0000
    }
}

/// Wrap an angle into `(-pi, pi]`.
fn wrap_angle(angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    let wrapped = angle.rem_euclid(TAU);
    if wrapped > PI {
        wrapped - TAU
    } else {
        wrapped
    }
}
