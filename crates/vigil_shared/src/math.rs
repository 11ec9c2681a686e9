//! Mathematical types shared between the detection core and the host.
//!
//! World coordinates are `f64`: the fly heuristic compares sub-block
//! vertical deltas (0.38, 0.45, ...) against positions reported by the host.

use serde::{Deserialize, Serialize};

/// 3D vector - position, offset, direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
    /// Z component
    pub z: f64,
}

impl Vec3 {
    /// Creates a new Vec3
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Length squared (avoids sqrt)
    #[must_use]
    pub fn length_squared(self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Length
    #[must_use]
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Distance to another point
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }

    /// Block column this position falls in (floor of the horizontal axes).
    #[must_use]
    pub fn floor_x(self) -> i32 {
        self.x.floor() as i32
    }

    /// Block row of the Z axis.
    #[must_use]
    pub fn floor_z(self) -> i32 {
        self.z.floor() as i32
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// Integer block coordinate in the host world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockPos {
    /// X block coordinate
    pub x: i32,
    /// Y block coordinate
    pub y: i32,
    /// Z block coordinate
    pub z: i32,
}

impl BlockPos {
    /// Creates a new block position
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Chunk coordinates (16-block columns) containing this block.
    #[must_use]
    pub const fn chunk(self) -> (i32, i32) {
        (self.x >> 4, self.z >> 4)
    }
}

/// Rounds a vertical offset up to the enclosing block row.
///
/// The fly heuristic samples blocks at fractional offsets from the player's
/// feet (`y - 0.5`, `y + 1`, ...); the host world is queried at the ceiling
/// of those offsets.
#[must_use]
pub fn ceil_to_block(y: f64) -> i32 {
    y.ceil() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(3.0, 4.0, 0.0);
        assert!((a.distance(b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_floor_coordinates() {
        let p = Vec3::new(12.7, 64.2, -3.4);
        assert_eq!(p.floor_x(), 12);
        assert_eq!(p.floor_z(), -4);
    }

    #[test]
    fn test_ceil_to_block() {
        assert_eq!(ceil_to_block(64.5), 65);
        assert_eq!(ceil_to_block(64.0), 64);
        assert_eq!(ceil_to_block(-0.5), 0);
    }

    #[test]
    fn test_chunk_of_block() {
        assert_eq!(BlockPos::new(0, 64, 0).chunk(), (0, 0));
        assert_eq!(BlockPos::new(16, 64, 31).chunk(), (1, 1));
        assert_eq!(BlockPos::new(-1, 64, -16).chunk(), (-1, -1));
    }
}
