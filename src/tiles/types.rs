use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Chunk position in chunk coordinates (not world coordinates)
/// `x` and `z` are the two axes of the ground plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Convert from a ground-plane world position to the chunk containing it.
    /// Floors toward negative infinity, so -1.0 lands in chunk -1, not 0.
    /// Positions past the `i32` range saturate at its limits.
    pub fn from_world(world_pos: Vec2, chunk_width: f32) -> Self {
        Self {
            x: (world_pos.x / chunk_width).floor() as i32,
            z: (world_pos.y / chunk_width).floor() as i32,
        }
    }

    /// World position of the chunk's origin
    pub fn to_world(&self, chunk_width: f32) -> Vec2 {
        Vec2::new(self.x as f32 * chunk_width, self.z as f32 * chunk_width)
    }

    pub const fn offset(&self, dx: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.z + dz)
    }

    /// Get all chunks in a square radius around this chunk
    pub fn chunks_in_radius(&self, radius: i32) -> Vec<ChunkCoord> {
        let side = (radius * 2 + 1) as usize;
        let mut chunks = Vec::with_capacity(side * side);
        for dz in -radius..=radius {
            for dx in -radius..=radius {
                chunks.push(self.offset(dx, dz));
            }
        }
        chunks
    }

    /// Chebyshev distance (square/max distance) between two chunk coordinates.
    /// A chunk is inside the square of radius R around `self` iff this is <= R.
    pub fn chebyshev_distance(&self, other: &ChunkCoord) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dz = i64::from(self.z) - i64::from(other.z);
        dx.abs().max(dz.abs())
    }

    /// Pull the coordinate in from the `i32` limits far enough that the square
    /// of `radius` around it, plus one chunk on each side, is representable.
    /// `radius` must be non-negative and well below `i32::MAX / 2`.
    pub fn clamp_for_radius(&self, radius: i32) -> Self {
        let min = i32::MIN + radius + 1;
        let max = i32::MAX - radius - 1;
        Self::new(self.x.clamp(min, max), self.z.clamp(min, max))
    }
}

/// Geometry of a chunk: how many tiles it holds and how far apart they are.
/// Built from a validated `StreamingConfig`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkLayout {
    tiles_per_side: usize,
    gap: f32,
}

impl ChunkLayout {
    pub(crate) fn new(tiles_per_side: usize, gap: f32) -> Self {
        Self { tiles_per_side, gap }
    }

    pub fn tiles_per_side(&self) -> usize {
        self.tiles_per_side
    }

    pub fn tiles_per_chunk(&self) -> usize {
        self.tiles_per_side * self.tiles_per_side
    }

    pub fn gap(&self) -> f32 {
        self.gap
    }

    /// Width of a chunk in world units
    pub fn chunk_width(&self) -> f32 {
        self.tiles_per_side as f32 * self.gap
    }

    /// Sub-grid cell of a payload index, row-major: `(i, j)` with `i` along x
    pub fn cell(&self, index: usize) -> (usize, usize) {
        (index / self.tiles_per_side, index % self.tiles_per_side)
    }

    /// Offset of a payload from its chunk's world origin
    pub fn local_offset(&self, index: usize) -> Vec2 {
        let (i, j) = self.cell(index);
        let half = (self.tiles_per_side / 2) as f32;
        Vec2::new((i as f32 - half) * self.gap, (j as f32 - half) * self.gap)
    }

    pub fn coord_of(&self, world_pos: Vec2) -> ChunkCoord {
        ChunkCoord::from_world(world_pos, self.chunk_width())
    }

    pub fn origin_of(&self, coord: ChunkCoord) -> Vec2 {
        coord.to_world(self.chunk_width())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_world() {
        let chunk_width = 1600.0; // 8 tiles * 200 units

        // Origin chunk
        let coord = ChunkCoord::from_world(Vec2::new(0.0, 0.0), chunk_width);
        assert_eq!(coord, ChunkCoord::new(0, 0));

        // Positive chunks
        let coord = ChunkCoord::from_world(Vec2::new(1600.0, 3300.0), chunk_width);
        assert_eq!(coord, ChunkCoord::new(1, 2));

        // Negative chunks
        let coord = ChunkCoord::from_world(Vec2::new(-1600.0, -1601.0), chunk_width);
        assert_eq!(coord, ChunkCoord::new(-1, -2));
    }

    #[test]
    fn test_from_world_floors_instead_of_truncating() {
        let chunk_width = 200.0;
        let x_of = |x: f32| ChunkCoord::from_world(Vec2::new(x, 0.0), chunk_width).x;

        assert_eq!(x_of(-1.0), -1); // truncation would give 0
        assert_eq!(x_of(0.0), 0);
        assert_eq!(x_of(199.0), 0);
        assert_eq!(x_of(200.0), 1);
        assert_eq!(x_of(-200.0), -1);
        assert_eq!(x_of(-201.0), -2);

        // Same rule on the z axis
        let coord = ChunkCoord::from_world(Vec2::new(1.0, -0.5), chunk_width);
        assert_eq!(coord, ChunkCoord::new(0, -1));
    }

    #[test]
    fn test_to_world() {
        assert_eq!(ChunkCoord::new(2, -3).to_world(100.0), Vec2::new(200.0, -300.0));
    }

    #[test]
    fn test_chunks_in_radius() {
        let center = ChunkCoord::new(0, 0);
        let chunks = center.chunks_in_radius(1);
        assert_eq!(chunks.len(), 9); // 3x3 grid
        assert!(chunks.iter().all(|c| center.chebyshev_distance(c) <= 1));

        let chunks = center.chunks_in_radius(3);
        assert_eq!(chunks.len(), 49); // 7x7 grid

        let chunks = ChunkCoord::new(5, 5).chunks_in_radius(0);
        assert_eq!(chunks, vec![ChunkCoord::new(5, 5)]);
    }

    #[test]
    fn test_chebyshev_distance() {
        let a = ChunkCoord::new(0, 0);
        let b = ChunkCoord::new(3, -4);
        assert_eq!(a.chebyshev_distance(&b), 4);
        assert_eq!(a.chebyshev_distance(&ChunkCoord::new(3, 3)), 3);
    }

    #[test]
    fn test_chebyshev_distance_across_full_range() {
        let low = ChunkCoord::new(i32::MIN, 0);
        let high = ChunkCoord::new(i32::MAX, 0);
        assert_eq!(low.chebyshev_distance(&high), u32::MAX as i64);
        assert_eq!(high.chebyshev_distance(&low), u32::MAX as i64);
    }

    #[test]
    fn test_from_world_saturates() {
        let coord = ChunkCoord::from_world(Vec2::new(1e13, -1e13), 1600.0);
        assert_eq!(coord, ChunkCoord::new(i32::MAX, i32::MIN));
    }

    #[test]
    fn test_clamp_for_radius() {
        let clamped = ChunkCoord::new(i32::MAX, i32::MIN).clamp_for_radius(2);
        assert_eq!(clamped, ChunkCoord::new(i32::MAX - 3, i32::MIN + 3));

        // Square and the slab just outside it stay in range
        let square = clamped.chunks_in_radius(2);
        assert_eq!(square.len(), 25);
        assert_eq!(clamped.offset(3, -3), ChunkCoord::new(i32::MAX, i32::MIN));

        // Ordinary coordinates pass through
        let coord = ChunkCoord::new(-40, 17);
        assert_eq!(coord.clamp_for_radius(2), coord);
    }

    #[test]
    fn test_layout_offsets() {
        let layout = ChunkLayout::new(8, 200.0);
        assert_eq!(layout.chunk_width(), 1600.0);
        assert_eq!(layout.tiles_per_chunk(), 64);

        // First cell sits half a chunk back on both axes
        assert_eq!(layout.local_offset(0), Vec2::new(-800.0, -800.0));
        // Row-major: index 1 steps along z, index 8 steps along x
        assert_eq!(layout.local_offset(1), Vec2::new(-800.0, -600.0));
        assert_eq!(layout.local_offset(8), Vec2::new(-600.0, -800.0));
        assert_eq!(layout.local_offset(63), Vec2::new(600.0, 600.0));
    }

    #[test]
    fn test_layout_odd_side_is_centered() {
        let layout = ChunkLayout::new(3, 10.0);
        // 3 / 2 == 1, so the middle cell lands on the origin
        assert_eq!(layout.local_offset(4), Vec2::ZERO);
        assert_eq!(layout.local_offset(0), Vec2::new(-10.0, -10.0));
    }
}
