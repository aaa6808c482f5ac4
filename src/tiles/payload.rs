use bevy::prelude::*;

/// A heavyweight per-tile object owned by a chunk.
///
/// The cache never looks inside a payload. It creates one per sub-grid cell the
/// first time a chunk is bound, moves it around as the chunk is recycled to new
/// coordinates, and destroys it only when the chunk is released.
pub trait TilePayload: Sized {
    /// Constant construction parameters (lighting, scale, ...), forwarded verbatim
    type Params;

    /// Construction failure, propagated to the caller of `ChunkCache::update`
    type Error: std::error::Error;

    /// Build a payload at `position` on the ground plane
    fn create(position: Vec2, params: &Self::Params) -> Result<Self, Self::Error>;

    /// Move the payload to an absolute ground-plane position. Must not allocate.
    fn reposition(&mut self, position: Vec2);

    /// Current ground-plane position
    fn position(&self) -> Vec2;

    /// Free whatever the payload holds
    fn destroy(self) {}
}
