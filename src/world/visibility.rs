use super::cache::ChunkCache;
use crate::tiles::{Chunk, ChunkCoord, TilePayload};
use bevy::prelude::*;

/// Check whether a world-space point lands inside the clip volume
pub fn is_point_in_view(point: Vec3, view_projection: &Mat4) -> bool {
    let mut clip = *view_projection * point.extend(1.0);
    if clip.w != 0.0 {
        clip /= clip.w;
    }

    let ndc = -1.0..=1.0;
    ndc.contains(&clip.x) && ndc.contains(&clip.y) && ndc.contains(&clip.z)
}

/// A chunk is in view when any of its payloads is
pub fn chunk_in_view<P: TilePayload>(chunk: &Chunk<P>, view_projection: &Mat4) -> bool {
    chunk.payloads().iter().any(|payload| {
        let ground = payload.position();
        is_point_in_view(Vec3::new(ground.x, 0.0, ground.y), view_projection)
    })
}

/// Active chunks with at least one payload in view
pub fn visible_chunks<P: TilePayload>(
    cache: &ChunkCache<P>,
    view_projection: &Mat4,
) -> Vec<ChunkCoord> {
    cache
        .active_chunks()
        .filter(|(_, chunk)| chunk_in_view(chunk, view_projection))
        .map(|(coord, _)| *coord)
        .collect()
}
