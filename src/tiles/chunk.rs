use super::payload::TilePayload;
use super::types::{ChunkCoord, ChunkLayout};
use bevy::prelude::*;

/// Identity of a chunk object. Stays the same while the chunk is recycled
/// to different coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId(pub u64);

/// A fixed batch of tile payloads laid out on a regular sub-grid.
///
/// A chunk is either uninitialized (no payloads) or bound (exactly
/// `tiles_per_chunk` payloads, payload `i` always in cell `i`).
#[derive(Debug)]
pub struct Chunk<P> {
    id: ChunkId,
    coord: ChunkCoord,
    payloads: Vec<P>,
}

impl<P: TilePayload> Chunk<P> {
    /// Create an uninitialized chunk
    pub fn new(id: ChunkId) -> Self {
        Self {
            id,
            coord: ChunkCoord::new(0, 0),
            payloads: Vec::new(),
        }
    }

    pub fn id(&self) -> ChunkId {
        self.id
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    pub fn is_bound(&self) -> bool {
        !self.payloads.is_empty()
    }

    pub fn payloads(&self) -> &[P] {
        &self.payloads
    }

    pub fn world_origin(&self, layout: &ChunkLayout) -> Vec2 {
        layout.origin_of(self.coord)
    }

    /// Bind the chunk to `coord`, building its payloads the first time.
    ///
    /// If a payload fails to build, the ones already built for this chunk are
    /// destroyed and the chunk stays uninitialized.
    pub fn bind(
        &mut self,
        coord: ChunkCoord,
        layout: &ChunkLayout,
        params: &P::Params,
    ) -> Result<(), P::Error> {
        if !self.is_bound() {
            let count = layout.tiles_per_chunk();
            let mut payloads = Vec::with_capacity(count);
            for index in 0..count {
                match P::create(layout.local_offset(index), params) {
                    Ok(payload) => payloads.push(payload),
                    Err(e) => {
                        payloads.into_iter().for_each(P::destroy);
                        return Err(e);
                    }
                }
            }
            self.payloads = payloads;
        }

        self.reposition(coord, layout);
        Ok(())
    }

    /// Re-target the chunk to `coord` and move every payload with it
    pub fn reposition(&mut self, coord: ChunkCoord, layout: &ChunkLayout) {
        self.coord = coord;
        let origin = layout.origin_of(coord);
        for (index, payload) in self.payloads.iter_mut().enumerate() {
            payload.reposition(origin + layout.local_offset(index));
        }
    }

    /// Destroy every payload. Only used at teardown or when the pool is trimmed.
    pub fn release(&mut self) {
        self.payloads.drain(..).for_each(P::destroy);
    }
}
