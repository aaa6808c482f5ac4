use super::config::{ConfigError, StreamingConfig};
use crate::tiles::{Chunk, ChunkCoord, ChunkId, ChunkLayout, TilePayload};
use bevy::prelude::*;
use std::collections::HashMap;
use std::ops::RangeInclusive;

/// What a call to `ChunkCache::update` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamUpdate {
    /// Observer stayed in the same chunk
    Unchanged,
    /// Whole square rebuilt (first update, teleport, or recovery after an error)
    FullReset { bound: usize },
    /// Only the edges that left and entered the square were touched
    Incremental { evicted: usize, filled: usize },
}

/// Keeps a square of bound chunks around an observer, recycling chunks that
/// fall out of range instead of destroying them.
///
/// Every chunk the cache has built is either keyed in the active set or
/// sitting in the recycle pool, never both.
pub struct ChunkCache<P: TilePayload> {
    config: StreamingConfig,
    layout: ChunkLayout,
    params: P::Params,

    /// Bound chunks inside the observer's square
    active: HashMap<ChunkCoord, Chunk<P>>,

    /// Bound chunks waiting to be reused, last in first out
    pool: Vec<Chunk<P>>,

    /// Observer's chunk as of the last update (None until the first one)
    observer_chunk: Option<ChunkCoord>,

    next_chunk_id: u64,
    revision: u64,
    full_resets: u64,
    incremental_updates: u64,
}

impl<P: TilePayload> ChunkCache<P> {
    pub fn new(config: StreamingConfig, params: P::Params) -> Result<Self, ConfigError> {
        let layout = config.validate()?;
        let capacity = config.active_chunk_count();
        Ok(Self {
            config,
            layout,
            params,
            active: HashMap::with_capacity(capacity),
            pool: Vec::with_capacity(capacity),
            observer_chunk: None,
            next_chunk_id: 0,
            revision: 0,
            full_resets: 0,
            incremental_updates: 0,
        })
    }

    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }

    pub fn layout(&self) -> &ChunkLayout {
        &self.layout
    }

    /// Observer's chunk as of the last successful update
    pub fn observer_chunk(&self) -> Option<ChunkCoord> {
        self.observer_chunk
    }

    /// Bumped whenever the active set or the pool changes
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Read-only view of the active set, for the renderer
    pub fn active_chunks(&self) -> impl Iterator<Item = (&ChunkCoord, &Chunk<P>)> {
        self.active.iter()
    }

    pub fn pooled_chunks(&self) -> impl Iterator<Item = &Chunk<P>> {
        self.pool.iter()
    }

    pub fn get(&self, coord: &ChunkCoord) -> Option<&Chunk<P>> {
        self.active.get(coord)
    }

    pub fn is_active(&self, coord: &ChunkCoord) -> bool {
        self.active.contains_key(coord)
    }

    /// Move the observer to `observer` and bring the active set in line with it.
    ///
    /// Staying inside the same chunk is a no-op, and so is a non-finite
    /// observer. Positions beyond the `i32` chunk range are held at its edge.
    /// If a payload fails to build, the error is returned and the next update
    /// rebuilds the whole square.
    pub fn update(&mut self, observer: Vec2) -> Result<StreamUpdate, P::Error> {
        if !observer.is_finite() {
            warn!("Ignoring non-finite observer position {:?}", observer);
            return Ok(StreamUpdate::Unchanged);
        }

        let radius = self.config.render_distance;
        let current = self.layout.coord_of(observer).clamp_for_radius(radius);
        let last = match self.observer_chunk {
            Some(last) if last == current => return Ok(StreamUpdate::Unchanged),
            other => other,
        };

        self.revision += 1;
        let result = match last {
            Some(last) if last.chebyshev_distance(&current) <= i64::from(radius) => {
                self.incremental_update(last, current)
            }
            _ => self.full_reset(current),
        };

        self.trim_pool();
        match result {
            Ok(outcome) => {
                self.observer_chunk = Some(current);
                debug!("Chunk cache moved to {:?}: {:?}", current, outcome);
                Ok(outcome)
            }
            Err(e) => {
                self.observer_chunk = None;
                Err(e)
            }
        }
    }

    /// Destroy every chunk, active or pooled
    pub fn teardown(&mut self) {
        if self.active.is_empty() && self.pool.is_empty() {
            self.observer_chunk = None;
            return;
        }

        let released = self.active.len() + self.pool.len();
        for (_, mut chunk) in self.active.drain() {
            chunk.release();
        }
        for mut chunk in self.pool.drain(..) {
            chunk.release();
        }
        self.observer_chunk = None;
        self.revision += 1;
        debug!("Chunk cache released {} chunks", released);
    }

    /// Get statistics about the cache state
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            active_chunks: self.active.len(),
            pooled_chunks: self.pool.len(),
            allocated_chunks: self.next_chunk_id,
            full_resets: self.full_resets,
            incremental_updates: self.incremental_updates,
            observer_chunk: self.observer_chunk,
        }
    }

    fn full_reset(&mut self, center: ChunkCoord) -> Result<StreamUpdate, P::Error> {
        self.full_resets += 1;
        self.pool.extend(self.active.drain().map(|(_, chunk)| chunk));

        let targets = center.chunks_in_radius(self.config.render_distance);
        let bound = targets.len();
        for coord in targets {
            self.activate(coord)?;
        }

        Ok(StreamUpdate::FullReset { bound })
    }

    fn incremental_update(
        &mut self,
        last: ChunkCoord,
        current: ChunkCoord,
    ) -> Result<StreamUpdate, P::Error> {
        self.incremental_updates += 1;
        let plan = EdgePlan::between(last, current, self.config.render_distance);

        let mut evicted = 0;
        for coord in &plan.evict {
            if let Some(chunk) = self.active.remove(coord) {
                self.pool.push(chunk);
                evicted += 1;
            }
        }

        let mut filled = 0;
        for coord in plan.fill {
            if !self.active.contains_key(&coord) {
                self.activate(coord)?;
                filled += 1;
            }
        }

        Ok(StreamUpdate::Incremental { evicted, filled })
    }

    /// Bind a pooled (or new) chunk to `coord` and key it into the active set.
    /// A chunk whose payloads fail to build is dropped, never inserted.
    fn activate(&mut self, coord: ChunkCoord) -> Result<(), P::Error> {
        let mut chunk = match self.pool.pop() {
            Some(chunk) => chunk,
            None => self.allocate(),
        };
        chunk.bind(coord, &self.layout, &self.params)?;
        self.active.insert(coord, chunk);
        Ok(())
    }

    fn allocate(&mut self) -> Chunk<P> {
        let id = ChunkId(self.next_chunk_id);
        self.next_chunk_id += 1;
        Chunk::new(id)
    }

    /// Release the oldest pooled chunks beyond `max_pooled_chunks`
    fn trim_pool(&mut self) {
        let Some(max) = self.config.max_pooled_chunks else {
            return;
        };
        if self.pool.len() <= max {
            return;
        }

        let excess = self.pool.len() - max;
        for mut chunk in self.pool.drain(..excess) {
            chunk.release();
        }
        debug!("Released {} pooled chunks over the limit of {}", excess, max);
    }
}

#[cfg(test)]
impl<P: TilePayload> ChunkCache<P> {
    /// Move an active chunk straight into the pool, leaving a hole in the square
    pub(crate) fn park(&mut self, coord: &ChunkCoord) {
        if let Some(chunk) = self.active.remove(coord) {
            self.pool.push(chunk);
            self.revision += 1;
        }
    }
}

impl<P: TilePayload> Drop for ChunkCache<P> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Coordinates leaving and entering the square when the observer moves from
/// `last` to `current`, computed before anything is mutated.
#[derive(Debug, Default)]
struct EdgePlan {
    evict: Vec<ChunkCoord>,
    fill: Vec<ChunkCoord>,
}

impl EdgePlan {
    fn between(last: ChunkCoord, current: ChunkCoord, radius: i32) -> Self {
        let mut plan = Self::default();
        let span = |center: i32| (center - radius)..=(center + radius);

        let dx = current.x - last.x;
        if dx != 0 {
            let (leaving, entering) = edge_ranges(last.x, current.x, radius);
            // Evict across the old square so a diagonal move also drops its corner
            for x in leaving {
                plan.evict.extend(span(last.z).map(|z| ChunkCoord::new(x, z)));
            }
            for x in entering {
                plan.fill.extend(span(current.z).map(|z| ChunkCoord::new(x, z)));
            }
        }

        let dz = current.z - last.z;
        if dz != 0 {
            let (leaving, entering) = edge_ranges(last.z, current.z, radius);
            for z in leaving {
                plan.evict.extend(span(last.x).map(|x| ChunkCoord::new(x, z)));
            }
            for z in entering {
                plan.fill.extend(span(current.x).map(|x| ChunkCoord::new(x, z)));
            }
        }

        plan
    }
}

/// Indices on one axis that leave and enter the range `[c - r, c + r]` when
/// its center moves from `last` to `current`. Assumes `|current - last| <= r`
/// and both centers clamped with `ChunkCoord::clamp_for_radius(r)`.
fn edge_ranges(
    last: i32,
    current: i32,
    radius: i32,
) -> (RangeInclusive<i32>, RangeInclusive<i32>) {
    if current > last {
        (
            (last - radius)..=(current - radius - 1),
            (last + radius + 1)..=(current + radius),
        )
    } else {
        (
            (current + radius + 1)..=(last + radius),
            (current - radius)..=(last - radius - 1),
        )
    }
}

/// Statistics about the current cache state
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub active_chunks: usize,
    pub pooled_chunks: usize,
    pub allocated_chunks: u64,
    pub full_resets: u64,
    pub incremental_updates: u64,
    pub observer_chunk: Option<ChunkCoord>,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Active: {}, Pooled: {}, Allocated: {}, Resets: {}, Incremental: {}, Observer: {:?}",
            self.active_chunks,
            self.pooled_chunks,
            self.allocated_chunks,
            self.full_resets,
            self.incremental_updates,
            self.observer_chunk
        )
    }
}
