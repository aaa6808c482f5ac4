use crate::tiles::{
    ChunkLayout, DEFAULT_BUILDING_GAP, DEFAULT_RENDER_DISTANCE, DEFAULT_TILES_PER_SIDE,
    MAX_RENDER_DISTANCE,
};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Construction parameters for the chunk cache
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamingConfig {
    /// Chunks kept active in each direction around the observer
    pub render_distance: i32,
    /// Payloads along each side of a chunk
    pub tiles_per_side: i32,
    /// Distance between neighbouring payloads in world units
    pub gap: f32,
    /// Upper bound on recycled chunks kept around (None = unbounded)
    pub max_pooled_chunks: Option<usize>,
}

impl StreamingConfig {
    /// Check the configuration and derive the chunk geometry from it
    pub fn validate(&self) -> Result<ChunkLayout, ConfigError> {
        if self.render_distance < 0 {
            return Err(ConfigError::NegativeRenderDistance(self.render_distance));
        }
        if self.render_distance > MAX_RENDER_DISTANCE {
            return Err(ConfigError::RenderDistanceTooLarge(self.render_distance));
        }
        if self.tiles_per_side < 1 {
            return Err(ConfigError::InvalidTilesPerSide(self.tiles_per_side));
        }
        if !self.gap.is_finite() || self.gap <= 0.0 {
            return Err(ConfigError::InvalidGap(self.gap));
        }
        Ok(ChunkLayout::new(self.tiles_per_side as usize, self.gap))
    }

    /// Number of chunks in the active square
    pub fn active_chunk_count(&self) -> usize {
        let side = (self.render_distance.max(0) * 2 + 1) as usize;
        side * side
    }
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            render_distance: DEFAULT_RENDER_DISTANCE,
            tiles_per_side: DEFAULT_TILES_PER_SIDE,
            gap: DEFAULT_BUILDING_GAP,
            max_pooled_chunks: None,
        }
    }
}

/// Error type for invalid streaming configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    NegativeRenderDistance(i32),
    RenderDistanceTooLarge(i32),
    InvalidTilesPerSide(i32),
    InvalidGap(f32),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NegativeRenderDistance(r) => {
                write!(f, "Render distance must not be negative: {}", r)
            }
            ConfigError::RenderDistanceTooLarge(r) => {
                write!(f, "Render distance must be at most {}: {}", MAX_RENDER_DISTANCE, r)
            }
            ConfigError::InvalidTilesPerSide(n) => {
                write!(f, "Tiles per side must be at least 1: {}", n)
            }
            ConfigError::InvalidGap(g) => write!(f, "Gap must be positive: {}", g),
        }
    }
}

impl std::error::Error for ConfigError {}
