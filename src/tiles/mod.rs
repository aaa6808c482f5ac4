pub mod chunk;
pub mod constants;
pub mod payload;
pub mod types;

// Re-export commonly used items
pub use chunk::{Chunk, ChunkId};
pub use constants::*;
pub use payload::TilePayload;
pub use types::{ChunkCoord, ChunkLayout};
