pub mod cache;
pub mod config;
pub mod loader;
pub mod visibility;

// Re-export commonly used items
pub use cache::ChunkCache;
pub use config::StreamingConfig;
pub use loader::BuildingEntities;

use crate::entities::{setup_building_assets, Building, BuildingParams};
use bevy::prelude::*;

/// Chunk cache streaming buildings around the camera
#[derive(Resource, Deref, DerefMut)]
pub struct BuildingCache(pub ChunkCache<Building>);

/// Plugin for the building streaming system
pub struct StreamingPlugin {
    pub config: StreamingConfig,
    pub params: BuildingParams,
}

impl Default for StreamingPlugin {
    fn default() -> Self {
        Self {
            config: StreamingConfig::default(),
            params: BuildingParams::default(),
        }
    }
}

impl Plugin for StreamingPlugin {
    fn build(&self, app: &mut App) {
        let cache = match ChunkCache::<Building>::new(self.config.clone(), self.params) {
            Ok(cache) => cache,
            Err(e) => {
                error!("Invalid streaming config {:?}: {}", self.config, e);
                app.add_systems(Startup, |mut exit: MessageWriter<AppExit>| {
                    exit.write(AppExit::error());
                });
                return;
            }
        };

        info!(
            "Streaming {} chunks of {}x{} buildings, {} units apart ({} units wide)",
            self.config.active_chunk_count(),
            cache.layout().tiles_per_side(),
            cache.layout().tiles_per_side(),
            cache.layout().gap(),
            cache.layout().chunk_width()
        );

        app.insert_resource(self.config.clone())
            .insert_resource(BuildingCache(cache))
            .init_resource::<BuildingEntities>()
            .add_systems(Startup, setup_building_assets)
            .add_systems(
                Update,
                (
                    loader::stream_chunks_around_camera,
                    loader::sync_building_entities.after(loader::stream_chunks_around_camera),
                ),
            )
            .add_systems(Last, loader::teardown_on_exit);

        #[cfg(feature = "debug_chunks")]
        app.add_systems(
            Update,
            loader::log_chunk_grid.after(loader::sync_building_entities),
        );
    }
}
