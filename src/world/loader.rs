use super::cache::StreamUpdate;
use super::BuildingCache;
use crate::entities::{spawn_building, Building, BuildingAssets, BuildingInstance};
use crate::tiles::{Chunk, ChunkId};
use bevy::prelude::*;
use std::collections::{HashMap, HashSet};

/// Building entities spawned for each chunk, indexed like the chunk's payloads.
/// Entities follow their chunk through the recycle pool instead of being despawned.
#[derive(Resource, Default)]
pub struct BuildingEntities {
    pub chunks: HashMap<ChunkId, Vec<Entity>>,
    /// Cache revision the entities were last synced to
    pub revision: Option<u64>,
}

/// System to feed the camera's ground position to the chunk cache
pub fn stream_chunks_around_camera(
    camera_query: Query<&Transform, With<Camera3d>>,
    mut cache: ResMut<BuildingCache>,
) {
    let Ok(camera_transform) = camera_query.single() else {
        return;
    };
    let observer = Vec2::new(camera_transform.translation.x, camera_transform.translation.z);

    match cache.update(observer) {
        Ok(StreamUpdate::Unchanged) => {}
        Ok(outcome) => {
            info!("Camera moved to chunk {:?}: {:?}", cache.observer_chunk(), outcome);
            debug!("Chunk cache: {}", cache.stats());
        }
        Err(e) => {
            error!("Failed to stream chunks around {:?}: {}", observer, e);
        }
    }
}

/// System to mirror the active set into building entities.
/// Each entity finds its payload through its `BuildingInstance` key. Entities of
/// active chunks are shown at their payload transforms, entities of pooled
/// chunks are hidden, and chunks the cache no longer owns are despawned.
pub fn sync_building_entities(
    mut commands: Commands,
    cache: Res<BuildingCache>,
    assets: Res<BuildingAssets>,
    mut spawned: ResMut<BuildingEntities>,
    mut buildings: Query<(&BuildingInstance, &mut Transform, &mut Visibility)>,
) {
    let revision = cache.revision();
    if spawned.revision == Some(revision) {
        return;
    }
    let spawned = &mut *spawned;
    spawned.revision = Some(revision);

    let active: HashMap<ChunkId, &Chunk<Building>> = cache
        .active_chunks()
        .map(|(_, chunk)| (chunk.id(), chunk))
        .collect();
    let pooled: HashSet<ChunkId> = cache.pooled_chunks().map(|chunk| chunk.id()).collect();

    for (instance, mut transform, mut visibility) in &mut buildings {
        let building = active
            .get(&instance.chunk)
            .and_then(|chunk| chunk.payloads().get(instance.index));
        if let Some(building) = building {
            *transform = building.transform();
            *visibility = Visibility::Inherited;
        } else if pooled.contains(&instance.chunk) {
            *visibility = Visibility::Hidden;
        }
    }

    for (id, chunk) in &active {
        if spawned.chunks.contains_key(id) {
            continue;
        }
        let entities = chunk
            .payloads()
            .iter()
            .enumerate()
            .map(|(index, building)| {
                let instance = BuildingInstance { chunk: *id, index };
                spawn_building(&mut commands, &assets, building, instance)
            })
            .collect();
        spawned.chunks.insert(*id, entities);
    }

    spawned.chunks.retain(|id, entities| {
        if active.contains_key(id) || pooled.contains(id) {
            return true;
        }
        for entity in entities.drain(..) {
            commands.entity(entity).despawn();
        }
        false
    });
}

/// System to release every chunk when the app is shutting down
pub fn teardown_on_exit(mut exit_events: MessageReader<AppExit>, mut cache: ResMut<BuildingCache>) {
    if exit_events.read().next().is_none() {
        return;
    }

    let stats = cache.stats();
    cache.teardown();
    info!("Released chunk cache on exit ({})", stats);
}

/// System to print the chunk grid whenever the active set changes
#[cfg(feature = "debug_chunks")]
pub fn log_chunk_grid(
    cache: Res<BuildingCache>,
    camera_query: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    mut last_revision: Local<Option<u64>>,
) {
    use super::visibility::visible_chunks;

    if *last_revision == Some(cache.revision()) {
        return;
    }
    *last_revision = Some(cache.revision());

    let Some(camera_chunk) = cache.observer_chunk() else {
        return;
    };
    let visible: HashSet<_> = match camera_query.single() {
        Ok((camera, camera_transform)) => {
            let view_projection =
                camera.clip_from_view() * Mat4::from(camera_transform.affine().inverse());
            visible_chunks(&cache.0, &view_projection).into_iter().collect()
        }
        Err(_) => HashSet::new(),
    };

    info!("{}", format_chunk_grid(&cache, camera_chunk, &visible));
}

/// Render a visual representation of active chunks around the camera
#[cfg(feature = "debug_chunks")]
fn format_chunk_grid(
    cache: &BuildingCache,
    camera_chunk: crate::tiles::ChunkCoord,
    visible: &HashSet<crate::tiles::ChunkCoord>,
) -> String {
    use crate::tiles::ChunkCoord;

    let radius = cache.config().render_distance;
    // Show one ring of inactive chunks around the active square
    let view_radius = radius + 1;

    let mut grid = String::new();
    grid.push_str("\n╔═══════ Chunk Grid ═══════╗\n");
    for z in (camera_chunk.z - view_radius)..=(camera_chunk.z + view_radius) {
        for x in (camera_chunk.x - view_radius)..=(camera_chunk.x + view_radius) {
            let coord = ChunkCoord::new(x, z);
            let symbol = if coord == camera_chunk {
                " @ " // Camera position
            } else if visible.contains(&coord) {
                " ■ " // Active and in view
            } else if cache.is_active(&coord) {
                " █ " // Active
            } else {
                " · " // Not active
            };
            grid.push_str(symbol);
        }
        grid.push('\n');
    }
    grid.push_str("╚══════════════════════════╝\n");
    grid.push_str("Legend: @ = Camera  ■ = Visible+Active  █ = Active  · = Inactive\n");
    grid.push_str(&format!("{}\n", cache.stats()));
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::BuildingParams;
    use crate::tiles::ChunkCoord;
    use crate::world::{ChunkCache, StreamingConfig};

    type Rendered = (Entity, BuildingInstance, Transform, Visibility);

    /// App running only the entity sync, over a 3x3 square of 2x2 chunks 20 units wide
    fn sync_app() -> App {
        let config = StreamingConfig {
            render_distance: 1,
            tiles_per_side: 2,
            gap: 10.0,
            max_pooled_chunks: None,
        };
        let cache = ChunkCache::new(config, BuildingParams::default()).unwrap();

        let mut meshes = Assets::<Mesh>::default();
        let mut materials = Assets::<StandardMaterial>::default();
        let assets = BuildingAssets {
            mesh: meshes.add(Cuboid::from_length(2.0)),
            material: materials.add(StandardMaterial::default()),
        };

        let mut app = App::new();
        app.insert_resource(BuildingCache(cache))
            .insert_resource(assets)
            .init_resource::<BuildingEntities>()
            .add_systems(Update, sync_building_entities);
        app
    }

    fn move_observer(app: &mut App, observer: Vec2) {
        app.world_mut()
            .resource_mut::<BuildingCache>()
            .update(observer)
            .unwrap();
        app.update();
    }

    fn rendered(app: &mut App) -> Vec<Rendered> {
        let world = app.world_mut();
        let mut query = world.query::<(Entity, &BuildingInstance, &Transform, &Visibility)>();
        query
            .iter(world)
            .map(|(entity, instance, transform, visibility)| {
                (entity, *instance, *transform, *visibility)
            })
            .collect()
    }

    /// Shown entities are exactly the active payloads, at their transforms
    fn assert_mirrors_active_set(app: &mut App) {
        let entities = rendered(app);
        let cache = app.world().resource::<BuildingCache>();

        let payload_count: usize = cache
            .active_chunks()
            .map(|(_, chunk)| chunk.payloads().len())
            .sum();
        let shown: Vec<&Rendered> = entities
            .iter()
            .filter(|(_, _, _, visibility)| *visibility == Visibility::Inherited)
            .collect();
        assert_eq!(shown.len(), payload_count);

        for (_, instance, transform, _) in shown {
            let (_, chunk) = cache
                .active_chunks()
                .find(|(_, chunk)| chunk.id() == instance.chunk)
                .expect("shown entity belongs to an active chunk");
            assert_eq!(*transform, chunk.payloads()[instance.index].transform());
        }
    }

    #[test]
    fn test_spawns_one_entity_per_payload() {
        let mut app = sync_app();

        move_observer(&mut app, Vec2::new(5.0, 5.0));

        assert_eq!(rendered(&mut app).len(), 9 * 4);
        assert_mirrors_active_set(&mut app);
        assert_eq!(app.world().resource::<BuildingEntities>().chunks.len(), 9);
    }

    #[test]
    fn test_recycled_chunks_keep_their_entities() {
        let mut app = sync_app();
        move_observer(&mut app, Vec2::new(5.0, 5.0));
        let before: HashSet<Entity> = rendered(&mut app).iter().map(|r| r.0).collect();

        // One chunk east
        move_observer(&mut app, Vec2::new(25.0, 5.0));

        let after: HashSet<Entity> = rendered(&mut app).iter().map(|r| r.0).collect();
        assert_eq!(after, before);
        assert_mirrors_active_set(&mut app);
    }

    #[test]
    fn test_pooled_chunk_is_hidden() {
        let mut app = sync_app();
        move_observer(&mut app, Vec2::new(5.0, 5.0));

        let parked = {
            let mut cache = app.world_mut().resource_mut::<BuildingCache>();
            let coord = ChunkCoord::new(0, 0);
            let id = cache.get(&coord).unwrap().id();
            cache.park(&coord);
            id
        };
        app.update();

        let entities = rendered(&mut app);
        assert_eq!(entities.len(), 9 * 4);
        let hidden: Vec<&Rendered> = entities
            .iter()
            .filter(|(_, _, _, visibility)| *visibility == Visibility::Hidden)
            .collect();
        assert_eq!(hidden.len(), 4);
        assert!(hidden.iter().all(|(_, instance, _, _)| instance.chunk == parked));
        assert_mirrors_active_set(&mut app);
    }

    #[test]
    fn test_unchanged_revision_skips_sync() {
        let mut app = sync_app();
        move_observer(&mut app, Vec2::new(5.0, 5.0));

        let (entity, ..) = rendered(&mut app)[0];
        *app.world_mut().get_mut::<Visibility>(entity).unwrap() = Visibility::Hidden;

        // Same chunk: the cache revision stays put, so nothing is rewritten
        move_observer(&mut app, Vec2::new(6.0, 5.0));
        app.update();

        assert_eq!(
            app.world().get::<Visibility>(entity),
            Some(&Visibility::Hidden)
        );
    }

    #[test]
    fn test_teardown_despawns_everything() {
        let mut app = sync_app();
        move_observer(&mut app, Vec2::new(5.0, 5.0));

        app.world_mut().resource_mut::<BuildingCache>().teardown();
        app.update();

        assert!(rendered(&mut app).is_empty());
        assert!(app.world().resource::<BuildingEntities>().chunks.is_empty());
    }
}
