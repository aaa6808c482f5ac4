use super::building::{Building, Lighting};
use crate::tiles::ChunkId;
use bevy::prelude::*;

/// Meshes and materials shared by every building entity
#[derive(Resource)]
pub struct BuildingAssets {
    pub mesh: Handle<Mesh>,
    pub material: Handle<StandardMaterial>,
}

/// Marks a rendered building and the payload slot it mirrors
#[derive(Component, Debug, Clone, Copy)]
pub struct BuildingInstance {
    pub chunk: ChunkId,
    pub index: usize,
}

/// Create the shared building mesh and material
pub fn setup_building_assets(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    // Unit cube spanning -1..1 on every axis; the building scale sizes it
    let mesh = meshes.add(Cuboid::from_length(2.0));
    let material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.62, 0.6, 0.58),
        perceptual_roughness: 0.9,
        ..default()
    });

    commands.insert_resource(BuildingAssets { mesh, material });
}

/// Spawns the entity drawing one building
pub fn spawn_building(
    commands: &mut Commands,
    assets: &BuildingAssets,
    building: &Building,
    instance: BuildingInstance,
) -> Entity {
    commands
        .spawn((
            instance,
            Mesh3d(assets.mesh.clone()),
            MeshMaterial3d(assets.material.clone()),
            building.transform(),
            Visibility::Inherited,
        ))
        .id()
}

/// Spawns the point light every building is lit by
pub fn spawn_light(commands: &mut Commands, lighting: &Lighting) -> Entity {
    let peak = lighting.intensity.max_element().max(f32::EPSILON);
    let tint = lighting.intensity / peak;

    commands
        .spawn((
            PointLight {
                color: Color::srgb(tint.x, tint.y, tint.z),
                intensity: peak * LUMENS_PER_UNIT_INTENSITY,
                range: 5000.0,
                ..default()
            },
            Transform::from_translation(lighting.position),
        ))
        .id()
}

/// Scales the light's RGB intensity into lumens for the scene's unit size
const LUMENS_PER_UNIT_INTENSITY: f32 = 5.0e8;
