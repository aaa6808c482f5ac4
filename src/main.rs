use bevy::prelude::*;

mod entities;
mod tiles;
mod world;

use entities::{spawn_light, Lighting};
use tiles::FLOOR_SIZE;
use world::StreamingPlugin;

// Camera placement: eye above the ground, looking slightly down the -z axis
const CAMERA_EYE: Vec3 = Vec3::new(0.0, 250.0, 800.0);
const CAMERA_TARGET: Vec3 = Vec3::new(0.0, 200.0, 0.0);
const CAMERA_RESET_EYE: Vec3 = Vec3::new(-278.0, 273.0, 800.0);

// Perspective configuration
const CAMERA_FOV_DEGREES: f32 = 45.0;
const CAMERA_NEAR: f32 = 50.0;
const CAMERA_FAR: f32 = 2000.0;

// Movement configuration
const CAMERA_SPEED: f32 = 400.0; // world units per second
const CAMERA_SPRINT: f32 = 10.0; // speed multiplier while Shift is held

/// Ground plane that stays centered under the camera
#[derive(Component)]
struct Floor;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Skyline".into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(StreamingPlugin::default())
        .insert_resource(ClearColor(Color::srgb(0.2, 0.2, 0.25)))
        .add_systems(Startup, setup_scene)
        .add_systems(
            Update,
            (
                move_camera,
                reset_camera,
                follow_camera_with_floor.after(move_camera),
            ),
        )
        .run();
}

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: CAMERA_FOV_DEGREES.to_radians(),
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            ..default()
        }),
        Transform::from_translation(CAMERA_EYE).looking_at(CAMERA_TARGET, Vec3::Y),
    ));

    commands.spawn((
        Floor,
        Mesh3d(meshes.add(Plane3d::default().mesh().size(FLOOR_SIZE, FLOOR_SIZE))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.35, 0.37, 0.33),
            perceptual_roughness: 1.0,
            ..default()
        })),
        Transform::from_xyz(CAMERA_EYE.x, 0.0, CAMERA_EYE.z),
    ));

    spawn_light(&mut commands, &Lighting::default());
}

/// Translates the camera on the ground plane; eye and look-at move together
fn move_camera(
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut camera_query: Query<&mut Transform, With<Camera3d>>,
) {
    let Ok(mut transform) = camera_query.single_mut() else {
        return;
    };

    let mut direction = Vec3::ZERO;
    if keyboard.pressed(KeyCode::KeyW) || keyboard.pressed(KeyCode::ArrowUp) {
        direction.z -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyS) || keyboard.pressed(KeyCode::ArrowDown) {
        direction.z += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyA) || keyboard.pressed(KeyCode::ArrowLeft) {
        direction.x -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) || keyboard.pressed(KeyCode::ArrowRight) {
        direction.x += 1.0;
    }
    if direction == Vec3::ZERO {
        return;
    }

    let mut speed = CAMERA_SPEED;
    if keyboard.pressed(KeyCode::ShiftLeft) || keyboard.pressed(KeyCode::ShiftRight) {
        speed *= CAMERA_SPRINT;
    }
    transform.translation += direction.normalize() * speed * time.delta_secs();
}

/// Jumps the camera back to its reset position (R)
fn reset_camera(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut camera_query: Query<&mut Transform, With<Camera3d>>,
) {
    if !keyboard.just_pressed(KeyCode::KeyR) {
        return;
    }
    if let Ok(mut transform) = camera_query.single_mut() {
        let look = CAMERA_TARGET - CAMERA_EYE;
        *transform = Transform::from_translation(CAMERA_RESET_EYE)
            .looking_at(CAMERA_RESET_EYE + look, Vec3::Y);
        info!("Camera reset to {:?}", CAMERA_RESET_EYE);
    }
}

fn follow_camera_with_floor(
    camera_query: Query<&Transform, (With<Camera3d>, Without<Floor>)>,
    mut floor_query: Query<&mut Transform, With<Floor>>,
) {
    let (Ok(camera_transform), Ok(mut floor_transform)) =
        (camera_query.single(), floor_query.single_mut())
    else {
        return;
    };

    floor_transform.translation.x = camera_transform.translation.x;
    floor_transform.translation.z = camera_transform.translation.z;
}
