/// Chunks kept active in each direction around the observer (3x3 = 9 chunks)
pub const DEFAULT_RENDER_DISTANCE: i32 = 1;

/// Largest accepted render distance (a 2049x2049 chunk square)
pub const MAX_RENDER_DISTANCE: i32 = 1024;

/// Buildings along each side of a chunk
pub const DEFAULT_TILES_PER_SIDE: i32 = 8;

/// Distance between neighbouring buildings in world units
pub const DEFAULT_BUILDING_GAP: f32 = 200.0;

/// Building extents (x, y, z) applied to a unit cube
pub const BUILDING_SCALE: [f32; 3] = [20.0, 160.0, 20.0];

/// Light setup shared by every building
pub const LIGHT_REFLECTANCE: f32 = 0.78;
pub const LIGHT_INTENSITY: [f32; 3] = [18.4, 15.6, 8.0];
pub const LIGHT_POSITION: [f32; 3] = [-50.0, 500.0, 0.0];

/// Size of the ground plane that follows the observer
pub const FLOOR_SIZE: f32 = 5000.0;
