use crate::tiles::{TilePayload, BUILDING_SCALE, LIGHT_INTENSITY, LIGHT_POSITION, LIGHT_REFLECTANCE};
use bevy::prelude::*;

/// Light shared by every building, passed through to each one unchanged
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub position: Vec3,
    pub intensity: Vec3,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            position: Vec3::from_array(LIGHT_POSITION),
            intensity: Vec3::from_array(LIGHT_INTENSITY) * LIGHT_REFLECTANCE,
        }
    }
}

/// Construction parameters for buildings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildingParams {
    /// Extents applied to a unit cube
    pub scale: Vec3,
    pub lighting: Lighting,
}

impl Default for BuildingParams {
    fn default() -> Self {
        Self {
            scale: Vec3::from_array(BUILDING_SCALE),
            lighting: Lighting::default(),
        }
    }
}

/// A single building standing on the ground plane
#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    pub position: Vec3,
    pub scale: Vec3,
    pub lighting: Lighting,
}

impl Building {
    /// Transform used to draw the building
    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position).with_scale(self.scale)
    }
}

/// Error type for building construction
#[derive(Debug, Clone, PartialEq)]
pub enum BuildingError {
    DegenerateScale(Vec3),
}

impl std::fmt::Display for BuildingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildingError::DegenerateScale(s) => write!(f, "Degenerate building scale: {}", s),
        }
    }
}

impl std::error::Error for BuildingError {}

impl TilePayload for Building {
    type Params = BuildingParams;
    type Error = BuildingError;

    fn create(position: Vec2, params: &BuildingParams) -> Result<Self, BuildingError> {
        let scale = params.scale;
        if !scale.is_finite() || scale.min_element() <= 0.0 {
            return Err(BuildingError::DegenerateScale(scale));
        }

        Ok(Self {
            position: Vec3::new(position.x, 0.0, position.y),
            scale,
            lighting: params.lighting,
        })
    }

    fn reposition(&mut self, position: Vec2) {
        self.position.x = position.x;
        self.position.z = position.y;
    }

    fn position(&self) -> Vec2 {
        Vec2::new(self.position.x, self.position.z)
    }
}
