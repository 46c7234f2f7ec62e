use bevy::math::{Mat4, Vec3};
use bevy::prelude::Resource;

use crate::constants::{CAMERA_EYE, CAMERA_FAR, CAMERA_FOV_Y, CAMERA_NEAR};

/// Transform matrices supplied by whoever owns the camera.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct CameraMatrices {
    pub world: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
}

impl Default for CameraMatrices {
    fn default() -> Self {
        Self::identity()
    }
}

impl CameraMatrices {
    pub fn new(world: Mat4, view: Mat4, projection: Mat4) -> Self {
        Self {
            world,
            view,
            projection,
        }
    }

    pub fn identity() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY, Mat4::IDENTITY)
    }

    /// Left-handed perspective camera looking at the water from above and behind.
    pub fn scene_default(aspect_ratio: f32) -> Self {
        let view = Mat4::look_at_lh(Vec3::from_array(CAMERA_EYE), Vec3::ZERO, Vec3::Y);
        let projection = Mat4::perspective_lh(CAMERA_FOV_Y, aspect_ratio, CAMERA_NEAR, CAMERA_FAR);
        Self::new(Mat4::IDENTITY, view, projection)
    }

    pub fn world_view_projection(&self) -> Mat4 {
        self.projection * self.view * self.world
    }
}
