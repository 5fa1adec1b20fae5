use crate::app::scene::{Camera2D, Vec2};

pub const PIXELS_PER_WORLD: f32 = 32.0;
const MIN_CAMERA_ZOOM: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

pub(crate) fn camera_pixels_per_world(camera: &Camera2D) -> f32 {
    let zoom = if camera.zoom.is_finite() {
        camera.zoom.max(MIN_CAMERA_ZOOM)
    } else {
        1.0
    };
    PIXELS_PER_WORLD * zoom
}

/// World space is y-up with the camera at the viewport center; screen space
/// is y-down from the top-left corner.
pub fn world_to_screen(
    world: Vec2,
    camera: &Camera2D,
    viewport: Viewport,
    pixels_per_world: f32,
) -> (i32, i32) {
    let x = (world.x - camera.position.x) * pixels_per_world + viewport.width as f32 * 0.5;
    let y = viewport.height as f32 * 0.5 - (world.y - camera.position.y) * pixels_per_world;
    (x.round() as i32, y.round() as i32)
}

pub fn world_to_screen_px(world: Vec2, camera: &Camera2D, viewport: Viewport) -> (i32, i32) {
    world_to_screen(world, camera, viewport, camera_pixels_per_world(camera))
}
