use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::app::remap::RemapState;
use crate::app::scene::{ActionIndicator, Camera2D, SceneFrame, Vec2};
use crate::app::scheduler::Render;

use super::transform::camera_pixels_per_world;
use super::{world_to_screen_px, Viewport, MODEL_HALF_SIZE_PX};

const CLEAR_COLOR: [u8; 4] = [20, 22, 28, 255];
const CLEAR_COLOR_REMAP: [u8; 4] = [28, 22, 30, 255];
const GRID_CELL_WORLD: f32 = 1.0;
const GRID_MAJOR_EVERY: i32 = 5;
const GRID_MINOR_COLOR: [u8; 4] = [35, 39, 46, 255];
const GRID_MAJOR_COLOR: [u8; 4] = [52, 58, 70, 255];
const MODEL_COLOR: [u8; 4] = [220, 220, 240, 255];
const HEADING_COLOR: [u8; 4] = [255, 120, 120, 255];
const HEADING_MARKER_DISTANCE_WORLD: f32 = 0.75;
const HEADING_MARKER_HALF_SIZE_PX: i32 = 3;
const INDICATOR_ACTIVE_COLOR: [u8; 4] = [120, 230, 120, 255];
const INDICATOR_IDLE_COLOR: [u8; 4] = [70, 80, 96, 255];
const INDICATOR_UNBOUND_COLOR: [u8; 4] = [110, 60, 60, 255];
const INDICATOR_SELECTED_COLOR: [u8; 4] = [80, 220, 255, 255];
const INDICATOR_HALF_SIZE_PX: i32 = 6;
const INDICATOR_SELECTED_PAD_PX: i32 = 3;
const INDICATOR_MARGIN_PX: i32 = 16;
const INDICATOR_SPACING_PX: i32 = 20;
const REMAP_BORDER_PX: i32 = 4;
const REMAP_AWAITING_SLOT_COLOR: [u8; 4] = [255, 210, 70, 255];
const REMAP_AWAITING_KEY_COLOR: [u8; 4] = [80, 220, 255, 255];

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }
}

impl Render<SceneFrame> for Renderer {
    type Error = Error;

    fn render(&mut self, scene: &SceneFrame) -> Result<(), Error> {
        if self.viewport.is_empty() {
            return Ok(());
        }
        draw_scene(
            self.pixels.frame_mut(),
            self.viewport.width,
            self.viewport.height,
            scene,
        );
        self.pixels.render()
    }
}

/// Rasterizes one scene into an RGBA8 buffer of `width * height` pixels.
pub fn draw_scene(frame: &mut [u8], width: u32, height: u32, scene: &SceneFrame) {
    if width == 0 || height == 0 {
        return;
    }

    let clear_color = if scene.remap.is_active() {
        CLEAR_COLOR_REMAP
    } else {
        CLEAR_COLOR
    };
    for chunk in frame.chunks_exact_mut(4) {
        chunk.copy_from_slice(&clear_color);
    }

    draw_world_grid(frame, width, height, &scene.camera);
    draw_model(frame, width, height, scene);
    draw_remap_border(frame, width, height, scene.remap);
    draw_indicators(frame, width, height, &scene.indicators, scene.remap);
}

fn draw_model(frame: &mut [u8], width: u32, height: u32, scene: &SceneFrame) {
    let viewport = Viewport { width, height };
    let zoom_scale = camera_pixels_per_world(&scene.camera) / super::PIXELS_PER_WORLD;
    let half_size = ((MODEL_HALF_SIZE_PX as f32) * zoom_scale).round().max(1.0) as i32;
    let (cx, cy) = world_to_screen_px(scene.model.position, &scene.camera, viewport);
    draw_square(frame, width, height, cx, cy, half_size, MODEL_COLOR);

    let heading = scene.model.rotation_radians;
    let marker = Vec2 {
        x: scene.model.position.x + heading.cos() * HEADING_MARKER_DISTANCE_WORLD,
        y: scene.model.position.y + heading.sin() * HEADING_MARKER_DISTANCE_WORLD,
    };
    let (mx, my) = world_to_screen_px(marker, &scene.camera, viewport);
    draw_square(
        frame,
        width,
        height,
        mx,
        my,
        HEADING_MARKER_HALF_SIZE_PX,
        HEADING_COLOR,
    );
}

fn draw_remap_border(frame: &mut [u8], width: u32, height: u32, remap: RemapState) {
    let color = match remap {
        RemapState::Idle => return,
        RemapState::AwaitingSourceSlot => REMAP_AWAITING_SLOT_COLOR,
        RemapState::AwaitingNewKey(_) => REMAP_AWAITING_KEY_COLOR,
    };
    let (w, h) = (width as i32, height as i32);
    for inset in 0..REMAP_BORDER_PX {
        draw_horizontal_line_clipped(frame, width, height, inset, color);
        draw_horizontal_line_clipped(frame, width, height, h - 1 - inset, color);
        draw_vertical_line_clipped(frame, width, height, inset, color);
        draw_vertical_line_clipped(frame, width, height, w - 1 - inset, color);
    }
}

fn indicator_center_px(index: usize) -> (i32, i32) {
    let index = i32::try_from(index).unwrap_or(i32::MAX / INDICATOR_SPACING_PX);
    (
        INDICATOR_MARGIN_PX + index * INDICATOR_SPACING_PX,
        INDICATOR_MARGIN_PX,
    )
}

fn draw_indicators(
    frame: &mut [u8],
    width: u32,
    height: u32,
    indicators: &[ActionIndicator],
    remap: RemapState,
) {
    let selected = match remap {
        RemapState::AwaitingNewKey(slot) => Some(slot.index()),
        _ => None,
    };
    for (index, indicator) in indicators.iter().enumerate() {
        let (cx, cy) = indicator_center_px(index);
        if !indicator.bound {
            draw_square_outline(
                frame,
                width,
                height,
                cx,
                cy,
                INDICATOR_HALF_SIZE_PX,
                INDICATOR_UNBOUND_COLOR,
            );
        } else {
            let color = if indicator.active {
                INDICATOR_ACTIVE_COLOR
            } else {
                INDICATOR_IDLE_COLOR
            };
            draw_square(frame, width, height, cx, cy, INDICATOR_HALF_SIZE_PX, color);
        }
        if selected == Some(index) {
            draw_square_outline(
                frame,
                width,
                height,
                cx,
                cy,
                INDICATOR_HALF_SIZE_PX + INDICATOR_SELECTED_PAD_PX,
                INDICATOR_SELECTED_COLOR,
            );
        }
    }
}

fn draw_world_grid(frame: &mut [u8], width: u32, height: u32, camera: &Camera2D) {
    let viewport = Viewport { width, height };
    let pixels_per_world = camera_pixels_per_world(camera);
    let (ix_start, ix_end, iy_start, iy_end) =
        visible_grid_index_bounds(camera.position, width, height, pixels_per_world);

    for ix in ix_start..=ix_end {
        let world = Vec2 {
            x: ix as f32 * GRID_CELL_WORLD,
            y: camera.position.y,
        };
        let (screen_x, _) = world_to_screen_px(world, camera, viewport);
        draw_vertical_line_clipped(frame, width, height, screen_x, grid_color(ix));
    }

    for iy in iy_start..=iy_end {
        let world = Vec2 {
            x: camera.position.x,
            y: iy as f32 * GRID_CELL_WORLD,
        };
        let (_, screen_y) = world_to_screen_px(world, camera, viewport);
        draw_horizontal_line_clipped(frame, width, height, screen_y, grid_color(iy));
    }
}

fn visible_grid_index_bounds(
    camera_pos: Vec2,
    width: u32,
    height: u32,
    pixels_per_world: f32,
) -> (i32, i32, i32, i32) {
    let half_w_world = width as f32 / (2.0 * pixels_per_world);
    let half_h_world = height as f32 / (2.0 * pixels_per_world);
    let ix_start = ((camera_pos.x - half_w_world) / GRID_CELL_WORLD).floor() as i32 - 1;
    let ix_end = ((camera_pos.x + half_w_world) / GRID_CELL_WORLD).ceil() as i32 + 1;
    let iy_start = ((camera_pos.y - half_h_world) / GRID_CELL_WORLD).floor() as i32 - 1;
    let iy_end = ((camera_pos.y + half_h_world) / GRID_CELL_WORLD).ceil() as i32 + 1;
    (ix_start, ix_end, iy_start, iy_end)
}

fn grid_color(index: i32) -> [u8; 4] {
    if index.rem_euclid(GRID_MAJOR_EVERY) == 0 {
        GRID_MAJOR_COLOR
    } else {
        GRID_MINOR_COLOR
    }
}

fn draw_vertical_line_clipped(frame: &mut [u8], width: u32, height: u32, x: i32, color: [u8; 4]) {
    if x < 0 || x >= width as i32 {
        return;
    }
    for y in 0..height as i32 {
        write_pixel_rgba_clipped(frame, width as usize, x, y, color);
    }
}

fn draw_horizontal_line_clipped(frame: &mut [u8], width: u32, height: u32, y: i32, color: [u8; 4]) {
    if y < 0 || y >= height as i32 {
        return;
    }
    for x in 0..width as i32 {
        write_pixel_rgba_clipped(frame, width as usize, x, y, color);
    }
}

fn write_pixel_rgba_clipped(frame: &mut [u8], width: usize, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 || x as usize >= width {
        return;
    }
    let Some(pixel_offset) = (y as usize)
        .checked_mul(width)
        .and_then(|row| row.checked_add(x as usize))
    else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    frame[byte_offset..end].copy_from_slice(&color);
}

fn draw_square(
    frame: &mut [u8],
    width: u32,
    height: u32,
    cx: i32,
    cy: i32,
    half_size: i32,
    color: [u8; 4],
) {
    let x_min = (cx - half_size).max(0);
    let x_max = (cx + half_size).min(width as i32 - 1);
    let y_min = (cy - half_size).max(0);
    let y_max = (cy + half_size).min(height as i32 - 1);
    for y in y_min..=y_max {
        for x in x_min..=x_max {
            write_pixel_rgba_clipped(frame, width as usize, x, y, color);
        }
    }
}

fn draw_square_outline(
    frame: &mut [u8],
    width: u32,
    _height: u32,
    cx: i32,
    cy: i32,
    half_size: i32,
    color: [u8; 4],
) {
    let left = cx - half_size;
    let right = cx + half_size;
    let top = cy - half_size;
    let bottom = cy + half_size;

    for x in left..=right {
        write_pixel_rgba_clipped(frame, width as usize, x, top, color);
        write_pixel_rgba_clipped(frame, width as usize, x, bottom, color);
    }
    for y in top..=bottom {
        write_pixel_rgba_clipped(frame, width as usize, left, y, color);
        write_pixel_rgba_clipped(frame, width as usize, right, y, color);
    }
}
