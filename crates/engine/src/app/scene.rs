use super::actions::{ActionFrame, Binding};
use super::remap::RemapState;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn lerp(self, target: Vec2, alpha: f32) -> Vec2 {
        Vec2 {
            x: self.x + (target.x - self.x) * alpha,
            y: self.y + (target.y - self.y) * alpha,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Transform {
    pub position: Vec2,
    pub rotation_radians: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera2D {
    pub position: Vec2,
    pub zoom: f32,
}

impl Default for Camera2D {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

/// Per-slot indicator state handed to the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionIndicator {
    pub active: bool,
    pub bound: bool,
}

/// Everything the renderer needs for one frame. Produced by the simulation,
/// consumed read-only by the render collaborator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneFrame {
    pub camera: Camera2D,
    pub model: Transform,
    pub indicators: Vec<ActionIndicator>,
    pub remap: RemapState,
}

/// Read-only view of the tick's input, passed to the simulation.
#[derive(Debug, Clone, Copy)]
pub struct TickInput<'a> {
    pub tick: u64,
    pub actions: &'a ActionFrame,
    pub remap: RemapState,
    pub bindings: &'a [Binding],
}
