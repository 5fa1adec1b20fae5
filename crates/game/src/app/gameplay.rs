use stg_engine::{
    ActionFrame, ActionIndicator, ActionSlot, Camera2D, ScanCode, SceneFrame, Simulation,
    TickInput, Transform, Vec2,
};
use tracing::debug;

pub(crate) const MOVE_LEFT: ActionSlot = ActionSlot(0);
pub(crate) const MOVE_RIGHT: ActionSlot = ActionSlot(1);
pub(crate) const MOVE_DOWN: ActionSlot = ActionSlot(2);
pub(crate) const MOVE_UP: ActionSlot = ActionSlot(3);

pub(crate) const DEFAULT_BINDINGS: [Option<ScanCode>; 4] = [
    Some(ScanCode::LEFT),
    Some(ScanCode::RIGHT),
    Some(ScanCode::DOWN),
    Some(ScanCode::UP),
];

const MOVE_SLOTS: [ActionSlot; 4] = [MOVE_LEFT, MOVE_RIGHT, MOVE_DOWN, MOVE_UP];
const MOVE_SPEED_UNITS_PER_SECOND: f32 = 5.0;
const CAMERA_FOLLOW_RATE_PER_SECOND: f32 = 4.0;

/// Moves a single model with the four movement actions and keeps the camera
/// trailing behind it.
#[derive(Debug, Default)]
pub(crate) struct MovementSimulation {
    model: Transform,
    camera: Camera2D,
}

impl MovementSimulation {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn model(&self) -> Transform {
        self.model
    }

    #[cfg(test)]
    fn camera(&self) -> Camera2D {
        self.camera
    }
}

impl Simulation for MovementSimulation {
    type Frame = SceneFrame;

    fn step(&mut self, fixed_dt_seconds: f32, input: &TickInput<'_>) -> SceneFrame {
        for slot in MOVE_SLOTS {
            if input.actions.just_activated(slot) {
                debug!(tick = input.tick, slot = slot.0, "action_activated");
            }
        }

        let direction = movement_direction(input.actions);
        if direction != Vec2::ZERO {
            let step = MOVE_SPEED_UNITS_PER_SECOND * fixed_dt_seconds;
            self.model.position.x += direction.x * step;
            self.model.position.y += direction.y * step;
            self.model.rotation_radians = direction.y.atan2(direction.x);
        }

        let follow_alpha = (CAMERA_FOLLOW_RATE_PER_SECOND * fixed_dt_seconds).clamp(0.0, 1.0);
        self.camera.position = self
            .camera
            .position
            .lerp(self.model.position, follow_alpha);

        SceneFrame {
            camera: self.camera,
            model: self.model,
            indicators: input
                .bindings
                .iter()
                .map(|binding| ActionIndicator {
                    active: input.actions.is_active(binding.slot),
                    bound: binding.source.is_some(),
                })
                .collect(),
            remap: input.remap,
        }
    }
}

/// Opposing actions cancel. Diagonals are normalized so they are not faster.
fn movement_direction(actions: &ActionFrame) -> Vec2 {
    let axis = |negative: ActionSlot, positive: ActionSlot| {
        actions.level(positive).as_f32() - actions.level(negative).as_f32()
    };
    let raw = Vec2 {
        x: axis(MOVE_LEFT, MOVE_RIGHT),
        y: axis(MOVE_DOWN, MOVE_UP),
    };
    let length = raw.length();
    if length <= f32::EPSILON {
        return Vec2::ZERO;
    }
    if length > 1.0 {
        return Vec2 {
            x: raw.x / length,
            y: raw.y / length,
        };
    }
    raw
}
