mod actions;
mod clock;
mod config;
mod input;
mod keymap;
mod loop_runner;
mod metrics;
mod perf_stats;
mod remap;
mod rendering;
mod scene;
mod scheduler;

pub use actions::{
    ActionFrame, ActionLevel, ActionMap, ActionMapError, ActionSlot, ActionValue, Binding, Rebind,
};
pub use clock::{Clock, SystemClock};
pub use config::{
    target_period_for_rate, ConfigAnomaly, LoopConfig, CONFIG_PATH_ENV_VAR, DEFAULT_TARGET_FPS,
    SLOW_FRAME_ENV_VAR,
};
pub use input::{InputEvent, RawInputState, ScanCode, KEY_CODE_SPACE};
pub use keymap::{scancode_from_physical_key, scancode_name};
pub use loop_runner::{run_app, AppError};
pub use metrics::{LoopMetricsSnapshot, PhaseDurations, PhaseTotals};
pub use perf_stats::{PerfStatsSnapshot, RollingMsStats, PERF_WINDOW_LEN};
pub use remap::{RemapController, RemapOutcome, RemapState};
pub use rendering::{
    draw_scene, world_to_screen, world_to_screen_px, Renderer, Viewport, MODEL_HALF_SIZE_PX,
    PIXELS_PER_WORLD,
};
pub use scene::{ActionIndicator, Camera2D, SceneFrame, TickInput, Transform, Vec2};
pub use scheduler::{
    EventSource, FrameScheduler, Overrun, Render, RunSummary, SchedulerContext, SchedulerError,
    Simulation, TickReport,
};
