pub mod app;

pub use app::{
    run_app, target_period_for_rate, ActionFrame, ActionIndicator, ActionLevel, ActionMap,
    ActionMapError, ActionSlot, ActionValue, AppError, Binding, Camera2D, Clock, ConfigAnomaly,
    EventSource, FrameScheduler, InputEvent, LoopConfig, Overrun, PhaseDurations, PhaseTotals,
    RawInputState, Rebind, RemapController, RemapOutcome, RemapState, Render, Renderer,
    RunSummary, ScanCode, SceneFrame, SchedulerContext, SchedulerError, Simulation, SystemClock,
    TickInput, TickReport, Transform, Vec2, Viewport, CONFIG_PATH_ENV_VAR, DEFAULT_TARGET_FPS,
    SLOW_FRAME_ENV_VAR,
};
