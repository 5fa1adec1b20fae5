use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{debug, info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::EventLoop;
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowBuilder, WindowId};

use super::actions::ActionMap;
use super::clock::SystemClock;
use super::config::LoopConfig;
use super::input::{InputEvent, ScanCode};
use super::keymap::scancode_from_physical_key;
use super::rendering::Renderer;
use super::scene::SceneFrame;
use super::scheduler::{
    EventSource, FrameScheduler, Render, RunSummary, SchedulerError, Simulation,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("invalid loop setup: {0}")]
    Scheduler(#[from] SchedulerError),
    #[error("failed to present frame: {0}")]
    Render(#[source] PixelsError),
}

/// Opens a window and drives `simulation` at the configured rate until a quit
/// event arrives.
pub fn run_app<S>(
    config: LoopConfig,
    action_map: ActionMap,
    simulation: &mut S,
) -> Result<RunSummary, AppError>
where
    S: Simulation<Frame = SceneFrame> + ?Sized,
{
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let renderer = Renderer::new(Arc::clone(&window)).map_err(AppError::CreateRenderer)?;
    let viewport = renderer.viewport();
    let quit_key = config.quit_key.map(|key| key.to_string());
    info!(
        title = config.window_title.as_str(),
        width = viewport.width,
        height = viewport.height,
        quit_key = ?quit_key,
        "startup"
    );

    let pending_resize = Rc::new(Cell::new(None));
    let mut events = WinitEventSource::new(
        event_loop,
        Arc::clone(&window),
        config.quit_key,
        Rc::clone(&pending_resize),
    );
    let mut presenter = Presenter {
        renderer,
        pending_resize,
    };
    let mut scheduler = FrameScheduler::new(&config, action_map, SystemClock::new())?;
    scheduler
        .run(&mut events, simulation, &mut presenter)
        .map_err(AppError::Render)
}

/// Pumps the winit queue without blocking and translates what it finds into
/// loop events. Resizes are handed to the presenter through a shared cell.
struct WinitEventSource {
    event_loop: EventLoop<()>,
    window: Arc<Window>,
    window_id: WindowId,
    quit_key: Option<ScanCode>,
    pending_resize: Rc<Cell<Option<(u32, u32)>>>,
    exited: bool,
}

impl WinitEventSource {
    fn new(
        event_loop: EventLoop<()>,
        window: Arc<Window>,
        quit_key: Option<ScanCode>,
        pending_resize: Rc<Cell<Option<(u32, u32)>>>,
    ) -> Self {
        let window_id = window.id();
        Self {
            event_loop,
            window,
            window_id,
            quit_key,
            pending_resize,
            exited: false,
        }
    }
}

impl EventSource for WinitEventSource {
    fn poll_events(&mut self, events: &mut Vec<InputEvent>) {
        if self.exited {
            events.push(InputEvent::Quit);
            return;
        }

        let Self {
            event_loop,
            window,
            window_id,
            quit_key,
            pending_resize,
            ..
        } = self;
        let window_id = *window_id;
        let quit_key = *quit_key;

        let status = event_loop.pump_events(Some(Duration::ZERO), |event, _window_target| {
            let Event::WindowEvent {
                window_id: event_window,
                event,
            } = event
            else {
                return;
            };
            if event_window != window_id {
                return;
            }
            match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    events.push(InputEvent::Quit);
                }
                WindowEvent::Resized(size) => {
                    pending_resize.set(Some((size.width, size.height)));
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    pending_resize.set(Some((size.width, size.height)));
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    let code = scancode_from_physical_key(event.physical_key);
                    if code.is_none() {
                        debug!(key = ?event.physical_key, "unmapped_key_dropped");
                    }
                    let pressed = event.state == ElementState::Pressed;
                    if let Some(translated) = translate_key(code, pressed, event.repeat, quit_key)
                    {
                        if translated == InputEvent::Quit {
                            info!(reason = "quit_key", "shutdown_requested");
                        }
                        events.push(translated);
                    }
                }
                _ => {}
            }
        });

        if let PumpStatus::Exit(exit_code) = status {
            info!(exit_code, "event_loop_exited");
            self.exited = true;
            events.push(InputEvent::Quit);
        }
    }
}

/// Maps one keyboard event to a loop event. Auto-repeat is dropped since
/// input is level based, and the quit key never reaches the key state.
fn translate_key(
    code: Option<ScanCode>,
    pressed: bool,
    repeat: bool,
    quit_key: Option<ScanCode>,
) -> Option<InputEvent> {
    let code = code?;
    if quit_key == Some(code) {
        return pressed.then_some(InputEvent::Quit);
    }
    if repeat {
        return None;
    }
    Some(if pressed {
        InputEvent::KeyDown(code)
    } else {
        InputEvent::KeyUp(code)
    })
}

struct Presenter {
    renderer: Renderer,
    pending_resize: Rc<Cell<Option<(u32, u32)>>>,
}

impl Render<SceneFrame> for Presenter {
    type Error = PixelsError;

    fn render(&mut self, frame: &SceneFrame) -> Result<(), PixelsError> {
        if let Some((width, height)) = self.pending_resize.take() {
            if let Err(error) = self.renderer.resize(width, height) {
                warn!(error = %error, width, height, "renderer_resize_failed");
                return Err(error);
            }
        }
        self.renderer.render(frame).map_err(|error| {
            warn!(error = %error, "renderer_draw_failed");
            error
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_press_and_release_translate_to_key_events() {
        assert_eq!(
            translate_key(Some(ScanCode::LEFT), true, false, Some(ScanCode::ESCAPE)),
            Some(InputEvent::KeyDown(ScanCode::LEFT))
        );
        assert_eq!(
            translate_key(Some(ScanCode::LEFT), false, false, Some(ScanCode::ESCAPE)),
            Some(InputEvent::KeyUp(ScanCode::LEFT))
        );
    }

    #[test]
    fn unmapped_keys_are_dropped() {
        assert_eq!(translate_key(None, true, false, None), None);
    }

    #[test]
    fn auto_repeat_is_dropped() {
        assert_eq!(translate_key(Some(ScanCode::A), true, true, None), None);
    }

    #[test]
    fn quit_key_press_requests_quit_and_release_is_swallowed() {
        let quit = Some(ScanCode::ESCAPE);
        assert_eq!(
            translate_key(Some(ScanCode::ESCAPE), true, false, quit),
            Some(InputEvent::Quit)
        );
        assert_eq!(translate_key(Some(ScanCode::ESCAPE), false, false, quit), None);
    }

    #[test]
    fn without_quit_key_escape_is_an_ordinary_key() {
        assert_eq!(
            translate_key(Some(ScanCode::ESCAPE), true, false, None),
            Some(InputEvent::KeyDown(ScanCode::ESCAPE))
        );
    }
}
