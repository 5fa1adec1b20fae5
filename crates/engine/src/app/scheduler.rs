use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use super::actions::{ActionFrame, ActionMap};
use super::clock::Clock;
use super::config::LoopConfig;
use super::input::{InputEvent, RawInputState, ScanCode};
use super::metrics::{MetricsAccumulator, PhaseDurations, PhaseTotals};
use super::perf_stats::{PerfStats, PerfStatsSnapshot};
use super::remap::{RemapController, RemapOutcome, RemapState};
use super::scene::TickInput;

/// Non-blocking source of platform events, polled once per tick.
pub trait EventSource {
    /// Appends every pending event to `events`, in arrival order.
    fn poll_events(&mut self, events: &mut Vec<InputEvent>);
}

/// Advances game state by one fixed step and produces what the renderer draws.
pub trait Simulation {
    type Frame;

    fn step(&mut self, fixed_dt_seconds: f32, input: &TickInput<'_>) -> Self::Frame;
}

/// Presents a finished frame. An error ends the loop.
pub trait Render<F> {
    type Error;

    fn render(&mut self, frame: &F) -> Result<(), Self::Error>;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("remap toggle key {key} is bound to action slot {slot}")]
    ToggleKeyBound { key: ScanCode, slot: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overrun {
    pub elapsed: Duration,
    pub target: Duration,
}

impl Overrun {
    pub fn over_by(&self) -> Duration {
        self.elapsed.saturating_sub(self.target)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    pub phases: PhaseDurations,
    pub overrun: Option<Overrun>,
    pub remap: RemapOutcome,
    pub events_applied: usize,
    pub quit_requested: bool,
    /// Set only on the tick that first saw the quit request.
    pub quit_observed: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    pub totals: PhaseTotals,
    pub perf: PerfStatsSnapshot,
}

/// All mutable input state for the loop, owned in one place and threaded
/// through each tick.
#[derive(Debug, Clone)]
pub struct SchedulerContext {
    raw: RawInputState,
    action_map: ActionMap,
    action_frame: ActionFrame,
    remap: RemapController,
    quit_requested: bool,
}

impl SchedulerContext {
    pub fn new(action_map: ActionMap, toggle_key: ScanCode) -> Result<Self, SchedulerError> {
        if let Some(slot) = action_map.slot_for_source(toggle_key) {
            return Err(SchedulerError::ToggleKeyBound {
                key: toggle_key,
                slot: slot.0,
            });
        }
        Ok(Self {
            raw: RawInputState::new(),
            action_frame: ActionFrame::for_map(&action_map),
            action_map,
            remap: RemapController::new(toggle_key),
            quit_requested: false,
        })
    }

    pub fn raw_input(&self) -> &RawInputState {
        &self.raw
    }

    pub fn action_map(&self) -> &ActionMap {
        &self.action_map
    }

    pub fn action_frame(&self) -> &ActionFrame {
        &self.action_frame
    }

    pub fn remap_state(&self) -> RemapState {
        self.remap.state()
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    fn begin_frame(&mut self) {
        self.raw.begin_frame();
        self.action_frame.begin_frame();
    }

    fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown(code) => self.raw.apply_event(code, true),
            InputEvent::KeyUp(code) => self.raw.apply_event(code, false),
            InputEvent::Quit => self.quit_requested = true,
        }
    }

    /// Remap gets first look at the tick so the toggle is seen from `Idle`.
    /// Actions resolve only when remap ends the update idle; otherwise they
    /// hold last frame's values.
    fn update_actions(&mut self) -> RemapOutcome {
        let outcome = self.remap.update(&self.raw, &mut self.action_map);
        if self.remap.is_active() {
            self.action_frame.freeze();
        } else {
            self.action_frame.store(self.action_map.resolve(&self.raw));
        }
        outcome
    }

    fn tick_input(&self, tick: u64) -> TickInput<'_> {
        TickInput {
            tick,
            actions: &self.action_frame,
            remap: self.remap.state(),
            bindings: self.action_map.bindings(),
        }
    }
}

/// Fixed-rate, single-threaded frame loop. Each tick runs input, simulate and
/// render in order, then sleeps off whatever is left of the target period.
/// An overrunning tick skips the sleep and the next tick starts immediately;
/// there is no catch-up.
pub struct FrameScheduler<C: Clock> {
    clock: C,
    context: SchedulerContext,
    target_fps: u32,
    target_period: Duration,
    slow_frame_delay: Duration,
    totals: PhaseTotals,
    perf: PerfStats,
    metrics: MetricsAccumulator,
    pending_events: Vec<InputEvent>,
    next_tick: u64,
}

impl<C: Clock> FrameScheduler<C> {
    pub fn new(config: &LoopConfig, action_map: ActionMap, clock: C) -> Result<Self, SchedulerError> {
        let context = SchedulerContext::new(action_map, config.remap_toggle_key)?;
        let metrics = MetricsAccumulator::new(config.metrics_log_interval, clock.now());
        Ok(Self {
            clock,
            context,
            target_fps: config.target_fps.max(1),
            target_period: config.target_period(),
            slow_frame_delay: Duration::from_millis(config.simulated_slow_frame_ms),
            totals: PhaseTotals::default(),
            perf: PerfStats::new(),
            metrics,
            pending_events: Vec::new(),
            next_tick: 0,
        })
    }

    pub fn context(&self) -> &SchedulerContext {
        &self.context
    }

    pub fn target_period(&self) -> Duration {
        self.target_period
    }

    pub fn totals(&self) -> PhaseTotals {
        self.totals
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            totals: self.totals,
            perf: self.perf.snapshot(),
        }
    }

    pub fn tick<E, S, R>(
        &mut self,
        events: &mut E,
        simulation: &mut S,
        renderer: &mut R,
    ) -> Result<TickReport, R::Error>
    where
        E: EventSource + ?Sized,
        S: Simulation + ?Sized,
        R: Render<S::Frame> + ?Sized,
    {
        let tick = self.next_tick;
        self.next_tick = self.next_tick.saturating_add(1);
        let quit_before = self.context.quit_requested;

        let started = self.clock.now();
        self.context.begin_frame();
        events.poll_events(&mut self.pending_events);
        let events_applied = self.pending_events.len();
        for event in self.pending_events.drain(..) {
            self.context.apply(event);
        }
        let remap = self.context.update_actions();
        let input_done = self.clock.now();

        let frame = simulation.step(
            self.target_period.as_secs_f32(),
            &self.context.tick_input(tick),
        );
        if self.slow_frame_delay > Duration::ZERO {
            // Explicit debug perturbation only; this is not the frame cap.
            self.clock.sleep_for(self.slow_frame_delay);
        }
        let simulate_done = self.clock.now();

        renderer.render(&frame)?;
        let render_done = self.clock.now();

        let work = render_done.saturating_sub(started);
        let overrun = if work >= self.target_period {
            let overrun = Overrun {
                elapsed: work,
                target: self.target_period,
            };
            warn!(
                tick,
                elapsed_us = work.as_micros() as u64,
                target_us = self.target_period.as_micros() as u64,
                over_by_us = overrun.over_by().as_micros() as u64,
                "frame_overrun"
            );
            Some(overrun)
        } else {
            self.clock.sleep_for(self.target_period - work);
            None
        };
        let finished = self.clock.now();

        let phases = PhaseDurations {
            input: input_done.saturating_sub(started),
            simulate: simulate_done.saturating_sub(input_done),
            render: render_done.saturating_sub(simulate_done),
            sleep: finished.saturating_sub(render_done),
        };
        self.totals.record(&phases, overrun.is_some());
        self.perf.record_tick(&phases);
        self.metrics
            .record_frame(finished.saturating_sub(started), work, overrun.is_some());
        if let Some(snapshot) = self.metrics.maybe_snapshot(finished) {
            let perf = self.perf.snapshot();
            info!(
                fps = snapshot.fps,
                frame_time_ms = snapshot.frame_time_ms,
                work_time_ms = snapshot.work_time_ms,
                overruns = snapshot.overruns,
                input_avg_ms = perf.input.avg_ms,
                simulate_avg_ms = perf.simulate.avg_ms,
                render_avg_ms = perf.render.avg_ms,
                work_max_ms = perf.work.max_ms,
                remap = ?self.context.remap_state(),
                "loop_metrics"
            );
        }

        let quit_requested = self.context.quit_requested;
        let quit_observed = quit_requested && !quit_before;
        if quit_observed {
            info!(tick, "quit_observed");
        }

        Ok(TickReport {
            tick,
            phases,
            overrun,
            remap,
            events_applied,
            quit_requested,
            quit_observed,
        })
    }

    /// Ticks until a quit event has been seen. The flag is only checked
    /// between ticks.
    pub fn run<E, S, R>(
        &mut self,
        events: &mut E,
        simulation: &mut S,
        renderer: &mut R,
    ) -> Result<RunSummary, R::Error>
    where
        E: EventSource + ?Sized,
        S: Simulation + ?Sized,
        R: Render<S::Frame> + ?Sized,
    {
        info!(
            target_fps = self.target_fps,
            target_period_us = self.target_period.as_micros() as u64,
            slow_frame_delay_ms = self.slow_frame_delay.as_millis() as u64,
            action_slots = self.context.action_map.len(),
            remap_toggle_key = %self.context.remap.toggle_key(),
            "loop_config"
        );

        while !self.context.quit_requested {
            self.tick(events, simulation, renderer)?;
        }

        let summary = self.summary();
        let average = summary.totals.average();
        info!(
            ticks = summary.totals.ticks,
            overruns = summary.totals.overruns,
            input_avg_us = average.input.as_micros() as u64,
            simulate_avg_us = average.simulate.as_micros() as u64,
            render_avg_us = average.render.as_micros() as u64,
            sleep_avg_us = average.sleep.as_micros() as u64,
            work_max_ms = summary.perf.work.max_ms,
            "shutdown"
        );
        Ok(summary)
    }
}
