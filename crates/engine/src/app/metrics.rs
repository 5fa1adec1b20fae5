use std::time::Duration;

/// Wall time spent in each phase of one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseDurations {
    pub input: Duration,
    pub simulate: Duration,
    pub render: Duration,
    pub sleep: Duration,
}

impl PhaseDurations {
    /// Time measured against the frame budget. Sleep is not work.
    pub fn work(&self) -> Duration {
        self.input
            .saturating_add(self.simulate)
            .saturating_add(self.render)
    }

    pub fn total(&self) -> Duration {
        self.work().saturating_add(self.sleep)
    }
}

/// Running totals since the scheduler started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseTotals {
    pub ticks: u64,
    pub overruns: u64,
    pub phases: PhaseDurations,
}

impl PhaseTotals {
    pub(crate) fn record(&mut self, phases: &PhaseDurations, overrun: bool) {
        self.ticks = self.ticks.saturating_add(1);
        if overrun {
            self.overruns = self.overruns.saturating_add(1);
        }
        self.phases.input = self.phases.input.saturating_add(phases.input);
        self.phases.simulate = self.phases.simulate.saturating_add(phases.simulate);
        self.phases.render = self.phases.render.saturating_add(phases.render);
        self.phases.sleep = self.phases.sleep.saturating_add(phases.sleep);
    }

    pub fn average(&self) -> PhaseDurations {
        let Ok(ticks) = u32::try_from(self.ticks) else {
            return PhaseDurations::default();
        };
        if ticks == 0 {
            return PhaseDurations::default();
        }
        PhaseDurations {
            input: self.phases.input / ticks,
            simulate: self.phases.simulate / ticks,
            render: self.phases.render / ticks,
            sleep: self.phases.sleep / ticks,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub frame_time_ms: f32,
    pub work_time_ms: f32,
    pub overruns: u32,
}

/// Interval counters behind the periodic `loop_metrics` log line. Timestamps
/// come from the scheduler clock, not `Instant`, so tests can drive it.
#[derive(Debug)]
pub(crate) struct MetricsAccumulator {
    interval_start: Duration,
    interval: Duration,
    frames: u32,
    overruns: u32,
    frame_time_sum: Duration,
    work_time_sum: Duration,
}

impl MetricsAccumulator {
    pub(crate) fn new(interval: Duration, now: Duration) -> Self {
        Self {
            interval_start: now,
            interval,
            frames: 0,
            overruns: 0,
            frame_time_sum: Duration::ZERO,
            work_time_sum: Duration::ZERO,
        }
    }

    pub(crate) fn record_frame(&mut self, frame_dt: Duration, work_dt: Duration, overrun: bool) {
        self.frames = self.frames.saturating_add(1);
        if overrun {
            self.overruns = self.overruns.saturating_add(1);
        }
        self.frame_time_sum = self.frame_time_sum.saturating_add(frame_dt);
        self.work_time_sum = self.work_time_sum.saturating_add(work_dt);
    }

    pub(crate) fn maybe_snapshot(&mut self, now: Duration) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_sub(self.interval_start);
        if elapsed < self.interval {
            return None;
        }

        let elapsed_seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let (frame_time_ms, work_time_ms) = if self.frames == 0 {
            (0.0, 0.0)
        } else {
            (
                (self.frame_time_sum.as_secs_f32() / self.frames as f32) * 1000.0,
                (self.work_time_sum.as_secs_f32() / self.frames as f32) * 1000.0,
            )
        };

        let snapshot = LoopMetricsSnapshot {
            fps: self.frames as f32 / elapsed_seconds,
            frame_time_ms,
            work_time_ms,
            overruns: self.overruns,
        };

        self.interval_start = now;
        self.frames = 0;
        self.overruns = 0;
        self.frame_time_sum = Duration::ZERO;
        self.work_time_sum = Duration::ZERO;

        Some(snapshot)
    }
}
