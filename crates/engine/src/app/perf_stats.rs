use std::time::Duration;

use super::metrics::PhaseDurations;

pub const PERF_WINDOW_LEN: usize = 120;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RollingMsStats {
    pub last_ms: f32,
    pub avg_ms: f32,
    pub max_ms: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PerfStatsSnapshot {
    pub input: RollingMsStats,
    pub simulate: RollingMsStats,
    pub render: RollingMsStats,
    pub sleep: RollingMsStats,
    pub work: RollingMsStats,
}

/// Last / average / max per phase over the most recent [`PERF_WINDOW_LEN`] ticks.
#[derive(Debug, Default)]
pub(crate) struct PerfStats {
    input: RollingWindowMs,
    simulate: RollingWindowMs,
    render: RollingWindowMs,
    sleep: RollingWindowMs,
    work: RollingWindowMs,
}

impl PerfStats {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_tick(&mut self, phases: &PhaseDurations) {
        self.input.push(phases.input);
        self.simulate.push(phases.simulate);
        self.render.push(phases.render);
        self.sleep.push(phases.sleep);
        self.work.push(phases.work());
    }

    pub(crate) fn snapshot(&self) -> PerfStatsSnapshot {
        PerfStatsSnapshot {
            input: self.input.snapshot(),
            simulate: self.simulate.snapshot(),
            render: self.render.snapshot(),
            sleep: self.sleep.snapshot(),
            work: self.work.snapshot(),
        }
    }
}

#[derive(Debug)]
struct RollingWindowMs {
    samples_ms: [f32; PERF_WINDOW_LEN],
    head: usize,
    count: usize,
    sum_ms: f32,
    last_ms: f32,
}

impl Default for RollingWindowMs {
    fn default() -> Self {
        Self {
            samples_ms: [0.0; PERF_WINDOW_LEN],
            head: 0,
            count: 0,
            sum_ms: 0.0,
            last_ms: 0.0,
        }
    }
}

impl RollingWindowMs {
    fn push(&mut self, duration: Duration) {
        self.push_ms(duration_to_ms(duration));
    }

    fn push_ms(&mut self, value_ms: f32) {
        self.last_ms = value_ms;

        let evicted = if self.count < PERF_WINDOW_LEN {
            self.count += 1;
            0.0
        } else {
            self.samples_ms[self.head]
        };
        self.samples_ms[self.head] = value_ms;
        self.head = (self.head + 1) % PERF_WINDOW_LEN;
        self.sum_ms += value_ms - evicted;
    }

    fn snapshot(&self) -> RollingMsStats {
        if self.count == 0 {
            return RollingMsStats::default();
        }

        let max_ms = self.samples_ms[..self.count]
            .iter()
            .copied()
            .fold(f32::MIN, f32::max);

        RollingMsStats {
            last_ms: self.last_ms,
            avg_ms: self.sum_ms / self.count as f32,
            max_ms,
        }
    }
}

fn duration_to_ms(duration: Duration) -> f32 {
    duration.as_secs_f32() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stats_snapshot_is_zeroed() {
        let stats = PerfStats::new();
        assert_eq!(stats.snapshot(), PerfStatsSnapshot::default());
    }

    #[test]
    fn record_tick_feeds_every_phase_and_work() {
        let mut stats = PerfStats::new();
        stats.record_tick(&PhaseDurations {
            input: Duration::from_millis(1),
            simulate: Duration::from_millis(2),
            render: Duration::from_millis(3),
            sleep: Duration::from_millis(10),
        });
        let snapshot = stats.snapshot();

        assert!((snapshot.input.last_ms - 1.0).abs() < 0.0001);
        assert!((snapshot.simulate.last_ms - 2.0).abs() < 0.0001);
        assert!((snapshot.render.last_ms - 3.0).abs() < 0.0001);
        assert!((snapshot.sleep.last_ms - 10.0).abs() < 0.0001);
        assert!((snapshot.work.last_ms - 6.0).abs() < 0.0001);
    }

    #[test]
    fn partial_window_average_uses_current_sample_count() {
        let mut window = RollingWindowMs::default();
        window.push_ms(1.0);
        window.push_ms(2.0);
        window.push_ms(3.0);
        let snapshot = window.snapshot();

        assert_eq!(snapshot.last_ms, 3.0);
        assert!((snapshot.avg_ms - 2.0).abs() < 0.0001);
        assert_eq!(snapshot.max_ms, 3.0);
    }

    #[test]
    fn wraparound_eviction_updates_average() {
        let mut window = RollingWindowMs::default();
        for _ in 0..PERF_WINDOW_LEN {
            window.push_ms(10.0);
        }
        window.push_ms(20.0);
        let snapshot = window.snapshot();

        let expected_avg = ((PERF_WINDOW_LEN as f32 - 1.0) * 10.0 + 20.0) / PERF_WINDOW_LEN as f32;
        assert_eq!(snapshot.last_ms, 20.0);
        assert!((snapshot.avg_ms - expected_avg).abs() < 0.001);
        assert_eq!(snapshot.max_ms, 20.0);
    }

    #[test]
    fn max_recomputes_when_prior_max_is_evicted() {
        let mut window = RollingWindowMs::default();
        window.push_ms(100.0);
        for _ in 1..PERF_WINDOW_LEN {
            window.push_ms(10.0);
        }
        window.push_ms(20.0);

        assert_eq!(window.snapshot().max_ms, 20.0);
    }

    #[test]
    fn duration_to_ms_conversion_is_expected() {
        let value = duration_to_ms(Duration::from_micros(1_500));
        assert!((value - 1.5).abs() < 0.0001);
    }
}
