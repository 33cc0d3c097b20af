//! Timing helpers shared by the phase metrics

use std::time::Instant;

/// A timing guard that records the elapsed seconds for a stage when dropped
pub struct TimingGuard {
    start: Instant,
    histogram_name: &'static str,
    stage: &'static str,
}

impl TimingGuard {
    pub fn new(histogram_name: &'static str, stage: &'static str) -> Self {
        Self {
            start: Instant::now(),
            histogram_name,
            stage,
        }
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        ::metrics::histogram!(self.histogram_name, "stage" => self.stage).record(duration);
    }
}

/// Time a pipeline stage into `etl_stage_duration_seconds`
pub fn time_stage(stage: &'static str) -> TimingGuard {
    TimingGuard::new("etl_stage_duration_seconds", stage)
}
