use std::time::Duration;

#[derive(Debug, Clone, Copy, Default)]
pub struct StepTimings {
    pub advance: Duration,
    pub record: Duration,
    pub total: Duration,
}

/// Optional hook interface for capturing runner step timings.
///
/// Kept free of simulation-specific types so the same profiler can watch a
/// headless autoplay run or a realtime loop.
pub trait Profiler {
    fn on_step(&mut self, _frame: usize, _timings: StepTimings) {}
}
