//! The merge progress value and its two phases.
//!
//! While the engine works, raw samples are scaled into the first 80% of the
//! bar and only ever move it forward. Once the engine accepts the job, a
//! fixed number of ticks carry the bar from wherever it stopped towards the
//! end, stopping just short of 100 until success has been reported.

use tracing::{debug, trace, warn};

/// Factor applied to raw engine samples during the live phase.
pub const LIVE_SCALE: f64 = 0.8;

/// Highest value shown before success is confirmed.
pub const FINISH_CAP: f64 = 99.9;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProgressPhase {
    #[default]
    Idle,
    Live,
    Finishing,
}

/// Result of feeding one raw sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleOutcome {
    /// The bar moved to this value.
    Accepted(f64),
    /// The scaled sample did not exceed the current value.
    Discarded,
    /// Not in the live phase.
    Ignored,
}

/// Result of one finishing tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    Advanced(f64),
    /// The last tick of the schedule; success can now be reported.
    Completed(f64),
    /// Not finishing, or the schedule already completed.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct FinishRun {
    start: f64,
    range: f64,
    tick: u32,
    total: u32,
}

/// Owner of the displayed progress value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressController {
    phase: ProgressPhase,
    displayed: f64,
    finish: Option<FinishRun>,
}

impl ProgressController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> ProgressPhase {
        self.phase
    }

    pub fn displayed(&self) -> f64 {
        self.displayed
    }

    /// True while a merge is live or finishing.
    pub fn is_active(&self) -> bool {
        self.phase != ProgressPhase::Idle
    }

    /// Enter the live phase with a fresh value of zero.
    pub fn start(&mut self) {
        self.reset();
        self.phase = ProgressPhase::Live;
        debug!(phase = ?self.phase, "progress started");
    }

    /// Feed a raw engine sample in `[0, 100]`.
    pub fn sample(&mut self, raw: f64) -> SampleOutcome {
        if self.phase != ProgressPhase::Live {
            trace!(raw, phase = ?self.phase, "ignoring progress sample");
            return SampleOutcome::Ignored;
        }
        if raw.is_nan() {
            warn!("discarding non-numeric progress sample");
            return SampleOutcome::Discarded;
        }
        if !(0.0..=100.0).contains(&raw) {
            warn!(raw, "progress sample out of range, clamping to 0-100");
        }
        let scaled = (raw.clamp(0.0, 100.0) * LIVE_SCALE).floor();
        if scaled > self.displayed {
            self.displayed = scaled;
            debug!(raw, displayed = scaled, "progress advanced");
            SampleOutcome::Accepted(scaled)
        } else {
            debug!(raw, scaled, displayed = self.displayed, "progress sample discarded");
            SampleOutcome::Discarded
        }
    }

    /// Switch from live to finishing over `total_ticks` ticks.
    ///
    /// Returns the value the schedule starts from, or `None` when not live.
    pub fn begin_finishing(&mut self, total_ticks: u32) -> Option<f64> {
        if self.phase != ProgressPhase::Live {
            return None;
        }
        let start = self.displayed;
        self.finish = Some(FinishRun {
            start,
            range: 100.0 - start,
            tick: 0,
            total: total_ticks.max(1),
        });
        self.phase = ProgressPhase::Finishing;
        debug!(start, ticks = total_ticks, "progress finishing");
        Some(start)
    }

    /// Advance the finishing schedule by one tick.
    pub fn tick(&mut self) -> TickOutcome {
        let Some(run) = self.finish.as_mut() else {
            return TickOutcome::Ignored;
        };
        if self.phase != ProgressPhase::Finishing || run.tick >= run.total {
            return TickOutcome::Ignored;
        }
        run.tick += 1;
        let target = run.start + run.range * f64::from(run.tick) / f64::from(run.total);
        self.displayed = target.min(FINISH_CAP).max(self.displayed);
        if run.tick == run.total {
            TickOutcome::Completed(self.displayed)
        } else {
            TickOutcome::Advanced(self.displayed)
        }
    }

    /// Success has been reported; return to idle.
    pub fn complete(&mut self) {
        debug!("progress completed");
        self.reset();
    }

    /// The merge failed before finishing; return to idle.
    pub fn fail(&mut self) {
        debug!(phase = ?self.phase, "progress abandoned after failure");
        self.reset();
    }

    /// User cancellation from either active phase.
    pub fn cancel(&mut self) {
        if self.is_active() {
            debug!(phase = ?self.phase, "progress cancelled");
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.phase = ProgressPhase::Idle;
        self.displayed = 0.0;
        self.finish = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_are_scaled_and_ratcheted() {
        let mut progress = ProgressController::new();
        progress.start();
        let mut shown = Vec::new();
        for raw in [20.0, 15.0, 50.0] {
            progress.sample(raw);
            shown.push(progress.displayed());
        }
        assert_eq!(shown, [16.0, 16.0, 40.0]);
    }

    #[test]
    fn scaled_samples_are_floored() {
        let mut progress = ProgressController::new();
        progress.start();
        assert_eq!(progress.sample(33.0), SampleOutcome::Accepted(26.0));
    }

    #[test]
    fn out_of_range_samples_are_clamped() {
        let mut progress = ProgressController::new();
        progress.start();
        assert_eq!(progress.sample(-5.0), SampleOutcome::Discarded);
        assert_eq!(progress.sample(250.0), SampleOutcome::Accepted(80.0));
        assert_eq!(progress.sample(f64::NAN), SampleOutcome::Discarded);
        assert_eq!(progress.displayed(), 80.0);
    }

    #[test]
    fn samples_outside_live_are_ignored() {
        let mut progress = ProgressController::new();
        assert_eq!(progress.sample(50.0), SampleOutcome::Ignored);
        progress.start();
        progress.begin_finishing(4);
        assert_eq!(progress.sample(90.0), SampleOutcome::Ignored);
    }

    #[test]
    fn finishing_runs_to_cap() {
        let mut progress = ProgressController::new();
        progress.start();
        progress.sample(50.0);
        assert_eq!(progress.begin_finishing(4), Some(40.0));
        assert_eq!(progress.tick(), TickOutcome::Advanced(55.0));
        assert_eq!(progress.tick(), TickOutcome::Advanced(70.0));
        assert_eq!(progress.tick(), TickOutcome::Advanced(85.0));
        assert_eq!(progress.tick(), TickOutcome::Completed(FINISH_CAP));
        assert_eq!(progress.tick(), TickOutcome::Ignored);
        assert_eq!(progress.phase(), ProgressPhase::Finishing);
        progress.complete();
        assert_eq!(progress.phase(), ProgressPhase::Idle);
        assert_eq!(progress.displayed(), 0.0);
    }

    #[test]
    fn finishing_requires_live() {
        let mut progress = ProgressController::new();
        assert_eq!(progress.begin_finishing(10), None);
        assert_eq!(progress.tick(), TickOutcome::Ignored);
    }

    #[test]
    fn cancel_resets_from_finishing() {
        let mut progress = ProgressController::new();
        progress.start();
        progress.sample(100.0);
        progress.begin_finishing(80);
        progress.tick();
        progress.cancel();
        assert_eq!(progress.phase(), ProgressPhase::Idle);
        assert_eq!(progress.displayed(), 0.0);
        assert_eq!(progress.tick(), TickOutcome::Ignored);
    }

    #[test]
    fn restart_resets_value() {
        let mut progress = ProgressController::new();
        progress.start();
        progress.sample(60.0);
        progress.start();
        assert_eq!(progress.displayed(), 0.0);
        assert_eq!(progress.sample(10.0), SampleOutcome::Accepted(8.0));
    }
}
