//! Evenly spaced ticks for the finishing phase.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Number and spacing of finishing ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSchedule {
    pub ticks: u32,
    pub interval: Duration,
}

impl TickSchedule {
    pub const DEFAULT_TICKS: u32 = 80;
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(80);

    pub fn new(ticks: u32, interval: Duration) -> Self {
        Self { ticks, interval }
    }

    /// Wall time from the first tick being scheduled to the last firing.
    pub fn total(&self) -> Duration {
        self.interval.saturating_mul(self.ticks)
    }
}

impl Default for TickSchedule {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TICKS, Self::DEFAULT_INTERVAL)
    }
}

/// A running schedule. Ticks are numbered from 1.
///
/// Stopping or dropping the ticker cancels every tick not yet delivered.
#[derive(Debug)]
pub struct Ticker {
    rx: mpsc::Receiver<u32>,
    task: JoinHandle<()>,
}

impl Ticker {
    /// Start ticking. Must be called from within a Tokio runtime.
    pub fn start(schedule: TickSchedule) -> Self {
        let (tx, rx) = mpsc::channel(1);
        // tokio rejects a zero period.
        let period = schedule.interval.max(Duration::from_millis(1));
        let task = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            for tick in 1..=schedule.ticks {
                interval.tick().await;
                if tx.send(tick).await.is_err() {
                    break;
                }
            }
        });
        Self { rx, task }
    }

    /// Next tick, or `None` once the schedule has run out or was stopped.
    pub async fn next(&mut self) -> Option<u32> {
        self.rx.recv().await
    }

    pub fn stop(&mut self) {
        self.task.abort();
        self.rx.close();
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn delivers_every_tick_on_schedule() {
        let schedule = TickSchedule::new(3, Duration::from_millis(80));
        let started = Instant::now();
        let mut ticker = Ticker::start(schedule);
        let mut seen = Vec::new();
        while let Some(tick) = ticker.next().await {
            seen.push(tick);
        }
        assert_eq!(seen, [1, 2, 3]);
        assert_eq!(started.elapsed(), schedule.total());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_the_schedule() {
        let mut ticker = Ticker::start(TickSchedule::default());
        assert_eq!(ticker.next().await, Some(1));
        ticker.stop();
        // A tick already buffered may still be drained; nothing after it.
        let mut remaining = 0;
        while ticker.next().await.is_some() {
            remaining += 1;
        }
        assert!(remaining <= 1);
    }

    #[test]
    fn default_schedule() {
        let schedule = TickSchedule::default();
        assert_eq!(schedule.ticks, 80);
        assert_eq!(schedule.total(), Duration::from_millis(6400));
    }
}
