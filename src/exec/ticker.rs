// src/exec/ticker.rs

//! Growing-interval ticker that drives liveness lines and the hard deadline.
//!
//! The first tick fires immediately. Each following interval is the previous
//! one multiplied by `multiplier`, capped at `max_poll_interval`. Wake-ups
//! are also clamped to the deadline so expiry is detected on time even when
//! the interval has grown large.

use std::time::Duration;

use tokio::time::{Instant, sleep_until};

use crate::types::SupervisorOptions;

/// Stand-in deadline when `max_elapsed` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// One firing of the [`DeadlineTicker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Regular liveness tick.
    Interval(Instant),
    /// `max_elapsed` has been reached. Keeps firing until the ticker is
    /// stopped.
    Expired,
}

#[derive(Debug)]
pub struct DeadlineTicker {
    deadline: Instant,
    next_at: Option<Instant>,
    interval: Duration,
    max_interval: Duration,
    multiplier: f64,
}

impl DeadlineTicker {
    pub fn new(options: &SupervisorOptions) -> Self {
        let now = Instant::now();
        let deadline = now
            .checked_add(options.max_elapsed)
            .unwrap_or_else(|| now + FAR_FUTURE);
        Self {
            deadline,
            next_at: Some(now),
            interval: options.poll_interval,
            max_interval: options.max_poll_interval,
            multiplier: options.multiplier,
        }
    }

    /// Wait for the next tick. Never resolves once [`stop`](Self::stop) has
    /// been called.
    ///
    /// Cancel-safe: state is only updated after the wait completes.
    pub async fn tick(&mut self) -> Tick {
        let Some(at) = self.next_at else {
            return std::future::pending().await;
        };

        sleep_until(at).await;
        let now = Instant::now();

        if now >= self.deadline {
            self.next_at = Some(now);
            return Tick::Expired;
        }

        let wait = self.interval;
        self.interval = next_interval(self.interval, self.multiplier, self.max_interval);
        let next = now.checked_add(wait).unwrap_or(self.deadline);
        self.next_at = Some(next.min(self.deadline));

        Tick::Interval(now)
    }

    pub fn stop(&mut self) {
        self.next_at = None;
    }

    pub fn is_stopped(&self) -> bool {
        self.next_at.is_none()
    }
}

/// Grow `current` by `multiplier`, never exceeding `max`.
pub fn next_interval(current: Duration, multiplier: f64, max: Duration) -> Duration {
    Duration::try_from_secs_f64(current.as_secs_f64() * multiplier)
        .unwrap_or(max)
        .max(current)
        .min(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn options(poll: u64, max_poll: u64, max_elapsed: u64) -> SupervisorOptions {
        SupervisorOptions {
            poll_interval: Duration::from_secs(poll),
            max_poll_interval: Duration::from_secs(max_poll),
            multiplier: 2.0,
            max_elapsed: Duration::from_secs(max_elapsed),
            drain_timeout: Duration::from_secs(1),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_is_immediate_then_intervals_grow() {
        let start = Instant::now();
        let mut ticker = DeadlineTicker::new(&options(1, 4, 100));

        let mut offsets = Vec::new();
        for _ in 0..5 {
            match ticker.tick().await {
                Tick::Interval(at) => offsets.push(at.duration_since(start).as_secs()),
                Tick::Expired => panic!("unexpected expiry"),
            }
        }

        // 0, +1, +2, +4 (capped), +4
        assert_eq!(offsets, vec![0, 1, 3, 7, 11]);
    }

    #[tokio::test(start_paused = true)]
    async fn expires_at_the_deadline_even_with_long_intervals() {
        let start = Instant::now();
        let mut ticker = DeadlineTicker::new(&options(10, 300, 15));

        assert!(matches!(ticker.tick().await, Tick::Interval(_)));
        assert!(matches!(ticker.tick().await, Tick::Interval(_)));
        assert_eq!(ticker.tick().await, Tick::Expired);
        assert_eq!(start.elapsed(), Duration::from_secs(15));

        // Keeps reporting expiry until stopped.
        assert_eq!(ticker.tick().await, Tick::Expired);
    }

    #[tokio::test(start_paused = true)]
    async fn unrepresentable_deadline_saturates() {
        let mut opts = options(1, 2, 0);
        opts.max_elapsed = Duration::MAX;
        let mut ticker = DeadlineTicker::new(&opts);

        assert!(matches!(ticker.tick().await, Tick::Interval(_)));
        assert!(matches!(ticker.tick().await, Tick::Interval(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_ticker_never_fires() {
        let mut ticker = DeadlineTicker::new(&options(1, 1, 2));
        ticker.stop();
        assert!(ticker.is_stopped());

        let res = tokio::time::timeout(Duration::from_secs(60), ticker.tick()).await;
        assert!(res.is_err());
    }

    proptest! {
        #[test]
        fn next_interval_is_bounded_and_non_decreasing(
            current_ms in 1u64..600_000,
            max_ms in 1u64..600_000,
            multiplier in 1.0f64..10.0,
        ) {
            let current = Duration::from_millis(current_ms.min(max_ms));
            let max = Duration::from_millis(max_ms);
            let next = next_interval(current, multiplier, max);
            prop_assert!(next <= max);
            prop_assert!(next >= current);
        }
    }
}
