use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

/// Default countdown period.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// One-period-at-a-time tick source owned by a session runner.
///
/// Disarmed timers never fire. Arming an armed timer is a no-op, so a
/// session can have at most one tick source. A suspended timer remembers how
/// much of the current period was left and spends that first when re-armed.
#[derive(Debug)]
pub struct CountdownTimer {
    period: Duration,
    interval: Option<Interval>,
    next_deadline: Option<Instant>,
    carried: Option<Duration>,
}

impl CountdownTimer {
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            interval: None,
            next_deadline: None,
            carried: None,
        }
    }

    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    /// Starts counting from now. The first tick lands after the part of the
    /// period left over from [`CountdownTimer::suspend`], or a full period.
    pub fn arm(&mut self) {
        if self.interval.is_some() {
            return;
        }
        let first = self.carried.take().unwrap_or(self.period);
        let start = Instant::now() + first;
        let mut interval = interval_at(start, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
        self.next_deadline = Some(start);
    }

    /// Stops ticking but keeps the unspent part of the current period.
    pub fn suspend(&mut self) {
        if let Some(deadline) = self.next_deadline.take() {
            self.carried = Some(deadline.saturating_duration_since(Instant::now()));
        }
        self.interval = None;
    }

    /// Drops the pending period entirely.
    pub fn disarm(&mut self) {
        self.interval = None;
        self.next_deadline = None;
        self.carried = None;
    }

    /// Completes at the end of the current period; pends forever while disarmed.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                let fired = interval.tick().await;
                self.next_deadline = Some((fired + self.period).max(Instant::now()));
            }
            None => std::future::pending::<()>().await,
        }
    }
}

impl Default for CountdownTimer {
    fn default() -> Self {
        Self::new(TICK_PERIOD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn armed_timer_fires_once_per_period() {
        let mut timer = CountdownTimer::default();
        timer.arm();
        let start = Instant::now();
        timer.tick().await;
        assert_eq!(start.elapsed(), Duration::from_secs(1));
        timer.tick().await;
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn disarmed_timer_never_fires() {
        let mut timer = CountdownTimer::default();
        timer.arm();
        assert!(timer.is_armed());
        timer.disarm();
        assert!(!timer.is_armed());
        let fired = tokio::time::timeout(Duration::from_secs(5), timer.tick()).await;
        assert!(fired.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn rearm_is_idempotent_and_restarts_after_disarm() {
        let mut timer = CountdownTimer::default();
        timer.arm();
        tokio::time::advance(Duration::from_millis(600)).await;
        timer.arm();
        let start = Instant::now();
        timer.tick().await;
        assert_eq!(start.elapsed(), Duration::from_millis(400));

        timer.disarm();
        timer.arm();
        let start = Instant::now();
        timer.tick().await;
        assert_eq!(start.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn suspend_carries_the_rest_of_the_period() {
        let mut timer = CountdownTimer::default();
        timer.arm();
        tokio::time::advance(Duration::from_millis(600)).await;
        timer.suspend();
        timer.suspend();
        assert!(!timer.is_armed());
        tokio::time::advance(Duration::from_secs(30)).await;

        timer.arm();
        let start = Instant::now();
        timer.tick().await;
        assert_eq!(start.elapsed(), Duration::from_millis(400));
        timer.tick().await;
        assert_eq!(start.elapsed(), Duration::from_millis(1400));

        tokio::time::advance(Duration::from_millis(300)).await;
        timer.suspend();
        timer.disarm();
        timer.arm();
        let start = Instant::now();
        timer.tick().await;
        assert_eq!(start.elapsed(), Duration::from_secs(1));
    }
}
