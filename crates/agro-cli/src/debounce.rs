//! Debounce timer for auto-predict

use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Quiet period after the last edit before an automatic prediction
pub const AUTO_PREDICT_DELAY: Duration = Duration::from_millis(800);

/// Tracks the deadline of a pending automatic submission.
///
/// Every edit calls [`Debouncer::touch`], which pushes the deadline back.
/// The owner waits on [`wait_for`] with the current deadline and disarms the
/// timer once it fires.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, deadline: None }
    }

    pub fn touch(&mut self) {
        self.deadline = Some(Instant::now() + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(AUTO_PREDICT_DELAY)
    }
}

/// Resolve at the deadline; never resolves when there is none.
pub async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{advance, timeout};

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();

        debouncer.touch();
        wait_for(debouncer.deadline()).await;

        let elapsed = start.elapsed();
        assert!(elapsed >= AUTO_PREDICT_DELAY && elapsed < AUTO_PREDICT_DELAY + Duration::from_millis(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_restarts_delay() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();

        debouncer.touch();
        advance(Duration::from_millis(500)).await;
        debouncer.touch();
        wait_for(debouncer.deadline()).await;

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(1300) && elapsed < Duration::from_millis(1305));
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarmed_never_fires() {
        let mut debouncer = Debouncer::default();
        debouncer.touch();
        debouncer.cancel();

        assert!(!debouncer.is_armed());
        assert!(timeout(Duration::from_secs(10), wait_for(debouncer.deadline())).await.is_err());
    }
}
