use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{sleep_until, Instant};

/// A delay that can be frozen and resumed. While paused the remaining time
/// does not shrink; on resume the deadline moves forward by the pause length.
#[derive(Debug, Clone, Copy)]
pub struct StepTimer {
    remaining: Duration,
    running_since: Option<Instant>,
}

impl StepTimer {
    pub fn start(duration: Duration) -> Self {
        Self {
            remaining: duration,
            running_since: Some(Instant::now()),
        }
    }

    pub fn is_paused(&self) -> bool {
        self.running_since.is_none()
    }

    /// Deadline of a running timer; None while paused.
    pub fn deadline(&self) -> Option<Instant> {
        self.running_since.map(|since| since + self.remaining)
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        match self.running_since {
            Some(since) => self.remaining.saturating_sub(now.saturating_duration_since(since)),
            None => self.remaining,
        }
    }

    pub fn pause(&mut self, now: Instant) {
        if self.running_since.is_some() {
            self.remaining = self.remaining(now);
            self.running_since = None;
        }
    }

    pub fn resume(&mut self, now: Instant) {
        if self.running_since.is_none() {
            self.running_since = Some(now);
        }
    }
}

/// Sleeps for `duration` of unpaused time, following the pause flag.
/// If the flag's sender goes away the remaining time runs out unpaused.
pub async fn pausable_sleep(duration: Duration, mut paused: watch::Receiver<bool>) {
    let mut timer = StepTimer::start(duration);
    let mut flag_open = true;

    loop {
        if flag_open && *paused.borrow_and_update() {
            timer.pause(Instant::now());
        } else {
            timer.resume(Instant::now());
        }

        match timer.deadline() {
            Some(deadline) if flag_open => {
                tokio::select! {
                    _ = sleep_until(deadline) => return,
                    changed = paused.changed() => {
                        if changed.is_err() {
                            flag_open = false;
                        }
                    }
                }
            }
            Some(deadline) => {
                sleep_until(deadline).await;
                return;
            }
            None => {
                if paused.changed().await.is_err() {
                    flag_open = false;
                }
            }
        }
    }
}
