use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Whether the next attempt would be let through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThrottlePhase {
    Ready,
    Cooling,
}

/// The only state carried from one cycle to the next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThrottleState {
    /// Clock reading of the last emitted notification, if any.
    pub last_sent: Option<Duration>,
    pub interval: Duration,
}

/// Cooldown gate: at most one notification per interval, the rest dropped.
#[derive(Clone, Debug)]
pub struct NotificationThrottler {
    state: ThrottleState,
}

impl NotificationThrottler {
    pub fn new(interval: Duration) -> Self {
        Self {
            state: ThrottleState {
                last_sent: None,
                interval,
            },
        }
    }

    pub fn state(&self) -> ThrottleState {
        self.state
    }

    /// Ready once strictly more than `interval` has passed since the last
    /// emission. A throttler that never emitted is Ready.
    pub fn phase(&self, now: Duration) -> ThrottlePhase {
        match self.state.last_sent {
            Some(last) if now.saturating_sub(last) <= self.state.interval => ThrottlePhase::Cooling,
            _ => ThrottlePhase::Ready,
        }
    }

    /// Returns true and records `now` when Ready; otherwise leaves the state
    /// untouched and returns false.
    pub fn should_notify(&mut self, now: Duration) -> bool {
        if self.phase(now) == ThrottlePhase::Cooling {
            return false;
        }
        self.state.last_sent = Some(now);
        true
    }
}

/// Mutex-guarded throttler for callers on several threads.
#[derive(Clone, Debug)]
pub struct SharedThrottler {
    inner: Arc<Mutex<NotificationThrottler>>,
}

impl SharedThrottler {
    pub fn new(throttler: NotificationThrottler) -> Self {
        Self {
            inner: Arc::new(Mutex::new(throttler)),
        }
    }

    pub fn should_notify(&self, now: Duration) -> bool {
        // The guarded value is a timestamp; a poisoned lock still holds a
        // usable one.
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .should_notify(now)
    }

    pub fn state(&self) -> ThrottleState {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).state()
    }
}
