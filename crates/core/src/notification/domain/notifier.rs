use std::sync::Arc;
use std::time::Duration;

use super::alert_sink::{Alert, AlertSink};
use super::clock::Clock;
use super::notification_throttler::SharedThrottler;

/// Sends feedback to an alert sink, at most once per throttle interval.
#[derive(Clone)]
pub struct Notifier {
    throttler: SharedThrottler,
    sink: Arc<dyn AlertSink>,
    clock: Arc<dyn Clock>,
    title: String,
    timeout: Duration,
}

impl Notifier {
    pub fn new(
        throttler: SharedThrottler,
        sink: Arc<dyn AlertSink>,
        clock: Arc<dyn Clock>,
        title: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            throttler,
            sink,
            clock,
            title: title.into(),
            timeout,
        }
    }

    /// Returns whether the throttler let the message through. A sink failure
    /// is logged and still counts as sent.
    pub fn notify(&self, message: &str) -> bool {
        let now = self.clock.now();
        if !self.throttler.should_notify(now) {
            log::debug!("Alert suppressed at {:.3}s: {message}", now.as_secs_f64());
            return false;
        }

        let alert = Alert {
            title: self.title.clone(),
            message: message.to_string(),
            timeout: self.timeout,
        };
        if let Err(e) = self.sink.send(&alert) {
            log::warn!("Failed to deliver alert: {e}");
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::domain::clock::ManualClock;
    use crate::notification::domain::notification_throttler::NotificationThrottler;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<Alert>>,
    }

    impl AlertSink for RecordingSink {
        fn send(&self, alert: &Alert) -> Result<(), Box<dyn std::error::Error>> {
            self.sent.lock().unwrap().push(alert.clone());
            Ok(())
        }
    }

    struct FailingSink;

    impl AlertSink for FailingSink {
        fn send(&self, _alert: &Alert) -> Result<(), Box<dyn std::error::Error>> {
            Err("no notification daemon".into())
        }
    }

    fn notifier(sink: Arc<dyn AlertSink>, clock: Arc<ManualClock>) -> Notifier {
        Notifier::new(
            SharedThrottler::new(NotificationThrottler::new(Duration::from_secs(10))),
            sink,
            clock,
            "Alert",
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_sends_then_suppresses() {
        let sink = Arc::new(RecordingSink::default());
        let clock = Arc::new(ManualClock::default());
        let notifier = notifier(sink.clone(), clock.clone());

        assert!(notifier.notify("first"));
        clock.advance(Duration::from_secs(1));
        assert!(!notifier.notify("second"));
        clock.advance(Duration::from_secs(10));
        assert!(notifier.notify("third"));

        let sent = sink.sent.lock().unwrap();
        let messages: Vec<&str> = sent.iter().map(|a| a.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "third"]);
        assert_eq!(sent[0].title, "Alert");
        assert_eq!(sent[0].timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_sink_failure_is_swallowed() {
        let clock = Arc::new(ManualClock::default());
        let notifier = notifier(Arc::new(FailingSink), clock.clone());
        assert!(notifier.notify("hello"));
        clock.advance(Duration::from_secs(2));
        assert!(!notifier.notify("hello"));
    }

    #[test]
    fn test_clones_share_the_cooldown() {
        let sink = Arc::new(RecordingSink::default());
        let clock = Arc::new(ManualClock::default());
        let a = notifier(sink.clone(), clock);
        let b = a.clone();
        assert!(a.notify("from a"));
        assert!(!b.notify("from b"));
        assert_eq!(sink.sent.lock().unwrap().len(), 1);
    }
}
