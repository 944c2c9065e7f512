use crate::notification::domain::alert_sink::{Alert, AlertSink};

/// Writes alerts to the log instead of the desktop.
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn send(&self, alert: &Alert) -> Result<(), Box<dyn std::error::Error>> {
        log::info!("{}: {}", alert.title, alert.message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_send_always_succeeds() {
        let alert = Alert {
            title: "Alert".into(),
            message: "No faces detected.".into(),
            timeout: Duration::from_secs(5),
        };
        assert!(LogAlertSink.send(&alert).is_ok());
    }
}
