use std::time::Duration;

/// A desktop-style notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
    /// How long the alert should stay on screen.
    pub timeout: Duration,
}

/// Domain interface for delivering alerts.
///
/// Delivery is fire-and-forget from the pipeline's point of view: callers
/// log a returned error and carry on.
pub trait AlertSink: Send + Sync {
    fn send(&self, alert: &Alert) -> Result<(), Box<dyn std::error::Error>>;
}
