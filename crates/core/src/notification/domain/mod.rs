pub mod alert_sink;
pub mod clock;
pub mod notification_throttler;
pub mod notifier;
