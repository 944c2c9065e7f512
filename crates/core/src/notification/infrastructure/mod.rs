pub mod desktop_alert_sink;
pub mod log_alert_sink;
pub mod threaded_alert_sink;
