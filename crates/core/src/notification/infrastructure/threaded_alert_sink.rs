use std::thread::JoinHandle;

use crossbeam_channel::{Sender, TrySendError};

use crate::notification::domain::alert_sink::{Alert, AlertSink};

const DEFAULT_QUEUE_CAPACITY: usize = 4;

/// Delivers alerts on a worker thread so a slow notification tool never
/// stalls the frame loop.
///
/// Alerts that arrive while the queue is full are dropped. Delivery errors
/// are logged on the worker. Dropping the sink drains the queue and joins
/// the worker.
pub struct ThreadedAlertSink {
    sender: Option<Sender<Alert>>,
    worker: Option<JoinHandle<()>>,
}

impl ThreadedAlertSink {
    pub fn new(inner: Box<dyn AlertSink>) -> Self {
        Self::with_capacity(inner, DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_capacity(inner: Box<dyn AlertSink>, capacity: usize) -> Self {
        let (sender, receiver) = crossbeam_channel::bounded::<Alert>(capacity.max(1));
        let worker = std::thread::spawn(move || {
            for alert in receiver {
                if let Err(e) = inner.send(&alert) {
                    log::warn!("Failed to deliver alert: {e}");
                }
            }
        });
        Self {
            sender: Some(sender),
            worker: Some(worker),
        }
    }
}

impl AlertSink for ThreadedAlertSink {
    fn send(&self, alert: &Alert) -> Result<(), Box<dyn std::error::Error>> {
        let sender = self.sender.as_ref().ok_or("alert worker stopped")?;
        match sender.try_send(alert.clone()) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(dropped)) => {
                log::warn!("Alert queue full, dropping: {}", dropped.message);
                Ok(())
            }
            Err(TrySendError::Disconnected(_)) => Err("alert worker stopped".into()),
        }
    }
}

impl Drop for ThreadedAlertSink {
    fn drop(&mut self) {
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("Alert worker panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    struct RecordingSink {
        sent: Arc<Mutex<Vec<String>>>,
    }

    impl AlertSink for RecordingSink {
        fn send(&self, alert: &Alert) -> Result<(), Box<dyn std::error::Error>> {
            self.sent.lock().unwrap().push(alert.message.clone());
            Ok(())
        }
    }

    struct FailingSink;

    impl AlertSink for FailingSink {
        fn send(&self, _alert: &Alert) -> Result<(), Box<dyn std::error::Error>> {
            Err("boom".into())
        }
    }

    fn alert(message: &str) -> Alert {
        Alert {
            title: "Alert".into(),
            message: message.into(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_delivers_in_order_before_drop_returns() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let sink = ThreadedAlertSink::with_capacity(
            Box::new(RecordingSink { sent: sent.clone() }),
            16,
        );
        for m in ["a", "b", "c"] {
            sink.send(&alert(m)).unwrap();
        }
        drop(sink);
        assert_eq!(*sent.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_inner_failure_is_not_returned() {
        let sink = ThreadedAlertSink::new(Box::new(FailingSink));
        assert!(sink.send(&alert("x")).is_ok());
    }
}
