use std::process::Command;

use crate::notification::domain::alert_sink::{Alert, AlertSink};

/// Shows alerts with the platform's notification tool: `notify-send` on
/// Linux, `osascript` on macOS and a PowerShell toast on Windows.
pub struct DesktopAlertSink {
    app_name: String,
}

impl DesktopAlertSink {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }
}

impl AlertSink for DesktopAlertSink {
    fn send(&self, alert: &Alert) -> Result<(), Box<dyn std::error::Error>> {
        let (program, args) = platform_command(std::env::consts::OS, &self.app_name, alert);
        let output = Command::new(program)
            .args(&args)
            .output()
            .map_err(|e| format!("failed to run {program}: {e}"))?;
        if !output.status.success() {
            return Err(format!(
                "{program} exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )
            .into());
        }
        Ok(())
    }
}

fn platform_command(os: &str, app_name: &str, alert: &Alert) -> (&'static str, Vec<String>) {
    match os {
        "macos" => (
            "osascript",
            vec![
                "-e".into(),
                format!(
                    "display notification \"{}\" with title \"{}\"",
                    applescript_escape(&alert.message),
                    applescript_escape(&alert.title)
                ),
            ],
        ),
        "windows" => (
            "powershell",
            vec![
                "-NoProfile".into(),
                "-Command".into(),
                toast_script(app_name, alert),
            ],
        ),
        _ => (
            "notify-send",
            vec![
                "--app-name".into(),
                app_name.into(),
                "--expire-time".into(),
                alert.timeout.as_millis().to_string(),
                alert.title.clone(),
                alert.message.clone(),
            ],
        ),
    }
}

fn applescript_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn powershell_escape(s: &str) -> String {
    s.replace('\'', "''")
}

fn toast_script(app_name: &str, alert: &Alert) -> String {
    format!(
        "[Windows.UI.Notifications.ToastNotificationManager, Windows.UI.Notifications, ContentType = WindowsRuntime] > $null; \
         $xml = [Windows.UI.Notifications.ToastNotificationManager]::GetTemplateContent([Windows.UI.Notifications.ToastTemplateType]::ToastText02); \
         $text = $xml.GetElementsByTagName('text'); \
         $text.Item(0).AppendChild($xml.CreateTextNode('{title}')) > $null; \
         $text.Item(1).AppendChild($xml.CreateTextNode('{message}')) > $null; \
         $toast = [Windows.UI.Notifications.ToastNotification]::new($xml); \
         $toast.ExpirationTime = [DateTimeOffset]::Now.AddSeconds({secs}); \
         [Windows.UI.Notifications.ToastNotificationManager]::CreateToastNotifier('{app}').Show($toast)",
        title = powershell_escape(&alert.title),
        message = powershell_escape(&alert.message),
        secs = alert.timeout.as_secs(),
        app = powershell_escape(app_name),
    )
}
