use std::collections::HashMap;
use std::time::Instant;

/// Observer for analysis-loop events.
///
/// Use cases report through this instead of printing, so the CLI, a server
/// or a test can each decide what to keep.
pub trait PipelineLogger: Send {
    /// Report stream progress in frames read.
    fn progress(&mut self, current: usize, total: usize);

    /// Record how long a named stage took for one cycle.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a per-cycle value (face count, brightness, ...).
    fn metric(&mut self, name: &str, value: f64);

    /// Record the crowd emotion label a cycle settled on.
    fn emotion(&mut self, label: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards everything. Used for single-image runs and in tests.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn emotion(&mut self, _label: &str) {}
}

/// Collects stage timings, metrics and the crowd emotion tally, and logs a
/// summary when the run ends.
///
/// Progress lines are logged every `throttle_frames` frames.
pub struct StdoutPipelineLogger {
    throttle_frames: usize,
    timings: HashMap<String, Vec<f64>>,
    metrics: HashMap<String, Vec<f64>>,
    emotions: Vec<(String, usize)>,
    start_time: Instant,
    cycles: usize,
}

impl StdoutPipelineLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: HashMap::new(),
            metrics: HashMap::new(),
            emotions: Vec::new(),
            start_time: Instant::now(),
            cycles: 0,
        }
    }

    /// Returns the formatted summary, or `None` if no cycle completed.
    pub fn summary_string(&self) -> Option<String> {
        if self.cycles == 0 {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mut lines = vec![format!(
            "Crowd mood summary ({} cycles, {:.1}s):",
            self.cycles,
            elapsed_ms / 1000.0
        )];

        let tally: Vec<String> = self
            .emotions
            .iter()
            .map(|(label, count)| format!("{label} {count}"))
            .collect();
        lines.push(format!("  emotions: {}", tally.join(", ")));

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = total_ms / durations.len().max(1) as f64;
            lines.push(format!(
                "  {stage:10}: avg {avg_ms:6.1}ms  total {total_ms:7.0}ms"
            ));
        }

        let mut names: Vec<_> = self.metrics.keys().collect();
        names.sort();
        for name in names {
            let values = &self.metrics[name];
            let avg = values.iter().sum::<f64>() / values.len().max(1) as f64;
            lines.push(format!("  {name}: avg {avg:.1}"));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(|v| v.as_slice())
    }

    /// Emotion label counts in first-seen order.
    pub fn emotion_tally(&self) -> &[(String, usize)] {
        &self.emotions
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(100)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        if current % self.throttle_frames != 0 {
            return;
        }
        if total > 0 {
            let pct = current as f64 / total as f64 * 100.0;
            log::info!("Read {current}/{total} frames ({pct:.1}%)");
        } else {
            log::info!("Read {current} frames");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    fn emotion(&mut self, label: &str) {
        self.cycles += 1;
        match self.emotions.iter_mut().find(|(l, _)| l == label) {
            Some((_, count)) => *count += 1,
            None => self.emotions.push((label.to_string(), 1)),
        }
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
