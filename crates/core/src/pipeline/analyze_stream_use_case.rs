use std::path::Path;

use crate::pipeline::crowd_mood_use_case::CrowdMoodUseCase;
use crate::pipeline::cycle_report::CycleReport;
use crate::video::domain::video_reader::VideoReader;

/// How frames of a stream are picked for analysis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamOptions {
    /// Analyze every Nth frame, starting with the first.
    pub every: usize,
    /// Flip frames left-right before analysis, as a selfie preview shows them.
    pub mirror: bool,
    /// Stop after this many analyzed frames.
    pub max_cycles: Option<usize>,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            every: 1,
            mirror: false,
            max_cycles: None,
        }
    }
}

/// Totals for a finished stream run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamSummary {
    pub frames_read: usize,
    pub cycles: usize,
    pub notifications: usize,
}

/// Runs crowd mood cycles over a video file or capture device.
pub struct AnalyzeStreamUseCase {
    reader: Box<dyn VideoReader>,
    cycle: CrowdMoodUseCase,
    options: StreamOptions,
}

impl AnalyzeStreamUseCase {
    pub fn new(reader: Box<dyn VideoReader>, cycle: CrowdMoodUseCase, options: StreamOptions) -> Self {
        Self {
            reader,
            cycle,
            options: StreamOptions {
                every: options.every.max(1),
                ..options
            },
        }
    }

    /// Reads `input` to the end (or `max_cycles`), handing each report to
    /// `on_report`. Invalid frames and, under the strict detector policy,
    /// detector failures end the run with an error.
    pub fn execute(
        &mut self,
        input: &Path,
        mut on_report: impl FnMut(&CycleReport),
    ) -> Result<StreamSummary, Box<dyn std::error::Error>> {
        let metadata = self.reader.open(input)?;
        log::info!(
            "Analyzing {} {} ({}x{}, {:.1} fps), every {} frame(s)",
            if metadata.is_live() { "live feed" } else { "file" },
            input.display(),
            metadata.width,
            metadata.height,
            metadata.fps,
            self.options.every
        );

        let mut summary = StreamSummary::default();
        let result = run_loop(
            self.reader.as_mut(),
            &mut self.cycle,
            &self.options,
            metadata.total_frames,
            &mut summary,
            &mut on_report,
        );
        self.reader.close();
        self.cycle.finish();
        result?;

        log::info!(
            "Analyzed {} of {} frames, {} alert(s) sent",
            summary.cycles,
            summary.frames_read,
            summary.notifications
        );
        Ok(summary)
    }
}

fn run_loop(
    reader: &mut dyn VideoReader,
    cycle: &mut CrowdMoodUseCase,
    options: &StreamOptions,
    total_frames: usize,
    summary: &mut StreamSummary,
    on_report: &mut dyn FnMut(&CycleReport),
) -> Result<(), Box<dyn std::error::Error>> {
    for frame in reader.frames() {
        let frame = frame?;
        summary.frames_read += 1;
        cycle.logger_mut().progress(summary.frames_read, total_frames);

        if frame.index() % options.every != 0 {
            continue;
        }
        let frame = if options.mirror {
            frame.mirrored()
        } else {
            frame
        };

        let report = cycle.run_cycle(frame)?;
        summary.cycles += 1;
        if report.notified {
            summary.notifications += 1;
        }
        on_report(&report);

        if options.max_cycles.is_some_and(|max| summary.cycles >= max) {
            break;
        }
    }
    Ok(())
}
