use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crowdmood_core::config::MoodConfig;
use crowdmood_core::emotion::domain::emotion_aggregator::FaceVerdict;
use crowdmood_core::emotion::domain::emotion_detector::EmotionDetector;
use crowdmood_core::emotion::infrastructure::detector_factory::create_onnx_detector;
use crowdmood_core::emotion::infrastructure::replay_emotion_detector::{
    ReplayEmotionDetector, ReplayMode,
};
use crowdmood_core::notification::domain::alert_sink::AlertSink;
use crowdmood_core::notification::domain::clock::MonotonicClock;
use crowdmood_core::notification::domain::notification_throttler::{
    NotificationThrottler, SharedThrottler,
};
use crowdmood_core::notification::domain::notifier::Notifier;
use crowdmood_core::notification::infrastructure::desktop_alert_sink::DesktopAlertSink;
use crowdmood_core::notification::infrastructure::log_alert_sink::LogAlertSink;
use crowdmood_core::notification::infrastructure::threaded_alert_sink::ThreadedAlertSink;
use crowdmood_core::pipeline::analyze_stream_use_case::{AnalyzeStreamUseCase, StreamOptions};
use crowdmood_core::pipeline::crowd_mood_use_case::CrowdMoodUseCase;
use crowdmood_core::pipeline::cycle_report::CycleReport;
use crowdmood_core::pipeline::detector_failure_policy::DetectorFailurePolicy;
use crowdmood_core::pipeline::pipeline_logger::{
    NullPipelineLogger, PipelineLogger, StdoutPipelineLogger,
};
use crowdmood_core::preprocessing::infrastructure::preprocessor_factory::create_preprocessor;
use crowdmood_core::shared::constants::IMAGE_EXTENSIONS;
use crowdmood_core::shared::model_resolver::ProgressFn;
use crowdmood_core::video::domain::video_reader::VideoReader;
use crowdmood_core::video::infrastructure::ffmpeg_reader::FfmpegReader;
use crowdmood_core::video::infrastructure::image_decoder::decode_base64_image;
use crowdmood_core::video::infrastructure::image_file_reader::ImageFileReader;

/// Live crowd mood feedback from images, videos and cameras.
#[derive(Parser)]
#[command(name = "crowdmood")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze one image and print the cycle report as JSON.
    Image {
        /// Image file, or `-` for stdin with --base64.
        path: PathBuf,

        /// The input holds a base64 (or data URL) encoded image.
        #[arg(long)]
        base64: bool,

        #[command(flatten)]
        common: CommonArgs,
    },
    /// Analyze a video file or capture device (`/dev/video0`,
    /// `avfoundation:0`, `dshow:video=Camera`).
    Watch {
        input: PathBuf,

        /// Analyze every Nth frame.
        #[arg(long, default_value = "1")]
        every: usize,

        /// Flip frames horizontally, as a selfie camera preview does.
        #[arg(long)]
        mirror: bool,

        /// Stop after this many analyzed frames.
        #[arg(long)]
        max_cycles: Option<usize>,

        /// Print each cycle report as a JSON line on stdout.
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        common: CommonArgs,
    },
    /// Write the default configuration file.
    InitConfig {
        /// Destination (defaults to the user config directory).
        path: Option<PathBuf>,

        /// Replace an existing file.
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Configuration file (JSON). Defaults to the user config directory.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replay recorded face observations (JSON) instead of running the
    /// ONNX models.
    #[arg(long)]
    observations: Option<PathBuf>,

    /// Abort when the emotion detector fails instead of reporting no faces.
    #[arg(long)]
    strict: bool,

    /// Feed frames to the detector without adaptive preprocessing.
    #[arg(long)]
    no_preprocess: bool,

    /// Minimum seconds between alerts.
    #[arg(long)]
    interval: Option<f64>,

    /// Where alerts go.
    #[arg(long, default_value = "log", value_parser = ["log", "desktop"])]
    alert: String,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long)]
    confidence: Option<f32>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    match Cli::parse().command {
        Command::Image {
            path,
            base64,
            common,
        } => run_image(&path, base64, &common),
        Command::Watch {
            input,
            every,
            mirror,
            max_cycles,
            json,
            common,
        } => {
            let options = StreamOptions {
                every,
                mirror,
                max_cycles,
            };
            run_watch(&input, options, json, &common)
        }
        Command::InitConfig { path, force } => run_init_config(path, force),
    }
}

fn run_image(path: &Path, base64: bool, common: &CommonArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(common)?;
    let replay = ReplayMode::ByFrameIndex;

    if base64 {
        let payload = read_text(path)?;
        let frame = decode_base64_image(&payload)?;
        let mut cycle = build_cycle(&config, common, replay, false)?;
        let report = cycle.run_cycle(frame)?;
        return print_report(&report);
    }

    if !path.exists() {
        return Err(format!("Input file not found: {}", path.display()).into());
    }
    let cycle = build_cycle(&config, common, replay, false)?;
    let mut use_case = AnalyzeStreamUseCase::new(
        Box::new(ImageFileReader::new()),
        cycle,
        StreamOptions::default(),
    );
    let mut printed = Ok(());
    use_case.execute(path, |report| {
        if printed.is_ok() {
            printed = print_report(report);
        }
    })?;
    printed
}

fn run_watch(
    input: &Path,
    options: StreamOptions,
    json: bool,
    common: &CommonArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(common)?;
    let cycle = build_cycle(&config, common, ReplayMode::Cycle, true)?;
    let mut use_case = AnalyzeStreamUseCase::new(open_reader(input), cycle, options);

    let summary = use_case.execute(input, |report| {
        log::info!(
            "Frame {}: {} face(s), crowd emotion {}: {}",
            report.frame_index,
            report.faces.len(),
            report.emotion,
            report.feedback
        );
        if !report.faces.is_empty() {
            let captions: Vec<String> = report.faces.iter().map(FaceVerdict::caption).collect();
            log::debug!("Faces: {}", captions.join(", "));
        }
        if json {
            match serde_json::to_string(report) {
                Ok(line) => println!("{line}"),
                Err(e) => log::warn!("Could not serialize report: {e}"),
            }
        }
    })?;

    log::info!(
        "Done: {} frame(s) read, {} analyzed, {} alert(s)",
        summary.frames_read,
        summary.cycles,
        summary.notifications
    );
    Ok(())
}

fn run_init_config(path: Option<PathBuf>, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = path
        .or_else(MoodConfig::default_path)
        .ok_or("could not determine config directory")?;
    if path.exists() && !force {
        return Err(format!("{} already exists (use --force to replace it)", path.display()).into());
    }
    MoodConfig::default().save(&path)?;
    eprintln!("Wrote {}", path.display());
    Ok(())
}

/// Loads the config file and applies command-line overrides on top.
fn load_config(common: &CommonArgs) -> Result<MoodConfig, Box<dyn std::error::Error>> {
    let mut config = MoodConfig::load_or_default(common.config.as_deref())?;
    if common.no_preprocess {
        config.preprocessing.enabled = false;
    }
    if common.strict {
        config.detector.failure_policy = DetectorFailurePolicy::Strict;
    }
    if let Some(interval) = common.interval {
        config.notification.interval_secs = interval;
    }
    if let Some(confidence) = common.confidence {
        config.detector.confidence = confidence;
    }
    config.validate()?;
    Ok(config)
}

fn build_cycle(
    config: &MoodConfig,
    common: &CommonArgs,
    replay: ReplayMode,
    log_progress: bool,
) -> Result<CrowdMoodUseCase, Box<dyn std::error::Error>> {
    let preprocessor = config
        .preprocessing
        .enabled
        .then(|| create_preprocessor(&config.preprocessing));

    let logger: Box<dyn PipelineLogger> = if log_progress {
        Box::new(StdoutPipelineLogger::default())
    } else {
        Box::new(NullPipelineLogger)
    };

    Ok(CrowdMoodUseCase::new(
        preprocessor,
        build_detector(config, common, replay)?,
        Some(build_notifier(config, &common.alert)?),
        config.detector.failure_policy,
        logger,
    ))
}

fn build_detector(
    config: &MoodConfig,
    common: &CommonArgs,
    replay: ReplayMode,
) -> Result<Box<dyn EmotionDetector>, Box<dyn std::error::Error>> {
    if let Some(path) = &common.observations {
        return Ok(Box::new(ReplayEmotionDetector::from_file(path, replay)?));
    }

    let downloaded_any = Arc::new(AtomicBool::new(false));
    let detector = create_onnx_detector(f64::from(config.detector.confidence), None, |name| {
        Some(model_progress(name, downloaded_any.clone()))
    });
    if downloaded_any.load(Ordering::Relaxed) {
        eprintln!();
    }
    Ok(Box::new(detector?))
}

fn build_notifier(config: &MoodConfig, alert: &str) -> Result<Notifier, Box<dyn std::error::Error>> {
    let sink: Box<dyn AlertSink> = match alert {
        "desktop" => Box::new(DesktopAlertSink::new(config.notification.alert_title.clone())),
        _ => Box::new(LogAlertSink),
    };
    let interval = config.notification.interval()?;
    Ok(Notifier::new(
        SharedThrottler::new(NotificationThrottler::new(interval)),
        Arc::new(ThreadedAlertSink::new(sink)),
        Arc::new(MonotonicClock::new()),
        config.notification.alert_title.clone(),
        Duration::from_secs(config.notification.alert_timeout_secs),
    ))
}

fn read_text(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    fs::read_to_string(path).map_err(|e| format!("failed to read {}: {e}", path.display()).into())
}

fn print_report(report: &CycleReport) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn open_reader(input: &Path) -> Box<dyn VideoReader> {
    if is_image(input) {
        Box::new(ImageFileReader::new())
    } else {
        Box::new(FfmpegReader::new())
    }
}

/// Progress reporter for one model download; raises `downloaded_any` once
/// bytes arrive so the caller knows to end the progress line.
fn model_progress(name: &str, downloaded_any: Arc<AtomicBool>) -> ProgressFn {
    let name = name.to_string();
    Box::new(move |downloaded, total| {
        downloaded_any.store(true, Ordering::Relaxed);
        download_progress(&name, downloaded, total)
    })
}

fn download_progress(name: &str, downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading {name}... {pct}%");
    } else {
        eprint!("\rDownloading {name}... {downloaded} bytes");
    }
}
