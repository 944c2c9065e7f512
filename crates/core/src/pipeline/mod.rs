pub mod analyze_stream_use_case;
pub mod crowd_mood_use_case;
pub mod cycle_report;
pub mod detector_failure_policy;
pub mod pipeline_logger;
