//! Crowd mood analysis: per-frame image quality checks, adaptive
//! preprocessing, face emotion aggregation, feedback classification and
//! throttled alerts.

pub mod config;
pub mod emotion;
pub mod feedback;
pub mod notification;
pub mod pipeline;
pub mod preprocessing;
pub mod quality;
pub mod shared;
pub mod video;
