pub mod quality_metrics;
