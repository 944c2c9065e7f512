use serde::{Deserialize, Serialize};

use crate::quality::domain::quality_metrics::QualityMetrics;
use crate::shared::constants::{BRIGHTNESS_THRESHOLD, CONTRAST_THRESHOLD, NOISE_THRESHOLD};

/// One enhancement the preprocessor can apply, in application order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PreprocessStep {
    Gamma,
    LocalContrast,
    Denoise,
}

/// Which enhancements a frame needs. Each gate is independent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PreprocessPlan {
    pub gamma: bool,
    pub local_contrast: bool,
    pub denoise: bool,
}

impl PreprocessPlan {
    pub fn is_identity(&self) -> bool {
        !(self.gamma || self.local_contrast || self.denoise)
    }

    /// Enabled steps in the order they must run: gamma, local contrast,
    /// denoise.
    pub fn steps(&self) -> Vec<PreprocessStep> {
        [
            (self.gamma, PreprocessStep::Gamma),
            (self.local_contrast, PreprocessStep::LocalContrast),
            (self.denoise, PreprocessStep::Denoise),
        ]
        .into_iter()
        .filter_map(|(enabled, step)| enabled.then_some(step))
        .collect()
    }
}

/// Fixed-threshold heuristic deciding which enhancements to apply.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PreprocessPolicy {
    pub brightness_threshold: f64,
    pub contrast_threshold: f64,
    pub noise_threshold: f64,
}

impl Default for PreprocessPolicy {
    fn default() -> Self {
        Self {
            brightness_threshold: BRIGHTNESS_THRESHOLD,
            contrast_threshold: CONTRAST_THRESHOLD,
            noise_threshold: NOISE_THRESHOLD,
        }
    }
}

impl PreprocessPolicy {
    pub fn plan(&self, metrics: &QualityMetrics) -> PreprocessPlan {
        PreprocessPlan {
            gamma: metrics.brightness < self.brightness_threshold,
            local_contrast: metrics.contrast < self.contrast_threshold,
            denoise: metrics.noise_estimate > self.noise_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn metrics(brightness: f64, contrast: f64, noise_estimate: f64) -> QualityMetrics {
        QualityMetrics {
            brightness,
            contrast,
            noise_estimate,
        }
    }

    #[rstest]
    #[case(60.0, 40.0, 1000.0)]
    #[case(200.0, 45.0, 999.0)]
    #[case(128.0, 100.0, 0.0)]
    fn test_non_triggering_metrics_plan_nothing(
        #[case] brightness: f64,
        #[case] contrast: f64,
        #[case] noise: f64,
    ) {
        let plan = PreprocessPolicy::default().plan(&metrics(brightness, contrast, noise));
        assert!(plan.is_identity());
        assert!(plan.steps().is_empty());
    }

    #[test]
    fn test_dark_frame_plans_gamma_only() {
        let plan = PreprocessPolicy::default().plan(&metrics(59.9, 50.0, 500.0));
        assert_eq!(plan.steps(), vec![PreprocessStep::Gamma]);
    }

    #[test]
    fn test_flat_frame_plans_local_contrast_only() {
        let plan = PreprocessPolicy::default().plan(&metrics(120.0, 39.9, 500.0));
        assert_eq!(plan.steps(), vec![PreprocessStep::LocalContrast]);
    }

    #[test]
    fn test_busy_frame_plans_denoise_only() {
        let plan = PreprocessPolicy::default().plan(&metrics(120.0, 50.0, 1000.1));
        assert_eq!(plan.steps(), vec![PreprocessStep::Denoise]);
    }

    #[test]
    fn test_gates_compose_in_fixed_order() {
        // Dark, flat, and (with a lowered noise gate) noisy all at once.
        let policy = PreprocessPolicy {
            noise_threshold: 10.0,
            ..PreprocessPolicy::default()
        };
        let plan = policy.plan(&metrics(20.0, 30.0, 900.0));
        assert_eq!(
            plan.steps(),
            vec![
                PreprocessStep::Gamma,
                PreprocessStep::LocalContrast,
                PreprocessStep::Denoise
            ]
        );
    }
}
