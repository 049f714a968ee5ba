use odal::Config;
use serde::{Deserialize, Serialize};

use crate::anchor::{validate_anchors, AnchorShape};
use crate::assign::{validate_threshold, ConflictPolicy, MaskWeights, DEFAULT_THRESHOLD};
use crate::overlap::OverlapGate;

/// Configuration of the target assignment, read from `targets.toml`.
///
/// ```toml
/// threshold = 0.5
/// num_classes = 20
/// anchors = [[1.3221, 1.73145], [3.19275, 4.00944]]
/// conflict_policy = "last_write_wins"
/// overlap_gate = "both_axes_negative"
///
/// [weights]
/// background = 0.1
/// positive = 5.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TargetConfig {
    /// IOU a best match has to exceed to become a positive.
    pub threshold: f32,
    /// Number of classes predicted by the detector.
    pub num_classes: usize,
    /// Anchor sizes in grid cells, as `[width, height]` pairs.
    pub anchors: Vec<AnchorShape>,
    pub weights: MaskWeights,
    pub conflict_policy: ConflictPolicy,
    pub overlap_gate: OverlapGate,
}

impl Default for TargetConfig {
    fn default() -> Self {
        TargetConfig {
            threshold: DEFAULT_THRESHOLD,
            num_classes: 20,
            anchors: AnchorShape::voc(),
            weights: MaskWeights::default(),
            conflict_policy: ConflictPolicy::default(),
            overlap_gate: OverlapGate::default(),
        }
    }
}

impl Config for TargetConfig {
    const PATH: &'static str = "targets.toml";

    fn validate(&self) -> Result<(), String> {
        validate_threshold(self.threshold).map_err(|error| error.to_string())?;

        if self.num_classes == 0 {
            return Err("num_classes must be at least 1".to_string());
        }

        if self.anchors.is_empty() {
            return Err("at least one anchor is required".to_string());
        }
        validate_anchors(&self.anchors).map_err(|error| error.to_string())?;

        let MaskWeights {
            background,
            positive,
        } = self.weights;
        if !(background >= 0.0 && positive >= 0.0) {
            return Err(format!(
                "mask weights must be non-negative, got background {background} \
                 and positive {positive}"
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(TargetConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_file_uses_defaults() {
        let config: TargetConfig = toml::from_str(
            r#"
            threshold = 0.6
            overlap_gate = "any_axis_negative"
            "#,
        )
        .unwrap();

        assert_eq!(config.threshold, 0.6);
        assert_eq!(config.overlap_gate, OverlapGate::AnyAxisNegative);
        assert_eq!(config.anchors, AnchorShape::voc());
        assert_eq!(config.weights, MaskWeights::default());
    }

    #[test]
    fn invalid_values_are_rejected() {
        for threshold in [1.5, -0.1, f32::NAN] {
            let config = TargetConfig {
                threshold,
                ..TargetConfig::default()
            };
            assert!(config.validate().is_err());
        }

        let config = TargetConfig {
            anchors: vec![AnchorShape::new(1.0, 0.0)],
            ..TargetConfig::default()
        };
        assert!(config.validate().is_err());

        let config = TargetConfig {
            anchors: vec![],
            ..TargetConfig::default()
        };
        assert!(config.validate().is_err());

        let config = TargetConfig {
            weights: MaskWeights {
                background: -0.1,
                positive: 5.0,
            },
            ..TargetConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_with_overlay() {
        let dir = tempfile::tempdir().unwrap();
        let overlay = dir.path().join("overlay");
        fs::create_dir_all(&overlay).unwrap();
        fs::write(
            dir.path().join(TargetConfig::PATH),
            "threshold = 0.5\nanchors = [[1.0, 2.0]]\n\n\
             [weights]\nbackground = 0.1\npositive = 5.0\n",
        )
        .unwrap();
        fs::write(
            overlay.join(TargetConfig::PATH),
            "conflict_policy = \"highest_iou_wins\"\n\n[weights]\npositive = 2.0\n",
        )
        .unwrap();

        let config = TargetConfig::load_with_overlay(dir.path(), &overlay).unwrap();

        assert_eq!(config.anchors, vec![AnchorShape::new(1.0, 2.0)]);
        assert_eq!(config.conflict_policy, ConflictPolicy::HighestIouWins);
        assert_eq!(
            config.weights,
            MaskWeights {
                background: 0.1,
                positive: 2.0
            }
        );
    }
}
