//! Scoring weights and acceptance thresholds.
//!
//! The defaults reproduce the tuned values this matcher shipped with; all
//! of them are overridable through configuration rather than re-derived.

use serde::{Deserialize, Serialize};

/// Per-signal weights for the text scoring sum. Signals are normalized to
/// [0, 1] before weighting and summed, not multiplied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverWeights {
    /// Exact normalized-text equality.
    pub exact_match: f64,
    /// Substring containment in either direction.
    pub contains_match: f64,
    /// Token-set Jaccard similarity.
    pub token_jaccard: f64,
    /// Token overlap coefficient (partial-overlap variant).
    pub partial_overlap: f64,
    pub clickable: f64,
    pub visible: f64,
    pub interactive: f64,
    /// Closeness of the element's vertical center to the viewport center.
    pub viewport_position: f64,
    /// Accessible-label agreement; generic interactive roles earn
    /// [`Self::generic_role_credit`] of it.
    pub aria_label: f64,
    pub generic_role_credit: f64,
}

impl Default for ResolverWeights {
    fn default() -> Self {
        Self {
            exact_match: 0.4,
            contains_match: 0.2,
            token_jaccard: 0.2,
            partial_overlap: 0.1,
            clickable: 0.3,
            visible: 0.2,
            interactive: 0.2,
            viewport_position: 0.1,
            aria_label: 0.2,
            generic_role_credit: 0.5,
        }
    }
}

/// Resolver thresholds and fusion blend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub weights: ResolverWeights,

    /// Minimum weighted-sum score the text strategy accepts.
    pub text_accept_threshold: f64,

    /// Minimum fused score the visual strategy accepts. Lower than the
    /// text threshold: the detector-derived signal is weaker.
    pub visual_accept_threshold: f64,

    /// Detections below this confidence are ignored entirely.
    pub detection_confidence_floor: f64,

    /// Fusion blend: `total = text_weight * text + visual_weight * iou`.
    pub fusion_text_weight: f64,
    pub fusion_visual_weight: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            weights: ResolverWeights::default(),
            text_accept_threshold: 0.6,
            visual_accept_threshold: 0.5,
            detection_confidence_floor: 0.7,
            fusion_text_weight: 0.7,
            fusion_visual_weight: 0.3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_shipped_tuning() {
        let config = ResolverConfig::default();
        assert_eq!(config.text_accept_threshold, 0.6);
        assert_eq!(config.visual_accept_threshold, 0.5);
        assert_eq!(config.detection_confidence_floor, 0.7);
        assert_eq!(config.weights.exact_match, 0.4);
        assert_eq!(
            config.fusion_text_weight + config.fusion_visual_weight,
            1.0
        );
    }

    #[test]
    fn test_partial_config_deserializes_over_defaults() {
        let config: ResolverConfig =
            serde_json::from_str(r#"{ "text_accept_threshold": 0.75 }"#).unwrap();
        assert_eq!(config.text_accept_threshold, 0.75);
        assert_eq!(config.visual_accept_threshold, 0.5);
    }
}
