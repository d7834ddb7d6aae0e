//! The ordered resolution strategies.

use tracing::debug;

use crate::config::ResolverConfig;
use crate::iou::iou;
use crate::scoring::{normalize, score_element, text_similarity};
use crate::types::{ResolveContext, ScoredElement};

/// One pure resolution attempt. Strategies are tried in order until one
/// returns a hit.
pub trait ResolutionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn resolve(&self, ctx: &ResolveContext<'_>, config: &ResolverConfig) -> Option<ScoredElement>;
}

/// Weighted text scoring over all candidates; accepts above the text
/// threshold only.
#[derive(Debug, Default)]
pub struct TextStrategy;

impl ResolutionStrategy for TextStrategy {
    fn name(&self) -> &'static str {
        "text"
    }

    fn resolve(&self, ctx: &ResolveContext<'_>, config: &ResolverConfig) -> Option<ScoredElement> {
        let target = normalize(ctx.target);
        if target.is_empty() {
            return None;
        }

        let mut best: Option<ScoredElement> = None;
        for el in ctx.state.candidates() {
            let score = score_element(&target, el, &ctx.state.viewport, &config.weights);
            let replace = match &best {
                Some(current) => score.total > current.score,
                None => true,
            };
            if replace {
                best = Some(ScoredElement {
                    element: el.clone(),
                    score: score.total,
                    text_score: score.text,
                    visual_score: None,
                });
            }
        }

        let best = best?;
        if best.score > config.text_accept_threshold {
            Some(best)
        } else {
            debug!(
                target = ctx.target,
                best = best.score,
                threshold = config.text_accept_threshold,
                "text strategy best candidate below threshold"
            );
            None
        }
    }
}

/// Fuses plain text similarity with detector box overlap:
/// `total = text_weight * similarity + visual_weight * max IoU` over
/// detections above the confidence floor. Accepts above the (lower)
/// visual threshold. Yields nothing when no detections were gathered, so
/// the pipeline always falls through to [`TextStrategy`].
#[derive(Debug, Default)]
pub struct VisualFusionStrategy;

impl ResolutionStrategy for VisualFusionStrategy {
    fn name(&self) -> &'static str {
        "visual_fusion"
    }

    fn resolve(&self, ctx: &ResolveContext<'_>, config: &ResolverConfig) -> Option<ScoredElement> {
        let detections = ctx.detections?;
        let confident: Vec<_> = detections
            .iter()
            .filter(|d| d.confidence > config.detection_confidence_floor)
            .collect();
        if confident.is_empty() {
            debug!(
                total = detections.len(),
                floor = config.detection_confidence_floor,
                "no detection above the confidence floor"
            );
            return None;
        }

        let mut best: Option<ScoredElement> = None;
        for el in ctx.state.candidates() {
            let text = text_similarity(ctx.target, el.match_text());
            let corners = el.bounds.corners();
            let visual = confident
                .iter()
                .map(|d| iou(corners, d.bounds))
                .fold(0.0_f64, f64::max);
            let total =
                config.fusion_text_weight * text + config.fusion_visual_weight * visual;

            let replace = match &best {
                Some(current) => total > current.score,
                None => true,
            };
            if replace {
                best = Some(ScoredElement {
                    element: el.clone(),
                    score: total,
                    text_score: text,
                    visual_score: Some(visual),
                });
            }
        }

        let best = best?;
        if best.score > config.visual_accept_threshold {
            Some(best)
        } else {
            None
        }
    }
}

/// The standard pipeline: visual fusion first, text always after it.
pub fn default_chain() -> Vec<Box<dyn ResolutionStrategy>> {
    vec![Box::new(VisualFusionStrategy), Box::new(TextStrategy)]
}
