//! The resolution facade: gathers detector output once, then runs the
//! strategy pipeline.

use std::sync::Arc;

use tracing::debug;

use page_driver::{ObjectDetector, ScreenshotSource};
use page_model::{Detection, ElementDescriptor, PageState};

use crate::config::ResolverConfig;
use crate::strategies::{default_chain, ResolutionStrategy};
use crate::types::{ResolveContext, ScoredElement};

pub struct ElementResolver {
    strategies: Vec<Box<dyn ResolutionStrategy>>,
    config: ResolverConfig,
    screenshots: Option<Arc<dyn ScreenshotSource>>,
    detector: Option<Arc<dyn ObjectDetector>>,
}

impl ElementResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            strategies: default_chain(),
            config,
            screenshots: None,
            detector: None,
        }
    }

    /// Wire the optional vision collaborators. Without them the pipeline
    /// silently runs text-only.
    pub fn with_vision(
        mut self,
        screenshots: Arc<dyn ScreenshotSource>,
        detector: Arc<dyn ObjectDetector>,
    ) -> Self {
        self.screenshots = Some(screenshots);
        self.detector = Some(detector);
        self
    }

    /// Replace the strategy pipeline. Order matters.
    pub fn with_strategies(mut self, strategies: Vec<Box<dyn ResolutionStrategy>>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Map a target description to the best-scoring element of `state`,
    /// or `None` when no strategy clears its threshold. The caller owns
    /// the fallback from there.
    pub async fn resolve(&self, target: &str, state: &PageState) -> Option<ScoredElement> {
        let detections = self.gather_detections().await;
        let mut ctx = ResolveContext::new(target, state);
        if let Some(detections) = detections.as_deref() {
            ctx = ctx.with_detections(detections);
        }

        for strategy in &self.strategies {
            if let Some(hit) = strategy.resolve(&ctx, &self.config) {
                debug!(
                    strategy = strategy.name(),
                    score = hit.score,
                    element = %hit.element.label(),
                    "target resolved"
                );
                return Some(hit);
            }
        }
        debug!(target, "no strategy resolved the target");
        None
    }

    async fn gather_detections(&self) -> Option<Vec<Detection>> {
        let screenshots = self.screenshots.as_ref()?;
        let detector = self.detector.as_ref()?;
        let image = screenshots.capture().await?;
        let detections = detector.detect(&image).await;
        if detections.is_empty() {
            debug!("detector returned no boxes; resolving text-only");
            return None;
        }
        Some(detections)
    }
}

/// Derive a CSS selector that re-addresses `el` for action execution.
/// Prefers the most specific stable handle available.
pub fn selector_for(el: &ElementDescriptor) -> String {
    if let Some(id) = el.id.as_deref().filter(|id| !id.is_empty()) {
        return format!("#{id}");
    }
    if let Some(name) = el.name.as_deref().filter(|n| !n.is_empty()) {
        return format!("{}[name=\"{}\"]", el.tag, name);
    }
    if let Some(aria) = el.aria_label.as_deref().filter(|a| !a.is_empty()) {
        return format!("{}[aria-label=\"{}\"]", el.tag, aria);
    }
    if let Some(class) = el.classes.first().filter(|c| !c.is_empty()) {
        return format!("{}.{}", el.tag, class);
    }
    el.tag.clone()
}
