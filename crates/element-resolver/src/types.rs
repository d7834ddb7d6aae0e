//! Resolution inputs and outputs.

use page_model::{Detection, ElementDescriptor, PageState};
use serde::{Deserialize, Serialize};

/// Everything a strategy may look at. Detections are gathered once by the
/// facade before the pipeline runs; strategies themselves do no I/O.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub target: &'a str,
    pub state: &'a PageState,
    pub detections: Option<&'a [Detection]>,
}

impl<'a> ResolveContext<'a> {
    pub fn new(target: &'a str, state: &'a PageState) -> Self {
        Self {
            target,
            state,
            detections: None,
        }
    }

    pub fn with_detections(mut self, detections: &'a [Detection]) -> Self {
        self.detections = Some(detections);
        self
    }
}

/// A resolved element with its scores. Transient: produced and consumed
/// within one resolution call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredElement {
    pub element: ElementDescriptor,

    /// The score the accepting strategy compared against its threshold.
    pub score: f64,

    pub text_score: f64,

    /// Best IoU against a detection; only set by the visual path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_score: Option<f64>,
}

impl ScoredElement {
    /// CSS selector suitable for re-executing an action against this
    /// element.
    pub fn selector(&self) -> String {
        crate::resolver::selector_for(&self.element)
    }
}
