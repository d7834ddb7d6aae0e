//! Detector output shapes.

use serde::{Deserialize, Serialize};

/// One detected object from the vision collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Corner box `[x0, y0, x1, y1]` in the same coordinate space as
    /// element bounds.
    pub bounds: [f64; 4],

    /// Detector confidence in [0, 1].
    pub confidence: f64,
}

impl Detection {
    pub fn new(bounds: [f64; 4], confidence: f64) -> Self {
        Self { bounds, confidence }
    }
}
