//! Element resolution: mapping a textual target description to one
//! concrete element of the current page snapshot.
//!
//! Resolution is an ordered pipeline of pure strategies. The visual-fusion
//! strategy runs first when detector output is available, blending text
//! similarity with bounding-box overlap; the text strategy always runs
//! after it, so a missed visual match can never mask a text match.

pub mod config;
pub mod iou;
pub mod resolver;
pub mod scoring;
pub mod strategies;
pub mod types;

pub use config::{ResolverConfig, ResolverWeights};
pub use iou::iou;
pub use resolver::{selector_for, ElementResolver};
pub use strategies::{default_chain, ResolutionStrategy, TextStrategy, VisualFusionStrategy};
pub use types::{ResolveContext, ScoredElement};
