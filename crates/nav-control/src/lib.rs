//! Stability and navigation control.
//!
//! Owns two concerns: driving one URL navigation through
//! normalize → load → verify with bounded retries, and polling the page's
//! activity probe until DOM mutations, network requests and user
//! interactions have quiesced.

pub mod config;
pub mod controller;
pub mod errors;
pub mod normalize;
pub mod stability;
pub mod verify;

pub use config::NavConfig;
pub use controller::{NavPhase, Navigator};
pub use errors::NavError;
pub use normalize::normalize_url;
pub use stability::{StabilityProbe, ACTIVITY_PROBE_JS, ACTIVITY_QUERY_MARKER};
pub use verify::verify_landed;
