//! Page-state extraction.
//!
//! Queries the live page once per loop iteration and turns the survey
//! payload into a [`page_model::PageState`]. Extraction never fails the
//! caller: a page that answers nothing yields an empty snapshot.

pub mod extract;
pub mod regions;
pub mod scripts;

pub use extract::PagePerceiver;
pub use regions::classify_region;
pub use scripts::{PAGE_SURVEY_JS, SURVEY_MARKER};
