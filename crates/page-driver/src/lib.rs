//! Contracts to the collaborators that own real I/O: the rendering engine,
//! screenshot capture, object detection and the user-facing log stream.
//!
//! Every awaited operation here resolves to a local failure value on
//! timeout (`None`, empty vec) instead of erroring or hanging; the engine
//! may simply never answer, e.g. when a navigation turns out to be a
//! same-document change.

pub mod driver;
pub mod poll;
pub mod testing;

pub use driver::*;
pub use poll::poll_until;
