//! Page drivers shipped with the binary.
//!
//! The real rendering engine is an external collaborator wired in through
//! [`page_driver::PageDriver`]; this module carries the fixture-backed
//! replay driver that lets the full loop run offline.

mod replay;

pub use replay::{ReplayDriver, ReplayFixture};
