//! qatrack: QA test tracking with dual-tier persistence
//!
//! Collections of test artifacts (test cases, defects, metrics, and the
//! rest) are cached in a local never-fails store and reconciled with an
//! optional remote backend on a last-write-wins basis.

pub mod cli;
pub mod core;
pub mod entities;
