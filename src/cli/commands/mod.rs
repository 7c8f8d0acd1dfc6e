//! Command implementations

pub mod auth;
pub mod data;
pub mod project;
pub mod stats;
pub mod sync;
