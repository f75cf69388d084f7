//! # Domain Types
//!
//! Plain data shared by every Atlas crate: configuration sections, well-known
//! constants and the feature-slice registry contract.
//! No I/O, networking or heavy logic lives here.

pub mod config;
pub mod constants;
pub mod registry;
