//! Core domain entities.
//!
//! - [`Link`] - A stored URL with its identifier and creation timestamp

pub mod link;

pub use link::Link;
