//! Integration tests
//!
//! Exercise the conversion pipeline and the HTTP surface together, using
//! stand-in encoder binaries instead of a real FFmpeg.

pub mod e2e;
pub mod fixtures;
