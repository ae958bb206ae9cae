//! FFmpeg module - runs the external encoder that burns subtitles in
//!
//! This module handles:
//! - Filter-graph escaping of paths embedded in `-vf`
//! - Building the encoder command line
//! - Running the encoder and classifying its failures

pub mod encoder;
pub mod filter;

pub use encoder::{BurnJob, Encoder};
