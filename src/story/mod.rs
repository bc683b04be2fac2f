//! The story model and the non-visual pipeline stages.
//!
//! - [`types`]: jobs, candidates, selected memories and the artifact shape
//! - [`filter`]: the stop-term content filter
//! - [`select`]: random candidate sampling and captioning
//! - [`music`]: soundtrack choice
//! - [`assemble`]: artifact construction
//! - [`store`]: artifact persistence and listing

pub mod assemble;
pub mod filter;
pub mod music;
pub mod select;
pub mod store;
pub mod types;
