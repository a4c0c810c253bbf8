//! Platform abstraction layer
//!
//! Handles browser specifics:
//! - Surface geometry from the DOM
//! - Canvas 2D drawing
//! - Animation-frame scheduling and resize events
//!
//! Native builds have no platform layer; they drive the simulator headless.

#[cfg(target_arch = "wasm32")]
pub mod web;
