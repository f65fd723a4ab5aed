//! Type definitions for the dice shaker
//!
//! This module is organized into submodules:
//! - `session` - Roll stages and per-round state
//! - `cues` - Audio / UI requests emitted by the controller
//! - `dice` - Die components, scene markers and face helpers
//! - `settings` - Tunables and RON persistence

pub mod cues;
pub mod dice;
pub mod session;
pub mod settings;

// Re-export all public types for convenient access
pub use cues::*;
pub use dice::*;
pub use session::*;
pub use settings::*;
