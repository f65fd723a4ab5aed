//! Dice shaker
//!
//! A row of dice that spin while the player taps SPACE, settle on random
//! faces once the spin energy runs out, and then show their total.
//!
//! The [`controller::RollController`] holds all round logic and reports side
//! effects as cues. The `systems` module hosts it inside an app and
//! [`simulation::Simulation`] runs it headless.

pub mod animator;
pub mod controller;
pub mod energy;
pub mod ghost_trail;
pub mod plugin;
pub mod simulation;
pub mod skin;
pub mod systems;
pub mod types;

pub use plugin::{ShakerPlugin, ShakerSet};
