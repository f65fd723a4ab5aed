//! Ghost trail afterimages for spinning 2D dice
//!
//! The emitter lives on the die and says when to drop a new afterimage; each
//! afterimage carries its own [`GhostFade`] record and is removed once the
//! record expires.

use bevy::prelude::*;

use crate::shaker::types::FxSettings;

#[derive(Component, Debug, Clone)]
pub struct GhostTrail {
    active: bool,
    timer: f32,
    spawn_interval: f32,
    lifetime: f32,
    initial_alpha: f32,
}

impl GhostTrail {
    pub fn new(fx: &FxSettings) -> Self {
        Self {
            active: false,
            timer: 0.0,
            spawn_interval: fx.ghost_spawn_interval.max(1e-3),
            lifetime: fx.ghost_lifetime,
            initial_alpha: fx.ghost_initial_alpha,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        if !active {
            self.timer = 0.0;
        }
        self.active = active;
    }

    /// Returns true when an afterimage should be spawned this tick.
    pub fn advance(&mut self, dt: f32) -> bool {
        if !self.active {
            return false;
        }
        self.timer += dt;
        if self.timer >= self.spawn_interval {
            self.timer = 0.0;
            return true;
        }
        false
    }

    /// Fade record for a freshly spawned afterimage.
    pub fn spawn_fade(&self) -> GhostFade {
        GhostFade {
            age: 0.0,
            lifetime: self.lifetime,
            initial_alpha: self.initial_alpha,
        }
    }
}

/// Fade-out record of a single afterimage.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct GhostFade {
    pub age: f32,
    pub lifetime: f32,
    pub initial_alpha: f32,
}

impl GhostFade {
    pub fn alpha(&self) -> f32 {
        if self.lifetime <= 0.0 {
            return 0.0;
        }
        let k = 1.0 - (self.age / self.lifetime).clamp(0.0, 1.0);
        self.initial_alpha * k * k
    }

    pub fn is_expired(&self) -> bool {
        self.age >= self.lifetime
    }

    /// Age the record. Returns the new alpha, or `None` once expired.
    pub fn advance(&mut self, dt: f32) -> Option<f32> {
        self.age += dt;
        if self.is_expired() {
            None
        } else {
            Some(self.alpha())
        }
    }
}
