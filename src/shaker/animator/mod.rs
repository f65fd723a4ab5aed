//! Die animators
//!
//! A die animator turns the controller's commands into smoothed motion. The
//! controller only sees the [`DieAnimator`] capability set; the two variants
//! differ in how they render and whether their speed can be read back.

mod planar;
mod volumetric;

pub use planar::*;
pub use volumetric::*;

use bevy::prelude::*;
use rand::Rng;

/// Something worth reacting to that happened during [`DieAnimator::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimatorEvent {
    /// The die reached its commanded result face.
    Settled(u32),
    /// A cosmetic flip swapped the displayed face mid-spin.
    Flipped(u32),
}

pub trait DieAnimator {
    /// Whether `current_speed` tracks the real motion closely enough for the
    /// controller to use it as the natural-stop signal.
    const SPEED_OBSERVABLE: bool;

    /// Start or stop spinning. Starting clears any pending settle.
    fn set_spinning(&mut self, spinning: bool);

    /// Target angular speed in degrees per second.
    fn command_speed(&mut self, speed: f32);

    /// Stop spinning and settle on `face` (clamped into 1..=6).
    fn command_stop(&mut self, face: u32);

    /// Fix the spin axis for the round. Only meaningful in 3D.
    fn set_axis(&mut self, _axis: Vec3) {}

    /// Smoothed angular speed magnitude in degrees per second.
    fn current_speed(&self) -> f32;

    fn is_spinning(&self) -> bool;

    /// Face currently shown, or the face being settled on.
    fn face(&self) -> u32;

    fn advance<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) -> Option<AnimatorEvent>;
}

impl<A: DieAnimator> DieAnimator for &mut A {
    const SPEED_OBSERVABLE: bool = A::SPEED_OBSERVABLE;

    fn set_spinning(&mut self, spinning: bool) {
        (**self).set_spinning(spinning)
    }

    fn command_speed(&mut self, speed: f32) {
        (**self).command_speed(speed)
    }

    fn command_stop(&mut self, face: u32) {
        (**self).command_stop(face)
    }

    fn set_axis(&mut self, axis: Vec3) {
        (**self).set_axis(axis)
    }

    fn current_speed(&self) -> f32 {
        (**self).current_speed()
    }

    fn is_spinning(&self) -> bool {
        (**self).is_spinning()
    }

    fn face(&self) -> u32 {
        (**self).face()
    }

    fn advance<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) -> Option<AnimatorEvent> {
        (**self).advance(dt, rng)
    }
}
