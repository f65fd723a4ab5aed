//! 2D sprite animator
//!
//! Rolls a face sprite in the screen plane. Besides the roll itself it drives
//! two cartoon effects: squash/stretch with start/stop pulses, and a fake 3D
//! "flip" that swaps the displayed face halfway through a horizontal squeeze.

use bevy::prelude::*;
use rand::Rng;

use super::{AnimatorEvent, DieAnimator};
use crate::shaker::energy::{lerp, smoothing_weight};
use crate::shaker::types::{clamp_face, AnimationSettings, FxSettings, DEFAULT_FACE, FACE_COUNT};

const START_PULSE: f32 = 0.25;
const STOP_PULSE: f32 = -0.18;
const PULSE_DECAY_PER_SEC: f32 = 3.5;
const MIN_ROLL_SPEED: f32 = 0.001;

/// Pick a face different from `current`: a few random draws, then the next
/// face in sequence.
pub fn pick_other_face<R: Rng + ?Sized>(rng: &mut R, current: u32) -> u32 {
    let mut face = current;
    for _ in 0..3 {
        if face != current {
            break;
        }
        face = rng.gen_range(1..=FACE_COUNT);
    }
    if face == current {
        face = current % FACE_COUNT + 1;
    }
    face
}

fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

#[derive(Component, Debug, Clone)]
pub struct PlanarAnimator {
    target_speed: f32,
    /// Signed roll speed in deg/s.
    current_speed: f32,
    spinning: bool,
    speed_multiplier: f32,
    direction: f32,

    /// Roll angle around the view axis, degrees.
    angle: f32,
    face: u32,
    next_face: u32,
    scale: Vec2,

    flip_timer: f32,
    angle_accum: f32,
    pulse: f32,

    flip_enabled: bool,
    squash_enabled: bool,
    smooth_factor: f32,
    squash_max: f32,
    squash_speed_ref: f32,
    flip_threshold_angle: f32,
    flip_duration: f32,
    flip_min_scale_x: f32,
    flip_min_speed: f32,
}

impl PlanarAnimator {
    /// Each die gets its own speed multiplier and roll direction.
    pub fn new<R: Rng + ?Sized>(anim: &AnimationSettings, fx: &FxSettings, rng: &mut R) -> Self {
        Self {
            target_speed: 0.0,
            current_speed: 0.0,
            spinning: false,
            speed_multiplier: rng.gen_range(0.8..1.3),
            direction: if rng.gen_bool(0.5) { -1.0 } else { 1.0 },
            angle: 0.0,
            face: DEFAULT_FACE,
            next_face: DEFAULT_FACE,
            scale: Vec2::ONE,
            flip_timer: 0.0,
            angle_accum: 0.0,
            pulse: 0.0,
            flip_enabled: fx.flip,
            squash_enabled: fx.squash,
            smooth_factor: anim.planar_smooth_factor,
            squash_max: anim.squash_max,
            squash_speed_ref: anim.squash_speed_ref,
            flip_threshold_angle: anim.flip_threshold_angle,
            flip_duration: anim.flip_duration.max(1e-4),
            flip_min_scale_x: anim.flip_min_scale_x,
            flip_min_speed: anim.flip_min_speed,
        }
    }

    /// Roll angle in degrees.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Scale multiplier on top of the die's base size.
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    pub fn is_flipping(&self) -> bool {
        self.flip_timer > 0.0
    }

    /// Signed speed, including direction.
    pub fn signed_speed(&self) -> f32 {
        self.current_speed
    }

    fn squash_scale(&mut self, dt: f32) -> Vec2 {
        let squash = if self.squash_enabled {
            (self.current_speed.abs() / self.squash_speed_ref.max(1.0)).clamp(0.0, 1.0)
                * self.squash_max
        } else {
            0.0
        };

        self.pulse = move_towards(self.pulse, 0.0, dt * PULSE_DECAY_PER_SEC);

        Vec2::new(
            (1.0 - squash + self.pulse).max(0.05),
            (1.0 + squash - self.pulse * 0.5).max(0.05),
        )
    }

    fn advance_flip<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        rng: &mut R,
        scale: &mut Vec2,
    ) -> Option<AnimatorEvent> {
        if !self.flip_enabled {
            return None;
        }

        if self.flip_timer > 0.0 {
            self.flip_timer -= dt;
            let u = 1.0 - (self.flip_timer / self.flip_duration).clamp(0.0, 1.0);
            let phase = u * 2.0;
            let sx = if phase <= 1.0 {
                lerp(1.0, self.flip_min_scale_x, phase)
            } else {
                lerp(self.flip_min_scale_x, 1.0, phase - 1.0)
            };
            let sy = 1.0 / sx.max(0.2);
            *scale *= Vec2::new(sx, sy);

            if u >= 0.5 && self.face != self.next_face {
                self.face = self.next_face;
                return Some(AnimatorEvent::Flipped(self.face));
            }
            return None;
        }

        let omega = self.current_speed.abs();
        if self.spinning && omega > self.flip_min_speed {
            self.angle_accum += omega * dt;
            if self.angle_accum >= self.flip_threshold_angle {
                self.angle_accum = 0.0;
                self.next_face = pick_other_face(rng, self.face);
                self.flip_timer = self.flip_duration;
            }
        } else {
            self.angle_accum = 0.0;
        }
        None
    }
}

impl DieAnimator for PlanarAnimator {
    // Flips and per-die multipliers make the smoothed speed a poor stop
    // signal; the controller uses its shake buffer timer instead.
    const SPEED_OBSERVABLE: bool = false;

    fn set_spinning(&mut self, spinning: bool) {
        self.spinning = spinning;
        self.pulse = if spinning { START_PULSE } else { STOP_PULSE };
    }

    fn command_speed(&mut self, speed: f32) {
        self.target_speed = speed.max(0.0);
    }

    fn command_stop(&mut self, face: u32) {
        if self.spinning {
            self.pulse = STOP_PULSE;
        }
        self.spinning = false;
        self.face = clamp_face(face);
        self.next_face = self.face;
        self.flip_timer = 0.0;
        self.angle_accum = 0.0;
    }

    fn current_speed(&self) -> f32 {
        self.current_speed.abs()
    }

    fn is_spinning(&self) -> bool {
        self.spinning
    }

    fn face(&self) -> u32 {
        self.face
    }

    fn advance<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) -> Option<AnimatorEvent> {
        let target = if self.spinning {
            self.target_speed * self.speed_multiplier * self.direction
        } else {
            0.0
        };
        self.current_speed += (target - self.current_speed) * smoothing_weight(self.smooth_factor, dt);

        if self.current_speed.abs() > MIN_ROLL_SPEED {
            self.angle = (self.angle + self.current_speed * dt).rem_euclid(360.0);
        }

        let mut scale = self.squash_scale(dt);
        let event = self.advance_flip(dt, rng, &mut scale);
        self.scale = scale;
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const DT: f32 = 1.0 / 60.0;

    fn animator(rng: &mut StdRng) -> PlanarAnimator {
        PlanarAnimator::new(&AnimationSettings::default(), &FxSettings::default(), rng)
    }

    #[test]
    fn test_pick_other_face_never_repeats() {
        let mut rng = StdRng::seed_from_u64(9);
        for current in 1..=6 {
            for _ in 0..200 {
                let face = pick_other_face(&mut rng, current);
                assert_ne!(face, current);
                assert!((1..=6).contains(&face));
            }
        }
    }

    #[test]
    fn test_speed_follows_multiplier_and_direction() {
        let mut rng = StdRng::seed_from_u64(10);
        let mut a = animator(&mut rng);
        a.command_speed(200.0);
        a.set_spinning(true);
        for _ in 0..180 {
            a.advance(DT, &mut rng);
        }
        let expected = 200.0 * a.speed_multiplier;
        assert!((a.current_speed() - expected).abs() < 1.0);
        assert_eq!(a.signed_speed().signum(), a.direction);
    }

    #[test]
    fn test_spinning_fast_flips_faces() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut a = animator(&mut rng);
        a.command_speed(480.0);
        a.set_spinning(true);

        let mut flips = Vec::new();
        let mut shown = a.face();
        for _ in 0..240 {
            if let Some(AnimatorEvent::Flipped(face)) = a.advance(DT, &mut rng) {
                assert_ne!(face, shown);
                shown = face;
                flips.push(face);
            }
        }
        assert!(!flips.is_empty());
        assert_eq!(a.face(), shown);
    }

    #[test]
    fn test_no_flips_when_disabled() {
        let mut rng = StdRng::seed_from_u64(12);
        let fx = FxSettings {
            flip: false,
            ..Default::default()
        };
        let mut a = PlanarAnimator::new(&AnimationSettings::default(), &fx, &mut rng);
        a.command_speed(480.0);
        a.set_spinning(true);
        for _ in 0..240 {
            assert_eq!(a.advance(DT, &mut rng), None);
        }
        assert_eq!(a.face(), DEFAULT_FACE);
    }

    #[test]
    fn test_stop_swaps_face_immediately_and_cancels_flip() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut a = animator(&mut rng);
        a.command_speed(480.0);
        a.set_spinning(true);
        for _ in 0..240 {
            a.advance(DT, &mut rng);
            if a.is_flipping() {
                break;
            }
        }

        a.command_stop(5);
        assert_eq!(a.face(), 5);
        assert!(!a.is_spinning());
        assert!(!a.is_flipping());

        for _ in 0..240 {
            assert_eq!(a.advance(DT, &mut rng), None);
        }
        assert_eq!(a.face(), 5);
        assert!(a.current_speed() < 0.01);
    }

    #[test]
    fn test_squash_relaxes_at_rest() {
        let mut rng = StdRng::seed_from_u64(14);
        let mut a = animator(&mut rng);
        a.set_spinning(false);
        for _ in 0..120 {
            a.advance(DT, &mut rng);
        }
        assert!(a.scale().abs_diff_eq(Vec2::ONE, 1e-4));
    }
}
