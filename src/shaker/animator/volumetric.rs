//! 3D cube animator
//!
//! Spins a cube around a fixed per-round axis and, once told to stop, slerps
//! it so the result face points at the camera (+Z).

use std::f32::consts::{FRAC_PI_2, PI};

use bevy::prelude::*;
use rand::Rng;

use super::{AnimatorEvent, DieAnimator};
use crate::shaker::energy::smoothing_weight;
use crate::shaker::types::{clamp_face, AnimationSettings, DEFAULT_FACE};

/// Settling snaps to the target once closer than this.
const SETTLE_EPSILON_DEG: f32 = 0.5;

/// Below this speed (deg/s) the cube is not rotated at all.
const MIN_ROTATE_SPEED: f32 = 0.01;

/// Outward normal of each face on the unrotated cube.
///
/// 1 front, 2 right, 3 back, 4 left, 5 top, 6 bottom.
pub fn face_normal(face: u32) -> Vec3 {
    match clamp_face(face) {
        1 => Vec3::Z,
        2 => Vec3::X,
        3 => Vec3::NEG_Z,
        4 => Vec3::NEG_X,
        5 => Vec3::Y,
        _ => Vec3::NEG_Y,
    }
}

/// Orientation that turns `face` towards the camera.
pub fn face_orientation(face: u32) -> Quat {
    match clamp_face(face) {
        1 => Quat::IDENTITY,
        2 => Quat::from_rotation_y(-FRAC_PI_2),
        3 => Quat::from_rotation_y(PI),
        4 => Quat::from_rotation_y(FRAC_PI_2),
        5 => Quat::from_rotation_x(FRAC_PI_2),
        _ => Quat::from_rotation_x(-FRAC_PI_2),
    }
}

/// Pick a random unit axis that is not close to the view direction, so the
/// spin reads on screen instead of looking like a flat wheel.
pub fn random_axis_not_near<R: Rng + ?Sized>(
    rng: &mut R,
    camera_forward: Vec3,
    max_abs_dot: f32,
) -> Vec3 {
    let forward = camera_forward.normalize_or(Vec3::NEG_Z);
    for _ in 0..20 {
        let candidate = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        let Some(axis) = candidate.try_normalize() else {
            continue;
        };
        if axis.dot(forward).abs() <= max_abs_dot {
            return axis;
        }
    }

    let fallback = forward.cross(Vec3::Y);
    let fallback = if fallback.length_squared() > 1e-8 {
        fallback
    } else {
        forward.cross(Vec3::X)
    };
    fallback.normalize()
}

#[derive(Component, Debug, Clone)]
pub struct VolumetricAnimator {
    target_speed: f32,
    current_speed: f32,
    spinning: bool,
    axis: Vec3,
    orientation: Quat,
    settle_target: Option<Quat>,
    face: u32,
    smooth_factor: f32,
    align_speed: f32,
}

impl VolumetricAnimator {
    pub fn new(settings: &AnimationSettings) -> Self {
        Self {
            target_speed: 0.0,
            current_speed: 0.0,
            spinning: false,
            axis: Vec3::new(0.3, 1.0, 0.2).normalize(),
            orientation: Quat::IDENTITY,
            settle_target: None,
            face: DEFAULT_FACE,
            smooth_factor: settings.volumetric_smooth_factor,
            align_speed: settings.align_speed,
        }
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    pub fn axis(&self) -> Vec3 {
        self.axis
    }

    pub fn is_settling(&self) -> bool {
        self.settle_target.is_some()
    }
}

impl DieAnimator for VolumetricAnimator {
    const SPEED_OBSERVABLE: bool = true;

    fn set_spinning(&mut self, spinning: bool) {
        self.spinning = spinning;
        if spinning {
            self.settle_target = None;
        }
    }

    fn command_speed(&mut self, speed: f32) {
        self.target_speed = speed.max(0.0);
    }

    fn command_stop(&mut self, face: u32) {
        self.face = clamp_face(face);
        self.settle_target = Some(face_orientation(self.face));
        self.spinning = false;
    }

    fn set_axis(&mut self, axis: Vec3) {
        self.axis = axis.try_normalize().unwrap_or(Vec3::Y);
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

    fn advance<R: Rng + ?Sized>(&mut self, dt: f32, _rng: &mut R) -> Option<AnimatorEvent> {
        let target = if self.spinning { self.target_speed } else { 0.0 };
        self.current_speed += (target - self.current_speed) * smoothing_weight(self.smooth_factor, dt);

        if self.spinning && self.current_speed > MIN_ROTATE_SPEED {
            let delta = Quat::from_axis_angle(self.axis, (self.current_speed * dt).to_radians());
            self.orientation = (delta * self.orientation).normalize();
            return None;
        }

        let target = self.settle_target?;
        self.orientation = self
            .orientation
            .slerp(target, smoothing_weight(self.align_speed, dt));
        if self.orientation.angle_between(target).to_degrees() < SETTLE_EPSILON_DEG {
            self.orientation = target;
            self.settle_target = None;
            return Some(AnimatorEvent::Settled(self.face));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const DT: f32 = 1.0 / 60.0;

    fn animator() -> VolumetricAnimator {
        VolumetricAnimator::new(&AnimationSettings::default())
    }

    #[test]
    fn test_face_orientation_points_face_at_camera() {
        for face in 1..=6 {
            let facing = face_orientation(face) * face_normal(face);
            assert!(
                facing.abs_diff_eq(Vec3::Z, 1e-5),
                "face {face} ends up facing {facing:?}"
            );
        }
    }

    #[test]
    fn test_set_axis_normalizes_and_replaces_zero() {
        let mut a = animator();
        a.set_axis(Vec3::new(0.0, 3.0, 4.0));
        assert!((a.axis().length() - 1.0).abs() < 1e-5);
        a.set_axis(Vec3::ZERO);
        assert_eq!(a.axis(), Vec3::Y);
    }

    #[test]
    fn test_speed_approaches_command() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut a = animator();
        a.command_speed(240.0);
        a.set_spinning(true);
        for _ in 0..120 {
            a.advance(DT, &mut rng);
        }
        assert!((a.current_speed() - 240.0).abs() < 1.0);
        assert_ne!(a.orientation(), Quat::IDENTITY);
    }

    #[test]
    fn test_stop_settles_on_face() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut a = animator();
        a.command_speed(300.0);
        a.set_spinning(true);
        for _ in 0..30 {
            a.advance(DT, &mut rng);
        }

        a.command_stop(4);
        assert!(!a.is_spinning());
        assert!(a.is_settling());

        let mut settled = None;
        for _ in 0..600 {
            if let Some(event) = a.advance(DT, &mut rng) {
                settled = Some(event);
                break;
            }
        }
        assert_eq!(settled, Some(AnimatorEvent::Settled(4)));
        assert_eq!(a.orientation(), face_orientation(4));
        assert_eq!(a.face(), 4);
    }

    #[test]
    fn test_stop_clamps_face() {
        let mut a = animator();
        a.command_stop(42);
        assert_eq!(a.face(), 6);
    }

    #[test]
    fn test_spinning_again_cancels_settle() {
        let mut a = animator();
        a.command_stop(3);
        a.set_spinning(true);
        assert!(!a.is_settling());
    }

    #[test]
    fn test_random_axis_respects_camera_limit() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let axis = random_axis_not_near(&mut rng, Vec3::NEG_Z, 0.5);
            assert!((axis.length() - 1.0).abs() < 1e-4);
            assert!(axis.dot(Vec3::NEG_Z).abs() <= 0.5 + 1e-6);
        }
    }

    #[test]
    fn test_random_axis_fallback_is_perpendicular() {
        let mut rng = StdRng::seed_from_u64(4);
        // An impossible limit forces the fallback.
        let axis = random_axis_not_near(&mut rng, Vec3::NEG_Z, -1.0);
        assert!(axis.dot(Vec3::NEG_Z).abs() < 1e-5);
        let axis = random_axis_not_near(&mut rng, Vec3::Y, -1.0);
        assert!(axis.dot(Vec3::Y).abs() < 1e-5);
    }
}
