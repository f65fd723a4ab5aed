//! Roll driving systems
//!
//! Runs the controller once per frame, forwards its cues as messages, and
//! copies animator state onto the rendered dice.

use bevy::color::Alpha;
use bevy::ecs::component::Mutable;
use bevy::prelude::*;

use crate::shaker::animator::{DieAnimator, PlanarAnimator, VolumetricAnimator};
use crate::shaker::controller::RollController;
use crate::shaker::ghost_trail::{GhostFade, GhostTrail};
use crate::shaker::types::*;

use super::setup::FaceTextures;

/// Call `f` with the animators sorted by die index, so result faces line up
/// with the row on screen.
pub(crate) fn with_ordered_dice<A, R>(
    query: &mut Query<(&Die, &mut A)>,
    f: impl FnOnce(&mut [&mut A]) -> R,
) -> R
where
    A: Component<Mutability = Mutable> + DieAnimator,
{
    let mut rows: Vec<(usize, Mut<A>)> = query
        .iter_mut()
        .map(|(die, animator)| (die.index, animator))
        .collect();
    rows.sort_by_key(|(index, _)| *index);
    let mut dice: Vec<&mut A> = rows.iter_mut().map(|(_, animator)| &mut **animator).collect();
    f(&mut dice)
}

pub fn drive_roll_controller<A>(
    time: Res<Time>,
    mut controller: ResMut<RollController>,
    mut dice: Query<(&Die, &mut A)>,
    mut cues: MessageWriter<RollCue>,
) where
    A: Component<Mutability = Mutable> + DieAnimator,
{
    let dt = time.delta_secs();
    with_ordered_dice(&mut dice, |dice| {
        controller.tick(dt, dice);
        controller.advance_dice(dt, dice);
    });

    for cue in controller.drain_cues() {
        cues.write(cue);
    }
}

/// Keep the controller's spin-axis constraint in step with the camera.
pub fn track_camera_forward(
    mut controller: ResMut<RollController>,
    cameras: Query<&Transform, (With<MainCamera>, Changed<Transform>)>,
) {
    if let Some(transform) = cameras.iter().next() {
        controller.set_camera_forward(*transform.forward());
    }
}

pub fn sync_volumetric_dice(mut dice: Query<(&VolumetricAnimator, &mut Transform)>) {
    for (animator, mut transform) in dice.iter_mut() {
        transform.rotation = animator.orientation();
    }
}

pub fn sync_planar_dice(
    faces: Res<FaceTextures>,
    mut dice: Query<(&PlanarAnimator, &mut Transform, &mut Sprite)>,
) {
    for (animator, mut transform, mut sprite) in dice.iter_mut() {
        transform.rotation = Quat::from_rotation_z(animator.angle().to_radians());
        transform.scale = animator.scale().extend(1.0);

        if let Some(image) = faces.face(animator.face()) {
            if sprite.image != image {
                sprite.image = image;
            }
        }
    }
}

pub fn spawn_ghosts(
    time: Res<Time>,
    mut commands: Commands,
    mut dice: Query<(&PlanarAnimator, &mut GhostTrail, &Transform, &Sprite)>,
) {
    let dt = time.delta_secs();
    for (animator, mut trail, transform, sprite) in dice.iter_mut() {
        trail.set_active(animator.is_spinning());
        if !trail.advance(dt) {
            continue;
        }

        let fade = trail.spawn_fade();
        let mut ghost_transform = *transform;
        ghost_transform.translation.z -= 0.1;
        commands.spawn((
            Sprite {
                image: sprite.image.clone(),
                custom_size: sprite.custom_size,
                color: Color::WHITE.with_alpha(fade.alpha()),
                ..default()
            },
            ghost_transform,
            fade,
        ));
    }
}

pub fn fade_ghosts(
    time: Res<Time>,
    mut commands: Commands,
    mut ghosts: Query<(Entity, &mut GhostFade, &mut Sprite)>,
) {
    let dt = time.delta_secs();
    for (entity, mut fade, mut sprite) in ghosts.iter_mut() {
        match fade.advance(dt) {
            Some(alpha) => sprite.color.set_alpha(alpha),
            None => commands.entity(entity).despawn(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    #[test]
    fn test_camera_forward_follows_main_camera() {
        let mut world = World::new();
        world.insert_resource(RollController::new(&ShakerSettings::default()));
        world.spawn(Transform::from_xyz(0.0, 0.0, 0.0).looking_at(Vec3::X, Vec3::Y));
        world.spawn((
            Transform::from_xyz(0.0, 5.0, 0.0).looking_at(Vec3::ZERO, Vec3::Z),
            MainCamera,
        ));

        world.run_system_once(track_camera_forward).unwrap();

        let forward = world.resource::<RollController>().camera_forward();
        assert!(forward.distance(Vec3::NEG_Y) < 1e-5, "forward {forward}");
    }
}
