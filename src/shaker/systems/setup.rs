//! Scene setup systems
//!
//! Spawns the camera, the row of dice for the configured variant, and the
//! status / results UI.

use bevy::prelude::*;

use crate::shaker::animator::{face_normal, face_orientation, PlanarAnimator, VolumetricAnimator};
use crate::shaker::controller::RollController;
use crate::shaker::ghost_trail::GhostTrail;
use crate::shaker::skin::face_images;
use crate::shaker::types::*;

/// Pixels per world unit for the 2D scene.
const PLANAR_PIXELS_PER_UNIT: f32 = 100.0;

/// Face images shared by every die. Index 0 holds face 1.
#[derive(Resource, Clone, Default)]
pub struct FaceTextures {
    pub images: Vec<Handle<Image>>,
}

impl FaceTextures {
    pub fn face(&self, face: u32) -> Option<Handle<Image>> {
        self.images.get((clamp_face(face) - 1) as usize).cloned()
    }
}

pub fn load_face_textures(
    mut commands: Commands,
    mut images: ResMut<Assets<Image>>,
    settings: Res<ShakerSettings>,
) {
    let handles: Vec<Handle<Image>> = face_images(&settings.skin)
        .into_iter()
        .map(|image| images.add(image))
        .collect();
    info!(
        "Generated {} face textures for the {:?} skin",
        handles.len(),
        settings.skin.preset
    );
    commands.insert_resource(FaceTextures { images: handles });
}

/// Camera distance that keeps the whole row in view.
fn camera_distance(settings: &DiceSettings) -> f32 {
    let row_width = settings.count.saturating_sub(1) as f32 * settings.spacing + settings.size;
    (row_width * 1.2).max(6.0)
}

pub fn setup_volumetric_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    settings: Res<ShakerSettings>,
    faces: Res<FaceTextures>,
) {
    let camera_transform =
        Transform::from_xyz(0.0, 0.0, camera_distance(&settings.dice)).looking_at(Vec3::ZERO, Vec3::Y);
    commands.spawn((Camera3d::default(), camera_transform, MainCamera));

    commands.spawn((
        DirectionalLight {
            illuminance: 10000.0,
            ..default()
        },
        Transform::from_xyz(3.0, 5.0, 8.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let size = settings.dice.size;
    let quad = meshes.add(Rectangle::new(size, size));
    let face_materials: Vec<Handle<StandardMaterial>> = (1..=FACE_COUNT)
        .map(|face| {
            materials.add(StandardMaterial {
                base_color_texture: faces.face(face),
                unlit: true,
                ..default()
            })
        })
        .collect();

    let count = settings.dice.count;
    for index in 0..count {
        let position = row_position(index, count, settings.dice.spacing);
        commands
            .spawn((
                Transform::from_translation(position),
                Visibility::default(),
                Die { index },
                VolumetricAnimator::new(&settings.animation),
            ))
            .with_children(|parent| {
                for (face, material) in (1..=FACE_COUNT).zip(&face_materials) {
                    let transform = Transform::from_translation(face_normal(face) * size * 0.5)
                        .with_rotation(face_orientation(face).inverse());
                    parent.spawn((
                        Mesh3d(quad.clone()),
                        MeshMaterial3d(material.clone()),
                        transform,
                    ));
                }
            });
    }

    spawn_hud(&mut commands);
    info!("Spawned {} volumetric dice", count);
}

pub fn setup_planar_scene(
    mut commands: Commands,
    mut controller: ResMut<RollController>,
    settings: Res<ShakerSettings>,
    faces: Res<FaceTextures>,
) {
    commands.spawn((Camera2d, MainCamera));

    let size = settings.dice.size * PLANAR_PIXELS_PER_UNIT;
    let count = settings.dice.count;
    for index in 0..count {
        let position = row_position(index, count, settings.dice.spacing) * PLANAR_PIXELS_PER_UNIT;
        let animator = PlanarAnimator::new(&settings.animation, &settings.fx, controller.rng_mut());

        let mut die = commands.spawn((
            Sprite {
                image: faces.face(DEFAULT_FACE).unwrap_or_default(),
                custom_size: Some(Vec2::splat(size)),
                ..default()
            },
            Transform::from_translation(position),
            Die { index },
            animator,
        ));
        if settings.fx.ghost_trail {
            die.insert(GhostTrail::new(&settings.fx));
        }
    }

    spawn_hud(&mut commands);
    info!("Spawned {} planar dice", count);
}

fn spawn_hud(commands: &mut Commands) {
    commands.spawn((
        Text::new(status_message(RollStage::Ready, 0.0)),
        TextFont {
            font_size: 22.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(16.0),
            left: Val::Px(16.0),
            ..default()
        },
        StatusText,
    ));

    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.0)),
            Visibility::Hidden,
            ResultsOverlay,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(""),
                TextFont {
                    font_size: 36.0,
                    ..default()
                },
                TextColor(Color::srgba(1.0, 1.0, 1.0, 0.0)),
                ResultsText,
            ));
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_textures_clamp_requests() {
        let textures = FaceTextures {
            images: (0..6).map(|_| Handle::default()).collect(),
        };
        assert!(textures.face(0).is_some());
        assert!(textures.face(6).is_some());
        assert!(textures.face(99).is_some());
        assert!(FaceTextures::default().face(1).is_none());
    }

    #[test]
    fn test_camera_distance_grows_with_row() {
        let mut dice = DiceSettings::default();
        let six = camera_distance(&dice);
        dice.count = 20;
        assert!(camera_distance(&dice) > six);
        dice.count = 1;
        assert_eq!(camera_distance(&dice), 6.0);
    }
}
