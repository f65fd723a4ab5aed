//! Bevy plugin wiring the shaker together

use bevy::prelude::*;

use crate::shaker::animator::{PlanarAnimator, VolumetricAnimator};
use crate::shaker::controller::RollController;
use crate::shaker::systems::*;
use crate::shaker::types::*;

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ShakerSet {
    /// Input, controller tick and animator sync.
    Roll,
    /// Audio and UI reacting to this frame's cues.
    Present,
}

pub struct ShakerPlugin {
    pub settings: ShakerSettings,
}

impl ShakerPlugin {
    pub fn new(settings: ShakerSettings) -> Self {
        Self { settings }
    }
}

impl Plugin for ShakerPlugin {
    fn build(&self, app: &mut App) {
        let settings = self.settings.clone();

        app.insert_resource(RollController::new(&settings))
            .insert_resource(settings.clone())
            .add_message::<RollCue>()
            .configure_sets(Update, (ShakerSet::Roll, ShakerSet::Present).chain())
            .add_systems(Startup, (load_face_textures, load_shaker_sounds))
            .add_systems(
                Update,
                (
                    play_roll_cues,
                    fade_spin_loops,
                    apply_results_cues,
                    update_status_text,
                    fade_results_overlay,
                )
                    .chain()
                    .in_set(ShakerSet::Present),
            );

        match settings.dice.variant {
            DieVariant::Volumetric => {
                app.add_systems(Startup, setup_volumetric_scene.after(load_face_textures))
                    .add_systems(
                        Update,
                        (
                            track_camera_forward,
                            handle_trigger_input::<VolumetricAnimator>,
                            drive_roll_controller::<VolumetricAnimator>,
                            sync_volumetric_dice,
                        )
                            .chain()
                            .in_set(ShakerSet::Roll),
                    );
            }
            DieVariant::Planar => {
                app.add_systems(Startup, setup_planar_scene.after(load_face_textures))
                    .add_systems(
                        Update,
                        (
                            handle_trigger_input::<PlanarAnimator>,
                            drive_roll_controller::<PlanarAnimator>,
                            sync_planar_dice,
                            spawn_ghosts,
                            fade_ghosts,
                        )
                            .chain()
                            .in_set(ShakerSet::Roll),
                    );
            }
        }

        info!(
            "Shaker ready: {} {} dice, {:?} skin",
            settings.dice.count,
            settings.dice.variant.label(),
            settings.skin.preset
        );
    }
}
