//! Systems module for the dice shaker
//!
//! Bevy systems that host the roll controller, organized into submodules:
//!
//! - `setup`: Camera, dice row and HUD spawning
//! - `input`: The SPACE / click trigger
//! - `roll`: Controller driving and animator-to-transform sync
//! - `audio`: Sound cue playback and spin loop fades
//! - `overlay`: Status line and results overlay

mod audio;
mod input;
mod overlay;
mod roll;
mod setup;

pub use audio::{fade_spin_loops, load_shaker_sounds, play_roll_cues, ShakerSounds, SpinLoop};
pub use input::handle_trigger_input;
pub use overlay::{apply_results_cues, fade_results_overlay, update_status_text};
pub use roll::{
    drive_roll_controller, fade_ghosts, spawn_ghosts, sync_planar_dice, sync_volumetric_dice,
    track_camera_forward,
};
pub use setup::{load_face_textures, setup_planar_scene, setup_volumetric_scene, FaceTextures};
