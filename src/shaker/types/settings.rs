//! Shaker settings and persistence
//!
//! Every tunable of the roll controller, the die animators, the FX layer and
//! the audio host lives here. Settings are stored as RON; every field has a
//! default so a partial file only overrides what it names.

use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] ron::Error),

    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

// ============================================================================
// Enums
// ============================================================================

/// Which die animator drives the row of dice.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum DieVariant {
    /// Flat sprites rolling in the screen plane.
    Planar,
    /// Textured cubes spinning around a per-die axis.
    #[default]
    Volumetric,
}

impl DieVariant {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Planar => "planar",
            Self::Volumetric => "volumetric",
        }
    }
}

/// Built-in face skins.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum SkinPreset {
    Classic,
    #[default]
    Dark,
    Candy,
    Neon,
}

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiceSettings {
    pub count: usize,
    pub spacing: f32,
    pub size: f32,
    /// Base rotation speed in degrees per second at a speed factor of 1.
    pub rotation_speed: f32,
    pub variant: DieVariant,
    /// Upper bound on |dot(axis, camera forward)| when picking spin axes.
    pub camera_dot_limit: f32,
}

impl Default for DiceSettings {
    fn default() -> Self {
        Self {
            count: 6,
            spacing: 1.4,
            size: 1.0,
            rotation_speed: 240.0,
            variant: DieVariant::default(),
            camera_dot_limit: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergySettings {
    pub energy_per_press: f32,
    pub max_energy: f32,

    /// Asymptotic cap `A` of the speed factor curve.
    pub speed_cap: f32,
    /// Rate `B` of the speed factor curve.
    pub speed_rate: f32,

    pub decay_base: f32,
    /// Decay rate reached once the player has been idle for a while.
    pub decay_idle: f32,
    pub idle_threshold: f32,
    pub ramp_duration: f32,

    /// Energy above which the extra energy-proportional decay kicks in (`E0`).
    pub energy_threshold: f32,
    pub energy_decay_k: f32,
    /// Friction per degree/second of average die speed.
    pub speed_friction_k: f32,

    pub max_stop_time: f32,
    pub stop_speed_threshold_deg: f32,
    /// Planar dice only: grace period after energy runs out.
    pub shake_buffer_time: f32,
}

impl Default for EnergySettings {
    fn default() -> Self {
        Self {
            energy_per_press: 1.0,
            max_energy: 5.0,
            speed_cap: 2.0,
            speed_rate: 1.0,
            decay_base: 0.8,
            decay_idle: 3.2,
            idle_threshold: 0.3,
            ramp_duration: 0.4,
            energy_threshold: 1.8,
            energy_decay_k: 0.6,
            speed_friction_k: 0.005,
            max_stop_time: 1.0,
            stop_speed_threshold_deg: 8.0,
            shake_buffer_time: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageTiming {
    /// Delay between the dice settling and the total being shown.
    pub reveal_delay: f32,
    pub overlay_fade_duration: f32,
    pub overlay_target_alpha: f32,
}

impl Default for StageTiming {
    fn default() -> Self {
        Self {
            reveal_delay: 1.0,
            overlay_fade_duration: 0.4,
            overlay_target_alpha: 0.6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    pub planar_smooth_factor: f32,
    pub volumetric_smooth_factor: f32,
    pub align_speed: f32,

    pub squash_max: f32,
    pub squash_speed_ref: f32,

    pub flip_threshold_angle: f32,
    pub flip_duration: f32,
    pub flip_min_scale_x: f32,
    /// Below this speed (deg/s) no flips are triggered.
    pub flip_min_speed: f32,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            planar_smooth_factor: 10.0,
            volumetric_smooth_factor: 12.0,
            align_speed: 12.0,
            squash_max: 0.35,
            squash_speed_ref: 720.0,
            flip_threshold_angle: 120.0,
            flip_duration: 0.12,
            flip_min_scale_x: 0.15,
            flip_min_speed: 90.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FxSettings {
    pub ghost_trail: bool,
    pub flip: bool,
    pub squash: bool,

    pub ghost_spawn_interval: f32,
    pub ghost_lifetime: f32,
    pub ghost_initial_alpha: f32,
}

impl Default for FxSettings {
    fn default() -> Self {
        Self {
            ghost_trail: true,
            flip: true,
            squash: true,
            ghost_spawn_interval: 0.05,
            ghost_lifetime: 0.25,
            ghost_initial_alpha: 0.35,
        }
    }
}

/// Asset paths of the sound clips. Any clip may be left out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioClipPaths {
    pub start: Option<String>,
    pub spin_loop: Option<String>,
    pub ticks: Vec<String>,
    pub stop: Option<String>,
    pub reveal: Option<String>,
    pub press: Option<String>,
    /// Click played when a cube lands on its result face.
    pub settle: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub enabled: bool,
    pub loop_enabled: bool,
    pub tick_enabled: bool,
    pub press_enabled: bool,

    pub clips: AudioClipPaths,

    pub volume_master: f32,
    pub volume_loop: f32,
    pub volume_tick: f32,
    pub volume_one_shot: f32,

    pub loop_pitch_min: f32,
    pub loop_pitch_max: f32,
    pub loop_fade_out_time: f32,

    pub tick_base_interval: f32,
    pub tick_min_interval: f32,
    pub tick_speed_scale: f32,
    pub tick_pitch_jitter: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            loop_enabled: true,
            tick_enabled: true,
            press_enabled: false,
            clips: AudioClipPaths::default(),
            volume_master: 1.0,
            volume_loop: 0.25,
            volume_tick: 0.35,
            volume_one_shot: 0.6,
            loop_pitch_min: 0.9,
            loop_pitch_max: 1.2,
            loop_fade_out_time: 0.3,
            tick_base_interval: 0.25,
            tick_min_interval: 0.08,
            tick_speed_scale: 1.0,
            tick_pitch_jitter: 0.08,
        }
    }
}

/// Face skin selection plus optional CSS colour overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkinSettings {
    pub preset: SkinPreset,
    /// Edge length of each face image in pixels.
    pub size: u32,
    pub background: Option<String>,
    pub background2: Option<String>,
    pub border_color: Option<String>,
    pub pip_color: Option<String>,
}

impl SkinSettings {
    pub const MIN_SIZE: u32 = 16;
    pub const MAX_SIZE: u32 = 2048;
}

impl Default for SkinSettings {
    fn default() -> Self {
        Self {
            preset: SkinPreset::default(),
            size: 256,
            background: None,
            background2: None,
            border_color: None,
            pip_color: None,
        }
    }
}

// ============================================================================
// Top level
// ============================================================================

#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShakerSettings {
    #[serde(default)]
    pub dice: DiceSettings,
    #[serde(default)]
    pub energy: EnergySettings,
    #[serde(default)]
    pub timing: StageTiming,
    #[serde(default)]
    pub animation: AnimationSettings,
    #[serde(default)]
    pub fx: FxSettings,
    #[serde(default)]
    pub audio: AudioSettings,
    #[serde(default)]
    pub skin: SkinSettings,

    /// Fixed RNG seed for reproducible rounds.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl ShakerSettings {
    pub fn from_ron_str(text: &str) -> Result<Self, SettingsError> {
        let settings: Self = ron::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_ron_string(&self) -> Result<String, SettingsError> {
        let pretty = ron::ser::PrettyConfig::default();
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Load settings from a RON file.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&text)
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let text = self.to_ron_string()?;
        std::fs::write(path, text).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.dice.count == 0 {
            return Err(invalid("dice.count", "at least one die is required"));
        }
        if self.energy.max_energy <= 0.0 {
            return Err(invalid("energy.max_energy", "must be positive"));
        }
        if !(self.energy.energy_per_press > 0.0) {
            return Err(invalid("energy.energy_per_press", "must be positive"));
        }
        if self.energy.speed_cap <= 0.0 || self.energy.speed_rate <= 0.0 {
            return Err(invalid(
                "energy.speed_cap / energy.speed_rate",
                "speed curve constants must be positive",
            ));
        }

        let non_negative = [
            ("energy.max_stop_time", self.energy.max_stop_time),
            ("energy.shake_buffer_time", self.energy.shake_buffer_time),
            ("timing.reveal_delay", self.timing.reveal_delay),
            ("timing.overlay_fade_duration", self.timing.overlay_fade_duration),
            ("audio.loop_fade_out_time", self.audio.loop_fade_out_time),
            ("audio.tick_min_interval", self.audio.tick_min_interval),
            ("fx.ghost_lifetime", self.fx.ghost_lifetime),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0) {
                return Err(invalid(field, format!("must be >= 0, got {value}")));
            }
        }

        if !(SkinSettings::MIN_SIZE..=SkinSettings::MAX_SIZE).contains(&self.skin.size) {
            return Err(invalid(
                "skin.size",
                format!(
                    "must be within {}..={}, got {}",
                    SkinSettings::MIN_SIZE,
                    SkinSettings::MAX_SIZE,
                    self.skin.size
                ),
            ));
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> SettingsError {
    SettingsError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ShakerSettings::default().validate().is_ok());
    }

    #[test]
    fn test_partial_ron_fills_defaults() {
        let settings =
            ShakerSettings::from_ron_str("(dice: (count: 3, variant: planar), seed: Some(7))")
                .unwrap();
        assert_eq!(settings.dice.count, 3);
        assert_eq!(settings.dice.variant, DieVariant::Planar);
        assert_eq!(settings.dice.rotation_speed, 240.0);
        assert_eq!(settings.energy, EnergySettings::default());
        assert_eq!(settings.seed, Some(7));
    }

    #[test]
    fn test_ron_round_trip() {
        let mut settings = ShakerSettings::default();
        settings.skin.preset = SkinPreset::Neon;
        settings.audio.clips.ticks = vec!["sounds/tick_a.ogg".into()];
        let text = settings.to_ron_string().unwrap();
        assert_eq!(ShakerSettings::from_ron_str(&text).unwrap(), settings);
    }

    #[test]
    fn test_zero_dice_rejected() {
        let err = ShakerSettings::from_ron_str("(dice: (count: 0))").unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { field: "dice.count", .. }));
    }

    #[test]
    fn test_negative_duration_rejected() {
        let err = ShakerSettings::from_ron_str("(timing: (reveal_delay: -1.0))").unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Invalid {
                field: "timing.reveal_delay",
                ..
            }
        ));
    }

    #[test]
    fn test_oversized_skin_rejected() {
        let err = ShakerSettings::from_ron_str("(skin: (size: 40000))").unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { field: "skin.size", .. }));
        let err = ShakerSettings::from_ron_str("(skin: (size: 4))").unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { field: "skin.size", .. }));
        assert!(ShakerSettings::from_ron_str("(skin: (size: 2048))").is_ok());
    }

    #[test]
    fn test_zero_energy_per_press_rejected() {
        let err =
            ShakerSettings::from_ron_str("(energy: (energy_per_press: 0.0))").unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Invalid {
                field: "energy.energy_per_press",
                ..
            }
        ));
    }

    #[test]
    fn test_garbage_is_parse_error() {
        assert!(matches!(
            ShakerSettings::from_ron_str("(dice: 12"),
            Err(SettingsError::Parse(_))
        ));
    }
}
