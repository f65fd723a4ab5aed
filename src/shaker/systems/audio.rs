//! Audio host
//!
//! Plays the sound cues written by the roll controller. Every clip is
//! optional; a cue whose clip was not configured is dropped silently.

use bevy::audio::{AudioPlayer, AudioSinkPlayback, AudioSource, PlaybackSettings, Volume};
use bevy::prelude::*;
use rand::seq::SliceRandom;

use crate::shaker::controller::RollController;
use crate::shaker::types::*;

#[derive(Resource, Clone, Default)]
pub struct ShakerSounds {
    pub start: Option<Handle<AudioSource>>,
    pub spin_loop: Option<Handle<AudioSource>>,
    pub ticks: Vec<Handle<AudioSource>>,
    pub stop: Option<Handle<AudioSource>>,
    pub reveal: Option<Handle<AudioSource>>,
    pub press: Option<Handle<AudioSource>>,
    pub settle: Option<Handle<AudioSource>>,
}

impl ShakerSounds {
    pub fn one_shot(&self, sound: SoundKind) -> Option<Handle<AudioSource>> {
        match sound {
            SoundKind::Start => self.start.clone(),
            SoundKind::Press => self.press.clone(),
            SoundKind::Stop => self.stop.clone(),
            SoundKind::Reveal => self.reveal.clone(),
            SoundKind::Settle => self.settle.clone(),
        }
    }

    fn loaded_count(&self) -> usize {
        [
            &self.start,
            &self.spin_loop,
            &self.stop,
            &self.reveal,
            &self.press,
            &self.settle,
        ]
        .iter()
        .filter(|h| h.is_some())
        .count()
            + self.ticks.len()
    }
}

/// One looping spin sound per die while shaking.
#[derive(Component, Debug)]
pub struct SpinLoop {
    pub die: usize,
    volume: f32,
    /// Volume lost per second once the loop is fading out.
    fade_rate: Option<f32>,
}

pub fn load_shaker_sounds(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    settings: Res<ShakerSettings>,
) {
    let clips = &settings.audio.clips;
    let load = |path: &Option<String>| path.as_ref().map(|p| asset_server.load(p.clone()));

    let sounds = ShakerSounds {
        start: load(&clips.start),
        spin_loop: load(&clips.spin_loop),
        ticks: clips.ticks.iter().map(|p| asset_server.load(p.clone())).collect(),
        stop: load(&clips.stop),
        reveal: load(&clips.reveal),
        press: load(&clips.press),
        settle: load(&clips.settle),
    };

    if settings.audio.enabled && sounds.loaded_count() == 0 {
        info!("No sound clips configured; the shaker will run silently");
    }
    commands.insert_resource(sounds);
}

fn spawn_one_shot(commands: &mut Commands, clip: Handle<AudioSource>, volume: f32, pitch: f32) {
    commands.spawn((
        AudioPlayer(clip),
        PlaybackSettings::DESPAWN
            .with_volume(Volume::Linear(volume))
            .with_speed(pitch),
    ));
}

pub fn play_roll_cues(
    mut commands: Commands,
    sounds: Res<ShakerSounds>,
    mut cues: MessageReader<RollCue>,
    mut loops: Query<(Entity, &mut SpinLoop, Option<&mut AudioSink>)>,
    dice: Query<&Die>,
) {
    let mut rng = rand::thread_rng();

    for cue in cues.read() {
        match cue {
            RollCue::PlayOneShot {
                sound,
                volume,
                pitch,
            } => {
                if let Some(clip) = sounds.one_shot(*sound) {
                    spawn_one_shot(&mut commands, clip, *volume, *pitch);
                }
            }
            RollCue::Tick { volume, pitch, .. } => {
                if let Some(clip) = sounds.ticks.choose(&mut rng) {
                    spawn_one_shot(&mut commands, clip.clone(), *volume, *pitch);
                }
            }
            RollCue::LoopMix { volume, pitch } => {
                let Some(clip) = &sounds.spin_loop else {
                    continue;
                };
                if loops.is_empty() {
                    for die in dice.iter() {
                        commands.spawn((
                            AudioPlayer(clip.clone()),
                            PlaybackSettings::LOOP
                                .with_volume(Volume::Linear(*volume))
                                .with_speed(*pitch),
                            SpinLoop {
                                die: die.index,
                                volume: *volume,
                                fade_rate: None,
                            },
                        ));
                    }
                    continue;
                }
                for (_, mut spin, sink) in loops.iter_mut() {
                    spin.volume = *volume;
                    spin.fade_rate = None;
                    if let Some(mut sink) = sink {
                        sink.set_volume(Volume::Linear(*volume));
                        sink.set_speed(*pitch);
                    }
                }
            }
            RollCue::HardMute => {
                for (entity, _, _) in loops.iter() {
                    commands.entity(entity).despawn();
                }
            }
            _ => {}
        }
    }
}

/// Outside Shaking, bring any loop still playing down to silence.
pub fn fade_spin_loops(
    time: Res<Time>,
    mut commands: Commands,
    controller: Res<RollController>,
    settings: Res<ShakerSettings>,
    mut loops: Query<(Entity, &mut SpinLoop, Option<&mut AudioSink>)>,
) {
    if controller.stage() == RollStage::Shaking {
        return;
    }

    let fade_time = settings.audio.loop_fade_out_time;
    let dt = time.delta_secs();
    for (entity, mut spin, sink) in loops.iter_mut() {
        if fade_time <= 0.0 {
            commands.entity(entity).despawn();
            continue;
        }

        let initial_rate = spin.volume / fade_time;
        let rate = *spin.fade_rate.get_or_insert(initial_rate);
        spin.volume = (spin.volume - rate * dt).max(0.0);
        if spin.volume <= 0.0 {
            commands.entity(entity).despawn();
        } else if let Some(mut sink) = sink {
            sink.set_volume(Volume::Linear(spin.volume));
        }
    }
}
