//! Roll controller
//!
//! Owns the [`RollSession`] and advances it through
//! Ready → Shaking → Revealed → TotalShown → Ready. Input arrives as
//! [`RollController::trigger`], time as [`RollController::tick`]. Every side
//! effect meant for the audio or UI host is recorded as a [`RollCue`].

use bevy::log::{debug, info};
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::shaker::animator::{random_axis_not_near, AnimatorEvent, DieAnimator};
use crate::shaker::energy::{inverse_lerp, lerp, ENERGY_EPSILON};
use crate::shaker::types::*;

/// Settle clicks vary their pitch by this much either way.
const SETTLE_PITCH_JITTER: f32 = 0.05;

#[derive(Resource)]
pub struct RollController {
    energy: EnergySettings,
    timing: StageTiming,
    audio: AudioSettings,
    rotation_speed: f32,
    camera_forward: Vec3,
    camera_dot_limit: f32,

    session: RollSession,
    /// Seconds since the controller was created, advanced only by `tick`.
    clock: f32,
    tick_timer: f32,
    rng: StdRng,
    cues: Vec<RollCue>,
}

impl RollController {
    pub fn new(settings: &ShakerSettings) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            energy: settings.energy.clone(),
            timing: settings.timing.clone(),
            audio: settings.audio.clone(),
            rotation_speed: settings.dice.rotation_speed,
            camera_forward: Vec3::NEG_Z,
            camera_dot_limit: settings.dice.camera_dot_limit,
            session: RollSession::default(),
            clock: 0.0,
            tick_timer: 0.0,
            rng,
            cues: Vec::new(),
        }
    }

    /// Direction the camera looks in; spin axes avoid lining up with it.
    pub fn set_camera_forward(&mut self, forward: Vec3) {
        self.camera_forward = forward.normalize_or(Vec3::NEG_Z);
    }

    pub fn camera_forward(&self) -> Vec3 {
        self.camera_forward
    }

    pub fn session(&self) -> &RollSession {
        &self.session
    }

    pub fn stage(&self) -> RollStage {
        self.session.stage
    }

    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn speed_factor(&self) -> f32 {
        self.energy.speed_factor(self.session.spin_energy)
    }

    /// Angular speed pushed to every die, degrees per second.
    pub fn commanded_speed(&self) -> f32 {
        self.rotation_speed * self.speed_factor()
    }

    /// (background alpha, text alpha) of the results overlay.
    pub fn overlay_alpha(&self) -> (f32, f32) {
        if self.session.stage != RollStage::TotalShown {
            return (0.0, 0.0);
        }
        let k = self.session.overlay_progress.clamp(0.0, 1.0);
        (self.timing.overlay_target_alpha * k, k)
    }

    pub fn status_message(&self) -> String {
        status_message(self.session.stage, self.session.reveal_timer)
    }

    /// Take every cue recorded since the last drain.
    pub fn drain_cues(&mut self) -> Vec<RollCue> {
        std::mem::take(&mut self.cues)
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    /// The single user action. What it does depends on the stage; while
    /// Revealed it is ignored.
    pub fn trigger<A: DieAnimator>(&mut self, dice: &mut [A]) {
        match self.session.stage {
            RollStage::Ready => self.start_shaking(dice),
            RollStage::Shaking => {
                self.session.spin_energy = self.energy.add_press(self.session.spin_energy);
                self.session.last_trigger_time = self.clock;
                self.press_sound();
            }
            RollStage::Revealed => {}
            RollStage::TotalShown => self.reset_round(dice),
        }
    }

    // ------------------------------------------------------------------
    // Time
    // ------------------------------------------------------------------

    /// Advance the round by `dt` seconds and push the resulting speed to
    /// every die. Call [`Self::advance_dice`] afterwards to move the dice.
    pub fn tick<A: DieAnimator>(&mut self, dt: f32, dice: &mut [A]) {
        let dt = dt.max(0.0);
        self.clock += dt;

        if self.session.stage == RollStage::Shaking {
            self.decay_energy(dt, dice);
        }

        let speed = self.commanded_speed();
        for die in dice.iter_mut() {
            die.command_speed(speed);
        }

        match self.session.stage {
            RollStage::Ready => {}
            RollStage::Shaking => {
                self.shaking_audio(dt, dice.len());
                if self.natural_stop_reached(dt, dice) {
                    self.stop_and_reveal(dice);
                }
            }
            RollStage::Revealed => {
                self.session.reveal_timer -= dt;
                if self.session.reveal_timer <= 0.0 {
                    self.show_total();
                }
            }
            RollStage::TotalShown => {
                let step = dt / self.timing.overlay_fade_duration.max(0.01);
                self.session.overlay_progress = (self.session.overlay_progress + step).min(1.0);
            }
        }
    }

    /// Run each die's own per-tick update. Returns the events they reported,
    /// tagged with the die index.
    pub fn advance_dice<A: DieAnimator>(
        &mut self,
        dt: f32,
        dice: &mut [A],
    ) -> Vec<(usize, AnimatorEvent)> {
        let mut events = Vec::new();
        for (index, die) in dice.iter_mut().enumerate() {
            if let Some(event) = die.advance(dt, &mut self.rng) {
                if let AnimatorEvent::Settled(_) = event {
                    self.settle_sound();
                }
                events.push((index, event));
            }
        }
        events
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    fn set_stage(&mut self, stage: RollStage) {
        info!("Roll stage {} -> {}", self.session.stage.name(), stage.name());
        self.session.stage = stage;
        self.cues.push(RollCue::StageChanged(stage));
    }

    fn start_shaking<A: DieAnimator>(&mut self, dice: &mut [A]) {
        if self.session.spin_energy <= 0.0 {
            self.session.spin_energy = self.energy.energy_per_press.min(self.energy.max_energy);
        }
        self.session.last_trigger_time = self.clock;
        self.session.shake_buffer_timer = self.energy.shake_buffer_time;
        self.tick_timer = 0.0;

        for die in dice.iter_mut() {
            let axis = random_axis_not_near(&mut self.rng, self.camera_forward, self.camera_dot_limit);
            die.set_axis(axis);
            die.set_spinning(true);
        }

        self.set_stage(RollStage::Shaking);
        self.one_shot(SoundKind::Start, self.audio.volume_one_shot, 1.0);
        self.press_sound();
    }

    fn stop_and_reveal<A: DieAnimator>(&mut self, dice: &mut [A]) {
        self.session.spin_energy = 0.0;
        self.tick_timer = 0.0;
        self.hard_mute();
        self.one_shot(SoundKind::Stop, self.audio.volume_one_shot, 1.0);

        let mut faces = Vec::with_capacity(dice.len());
        for die in dice.iter_mut() {
            let face = self.rng.gen_range(1..=FACE_COUNT);
            die.command_stop(face);
            faces.push(face);
        }
        info!("Dice settled on {:?}", faces);

        self.session.die_faces = faces;
        self.session.reveal_timer = self.timing.reveal_delay.max(0.0);
        self.set_stage(RollStage::Revealed);
    }

    fn show_total(&mut self) {
        let faces = self.session.die_faces.clone();
        let total = self.session.total();
        info!("Roll total {}", total);

        self.hard_mute();
        self.one_shot(SoundKind::Reveal, self.audio.volume_one_shot, 1.0);
        self.cues.push(RollCue::ShowResults { faces, total });

        self.session.reveal_timer = 0.0;
        self.session.overlay_progress = 0.0;
        self.set_stage(RollStage::TotalShown);
    }

    fn reset_round<A: DieAnimator>(&mut self, dice: &mut [A]) {
        self.session.clear_round();
        self.tick_timer = 0.0;
        for die in dice.iter_mut() {
            die.command_stop(DEFAULT_FACE);
        }
        self.cues.push(RollCue::HideResults);
        self.set_stage(RollStage::Ready);
    }

    // ------------------------------------------------------------------
    // Shaking internals
    // ------------------------------------------------------------------

    fn average_speed<A: DieAnimator>(&self, dice: &[A]) -> f32 {
        if A::SPEED_OBSERVABLE {
            if dice.is_empty() {
                return 0.0;
            }
            dice.iter().map(|d| d.current_speed()).sum::<f32>() / dice.len() as f32
        } else {
            self.commanded_speed()
        }
    }

    fn decay_energy<A: DieAnimator>(&mut self, dt: f32, dice: &[A]) {
        if self.session.spin_energy <= 0.0 {
            return;
        }
        let avg_speed = self.average_speed(dice);
        let idle = self.clock - self.session.last_trigger_time;
        self.session.spin_energy = self
            .energy
            .step(self.session.spin_energy, idle, avg_speed, dt);
        debug!(
            "spin energy {:.4} (idle {:.2}s, avg speed {:.1})",
            self.session.spin_energy, idle, avg_speed
        );
    }

    fn natural_stop_reached<A: DieAnimator>(&mut self, dt: f32, dice: &[A]) -> bool {
        if self.session.spin_energy > ENERGY_EPSILON {
            self.session.shake_buffer_timer = self.energy.shake_buffer_time;
            return false;
        }

        if A::SPEED_OBSERVABLE {
            let threshold = self.energy.stop_speed_threshold_deg;
            dice.iter().all(|d| d.current_speed() <= threshold)
        } else {
            self.session.shake_buffer_timer -= dt;
            self.session.shake_buffer_timer <= 0.0
        }
    }

    fn shaking_audio(&mut self, dt: f32, die_count: usize) {
        if !self.audio.enabled {
            return;
        }
        let factor = self.speed_factor();
        let cap = self.energy.speed_cap.max(0.01);

        if self.audio.loop_enabled {
            let t = inverse_lerp(0.0, cap, factor);
            let pitch = lerp(self.audio.loop_pitch_min, self.audio.loop_pitch_max, t);
            let volume =
                self.audio.volume_master * self.audio.volume_loop * (factor / cap).clamp(0.0, 1.0);
            self.cues.push(RollCue::LoopMix { volume, pitch });
        }

        if self.audio.tick_enabled {
            let interval = (self.audio.tick_base_interval
                / (1.0 + factor * self.audio.tick_speed_scale.max(0.0)))
            .max(self.audio.tick_min_interval);

            self.tick_timer -= dt;
            if self.tick_timer <= 0.0 {
                self.tick_timer = interval;
                let die = if die_count > 0 {
                    self.rng.gen_range(0..die_count)
                } else {
                    0
                };
                let jitter = self.audio.tick_pitch_jitter.abs();
                let pitch = if jitter > 0.0 {
                    1.0 + self.rng.gen_range(-jitter..jitter)
                } else {
                    1.0
                };
                self.cues.push(RollCue::Tick {
                    die,
                    volume: self.audio.volume_master * self.audio.volume_tick,
                    pitch: pitch.clamp(0.5, 2.0),
                });
            }
        }
    }

    // ------------------------------------------------------------------
    // Sounds
    // ------------------------------------------------------------------

    fn one_shot(&mut self, sound: SoundKind, volume: f32, pitch: f32) {
        if !self.audio.enabled {
            return;
        }
        self.cues.push(RollCue::PlayOneShot {
            sound,
            volume: self.audio.volume_master * volume,
            pitch,
        });
    }

    fn hard_mute(&mut self) {
        if self.audio.enabled {
            self.cues.push(RollCue::HardMute);
        }
    }

    fn press_sound(&mut self) {
        if self.audio.press_enabled {
            self.one_shot(SoundKind::Press, (self.audio.volume_one_shot * 0.6).min(0.6), 1.0);
        }
    }

    fn settle_sound(&mut self) {
        let pitch = 1.0 + self.rng.gen_range(-SETTLE_PITCH_JITTER..SETTLE_PITCH_JITTER);
        self.one_shot(SoundKind::Settle, self.audio.volume_one_shot.min(0.5), pitch);
    }
}
