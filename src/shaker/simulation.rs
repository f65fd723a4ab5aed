//! Headless roll simulation
//!
//! Drives a [`RollController`] and a row of animators at a fixed time step
//! without a window. Used by the `--simulate` CLI mode and the integration
//! tests.

use serde::Serialize;

use crate::shaker::animator::{AnimatorEvent, DieAnimator, PlanarAnimator, VolumetricAnimator};
use crate::shaker::controller::RollController;
use crate::shaker::types::*;

/// Presses scheduled within this many seconds of the clock fire on that step.
const PRESS_TOLERANCE: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StageTransition {
    pub time: f32,
    pub stage: RollStage,
}

/// Summary of a simulated run.
#[derive(Debug, Clone, Serialize)]
pub struct RoundReport {
    pub variant: DieVariant,
    pub dice: usize,
    pub seed: Option<u64>,
    pub duration: f32,
    pub transitions: Vec<StageTransition>,
    pub final_stage: RollStage,
    pub faces: Vec<u32>,
    pub total: Option<u32>,
    pub peak_energy: f32,
    pub one_shots: Vec<SoundKind>,
    pub ticks: usize,
    pub flips: usize,
}

pub struct Simulation<A: DieAnimator> {
    controller: RollController,
    dice: Vec<A>,
    variant: DieVariant,
    seed: Option<u64>,
    transitions: Vec<StageTransition>,
    peak_energy: f32,
    one_shots: Vec<SoundKind>,
    ticks: usize,
    flips: usize,
}

impl Simulation<VolumetricAnimator> {
    pub fn volumetric(settings: &ShakerSettings) -> Self {
        let dice = (0..settings.dice.count)
            .map(|_| VolumetricAnimator::new(&settings.animation))
            .collect();
        Self::with_dice(settings, RollController::new(settings), dice, DieVariant::Volumetric)
    }
}

impl Simulation<PlanarAnimator> {
    pub fn planar(settings: &ShakerSettings) -> Self {
        let mut controller = RollController::new(settings);
        let dice = (0..settings.dice.count)
            .map(|_| PlanarAnimator::new(&settings.animation, &settings.fx, controller.rng_mut()))
            .collect();
        Self::with_dice(settings, controller, dice, DieVariant::Planar)
    }
}

impl<A: DieAnimator> Simulation<A> {
    fn with_dice(
        settings: &ShakerSettings,
        controller: RollController,
        dice: Vec<A>,
        variant: DieVariant,
    ) -> Self {
        Self {
            controller,
            dice,
            variant,
            seed: settings.seed,
            transitions: Vec::new(),
            peak_energy: 0.0,
            one_shots: Vec::new(),
            ticks: 0,
            flips: 0,
        }
    }

    pub fn controller(&self) -> &RollController {
        &self.controller
    }

    pub fn dice(&self) -> &[A] {
        &self.dice
    }

    pub fn transitions(&self) -> &[StageTransition] {
        &self.transitions
    }

    pub fn trigger(&mut self) {
        self.controller.trigger(&mut self.dice);
        self.collect_cues();
    }

    /// One fixed step: controller first, then the dice.
    pub fn step(&mut self, dt: f32) {
        self.controller.tick(dt, &mut self.dice);
        for (_, event) in self.controller.advance_dice(dt, &mut self.dice) {
            if let AnimatorEvent::Flipped(_) = event {
                self.flips += 1;
            }
        }
        self.collect_cues();
    }

    /// Run until the controller clock reaches `duration`, pressing the
    /// trigger at each of `presses` (seconds, any order).
    pub fn run(&mut self, presses: &[f32], dt: f32, duration: f32) {
        let mut pending: Vec<f32> = presses.to_vec();
        pending.sort_by(|a, b| a.total_cmp(b));
        let mut next = 0;
        let dt = dt.max(1e-4);

        while self.controller.clock() < duration {
            while next < pending.len() && pending[next] <= self.controller.clock() + PRESS_TOLERANCE {
                self.trigger();
                next += 1;
            }
            self.step(dt);
        }
    }

    /// Step until `stage` is reached. Returns false if `max_secs` ran out.
    pub fn run_until_stage(&mut self, stage: RollStage, dt: f32, max_secs: f32) -> bool {
        let deadline = self.controller.clock() + max_secs;
        let dt = dt.max(1e-4);
        while self.controller.stage() != stage {
            if self.controller.clock() >= deadline {
                return false;
            }
            self.step(dt);
        }
        true
    }

    pub fn report(&self) -> RoundReport {
        let session = self.controller.session();
        RoundReport {
            variant: self.variant,
            dice: self.dice.len(),
            seed: self.seed,
            duration: self.controller.clock(),
            transitions: self.transitions.clone(),
            final_stage: session.stage,
            faces: session.die_faces.clone(),
            total: session.has_faces().then(|| session.total()),
            peak_energy: self.peak_energy,
            one_shots: self.one_shots.clone(),
            ticks: self.ticks,
            flips: self.flips,
        }
    }

    fn collect_cues(&mut self) {
        self.peak_energy = self.peak_energy.max(self.controller.session().spin_energy);
        let time = self.controller.clock();
        for cue in self.controller.drain_cues() {
            match cue {
                RollCue::StageChanged(stage) => self.transitions.push(StageTransition { time, stage }),
                RollCue::PlayOneShot { sound, .. } => self.one_shots.push(sound),
                RollCue::Tick { .. } => self.ticks += 1,
                _ => {}
            }
        }
    }
}
