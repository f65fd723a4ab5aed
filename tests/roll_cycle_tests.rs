//! Tests for the roll cycle, driven headless

use dicespin::shaker::animator::{DieAnimator, PlanarAnimator, VolumetricAnimator};
use dicespin::shaker::controller::RollController;
use dicespin::shaker::energy::ENERGY_EPSILON;
use dicespin::shaker::simulation::Simulation;
use dicespin::shaker::types::{RollCue, RollStage, ShakerSettings, DEFAULT_FACE};
use rand::SeedableRng;

const DT: f32 = 1.0 / 60.0;

fn seeded(seed: u64, count: usize) -> ShakerSettings {
    let mut settings = ShakerSettings {
        seed: Some(seed),
        ..Default::default()
    };
    settings.dice.count = count;
    settings
}

fn stage_order_is_cyclic(stages: &[RollStage]) -> bool {
    let mut expected = RollStage::Ready;
    stages.iter().all(|stage| {
        expected = expected.next();
        *stage == expected
    })
}

#[test]
fn test_two_press_scenario_reveals_six_dice() {
    let settings = seeded(2024, 6);
    let mut controller = RollController::new(&settings);
    let mut dice: Vec<VolumetricAnimator> = (0..6)
        .map(|_| VolumetricAnimator::new(&settings.animation))
        .collect();

    controller.trigger(&mut dice);
    assert_eq!(controller.stage(), RollStage::Shaking);
    assert_eq!(controller.session().spin_energy, 1.0);

    // Second press at t = 0.1 adds a full press on top of what is left.
    for _ in 0..6 {
        controller.tick(DT, &mut dice);
        controller.advance_dice(DT, &mut dice);
    }
    let before = controller.session().spin_energy;
    controller.trigger(&mut dice);
    assert!((controller.session().spin_energy - (before + 1.0)).abs() < 1e-6);
    assert!(controller.session().spin_energy <= 2.0);

    let deadline = settings.energy.max_stop_time + settings.energy.shake_buffer_time;
    let mut depleted_at = None;
    let mut revealed = false;
    for _ in 0..600 {
        controller.tick(DT, &mut dice);
        controller.advance_dice(DT, &mut dice);
        let energy = controller.session().spin_energy;
        assert!((0.0..=settings.energy.max_energy).contains(&energy));
        if depleted_at.is_none() && energy <= ENERGY_EPSILON {
            depleted_at = Some(controller.clock());
        }
        if controller.stage() == RollStage::Revealed {
            revealed = true;
            break;
        }
    }

    let depleted_at = depleted_at.unwrap();
    assert!(depleted_at <= deadline, "energy lasted until {depleted_at}");
    assert!(revealed);
    let faces = &controller.session().die_faces;
    assert_eq!(faces.len(), 6);
    assert!(faces.iter().all(|f| (1..=6).contains(f)));
}

#[test]
fn test_stages_never_skip_for_random_press_patterns() {
    let patterns: [&[f32]; 4] = [
        &[0.0],
        &[0.0, 0.05, 0.1, 0.15, 0.2, 0.25],
        &[0.0, 0.5, 1.0, 1.6, 1.7, 3.5, 3.6, 7.0],
        &[0.3, 0.31, 0.9, 2.0, 2.2, 2.4, 4.0, 4.1, 4.2],
    ];

    for (i, presses) in patterns.iter().enumerate() {
        let mut sim = Simulation::volumetric(&seeded(i as u64, 3));
        sim.run(presses, DT, 10.0);
        let stages: Vec<RollStage> = sim.transitions().iter().map(|t| t.stage).collect();
        assert!(!stages.is_empty());
        assert!(stage_order_is_cyclic(&stages), "pattern {i}: {stages:?}");

        let mut sim = Simulation::planar(&seeded(i as u64, 3));
        sim.run(presses, DT, 10.0);
        let stages: Vec<RollStage> = sim.transitions().iter().map(|t| t.stage).collect();
        assert!(stage_order_is_cyclic(&stages), "planar pattern {i}: {stages:?}");
    }
}

#[test]
fn test_transition_times_are_deterministic() {
    let presses = [0.0, 0.1, 0.2];
    let mut a = Simulation::volumetric(&seeded(1, 4));
    let mut b = Simulation::volumetric(&seeded(99, 4));
    a.run(&presses, DT, 4.0);
    b.run(&presses, DT, 4.0);

    // Stop detection reads speed magnitudes only, so the seeded spin axes
    // change the faces but never the timing.
    assert!(!a.transitions().is_empty());
    assert_eq!(a.transitions(), b.transitions());

    let mut planar_a = Simulation::planar(&seeded(1, 4));
    let mut planar_b = Simulation::planar(&seeded(99, 4));
    planar_a.run(&presses, DT, 4.0);
    planar_b.run(&presses, DT, 4.0);
    assert_eq!(planar_a.transitions(), planar_b.transitions());
}

#[test]
fn test_total_matches_faces_in_die_order() {
    let settings = seeded(5, 5);
    let mut controller = RollController::new(&settings);
    let mut dice: Vec<VolumetricAnimator> = (0..5)
        .map(|_| VolumetricAnimator::new(&settings.animation))
        .collect();

    controller.trigger(&mut dice);
    let mut revealed_faces = None;
    let mut shown = None;
    for _ in 0..600 {
        controller.tick(DT, &mut dice);
        controller.advance_dice(DT, &mut dice);
        for cue in controller.drain_cues() {
            match cue {
                RollCue::StageChanged(RollStage::Revealed) => {
                    revealed_faces = Some(controller.session().die_faces.clone());
                }
                RollCue::ShowResults { faces, total } => shown = Some((faces, total)),
                _ => {}
            }
        }
        if shown.is_some() {
            break;
        }
    }

    let revealed_faces = revealed_faces.unwrap();
    let (faces, total) = shown.unwrap();
    assert_eq!(faces, revealed_faces);
    assert_eq!(total, revealed_faces.iter().sum::<u32>());
    let on_dice: Vec<u32> = dice.iter().map(|d| d.face()).collect();
    assert_eq!(on_dice, revealed_faces);
}

#[test]
fn test_energy_is_zero_outside_shaking() {
    let mut sim = Simulation::planar(&seeded(8, 2));
    sim.trigger();
    let mut saw_shaking = false;
    for _ in 0..600 {
        sim.step(DT);
        let session = sim.controller().session();
        match session.stage {
            RollStage::Shaking => saw_shaking = true,
            _ => assert_eq!(session.spin_energy, 0.0),
        }
    }
    assert!(saw_shaking);
}

#[test]
fn test_reset_leaves_dice_idle_on_default_face() {
    let settings = seeded(3, 4);
    let mut controller = RollController::new(&settings);
    let mut rng = rand::rngs::StdRng::seed_from_u64(3);
    let mut dice: Vec<PlanarAnimator> = (0..4)
        .map(|_| PlanarAnimator::new(&settings.animation, &settings.fx, &mut rng))
        .collect();

    controller.trigger(&mut dice);
    while controller.stage() != RollStage::TotalShown {
        controller.tick(DT, &mut dice);
        controller.advance_dice(DT, &mut dice);
        assert!(controller.clock() < 10.0);
    }

    controller.trigger(&mut dice);
    assert_eq!(controller.stage(), RollStage::Ready);
    assert!(controller.session().die_faces.is_empty());
    for die in &dice {
        assert!(!die.is_spinning());
        assert_eq!(die.face(), DEFAULT_FACE);
    }
}

#[test]
fn test_faces_are_roughly_uniform() {
    let mut settings = seeded(77, 6);
    settings.timing.reveal_delay = 0.0;
    let mut controller = RollController::new(&settings);
    let mut dice: Vec<VolumetricAnimator> = (0..6)
        .map(|_| VolumetricAnimator::new(&settings.animation))
        .collect();

    let mut counts = [0u32; 6];
    for _ in 0..100 {
        controller.trigger(&mut dice);
        while controller.stage() != RollStage::TotalShown {
            controller.tick(DT, &mut dice);
            controller.advance_dice(DT, &mut dice);
        }
        for face in &controller.session().die_faces {
            counts[(*face - 1) as usize] += 1;
        }
        controller.trigger(&mut dice);
    }

    // 600 draws, 100 expected per face.
    for (i, count) in counts.iter().enumerate() {
        assert!((60..=140).contains(count), "face {} drawn {count} times", i + 1);
    }
}
