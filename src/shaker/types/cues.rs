//! Side-effect requests recorded by the roll controller
//!
//! The controller never talks to the audio or UI host directly. It appends
//! cues while it runs and the host drains them once per frame.

use bevy::prelude::*;
use serde::Serialize;

use super::RollStage;

/// One-shot sound kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SoundKind {
    Start,
    Press,
    Stop,
    Reveal,
    /// A die finished settling on its result face.
    Settle,
}

/// Written as a Bevy message each frame by the controller driver.
#[derive(Message, Debug, Clone, PartialEq, Serialize)]
pub enum RollCue {
    StageChanged(RollStage),
    PlayOneShot {
        sound: SoundKind,
        volume: f32,
        pitch: f32,
    },
    /// Keep the per-die spin loops running at this mix.
    LoopMix { volume: f32, pitch: f32 },
    /// Play one tick variant on the given die.
    Tick { die: usize, volume: f32, pitch: f32 },
    /// Stop every per-die sound immediately.
    HardMute,
    ShowResults { faces: Vec<u32>, total: u32 },
    HideResults,
}

/// Text shown in the results overlay.
pub fn results_message(faces: &[u32], total: u32) -> String {
    let faces_str: Vec<String> = faces.iter().map(|f| f.to_string()).collect();
    format!(
        "This roll:\n{}\n\nTotal: {}\n\nPress SPACE to roll again",
        faces_str.join(" "),
        total
    )
}

/// Status line for a stage. `reveal_timer` is only used while Revealed.
pub fn status_message(stage: RollStage, reveal_timer: f32) -> String {
    match stage {
        RollStage::Ready => "Ready\nPress SPACE to start shaking".to_string(),
        RollStage::Shaking => {
            "Shaking... tap SPACE to spin faster, release to let the dice settle".to_string()
        }
        RollStage::Revealed => format!(
            "Results are in\nTotal in {}s",
            reveal_timer.max(0.0).ceil() as u32
        ),
        RollStage::TotalShown => String::new(),
    }
}
