//! Status line and results overlay

use bevy::color::Alpha;
use bevy::prelude::*;

use crate::shaker::controller::RollController;
use crate::shaker::types::*;

pub fn update_status_text(
    controller: Res<RollController>,
    mut texts: Query<&mut Text, With<StatusText>>,
) {
    let message = controller.status_message();
    for mut text in texts.iter_mut() {
        if text.0 != message {
            text.0 = message.clone();
        }
    }
}

pub fn apply_results_cues(
    mut cues: MessageReader<RollCue>,
    mut overlays: Query<&mut Visibility, With<ResultsOverlay>>,
    mut texts: Query<&mut Text, With<ResultsText>>,
) {
    for cue in cues.read() {
        let visibility = match cue {
            RollCue::ShowResults { faces, total } => {
                let message = results_message(faces, *total);
                for mut text in texts.iter_mut() {
                    text.0 = message.clone();
                }
                Visibility::Visible
            }
            RollCue::HideResults => Visibility::Hidden,
            _ => continue,
        };
        for mut overlay in overlays.iter_mut() {
            *overlay = visibility;
        }
    }
}

pub fn fade_results_overlay(
    controller: Res<RollController>,
    mut backgrounds: Query<&mut BackgroundColor, With<ResultsOverlay>>,
    mut colors: Query<&mut TextColor, With<ResultsText>>,
) {
    let (background_alpha, text_alpha) = controller.overlay_alpha();
    for mut background in backgrounds.iter_mut() {
        background.0.set_alpha(background_alpha);
    }
    for mut color in colors.iter_mut() {
        color.0.set_alpha(text_alpha);
    }
}
