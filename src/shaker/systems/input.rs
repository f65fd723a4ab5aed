//! Input handling
//!
//! SPACE or a left click is the single trigger of the roll controller.

use bevy::ecs::component::Mutable;
use bevy::prelude::*;

use crate::shaker::animator::DieAnimator;
use crate::shaker::controller::RollController;
use crate::shaker::types::Die;

use super::roll::with_ordered_dice;

pub fn handle_trigger_input<A>(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    mut controller: ResMut<RollController>,
    mut dice: Query<(&Die, &mut A)>,
) where
    A: Component<Mutability = Mutable> + DieAnimator,
{
    if !keyboard.just_pressed(KeyCode::Space) && !mouse.just_pressed(MouseButton::Left) {
        return;
    }
    with_ordered_dice(&mut dice, |dice| controller.trigger(dice));
}
