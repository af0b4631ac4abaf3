//! Input system.
//!
//! [`update_pointer_state`] reads the mouse and keyboard from Raylib each
//! frame and writes [`PointerState`]:
//! - window position of the cursor and the world ray under it
//! - left button press as a one-frame click
//! - Escape as the back key
//!
//! F11 toggles debug mode via
//! [`SwitchDebugEvent`](crate::events::switchdebug::SwitchDebugEvent), B toggles
//! idle bobbing via [`SetBobbing`].
use bevy_ecs::prelude::*;
use raylib::ffi::{KeyboardKey, MouseButton};

use crate::components::bobbing::BobbingState;
use crate::events::pack::SetBobbing;
use crate::events::switchdebug::SwitchDebugEvent;
use crate::resources::camera::SceneCamera;
use crate::resources::pointer::PointerState;
use crate::resources::windowsize::WindowSize;

pub fn update_pointer_state(
    mut pointer: ResMut<PointerState>,
    camera: Res<SceneCamera>,
    window: Res<WindowSize>,
    rl: NonSend<raylib::RaylibHandle>,
    bobbing: Query<&BobbingState>,
    mut commands: Commands,
) {
    let mouse = rl.get_mouse_position();
    pointer.x = mouse.x;
    pointer.y = mouse.y;
    pointer.ray = camera.screen_ray(mouse.x, mouse.y, window.w as f32, window.h as f32);
    pointer.just_clicked = rl.is_mouse_button_pressed(MouseButton::MOUSE_BUTTON_LEFT);
    pointer.back_pressed = rl.is_key_pressed(KeyboardKey::KEY_ESCAPE);

    if rl.is_key_pressed(KeyboardKey::KEY_F11) {
        commands.trigger(SwitchDebugEvent {});
    }
    if rl.is_key_pressed(KeyboardKey::KEY_B) {
        let enabled = !bobbing.iter().any(|b| b.active);
        commands.trigger(SetBobbing { enabled });
    }
}
