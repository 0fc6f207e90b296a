//! Heads-up display driver: reacts to controller state changes and per-frame
//! updates during drag/rotate, and keeps the cursor shape consistent with
//! the hover state.

use bevy::prelude::*;
use bevy::window::{CursorIcon, PrimaryWindow};
use bevy_egui::{egui, EguiContexts};

use crate::interaction::InteractionController;

/// What the HUD needs to know about the interaction in progress.
#[derive(Resource, Default, Debug)]
pub struct HudState {
    rotating: bool,
    refreshes: u64,
}

impl HudState {
    /// True while the controller is in a rotating state.
    pub fn rotating(&self) -> bool {
        self.rotating
    }

    /// Bumped once per pointer move during a drag or rotate. HUD widgets
    /// that track the manipulated entity re-read its pose when this grows.
    pub fn refreshes(&self) -> u64 {
        self.refreshes
    }

    pub(crate) fn set_rotating(&mut self, rotating: bool) {
        self.rotating = rotating;
    }

    pub(crate) fn refresh(&mut self) {
        self.refreshes = self.refreshes.wrapping_add(1);
    }
}

/// Block the pointer handlers while egui owns the pointer, so clicking a
/// panel button never falls through into the scene.
pub(crate) fn sync_pointer_block(
    mut egui_context: EguiContexts,
    mut controller: ResMut<InteractionController>,
) {
    let blocked = egui_context.ctx_mut().is_pointer_over_area();
    if controller.pointer_blocked() != blocked {
        controller.set_pointer_blocked(blocked);
    }
}

pub(crate) fn hud_status_panel(
    mut egui_context: EguiContexts,
    controller: Res<InteractionController>,
    hud: Res<HudState>,
) {
    egui::Window::new("Scene")
        .resizable(false)
        .show(egui_context.ctx_mut(), |ui| {
            ui.label(format!("{:?}", controller.state()));
            if hud.rotating() {
                ui.label("rotating - release to keep turning, click to stop");
            }
        });
}

/// Pointer cursor over anything interactive, default cursor otherwise.
pub(crate) fn update_cursor_icon(
    controller: Res<InteractionController>,
    mut windows_query: Query<&mut Window, With<PrimaryWindow>>,
) {
    let Ok(mut window) = windows_query.get_single_mut() else {
        return;
    };
    let icon = if controller.hovered().is_some() || controller.rotate_handle_hovered() {
        CursorIcon::Pointer
    } else {
        CursorIcon::Default
    };
    if window.cursor.icon != icon {
        window.cursor.icon = icon;
    }
}
