//! Orbit-style camera navigation: discrete pan and dolly steps bound to UI
//! buttons, plus a reset that recenters on the home pose. A parallel input
//! path to the interaction controller - the two only touch in that
//! navigation is suppressed while a drag or rotate is in progress.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};
use serde::{Deserialize, Serialize};

use crate::first_person::FirstPersonController;
use crate::interaction::InteractionController;

/// Tuning for both navigation modes.
#[derive(Resource, Clone, Copy, Debug, Serialize, Deserialize)]
pub struct CameraNavSettings {
    /// World units moved per pan button click.
    pub pan_step: f32,
    /// Multiplicative dolly per zoom click; zoom-in divides the camera
    /// distance by this, zoom-out multiplies it.
    pub dolly_factor: f32,
    /// Fixed camera height while walking in first person.
    pub eye_height: f32,
    /// First-person walk speed, world units per second.
    pub move_speed: f32,
    /// Free-look sensitivity, degrees per pointer pixel.
    pub look_speed: f32,
    /// Keyboard yaw speed, degrees per second.
    pub turn_speed: f32,
}

impl Default for CameraNavSettings {
    fn default() -> Self {
        Self {
            pan_step: 1.0,
            dolly_factor: 1.1,
            eye_height: 1.7,
            move_speed: 3.0,
            look_speed: 0.2,
            turn_speed: 60.0,
        }
    }
}

/// Which navigation mode is active. The two are exclusive: toggling into
/// first person disables the orbit controls and vice versa.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraNavMode {
    #[default]
    Orbit,
    FirstPerson,
}

/// Marks the navigable camera and remembers what it orbits around.
#[derive(Component, Debug)]
pub struct OrbitCamera {
    /// The point panning drags along and zooming dollies toward.
    pub target: Vec3,
    home: Option<(Transform, Vec3)>,
}

impl OrbitCamera {
    pub fn new(target: Vec3) -> Self {
        Self { target, home: None }
    }
}

/// Discrete navigation requests, normally sent by the UI buttons. Exposed
/// so applications can bind their own inputs to the same actions.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum OrbitCommand {
    /// Step in screen-space axes: `x` right, `y` up.
    Pan(Vec2),
    ZoomIn,
    ZoomOut,
    Reset,
}

/// Move `position` along the view direction so its distance to `target`
/// scales by `factor`.
pub(crate) fn dolly(position: Vec3, target: Vec3, factor: f32) -> Vec3 {
    target + (position - target) * factor
}

/// Capture the home pose the first time the camera is seen, for `Reset`.
pub(crate) fn remember_home(mut cameras_query: Query<(&Transform, &mut OrbitCamera)>) {
    for (transform, mut orbit) in cameras_query.iter_mut() {
        if orbit.home.is_none() {
            orbit.home = Some((*transform, orbit.target));
        }
    }
}

pub(crate) fn apply_orbit_commands(
    mut orbit_commands: EventReader<OrbitCommand>,
    settings: Res<CameraNavSettings>,
    mode: Res<CameraNavMode>,
    controller: Res<InteractionController>,
    mut cameras_query: Query<(&mut Transform, &mut OrbitCamera)>,
) {
    if *mode != CameraNavMode::Orbit || controller.is_interacting() {
        orbit_commands.clear();
        return;
    }
    for command in orbit_commands.read() {
        for (mut transform, mut orbit) in cameras_query.iter_mut() {
            match command {
                OrbitCommand::Pan(step) => {
                    let right: Vec3 = *transform.right();
                    let up: Vec3 = *transform.up();
                    let delta = (right * step.x + up * step.y) * settings.pan_step;
                    transform.translation += delta;
                    orbit.target += delta;
                }
                OrbitCommand::ZoomIn => {
                    transform.translation = dolly(
                        transform.translation,
                        orbit.target,
                        1.0 / settings.dolly_factor,
                    );
                }
                OrbitCommand::ZoomOut => {
                    transform.translation =
                        dolly(transform.translation, orbit.target, settings.dolly_factor);
                }
                OrbitCommand::Reset => {
                    if let Some((home_transform, home_target)) = orbit.home {
                        *transform = home_transform;
                        orbit.target = home_target;
                    }
                }
            }
        }
    }
}

/// Apply the side effects of switching navigation modes: entering first
/// person pins the eye height and takes over the camera; leaving it restores
/// the orbit view.
pub(crate) fn handle_mode_changes(
    mode: Res<CameraNavMode>,
    mut previous_mode: Local<Option<CameraNavMode>>,
    settings: Res<CameraNavSettings>,
    mut cameras_query: Query<(Entity, &mut Transform, &OrbitCamera)>,
    mut commands: Commands,
) {
    if *previous_mode == Some(*mode) {
        return;
    }
    *previous_mode = Some(*mode);
    for (entity, mut transform, orbit) in cameras_query.iter_mut() {
        match *mode {
            CameraNavMode::FirstPerson => {
                transform.translation.y = settings.eye_height;
                commands
                    .entity(entity)
                    .insert(FirstPersonController::from_transform(&transform));
            }
            CameraNavMode::Orbit => {
                commands.entity(entity).remove::<FirstPersonController>();
                transform.look_at(orbit.target, Vec3::Y);
            }
        }
    }
}

pub(crate) fn camera_nav_ui(
    mut egui_context: EguiContexts,
    mut mode: ResMut<CameraNavMode>,
    mut orbit_commands: EventWriter<OrbitCommand>,
) {
    egui::Window::new("Camera")
        .resizable(false)
        .show(egui_context.ctx_mut(), |ui| {
            let first_person = *mode == CameraNavMode::FirstPerson;
            if ui.selectable_label(first_person, "First person").clicked() {
                *mode = if first_person {
                    CameraNavMode::Orbit
                } else {
                    CameraNavMode::FirstPerson
                };
            }
            ui.add_enabled_ui(!first_person, |ui| {
                ui.horizontal(|ui| {
                    if ui.button("\u{2190}").clicked() {
                        orbit_commands.send(OrbitCommand::Pan(Vec2::new(-1.0, 0.0)));
                    }
                    if ui.button("\u{2192}").clicked() {
                        orbit_commands.send(OrbitCommand::Pan(Vec2::new(1.0, 0.0)));
                    }
                    if ui.button("\u{2191}").clicked() {
                        orbit_commands.send(OrbitCommand::Pan(Vec2::new(0.0, 1.0)));
                    }
                    if ui.button("\u{2193}").clicked() {
                        orbit_commands.send(OrbitCommand::Pan(Vec2::new(0.0, -1.0)));
                    }
                });
                ui.horizontal(|ui| {
                    if ui.button("Zoom in").clicked() {
                        orbit_commands.send(OrbitCommand::ZoomIn);
                    }
                    if ui.button("Zoom out").clicked() {
                        orbit_commands.send(OrbitCommand::ZoomOut);
                    }
                    if ui.button("Reset").clicked() {
                        orbit_commands.send(OrbitCommand::Reset);
                    }
                });
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_in_decreases_distance_monotonically() {
        let settings = CameraNavSettings::default();
        let target = Vec3::new(1.0, 0.0, -2.0);
        let mut position = Vec3::new(1.0, 10.0, 8.0);
        let mut last_distance = position.distance(target);
        for _ in 0..5 {
            position = dolly(position, target, 1.0 / settings.dolly_factor);
            let distance = position.distance(target);
            assert!(distance < last_distance);
            assert!((distance - last_distance / settings.dolly_factor).abs() < 1e-4);
            last_distance = distance;
        }
    }

    #[test]
    fn zoom_out_inverts_zoom_in() {
        let target = Vec3::ZERO;
        let position = Vec3::new(0.0, 5.0, 5.0);
        let there = dolly(position, target, 1.0 / 1.1);
        let back = dolly(there, target, 1.1);
        assert!(back.distance(position) < 1e-5);
    }

    #[test]
    fn dolly_preserves_view_direction() {
        let target = Vec3::new(2.0, 0.0, 2.0);
        let position = Vec3::new(2.0, 6.0, 10.0);
        let closer = dolly(position, target, 0.5);
        let before = (position - target).normalize();
        let after = (closer - target).normalize();
        assert!(before.distance(after) < 1e-5);
    }
}
