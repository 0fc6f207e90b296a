//! First-person walk mode: WASD-style movement flags and two yaw keys
//! consumed every frame, plus free-look driven by accumulated pointer
//! deltas.
//!
//! The look direction is tracked as latitude/longitude angles and the
//! latitude is clamped to +/-85 degrees - without the clamp the look-at
//! target crosses the pole and the camera flips upside down.

use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;

use crate::camera_nav::CameraNavSettings;
use crate::interaction::InteractionController;

/// Hard limit on how far up or down the view may pitch, in degrees.
pub const MAX_LATITUDE: f32 = 85.0;

/// Per-frame movement and look state while first-person mode is active.
/// Inserted on the camera when the mode is entered, removed when it is left.
#[derive(Component, Debug, Default)]
pub struct FirstPersonController {
    pub move_forward: bool,
    pub move_backward: bool,
    pub move_left: bool,
    pub move_right: bool,
    pub yaw_left: bool,
    pub yaw_right: bool,
    /// Look pitch in degrees, positive up. Always within
    /// [`-MAX_LATITUDE`, `MAX_LATITUDE`].
    pub lat: f32,
    /// Look heading in degrees.
    pub lon: f32,
    mouse_delta: Vec2,
}

impl FirstPersonController {
    /// Start looking the way the camera already faces, so entering the mode
    /// doesn't snap the view.
    pub fn from_transform(transform: &Transform) -> Self {
        let forward: Vec3 = *transform.forward();
        Self {
            lat: forward.y.clamp(-1.0, 1.0).asin().to_degrees(),
            lon: forward.z.atan2(forward.x).to_degrees(),
            ..Default::default()
        }
    }

    /// Fold a pointer delta into the look angles, clamping the latitude.
    pub(crate) fn apply_look(&mut self, delta: Vec2, look_speed: f32) {
        self.lon += delta.x * look_speed;
        self.lat = (self.lat - delta.y * look_speed).clamp(-MAX_LATITUDE, MAX_LATITUDE);
    }

    /// The look direction for the current angles.
    fn look_direction(&self) -> Vec3 {
        let phi = (90.0 - self.lat).to_radians();
        let theta = self.lon.to_radians();
        Vec3::new(
            phi.sin() * theta.cos(),
            phi.cos(),
            phi.sin() * theta.sin(),
        )
    }
}

pub(crate) fn read_movement_keys(
    keys: Res<ButtonInput<KeyCode>>,
    mut walkers_query: Query<&mut FirstPersonController>,
) {
    for mut walker in walkers_query.iter_mut() {
        walker.move_forward = keys.pressed(KeyCode::KeyW) || keys.pressed(KeyCode::ArrowUp);
        walker.move_backward = keys.pressed(KeyCode::KeyS) || keys.pressed(KeyCode::ArrowDown);
        walker.move_left = keys.pressed(KeyCode::KeyA) || keys.pressed(KeyCode::ArrowLeft);
        walker.move_right = keys.pressed(KeyCode::KeyD) || keys.pressed(KeyCode::ArrowRight);
        walker.yaw_left = keys.pressed(KeyCode::KeyQ);
        walker.yaw_right = keys.pressed(KeyCode::KeyE);
    }
}

pub(crate) fn accumulate_look_deltas(
    mut motion_reader: EventReader<MouseMotion>,
    mut walkers_query: Query<&mut FirstPersonController>,
) {
    let delta: Vec2 = motion_reader.read().map(|motion| motion.delta).sum();
    if delta == Vec2::ZERO {
        return;
    }
    for mut walker in walkers_query.iter_mut() {
        walker.mouse_delta += delta;
    }
}

/// Consume the flags and accumulated deltas for this frame. Idempotent for
/// a given elapsed time and key state: the deltas are zeroed right after
/// they are applied.
pub(crate) fn update_first_person(
    time: Res<Time>,
    settings: Res<CameraNavSettings>,
    controller: Res<InteractionController>,
    mut walkers_query: Query<(&mut Transform, &mut FirstPersonController)>,
) {
    let dt = time.delta_seconds();
    for (mut transform, mut walker) in walkers_query.iter_mut() {
        if controller.is_interacting() {
            walker.mouse_delta = Vec2::ZERO;
            continue;
        }
        let step = settings.move_speed * dt;
        let mut local_translation = Vec3::ZERO;
        if walker.move_forward {
            local_translation.z -= step;
        }
        if walker.move_backward {
            local_translation.z += step;
        }
        if walker.move_left {
            local_translation.x -= step;
        }
        if walker.move_right {
            local_translation.x += step;
        }
        let world_translation = transform.rotation * local_translation;
        transform.translation += world_translation;

        if walker.yaw_left {
            walker.lon -= settings.turn_speed * dt;
        }
        if walker.yaw_right {
            walker.lon += settings.turn_speed * dt;
        }
        let delta = walker.mouse_delta;
        walker.apply_look(delta, settings.look_speed);
        walker.mouse_delta = Vec2::ZERO;

        let target = transform.translation + 100.0 * walker.look_direction();
        transform.look_at(target, Vec3::Y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latitude_is_clamped_regardless_of_delta_magnitude() {
        let mut walker = FirstPersonController::default();
        walker.apply_look(Vec2::new(0.0, -1.0e6), 0.2);
        assert_eq!(walker.lat, MAX_LATITUDE);
        walker.apply_look(Vec2::new(0.0, 1.0e9), 0.2);
        assert_eq!(walker.lat, -MAX_LATITUDE);
    }

    #[test]
    fn small_deltas_accumulate() {
        let mut walker = FirstPersonController::default();
        for _ in 0..10 {
            walker.apply_look(Vec2::new(5.0, -5.0), 0.2);
        }
        assert!((walker.lon - 10.0).abs() < 1e-4);
        assert!((walker.lat - 10.0).abs() < 1e-4);
    }

    #[test]
    fn look_direction_never_inverts() {
        let mut walker = FirstPersonController::default();
        walker.apply_look(Vec2::new(0.0, -1.0e8), 0.2);
        let up_most = walker.look_direction();
        // Still has a horizontal component, so look_at keeps a valid
        // orientation with Y up.
        assert!(up_most.y < 1.0 - 1e-4);
        assert!(Vec2::new(up_most.x, up_most.z).length() > 1e-3);
    }

    #[test]
    fn from_transform_round_trips_the_heading() {
        let transform =
            Transform::from_xyz(0.0, 1.7, 0.0).looking_at(Vec3::new(3.0, 1.7, 4.0), Vec3::Y);
        let walker = FirstPersonController::from_transform(&transform);
        let forward: Vec3 = *transform.forward();
        assert!(walker.look_direction().distance(forward) < 1e-4);
    }
}
