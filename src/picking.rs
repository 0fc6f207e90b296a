//! Ray casting from the pointer into the scene.
//!
//! Converts the cursor position into a [`Ray3d`] against the active camera
//! and tests it against candidate hit-boxes, nearest hit first. The results
//! are stored on the camera entity in [`PickingCameraState`], which the
//! interaction systems consume. The same module is also usable directly, for
//! callers that want ordered hits against an arbitrary candidate set.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy::render::camera::RenderTarget;
use bevy::window::{PrimaryWindow, WindowRef};

use crate::interaction::{InteractionController, InteractionState};
use crate::selectable::{Furnishing, HitBox};

/// Data the picking backend passes to the interaction systems.
///
/// Add this component to every camera that should drive furnishing
/// interaction.
#[derive(Component, Default, Debug)]
pub struct PickingCameraState {
    /// Where this camera considers the cursor to be in the world.
    pub cursor_ray: Option<Ray3d>,
    /// The nearest furnishing under the cursor, if any.
    pub furnishing_under_cursor: Option<(Entity, CursorHit)>,
}

/// A single ray intersection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CursorHit {
    /// The hit location in world coordinates.
    pub point: Vec3,
    /// Distance from the ray origin. Hits are ordered by this value.
    pub distance: f32,
}

/// Intersect a ray with an oriented hit-box.
///
/// The slab test runs in the entity's local space, so scaled and rotated
/// boxes are handled exactly. Starting inside the box counts as a hit at
/// distance zero.
pub fn ray_hit_box(ray: Ray3d, transform: &GlobalTransform, hit_box: &HitBox) -> Option<CursorHit> {
    let inverse = transform.affine().inverse();
    let local_origin = inverse.transform_point3(ray.origin);
    let local_direction = inverse.transform_vector3(*ray.direction);
    let local_distance = ray_box_intersection(local_origin, local_direction, hit_box.half_extents)?;
    let point = transform.transform_point(local_origin + local_direction * local_distance);
    Some(CursorHit {
        point,
        distance: point.distance(ray.origin),
    })
}

/// Test all candidates and return the intersections ordered by ascending
/// distance from the ray origin. An empty result means no hit.
///
/// `total_cmp` keeps the order deterministic for a static scene and camera.
pub fn ray_hits<'a>(
    ray: Ray3d,
    candidates: impl IntoIterator<Item = (Entity, &'a GlobalTransform, &'a HitBox)>,
) -> Vec<(Entity, CursorHit)> {
    let mut hits: Vec<(Entity, CursorHit)> = candidates
        .into_iter()
        .filter_map(|(entity, transform, hit_box)| {
            Some((entity, ray_hit_box(ray, transform, hit_box)?))
        })
        .collect();
    hits.sort_by(|a, b| a.1.distance.total_cmp(&b.1.distance));
    hits
}

fn ray_box_intersection(origin: Vec3, direction: Vec3, half_extents: Vec3) -> Option<f32> {
    let inv = direction.recip();
    let t_lower = (-half_extents - origin) * inv;
    let t_upper = (half_extents - origin) * inv;
    let t_near = t_lower.min(t_upper);
    let t_far = t_lower.max(t_upper);
    let t_min = t_near.max_element().max(0.0);
    let t_max = t_far.min_element();
    (t_min <= t_max).then_some(t_min)
}

pub(crate) fn prepare_camera_state(mut query: Query<&mut PickingCameraState>) {
    for mut camera_state in query.iter_mut() {
        camera_state.furnishing_under_cursor = None;
    }
}

pub(crate) fn update_cursor_ray(
    mut cameras_query: Query<(&mut PickingCameraState, &GlobalTransform, &Camera)>,
    window_getter: WindowGetter,
) {
    for (mut camera_state, camera_transform, camera) in cameras_query.iter_mut() {
        camera_state.cursor_ray = (|| {
            let RenderTarget::Window(window_ref) = camera.target else {
                return None;
            };
            let window = window_getter.get_window(window_ref)?;
            let cursor_in_screen_pos = window.cursor_position()?;
            camera.viewport_to_world(camera_transform, cursor_in_screen_pos)
        })();
    }
}

/// Pick the nearest furnishing under the cursor.
///
/// Skipped while the button is held on a drag or rotate - in those states
/// only the ground plane is intersected, never the entities. Free rotation
/// keeps hit-testing, so a press there can land on a furnishing.
pub(crate) fn update_furnishing_under_cursor(
    controller: Res<InteractionController>,
    mut cameras_query: Query<&mut PickingCameraState>,
    furnishings_query: Query<(Entity, &GlobalTransform, &HitBox), With<Furnishing>>,
) {
    if matches!(
        controller.state(),
        InteractionState::Dragging | InteractionState::Rotating
    ) {
        return;
    }
    for mut camera_state in cameras_query.iter_mut() {
        let Some(cursor_ray) = camera_state.cursor_ray else {
            continue;
        };
        camera_state.furnishing_under_cursor =
            ray_hits(cursor_ray, furnishings_query.iter()).into_iter().next();
    }
}

#[derive(SystemParam)]
pub(crate) struct WindowGetter<'w, 's> {
    windows: Query<'w, 's, &'static Window>,
    primary_window: Query<'w, 's, &'static Window, With<PrimaryWindow>>,
}

impl WindowGetter<'_, '_> {
    pub fn get_window(&self, window_ref: WindowRef) -> Option<&Window> {
        match window_ref {
            WindowRef::Primary => self.primary_window.get_single().ok(),
            WindowRef::Entity(window_id) => self.windows.get(window_id).ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down_ray(x: f32, z: f32) -> Ray3d {
        Ray3d::new(Vec3::new(x, 10.0, z), -Vec3::Y)
    }

    fn box_at(x: f32, y: f32, z: f32) -> GlobalTransform {
        GlobalTransform::from(Transform::from_xyz(x, y, z))
    }

    #[test]
    fn hit_from_above() {
        let hit_box = HitBox::new(Vec3::new(0.5, 1.0, 0.5));
        let hit = ray_hit_box(down_ray(0.2, -0.3), &box_at(0.0, 0.0, 0.0), &hit_box).unwrap();
        assert!((hit.point.y - 1.0).abs() < 1e-4);
        assert!((hit.distance - 9.0).abs() < 1e-4);
    }

    #[test]
    fn miss_off_to_the_side() {
        let hit_box = HitBox::new(Vec3::splat(0.5));
        assert!(ray_hit_box(down_ray(2.0, 0.0), &box_at(0.0, 0.0, 0.0), &hit_box).is_none());
    }

    #[test]
    fn rotated_box_is_tested_in_local_space() {
        // A thin slab rotated 45 degrees around Y; a corner now reaches
        // further out along X than the unrotated extents would.
        let transform = GlobalTransform::from(
            Transform::from_xyz(0.0, 0.0, 0.0)
                .with_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_4)),
        );
        let hit_box = HitBox::new(Vec3::new(1.0, 0.5, 0.1));
        let reach = 0.6; // inside the rotated footprint, outside a 0.1 slab
        assert!(ray_hit_box(down_ray(reach, -reach), &transform, &hit_box).is_some());
        assert!(ray_hit_box(down_ray(reach, reach), &transform, &hit_box).is_none());
    }

    #[test]
    fn hits_are_ordered_nearest_first() {
        let mut world = World::new();
        let hit_box = HitBox::new(Vec3::splat(0.5));
        let low = world.spawn((box_at(0.0, 1.0, 0.0), hit_box)).id();
        let high = world.spawn((box_at(0.0, 5.0, 0.0), hit_box)).id();
        let mut query = world.query::<(Entity, &GlobalTransform, &HitBox)>();
        let hits = ray_hits(down_ray(0.0, 0.0), query.iter(&world));
        assert_eq!(
            hits.iter().map(|(entity, _)| *entity).collect::<Vec<_>>(),
            vec![high, low]
        );
        assert!(hits[0].1.distance < hits[1].1.distance);
    }

    #[test]
    fn repeated_queries_are_deterministic() {
        let mut world = World::new();
        let hit_box = HitBox::new(Vec3::splat(0.5));
        for i in 0..4 {
            world.spawn((box_at(0.0, i as f32, 0.0), hit_box));
        }
        let mut query = world.query::<(Entity, &GlobalTransform, &HitBox)>();
        let first = ray_hits(down_ray(0.0, 0.0), query.iter(&world));
        let second = ray_hits(down_ray(0.0, 0.0), query.iter(&world));
        assert_eq!(first, second);
    }
}
