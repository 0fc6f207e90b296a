//! The capability contract for scene objects that participate in
//! pick/drag/rotate/hover interactions.
//!
//! The interaction controller never inspects entity internals: every
//! geometric effect of a drag or rotate is delegated through
//! [`PlacementBehavior`], so an entity is free to apply its own constraints
//! (snapping, collision avoidance) before accepting a new pose.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle callbacks forwarded by the interaction controller.
///
/// All points are world-space intersections with the ground plane. The
/// methods receive the entity's own [`Transform`] and may mutate it however
/// they see fit - or not at all.
pub trait PlacementBehavior: Send + Sync + 'static {
    /// The pointer was pressed while this entity was picked.
    fn click_pressed(&mut self, transform: &mut Transform, point: Vec3);

    /// The pointer moved while this entity was being dragged.
    fn click_dragged(&mut self, transform: &mut Transform, point: Vec3);

    /// The pointer was released, ending a drag.
    fn click_released(&mut self, _transform: &mut Transform) {}

    /// The pointer moved while this entity was being rotated.
    fn rotate(&mut self, transform: &mut Transform, point: Vec3);

    /// The entity gained hover.
    fn mouse_over(&mut self) {}

    /// The entity lost hover.
    fn mouse_off(&mut self) {}

    /// The entity stopped being the active selection.
    fn set_unselected(&mut self) {}
}

/// A scene object the user can pick, drag and rotate.
///
/// Needs a [`HitBox`] on the same entity to be pickable.
#[derive(Component)]
pub struct Furnishing {
    /// Fixed furnishings can be selected and hovered but never dragged or
    /// rotated.
    pub fixed: bool,
    pub behavior: Box<dyn PlacementBehavior>,
}

impl Furnishing {
    pub fn movable(behavior: impl PlacementBehavior) -> Self {
        Self {
            fixed: false,
            behavior: Box::new(behavior),
        }
    }

    pub fn immovable(behavior: impl PlacementBehavior) -> Self {
        Self {
            fixed: true,
            behavior: Box::new(behavior),
        }
    }
}

/// Intersection geometry for picking: an axis-aligned box in the entity's
/// local space, centered on its origin.
#[derive(Component, Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HitBox {
    pub half_extents: Vec3,
}

impl HitBox {
    pub fn new(half_extents: Vec3) -> Self {
        Self { half_extents }
    }

    /// Radius of the smallest circle around the entity's origin that
    /// contains the box footprint on the ground plane.
    pub fn footprint_radius(&self) -> f32 {
        Vec2::new(self.half_extents.x, self.half_extents.z).length()
    }
}

/// Marker mirroring the controller's hover reference, for highlight systems.
#[derive(Component)]
pub struct Hovered;

/// Marker mirroring the controller's selection reference.
#[derive(Component)]
pub struct SelectedFurnishing;

/// Spawn a furnishing with this marker to have the controller pick it up
/// immediately: the entity is selected, the state machine enters dragging
/// with a synthetic press at the entity's ground projection, and the very
/// next pointer move places it. The marker is removed once consumed.
#[derive(Component, Default)]
pub struct AwaitingPlacement;

/// The stock behavior: offset-preserving drag across the ground plane and
/// yaw rotation toward the cursor, with optional angle snapping.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FreePlacement {
    /// Snap increment for rotation, in radians.
    pub rotation_snap: Option<f32>,
    #[serde(skip)]
    grab_offset: Vec3,
}

impl FreePlacement {
    pub fn with_rotation_snap(snap: f32) -> Self {
        Self {
            rotation_snap: Some(snap),
            ..Default::default()
        }
    }
}

impl PlacementBehavior for FreePlacement {
    fn click_pressed(&mut self, transform: &mut Transform, point: Vec3) {
        // Remember where on the footprint the user grabbed, so the item
        // doesn't jump to put its origin under the cursor.
        self.grab_offset = point - transform.translation;
        self.grab_offset.y = 0.0;
    }

    fn click_dragged(&mut self, transform: &mut Transform, point: Vec3) {
        let target = point - self.grab_offset;
        transform.translation.x = target.x;
        transform.translation.z = target.z;
    }

    fn rotate(&mut self, transform: &mut Transform, point: Vec3) {
        let toward = point - transform.translation;
        let mut angle = toward.x.atan2(toward.z);
        if let Some(snap) = self.rotation_snap {
            angle = (angle / snap).round() * snap;
        }
        transform.rotation = Quat::from_rotation_y(angle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_preserves_grab_offset() {
        let mut behavior = FreePlacement::default();
        let mut transform = Transform::from_xyz(2.0, 0.0, 2.0);
        behavior.click_pressed(&mut transform, Vec3::new(2.5, 0.0, 2.0));
        behavior.click_dragged(&mut transform, Vec3::new(6.5, 0.0, -1.0));
        assert_eq!(transform.translation, Vec3::new(6.0, 0.0, -1.0));
    }

    #[test]
    fn drag_never_changes_elevation() {
        let mut behavior = FreePlacement::default();
        let mut transform = Transform::from_xyz(0.0, 0.4, 0.0);
        behavior.click_pressed(&mut transform, Vec3::ZERO);
        behavior.click_dragged(&mut transform, Vec3::new(3.0, 0.0, 3.0));
        assert_eq!(transform.translation.y, 0.4);
    }

    #[test]
    fn rotate_faces_the_cursor() {
        let mut behavior = FreePlacement::default();
        let mut transform = Transform::from_xyz(0.0, 0.0, 0.0);
        behavior.rotate(&mut transform, Vec3::new(1.0, 0.0, 0.0));
        let (axis, angle) = transform.rotation.to_axis_angle();
        assert!((angle - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
        assert!(axis.distance(Vec3::Y) < 1e-4);
    }

    #[test]
    fn rotation_snaps_to_increment() {
        let snap = std::f32::consts::FRAC_PI_4;
        let mut behavior = FreePlacement::with_rotation_snap(snap);
        let mut transform = Transform::default();
        // Just shy of 45 degrees; should land exactly on the increment.
        behavior.rotate(&mut transform, Vec3::new(0.9, 0.0, 1.0));
        let expected = Quat::from_rotation_y(snap);
        assert!(transform.rotation.angle_between(expected) < 1e-5);
    }
}
