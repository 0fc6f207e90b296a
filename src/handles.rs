//! The rotation handle: a flat ring around the selected furnishing on the
//! ground plane. Hovering it arms rotate mode for the next press.
//!
//! The hit area is a radial band at the furnishing's elevation: the cursor
//! ray is intersected with the horizontal plane through the entity's origin,
//! and the hover test checks whether the hit falls between the inner and
//! outer ring radii in the XZ plane.

use bevy::prelude::*;

use crate::ground::intersect_horizontal;
use crate::selectable::{Furnishing, HitBox, SelectedFurnishing};

#[derive(Resource, Clone, Copy, Debug)]
pub struct RotationHandleConfig {
    /// Gap between the hit-box footprint and the ring's inner edge.
    pub margin: f32,
    /// Radial width of the ring band.
    pub width: f32,
    pub color: Color,
}

impl Default for RotationHandleConfig {
    fn default() -> Self {
        Self {
            margin: 0.25,
            width: 0.35,
            color: Color::rgb(0.2, 0.75, 0.5),
        }
    }
}

impl RotationHandleConfig {
    /// Inner and outer radii of the ring around the given hit-box.
    pub fn band(&self, hit_box: &HitBox) -> (f32, f32) {
        let inner = hit_box.footprint_radius() + self.margin;
        (inner, inner + self.width)
    }
}

/// Whether the cursor ray points at the rotation handle of a furnishing
/// centered at `center`.
pub fn cursor_over_handle(
    ray: Ray3d,
    center: Vec3,
    hit_box: &HitBox,
    config: &RotationHandleConfig,
) -> bool {
    let Some(point) = intersect_horizontal(ray, center.y) else {
        return false;
    };
    let radial = Vec2::new(point.x - center.x, point.z - center.z).length();
    let (inner, outer) = config.band(hit_box);
    (inner..=outer).contains(&radial)
}

/// Draw the handle ring for the selected movable furnishing.
pub(crate) fn draw_rotation_handles(
    mut gizmos: Gizmos,
    config: Res<RotationHandleConfig>,
    selected_query: Query<(&GlobalTransform, &HitBox, &Furnishing), With<SelectedFurnishing>>,
) {
    for (transform, hit_box, furnishing) in selected_query.iter() {
        if furnishing.fixed {
            continue;
        }
        let (inner, outer) = config.band(hit_box);
        let center = transform.translation();
        gizmos.circle(center, Direction3d::Y, inner, config.color);
        gizmos.circle(center, Direction3d::Y, outer, config.color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down_ray(x: f32, z: f32) -> Ray3d {
        Ray3d::new(Vec3::new(x, 10.0, z), -Vec3::Y)
    }

    #[test]
    fn band_sits_outside_the_footprint() {
        let config = RotationHandleConfig::default();
        let hit_box = HitBox::new(Vec3::new(0.5, 1.0, 0.5));
        let (inner, outer) = config.band(&hit_box);
        assert!(inner > hit_box.footprint_radius());
        assert!(outer > inner);
    }

    #[test]
    fn hover_inside_the_band() {
        let config = RotationHandleConfig::default();
        let hit_box = HitBox::new(Vec3::splat(0.5));
        let (inner, outer) = config.band(&hit_box);
        let mid = (inner + outer) / 2.0;
        assert!(cursor_over_handle(down_ray(mid, 0.0), Vec3::ZERO, &hit_box, &config));
    }

    #[test]
    fn no_hover_over_the_footprint_or_far_outside() {
        let config = RotationHandleConfig::default();
        let hit_box = HitBox::new(Vec3::splat(0.5));
        let (_, outer) = config.band(&hit_box);
        assert!(!cursor_over_handle(down_ray(0.1, 0.0), Vec3::ZERO, &hit_box, &config));
        assert!(!cursor_over_handle(
            down_ray(outer + 1.0, 0.0),
            Vec3::ZERO,
            &hit_box,
            &config
        ));
    }

    #[test]
    fn band_follows_the_entity_elevation() {
        let config = RotationHandleConfig::default();
        let hit_box = HitBox::new(Vec3::splat(0.5));
        let (inner, outer) = config.band(&hit_box);
        let mid = (inner + outer) / 2.0;
        let center = Vec3::new(4.0, 1.5, -2.0);
        assert!(cursor_over_handle(
            down_ray(center.x + mid, center.z),
            center,
            &hit_box,
            &config
        ));
    }
}
