use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// The invisible, infinite, horizontal reference surface that dragging and
/// rotating intersect against.
///
/// This is deliberately independent of the actual floor geometry: it
/// guarantees a stable intersection target even when the pointer is over
/// empty space or over another object. It is never spawned into the scene
/// and never rendered.
#[derive(Resource, Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroundPlane {
    /// World elevation of the plane.
    pub elevation: f32,
}

impl Default for GroundPlane {
    fn default() -> Self {
        Self { elevation: 0.0 }
    }
}

impl GroundPlane {
    pub fn intersect(&self, ray: Ray3d) -> Option<Vec3> {
        intersect_horizontal(ray, self.elevation)
    }

    /// Project a world position straight down (or up) onto the plane.
    pub fn project(&self, position: Vec3) -> Vec3 {
        Vec3::new(position.x, self.elevation, position.z)
    }
}

/// Intersect a ray with the horizontal plane at the given elevation.
///
/// Returns `None` when the ray is parallel to the plane or points away from
/// it - callers treat that as "no hit", never as an error.
pub fn intersect_horizontal(ray: Ray3d, elevation: f32) -> Option<Vec3> {
    let distance = ray.intersect_plane(Vec3::new(0.0, elevation, 0.0), Plane3d::new(Vec3::Y))?;
    Some(ray.get_point(distance))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downward_ray_hits_the_plane() {
        let ray = Ray3d::new(Vec3::new(3.0, 10.0, -2.0), -Vec3::Y);
        let hit = intersect_horizontal(ray, 0.0).unwrap();
        assert!(hit.distance(Vec3::new(3.0, 0.0, -2.0)) < 1e-5);
    }

    #[test]
    fn parallel_ray_misses() {
        let ray = Ray3d::new(Vec3::new(0.0, 1.0, 0.0), Vec3::X);
        assert!(intersect_horizontal(ray, 0.0).is_none());
    }

    #[test]
    fn ray_pointing_away_misses() {
        let ray = Ray3d::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Y);
        assert!(intersect_horizontal(ray, 0.0).is_none());
    }

    #[test]
    fn nonzero_elevation() {
        let ray = Ray3d::new(Vec3::new(1.0, 5.0, 1.0), -Vec3::Y);
        let hit = intersect_horizontal(ray, 2.5).unwrap();
        assert!((hit.y - 2.5).abs() < 1e-5);
    }
}
