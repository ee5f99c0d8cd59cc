use nalgebra::Point3;

use crate::ray::Ray;
use crate::scene::Scene;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Limits {
    pub max_steps: u32,
    pub hit_epsilon: f32,
    /// Rays that travel past this are reported as misses.
    pub far: f32,
}

impl Limits {
    pub const PRIMARY: Limits = Limits::new(30, 0.01);
    // tighter than the shadow bias so a probe never re-hits its own surface
    pub const SHADOW: Limits = Limits::new(10, 0.001);

    pub const fn new(max_steps: u32, hit_epsilon: f32) -> Self {
        Limits { max_steps, hit_epsilon, far: f32::INFINITY }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum March {
    Hit {
        point: Point3<f32>,
        distance: f32,
    },
    Miss,
}

impl March {
    pub fn is_hit(&self) -> bool {
        matches!(self, March::Hit { .. })
    }
}

/// Sphere traces `ray` through `scene`, stepping by the field value.
pub fn march(ray: &Ray, scene: &Scene, limits: &Limits) -> March {
    let mut t = 0.0;
    for _ in 0..limits.max_steps {
        let point = ray.at(t);
        let d = scene.distance(&point);
        if d <= limits.hit_epsilon {
            return March::Hit { point, distance: t };
        }
        t += d;
        if t > limits.far {
            break;
        }
    }
    March::Miss
}

#[cfg(test)]
mod tests {
    use nalgebra::{point, vector};

    use crate::scene::{Plane, Sphere};

    use super::*;

    fn sphere_ahead() -> Scene {
        Scene::Sphere(Sphere::new(point![0.0, 0.0, 5.0], 1.0))
    }

    #[test]
    fn converges_on_sphere_straight_ahead() {
        let ray = Ray::new(point![0.0, 0.0, 0.0], vector![0.0, 0.0, 1.0]);
        match march(&ray, &sphere_ahead(), &Limits::PRIMARY) {
            March::Hit { point, distance } => {
                assert!((3.99..=4.01).contains(&distance), "distance {}", distance);
                assert!((point.z - distance).abs() < 1e-6);
            }
            March::Miss => panic!("expected a hit"),
        }
    }

    #[test]
    fn ray_pointing_away_misses() {
        let ray = Ray::new(point![0.0, 0.0, 0.0], vector![0.0, -1.0, 0.0]);
        assert_eq!(march(&ray, &sphere_ahead(), &Limits::PRIMARY), March::Miss);
    }

    #[test]
    fn starting_inside_hits_immediately() {
        let ray = Ray::new(point![0.0, 0.0, 5.0], vector![1.0, 0.0, 0.0]);
        assert_eq!(
            march(&ray, &sphere_ahead(), &Limits::PRIMARY),
            March::Hit { point: point![0.0, 0.0, 5.0], distance: 0.0 },
        );
    }

    #[test]
    fn grazing_ray_runs_out_of_steps() {
        // parallel to the ground just above it: each step stays tiny but positive
        let scene = Scene::Plane(Plane { offset: 1.0 });
        let ray = Ray::new(point![0.0, 0.98, 0.0], vector![0.0, 0.0, 1.0]);
        assert_eq!(march(&ray, &scene, &Limits::new(3, 0.01)), March::Miss);
    }

    #[test]
    fn far_plane_cuts_off_long_rays() {
        let ray = Ray::new(point![0.0, 0.0, 0.0], vector![0.0, 0.0, 1.0]);
        let limits = Limits { far: 2.0, ..Limits::PRIMARY };
        assert_eq!(march(&ray, &sphere_ahead(), &limits), March::Miss);
    }

    #[test]
    fn zero_budget_never_hits() {
        let ray = Ray::new(point![0.0, 0.0, 5.0], vector![0.0, 0.0, 1.0]);
        assert!(!march(&ray, &sphere_ahead(), &Limits::new(0, 0.01)).is_hit());
    }
}
