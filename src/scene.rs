use float_ord::FloatOrd;
use nalgebra::{point, Point3};

use crate::math::{abs, rotate_xz};

const INV_SQRT_3: f32 = 0.577_350_26;

/// Ground plane; solid below `offset` on the downward-growing y axis.
#[derive(Clone, Debug)]
pub struct Plane {
    pub offset: f32,
}

impl Plane {
    pub fn distance(&self, p: &Point3<f32>) -> f32 {
        self.offset - p.y
    }
}

#[derive(Clone, Debug)]
pub struct Sphere {
    pub center: Point3<f32>,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Point3<f32>, radius: f32) -> Self {
        Sphere { center, radius }
    }

    pub fn distance(&self, p: &Point3<f32>) -> f32 {
        (p - self.center).magnitude() - self.radius
    }
}

#[derive(Clone, Debug)]
pub struct Octahedron {
    pub center: Point3<f32>,
    pub size: f32,
    pub yaw: f32,
}

impl Octahedron {
    pub fn new(center: Point3<f32>, size: f32, yaw: f32) -> Self {
        Octahedron { center, size, yaw }
    }

    pub fn distance(&self, p: &Point3<f32>) -> f32 {
        let local = abs(&rotate_xz(&(p - self.center), self.yaw));
        (local.x + local.y + local.z - self.size) * INV_SQRT_3
    }
}

/// Signed distance field built from primitives joined by union.
#[derive(Clone, Debug)]
pub enum Scene {
    Plane(Plane),
    Sphere(Sphere),
    Octahedron(Octahedron),
    Union(Vec<Scene>),
}

impl Scene {
    pub fn distance(&self, p: &Point3<f32>) -> f32 {
        match self {
            Scene::Plane(plane) => plane.distance(p),
            Scene::Sphere(sphere) => sphere.distance(p),
            Scene::Octahedron(octahedron) => octahedron.distance(p),
            Scene::Union(list) => {
                list.iter()
                    .map(|obj| FloatOrd(obj.distance(p)))
                    .min()
                    .map_or(f32::INFINITY, |d| d.0)
            }
        }
    }

    /// Ground plus a spinning octahedron in front of the camera.
    pub fn demo(angle: f32) -> Scene {
        Scene::Union(vec![
            Scene::Plane(Plane { offset: 1.0 }),
            Scene::Octahedron(Octahedron::new(point![0.0, 0.0, 5.0], 1.0, angle)),
        ])
    }

    pub fn sphere_only() -> Scene {
        Scene::Sphere(Sphere::new(point![0.0, 0.0, 5.0], 1.0))
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::vector;

    use super::*;

    #[test]
    fn sphere_distance_is_exact() {
        let center = point![1.0, -2.0, 3.0];
        let scene = Scene::Sphere(Sphere::new(center, 2.5));
        assert!((scene.distance(&center) + 2.5).abs() < 1e-5);
        assert!(scene.distance(&(center + vector![2.5, 0.0, 0.0])).abs() < 1e-5);
        assert!((scene.distance(&(center + vector![0.0, 0.0, 4.0])) - 1.5).abs() < 1e-5);
    }

    #[test]
    fn plane_is_solid_below_offset() {
        let plane = Plane { offset: 1.0 };
        assert_eq!(plane.distance(&point![0.0, 0.0, 0.0]), 1.0);
        assert_eq!(plane.distance(&point![7.0, 1.0, -3.0]), 0.0);
        assert!(plane.distance(&point![0.0, 2.0, 0.0]) < 0.0);
    }

    #[test]
    fn octahedron_vertices_lie_on_surface() {
        let oct = Octahedron::new(point![0.0, 0.0, 5.0], 1.0, 0.0);
        assert!(oct.distance(&point![1.0, 0.0, 5.0]).abs() < 1e-6);
        assert!(oct.distance(&point![0.0, -1.0, 5.0]).abs() < 1e-6);
        assert!((oct.distance(&point![0.0, 0.0, 5.0]) + INV_SQRT_3).abs() < 1e-6);
    }

    #[test]
    fn octahedron_rotation_spins_about_vertical() {
        let angle = std::f32::consts::FRAC_PI_4;
        let oct = Octahedron::new(point![0.0, 0.0, 0.0], 1.0, angle);
        // a vertex turned by 45 degrees lands on the XZ diagonal
        let (sin, cos) = angle.sin_cos();
        let turned = point![cos, 0.0, -sin];
        assert!(oct.distance(&turned).abs() < 1e-5);
        assert!(oct.distance(&point![1.0, 0.0, 0.0]) > 0.0);
    }

    #[test]
    fn union_takes_nearest() {
        let scene = Scene::demo(0.0);
        let p = point![0.0, 0.0, 0.0];
        // octahedron face is 4/sqrt(3) away, ground is 1 away
        assert!((scene.distance(&p) - 1.0).abs() < 1e-6);
        let near_shape = point![0.0, 0.0, 3.5];
        assert!((scene.distance(&near_shape) - 0.5 * INV_SQRT_3).abs() < 1e-5);
        assert_eq!(Scene::Union(vec![]).distance(&p), f32::INFINITY);
    }
}
