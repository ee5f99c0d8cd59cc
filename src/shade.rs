use nalgebra::{Point3, vector, Vector3};

use crate::march::{march, Limits};
use crate::math::{normalize_or, UP};
use crate::ray::Ray;
use crate::scene::Scene;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shading {
    pub normal_epsilon: f32,
    pub shadow_bias: f32,
    pub shadow: Limits,
}

impl Default for Shading {
    fn default() -> Self {
        Shading {
            normal_epsilon: 0.01,
            shadow_bias: 0.01,
            shadow: Limits::SHADOW,
        }
    }
}

/// Light direction (surface toward light) for an angle in radians.
pub fn light_direction(angle: f32) -> Vector3<f32> {
    let (sin, cos) = angle.sin_cos();
    vector![cos, -1.0, sin].normalize()
}

/// Forward-difference gradient of the field; four evaluations in total.
pub fn numerical_normal(scene: &Scene, p: &Point3<f32>, e: f32) -> Vector3<f32> {
    let d0 = scene.distance(p);
    let gradient = vector![
        scene.distance(&(p + vector![e, 0.0, 0.0])) - d0,
        scene.distance(&(p + vector![0.0, e, 0.0])) - d0,
        scene.distance(&(p + vector![0.0, 0.0, e])) - d0,
    ];
    normalize_or(&gradient, UP)
}

pub fn diffuse(normal: &Vector3<f32>, light: &Vector3<f32>) -> u8 {
    // float to int casts saturate, so ndl >= 1 maps to 255
    (normal.dot(light).max(0.0) * 255.0).round() as u8
}

pub fn shade(point: &Point3<f32>, scene: &Scene, light: &Vector3<f32>, shading: &Shading) -> u8 {
    let normal = numerical_normal(scene, point, shading.normal_epsilon);
    let intensity = diffuse(&normal, light);
    if intensity == 0 {
        return 0;
    }

    let shadow_ray = Ray::new(point + normal * shading.shadow_bias, *light);
    if march(&shadow_ray, scene, &shading.shadow).is_hit() {
        return 0;
    }
    intensity
}
