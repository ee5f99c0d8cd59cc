use nalgebra::{vector, Vector3};

/// Up on the sensor: rows grow downward, so up is -y.
pub const UP: Vector3<f32> = Vector3::new(0.0, -1.0, 0.0);

/// Unit vector along `v`, or `fallback` when `v` is zero or not finite.
pub fn normalize_or(v: &Vector3<f32>, fallback: Vector3<f32>) -> Vector3<f32> {
    match v.try_normalize(f32::EPSILON) {
        Some(n) if n.iter().all(|c| c.is_finite()) => n,
        _ => fallback,
    }
}

pub fn abs(v: &Vector3<f32>) -> Vector3<f32> {
    vector![v.x.abs(), v.y.abs(), v.z.abs()]
}

/// Rotates `v` about the vertical axis, acting on the XZ plane only.
pub fn rotate_xz(v: &Vector3<f32>, angle: f32) -> Vector3<f32> {
    let (sin, cos) = angle.sin_cos();
    vector![v.x * cos - v.z * sin, v.y, v.x * sin + v.z * cos]
}
