use nalgebra::{Point2, Vector3, Vector4};

const EPSILON: f32 = 1e-5;

/// Calculates the barycentric coordinates (alpha, beta, gamma) of point p
/// with respect to triangle (v1, v2, v3).
///
/// Returns `None` if the triangle is degenerate (area is near zero).
///
/// # Returns
/// A Vector3 where:
/// - x: alpha (weight for v1)
/// - y: beta  (weight for v2)
/// - z: gamma (weight for v3)
pub fn barycentric_coordinates(
    p: Point2<f32>,
    v1: Point2<f32>,
    v2: Point2<f32>,
    v3: Point2<f32>,
) -> Option<Vector3<f32>> {
    // Twice the signed area, expressed relative to v3
    let denom = (v2.y - v3.y) * (v1.x - v3.x) + (v3.x - v2.x) * (v1.y - v3.y);

    if denom.abs() < EPSILON {
        return None;
    }

    let inv_denom = 1.0 / denom;
    let alpha = ((v2.y - v3.y) * (p.x - v3.x) + (v3.x - v2.x) * (p.y - v3.y)) * inv_denom;
    let beta = ((v3.y - v1.y) * (p.x - v3.x) + (v1.x - v3.x) * (p.y - v3.y)) * inv_denom;
    let gamma = 1.0 - alpha - beta;

    Some(Vector3::new(alpha, beta, gamma))
}

/// Writes `a + (b - a) * t` slot by slot into `out`.
#[inline]
pub fn lerp_slots(out: &mut [Vector4<f32>], a: &[Vector4<f32>], b: &[Vector4<f32>], t: f32) {
    for ((o, a), b) in out.iter_mut().zip(a).zip(b) {
        *o = a + (b - a) * t;
    }
}

/// Writes the barycentric blend of three slot arrays into `out`.
#[inline]
pub fn blend_slots(
    out: &mut [Vector4<f32>],
    a: &[Vector4<f32>],
    b: &[Vector4<f32>],
    c: &[Vector4<f32>],
    weights: &Vector3<f32>,
) {
    for (((o, a), b), c) in out.iter_mut().zip(a).zip(b).zip(c) {
        *o = a * weights.x + b * weights.y + c * weights.z;
    }
}
