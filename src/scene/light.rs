use nalgebra::{Point3, Vector3};

/// A light at a world position radiating equally in all directions.
///
/// `brightness` is per channel and unbounded; the lighting model divides by the
/// squared distance, so a light several units away needs values well above 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Point3<f32>,
    pub brightness: Vector3<f32>,
}

impl PointLight {
    pub fn new(position: Point3<f32>, brightness: Vector3<f32>) -> Self {
        Self {
            position,
            brightness,
        }
    }
}

impl Default for PointLight {
    /// A blue light up and to the right of the camera.
    fn default() -> Self {
        Self::new(Point3::new(10.0, 5.0, -5.0), Vector3::new(0.0, 0.0, 6.0))
    }
}
