use nalgebra::{Matrix4, Vector3, Vector4};

//=================================
// Transform Matrix Factory
//=================================

/// Factory for the elementary transforms the pipeline works with.
///
/// All matrices are written out row by row, so what you read here is what ends up
/// in memory when viewed as a row-major 4x4. Column vectors are assumed: a point
/// `p` is transformed as `M * p`.
pub struct TransformFactory;

#[rustfmt::skip]
impl TransformFactory {
    pub fn identity() -> Matrix4<f32> {
        Matrix4::identity()
    }

    /// Creates a rotation matrix around the X-axis.
    pub fn rotation_x(angle_rad: f32) -> Matrix4<f32> {
        let c = angle_rad.cos();
        let s = angle_rad.sin();
        Matrix4::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, c,  -s,   0.0,
            0.0, s,   c,   0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Creates a rotation matrix around the Y-axis.
    pub fn rotation_y(angle_rad: f32) -> Matrix4<f32> {
        let c = angle_rad.cos();
        let s = angle_rad.sin();
        Matrix4::new(
            c,   0.0, s,   0.0,
            0.0, 1.0, 0.0, 0.0,
           -s,   0.0, c,   0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Creates a rotation matrix around the Z-axis.
    pub fn rotation_z(angle_rad: f32) -> Matrix4<f32> {
        let c = angle_rad.cos();
        let s = angle_rad.sin();
        Matrix4::new(
            c,  -s,   0.0, 0.0,
            s,   c,   0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Creates a translation matrix.
    pub fn translation(translation: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new(
            1.0, 0.0, 0.0, translation.x,
            0.0, 1.0, 0.0, translation.y,
            0.0, 0.0, 1.0, translation.z,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Creates a uniform scaling matrix.
    pub fn scaling(scale: f32) -> Matrix4<f32> {
        Self::scaling_nonuniform(&Vector3::new(scale, scale, scale))
    }

    /// Creates a non-uniform scaling matrix.
    pub fn scaling_nonuniform(scale: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new(
            scale.x, 0.0,     0.0,     0.0,
            0.0,     scale.y, 0.0,     0.0,
            0.0,     0.0,     scale.z, 0.0,
            0.0,     0.0,     0.0,     1.0,
        )
    }

    /// Creates a perspective projection from explicit frustum extents at the near plane.
    ///
    /// Depth maps so that points in front of the camera (negative view-space z) end up
    /// with a positive clip-space z, which is what the near-plane test in the clip stage
    /// checks for.
    pub fn projection(
        top: f32,
        bottom: f32,
        left: f32,
        right: f32,
        near: f32,
        far: f32,
    ) -> Matrix4<f32> {
        let rl = 1.0 / (right - left);
        let tb = 1.0 / (top - bottom);
        let fnr = 1.0 / (far - near);

        Matrix4::new(
            2.0 * near * rl, 0.0,             (right + left) * rl, 0.0,
            0.0,             2.0 * near * tb, (top + bottom) * tb, 0.0,
            0.0,             0.0,             -far * fnr,          -far * near * fnr,
            0.0,             0.0,             -1.0,                0.0,
        )
    }
}

//=================================
// Matrix Operations
//=================================

/// Composition and in-place editing of a running transform.
///
/// The `*_in_place` edits apply the elementary transform *after* the current one
/// (`M <- E * M`), which is how the viewer nudges a model along world axes without
/// rebuilding its matrix.
pub trait MatrixOps {
    /// `a.compose(&b)` is `a * b`: apply `b` first, then `a`.
    fn compose(&self, other: &Matrix4<f32>) -> Matrix4<f32>;

    /// `v <- M * v`. No perspective divide.
    fn transform_in_place(&self, v: &mut Vector4<f32>);

    /// `v.xyz <- M3x3 * v.xyz`, ignoring translation. `v.w` is left untouched.
    fn transform_direction_in_place(&self, v: &mut Vector4<f32>);

    fn translate_in_place(&mut self, x: f32, y: f32, z: f32);
    fn scale_in_place(&mut self, x: f32, y: f32, z: f32);
    fn rotate_x_in_place(&mut self, angle_rad: f32);
    fn rotate_y_in_place(&mut self, angle_rad: f32);
    fn rotate_z_in_place(&mut self, angle_rad: f32);
}

impl MatrixOps for Matrix4<f32> {
    #[inline]
    fn compose(&self, other: &Matrix4<f32>) -> Matrix4<f32> {
        self * other
    }

    #[inline]
    fn transform_in_place(&self, v: &mut Vector4<f32>) {
        *v = self * *v;
    }

    #[inline]
    fn transform_direction_in_place(&self, v: &mut Vector4<f32>) {
        let d = self.fixed_view::<3, 3>(0, 0) * v.xyz();
        v.x = d.x;
        v.y = d.y;
        v.z = d.z;
    }

    fn translate_in_place(&mut self, x: f32, y: f32, z: f32) {
        // Left-multiplying by a translation only folds the last row into the first three.
        for c in 0..4 {
            let w = self[(3, c)];
            self[(0, c)] += x * w;
            self[(1, c)] += y * w;
            self[(2, c)] += z * w;
        }
    }

    fn scale_in_place(&mut self, x: f32, y: f32, z: f32) {
        for c in 0..4 {
            self[(0, c)] *= x;
            self[(1, c)] *= y;
            self[(2, c)] *= z;
        }
    }

    fn rotate_x_in_place(&mut self, angle_rad: f32) {
        *self = TransformFactory::rotation_x(angle_rad) * *self;
    }

    fn rotate_y_in_place(&mut self, angle_rad: f32) {
        *self = TransformFactory::rotation_y(angle_rad) * *self;
    }

    fn rotate_z_in_place(&mut self, angle_rad: f32) {
        *self = TransformFactory::rotation_z(angle_rad) * *self;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f32 = 1e-5;

    fn assert_close(a: &Vector4<f32>, b: &Vector4<f32>) {
        assert!((a - b).norm() < TOLERANCE, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_compose_applies_right_operand_first() {
        let m = TransformFactory::translation(&Vector3::new(1.0, 0.0, 0.0))
            .compose(&TransformFactory::scaling(2.0));
        let mut p = Vector4::new(1.0, 0.0, 0.0, 1.0);
        m.transform_in_place(&mut p);
        assert_close(&p, &Vector4::new(3.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_rotation_round_trip() {
        let angle = 0.7;
        let original = Vector4::new(0.3, -1.2, 2.5, 1.0);
        for (forward, back) in [
            (TransformFactory::rotation_x(angle), TransformFactory::rotation_x(-angle)),
            (TransformFactory::rotation_y(angle), TransformFactory::rotation_y(-angle)),
            (TransformFactory::rotation_z(angle), TransformFactory::rotation_z(-angle)),
        ] {
            let mut p = original;
            forward.transform_in_place(&mut p);
            back.transform_in_place(&mut p);
            assert_close(&p, &original);
        }
    }

    #[test]
    fn test_in_place_edits_match_left_multiplication() {
        let base = TransformFactory::rotation_y(0.4).compose(&TransformFactory::scaling(3.0));

        let mut m = base;
        m.translate_in_place(1.0, -2.0, 0.5);
        let expected = TransformFactory::translation(&Vector3::new(1.0, -2.0, 0.5)) * base;
        assert!((m - expected).norm() < TOLERANCE);

        let mut m = base;
        m.scale_in_place(2.0, 0.5, 4.0);
        let expected =
            TransformFactory::scaling_nonuniform(&Vector3::new(2.0, 0.5, 4.0)) * base;
        assert!((m - expected).norm() < TOLERANCE);

        let mut m = base;
        m.rotate_z_in_place(1.1);
        let expected = TransformFactory::rotation_z(1.1) * base;
        assert!((m - expected).norm() < TOLERANCE);
    }

    #[test]
    fn test_direction_ignores_translation() {
        let m = TransformFactory::translation(&Vector3::new(5.0, 6.0, 7.0));
        let mut n = Vector4::new(0.0, 1.0, 0.0, 0.0);
        m.transform_direction_in_place(&mut n);
        assert_close(&n, &Vector4::new(0.0, 1.0, 0.0, 0.0));
    }

    #[test]
    fn test_projection_puts_visible_points_at_positive_z() {
        let proj = TransformFactory::projection(0.2, -0.2, -0.2, 0.2, 0.2, 100.0);
        let mut p = Vector4::new(0.0, 0.0, -10.0, 1.0);
        proj.transform_in_place(&mut p);
        assert!(p.z > 0.0);
        assert!((p.w - 10.0).abs() < TOLERANCE);

        let mut behind = Vector4::new(0.0, 0.0, 10.0, 1.0);
        proj.transform_in_place(&mut behind);
        assert!(behind.z < 0.0);
    }
}
