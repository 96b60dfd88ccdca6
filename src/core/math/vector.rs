use nalgebra::{Vector3, Vector4};

/// Normalization that leaves a zero-length vector as it is instead of producing NaNs.
pub trait NormalizeOrKeep {
    fn normalize_or_keep(&self) -> Self;
}

impl NormalizeOrKeep for Vector3<f32> {
    #[inline]
    fn normalize_or_keep(&self) -> Self {
        let len = self.norm();
        if len > 0.0 { self / len } else { *self }
    }
}

impl NormalizeOrKeep for Vector4<f32> {
    #[inline]
    fn normalize_or_keep(&self) -> Self {
        let len = self.norm();
        if len > 0.0 { self / len } else { *self }
    }
}
