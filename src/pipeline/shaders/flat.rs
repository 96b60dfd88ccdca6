use crate::core::geometry::Vertex;
use crate::core::math::transform::MatrixOps;
use crate::core::pipeline::{PixelProgram, RootArguments, VertexProgram};
use crate::pipeline::shaders::phong::WVP_ARG;
use nalgebra::Vector4;

/// Only the clip position is written.
pub const INTERPOLATE_COUNT: usize = 1;

/// Unlit single-colour shader, used for wireframe overlays.
#[derive(Debug, Clone)]
pub struct FlatShader {
    pub color: u32,
}

impl FlatShader {
    pub fn new(color: u32) -> Self {
        Self { color }
    }
}

impl Default for FlatShader {
    fn default() -> Self {
        Self::new(0xFF8C_0000)
    }
}

impl VertexProgram for FlatShader {
    fn run(&self, vertex: &Vertex, args: &RootArguments, out: &mut [Vector4<f32>]) {
        out[0] = vertex.position.to_homogeneous();
        args.matrix(WVP_ARG).transform_in_place(&mut out[0]);
    }
}

impl PixelProgram for FlatShader {
    fn run(&self, _args: &RootArguments, _interpolates: &[Vector4<f32>]) -> u32 {
        self.color
    }
}
