use crate::core::color::pack_argb;
use crate::core::geometry::Vertex;
use crate::core::math::transform::MatrixOps;
use crate::core::math::vector::NormalizeOrKeep;
use crate::core::pipeline::{PixelProgram, RootArguments, VertexProgram};
use nalgebra::{Vector3, Vector4};

/// Root argument holding the world-view-projection matrix.
pub const WVP_ARG: usize = 0;
/// Root argument holding the world matrix.
pub const WORLD_ARG: usize = 1;
/// Root argument holding the [`PointLight`](crate::scene::light::PointLight).
pub const LIGHT_ARG: usize = 2;

/// Slots written per vertex: clip position, world position, world normal.
pub const INTERPOLATE_COUNT: usize = 3;

/// Per-pixel point-light shading: ambient + inverse-square diffuse + a half-vector
/// highlight. The camera is assumed to sit at the world origin.
#[derive(Debug, Clone)]
pub struct PhongShader {
    /// Added to every channel before lighting.
    pub ambient: f32,
    /// Weight of the highlight term.
    pub specular_strength: f32,
    pub shininess: i32,
}

impl PhongShader {
    pub fn new(ambient: f32, specular_strength: f32, shininess: i32) -> Self {
        Self {
            ambient,
            specular_strength,
            shininess,
        }
    }
}

impl Default for PhongShader {
    fn default() -> Self {
        Self::new(0.15, 0.15, 4)
    }
}

impl VertexProgram for PhongShader {
    fn run(&self, vertex: &Vertex, args: &RootArguments, out: &mut [Vector4<f32>]) {
        let position = vertex.position.to_homogeneous();

        // 1. Clip-space position
        out[0] = position;
        args.matrix(WVP_ARG).transform_in_place(&mut out[0]);

        // 2. World-space position
        out[1] = position;
        args.matrix(WORLD_ARG).transform_in_place(&mut out[1]);

        // 3. World-space normal (rotation/scale only)
        out[2] = vertex.normal.to_homogeneous();
        args.matrix(WORLD_ARG).transform_direction_in_place(&mut out[2]);
    }
}

impl PixelProgram for PhongShader {
    fn run(&self, args: &RootArguments, interpolates: &[Vector4<f32>]) -> u32 {
        let world_pos = interpolates[0].xyz();
        let normal = interpolates[1].xyz().normalize_or_keep();
        let light = args.point_light(LIGHT_ARG);

        let mut color = Vector3::repeat(self.ambient);
        let to_light = light.position.coords - world_pos;
        let n_dot_l = to_light.dot(&normal);

        if n_dot_l > 0.0 {
            // Inverse-square falloff folded into the cosine term
            let mut amount = n_dot_l / to_light.norm_squared();

            let light_dir = to_light.normalize_or_keep();
            let view_dir = world_pos.normalize_or_keep();
            let half = (view_dir + light_dir).normalize_or_keep();
            amount += half.dot(&normal).max(0.0).powi(self.shininess) * self.specular_strength;

            color += light.brightness * amount;
        }

        pack_argb(&color)
    }
}
