use crate::core::geometry::Vertex;
use crate::scene::light::PointLight;
use nalgebra::{Matrix4, Vector4};

/// Per-vertex program.
///
/// Writes the vertex's attribute slots into `out`. `out[0]` must receive the
/// clip-space position; the remaining slots are free-form varyings that the
/// rasterizer interpolates and hands to the pixel program.
///
/// # Arguments
/// - `vertex`: input vertex attributes (position, normal).
/// - `args`: the root arguments shared by every invocation of the draw.
/// - `out`: exactly `interpolate_count` slots, owned by the pipeline.
pub trait VertexProgram {
    fn run(&self, vertex: &Vertex, args: &RootArguments, out: &mut [Vector4<f32>]);
}

/// Per-pixel program.
///
/// `interpolates` holds slots `1..interpolate_count` of the covered pixel; the
/// position slot is consumed by the pipeline and never passed on.
///
/// # Returns
/// - `u32`: packed `0xAARRGGBB` colour written straight to the target.
pub trait PixelProgram {
    fn run(&self, args: &RootArguments, interpolates: &[Vector4<f32>]) -> u32;
}

/// One entry of the root argument list.
#[derive(Debug, Clone, PartialEq)]
pub enum RootArgument {
    Matrix(Matrix4<f32>),
    PointLight(PointLight),
    Vector(Vector4<f32>),
    Scalar(f32),
}

/// Ordered, read-only values visible to every shader invocation of a draw.
///
/// The accessors treat a missing index or a mismatched kind as a broken contract
/// between the caller and its shaders, not as a runtime condition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootArguments {
    entries: Vec<RootArgument>,
}

impl RootArguments {
    pub fn new(entries: Vec<RootArgument>) -> Self {
        Self { entries }
    }

    /// # Panics
    /// If the entry is missing or is not a matrix.
    pub fn matrix(&self, index: usize) -> &Matrix4<f32> {
        match self.entries.get(index) {
            Some(RootArgument::Matrix(m)) => m,
            other => panic!("root argument {} is not a matrix: {:?}", index, other),
        }
    }

    /// # Panics
    /// If the entry is missing or is not a point light.
    pub fn point_light(&self, index: usize) -> &PointLight {
        match self.entries.get(index) {
            Some(RootArgument::PointLight(l)) => l,
            other => panic!("root argument {} is not a point light: {:?}", index, other),
        }
    }

    /// # Panics
    /// If the entry is missing or is not a vector.
    pub fn vector(&self, index: usize) -> &Vector4<f32> {
        match self.entries.get(index) {
            Some(RootArgument::Vector(v)) => v,
            other => panic!("root argument {} is not a vector: {:?}", index, other),
        }
    }

    /// # Panics
    /// If the entry is missing or is not a scalar.
    pub fn scalar(&self, index: usize) -> f32 {
        match self.entries.get(index) {
            Some(RootArgument::Scalar(s)) => *s,
            other => panic!("root argument {} is not a scalar: {:?}", index, other),
        }
    }
}

#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum FillMode {
    Wireframe,
    Solid,
}

/// Everything the driver needs to know about how to draw a triangle list.
#[derive(Copy, Clone)]
pub struct PipelineState<'a> {
    pub vertex_shader: &'a dyn VertexProgram,
    pub pixel_shader: &'a dyn PixelProgram,
    /// Slots per vertex, position included. Must be at least 1.
    pub interpolate_count: usize,
    pub fill_mode: FillMode,
    pub cull_back_face: bool,
}

impl<'a> PipelineState<'a> {
    pub fn new(
        vertex_shader: &'a dyn VertexProgram,
        pixel_shader: &'a dyn PixelProgram,
        interpolate_count: usize,
        fill_mode: FillMode,
    ) -> Self {
        Self {
            vertex_shader,
            pixel_shader,
            interpolate_count,
            fill_mode,
            cull_back_face: true,
        }
    }

    pub fn with_cull_back_face(mut self, cull: bool) -> Self {
        self.cull_back_face = cull;
        self
    }
}
