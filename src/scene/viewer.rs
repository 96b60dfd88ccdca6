use crate::core::color::OPAQUE_BLACK;
use crate::core::framebuffer::FrameBuffer;
use crate::core::math::transform::{MatrixOps, TransformFactory};
use crate::core::pipeline::{FillMode, PipelineState, RootArgument, RootArguments};
use crate::pipeline::renderer::{self, DrawStats};
use crate::pipeline::shaders::flat::{self, FlatShader};
use crate::pipeline::shaders::phong::{self, PhongShader};
use crate::pipeline::sorter;
use crate::scene::light::PointLight;
use crate::scene::mesh::Mesh;
use log::{debug, info};
use nalgebra::{Matrix4, Vector3};

/// Half extent of the near-plane window, in view units.
const FRUSTUM_HALF_HEIGHT: f32 = 0.2;
const NEAR: f32 = 0.2;
const FAR: f32 = 100_000.0;
/// Distance from the camera a freshly loaded model is placed at.
const MODEL_DISTANCE: f32 = 10.0;
/// Fraction of the view a freshly loaded model spans, in units of its extent.
const MODEL_FIT: f32 = 7.0;

/// Owns everything needed to turn one mesh into a frame: viewport and projection,
/// the model's world transform, the light, and the solid / wireframe pipeline setups.
///
/// The camera sits at the origin looking down -Z. The projection folds in the
/// viewport transform, so clip coordinates divide straight into pixels.
pub struct Viewer {
    width: usize,
    height: usize,
    projection: Matrix4<f32>,
    world: Matrix4<f32>,
    pub light: PointLight,
    pub solid: bool,
    pub wireframe: bool,
    pub cull_back_face: bool,
    pub clear_color: u32,
    pub phong: PhongShader,
    pub flat: FlatShader,
}

impl Viewer {
    pub fn new(width: usize, height: usize) -> Self {
        let mut viewer = Self {
            width: 1,
            height: 1,
            projection: Matrix4::identity(),
            world: Matrix4::identity(),
            light: PointLight::default(),
            solid: true,
            wireframe: false,
            cull_back_face: true,
            clear_color: OPAQUE_BLACK,
            phong: PhongShader::default(),
            flat: FlatShader::default(),
        };
        viewer.resize(width, height);
        viewer
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Changes the viewport and rebuilds the projection. Sizes are clamped to at least 1.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width.max(1);
        self.height = height.max(1);

        let w = self.width as f32;
        let h = self.height as f32;
        let aspect = w / h;
        let half_width = FRUSTUM_HALF_HEIGHT * aspect;

        // NDC [-1, 1] -> pixels, with +Y pointing down the screen
        let viewport = TransformFactory::scaling_nonuniform(&Vector3::new(w / 2.0, -h / 2.0, 1.0))
            .compose(&TransformFactory::translation(&Vector3::new(1.0, -1.0, 0.0)));
        let frustum = TransformFactory::projection(
            FRUSTUM_HALF_HEIGHT,
            -FRUSTUM_HALF_HEIGHT,
            -half_width,
            half_width,
            NEAR,
            FAR,
        );
        self.projection = viewport.compose(&frustum);
        debug!("Viewport resized to {}x{}", self.width, self.height);
    }

    pub fn projection(&self) -> &Matrix4<f32> {
        &self.projection
    }

    pub fn world_matrix(&self) -> &Matrix4<f32> {
        &self.world
    }

    pub fn world_matrix_mut(&mut self) -> &mut Matrix4<f32> {
        &mut self.world
    }

    pub fn set_world_matrix(&mut self, world: Matrix4<f32>) {
        self.world = world;
    }

    /// World-view-projection for the current state.
    pub fn world_view_projection(&self) -> Matrix4<f32> {
        self.projection.compose(&self.world)
    }

    /// Places a model of the given extent in front of the camera at a size that fits
    /// the viewport, replacing the current world transform.
    pub fn fit_model(&mut self, max_size: f32) {
        let aspect = self.width as f32 / self.height as f32;
        let extent = if max_size > 0.0 { max_size } else { 1.0 };
        let scale = aspect.min(1.0) / extent * MODEL_FIT;
        self.world = TransformFactory::translation(&Vector3::new(0.0, 0.0, -MODEL_DISTANCE))
            .compose(&TransformFactory::scaling(scale));
        info!("Model fitted: extent {:.3}, scale {:.4}", max_size, scale);
    }

    /// Spins the model about its own X axis.
    pub fn rotate_x(&mut self, degrees: f32) {
        self.world = self.world.compose(&TransformFactory::rotation_x(degrees.to_radians()));
    }

    /// Spins the model about its own Y axis.
    pub fn rotate_y(&mut self, degrees: f32) {
        self.world = self.world.compose(&TransformFactory::rotation_y(degrees.to_radians()));
    }

    /// Spins the model about its own Z axis.
    pub fn rotate_z(&mut self, degrees: f32) {
        self.world = self.world.compose(&TransformFactory::rotation_z(degrees.to_radians()));
    }

    /// Scales the model about its own origin.
    pub fn scale_by(&mut self, factor: f32) {
        self.world = self.world.compose(&TransformFactory::scaling(factor));
    }

    /// Moves the model along the world (camera) axes.
    pub fn translate_by(&mut self, dx: f32, dy: f32, dz: f32) {
        self.world.translate_in_place(dx, dy, dz);
    }

    /// Root arguments in the layout both shader pairs expect.
    pub fn root_arguments(&self) -> RootArguments {
        RootArguments::new(vec![
            RootArgument::Matrix(self.world_view_projection()),
            RootArgument::Matrix(self.world),
            RootArgument::PointLight(self.light),
        ])
    }

    /// Re-sorts the mesh's triangles for the current transform.
    /// Call after any change to the world matrix or projection.
    pub fn update_transform(&self, mesh: &mut Mesh) {
        let wvp = self.world_view_projection();
        sorter::sort(&mesh.vertices, &mut mesh.indices, &wvp);
        debug!("Sorted {} triangles", mesh.triangle_count());
    }

    /// Clears `target` and draws `mesh` with whichever fill modes are enabled.
    ///
    /// The target is resized to the viewport if needed. Returns the stats of the
    /// solid pass and of the wireframe pass, for those that ran.
    pub fn render(
        &self,
        mesh: &Mesh,
        target: &mut FrameBuffer,
    ) -> (Option<DrawStats>, Option<DrawStats>) {
        if target.width != self.width || target.height != self.height {
            target.resize(self.width, self.height);
        }
        renderer::clear(target, self.clear_color);

        let args = self.root_arguments();
        let solid = PipelineState::new(
            &self.phong,
            &self.phong,
            phong::INTERPOLATE_COUNT,
            FillMode::Solid,
        )
        .with_cull_back_face(self.cull_back_face);
        let wire = PipelineState::new(
            &self.flat,
            &self.flat,
            flat::INTERPOLATE_COUNT,
            FillMode::Wireframe,
        )
        .with_cull_back_face(self.cull_back_face);

        match (self.solid, self.wireframe) {
            (true, true) => {
                let (a, b) = renderer::draw_interleaved(
                    &solid,
                    &wire,
                    &args,
                    &mesh.vertices,
                    &mesh.indices,
                    target,
                );
                (Some(a), Some(b))
            }
            (true, false) => {
                let stats = renderer::draw(&solid, &args, &mesh.vertices, &mesh.indices, target);
                (Some(stats), None)
            }
            (false, true) => {
                let stats = renderer::draw(&wire, &args, &mesh.vertices, &mesh.indices, target);
                (None, Some(stats))
            }
            (false, false) => (None, None),
        }
    }
}
