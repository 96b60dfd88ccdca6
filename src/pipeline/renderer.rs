use crate::core::clipper::{ClipOutcome, process_triangle};
use crate::core::framebuffer::FrameBuffer;
use crate::core::geometry::Vertex;
use crate::core::pipeline::{PipelineState, RootArguments};
use crate::core::rasterizer::Rasterizer;
use crate::core::slots::SlotId;
use log::{debug, warn};

/// Per-call counters, mostly for logging.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrawStats {
    pub triangles: usize,
    pub drawn: usize,
    pub clipped: usize,
    pub culled: usize,
    pub rejected: usize,
}

impl DrawStats {
    fn record(&mut self, outcome: ClipOutcome) {
        self.triangles += 1;
        match outcome {
            ClipOutcome::Drawn => self.drawn += 1,
            ClipOutcome::Clipped => self.clipped += 1,
            ClipOutcome::Culled => self.culled += 1,
            ClipOutcome::Rejected => self.rejected += 1,
        }
    }
}

/// Fills the whole target with one packed ARGB colour.
pub fn clear(target: &mut FrameBuffer, color: u32) {
    target.clear(color);
}

/// Draws an indexed triangle list with one pipeline state.
///
/// Triangles are processed strictly in index order and each one is finished
/// before the next starts, so the order of `indices` is the paint order.
///
/// # Panics
/// If `state.interpolate_count` is zero or an index is out of range for `vertices`.
pub fn draw(
    state: &PipelineState,
    args: &RootArguments,
    vertices: &[Vertex],
    indices: &[u32],
    target: &mut FrameBuffer,
) -> DrawStats {
    assert!(state.interpolate_count >= 1, "pipeline state needs a position slot");

    let mut rast = Rasterizer::new(target, args, state.interpolate_count);
    let mut stats = DrawStats::default();

    for tri in triangles(indices) {
        stats.record(draw_triangle(&mut rast, state, vertices, tri));
    }

    debug!("draw: {:?}", stats);
    stats
}

/// Draws the same triangle list with two pipeline states, triangle by triangle:
/// each triangle goes through `first` and then `second` before the next begins.
///
/// This keeps an overlay (typically wireframe over solid) correctly layered under
/// the painter's algorithm, which two separate passes would not.
///
/// # Panics
/// If either interpolate count is zero or an index is out of range for `vertices`.
pub fn draw_interleaved(
    first: &PipelineState,
    second: &PipelineState,
    args: &RootArguments,
    vertices: &[Vertex],
    indices: &[u32],
    target: &mut FrameBuffer,
) -> (DrawStats, DrawStats) {
    assert!(
        first.interpolate_count >= 1 && second.interpolate_count >= 1,
        "pipeline state needs a position slot"
    );

    let stride = first.interpolate_count.max(second.interpolate_count);
    let mut rast = Rasterizer::new(target, args, stride);
    let mut first_stats = DrawStats::default();
    let mut second_stats = DrawStats::default();

    for tri in triangles(indices) {
        first_stats.record(draw_triangle(&mut rast, first, vertices, tri));
        second_stats.record(draw_triangle(&mut rast, second, vertices, tri));
    }

    debug!("draw_interleaved: {:?} / {:?}", first_stats, second_stats);
    (first_stats, second_stats)
}

fn triangles(indices: &[u32]) -> std::slice::ChunksExact<'_, u32> {
    let chunks = indices.chunks_exact(3);
    if !chunks.remainder().is_empty() {
        warn!(
            "Index list length {} is not a multiple of 3, ignoring the last {} indices",
            indices.len(),
            chunks.remainder().len()
        );
    }
    chunks
}

/// Shades the three corners into fresh arena slots, then clips and rasterizes.
fn draw_triangle(
    rast: &mut Rasterizer,
    state: &PipelineState,
    vertices: &[Vertex],
    tri: &[u32],
) -> ClipOutcome {
    let mark = rast.arena.mark();
    let n = state.interpolate_count;

    let mut shade = |index: u32| -> SlotId {
        let id = rast.arena.alloc();
        let vertex = &vertices[index as usize];
        let args = rast.args();
        let out = &mut rast.arena.get_mut(id)[..n];
        state.vertex_shader.run(vertex, args, out);
        id
    };
    let corners = [shade(tri[0]), shade(tri[1]), shade(tri[2])];

    let outcome = process_triangle(rast, state, corners);
    rast.arena.release(mark);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pipeline::{FillMode, PixelProgram, VertexProgram};
    use nalgebra::Vector4;

    /// Passes positions straight through as clip coordinates (already in pixels, w = 1).
    struct Passthrough(u32);

    impl VertexProgram for Passthrough {
        fn run(&self, vertex: &Vertex, _: &RootArguments, out: &mut [Vector4<f32>]) {
            out[0] = Vector4::new(vertex.position.x, vertex.position.y, vertex.position.z, 1.0);
            for slot in out.iter_mut().skip(1) {
                *slot = Vector4::repeat(self.0 as f32);
            }
        }
    }

    impl PixelProgram for Passthrough {
        fn run(&self, _: &RootArguments, _: &[Vector4<f32>]) -> u32 {
            self.0
        }
    }

    fn quad() -> (Vec<Vertex>, Vec<u32>) {
        let vertices = vec![
            Vertex::at(1.0, 1.0, 1.0),
            Vertex::at(1.0, 6.0, 1.0),
            Vertex::at(6.0, 6.0, 1.0),
            Vertex::at(6.0, 1.0, 1.0),
        ];
        (vertices, vec![0, 1, 2, 0, 2, 3])
    }

    #[test]
    fn test_draw_counts_and_paints() {
        let (vertices, indices) = quad();
        let shader = Passthrough(0xFF00FF00);
        let state = PipelineState::new(&shader, &shader, 1, FillMode::Solid);
        let mut fb = FrameBuffer::new(8, 8);

        let stats = draw(&state, &RootArguments::default(), &vertices, &indices, &mut fb);
        assert_eq!(stats.triangles, 2);
        assert_eq!(stats.drawn, 2);
        for y in 1..=6 {
            for x in 1..=6 {
                assert_eq!(fb.get_pixel(x, y), Some(0xFF00FF00), "({}, {})", x, y);
            }
        }
        assert_eq!(fb.get_pixel(0, 0), Some(0));
    }

    #[test]
    fn test_interleaved_overlays_second_state_per_triangle() {
        let (vertices, indices) = quad();
        let fill = Passthrough(0xFF0000FF);
        let wire = Passthrough(0xFFFF0000);
        let solid = PipelineState::new(&fill, &fill, 3, FillMode::Solid);
        let wireframe = PipelineState::new(&wire, &wire, 1, FillMode::Wireframe);
        let mut fb = FrameBuffer::new(8, 8);

        let (a, b) = draw_interleaved(
            &solid,
            &wireframe,
            &RootArguments::default(),
            &vertices,
            &indices,
            &mut fb,
        );
        assert_eq!(a.drawn, 2);
        assert_eq!(b.drawn, 2);
        // Corners lie on edges, interior stays filled
        assert_eq!(fb.get_pixel(1, 1), Some(0xFFFF0000));
        assert_eq!(fb.get_pixel(6, 6), Some(0xFFFF0000));
        assert_eq!(fb.get_pixel(2, 4), Some(0xFF0000FF));
    }

    #[test]
    fn test_trailing_indices_are_ignored() {
        let (vertices, mut indices) = quad();
        indices.extend([1, 2]);
        let shader = Passthrough(0xFFFFFFFF);
        let state = PipelineState::new(&shader, &shader, 1, FillMode::Solid);
        let mut fb = FrameBuffer::new(8, 8);
        let stats = draw(&state, &RootArguments::default(), &vertices, &indices, &mut fb);
        assert_eq!(stats.triangles, 2);
    }

    #[test]
    fn test_clear() {
        let mut fb = FrameBuffer::new(3, 3);
        clear(&mut fb, 0xFF123456);
        assert!(fb.pixels().iter().all(|&p| p == 0xFF123456));
    }
}
