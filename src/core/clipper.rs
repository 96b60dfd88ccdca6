use crate::core::pipeline::{FillMode, PipelineState};
use crate::core::rasterizer::{Rasterizer, ScreenVertex};
use crate::core::slots::SlotId;
use nalgebra::Vector4;

//=================================
// Outcodes
//=================================

pub const OUT_LEFT: u8 = 1;
pub const OUT_RIGHT: u8 = 2;
pub const OUT_TOP: u8 = 4;
pub const OUT_BOTTOM: u8 = 8;

/// Screen rectangle `[0, max_x] x [0, max_y]` in pixel coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            max_x: width as f32 - 1.0,
            max_y: height as f32 - 1.0,
        }
    }

    /// 4-bit classification of a point against the four screen edges.
    #[inline]
    pub fn outcode(&self, x: f32, y: f32) -> u8 {
        let mut code = 0;
        if x < 0.0 {
            code |= OUT_LEFT;
        } else if x > self.max_x {
            code |= OUT_RIGHT;
        }
        if y < 0.0 {
            code |= OUT_TOP;
        } else if y > self.max_y {
            code |= OUT_BOTTOM;
        }
        code
    }
}

/// What happened to one triangle on its way through the clip stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipOutcome {
    /// Entirely on screen, rasterized as is.
    Drawn,
    /// Partially on screen, rasterized after clipping.
    Clipped,
    /// Removed by the backface test.
    Culled,
    /// Entirely off screen, or behind the near plane in solid mode.
    Rejected,
}

/// Runs one shaded triangle through near test, divide, cull and screen clipping,
/// and rasterizes whatever survives.
///
/// `corners` must hold the three vertices' slots in `rast.arena`, slot 0 being the
/// clip-space position produced by the vertex program.
pub fn process_triangle(
    rast: &mut Rasterizer,
    state: &PipelineState,
    corners: [SlotId; 3],
) -> ClipOutcome {
    let clip = corners.map(|id| rast.arena.get(id)[0]);
    let bounds = Bounds::new(rast.width(), rast.height());

    match state.fill_mode {
        FillMode::Solid => solid_triangle(rast, state, bounds, &clip, corners),
        FillMode::Wireframe => wireframe_triangle(rast, state, bounds, &clip, corners),
    }
}

#[inline]
fn divide(clip: &Vector4<f32>, slots: SlotId) -> ScreenVertex {
    ScreenVertex::new(clip.x / clip.w, clip.y / clip.w, slots)
}

/// Signed area test on screen positions; negative means the triangle faces away.
#[inline]
pub fn is_back_facing(tri: &[ScreenVertex; 3]) -> bool {
    let [p1, p2, p3] = tri;
    let x1 = p1.x - p2.x;
    let x2 = p3.x - p2.x;
    let y1 = p1.y - p2.y;
    let y2 = p3.y - p2.y;
    x1 * y2 - y1 * x2 < 0.0
}

fn solid_triangle(
    rast: &mut Rasterizer,
    state: &PipelineState,
    bounds: Bounds,
    clip: &[Vector4<f32>; 3],
    corners: [SlotId; 3],
) -> ClipOutcome {
    // Coarse near test: a triangle touching the near plane is dropped whole, not clipped.
    if clip.iter().any(|c| c.z <= 0.0) {
        return ClipOutcome::Rejected;
    }

    let tri = [
        divide(&clip[0], corners[0]),
        divide(&clip[1], corners[1]),
        divide(&clip[2], corners[2]),
    ];
    if state.cull_back_face && is_back_facing(&tri) {
        return ClipOutcome::Culled;
    }

    let codes = tri.map(|v| bounds.outcode(v.x, v.y));
    if codes[0] & codes[1] & codes[2] != 0 {
        return ClipOutcome::Rejected;
    }
    if codes[0] | codes[1] | codes[2] == 0 {
        rast.fill_triangle(state, tri);
        return ClipOutcome::Drawn;
    }

    clip_polygon(rast, state, bounds, Some(Edge::Top), tri);
    ClipOutcome::Clipped
}

//=================================
// Polygon clipping state machine
//=================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    fn next(self) -> Option<Edge> {
        match self {
            Edge::Top => Some(Edge::Bottom),
            Edge::Bottom => Some(Edge::Left),
            Edge::Left => Some(Edge::Right),
            Edge::Right => None,
        }
    }

    #[inline]
    fn is_outside(self, v: &ScreenVertex, bounds: &Bounds) -> bool {
        match self {
            Edge::Top => v.y < 0.0,
            Edge::Bottom => v.y > bounds.max_y,
            Edge::Left => v.x < 0.0,
            Edge::Right => v.x > bounds.max_x,
        }
    }

    /// Point where `inside -> outside` crosses this edge, with slots interpolated.
    /// The crossing coordinate is snapped onto the edge exactly.
    fn intersect(
        self,
        rast: &mut Rasterizer,
        bounds: &Bounds,
        inside: ScreenVertex,
        outside: ScreenVertex,
    ) -> ScreenVertex {
        let (boundary, from, to) = match self {
            Edge::Top => (0.0, inside.y, outside.y),
            Edge::Bottom => (bounds.max_y, inside.y, outside.y),
            Edge::Left => (0.0, inside.x, outside.x),
            Edge::Right => (bounds.max_x, inside.x, outside.x),
        };
        let t = (boundary - from) / (to - from);
        let slots = rast.arena.alloc_lerp(inside.slots, outside.slots, t);
        match self {
            Edge::Top | Edge::Bottom => {
                ScreenVertex::new(inside.x + (outside.x - inside.x) * t, boundary, slots)
            }
            Edge::Left | Edge::Right => {
                ScreenVertex::new(boundary, inside.y + (outside.y - inside.y) * t, slots)
            }
        }
    }
}

/// Clips against `edge` and every edge after it, then fills what remains.
///
/// Each step is decided by how many corners lie outside the current edge. Corners
/// are rotated, never swapped, so winding is kept through every split.
fn clip_polygon(
    rast: &mut Rasterizer,
    state: &PipelineState,
    bounds: Bounds,
    edge: Option<Edge>,
    tri: [ScreenVertex; 3],
) {
    let Some(edge) = edge else {
        rast.fill_triangle(state, tri);
        return;
    };

    let outside = tri.map(|v| edge.is_outside(&v, &bounds));
    let outside_count = outside.iter().filter(|&&o| o).count();
    let mark = rast.arena.mark();

    match outside_count {
        0 => clip_polygon(rast, state, bounds, edge.next(), tri),
        1 => {
            // Outside corner goes last: a, b stay, o is cut off leaving a quad
            let k = outside.iter().position(|&o| o).unwrap_or(0);
            let (a, b, o) = (tri[(k + 1) % 3], tri[(k + 2) % 3], tri[k]);
            let on_bo = edge.intersect(rast, &bounds, b, o);
            let on_ao = edge.intersect(rast, &bounds, a, o);
            clip_polygon(rast, state, bounds, edge.next(), [a, b, on_bo]);
            clip_polygon(rast, state, bounds, edge.next(), [a, on_bo, on_ao]);
        }
        2 => {
            // Inside corner goes first: the triangle shrinks towards it
            let k = outside.iter().position(|&o| !o).unwrap_or(0);
            let (i, a, b) = (tri[k], tri[(k + 1) % 3], tri[(k + 2) % 3]);
            let on_ia = edge.intersect(rast, &bounds, i, a);
            let on_ib = edge.intersect(rast, &bounds, i, b);
            clip_polygon(rast, state, bounds, edge.next(), [i, on_ia, on_ib]);
        }
        _ => {}
    }

    rast.arena.release(mark);
}

//=================================
// Wireframe
//=================================

fn wireframe_triangle(
    rast: &mut Rasterizer,
    state: &PipelineState,
    bounds: Bounds,
    clip: &[Vector4<f32>; 3],
    corners: [SlotId; 3],
) -> ClipOutcome {
    const EDGES: [(usize, usize); 3] = [(0, 1), (0, 2), (2, 1)];

    if clip.iter().all(|c| c.z > 0.0) {
        let tri = [
            divide(&clip[0], corners[0]),
            divide(&clip[1], corners[1]),
            divide(&clip[2], corners[2]),
        ];
        if state.cull_back_face && is_back_facing(&tri) {
            return ClipOutcome::Culled;
        }

        let mut outcome = ClipOutcome::Rejected;
        for (i, j) in EDGES {
            outcome = merge(outcome, clip_line(rast, state, &bounds, tri[i], tri[j]));
        }
        return outcome;
    }

    let mut outcome = ClipOutcome::Rejected;
    for (i, j) in EDGES {
        let mark = rast.arena.mark();
        if let Some((a, b)) = near_clip_line(rast, (clip[i], corners[i]), (clip[j], corners[j])) {
            let drawn = clip_line(rast, state, &bounds, a, b);
            outcome = merge(outcome, if drawn == ClipOutcome::Rejected { drawn } else { ClipOutcome::Clipped });
        }
        rast.arena.release(mark);
    }
    outcome
}

fn merge(acc: ClipOutcome, edge: ClipOutcome) -> ClipOutcome {
    match (acc, edge) {
        (ClipOutcome::Clipped, _) | (_, ClipOutcome::Clipped) => ClipOutcome::Clipped,
        (ClipOutcome::Drawn, _) | (_, ClipOutcome::Drawn) => ClipOutcome::Drawn,
        _ => acc,
    }
}

/// Clips a segment against clip-space `z = 0` and divides the surviving part.
/// Returns `None` when both ends are behind the plane.
fn near_clip_line(
    rast: &mut Rasterizer,
    (p, p_slots): (Vector4<f32>, SlotId),
    (q, q_slots): (Vector4<f32>, SlotId),
) -> Option<(ScreenVertex, ScreenVertex)> {
    let p_in = p.z > 0.0;
    let q_in = q.z > 0.0;

    match (p_in, q_in) {
        (true, true) => Some((divide(&p, p_slots), divide(&q, q_slots))),
        (false, false) => None,
        _ => {
            let t = p.z / (p.z - q.z);
            let cut = p + (q - p) * t;
            let cut_slots = rast.arena.alloc_lerp(p_slots, q_slots, t);
            let cut = divide(&cut, cut_slots);
            if p_in {
                Some((divide(&p, p_slots), cut))
            } else {
                Some((cut, divide(&q, q_slots)))
            }
        }
    }
}

/// Cohen–Sutherland clip of a screen-space segment, then draw.
///
/// End points are moved along the original segment, and their slots are
/// re-interpolated at the parameter they were moved to.
fn clip_line(
    rast: &mut Rasterizer,
    state: &PipelineState,
    bounds: &Bounds,
    a: ScreenVertex,
    b: ScreenVertex,
) -> ClipOutcome {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let mut ends = [(a.x, a.y, 0.0f32), (b.x, b.y, 1.0f32)];
    let mut codes = [bounds.outcode(a.x, a.y), bounds.outcode(b.x, b.y)];
    let unclipped = codes[0] | codes[1] == 0;

    // Each pass settles at least one boundary for one end
    for _ in 0..8 {
        if codes[0] | codes[1] == 0 {
            break;
        }
        if codes[0] & codes[1] != 0 {
            return ClipOutcome::Rejected;
        }

        let e = if codes[0] != 0 { 0 } else { 1 };
        let code = codes[e];
        let (x, y, t) = if code & OUT_LEFT != 0 {
            let t = -a.x / dx;
            (0.0, a.y + dy * t, t)
        } else if code & OUT_RIGHT != 0 {
            let t = (bounds.max_x - a.x) / dx;
            (bounds.max_x, a.y + dy * t, t)
        } else if code & OUT_TOP != 0 {
            let t = -a.y / dy;
            (a.x + dx * t, 0.0, t)
        } else {
            let t = (bounds.max_y - a.y) / dy;
            (a.x + dx * t, bounds.max_y, t)
        };
        ends[e] = (x, y, t);
        codes[e] = bounds.outcode(x, y);
    }
    if codes[0] | codes[1] != 0 {
        return ClipOutcome::Rejected;
    }

    let mark = rast.arena.mark();
    let [p, q] = ends.map(|(x, y, t)| {
        let slots = if t == 0.0 {
            a.slots
        } else if t == 1.0 {
            b.slots
        } else {
            rast.arena.alloc_lerp(a.slots, b.slots, t)
        };
        ScreenVertex::new(x, y, slots)
    });
    rast.draw_line(state, p, q);
    rast.arena.release(mark);

    if unclipped {
        ClipOutcome::Drawn
    } else {
        ClipOutcome::Clipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::framebuffer::FrameBuffer;
    use crate::core::geometry::Vertex;
    use crate::core::pipeline::{PixelProgram, RootArguments, VertexProgram};

    struct White;

    impl VertexProgram for White {
        fn run(&self, _: &Vertex, _: &RootArguments, _: &mut [Vector4<f32>]) {}
    }

    impl PixelProgram for White {
        fn run(&self, _: &RootArguments, _: &[Vector4<f32>]) -> u32 {
            0xFFFFFFFF
        }
    }

    fn run(
        fb: &mut FrameBuffer,
        mode: FillMode,
        cull: bool,
        clip: [Vector4<f32>; 3],
    ) -> ClipOutcome {
        let args = RootArguments::default();
        let state = PipelineState::new(&White, &White, 1, mode).with_cull_back_face(cull);
        let mut rast = Rasterizer::new(fb, &args, 1);
        let ids = clip.map(|c| {
            let id = rast.arena.alloc();
            rast.arena.get_mut(id)[0] = c;
            id
        });
        let outcome = process_triangle(&mut rast, &state, ids);
        assert_eq!(rast.arena.mark(), 3, "clip scratch leaked");
        outcome
    }

    /// Reads slot 1 back as `x << 8 | y`.
    struct Coords;

    impl PixelProgram for Coords {
        fn run(&self, _: &RootArguments, interpolates: &[Vector4<f32>]) -> u32 {
            let v = interpolates[0];
            (v.x.round() as u32) << 8 | v.y.round() as u32
        }
    }

    /// Like `run`, but each corner also carries its screen position in slot 1.
    fn run_with_coords(
        fb: &mut FrameBuffer,
        mode: FillMode,
        clip: [Vector4<f32>; 3],
    ) -> ClipOutcome {
        let args = RootArguments::default();
        let state = PipelineState::new(&White, &Coords, 2, mode).with_cull_back_face(false);
        let mut rast = Rasterizer::new(fb, &args, 2);
        let ids = clip.map(|c| {
            let id = rast.arena.alloc();
            let slots = rast.arena.get_mut(id);
            slots[0] = c;
            slots[1] = Vector4::new(c.x / c.w, c.y / c.w, 0.0, 0.0);
            id
        });
        let outcome = process_triangle(&mut rast, &state, ids);
        assert_eq!(rast.arena.mark(), 6, "clip scratch leaked");
        outcome
    }

    fn coords(x: usize, y: usize) -> Option<u32> {
        Some((x << 8 | y) as u32)
    }

    fn at(x: f32, y: f32) -> Vector4<f32> {
        Vector4::new(x, y, 1.0, 1.0)
    }

    fn lit(fb: &FrameBuffer) -> usize {
        fb.pixels().iter().filter(|&&p| p != 0).count()
    }

    #[test]
    fn test_outcodes() {
        let b = Bounds::new(10, 5);
        assert_eq!(b.outcode(0.0, 0.0), 0);
        assert_eq!(b.outcode(9.0, 4.0), 0);
        assert_eq!(b.outcode(-0.1, 2.0), OUT_LEFT);
        assert_eq!(b.outcode(9.5, 2.0), OUT_RIGHT);
        assert_eq!(b.outcode(3.0, -1.0), OUT_TOP);
        assert_eq!(b.outcode(12.0, 7.0), OUT_RIGHT | OUT_BOTTOM);
    }

    #[test]
    fn test_back_face_cull_toggle() {
        // Screen-space clockwise with y pointing down
        let reversed = [at(0.0, 0.0), at(4.0, 0.0), at(0.0, 4.0)];

        let mut fb = FrameBuffer::new(8, 8);
        assert_eq!(run(&mut fb, FillMode::Solid, true, reversed), ClipOutcome::Culled);
        assert_eq!(lit(&fb), 0);

        assert_eq!(run(&mut fb, FillMode::Solid, false, reversed), ClipOutcome::Drawn);
        assert_eq!(lit(&fb), 15);

        let mut fb = FrameBuffer::new(8, 8);
        assert_eq!(run(&mut fb, FillMode::Wireframe, true, reversed), ClipOutcome::Culled);
        assert_eq!(lit(&fb), 0);
        assert_eq!(run(&mut fb, FillMode::Wireframe, false, reversed), ClipOutcome::Drawn);
        assert!(lit(&fb) > 0);
    }

    #[test]
    fn test_left_edge_straddle_only_paints_visible_columns() {
        let mut fb = FrameBuffer::new(16, 16);
        let tri = [at(-6.0, 2.0), at(-6.0, 12.0), at(8.0, 7.0)];
        assert_eq!(run(&mut fb, FillMode::Solid, true, tri), ClipOutcome::Clipped);
        assert!(lit(&fb) > 0);
        for y in 0..16 {
            for x in 9..16 {
                assert_eq!(fb.get_pixel(x, y), Some(0), "({}, {}) painted", x, y);
            }
        }
        assert_ne!(fb.get_pixel(0, 7), Some(0));
    }

    #[test]
    fn test_triangle_outside_one_edge_is_rejected() {
        let mut fb = FrameBuffer::new(16, 16);
        let tri = [at(2.0, 20.0), at(2.0, 30.0), at(12.0, 25.0)];
        assert_eq!(run(&mut fb, FillMode::Solid, false, tri), ClipOutcome::Rejected);
        assert_eq!(run(&mut fb, FillMode::Wireframe, false, tri), ClipOutcome::Rejected);
        assert_eq!(lit(&fb), 0);
    }

    #[test]
    fn test_clip_against_corner_stays_in_bounds() {
        let mut fb = FrameBuffer::new(10, 10);
        let tri = [at(-20.0, -5.0), at(-5.0, 30.0), at(30.0, 4.0)];
        assert_eq!(run(&mut fb, FillMode::Solid, false, tri), ClipOutcome::Clipped);
        assert!(lit(&fb) > 0);
    }

    #[test]
    fn test_solid_near_plane_reject() {
        let mut fb = FrameBuffer::new(8, 8);
        let mut behind = at(4.0, 0.0);
        behind.z = 0.0;
        let tri = [at(0.0, 0.0), at(0.0, 4.0), behind];
        assert_eq!(run(&mut fb, FillMode::Solid, false, tri), ClipOutcome::Rejected);
        assert_eq!(lit(&fb), 0);

        let tri = [at(0.0, 0.0), at(0.0, 4.0), at(4.0, 0.0)];
        assert_eq!(run(&mut fb, FillMode::Solid, true, tri), ClipOutcome::Drawn);
        assert_eq!(lit(&fb), 15);
    }

    #[test]
    fn test_wireframe_near_plane_clips_edges() {
        let mut fb = FrameBuffer::new(8, 8);
        // The third corner sits behind the plane: z = -1, w = 1
        let tri = [at(1.0, 1.0), at(1.0, 5.0), Vector4::new(5.0, 1.0, -1.0, 1.0)];
        assert_eq!(run(&mut fb, FillMode::Wireframe, true, tri), ClipOutcome::Clipped);
        // The fully visible edge is drawn whole
        for y in 1..=5 {
            assert_ne!(fb.get_pixel(1, y), Some(0));
        }
        // Edges towards the hidden corner stop at the plane
        assert_eq!(fb.get_pixel(5, 1), Some(0));
    }

    #[test]
    fn test_polygon_clip_interpolates_slots_at_the_cut() {
        let mut fb = FrameBuffer::new(16, 16);
        // Crosses x = 0 at (0, 0) and (0, 6)
        let tri = [at(-6.0, 0.0), at(6.0, 0.0), at(6.0, 12.0)];
        assert_eq!(run_with_coords(&mut fb, FillMode::Solid, tri), ClipOutcome::Clipped);

        for y in 0..=6 {
            assert_eq!(fb.get_pixel(0, y), coords(0, y), "(0, {})", y);
        }
        for (x, y) in [(3, 2), (5, 9), (6, 12)] {
            assert_eq!(fb.get_pixel(x, y), coords(x, y), "({}, {})", x, y);
        }
        assert_eq!(fb.get_pixel(0, 7), Some(0));
    }

    #[test]
    fn test_line_clips_interpolate_slots_at_the_cut() {
        // Screen edge: the bottom edge leaves through x = 9
        let mut fb = FrameBuffer::new(10, 10);
        let tri = [at(2.0, 2.0), at(14.0, 2.0), at(2.0, 6.0)];
        assert_eq!(run_with_coords(&mut fb, FillMode::Wireframe, tri), ClipOutcome::Clipped);
        for x in 2..=9 {
            assert_eq!(fb.get_pixel(x, 2), coords(x, 2), "({}, 2)", x);
        }

        // Near plane: the corner at z = -1 is cut halfway along each of its edges
        let mut fb = FrameBuffer::new(10, 10);
        let tri = [at(2.0, 5.0), Vector4::new(8.0, 5.0, -1.0, 1.0), at(2.0, 1.0)];
        assert_eq!(run_with_coords(&mut fb, FillMode::Wireframe, tri), ClipOutcome::Clipped);
        for x in 2..=5 {
            assert_eq!(fb.get_pixel(x, 5), coords(x, 5), "({}, 5)", x);
        }
        assert_eq!(fb.get_pixel(6, 5), Some(0));
        assert_eq!(fb.get_pixel(5, 3), coords(5, 3));
    }
}
