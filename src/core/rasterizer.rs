use crate::core::framebuffer::FrameBuffer;
use crate::core::math::interpolation::{barycentric_coordinates, blend_slots, lerp_slots};
use crate::core::pipeline::{PipelineState, RootArguments};
use crate::core::slots::{SlotArena, SlotId};
use nalgebra::{Point2, Vector3, Vector4};
use std::iter::Peekable;

/// A vertex after the perspective divide: pixel coordinates plus its attribute slots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenVertex {
    pub x: f32,
    pub y: f32,
    pub slots: SlotId,
}

impl ScreenVertex {
    pub fn new(x: f32, y: f32, slots: SlotId) -> Self {
        Self { x, y, slots }
    }

    #[inline]
    fn pixel(&self) -> (i32, i32) {
        (self.x as i32, self.y as i32)
    }
}

/// The Rasterizer turns screen-space triangles and lines into shaded pixels.
///
/// It owns the per-draw scratch: the slot arena shared with the clipper and the
/// buffer the pixel program reads its interpolated slots from. No depth test is
/// performed; later writes win.
pub struct Rasterizer<'a> {
    target: &'a mut FrameBuffer,
    args: &'a RootArguments,
    pub arena: SlotArena,
    pixel_input: Vec<Vector4<f32>>,
}

impl<'a> Rasterizer<'a> {
    /// `stride` is the largest slot count any pipeline state of this draw will use.
    pub fn new(target: &'a mut FrameBuffer, args: &'a RootArguments, stride: usize) -> Self {
        Self {
            target,
            args,
            arena: SlotArena::new(stride),
            pixel_input: vec![Vector4::zeros(); stride.saturating_sub(1)],
        }
    }

    pub fn args(&self) -> &'a RootArguments {
        self.args
    }

    pub fn width(&self) -> usize {
        self.target.width
    }

    pub fn height(&self) -> usize {
        self.target.height
    }

    /// Fills a triangle whose corners are already inside the target.
    ///
    /// Corners are truncated to integer pixels and ordered by y. Degenerate shapes
    /// fall back to a single span (zero height) or two lines (zero width); a general
    /// triangle is split at its middle row into two flat-sided halves. Edge pixels
    /// on both sides are covered.
    ///
    /// Slots are weighted against the truncated corners, while a clip intersection
    /// carries slots lerped at its exact float position. Varyings on a clipped
    /// triangle can therefore drift by up to a pixel's worth per truncated corner.
    pub fn fill_triangle(&mut self, state: &PipelineState, tri: [ScreenVertex; 3]) {
        let mut sorted = tri;
        sorted.sort_by_key(|v| std::cmp::Reverse(v.pixel().1));
        let [max, mid, min] = sorted;
        let (max_x, max_y) = max.pixel();
        let (mid_x, mid_y) = mid.pixel();
        let (min_x, min_y) = min.pixel();

        if max_y == min_y {
            self.fill_row_of_points(state, [min, mid, max]);
            return;
        }

        // Where the long edge crosses the middle row
        let new_x = max_x + ((min_x - max_x) * (max_y - mid_y)) / (max_y - min_y);

        if mid_x == new_x {
            self.draw_line(state, min, mid);
            self.draw_line(state, mid, max);
            return;
        }

        let corners = Corners::new(&tri);
        if max_y == mid_y {
            self.fill_flat(state, &corners, (min_x, min_y), mid_y, mid_x, max_x, true);
        } else if mid_y == min_y {
            self.fill_flat(state, &corners, (max_x, max_y), mid_y, mid_x, min_x, true);
        } else {
            // The upper half owns the shared row
            self.fill_flat(state, &corners, (max_x, max_y), mid_y, mid_x, new_x, true);
            self.fill_flat(state, &corners, (min_x, min_y), mid_y, mid_x, new_x, false);
        }
    }

    /// Walks two edges from `apex` to the flat row and fills each row between them.
    #[allow(clippy::too_many_arguments)]
    fn fill_flat(
        &mut self,
        state: &PipelineState,
        corners: &Corners,
        apex: (i32, i32),
        flat_y: i32,
        flat_x0: i32,
        flat_x1: i32,
        include_flat_row: bool,
    ) {
        let mut first = EdgeWalker::new(apex, (flat_x0, flat_y));
        let mut second = EdgeWalker::new(apex, (flat_x1, flat_y));

        while let (Some((y, lo0, hi0)), Some((_, lo1, hi1))) = (first.next_row(), second.next_row()) {
            if y == flat_y && !include_flat_row {
                break;
            }
            for x in lo0.min(lo1)..=hi0.max(hi1) {
                let weights = corners.weights(x, y);
                self.shade_blend(state, x, y, corners.slots, &weights);
            }
        }
    }

    /// Zero-height case: one row, interpolated min -> mid -> max along x.
    fn fill_row_of_points(&mut self, state: &PipelineState, points: [ScreenVertex; 3]) {
        let mut by_x = points;
        by_x.sort_by_key(|v| v.pixel().0);
        let [left, center, right] = by_x;
        let (left_x, y) = left.pixel();
        let (center_x, _) = center.pixel();
        let (right_x, _) = right.pixel();

        for x in left_x..=right_x {
            let (from, to, t) = if x <= center_x {
                (left, center, ratio(x - left_x, center_x - left_x))
            } else {
                (center, right, ratio(x - center_x, right_x - center_x))
            };
            self.shade_lerp(state, x, y, from.slots, to.slots, t);
        }
    }

    /// Bresenham line between two screen vertices, inclusive of both ends.
    ///
    /// Slots are interpolated by the fraction travelled along the major axis. A line
    /// whose ends fall on the same pixel paints that pixel with the midpoint blend.
    pub fn draw_line(&mut self, state: &PipelineState, a: ScreenVertex, b: ScreenVertex) {
        let (a, b) = if b.pixel().0 < a.pixel().0 { (b, a) } else { (a, b) };
        let (x0, y0) = a.pixel();
        let (x1, y1) = b.pixel();
        let dx = x1 - x0;
        let dy = (y1 - y0).abs();

        if dx == 0 && dy == 0 {
            self.shade_lerp(state, x0, y0, a.slots, b.slots, 0.5);
            return;
        }

        for (x, y) in Bresenham::new((x0, y0), (x1, y1)) {
            let t = if dx >= dy {
                (x - x0) as f32 / dx as f32
            } else {
                (y - y0).abs() as f32 / dy as f32
            };
            self.shade_lerp(state, x, y, a.slots, b.slots, t);
        }
    }

    fn shade_blend(
        &mut self,
        state: &PipelineState,
        x: i32,
        y: i32,
        slots: [SlotId; 3],
        weights: &Vector3<f32>,
    ) {
        if !self.target.in_bounds(x, y) {
            return;
        }
        let n = state.interpolate_count;
        blend_slots(
            &mut self.pixel_input[..n - 1],
            &self.arena.get(slots[0])[1..n],
            &self.arena.get(slots[1])[1..n],
            &self.arena.get(slots[2])[1..n],
            weights,
        );
        let color = state.pixel_shader.run(self.args, &self.pixel_input[..n - 1]);
        self.target.set_pixel(x, y, color);
    }

    fn shade_lerp(
        &mut self,
        state: &PipelineState,
        x: i32,
        y: i32,
        from: SlotId,
        to: SlotId,
        t: f32,
    ) {
        if !self.target.in_bounds(x, y) {
            return;
        }
        let n = state.interpolate_count;
        lerp_slots(
            &mut self.pixel_input[..n - 1],
            &self.arena.get(from)[1..n],
            &self.arena.get(to)[1..n],
            t,
        );
        let color = state.pixel_shader.run(self.args, &self.pixel_input[..n - 1]);
        self.target.set_pixel(x, y, color);
    }
}

#[inline]
fn ratio(num: i32, den: i32) -> f32 {
    if den == 0 { 0.0 } else { num as f32 / den as f32 }
}

/// The three corners a fill interpolates against, in the caller's order.
struct Corners {
    points: [Point2<f32>; 3],
    slots: [SlotId; 3],
}

impl Corners {
    fn new(tri: &[ScreenVertex; 3]) -> Self {
        Self {
            points: tri.map(|v| {
                let (x, y) = v.pixel();
                Point2::new(x as f32, y as f32)
            }),
            slots: tri.map(|v| v.slots),
        }
    }

    #[inline]
    fn weights(&self, x: i32, y: i32) -> Vector3<f32> {
        let [a, b, c] = self.points;
        barycentric_coordinates(Point2::new(x as f32, y as f32), a, b, c)
            .unwrap_or_else(|| Vector3::repeat(1.0 / 3.0))
    }
}

//=================================
// Integer line stepping
//=================================

/// All-octant Bresenham walk from `start` to `end`, both inclusive.
#[derive(Debug, Clone)]
pub struct Bresenham {
    x: i32,
    y: i32,
    end: (i32, i32),
    dx: i32,
    dy: i32,
    sx: i32,
    sy: i32,
    err: i32,
    done: bool,
}

impl Bresenham {
    pub fn new(start: (i32, i32), end: (i32, i32)) -> Self {
        let dx = (end.0 - start.0).abs();
        let dy = (end.1 - start.1).abs();
        Self {
            x: start.0,
            y: start.1,
            end,
            dx,
            dy,
            sx: if end.0 >= start.0 { 1 } else { -1 },
            sy: if end.1 >= start.1 { 1 } else { -1 },
            err: dx - dy,
            done: false,
        }
    }
}

impl Iterator for Bresenham {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = (self.x, self.y);
        if current == self.end {
            self.done = true;
        } else {
            let e2 = 2 * self.err;
            if e2 > -self.dy {
                self.err -= self.dy;
                self.x += self.sx;
            }
            if e2 < self.dx {
                self.err += self.dx;
                self.y += self.sy;
            }
        }
        Some(current)
    }
}

/// Groups a Bresenham walk into rows: each call yields `(y, min_x, max_x)` for the
/// next row the edge touches. Rows come out one apart, apex first.
struct EdgeWalker {
    pixels: Peekable<Bresenham>,
}

impl EdgeWalker {
    fn new(from: (i32, i32), to: (i32, i32)) -> Self {
        Self {
            pixels: Bresenham::new(from, to).peekable(),
        }
    }

    fn next_row(&mut self) -> Option<(i32, i32, i32)> {
        let (x, y) = self.pixels.next()?;
        let (mut lo, mut hi) = (x, x);
        while let Some(&(nx, ny)) = self.pixels.peek() {
            if ny != y {
                break;
            }
            lo = lo.min(nx);
            hi = hi.max(nx);
            self.pixels.next();
        }
        Some((y, lo, hi))
    }
}
