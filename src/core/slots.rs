use crate::core::math::interpolation::lerp_slots;
use nalgebra::Vector4;

/// Handle to one vertex worth of attribute slots inside a [`SlotArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotId(usize);

/// Scratch storage for attribute slots, allocated once per draw call.
///
/// Every entry is `stride` vectors wide. Entries are handed out stack-wise: the
/// driver takes a [`mark`](Self::mark) before shading a triangle and
/// [`release`](Self::release)s it afterwards, and the clipper does the same around
/// the intersection vertices it creates. Capacity grows to the deepest clip case on
/// the first few triangles and is reused from then on.
pub struct SlotArena {
    stride: usize,
    data: Vec<Vector4<f32>>,
}

impl SlotArena {
    pub fn new(stride: usize) -> Self {
        // Three corners plus a handful of intersections covers every clip case.
        Self {
            stride,
            data: Vec::with_capacity(stride * 16),
        }
    }

    /// Reserves a zeroed entry.
    pub fn alloc(&mut self) -> SlotId {
        let start = self.data.len();
        self.data.resize(start + self.stride, Vector4::zeros());
        SlotId(start)
    }

    /// Reserves an entry holding `a + (b - a) * t`.
    pub fn alloc_lerp(&mut self, a: SlotId, b: SlotId, t: f32) -> SlotId {
        let id = self.alloc();
        let stride = self.stride;
        let (head, tail) = self.data.split_at_mut(id.0);
        lerp_slots(
            tail,
            &head[a.0..a.0 + stride],
            &head[b.0..b.0 + stride],
            t,
        );
        id
    }

    #[inline]
    pub fn get(&self, id: SlotId) -> &[Vector4<f32>] {
        &self.data[id.0..id.0 + self.stride]
    }

    #[inline]
    pub fn get_mut(&mut self, id: SlotId) -> &mut [Vector4<f32>] {
        &mut self.data[id.0..id.0 + self.stride]
    }

    pub fn mark(&self) -> usize {
        self.data.len()
    }

    /// Drops every entry allocated after `mark`.
    pub fn release(&mut self, mark: usize) {
        self.data.truncate(mark);
    }
}
