use rayon::prelude::*;

/// A 2D buffer of packed `0xAARRGGBB` pixels, row-major, origin at the top-left.
///
/// There is no depth buffer: visibility comes entirely from the order triangles
/// are drawn in.
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pixels: Vec<u32>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    #[inline(always)]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline(always)]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Fills every pixel with `color`, one row per task.
    pub fn clear(&mut self, color: u32) {
        let width = self.width.max(1);
        self.pixels
            .par_chunks_mut(width)
            .for_each(|row| row.fill(color));
    }

    /// Writes one pixel. Coordinates outside the buffer are ignored.
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if self.in_bounds(x, y) {
            let idx = self.index(x as usize, y as usize);
            self.pixels[idx] = color;
        }
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[self.index(x, y)])
    }

    /// Reallocates to the new size. Contents are reset to zero.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels = vec![0; width * height];
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_writes_are_ignored() {
        let mut fb = FrameBuffer::new(4, 3);
        fb.set_pixel(-1, 0, 1);
        fb.set_pixel(4, 0, 1);
        fb.set_pixel(0, 3, 1);
        fb.set_pixel(0, -7, 1);
        assert!(fb.pixels().iter().all(|&p| p == 0));

        fb.set_pixel(3, 2, 0xFF00FF00);
        assert_eq!(fb.get_pixel(3, 2), Some(0xFF00FF00));
        assert_eq!(fb.get_pixel(4, 2), None);
    }

    #[test]
    fn test_clear_and_resize() {
        let mut fb = FrameBuffer::new(5, 5);
        fb.clear(0xFF102030);
        assert!(fb.pixels().iter().all(|&p| p == 0xFF102030));

        fb.resize(2, 7);
        assert_eq!(fb.pixels().len(), 14);
        assert_eq!(fb.get_pixel(1, 6), Some(0));
    }
}
