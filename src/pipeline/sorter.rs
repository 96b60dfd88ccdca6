use crate::core::geometry::Vertex;
use crate::core::math::transform::MatrixOps;
use nalgebra::Matrix4;

/// Reorders `indices` (whole triangles at a time) so that the triangles farthest
/// from the camera come first, ready for painter's-algorithm drawing.
///
/// Depth is the mean of `z / w` over a triangle's three corners after
/// `view_projection`; larger means farther. A trailing partial triple is left
/// where it is. Triangles of equal depth end up in no particular order.
pub fn sort(vertices: &[Vertex], indices: &mut [u32], view_projection: &Matrix4<f32>) {
    let whole = indices.len() / 3 * 3;
    let indices = &mut indices[..whole];
    let mut depths: Vec<f32> = indices
        .chunks_exact(3)
        .map(|tri| mean_depth(vertices, tri, view_projection))
        .collect();

    sort_range(indices, &mut depths);
}

/// Mean post-projection depth of one triangle.
pub fn mean_depth(vertices: &[Vertex], tri: &[u32], view_projection: &Matrix4<f32>) -> f32 {
    let sum: f32 = tri
        .iter()
        .map(|&i| {
            let mut p = vertices[i as usize].position.to_homogeneous();
            view_projection.transform_in_place(&mut p);
            p.z / p.w
        })
        .sum();
    sum / 3.0
}

/// Quicksort over triangles, pivoting on the middle triangle of each range.
///
/// Triangles deeper than the pivot are swapped to the front. When none are, the
/// pivot itself is the deepest: it is moved to the front and the rest is sorted.
/// The smaller side is recursed into and the larger one looped on.
fn sort_range(mut indices: &mut [u32], mut depths: &mut [f32]) {
    loop {
        let n = depths.len();
        if n <= 1 {
            return;
        }

        let pivot_at = n / 2;
        let pivot = depths[pivot_at];
        let mut middle = 0;
        for i in 0..n {
            if depths[i] > pivot {
                swap_triangles(indices, depths, i, middle);
                middle += 1;
            }
        }

        if middle == 0 {
            swap_triangles(indices, depths, pivot_at, 0);
            indices = &mut std::mem::take(&mut indices)[3..];
            depths = &mut std::mem::take(&mut depths)[1..];
            continue;
        }

        let (front_indices, back_indices) = std::mem::take(&mut indices).split_at_mut(middle * 3);
        let (front_depths, back_depths) = std::mem::take(&mut depths).split_at_mut(middle);
        if middle <= n - middle {
            sort_range(front_indices, front_depths);
            indices = back_indices;
            depths = back_depths;
        } else {
            sort_range(back_indices, back_depths);
            indices = front_indices;
            depths = front_depths;
        }
    }
}

#[inline]
fn swap_triangles(indices: &mut [u32], depths: &mut [f32], a: usize, b: usize) {
    if a == b {
        return;
    }
    depths.swap(a, b);
    for k in 0..3 {
        indices.swap(a * 3 + k, b * 3 + k);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::transform::TransformFactory;

    /// One triangle per depth, all facing the camera, listed in the given order.
    fn strip(depths: &[f32]) -> (Vec<Vertex>, Vec<u32>) {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        for &z in depths {
            let base = vertices.len() as u32;
            vertices.push(Vertex::at(0.0, 0.0, -z));
            vertices.push(Vertex::at(1.0, 0.0, -z));
            vertices.push(Vertex::at(0.0, 1.0, -z));
            indices.extend([base, base + 1, base + 2]);
        }
        (vertices, indices)
    }

    fn projection() -> Matrix4<f32> {
        TransformFactory::projection(0.2, -0.2, -0.2, 0.2, 0.2, 1000.0)
    }

    #[test]
    fn test_sorts_far_to_near() {
        let distances = [3.0, 9.0, 1.0, 7.0, 5.0, 2.0, 8.0, 4.0, 6.0];
        let (vertices, mut indices) = strip(&distances);
        let vp = projection();

        sort(&vertices, &mut indices, &vp);

        let depths: Vec<f32> = indices
            .chunks_exact(3)
            .map(|t| mean_depth(&vertices, t, &vp))
            .collect();
        assert!(depths.windows(2).all(|w| w[0] >= w[1]), "{:?}", depths);

        // Whole triangles moved together
        for tri in indices.chunks_exact(3) {
            assert_eq!(tri[0] % 3, 0);
            assert_eq!(tri[1], tri[0] + 1);
            assert_eq!(tri[2], tri[0] + 2);
        }
    }

    #[test]
    fn test_equal_depths_and_small_inputs() {
        let vp = projection();

        let (vertices, mut indices) = strip(&[4.0, 4.0, 4.0, 4.0]);
        sort(&vertices, &mut indices, &vp);
        let mut firsts: Vec<u32> = indices.chunks_exact(3).map(|t| t[0]).collect();
        firsts.sort();
        assert_eq!(firsts, vec![0, 3, 6, 9]);

        let (vertices, mut indices) = strip(&[2.0]);
        sort(&vertices, &mut indices, &vp);
        assert_eq!(indices, vec![0, 1, 2]);

        sort(&[], &mut [], &vp);
    }

    #[test]
    fn test_partial_triple_is_left_in_place() {
        let (vertices, mut indices) = strip(&[1.0, 5.0]);
        indices.push(0);
        sort(&vertices, &mut indices, &projection());
        assert_eq!(indices, vec![3, 4, 5, 0, 1, 2, 0]);
    }
}
