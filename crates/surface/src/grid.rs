use glam::Vec3;

/// Largest supported grid resolution: (cells + 1)^2 vertices must stay
/// addressable with u16 indices.
pub const MAX_GRID_CELLS: usize = 254;

/// Shape parameters of the wave surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveParams {
    /// Peak vertical displacement.
    pub amplitude: f32,
    /// Radial frequency across the half-width of the grid.
    pub frequency: f32,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            amplitude: 0.15,
            frequency: 3.0 * std::f32::consts::PI,
        }
    }
}

/// Static grid topology: (cells + 1)^2 vertices spanning [-1, 1]^2 in XZ
/// at y = 0, and a triangle list of 6 * cells^2 indices.
///
/// `cells` is clamped to [`MAX_GRID_CELLS`].
pub fn grid_mesh(cells: usize) -> (Vec<[f32; 3]>, Vec<u16>) {
    let cells = cells.min(MAX_GRID_CELLS);
    let points = cells + 1;
    let step = 2.0 / cells.max(1) as f32;

    let mut positions = Vec::with_capacity(points * points);
    let mut indices = Vec::with_capacity(6 * cells * cells);

    for z in 0..points {
        for x in 0..points {
            positions.push([-1.0 + x as f32 * step, 0.0, -1.0 + z as f32 * step]);

            if z == cells || x == cells {
                continue;
            }
            let bottom_left = (z * points + x) as u16;
            let bottom_right = bottom_left + 1;
            let top_left = bottom_left + points as u16;
            let top_right = bottom_right + points as u16;

            indices.extend_from_slice(&[
                bottom_left,
                bottom_right,
                top_left,
                bottom_right,
                top_right,
                top_left,
            ]);
        }
    }

    (positions, indices)
}

/// Vertex heights of the wave at the given phase: a radial sine ripple,
/// `y = amplitude * sin(r * frequency + phase)`.
pub fn height_field(cells: usize, phase: f32, params: &WaveParams) -> Vec<f32> {
    let cells = cells.min(MAX_GRID_CELLS);
    let points = cells + 1;
    let half = points as f32 / 2.0;

    let mut heights = Vec::with_capacity(points * points);
    for z in 0..points {
        for x in 0..points {
            let sx = params.frequency * (x as f32 - half) / half;
            let sz = params.frequency * (z as f32 - half) / half;
            let r = (sx * sx + sz * sz).sqrt();
            heights.push(params.amplitude * (r + phase).sin());
        }
    }
    heights
}

/// Per-vertex normals from forward-difference triangle normals.
///
/// The last row and column have no forward neighbor and default to +Y.
/// `heights` must be the output of [`height_field`] for the same `cells`.
pub fn grid_normals(cells: usize, heights: &[f32]) -> Vec<[f32; 3]> {
    let cells = cells.min(MAX_GRID_CELLS);
    let points = cells + 1;
    debug_assert_eq!(heights.len(), points * points);
    let step = 2.0 / cells.max(1) as f32;

    let mut normals = Vec::with_capacity(points * points);
    for z in 0..points {
        for x in 0..points {
            if z == cells || x == cells {
                normals.push([0.0, 1.0, 0.0]);
                continue;
            }
            let here = z * points + x;
            let forward = here + points;
            let right = here + 1;

            let x0 = x as f32 * step;
            let z0 = z as f32 * step;
            let a = Vec3::new(x0, heights[here], z0);
            let b = Vec3::new(x0, heights[forward], z0 + step);
            let c = Vec3::new(x0 + step, heights[right], z0 + step);

            let n = (b - a)
                .cross(c - a)
                .try_normalize()
                .unwrap_or(Vec3::Y);
            normals.push(n.to_array());
        }
    }
    normals
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_counts() {
        let (positions, indices) = grid_mesh(4);
        assert_eq!(positions.len(), 25);
        assert_eq!(indices.len(), 6 * 16);
    }

    #[test]
    fn mesh_indices_in_range() {
        let (positions, indices) = grid_mesh(10);
        let max = *indices.iter().max().unwrap() as usize;
        assert!(max < positions.len());
    }

    #[test]
    fn mesh_spans_unit_square() {
        let (positions, _) = grid_mesh(2);
        assert_eq!(positions.first().unwrap(), &[-1.0, 0.0, -1.0]);
        assert_eq!(positions.last().unwrap(), &[1.0, 0.0, 1.0]);
        assert!(positions.iter().all(|p| p[1] == 0.0));
    }

    #[test]
    fn oversized_resolution_is_clamped() {
        let (positions, _) = grid_mesh(10_000);
        assert_eq!(positions.len(), (MAX_GRID_CELLS + 1) * (MAX_GRID_CELLS + 1));
    }

    #[test]
    fn heights_bounded_by_amplitude() {
        let params = WaveParams::default();
        let heights = height_field(16, 7.3, &params);
        assert_eq!(heights.len(), 17 * 17);
        assert!(heights.iter().all(|y| y.abs() <= params.amplitude + 1e-6));
    }

    #[test]
    fn equal_phase_gives_equal_field() {
        let params = WaveParams::default();
        let a = height_field(16, 2.0, &params);
        let b = height_field(16, 2.0, &params);
        assert_eq!(a, b);
        let c = height_field(16, 2.1, &params);
        assert_ne!(a, c);
    }

    #[test]
    fn normals_unit_length() {
        let params = WaveParams::default();
        let heights = height_field(8, 1.0, &params);
        let normals = grid_normals(8, &heights);
        assert_eq!(normals.len(), heights.len());
        for n in &normals {
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn boundary_normals_point_up() {
        let params = WaveParams::default();
        let heights = height_field(4, 0.5, &params);
        let normals = grid_normals(4, &heights);
        let points = 5;
        for x in 0..points {
            assert_eq!(normals[(points - 1) * points + x], [0.0, 1.0, 0.0]);
        }
        for z in 0..points {
            assert_eq!(normals[z * points + points - 1], [0.0, 1.0, 0.0]);
        }
    }

    #[test]
    fn flat_field_has_vertical_normals() {
        let heights = vec![0.0; 9];
        let normals = grid_normals(2, &heights);
        for n in normals {
            assert!((n[1] - 1.0).abs() < 1e-6);
        }
    }
}
