/// A flat rectangle in the XY plane, centered on the origin, facing +Z,
/// split into a grid of `width_segments × height_segments` quads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneGeometry {
    pub width: f64,
    pub height: f64,
    pub width_segments: u32,
    pub height_segments: u32,
}

/// One vertex of generated geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Vertex and index data ready for upload.
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    pub vertices: Vec<PlaneVertex>,
    pub indices: Vec<u32>,
}

impl PlaneGeometry {
    /// Segment counts below 1 are raised to 1.
    pub fn new(width: f64, height: f64, width_segments: u32, height_segments: u32) -> Self {
        Self {
            width,
            height,
            width_segments: width_segments.max(1),
            height_segments: height_segments.max(1),
        }
    }

    pub fn vertex_count(&self) -> usize {
        (self.width_segments as usize + 1) * (self.height_segments as usize + 1)
    }

    pub fn index_count(&self) -> usize {
        self.width_segments as usize * self.height_segments as usize * 6
    }

    /// Generate the grid.
    ///
    /// Rows run top to bottom (+Y to -Y), columns left to right. UV (0,1) is the
    /// top-left corner. Each cell emits two counter-clockwise triangles when
    /// viewed from +Z.
    pub fn build(&self) -> GeometryData {
        let gx = self.width_segments.max(1);
        let gy = self.height_segments.max(1);
        let half_w = self.width / 2.0;
        let half_h = self.height / 2.0;
        let seg_w = self.width / gx as f64;
        let seg_h = self.height / gy as f64;

        let mut vertices = Vec::with_capacity(self.vertex_count());
        for iy in 0..=gy {
            let y = iy as f64 * seg_h - half_h;
            for ix in 0..=gx {
                let x = ix as f64 * seg_w - half_w;
                vertices.push(PlaneVertex {
                    position: [x as f32, -y as f32, 0.0],
                    normal: [0.0, 0.0, 1.0],
                    uv: [ix as f32 / gx as f32, 1.0 - iy as f32 / gy as f32],
                });
            }
        }

        let row = gx + 1;
        let mut indices = Vec::with_capacity(self.index_count());
        for iy in 0..gy {
            for ix in 0..gx {
                let a = ix + row * iy;
                let b = ix + row * (iy + 1);
                let c = (ix + 1) + row * (iy + 1);
                let d = (ix + 1) + row * iy;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        GeometryData { vertices, indices }
    }
}
