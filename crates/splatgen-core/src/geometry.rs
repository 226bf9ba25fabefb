//! In-memory point-cloud geometry
//!
//! `ParsedGeometry` is the raw decoder output; `Geometry` is the
//! re-centered, exportable form. Both are owned values the caller
//! threads through decode → build → export, so there is no shared
//! "current geometry" state anywhere in the crate.

use serde::Serialize;

/// Raw decoded point cloud: interleaved-by-axis position and color
/// buffers, each `3 * len()` floats, colors already clamped to [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedGeometry {
    pub positions: Vec<f32>,
    pub colors: Vec<f32>,
}

impl ParsedGeometry {
    /// Number of points. Both buffers are always 3N long.
    pub fn len(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Aabb {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Aabb {
    pub fn from_positions(positions: &[f32]) -> Self {
        let mut min = [f32::INFINITY; 3];
        let mut max = [f32::NEG_INFINITY; 3];
        for point in positions.chunks_exact(3) {
            for axis in 0..3 {
                min[axis] = min[axis].min(point[axis]);
                max[axis] = max[axis].max(point[axis]);
            }
        }
        if positions.is_empty() {
            return Aabb { min: [0.0; 3], max: [0.0; 3] };
        }
        Aabb { min, max }
    }

    pub fn center(&self) -> [f32; 3] {
        [
            (self.min[0] + self.max[0]) / 2.0,
            (self.min[1] + self.max[1]) / 2.0,
            (self.min[2] + self.max[2]) / 2.0,
        ]
    }

    pub fn contains(&self, point: [f32; 3]) -> bool {
        (0..3).all(|a| self.min[a] <= point[a] && point[a] <= self.max[a])
    }
}

/// Re-centered, exportable point cloud.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    positions: Vec<f32>,
    colors: Vec<f32>,
    bounds: Aabb,
}

impl Geometry {
    /// Build a geometry from decoder output: compute the bounding box
    /// and subtract its centroid from every position. Translation only,
    /// no rescale or rotation; after this the box contains the origin.
    pub fn build(parsed: ParsedGeometry) -> Self {
        let ParsedGeometry { mut positions, colors } = parsed;
        let center = Aabb::from_positions(&positions).center();
        for point in positions.chunks_exact_mut(3) {
            point[0] -= center[0];
            point[1] -= center[1];
            point[2] -= center[2];
        }
        let bounds = Aabb::from_positions(&positions);
        Geometry { positions, colors, bounds }
    }

    pub fn len(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    /// True when the decoder recovered (or synthesized) per-point color.
    pub fn has_colors(&self) -> bool {
        !self.colors.is_empty()
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }
}
