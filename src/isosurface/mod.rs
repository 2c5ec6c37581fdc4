//! Marching-cubes extraction of the world's scalar field.
//!
//! Every unit cube spanned by eight neighbouring lattice cells is classified against an
//! iso level and triangulated through [`tables::TRI_TABLE`]. The output is a flat,
//! GPU-ready triangle list in the normalised cube `[-1, 1]^3`; the extractor never
//! touches simulation state beyond reading one snapshot.

pub mod tables;

use crate::constants::DEFAULT_ISO_LEVEL;
use crate::grid::GridDims;
use crate::utils::{cell_color, to_normalised, voxel_size};
use crate::world::Cell;
use glam::{IVec3, Vec3, Vec4};
use rayon::prelude::*;
use tables::{CORNER_OFFSETS, EDGE_CORNERS, triangles};

/// Produces one density value per lattice cell.
pub trait ScalarField: Sync {
    fn density(&self, cell: &Cell) -> f32;
}

impl<F> ScalarField for F
where
    F: Fn(&Cell) -> f32 + Sync,
{
    fn density(&self, cell: &Cell) -> f32 {
        self(cell)
    }
}

/// The built-in density selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldLayer {
    Food,
    Trail,
    Nest,
    /// The largest of the three layers at each cell.
    #[default]
    Combined,
}

impl ScalarField for FieldLayer {
    #[inline]
    fn density(&self, cell: &Cell) -> f32 {
        let nest = if cell.is_nest { 1.0 } else { 0.0 };
        match self {
            FieldLayer::Food => cell.food,
            FieldLayer::Trail => cell.trail,
            FieldLayer::Nest => nest,
            FieldLayer::Combined => cell.food.max(cell.trail).max(nest),
        }
    }
}

// This struct MUST keep a padding-free C layout so it can be cast straight into a vertex buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SurfaceVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

/// Triangle list: every three consecutive vertices form one triangle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IsoSurface {
    pub vertices: Vec<SurfaceVertex>,
}

impl IsoSurface {
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn triangles(&self) -> impl Iterator<Item = &[SurfaceVertex]> {
        self.vertices.chunks_exact(3)
    }

    /// Raw vertex bytes, ready for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsosurfaceExtractor {
    /// Corners with a density strictly above this are inside the surface.
    pub iso_level: f32,
    /// Alpha scale applied to trail-coloured vertices.
    pub trail_opacity: f32,
}

impl Default for IsosurfaceExtractor {
    fn default() -> Self {
        Self {
            iso_level: DEFAULT_ISO_LEVEL,
            trail_opacity: crate::constants::DEFAULT_TRAIL_OPACITY,
        }
    }
}

impl IsosurfaceExtractor {
    pub fn new(iso_level: f32) -> Self {
        Self {
            iso_level,
            ..Self::default()
        }
    }

    pub fn with_trail_opacity(mut self, trail_opacity: f32) -> Self {
        self.trail_opacity = trail_opacity;
        self
    }

    /// Configuration code of the cube whose origin corner is `origin`.
    pub fn cube_code<F: ScalarField + ?Sized>(
        &self,
        dims: GridDims,
        cells: &[Cell],
        field: &F,
        origin: IVec3,
    ) -> u8 {
        let corners = cube_corners(dims, cells, origin);
        self.classify(&corners.map(|cell| field.density(cell)))
    }

    /// Sets bit `k` for every corner density strictly above the iso level.
    #[inline]
    pub fn classify(&self, densities: &[f32; 8]) -> u8 {
        densities
            .iter()
            .enumerate()
            .fold(0u8, |code, (k, &d)| if d > self.iso_level { code | (1 << k) } else { code })
    }

    /// Triangulates the whole snapshot. Cubes are processed one z-slab per task and
    /// concatenated in slab order, so the output is identical for every thread count.
    pub fn extract<F: ScalarField + ?Sized>(
        &self,
        dims: GridDims,
        cells: &[Cell],
        field: &F,
    ) -> IsoSurface {
        assert_eq!(cells.len(), dims.len(), "snapshot does not match grid dims");
        if dims.size.cmplt(IVec3::splat(2)).any() {
            return IsoSurface::default();
        }

        let slabs: Vec<Vec<SurfaceVertex>> = (0..dims.size.z - 1)
            .into_par_iter()
            .map(|z| {
                let mut vertices = Vec::new();
                for y in 0..dims.size.y - 1 {
                    for x in 0..dims.size.x - 1 {
                        self.polygonise(dims, cells, field, IVec3::new(x, y, z), &mut vertices);
                    }
                }
                vertices
            })
            .collect();

        let vertices = slabs.concat();
        log::debug!(
            "Extracted {} triangles from {}x{}x{} grid at iso {:.3}",
            vertices.len() / 3,
            dims.size.x,
            dims.size.y,
            dims.size.z,
            self.iso_level
        );
        IsoSurface { vertices }
    }

    fn polygonise<F: ScalarField + ?Sized>(
        &self,
        dims: GridDims,
        cells: &[Cell],
        field: &F,
        origin: IVec3,
        out: &mut Vec<SurfaceVertex>,
    ) {
        let corners = cube_corners(dims, cells, origin);
        let densities = corners.map(|cell| field.density(cell));

        let code = self.classify(&densities);
        if code == 0 || code == u8::MAX {
            return;
        }

        let voxel = voxel_size(dims);
        let cube_origin = to_normalised(origin.as_vec3(), dims);
        let colors = corners.map(|cell| cell_color(cell, self.trail_opacity));

        let edge_vertex = |edge: usize| -> (Vec3, Vec4) {
            let [a, b] = EDGE_CORNERS[edge];
            let t = interpolation_factor(densities[a], densities[b], self.iso_level);
            let decal_a = CORNER_OFFSETS[a].as_vec3() * voxel;
            let decal_b = CORNER_OFFSETS[b].as_vec3() * voxel;
            (
                cube_origin + decal_a.lerp(decal_b, t),
                colors[a].lerp(colors[b], t),
            )
        };

        for [e0, e1, e2] in triangles(code) {
            let (p0, c0) = edge_vertex(e0);
            let (p1, c1) = edge_vertex(e1);
            let (p2, c2) = edge_vertex(e2);
            let normal = (p1 - p0).cross(p2 - p0).normalize_or_zero().to_array();
            for (position, color) in [(p0, c0), (p1, c1), (p2, c2)] {
                out.push(SurfaceVertex {
                    position: position.to_array(),
                    normal,
                    color: color.to_array(),
                });
            }
        }
    }
}

#[inline]
fn cube_corners(dims: GridDims, cells: &[Cell], origin: IVec3) -> [&Cell; 8] {
    CORNER_OFFSETS.map(|offset| &cells[dims.index(origin + offset)])
}

/// Where along an edge the field crosses `iso`, as a fraction from corner `a`.
#[inline]
fn interpolation_factor(density_a: f32, density_b: f32, iso: f32) -> f32 {
    let denom = density_b - density_a;
    if denom.abs() < 1e-6 {
        0.5
    } else {
        ((iso - density_a) / denom).clamp(0.0, 1.0)
    }
}
