use crate::constants::*;
use crate::grid::GridDims;
use crate::world::Cell;
use glam::{IVec3, Vec3, Vec4};

// --- Helper Functions ---

/// Legend colour of a cell: nest red, food green fading as it is consumed,
/// trail blue with its alpha scaled by `trail_opacity`.
pub fn cell_color(cell: &Cell, trail_opacity: f32) -> Vec4 {
    if cell.is_nest {
        Vec4::from(NEST_COLOR)
    } else if cell.food > 0.0 {
        let mut color = Vec4::from(FOOD_COLOR);
        color.w = cell.food.clamp(0.0, 1.0);
        color
    } else if cell.trail > 0.0 {
        let mut color = Vec4::from(TRAIL_COLOR);
        color.w = (cell.trail * trail_opacity).clamp(0.0, 1.0);
        color
    } else {
        Vec4::from(EMPTY_COLOR)
    }
}

/// Edge length of one voxel in the normalised cube.
pub fn voxel_size(dims: GridDims) -> Vec3 {
    Vec3::splat(NORMALISED_CUBE_EXTENT) / dims.size.as_vec3()
}

/// Maps a lattice coordinate (fractional allowed) into the normalised cube `[-1, 1]^3`.
pub fn to_normalised(pos: Vec3, dims: GridDims) -> Vec3 {
    Vec3::splat(NORMALISED_CUBE_MIN) + pos * voxel_size(dims)
}

/// Centre of a lattice cell in the normalised cube.
pub fn cell_center(pos: IVec3, dims: GridDims) -> Vec3 {
    to_normalised(pos.as_vec3() + Vec3::splat(0.5), dims)
}
