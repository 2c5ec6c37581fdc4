use antvox::isosurface::tables::{self, TRI_TABLE};
use antvox::{
    Ant, Cell, FieldLayer, GridDims, IsoSurface, IsosurfaceExtractor, SimulationConfig,
    SimulationState,
};
use glam::{IVec3, Vec3};
use std::collections::HashMap;

fn block_world(dims: GridDims, min: IVec3, max: IVec3) -> Vec<Cell> {
    (0..dims.len())
        .map(|index| {
            let pos = dims.position(index);
            if pos.cmpge(min).all() && pos.cmple(max).all() {
                Cell::with_food(1.0)
            } else {
                Cell::EMPTY
            }
        })
        .collect()
}

fn vertex_key(p: [f32; 3]) -> [i64; 3] {
    p.map(|c| (c * 1e4).round() as i64)
}

/// Counts how many triangles use each undirected edge.
fn edge_usage(surface: &IsoSurface) -> HashMap<([i64; 3], [i64; 3]), usize> {
    let mut usage = HashMap::new();
    for triangle in surface.triangles() {
        let keys: Vec<[i64; 3]> = triangle.iter().map(|v| vertex_key(v.position)).collect();
        for (a, b) in [(0, 1), (1, 2), (2, 0)] {
            let edge = if keys[a] < keys[b] {
                (keys[a], keys[b])
            } else {
                (keys[b], keys[a])
            };
            *usage.entry(edge).or_insert(0) += 1;
        }
    }
    usage
}

#[test]
fn test_empty_field_has_no_geometry() {
    let dims = GridDims::cube(6);
    let cells = vec![Cell::EMPTY; dims.len()];
    let surface = IsosurfaceExtractor::new(0.5).extract(dims, &cells, &FieldLayer::Combined);
    assert!(surface.is_empty());
    assert_eq!(surface.triangle_count(), 0);
}

#[test]
fn test_solid_block_yields_closed_surface_inside_unit_cube() {
    let dims = GridDims::cube(8);
    let cells = block_world(dims, IVec3::splat(3), IVec3::splat(4));
    let surface = IsosurfaceExtractor::new(0.5).extract(dims, &cells, &FieldLayer::Food);

    assert!(!surface.is_empty());
    assert_eq!(surface.vertices.len() % 3, 0);
    for vertex in &surface.vertices {
        let p = Vec3::from(vertex.position);
        assert!(p.abs().max_element() <= 1.0, "{p}");
        let normal_length = Vec3::from(vertex.normal).length();
        assert!((normal_length - 1.0).abs() < 1e-4);
    }

    // Every edge of a closed mesh is shared by exactly two triangles.
    let usage = edge_usage(&surface);
    assert!(usage.values().all(|&count| count == 2));
}

#[test]
fn test_surface_hugs_the_dense_region() {
    let dims = GridDims::cube(8);
    let cells = block_world(dims, IVec3::splat(3), IVec3::splat(4));
    let surface = IsosurfaceExtractor::new(0.5).extract(dims, &cells, &FieldLayer::Food);

    // Lattice points 3 and 4 map to -0.25 and 0; the crossing sits half a voxel outside.
    let voxel = 2.0 / 8.0;
    let lo = -1.0 + 3.0 * voxel - 0.5 * voxel;
    let hi = -1.0 + 4.0 * voxel + 0.5 * voxel;
    for vertex in &surface.vertices {
        for c in vertex.position {
            assert!(c >= lo - 1e-5 && c <= hi + 1e-5, "{c} outside [{lo}, {hi}]");
        }
    }
}

#[test]
fn test_layers_select_different_fields() {
    let dims = GridDims::cube(6);
    let mut cells = vec![Cell::EMPTY; dims.len()];
    cells[dims.index(IVec3::splat(2))] = Cell::with_trail(1.0);
    let extractor = IsosurfaceExtractor::new(0.5);

    assert!(extractor.extract(dims, &cells, &FieldLayer::Food).is_empty());
    let trail = extractor.extract(dims, &cells, &FieldLayer::Trail);
    assert_eq!(trail, extractor.extract(dims, &cells, &FieldLayer::Combined));
    assert!(!trail.is_empty());

    // Custom fields plug in as closures.
    let inverted = |cell: &Cell| 1.0 - cell.trail;
    assert_eq!(
        extractor.extract(dims, &cells, &inverted).triangle_count(),
        trail.triangle_count()
    );
}

#[test]
fn test_vertex_colors_follow_the_legend() {
    let dims = GridDims::cube(4);
    let mut cells = vec![Cell::EMPTY; dims.len()];
    cells[dims.index(IVec3::ONE)] = Cell::NEST;
    let surface = IsosurfaceExtractor::new(0.5).extract(dims, &cells, &FieldLayer::Nest);
    assert!(!surface.is_empty());
    for vertex in &surface.vertices {
        assert!(vertex.color[0] > 0.0);
        assert_eq!(vertex.color[1], 0.0);
        assert_eq!(vertex.color[2], 0.0);
    }
}

#[test]
fn test_extract_from_running_simulation() {
    let config = SimulationConfig {
        cube_length: 8,
        num_ants: 1,
        ..SimulationConfig::default()
    }
    .with_seed(3);
    let dims = GridDims::cube(8);
    let cells = block_world(dims, IVec3::splat(1), IVec3::splat(2));
    let mut sim = SimulationState::new(config);
    sim.restart_from(&cells, &[Ant::at(IVec3::splat(6))]).unwrap();

    let before = sim.extract(&FieldLayer::Food, 0.5).unwrap();
    sim.step().unwrap();
    let after = sim.extract(&FieldLayer::Food, 0.5).unwrap();
    assert!(!before.is_empty());
    assert_eq!(
        before.as_bytes().len(),
        before.vertices.len() * std::mem::size_of::<antvox::SurfaceVertex>()
    );
    // A lone ant far from the block cannot have eaten any of it.
    assert_eq!(before, after);
}

#[test]
fn test_every_mixed_code_has_triangles() {
    assert!(tables::triangles(0).next().is_none());
    assert!(tables::triangles(u8::MAX).next().is_none());
    for code in 1..u8::MAX {
        let triangles: Vec<[usize; 3]> = tables::triangles(code).collect();
        assert!(!triangles.is_empty(), "code {code}");
        assert!(triangles.len() <= 5);
        assert!(triangles.iter().flatten().all(|&edge| edge < 12));
    }
    assert_eq!(TRI_TABLE.len(), 256);
}
