//! Generate a chain of progressive-mesh LODs for a procedural mesh

use anyhow::{bail, Result};
use clap::Parser;
use meshlod_core::{IndexedMesh, Point3f};
use meshlod_simplification::{LodTarget, ProgressiveMesh};
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "progressive_lod", about = "Build LODs of a procedural mesh")]
struct Args {
    /// Use a height-field grid with this many vertices per side
    #[arg(long, default_value_t = 32, conflicts_with = "sphere")]
    grid: usize,

    /// Use a latitude/longitude sphere with this many rings (twice as many segments)
    #[arg(long)]
    sphere: Option<usize>,

    /// Face budgets as percentages of the original face count
    #[arg(long, value_delimiter = ',', default_values_t = vec![75.0, 50.0, 25.0, 10.0])]
    percent: Vec<f32>,

    /// Absolute face budgets, generated after the percentages
    #[arg(long, value_delimiter = ',')]
    faces: Vec<usize>,
}

fn generate_grid_mesh(size: usize) -> IndexedMesh {
    let mut vertices = Vec::with_capacity(size * size);
    for y in 0..size {
        for x in 0..size {
            let fx = x as f32 / (size - 1) as f32 * std::f32::consts::PI;
            let fy = y as f32 / (size - 1) as f32 * std::f32::consts::PI;
            vertices.push(Point3f::new(x as f32, y as f32, (fx.sin() * fy.sin()) * 2.0));
        }
    }
    let mut faces = Vec::with_capacity((size - 1) * (size - 1) * 2);
    for y in 0..(size - 1) {
        for x in 0..(size - 1) {
            let tl = y * size + x;
            let tr = tl + 1;
            let bl = (y + 1) * size + x;
            let br = bl + 1;
            faces.push([tl, bl, tr]);
            faces.push([tr, bl, br]);
        }
    }
    IndexedMesh::from_triangles(vertices, &faces)
}

fn generate_sphere_mesh(rings: usize) -> IndexedMesh {
    let segments = rings * 2;
    let mut vertices = vec![Point3f::new(0.0, 0.0, 1.0)];
    for r in 1..rings {
        let phi = std::f32::consts::PI * r as f32 / rings as f32;
        for s in 0..segments {
            let theta = 2.0 * std::f32::consts::PI * s as f32 / segments as f32;
            vertices.push(Point3f::new(
                phi.sin() * theta.cos(),
                phi.sin() * theta.sin(),
                phi.cos(),
            ));
        }
    }
    let south = vertices.len();
    vertices.push(Point3f::new(0.0, 0.0, -1.0));
    let ring = |r: usize, s: usize| 1 + (r - 1) * segments + s % segments;

    let mut faces = Vec::new();
    for s in 0..segments {
        faces.push([0, ring(1, s), ring(1, s + 1)]);
        faces.push([south, ring(rings - 1, s + 1), ring(rings - 1, s)]);
    }
    for r in 1..(rings - 1) {
        for s in 0..segments {
            faces.push([ring(r, s), ring(r + 1, s), ring(r + 1, s + 1)]);
            faces.push([ring(r, s), ring(r + 1, s + 1), ring(r, s + 1)]);
        }
    }
    IndexedMesh::from_triangles(vertices, &faces)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mesh = match args.sphere {
        Some(rings) if rings < 3 => bail!("a sphere needs at least 3 rings"),
        Some(rings) => generate_sphere_mesh(rings),
        None if args.grid < 2 => bail!("a grid needs at least 2 vertices per side"),
        None => generate_grid_mesh(args.grid),
    };
    println!(
        "Source mesh: {} vertices, {} faces",
        mesh.vertex_count(),
        mesh.polygon_count()
    );

    let start = Instant::now();
    let pm = ProgressiveMesh::from_mesh(&mesh)?;
    let ops = pm.build_collapse_operations();
    log::info!("collapse ordering computed in {:?}", start.elapsed());

    let targets: Vec<LodTarget> = args
        .percent
        .iter()
        .map(|&p| LodTarget::Percent(p))
        .chain(args.faces.iter().map(|&f| LodTarget::Faces(f)))
        .collect();

    let start = Instant::now();
    let lods = ops.generate_lod_chain(&pm, &targets, Some(&mesh));
    log::info!("{} LODs generated in {:?}", lods.len(), start.elapsed());

    for (target, lod) in targets.iter().zip(&lods) {
        lod.validate()?;
        println!(
            "{:>14}: {:>6} vertices, {:>6} faces (budget {})",
            format!("{:?}", target),
            lod.vertex_count(),
            lod.polygon_count(),
            target.face_budget(mesh.polygon_count())
        );
    }
    Ok(())
}
