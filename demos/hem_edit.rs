//! Half-edge editing walkthrough
//!
//! Starts from a unit square made of two triangles, then splits the diagonal,
//! splits one of the new spokes, collapses the edge between the two inserted
//! vertices and finally flips a spoke, checking validity after every step.

use anyhow::{bail, Context, Result};
use meshlod_core::Point3f;
use meshlod_topology::{HalfEdgeMesh, ReconstructionStrategy, VertexId};

fn report(step: &str, mesh: &HalfEdgeMesh) -> Result<()> {
    log::info!(
        "{:<22} vertices={} edges={} faces={} (real {})",
        step,
        mesh.num_vertices(),
        mesh.num_edges(),
        mesh.num_faces(),
        mesh.num_real_faces()
    );
    if !mesh.is_valid() {
        bail!("mesh became invalid after {}", step);
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let vertices = [
        Point3f::new(0.0, 0.0, 0.0),
        Point3f::new(1.0, 0.0, 0.0),
        Point3f::new(1.0, 1.0, 0.0),
        Point3f::new(0.0, 1.0, 0.0),
    ];
    let mut mesh = HalfEdgeMesh::from_indexed_faces(&vertices, &[[0, 1, 2], [0, 2, 3]])?;
    report("initial quad", &mesh)?;

    let diagonal = mesh
        .find_edge(VertexId::new(0), VertexId::new(2))
        .context("quad has no diagonal")?;
    let center = mesh.split_edge(diagonal, 0.5).context("diagonal split failed")?;
    report("split diagonal", &mesh)?;

    let spoke = mesh
        .find_edge(center, VertexId::new(3))
        .context("center is not connected to v3")?;
    let midpoint = mesh.split_edge(spoke, 0.5).context("spoke split failed")?;
    report("split spoke", &mesh)?;

    let inner = mesh
        .find_edge(center, midpoint)
        .context("inserted vertices are not connected")?;
    let survivor = mesh.collapse_edge(inner, 0.5).context("collapse rejected")?;
    report("collapse inner edge", &mesh)?;
    log::info!("survivor {} at {:?}", survivor, mesh[survivor].position);

    let spoke = mesh
        .find_edge(survivor, VertexId::new(1))
        .context("survivor is not connected to v1")?;
    match mesh.flip_edge(spoke) {
        Some(_) => report("flip spoke", &mesh)?,
        None => log::info!("flip of spoke rejected"),
    }

    let out = mesh.to_indexed_mesh(ReconstructionStrategy::TopologyFirst);
    out.validate()?;
    println!(
        "Exported {} vertices and {} triangles",
        out.vertex_count(),
        out.polygon_count()
    );
    for polygon in &out.polygons {
        println!("  {:?}", polygon);
    }
    Ok(())
}
