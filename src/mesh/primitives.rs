//! Reference membrane meshes.
//!
//! Closed-form shapes with known curvature, used for regression tests,
//! benchmarks and the CLI.

use std::collections::HashMap;

use nalgebra::Point3;

use super::builder::TriangleSoup;

/// A regular tetrahedron with the given edge length, centered at the origin.
///
/// Vertex 0 sits at `edge * (0.5, 0, -1/(2√2))`.
pub fn tetrahedron(edge: f64) -> TriangleSoup {
    let h = 1.0 / 2.0_f64.sqrt();
    let base = [
        Point3::new(1.0, 0.0, -h),
        Point3::new(-1.0, 0.0, -h),
        Point3::new(0.0, 1.0, h),
        Point3::new(0.0, -1.0, h),
    ];
    let positions = base.iter().map(|&p| p * (0.5 * edge)).collect();
    let faces = vec![[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];
    TriangleSoup::new(positions, faces)
}

/// An icosphere: a subdivided icosahedron projected onto a sphere.
///
/// Each subdivision splits every triangle into four.
pub fn icosphere(subdivisions: usize, radius: f64) -> TriangleSoup {
    let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;
    let scale = 1.0 / (1.0 + phi * phi).sqrt();

    let mut vertices: Vec<Point3<f64>> = vec![
        Point3::new(-1.0, phi, 0.0) * scale,
        Point3::new(1.0, phi, 0.0) * scale,
        Point3::new(-1.0, -phi, 0.0) * scale,
        Point3::new(1.0, -phi, 0.0) * scale,
        Point3::new(0.0, -1.0, phi) * scale,
        Point3::new(0.0, 1.0, phi) * scale,
        Point3::new(0.0, -1.0, -phi) * scale,
        Point3::new(0.0, 1.0, -phi) * scale,
        Point3::new(phi, 0.0, -1.0) * scale,
        Point3::new(phi, 0.0, 1.0) * scale,
        Point3::new(-phi, 0.0, -1.0) * scale,
        Point3::new(-phi, 0.0, 1.0) * scale,
    ];

    let mut faces: Vec<[usize; 3]> = vec![
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];

    for _ in 0..subdivisions {
        let mut new_faces = Vec::with_capacity(faces.len() * 4);
        let mut edge_midpoints: HashMap<(usize, usize), usize> = HashMap::new();

        for face in &faces {
            let mut mids = [0usize; 3];

            for i in 0..3 {
                let v0 = face[i];
                let v1 = face[(i + 1) % 3];
                let key = if v0 < v1 { (v0, v1) } else { (v1, v0) };

                mids[i] = *edge_midpoints.entry(key).or_insert_with(|| {
                    let mid = (vertices[v0].coords + vertices[v1].coords) / 2.0;
                    vertices.push(Point3::from(mid.normalize()));
                    vertices.len() - 1
                });
            }

            new_faces.push([face[0], mids[0], mids[2]]);
            new_faces.push([face[1], mids[1], mids[0]]);
            new_faces.push([face[2], mids[2], mids[1]]);
            new_faces.push([mids[0], mids[1], mids[2]]);
        }

        faces = new_faces;
    }

    let positions = vertices.into_iter().map(|p| p * radius).collect();
    TriangleSoup::new(positions, faces)
}

/// A flat `n x n` sheet in the z = 0 plane that closes on itself under
/// periodic boundaries of length `n * spacing` in x and y.
///
/// Every grid square is split into two right triangles. There are no
/// boundary bonds once the sheet is wrapped, so `n` must be at least 3.
pub fn periodic_sheet(n: usize, spacing: f64) -> TriangleSoup {
    debug_assert!(n >= 3, "a periodic sheet needs n >= 3, got {}", n);

    let mut positions = Vec::with_capacity(n * n);
    for j in 0..n {
        for i in 0..n {
            positions.push(Point3::new(i as f64 * spacing, j as f64 * spacing, 0.0));
        }
    }

    let mut faces = Vec::with_capacity(2 * n * n);
    for j in 0..n {
        for i in 0..n {
            let v00 = j * n + i;
            let v10 = j * n + (i + 1) % n;
            let v01 = ((j + 1) % n) * n + i;
            let v11 = ((j + 1) % n) * n + (i + 1) % n;

            faces.push([v00, v10, v11]);
            faces.push([v00, v11, v01]);
        }
    }

    TriangleSoup::new(positions, faces)
}
