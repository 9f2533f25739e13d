//! Seeded generators for synthetic control-point configurations.
//!
//! All generators take an explicit seed so failures reproduce.

use georef_common::Point2D;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// `n` points scattered uniformly in `[0, size]²`, kept at least
/// `min_spacing` apart so the system stays well conditioned.
pub fn scattered_points(n: usize, size: f64, min_spacing: f64, seed: u64) -> Vec<Point2D> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut points: Vec<Point2D> = Vec::with_capacity(n);
    let min_d2 = min_spacing * min_spacing;

    while points.len() < n {
        let candidate = Point2D::new(rng.gen_range(0.0..size), rng.gen_range(0.0..size));
        if points
            .iter()
            .all(|p| p.distance_squared(candidate) >= min_d2)
        {
            points.push(candidate);
        }
    }
    points
}

/// A `cols × rows` lattice with `spacing` between neighbours, starting at `origin`.
pub fn lattice_points(cols: usize, rows: usize, spacing: f64, origin: Point2D) -> Vec<Point2D> {
    let mut points = Vec::with_capacity(cols * rows);
    for r in 0..rows {
        for c in 0..cols {
            points.push(origin.offset(c as f64 * spacing, r as f64 * spacing));
        }
    }
    points
}

/// Apply a smooth non-affine warp: an affine part plus sinusoidal ripples
/// of the given amplitude.
pub fn smooth_warp(points: &[Point2D], amplitude: f64) -> Vec<Point2D> {
    points
        .iter()
        .map(|p| {
            Point2D::new(
                5.0 + 1.2 * p.x - 0.1 * p.y + amplitude * (p.y / 17.0).sin(),
                -3.0 + 0.05 * p.x + 0.9 * p.y + amplitude * (p.x / 23.0).cos(),
            )
        })
        .collect()
}

/// Random well-conditioned dense system `(rows, rhs)` for solver checks:
/// diagonally dominant so it is never singular.
pub fn diagonally_dominant_system(n: usize, seed: u64) -> (Vec<Vec<f64>>, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows: Vec<Vec<f64>> = vec![vec![0.0; n]; n];
    for (i, row) in rows.iter_mut().enumerate() {
        let mut off_diagonal = 0.0f64;
        for (j, v) in row.iter_mut().enumerate() {
            if i != j {
                *v = rng.gen_range(-1.0..1.0);
                off_diagonal += v.abs();
            }
        }
        row[i] = off_diagonal + rng.gen_range(1.0..2.0);
    }
    let rhs = (0..n).map(|_| rng.gen_range(-10.0..10.0)).collect();
    (rows, rhs)
}
