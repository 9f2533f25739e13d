//! End-to-end properties of TPS fitting and evaluation.

use georef_common::{GeorefError, Point2D};
use nalgebra::{DMatrix, DVector};
use test_utils::fixtures::{self, street_map};
use test_utils::{
    assert_approx_eq, assert_point_approx_eq, diagonally_dominant_system, lattice_points,
    scattered_points, smooth_warp,
};
use tps::{affine_basis, assemble_system, kernel_matrix, solve, CoefficientSet, Matrix};

// ============================================================================
// Helpers
// ============================================================================

/// Every control point must land on its target within `rel_tol`, relative to
/// the target magnitude (absolute below 1).
fn assert_exact_interpolation(coeffs: &CoefficientSet, target: &[Point2D], rel_tol: f64) {
    for (i, (&src, &tgt)) in coeffs.source_points().iter().zip(target).enumerate() {
        let got = coeffs.transform(src);
        let tol = rel_tol * tgt.x.abs().max(tgt.y.abs()).max(1.0);
        assert_point_approx_eq!(got, tgt, tol, "control point {}", i);
    }
}

fn nalgebra_solve(a: &Matrix, b: &[f64]) -> Vec<f64> {
    let m = DMatrix::from_row_slice(a.rows(), a.cols(), a.as_slice());
    let v = DVector::from_column_slice(b);
    m.lu()
        .solve(&v)
        .expect("reference solve failed")
        .iter()
        .copied()
        .collect()
}

// ============================================================================
// Exact interpolation
// ============================================================================

#[test]
fn test_uniform_scale_scenario() {
    let (source, target) = fixtures::uniform_scale();
    let coeffs = CoefficientSet::compute(&source, &target).unwrap();

    assert_point_approx_eq!(
        coeffs.transform(Point2D::new(5.0, 5.0)),
        Point2D::new(50.0, 50.0),
        1e-6
    );
    assert_exact_interpolation(&coeffs, &target, 1e-6);
}

#[test]
fn test_scattered_points_interpolate_exactly() {
    for seed in [1u64, 2, 3] {
        let source = scattered_points(12, 100.0, 5.0, seed);
        let target = smooth_warp(&source, 3.0);
        let coeffs = CoefficientSet::compute(&source, &target).unwrap();
        assert_exact_interpolation(&coeffs, &target, 1e-6);
        assert!(coeffs.max_residual(&target) < 1e-6);
    }
}

#[test]
fn test_lattice_interpolates_exactly() {
    let source = lattice_points(5, 4, 25.0, Point2D::new(-50.0, 10.0));
    let target = smooth_warp(&source, 8.0);
    let coeffs = CoefficientSet::compute(&source, &target).unwrap();
    assert_exact_interpolation(&coeffs, &target, 1e-6);
    assert!(coeffs.bending_energy() > 0.0);
}

#[test]
fn test_street_map_georeference() {
    let (source, target) = street_map::control_points();
    let coeffs = CoefficientSet::compute(&source, &target).unwrap();

    // Map coordinates ~1e7 m, image coordinates ~1e4
    assert_exact_interpolation(&coeffs, &target, 1e-6);

    // A point between the control points lands inside the image
    let centre = Point2D::new(-8369340.0, 4868560.0);
    let p = coeffs.transform(centre);
    assert!(street_map::extent().bbox().contains(p), "centre maps to {}", p);
}

#[test]
fn test_degree_coordinates_fit() {
    // Same scan placed with lon/lat control points ~0.02 degrees apart
    let source = vec![
        Point2D::new(-75.19, 40.00),
        Point2D::new(-75.17, 40.001),
        Point2D::new(-75.171, 40.02),
        Point2D::new(-75.189, 40.019),
        Point2D::new(-75.18, 40.01),
    ];
    let target = vec![
        Point2D::new(107.1, 9.3),
        Point2D::new(761.0, 30.8),
        Point2D::new(806.0, 574.8),
        Point2D::new(57.3, 504.3),
        Point2D::new(430.0, 290.0),
    ];
    let coeffs = CoefficientSet::compute(&source, &target).unwrap();
    assert_exact_interpolation(&coeffs, &target, 1e-6);

    let tri = CoefficientSet::compute(&source[..3], &target[..3]).unwrap();
    assert_exact_interpolation(&tri, &target[..3], 1e-6);
}

// ============================================================================
// Minimal (affine) case
// ============================================================================

#[test]
fn test_three_points_give_affine_transform() {
    let (source, target) = fixtures::affine_triangle();
    let coeffs = CoefficientSet::compute(&source, &target).unwrap();

    for w in coeffs.weights_x().iter().chain(coeffs.weights_y()) {
        assert!(w.abs() < 1e-9, "kernel weight {} should vanish", w);
    }

    let [c, sx, sy] = coeffs.affine_x();
    assert_approx_eq!(c, 1.0, 1e-9);
    assert_approx_eq!(sx, 2.4, 1e-9);
    assert_approx_eq!(sy, 0.3, 1e-9);

    // Linear in the query point, including far outside the triangle
    for q in [
        Point2D::new(3.0, 7.0),
        Point2D::new(-40.0, 25.0),
        Point2D::new(1000.0, -500.0),
    ] {
        let expected = fixtures::affine_map(q);
        let tol = 1e-9 * expected.x.abs().max(expected.y.abs()).max(1.0);
        assert_point_approx_eq!(coeffs.transform(q), expected, tol);
    }

    let a = Point2D::new(2.0, 9.0);
    let b = Point2D::new(14.0, -3.0);
    let mid = coeffs.transform(Point2D::new(8.0, 3.0));
    let ta = coeffs.transform(a);
    let tb = coeffs.transform(b);
    assert_point_approx_eq!(
        mid,
        Point2D::new((ta.x + tb.x) / 2.0, (ta.y + tb.y) / 2.0),
        1e-9
    );
}

// ============================================================================
// Kernel matrix
// ============================================================================

#[test]
fn test_kernel_matrix_symmetry() {
    let source = scattered_points(15, 50.0, 1.0, 11);
    let k = kernel_matrix(&source);
    for i in 0..source.len() {
        assert_eq!(k.get(i, i), 0.0);
        for j in 0..source.len() {
            assert_eq!(k.get(i, j), k.get(j, i));
        }
    }
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_recompute_is_deterministic() {
    let source = scattered_points(10, 100.0, 5.0, 5);
    let target = smooth_warp(&source, 4.0);

    let a = CoefficientSet::compute(&source, &target).unwrap();
    let b = CoefficientSet::compute(&source, &target).unwrap();
    assert_eq!(a, b);

    let q = Point2D::new(33.3, 66.6);
    assert_eq!(a.transform(q), b.transform(q));
}

// ============================================================================
// Degenerate configurations
// ============================================================================

#[test]
fn test_collinear_points_are_singular() {
    for (source, target) in [
        fixtures::collinear_horizontal(),
        fixtures::collinear_diagonal(),
    ] {
        let err = CoefficientSet::compute(&source, &target).unwrap_err();
        assert!(
            matches!(err, GeorefError::SingularSystem { .. }),
            "expected singular system, got {:?}",
            err
        );
        assert!(err.is_degenerate());
    }
}

#[test]
fn test_duplicate_points_are_singular() {
    let (source, target) = fixtures::duplicate_point();
    let err = CoefficientSet::compute(&source, &target).unwrap_err();
    assert!(matches!(err, GeorefError::SingularSystem { .. }));
}

#[test]
fn test_configuration_errors_before_solving() {
    let (source, target) = fixtures::uniform_scale();

    let err = CoefficientSet::compute(&source, &target[..2]).unwrap_err();
    assert!(matches!(err, GeorefError::Configuration(_)));

    let err = CoefficientSet::compute(&source[..2], &target[..2]).unwrap_err();
    assert!(matches!(err, GeorefError::Configuration(_)));

    let err = CoefficientSet::compute(&[], &[]).unwrap_err();
    assert!(matches!(err, GeorefError::Configuration(_)));
}

// ============================================================================
// Solver cross-checks
// ============================================================================

#[test]
fn test_solver_matches_nalgebra_on_dense_systems() {
    for (n, seed) in [(3usize, 1u64), (8, 2), (20, 3)] {
        let (rows, rhs) = diagonally_dominant_system(n, seed);
        let a = Matrix::from_rows(&rows);
        let ours = solve(&a, &rhs).unwrap();
        let reference = nalgebra_solve(&a, &rhs);
        for (x, r) in ours.iter().zip(&reference) {
            assert_approx_eq!(*x, *r, 1e-9);
        }
    }
}

#[test]
fn test_solver_matches_nalgebra_on_tps_system() {
    let source = scattered_points(9, 100.0, 5.0, 21);
    let target = smooth_warp(&source, 2.0);
    let l = assemble_system(&kernel_matrix(&source), &affine_basis(&source));

    let mut rhs: Vec<f64> = target.iter().map(|p| p.x).collect();
    rhs.extend_from_slice(&[0.0; 3]);

    let ours = solve(&l, &rhs).unwrap();
    let reference = nalgebra_solve(&l, &rhs);
    for (x, r) in ours.iter().zip(&reference) {
        assert_approx_eq!(*x, *r, 1e-6 * r.abs().max(1.0));
    }

    let coeffs = CoefficientSet::compute(&source, &target).unwrap();
    assert_eq!(coeffs.coefficients_x(), ours.as_slice());
}
