use approx::assert_abs_diff_eq;
use nalgebra::Vector3;
use pointfit_rs::prelude::*;

fn parabola_grid() -> Vec<SamplePoint<f64>> {
    let mut points = Vec::new();
    for i in 0..17 {
        for j in 0..17 {
            let x = -0.4 + i as f64 * 0.05;
            let y = -0.4 + j as f64 * 0.05;
            points.push(SamplePoint::new(Vector3::new(x, y, 0.5 * x * x)));
        }
    }
    points
}

fn fitted_cylinder() -> ParabolicCylinderFit<f64> {
    let tree = KdTree::new(parabola_grid());
    let weight = DistWeightFunc::new(WeightFunction::SmoothRbf, 0.6);
    let mut fit = ParabolicCylinderFit::new(weight);
    let status = fit_at(&mut fit, &tree, &Vector3::zeros()).unwrap();
    assert_eq!(status, FitResult::Stable);
    fit
}

#[test]
fn cylinder_recovers_the_parabola_curvature() {
    let fit = fitted_cylinder();

    assert_abs_diff_eq!(fit.alpha().abs(), 1.0, epsilon = 5e-2);

    let curvatures = [fit.kmin().abs(), fit.kmax().abs()];
    let bent = curvatures[0].max(curvatures[1]);
    let flat = curvatures[0].min(curvatures[1]);
    assert_abs_diff_eq!(bent, 1.0, epsilon = 5e-2);
    assert_abs_diff_eq!(flat, 0.0, epsilon = 5e-2);
}

#[test]
fn cylinder_bends_along_the_x_axis() {
    let fit = fitted_cylinder();
    let direction = if fit.kmax().abs() >= fit.kmin().abs() {
        fit.kmax_direction()
    } else {
        fit.kmin_direction()
    };
    assert_abs_diff_eq!(direction.norm(), 1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(direction.x.abs(), 1.0, epsilon = 5e-2);
}

#[test]
fn cylinder_gradient_is_normal_at_the_apex() {
    let fit = fitted_cylinder();
    let gradient = fit.primitive_gradient(&Vector3::zeros());
    // At the apex the surface is horizontal.
    assert_abs_diff_eq!(gradient.x.abs(), 0.0, epsilon = 5e-2);
    assert_abs_diff_eq!(gradient.y.abs(), 0.0, epsilon = 5e-2);
    assert_abs_diff_eq!(gradient.z.abs(), 1.0, epsilon = 5e-2);
}

#[test]
fn cylinder_projection_follows_the_parabolic_profile() {
    let fit = fitted_cylinder();

    // Two probes at the same x land at the same height; the cylinder is
    // flat along y.
    let p0 = fit.project(&Vector3::new(0.2, -0.3, 1.0));
    let p1 = fit.project(&Vector3::new(0.2, 0.1, 1.0));
    assert_abs_diff_eq!(p0.z, p1.z, epsilon = 1e-4);

    // The profile height difference between x=0 and x=0.2 is x²/2.
    let apex = fit.project(&Vector3::new(0.0, 0.0, 1.0));
    assert_abs_diff_eq!((p0.z - apex.z).abs(), 0.02, epsilon = 5e-3);
}

#[test]
fn cylinder_normal_derivative_is_symmetric_and_finite() {
    let fit = fitted_cylinder();
    let dn = fit.normal_derivative();
    for i in 0..3 {
        for j in 0..3 {
            assert!(dn[(i, j)].is_finite());
            assert_abs_diff_eq!(dn[(i, j)], dn[(j, i)], epsilon = 1e-9);
        }
    }
}

#[test]
fn cylinder_potential_is_consistent_with_projection() {
    let fit = fitted_cylinder();
    // A projected point has (near) zero residual against the cylinder.
    let probe = Vector3::new(0.15, -0.05, 0.8);
    let projected = fit.project(&probe);
    assert_abs_diff_eq!(fit.potential(&projected), 0.0, epsilon = 1e-9);
}

#[test]
fn cylinder_is_unstable_on_degenerate_input() {
    let points: Vec<SamplePoint<f64>> = (0..30)
        .map(|i| SamplePoint::new(Vector3::new(i as f64 * 0.02, 0.0, 0.0)))
        .collect();
    let tree = KdTree::new(points);
    let weight = DistWeightFunc::new(WeightFunction::SmoothRbf, 2.0);
    let mut fit = ParabolicCylinderFit::new(weight);
    let status = fit_at(&mut fit, &tree, &Vector3::zeros()).unwrap();
    assert_eq!(status, FitResult::Unstable);
}
