use approx::assert_abs_diff_eq;
use nalgebra::Vector3;
use pointfit_rs::prelude::*;

fn planar_grid() -> Vec<SamplePoint<f64>> {
    let mut points = Vec::new();
    for i in 0..11 {
        for j in 0..11 {
            points.push(SamplePoint::new(Vector3::new(
                -1.0 + i as f64 * 0.2,
                -1.0 + j as f64 * 0.2,
                0.0,
            )));
        }
    }
    points
}

// Cap of the unit sphere around the north pole.
fn sphere_cap() -> Vec<SamplePoint<f64>> {
    let mut points = vec![SamplePoint::new(Vector3::new(0.0, 0.0, 1.0))];
    for ring in 1..=8 {
        let theta = ring as f64 * 0.05;
        for step in 0..24 {
            let phi = step as f64 * core::f64::consts::TAU / 24.0;
            points.push(SamplePoint::new(Vector3::new(
                theta.sin() * phi.cos(),
                theta.sin() * phi.sin(),
                theta.cos(),
            )));
        }
    }
    points
}

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

#[test]
fn monge_patch_on_a_plane_has_zero_curvature() {
    let tree = KdTree::new(planar_grid());
    let weight = DistWeightFunc::new(WeightFunction::SmoothRbf, 3.0);
    let mut fit = MongePatchFit::new(weight);

    let status = fit_at(&mut fit, &tree, &Vector3::zeros()).unwrap();
    assert_eq!(status, FitResult::Stable);
    assert_abs_diff_eq!(fit.kmin(), 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(fit.kmax(), 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(fit.k_mean(), 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(fit.gaussian_curvature(), 0.0, epsilon = 1e-6);
}

#[test]
fn monge_patch_requests_a_second_pass() {
    let points = planar_grid();
    let weight = DistWeightFunc::new(WeightFunction::SmoothRbf, 3.0);
    let mut fit = MongePatchFit::new(weight);

    FittingProcedure::<SamplePoint<f64>>::init(&mut fit, Vector3::zeros());
    for point in &points {
        FittingProcedure::<SamplePoint<f64>>::add_neighbor(&mut fit, point);
    }
    let first = FittingProcedure::<SamplePoint<f64>>::finalize(&mut fit);
    assert_eq!(first, FitResult::NeedOtherPass);
    assert!(!first.is_terminal());

    for point in &points {
        FittingProcedure::<SamplePoint<f64>>::add_neighbor(&mut fit, point);
    }
    let second = FittingProcedure::<SamplePoint<f64>>::finalize(&mut fit);
    assert_eq!(second, FitResult::Stable);
    assert!(second.is_stable());
}

#[test]
fn monge_patch_on_a_sphere_recovers_the_radius() {
    let tree = KdTree::new(sphere_cap());
    let weight = DistWeightFunc::new(WeightFunction::SmoothRbf, 0.5);
    let mut fit = MongePatchFit::new(weight);

    let status = fit_at(&mut fit, &tree, &Vector3::new(0.0, 0.0, 1.0)).unwrap();
    assert_eq!(status, FitResult::Stable);

    // Orientation of the base plane normal is arbitrary; compare
    // magnitudes.
    assert_abs_diff_eq!(fit.kmin().abs(), 1.0, epsilon = 5e-2);
    assert_abs_diff_eq!(fit.kmax().abs(), 1.0, epsilon = 5e-2);
    assert_abs_diff_eq!(fit.gaussian_curvature(), 1.0, epsilon = 1e-1);
}

#[test]
fn monge_patch_on_a_parabola_finds_the_bent_direction() {
    let tree = KdTree::new(parabola_grid());
    let weight = DistWeightFunc::new(WeightFunction::SmoothRbf, 0.6);
    let mut fit = MongePatchFit::new(weight);

    let status = fit_at(&mut fit, &tree, &Vector3::zeros()).unwrap();
    assert_eq!(status, FitResult::Stable);

    let curvatures = [fit.kmin().abs(), fit.kmax().abs()];
    let bent = curvatures[0].max(curvatures[1]);
    let flat = curvatures[0].min(curvatures[1]);
    assert_abs_diff_eq!(bent, 1.0, epsilon = 5e-2);
    assert_abs_diff_eq!(flat, 0.0, epsilon = 5e-2);

    // The strongly bent principal direction is the x axis.
    let direction = if fit.kmax().abs() >= fit.kmin().abs() {
        fit.kmax_direction()
    } else {
        fit.kmin_direction()
    };
    assert_abs_diff_eq!(direction.x.abs(), 1.0, epsilon = 5e-2);

    // Principal directions stay tangent.
    let normal = fit.plane_fit().normal();
    assert_abs_diff_eq!(fit.kmin_direction().dot(&normal), 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(fit.kmax_direction().dot(&normal), 0.0, epsilon = 1e-9);
}

#[test]
fn monge_patch_projection_lands_on_the_plane() {
    let tree = KdTree::new(planar_grid());
    let weight = DistWeightFunc::new(WeightFunction::SmoothRbf, 3.0);
    let mut fit = MongePatchFit::new(weight);
    fit_at(&mut fit, &tree, &Vector3::zeros()).unwrap();

    let q = Vector3::new(0.2, -0.1, 0.4);
    let projected = fit.project(&q);
    assert_abs_diff_eq!(projected.z, 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(projected.x, 0.2, epsilon = 1e-6);
    assert_abs_diff_eq!(projected.y, -0.1, epsilon = 1e-6);
    assert_abs_diff_eq!(fit.potential(&q).abs(), 0.4, epsilon = 1e-6);

    // The patch gradient of a plane is its normal.
    let gradient = fit.primitive_gradient(&q);
    assert_abs_diff_eq!(gradient.x.abs(), 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(gradient.y.abs(), 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(gradient.z.abs(), 1.0, epsilon = 1e-6);
}

#[test]
fn monge_patch_is_unstable_on_degenerate_input() {
    let points: Vec<SamplePoint<f64>> = (0..30)
        .map(|i| SamplePoint::new(Vector3::new(i as f64 * 0.02, 0.0, 0.0)))
        .collect();
    let tree = KdTree::new(points);
    let weight = DistWeightFunc::new(WeightFunction::SmoothRbf, 2.0);
    let mut fit = MongePatchFit::new(weight);
    let status = fit_at(&mut fit, &tree, &Vector3::zeros()).unwrap();
    assert_eq!(status, FitResult::Unstable);
}
