use approx::assert_abs_diff_eq;
use nalgebra::Vector3;
use pointfit_rs::prelude::*;

fn planar_grid(with_normals: bool) -> Vec<SamplePoint<f64>> {
    let mut points = Vec::new();
    for i in 0..11 {
        for j in 0..11 {
            let pos = Vector3::new(-1.0 + i as f64 * 0.2, -1.0 + j as f64 * 0.2, 0.0);
            points.push(if with_normals {
                SamplePoint::with_normal(pos, Vector3::z())
            } else {
                SamplePoint::new(pos)
            });
        }
    }
    points
}

#[test]
fn mean_plane_recovers_the_ground_truth_plane() {
    let tree = KdTree::new(planar_grid(true));
    let weight = DistWeightFunc::new(WeightFunction::SmoothRbf, 3.0);
    let mut fit = MeanPlaneFit::new(weight);

    let status = fit_at(&mut fit, &tree, &Vector3::zeros()).unwrap();
    assert_eq!(status, FitResult::Stable);
    assert_abs_diff_eq!(fit.normal().z.abs(), 1.0, epsilon = 1e-12);

    let frame = fit.frame();
    assert_abs_diff_eq!(frame.u.dot(&frame.v), 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(frame.u.dot(&fit.normal()), 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(frame.v.dot(&fit.normal()), 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(frame.u.norm(), 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(frame.v.norm(), 1.0, epsilon = 1e-6);
}

#[test]
fn mean_plane_potential_and_projection() {
    let tree = KdTree::new(planar_grid(true));
    let weight = DistWeightFunc::new(WeightFunction::SmoothRbf, 3.0);
    let mut fit = MeanPlaneFit::new(weight);
    fit_at(&mut fit, &tree, &Vector3::new(0.1, -0.2, 0.0)).unwrap();

    let q = Vector3::new(0.3, 0.1, 0.5);
    assert_abs_diff_eq!(fit.potential(&q).abs(), 0.5, epsilon = 1e-6);
    let projected = fit.project(&q);
    assert_abs_diff_eq!(projected.z, 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(projected.x, 0.3, epsilon = 1e-6);
    assert_abs_diff_eq!(projected.y, 0.1, epsilon = 1e-6);
    assert_abs_diff_eq!(fit.primitive_gradient(&q).norm(), 1.0, epsilon = 1e-6);
}

#[test]
fn covariance_plane_recovers_the_ground_truth_plane() {
    let tree = KdTree::new(planar_grid(false));
    let weight = DistWeightFunc::new(WeightFunction::SmoothRbf, 3.0);
    let mut fit = CovariancePlaneFit::new(weight);

    let status = fit_at(&mut fit, &tree, &Vector3::zeros()).unwrap();
    assert_eq!(status, FitResult::Stable);
    assert_abs_diff_eq!(fit.normal().z.abs(), 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(fit.barycenter().z, 0.0, epsilon = 1e-9);

    let frame = fit.frame();
    assert_abs_diff_eq!(frame.u.dot(&frame.v), 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(frame.u.norm(), 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(frame.v.norm(), 1.0, epsilon = 1e-6);
}

#[test]
fn fit_is_unstable_without_neighbors() {
    let tree = KdTree::new(planar_grid(true));
    let weight = DistWeightFunc::new(WeightFunction::SmoothRbf, 0.5);
    let mut fit = MeanPlaneFit::new(weight);
    let status = fit_at(&mut fit, &tree, &Vector3::new(50.0, 50.0, 50.0)).unwrap();
    assert_eq!(status, FitResult::Unstable);
}

#[test]
fn mean_plane_without_normals_is_not_supported() {
    let tree = KdTree::new(planar_grid(false));
    let weight = DistWeightFunc::new(WeightFunction::SmoothRbf, 3.0);
    let mut fit = MeanPlaneFit::new(weight);
    let status = fit_at(&mut fit, &tree, &Vector3::zeros()).unwrap();
    assert_eq!(status, FitResult::NotSupported);
}

#[test]
fn covariance_plane_is_unstable_on_collinear_points() {
    let points: Vec<SamplePoint<f64>> = (0..20)
        .map(|i| SamplePoint::new(Vector3::new(i as f64 * 0.05, 0.0, 0.0)))
        .collect();
    let tree = KdTree::new(points);
    let weight = DistWeightFunc::new(WeightFunction::SmoothRbf, 5.0);
    let mut fit = CovariancePlaneFit::new(weight);
    let status = fit_at(&mut fit, &tree, &Vector3::zeros()).unwrap();
    assert_eq!(status, FitResult::Unstable);
}

#[test]
fn mean_plane_with_cancelling_normals_is_unstable() {
    let points = vec![
        SamplePoint::with_normal(Vector3::new(0.1, 0.0, 0.0), Vector3::z()),
        SamplePoint::with_normal(Vector3::new(-0.1, 0.0, 0.0), -Vector3::z()),
    ];
    let tree = KdTree::new(points);
    let weight = DistWeightFunc::new(WeightFunction::SmoothRbf, 1.0);
    let mut fit = MeanPlaneFit::new(weight);
    let status = fit_at(&mut fit, &tree, &Vector3::zeros()).unwrap();
    assert_eq!(status, FitResult::Unstable);
}

#[test]
fn state_machine_resets_on_init() {
    let tree = KdTree::new(planar_grid(true));
    let weight = DistWeightFunc::new(WeightFunction::SmoothRbf, 3.0);
    let mut fit = MeanPlaneFit::new(weight);

    assert_eq!(fit.status(), FitResult::Undefined);
    fit_at(&mut fit, &tree, &Vector3::zeros()).unwrap();
    assert_eq!(fit.status(), FitResult::Stable);

    // Accessors are idempotent after Stable.
    let first = fit.normal();
    let second = fit.normal();
    assert_eq!(first, second);

    FittingProcedure::<SamplePoint<f64>>::init(&mut fit, Vector3::zeros());
    assert_eq!(fit.status(), FitResult::Undefined);
}

#[test]
fn second_finalize_without_init_reports_a_conflict() {
    let tree = KdTree::new(planar_grid(true));
    let weight = DistWeightFunc::new(WeightFunction::SmoothRbf, 3.0);
    let mut fit = MeanPlaneFit::new(weight);
    fit_at(&mut fit, &tree, &Vector3::zeros()).unwrap();
    assert_eq!(fit.status(), FitResult::Stable);

    // The plane is already provided; finalizing again flags the conflict
    // but still overwrites the plane.
    let status = FittingProcedure::<SamplePoint<f64>>::finalize(&mut fit);
    assert_eq!(status, FitResult::ConflictErrorFound);
    assert_abs_diff_eq!(fit.normal().z.abs(), 1.0, epsilon = 1e-12);
}
