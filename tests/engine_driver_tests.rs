use approx::assert_abs_diff_eq;
use nalgebra::Vector3;
use pointfit_rs::prelude::*;

fn planar_grid() -> Vec<SamplePoint<f64>> {
    let mut points = Vec::new();
    for i in 0..11 {
        for j in 0..11 {
            let pos = Vector3::new(-1.0 + i as f64 * 0.2, -1.0 + j as f64 * 0.2, 0.0);
            points.push(SamplePoint::with_normal(pos, Vector3::z()));
        }
    }
    points
}

#[test]
fn fit_at_index_evaluates_at_the_cloud_point() {
    let tree = KdTree::new(planar_grid());
    let weight = DistWeightFunc::new(WeightFunction::Wendland, 1.0);
    let mut fit = MeanPlaneFit::new(weight);
    let status = fit_at_index(&mut fit, &tree, 60).unwrap();
    assert_eq!(status, FitResult::Stable);
    assert_abs_diff_eq!(fit.normal().z.abs(), 1.0, epsilon = 1e-9);
}

#[test]
fn fit_with_knn_uses_a_fixed_size_neighborhood() {
    let tree = KdTree::new(planar_grid());
    let weight = DistWeightFunc::new(WeightFunction::Gaussian, 2.0);
    let mut fit = CovariancePlaneFit::new(weight);
    let status = fit_with_knn(&mut fit, &tree, 60, 12).unwrap();
    assert_eq!(status, FitResult::Stable);
    assert_abs_diff_eq!(fit.normal().z.abs(), 1.0, epsilon = 1e-6);
}

#[test]
fn fit_in_graph_expands_from_the_seed() {
    let tree = KdTree::new(planar_grid());
    let graph = KnnGraph::new(&tree, 8).unwrap();
    let weight = DistWeightFunc::new(WeightFunction::SmoothRbf, 0.9);
    let mut fit = MeanPlaneFit::new(weight);
    let status = fit_in_graph(&mut fit, &graph, 60).unwrap();
    assert_eq!(status, FitResult::Stable);
    assert_abs_diff_eq!(fit.normal().z.abs(), 1.0, epsilon = 1e-9);
}

#[test]
fn monge_fit_through_the_driver_runs_both_passes() {
    let tree = KdTree::new(planar_grid());
    let weight = DistWeightFunc::new(WeightFunction::SmoothRbf, 3.0);
    let mut fit = MongePatchFit::new(weight);
    let status = fit_at(&mut fit, &tree, &Vector3::zeros()).unwrap();
    assert_eq!(status, FitResult::Stable);
    assert_abs_diff_eq!(fit.kmax(), 0.0, epsilon = 1e-6);
}

#[test]
fn driver_rejects_invalid_parameters() {
    let tree = KdTree::new(planar_grid());
    let graph = KnnGraph::new(&tree, 4).unwrap();

    let weight = DistWeightFunc::new(WeightFunction::SmoothRbf, 0.0);
    let mut fit = MeanPlaneFit::new(weight);
    assert!(matches!(
        fit_at(&mut fit, &tree, &Vector3::zeros()),
        Err(PointFitError::InvalidRadius(_))
    ));

    let weight = DistWeightFunc::new(WeightFunction::SmoothRbf, 1.0);
    let mut fit = MeanPlaneFit::new(weight);
    assert!(matches!(
        fit_at_index(&mut fit, &tree, 5000),
        Err(PointFitError::IndexOutOfBounds { .. })
    ));
    assert!(matches!(
        fit_with_knn(&mut fit, &tree, 0, 0),
        Err(PointFitError::InvalidNeighborCount(0))
    ));
    assert!(matches!(
        fit_in_graph(&mut fit, &graph, 5000),
        Err(PointFitError::IndexOutOfBounds { .. })
    ));
}

#[test]
fn driver_fails_fast_on_an_empty_index() {
    let tree = KdTree::<SamplePoint<f64>>::new(Vec::new());
    let weight = DistWeightFunc::new(WeightFunction::SmoothRbf, 1.0);
    let mut fit = MeanPlaneFit::new(weight);
    assert_eq!(
        fit_at(&mut fit, &tree, &Vector3::zeros()),
        Err(PointFitError::EmptyIndex)
    );
}

#[test]
fn validator_helpers_are_exposed() {
    assert!(Validator::validate_radius(1.0_f64).is_ok());
    assert!(Validator::validate_radius(f64::INFINITY).is_err());
    assert!(Validator::validate_neighbor_count(3).is_ok());
    assert!(Validator::validate_index(2, 3).is_ok());
    assert!(Validator::validate_index(3, 3).is_err());
}
