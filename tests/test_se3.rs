use approx::assert_relative_eq;
use kdiff::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const STEP: f64 = 1e-6;

fn random_tangent(rng: &mut StdRng, scale: f64) -> TangentVector<f64> {
    TangentVector::from_fn(|_, _| rng.gen_range(-scale..scale))
}

fn random_pose(rng: &mut StdRng) -> RigidTransform<f64> {
    RigidTransform::randn(rng)
}

fn unit(i: usize) -> TangentVector<f64> {
    let mut e = TangentVector::zeros();
    e[i] = 1.0;
    e
}

fn perturbed(pose: &RigidTransform<f64>, delta: &TangentVector<f64>) -> RigidTransform<f64> {
    pose.compose(&RigidTransform::exp(delta, None), None, None)
}

/// Numerical right Jacobian of a pose valued function of a pose
fn numeric_pose_jacobian<F>(pose: &RigidTransform<f64>, f: F) -> Matrix6<f64>
where
    F: Fn(&RigidTransform<f64>) -> RigidTransform<f64>,
{
    let center = f(pose);
    Matrix6::from_fn(|row, col| {
        let plus = center.local(&f(&perturbed(pose, &(unit(col) * STEP))), None, None);
        let minus = center.local(&f(&perturbed(pose, &(unit(col) * -STEP))), None, None);
        (plus[row] - minus[row]) / (2.0 * STEP)
    })
}

#[test]
fn test_inverse_and_identity() {
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..20 {
        let pose = random_pose(&mut rng);
        let identity = pose.compose(&pose.inverse(None), None, None);
        assert_relative_eq!(
            identity.matrix(),
            RigidTransform::<f64>::identity().matrix(),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            pose.to_homogeneous() * pose.inverse(None).to_homogeneous(),
            Matrix4::identity(),
            epsilon = 1e-12
        );
        let point = Vector3::new(0.3, -0.2, 1.0);
        assert_relative_eq!(
            pose.inverse(None).transform_point(&pose.transform_point(&point)),
            point,
            epsilon = 1e-12
        );
    }
}

#[test]
fn test_exp_log() {
    let mut rng = StdRng::seed_from_u64(2);
    for scale in [1e-9, 1e-4, 0.5, 2.0] {
        for _ in 0..10 {
            let xi = random_tangent(&mut rng, scale);
            assert_relative_eq!(RigidTransform::exp(&xi, None).log(None), xi, epsilon = 1e-12);
        }
    }
    // a half turn keeps the rotation angle at π
    let xi = TangentVector::new(0.1, 0.2, 0.3, 0.0, 0.0, std::f64::consts::PI);
    let log = RigidTransform::exp(&xi, None).log(None);
    assert_relative_eq!(log.fixed_rows::<3>(3).norm(), std::f64::consts::PI, epsilon = 1e-12);
    assert_relative_eq!(
        RigidTransform::exp(&log, None).matrix(),
        RigidTransform::exp(&xi, None).matrix(),
        epsilon = 1e-10
    );
}

#[test]
fn test_compose_jacobians() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..10 {
        let a = random_pose(&mut rng);
        let b = random_pose(&mut rng);
        let mut jacobian_a = Matrix6::zeros();
        let mut jacobian_b = Matrix6::zeros();
        a.compose(&b, Some(&mut jacobian_a), Some(&mut jacobian_b));
        let numeric_a = numeric_pose_jacobian(&a, |x| x.compose(&b, None, None));
        let numeric_b = numeric_pose_jacobian(&b, |x| a.compose(x, None, None));
        assert_relative_eq!(jacobian_a, numeric_a, epsilon = 1e-7);
        assert_relative_eq!(jacobian_b, numeric_b, epsilon = 1e-7);
    }
}

#[test]
fn test_inverse_jacobian() {
    let mut rng = StdRng::seed_from_u64(4);
    for _ in 0..10 {
        let pose = random_pose(&mut rng);
        let mut jacobian = Matrix6::zeros();
        pose.inverse(Some(&mut jacobian));
        let numeric = numeric_pose_jacobian(&pose, |x| x.inverse(None));
        assert_relative_eq!(jacobian, numeric, epsilon = 1e-7);
    }
}

#[test]
fn test_exp_jacobian() {
    let mut rng = StdRng::seed_from_u64(5);
    for scale in [1e-3, 1.0] {
        for _ in 0..10 {
            let xi = random_tangent(&mut rng, scale);
            let mut jacobian = Matrix6::zeros();
            let center = RigidTransform::exp(&xi, Some(&mut jacobian));
            let numeric = Matrix6::from_fn(|row, col| {
                let plus = center.local(
                    &RigidTransform::exp(&(xi + unit(col) * STEP), None),
                    None,
                    None,
                );
                let minus = center.local(
                    &RigidTransform::exp(&(xi - unit(col) * STEP), None),
                    None,
                    None,
                );
                (plus[row] - minus[row]) / (2.0 * STEP)
            });
            assert_relative_eq!(jacobian, numeric, epsilon = 1e-7);
        }
    }
}

#[test]
fn test_log_jacobian() {
    let mut rng = StdRng::seed_from_u64(6);
    for _ in 0..10 {
        let pose = random_pose(&mut rng);
        let mut jacobian = Matrix6::zeros();
        pose.log(Some(&mut jacobian));
        let numeric = Matrix6::from_fn(|row, col| {
            let plus = perturbed(&pose, &(unit(col) * STEP)).log(None);
            let minus = perturbed(&pose, &(unit(col) * -STEP)).log(None);
            (plus[row] - minus[row]) / (2.0 * STEP)
        });
        assert_relative_eq!(jacobian, numeric, epsilon = 1e-7);
    }
}

#[test]
fn test_local_jacobians() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..10 {
        let a = random_pose(&mut rng);
        let b = random_pose(&mut rng);
        let mut jacobian_a = Matrix6::zeros();
        let mut jacobian_b = Matrix6::zeros();
        let tau = a.local(&b, Some(&mut jacobian_a), Some(&mut jacobian_b));
        assert_relative_eq!(
            a.compose(&RigidTransform::exp(&tau, None), None, None).matrix(),
            b.matrix(),
            epsilon = 1e-12
        );
        let numeric = |f: &dyn Fn(&TangentVector<f64>) -> TangentVector<f64>| {
            Matrix6::from_fn(|row, col| {
                let plus = f(&(unit(col) * STEP));
                let minus = f(&(unit(col) * -STEP));
                (plus[row] - minus[row]) / (2.0 * STEP)
            })
        };
        let numeric_a = numeric(&|delta| perturbed(&a, delta).local(&b, None, None));
        let numeric_b = numeric(&|delta| a.local(&perturbed(&b, delta), None, None));
        assert_relative_eq!(jacobian_a, numeric_a, epsilon = 1e-7);
        assert_relative_eq!(jacobian_b, numeric_b, epsilon = 1e-7);
    }
}

#[test]
fn test_gradients_pull_back_linear_losses() {
    let mut rng = StdRng::seed_from_u64(8);
    let pose = random_pose(&mut rng);
    let weight = Matrix3x4::from_fn(|_, _| rng.gen_range(-1.0..1.0));
    let loss = |x: &RigidTransform<f64>| x.matrix().dot(&weight);
    let body = pose.body_gradient(&weight);
    let spatial = pose.spatial_gradient(&weight);
    for i in 0..6 {
        let delta = unit(i) * STEP;
        let right =
            (loss(&perturbed(&pose, &delta)) - loss(&perturbed(&pose, &-delta))) / (2.0 * STEP);
        assert_relative_eq!(body[i], right, epsilon = 1e-8);
        let left = (loss(&RigidTransform::exp(&delta, None).compose(&pose, None, None))
            - loss(&RigidTransform::exp(&-delta, None).compose(&pose, None, None)))
            / (2.0 * STEP);
        assert_relative_eq!(spatial[i], left, epsilon = 1e-8);
    }
    // the two differ by the adjoint
    assert_relative_eq!(body, pose.adjoint().transpose() * spatial, epsilon = 1e-12);
}

#[test]
fn test_batch_broadcast() {
    let mut rng = StdRng::seed_from_u64(9);
    let config = KinematicsConfig::default();
    let poses = (0..5).map(|_| random_pose(&mut rng)).collect::<PoseBatch<f64>>();
    let offset = vec![random_pose(&mut rng)];

    let composed = batch::compose(&poses, &offset, &config).unwrap();
    assert_eq!(composed.len(), 5);
    for (pose, composed) in poses.iter().zip(&composed) {
        assert_eq!(*composed, pose.compose(&offset[0], None, None));
    }
    let (_, jacobians_lhs, jacobians_rhs) =
        batch::compose_with_jacobians(&offset, &poses, &config).unwrap();
    assert_eq!(jacobians_lhs.len(), 5);
    assert_relative_eq!(jacobians_lhs[2], poses[2].inverse(None).adjoint());
    assert_eq!(jacobians_rhs[4], Matrix6::identity());

    let tangents = batch::local(&offset, &poses, &config).unwrap();
    let restored = batch::compose(
        &offset,
        &batch::exp(&tangents, &config),
        &config,
    )
    .unwrap();
    for (pose, restored) in poses.iter().zip(&restored) {
        assert_relative_eq!(pose.matrix(), restored.matrix(), epsilon = 1e-12);
    }
    assert!(matches!(
        batch::local(&poses, &poses[..2], &config),
        Err(Error::SizeMismatchError {
            input: 2,
            required: 5
        })
    ));
    assert!(batch::inverse(&[], &config).is_empty());
}
