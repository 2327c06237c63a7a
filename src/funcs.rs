/*
  Copyright 2017 Takashi Ogura

  Licensed under the Apache License, Version 2.0 (the "License");
  you may not use this file except in compliance with the License.
  You may obtain a copy of the License at

      http://www.apache.org/licenses/LICENSE-2.0

  Unless required by applicable law or agreed to in writing, software
  distributed under the License is distributed on an "AS IS" BASIS,
  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
  See the License for the specific language governing permissions and
  limitations under the License.
*/
use crate::errors::*;
use crate::kinematics::{ForwardKinematics, JacobianBatch};
use crate::se3::RigidTransform;
use crate::so3;
use crate::Real;
use na::{DMatrix, Matrix6xX, Vector6};
use nalgebra as na;

/// Rotates a body Jacobian into the root frame
///
/// The result maps joint velocities to `[ṗ, ω]`: the velocity of the link origin and the
/// angular velocity, both expressed in the root frame.
///
/// # Examples
///
/// ```
/// use kdiff::*;
///
/// let description = ChainDescription::<f64>::new("pendulum")
///     .links(["base", "arm", "bob"])
///     .joint(JointDescription::new("swing", JointKind::RevoluteZ, "base", "arm"))
///     .joint(
///         JointDescription::new("rod", JointKind::Fixed, "arm", "bob")
///             .translation(Translation3::new(1.0, 0.0, 0.0)),
///     );
/// let chain = Chain::from_description(&description).unwrap();
/// let (jacobians, poses) = chain.jacobians(&DMatrix::zeros(1, 1)).unwrap();
/// let world = world_jacobian(&poses[2][0], &jacobians[2][0]);
/// // the bob moves along +Y while the arm turns around +Z
/// assert!((world.column(0) - Vector6::new(0.0, 1.0, 0.0, 0.0, 0.0, 1.0)).norm() < 1e-12);
/// ```
pub fn world_jacobian<T: Real>(
    pose: &RigidTransform<T>,
    body_jacobian: &Matrix6xX<T>,
) -> Matrix6xX<T> {
    let rotation = pose.rotation();
    let mut world = body_jacobian.clone();
    for mut column in world.column_iter_mut() {
        let linear = rotation * column.fixed_rows::<3>(0);
        let angular = rotation * column.fixed_rows::<3>(3);
        column.fixed_rows_mut::<3>(0).copy_from(&linear);
        column.fixed_rows_mut::<3>(3).copy_from(&angular);
    }
    world
}

/// Body Jacobians by centered finite differences of `fk.forward`, `[link][sample]`
///
/// Slow. It is meant for checking analytic Jacobians.
pub fn finite_difference_jacobian<T: Real>(
    fk: &ForwardKinematics<'_, T>,
    angles: &DMatrix<T>,
    step: T,
) -> Result<Vec<JacobianBatch<T>>> {
    let poses = fk.forward(angles)?;
    let dof = fk.chain().dof();
    let two: T = na::convert(2.0);
    let half: T = na::convert(0.5);
    let mut jacobians = poses
        .iter()
        .map(|batch| vec![Matrix6xX::zeros(dof); batch.len()])
        .collect::<Vec<JacobianBatch<T>>>();
    for j in 0..dof {
        let mut plus = angles.clone();
        let mut minus = angles.clone();
        plus.column_mut(j).add_scalar_mut(step);
        minus.column_mut(j).add_scalar_mut(-step);
        let poses_plus = fk.forward(&plus)?;
        let poses_minus = fk.forward(&minus)?;
        for (k, batch) in poses.iter().enumerate() {
            for (n, pose) in batch.iter().enumerate() {
                let derivative =
                    (poses_plus[k][n].matrix() - poses_minus[k][n].matrix()) / (two * step);
                // g⁻¹ dg/dθ = [Rᵀ dR | Rᵀ dt] is the hat of the body velocity
                let body = pose.rotation().transpose() * derivative;
                let angular = so3::project(&body.fixed_view::<3, 3>(0, 0).into_owned()) * half;
                let linear = body.column(3);
                jacobians[k][n].set_column(
                    j,
                    &Vector6::new(
                        linear[0], linear[1], linear[2], angular[0], angular[1], angular[2],
                    ),
                );
            }
        }
    }
    Ok(jacobians)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::*;
    use approx::assert_relative_eq;

    /// Geometric Jacobian of the end link, `a_i × (p_n - p_i)` and `a_i`
    fn geometric_jacobian(chain: &Chain<f64>, angles: &DMatrix<f64>) -> Matrix6xX<f64> {
        let poses = chain.forward_kinematics(angles).unwrap();
        let end = chain.links().len() - 1;
        let p_n = poses[end][0].translation();
        let mut jacobian = Matrix6xX::zeros(chain.dof());
        for joint in chain.iter_joints() {
            let t_i = poses[joint.child()][0];
            let a_i = t_i.transform_vector(&joint.axis().fixed_rows::<3>(3).into_owned());
            let dp_i = a_i.cross(&(p_n - t_i.translation()));
            jacobian.set_column(
                joint.id(),
                &Vector6::new(dp_i[0], dp_i[1], dp_i[2], a_i[0], a_i[1], a_i[2]),
            );
        }
        jacobian
    }

    #[test]
    fn world_jacobian_matches_geometric_jacobian() {
        let description = ChainDescription::new("arm")
            .links(["base", "l0", "l1", "l2"])
            .joint(JointDescription::new("j0", JointKind::RevoluteZ, "base", "l0"))
            .joint(
                JointDescription::new("j1", JointKind::Revolute, "l0", "l1")
                    .translation(Translation3::new(0.0, 0.1, 0.3))
                    .axis(&[1.0, 1.0, 0.0]),
            )
            .joint(
                JointDescription::new("j2", JointKind::RevoluteY, "l1", "l2")
                    .translation(Translation3::new(0.2, 0.0, 0.5)),
            );
        let chain = Chain::from_description(&description).unwrap();
        let angles = DMatrix::from_row_slice(1, 3, &[0.3, -0.7, 1.1]);
        let (jacobians, poses) = chain.jacobians(&angles).unwrap();
        let world = world_jacobian(&poses[3][0], &jacobians[3][0]);
        assert_relative_eq!(world, geometric_jacobian(&chain, &angles), epsilon = 1e-12);
    }

    #[test]
    fn finite_difference_matches_prismatic_jacobian() {
        let description = ChainDescription::new("slider")
            .links(["base", "cart"])
            .joint(
                JointDescription::new("slide", JointKind::PrismaticY, "base", "cart")
                    .rotation(UnitQuaternion::from_euler_angles(0.0, 0.0, 0.5)),
            );
        let chain = Chain::from_description(&description).unwrap();
        let fk = chain.kinematics();
        let angles = DMatrix::from_column_slice(2, 1, &[0.0, 0.4]);
        let numeric = finite_difference_jacobian(&fk, &angles, 1e-6).unwrap();
        let (analytic, _) = fk.jacobian(&angles).unwrap();
        for n in 0..2 {
            assert_relative_eq!(numeric[1][n], analytic[1][n], epsilon = 1e-8);
            assert_relative_eq!(
                analytic[1][n].column(0).into_owned(),
                Vector6::new(0.0, 1.0, 0.0, 0.0, 0.0, 0.0),
                epsilon = 1e-12
            );
        }
    }
}
