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
//! Batched forward kinematics, body Jacobians and reverse-mode gradients
use crate::batch::{map_samples, PoseBatch};
use crate::chain::Chain;
use crate::config::KinematicsConfig;
use crate::errors::*;
use crate::se3::{RigidTransform, TangentVector};
use crate::Real;
use log::trace;
use na::{DMatrix, DVector, Matrix3x4, Matrix6xX};
use nalgebra as na;
use std::collections::BTreeSet;

/// One `6 x dof` body Jacobian per sample
pub type JacobianBatch<T> = Vec<Matrix6xX<T>>;

/// Link poses computed by `ForwardKinematics::forward_state`, reused by `gradient`
#[derive(Debug, Clone)]
pub struct KinematicsState<T: Real> {
    /// `[sample][link id]`, `None` for links which were not needed
    poses: Vec<Vec<Option<RigidTransform<T>>>>,
}

impl<T: Real> KinematicsState<T> {
    pub fn batch_size(&self) -> usize {
        self.poses.len()
    }
    /// Pose of `link_id` in `sample`, if it was computed
    pub fn pose(&self, sample: usize, link_id: usize) -> Option<&RigidTransform<T>> {
        self.poses.get(sample)?.get(link_id)?.as_ref()
    }
    /// Poses of `link_id` over the batch, if it was computed
    pub fn link_poses(&self, link_id: usize) -> Option<PoseBatch<T>> {
        self.poses
            .iter()
            .map(|poses| poses.get(link_id).copied().flatten())
            .collect()
    }
}

/// Forward kinematics of selected links of a `Chain`
///
/// Only the selected links and their ancestors are evaluated. Joint angles are given as an
/// `N x dof` matrix, one row per sample, columns ordered by joint id.
///
/// # Examples
///
/// ```
/// use kdiff::*;
///
/// let description = ChainDescription::<f64>::new("slider")
///     .links(["base", "carriage"])
///     .joint(JointDescription::new("slide", JointKind::PrismaticX, "base", "carriage"));
/// let chain = Chain::from_description(&description).unwrap();
/// let fk = ForwardKinematics::with_links(&chain, &["carriage"]).unwrap();
///
/// let angles = DMatrix::from_column_slice(3, 1, &[0.0, 1.0, 2.0]);
/// let poses = fk.forward(&angles).unwrap();
/// assert_eq!(poses[0][2].translation().x, 2.0);
///
/// // dL/dθ of L = x translation of the carriage
/// let state = fk.forward_state(&angles).unwrap();
/// let mut upstream = Matrix3x4::zeros();
/// upstream[(0, 3)] = 1.0;
/// let gradient = fk.gradient(&state, &[vec![upstream; 3]]).unwrap();
/// assert_eq!(gradient, DMatrix::from_element(3, 1, 1.0));
/// ```
#[derive(Debug, Clone)]
pub struct ForwardKinematics<'a, T: Real> {
    chain: &'a Chain<T>,
    link_ids: Vec<usize>,
    /// selected links and all their ancestors, ascending
    pose_ids: Vec<usize>,
    config: KinematicsConfig<T>,
}

impl<'a, T: Real> ForwardKinematics<'a, T> {
    /// Propagator for every link, in id order
    pub fn new(chain: &'a Chain<T>) -> Self {
        let link_ids = (0..chain.links().len()).collect::<Vec<_>>();
        Self::from_ids(chain, link_ids)
    }
    /// Propagator for `link_names`, results come in the same order
    ///
    /// It returns `LinkNotFoundError` for an unknown name.
    pub fn with_links<S: AsRef<str>>(chain: &'a Chain<T>, link_names: &[S]) -> Result<Self> {
        let link_ids = link_names
            .iter()
            .map(|name| chain.link_id(name.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_ids(chain, link_ids))
    }
    fn from_ids(chain: &'a Chain<T>, link_ids: Vec<usize>) -> Self {
        let mut needed = BTreeSet::new();
        needed.insert(0);
        for &id in &link_ids {
            needed.insert(id);
            for &j in chain.links()[id].ancestors() {
                needed.insert(chain.joints()[j].child());
            }
        }
        let pose_ids = needed.into_iter().collect::<Vec<_>>();
        trace!(
            "kinematics of {} links needs {} poses",
            link_ids.len(),
            pose_ids.len()
        );
        Self {
            chain,
            link_ids,
            pose_ids,
            config: *chain.config(),
        }
    }
    /// Replace the configuration inherited from the chain
    pub fn with_config(mut self, config: KinematicsConfig<T>) -> Self {
        self.config = config;
        self
    }
    pub fn chain(&self) -> &Chain<T> {
        self.chain
    }
    pub fn config(&self) -> &KinematicsConfig<T> {
        &self.config
    }
    /// Ids of the selected links
    pub fn link_ids(&self) -> &[usize] {
        &self.link_ids
    }

    fn check_angles(&self, angles: &DMatrix<T>) -> Result<()> {
        if angles.ncols() != self.chain.dof() {
            return Err(Error::AngleShapeError {
                rows: angles.nrows(),
                cols: angles.ncols(),
                required: self.chain.dof(),
            });
        }
        Ok(())
    }

    fn sample_poses(&self, angles: &DMatrix<T>, sample: usize) -> Vec<Option<RigidTransform<T>>> {
        let mut poses = vec![None; self.chain.links().len()];
        poses[0] = Some(RigidTransform::identity());
        for &id in &self.pose_ids[1..] {
            if let Some(j) = self.chain.links()[id].parent_joint() {
                let joint = &self.chain.joints()[j];
                let angle = if joint.is_movable() {
                    angles[(sample, joint.id())]
                } else {
                    T::zero()
                };
                if let Some(parent) = poses[joint.parent()] {
                    poses[id] = Some(parent.compose(&joint.relative_pose(angle), None, None));
                }
            }
        }
        poses
    }

    /// Spatial twists of the movable joints moving the selected links, by joint id
    ///
    /// The twist of joint `j` is its axis carried to the root frame through the pose of
    /// its child link, `Ad(g_child) ξ_j`.
    fn spatial_twists(&self, poses: &[Option<RigidTransform<T>>]) -> Vec<Option<TangentVector<T>>> {
        let mut twists = vec![None; self.chain.dof()];
        for &id in &self.pose_ids[1..] {
            let link = &self.chain.links()[id];
            if let (Some(j), Some(pose)) = (link.parent_joint(), poses[id]) {
                let joint = &self.chain.joints()[j];
                if joint.is_movable() {
                    twists[joint.id()] = Some(pose.adjoint() * joint.axis());
                }
            }
        }
        twists
    }

    /// Poses of the selected links and of their ancestors, kept for `gradient`
    pub fn forward_state(&self, angles: &DMatrix<T>) -> Result<KinematicsState<T>> {
        self.check_angles(angles)?;
        let poses = map_samples(&self.config, angles.nrows(), |sample| {
            self.sample_poses(angles, sample)
        });
        Ok(KinematicsState { poses })
    }

    /// Poses of the selected links in the root frame, `[link][sample]`
    ///
    /// It returns `AngleShapeError` unless `angles` has `dof` columns.
    pub fn forward(&self, angles: &DMatrix<T>) -> Result<Vec<PoseBatch<T>>> {
        let state = self.forward_state(angles)?;
        self.collect_poses(&state)
    }

    fn collect_poses(&self, state: &KinematicsState<T>) -> Result<Vec<PoseBatch<T>>> {
        self.link_ids
            .iter()
            .map(|&id| {
                state
                    .link_poses(id)
                    .ok_or_else(|| Error::StateMismatchError(self.chain.links()[id].name.clone()))
            })
            .collect()
    }

    /// Body Jacobians and poses of the selected links, both `[link][sample]`
    ///
    /// Column `j` of a Jacobian is zero unless joint `j` moves the link. A twist `δ = J δθ`
    /// perturbs the pose on the right, `g(θ + δθ) ≈ g(θ) exp(J δθ)`.
    pub fn jacobian(
        &self,
        angles: &DMatrix<T>,
    ) -> Result<(Vec<JacobianBatch<T>>, Vec<PoseBatch<T>>)> {
        let state = self.forward_state(angles)?;
        let dof = self.chain.dof();
        let batch_size = state.batch_size();
        let per_sample = map_samples(&self.config, batch_size, |sample| {
            let poses = &state.poses[sample];
            let twists = self.spatial_twists(poses);
            self.link_ids
                .iter()
                .map(|&id| {
                    let mut jacobian = Matrix6xX::zeros(dof);
                    if let Some(pose) = poses[id] {
                        let to_body = pose.inverse(None).adjoint();
                        for &j in self.chain.links()[id].angle_ids() {
                            if let Some(twist) = &twists[j] {
                                jacobian.set_column(j, &(to_body * twist));
                            }
                        }
                    }
                    jacobian
                })
                .collect::<Vec<_>>()
        });
        let mut jacobians = (0..self.link_ids.len())
            .map(|_| Vec::with_capacity(batch_size))
            .collect::<Vec<JacobianBatch<T>>>();
        for sample in per_sample {
            for (k, jacobian) in sample.into_iter().enumerate() {
                jacobians[k].push(jacobian);
            }
        }
        Ok((jacobians, self.collect_poses(&state)?))
    }

    /// Gradient of a scalar loss with respect to the joint angles, `N x dof`
    ///
    /// `upstream[k][n]` is the Euclidean gradient of the loss with respect to the 3x4 pose
    /// matrix of the k-th selected link in sample `n`. Contributions of all the selected
    /// links are summed, so a link selected twice counts twice.
    pub fn gradient(
        &self,
        state: &KinematicsState<T>,
        upstream: &[Vec<Matrix3x4<T>>],
    ) -> Result<DMatrix<T>> {
        if upstream.len() != self.link_ids.len() {
            return Err(Error::SizeMismatchError {
                input: upstream.len(),
                required: self.link_ids.len(),
            });
        }
        let batch_size = state.batch_size();
        if let Some(wrong) = upstream.iter().find(|g| g.len() != batch_size) {
            return Err(Error::SizeMismatchError {
                input: wrong.len(),
                required: batch_size,
            });
        }
        for sample in &state.poses {
            if let Some(&missing) = self
                .pose_ids
                .iter()
                .find(|&&id| sample.get(id).copied().flatten().is_none())
            {
                let name = self
                    .chain
                    .link(missing)
                    .map(|link| link.name.clone())
                    .unwrap_or_default();
                return Err(Error::StateMismatchError(name));
            }
        }

        let dof = self.chain.dof();
        let rows = map_samples(&self.config, batch_size, |sample| {
            let poses = &state.poses[sample];
            let twists = self.spatial_twists(poses);
            let mut gradient = DVector::zeros(dof);
            for (k, &id) in self.link_ids.iter().enumerate() {
                if let Some(pose) = poses[id] {
                    let pulled = pose.spatial_gradient(&upstream[k][sample]);
                    for &j in self.chain.links()[id].angle_ids() {
                        if let Some(twist) = &twists[j] {
                            gradient[j] += twist.dot(&pulled);
                        }
                    }
                }
            }
            gradient
        });
        let mut gradient = DMatrix::zeros(batch_size, dof);
        for (sample, row) in rows.iter().enumerate() {
            gradient.row_mut(sample).tr_copy_from(row);
        }
        Ok(gradient)
    }

    /// `forward_state` followed by `gradient`
    pub fn gradient_from_angles(
        &self,
        angles: &DMatrix<T>,
        upstream: &[Vec<Matrix3x4<T>>],
    ) -> Result<DMatrix<T>> {
        let state = self.forward_state(angles)?;
        self.gradient(&state, upstream)
    }
}
