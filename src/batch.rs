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
//! Batched SE(3) operations
//!
//! Binary operations broadcast a batch of length one against any other length.
use crate::config::KinematicsConfig;
use crate::errors::*;
use crate::se3::{self, RigidTransform, TangentVector};
use crate::Real;
use nalgebra::{Matrix3x4, Matrix6};
use rayon::prelude::*;

/// One transform per sample
pub type PoseBatch<T> = Vec<RigidTransform<T>>;

/// Evaluates `f` for every sample index, on the rayon pool if `config` asks for it
pub(crate) fn map_samples<T, R, F>(config: &KinematicsConfig<T>, batch_size: usize, f: F) -> Vec<R>
where
    T: Real,
    R: Send,
    F: Fn(usize) -> R + Sync + Send,
{
    if config.runs_parallel(batch_size) {
        (0..batch_size).into_par_iter().map(f).collect()
    } else {
        (0..batch_size).map(f).collect()
    }
}

fn broadcast_len(lhs: usize, rhs: usize) -> Result<usize> {
    match (lhs, rhs) {
        (l, r) if l == r => Ok(l),
        (1, r) => Ok(r),
        (l, 1) => Ok(l),
        (l, r) => Err(Error::SizeMismatchError {
            input: r,
            required: l,
        }),
    }
}

#[inline]
fn at<X>(batch: &[X], index: usize) -> &X {
    if batch.len() == 1 {
        &batch[0]
    } else {
        &batch[index]
    }
}

/// `lhs[i] ∘ rhs[i]`
///
/// # Examples
///
/// ```
/// use kdiff::{batch, KinematicsConfig, RigidTransform};
///
/// let config = KinematicsConfig::<f64>::default();
/// let shift = vec![RigidTransform::from_translation(1.0, 0.0, 0.0)];
/// let poses = vec![RigidTransform::identity(), RigidTransform::from_translation(0.0, 2.0, 0.0)];
/// let moved = batch::compose(&shift, &poses, &config).unwrap();
/// assert_eq!(moved[1].translation(), kdiff::Vector3::new(1.0, 2.0, 0.0));
///
/// let three = vec![RigidTransform::identity(); 3];
/// assert!(batch::compose(&poses, &three, &config).is_err());
/// ```
pub fn compose<T: Real>(
    lhs: &[RigidTransform<T>],
    rhs: &[RigidTransform<T>],
    config: &KinematicsConfig<T>,
) -> Result<PoseBatch<T>> {
    let len = broadcast_len(lhs.len(), rhs.len())?;
    Ok(map_samples(config, len, |i| {
        at(lhs, i).compose(at(rhs, i), None, None)
    }))
}

/// Same as `compose`, also returning the Jacobians with respect to both operands
pub fn compose_with_jacobians<T: Real>(
    lhs: &[RigidTransform<T>],
    rhs: &[RigidTransform<T>],
    config: &KinematicsConfig<T>,
) -> Result<(PoseBatch<T>, Vec<Matrix6<T>>, Vec<Matrix6<T>>)> {
    let len = broadcast_len(lhs.len(), rhs.len())?;
    let results = map_samples(config, len, |i| {
        let mut jacobian_lhs = Matrix6::zeros();
        let mut jacobian_rhs = Matrix6::zeros();
        let pose = at(lhs, i).compose(
            at(rhs, i),
            Some(&mut jacobian_lhs),
            Some(&mut jacobian_rhs),
        );
        (pose, jacobian_lhs, jacobian_rhs)
    });
    let mut poses = Vec::with_capacity(len);
    let mut jacobians_lhs = Vec::with_capacity(len);
    let mut jacobians_rhs = Vec::with_capacity(len);
    for (pose, jacobian_lhs, jacobian_rhs) in results {
        poses.push(pose);
        jacobians_lhs.push(jacobian_lhs);
        jacobians_rhs.push(jacobian_rhs);
    }
    Ok((poses, jacobians_lhs, jacobians_rhs))
}

pub fn inverse<T: Real>(poses: &[RigidTransform<T>], config: &KinematicsConfig<T>) -> PoseBatch<T> {
    map_samples(config, poses.len(), |i| poses[i].inverse(None))
}

pub fn exp<T: Real>(tangents: &[TangentVector<T>], config: &KinematicsConfig<T>) -> PoseBatch<T> {
    map_samples(config, tangents.len(), |i| {
        RigidTransform::exp(&tangents[i], None)
    })
}

pub fn log<T: Real>(
    poses: &[RigidTransform<T>],
    config: &KinematicsConfig<T>,
) -> Vec<TangentVector<T>> {
    map_samples(config, poses.len(), |i| poses[i].log(None))
}

/// `log(lhs[i]⁻¹ ∘ rhs[i])`
pub fn local<T: Real>(
    lhs: &[RigidTransform<T>],
    rhs: &[RigidTransform<T>],
    config: &KinematicsConfig<T>,
) -> Result<Vec<TangentVector<T>>> {
    let len = broadcast_len(lhs.len(), rhs.len())?;
    Ok(map_samples(config, len, |i| {
        at(lhs, i).local(at(rhs, i), None, None)
    }))
}

pub fn adjoint<T: Real>(
    poses: &[RigidTransform<T>],
    config: &KinematicsConfig<T>,
) -> Vec<Matrix6<T>> {
    map_samples(config, poses.len(), |i| poses[i].adjoint())
}

pub fn project<T: Real>(
    matrices: &[Matrix3x4<T>],
    config: &KinematicsConfig<T>,
) -> Vec<TangentVector<T>> {
    map_samples(config, matrices.len(), |i| se3::project(&matrices[i]))
}
