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
use super::joint_type::*;
use crate::batch::PoseBatch;
use crate::errors::*;
use crate::se3::{RigidTransform, TangentVector};
use crate::so3;
use crate::Real;
use na::{DMatrix, Unit, Vector3};
use nalgebra as na;
use std::fmt::{self, Display};

/// Joint with type
///
/// `id`, `parent` and `child` are indices into the owning `Chain`. They are assigned
/// while the chain is built and are zero for a joint which does not belong to a chain yet.
#[derive(Debug, Clone)]
pub struct Joint<T: Real> {
    /// Name of this joint
    pub name: String,
    /// Type of this joint
    pub joint_type: JointType<T>,
    id: usize,
    parent: usize,
    child: usize,
    /// pose of the joint frame in the parent link frame at angle zero
    origin: RigidTransform<T>,
    axis: TangentVector<T>,
}

fn normalized_axis<T: Real>(name: &str, axis: &[T]) -> Result<Unit<Vector3<T>>> {
    if axis.len() != 3 {
        return Err(Error::InvalidAxisError {
            joint_name: name.to_owned(),
            length: axis.len(),
        });
    }
    let vector = Vector3::from_column_slice(axis);
    Unit::try_new(vector, T::default_epsilon()).ok_or_else(|| Error::ZeroAxisError {
        joint_name: name.to_owned(),
    })
}

impl<T: Real> Joint<T> {
    /// Create new Joint with name, type and origin
    ///
    /// # Examples
    ///
    /// ```
    /// use kdiff::*;
    ///
    /// let fixed = Joint::<f32>::new("f0", JointType::Fixed, RigidTransform::identity());
    /// assert!(!fixed.is_movable());
    ///
    /// let rot = Joint::<f64>::new("r0", JointType::RevoluteY, RigidTransform::identity());
    /// assert_eq!(rot.dof(), 1);
    /// ```
    pub fn new(name: &str, joint_type: JointType<T>, origin: RigidTransform<T>) -> Joint<T> {
        Joint {
            name: name.to_string(),
            axis: joint_type.motion_axis(),
            joint_type,
            id: 0,
            parent: 0,
            child: 0,
            origin,
        }
    }
    /// Revolute joint around `axis`, which is normalized
    ///
    /// It returns Err if `axis` is not a non-zero 3-vector.
    ///
    /// # Examples
    ///
    /// ```
    /// use kdiff::*;
    ///
    /// let origin = RigidTransform::<f64>::identity();
    /// let joint = Joint::revolute("r0", &[0.0, 0.0, 2.0], origin).unwrap();
    /// assert_eq!(joint.axis(), &Vector6::new(0.0, 0.0, 0.0, 0.0, 0.0, 1.0));
    /// assert!(Joint::revolute("r1", &[0.0, 0.0, 0.0], origin).is_err());
    /// assert!(Joint::revolute("r2", &[1.0, 0.0], origin).is_err());
    /// ```
    pub fn revolute(name: &str, axis: &[T], origin: RigidTransform<T>) -> Result<Joint<T>> {
        let axis = normalized_axis(name, axis)?;
        Ok(Self::new(name, JointType::Revolute { axis }, origin))
    }
    /// Prismatic joint along `axis`, which is normalized
    pub fn prismatic(name: &str, axis: &[T], origin: RigidTransform<T>) -> Result<Joint<T>> {
        let axis = normalized_axis(name, axis)?;
        Ok(Self::new(name, JointType::Prismatic { axis }, origin))
    }

    /// Index of this joint in its chain. For movable joints it is also the angle column.
    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }
    /// Index of the parent link
    #[inline]
    pub fn parent(&self) -> usize {
        self.parent
    }
    /// Index of the child link
    #[inline]
    pub fn child(&self) -> usize {
        self.child
    }
    #[inline]
    pub fn origin(&self) -> &RigidTransform<T> {
        &self.origin
    }
    /// Unit twist of this joint, see `JointType::motion_axis`
    #[inline]
    pub fn axis(&self) -> &TangentVector<T> {
        &self.axis
    }
    #[inline]
    pub fn dof(&self) -> usize {
        self.joint_type.dof()
    }
    #[inline]
    pub fn is_movable(&self) -> bool {
        self.joint_type.is_movable()
    }

    #[inline]
    pub(crate) fn set_id(&mut self, id: usize) {
        self.id = id;
    }
    #[inline]
    pub(crate) fn set_parent(&mut self, parent: usize) {
        self.parent = parent;
    }
    #[inline]
    pub(crate) fn set_child(&mut self, child: usize) {
        self.child = child;
    }
    #[inline]
    pub(crate) fn set_origin(&mut self, origin: RigidTransform<T>) {
        self.origin = origin;
    }

    /// Pose of the child link in the parent link frame at `angle`
    ///
    /// The angle of a fixed joint is ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use kdiff::*;
    ///
    /// let origin = RigidTransform::from_translation(0.0, 0.0, 1.0);
    /// let lin = Joint::<f64>::new("l0", JointType::PrismaticX, origin);
    /// let pose = lin.relative_pose(-1.0);
    /// assert_eq!(pose.translation(), Vector3::new(-1.0, 0.0, 1.0));
    /// ```
    pub fn relative_pose(&self, angle: T) -> RigidTransform<T> {
        let origin = &self.origin;
        let rotated = |rotation: na::Matrix3<T>| {
            RigidTransform::from_parts_unchecked(
                &(origin.rotation() * rotation),
                &origin.translation(),
            )
        };
        let translated = |direction: Vector3<T>| {
            RigidTransform::from_parts_unchecked(
                &origin.rotation(),
                &(direction * angle + origin.translation()),
            )
        };
        match self.joint_type {
            JointType::Fixed => *origin,
            JointType::Revolute { axis } => rotated(so3::exp(&(axis.into_inner() * angle))),
            JointType::RevoluteX => rotated(so3::rotation_x(angle)),
            JointType::RevoluteY => rotated(so3::rotation_y(angle)),
            JointType::RevoluteZ => rotated(so3::rotation_z(angle)),
            JointType::Prismatic { axis } => translated(origin.transform_vector(&axis)),
            JointType::PrismaticX => translated(origin.matrix().column(0).into_owned()),
            JointType::PrismaticY => translated(origin.matrix().column(1).into_owned()),
            JointType::PrismaticZ => translated(origin.matrix().column(2).into_owned()),
        }
    }

    /// Batched `relative_pose` for an `N x 1` column of angles
    pub fn relative_poses(&self, angles: &DMatrix<T>) -> Result<PoseBatch<T>> {
        if angles.ncols() != 1 {
            return Err(Error::AngleShapeError {
                rows: angles.nrows(),
                cols: angles.ncols(),
                required: 1,
            });
        }
        Ok(angles.iter().map(|angle| self.relative_pose(*angle)).collect())
    }
}

impl<T: Real> Display for Joint<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.name, self.joint_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn origin() -> RigidTransform<f64> {
        RigidTransform::exp(
            &TangentVector::new(0.2, -0.1, 0.4, 0.3, -0.6, 0.9),
            None,
        )
    }

    #[test]
    fn principal_axes_match_generic_axes() {
        let cases = [
            (JointType::RevoluteX, JointType::Revolute { axis: Vector3::x_axis() }),
            (JointType::RevoluteY, JointType::Revolute { axis: Vector3::y_axis() }),
            (JointType::RevoluteZ, JointType::Revolute { axis: Vector3::z_axis() }),
            (JointType::PrismaticX, JointType::Prismatic { axis: Vector3::x_axis() }),
            (JointType::PrismaticY, JointType::Prismatic { axis: Vector3::y_axis() }),
            (JointType::PrismaticZ, JointType::Prismatic { axis: Vector3::z_axis() }),
        ];
        for (principal, generic) in cases {
            let principal = Joint::new("p", principal, origin());
            let generic = Joint::new("g", generic, origin());
            assert_eq!(principal.axis(), generic.axis());
            for angle in [-1.3, 0.0, 0.4, 2.9] {
                assert_relative_eq!(
                    principal.relative_pose(angle).matrix(),
                    generic.relative_pose(angle).matrix(),
                    epsilon = 1e-12
                );
            }
        }
    }

    #[test]
    fn relative_pose_follows_the_joint_twist() {
        // origin ∘ exp(θ ξ)
        for joint_type in [
            JointType::Revolute {
                axis: Unit::new_normalize(Vector3::new(1.0, 2.0, -0.5)),
            },
            JointType::Prismatic {
                axis: Unit::new_normalize(Vector3::new(-0.3, 0.2, 1.0)),
            },
        ] {
            let joint = Joint::new("j", joint_type, origin());
            let angle = 0.7;
            let motion = RigidTransform::exp(&(joint.axis() * angle), None);
            let expected = origin().compose(&motion, None, None);
            assert_relative_eq!(
                joint.relative_pose(angle).matrix(),
                expected.matrix(),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn fixed_joint_ignores_angle() {
        let joint = Joint::new("f", JointType::Fixed, origin());
        assert_eq!(joint.relative_pose(3.0), origin());
        assert_eq!(joint.axis(), &TangentVector::zeros());
    }

    #[test]
    fn relative_poses_checks_shape() {
        let joint = Joint::new("z", JointType::<f64>::RevoluteZ, RigidTransform::identity());
        let poses = joint
            .relative_poses(&DMatrix::from_column_slice(2, 1, &[0.0, FRAC_PI_2]))
            .unwrap();
        assert_eq!(poses.len(), 2);
        assert_relative_eq!(
            poses[1].transform_vector(&Vector3::x()),
            Vector3::y(),
            epsilon = 1e-12
        );
        assert!(matches!(
            joint.relative_poses(&DMatrix::zeros(2, 2)),
            Err(Error::AngleShapeError { required: 1, .. })
        ));
    }

    #[test]
    fn axis_errors() {
        let origin = RigidTransform::<f64>::identity();
        assert!(matches!(
            Joint::revolute("r", &[1.0, 0.0], origin),
            Err(Error::InvalidAxisError { length: 2, .. })
        ));
        let err = Joint::prismatic("p", &[0.0, 0.0, 0.0], origin).unwrap_err();
        assert!(matches!(&err, Error::ZeroAxisError { joint_name } if joint_name == "p"));
        assert!(err.to_string().contains("zero length"));
    }

    #[test]
    fn display() {
        let joint = Joint::new("elbow", JointType::<f64>::RevoluteY, RigidTransform::identity());
        assert_eq!(format!("{joint}"), "elbow [⚙+Y]");
    }
}
