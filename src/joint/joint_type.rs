/*
  Copyright 2020 Takashi Ogura

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
use crate::se3::TangentVector;
use crate::Real;
use nalgebra::{Unit, Vector3};
use std::fmt::{self, Display};

/// Type of Joint, one degree of freedom at most
///
/// The `X`, `Y` and `Z` variants are fixed principal axes and use closed-form rotations.
#[derive(Copy, Debug, Clone, PartialEq)]
pub enum JointType<T: Real> {
    /// Fixed joint. It has no angle and no axis.
    Fixed,
    /// Rotational joint around an arbitrary axis. Its angle is in [rad].
    Revolute {
        /// axis of the joint
        axis: Unit<Vector3<T>>,
    },
    RevoluteX,
    RevoluteY,
    RevoluteZ,
    /// Linear joint along an arbitrary axis. Its angle is a length.
    Prismatic {
        /// axis of the joint
        axis: Unit<Vector3<T>>,
    },
    PrismaticX,
    PrismaticY,
    PrismaticZ,
}

impl<T: Real> JointType<T> {
    #[inline]
    pub fn is_movable(&self) -> bool {
        !matches!(self, JointType::Fixed)
    }
    #[inline]
    pub fn dof(&self) -> usize {
        usize::from(self.is_movable())
    }
    pub fn is_revolute(&self) -> bool {
        matches!(
            self,
            JointType::Revolute { .. }
                | JointType::RevoluteX
                | JointType::RevoluteY
                | JointType::RevoluteZ
        )
    }
    /// Direction of the joint motion in its own frame, `None` for fixed joints
    pub fn unit_axis(&self) -> Option<Unit<Vector3<T>>> {
        match self {
            JointType::Fixed => None,
            JointType::Revolute { axis } | JointType::Prismatic { axis } => Some(*axis),
            JointType::RevoluteX | JointType::PrismaticX => Some(Vector3::x_axis()),
            JointType::RevoluteY | JointType::PrismaticY => Some(Vector3::y_axis()),
            JointType::RevoluteZ | JointType::PrismaticZ => Some(Vector3::z_axis()),
        }
    }
    /// Unit twist generated by a unit change of the angle
    ///
    /// Prismatic axes fill the linear part `[0..3]`, revolute axes the angular part `[3..6]`.
    /// Fixed joints have the zero twist.
    ///
    /// # Examples
    ///
    /// ```
    /// use kdiff::{JointType, Vector6};
    ///
    /// assert_eq!(
    ///     JointType::<f64>::PrismaticX.motion_axis(),
    ///     Vector6::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0)
    /// );
    /// assert_eq!(
    ///     JointType::<f64>::RevoluteZ.motion_axis(),
    ///     Vector6::new(0.0, 0.0, 0.0, 0.0, 0.0, 1.0)
    /// );
    /// ```
    pub fn motion_axis(&self) -> TangentVector<T> {
        let mut twist = TangentVector::zeros();
        if let Some(axis) = self.unit_axis() {
            let offset = if self.is_revolute() { 3 } else { 0 };
            twist.fixed_rows_mut::<3>(offset).copy_from(&axis.into_inner());
        }
        twist
    }
}

fn axis_to_string<T: Real>(axis: &Unit<Vector3<T>>) -> &str {
    if *axis == Vector3::x_axis() {
        "+X"
    } else if *axis == Vector3::y_axis() {
        "+Y"
    } else if *axis == Vector3::z_axis() {
        "+Z"
    } else if *axis == -Vector3::x_axis() {
        "-X"
    } else if *axis == -Vector3::y_axis() {
        "-Y"
    } else if *axis == -Vector3::z_axis() {
        "-Z"
    } else {
        ""
    }
}

impl<T: Real> Display for JointType<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JointType::Fixed => write!(f, "[⚓]"),
            JointType::Revolute { axis } => write!(f, "[⚙{}]", axis_to_string(axis)),
            JointType::RevoluteX => write!(f, "[⚙+X]"),
            JointType::RevoluteY => write!(f, "[⚙+Y]"),
            JointType::RevoluteZ => write!(f, "[⚙+Z]"),
            JointType::Prismatic { axis } => write!(f, "[↕{}]", axis_to_string(axis)),
            JointType::PrismaticX => write!(f, "[↕+X]"),
            JointType::PrismaticY => write!(f, "[↕+Y]"),
            JointType::PrismaticZ => write!(f, "[↕+Z]"),
        }
    }
}

#[test]
fn test_display_joint_type() {
    let revolute = JointType::<f64>::Revolute {
        axis: -Vector3::y_axis(),
    };
    assert_eq!(format!("{revolute}"), "[⚙-Y]");
    assert_eq!(format!("{}", JointType::<f32>::PrismaticZ), "[↕+Z]");
    assert_eq!(format!("{}", JointType::<f32>::Fixed), "[⚓]");
}

#[test]
fn test_motion_axis_layout() {
    let prismatic = JointType::<f64>::Prismatic {
        axis: Unit::new_normalize(Vector3::new(0.0, 3.0, 4.0)),
    };
    let twist = prismatic.motion_axis();
    assert!((twist[1] - 0.6).abs() < 1e-12);
    assert!((twist[2] - 0.8).abs() < 1e-12);
    assert_eq!(twist.fixed_rows::<3>(3).norm(), 0.0);
    assert_eq!(JointType::<f64>::Fixed.motion_axis(), TangentVector::zeros());
    assert_eq!(JointType::<f64>::Fixed.dof(), 0);
    assert_eq!(JointType::<f64>::RevoluteY.dof(), 1);
}
