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
//! # Differentiable forward kinematics using [nalgebra](http://nalgebra.org).
//!
//! `kdiff` has below functionalities
//!
//! 1. SE(3) / SO(3) algebra with closed-form Jacobians
//! 1. Kinematic chain built from a topology description (or a URDF model)
//! 1. Batched forward kinematics, body Jacobians and joint-angle gradients
//!
//! See `Chain` and `ForwardKinematics` as the top level interface.
//!
//! # Examples
//!
//! ```
//! use kdiff::*;
//!
//! let description = ChainDescription::<f64>::new("arm")
//!     .links(["base", "upper", "lower"])
//!     .joint(JointDescription::new("shoulder", JointKind::RevoluteZ, "base", "upper"))
//!     .joint(
//!         JointDescription::new("elbow", JointKind::RevoluteY, "upper", "lower")
//!             .translation(Translation3::new(0.0, 0.0, 0.5)),
//!     );
//! let chain = Chain::from_description(&description).unwrap();
//! assert_eq!(chain.dof(), 2);
//!
//! // two configurations at once
//! let angles = DMatrix::from_row_slice(2, 2, &[0.0, 0.0, 0.3, -0.2]);
//! let fk = ForwardKinematics::with_links(&chain, &["lower"]).unwrap();
//! let poses = fk.forward(&angles).unwrap();
//! assert_eq!(poses[0].len(), 2);
//! assert!((poses[0][0].translation().z - 0.5).abs() < 1e-12);
//!
//! let (jacobians, _poses) = fk.jacobian(&angles).unwrap();
//! assert_eq!(jacobians[0][1].ncols(), 2);
//! ```
mod chain;
mod config;
mod errors;
mod funcs;
pub mod batch;
pub mod description;
pub mod joint;
pub mod kinematics;
pub mod link;
pub mod se3;
pub mod so3;
pub mod urdf;

pub use self::batch::PoseBatch;
pub use self::chain::*;
pub use self::config::*;
pub use self::description::{ChainDescription, JointDescription, JointKind};
pub use self::errors::*;
pub use self::funcs::*;
pub use self::joint::{Joint, JointType};
pub use self::kinematics::{ForwardKinematics, JacobianBatch, KinematicsState};
pub use self::link::Link;
pub use self::se3::{RigidTransform, TangentVector};

// re-export from nalgebra
pub use nalgebra::{
    DMatrix, DVector, Isometry3, Matrix3, Matrix3x4, Matrix4, Matrix6, Matrix6xX, RealField,
    Translation3, UnitQuaternion, Vector3, Vector6,
};
pub use simba::scalar::{SubsetOf, SupersetOf};

/// Scalar type used for every computation in this crate (`f32` or `f64`).
///
/// The precision of a chain and of all its evaluations is chosen by this type parameter.
pub trait Real: RealField + Copy + SubsetOf<f64> {}

impl<T> Real for T where T: RealField + Copy + SubsetOf<f64> {}
