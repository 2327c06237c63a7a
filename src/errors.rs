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
use thiserror::Error;

/// The reason of the failure of chain construction or of a kinematics call
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Generic revolute/prismatic joint declared with an axis which is not a 3-vector
    #[error("joint {joint_name}: axis must be a 3-vector, got {length} elements")]
    InvalidAxisError { joint_name: String, length: usize },
    #[error("joint {joint_name}: axis has zero length")]
    ZeroAxisError { joint_name: String },
    /// Rotation block is not orthonormal with determinant +1
    #[error("invalid rigid transform: {reason}")]
    InvalidTransformError { reason: String },
    #[error("unknown joint type \"{0}\"")]
    UnknownJointTypeError(String),
    #[error("joint {joint_name}: {joint_type} joints have several degrees of freedom")]
    UnsupportedJointError {
        joint_name: String,
        joint_type: String,
    },
    /// The links and joints do not form a single tree
    #[error("invalid topology: {0}")]
    TopologyError(String),
    #[error("size mismatch input = {input}, required = {required}")]
    SizeMismatchError { input: usize, required: usize },
    #[error("joint angles have shape {rows}x{cols}, but {required} columns are required")]
    AngleShapeError {
        rows: usize,
        cols: usize,
        required: usize,
    },
    #[error("link \"{0}\" not found")]
    LinkNotFoundError(String),
    #[error("joint \"{0}\" not found")]
    JointNotFoundError(String),
    /// A kinematics state which lacks a pose needed by the call
    #[error("kinematics state does not contain the pose of link \"{0}\"")]
    StateMismatchError(String),
    #[error("failed to load urdf: {0}")]
    UrdfError(#[from] urdf_rs::UrdfError),
}

impl Error {
    /// Returns true if this error was raised while building a joint, a transform or a chain.
    ///
    /// Other errors are raised by a single kinematics call and leave the chain usable.
    ///
    /// # Examples
    ///
    /// ```
    /// let err = kdiff::Error::TopologyError("cycle".to_owned());
    /// assert!(err.is_construction_error());
    /// let err = kdiff::Error::LinkNotFoundError("hand".to_owned());
    /// assert!(!err.is_construction_error());
    /// ```
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidAxisError { .. }
                | Error::ZeroAxisError { .. }
                | Error::InvalidTransformError { .. }
                | Error::UnknownJointTypeError(_)
                | Error::UnsupportedJointError { .. }
                | Error::TopologyError(_)
                | Error::UrdfError(_)
        )
    }
}

pub type Result<T> = ::std::result::Result<T, Error>;

#[test]
fn test_error_display() {
    let err = Error::SizeMismatchError {
        input: 3,
        required: 2,
    };
    assert_eq!(err.to_string(), "size mismatch input = 3, required = 2");
    assert!(!err.is_construction_error());

    let err = Error::UnsupportedJointError {
        joint_name: "base".to_owned(),
        joint_type: "floating".to_owned(),
    };
    assert!(err.to_string().contains("floating"));
    assert!(err.is_construction_error());

    let err = Error::ZeroAxisError {
        joint_name: "elbow".to_owned(),
    };
    assert_eq!(err.to_string(), "joint elbow: axis has zero length");
    assert!(err.is_construction_error());
}
