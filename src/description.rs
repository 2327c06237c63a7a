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
//! Plain description of a kinematic tree, the input of `Chain::from_description`
use crate::errors::*;
use crate::Real;
use na::{Isometry3, Matrix3x4, Translation3, UnitQuaternion};
use nalgebra as na;
use std::fmt::{self, Display};
use std::str::FromStr;

/// Joint type as written in a robot description
///
/// `Floating`, `Planar` and `Spherical` can be described, but a chain cannot be built from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointKind {
    Fixed,
    /// Revolute joint around the described axis (`continuous` in URDF)
    Revolute,
    RevoluteX,
    RevoluteY,
    RevoluteZ,
    Prismatic,
    PrismaticX,
    PrismaticY,
    PrismaticZ,
    Floating,
    Planar,
    Spherical,
}

impl JointKind {
    /// Degrees of freedom of the joint kind
    pub fn dof(&self) -> usize {
        match self {
            JointKind::Fixed => 0,
            JointKind::Floating => 6,
            JointKind::Planar => 3,
            JointKind::Spherical => 3,
            _ => 1,
        }
    }
    /// Generic kinds need an explicit axis
    pub fn needs_axis(&self) -> bool {
        matches!(self, JointKind::Revolute | JointKind::Prismatic)
    }
    pub fn as_str(&self) -> &'static str {
        match self {
            JointKind::Fixed => "fixed",
            JointKind::Revolute => "revolute",
            JointKind::RevoluteX => "revolute_x",
            JointKind::RevoluteY => "revolute_y",
            JointKind::RevoluteZ => "revolute_z",
            JointKind::Prismatic => "prismatic",
            JointKind::PrismaticX => "prismatic_x",
            JointKind::PrismaticY => "prismatic_y",
            JointKind::PrismaticZ => "prismatic_z",
            JointKind::Floating => "floating",
            JointKind::Planar => "planar",
            JointKind::Spherical => "spherical",
        }
    }
}

impl Display for JointKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for JointKind {
    type Err = Error;

    /// Case-insensitive, `-` and `_` are interchangeable
    ///
    /// # Examples
    ///
    /// ```
    /// use kdiff::JointKind;
    ///
    /// assert_eq!("continuous".parse::<JointKind>().unwrap(), JointKind::Revolute);
    /// assert_eq!("Revolute-X".parse::<JointKind>().unwrap(), JointKind::RevoluteX);
    /// assert!("ball".parse::<JointKind>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Ok(match normalized.as_str() {
            "fixed" => JointKind::Fixed,
            "revolute" | "continuous" => JointKind::Revolute,
            "revolute_x" => JointKind::RevoluteX,
            "revolute_y" => JointKind::RevoluteY,
            "revolute_z" => JointKind::RevoluteZ,
            "prismatic" => JointKind::Prismatic,
            "prismatic_x" => JointKind::PrismaticX,
            "prismatic_y" => JointKind::PrismaticY,
            "prismatic_z" => JointKind::PrismaticZ,
            "floating" => JointKind::Floating,
            "planar" => JointKind::Planar,
            "spherical" => JointKind::Spherical,
            _ => return Err(Error::UnknownJointTypeError(s.to_owned())),
        })
    }
}

/// One joint of a `ChainDescription`
///
/// # Examples
///
/// ```
/// use kdiff::*;
///
/// let joint = JointDescription::<f64>::new("wrist", JointKind::Revolute, "forearm", "hand")
///     .translation(Translation3::new(0.0, 0.0, 0.3))
///     .rotation(UnitQuaternion::from_euler_angles(0.0, 0.0, 1.57))
///     .axis(&[0.0, 1.0, 0.0]);
/// assert_eq!(joint.origin[(2, 3)], 0.3);
/// assert_eq!(joint.axis, Some(vec![0.0, 1.0, 0.0]));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct JointDescription<T: Real> {
    pub name: String,
    pub kind: JointKind,
    pub parent: String,
    pub child: String,
    /// `[R | t]`, pose of the joint frame in the parent link frame
    pub origin: Matrix3x4<T>,
    /// Required by `JointKind::Revolute` and `JointKind::Prismatic`
    pub axis: Option<Vec<T>>,
}

impl<T: Real> JointDescription<T> {
    pub fn new(name: &str, kind: JointKind, parent: &str, child: &str) -> Self {
        Self {
            name: name.to_owned(),
            kind,
            parent: parent.to_owned(),
            child: child.to_owned(),
            origin: Matrix3x4::identity(),
            axis: None,
        }
    }
    pub fn origin(mut self, origin: Matrix3x4<T>) -> Self {
        self.origin = origin;
        self
    }
    pub fn isometry(self, isometry: &Isometry3<T>) -> Self {
        self.translation(isometry.translation)
            .rotation(isometry.rotation)
    }
    /// Replaces the translation part of the origin
    pub fn translation(mut self, translation: Translation3<T>) -> Self {
        self.origin.set_column(3, &translation.vector);
        self
    }
    /// Replaces the rotation part of the origin
    pub fn rotation(mut self, rotation: UnitQuaternion<T>) -> Self {
        self.origin
            .fixed_view_mut::<3, 3>(0, 0)
            .copy_from(rotation.to_rotation_matrix().matrix());
        self
    }
    pub fn axis(mut self, axis: &[T]) -> Self {
        self.axis = Some(axis.to_vec());
        self
    }
}

/// Links and joints of a kinematic tree, by name
///
/// The root is the only link without a parent joint unless it is given explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainDescription<T: Real> {
    pub name: String,
    pub root: Option<String>,
    pub links: Vec<String>,
    pub joints: Vec<JointDescription<T>>,
}

impl<T: Real> ChainDescription<T> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            root: None,
            links: Vec::new(),
            joints: Vec::new(),
        }
    }
    pub fn root(mut self, root: &str) -> Self {
        self.root = Some(root.to_owned());
        self
    }
    pub fn link(mut self, name: &str) -> Self {
        self.links.push(name.to_owned());
        self
    }
    pub fn links<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.links
            .extend(names.into_iter().map(|name| name.as_ref().to_owned()));
        self
    }
    pub fn joint(mut self, joint: JointDescription<T>) -> Self {
        self.joints.push(joint);
        self
    }
}

#[test]
fn test_joint_kind_round_trip() {
    for kind in [
        JointKind::Fixed,
        JointKind::Revolute,
        JointKind::RevoluteX,
        JointKind::RevoluteY,
        JointKind::RevoluteZ,
        JointKind::Prismatic,
        JointKind::PrismaticX,
        JointKind::PrismaticY,
        JointKind::PrismaticZ,
        JointKind::Floating,
        JointKind::Planar,
        JointKind::Spherical,
    ] {
        assert_eq!(kind.to_string().parse::<JointKind>().unwrap(), kind);
    }
    assert!(matches!(
        "hinge".parse::<JointKind>(),
        Err(Error::UnknownJointTypeError(name)) if name == "hinge"
    ));
}

#[test]
fn test_description_builder() {
    let description = ChainDescription::<f32>::new("arm")
        .links(["a", "b"])
        .link("c")
        .root("a")
        .joint(JointDescription::new("j", JointKind::Fixed, "a", "b"));
    assert_eq!(description.links, vec!["a", "b", "c"]);
    assert_eq!(description.root.as_deref(), Some("a"));
    assert_eq!(description.joints[0].origin, Matrix3x4::identity());
    assert!(!description.joints[0].kind.needs_axis());
}
