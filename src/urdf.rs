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
//! Load URDF(Unified Robot Description Format) as a `ChainDescription` or a `Chain`
//!
//! # Examples
//!
//! ```
//! let chain = kdiff::urdf::chain_from_file::<f64, _>("urdf/sample.urdf").unwrap();
//! assert_eq!(chain.dof(), 5);
//! ```
use crate::chain::Chain;
use crate::description::{ChainDescription, JointDescription, JointKind};
use crate::errors::*;
use crate::Real;
use log::{info, warn};
use nalgebra as na;
use std::path::Path;

fn vector_from<T: Real>(xyz: &[f64]) -> Vec<T> {
    xyz.iter().map(|v| na::convert(*v)).collect()
}

fn quaternion_from<T: Real>(rpy: &[f64]) -> na::UnitQuaternion<T> {
    na::UnitQuaternion::from_euler_angles(
        na::convert(rpy[0]),
        na::convert(rpy[1]),
        na::convert(rpy[2]),
    )
}

fn translation_from<T: Real>(xyz: &[f64]) -> na::Translation3<T> {
    na::Translation3::new(na::convert(xyz[0]), na::convert(xyz[1]), na::convert(xyz[2]))
}

/// `+X`, `+Y` and `+Z` axes become the closed-form principal joint kinds
fn kind_with_axis(generic: JointKind, axis: &[f64]) -> JointKind {
    let principal = match axis {
        [x, y, z] if *x == 1.0 && *y == 0.0 && *z == 0.0 => 0,
        [x, y, z] if *x == 0.0 && *y == 1.0 && *z == 0.0 => 1,
        [x, y, z] if *x == 0.0 && *y == 0.0 && *z == 1.0 => 2,
        _ => return generic,
    };
    match (generic, principal) {
        (JointKind::Revolute, 0) => JointKind::RevoluteX,
        (JointKind::Revolute, 1) => JointKind::RevoluteY,
        (JointKind::Revolute, 2) => JointKind::RevoluteZ,
        (JointKind::Prismatic, 0) => JointKind::PrismaticX,
        (JointKind::Prismatic, 1) => JointKind::PrismaticY,
        (JointKind::Prismatic, 2) => JointKind::PrismaticZ,
        (kind, _) => kind,
    }
}

impl<'a, T: Real> From<&'a urdf_rs::Joint> for JointDescription<T> {
    fn from(joint: &urdf_rs::Joint) -> JointDescription<T> {
        let axis = &joint.axis.xyz[..];
        let generic = match joint.joint_type {
            urdf_rs::JointType::Revolute | urdf_rs::JointType::Continuous => JointKind::Revolute,
            urdf_rs::JointType::Prismatic => JointKind::Prismatic,
            urdf_rs::JointType::Fixed => JointKind::Fixed,
            urdf_rs::JointType::Floating => JointKind::Floating,
            urdf_rs::JointType::Planar => JointKind::Planar,
            urdf_rs::JointType::Spherical => JointKind::Spherical,
        };
        let kind = kind_with_axis(generic, axis);
        let description = JointDescription::new(
            &joint.name,
            kind,
            &joint.parent.link,
            &joint.child.link,
        )
        .rotation(quaternion_from(&joint.origin.rpy[..]))
        .translation(translation_from(&joint.origin.xyz[..]));
        if kind.needs_axis() {
            description.axis(&vector_from::<T>(axis))
        } else {
            description
        }
    }
}

impl<'a, T: Real> From<&'a urdf_rs::Robot> for ChainDescription<T> {
    fn from(robot: &urdf_rs::Robot) -> ChainDescription<T> {
        let description = ChainDescription::new(&robot.name)
            .links(robot.links.iter().map(|link| link.name.as_str()));
        robot.joints.iter().fold(description, |description, joint| {
            description.joint(JointDescription::from(joint))
        })
    }
}

/// Build a `Chain` from `urdf_rs::Robot`
///
/// Floating, planar and spherical joints are rejected with `UnsupportedJointError`.
pub fn chain_from_robot<T: Real>(robot: &urdf_rs::Robot) -> Result<Chain<T>> {
    let description = ChainDescription::from(robot);
    let unsupported = description
        .joints
        .iter()
        .filter(|joint| joint.kind.dof() > 1)
        .count();
    if unsupported > 0 {
        warn!("{}: {} joints of type floating, planar or spherical", robot.name, unsupported);
    }
    let chain = Chain::from_description(&description)?;
    info!("loaded {} with dof {}", robot.name, chain.dof());
    Ok(chain)
}

/// Build a `Chain` from a URDF file
///
/// # Examples
///
/// ```
/// let chain = kdiff::urdf::chain_from_file::<f32, _>("urdf/sample.urdf").unwrap();
/// assert_eq!(chain.links().len(), 9);
/// assert_eq!(
///     chain.joint_names(),
///     vec!["shoulder_yaw", "slider", "shoulder_pitch", "elbow", "wrist"]
/// );
/// ```
pub fn chain_from_file<T, P>(path: P) -> Result<Chain<T>>
where
    T: Real,
    P: AsRef<Path>,
{
    chain_from_robot(&urdf_rs::read_file(path)?)
}

/// Build a `Chain` from the text of a URDF document
pub fn chain_from_str<T: Real>(urdf: &str) -> Result<Chain<T>> {
    chain_from_robot(&urdf_rs::read_from_string(urdf)?)
}

#[test]
fn test_description_from_robot() {
    let robo = urdf_rs::read_file("urdf/sample.urdf").unwrap();
    assert_eq!(robo.name, "robo");
    let description = ChainDescription::<f64>::from(&robo);
    assert_eq!(description.links.len(), 9);
    assert_eq!(description.joints.len(), 8);
    let kinds = description
        .joints
        .iter()
        .map(|joint| joint.kind)
        .collect::<Vec<_>>();
    assert_eq!(
        kinds,
        vec![
            JointKind::Fixed,
            JointKind::RevoluteZ,
            JointKind::RevoluteY,
            JointKind::Revolute,
            JointKind::Fixed,
            JointKind::RevoluteX,
            JointKind::Fixed,
            JointKind::Prismatic,
        ]
    );
    assert_eq!(description.joints[3].axis, Some(vec![0.0, 0.6, 0.8]));
    assert_eq!(description.joints[0].origin[(2, 3)], 0.1);
}

#[test]
fn test_chain_from_file() {
    let chain = chain_from_file::<f64, _>("urdf/sample.urdf").unwrap();
    assert_eq!(chain.dof(), 5);
    // fixed joints moved their children up to the nearest movable ancestor
    let wrist = chain.find_joint("wrist").unwrap();
    assert_eq!(chain.links()[wrist.parent()].name, "forearm");
    assert!((wrist.origin().translation() - na::Vector3::new(0.0, 0.05, 0.3)).norm() < 1e-12);
    let yaw = chain.find_joint("shoulder_yaw").unwrap();
    assert_eq!(chain.links()[yaw.parent()].name, "root");
    assert!((yaw.origin().translation().z - 0.3).abs() < 1e-12);
}

#[test]
fn test_unsupported_joint() {
    let urdf = r#"
        <robot name="free">
          <link name="world"/>
          <link name="base"/>
          <joint name="float" type="floating">
            <parent link="world"/>
            <child link="base"/>
          </joint>
        </robot>
    "#;
    assert!(matches!(
        chain_from_str::<f64>(urdf),
        Err(Error::UnsupportedJointError { joint_name, .. }) if joint_name == "float"
    ));
    assert!(matches!(
        chain_from_str::<f64>("<robot"),
        Err(Error::UrdfError(_))
    ));
}
