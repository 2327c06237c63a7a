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
use crate::batch::PoseBatch;
use crate::config::KinematicsConfig;
use crate::description::{ChainDescription, JointDescription, JointKind};
use crate::errors::*;
use crate::joint::{Joint, JointType};
use crate::kinematics::{ForwardKinematics, JacobianBatch};
use crate::link::Link;
use crate::se3::RigidTransform;
use crate::Real;
use log::{debug, trace, warn};
use na::DMatrix;
use nalgebra as na;
use std::collections::{HashMap, VecDeque};
use std::fmt::{self, Display};

/// Immutable kinematic tree with integer indexed links and joints
///
/// Movable joints have the ids `0..dof` in breadth first order from the root, which are also
/// the columns of the joint angle matrix. Fixed joints are folded away: their origin is merged
/// into the joints hanging below them, so every link is moved by movable joints only.
///
/// # Examples
///
/// ```
/// use kdiff::*;
///
/// let description = ChainDescription::<f64>::new("arm")
///     .links(["base", "upper", "hand"])
///     .joint(
///         JointDescription::new("pitch", JointKind::Revolute, "base", "upper")
///             .translation(Translation3::new(0.0, 0.0, 0.1))
///             .axis(&[0.0, 1.0, 0.0]),
///     )
///     .joint(
///         JointDescription::new("hand_fixed", JointKind::Fixed, "upper", "hand")
///             .translation(Translation3::new(0.0, 0.0, 0.5)),
///     );
/// let chain = Chain::from_description(&description).unwrap();
/// assert_eq!(chain.dof(), 1);
/// assert_eq!(chain.find_link("hand").unwrap().angle_ids(), &[0]);
///
/// let poses = chain.forward_kinematics(&DMatrix::zeros(1, 1)).unwrap();
/// assert_eq!(poses.len(), 3);
/// assert!((poses[2][0].translation().z - 0.6).abs() < 1e-12);
/// println!("{chain}");
/// ```
#[derive(Debug, Clone)]
pub struct Chain<T: Real> {
    name: String,
    links: Vec<Link>,
    joints: Vec<Joint<T>>,
    link_map: HashMap<String, usize>,
    joint_map: HashMap<String, usize>,
    dof: usize,
    config: KinematicsConfig<T>,
}

impl<T: Real> Chain<T> {
    fn fmt_with_indent_level(
        &self,
        link: &Link,
        level: usize,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        writeln!(f, "{}{}", "    ".repeat(level), link)?;
        for &j in link.child_joints() {
            let joint = &self.joints[j];
            writeln!(f, "{}{}", "    ".repeat(level + 1), joint)?;
            self.fmt_with_indent_level(&self.links[joint.child()], level + 2, f)?;
        }
        Ok(())
    }
}

impl<T: Real> Display for Chain<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_with_indent_level(&self.links[0], 0, f)
    }
}

impl<T: Real> Chain<T> {
    /// Build a chain with the default `KinematicsConfig`
    pub fn from_description(description: &ChainDescription<T>) -> Result<Self> {
        Self::from_description_with_config(description, KinematicsConfig::default())
    }
    /// Build a chain, validating every joint and the topology
    ///
    /// `config.orthonormality_tolerance` is used to validate the joint origins, and `config`
    /// is the default configuration of every `ForwardKinematics` of this chain.
    pub fn from_description_with_config(
        description: &ChainDescription<T>,
        config: KinematicsConfig<T>,
    ) -> Result<Self> {
        let chain = build(description, config)?;
        debug!(
            "chain {}: {} links, {} joints, dof = {}",
            chain.name,
            chain.links.len(),
            chain.joints.len(),
            chain.dof
        );
        Ok(chain)
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Number of movable joints, the width of the angle matrix
    #[inline]
    pub fn dof(&self) -> usize {
        self.dof
    }
    #[inline]
    pub fn config(&self) -> &KinematicsConfig<T> {
        &self.config
    }
    /// Links ordered by id, the root first
    #[inline]
    pub fn links(&self) -> &[Link] {
        &self.links
    }
    /// Joints ordered by id, the movable joints first
    #[inline]
    pub fn joints(&self) -> &[Joint<T>] {
        &self.joints
    }
    #[inline]
    pub fn root(&self) -> &Link {
        &self.links[0]
    }
    pub fn link(&self, id: usize) -> Option<&Link> {
        self.links.get(id)
    }
    pub fn joint(&self, id: usize) -> Option<&Joint<T>> {
        self.joints.get(id)
    }
    /// Find the link by name
    pub fn find_link(&self, name: &str) -> Option<&Link> {
        self.link_map.get(name).map(|&id| &self.links[id])
    }
    /// Find the joint by name
    pub fn find_joint(&self, name: &str) -> Option<&Joint<T>> {
        self.joint_map.get(name).map(|&id| &self.joints[id])
    }
    pub fn link_id(&self, name: &str) -> Result<usize> {
        self.link_map
            .get(name)
            .copied()
            .ok_or_else(|| Error::LinkNotFoundError(name.to_owned()))
    }
    pub fn joint_id(&self, name: &str) -> Result<usize> {
        self.joint_map
            .get(name)
            .copied()
            .ok_or_else(|| Error::JointNotFoundError(name.to_owned()))
    }
    /// Iterate over the movable joints, in angle column order
    pub fn iter_joints(&self) -> impl Iterator<Item = &Joint<T>> {
        self.joints[..self.dof].iter()
    }
    pub fn iter_links(&self) -> impl Iterator<Item = &Link> {
        self.links.iter()
    }
    /// Names of the movable joints, in angle column order
    pub fn joint_names(&self) -> Vec<String> {
        self.iter_joints().map(|joint| joint.name.clone()).collect()
    }
    pub fn link_names(&self) -> Vec<String> {
        self.iter_links().map(|link| link.name.clone()).collect()
    }
    /// Parent link of `link`, `None` for the root
    pub fn parent_link(&self, link: &Link) -> Option<&Link> {
        link.parent_joint()
            .map(|j| &self.links[self.joints[j].parent()])
    }

    /// Propagator for every link of this chain
    pub fn kinematics(&self) -> ForwardKinematics<'_, T> {
        ForwardKinematics::new(self)
    }
    /// Poses of every link in the root frame, `[link][sample]`
    pub fn forward_kinematics(&self, angles: &DMatrix<T>) -> Result<Vec<PoseBatch<T>>> {
        self.kinematics().forward(angles)
    }
    /// Body Jacobians and poses of every link, `[link][sample]`
    pub fn jacobians(
        &self,
        angles: &DMatrix<T>,
    ) -> Result<(Vec<JacobianBatch<T>>, Vec<PoseBatch<T>>)> {
        self.kinematics().jacobian(angles)
    }
}

fn lookup_link(link_index: &HashMap<&str, usize>, link: &str, joint: &str) -> Result<usize> {
    link_index.get(link).copied().ok_or_else(|| {
        Error::TopologyError(format!("joint \"{joint}\" refers to unknown link \"{link}\""))
    })
}

fn create_joint<T: Real>(
    description: &JointDescription<T>,
    origin: RigidTransform<T>,
) -> Result<Joint<T>> {
    let name = description.name.as_str();
    if description.axis.is_some() && !description.kind.needs_axis() {
        warn!(
            "joint {name}: axis is ignored for {} joints",
            description.kind
        );
    }
    let joint_type = match description.kind {
        JointKind::Fixed => JointType::Fixed,
        JointKind::RevoluteX => JointType::RevoluteX,
        JointKind::RevoluteY => JointType::RevoluteY,
        JointKind::RevoluteZ => JointType::RevoluteZ,
        JointKind::PrismaticX => JointType::PrismaticX,
        JointKind::PrismaticY => JointType::PrismaticY,
        JointKind::PrismaticZ => JointType::PrismaticZ,
        JointKind::Revolute | JointKind::Prismatic => {
            let axis = description.axis.as_deref().unwrap_or(&[]);
            return if description.kind == JointKind::Revolute {
                Joint::revolute(name, axis, origin)
            } else {
                Joint::prismatic(name, axis, origin)
            };
        }
        JointKind::Floating | JointKind::Planar | JointKind::Spherical => {
            return Err(Error::UnsupportedJointError {
                joint_name: name.to_owned(),
                joint_type: description.kind.to_string(),
            })
        }
    };
    Ok(Joint::new(name, joint_type, origin))
}

/// Moves the joints below every fixed joint up to the fixed joint's parent link
///
/// The fixed origin is prepended to their origins. Moved joints are appended to the
/// children being scanned, so chains of fixed joints collapse in one pass.
fn fold_fixed_joints<T: Real>(joints: &mut [Joint<T>], children: &mut [Vec<usize>]) {
    for link in 0..children.len() {
        let mut i = 0;
        while i < children[link].len() {
            let fixed = children[link][i];
            i += 1;
            if joints[fixed].is_movable() {
                continue;
            }
            let fixed_origin = *joints[fixed].origin();
            let subjoints = std::mem::take(&mut children[joints[fixed].child()]);
            for sub in subjoints {
                let origin = fixed_origin.compose(joints[sub].origin(), None, None);
                trace!(
                    "joint {} moves to link {} through fixed joint {}",
                    joints[sub].name,
                    link,
                    joints[fixed].name
                );
                joints[sub].set_origin(origin);
                joints[sub].set_parent(link);
                children[link].push(sub);
            }
        }
    }
}

fn build<T: Real>(
    description: &ChainDescription<T>,
    config: KinematicsConfig<T>,
) -> Result<Chain<T>> {
    let num_links = description.links.len();
    if num_links == 0 {
        return Err(Error::TopologyError(format!(
            "chain \"{}\" has no links",
            description.name
        )));
    }
    let mut link_index = HashMap::with_capacity(num_links);
    for (i, name) in description.links.iter().enumerate() {
        if link_index.insert(name.as_str(), i).is_some() {
            return Err(Error::TopologyError(format!("link \"{name}\" is declared twice")));
        }
    }

    let mut joint_index = HashMap::with_capacity(description.joints.len());
    let mut joints = Vec::with_capacity(description.joints.len());
    let mut parent_joint = vec![None; num_links];
    let mut children = vec![Vec::new(); num_links];
    for (i, joint_description) in description.joints.iter().enumerate() {
        let name = joint_description.name.as_str();
        if joint_index.insert(name, i).is_some() {
            return Err(Error::TopologyError(format!("joint \"{name}\" is declared twice")));
        }
        let parent = lookup_link(&link_index, &joint_description.parent, name)?;
        let child = lookup_link(&link_index, &joint_description.child, name)?;
        let origin = RigidTransform::try_from_matrix(
            joint_description.origin,
            config.orthonormality_tolerance,
        )
        .map_err(|err| match err {
            Error::InvalidTransformError { reason } => Error::InvalidTransformError {
                reason: format!("origin of joint \"{name}\": {reason}"),
            },
            other => other,
        })?;
        let mut joint = create_joint(joint_description, origin)?;
        joint.set_parent(parent);
        joint.set_child(child);
        if parent_joint[child].replace(i).is_some() {
            return Err(Error::TopologyError(format!(
                "link \"{}\" has more than one parent joint",
                joint_description.child
            )));
        }
        children[parent].push(i);
        joints.push(joint);
    }

    let root = match &description.root {
        Some(name) => {
            let root = link_index
                .get(name.as_str())
                .copied()
                .ok_or_else(|| {
                    Error::TopologyError(format!("root link \"{name}\" is not declared"))
                })?;
            if parent_joint[root].is_some() {
                return Err(Error::TopologyError(format!(
                    "root link \"{name}\" has a parent joint"
                )));
            }
            root
        }
        None => {
            let roots = (0..num_links)
                .filter(|&l| parent_joint[l].is_none())
                .collect::<Vec<_>>();
            match roots.as_slice() {
                [root] => *root,
                [] => {
                    return Err(Error::TopologyError(
                        "every link has a parent joint, the joints form a cycle".to_owned(),
                    ))
                }
                _ => {
                    let names = roots
                        .iter()
                        .map(|&l| description.links[l].as_str())
                        .collect::<Vec<_>>();
                    return Err(Error::TopologyError(format!(
                        "more than one root link: {}",
                        names.join(", ")
                    )));
                }
            }
        }
    };

    // every link must hang from the root
    let mut reached = vec![false; num_links];
    reached[root] = true;
    let mut queue = VecDeque::from([root]);
    while let Some(link) = queue.pop_front() {
        for &j in &children[link] {
            let child = joints[j].child();
            if !reached[child] {
                reached[child] = true;
                queue.push_back(child);
            }
        }
    }
    if let Some(lost) = reached.iter().position(|r| !r) {
        return Err(Error::TopologyError(format!(
            "link \"{}\" is not connected to root \"{}\"",
            description.links[lost], description.links[root]
        )));
    }

    fold_fixed_joints(&mut joints, &mut children);

    // breadth first over movable joints, then the fixed ones in declaration order
    let mut joint_order = Vec::with_capacity(joints.len());
    let mut link_order = Vec::with_capacity(num_links);
    link_order.push(root);
    let mut queue = children[root].iter().copied().collect::<VecDeque<_>>();
    while let Some(j) = queue.pop_front() {
        if !joints[j].is_movable() {
            continue;
        }
        joint_order.push(j);
        link_order.push(joints[j].child());
        queue.extend(children[joints[j].child()].iter().copied());
    }
    let dof = joint_order.len();
    for (j, joint) in joints.iter().enumerate() {
        if !joint.is_movable() {
            joint_order.push(j);
            link_order.push(joint.child());
        }
    }

    let mut new_joint_id = vec![0; joints.len()];
    for (id, &old) in joint_order.iter().enumerate() {
        new_joint_id[old] = id;
    }
    let mut new_link_id = vec![0; num_links];
    for (id, &old) in link_order.iter().enumerate() {
        new_link_id[old] = id;
    }

    let mut slots = joints.into_iter().map(Some).collect::<Vec<_>>();
    let mut ordered_joints = Vec::with_capacity(slots.len());
    for (id, &old) in joint_order.iter().enumerate() {
        if let Some(mut joint) = slots[old].take() {
            joint.set_id(id);
            joint.set_parent(new_link_id[joint.parent()]);
            joint.set_child(new_link_id[joint.child()]);
            ordered_joints.push(joint);
        }
    }

    let mut links = link_order
        .iter()
        .enumerate()
        .map(|(id, &old)| {
            let child_joints = children[old].iter().map(|&j| new_joint_id[j]).collect();
            Link::new(
                &description.links[old],
                id,
                parent_joint[old].map(|j| new_joint_id[j]),
                child_joints,
            )
        })
        .collect::<Vec<_>>();
    // parents always have smaller ids than their children
    for id in 1..links.len() {
        if let Some(j) = links[id].parent_joint() {
            let joint = &ordered_joints[j];
            let parent = &links[joint.parent()];
            let mut ancestors = parent.ancestors().to_vec();
            let mut angle_ids = parent.angle_ids().to_vec();
            ancestors.push(j);
            if joint.is_movable() {
                angle_ids.push(j);
            }
            links[id].set_lineage(ancestors, angle_ids);
        }
    }

    let link_map = links
        .iter()
        .map(|link| (link.name.clone(), link.id()))
        .collect();
    let joint_map = ordered_joints
        .iter()
        .map(|joint| (joint.name.clone(), joint.id()))
        .collect();
    Ok(Chain {
        name: description.name.clone(),
        links,
        joints: ordered_joints,
        link_map,
        joint_map,
        dof,
        config,
    })
}
