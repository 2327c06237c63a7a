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
use std::fmt::{self, Display};

/// Rigid body of a `Chain`
///
/// All the indices refer to `Chain::links` and `Chain::joints`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub name: String,
    id: usize,
    parent_joint: Option<usize>,
    child_joints: Vec<usize>,
    ancestors: Vec<usize>,
    angle_ids: Vec<usize>,
}

impl Link {
    pub(crate) fn new(
        name: &str,
        id: usize,
        parent_joint: Option<usize>,
        child_joints: Vec<usize>,
    ) -> Self {
        Self {
            name: name.to_owned(),
            id,
            parent_joint,
            child_joints,
            ancestors: Vec::new(),
            angle_ids: Vec::new(),
        }
    }
    /// Index of this link. The root link is always 0.
    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }
    /// Joint connecting this link to its parent, `None` for the root
    #[inline]
    pub fn parent_joint(&self) -> Option<usize> {
        self.parent_joint
    }
    #[inline]
    pub fn child_joints(&self) -> &[usize] {
        &self.child_joints
    }
    /// Joints from the root down to this link, root side first, fixed joints included
    #[inline]
    pub fn ancestors(&self) -> &[usize] {
        &self.ancestors
    }
    /// Movable joints among `ancestors`, which are also the angle columns moving this link
    #[inline]
    pub fn angle_ids(&self) -> &[usize] {
        &self.angle_ids
    }
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent_joint.is_none()
    }
    pub(crate) fn set_lineage(&mut self, ancestors: Vec<usize>, angle_ids: Vec<usize>) {
        self.ancestors = ancestors;
        self.angle_ids = angle_ids;
    }
}

impl Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
