#![allow(dead_code)]

use kdiff::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

pub const ALL_KINDS: [JointKind; 9] = [
    JointKind::Fixed,
    JointKind::Revolute,
    JointKind::RevoluteX,
    JointKind::RevoluteY,
    JointKind::RevoluteZ,
    JointKind::Prismatic,
    JointKind::PrismaticX,
    JointKind::PrismaticY,
    JointKind::PrismaticZ,
];

pub fn random_origin(rng: &mut StdRng) -> Matrix3x4<f64> {
    *RigidTransform::randn(rng).matrix()
}

/// Tree of `num_links` links where every link hangs from a random earlier one
///
/// Joints are declared in shuffled order so that the declaration order differs from the
/// breadth first order.
pub fn random_tree(seed: u64, num_links: usize) -> ChainDescription<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let names = (0..num_links).map(|i| format!("link{i}")).collect::<Vec<_>>();
    let mut joints = (1..num_links)
        .map(|i| {
            let parent = rng.gen_range(0..i);
            let kind = ALL_KINDS[rng.gen_range(0..ALL_KINDS.len())];
            let mut joint = JointDescription::new(
                &format!("joint{i}"),
                kind,
                &names[parent],
                &names[i],
            )
            .origin(random_origin(&mut rng));
            if kind.needs_axis() {
                let axis = (0..3).map(|_| rng.gen_range(-1.0..1.0)).collect::<Vec<f64>>();
                joint = joint.axis(&axis);
            }
            joint
        })
        .collect::<Vec<_>>();
    for i in (1..joints.len()).rev() {
        let j = rng.gen_range(0..=i);
        joints.swap(i, j);
    }
    let description = ChainDescription::new("random").links(&names).root("link0");
    joints
        .into_iter()
        .fold(description, |description, joint| description.joint(joint))
}

pub fn random_angles(seed: u64, batch_size: usize, dof: usize) -> DMatrix<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    DMatrix::from_fn(batch_size, dof, |_, _| rng.gen_range(-2.0..2.0))
}

fn standalone_joint(description: &JointDescription<f64>) -> Joint<f64> {
    let origin = RigidTransform::try_from_matrix(description.origin, 1e-9).unwrap();
    let axis = description.axis.clone().unwrap_or_default();
    match description.kind {
        JointKind::Fixed => Joint::new(&description.name, JointType::Fixed, origin),
        JointKind::Revolute => Joint::revolute(&description.name, &axis, origin).unwrap(),
        JointKind::RevoluteX => Joint::new(&description.name, JointType::RevoluteX, origin),
        JointKind::RevoluteY => Joint::new(&description.name, JointType::RevoluteY, origin),
        JointKind::RevoluteZ => Joint::new(&description.name, JointType::RevoluteZ, origin),
        JointKind::Prismatic => Joint::prismatic(&description.name, &axis, origin).unwrap(),
        JointKind::PrismaticX => Joint::new(&description.name, JointType::PrismaticX, origin),
        JointKind::PrismaticY => Joint::new(&description.name, JointType::PrismaticY, origin),
        JointKind::PrismaticZ => Joint::new(&description.name, JointType::PrismaticZ, origin),
        kind => panic!("{kind} is not a single dof joint"),
    }
}

/// World poses by walking the description itself, without any folding
///
/// Angles are looked up by joint name through `chain`.
pub fn reference_poses(
    description: &ChainDescription<f64>,
    chain: &Chain<f64>,
    angles: &DMatrix<f64>,
    sample: usize,
) -> HashMap<String, RigidTransform<f64>> {
    let mut poses = HashMap::new();
    poses.insert(
        description.root.clone().unwrap_or_else(|| description.links[0].clone()),
        RigidTransform::identity(),
    );
    while poses.len() < description.links.len() {
        for joint in &description.joints {
            if poses.contains_key(&joint.child) {
                continue;
            }
            if let Some(parent) = poses.get(&joint.parent).copied() {
                let standalone = standalone_joint(joint);
                let angle = if standalone.is_movable() {
                    angles[(sample, chain.find_joint(&joint.name).unwrap().id())]
                } else {
                    0.0
                };
                poses.insert(
                    joint.child.clone(),
                    parent.compose(&standalone.relative_pose(angle), None, None),
                );
            }
        }
    }
    poses
}
