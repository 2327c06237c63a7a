use kdiff::*;

fn main() {
    let description = ChainDescription::<f64>::new("tree0")
        .links(["link0", "link1", "hand", "link2"])
        .joint(
            JointDescription::new("link_pitch0", JointKind::RevoluteY, "link0", "link1")
                .translation(Translation3::new(0.0, 0.0, 0.1)),
        )
        .joint(
            JointDescription::new("fixed", JointKind::Fixed, "link1", "hand")
                .translation(Translation3::new(0.0, 0.0, 0.5)),
        )
        .joint(
            JointDescription::new("link_pitch2", JointKind::RevoluteY, "link0", "link2")
                .translation(Translation3::new(0.0, 0.0, 0.5)),
        );
    let tree = Chain::from_description(&description).unwrap();
    println!("{tree}");
}
