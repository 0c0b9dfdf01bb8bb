use scene_lab::worlds::{SubdividedSpheresParams, SubdividedSpheresWorld};

fn main() -> anyhow::Result<()> {
    scene_lab::app::run(SubdividedSpheresWorld::new(
        SubdividedSpheresParams::default(),
    ))
}
