use scene_lab::worlds::{LionWallCubeParams, LionWallCubeWorld};

fn main() -> anyhow::Result<()> {
    scene_lab::app::run(LionWallCubeWorld::new(LionWallCubeParams::default()))
}
