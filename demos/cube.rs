use scene_lab::worlds::{CubeParams, CubeWorld};

fn main() -> anyhow::Result<()> {
    scene_lab::app::run(CubeWorld::new(CubeParams::default()))
}
