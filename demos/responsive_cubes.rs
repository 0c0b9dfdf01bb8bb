use scene_lab::worlds::{ResponsiveCubesParams, ResponsiveCubesWorld};

fn main() -> anyhow::Result<()> {
    scene_lab::app::run(ResponsiveCubesWorld::new(ResponsiveCubesParams::default()))
}
