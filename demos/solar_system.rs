use scene_lab::worlds::{SolarSystemParams, SolarSystemWorld};

fn main() -> anyhow::Result<()> {
    scene_lab::app::run(SolarSystemWorld::new(SolarSystemParams {
        show_helpers: std::env::args().any(|arg| arg == "--helpers"),
    }))
}
