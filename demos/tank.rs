use scene_lab::worlds::{TankParams, TankWorld};

fn main() -> anyhow::Result<()> {
    scene_lab::app::run(TankWorld::new(TankParams {
        toonify: std::env::args().any(|arg| arg == "--toon"),
    }))
}
