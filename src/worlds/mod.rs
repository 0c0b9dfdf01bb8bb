//! The demo world catalog.
//!
//! Each world is a params struct with documented defaults plus a
//! [`World`](crate::lifecycle::World) implementation. Node ids created
//! during `build` are kept as explicit struct state so `animate` can
//! address the graph without any lookup by name.

mod cube;
mod lion_wall_cube;
mod responsive_cubes;
mod solar_system;
mod subdivided_spheres;
mod tank;

pub use cube::{CubeParams, CubeWorld};
pub use lion_wall_cube::{LionWallCubeParams, LionWallCubeWorld};
pub use responsive_cubes::{ResponsiveCubesParams, ResponsiveCubesWorld};
pub use solar_system::{SolarSystemParams, SolarSystemWorld};
pub use subdivided_spheres::{SubdividedSpheresParams, SubdividedSpheresWorld};
pub use tank::{TankParams, TankWorld};
