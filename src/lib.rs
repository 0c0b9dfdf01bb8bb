//! scene-lab
//!
//! A catalog of animated 3D demo worlds on a retained-mode scene graph,
//! rendered with wgpu on native and WASM targets. Each world builds a fixed
//! graph of geometry, materials, lights and cameras once, then mutates
//! transforms as a pure function of elapsed time inside a mount / animate /
//! dispose lifecycle.
//!
//! High-level modules
//! - `lifecycle`: world runtime, frame scheduling and teardown
//! - `scene`: the node arena, transforms and world-transform propagation
//! - `geometry`, `material`, `light`, `helpers`: scene building blocks
//! - `camera`, `curve`, `clock`, `viewport`: animation and resize math
//! - `renderer`: the wgpu implementation of the render seam
//! - `worlds`: the six demo worlds
//! - `app`: winit window harness, `app::run(world)` entry point
//!

pub mod app;
pub mod assets;
pub mod camera;
pub mod clock;
pub mod curve;
pub mod geometry;
pub mod helpers;
pub mod lifecycle;
pub mod light;
pub mod material;
pub mod renderer;
pub mod scene;
pub mod viewport;
pub mod worlds;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::{Vector2, Vector3};
pub use lifecycle::{World, WorldRuntime};
pub use scene::{NodeId, Scene};
