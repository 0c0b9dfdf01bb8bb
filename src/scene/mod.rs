//! Retained scene-graph data model: transforms, nodes, and the scene arena.

pub mod graph;
pub mod transform;

pub use graph::{GeometryId, MeshInstance, Node, NodeId, NodeKind, Scene};
pub use transform::Transform;
