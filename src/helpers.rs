//! Debug line helpers that can be attached to any node.

use cgmath::Vector3;

use crate::{
    geometry::Geometry,
    material::{Color, Material},
    scene::{NodeId, Scene},
};

/// Axes plus a ground grid for one node, toggled together.
///
/// Hidden by default; orbit inspection turns them on per pivot.
pub struct AxisGridHelper {
    nodes: Vec<NodeId>,
    visible: bool,
}

impl AxisGridHelper {
    /// Attach axes (length 2) and a `units × units` grid to `target`.
    pub fn attach(scene: &mut Scene, target: NodeId, units: u32) -> Self {
        let mut nodes = Vec::with_capacity(4);

        let axes = [
            (Vector3::new(2.0, 0.0, 0.0), Color::from_hex(0xff0000)),
            (Vector3::new(0.0, 2.0, 0.0), Color::from_hex(0x00ff00)),
            (Vector3::new(0.0, 0.0, 2.0), Color::from_hex(0x0000ff)),
        ];
        for (tip, color) in axes {
            let geometry = scene.add_geometry(Geometry::polyline(&[
                Vector3::new(0.0, 0.0, 0.0),
                tip,
            ]));
            nodes.push(scene.add_mesh(target, geometry, Material::line(color)));
        }

        let geometry = scene.add_geometry(grid_lines(units));
        nodes.push(scene.add_mesh(target, geometry, Material::line(Color::from_hex(0x888888))));

        let mut helper = Self {
            nodes,
            visible: true,
        };
        helper.set_visible(scene, false);
        helper
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Show or hide axes and grid as one unit.
    pub fn set_visible(&mut self, scene: &mut Scene, visible: bool) {
        self.visible = visible;
        for &id in &self.nodes {
            scene.node_mut(id).visible = visible;
        }
    }
}

/// `units × units` cells of unit size, lying in the XZ plane.
fn grid_lines(units: u32) -> Geometry {
    let half = units as f32 / 2.0;
    let mut points = Vec::with_capacity(((units + 1) * 4) as usize);
    for i in 0..=units {
        let offset = i as f32 - half;
        points.push(Vector3::new(offset, 0.0, -half));
        points.push(Vector3::new(offset, 0.0, half));
        points.push(Vector3::new(-half, 0.0, offset));
        points.push(Vector3::new(half, 0.0, offset));
    }
    Geometry::line_segments(&points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helper_starts_hidden_and_toggles_jointly() {
        let mut scene = Scene::new();
        let pivot = scene.add_pivot(scene.root());
        let mut helper = AxisGridHelper::attach(&mut scene, pivot, 10);

        assert!(!helper.visible());
        assert_eq!(scene.node(pivot).children().len(), 4);
        for &child in scene.node(pivot).children() {
            assert!(!scene.node(child).visible);
        }

        helper.set_visible(&mut scene, true);
        for &child in scene.node(pivot).children() {
            assert!(scene.node(child).visible);
        }
    }

    #[test]
    fn grid_covers_both_directions() {
        let grid = grid_lines(4);
        // 5 lines each way, two points per line
        assert_eq!(grid.vertices.len(), 20);
    }
}
