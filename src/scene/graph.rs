//! The retained scene graph.
//!
//! Nodes live in an id-indexed arena and form a strict hierarchy: every node
//! is created under an existing parent, so parent indices are always smaller
//! than child indices and world-transform propagation is a single forward
//! pass over the arena. One [`Scene`] exists per mounted world and is rebuilt
//! from scratch on every mount.

use cgmath::{InnerSpace, Matrix3, Quaternion, Rotation, Vector3};

use crate::{
    camera::PerspectiveCamera,
    geometry::Geometry,
    light::Light,
    material::{Color, Material},
    scene::transform::Transform,
};

/// Handle to a node in a [`Scene`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Handle to a geometry in the scene's shared geometry table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GeometryId(pub(crate) usize);

impl GeometryId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Mesh payload of a node: shared geometry plus this node's own material.
#[derive(Clone, Debug)]
pub struct MeshInstance {
    pub geometry: GeometryId,
    pub material: Material,
    pub cast_shadow: bool,
}

#[derive(Clone, Debug)]
pub enum NodeKind {
    /// Invisible transform anchor (orbit and rotation pivots).
    Pivot,
    Mesh(MeshInstance),
    Camera(PerspectiveCamera),
    Light(Light),
}

#[derive(Clone, Debug)]
pub struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    pub transform: Transform,
    world_transform: Transform,
    pub visible: bool,
    pub kind: NodeKind,
}

impl Node {
    /// World transform as of the last propagation pass.
    pub fn world_transform(&self) -> &Transform {
        &self.world_transform
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Root container of one world's node hierarchy.
pub struct Scene {
    nodes: Vec<Node>,
    geometries: Vec<Geometry>,
    pub background: Option<Color>,
}

impl Scene {
    pub fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            transform: Transform::new(),
            world_transform: Transform::new(),
            visible: true,
            kind: NodeKind::Pivot,
        };
        Self {
            nodes: vec![root],
            geometries: Vec::new(),
            background: None,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryId {
        self.geometries.push(geometry);
        GeometryId(self.geometries.len() - 1)
    }

    pub fn geometry(&self, id: GeometryId) -> &Geometry {
        &self.geometries[id.0]
    }

    fn add_node(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            transform: Transform::new(),
            world_transform: Transform::new(),
            visible: true,
            kind,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn add_pivot(&mut self, parent: NodeId) -> NodeId {
        self.add_node(parent, NodeKind::Pivot)
    }

    pub fn add_mesh(&mut self, parent: NodeId, geometry: GeometryId, material: Material) -> NodeId {
        self.add_node(
            parent,
            NodeKind::Mesh(MeshInstance {
                geometry,
                material,
                cast_shadow: false,
            }),
        )
    }

    pub fn add_camera(&mut self, parent: NodeId, camera: PerspectiveCamera) -> NodeId {
        self.add_node(parent, NodeKind::Camera(camera))
    }

    pub fn add_light(&mut self, parent: NodeId, light: Light) -> NodeId {
        self.add_node(parent, NodeKind::Light(light))
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn transform_mut(&mut self, id: NodeId) -> &mut Transform {
        &mut self.nodes[id.0].transform
    }

    /// All nodes in creation order (parents before children).
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Ids of every camera node in the scene.
    pub fn camera_nodes(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, n)| matches!(n.kind, NodeKind::Camera(_)))
            .map(|(id, _)| id)
            .collect()
    }

    pub fn camera(&self, id: NodeId) -> Option<&PerspectiveCamera> {
        match &self.nodes[id.0].kind {
            NodeKind::Camera(cam) => Some(cam),
            _ => None,
        }
    }

    pub fn camera_mut(&mut self, id: NodeId) -> Option<&mut PerspectiveCamera> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Camera(cam) => Some(cam),
            _ => None,
        }
    }

    pub fn mesh_mut(&mut self, id: NodeId) -> Option<&mut MeshInstance> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn material_mut(&mut self, id: NodeId) -> Option<&mut Material> {
        self.mesh_mut(id).map(|m| &mut m.material)
    }

    /// Recompute the cached world transform of every node.
    ///
    /// Parents always precede children in the arena, so one forward pass
    /// composes the whole hierarchy.
    pub fn update_world_transforms(&mut self) {
        for i in 0..self.nodes.len() {
            match self.nodes[i].parent {
                None => self.nodes[i].world_transform = self.nodes[i].transform.clone(),
                Some(parent) => {
                    let composed = &self.nodes[parent.0].world_transform * &self.nodes[i].transform;
                    self.nodes[i].world_transform = composed;
                }
            }
        }
    }

    /// Copy a node's cached world position into a caller-owned scratch vector.
    pub fn world_position(&self, id: NodeId, out: &mut Vector3<f32>) {
        *out = self.nodes[id.0].world_transform.position;
    }

    /// Compose a node's world transform from its current locals, ignoring the
    /// cache. Used by `look_at`, which must see positions set earlier in the
    /// same frame.
    fn compose_world(&self, id: NodeId) -> Transform {
        let mut chain = vec![id];
        let mut cursor = id;
        while let Some(parent) = self.nodes[cursor.0].parent {
            chain.push(parent);
            cursor = parent;
        }
        let mut world = Transform::new();
        for link in chain.into_iter().rev() {
            world = &world * &self.nodes[link.0].transform;
        }
        world
    }

    /// Rotate a node so it faces a point in world space, with +Y up.
    ///
    /// Mesh and pivot nodes face the target with their local +Z axis;
    /// cameras look down their local -Z axis.
    pub fn look_at(&mut self, id: NodeId, target: Vector3<f32>) {
        self.look_at_with_up(id, target, Vector3::new(0.0, 1.0, 0.0));
    }

    pub fn look_at_with_up(&mut self, id: NodeId, target: Vector3<f32>, up: Vector3<f32>) {
        let parent_world = match self.nodes[id.0].parent {
            Some(parent) => self.compose_world(parent),
            None => Transform::new(),
        };
        let world = &parent_world * &self.nodes[id.0].transform;
        let eye = world.position;

        let is_camera = matches!(self.nodes[id.0].kind, NodeKind::Camera(_));
        let mut z = if is_camera { eye - target } else { target - eye };
        if z.magnitude2() < 1e-12 {
            z = Vector3::new(0.0, 0.0, 1.0);
        }
        let mut z = z.normalize();
        let mut x = up.cross(z);
        if x.magnitude2() < 1e-12 {
            // up parallel to the view direction; nudge z to break the tie
            z.z += 1e-4;
            z = z.normalize();
            x = up.cross(z);
        }
        let x = x.normalize();
        let y = z.cross(x);

        let world_rotation: Quaternion<f32> = Matrix3::from_cols(x, y, z).into();
        let parent_rotation = parent_world.rotation;
        self.nodes[id.0].transform.rotation = parent_rotation.invert() * world_rotation;
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use cgmath::{Deg, Quaternion, Rotation3, Vector3};

    use super::*;

    fn unit_sphere(scene: &mut Scene) -> GeometryId {
        scene.add_geometry(Geometry::sphere(1.0, 6, 6))
    }

    #[test]
    fn orbit_pivot_carries_children() {
        // earth orbits the sun: pivot at the origin, mesh offset on x
        let mut scene = Scene::new();
        let geometry = unit_sphere(&mut scene);
        let orbit = scene.add_pivot(scene.root());
        let earth = scene.add_mesh(orbit, geometry, Material::phong(Color::from_hex(0x2233ff)));
        scene.transform_mut(earth).position.x = 10.0;

        scene.transform_mut(orbit).rotation = Quaternion::from_angle_y(Deg(180.0));
        scene.update_world_transforms();

        let mut pos = Vector3::new(0.0, 0.0, 0.0);
        scene.world_position(earth, &mut pos);
        assert_relative_eq!(pos.x, -10.0, epsilon = 1e-4);
    }

    #[test]
    fn nested_pivots_compose_offsets() {
        let mut scene = Scene::new();
        let geometry = unit_sphere(&mut scene);
        let earth_orbit = scene.add_pivot(scene.root());
        scene.transform_mut(earth_orbit).position.x = 10.0;
        let moon_orbit = scene.add_pivot(earth_orbit);
        scene.transform_mut(moon_orbit).position.x = 2.0;
        let moon = scene.add_mesh(
            moon_orbit,
            geometry,
            Material::phong(Color::from_hex(0x888888)),
        );

        scene.update_world_transforms();
        let mut pos = Vector3::new(0.0, 0.0, 0.0);
        scene.world_position(moon, &mut pos);
        assert_relative_eq!(pos, Vector3::new(12.0, 0.0, 0.0));
    }

    #[test]
    fn object_look_at_points_positive_z() {
        let mut scene = Scene::new();
        let pivot = scene.add_pivot(scene.root());
        scene.look_at(pivot, Vector3::new(5.0, 0.0, 0.0));
        let forward = scene.node(pivot).transform.rotation * Vector3::new(0.0, 0.0, 1.0);
        assert_relative_eq!(forward, Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn camera_look_at_points_negative_z() {
        let mut scene = Scene::new();
        let camera = scene.add_camera(scene.root(), PerspectiveCamera::new(40.0, 2.0, 0.1, 1000.0));
        scene.transform_mut(camera).position = Vector3::new(0.0, 0.0, 10.0);
        scene.look_at(camera, Vector3::new(0.0, 0.0, 0.0));
        let forward = scene.node(camera).transform.rotation * Vector3::new(0.0, 0.0, -1.0);
        assert_relative_eq!(forward, Vector3::new(0.0, 0.0, -1.0), epsilon = 1e-5);
    }

    #[test]
    fn look_at_tolerates_parallel_up() {
        // solar system camera: straight down with +Z up would degenerate with a +Y up
        let mut scene = Scene::new();
        let camera = scene.add_camera(scene.root(), PerspectiveCamera::new(40.0, 2.0, 0.1, 1000.0));
        scene.transform_mut(camera).position = Vector3::new(0.0, 50.0, 0.0);
        scene.look_at_with_up(camera, Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0));
        let forward = scene.node(camera).transform.rotation * Vector3::new(0.0, 0.0, -1.0);
        assert_relative_eq!(forward, Vector3::new(0.0, -1.0, 0.0), epsilon = 1e-4);
    }

    #[test]
    fn look_at_accounts_for_parent_rotation() {
        let mut scene = Scene::new();
        let parent = scene.add_pivot(scene.root());
        scene.transform_mut(parent).rotation = Quaternion::from_angle_y(Deg(90.0));
        let child = scene.add_pivot(parent);
        scene.look_at(child, Vector3::new(0.0, 0.0, 5.0));
        scene.update_world_transforms();
        let world_forward =
            scene.node(child).world_transform().rotation * Vector3::new(0.0, 0.0, 1.0);
        assert_relative_eq!(world_forward, Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-5);
    }
}
