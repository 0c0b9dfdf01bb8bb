//! Three coarsely subdivided spheres with hard-edge outlines.
//!
//! Low segment counts plus flat shading make the facets obvious; a white
//! line child per sphere traces every edge between non-coplanar faces.

use cgmath::Vector3;

use crate::{
    camera::PerspectiveCamera,
    clock,
    geometry::Geometry,
    lifecycle::World,
    light::Light,
    material::{Color, Material},
    scene::{NodeId, Scene},
};

pub struct SubdividedSpheresParams {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    /// Horizontal distance between grid columns.
    pub spread: f32,
}

impl Default for SubdividedSpheresParams {
    fn default() -> Self {
        Self {
            radius: 7.0,
            width_segments: 12,
            height_segments: 8,
            spread: 15.0,
        }
    }
}

pub struct SubdividedSpheresWorld {
    params: SubdividedSpheresParams,
    spheres: Vec<NodeId>,
    camera: Option<NodeId>,
}

impl SubdividedSpheresWorld {
    pub fn new(params: SubdividedSpheresParams) -> Self {
        Self {
            params,
            spheres: Vec::new(),
            camera: None,
        }
    }
}

impl World for SubdividedSpheresWorld {
    fn build(&mut self, scene: &mut Scene) {
        scene.background = Some(Color::from_hex(0xaaaaaa));

        let p = &self.params;
        let sphere = Geometry::sphere(p.radius, p.width_segments, p.height_segments);
        let outline = scene.add_geometry(sphere.edges(1.0));
        let sphere = scene.add_geometry(sphere);

        for (index, column) in [-2.0f32, 0.0, 2.0].into_iter().enumerate() {
            let mut color = Color::WHITE;
            color.set_hsl(index as f32 / 3.0, 1.0, 0.5);
            let material = Material::Phong {
                color,
                emissive: Color::BLACK,
                flat_shading: true,
                double_sided: true,
            };

            let mesh = scene.add_mesh(scene.root(), sphere, material);
            scene.transform_mut(mesh).position = Vector3::new(column * p.spread, 0.0, 0.0);
            scene.add_mesh(mesh, outline, Material::line(Color::WHITE));
            self.spheres.push(mesh);
        }

        for position in [
            Vector3::new(-1.0, 2.0, 4.0),
            Vector3::new(1.0, -2.0, -4.0),
        ] {
            let light = scene.add_light(scene.root(), Light::directional(3.0));
            scene.transform_mut(light).position = position;
        }

        let camera = scene.add_camera(
            scene.root(),
            PerspectiveCamera::with_default_aspect(40.0, 0.1, 1000.0),
        );
        scene.transform_mut(camera).position = Vector3::new(0.0, 0.0, 120.0);
        self.camera = Some(camera);
    }

    fn animate(&mut self, scene: &mut Scene, seconds: f32) {
        for (index, &sphere) in self.spheres.iter().enumerate() {
            let speed = clock::indexed_speed(0.1, 0.05, index);
            let angle = clock::spin(seconds, speed);
            scene
                .transform_mut(sphere)
                .set_rotation_euler(angle, angle, 0.0);
        }
    }

    fn active_camera(&self, _seconds: f32) -> NodeId {
        self.camera.unwrap_or(NodeId(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::NodeKind;

    fn built() -> (SubdividedSpheresWorld, Scene) {
        let mut world = SubdividedSpheresWorld::new(SubdividedSpheresParams::default());
        let mut scene = Scene::new();
        world.build(&mut scene);
        (world, scene)
    }

    #[test]
    fn spheres_sit_one_spread_apart() {
        let (world, scene) = built();
        let xs: Vec<f32> = world
            .spheres
            .iter()
            .map(|&id| scene.node(id).transform.position.x)
            .collect();
        assert_eq!(xs, vec![-30.0, 0.0, 30.0]);
    }

    #[test]
    fn every_sphere_carries_an_outline_child() {
        let (world, scene) = built();
        for &sphere in &world.spheres {
            let children = scene.node(sphere).children();
            assert_eq!(children.len(), 1);
            match &scene.node(children[0]).kind {
                NodeKind::Mesh(mesh) => {
                    assert!(matches!(mesh.material, Material::Line { .. }))
                }
                _ => panic!("outline is not a mesh"),
            }
        }
    }

    #[test]
    fn hues_differ_per_sphere() {
        let (world, scene) = built();
        let colors: Vec<[f32; 3]> = world
            .spheres
            .iter()
            .map(|&id| match &scene.node(id).kind {
                NodeKind::Mesh(mesh) => mesh.material.color().to_array(),
                _ => panic!("not a mesh"),
            })
            .collect();
        assert_ne!(colors[0], colors[1]);
        assert_ne!(colors[1], colors[2]);
    }
}
