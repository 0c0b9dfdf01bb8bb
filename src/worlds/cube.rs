//! A single spinning cube, the smallest world in the catalog.

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

pub struct CubeParams {
    /// Edge length of the cube.
    pub cube_size: f32,
    /// Radians per second applied to both spin axes.
    pub rotation_speed: f32,
}

impl Default for CubeParams {
    fn default() -> Self {
        Self {
            cube_size: 1.0,
            rotation_speed: 1.0,
        }
    }
}

pub struct CubeWorld {
    params: CubeParams,
    cube: Option<NodeId>,
    camera: Option<NodeId>,
}

impl CubeWorld {
    pub fn new(params: CubeParams) -> Self {
        Self {
            params,
            cube: None,
            camera: None,
        }
    }
}

impl World for CubeWorld {
    fn build(&mut self, scene: &mut Scene) {
        let s = self.params.cube_size;
        let geometry = scene.add_geometry(Geometry::cuboid(s, s, s));
        self.cube = Some(scene.add_mesh(
            scene.root(),
            geometry,
            Material::phong(Color::from_hex(0x44aa88)),
        ));

        let light = scene.add_light(scene.root(), Light::directional(1.0));
        scene.transform_mut(light).position = Vector3::new(-1.0, 2.0, 4.0);

        let camera = scene.add_camera(
            scene.root(),
            PerspectiveCamera::with_default_aspect(75.0, 0.1, 5.0),
        );
        scene.transform_mut(camera).position = Vector3::new(0.0, 0.0, 2.0);
        self.camera = Some(camera);
    }

    fn animate(&mut self, scene: &mut Scene, seconds: f32) {
        let Some(cube) = self.cube else { return };
        let angle = clock::spin(seconds, self.params.rotation_speed);
        scene.transform_mut(cube).set_rotation_euler(angle, angle, 0.0);
    }

    fn active_camera(&self, _seconds: f32) -> NodeId {
        self.camera.unwrap_or(NodeId(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_bounds_follow_cube_size() {
        let mut world = CubeWorld::new(CubeParams {
            cube_size: 2.0,
            ..CubeParams::default()
        });
        let mut scene = Scene::new();
        world.build(&mut scene);

        let cube = world.cube.unwrap();
        let geometry = match &scene.node(cube).kind {
            crate::scene::NodeKind::Mesh(mesh) => scene.geometry(mesh.geometry),
            _ => panic!("not a mesh"),
        };
        assert_eq!(geometry.bounding_dimensions(), Vector3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn light_is_unit_intensity() {
        let mut world = CubeWorld::new(CubeParams::default());
        let mut scene = Scene::new();
        world.build(&mut scene);

        let intensities: Vec<f32> = scene
            .iter()
            .filter_map(|(_, node)| match &node.kind {
                crate::scene::NodeKind::Light(Light::Directional { intensity, .. }) => {
                    Some(*intensity)
                }
                _ => None,
            })
            .collect();
        assert_eq!(intensities, vec![1.0]);
    }

    #[test]
    fn both_spin_axes_track_elapsed_seconds() {
        let mut world = CubeWorld::new(CubeParams::default());
        let mut scene = Scene::new();
        world.build(&mut scene);
        world.animate(&mut scene, 1.5);

        let mut reference = crate::scene::Transform::new();
        reference.set_rotation_euler(1.5, 1.5, 0.0);
        let cube = world.cube.unwrap();
        assert_eq!(
            scene.node(cube).transform.rotation,
            reference.rotation,
            "same timestamp must yield bit-identical rotation"
        );
    }
}
