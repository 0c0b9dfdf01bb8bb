//! Three cubes sharing one geometry, each spinning at its own rate.

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

pub struct ResponsiveCubesParams {
    pub cube_size: f32,
}

impl Default for ResponsiveCubesParams {
    fn default() -> Self {
        Self { cube_size: 1.0 }
    }
}

pub struct ResponsiveCubesWorld {
    params: ResponsiveCubesParams,
    cubes: Vec<NodeId>,
    camera: Option<NodeId>,
}

impl ResponsiveCubesWorld {
    pub fn new(params: ResponsiveCubesParams) -> Self {
        Self {
            params,
            cubes: Vec::new(),
            camera: None,
        }
    }
}

impl World for ResponsiveCubesWorld {
    fn build(&mut self, scene: &mut Scene) {
        let s = self.params.cube_size;
        let geometry = scene.add_geometry(Geometry::cuboid(s, s, s));

        for (hex, x) in [(0x44aa88, 0.0), (0x8844aa, -2.0), (0xaa8844, 2.0)] {
            let cube = scene.add_mesh(
                scene.root(),
                geometry,
                Material::phong(Color::from_hex(hex)),
            );
            scene.transform_mut(cube).position = Vector3::new(x, 0.0, 0.0);
            self.cubes.push(cube);
        }

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
        for (index, &cube) in self.cubes.iter().enumerate() {
            let speed = clock::indexed_speed(1.0, 0.1, index);
            let angle = clock::spin(seconds, speed);
            scene.transform_mut(cube).set_rotation_euler(angle, angle, 0.0);
        }
    }

    fn active_camera(&self, _seconds: f32) -> NodeId {
        self.camera.unwrap_or(NodeId(0))
    }
}
