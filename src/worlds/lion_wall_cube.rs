//! An unlit cube wrapped in a photo texture.
//!
//! The texture loads in the background; until it arrives the cube renders
//! with the default white pixel, which is the intended behavior rather than
//! an error state.

use cgmath::Vector3;

use crate::{
    assets::TextureHandle,
    camera::PerspectiveCamera,
    clock,
    geometry::Geometry,
    lifecycle::World,
    material::{Color, Material},
    scene::{NodeId, Scene},
};

pub struct LionWallCubeParams {
    pub cube_size: f32,
    /// Image file under the asset directory.
    pub texture: &'static str,
    pub rotation_speed: f32,
}

impl Default for LionWallCubeParams {
    fn default() -> Self {
        Self {
            cube_size: 1.0,
            texture: "lion-wall.jpg",
            rotation_speed: 0.2,
        }
    }
}

pub struct LionWallCubeWorld {
    params: LionWallCubeParams,
    cube: Option<NodeId>,
    camera: Option<NodeId>,
}

impl LionWallCubeWorld {
    pub fn new(params: LionWallCubeParams) -> Self {
        Self {
            params,
            cube: None,
            camera: None,
        }
    }
}

impl World for LionWallCubeWorld {
    fn build(&mut self, scene: &mut Scene) {
        let s = self.params.cube_size;
        let geometry = scene.add_geometry(Geometry::cuboid(s, s, s));
        let material = Material::Basic {
            color: Color::WHITE,
            map: Some(TextureHandle::load(self.params.texture)),
        };
        self.cube = Some(scene.add_mesh(scene.root(), geometry, material));

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
