//! A tank driving a looped spline path while four cameras take turns.
//!
//! The richest graph in the catalog: wheels, dome and turret hang off the
//! chassis, a bobbing target orbits overhead, and the turret tracks the
//! target's world position every frame.

use cgmath::{Quaternion, Rad, Rotation3, Vector2, Vector3};

use crate::{
    camera::{CameraRig, PerspectiveCamera},
    curve::SplineCurve,
    geometry::Geometry,
    lifecycle::World,
    light::{Light, ShadowProjection},
    material::{Color, Material},
    scene::{NodeId, Scene},
};

const CHASSIS_WIDTH: f32 = 4.0;
const CHASSIS_HEIGHT: f32 = 1.0;
const CHASSIS_LENGTH: f32 = 8.0;
const WHEEL_RADIUS: f32 = 1.0;
const WHEEL_THICKNESS: f32 = 0.5;
const DOME_RADIUS: f32 = 2.0;
const TURRET_LENGTH: f32 = CHASSIS_LENGTH * 0.15;

pub struct TankParams {
    /// Use stepped toon shading instead of phong for the lit materials.
    pub toonify: bool,
}

impl Default for TankParams {
    fn default() -> Self {
        Self { toonify: false }
    }
}

struct TankRig {
    tank: NodeId,
    wheels: Vec<NodeId>,
    turret_pivot: NodeId,
    turret_camera: NodeId,
    target_orbit: NodeId,
    target_bob: NodeId,
    target: NodeId,
    target_camera_pivot: NodeId,
}

pub struct TankWorld {
    params: TankParams,
    path: SplineCurve,
    rig: Option<TankRig>,
    cameras: CameraRig,
    last_camera: Option<usize>,
    // per-frame scratch, reused to keep animate allocation-free
    path_point: Vector2<f32>,
    path_ahead: Vector2<f32>,
    world_point: Vector3<f32>,
}

impl TankWorld {
    pub fn new(params: TankParams) -> Self {
        let path = SplineCurve::new(vec![
            Vector2::new(-10.0, 0.0),
            Vector2::new(-5.0, 5.0),
            Vector2::new(0.0, 0.0),
            Vector2::new(5.0, -5.0),
            Vector2::new(10.0, 0.0),
            Vector2::new(5.0, 10.0),
            Vector2::new(-5.0, 10.0),
            Vector2::new(-10.0, -10.0),
            Vector2::new(-15.0, -8.0),
            Vector2::new(-10.0, 0.0),
        ]);
        Self {
            params,
            path,
            rig: None,
            cameras: CameraRig::new(),
            last_camera: None,
            path_point: Vector2::new(0.0, 0.0),
            path_ahead: Vector2::new(0.0, 0.0),
            world_point: Vector3::new(0.0, 0.0, 0.0),
        }
    }

    /// Phong or toon depending on the params, same color either way.
    fn lit(&self, hex: u32, flat_shading: bool) -> Material {
        let color = Color::from_hex(hex);
        if self.params.toonify {
            Material::Toon {
                color,
                emissive: Color::BLACK,
                flat_shading,
            }
        } else {
            Material::Phong {
                color,
                emissive: Color::BLACK,
                flat_shading,
                double_sided: false,
            }
        }
    }
}

impl World for TankWorld {
    fn build(&mut self, scene: &mut Scene) {
        scene.background = Some(Color::from_hex(0xaaaaaa));

        let sun = scene.add_light(
            scene.root(),
            Light::Directional {
                color: Color::WHITE,
                intensity: 3.0,
                target: Vector3::new(0.0, 0.0, 0.0),
                cast_shadow: true,
                shadow: ShadowProjection {
                    left: -50.0,
                    right: 50.0,
                    top: 50.0,
                    bottom: -50.0,
                    near: 1.0,
                    far: 50.0,
                    bias: 0.001,
                    map_size: [2048, 2048],
                },
            },
        );
        scene.transform_mut(sun).position = Vector3::new(0.0, 20.0, 0.0);
        let fill = scene.add_light(scene.root(), Light::directional(3.0));
        scene.transform_mut(fill).position = Vector3::new(1.0, 2.0, 4.0);

        let ground_geo = scene.add_geometry(Geometry::plane(50.0, 50.0));
        let ground = scene.add_mesh(scene.root(), ground_geo, self.lit(0xcc8866, false));
        scene.transform_mut(ground).rotation = Quaternion::from_angle_x(Rad(-std::f32::consts::FRAC_PI_2));

        let detached = scene.add_camera(
            scene.root(),
            PerspectiveCamera::with_default_aspect(40.0, 0.1, 1000.0),
        );
        scene.transform_mut(detached).position = Vector3::new(24.0, 12.0, 30.0);
        scene.look_at(detached, Vector3::new(0.0, 0.0, 0.0));

        let tank = scene.add_pivot(scene.root());

        let chassis_geo = scene.add_geometry(Geometry::cuboid(
            CHASSIS_WIDTH,
            CHASSIS_HEIGHT,
            CHASSIS_LENGTH,
        ));
        let chassis = scene.add_mesh(tank, chassis_geo, self.lit(0x6688aa, false));
        scene.transform_mut(chassis).position = Vector3::new(0.0, 1.4, 0.0);

        let rear_camera = scene.add_camera(
            chassis,
            PerspectiveCamera::with_default_aspect(75.0, 0.1, 1000.0),
        );
        {
            let t = scene.transform_mut(rear_camera);
            t.position = Vector3::new(0.0, 3.0, -6.0);
            t.rotation = Quaternion::from_angle_y(Rad(std::f32::consts::PI));
        }

        let wheel_geo = scene.add_geometry(Geometry::cylinder(
            WHEEL_RADIUS,
            WHEEL_RADIUS,
            WHEEL_THICKNESS,
            6,
        ));
        let wheel_x = CHASSIS_WIDTH / 2.0 + WHEEL_THICKNESS / 2.0;
        let wheel_y = -CHASSIS_HEIGHT / 2.0;
        let mut wheels = Vec::with_capacity(6);
        for z in [CHASSIS_LENGTH / 3.0, 0.0, -CHASSIS_LENGTH / 3.0] {
            for x in [-wheel_x, wheel_x] {
                let wheel = scene.add_mesh(chassis, wheel_geo, self.lit(0x888888, true));
                let t = scene.transform_mut(wheel);
                t.position = Vector3::new(x, wheel_y, z);
                t.rotation = Quaternion::from_angle_z(Rad(std::f32::consts::FRAC_PI_2));
                wheels.push(wheel);
            }
        }

        let dome_geo = scene.add_geometry(Geometry::sphere_section(
            DOME_RADIUS,
            12,
            12,
            0.0,
            std::f32::consts::TAU,
            0.0,
            std::f32::consts::FRAC_PI_2,
        ));
        let dome = scene.add_mesh(chassis, dome_geo, self.lit(0x6688aa, false));
        scene.transform_mut(dome).position = Vector3::new(0.0, 0.5, 0.0);

        let turret_pivot = scene.add_pivot(chassis);
        {
            let t = scene.transform_mut(turret_pivot);
            t.set_scale_uniform(5.0);
            t.position = Vector3::new(0.0, 0.5, 0.0);
        }
        let turret_geo =
            scene.add_geometry(Geometry::cuboid(0.1, 0.1, TURRET_LENGTH));
        let turret = scene.add_mesh(turret_pivot, turret_geo, self.lit(0x6688aa, false));
        scene.transform_mut(turret).position = Vector3::new(0.0, 0.0, TURRET_LENGTH * 0.5);

        let turret_camera = scene.add_camera(
            turret,
            PerspectiveCamera::with_default_aspect(40.0, 0.1, 1000.0),
        );
        scene.transform_mut(turret_camera).position = Vector3::new(0.0, 0.15, 0.0);

        let target_orbit = scene.add_pivot(scene.root());
        let target_elevation = scene.add_pivot(target_orbit);
        scene.transform_mut(target_elevation).position =
            Vector3::new(0.0, 8.0, CHASSIS_LENGTH * 2.0);
        let target_bob = scene.add_pivot(target_elevation);

        let target_geo = scene.add_geometry(Geometry::sphere(0.5, 6, 3));
        let target = scene.add_mesh(target_bob, target_geo, self.lit(0x00ff00, true));

        let target_camera_pivot = scene.add_pivot(target_bob);
        let target_camera = scene.add_camera(
            target_camera_pivot,
            PerspectiveCamera::with_default_aspect(40.0, 0.1, 1000.0),
        );
        {
            let t = scene.transform_mut(target_camera);
            t.position = Vector3::new(0.0, 1.0, -2.0);
            t.rotation = Quaternion::from_angle_y(Rad(std::f32::consts::PI));
        }

        // red line showing the drive path, laid flat just above the ground
        let strip: Vec<Vector3<f32>> = self
            .path
            .points(50)
            .into_iter()
            .map(|p| Vector3::new(p.x, p.y, 0.0))
            .collect();
        let path_geo = scene.add_geometry(Geometry::polyline(&strip));
        let path_line = scene.add_mesh(scene.root(), path_geo, Material::line(Color::from_hex(0xff0000)));
        {
            let t = scene.transform_mut(path_line);
            t.rotation = Quaternion::from_angle_x(Rad(std::f32::consts::FRAC_PI_2));
            t.position = Vector3::new(0.0, 0.05, 0.0);
        }

        self.cameras.add(detached, "detached");
        self.cameras.add(turret_camera, "on turret looking at target");
        self.cameras.add(target_camera, "near target looking at tank");
        self.cameras.add(rear_camera, "above back of tank");

        self.rig = Some(TankRig {
            tank,
            wheels,
            turret_pivot,
            turret_camera,
            target_orbit,
            target_bob,
            target,
            target_camera_pivot,
        });
    }

    fn animate(&mut self, scene: &mut Scene, seconds: f32) {
        let Some(rig) = &self.rig else { return };

        scene.transform_mut(rig.target_orbit).rotation =
            Quaternion::from_angle_y(Rad(seconds * 0.27));
        scene.transform_mut(rig.target_bob).position.y = (seconds * 2.0).sin() * 4.0;
        scene.transform_mut(rig.target).rotation = Quaternion::from_angle_x(Rad(seconds * 7.0))
            * Quaternion::from_angle_y(Rad(seconds * 13.0));

        let hue = (seconds * 10.0).rem_euclid(1.0);
        if let Some(material) = scene.material_mut(rig.target) {
            material.color_mut().set_hsl(hue, 1.0, 0.25);
            if let Some(emissive) = material.emissive_mut() {
                emissive.set_hsl(hue, 1.0, 0.25);
            }
        }

        let along = seconds * 0.05;
        self.path.point_at(along.rem_euclid(1.0), &mut self.path_point);
        self.path
            .point_at((along + 0.01).rem_euclid(1.0), &mut self.path_ahead);
        scene.transform_mut(rig.tank).position =
            Vector3::new(self.path_point.x, 0.0, self.path_point.y);
        scene.look_at(
            rig.tank,
            Vector3::new(self.path_ahead.x, 0.0, self.path_ahead.y),
        );

        // aim the turret and the chase cameras at current world positions
        scene.update_world_transforms();
        scene.world_position(rig.target, &mut self.world_point);
        scene.look_at(rig.turret_pivot, self.world_point);
        scene.look_at(rig.turret_camera, self.world_point);
        scene.world_position(rig.tank, &mut self.world_point);
        scene.look_at(rig.target_camera_pivot, self.world_point);

        for &wheel in &rig.wheels {
            scene.transform_mut(wheel).rotation = Quaternion::from_angle_x(Rad(seconds * 3.0))
                * Quaternion::from_angle_z(Rad(std::f32::consts::FRAC_PI_2));
        }

        let index = self.cameras.active_index(seconds);
        if self.last_camera != Some(index) {
            let (_, label) = self.cameras.active(seconds);
            log::info!("camera {}: {}", index, label);
            self.last_camera = Some(index);
        }
    }

    fn active_camera(&self, seconds: f32) -> NodeId {
        if self.cameras.is_empty() {
            NodeId(0)
        } else {
            self.cameras.active(seconds).0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn built() -> (TankWorld, Scene) {
        let mut world = TankWorld::new(TankParams::default());
        let mut scene = Scene::new();
        world.build(&mut scene);
        (world, scene)
    }

    #[test]
    fn six_wheels_and_four_cameras() {
        let (world, scene) = built();
        let rig = world.rig.as_ref().unwrap();
        assert_eq!(rig.wheels.len(), 6);
        assert_eq!(world.cameras.len(), 4);
        assert_eq!(scene.camera_nodes().len(), 4);
    }

    #[test]
    fn scene_clears_to_grey() {
        let (_, scene) = built();
        assert_eq!(scene.background, Some(Color::from_hex(0xaaaaaa)));
    }

    #[test]
    fn camera_phase_two_picks_the_target_camera() {
        let (mut world, mut scene) = built();
        // floor((9.5 * 0.25) mod 4) = 2
        world.animate(&mut scene, 9.5);
        let active = world.active_camera(9.5);
        let rig = world.rig.as_ref().unwrap();
        let expected = scene.node(rig.target_camera_pivot).children()[0];
        assert_eq!(active, expected);
    }

    #[test]
    fn tank_sits_on_the_path() {
        let (mut world, mut scene) = built();
        world.animate(&mut scene, 0.0);
        let rig = world.rig.as_ref().unwrap();
        let position = scene.node(rig.tank).transform.position;
        // u = 0 is the first control point's curve start
        let mut start = Vector2::new(0.0, 0.0);
        world.path.point_at(0.0, &mut start);
        assert_relative_eq!(position.x, start.x, epsilon = 1e-5);
        assert_relative_eq!(position.z, start.y, epsilon = 1e-5);
        assert_eq!(position.y, 0.0);
    }

    #[test]
    fn toonify_swaps_material_kind() {
        let mut world = TankWorld::new(TankParams { toonify: true });
        let mut scene = Scene::new();
        world.build(&mut scene);
        let rig = world.rig.as_ref().unwrap();
        match &scene.node(rig.target).kind {
            crate::scene::NodeKind::Mesh(mesh) => {
                assert!(matches!(mesh.material, Material::Toon { .. }))
            }
            _ => panic!("not a mesh"),
        }
    }
}
