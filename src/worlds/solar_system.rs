//! Sun, earth and moon on nested orbit pivots.
//!
//! Every body reuses one radius-1 sphere and gets its size from node scale.
//! Orbits come straight from the graph hierarchy: spinning a pivot carries
//! everything parented under it.

use cgmath::Vector3;

use crate::{
    camera::PerspectiveCamera,
    clock,
    geometry::Geometry,
    helpers::AxisGridHelper,
    lifecycle::World,
    light::Light,
    material::{Color, Material},
    scene::{NodeId, Scene},
};

pub struct SolarSystemParams {
    /// Attach (hidden-by-default, then shown) axis/grid helpers to every
    /// pivot and body.
    pub show_helpers: bool,
}

impl Default for SolarSystemParams {
    fn default() -> Self {
        Self {
            show_helpers: false,
        }
    }
}

pub struct SolarSystemWorld {
    params: SolarSystemParams,
    /// Nodes whose y rotation tracks elapsed seconds directly.
    spinners: Vec<NodeId>,
    helpers: Vec<AxisGridHelper>,
    camera: Option<NodeId>,
}

impl SolarSystemWorld {
    pub fn new(params: SolarSystemParams) -> Self {
        Self {
            params,
            spinners: Vec::new(),
            helpers: Vec::new(),
            camera: None,
        }
    }

    fn phong(color: u32, emissive: u32) -> Material {
        Material::Phong {
            color: Color::from_hex(color),
            emissive: Color::from_hex(emissive),
            flat_shading: false,
            double_sided: false,
        }
    }
}

impl World for SolarSystemWorld {
    fn build(&mut self, scene: &mut Scene) {
        scene.background = Some(Color::BLACK);

        let sphere = scene.add_geometry(Geometry::sphere(1.0, 6, 6));

        let system = scene.add_pivot(scene.root());

        let sun = scene.add_mesh(system, sphere, Self::phong(0xffffff, 0xffff00));
        scene.transform_mut(sun).set_scale_uniform(5.0);

        let earth_orbit = scene.add_pivot(system);
        scene.transform_mut(earth_orbit).position = Vector3::new(10.0, 0.0, 0.0);
        let earth = scene.add_mesh(earth_orbit, sphere, Self::phong(0x2233ff, 0x112244));

        // the moon orbit pivot itself stays still; the moon spins in place
        let moon_orbit = scene.add_pivot(earth_orbit);
        scene.transform_mut(moon_orbit).position = Vector3::new(2.0, 0.0, 0.0);
        let moon = scene.add_mesh(moon_orbit, sphere, Self::phong(0x888888, 0x222222));
        scene.transform_mut(moon).set_scale_uniform(0.5);

        self.spinners = vec![system, sun, earth_orbit, earth, moon];

        scene.add_light(scene.root(), Light::point(500.0));

        let camera = scene.add_camera(
            scene.root(),
            PerspectiveCamera::with_default_aspect(40.0, 0.1, 1000.0),
        );
        scene.transform_mut(camera).position = Vector3::new(0.0, 50.0, 0.0);
        scene.look_at_with_up(
            camera,
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        );
        self.camera = Some(camera);

        if self.params.show_helpers {
            for (node, units) in [
                (system, 25),
                (sun, 10),
                (earth_orbit, 10),
                (earth, 10),
                (moon_orbit, 10),
                (moon, 10),
            ] {
                let mut helper = AxisGridHelper::attach(scene, node, units);
                helper.set_visible(scene, true);
                self.helpers.push(helper);
            }
        }
    }

    fn animate(&mut self, scene: &mut Scene, seconds: f32) {
        let angle = clock::spin(seconds, 1.0);
        for &node in &self.spinners {
            scene.transform_mut(node).set_rotation_euler(0.0, angle, 0.0);
        }
    }

    fn active_camera(&self, _seconds: f32) -> NodeId {
        self.camera.unwrap_or(NodeId(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn built(params: SolarSystemParams) -> (SolarSystemWorld, Scene) {
        let mut world = SolarSystemWorld::new(params);
        let mut scene = Scene::new();
        world.build(&mut scene);
        (world, scene)
    }

    #[test]
    fn moon_orbits_earth_which_orbits_sun() {
        let (mut world, mut scene) = built(SolarSystemParams::default());

        // quarter turn of every spinner
        world.animate(&mut scene, std::f32::consts::FRAC_PI_2);
        scene.update_world_transforms();

        let moon = *world.spinners.last().unwrap();
        let mut position = Vector3::new(0.0, 0.0, 0.0);
        scene.world_position(moon, &mut position);

        // system pivot swings earth's +x offset onto -z, earth orbit pivot
        // swings the moon's local offset once more
        assert_relative_eq!(position, Vector3::new(-2.0, 0.0, -10.0), epsilon = 1e-4);
    }

    #[test]
    fn spinner_rotations_track_seconds_exactly() {
        let (mut world, mut scene) = built(SolarSystemParams::default());
        world.animate(&mut scene, 3.25);

        let mut reference = crate::scene::Transform::new();
        reference.set_rotation_euler(0.0, 3.25, 0.0);
        for &node in &world.spinners {
            assert_eq!(scene.node(node).transform.rotation, reference.rotation);
        }
    }

    #[test]
    fn helpers_appear_only_on_request() {
        let (bare, _) = built(SolarSystemParams::default());
        assert!(bare.helpers.is_empty());

        // system, sun, earth orbit, earth, moon orbit, moon
        let (world, scene) = built(SolarSystemParams { show_helpers: true });
        assert_eq!(world.helpers.len(), 6);
        for helper in &world.helpers {
            assert!(helper.visible());
        }
        drop(scene);
    }
}
