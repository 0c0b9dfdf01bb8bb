use std::collections::HashMap;

use approx::assert_relative_eq;
use cgmath::Vector3;
use scene_lab::{
    lifecycle::{World, WorldRuntime},
    material::Material,
    scene::{NodeKind, Scene},
    worlds::{
        CubeParams, CubeWorld, LionWallCubeParams, LionWallCubeWorld, ResponsiveCubesParams,
        ResponsiveCubesWorld, SolarSystemParams, SolarSystemWorld, SubdividedSpheresParams,
        SubdividedSpheresWorld, TankParams, TankWorld,
    },
};

use crate::common::test_utils::{FakeMount, ManualScheduler, NullRenderer};

mod common;

fn build<W: World>(mut world: W) -> (W, Scene) {
    let mut scene = Scene::new();
    world.build(&mut scene);
    (world, scene)
}

#[test]
fn cube_world_bounds_follow_the_size_param() {
    let (_, scene) = build(CubeWorld::new(CubeParams {
        cube_size: 2.0,
        ..CubeParams::default()
    }));

    let dims: Vec<_> = scene
        .iter()
        .filter_map(|(_, node)| match &node.kind {
            NodeKind::Mesh(mesh) => Some(scene.geometry(mesh.geometry).bounding_dimensions()),
            _ => None,
        })
        .collect();
    assert_eq!(dims, vec![Vector3::new(2.0, 2.0, 2.0)]);
}

#[test]
fn spheres_world_shape() {
    let (_, scene) = build(SubdividedSpheresWorld::new(
        SubdividedSpheresParams::default(),
    ));

    assert!(scene.background.is_some());
    let mut spheres = 0;
    let mut outlines = 0;
    for (_, node) in scene.iter() {
        match &node.kind {
            NodeKind::Mesh(mesh) => match mesh.material {
                Material::Phong { .. } => spheres += 1,
                Material::Line { .. } => outlines += 1,
                _ => panic!("unexpected material"),
            },
            _ => {}
        }
    }
    assert_eq!(spheres, 3);
    assert_eq!(outlines, 3);
}

#[test]
fn solar_system_bodies_end_up_where_the_pivots_put_them() {
    let (mut world, mut scene) = build(SolarSystemWorld::new(SolarSystemParams::default()));

    world.animate(&mut scene, std::f32::consts::FRAC_PI_2);
    scene.update_world_transforms();

    let mut positions: Vec<Vector3<f32>> = Vec::new();
    let mut scratch = Vector3::new(0.0, 0.0, 0.0);
    for (id, node) in scene.iter() {
        if matches!(node.kind, NodeKind::Mesh(_)) {
            scene.world_position(id, &mut scratch);
            positions.push(scratch);
        }
    }
    assert_eq!(positions.len(), 3);

    // sun at the origin, earth and moon carried a quarter turn around it
    assert_relative_eq!(positions[0], Vector3::new(0.0, 0.0, 0.0), epsilon = 1e-4);
    assert_relative_eq!(positions[1], Vector3::new(0.0, 0.0, -10.0), epsilon = 1e-4);
    assert_relative_eq!(positions[2], Vector3::new(-2.0, 0.0, -10.0), epsilon = 1e-4);
}

#[test]
fn tank_world_has_six_wheels_and_four_cameras() {
    let (_, scene) = build(TankWorld::new(TankParams::default()));

    assert_eq!(scene.camera_nodes().len(), 4);

    // the six wheels are the only meshes sharing one geometry six ways
    let mut uses: HashMap<usize, usize> = HashMap::new();
    for (_, node) in scene.iter() {
        if let NodeKind::Mesh(mesh) = &node.kind {
            *uses.entry(mesh.geometry.index()).or_default() += 1;
        }
    }
    assert_eq!(uses.values().filter(|&&n| n == 6).count(), 1);
}

#[test]
fn tank_camera_rotation_over_a_full_cycle() {
    let (world, _) = build(TankWorld::new(TankParams::default()));

    // index = floor((0.25 t) mod 4): one camera per four seconds
    let picks: Vec<_> = [0.0f32, 4.5, 9.5, 13.0, 16.5]
        .into_iter()
        .map(|t| world.active_camera(t))
        .collect();
    assert_ne!(picks[0], picks[1]);
    assert_ne!(picks[1], picks[2]);
    assert_ne!(picks[2], picks[3]);
    // wraps around to the first camera
    assert_eq!(picks[0], picks[4]);
}

#[test]
fn lion_wall_cube_runs_without_its_texture() {
    let mut runtime = WorldRuntime::start(
        LionWallCubeWorld::new(LionWallCubeParams {
            texture: "not-shipped.jpg",
            ..LionWallCubeParams::default()
        }),
        NullRenderer::new(300, 150),
        ManualScheduler::new(),
        FakeMount::new(300, 150),
    )
    .expect("world must start");

    runtime.pump(0.0).unwrap();
    runtime.pump(16.7).unwrap();
    assert_eq!(runtime.renderer().rendered.len(), 2);
    runtime.dispose();
}

#[test]
fn every_world_survives_a_short_run() {
    fn drive<W: World>(world: W) {
        let mut runtime = WorldRuntime::start(
            world,
            NullRenderer::new(300, 150),
            ManualScheduler::new(),
            FakeMount::new(600, 300),
        )
        .expect("world must start");
        for frame in 0..10 {
            runtime.pump(frame as f64 * 16.7).unwrap();
        }
        runtime.dispose();
    }

    drive(CubeWorld::new(CubeParams::default()));
    drive(ResponsiveCubesWorld::new(ResponsiveCubesParams::default()));
    drive(SubdividedSpheresWorld::new(
        SubdividedSpheresParams::default(),
    ));
    drive(SolarSystemWorld::new(SolarSystemParams {
        show_helpers: true,
    }));
    drive(TankWorld::new(TankParams { toonify: true }));
}
