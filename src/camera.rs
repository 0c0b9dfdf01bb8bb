//! Perspective cameras and multi-camera selection.

use cgmath::{Deg, Matrix4, SquareMatrix};

use crate::scene::{NodeId, Scene, Transform};

/// wgpu clip space is 0..1 in z while cgmath produces OpenGL's -1..1.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Projection parameters of a camera node.
///
/// The aspect ratio is owned by the resize policy: whenever the backing
/// resolution of the output changes, every camera's aspect is resynchronized
/// before the next render.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl PerspectiveCamera {
    pub fn new(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov_y,
            aspect,
            near,
            far,
        }
    }

    /// The canvas default: 300x150 logical pixels, so aspect 2.
    pub fn with_default_aspect(fov_y: f32, near: f32, far: f32) -> Self {
        Self::new(fov_y, 2.0, near, far)
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(Deg(self.fov_y), self.aspect, self.near, self.far)
    }

    /// View matrix from the camera node's world transform.
    ///
    /// Scale is deliberately dropped: a scaled pivot above a camera should
    /// not skew the view.
    pub fn view_matrix(world: &Transform) -> Matrix4<f32> {
        let rotation = Matrix4::from(world.rotation);
        let translation = Matrix4::from_translation(world.position);
        (translation * rotation)
            .invert()
            .unwrap_or_else(Matrix4::identity)
    }
}

/// An ordered set of labeled cameras with time-based selection.
///
/// Exactly one camera is active per frame; the index is a deterministic
/// function of elapsed seconds so the cycle is reproducible.
pub struct CameraRig {
    cameras: Vec<(NodeId, &'static str)>,
}

impl CameraRig {
    pub fn new() -> Self {
        Self {
            cameras: Vec::new(),
        }
    }

    pub fn add(&mut self, node: NodeId, label: &'static str) {
        self.cameras.push((node, label));
    }

    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }

    /// Active camera index at `seconds`: a quarter step per second, wrapping.
    pub fn active_index(&self, seconds: f32) -> usize {
        ((seconds * 0.25) % self.cameras.len() as f32) as usize
    }

    pub fn active(&self, seconds: f32) -> (NodeId, &'static str) {
        self.cameras[self.active_index(seconds)]
    }

    /// Sync every rig camera to the given aspect ratio.
    pub fn set_aspect(&self, scene: &mut Scene, aspect: f32) {
        for (node, _) in &self.cameras {
            if let Some(camera) = scene.camera_mut(*node) {
                camera.set_aspect(aspect);
            }
        }
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig_of(n: usize) -> CameraRig {
        let mut scene = Scene::new();
        let mut rig = CameraRig::new();
        for _ in 0..n {
            let cam = scene.add_camera(
                scene.root(),
                PerspectiveCamera::with_default_aspect(40.0, 0.1, 1000.0),
            );
            rig.add(cam, "camera");
        }
        rig
    }

    #[test]
    fn rig_cycles_through_cameras() {
        let rig = rig_of(4);
        // a quarter step per second: 4 seconds per camera
        assert_eq!(rig.active_index(0.0), 0);
        assert_eq!(rig.active_index(4.0), 1);
        assert_eq!(rig.active_index(8.0), 2);
        assert_eq!(rig.active_index(12.0), 3);
        assert_eq!(rig.active_index(16.0), 0);
    }

    #[test]
    fn phase_index_two_selects_camera_two() {
        let rig = rig_of(4);
        assert_eq!(rig.active_index(9.5), 2);
    }

    #[test]
    fn aspect_update_changes_projection() {
        let mut camera = PerspectiveCamera::with_default_aspect(75.0, 0.1, 5.0);
        let before = camera.projection_matrix();
        camera.set_aspect(1.0);
        assert_ne!(before, camera.projection_matrix());
    }
}
