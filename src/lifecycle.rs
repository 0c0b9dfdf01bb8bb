//! World lifecycle: mount, frame loop, teardown.
//!
//! A [`WorldRuntime`] owns one scene graph, one renderer and one scheduler,
//! and drives them from a single thread. Frames never overlap: the runtime
//! requests the next callback only after the current one finished.

use crate::{
    clock,
    scene::{NodeId, Scene},
    viewport::{self, Resolution},
};

/// Surface the catalog renders into. Native and web implementations wrap a
/// `winit` window; tests use a fake.
pub trait MountPoint {
    /// Whether the surface is still part of a live window/document. A
    /// runtime never starts on a detached mount.
    fn is_attached(&self) -> bool;
    /// Current logical size in CSS-like units, before pixel-ratio scaling.
    fn logical_size(&self) -> (u32, u32);
    fn pixel_ratio(&self) -> f64 {
        1.0
    }
}

/// Token for one scheduled frame callback.
#[derive(Debug, PartialEq, Eq)]
pub struct FrameRequest(pub u64);

/// Schedules and cancels frame callbacks.
///
/// The runtime holds at most one outstanding request at a time, so an
/// implementation only ever sees cancel for the most recent request.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameRequest;
    fn cancel_frame(&mut self, request: FrameRequest);
}

/// The rendering seam the lifecycle depends on. The GPU implementation
/// lives in [`crate::renderer`]; tests substitute a recording double.
pub trait WorldRenderer {
    fn backing_resolution(&self) -> Resolution;
    fn set_backing_resolution(&mut self, resolution: Resolution);
    fn render(&mut self, scene: &Scene, camera: NodeId) -> anyhow::Result<()>;
    /// Release GPU resources. Called exactly once, from dispose.
    fn dispose(&mut self) {}
}

/// One demo scene: builds its graph once, then mutates it every frame.
pub trait World {
    /// Populate the scene. Runs once, synchronously; texture loads started
    /// here complete in the background.
    fn build(&mut self, scene: &mut Scene);

    /// Advance the scene to `seconds`. Must be a pure function of the
    /// timestamp so that replaying the same timestamps reproduces the same
    /// transforms bit for bit.
    fn animate(&mut self, scene: &mut Scene, seconds: f32);

    /// Camera to render this frame with.
    fn active_camera(&self, seconds: f32) -> NodeId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unmounted,
    Building,
    Animating,
    Disposing,
}

/// Drives one [`World`] through its lifecycle.
///
/// `Unmounted → Building → Animating → Disposing → Unmounted`, with no
/// recovery path: once disposed, a runtime stays inert.
pub struct WorldRuntime<W, R, S, M> {
    world: W,
    scene: Scene,
    renderer: R,
    scheduler: S,
    mount: M,
    phase: Phase,
    pending: Option<FrameRequest>,
}

impl<W, R, S, M> WorldRuntime<W, R, S, M>
where
    W: World,
    R: WorldRenderer,
    S: FrameScheduler,
    M: MountPoint,
{
    /// Build the world and schedule the first frame.
    ///
    /// Returns `None` when the mount point is already detached; nothing is
    /// built or scheduled in that case.
    pub fn start(mut world: W, renderer: R, mut scheduler: S, mount: M) -> Option<Self> {
        if !mount.is_attached() {
            log::warn!("mount point detached before start, skipping world");
            return None;
        }

        let mut scene = Scene::new();
        world.build(&mut scene);
        let pending = Some(scheduler.request_frame());

        Some(Self {
            world,
            scene,
            renderer,
            scheduler,
            mount,
            phase: Phase::Animating,
            pending,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Run one frame at `timestamp_ms` (monotonic, milliseconds).
    ///
    /// Resizes the backing buffer first if the mount's size changed, then
    /// animates, propagates world transforms, renders and schedules the
    /// next frame. A pump on a disposed runtime does nothing.
    pub fn pump(&mut self, timestamp_ms: f64) -> anyhow::Result<()> {
        if self.phase != Phase::Animating {
            return Ok(());
        }
        // the callback this pump answers has fired
        self.pending = None;

        let seconds = clock::to_seconds(timestamp_ms);

        let desired =
            viewport::desired_resolution(self.mount.logical_size(), self.mount.pixel_ratio());
        if viewport::needs_resize(self.renderer.backing_resolution(), desired) {
            self.renderer.set_backing_resolution(desired);
            let aspect = desired.aspect();
            for id in self.scene.camera_nodes() {
                if let Some(camera) = self.scene.camera_mut(id) {
                    camera.set_aspect(aspect);
                }
            }
        }

        self.world.animate(&mut self.scene, seconds);
        self.scene.update_world_transforms();

        let camera = self.world.active_camera(seconds);
        self.renderer.render(&self.scene, camera)?;

        self.pending = Some(self.scheduler.request_frame());
        Ok(())
    }

    /// Tear the world down: cancel the outstanding frame request and release
    /// the renderer. Safe to call more than once.
    pub fn dispose(&mut self) {
        if self.phase != Phase::Animating {
            return;
        }
        self.phase = Phase::Disposing;

        if let Some(request) = self.pending.take() {
            self.scheduler.cancel_frame(request);
        }
        self.renderer.dispose();

        self.phase = Phase::Unmounted;
    }
}
