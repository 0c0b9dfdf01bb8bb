use scene_lab::{
    camera::PerspectiveCamera,
    lifecycle::{FrameRequest, FrameScheduler, MountPoint, World, WorldRenderer},
    scene::{NodeId, Scene},
    viewport::Resolution,
};

/// Scheduler that records every request and cancellation instead of
/// scheduling anything; tests pump the runtime by hand.
pub(crate) struct ManualScheduler {
    next: u64,
    pub requested: Vec<u64>,
    pub cancelled: Vec<u64>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self {
            next: 0,
            requested: Vec::new(),
            cancelled: Vec::new(),
        }
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        self.next += 1;
        self.requested.push(self.next);
        FrameRequest(self.next)
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.cancelled.push(request.0);
    }
}

/// Renderer double recording calls, never touching a GPU.
pub(crate) struct NullRenderer {
    backing: Resolution,
    pub resizes: Vec<Resolution>,
    pub rendered: Vec<NodeId>,
    pub disposals: u32,
    pub fail_next_render: bool,
}

impl NullRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            backing: Resolution::new(width, height),
            resizes: Vec::new(),
            rendered: Vec::new(),
            disposals: 0,
            fail_next_render: false,
        }
    }
}

impl WorldRenderer for NullRenderer {
    fn backing_resolution(&self) -> Resolution {
        self.backing
    }

    fn set_backing_resolution(&mut self, resolution: Resolution) {
        self.backing = resolution;
        self.resizes.push(resolution);
    }

    fn render(&mut self, _scene: &Scene, camera: NodeId) -> anyhow::Result<()> {
        if self.fail_next_render {
            self.fail_next_render = false;
            anyhow::bail!("surface gone");
        }
        self.rendered.push(camera);
        Ok(())
    }

    fn dispose(&mut self) {
        self.disposals += 1;
    }
}

pub(crate) struct FakeMount {
    pub attached: bool,
    pub size: (u32, u32),
    pub ratio: f64,
}

impl FakeMount {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            attached: true,
            size: (width, height),
            ratio: 1.0,
        }
    }
}

impl MountPoint for FakeMount {
    fn is_attached(&self) -> bool {
        self.attached
    }

    fn logical_size(&self) -> (u32, u32) {
        self.size
    }

    fn pixel_ratio(&self) -> f64 {
        self.ratio
    }
}

/// Minimal world: one camera plus a record of every animate timestamp.
pub(crate) struct ProbeWorld {
    pub camera: Option<NodeId>,
    pub animated_at: Vec<f32>,
}

impl ProbeWorld {
    pub fn new() -> Self {
        Self {
            camera: None,
            animated_at: Vec::new(),
        }
    }
}

impl World for ProbeWorld {
    fn build(&mut self, scene: &mut Scene) {
        self.camera = Some(scene.add_camera(
            scene.root(),
            PerspectiveCamera::with_default_aspect(60.0, 0.1, 100.0),
        ));
    }

    fn animate(&mut self, _scene: &mut Scene, seconds: f32) {
        self.animated_at.push(seconds);
    }

    fn active_camera(&self, _seconds: f32) -> NodeId {
        // build always runs before the first frame
        self.camera.expect("world not built")
    }
}
