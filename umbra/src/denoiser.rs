mod buffers;
mod pass;
mod passes;

use glam::UVec2;
use log::{debug, info, trace};

pub use self::buffers::*;
pub use self::pass::*;
pub use self::passes::*;
use crate::gpu::Channel;
use crate::graph::{GBufferTarget, HistoryFix, PassGraph, Resource, Slot};
use crate::{
    Camera, DebugView, DenoiserSettings, Engine, Error, FrameContext,
    FrameRing, History, RenderMode, Result,
};

/// Denoiser running on the GPU.
///
/// Each frame:
///
/// 1. the ray-tracing stage writes the noisy radiance (see
///    [`Self::radiance()`]) and the rendering stages write the current
///    g-buffer layer (see [`Self::gbuffer()`]),
/// 2. [`Self::update()`] and [`Self::flush()`] upload the camera and the
///    settings,
/// 3. [`Self::render()`] records the passes,
/// 4. after submitting the encoder, [`Self::advance_frame()`] swaps the
///    layers.
#[derive(Debug)]
pub struct Denoiser {
    camera: Camera,
    settings: DenoiserSettings,
    history: History,
    frames: FrameRing<wgpu::SubmissionIndex>,
    graph: PassGraph,
    buffers: DenoiserBuffers,
    passes: DenoiserPasses,
    debug_view: DebugView,
    rendered: Option<FrameContext>,
}

impl Denoiser {
    pub(crate) fn new(
        engine: &Engine,
        device: &wgpu::Device,
        camera: Camera,
        settings: DenoiserSettings,
    ) -> Result<Self> {
        info!("Creating denoiser: {}", camera.describe());

        check_viewport(&camera)?;
        settings.validate()?;

        let history = History::new();
        let graph = PassGraph::new(history_fix(&settings));

        graph.validate()?;

        let buffers = DenoiserBuffers::new(
            device,
            &camera,
            settings.to_params(history.frame()),
        );

        let passes = DenoiserPasses::new(engine, device, &graph, &buffers);

        debug!("Denoiser created");

        Ok(Self {
            camera,
            settings,
            history,
            frames: FrameRing::new(),
            graph,
            buffers,
            passes,
            debug_view: DebugView::None,
            rendered: None,
        })
    }

    /// Prepares the next frame; waits until the GPU is done with the frame
    /// recorded [`crate::FRAMES_IN_FLIGHT`] frames ago.
    ///
    /// Resizing the viewport or switching the render mode drops the history.
    pub fn update(
        &mut self,
        engine: &Engine,
        device: &wgpu::Device,
        camera: Camera,
        settings: &DenoiserSettings,
        mode: RenderMode,
    ) -> Result<()> {
        check_viewport(&camera)?;
        settings.validate()?;

        if let Some(submission) = self.frames.begin() {
            trace!("Waiting for submission {submission:?}");

            device.poll(wgpu::Maintain::WaitForSubmissionIndex(submission));
        }

        let needs_rebuilding = self.camera.is_invalidated_by(&camera);
        let history_fix = history_fix(settings);

        self.camera = camera;
        self.settings = settings.clone();
        self.history.set_mode(mode);

        if needs_rebuilding {
            self.rebuild_buffers(device);
        }

        let graph_changed = history_fix != self.graph.history_fix();

        if graph_changed {
            debug!("Rebuilding pass graph; history_fix={history_fix:?}");

            let graph = PassGraph::new(history_fix);

            graph.validate()?;
            self.graph = graph;
        }

        if needs_rebuilding || graph_changed {
            self.rebuild_passes(engine, device);
        }

        let ctx = self.history.context();

        *self.buffers.params = self.settings.to_params(ctx.frame);
        **self.buffers.cameras.get_mut(ctx.current) = self.camera.serialize();

        Ok(())
    }

    /// Reallocates buffers for a new viewport size, dropping the history.
    pub fn resize(
        &mut self,
        engine: &Engine,
        device: &wgpu::Device,
        viewport_size: UVec2,
    ) -> Result<()> {
        let camera = Camera {
            viewport_size,
            ..self.camera.clone()
        };

        check_viewport(&camera)?;

        if self.camera.is_invalidated_by(&camera) {
            self.camera = camera;
            self.rebuild_buffers(device);
            self.rebuild_passes(engine, device);
        }

        Ok(())
    }

    fn rebuild_buffers(&mut self, device: &wgpu::Device) {
        info!("Resizing denoiser: {}", self.camera.describe());

        // Buffers of frames in flight are about to be dropped
        self.frames.clear();

        self.buffers = DenoiserBuffers::new(
            device,
            &self.camera,
            self.settings.to_params(self.history.frame()),
        );

        self.rendered = None;
        self.history.request_history_clear();
    }

    fn rebuild_passes(&mut self, engine: &Engine, device: &wgpu::Device) {
        debug!("Rebuilding passes for denoiser: {}", self.camera.describe());

        self.passes =
            DenoiserPasses::new(engine, device, &self.graph, &self.buffers);
    }

    pub fn flush(&mut self, queue: &wgpu::Queue) {
        self.buffers.flush(queue);
    }

    pub fn render(&mut self, encoder: &mut wgpu::CommandEncoder) {
        let ctx = self.history.context();

        trace!("Rendering frame {}", ctx.frame);

        if self.history.take_clear_request() {
            debug!("Clearing history");

            for channel in Channel::ALL {
                for resource in [
                    Resource::HistoryLength(channel, Slot::Previous),
                    Resource::StabilizationHistory(channel, Slot::Previous),
                ] {
                    encoder.clear_texture(
                        self.buffers.texture(resource.resolve(&ctx)).tex(),
                        &Default::default(),
                    );
                }
            }
        }

        let buffers = &self.buffers;
        let snapshot_after = self.debug_view.snapshot_after();

        self.passes.run(
            &ctx,
            encoder,
            self.camera.viewport_size,
            |encoder, node| {
                if Some(node.kernel) != snapshot_after {
                    return;
                }

                let src = buffers.texture(node.writes[0].resolve(&ctx));
                let dst = buffers.texture(Resource::Debug(node.channel));

                encoder.copy_texture_to_texture(
                    src.tex().as_image_copy(),
                    dst.tex().as_image_copy(),
                    wgpu::Extent3d {
                        width: src.size().x,
                        height: src.size().y,
                        depth_or_array_layers: 1,
                    },
                );
            },
        );

        self.rendered = Some(ctx);
    }

    /// Finishes the frame; `submission` is the handle of the work recorded by
    /// [`Self::render()`].
    pub fn advance_frame(&mut self, submission: wgpu::SubmissionIndex) {
        self.frames.end(submission);
        self.history.advance_frame();

        let ctx = self.history.context();

        // Until `update()` says otherwise, the camera stays where it was
        **self.buffers.cameras.get_mut(ctx.current) = self.camera.serialize();
    }

    pub fn request_history_clear(&mut self) {
        self.history.request_history_clear();
    }

    pub fn set_debug_view(&mut self, debug_view: DebugView) {
        self.debug_view = debug_view;
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn settings(&self) -> &DenoiserSettings {
        &self.settings
    }

    /// Returns texture the ray-tracing stage should write the noisy radiance
    /// of given channel into (`rgb` - radiance, `a` - hit distance).
    pub fn radiance(&self, channel: Channel) -> &wgpu::Texture {
        self.buffers.texture(Resource::Radiance(channel)).tex()
    }

    /// Returns texture of the g-buffer layer that's current for the frame
    /// being prepared.
    pub fn gbuffer(&self, target: GBufferTarget) -> &wgpu::Texture {
        let resource = Resource::GBuffer(target, Slot::Current);

        self.buffers
            .texture(resource.resolve(&self.history.context()))
            .tex()
    }

    /// Returns the denoised and stabilized output of the last rendered frame.
    pub fn output(&self, channel: Channel) -> &wgpu::TextureView {
        let resource = Resource::StabilizationHistory(channel, Slot::Current);

        self.buffers
            .texture(resource.resolve(&self.last_context()))
            .view()
    }

    pub fn debug_view(&self, channel: Channel) -> Option<&wgpu::TextureView> {
        let resource = self.debug_view.resource(channel)?;

        Some(
            self.buffers
                .texture(resource.resolve(&self.last_context()))
                .view(),
        )
    }

    fn last_context(&self) -> FrameContext {
        self.rendered.unwrap_or_else(|| self.history.context())
    }
}

impl Drop for Denoiser {
    fn drop(&mut self) {
        info!("Deleting denoiser: {}", self.camera.describe());
    }
}

fn history_fix(settings: &DenoiserSettings) -> HistoryFix {
    HistoryFix::new(settings.history_fix, settings.use_alternative_history_fix)
}

fn check_viewport(camera: &Camera) -> Result<()> {
    if camera.viewport_size.cmpeq(UVec2::ZERO).any() {
        Err(Error::EmptyViewport {
            size: camera.viewport_size,
        })
    } else {
        Ok(())
    }
}
