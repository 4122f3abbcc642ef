use fxhash::FxHashMap;
use glam::{UVec2, Vec4};
use log::{debug, info, trace};

use super::Image;
use crate::gpu::{self, Channel, Tex};
use crate::graph::{
    GBufferTarget, HistoryFix, Kernel, PassGraph, PassNode, Resource, Slot,
};
use crate::utils::measure;
use crate::{
    Camera, DebugView, DenoiserSettings, Error, FrameContext, History, Layer,
    RenderMode, Result,
};

/// Denoiser running on the CPU.
///
/// Usage mirrors [`crate::Denoiser`]: fill the g-buffer and the radiance of
/// the current frame, call [`Self::update()`] and [`Self::render()`], read
/// the output and finally [`Self::advance_frame()`].
#[derive(Debug)]
pub struct CpuDenoiser {
    camera: Camera,
    cameras: [gpu::Camera; 2],
    settings: DenoiserSettings,
    params: gpu::DenoiserParams,
    history: History,
    graph: PassGraph,
    images: FxHashMap<Resource<Layer>, Image>,
    debug_view: DebugView,
}

impl CpuDenoiser {
    pub fn new(camera: Camera) -> Result<Self> {
        info!("Creating CPU denoiser: {}", camera.describe());

        if camera.viewport_size.cmpeq(UVec2::ZERO).any() {
            return Err(Error::EmptyViewport {
                size: camera.viewport_size,
            });
        }

        let settings = DenoiserSettings::default();

        let graph = PassGraph::new(HistoryFix::new(
            settings.history_fix,
            settings.use_alternative_history_fix,
        ));

        graph.validate()?;

        Ok(Self {
            cameras: [camera.serialize(); 2],
            images: Self::allocate(camera.viewport_size),
            params: settings.to_params(0),
            camera,
            settings,
            history: History::new(),
            graph,
            debug_view: DebugView::None,
        })
    }

    fn allocate(size: UVec2) -> FxHashMap<Resource<Layer>, Image> {
        debug!("Allocating images; size={size}");

        Resource::<Layer>::all()
            .into_iter()
            .map(|resource| (resource, Image::new(resource.size(size))))
            .collect()
    }

    /// Prepares the next frame.
    ///
    /// Resizing the viewport or switching the render mode drops the history.
    pub fn update(
        &mut self,
        camera: Camera,
        settings: &DenoiserSettings,
        mode: RenderMode,
    ) -> Result<()> {
        settings.validate()?;

        if camera.viewport_size.cmpeq(UVec2::ZERO).any() {
            return Err(Error::EmptyViewport {
                size: camera.viewport_size,
            });
        }

        if self.camera.is_invalidated_by(&camera) {
            info!("Resizing CPU denoiser: {}", camera.describe());

            self.images = Self::allocate(camera.viewport_size);
            self.history.request_history_clear();
        }

        let history_fix = HistoryFix::new(
            settings.history_fix,
            settings.use_alternative_history_fix,
        );

        if history_fix != self.graph.history_fix() {
            debug!("Rebuilding pass graph; history_fix={history_fix:?}");

            let graph = PassGraph::new(history_fix);

            graph.validate()?;
            self.graph = graph;
        }

        self.history.set_mode(mode);
        self.settings = settings.clone();

        let ctx = self.history.context();

        self.cameras[ctx.current.index()] = camera.serialize();
        self.camera = camera;

        Ok(())
    }

    pub fn context(&self) -> FrameContext {
        self.history.context()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn params(&self) -> &gpu::DenoiserParams {
        &self.params
    }

    pub fn request_history_clear(&mut self) {
        self.history.request_history_clear();
    }

    pub fn set_debug_view(&mut self, debug_view: DebugView) {
        self.debug_view = debug_view;
    }

    /// Returns given texture of the current g-buffer layer.
    pub fn gbuffer_mut(&mut self, target: GBufferTarget) -> &mut Image {
        self.image_mut(Resource::GBuffer(target, Slot::Current))
    }

    /// Writes given surface into the current g-buffer layer.
    pub fn set_surface(&mut self, pos: UVec2, surface: gpu::Surface) {
        for (target, value) in GBufferTarget::ALL.into_iter().zip(surface.pack())
        {
            self.gbuffer_mut(target).set(pos, value);
        }
    }

    /// Returns the noisy radiance of given channel, to be filled by the
    /// caller before rendering.
    pub fn radiance_mut(&mut self, channel: Channel) -> &mut Image {
        self.image_mut(Resource::Radiance(channel))
    }

    /// Returns given resource, resolved against the current frame.
    pub fn image(&self, resource: Resource) -> &Image {
        let resource = resource.resolve(&self.history.context());

        &self.images[&resource]
    }

    fn image_mut(&mut self, resource: Resource) -> &mut Image {
        let resource = resource.resolve(&self.history.context());
        let size = resource.size(self.camera.viewport_size);

        self.images
            .entry(resource)
            .or_insert_with(|| Image::new(size))
    }

    /// Returns the denoised and stabilized output of given channel.
    pub fn output(&self, channel: Channel) -> &Image {
        self.image(Resource::StabilizationHistory(channel, Slot::Current))
    }

    pub fn debug_view(&self, channel: Channel) -> Option<&Image> {
        self.debug_view
            .resource(channel)
            .map(|resource| self.image(resource))
    }

    /// Snapshots the settings and applies the pending history clear, if any;
    /// called by [`Self::render()`].
    pub fn prepare(&mut self) {
        let ctx = self.history.context();

        self.params = self.settings.to_params(ctx.frame);

        if self.history.take_clear_request() {
            debug!("Clearing history");

            for channel in Channel::ALL {
                for resource in [
                    Resource::HistoryLength(channel, Slot::Previous),
                    Resource::StabilizationHistory(channel, Slot::Previous),
                ] {
                    self.image_mut(resource).fill(Vec4::ZERO);
                }
            }
        }
    }

    pub fn render(&mut self) {
        self.prepare();

        let ctx = self.history.context();

        trace!("Rendering frame {}", ctx.frame);

        let snapshot_after = self.debug_view.snapshot_after();

        measure("cpu_denoiser", || {
            for node in self.graph.nodes() {
                measure(&node.label, || {
                    execute(
                        &mut self.images,
                        &self.params,
                        &self.cameras,
                        self.camera.viewport_size,
                        &ctx,
                        node,
                    );
                });

                if Some(node.kernel) == snapshot_after {
                    let output =
                        self.images[&node.writes[0].resolve(&ctx)].clone();

                    self.images.insert(Resource::Debug(node.channel), output);
                }
            }
        });
    }

    /// Finishes the frame; the current layer becomes the previous one.
    pub fn advance_frame(&mut self) {
        self.history.advance_frame();

        let ctx = self.history.context();

        // Until `update()` says otherwise, the camera stays where it was
        self.cameras[ctx.current.index()] = self.cameras[ctx.previous.index()];
    }
}

fn execute(
    images: &mut FxHashMap<Resource<Layer>, Image>,
    params: &gpu::DenoiserParams,
    cameras: &[gpu::Camera; 2],
    screen_size: UVec2,
    ctx: &FrameContext,
    node: &PassNode,
) {
    let mut outputs: Vec<_> = node
        .writes
        .iter()
        .map(|resource| {
            let resource = resource.resolve(ctx);

            let image = images
                .remove(&resource)
                .unwrap_or_else(|| Image::new(resource.size(screen_size)));

            (resource, image)
        })
        .collect();

    {
        let inputs: Vec<_> = node
            .reads
            .iter()
            .map(|resource| &images[&resource.resolve(ctx)])
            .collect();

        let kernel = CpuKernel {
            node,
            params,
            camera: &cameras[ctx.current.index()],
            prev_camera: &cameras[ctx.previous.index()],
            inputs: &inputs,
        };

        let extent = node.extent().size(screen_size);

        for y in 0..extent.y {
            for x in 0..extent.x {
                let pos = UVec2::new(x, y);

                let values = kernel.run(pos);

                for ((_, output), value) in outputs.iter_mut().zip(values) {
                    output.set(pos, value);
                }
            }
        }
    }

    images.extend(outputs);
}

struct CpuKernel<'a> {
    node: &'a PassNode,
    params: &'a gpu::DenoiserParams,
    camera: &'a gpu::Camera,
    prev_camera: &'a gpu::Camera,
    inputs: &'a [&'a Image],
}

impl CpuKernel<'_> {
    /// Returns the values to store into the node's outputs, in order.
    fn run(&self, pos: UVec2) -> [Vec4; 3] {
        let inputs = self.inputs;
        let channel = self.node.channel;

        match self.node.kernel {
            Kernel::PreBlur => {
                let gbuffer = gbuffer(&inputs[0..4]);

                let out = gpu::SpatialFilter {
                    params: self.params,
                    camera: self.camera,
                    gbuffer: &gbuffer,
                    input: &inputs[4],
                }
                .run(pos, channel, gpu::SpatialFilterStage::PreBlur, 0.0);

                [out, Vec4::ZERO, Vec4::ZERO]
            }

            Kernel::TemporalAccumulation => {
                let out = gpu::TemporalAccumulation {
                    params: self.params,
                    camera: self.camera,
                    prev_camera: self.prev_camera,
                    gbuffer: &gbuffer(&inputs[0..4]),
                    prev_gbuffer: &gbuffer(&inputs[4..8]),
                    input: &inputs[8],
                    prev_output: &inputs[9],
                    prev_history_len: &inputs[10],
                }
                .run(pos, channel);

                [out.radiance, out.history_len, out.occlusion]
            }

            Kernel::HistoryFixDownsampleFirst => {
                let (radiance, view_z) = gpu::HistoryFixDownsample::first(
                    self.camera,
                    &gbuffer(&inputs[0..4]),
                    &inputs[4],
                    pos,
                );

                [radiance, gpu::pack_view_z(view_z), Vec4::ZERO]
            }

            Kernel::HistoryFixDownsample => {
                let (radiance, view_z) = gpu::HistoryFixDownsample::next(
                    self.camera.screen_size(),
                    self.node.level,
                    &inputs[0],
                    &inputs[1],
                    pos,
                );

                [radiance, gpu::pack_view_z(view_z), Vec4::ZERO]
            }

            Kernel::HistoryFixMip => {
                let levels = gpu::HISTORY_FIX_MIP_LEVELS as usize;
                let radiance = &inputs[6..6 + levels];
                let view_z = &inputs[6 + levels..6 + 2 * levels];

                let out = gpu::HistoryFixMip {
                    params: self.params,
                    camera: self.camera,
                    gbuffer: &gbuffer(&inputs[0..4]),
                    input: &inputs[4],
                    history_len: &inputs[5],
                }
                .run(pos, |level, pos| {
                    let level = level as usize;

                    (
                        radiance[level].read(pos),
                        gpu::unpack_view_z(view_z[level].read(pos)),
                    )
                });

                [out, Vec4::ZERO, Vec4::ZERO]
            }

            Kernel::HistoryFixSparse => {
                let out = gpu::HistoryFixSparse {
                    params: self.params,
                    camera: self.camera,
                    gbuffer: &gbuffer(&inputs[0..4]),
                    input: &inputs[4],
                    history_len: &inputs[5],
                }
                .run(pos);

                [out, Vec4::ZERO, Vec4::ZERO]
            }

            Kernel::SpatialFilter => {
                let history_len =
                    gpu::HistoryLength::decode(inputs[5].read(pos));

                let out = gpu::SpatialFilter {
                    params: self.params,
                    camera: self.camera,
                    gbuffer: &gbuffer(&inputs[0..4]),
                    input: &inputs[4],
                }
                .run(pos, channel, self.node.stage, history_len);

                [out, Vec4::ZERO, Vec4::ZERO]
            }

            Kernel::TemporalStabilization => {
                let out = gpu::TemporalStabilization {
                    params: self.params,
                    camera: self.camera,
                    prev_camera: self.prev_camera,
                    gbuffer: &gbuffer(&inputs[0..4]),
                    prev_gbuffer: &gbuffer(&inputs[4..8]),
                    input: &inputs[8],
                    prev_history: &inputs[9],
                    occlusion: &inputs[10],
                }
                .run(pos);

                [out, Vec4::ZERO, Vec4::ZERO]
            }
        }
    }
}

fn gbuffer<'a>(images: &[&'a Image]) -> gpu::GBuffer<&'a Image> {
    gpu::GBuffer::new(images[0], images[1], images[2], images[3])
}

#[cfg(test)]
mod tests {
    use glam::{uvec2, vec3, vec4, Vec3, Vec4Swizzles};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::RotationMode;

    const SIZE: UVec2 = UVec2::new(32, 32);

    /// Camera looking straight down at the `y = 0` plane.
    fn camera(eye: Vec3) -> Camera {
        Camera::look_at(
            eye,
            eye - Vec3::Y,
            vec3(0.0, 0.0, -1.0),
            60.0f32.to_radians(),
            0.1,
            SIZE,
        )
    }

    fn draw_floor(denoiser: &mut CpuDenoiser) {
        let camera = denoiser.camera().serialize();

        for y in 0..SIZE.y {
            for x in 0..SIZE.x {
                let pos = uvec2(x, y);
                let (origin, dir) = camera.ray(pos);

                if dir.y >= 0.0 {
                    denoiser.set_surface(pos, Default::default());
                    continue;
                }

                let world_pos = origin + dir * (-origin.y / dir.y);

                denoiser.set_surface(
                    pos,
                    gpu::Surface {
                        depth: camera.world_to_depth(world_pos),
                        normal: Vec3::Y,
                        roughness: 0.5,
                        base_color: Vec3::ONE,
                        metalness: 0.0,
                        world_pos,
                    },
                );
            }
        }
    }

    /// Fills radiance of both channels with `1.0 +- amplitude` noise and a
    /// constant hit distance.
    fn draw_radiance(denoiser: &mut CpuDenoiser, seed: u64, amplitude: f32) {
        let mut rng = StdRng::seed_from_u64(seed);

        for channel in Channel::ALL {
            let radiance = denoiser.radiance_mut(channel);

            for pos in radiance.positions().collect::<Vec<_>>() {
                let noise = rng.gen_range(-amplitude..=amplitude);

                radiance.set(pos, vec4(1.0 + noise, 1.0, 1.0 - noise, 5.0));
            }
        }
    }

    fn frame(
        denoiser: &mut CpuDenoiser,
        eye: Vec3,
        settings: &DenoiserSettings,
        seed: u64,
    ) {
        denoiser
            .update(camera(eye), settings, RenderMode::Hybrid)
            .unwrap();

        draw_floor(denoiser);
        draw_radiance(denoiser, seed, 0.05);
        denoiser.render();
    }

    fn history_len(denoiser: &CpuDenoiser, channel: Channel, pos: UVec2) -> f32 {
        gpu::HistoryLength::decode(
            denoiser
                .image(Resource::HistoryLength(channel, Slot::Current))
                .get(pos),
        )
    }

    /// Renders the current frame once more, returning outputs of the pre-blur
    /// and of the temporal accumulation.
    ///
    /// Rendering doesn't touch the previous layer, so re-rendering the same
    /// frame yields the same result.
    fn intermediates(
        denoiser: &mut CpuDenoiser,
        channel: Channel,
    ) -> (Image, Image) {
        denoiser.set_debug_view(DebugView::PreBlur);
        denoiser.render();

        let pre_blur = denoiser.debug_view(channel).unwrap().clone();

        denoiser.set_debug_view(DebugView::Accumulated);
        denoiser.render();

        let accumulated = denoiser.debug_view(channel).unwrap().clone();

        denoiser.set_debug_view(DebugView::None);

        (pre_blur, accumulated)
    }

    #[test]
    fn static_scene_converges() {
        let settings = DenoiserSettings {
            max_history_length: 32,
            blur_kernel_rotation_mode: RotationMode::None,
            ..Default::default()
        };

        let eye = vec3(0.0, 5.0, 0.0);
        let mut denoiser = CpuDenoiser::new(camera(eye)).unwrap();
        let mut prev_lens = vec![0.0; (SIZE.x * SIZE.y) as usize];
        let mut prev_outputs: Option<[Image; 2]> = None;

        for frame_idx in 0..40 {
            frame(&mut denoiser, eye, &settings, 1234 + frame_idx);

            let mut lens = Vec::new();

            for channel in Channel::ALL {
                for pos in denoiser.output(channel).positions() {
                    lens.push(history_len(&denoiser, channel, pos));
                }
            }

            for (len, prev_len) in lens.iter().zip(&prev_lens) {
                assert!(
                    len >= prev_len,
                    "frame {frame_idx}: history length went down"
                );
            }

            if frame_idx == 39 {
                assert!(lens.iter().all(|&len| len == 32.0));

                let prev_outputs = prev_outputs.as_ref().unwrap();

                for (channel, prev_output) in Channel::ALL.iter().zip(prev_outputs)
                {
                    let output = denoiser.output(*channel);

                    for (curr, prev) in
                        output.pixels().iter().zip(prev_output.pixels())
                    {
                        let delta = (curr.xyz() - prev.xyz()).abs().max_element()
                            / prev.xyz().abs().max_element().max(0.001);

                        assert!(delta < 0.001, "{channel:?}: delta={delta}");
                    }
                }
            }

            prev_lens = lens;
            prev_outputs = Some(Channel::ALL.map(|ch| denoiser.output(ch).clone()));

            denoiser.advance_frame();
        }
    }

    #[test]
    fn teleport_falls_back_to_pre_blur() {
        let settings = DenoiserSettings::default();
        let mut denoiser =
            CpuDenoiser::new(camera(vec3(0.0, 5.0, 0.0))).unwrap();

        for frame_idx in 0..6 {
            let eye = vec3(1000.0 * frame_idx as f32, 5.0, 0.0);

            frame(&mut denoiser, eye, &settings, frame_idx);

            for channel in Channel::ALL {
                let (pre_blur, accumulated) =
                    intermediates(&mut denoiser, channel);

                assert_eq!(pre_blur, accumulated);

                for pos in pre_blur.positions() {
                    assert_eq!(1.0, history_len(&denoiser, channel, pos));
                }
            }

            denoiser.advance_frame();
        }
    }

    #[test]
    fn panning_disoccludes_pixels() {
        let settings = DenoiserSettings::default();
        let mut denoiser =
            CpuDenoiser::new(camera(vec3(0.0, 5.0, 0.0))).unwrap();

        // Roughly 20% of the viewport's width
        let step = 0.2 * 2.0 * 5.0 * 30.0f32.to_radians().tan();

        for frame_idx in 0..5 {
            let eye = vec3(step * frame_idx as f32, 5.0, 0.0);
            let prev_eye = vec3(step * (frame_idx as f32 - 1.0), 5.0, 0.0);

            frame(&mut denoiser, eye, &settings, frame_idx);

            if frame_idx == 0 {
                denoiser.advance_frame();
                continue;
            }

            let prev_camera = camera(prev_eye).serialize();
            let world_pos = denoiser
                .image(Resource::GBuffer(GBufferTarget::WorldPosition, Slot::Current))
                .clone();

            for channel in Channel::ALL {
                let (pre_blur, accumulated) =
                    intermediates(&mut denoiser, channel);

                let mut disoccluded = 0;

                for pos in world_pos.positions() {
                    let prev_pos = prev_camera
                        .world_to_pixel(world_pos.get(pos).xyz())
                        .unwrap();

                    let is_outside = prev_pos.x < -1.5
                        || prev_pos.x > SIZE.x as f32 + 0.5;

                    let is_inside = prev_pos.x > 1.5
                        && prev_pos.x < SIZE.x as f32 - 2.5;

                    let len = history_len(&denoiser, channel, pos);

                    if is_outside {
                        disoccluded += 1;

                        assert_eq!(1.0, len);
                        assert_eq!(pre_blur.get(pos), accumulated.get(pos));
                    }

                    if is_inside {
                        assert!(len >= 2.0);
                    }
                }

                let total = SIZE.x * SIZE.y;

                assert!(
                    disoccluded * 10 > total,
                    "only {disoccluded} out of {total} pixels got disoccluded"
                );
            }

            denoiser.advance_frame();
        }
    }

    #[test]
    fn history_clear_resets_history() {
        let settings = DenoiserSettings::default();
        let eye = vec3(0.0, 5.0, 0.0);
        let mut denoiser = CpuDenoiser::new(camera(eye)).unwrap();

        for frame_idx in 0..5 {
            frame(&mut denoiser, eye, &settings, frame_idx);
            denoiser.advance_frame();
        }

        denoiser.request_history_clear();
        denoiser.prepare();

        for channel in Channel::ALL {
            for resource in [
                Resource::HistoryLength(channel, Slot::Previous),
                Resource::StabilizationHistory(channel, Slot::Previous),
            ] {
                assert!(denoiser
                    .image(resource)
                    .pixels()
                    .iter()
                    .all(|&px| px == Vec4::ZERO));
            }
        }

        frame(&mut denoiser, eye, &settings, 5);

        for channel in Channel::ALL {
            for pos in denoiser.output(channel).positions() {
                assert_eq!(1.0, history_len(&denoiser, channel, pos));
            }
        }

        denoiser.advance_frame();
        frame(&mut denoiser, eye, &settings, 6);

        assert_eq!(2.0, history_len(&denoiser, Channel::DIFFUSE, uvec2(9, 9)));
    }

    #[test]
    fn mode_switch_resets_history() {
        let settings = DenoiserSettings::default();
        let eye = vec3(0.0, 5.0, 0.0);
        let mut denoiser = CpuDenoiser::new(camera(eye)).unwrap();

        for frame_idx in 0..3 {
            frame(&mut denoiser, eye, &settings, frame_idx);
            denoiser.advance_frame();
        }

        assert!(!denoiser.history.is_clear_requested());

        denoiser
            .update(camera(eye), &settings, RenderMode::PathTracer)
            .unwrap();

        draw_floor(&mut denoiser);
        draw_radiance(&mut denoiser, 3, 0.05);
        denoiser.render();

        assert_eq!(1.0, history_len(&denoiser, Channel::SPECULAR, uvec2(4, 4)));
    }

    #[test]
    fn resize_resets_history() {
        let settings = DenoiserSettings::default();
        let eye = vec3(0.0, 5.0, 0.0);
        let mut denoiser = CpuDenoiser::new(camera(eye)).unwrap();

        for frame_idx in 0..3 {
            frame(&mut denoiser, eye, &settings, frame_idx);
            denoiser.advance_frame();
        }

        let camera = Camera {
            viewport_size: uvec2(16, 8),
            ..camera(eye)
        };

        denoiser
            .update(camera, &settings, RenderMode::Hybrid)
            .unwrap();

        assert!(denoiser.history.is_clear_requested());
        assert_eq!(uvec2(16, 8), denoiser.output(Channel::DIFFUSE).size());
    }

    #[test]
    fn degenerate_input_never_yields_nans() {
        let settings = DenoiserSettings::default();
        let eye = vec3(0.0, 5.0, 0.0);
        let mut denoiser = CpuDenoiser::new(camera(eye)).unwrap();

        for frame_idx in 0..3 {
            denoiser
                .update(camera(eye), &settings, RenderMode::Hybrid)
                .unwrap();

            // First frame is all sky, the rest is a floor
            if frame_idx > 0 {
                draw_floor(&mut denoiser);
            }

            for channel in Channel::ALL {
                let radiance = denoiser.radiance_mut(channel);

                radiance.fill(vec4(1.0, 1.0, 1.0, 5.0));
                radiance.set(uvec2(3, 3), Vec4::splat(f32::NAN));
                radiance.set(uvec2(20, 7), Vec4::splat(f32::INFINITY));
                radiance.set(uvec2(21, 7), Vec4::splat(f32::NEG_INFINITY));
            }

            denoiser.render();

            for channel in Channel::ALL {
                assert!(denoiser
                    .output(channel)
                    .pixels()
                    .iter()
                    .all(|px| px.is_finite()));
            }

            denoiser.advance_frame();
        }
    }

    #[test]
    fn all_history_fixes_work() {
        let eye = vec3(0.0, 5.0, 0.0);

        for (history_fix, use_alternative_history_fix) in
            [(false, false), (true, false), (true, true)]
        {
            let settings = DenoiserSettings {
                history_fix,
                use_alternative_history_fix,
                ..Default::default()
            };

            let mut denoiser = CpuDenoiser::new(camera(eye)).unwrap();

            for frame_idx in 0..3 {
                frame(&mut denoiser, eye, &settings, frame_idx);

                for channel in Channel::ALL {
                    for px in denoiser.output(channel).pixels() {
                        assert!(px.is_finite());
                        assert!((px.x - 1.0).abs() < 0.1, "{px}");
                    }
                }

                denoiser.advance_frame();
            }
        }
    }

    #[test]
    fn invalid_updates() {
        let eye = vec3(0.0, 5.0, 0.0);
        let mut denoiser = CpuDenoiser::new(camera(eye)).unwrap();

        let settings = DenoiserSettings {
            blur_radius: -1.0,
            ..Default::default()
        };

        assert!(matches!(
            denoiser.update(camera(eye), &settings, RenderMode::Hybrid),
            Err(Error::InvalidSetting {
                name: "blur_radius",
                ..
            })
        ));

        let camera = Camera {
            viewport_size: uvec2(0, 8),
            ..camera(eye)
        };

        assert!(matches!(
            denoiser.update(camera.clone(), &Default::default(), RenderMode::Hybrid),
            Err(Error::EmptyViewport { .. })
        ));

        assert!(matches!(
            CpuDenoiser::new(camera),
            Err(Error::EmptyViewport { .. })
        ));
    }
}
