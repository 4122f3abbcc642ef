//! Device-independent description of a frame's dispatches.
//!
//! Both the wgpu backend and the CPU executor are driven by the very same
//! [`PassGraph`], so the order of passes and the resources they touch are
//! spelled out only once.

use std::fmt;

use glam::{uvec2, UVec2};

use crate::gpu::{self, Channel, SpatialFilterStage};
use crate::{Error, FrameContext, Layer, PingPong, Result};

/// Layer of a double-buffered resource, relative to the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    Current,
    Previous,
}

/// One of the textures that make up a g-buffer layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GBufferTarget {
    Depth,
    NormalRoughness,
    BaseColorMetalness,
    WorldPosition,
}

impl GBufferTarget {
    pub const ALL: [Self; 4] = [
        Self::Depth,
        Self::NormalRoughness,
        Self::BaseColorMetalness,
        Self::WorldPosition,
    ];

    pub fn format(self) -> wgpu::TextureFormat {
        match self {
            Self::Depth => wgpu::TextureFormat::R32Float,
            Self::NormalRoughness => wgpu::TextureFormat::Rgba16Float,
            Self::BaseColorMetalness => wgpu::TextureFormat::Rgba8Unorm,
            Self::WorldPosition => wgpu::TextureFormat::Rgba32Float,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Depth => "depth",
            Self::NormalRoughness => "normal_roughness",
            Self::BaseColorMetalness => "base_color_metalness",
            Self::WorldPosition => "world_position",
        }
    }
}

/// Texture used by the denoiser; `L` tells how layered resources are
/// addressed - relative to the frame ([`Slot`]) or absolutely ([`Layer`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource<L = Slot> {
    GBuffer(GBufferTarget, L),

    /// Noisy radiance (+ hit distance) written by the ray-tracing stage
    Radiance(Channel),

    Ping(Channel),
    Pong(Channel),
    DenoiserOutput(Channel, L),
    HistoryLength(Channel, L),
    StabilizationHistory(Channel, L),
    Occlusion(Channel),
    RadianceMip(Channel, u32),
    ViewZMip(Channel, u32),

    /// Copy of an intermediate buffer, see [`crate::DebugView`]
    Debug(Channel),
}

impl Resource<Slot> {
    pub fn resolve(self, ctx: &FrameContext) -> Resource<Layer> {
        self.map_layer(|slot| ctx.resolve(slot))
    }
}

impl<L> Resource<L> {
    pub fn map_layer<M>(self, f: impl FnOnce(L) -> M) -> Resource<M> {
        match self {
            Self::GBuffer(target, l) => Resource::GBuffer(target, f(l)),
            Self::Radiance(ch) => Resource::Radiance(ch),
            Self::Ping(ch) => Resource::Ping(ch),
            Self::Pong(ch) => Resource::Pong(ch),
            Self::DenoiserOutput(ch, l) => Resource::DenoiserOutput(ch, f(l)),
            Self::HistoryLength(ch, l) => Resource::HistoryLength(ch, f(l)),
            Self::StabilizationHistory(ch, l) => {
                Resource::StabilizationHistory(ch, f(l))
            }
            Self::Occlusion(ch) => Resource::Occlusion(ch),
            Self::RadianceMip(ch, level) => Resource::RadianceMip(ch, level),
            Self::ViewZMip(ch, level) => Resource::ViewZMip(ch, level),
            Self::Debug(ch) => Resource::Debug(ch),
        }
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        match self {
            Self::GBuffer(target, _) => target.format(),
            Self::Radiance(_) => wgpu::TextureFormat::Rgba32Float,
            Self::HistoryLength(..) | Self::Occlusion(_) => {
                wgpu::TextureFormat::Rgba8Unorm
            }
            Self::ViewZMip(..) => wgpu::TextureFormat::R32Float,
            Self::Ping(_)
            | Self::Pong(_)
            | Self::DenoiserOutput(..)
            | Self::StabilizationHistory(..)
            | Self::RadianceMip(..)
            | Self::Debug(_) => wgpu::TextureFormat::Rgba16Float,
        }
    }

    /// Returns size of this texture for given viewport.
    pub fn size(&self, screen_size: UVec2) -> UVec2 {
        match self {
            Self::RadianceMip(_, level) | Self::ViewZMip(_, level) => {
                gpu::history_fix_mip_size(screen_size, *level)
            }
            _ => screen_size,
        }
    }
}

impl Resource<Layer> {
    /// Returns all of the textures the denoiser allocates.
    pub fn all() -> Vec<Self> {
        let mut resources = Vec::new();

        for layer in [Layer::A, Layer::B] {
            for target in GBufferTarget::ALL {
                resources.push(Self::GBuffer(target, layer));
            }
        }

        for channel in Channel::ALL {
            resources.push(Self::Radiance(channel));
            resources.push(Self::Ping(channel));
            resources.push(Self::Pong(channel));
            resources.push(Self::Occlusion(channel));
            resources.push(Self::Debug(channel));

            for layer in [Layer::A, Layer::B] {
                resources.push(Self::DenoiserOutput(channel, layer));
                resources.push(Self::HistoryLength(channel, layer));
                resources.push(Self::StabilizationHistory(channel, layer));
            }

            for level in 0..gpu::HISTORY_FIX_MIP_LEVELS {
                resources.push(Self::RadianceMip(channel, level));
                resources.push(Self::ViewZMip(channel, level));
            }
        }

        resources
    }
}

impl<L> fmt::Display for Resource<L>
where
    L: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GBuffer(target, l) => {
                write!(f, "gbuffer_{}_{l:?}", target.name())
            }
            Self::Radiance(ch) => write!(f, "{}_radiance", ch.name()),
            Self::Ping(ch) => write!(f, "{}_ping", ch.name()),
            Self::Pong(ch) => write!(f, "{}_pong", ch.name()),
            Self::DenoiserOutput(ch, l) => {
                write!(f, "{}_denoiser_output_{l:?}", ch.name())
            }
            Self::HistoryLength(ch, l) => {
                write!(f, "{}_history_length_{l:?}", ch.name())
            }
            Self::StabilizationHistory(ch, l) => {
                write!(f, "{}_stabilization_history_{l:?}", ch.name())
            }
            Self::Occlusion(ch) => write!(f, "{}_occlusion", ch.name()),
            Self::RadianceMip(ch, level) => {
                write!(f, "{}_radiance_mip{level}", ch.name())
            }
            Self::ViewZMip(ch, level) => {
                write!(f, "{}_view_z_mip{level}", ch.name())
            }
            Self::Debug(ch) => write!(f, "{}_debug", ch.name()),
        }
    }
}

/// Per-pixel program a pass runs; each one has a matching shader entry point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kernel {
    PreBlur,
    TemporalAccumulation,
    HistoryFixDownsampleFirst,
    HistoryFixDownsample,
    HistoryFixMip,
    HistoryFixSparse,
    SpatialFilter,
    TemporalStabilization,
}

impl Kernel {
    pub const ALL: [Self; 8] = [
        Self::PreBlur,
        Self::TemporalAccumulation,
        Self::HistoryFixDownsampleFirst,
        Self::HistoryFixDownsample,
        Self::HistoryFixMip,
        Self::HistoryFixSparse,
        Self::SpatialFilter,
        Self::TemporalStabilization,
    ];

    /// Name of the shader crate's module implementing this kernel.
    pub fn shader(self) -> &'static str {
        match self {
            Self::PreBlur => "pre_blur",
            Self::TemporalAccumulation => "temporal_accumulation",
            Self::HistoryFixDownsampleFirst => "history_fix_downsample_first",
            Self::HistoryFixDownsample => "history_fix_downsample",
            Self::HistoryFixMip => "history_fix_mip",
            Self::HistoryFixSparse => "history_fix_sparse",
            Self::SpatialFilter => "spatial_filter",
            Self::TemporalStabilization => "temporal_stabilization",
        }
    }
}

/// How the history fix is performed; picked when the pipeline is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HistoryFix {
    Disabled,

    /// Depth-aware mip chain + a fix pass reading from it
    Mip,

    /// Single pass over a wide, sparse neighbourhood
    Sparse,
}

impl HistoryFix {
    pub fn new(enabled: bool, use_alternative: bool) -> Self {
        match (enabled, use_alternative) {
            (false, _) => Self::Disabled,
            (true, false) => Self::Mip,
            (true, true) => Self::Sparse,
        }
    }
}

/// Area a pass is dispatched over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Extent {
    Screen,
    Mip(u32),
}

impl Extent {
    pub fn size(self, screen_size: UVec2) -> UVec2 {
        match self {
            Extent::Screen => screen_size,
            Extent::Mip(level) => gpu::history_fix_mip_size(screen_size, level),
        }
    }
}

/// Single dispatch of a frame.
///
/// Bindings follow the order of `reads` and then `writes`, matching the
/// layout of descriptor set 1 of the kernel's shader.
#[derive(Clone, Debug, PartialEq)]
pub struct PassNode {
    pub label: String,
    pub kernel: Kernel,
    pub channel: Channel,
    pub stage: SpatialFilterStage,
    pub level: u32,
    pub reads: Vec<Resource>,
    pub writes: Vec<Resource>,
}

impl PassNode {
    fn new(kernel: Kernel, channel: Channel) -> Self {
        Self {
            label: format!("{}_{}", channel.name(), kernel.shader()),
            kernel,
            channel,
            stage: SpatialFilterStage::PreBlur,
            level: 0,
            reads: Vec::new(),
            writes: Vec::new(),
        }
    }

    fn stage(mut self, stage: SpatialFilterStage) -> Self {
        let stage_name = match stage {
            SpatialFilterStage::PreBlur => "pre",
            SpatialFilterStage::Main => "main",
            SpatialFilterStage::Post => "post",
        };

        self.label = format!("{}_{}_blur", self.channel.name(), stage_name);
        self.stage = stage;
        self
    }

    fn level(mut self, level: u32) -> Self {
        self.label = format!("{}{}", self.label, level);
        self.level = level;
        self
    }

    fn read(mut self, resources: impl IntoIterator<Item = Resource>) -> Self {
        self.reads.extend(resources);
        self
    }

    fn write(mut self, resources: impl IntoIterator<Item = Resource>) -> Self {
        self.writes.extend(resources);
        self
    }

    pub fn params(&self) -> gpu::PassParams {
        gpu::PassParams {
            channel: self.channel.get(),
            stage: self.stage.get(),
            level: self.level,
            _pad: 0,
        }
    }

    pub fn extent(&self) -> Extent {
        match self.kernel {
            Kernel::HistoryFixDownsampleFirst | Kernel::HistoryFixDownsample => {
                Extent::Mip(self.level)
            }
            _ => Extent::Screen,
        }
    }

    /// Returns number of 8x8 workgroups needed to cover the pass' extent.
    pub fn workgroups(&self, screen_size: UVec2) -> UVec2 {
        let size = self.extent().size(screen_size);

        uvec2((size.x + 7) / 8, (size.y + 7) / 8)
    }
}

/// All dispatches of a frame, in the order they get recorded.
#[derive(Clone, Debug, PartialEq)]
pub struct PassGraph {
    history_fix: HistoryFix,
    nodes: Vec<PassNode>,
}

impl PassGraph {
    pub fn new(history_fix: HistoryFix) -> Self {
        let mut nodes = Vec::new();

        for channel in Channel::ALL {
            Self::build_channel(&mut nodes, channel, history_fix);
        }

        Self { history_fix, nodes }
    }

    fn build_channel(
        nodes: &mut Vec<PassNode>,
        channel: Channel,
        history_fix: HistoryFix,
    ) {
        let gbuffer =
            |slot: Slot| GBufferTarget::ALL.map(|t| Resource::GBuffer(t, slot));
        let curr_gbuffer = gbuffer(Slot::Current);
        let prev_gbuffer = gbuffer(Slot::Previous);
        let history_len = Resource::HistoryLength(channel, Slot::Current);
        let mut pp = PingPong::new(channel);

        nodes.push(
            PassNode::new(Kernel::PreBlur, channel)
                .read(curr_gbuffer)
                .read([Resource::Radiance(channel)])
                .write([pp.write()]),
        );

        pp.flip();

        nodes.push(
            PassNode::new(Kernel::TemporalAccumulation, channel)
                .read(curr_gbuffer)
                .read(prev_gbuffer)
                .read([
                    pp.read(),
                    Resource::DenoiserOutput(channel, Slot::Previous),
                    Resource::HistoryLength(channel, Slot::Previous),
                ])
                .write([
                    pp.write(),
                    history_len,
                    Resource::Occlusion(channel),
                ]),
        );

        pp.flip();

        match history_fix {
            HistoryFix::Disabled => {}

            HistoryFix::Mip => {
                nodes.push(
                    PassNode::new(Kernel::HistoryFixDownsampleFirst, channel)
                        .read(curr_gbuffer)
                        .read([pp.read()])
                        .write([
                            Resource::RadianceMip(channel, 0),
                            Resource::ViewZMip(channel, 0),
                        ]),
                );

                for level in 1..gpu::HISTORY_FIX_MIP_LEVELS {
                    nodes.push(
                        PassNode::new(Kernel::HistoryFixDownsample, channel)
                            .level(level)
                            .read([
                                Resource::RadianceMip(channel, level - 1),
                                Resource::ViewZMip(channel, level - 1),
                            ])
                            .write([
                                Resource::RadianceMip(channel, level),
                                Resource::ViewZMip(channel, level),
                            ]),
                    );
                }

                let levels = 0..gpu::HISTORY_FIX_MIP_LEVELS;

                nodes.push(
                    PassNode::new(Kernel::HistoryFixMip, channel)
                        .read(curr_gbuffer)
                        .read([pp.read(), history_len])
                        .read(levels.clone().map(|l| Resource::RadianceMip(channel, l)))
                        .read(levels.map(|l| Resource::ViewZMip(channel, l)))
                        .write([pp.write()]),
                );

                pp.flip();
            }

            HistoryFix::Sparse => {
                nodes.push(
                    PassNode::new(Kernel::HistoryFixSparse, channel)
                        .read(curr_gbuffer)
                        .read([pp.read(), history_len])
                        .write([pp.write()]),
                );

                pp.flip();
            }
        }

        nodes.push(
            PassNode::new(Kernel::SpatialFilter, channel)
                .stage(SpatialFilterStage::Main)
                .read(curr_gbuffer)
                .read([pp.read(), history_len])
                .write([pp.write()]),
        );

        pp.flip();

        nodes.push(
            PassNode::new(Kernel::SpatialFilter, channel)
                .stage(SpatialFilterStage::Post)
                .read(curr_gbuffer)
                .read([pp.read(), history_len])
                .write([Resource::DenoiserOutput(channel, Slot::Current)]),
        );

        nodes.push(
            PassNode::new(Kernel::TemporalStabilization, channel)
                .read(curr_gbuffer)
                .read(prev_gbuffer)
                .read([
                    Resource::DenoiserOutput(channel, Slot::Current),
                    Resource::StabilizationHistory(channel, Slot::Previous),
                    Resource::Occlusion(channel),
                ])
                .write([Resource::StabilizationHistory(
                    channel,
                    Slot::Current,
                )]),
        );
    }

    pub fn history_fix(&self) -> HistoryFix {
        self.history_fix
    }

    pub fn nodes(&self) -> &[PassNode] {
        &self.nodes
    }

    /// Makes sure no pass reads and writes the same texture, under both
    /// layer assignments.
    pub fn validate(&self) -> Result<()> {
        for frame in 0..2 {
            let ctx = FrameContext::new(frame);

            for node in &self.nodes {
                let reads: Vec<_> =
                    node.reads.iter().map(|read| read.resolve(&ctx)).collect();

                let writes: Vec<_> = node
                    .writes
                    .iter()
                    .map(|write| write.resolve(&ctx))
                    .collect();

                for (idx, write) in writes.iter().enumerate() {
                    if reads.contains(write) || writes[..idx].contains(write) {
                        return Err(Error::AliasedResource {
                            pass: node.label.clone(),
                            resource: write.to_string(),
                        });
                    }
                }
            }
        }

        Ok(())
    }

    /// Returns the last node that writes given resource.
    pub fn last_writer(&self, resource: Resource) -> Option<&PassNode> {
        self.nodes
            .iter()
            .rev()
            .find(|node| node.writes.contains(&resource))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_FIXES: [HistoryFix; 3] =
        [HistoryFix::Disabled, HistoryFix::Mip, HistoryFix::Sparse];

    fn kernels(graph: &PassGraph, channel: Channel) -> Vec<Kernel> {
        graph
            .nodes()
            .iter()
            .filter(|node| node.channel == channel)
            .map(|node| node.kernel)
            .collect()
    }

    #[test]
    fn order() {
        let graph = PassGraph::new(HistoryFix::Sparse);

        for channel in Channel::ALL {
            assert_eq!(
                vec![
                    Kernel::PreBlur,
                    Kernel::TemporalAccumulation,
                    Kernel::HistoryFixSparse,
                    Kernel::SpatialFilter,
                    Kernel::SpatialFilter,
                    Kernel::TemporalStabilization,
                ],
                kernels(&graph, channel)
            );
        }

        let graph = PassGraph::new(HistoryFix::Mip);
        let kernels = kernels(&graph, Channel::DIFFUSE);

        assert_eq!(11, kernels.len());
        assert_eq!(Kernel::HistoryFixDownsampleFirst, kernels[2]);
        assert_eq!(Kernel::HistoryFixDownsample, kernels[6]);
        assert_eq!(Kernel::HistoryFixMip, kernels[7]);

        let graph = PassGraph::new(HistoryFix::Disabled);

        assert_eq!(5, self::kernels(&graph, Channel::SPECULAR).len());
    }

    #[test]
    fn ping_pong_never_aliases() {
        for history_fix in ALL_FIXES {
            PassGraph::new(history_fix).validate().unwrap();
        }
    }

    #[test]
    fn aliasing_is_detected() {
        let mut graph = PassGraph::new(HistoryFix::Mip);

        graph.nodes[0].writes = vec![Resource::Radiance(Channel::DIFFUSE)];

        assert!(matches!(
            graph.validate(),
            Err(Error::AliasedResource { .. })
        ));

        // Previous and current layers never alias, but the same slot does
        let mut graph = PassGraph::new(HistoryFix::Mip);
        let node = graph.nodes.len() - 1;

        graph.nodes[node].writes = vec![Resource::StabilizationHistory(
            Channel::SPECULAR,
            Slot::Previous,
        )];

        assert!(graph.validate().is_err());
    }

    #[test]
    fn each_pass_reads_what_the_previous_one_wrote() {
        for history_fix in ALL_FIXES {
            let graph = PassGraph::new(history_fix);

            for channel in Channel::ALL {
                let nodes: Vec<_> = graph
                    .nodes()
                    .iter()
                    .filter(|node| node.channel == channel)
                    .filter(|node| {
                        !matches!(
                            node.kernel,
                            Kernel::HistoryFixDownsampleFirst
                                | Kernel::HistoryFixDownsample
                        )
                    })
                    .collect();

                for pair in nodes.windows(2) {
                    let output = pair[0].writes[0];

                    assert!(
                        pair[1].reads.contains(&output),
                        "{} doesn't read {output} written by {}",
                        pair[1].label,
                        pair[0].label,
                    );
                }
            }
        }
    }

    #[test]
    fn channels_are_separate() {
        let graph = PassGraph::new(HistoryFix::Mip);

        for node in graph.nodes() {
            for resource in node.reads.iter().chain(&node.writes) {
                match resource {
                    Resource::GBuffer(..) => (),
                    Resource::Radiance(ch)
                    | Resource::Ping(ch)
                    | Resource::Pong(ch)
                    | Resource::DenoiserOutput(ch, _)
                    | Resource::HistoryLength(ch, _)
                    | Resource::StabilizationHistory(ch, _)
                    | Resource::Occlusion(ch)
                    | Resource::RadianceMip(ch, _)
                    | Resource::ViewZMip(ch, _)
                    | Resource::Debug(ch) => {
                        assert_eq!(node.channel, *ch);
                    }
                }
            }
        }
    }

    #[test]
    fn workgroups() {
        let graph = PassGraph::new(HistoryFix::Mip);
        let screen = uvec2(100, 60);

        let pre_blur = &graph.nodes()[0];

        assert_eq!(uvec2(13, 8), pre_blur.workgroups(screen));

        let mip = graph
            .nodes()
            .iter()
            .find(|node| node.kernel == Kernel::HistoryFixDownsample)
            .unwrap();

        assert_eq!(Extent::Mip(1), mip.extent());
        assert_eq!(uvec2(25, 15), Extent::Mip(1).size(screen));
        assert_eq!(uvec2(4, 2), mip.workgroups(screen));
        assert_eq!(1, mip.params().level);
    }

    #[test]
    fn stages() {
        let graph = PassGraph::new(HistoryFix::Disabled);

        let stages: Vec<_> = graph
            .nodes()
            .iter()
            .filter(|node| node.kernel == Kernel::SpatialFilter)
            .map(|node| (node.channel, node.stage))
            .collect();

        assert_eq!(
            vec![
                (Channel::DIFFUSE, SpatialFilterStage::Main),
                (Channel::DIFFUSE, SpatialFilterStage::Post),
                (Channel::SPECULAR, SpatialFilterStage::Main),
                (Channel::SPECULAR, SpatialFilterStage::Post),
            ],
            stages
        );
    }

    #[test]
    fn resource_formats() {
        assert_eq!(
            wgpu::TextureFormat::Rgba8Unorm,
            Resource::<Slot>::HistoryLength(Channel::DIFFUSE, Slot::Current)
                .format()
        );

        assert_eq!(
            uvec2(8, 4),
            Resource::<Layer>::RadianceMip(Channel::DIFFUSE, 2)
                .size(uvec2(64, 32))
        );

        // 8 g-buffer textures + 2 * (5 + 6 + 10)
        assert_eq!(50, Resource::<Layer>::all().len());
    }
}
