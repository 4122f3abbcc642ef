use log::debug;

use super::{DenoiserBuffers, DenoiserComputePass};
use crate::buffers::BindGroup;
use crate::graph::{PassGraph, PassNode};
use crate::{Engine, FrameContext};

/// Compute passes of all of the graph's nodes, in the graph's order.
#[derive(Debug)]
pub struct DenoiserPasses {
    passes: Vec<DenoiserComputePass>,
}

impl DenoiserPasses {
    pub fn new(
        engine: &Engine,
        device: &wgpu::Device,
        graph: &PassGraph,
        buffers: &DenoiserBuffers,
    ) -> Self {
        debug!("Initializing denoiser passes");

        let cameras = buffers.cameras.curr();
        let prev_cameras = buffers.cameras.past();

        let passes = graph
            .nodes()
            .iter()
            .map(|node| {
                let globals =
                    BindGroup::builder(format!("{}_globals", node.label))
                        .add(&buffers.params)
                        .add(&cameras)
                        .add(&prev_cameras)
                        .build(device);

                let textures = Self::textures(device, node, buffers);

                DenoiserComputePass::new(
                    device,
                    node,
                    engine.shaders().get(node.kernel),
                    globals,
                    textures,
                )
            })
            .collect();

        Self { passes }
    }

    fn textures(
        device: &wgpu::Device,
        node: &PassNode,
        buffers: &DenoiserBuffers,
    ) -> BindGroup {
        let reads: Vec<_> = node
            .reads
            .iter()
            .map(|&resource| buffers.bind_readable(resource))
            .collect();

        let writes: Vec<_> = node
            .writes
            .iter()
            .map(|&resource| buffers.bind_writable(resource))
            .collect();

        let mut textures =
            BindGroup::builder(format!("{}_textures", node.label));

        for read in &reads {
            textures = textures.add(read);
        }

        for write in &writes {
            textures = textures.add(write);
        }

        textures.build(device)
    }

    /// Records all passes; `after` gets called once each pass is recorded.
    pub fn run(
        &self,
        ctx: &FrameContext,
        encoder: &mut wgpu::CommandEncoder,
        screen_size: glam::UVec2,
        mut after: impl FnMut(&mut wgpu::CommandEncoder, &PassNode),
    ) {
        for pass in &self.passes {
            pass.run(ctx, encoder, screen_size);
            after(encoder, pass.node());
        }
    }
}
