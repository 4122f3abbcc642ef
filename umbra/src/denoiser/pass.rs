use std::mem;

use glam::UVec2;
use log::debug;

use crate::buffers::BindGroup;
use crate::graph::PassNode;
use crate::shaders::Shader;
use crate::{gpu, FrameContext};

const PUSH_CONSTANTS_SIZE: u32 = mem::size_of::<gpu::PassParams>() as u32;

/// Compute pipeline of a single node of the pass graph.
///
/// Descriptor set 0 holds the globals (parameters and both cameras),
/// descriptor set 1 holds the node's reads followed by its writes.
#[derive(Debug)]
pub struct DenoiserComputePass {
    node: PassNode,
    params: gpu::PassParams,
    bind_groups: [BindGroup; 2],
    pipeline: wgpu::ComputePipeline,
}

impl DenoiserComputePass {
    pub fn new(
        device: &wgpu::Device,
        node: &PassNode,
        shader: &Shader,
        globals: BindGroup,
        textures: BindGroup,
    ) -> Self {
        debug!("Initializing pass: {} ({})", node.label, shader.entry_point);

        let pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&format!("umbra_{}_pipeline_layout", node.label)),
                bind_group_layouts: &[globals.layout(), textures.layout()],
                push_constant_ranges: &[wgpu::PushConstantRange {
                    stages: wgpu::ShaderStages::COMPUTE,
                    range: 0..PUSH_CONSTANTS_SIZE,
                }],
            });

        let pipeline =
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(&format!("umbra_{}_pipeline", node.label)),
                layout: Some(&pipeline_layout),
                module: &shader.module,
                entry_point: &shader.entry_point,
            });

        Self {
            node: node.clone(),
            params: node.params(),
            bind_groups: [globals, textures],
            pipeline,
        }
    }

    pub fn node(&self) -> &PassNode {
        &self.node
    }

    pub fn run(
        &self,
        ctx: &FrameContext,
        encoder: &mut wgpu::CommandEncoder,
        screen_size: UVec2,
    ) {
        let label = format!("umbra_{}", self.node.label);
        let workgroups = self.node.workgroups(screen_size);

        let mut pass = encoder.begin_compute_pass(&pass_descriptor(&label));

        pass.set_pipeline(&self.pipeline);
        pass.set_push_constants(0, bytemuck::bytes_of(&self.params));

        for (bind_group, index) in self.bind_groups.iter().zip(0..) {
            pass.set_bind_group(index, bind_group.get(ctx.current), &[]);
        }

        pass.dispatch_workgroups(workgroups.x, workgroups.y, 1);
    }
}

fn pass_descriptor(label: &str) -> wgpu::ComputePassDescriptor<'_> {
    wgpu::ComputePassDescriptor {
        label: Some(label),
        ..Default::default()
    }
}
