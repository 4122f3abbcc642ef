use spirv_std::spirv;
use umbra_gpu::prelude::*;

use crate::{Sampled, TexRgba16, TexRgba8, TexSampled};

#[spirv(compute(threads(8, 8)))]
#[allow(clippy::too_many_arguments)]
pub fn main(
    #[spirv(global_invocation_id)] global_id: UVec3,
    #[spirv(push_constant)] pass: &PassParams,
    #[spirv(descriptor_set = 0, binding = 0, uniform)] params: &DenoiserParams,
    #[spirv(descriptor_set = 0, binding = 1, uniform)] camera: &Camera,
    #[spirv(descriptor_set = 0, binding = 2, uniform)] prev_camera: &Camera,
    #[spirv(descriptor_set = 1, binding = 0)] gbuffer_d0: TexSampled,
    #[spirv(descriptor_set = 1, binding = 1)] gbuffer_d1: TexSampled,
    #[spirv(descriptor_set = 1, binding = 2)] gbuffer_d2: TexSampled,
    #[spirv(descriptor_set = 1, binding = 3)] gbuffer_d3: TexSampled,
    #[spirv(descriptor_set = 1, binding = 4)] prev_gbuffer_d0: TexSampled,
    #[spirv(descriptor_set = 1, binding = 5)] prev_gbuffer_d1: TexSampled,
    #[spirv(descriptor_set = 1, binding = 6)] prev_gbuffer_d2: TexSampled,
    #[spirv(descriptor_set = 1, binding = 7)] prev_gbuffer_d3: TexSampled,
    #[spirv(descriptor_set = 1, binding = 8)] input: TexSampled,
    #[spirv(descriptor_set = 1, binding = 9)] prev_output: TexSampled,
    #[spirv(descriptor_set = 1, binding = 10)] prev_history_len: TexSampled,
    #[spirv(descriptor_set = 1, binding = 11)] output: TexRgba16,
    #[spirv(descriptor_set = 1, binding = 12)] history_len: TexRgba8,
    #[spirv(descriptor_set = 1, binding = 13)] occlusion: TexRgba8,
) {
    let screen_pos = global_id.xy();

    if !camera.contains(screen_pos.as_ivec2()) {
        return;
    }

    let gbuffer = GBuffer::new(
        Sampled(gbuffer_d0),
        Sampled(gbuffer_d1),
        Sampled(gbuffer_d2),
        Sampled(gbuffer_d3),
    );

    let prev_gbuffer = GBuffer::new(
        Sampled(prev_gbuffer_d0),
        Sampled(prev_gbuffer_d1),
        Sampled(prev_gbuffer_d2),
        Sampled(prev_gbuffer_d3),
    );

    let out = TemporalAccumulation {
        params,
        camera,
        prev_camera,
        gbuffer: &gbuffer,
        prev_gbuffer: &prev_gbuffer,
        input: &Sampled(input),
        prev_output: &Sampled(prev_output),
        prev_history_len: &Sampled(prev_history_len),
    }
    .run(screen_pos, Channel::new(pass.channel));

    unsafe {
        output.write(screen_pos, out.radiance);
        history_len.write(screen_pos, out.history_len);
        occlusion.write(screen_pos, out.occlusion);
    }
}
