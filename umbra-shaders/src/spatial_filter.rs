use spirv_std::spirv;
use umbra_gpu::prelude::*;

use crate::{Sampled, TexRgba16, TexSampled};

/// Main blur and post blur; which one is selected through push constants.
#[spirv(compute(threads(8, 8)))]
#[allow(clippy::too_many_arguments)]
pub fn main(
    #[spirv(global_invocation_id)] global_id: UVec3,
    #[spirv(push_constant)] pass: &PassParams,
    #[spirv(descriptor_set = 0, binding = 0, uniform)] params: &DenoiserParams,
    #[spirv(descriptor_set = 0, binding = 1, uniform)] camera: &Camera,
    #[spirv(descriptor_set = 1, binding = 0)] gbuffer_d0: TexSampled,
    #[spirv(descriptor_set = 1, binding = 1)] gbuffer_d1: TexSampled,
    #[spirv(descriptor_set = 1, binding = 2)] gbuffer_d2: TexSampled,
    #[spirv(descriptor_set = 1, binding = 3)] gbuffer_d3: TexSampled,
    #[spirv(descriptor_set = 1, binding = 4)] input: TexSampled,
    #[spirv(descriptor_set = 1, binding = 5)] history_len: TexSampled,
    #[spirv(descriptor_set = 1, binding = 6)] output: TexRgba16,
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

    let history_len =
        HistoryLength::decode(Sampled(history_len).read(screen_pos));

    let out = SpatialFilter {
        params,
        camera,
        gbuffer: &gbuffer,
        input: &Sampled(input),
    }
    .run(
        screen_pos,
        Channel::new(pass.channel),
        SpatialFilterStage::new(pass.stage),
        history_len,
    );

    unsafe {
        output.write(screen_pos, out);
    }
}
