use spirv_std::spirv;
use umbra_gpu::prelude::*;

use crate::{Sampled, TexRgba16, TexSampled};

#[spirv(compute(threads(8, 8)))]
#[allow(clippy::too_many_arguments)]
pub fn main(
    #[spirv(global_invocation_id)] global_id: UVec3,
    #[spirv(descriptor_set = 0, binding = 0, uniform)] params: &DenoiserParams,
    #[spirv(descriptor_set = 0, binding = 1, uniform)] camera: &Camera,
    #[spirv(descriptor_set = 1, binding = 0)] gbuffer_d0: TexSampled,
    #[spirv(descriptor_set = 1, binding = 1)] gbuffer_d1: TexSampled,
    #[spirv(descriptor_set = 1, binding = 2)] gbuffer_d2: TexSampled,
    #[spirv(descriptor_set = 1, binding = 3)] gbuffer_d3: TexSampled,
    #[spirv(descriptor_set = 1, binding = 4)] input: TexSampled,
    #[spirv(descriptor_set = 1, binding = 5)] history_len: TexSampled,
    #[spirv(descriptor_set = 1, binding = 6)] radiance_0: TexSampled,
    #[spirv(descriptor_set = 1, binding = 7)] radiance_1: TexSampled,
    #[spirv(descriptor_set = 1, binding = 8)] radiance_2: TexSampled,
    #[spirv(descriptor_set = 1, binding = 9)] radiance_3: TexSampled,
    #[spirv(descriptor_set = 1, binding = 10)] radiance_4: TexSampled,
    #[spirv(descriptor_set = 1, binding = 11)] view_z_0: TexSampled,
    #[spirv(descriptor_set = 1, binding = 12)] view_z_1: TexSampled,
    #[spirv(descriptor_set = 1, binding = 13)] view_z_2: TexSampled,
    #[spirv(descriptor_set = 1, binding = 14)] view_z_3: TexSampled,
    #[spirv(descriptor_set = 1, binding = 15)] view_z_4: TexSampled,
    #[spirv(descriptor_set = 1, binding = 16)] output: TexRgba16,
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

    let out = HistoryFixMip {
        params,
        camera,
        gbuffer: &gbuffer,
        input: &Sampled(input),
        history_len: &Sampled(history_len),
    }
    .run(screen_pos, |level, pos| {
        let (radiance, view_z) = match level {
            0 => (radiance_0, view_z_0),
            1 => (radiance_1, view_z_1),
            2 => (radiance_2, view_z_2),
            3 => (radiance_3, view_z_3),
            _ => (radiance_4, view_z_4),
        };

        (
            Sampled(radiance).read(pos),
            unpack_view_z(Sampled(view_z).read(pos)),
        )
    });

    unsafe {
        output.write(screen_pos, out);
    }
}
