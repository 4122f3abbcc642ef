use spirv_std::spirv;
use umbra_gpu::prelude::*;

use crate::{Sampled, TexR32, TexRgba16, TexSampled};

#[spirv(compute(threads(8, 8)))]
#[allow(clippy::too_many_arguments)]
pub fn main(
    #[spirv(global_invocation_id)] global_id: UVec3,
    #[spirv(descriptor_set = 0, binding = 1, uniform)] camera: &Camera,
    #[spirv(descriptor_set = 1, binding = 0)] gbuffer_d0: TexSampled,
    #[spirv(descriptor_set = 1, binding = 1)] gbuffer_d1: TexSampled,
    #[spirv(descriptor_set = 1, binding = 2)] gbuffer_d2: TexSampled,
    #[spirv(descriptor_set = 1, binding = 3)] gbuffer_d3: TexSampled,
    #[spirv(descriptor_set = 1, binding = 4)] input: TexSampled,
    #[spirv(descriptor_set = 1, binding = 5)] out_radiance: TexRgba16,
    #[spirv(descriptor_set = 1, binding = 6)] out_view_z: TexR32,
) {
    let mip_pos = global_id.xy();
    let mip_size = history_fix_mip_size(camera.screen_size(), 0);

    if mip_pos.x >= mip_size.x || mip_pos.y >= mip_size.y {
        return;
    }

    let gbuffer = GBuffer::new(
        Sampled(gbuffer_d0),
        Sampled(gbuffer_d1),
        Sampled(gbuffer_d2),
        Sampled(gbuffer_d3),
    );

    let (radiance, view_z) =
        HistoryFixDownsample::first(camera, &gbuffer, &Sampled(input), mip_pos);

    unsafe {
        out_radiance.write(mip_pos, radiance);
        out_view_z.write(mip_pos, pack_view_z(view_z));
    }
}
