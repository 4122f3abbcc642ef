use spirv_std::spirv;
use umbra_gpu::prelude::*;

use crate::{Sampled, TexR32, TexRgba16, TexSampled};

#[spirv(compute(threads(8, 8)))]
pub fn main(
    #[spirv(global_invocation_id)] global_id: UVec3,
    #[spirv(push_constant)] pass: &PassParams,
    #[spirv(descriptor_set = 0, binding = 1, uniform)] camera: &Camera,
    #[spirv(descriptor_set = 1, binding = 0)] in_radiance: TexSampled,
    #[spirv(descriptor_set = 1, binding = 1)] in_view_z: TexSampled,
    #[spirv(descriptor_set = 1, binding = 2)] out_radiance: TexRgba16,
    #[spirv(descriptor_set = 1, binding = 3)] out_view_z: TexR32,
) {
    let mip_pos = global_id.xy();
    let mip_size = history_fix_mip_size(camera.screen_size(), pass.level);

    if mip_pos.x >= mip_size.x || mip_pos.y >= mip_size.y {
        return;
    }

    let (radiance, view_z) = HistoryFixDownsample::next(
        camera.screen_size(),
        pass.level,
        &Sampled(in_radiance),
        &Sampled(in_view_z),
        mip_pos,
    );

    unsafe {
        out_radiance.write(mip_pos, radiance);
        out_view_z.write(mip_pos, pack_view_z(view_z));
    }
}
