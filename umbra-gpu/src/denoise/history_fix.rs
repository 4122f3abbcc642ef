use glam::{ivec2, uvec2, vec4, UVec2, Vec2, Vec4};
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

use crate::{
    geometry_weight, lerp, normal_weight, Camera, DenoiserParams, F32Ext,
    GBuffer, HistoryLength, Tex, Vec4Ext, NORMAL_WEIGHT_POWER, UMBRA_EPSILON,
};

/// Number of levels of the history-fix mip chain.
pub const HISTORY_FIX_MIP_LEVELS: u32 = 5;

/// Maximum relative view-Z difference for two texels to be considered part
/// of the same surface.
pub const HISTORY_FIX_DEPTH_TOLERANCE: f32 = 0.1;

/// Radius (relative to view-Z) of the world-space neighbourhood the sparse
/// history fix gathers from.
pub const HISTORY_FIX_WORLD_RADIUS: f32 = 0.25;

/// Returns how much given pixel needs fixing: `1.0` for a pixel without any
/// history, down to `0.0` once its history reaches the configured cap.
pub fn history_fix_freshness(
    params: &DenoiserParams,
    history_len: f32,
) -> f32 {
    (1.0 - history_len / params.max_history_length()).saturate()
}

/// Returns level of the mip chain a pixel of given freshness reads from.
pub fn history_fix_mip_level(freshness: f32) -> u32 {
    ((freshness * HISTORY_FIX_MIP_LEVELS as f32) as u32)
        .min(HISTORY_FIX_MIP_LEVELS - 1)
}

/// Returns size of given level of the mip chain; level zero is half of the
/// screen.
pub fn history_fix_mip_size(screen_size: UVec2, level: u32) -> UVec2 {
    (screen_size >> (level + 1)).max(UVec2::ONE)
}

fn depth_weight(reference: f32, view_z: f32) -> f32 {
    if view_z <= 0.0 {
        return 0.0;
    }

    let threshold =
        (reference * HISTORY_FIX_DEPTH_TOLERANCE).max(UMBRA_EPSILON);

    (1.0 - (view_z - reference).abs() / threshold).saturate()
}

/// Depth-aware 2x2 downsample used to build the history-fix mip chain.
///
/// Each output texel averages those source texels that lay near the closest
/// of the four, so that background doesn't bleed into foreground (and vice
/// versa); view-Z of zero marks texels without geometry.
pub struct HistoryFixDownsample;

impl HistoryFixDownsample {
    /// Generates level zero, straight from the full-resolution radiance and
    /// the g-buffer; returns (radiance, view-Z).
    pub fn first<T>(
        camera: &Camera,
        gbuffer: &GBuffer<T>,
        input: &T,
        pos: UVec2,
    ) -> (Vec4, f32)
    where
        T: Tex,
    {
        Self::run(camera.screen_size(), pos, |pos| {
            (
                input.read(pos).sanitize(),
                gbuffer.view_z(camera, pos),
            )
        })
    }

    /// Generates level `level` (at least one) out of the level just above.
    pub fn next<T>(
        screen_size: UVec2,
        level: u32,
        radiance: &T,
        view_z: &T,
        pos: UVec2,
    ) -> (Vec4, f32)
    where
        T: Tex,
    {
        let src_size = history_fix_mip_size(screen_size, level.max(1) - 1);

        Self::run(src_size, pos, |pos| {
            (radiance.read(pos), unpack_view_z(view_z.read(pos)))
        })
    }

    fn run(
        src_size: UVec2,
        pos: UVec2,
        fetch: impl Fn(UVec2) -> (Vec4, f32),
    ) -> (Vec4, f32) {
        let src_max = src_size - UVec2::ONE;

        let taps = [
            (pos * 2).min(src_max),
            (pos * 2 + uvec2(1, 0)).min(src_max),
            (pos * 2 + uvec2(0, 1)).min(src_max),
            (pos * 2 + uvec2(1, 1)).min(src_max),
        ];

        let samples = [
            fetch(taps[0]),
            fetch(taps[1]),
            fetch(taps[2]),
            fetch(taps[3]),
        ];

        let mut reference = f32::MAX;
        let mut idx = 0;

        while idx < 4 {
            if samples[idx].1 > 0.0 {
                reference = reference.min(samples[idx].1);
            }

            idx += 1;
        }

        if reference == f32::MAX {
            return (Vec4::ZERO, 0.0);
        }

        let mut radiance = Vec4::ZERO;
        let mut view_z = 0.0;
        let mut weight_sum = 0.0;
        let mut idx = 0;

        while idx < 4 {
            let weight = depth_weight(reference, samples[idx].1);

            if weight > 0.0 {
                radiance += samples[idx].0 * weight;
                view_z += samples[idx].1 * weight;
                weight_sum += weight;
            }

            idx += 1;
        }

        (radiance / weight_sum, view_z / weight_sum)
    }
}

/// Reconstructs radiance of pixels with short history out of the mip chain:
/// the fresher the pixel, the coarser the level it reads.
pub struct HistoryFixMip<'a, T> {
    pub params: &'a DenoiserParams,
    pub camera: &'a Camera,
    pub gbuffer: &'a GBuffer<T>,
    pub input: &'a T,
    pub history_len: &'a T,
}

impl<'a, T> HistoryFixMip<'a, T>
where
    T: Tex,
{
    /// `mips` returns (radiance, view-Z) of given texel at given level.
    pub fn run(
        &self,
        pos: UVec2,
        mips: impl Fn(u32, UVec2) -> (Vec4, f32),
    ) -> Vec4 {
        let center = self.input.read(pos).sanitize();
        let surface = self.gbuffer.get(pos);

        if surface.is_sky() {
            return center;
        }

        let len = HistoryLength::decode(self.history_len.read(pos));
        let freshness = history_fix_freshness(self.params, len);

        if freshness <= 0.0 {
            return center;
        }

        let level = history_fix_mip_level(freshness);

        let view_z = self.camera.view_z(surface.world_pos);
        let mip_size = history_fix_mip_size(self.camera.screen_size(), level);
        let mip_scale = (1 << (level + 1)) as f32;

        let mip_pos = (pos.as_vec2() + 0.5) / mip_scale - 0.5;
        let mip_pos = mip_pos.max(Vec2::ZERO);
        let origin = mip_pos.floor().as_ivec2();
        let uv = mip_pos - mip_pos.floor();
        let mip_max = mip_size.as_ivec2() - 1;

        let taps = [
            (origin, (1.0 - uv.x) * (1.0 - uv.y)),
            (origin + ivec2(1, 0), uv.x * (1.0 - uv.y)),
            (origin + ivec2(0, 1), (1.0 - uv.x) * uv.y),
            (origin + ivec2(1, 1), uv.x * uv.y),
        ];

        let mut fixed = Vec4::ZERO;
        let mut weight_sum = 0.0;
        let mut idx = 0;

        while idx < 4 {
            let (tap_pos, bilinear) = taps[idx];
            let tap_pos = tap_pos.min(mip_max).as_uvec2();
            let (tap, tap_view_z) = mips(level, tap_pos);
            let weight = bilinear * depth_weight(view_z, tap_view_z);

            if weight > 0.0 {
                fixed += tap * weight;
                weight_sum += weight;
            }

            idx += 1;
        }

        if weight_sum <= UMBRA_EPSILON {
            return center;
        }

        lerp(center, fixed / weight_sum, freshness)
    }
}

/// Reconstructs radiance of pixels with short history out of a wide, sparse
/// neighbourhood of the full-resolution buffer.
pub struct HistoryFixSparse<'a, T> {
    pub params: &'a DenoiserParams,
    pub camera: &'a Camera,
    pub gbuffer: &'a GBuffer<T>,
    pub input: &'a T,
    pub history_len: &'a T,
}

impl<'a, T> HistoryFixSparse<'a, T>
where
    T: Tex,
{
    pub fn run(&self, pos: UVec2) -> Vec4 {
        let center = self.input.read(pos).sanitize();
        let surface = self.gbuffer.get(pos);

        if surface.is_sky() {
            return center;
        }

        let len = HistoryLength::decode(self.history_len.read(pos));
        let freshness = history_fix_freshness(self.params, len);

        if freshness <= 0.0 {
            return center;
        }

        let view_z = self.camera.view_z(surface.world_pos);
        let stride = self.params.history_fix_stride.max(1.0) as i32;
        let world_radius =
            (view_z * HISTORY_FIX_WORLD_RADIUS).max(UMBRA_EPSILON);

        let mut fixed = center;
        let mut weight_sum = 1.0;
        let mut y = -2;

        while y <= 2 {
            let mut x = -2;

            while x <= 2 {
                let sample_pos = pos.as_ivec2() + ivec2(x, y) * stride;

                x += 1;

                if sample_pos == pos.as_ivec2()
                    || !self.camera.contains(sample_pos)
                {
                    continue;
                }

                let sample_pos = sample_pos.as_uvec2();
                let sample_surface = self.gbuffer.get(sample_pos);

                if sample_surface.is_sky() {
                    continue;
                }

                let world_dist =
                    surface.world_pos.distance(sample_surface.world_pos);

                let weight = geometry_weight(
                    &surface,
                    &sample_surface,
                    view_z,
                    self.params.plane_dist_sensitivity,
                ) * normal_weight(
                    surface.normal,
                    sample_surface.normal,
                    NORMAL_WEIGHT_POWER,
                ) * (1.0 - world_dist / world_radius).saturate();

                if weight > 0.0 {
                    fixed += self.input.read(sample_pos).sanitize() * weight;
                    weight_sum += weight;
                }
            }

            y += 1;
        }

        lerp(center, fixed / weight_sum, freshness)
    }
}

/// Packs view-Z into the mip chain's single-channel texture format.
pub fn pack_view_z(view_z: f32) -> Vec4 {
    vec4(view_z, 0.0, 0.0, 0.0)
}

/// Unpacks value stored through [`pack_view_z()`].
pub fn unpack_view_z(d0: Vec4) -> f32 {
    d0.x
}
