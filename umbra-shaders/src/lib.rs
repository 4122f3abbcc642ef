#![cfg_attr(target_arch = "spirv", no_std)]

pub mod history_fix_downsample;
pub mod history_fix_downsample_first;
pub mod history_fix_mip;
pub mod history_fix_sparse;
pub mod pre_blur;
pub mod spatial_filter;
pub mod temporal_accumulation;
pub mod temporal_stabilization;

use spirv_std::Image;
use umbra_gpu::prelude::*;

pub type TexSampled<'a> = &'a Image!(2D, type = f32, sampled);
pub type TexR32<'a> = &'a Image!(2D, format = r32f, sampled = false);
pub type TexRgba8<'a> = &'a Image!(2D, format = rgba8, sampled = false);
pub type TexRgba16<'a> = &'a Image!(2D, format = rgba16f, sampled = false);

/// Read-only binding of any texture, regardless of its format.
#[derive(Clone, Copy)]
pub struct Sampled<'a>(pub TexSampled<'a>);

impl Tex for Sampled<'_> {
    fn read(&self, pos: UVec2) -> Vec4 {
        self.0.fetch(pos)
    }
}
