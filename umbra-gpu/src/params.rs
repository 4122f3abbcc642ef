use bytemuck::{Pod, Zeroable};
use glam::Vec4;

/// Per-frame snapshot of all of the denoiser's knobs; uploaded once per frame
/// (before any pass runs) and read-only to all of the passes.
#[repr(C)]
#[derive(Clone, Copy, Default, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug, PartialEq))]
pub struct DenoiserParams {
    pub prepass_blur_radius: f32,
    pub blur_radius: f32,
    pub post_blur_radius_scale: f32,
    pub history_fix_stride: f32,

    /// x - min. hit distance, y - max. hit distance, z - roughness weight,
    /// w - min. radius scale
    pub hit_distance_params: Vec4,

    pub stabilization_strength: f32,
    pub plane_dist_sensitivity: f32,
    pub spec_accum_base_power: f32,
    pub spec_accum_curve: f32,

    /// Kernel rotation for this frame, shared by all of the spatial passes
    pub rotation: f32,
    pub frame: u32,
    pub max_history_length: u32,
    pub flags: u32,
}

impl DenoiserParams {
    pub const FLAG_TEMPORAL_ACCUMULATION: u32 = 1 << 0;
    pub const FLAG_FRAME_NUM_SCALING: u32 = 1 << 1;
    pub const FLAG_HIT_DIST_SCALING: u32 = 1 << 2;
    pub const FLAG_GAUSSIAN_WEIGHT: u32 = 1 << 3;
    pub const FLAG_GEOMETRY_WEIGHT: u32 = 1 << 4;
    pub const FLAG_NORMAL_WEIGHT: u32 = 1 << 5;
    pub const FLAG_HIT_DISTANCE_WEIGHT: u32 = 1 << 6;
    pub const FLAG_PER_PIXEL_ROTATION: u32 = 1 << 7;
    pub const FLAG_TEMPORAL_STABILIZATION: u32 = 1 << 8;

    pub fn has(&self, flag: u32) -> bool {
        self.flags & flag == flag
    }

    pub fn max_history_length(&self) -> f32 {
        self.max_history_length.max(1) as f32
    }
}

/// Push-constants shared by all of the denoising passes.
#[repr(C)]
#[derive(Clone, Copy, Default, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug, PartialEq, Eq))]
pub struct PassParams {
    /// See: [`crate::Channel`]
    pub channel: u32,

    /// See: [`crate::SpatialFilterStage`]
    pub stage: u32,

    /// Mip level being generated (history fix only)
    pub level: u32,

    pub _pad: u32,
}
