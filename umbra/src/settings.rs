use glam::{vec4, Vec4};

use crate::{gpu, Error, Result};

/// How the spatial filters' disc kernel gets rotated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-1", derive(serde::Serialize, serde::Deserialize))]
pub enum RotationMode {
    /// Kernel is never rotated
    None,

    /// Kernel is rotated by the same angle for the entire frame
    #[default]
    PerFrame,

    /// Kernel is rotated by frame's angle plus a per-pixel noise
    PerPixel,
}

/// Knobs of the denoiser.
///
/// Validated (see [`Self::validate()`]) and snapshotted into
/// [`gpu::DenoiserParams`] once per frame; changing a setting never affects a
/// frame that's already being rendered.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-1", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-1", serde(default))]
pub struct DenoiserSettings {
    /// Radius of the pre-blur, in pixels
    pub prepass_blur_radius: f32,

    /// Radius of the main blur, in pixels
    pub blur_radius: f32,

    /// Radius of the post blur, relative to [`Self::blur_radius`]
    pub post_blur_radius_scale: f32,

    /// (min. hit distance, max. hit distance, roughness weight, min. radius
    /// scale) used to scale post blur's radius, see `hit_dist_scaling`
    pub hit_distance_params: Vec4,

    pub temporal_accumulation: bool,
    pub history_fix: bool,

    /// Whether the history fix should use the single-pass sparse filter
    /// instead of the mip chain
    pub use_alternative_history_fix: bool,

    /// Distance between taps of the sparse history fix, in pixels
    pub history_fix_stride: f32,

    pub temporal_stabilization: bool,

    /// How much of the stabilization history gets kept (`0.0` = none)
    pub stabilization_strength: f32,

    /// Maximum distance between a sample and center's plane, relative to the
    /// center's view-Z
    pub plane_dist_sensitivity: f32,

    pub blur_kernel_rotation_mode: RotationMode,
    pub frame_num_scaling: bool,
    pub hit_dist_scaling: bool,
    pub use_gaussian_weight: bool,
    pub use_geometry_weight: bool,
    pub use_normal_weight: bool,
    pub use_hit_distance_weight: bool,
    pub spec_accum_base_power: f32,
    pub spec_accum_curve: f32,

    /// Maximum history length, in frames
    pub max_history_length: u32,
}

impl DenoiserSettings {
    pub fn validate(&self) -> Result<()> {
        fn check(
            name: &'static str,
            valid: bool,
            reason: &'static str,
        ) -> Result<()> {
            if valid {
                Ok(())
            } else {
                Err(Error::InvalidSetting { name, reason })
            }
        }

        fn non_negative(name: &'static str, value: f32) -> Result<()> {
            check(
                name,
                value.is_finite() && value >= 0.0,
                "must be a finite, non-negative number",
            )
        }

        fn factor(name: &'static str, value: f32) -> Result<()> {
            check(
                name,
                value.is_finite() && (0.0..=1.0).contains(&value),
                "must be within <0.0, 1.0>",
            )
        }

        non_negative("prepass_blur_radius", self.prepass_blur_radius)?;
        non_negative("blur_radius", self.blur_radius)?;
        non_negative("post_blur_radius_scale", self.post_blur_radius_scale)?;
        non_negative("spec_accum_curve", self.spec_accum_curve)?;
        factor("stabilization_strength", self.stabilization_strength)?;
        factor("spec_accum_base_power", self.spec_accum_base_power)?;

        check(
            "history_fix_stride",
            self.history_fix_stride.is_finite()
                && self.history_fix_stride >= 1.0,
            "must be at least one pixel",
        )?;

        check(
            "plane_dist_sensitivity",
            self.plane_dist_sensitivity.is_finite()
                && self.plane_dist_sensitivity > 0.0,
            "must be a finite, positive number",
        )?;

        check(
            "hit_distance_params",
            self.hit_distance_params.is_finite(),
            "must be finite",
        )?;

        check(
            "hit_distance_params",
            self.hit_distance_params.x >= 0.0
                && self.hit_distance_params.x < self.hit_distance_params.y,
            "min. hit distance must be non-negative and below max. hit distance",
        )?;

        check(
            "hit_distance_params",
            self.hit_distance_params.z >= 0.0,
            "roughness weight must be non-negative",
        )?;

        factor("hit_distance_params.w", self.hit_distance_params.w)?;

        check(
            "max_history_length",
            (1..=gpu::HISTORY_LENGTH_LIMIT).contains(&self.max_history_length),
            "must be within <1, 255>",
        )?;

        Ok(())
    }

    /// Snapshots these settings into parameters of given frame.
    pub fn to_params(&self, frame: u32) -> gpu::DenoiserParams {
        let mut flags = 0;

        let mut flag = |enabled: bool, flag: u32| {
            if enabled {
                flags |= flag;
            }
        };

        flag(
            self.temporal_accumulation,
            gpu::DenoiserParams::FLAG_TEMPORAL_ACCUMULATION,
        );
        flag(
            self.frame_num_scaling,
            gpu::DenoiserParams::FLAG_FRAME_NUM_SCALING,
        );
        flag(
            self.hit_dist_scaling,
            gpu::DenoiserParams::FLAG_HIT_DIST_SCALING,
        );
        flag(
            self.use_gaussian_weight,
            gpu::DenoiserParams::FLAG_GAUSSIAN_WEIGHT,
        );
        flag(
            self.use_geometry_weight,
            gpu::DenoiserParams::FLAG_GEOMETRY_WEIGHT,
        );
        flag(
            self.use_normal_weight,
            gpu::DenoiserParams::FLAG_NORMAL_WEIGHT,
        );
        flag(
            self.use_hit_distance_weight,
            gpu::DenoiserParams::FLAG_HIT_DISTANCE_WEIGHT,
        );
        flag(
            self.blur_kernel_rotation_mode == RotationMode::PerPixel,
            gpu::DenoiserParams::FLAG_PER_PIXEL_ROTATION,
        );
        flag(
            self.temporal_stabilization,
            gpu::DenoiserParams::FLAG_TEMPORAL_STABILIZATION,
        );

        let rotation = match self.blur_kernel_rotation_mode {
            RotationMode::None => 0.0,
            RotationMode::PerFrame | RotationMode::PerPixel => {
                gpu::frame_rotation(frame)
            }
        };

        gpu::DenoiserParams {
            prepass_blur_radius: self.prepass_blur_radius,
            blur_radius: self.blur_radius,
            post_blur_radius_scale: self.post_blur_radius_scale,
            history_fix_stride: self.history_fix_stride,
            hit_distance_params: self.hit_distance_params,
            stabilization_strength: self.stabilization_strength,
            plane_dist_sensitivity: self.plane_dist_sensitivity,
            spec_accum_base_power: self.spec_accum_base_power,
            spec_accum_curve: self.spec_accum_curve,
            rotation,
            frame,
            max_history_length: self.max_history_length,
            flags,
        }
    }
}

impl Default for DenoiserSettings {
    fn default() -> Self {
        Self {
            prepass_blur_radius: 30.0,
            blur_radius: 15.0,
            post_blur_radius_scale: 2.0,
            hit_distance_params: vec4(0.1, 20.0, 1.0, 0.25),
            temporal_accumulation: true,
            history_fix: true,
            use_alternative_history_fix: false,
            history_fix_stride: 14.0,
            temporal_stabilization: true,
            stabilization_strength: 0.8,
            plane_dist_sensitivity: 0.02,
            blur_kernel_rotation_mode: RotationMode::PerFrame,
            frame_num_scaling: true,
            hit_dist_scaling: true,
            use_gaussian_weight: true,
            use_geometry_weight: true,
            use_normal_weight: true,
            use_hit_distance_weight: true,
            spec_accum_base_power: 0.25,
            spec_accum_curve: 1.0,
            max_history_length: 32,
        }
    }
}
