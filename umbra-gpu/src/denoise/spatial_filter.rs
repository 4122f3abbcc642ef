use glam::{UVec2, Vec4};
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

use crate::{
    gaussian_weight, geometry_weight, hit_distance_radius_scale,
    hit_distance_weight, lerp, normal_weight, normal_weight_power,
    normalize_hit_distance, Camera, Channel, DenoiserParams, DiscKernel,
    GBuffer, Tex, Vec4Ext, KERNEL_SAMPLES, UMBRA_EPSILON,
};

/// Which of the three spatial passes is being run; they share the kernel, but
/// differ in radius and in the weights they apply.
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug, Hash))]
pub enum SpatialFilterStage {
    PreBlur,
    Main,
    Post,
}

impl SpatialFilterStage {
    pub fn new(id: u32) -> Self {
        match id {
            0 => Self::PreBlur,
            1 => Self::Main,
            _ => Self::Post,
        }
    }

    pub fn get(self) -> u32 {
        match self {
            Self::PreBlur => 0,
            Self::Main => 1,
            Self::Post => 2,
        }
    }
}

/// Edge-aware blur over a rotated disc of [`KERNEL_SAMPLES`] taps.
pub struct SpatialFilter<'a, T> {
    pub params: &'a DenoiserParams,
    pub camera: &'a Camera,
    pub gbuffer: &'a GBuffer<T>,
    pub input: &'a T,
}

impl<'a, T> SpatialFilter<'a, T>
where
    T: Tex,
{
    /// Returns filtered value of given pixel.
    ///
    /// `history_len` is the pixel's (current) history length, used to shrink
    /// the radius of the main and post blur as the history converges; it's
    /// ignored for the pre-blur.
    pub fn run(
        &self,
        pos: UVec2,
        channel: Channel,
        stage: SpatialFilterStage,
        history_len: f32,
    ) -> Vec4 {
        let center = self.input.read(pos).sanitize();
        let surface = self.gbuffer.get(pos);

        if surface.is_sky() {
            return center;
        }

        let radius =
            self.radius(stage, history_len, center.w, surface.roughness);

        if radius < UMBRA_EPSILON {
            return center;
        }

        let (geometry, normal, gaussian, hit_distance) = self.weights(stage);
        let view_z = self.camera.view_z(surface.world_pos);
        let normal_power =
            normal_weight_power(channel.is_specular(), surface.roughness);

        let center_hit_dist = normalize_hit_distance(
            center.w,
            self.params.hit_distance_params,
        );

        let kernel = DiscKernel::for_pixel(self.params, pos);

        let mut value = center;
        let mut weight_sum = 1.0;
        let mut idx = 0;

        while idx < KERNEL_SAMPLES {
            let offset = kernel.tap(idx);
            let sample_pos =
                (pos.as_vec2() + offset * radius).round().as_ivec2();

            idx += 1;

            if !self.camera.contains(sample_pos) {
                continue;
            }

            let sample_pos = sample_pos.as_uvec2();
            let sample_surface = self.gbuffer.get(sample_pos);

            if sample_surface.is_sky() {
                continue;
            }

            let sample = self.input.read(sample_pos).sanitize();
            let mut weight = 1.0;

            if geometry {
                weight *= geometry_weight(
                    &surface,
                    &sample_surface,
                    view_z,
                    self.params.plane_dist_sensitivity,
                );
            }

            if normal {
                weight *= normal_weight(
                    surface.normal,
                    sample_surface.normal,
                    normal_power,
                );
            }

            if gaussian {
                weight *= gaussian_weight(offset.length());
            }

            if hit_distance {
                weight *= hit_distance_weight(
                    center_hit_dist,
                    normalize_hit_distance(
                        sample.w,
                        self.params.hit_distance_params,
                    ),
                );
            }

            if weight > 0.0 {
                value += sample * weight;
                weight_sum += weight;
            }
        }

        if weight_sum > UMBRA_EPSILON {
            value / weight_sum
        } else {
            center
        }
    }

    fn radius(
        &self,
        stage: SpatialFilterStage,
        history_len: f32,
        hit_dist: f32,
        roughness: f32,
    ) -> f32 {
        let radius = match stage {
            SpatialFilterStage::PreBlur => {
                return self.params.prepass_blur_radius.max(0.0);
            }
            SpatialFilterStage::Main => self.params.blur_radius,
            SpatialFilterStage::Post => {
                let mut radius = self.params.blur_radius
                    * self.params.post_blur_radius_scale;

                if self.params.has(DenoiserParams::FLAG_HIT_DIST_SCALING) {
                    radius *= hit_distance_radius_scale(
                        hit_dist,
                        roughness,
                        self.params.hit_distance_params,
                    );
                }

                radius
            }
        };

        let convergence = history_len / self.params.max_history_length();

        (radius * lerp(1.0, 0.5, convergence)).max(0.0)
    }

    /// Returns which of the (geometry, normal, gaussian, hit distance)
    /// weights are active for given stage.
    fn weights(&self, stage: SpatialFilterStage) -> (bool, bool, bool, bool) {
        let gaussian = self.params.has(DenoiserParams::FLAG_GAUSSIAN_WEIGHT);

        if stage == SpatialFilterStage::PreBlur {
            (true, true, gaussian, false)
        } else {
            (
                self.params.has(DenoiserParams::FLAG_GEOMETRY_WEIGHT),
                self.params.has(DenoiserParams::FLAG_NORMAL_WEIGHT),
                gaussian,
                self.params.has(DenoiserParams::FLAG_HIT_DISTANCE_WEIGHT),
            )
        }
    }
}
