use glam::{ivec2, vec4, IVec2, UVec2, Vec2, Vec4};
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

use crate::{is_on_plane, Camera, GBuffer, Surface, Tex, UMBRA_EPSILON};

/// Minimum cosine between current and previous normal for a history tap to be
/// considered the same surface (roughly 25 degrees).
pub const REPROJECTION_NORMAL_THRESHOLD: f32 = 0.9;

/// Maximum metalness difference between current and previous surface; larger
/// differences mean a different material got uncovered.
pub const REPROJECTION_MATERIAL_THRESHOLD: f32 = 0.5;

/// Reprojected positions closer than this to a pixel center are snapped onto
/// it, so that a static camera reads the history exactly instead of through a
/// (slightly blurry) bilinear filter.
pub const REPROJECTION_SNAP: f32 = 0.001;

/// Current pixel's location in the previous frame, together with the weights
/// of the four bilinear taps that survived geometry validation.
#[derive(Clone, Copy, Default)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug, PartialEq))]
pub struct Reprojection {
    /// Top-left tap of the bilinear footprint
    pub origin: IVec2,

    /// Weights of taps at (0, 0), (1, 0), (0, 1) and (1, 1)
    pub weights: Vec4,
}

impl Reprojection {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_some(&self) -> bool {
        self.weights.dot(Vec4::ONE) > UMBRA_EPSILON
    }

    pub fn is_none(&self) -> bool {
        !self.is_some()
    }

    pub fn taps(&self) -> [IVec2; 4] {
        [
            self.origin,
            self.origin + ivec2(1, 0),
            self.origin + ivec2(0, 1),
            self.origin + ivec2(1, 1),
        ]
    }

    /// Filters history through the surviving taps; `sample` returns value of
    /// given tap together with its extra weight (zero to reject it, e.g. when
    /// there's no history there).
    ///
    /// Returns the filtered value in `xyzw` and the total weight of taps that
    /// contributed to it.
    pub fn filter(
        &self,
        sample: impl Fn(UVec2) -> (Vec4, f32),
    ) -> (Vec4, f32) {
        let taps = self.taps();
        let mut value = Vec4::ZERO;
        let mut weight_sum = 0.0;
        let mut idx = 0;

        while idx < 4 {
            let weight = self.weights[idx];

            if weight > 0.0 {
                let (tap_value, tap_weight) = sample(taps[idx].as_uvec2());
                let weight = weight * tap_weight;

                if weight > 0.0 {
                    value += tap_value * weight;
                    weight_sum += weight;
                }
            }

            idx += 1;
        }

        if weight_sum > UMBRA_EPSILON {
            (value / weight_sum, weight_sum)
        } else {
            (Vec4::ZERO, 0.0)
        }
    }
}

/// Finds where pixels of the current frame were located in the previous one.
pub struct Reprojector<'a, T> {
    pub camera: &'a Camera,
    pub prev_camera: &'a Camera,
    pub prev_gbuffer: &'a GBuffer<T>,
    pub plane_dist_sensitivity: f32,
}

impl<'a, T> Reprojector<'a, T>
where
    T: Tex,
{
    pub fn reproject(&self, surface: &Surface) -> Reprojection {
        if surface.is_sky() {
            return Reprojection::none();
        }

        let Some(mut prev_pos) = self.prev_camera.world_to_pixel(surface.world_pos)
        else {
            return Reprojection::none();
        };

        if is_pixel_center(prev_pos) {
            prev_pos = prev_pos.round();
        }

        let origin = prev_pos.floor().as_ivec2();
        let uv = prev_pos - prev_pos.floor();

        let bilinear = vec4(
            (1.0 - uv.x) * (1.0 - uv.y),
            uv.x * (1.0 - uv.y),
            (1.0 - uv.x) * uv.y,
            uv.x * uv.y,
        );

        let mut reprojection = Reprojection {
            origin,
            weights: Vec4::ZERO,
        };

        let view_z = self.camera.view_z(surface.world_pos);
        let taps = reprojection.taps();
        let mut idx = 0;

        while idx < 4 {
            if bilinear[idx] > 0.0 && self.is_valid_tap(surface, view_z, taps[idx])
            {
                reprojection.weights[idx] = bilinear[idx];
            }

            idx += 1;
        }

        reprojection
    }

    fn is_valid_tap(&self, surface: &Surface, view_z: f32, pos: IVec2) -> bool {
        if !self.prev_camera.contains(pos) {
            return false;
        }

        let prev = self.prev_gbuffer.get(pos.as_uvec2());

        if prev.is_sky() {
            return false;
        }

        if !is_on_plane(surface, prev.world_pos, view_z, self.plane_dist_sensitivity)
        {
            return false;
        }

        if surface.normal.dot(prev.normal) < REPROJECTION_NORMAL_THRESHOLD {
            return false;
        }

        (surface.metalness - prev.metalness).abs() <= REPROJECTION_MATERIAL_THRESHOLD
    }
}

/// Returns whether given continuous pixel coordinates land exactly on a pixel
/// center.
pub fn is_pixel_center(pos: Vec2) -> bool {
    (pos - pos.round()).abs().max_element() < REPROJECTION_SNAP
}
