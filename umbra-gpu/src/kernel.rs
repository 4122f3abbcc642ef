use core::f32::consts::{FRAC_PI_2, PI};

use glam::{vec2, UVec2, Vec2};
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

use crate::DenoiserParams;

/// Number of taps of the spatial filters' disc kernel.
pub const KERNEL_SAMPLES: u32 = 8;

/// Offset applied to the frame number before picking kernel's rotation.
///
/// Only affects which part of the van der Corput sequence gets visited first;
/// any other value works just as well.
pub const KERNEL_ROTATION_OFFSET: u32 = 17;

/// After how many frames kernel's rotation repeats.
pub const KERNEL_ROTATION_PERIOD: u32 = 64;

/// Returns `n`-th element of the base-2 van der Corput sequence.
pub fn van_der_corput(n: u32) -> f32 {
    (n.reverse_bits() as f32) * (1.0 / 4294967296.0)
}

/// Returns `index`-th element of the Halton sequence with given base.
pub fn halton(mut index: u32, base: u32) -> f32 {
    let mut f = 1.0;
    let mut result = 0.0;

    while index > 0 {
        f /= base as f32;
        result += f * ((index % base) as f32);
        index /= base;
    }

    result
}

/// Returns kernel rotation (in radians) for given frame; the same angle is
/// shared by all spatial passes of a frame.
pub fn frame_rotation(frame: u32) -> f32 {
    let idx = frame.wrapping_add(KERNEL_ROTATION_OFFSET) % KERNEL_ROTATION_PERIOD;

    FRAC_PI_2 * van_der_corput(idx)
}

/// Interleaved gradient noise, in range `<0.0, 1.0)`.
///
/// See:
/// - https://www.iryoku.com/next-generation-post-processing-in-call-of-duty-advanced-warfare
pub fn interleaved_gradient_noise(pos: UVec2) -> f32 {
    let pos = pos.as_vec2();

    (52.982_918 * (0.067_110_56 * pos.x + 0.005_837_15 * pos.y).fract()).fract()
}

/// Rotated disc of [`KERNEL_SAMPLES`] taps, whose positions are data-driven by
/// the van der Corput (radius) and Halton (angle) sequences.
#[derive(Clone, Copy)]
pub struct DiscKernel {
    rotation: Vec2,
}

impl DiscKernel {
    pub fn new(angle: f32) -> Self {
        Self {
            rotation: vec2(angle.cos(), angle.sin()),
        }
    }

    /// Creates kernel for given pixel, following the rotation mode configured
    /// in the parameters.
    pub fn for_pixel(params: &DenoiserParams, pos: UVec2) -> Self {
        let mut angle = params.rotation;

        if params.has(DenoiserParams::FLAG_PER_PIXEL_ROTATION) {
            angle += interleaved_gradient_noise(pos) * 2.0 * PI;
        }

        Self::new(angle)
    }

    /// Returns offset of `idx`-th tap, inside the unit disc.
    pub fn tap(&self, idx: u32) -> Vec2 {
        let radius = van_der_corput(idx + 1).sqrt();
        let angle = halton(idx + 1, 3) * 2.0 * PI;
        let dir = vec2(angle.cos(), angle.sin());

        vec2(
            dir.x * self.rotation.x - dir.y * self.rotation.y,
            dir.x * self.rotation.y + dir.y * self.rotation.x,
        ) * radius
    }
}
