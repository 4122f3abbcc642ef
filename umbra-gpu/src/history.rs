use glam::{vec4, Vec4};
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

use crate::{Channel, DenoiserParams, F32Ext};

/// Largest history length that fits the 8-bit normalized storage.
pub const HISTORY_LENGTH_LIMIT: u32 = 255;

/// History length past which `frame_num_scaling` starts favoring recent
/// frames over the plain running average.
pub const FRAME_NUM_SCALING_KNEE: f32 = 8.0;

/// Per-pixel number of frames accumulated so far, stored as a normalized
/// 8-bit channel.
pub struct HistoryLength;

impl HistoryLength {
    pub fn encode(len: f32) -> Vec4 {
        let len = len.clamp(0.0, HISTORY_LENGTH_LIMIT as f32);

        vec4(len / (HISTORY_LENGTH_LIMIT as f32), 0.0, 0.0, 1.0)
    }

    pub fn decode(d0: Vec4) -> f32 {
        (d0.x * (HISTORY_LENGTH_LIMIT as f32)).round()
    }
}

/// Occlusion data written by temporal accumulation and consumed by temporal
/// stabilization - tells whether pixel's history was reprojected successfully
/// in this frame.
pub struct Occlusion;

impl Occlusion {
    pub fn encode(valid: bool) -> Vec4 {
        if valid {
            Vec4::ONE
        } else {
            vec4(0.0, 0.0, 0.0, 1.0)
        }
    }

    pub fn decode(d0: Vec4) -> bool {
        d0.x > 0.5
    }
}

/// Returns the weight given to the current frame's sample when blending it
/// with a history of given (already incremented) length.
///
/// Diffuse uses a plain running average (`1 / len`), optionally bent past
/// [`FRAME_NUM_SCALING_KNEE`] so that long histories keep reacting to slowly
/// changing lighting.
///
/// Specular additionally never goes below
/// `spec_accum_base_power * (1 - roughness) ^ spec_accum_curve`, since glossy
/// reflections move with the camera and need to respond faster.
pub fn accumulation_weight(
    params: &DenoiserParams,
    channel: Channel,
    len: f32,
    roughness: f32,
) -> f32 {
    let len = len.max(1.0);

    let mut weight = if params.has(DenoiserParams::FLAG_FRAME_NUM_SCALING)
        && len > FRAME_NUM_SCALING_KNEE
    {
        1.0 / (FRAME_NUM_SCALING_KNEE + (len - FRAME_NUM_SCALING_KNEE).sqrt())
    } else {
        1.0 / len
    };

    if channel.is_specular() {
        let floor = params.spec_accum_base_power
            * (1.0 - roughness.saturate()).powf(params.spec_accum_curve);

        weight = weight.max(floor);
    }

    weight.saturate()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn history_length_encoding() {
        for len in [0.0, 1.0, 2.0, 31.0, 32.0, 255.0] {
            assert_eq!(len, HistoryLength::decode(HistoryLength::encode(len)));
        }

        assert_eq!(255.0, HistoryLength::decode(HistoryLength::encode(1000.0)));
        assert_eq!(0.0, HistoryLength::decode(Vec4::ZERO));
    }

    #[test]
    fn history_length_survives_8bit_quantization() {
        for len in 0..=255 {
            let stored = HistoryLength::encode(len as f32).x;
            let quantized = (stored * 255.0).round() / 255.0;

            assert_eq!(
                len as f32,
                HistoryLength::decode(vec4(quantized, 0.0, 0.0, 0.0))
            );
        }
    }

    #[test]
    fn occlusion_encoding() {
        assert!(Occlusion::decode(Occlusion::encode(true)));
        assert!(!Occlusion::decode(Occlusion::encode(false)));
        assert!(!Occlusion::decode(Vec4::ZERO));
    }

    fn params(flags: u32) -> DenoiserParams {
        DenoiserParams {
            spec_accum_base_power: 0.2,
            spec_accum_curve: 2.0,
            max_history_length: 32,
            flags,
            ..Default::default()
        }
    }

    #[test]
    fn diffuse_running_average() {
        let params = params(0);

        assert_eq!(1.0, accumulation_weight(&params, Channel::DIFFUSE, 1.0, 0.0));
        assert_eq!(0.5, accumulation_weight(&params, Channel::DIFFUSE, 2.0, 0.0));

        assert_relative_eq!(
            1.0 / 32.0,
            accumulation_weight(&params, Channel::DIFFUSE, 32.0, 0.0)
        );
    }

    #[test]
    fn frame_num_scaling_favors_recent_frames_past_the_knee() {
        let plain = params(0);
        let scaled = params(DenoiserParams::FLAG_FRAME_NUM_SCALING);

        for len in 1..=8 {
            let len = len as f32;

            assert_eq!(
                accumulation_weight(&plain, Channel::DIFFUSE, len, 0.0),
                accumulation_weight(&scaled, Channel::DIFFUSE, len, 0.0),
            );
        }

        let mut prev = 1.0;

        for len in 10..=64 {
            let len = len as f32;
            let w_plain = accumulation_weight(&plain, Channel::DIFFUSE, len, 0.0);
            let w_scaled = accumulation_weight(&scaled, Channel::DIFFUSE, len, 0.0);

            assert!(w_scaled > w_plain);
            assert!(w_scaled < prev);

            prev = w_scaled;
        }
    }

    #[test]
    fn specular_floor() {
        let params = params(0);

        // Mirror: never goes below the base power
        assert_relative_eq!(
            0.2,
            accumulation_weight(&params, Channel::SPECULAR, 32.0, 0.0)
        );

        // Fully rough: same as diffuse
        assert_relative_eq!(
            1.0 / 32.0,
            accumulation_weight(&params, Channel::SPECULAR, 32.0, 1.0)
        );

        // Young history still follows the running average
        assert_eq!(
            1.0,
            accumulation_weight(&params, Channel::SPECULAR, 1.0, 0.0)
        );
    }
}
