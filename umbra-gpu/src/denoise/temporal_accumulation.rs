use glam::{vec4, UVec2, Vec4};
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

use crate::{
    accumulation_weight, lerp, Camera, Channel, DenoiserParams, GBuffer,
    HistoryLength, Occlusion, Reprojector, Tex, Vec4Ext,
};

/// Blends the pre-blurred radiance with the reprojected output of the previous
/// frame.
pub struct TemporalAccumulation<'a, T> {
    pub params: &'a DenoiserParams,
    pub camera: &'a Camera,
    pub prev_camera: &'a Camera,
    pub gbuffer: &'a GBuffer<T>,
    pub prev_gbuffer: &'a GBuffer<T>,

    /// Pre-blurred radiance of this frame
    pub input: &'a T,

    /// Denoised output of the previous frame
    pub prev_output: &'a T,

    /// History length of the previous frame
    pub prev_history_len: &'a T,
}

#[derive(Clone, Copy)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug, PartialEq))]
pub struct TemporalAccumulationOutput {
    pub radiance: Vec4,

    /// See: [`HistoryLength`]
    pub history_len: Vec4,

    /// See: [`Occlusion`]
    pub occlusion: Vec4,
}

impl TemporalAccumulationOutput {
    fn rejected(radiance: Vec4, history_len: f32) -> Self {
        Self {
            radiance,
            history_len: HistoryLength::encode(history_len),
            occlusion: Occlusion::encode(false),
        }
    }
}

impl<'a, T> TemporalAccumulation<'a, T>
where
    T: Tex,
{
    pub fn run(
        &self,
        pos: UVec2,
        channel: Channel,
    ) -> TemporalAccumulationOutput {
        let input = self.input.read(pos).sanitize();
        let surface = self.gbuffer.get(pos);

        if surface.is_sky() {
            return TemporalAccumulationOutput::rejected(input, 0.0);
        }

        if !self.params.has(DenoiserParams::FLAG_TEMPORAL_ACCUMULATION) {
            return TemporalAccumulationOutput::rejected(input, 1.0);
        }

        let reprojection = Reprojector {
            camera: self.camera,
            prev_camera: self.prev_camera,
            prev_gbuffer: self.prev_gbuffer,
            plane_dist_sensitivity: self.params.plane_dist_sensitivity,
        }
        .reproject(&surface);

        if reprojection.is_none() {
            return TemporalAccumulationOutput::rejected(input, 1.0);
        }

        // Taps without any history (e.g. right after the history got
        // cleared) are treated the same way as disoccluded ones
        let (prev_len, _) = reprojection.filter(|pos| {
            let len = HistoryLength::decode(self.prev_history_len.read(pos));

            (vec4(len, 0.0, 0.0, 0.0), if len >= 1.0 { 1.0 } else { 0.0 })
        });

        let (history, history_weight) = reprojection.filter(|pos| {
            let len = HistoryLength::decode(self.prev_history_len.read(pos));

            if len >= 1.0 {
                (self.prev_output.read(pos).sanitize(), 1.0)
            } else {
                (Vec4::ZERO, 0.0)
            }
        });

        if history_weight <= 0.0 {
            return TemporalAccumulationOutput::rejected(input, 1.0);
        }

        let len = (prev_len.x.round() + 1.0)
            .min(self.params.max_history_length());

        let weight = accumulation_weight(
            self.params,
            channel,
            len,
            surface.roughness,
        );

        TemporalAccumulationOutput {
            radiance: lerp(history, input, weight),
            history_len: HistoryLength::encode(len),
            occlusion: Occlusion::encode(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{uvec2, vec3, Vec3};

    use super::*;
    use crate::denoise::test_utils::*;

    fn params(flags: u32) -> DenoiserParams {
        DenoiserParams {
            plane_dist_sensitivity: 0.02,
            spec_accum_base_power: 0.2,
            spec_accum_curve: 2.0,
            max_history_length: 4,
            flags,
            ..Default::default()
        }
    }

    struct Scene {
        params: DenoiserParams,
        camera: Camera,
        prev_camera: Camera,
        gbuffer: GBuffer<TestTex>,
        prev_gbuffer: GBuffer<TestTex>,
        input: TestTex,
        prev_output: TestTex,
        prev_history_len: TestTex,
    }

    impl Scene {
        fn new(prev_eye: Vec3, eye: Vec3, prev_len: f32) -> Self {
            let curr_camera = camera(eye);
            let prev_camera = camera(prev_eye);

            Self {
                params: params(DenoiserParams::FLAG_TEMPORAL_ACCUMULATION),
                gbuffer: floor(&curr_camera),
                prev_gbuffer: floor(&prev_camera),
                camera: curr_camera,
                prev_camera,
                input: TestTex::filled(SIZE, vec4(1.0, 1.0, 1.0, 1.0)),
                prev_output: TestTex::filled(SIZE, vec4(3.0, 3.0, 3.0, 1.0)),
                prev_history_len: TestTex::filled(
                    SIZE,
                    HistoryLength::encode(prev_len),
                ),
            }
        }

        fn run(
            &self,
            pos: UVec2,
            channel: Channel,
        ) -> TemporalAccumulationOutput {
            TemporalAccumulation {
                params: &self.params,
                camera: &self.camera,
                prev_camera: &self.prev_camera,
                gbuffer: &self.gbuffer,
                prev_gbuffer: &self.prev_gbuffer,
                input: &self.input,
                prev_output: &self.prev_output,
                prev_history_len: &self.prev_history_len,
            }
            .run(pos, channel)
        }
    }

    #[test]
    fn static_camera_accumulates() {
        let eye = vec3(0.0, 5.0, 0.0);
        let scene = Scene::new(eye, eye, 1.0);
        let out = scene.run(uvec2(5, 7), Channel::DIFFUSE);

        assert_eq!(2.0, HistoryLength::decode(out.history_len));
        assert!(Occlusion::decode(out.occlusion));

        // 1 / 2 of the current frame, 1 / 2 of the history
        assert_relative_eq!(2.0, out.radiance.x, epsilon = 0.0001);
    }

    #[test]
    fn history_length_is_capped() {
        let eye = vec3(0.0, 5.0, 0.0);
        let scene = Scene::new(eye, eye, 4.0);
        let out = scene.run(uvec2(5, 7), Channel::DIFFUSE);

        assert_eq!(4.0, HistoryLength::decode(out.history_len));
        assert_relative_eq!(2.5, out.radiance.x, epsilon = 0.0001);
    }

    #[test]
    fn history_length_is_monotonic() {
        let eye = vec3(0.0, 5.0, 0.0);
        let mut prev = 0.0;

        for len in 1..=6 {
            let scene = Scene::new(eye, eye, len as f32);
            let out = scene.run(uvec2(3, 3), Channel::DIFFUSE);
            let curr = HistoryLength::decode(out.history_len);

            assert!(curr >= prev);

            prev = curr;
        }
    }

    #[test]
    fn cleared_history_is_rejected() {
        let eye = vec3(0.0, 5.0, 0.0);
        let scene = Scene::new(eye, eye, 0.0);
        let out = scene.run(uvec2(5, 7), Channel::DIFFUSE);

        assert_eq!(1.0, HistoryLength::decode(out.history_len));
        assert!(!Occlusion::decode(out.occlusion));
        assert_eq!(vec4(1.0, 1.0, 1.0, 1.0), out.radiance);
    }

    #[test]
    fn teleport_is_a_disocclusion() {
        let scene = Scene::new(
            vec3(1000.0, 5.0, 1000.0),
            vec3(0.0, 5.0, 0.0),
            3.0,
        );

        for y in 0..SIZE.y {
            for x in 0..SIZE.x {
                let out = scene.run(uvec2(x, y), Channel::SPECULAR);

                assert_eq!(1.0, HistoryLength::decode(out.history_len));
                assert_eq!(scene.input.read(uvec2(x, y)), out.radiance);
            }
        }
    }

    #[test]
    fn disabled_accumulation_passes_input_through() {
        let eye = vec3(0.0, 5.0, 0.0);
        let mut scene = Scene::new(eye, eye, 3.0);

        scene.params = params(0);

        let out = scene.run(uvec2(5, 7), Channel::DIFFUSE);

        assert_eq!(1.0, HistoryLength::decode(out.history_len));
        assert!(!Occlusion::decode(out.occlusion));
        assert_eq!(vec4(1.0, 1.0, 1.0, 1.0), out.radiance);
    }

    #[test]
    fn specular_reacts_faster_on_glossy_surfaces() {
        let eye = vec3(0.0, 5.0, 0.0);
        let mut scene = Scene::new(eye, eye, 16.0);
        let pos = uvec2(5, 7);

        scene.params.max_history_length = 32;

        // Half-rough floor: 0.2 * 0.5^2 = 0.05 < 1 / 17, so both match
        let diffuse = scene.run(pos, Channel::DIFFUSE);
        let specular = scene.run(pos, Channel::SPECULAR);

        assert_relative_eq!(diffuse.radiance.x, specular.radiance.x);

        // Mirror: specular never goes below 0.2
        for gbuffer in [&scene.gbuffer, &scene.prev_gbuffer] {
            let mut surface = gbuffer.get(pos);

            surface.roughness = 0.0;
            write_surface(gbuffer, pos, surface);
        }

        let diffuse = scene.run(pos, Channel::DIFFUSE);
        let specular = scene.run(pos, Channel::SPECULAR);

        assert_relative_eq!(
            3.0 - 2.0 / 17.0,
            diffuse.radiance.x,
            epsilon = 0.001
        );
        assert_relative_eq!(2.6, specular.radiance.x, epsilon = 0.001);
    }

    #[test]
    fn filtered_history_length_is_whole() {
        let mut scene = Scene::new(
            vec3(0.0, 5.0, 0.0),
            vec3(0.013, 5.0, 0.021),
            0.0,
        );

        for y in 0..SIZE.y {
            for x in 0..SIZE.x {
                let len = if (x + y) % 2 == 0 { 2.0 } else { 3.0 };

                scene
                    .prev_history_len
                    .set(uvec2(x, y), HistoryLength::encode(len));
            }
        }

        scene.params.max_history_length = 32;

        let out = scene.run(uvec2(6, 6), Channel::DIFFUSE);
        let len = HistoryLength::decode(out.history_len);

        assert!(len == 3.0 || len == 4.0, "{len}");
        assert_relative_eq!(
            HistoryLength::encode(len).x,
            out.history_len.x,
            epsilon = 0.000001
        );
    }
}
