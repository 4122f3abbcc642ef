use glam::{ivec2, UVec2, Vec3, Vec4, Vec4Swizzles};

use crate::{
    lerp, rgb_to_ycocg, ycocg_to_rgb, Camera, DenoiserParams, GBuffer,
    Occlusion, Reprojector, Tex, Vec4Ext,
};

/// Final pass of the pipeline: blends the denoised output with its own
/// reprojected history, clamped to the current neighbourhood, to get rid of
/// the remaining low-frequency flickering.
pub struct TemporalStabilization<'a, T> {
    pub params: &'a DenoiserParams,
    pub camera: &'a Camera,
    pub prev_camera: &'a Camera,
    pub gbuffer: &'a GBuffer<T>,
    pub prev_gbuffer: &'a GBuffer<T>,

    /// Denoised output of this frame (i.e. post-blur's result)
    pub input: &'a T,

    /// Stabilized output of the previous frame
    pub prev_history: &'a T,

    /// Occlusion data written by this frame's temporal accumulation
    pub occlusion: &'a T,
}

impl<'a, T> TemporalStabilization<'a, T>
where
    T: Tex,
{
    pub fn run(&self, pos: UVec2) -> Vec4 {
        let current = self.input.read(pos).sanitize();

        if !self.params.has(DenoiserParams::FLAG_TEMPORAL_STABILIZATION)
            || !Occlusion::decode(self.occlusion.read(pos))
        {
            return current;
        }

        let surface = self.gbuffer.get(pos);

        if surface.is_sky() {
            return current;
        }

        let reprojection = Reprojector {
            camera: self.camera,
            prev_camera: self.prev_camera,
            prev_gbuffer: self.prev_gbuffer,
            plane_dist_sensitivity: self.params.plane_dist_sensitivity,
        }
        .reproject(&surface);

        let (history, history_weight) = reprojection
            .filter(|pos| (self.prev_history.read(pos).sanitize(), 1.0));

        if history_weight <= 0.0 {
            return current;
        }

        let (aabb_min, aabb_max) = self.neighbourhood(pos);

        let history = ycocg_to_rgb(
            rgb_to_ycocg(history.xyz()).clamp(aabb_min, aabb_max),
        );

        lerp(current.xyz(), history, self.params.stabilization_strength)
            .extend(current.w)
    }

    /// Returns YCoCg bounds of the 3x3 neighbourhood of given pixel.
    fn neighbourhood(&self, pos: UVec2) -> (Vec3, Vec3) {
        let mut aabb_min = Vec3::splat(f32::MAX);
        let mut aabb_max = Vec3::splat(f32::MIN);
        let mut y = -1;

        while y <= 1 {
            let mut x = -1;

            while x <= 1 {
                let sample_pos = pos.as_ivec2() + ivec2(x, y);

                x += 1;

                if !self.camera.contains(sample_pos) {
                    continue;
                }

                let sample = rgb_to_ycocg(
                    self.input.read(sample_pos.as_uvec2()).sanitize().xyz(),
                );

                aabb_min = aabb_min.min(sample);
                aabb_max = aabb_max.max(sample);
            }

            y += 1;
        }

        (aabb_min, aabb_max)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{uvec2, vec3, vec4};

    use super::*;
    use crate::denoise::test_utils::*;

    struct Scene {
        params: DenoiserParams,
        camera: Camera,
        gbuffer: GBuffer<TestTex>,
        input: TestTex,
        prev_history: TestTex,
        occlusion: TestTex,
    }

    impl Scene {
        fn new(current: Vec4, history: Vec4, occlusion: bool) -> Self {
            let curr_camera = camera(vec3(0.0, 5.0, 0.0));

            Self {
                params: DenoiserParams {
                    stabilization_strength: 0.5,
                    plane_dist_sensitivity: 0.02,
                    flags: DenoiserParams::FLAG_TEMPORAL_STABILIZATION,
                    ..Default::default()
                },
                gbuffer: floor(&curr_camera),
                camera: curr_camera,
                input: TestTex::filled(SIZE, current),
                prev_history: TestTex::filled(SIZE, history),
                occlusion: TestTex::filled(SIZE, Occlusion::encode(occlusion)),
            }
        }

        fn run(&self, pos: UVec2) -> Vec4 {
            TemporalStabilization {
                params: &self.params,
                camera: &self.camera,
                prev_camera: &self.camera,
                gbuffer: &self.gbuffer,
                prev_gbuffer: &self.gbuffer,
                input: &self.input,
                prev_history: &self.prev_history,
                occlusion: &self.occlusion,
            }
            .run(pos)
        }
    }

    #[test]
    fn blends_with_history_inside_neighbourhood() {
        let scene = Scene::new(
            vec4(1.0, 1.0, 1.0, 2.0),
            vec4(1.0, 1.0, 1.0, 7.0),
            true,
        );

        assert_eq!(vec4(1.0, 1.0, 1.0, 2.0), scene.run(uvec2(4, 4)));
    }

    #[test]
    fn history_is_clamped() {
        let scene = Scene::new(
            vec4(0.5, 0.5, 0.5, 1.0),
            vec4(0.0, 0.0, 0.0, 1.0),
            true,
        );

        scene.input.set(uvec2(5, 4), vec4(0.25, 0.25, 0.25, 1.0));

        // History gets clamped to the darkest neighbour, 0.25, and then
        // blended half-way with the current value
        let out = scene.run(uvec2(4, 4));

        assert_relative_eq!(0.375, out.x, epsilon = 0.0001);
        assert_relative_eq!(0.375, out.y, epsilon = 0.0001);
        assert_relative_eq!(0.375, out.z, epsilon = 0.0001);
    }

    #[test]
    fn invalid_occlusion_skips_history() {
        let scene = Scene::new(
            vec4(0.5, 0.5, 0.5, 1.0),
            vec4(0.0, 0.0, 0.0, 1.0),
            false,
        );

        assert_eq!(vec4(0.5, 0.5, 0.5, 1.0), scene.run(uvec2(4, 4)));
    }

    #[test]
    fn disabled_stabilization_passes_input_through() {
        let mut scene = Scene::new(
            vec4(0.5, 0.5, 0.5, 1.0),
            vec4(0.0, 0.0, 0.0, 1.0),
            true,
        );

        scene.params.flags = 0;

        assert_eq!(vec4(0.5, 0.5, 0.5, 1.0), scene.run(uvec2(4, 4)));
    }
}
