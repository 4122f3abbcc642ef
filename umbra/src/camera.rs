use glam::{Mat4, UVec2, Vec3, Vec4Swizzles};

use crate::gpu;

/// Camera through which the denoised frame is seen.
///
/// Uses reversed-Z projections; `transform` maps camera-space into
/// world-space.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-1", derive(serde::Serialize, serde::Deserialize))]
pub struct Camera {
    pub projection: Mat4,
    pub transform: Mat4,
    pub near: f32,
    pub viewport_size: UVec2,
}

impl Camera {
    /// Creates a reversed-Z, infinite-far-plane perspective camera located at
    /// `eye` and looking at `target`.
    pub fn look_at(
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        fov_y: f32,
        near: f32,
        viewport_size: UVec2,
    ) -> Self {
        let aspect_ratio =
            viewport_size.x.max(1) as f32 / viewport_size.y.max(1) as f32;

        Self {
            projection: Mat4::perspective_infinite_reverse_rh(
                fov_y,
                aspect_ratio,
                near,
            ),
            transform: Mat4::look_at_rh(eye, target, up).inverse(),
            near,
            viewport_size,
        }
    }

    pub fn origin(&self) -> Vec3 {
        self.transform.w_axis.xyz()
    }

    pub fn forward(&self) -> Vec3 {
        -self.transform.z_axis.xyz().normalize_or_zero()
    }

    /// Returns whether switching from this camera to `other` requires
    /// reallocating the buffers.
    pub fn is_invalidated_by(&self, other: &Self) -> bool {
        self.viewport_size != other.viewport_size
    }

    pub fn describe(&self) -> String {
        format!(
            "size={}x{}, origin={:?}, near={}",
            self.viewport_size.x,
            self.viewport_size.y,
            self.origin(),
            self.near,
        )
    }

    pub(crate) fn serialize(&self) -> gpu::Camera {
        let projection_view = self.projection * self.transform.inverse();

        gpu::Camera {
            projection_view,
            ndc_to_world: projection_view.inverse(),
            origin: self.origin().extend(self.near),
            forward: self.forward().extend(0.0),
            screen: self.viewport_size.as_vec2().extend(0.0).extend(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{uvec2, vec3};

    use super::*;

    fn camera(viewport_size: UVec2) -> Camera {
        Camera::look_at(
            vec3(0.0, 4.0, 6.0),
            Vec3::ZERO,
            Vec3::Y,
            60.0f32.to_radians(),
            0.1,
            viewport_size,
        )
    }

    #[test]
    fn serialize() {
        let camera = camera(uvec2(64, 32)).serialize();

        assert_eq!(uvec2(64, 32), camera.screen_size());
        assert_relative_eq!(0.1, camera.near());

        let pixel = camera.world_to_pixel(Vec3::ZERO).unwrap();

        assert_relative_eq!(31.5, pixel.x, epsilon = 0.01);
        assert_relative_eq!(15.5, pixel.y, epsilon = 0.01);

        assert_relative_eq!(
            vec3(0.0, 4.0, 6.0).length(),
            camera.view_z(Vec3::ZERO),
            epsilon = 0.001
        );
    }

    #[test]
    fn invalidation() {
        let a = camera(uvec2(64, 32));

        let b = Camera {
            transform: Mat4::IDENTITY,
            ..a.clone()
        };

        assert!(!a.is_invalidated_by(&b));
        assert!(a.is_invalidated_by(&camera(uvec2(32, 32))));
    }
}
