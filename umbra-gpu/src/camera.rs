use bytemuck::{Pod, Zeroable};
use glam::{vec2, IVec2, Mat4, UVec2, Vec2, Vec3, Vec4, Vec4Swizzles};

/// Camera as seen by the shaders; both the current and the previous frame's
/// camera are uploaded, the latter being used for reprojection.
#[repr(C)]
#[derive(Clone, Copy, Default, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct Camera {
    pub projection_view: Mat4,
    pub ndc_to_world: Mat4,

    /// x, y, z - camera's origin; w - near plane
    pub origin: Vec4,

    /// x, y, z - camera's forward direction
    pub forward: Vec4,

    /// x, y - viewport size, in pixels
    pub screen: Vec4,
}

impl Camera {
    /// Given a point in world-coordinates, returns it in clip-coordinates.
    pub fn world_to_clip(&self, pos: Vec3) -> Vec4 {
        self.projection_view * pos.extend(1.0)
    }

    /// Given a point in world-coordinates, returns it in screen-coordinates.
    pub fn world_to_screen(&self, pos: Vec3) -> Vec2 {
        self.clip_to_screen(self.world_to_clip(pos))
    }

    /// Given a point in clip-coordinates, returns it in screen-coordinates.
    pub fn clip_to_screen(&self, pos: Vec4) -> Vec2 {
        let ndc = pos.xy() / pos.w;
        let ndc = vec2(ndc.x, -ndc.y);

        (0.5 * ndc + 0.5) * self.screen.xy()
    }

    /// Given a point in world-coordinates, returns the (continuous) pixel
    /// coordinates it lands on, where `(x, y)` is the center of pixel `(x, y)`.
    ///
    /// Returns `None` for points behind the camera.
    pub fn world_to_pixel(&self, pos: Vec3) -> Option<Vec2> {
        let clip = self.world_to_clip(pos);

        if clip.w <= 0.0 {
            None
        } else {
            Some(self.clip_to_screen(clip) - 0.5)
        }
    }

    /// Returns reversed-z depth of given point, as stored in the g-buffer.
    pub fn world_to_depth(&self, pos: Vec3) -> f32 {
        let clip = self.world_to_clip(pos);

        clip.z / clip.w
    }

    /// Returns linear view-space depth of given point, i.e. its distance from
    /// the camera measured along the camera's forward direction.
    pub fn view_z(&self, pos: Vec3) -> f32 {
        (pos - self.origin.xyz()).dot(self.forward.xyz())
    }

    pub fn near(&self) -> f32 {
        self.origin.w
    }

    pub fn screen_size(&self) -> UVec2 {
        self.screen.xy().as_uvec2()
    }

    /// Returns whether given point lays inside the screen.
    pub fn contains(&self, pos: IVec2) -> bool {
        let screen_size = self.screen.xy().as_ivec2();

        pos.x >= 0
            && pos.y >= 0
            && pos.x < screen_size.x
            && pos.y < screen_size.y
    }

    /// Casts a ray from camera's origin through the center of given pixel;
    /// returns the ray's origin and (normalized) direction.
    pub fn ray(&self, screen_pos: UVec2) -> (Vec3, Vec3) {
        let screen_size = self.screen.xy();
        let ndc = (screen_pos.as_vec2() + 0.5) * 2.0 / screen_size - Vec2::ONE;
        let ndc = vec2(ndc.x, -ndc.y);

        let far_plane = self.ndc_to_world.project_point3(ndc.extend(0.5));
        let near_plane = self.ndc_to_world.project_point3(ndc.extend(1.0));

        (near_plane, (far_plane - near_plane).normalize())
    }

    pub fn is_eq(&self, rhs: &Self) -> bool {
        self.projection_view
            .abs_diff_eq(rhs.projection_view, 0.0025)
            && self.screen == rhs.screen
    }
}
