use glam::{
    vec2, vec3, vec4, UVec2, Vec2, Vec2Swizzles, Vec3, Vec3Swizzles, Vec4,
    Vec4Swizzles,
};
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

use crate::{Camera, Tex, UMBRA_EPSILON};

/// Single pixel of the g-buffer.
///
/// Stored across four textures:
///
/// - depth (`r32f`, reversed-z, `0.0` means there's no geometry there),
/// - normal + roughness (`rgba16f`; octahedral-encoded normal in `xy`,
///   roughness in `z`),
/// - base color + metalness (`rgba8`),
/// - world position (`rgba32f`).
#[derive(Clone, Copy, Default)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug, PartialEq))]
pub struct Surface {
    pub depth: f32,
    pub normal: Vec3,
    pub roughness: f32,
    pub base_color: Vec3,
    pub metalness: f32,
    pub world_pos: Vec3,
}

impl Surface {
    pub fn unpack([d0, d1, d2, d3]: [Vec4; 4]) -> Self {
        Self {
            depth: d0.x,
            normal: decode_normal(d1.xy()),
            roughness: d1.z,
            base_color: d2.xyz(),
            metalness: d2.w,
            world_pos: d3.xyz(),
        }
    }

    pub fn pack(self) -> [Vec4; 4] {
        let normal = encode_normal(self.normal);

        [
            vec4(self.depth, 0.0, 0.0, 0.0),
            vec4(normal.x, normal.y, self.roughness.clamp(0.0, 1.0), 0.0),
            self.base_color
                .clamp(Vec3::ZERO, Vec3::ONE)
                .extend(self.metalness.clamp(0.0, 1.0)),
            self.world_pos.extend(1.0),
        ]
    }

    /// Returns whether this pixel has no geometry (i.e. it's a sky pixel).
    pub fn is_sky(&self) -> bool {
        self.depth <= 0.0
    }

    pub fn is_some(&self) -> bool {
        !self.is_sky()
    }
}

/// Maps a unit normal into `[0, 1]^2` through octahedral projection.
fn encode_normal(n: Vec3) -> Vec2 {
    let n = n / (n.x.abs() + n.y.abs() + n.z.abs()).max(UMBRA_EPSILON);

    let n = if n.z >= 0.0 {
        n.xy()
    } else {
        (1.0 - n.yx().abs()) * sign_not_zero(n.xy())
    };

    n * 0.5 + 0.5
}

fn decode_normal(n: Vec2) -> Vec3 {
    let n = n * 2.0 - 1.0;
    let z = 1.0 - n.x.abs() - n.y.abs();

    let xy = if z >= 0.0 {
        n
    } else {
        (1.0 - n.yx().abs()) * sign_not_zero(n)
    };

    vec3(xy.x, xy.y, z).normalize()
}

fn sign_not_zero(v: Vec2) -> Vec2 {
    vec2(
        if v.x >= 0.0 { 1.0 } else { -1.0 },
        if v.y >= 0.0 { 1.0 } else { -1.0 },
    )
}

/// One layer of the g-buffer.
#[derive(Clone, Copy)]
pub struct GBuffer<T> {
    pub depth: T,
    pub normal_roughness: T,
    pub base_color_metalness: T,
    pub world_position: T,
}

impl<T> GBuffer<T>
where
    T: Tex,
{
    pub fn new(
        depth: T,
        normal_roughness: T,
        base_color_metalness: T,
        world_position: T,
    ) -> Self {
        Self {
            depth,
            normal_roughness,
            base_color_metalness,
            world_position,
        }
    }

    pub fn get(&self, pos: UVec2) -> Surface {
        Surface::unpack([
            self.depth.read(pos),
            self.normal_roughness.read(pos),
            self.base_color_metalness.read(pos),
            self.world_position.read(pos),
        ])
    }

    /// Returns linear depth of given pixel, or `0.0` for sky pixels.
    pub fn view_z(&self, camera: &Camera, pos: UVec2) -> f32 {
        if self.depth.read(pos).x <= 0.0 {
            0.0
        } else {
            camera.view_z(self.world_position.read(pos).xyz())
        }
    }
}
