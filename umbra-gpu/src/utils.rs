use core::ops;

use glam::{vec3, vec4, Vec3, Vec4};

pub trait F32Ext {
    fn saturate(self) -> Self;
}

impl F32Ext for f32 {
    fn saturate(self) -> Self {
        self.clamp(0.0, 1.0)
    }
}

pub trait Vec4Ext {
    /// Replaces non-finite components with zeros, so that a single broken
    /// sample cannot poison the history.
    fn sanitize(self) -> Self;
}

impl Vec4Ext for Vec4 {
    fn sanitize(self) -> Self {
        let fix = |val: f32| if val.is_finite() { val } else { 0.0 };

        vec4(fix(self.x), fix(self.y), fix(self.z), fix(self.w))
    }
}

pub fn lerp<T>(a: T, b: T, t: f32) -> T
where
    T: ops::Add<Output = T>,
    T: ops::Sub<Output = T>,
    T: ops::Mul<f32, Output = T>,
    T: Copy,
{
    a + (b - a) * t.saturate()
}

/// Converts color into the YCoCg space, where clamping against a
/// neighbourhood box follows the luminance more closely than in RGB.
pub fn rgb_to_ycocg(val: Vec3) -> Vec3 {
    let co = val.x - val.z;
    let tmp = val.z + co / 2.0;
    let cg = val.y - tmp;
    let y = tmp + cg / 2.0;

    vec3(y, co, cg)
}

pub fn ycocg_to_rgb(val: Vec3) -> Vec3 {
    let tmp = val.x - val.z / 2.0;
    let g = val.z + tmp;
    let b = tmp - val.y / 2.0;
    let r = b + val.y;

    vec3(r, g, b)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn sanitize() {
        let val = vec4(f32::NAN, 1.0, f32::INFINITY, -2.0).sanitize();

        assert_eq!(vec4(0.0, 1.0, 0.0, -2.0), val);
    }

    #[test]
    fn ycocg() {
        let rgb = vec3(0.25, 0.5, 0.75);
        let back = ycocg_to_rgb(rgb_to_ycocg(rgb));

        assert_relative_eq!(rgb.x, back.x, epsilon = 0.0001);
        assert_relative_eq!(rgb.y, back.y, epsilon = 0.0001);
        assert_relative_eq!(rgb.z, back.z, epsilon = 0.0001);
    }

    #[test]
    fn lerp_clamps_factor() {
        assert_eq!(1.0, lerp(1.0, 2.0, -1.0));
        assert_eq!(2.0, lerp(1.0, 2.0, 3.0));
        assert_eq!(1.5, lerp(1.0, 2.0, 0.5));
    }
}
