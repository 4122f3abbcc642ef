//! Edge-stopping functions shared by the spatial passes.

use glam::{Vec3, Vec4};
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

use crate::{lerp, F32Ext, Surface, UMBRA_EPSILON};

/// Exponent applied to the cosine between normals for the diffuse channel.
pub const NORMAL_WEIGHT_POWER: f32 = 8.0;

/// Exponent applied to the cosine between normals for mirror-like specular
/// surfaces; rougher surfaces interpolate towards [`NORMAL_WEIGHT_POWER`].
pub const SPECULAR_NORMAL_WEIGHT_POWER: f32 = 64.0;

/// Steepness of the Gaussian falloff over normalized tap distance.
pub const GAUSSIAN_FALLOFF: f32 = 2.0;

/// Steepness of the falloff over normalized hit-distance difference.
pub const HIT_DISTANCE_WEIGHT_SCALE: f32 = 3.0;

/// Returns how likely it is for `sample` to lay on the same plane as `center`,
/// `1.0` meaning they're coplanar and `0.0` that the sample is further away
/// from center's plane than `sensitivity * view_z`.
pub fn geometry_weight(
    center: &Surface,
    sample: &Surface,
    view_z: f32,
    sensitivity: f32,
) -> f32 {
    let plane_dist = center.normal.dot(sample.world_pos - center.world_pos);
    let threshold = (sensitivity * view_z).max(UMBRA_EPSILON);

    (1.0 - plane_dist.abs() / threshold).saturate()
}

/// Returns whether `sample` is close enough to `center`'s plane to be
/// considered the same surface.
pub fn is_on_plane(
    center: &Surface,
    sample_pos: Vec3,
    view_z: f32,
    sensitivity: f32,
) -> bool {
    let plane_dist = center.normal.dot(sample_pos - center.world_pos);

    plane_dist.abs() <= sensitivity * view_z.max(UMBRA_EPSILON)
}

pub fn normal_weight(center: Vec3, sample: Vec3, power: f32) -> f32 {
    center.dot(sample).saturate().powf(power)
}

/// Returns normal-weight exponent for given surface; specular reflections of
/// glossy surfaces change quickly with the normal, so they get a stricter one.
pub fn normal_weight_power(specular: bool, roughness: f32) -> f32 {
    if specular {
        lerp(SPECULAR_NORMAL_WEIGHT_POWER, NORMAL_WEIGHT_POWER, roughness)
    } else {
        NORMAL_WEIGHT_POWER
    }
}

/// Gaussian falloff over tap's distance from kernel's center, normalized to
/// `<0.0, 1.0>`.
pub fn gaussian_weight(dist: f32) -> f32 {
    (-GAUSSIAN_FALLOFF * dist * dist).exp()
}

/// Maps hit distance into `<0.0, 1.0>` using the configured min / max range.
pub fn normalize_hit_distance(hit_dist: f32, params: Vec4) -> f32 {
    let range = (params.y - params.x).max(UMBRA_EPSILON);

    ((hit_dist - params.x) / range).saturate()
}

pub fn hit_distance_weight(center: f32, sample: f32) -> f32 {
    (-(center - sample).abs() * HIT_DISTANCE_WEIGHT_SCALE).exp()
}

/// Returns radius multiplier approximating the angular footprint of indirect
/// lighting: closer hits and rougher surfaces get the full radius, distant
/// hits on glossy surfaces shrink it down to `params.w`.
pub fn hit_distance_radius_scale(
    hit_dist: f32,
    roughness: f32,
    params: Vec4,
) -> f32 {
    let proximity = 1.0 - normalize_hit_distance(hit_dist, params);
    let footprint = (proximity + roughness * params.z).saturate();

    lerp(params.w.saturate(), 1.0, footprint)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{vec3, vec4};

    use super::*;

    fn surface(world_pos: Vec3) -> Surface {
        Surface {
            depth: 0.5,
            normal: vec3(0.0, 1.0, 0.0),
            roughness: 0.5,
            world_pos,
            ..Default::default()
        }
    }

    #[test]
    fn geometry_weight_coplanar() {
        let a = surface(vec3(0.0, 0.0, 0.0));
        let b = surface(vec3(3.0, 0.0, -2.0));

        assert_eq!(1.0, geometry_weight(&a, &b, 10.0, 0.02));
        assert!(is_on_plane(&a, b.world_pos, 10.0, 0.02));
    }

    #[test]
    fn geometry_weight_off_plane() {
        let a = surface(vec3(0.0, 0.0, 0.0));
        let b = surface(vec3(0.0, 0.1, 0.0));
        let c = surface(vec3(0.0, 1.0, 0.0));

        assert_relative_eq!(
            0.5,
            geometry_weight(&a, &b, 10.0, 0.02),
            epsilon = 0.0001
        );
        assert_eq!(0.0, geometry_weight(&a, &c, 10.0, 0.02));
        assert!(!is_on_plane(&a, c.world_pos, 10.0, 0.02));
    }

    #[test]
    fn normal_weights() {
        let up = vec3(0.0, 1.0, 0.0);
        let side = vec3(1.0, 0.0, 0.0);

        assert_eq!(1.0, normal_weight(up, up, NORMAL_WEIGHT_POWER));
        assert_eq!(0.0, normal_weight(up, side, NORMAL_WEIGHT_POWER));
        assert_eq!(0.0, normal_weight(up, -up, NORMAL_WEIGHT_POWER));

        assert_eq!(NORMAL_WEIGHT_POWER, normal_weight_power(false, 0.0));
        assert_eq!(SPECULAR_NORMAL_WEIGHT_POWER, normal_weight_power(true, 0.0));
        assert_eq!(NORMAL_WEIGHT_POWER, normal_weight_power(true, 1.0));
    }

    #[test]
    fn hit_distance() {
        let params = vec4(1.0, 11.0, 0.0, 0.25);

        assert_eq!(0.0, normalize_hit_distance(0.5, params));
        assert_relative_eq!(
            0.5,
            normalize_hit_distance(6.0, params),
            epsilon = 0.0001
        );
        assert_eq!(1.0, normalize_hit_distance(100.0, params));

        // Close hits use the full radius, far hits shrink it
        assert_eq!(1.0, hit_distance_radius_scale(0.0, 0.0, params));
        assert_eq!(0.25, hit_distance_radius_scale(100.0, 0.0, params));

        // ... unless the surface is rough
        let params = vec4(1.0, 11.0, 1.0, 0.25);

        assert_eq!(1.0, hit_distance_radius_scale(100.0, 1.0, params));
        assert_eq!(1.0, hit_distance_weight(3.0, 3.0));
        assert!(hit_distance_weight(0.0, 1.0) < 0.1);
    }
}
