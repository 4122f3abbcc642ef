//! Common structs and per-pixel algorithms used by Umbra's shaders, by the
//! GPU renderer and by the CPU reference executor.
//!
//! Every kernel here is written against the [`Tex`] trait and returns the
//! values it would write, so that the very same code can be driven from a
//! rust-gpu entry point (which performs the actual image stores) and from the
//! CPU.

#![cfg_attr(target_arch = "spirv", no_std)]
#![allow(clippy::len_without_is_empty)]
#![allow(clippy::manual_range_contains)]
#![allow(clippy::too_many_arguments)]

mod camera;
mod channel;
mod denoise;
mod gbuffer;
mod history;
mod kernel;
mod params;
mod reprojection;
mod tex;
mod utils;
mod weights;

pub use self::camera::*;
pub use self::channel::*;
pub use self::denoise::*;
pub use self::gbuffer::*;
pub use self::history::*;
pub use self::kernel::*;
pub use self::params::*;
pub use self::reprojection::*;
pub use self::tex::*;
pub use self::utils::*;
pub use self::weights::*;

pub mod prelude {
    pub use core::f32::consts::PI;

    pub use glam::*;
    #[cfg(target_arch = "spirv")]
    pub use spirv_std::num_traits::Float;

    pub use crate::*;
}

/// Smallest weight / distance we consider to be non-zero.
pub const UMBRA_EPSILON: f32 = 0.00001;
