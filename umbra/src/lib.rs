//! Denoising and temporal reprojection core of a hybrid renderer.
//!
//! Noisy, per-pixel radiance (split into diffuse and specular channels)
//! comes in together with a g-buffer; [`Denoiser`] turns it into a stable
//! image by running a fixed graph of compute passes:
//!
//! - pre-blur,
//! - temporal accumulation,
//! - history fix (mip-based or sparse),
//! - main blur,
//! - post blur,
//! - temporal stabilization.
//!
//! All of the per-pixel math lives in [`gpu`] (`umbra-gpu`), which is shared
//! by the shaders and by [`cpu::CpuDenoiser`] - a reference executor that
//! runs the same graph on the CPU.

#![allow(clippy::len_without_is_empty)]
#![allow(clippy::too_many_arguments)]

pub(crate) mod buffers;
mod camera;
pub mod cpu;
mod debug;
mod denoiser;
mod error;
mod frame;
pub mod graph;
mod history;
mod ping_pong;
mod settings;
mod shaders;
mod utils;

use std::path::Path;

use log::info;
pub use umbra_gpu as gpu;

pub use self::camera::*;
pub use self::debug::*;
pub use self::denoiser::Denoiser;
pub use self::error::*;
pub use self::frame::*;
pub use self::history::*;
pub use self::ping_pong::*;
pub use self::settings::*;
pub use self::shaders::*;

/// Holds state shared between denoisers (compiled shaders).
#[derive(Debug)]
pub struct Engine {
    shaders: Shaders,
}

impl Engine {
    #[cfg(feature = "embedded-shaders")]
    pub fn new(device: &wgpu::Device) -> Self {
        info!("Initializing");

        Self {
            shaders: Shaders::new(device),
        }
    }

    /// Creates an engine with shaders loaded from `<dir>/<kernel>.spv`.
    pub fn from_dir(
        device: &wgpu::Device,
        dir: impl AsRef<Path>,
    ) -> Result<Self> {
        info!("Initializing");

        Ok(Self {
            shaders: Shaders::from_dir(device, dir.as_ref())?,
        })
    }

    pub fn shaders(&self) -> &Shaders {
        &self.shaders
    }

    /// Features the device must be created with.
    pub fn required_features() -> wgpu::Features {
        wgpu::Features::PUSH_CONSTANTS | wgpu::Features::CLEAR_TEXTURE
    }

    /// Limits the device must be created with.
    pub fn required_limits() -> wgpu::Limits {
        wgpu::Limits {
            max_push_constant_size: std::mem::size_of::<gpu::PassParams>()
                as u32,
            ..Default::default()
        }
    }

    pub fn create_denoiser(
        &self,
        device: &wgpu::Device,
        camera: Camera,
        settings: DenoiserSettings,
    ) -> Result<Denoiser> {
        Denoiser::new(self, device, camera, settings)
    }
}
