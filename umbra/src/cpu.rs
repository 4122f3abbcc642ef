//! Reference executor: runs the pass graph on the CPU, pixel by pixel, with
//! the very same kernels the shaders use.
//!
//! It's slow, but deterministic and device-less, which makes it the tool of
//! choice for testing the pipeline end-to-end and for producing reference
//! images.

mod denoiser;
mod image;

pub use self::denoiser::*;
pub use self::image::*;
