//! Per-pixel kernels of the denoising passes, in the order they run:
//!
//! pre-blur -> temporal accumulation -> history fix -> main blur -> post blur
//! -> temporal stabilization

mod history_fix;
mod spatial_filter;
mod temporal_accumulation;
mod temporal_stabilization;

pub use self::history_fix::*;
pub use self::spatial_filter::*;
pub use self::temporal_accumulation::*;
pub use self::temporal_stabilization::*;
