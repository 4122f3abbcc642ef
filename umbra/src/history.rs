use std::mem;

use log::{debug, info};

use crate::FrameContext;

/// What produces the noisy radiance that's being denoised.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-1", derive(serde::Serialize, serde::Deserialize))]
pub enum RenderMode {
    /// Everything is path-traced
    PathTracer,

    /// Primary visibility is rasterized, indirect lighting is ray-traced
    #[default]
    Hybrid,
}

/// Frame-to-frame bookkeeping of the layered resources: which layer is
/// current and whether the history has to be dropped.
#[derive(Debug)]
pub struct History {
    frame: u32,
    mode: Option<RenderMode>,
    clear_requested: bool,
}

impl History {
    pub fn new() -> Self {
        Self {
            frame: 0,
            mode: None,
            clear_requested: true,
        }
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn context(&self) -> FrameContext {
        FrameContext::new(self.frame)
    }

    /// Swaps current and previous layers; called once at the end of a frame.
    pub fn advance_frame(&mut self) {
        self.frame = self.frame.wrapping_add(1);
    }

    /// Makes the next frame start with cleared history length and cleared
    /// stabilization history.
    pub fn request_history_clear(&mut self) {
        if !self.clear_requested {
            debug!("History clear requested");
        }

        self.clear_requested = true;
    }

    /// Returns whether the history has to be cleared before this frame's
    /// passes run; resets the request.
    pub fn take_clear_request(&mut self) -> bool {
        mem::take(&mut self.clear_requested)
    }

    pub fn is_clear_requested(&self) -> bool {
        self.clear_requested
    }

    pub fn mode(&self) -> Option<RenderMode> {
        self.mode
    }

    /// Switching between render modes invalidates the history.
    pub fn set_mode(&mut self, mode: RenderMode) {
        if let Some(prev) = self.mode.replace(mode) {
            if prev != mode {
                info!("Render mode changed from {prev:?} to {mode:?}");

                self.request_history_clear();
            }
        }
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
