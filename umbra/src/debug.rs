use crate::gpu::Channel;
use crate::graph::{Kernel, Resource, Slot};

/// Intermediate buffer exposed instead of (or next to) the denoised output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-1", derive(serde::Serialize, serde::Deserialize))]
pub enum DebugView {
    #[default]
    None,

    /// History length, as `length / 255` in the red channel
    HistoryLength,

    /// Whether temporal accumulation accepted the history (white) or not
    Occlusion,

    /// Output of the pre-blur
    PreBlur,

    /// Output of the temporal accumulation
    Accumulated,

    /// Output of the post blur, before temporal stabilization
    Denoised,
}

impl DebugView {
    /// Returns the buffer this view shows for given channel.
    pub fn resource(self, channel: Channel) -> Option<Resource> {
        match self {
            DebugView::None => None,
            DebugView::HistoryLength => {
                Some(Resource::HistoryLength(channel, Slot::Current))
            }
            DebugView::Occlusion => Some(Resource::Occlusion(channel)),
            DebugView::PreBlur | DebugView::Accumulated => {
                Some(Resource::Debug(channel))
            }
            DebugView::Denoised => {
                Some(Resource::DenoiserOutput(channel, Slot::Current))
            }
        }
    }

    /// Ping-pong buffers get overwritten later in the frame, so these views
    /// copy the output of given kernel into [`Resource::Debug`].
    pub fn snapshot_after(self) -> Option<Kernel> {
        match self {
            DebugView::PreBlur => Some(Kernel::PreBlur),
            DebugView::Accumulated => Some(Kernel::TemporalAccumulation),
            _ => None,
        }
    }
}
