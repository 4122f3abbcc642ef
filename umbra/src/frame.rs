use std::collections::VecDeque;

use log::trace;

use crate::graph::Slot;

/// Number of frames the CPU is allowed to record ahead of the GPU.
pub const FRAMES_IN_FLIGHT: usize = 2;

/// One of the two alternating layers of double-buffered resources.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    A,
    B,
}

impl Layer {
    pub fn other(self) -> Self {
        match self {
            Layer::A => Layer::B,
            Layer::B => Layer::A,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Layer::A => 0,
            Layer::B => 1,
        }
    }
}

/// Which layer is current and which is previous in given frame; built once
/// per frame and handed to everything that resolves layered resources.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameContext {
    pub current: Layer,
    pub previous: Layer,
    pub frame: u32,
}

impl FrameContext {
    pub fn new(frame: u32) -> Self {
        let current = if frame % 2 == 0 { Layer::A } else { Layer::B };

        Self {
            current,
            previous: current.other(),
            frame,
        }
    }

    pub fn resolve(&self, slot: Slot) -> Layer {
        match slot {
            Slot::Current => self.current,
            Slot::Previous => self.previous,
        }
    }
}

/// Bookkeeping of frames in flight: remembers the handle of the work
/// submitted for each recorded frame, so that before recording a frame that
/// would exceed [`FRAMES_IN_FLIGHT`] the caller knows which submission to
/// wait for.
#[derive(Debug)]
pub struct FrameRing<T> {
    in_flight: VecDeque<T>,
}

impl<T> FrameRing<T> {
    pub fn new() -> Self {
        Self {
            in_flight: VecDeque::with_capacity(FRAMES_IN_FLIGHT),
        }
    }

    /// Begins recording a new frame; returns the submission that has to
    /// finish before the frame's slot can be reused, if any.
    pub fn begin(&mut self) -> Option<T> {
        if self.in_flight.len() < FRAMES_IN_FLIGHT {
            return None;
        }

        trace!("Frame ring is full, waiting for the oldest frame");

        self.in_flight.pop_front()
    }

    /// Ends recording of the current frame, remembering its submission.
    pub fn end(&mut self, submission: T) {
        if self.in_flight.len() >= FRAMES_IN_FLIGHT {
            self.in_flight.pop_front();
        }

        self.in_flight.push_back(submission);
    }

    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }

    pub fn clear(&mut self) {
        self.in_flight.clear();
    }
}

impl<T> Default for FrameRing<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_alternates() {
        let a = FrameContext::new(0);
        let b = FrameContext::new(1);
        let c = FrameContext::new(2);

        assert_eq!(Layer::A, a.current);
        assert_eq!(Layer::B, a.previous);
        assert_eq!(Layer::B, b.current);
        assert_eq!(Layer::A, b.previous);
        assert_eq!(a.current, c.current);

        assert_eq!(b.current, b.resolve(Slot::Current));
        assert_eq!(a.current, b.resolve(Slot::Previous));
    }

    #[test]
    fn ring_keeps_two_frames_in_flight() {
        let mut ring = FrameRing::new();

        assert_eq!(None, ring.begin());
        ring.end(1);

        assert_eq!(None, ring.begin());
        ring.end(2);

        assert_eq!(Some(1), ring.begin());
        ring.end(3);

        assert_eq!(Some(2), ring.begin());
        ring.end(4);

        assert_eq!(2, ring.len());
    }
}
