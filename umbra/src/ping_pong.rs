use crate::graph::Resource;
use crate::gpu::Channel;

/// Pair of scratch textures of a channel whose roles (input vs output) swap
/// after every pass that writes into them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PingPong {
    channel: Channel,
    flipped: bool,
}

impl PingPong {
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            flipped: false,
        }
    }

    /// Texture holding the latest result.
    pub fn read(&self) -> Resource {
        if self.flipped {
            Resource::Ping(self.channel)
        } else {
            Resource::Pong(self.channel)
        }
    }

    /// Texture the next pass should write into.
    pub fn write(&self) -> Resource {
        if self.flipped {
            Resource::Pong(self.channel)
        } else {
            Resource::Ping(self.channel)
        }
    }

    pub fn flip(&mut self) {
        self.flipped = !self.flipped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip() {
        let mut pp = PingPong::new(Channel::DIFFUSE);

        assert_eq!(Resource::Ping(Channel::DIFFUSE), pp.write());
        assert_eq!(Resource::Pong(Channel::DIFFUSE), pp.read());

        pp.flip();

        assert_eq!(Resource::Ping(Channel::DIFFUSE), pp.read());
        assert_eq!(Resource::Pong(Channel::DIFFUSE), pp.write());

        pp.flip();

        assert_eq!(Resource::Ping(Channel::DIFFUSE), pp.write());
    }

    #[test]
    fn read_and_write_never_alias() {
        let mut pp = PingPong::new(Channel::SPECULAR);

        for _ in 0..5 {
            assert_ne!(pp.read(), pp.write());
            pp.flip();
        }
    }
}
