use bytemuck::{Pod, Zeroable};

/// Lighting channel a pass operates on; both channels run through the same
/// sequence of passes, but with separate resources.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug, Hash, PartialOrd, Ord))]
pub struct Channel(u32);

impl Channel {
    pub const DIFFUSE: Self = Self(0);
    pub const SPECULAR: Self = Self(1);

    pub const ALL: [Self; 2] = [Self::DIFFUSE, Self::SPECULAR];

    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn is_diffuse(self) -> bool {
        self.0 == Self::DIFFUSE.0
    }

    pub fn is_specular(self) -> bool {
        self.0 == Self::SPECULAR.0
    }

    #[cfg(not(target_arch = "spirv"))]
    pub fn name(self) -> &'static str {
        if self.is_diffuse() {
            "diffuse"
        } else {
            "specular"
        }
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self::DIFFUSE
    }
}
