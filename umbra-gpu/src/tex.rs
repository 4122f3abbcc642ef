use glam::{UVec2, Vec4};

/// Read-only view of a two-dimensional texture.
///
/// Implemented by storage images on the GPU and by in-memory images on the
/// CPU; kernels never write through it - they return what should be written
/// and let the caller do the store.
pub trait Tex {
    fn read(&self, pos: UVec2) -> Vec4;
}

impl<T> Tex for &T
where
    T: Tex + ?Sized,
{
    fn read(&self, pos: UVec2) -> Vec4 {
        T::read(self, pos)
    }
}
