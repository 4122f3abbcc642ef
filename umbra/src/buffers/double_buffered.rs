use crate::buffers::{Bindable, LayeredBindable};
use crate::Layer;

/// Value that exists in two versions, one per [`Layer`].
#[derive(Debug)]
pub struct DoubleBuffered<T> {
    a: T,
    b: T,
}

impl<T> DoubleBuffered<T> {
    pub fn new(a: T, b: T) -> Self {
        Self { a, b }
    }

    pub fn get(&self, layer: Layer) -> &T {
        match layer {
            Layer::A => &self.a,
            Layer::B => &self.b,
        }
    }

    pub fn get_mut(&mut self, layer: Layer) -> &mut T {
        match layer {
            Layer::A => &mut self.a,
            Layer::B => &mut self.b,
        }
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        [&mut self.a, &mut self.b].into_iter()
    }

    /// Returns a view where bind groups of layer `A` see `a` and bind groups
    /// of layer `B` see `b`, i.e. the version that's current for them.
    pub fn curr(&self) -> DoubleBuffered<&T> {
        DoubleBuffered {
            a: &self.a,
            b: &self.b,
        }
    }

    /// Returns a view where bind groups of layer `A` see `b` and vice versa,
    /// i.e. the version that's previous for them.
    pub fn past(&self) -> DoubleBuffered<&T> {
        DoubleBuffered {
            a: &self.b,
            b: &self.a,
        }
    }
}

impl<T> LayeredBindable for DoubleBuffered<T>
where
    T: Bindable,
{
    fn layout(&self, binding: u32) -> wgpu::BindGroupLayoutEntry {
        let layout = Bindable::layout(&self.a, binding);

        debug_assert_eq!(layout, Bindable::layout(&self.b, binding));

        layout
    }

    fn resource(&self, layer: Layer) -> wgpu::BindingResource {
        Bindable::resource(self.get(layer))
    }
}
