use crate::Layer;

/// Buffer or texture that can be attached to a bind group.
pub trait Bindable {
    fn layout(&self, binding: u32) -> wgpu::BindGroupLayoutEntry;

    fn resource(&self) -> wgpu::BindingResource;
}

impl<T> Bindable for &T
where
    T: Bindable,
{
    fn layout(&self, binding: u32) -> wgpu::BindGroupLayoutEntry {
        <T as Bindable>::layout(self, binding)
    }

    fn resource(&self) -> wgpu::BindingResource {
        <T as Bindable>::resource(self)
    }
}

/// Buffer or texture attached to bind groups of both layers; each layer can
/// see a different object, but all of them must share the same layout.
pub trait LayeredBindable {
    fn layout(&self, binding: u32) -> wgpu::BindGroupLayoutEntry;

    fn resource(&self, layer: Layer) -> wgpu::BindingResource;
}

impl<T> LayeredBindable for T
where
    T: Bindable,
{
    fn layout(&self, binding: u32) -> wgpu::BindGroupLayoutEntry {
        Bindable::layout(self, binding)
    }

    fn resource(&self, _: Layer) -> wgpu::BindingResource {
        Bindable::resource(self)
    }
}
