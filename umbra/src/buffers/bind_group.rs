use crate::buffers::LayeredBindable;
use crate::Layer;

/// Bind group built twice, once per [`Layer`], over a shared layout.
#[derive(Debug)]
pub struct BindGroup {
    layout: wgpu::BindGroupLayout,
    groups: [wgpu::BindGroup; 2],
}

impl BindGroup {
    pub fn builder<'a>(label: impl ToString) -> BindGroupBuilder<'a> {
        BindGroupBuilder {
            label: label.to_string(),
            items: Vec::new(),
        }
    }

    pub fn get(&self, layer: Layer) -> &wgpu::BindGroup {
        &self.groups[layer.index()]
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }
}

pub struct BindGroupBuilder<'a> {
    label: String,
    items: Vec<&'a dyn LayeredBindable>,
}

impl<'a> BindGroupBuilder<'a> {
    pub fn add(mut self, item: &'a dyn LayeredBindable) -> Self {
        self.items.push(item);
        self
    }

    pub fn build(self, device: &wgpu::Device) -> BindGroup {
        let label = format!("umbra_{}", self.label);

        let entries: Vec<_> = self
            .items
            .iter()
            .zip(0..)
            .map(|(item, binding)| item.layout(binding))
            .collect();

        let layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(&format!("{label}_layout")),
                entries: &entries,
            });

        let groups = [Layer::A, Layer::B].map(|layer| {
            let entries: Vec<_> = self
                .items
                .iter()
                .zip(0..)
                .map(|(item, binding)| wgpu::BindGroupEntry {
                    binding,
                    resource: item.resource(layer),
                })
                .collect();

            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("{label}_{layer:?}")),
                layout: &layout,
                entries: &entries,
            })
        });

        BindGroup { layout, groups }
    }
}
