use fxhash::FxHashMap;
use log::debug;

use crate::buffers::{
    DoubleBuffered, ReadableTexture, Texture, UniformBuffer, WritableTexture,
};
use crate::graph::Resource;
use crate::{gpu, Camera, FrameContext, Layer};

#[derive(Debug)]
pub struct DenoiserBuffers {
    pub params: UniformBuffer<gpu::DenoiserParams>,
    pub cameras: DoubleBuffered<UniformBuffer<gpu::Camera>>,
    pub textures: FxHashMap<Resource<Layer>, Texture>,
}

impl DenoiserBuffers {
    pub fn new(
        device: &wgpu::Device,
        camera: &Camera,
        params: gpu::DenoiserParams,
    ) -> Self {
        debug!("Initializing denoiser buffers");

        let params = UniformBuffer::new(device, "umbra_params", params);

        let cameras = DoubleBuffered::new(
            UniformBuffer::new(
                device,
                "umbra_camera_a",
                camera.serialize(),
            ),
            UniformBuffer::new(
                device,
                "umbra_camera_b",
                camera.serialize(),
            ),
        );

        let textures = Resource::<Layer>::all()
            .into_iter()
            .map(|resource| {
                let texture = Texture::new(
                    device,
                    format!("umbra_{resource}"),
                    resource.size(camera.viewport_size),
                    resource.format(),
                );

                (resource, texture)
            })
            .collect();

        Self {
            params,
            cameras,
            textures,
        }
    }

    pub fn texture(&self, resource: Resource<Layer>) -> &Texture {
        &self.textures[&resource]
    }

    /// Returns given resource as seen by the bind groups of both layers.
    pub fn bind_readable(
        &self,
        resource: Resource,
    ) -> DoubleBuffered<ReadableTexture> {
        let [a, b] = self.resolve(resource);

        DoubleBuffered::new(a.bind_readable(), b.bind_readable())
    }

    pub fn bind_writable(
        &self,
        resource: Resource,
    ) -> DoubleBuffered<WritableTexture> {
        let [a, b] = self.resolve(resource);

        DoubleBuffered::new(a.bind_writable(), b.bind_writable())
    }

    /// Returns textures the resource points at when the current layer is `A`
    /// and `B`, respectively.
    fn resolve(&self, resource: Resource) -> [&Texture; 2] {
        [FrameContext::new(0), FrameContext::new(1)]
            .map(|ctx| self.texture(resource.resolve(&ctx)))
    }

    pub fn flush(&mut self, queue: &wgpu::Queue) {
        self.params.flush(queue);

        for camera in self.cameras.iter_mut() {
            camera.flush(queue);
        }
    }
}
