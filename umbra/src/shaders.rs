use std::borrow::Cow;
use std::fs;
use std::path::Path;

use log::debug;

use crate::graph::Kernel;
use crate::{Error, Result};

const SPIRV_MAGIC: u32 = 0x0723_0203;

#[derive(Debug)]
pub struct Shader {
    pub module: wgpu::ShaderModule,
    pub entry_point: Cow<'static, str>,
}

macro_rules! shaders {
    ([ $( $name:ident => $kernel:ident, )* ]) => {
        #[derive(Debug)]
        pub struct Shaders {
            $( pub $name: Shader, )*
        }

        impl Shaders {
            /// Loads shaders compiled and embedded at build time.
            #[cfg(feature = "embedded-shaders")]
            pub fn new(device: &wgpu::Device) -> Self {
                debug!("Initializing embedded shaders");

                Self {
                    $(
                        $name: Shader {
                            module: device.create_shader_module(
                                wgpu::ShaderModuleDescriptor {
                                    label: Some(concat!(
                                        "umbra_",
                                        stringify!($name)
                                    )),
                                    source: wgpu::util::make_spirv(
                                        include_bytes!(env!(concat!(
                                            "umbra_shaders::",
                                            stringify!($name),
                                            ".path"
                                        ))),
                                    ),
                                },
                            ),
                            entry_point: Cow::Borrowed(env!(concat!(
                                "umbra_shaders::",
                                stringify!($name),
                                ".entry_point"
                            ))),
                        },
                    )*
                }
            }

            /// Loads shaders from `<dir>/<kernel>.spv` files, as produced by
            /// `umbra-shader-builder`.
            pub fn from_dir(device: &wgpu::Device, dir: &Path) -> Result<Self> {
                debug!("Loading shaders from `{}`", dir.display());

                Ok(Self {
                    $( $name: load(device, dir, stringify!($name))?, )*
                })
            }

            pub fn get(&self, kernel: Kernel) -> &Shader {
                match kernel {
                    $( Kernel::$kernel => &self.$name, )*
                }
            }
        }
    };
}

shaders!([
    pre_blur => PreBlur,
    temporal_accumulation => TemporalAccumulation,
    history_fix_downsample_first => HistoryFixDownsampleFirst,
    history_fix_downsample => HistoryFixDownsample,
    history_fix_mip => HistoryFixMip,
    history_fix_sparse => HistoryFixSparse,
    spatial_filter => SpatialFilter,
    temporal_stabilization => TemporalStabilization,
]);

fn load(device: &wgpu::Device, dir: &Path, id: &str) -> Result<Shader> {
    let path = dir.join(format!("{id}.spv"));

    let spirv = fs::read(&path).map_err(|source| Error::ShaderIo {
        path: path.clone(),
        source,
    })?;

    validate(&spirv).ok_or_else(|| Error::InvalidShader { path: path.clone() })?;

    debug!("Loaded shader `{}` ({} bytes)", path.display(), spirv.len());

    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&format!("umbra_{id}")),
        source: wgpu::util::make_spirv(&spirv),
    });

    Ok(Shader {
        module,
        entry_point: Cow::Owned(format!("{id}::main")),
    })
}

/// Checks whether given bytes look like a SPIR-V module, since
/// [`wgpu::util::make_spirv()`] panics otherwise.
fn validate(spirv: &[u8]) -> Option<()> {
    if spirv.len() < 4 || spirv.len() % 4 != 0 {
        return None;
    }

    let magic = u32::from_le_bytes([spirv[0], spirv[1], spirv[2], spirv[3]]);

    (magic == SPIRV_MAGIC).then_some(())
}
