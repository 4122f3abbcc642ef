use std::io;
use std::path::PathBuf;

use glam::UVec2;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Setting `{name}` is invalid: {reason}")]
    InvalidSetting {
        name: &'static str,
        reason: &'static str,
    },

    #[error("Viewport {{{size}}} is empty")]
    EmptyViewport { size: UVec2 },

    #[error("Image `{name}` has size {{{size}}}, but {{{expected}}} was expected")]
    MismatchedImage {
        name: &'static str,
        size: UVec2,
        expected: UVec2,
    },

    #[error("Pass `{pass}` binds `{resource}` both for reading and writing")]
    AliasedResource { pass: String, resource: String },

    #[error("Failed to read shader `{}`", path.display())]
    ShaderIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Shader `{}` is not a valid SPIR-V module", path.display())]
    InvalidShader { path: PathBuf },

    #[error("{source}")]
    Image {
        #[from]
        source: image::ImageError,
    },
}
