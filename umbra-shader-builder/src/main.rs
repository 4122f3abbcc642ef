//! Compiles `umbra-shaders` into one SPIR-V module per compute pass.
//!
//! Invoked from `umbra`'s build script; for each pass `<id>` (a module of
//! `umbra-shaders` with a `main` entry point) it tells cargo about:
//!
//! - `umbra_shaders::<id>.path` - path of the compiled module,
//! - `umbra_shaders::<id>.entry_point` - name of its entry point.

use std::env;
use std::error::Error;
use std::path::Path;

use spirv_builder::{MetadataPrintout, SpirvBuilder};

const TARGET: &str = "spirv-unknown-spv1.3";

fn main() -> Result<(), Box<dyn Error>> {
    let shaders = Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .ok_or("umbra-shader-builder must live inside the workspace")?
        .join("umbra-shaders");

    let result = SpirvBuilder::new(shaders, TARGET)
        .multimodule(true)
        .print_metadata(MetadataPrintout::DependencyOnly)
        .extra_arg("--spirt-passes=reduce,fuse_selects")
        .build()?;

    let mut modules: Vec<_> = result.module.unwrap_multi().iter().collect();

    modules.sort();

    for (entry_point, path) in modules {
        let id = entry_point.strip_suffix("::main").ok_or_else(|| {
            format!("entry point `{entry_point}` is not a pass' `main`")
        })?;

        println!("cargo:rustc-env=umbra_shaders::{id}.path={}", path.display());
        println!("cargo:rustc-env=umbra_shaders::{id}.entry_point={entry_point}");
    }

    Ok(())
}
