use std::error::Error;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::{env, process};

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed=build.rs");

    if env::var_os("CARGO_FEATURE_EMBEDDED_SHADERS").is_none() {
        return Ok(());
    }

    let profile = env::var("PROFILE")?;

    println!("cargo:rerun-if-changed=../umbra-gpu/src");
    println!("cargo:rerun-if-changed=../umbra-shaders/src");
    println!("cargo:rerun-if-changed=../umbra-shader-builder/Cargo.toml");
    println!("cargo:rerun-if-changed=../umbra-shader-builder/src/main.rs");

    let mut dir = PathBuf::from(
        env::var_os("OUT_DIR").ok_or("OUT_DIR is not set")?,
    );

    // Strip `$profile/build/*/out`.
    let ok = dir.ends_with("out")
        && dir.pop()
        && dir.pop()
        && dir.ends_with("build")
        && dir.pop()
        && dir.ends_with(profile)
        && dir.pop();

    if !ok {
        return Err(format!("unexpected OUT_DIR: {}", dir.display()).into());
    }

    let dir = dir.join("shader-builder");

    let status = Command::new("cargo")
        .args([
            "run",
            "--release",
            "-p",
            "umbra-shader-builder",
            "--target-dir",
        ])
        .arg(dir)
        .env_remove("CARGO_ENCODED_RUSTFLAGS")
        .stderr(Stdio::inherit())
        .stdout(Stdio::inherit())
        .status()?;

    if !status.success() {
        process::exit(status.code().unwrap_or(1));
    }

    Ok(())
}
