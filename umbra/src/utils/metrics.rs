/// Runs given function; with the `metrics` feature enabled, also logs how
/// long it took.
#[cfg(feature = "metrics")]
pub fn measure<T>(label: &str, f: impl FnOnce() -> T) -> T {
    use std::time::Instant;

    let tt = Instant::now();
    let val = f();
    let tt = tt.elapsed();

    log::trace!("{label}: {}", humantime::format_duration(tt));

    val
}

#[cfg(not(feature = "metrics"))]
pub fn measure<T>(_label: &str, f: impl FnOnce() -> T) -> T {
    f()
}
