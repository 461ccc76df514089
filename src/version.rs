const fn unwrap_or_cargo_version(opt: Option<&'static str>) -> &'static str {
    match opt {
        Some(val) => val,
        None => env!("CARGO_PKG_VERSION"),
    }
}

/// Release builds stamp the real version through `PULSEWATCH_VERSION`;
/// otherwise the crate version from the manifest is used.
pub const VERSION: &str = unwrap_or_cargo_version(option_env!("PULSEWATCH_VERSION"));
