// Build-time version and wire constants

/// Package name (from Cargo.toml).
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Reported as `nodewatcher_version` in the system data.
pub const VERSION: &str = concat!("gnw-", env!("CARGO_PKG_VERSION"));

/// Reported as `firmware_version`; this crawler runs on generic Linux, not a firmware image.
pub const FIRMWARE_VERSION: &str = "Generic";

/// Top-level key of the JSON envelope expected by the collector.
pub const PROTOCOL_VERSION: &str = "64";
