// Build-time identity from Cargo.toml: served by GET /version and stamped as the PDF producer.

/// Package version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name (`equipment-report`).
pub const NAME: &str = env!("CARGO_PKG_NAME");
