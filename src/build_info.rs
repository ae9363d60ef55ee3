//! Build metadata
//!
//! `build.rs` stamps every compile with a build number and UTC timestamp.
//! Together with the crate version and the schema version the binary
//! migrates to, they identify exactly what a running server is.

use std::fmt;

use serde::Serialize;

use crate::db::migrations::SCHEMA_VERSION;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const RAW_BUILD_NUMBER: Option<&str> = option_env!("RECEPT_BUILD_NUMBER");
const RAW_BUILD_TIMESTAMP: Option<&str> = option_env!("RECEPT_BUILD_TIMESTAMP");

/// What this binary was built as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    /// 0 when built without the build script's stamp
    pub build_number: u64,
    pub build_timestamp: &'static str,
    /// Schema version this build migrates databases to
    pub schema_version: i32,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self::from_stamp(RAW_BUILD_NUMBER, RAW_BUILD_TIMESTAMP)
    }

    fn from_stamp(number: Option<&str>, timestamp: Option<&'static str>) -> Self {
        Self {
            version: VERSION,
            build_number: number.and_then(|n| n.trim().parse().ok()).unwrap_or(0),
            build_timestamp: timestamp.unwrap_or("unknown"),
            schema_version: SCHEMA_VERSION,
        }
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Recept Nutrition Manager v{} (build {}, compiled {}, schema v{})",
            self.version, self.build_number, self.build_timestamp, self.schema_version
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamp_is_parsed() {
        let info = BuildInfo::from_stamp(Some("42"), Some("2026-01-01T00:00:00Z"));
        assert_eq!(info.build_number, 42);
        assert_eq!(info.build_timestamp, "2026-01-01T00:00:00Z");
        assert_eq!(info.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn test_missing_or_garbled_stamp() {
        let info = BuildInfo::from_stamp(Some("12a"), None);
        assert_eq!(info.build_number, 0);
        assert_eq!(info.build_timestamp, "unknown");
    }

    #[test]
    fn test_display_line() {
        let info = BuildInfo::from_stamp(Some("7"), Some("2026-03-04T05:06:07Z"));
        assert_eq!(
            info.to_string(),
            format!(
                "Recept Nutrition Manager v{} (build 7, compiled 2026-03-04T05:06:07Z, schema v{})",
                VERSION, SCHEMA_VERSION
            )
        );
    }
}
