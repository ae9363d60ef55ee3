//! Recept Status Tool
//!
//! Provides runtime status information about the Recept service.

use std::path::PathBuf;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::db::{migrations, Database};

/// Service status information
#[derive(Debug, Clone, Serialize)]
pub struct ReceptStatus {
    pub build: BuildInfo,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    /// Version recorded in the database itself
    pub database_schema_version: Option<i32>,

    /// Process information
    pub started_at: String,
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: Option<u64>,
}

/// Tracks service runtime status
pub struct StatusTracker {
    start_time: Instant,
    started_at: DateTime<Utc>,
    database_path: PathBuf,
}

fn process_memory(pid: u32) -> Option<u64> {
    let pid = Pid::from_u32(pid);
    let mut sys = System::new();
    sys.refresh_processes(ProcessesToUpdate::Some(&[pid]));
    sys.process(pid).map(|p| p.memory())
}

impl StatusTracker {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            started_at: Utc::now(),
            database_path,
        }
    }

    /// Get the current status. A database that cannot be queried reports no schema version.
    pub fn get_status(&self, database: &Database) -> ReceptStatus {
        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let database_schema_version = match database.with_conn(migrations::get_schema_version) {
            Ok(version) => Some(version),
            Err(e) => {
                tracing::warn!("Could not read schema version: {}", e);
                None
            }
        };

        let process_id = std::process::id();

        ReceptStatus {
            build: BuildInfo::current(),
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            database_schema_version,
            started_at: self.started_at.to_rfc3339(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id,
            memory_usage_bytes: process_memory(process_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::SCHEMA_VERSION;

    #[test]
    fn test_status_reports_schema_version() {
        let path = std::env::temp_dir().join(format!("recept-status-{}.db", crate::models::Identity::generate()));
        let database = Database::new(&path).unwrap();
        database.with_conn(migrations::run_migrations).unwrap();

        let status = StatusTracker::new(path.clone()).get_status(&database);
        assert_eq!(status.database_schema_version, Some(SCHEMA_VERSION));
        assert_eq!(status.build.schema_version, SCHEMA_VERSION);
        assert_eq!(status.database_path, path.display().to_string());
        assert!(status.database_size_bytes.is_some());
        assert_eq!(status.process_id, std::process::id());
        assert!(status.memory_usage_bytes.is_some_and(|bytes| bytes > 0));
    }
}
