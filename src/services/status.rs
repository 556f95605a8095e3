//! Runtime status
//!
//! Build, database and process information for the status endpoint.

use std::path::PathBuf;
use std::time::Instant;

use serde::Serialize;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::db::{migrations, Database};
use crate::models::{Dish, User};

use super::ServiceResult;

/// Runtime status of the Food Tracker service
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    /// Build information
    pub name: &'static str,
    pub version: &'static str,
    pub build_number: u64,
    pub build_timestamp: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    pub schema_version: i32,
    pub dish_count: i64,
    pub user_count: i64,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    /// Get the current status
    pub fn get_status(&self, db: &Database) -> ServiceResult<ServiceStatus> {
        let build_info = BuildInfo::current();

        let (schema_version, dish_count, user_count) = db.with_conn(|conn| {
            Ok((
                migrations::get_schema_version(conn)?,
                Dish::count(conn)?,
                User::count(conn)?,
            ))
        })?;

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        Ok(ServiceStatus {
            name: build_info.name,
            version: build_info.version,
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            schema_version,
            dish_count,
            user_count,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reports_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.db");
        let db = Database::open(&path).unwrap();

        let status = StatusTracker::new(path.clone()).get_status(&db).unwrap();
        assert_eq!(status.name, "food_tracker");
        assert_eq!(status.schema_version, migrations::SCHEMA_VERSION);
        assert_eq!(status.dish_count, 0);
        assert_eq!(status.process_id, std::process::id());
        assert!(status.database_size_bytes.is_some());
    }
}
