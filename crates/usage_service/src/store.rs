//! Usage store - SQLite persistence for tracking events
//!
//! One table per event kind. The connection sits behind a mutex; write
//! volume is a handful of rows per user session, so contention is not a
//! concern here.

use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use log::warn;
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::error::Result;

/// An enhancement tracking row as received from the client.
#[derive(Debug, Clone)]
pub struct EnhancementEvent {
    pub user_id: String,
    pub filename: Option<String>,
    pub file_size: Option<u64>,
    pub processing_time: f64,
    pub enhancement_type: String,
    pub success: bool,
}

/// A watermark tracking row as received from the client.
#[derive(Debug, Clone)]
pub struct WatermarkEvent {
    pub user_id: String,
    pub filename: Option<String>,
    pub file_size: Option<u64>,
    pub processing_time: f64,
    pub watermark_text: Option<String>,
    pub watermark_style: Option<String>,
    pub watermark_position: Option<String>,
    pub photo_count: u32,
    pub success: bool,
}

/// Aggregates served by `GET /api/stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub users: u64,
    pub photos_enhanced: u64,
    pub photos_watermarked: u64,
}

pub struct UsageStore {
    conn: Mutex<Connection>,
}

impl UsageStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// In-memory store, for tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS photo_enhancements (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 user_id TEXT,
                 filename TEXT,
                 file_size INTEGER,
                 processing_time REAL NOT NULL,
                 enhancement_type TEXT NOT NULL,
                 success INTEGER NOT NULL,
                 created_at TEXT NOT NULL
             );
             CREATE TABLE IF NOT EXISTS photo_watermarks (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 user_id TEXT,
                 filename TEXT,
                 file_size INTEGER,
                 processing_time REAL NOT NULL,
                 watermark_text TEXT,
                 watermark_style TEXT,
                 watermark_position TEXT,
                 photo_count INTEGER NOT NULL,
                 success INTEGER NOT NULL,
                 created_at TEXT NOT NULL
             );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    // Anonymous usage is stored as NULL so distinct-user counts only cover
    // signed-in users.
    fn user_column(user_id: &str) -> Option<&str> {
        if user_id == "anonymous" {
            None
        } else {
            Some(user_id)
        }
    }

    pub fn record_enhancement(&self, event: &EnhancementEvent) -> Result<i64> {
        let conn = self.conn.lock().expect("store lock");
        conn.execute(
            "INSERT INTO photo_enhancements
                 (user_id, filename, file_size, processing_time, enhancement_type, success, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                Self::user_column(&event.user_id),
                event.filename,
                event.file_size,
                event.processing_time,
                event.enhancement_type,
                event.success,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn record_watermark(&self, event: &WatermarkEvent) -> Result<i64> {
        let conn = self.conn.lock().expect("store lock");
        conn.execute(
            "INSERT INTO photo_watermarks
                 (user_id, filename, file_size, processing_time, watermark_text,
                  watermark_style, watermark_position, photo_count, success, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                Self::user_column(&event.user_id),
                event.filename,
                event.file_size,
                event.processing_time,
                event.watermark_text,
                event.watermark_style,
                event.watermark_position,
                event.photo_count,
                event.success,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Aggregate statistics. Failures degrade to all zeros; the stats page
    /// must render even with a broken store.
    pub fn stats(&self) -> UsageStats {
        match self.query_stats() {
            Ok(stats) => stats,
            Err(err) => {
                warn!("stats query failed, serving zeros: {err}");
                UsageStats::default()
            }
        }
    }

    fn query_stats(&self) -> Result<UsageStats> {
        let conn = self.conn.lock().expect("store lock");
        let users: u64 = conn.query_row(
            "SELECT COUNT(*) FROM (
                 SELECT user_id FROM photo_enhancements WHERE user_id IS NOT NULL
                 UNION
                 SELECT user_id FROM photo_watermarks WHERE user_id IS NOT NULL
             )",
            [],
            |row| row.get(0),
        )?;
        let photos_enhanced: u64 = conn.query_row(
            "SELECT COUNT(*) FROM photo_enhancements WHERE success = 1",
            [],
            |row| row.get(0),
        )?;
        let photos_watermarked: u64 = conn.query_row(
            "SELECT COALESCE(SUM(photo_count), 0) FROM photo_watermarks WHERE success = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(UsageStats {
            users,
            photos_enhanced,
            photos_watermarked,
        })
    }
}
