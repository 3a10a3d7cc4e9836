//! SQLite-backed vulnerability store.
//!
//! Each ingest wipes the previous scan data: the service keeps exactly one
//! repository's worth of reports at a time.

use std::path::Path;

use chrono::Utc;
use rusqlite::{Connection, params};
use serde_json::Value;

use crate::client::models::VulnRecord;
use crate::error::StoreError;

pub mod extract;

use extract::extract_scan;

type Result<T> = std::result::Result<T, StoreError>;

/// Counters from one ingest pass
#[derive(Debug, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub scans_inserted: usize,
    pub scans_skipped: usize,
    pub vulnerabilities_inserted: usize,
}

/// SQLite-backed store for scan summaries and their vulnerabilities
pub struct VulnStore {
    conn: Connection,
}

impl VulnStore {
    /// Open or create the store at the given path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::Io(format!("Failed to create db dir: {}", e)))?;
            }
        }

        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.create_tables()?;
        Ok(store)
    }

    /// Open an in-memory store (tests)
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.create_tables()?;
        Ok(store)
    }

    fn create_tables(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS scans (
                scan_id TEXT PRIMARY KEY,
                timestamp TEXT,
                scan_status TEXT,
                resource_type TEXT,
                resource_name TEXT,
                total_vulnerabilities INTEGER,
                severity_counts TEXT,
                fixable_count INTEGER,
                compliant BOOLEAN,
                ingested_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS vulnerabilities (
                id TEXT PRIMARY KEY,
                scan_id TEXT,
                severity TEXT,
                cvss REAL,
                status TEXT,
                package_name TEXT,
                current_version TEXT,
                fixed_version TEXT,
                description TEXT,
                published_date TEXT,
                link TEXT,
                FOREIGN KEY (scan_id) REFERENCES scans(scan_id)
            );

            CREATE TABLE IF NOT EXISTS risk_factors (
                vuln_id TEXT,
                risk_factor TEXT,
                PRIMARY KEY (vuln_id, risk_factor),
                FOREIGN KEY (vuln_id) REFERENCES vulnerabilities(id)
            );

            CREATE INDEX IF NOT EXISTS idx_vuln_severity ON vulnerabilities(severity);
            "#,
        )?;
        Ok(())
    }

    /// Delete all stored scan data
    pub fn clear_scans(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            DELETE FROM risk_factors;
            DELETE FROM vulnerabilities;
            DELETE FROM scans;
            "#,
        )?;
        Ok(())
    }

    /// Ingest parsed scan report documents.
    ///
    /// Documents without a recognizable shape and duplicate scan ids are
    /// logged and skipped; one bad document never aborts the batch.
    pub fn save_scan_documents(&self, documents: &[Value]) -> Result<IngestStats> {
        let mut stats = IngestStats::default();
        let ingested_at = Utc::now().to_rfc3339();

        for doc in documents {
            let Some(extracted) = extract_scan(doc) else {
                log::warn!("Skipping document without scanResults");
                stats.scans_skipped += 1;
                continue;
            };

            let summary = &extracted.summary;
            let exists: i64 = self.conn.query_row(
                "SELECT COUNT(*) FROM scans WHERE scan_id = ?1",
                [&summary.scan_id],
                |row| row.get(0),
            )?;
            if exists > 0 {
                log::info!("Scan {} already stored, skipping", summary.scan_id);
                stats.scans_skipped += 1;
                continue;
            }

            self.conn.execute(
                "INSERT INTO scans (scan_id, timestamp, scan_status, resource_type, resource_name,
                     total_vulnerabilities, severity_counts, fixable_count, compliant, ingested_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    summary.scan_id,
                    summary.timestamp,
                    summary.status,
                    summary.resource_type,
                    summary.resource_name,
                    summary.total_vulnerabilities,
                    summary.severity_counts,
                    summary.fixable_count,
                    summary.compliant,
                    ingested_at,
                ],
            )?;
            stats.scans_inserted += 1;

            for vuln in &extracted.vulnerabilities {
                let inserted = self.conn.execute(
                    "INSERT OR IGNORE INTO vulnerabilities
                         (id, scan_id, severity, cvss, status, package_name, current_version,
                          fixed_version, description, published_date, link)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                    params![
                        vuln.id,
                        summary.scan_id,
                        vuln.severity,
                        vuln.cvss,
                        vuln.status,
                        vuln.package_name,
                        vuln.current_version,
                        vuln.fixed_version,
                        vuln.description,
                        vuln.published_date,
                        vuln.link,
                    ],
                )?;
                if inserted == 0 {
                    log::warn!("Vulnerability {} already stored, skipping", vuln.id);
                    continue;
                }
                stats.vulnerabilities_inserted += 1;

                for factor in &vuln.risk_factors {
                    self.conn.execute(
                        "INSERT OR IGNORE INTO risk_factors (vuln_id, risk_factor) VALUES (?1, ?2)",
                        params![vuln.id, factor],
                    )?;
                }
            }
        }

        Ok(stats)
    }

    /// Fetch vulnerabilities with the given severity, risk factors joined in
    pub fn query_by_severity(&self, severity: &str) -> Result<Vec<VulnRecord>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT
                   v.id,
                   v.severity,
                   v.cvss,
                   COALESCE(v.status, ''),
                   v.package_name,
                   v.current_version,
                   v.fixed_version,
                   v.description,
                   v.published_date,
                   COALESCE(v.link, ''),
                   COALESCE('[' || GROUP_CONCAT(r.risk_factor, ', ') || ']', '')
               FROM vulnerabilities v
               LEFT JOIN risk_factors r ON v.id = r.vuln_id
               WHERE v.severity = ?1
               GROUP BY v.id, v.severity, v.cvss, v.status, v.package_name, v.current_version,
                        v.fixed_version, v.description, v.published_date, v.link
               ORDER BY v.id"#,
        )?;

        let rows = stmt.query_map([severity], |row| {
            Ok(VulnRecord {
                id: row.get(0)?,
                severity: row.get(1)?,
                cvss: row.get(2)?,
                status: row.get(3)?,
                package_name: row.get(4)?,
                current_version: row.get(5)?,
                fixed_version: row.get(6)?,
                description: row.get(7)?,
                published_date: row.get(8)?,
                link: row.get(9)?,
                risk_factors: row.get(10)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}
