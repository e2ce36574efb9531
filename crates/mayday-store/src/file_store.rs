//! Directory-backed report store
//!
//! Layout written by the crash monitor:
//!
//! ```text
//! <base_path>/Reports/<bundle_id>-report-<id as 16 hex digits>.json
//! ```
//!
//! Files in the directory that do not follow this pattern for the installed
//! bundle id are ignored.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use mayday_core::ports::IReportStore;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Directory under the base path holding the report files
pub const REPORTS_DIR: &str = "Reports";

#[derive(Debug, Clone)]
struct Layout {
    bundle_id: String,
    reports_dir: PathBuf,
}

impl Layout {
    fn report_path(&self, id: i64) -> PathBuf {
        self.reports_dir
            .join(format!("{}-report-{:016x}.json", self.bundle_id, id))
    }
}

/// Report store over the crash monitor's report directory
///
/// Must be [`install`](IReportStore::install)ed before use.
#[derive(Debug, Default)]
pub struct FileReportStore {
    layout: RwLock<Option<Layout>>,
}

impl FileReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The reports directory for `base_path`
    pub fn reports_dir(base_path: &Path) -> PathBuf {
        base_path.join(REPORTS_DIR)
    }

    async fn layout(&self) -> Result<Layout> {
        self.layout
            .read()
            .await
            .clone()
            .context("Report store used before install")
    }
}

#[async_trait]
impl IReportStore for FileReportStore {
    async fn install(&self, bundle_id: &str, base_path: &Path) -> Result<()> {
        let reports_dir = Self::reports_dir(base_path);
        tokio::fs::create_dir_all(&reports_dir)
            .await
            .with_context(|| format!("Failed to create {}", reports_dir.display()))?;

        info!(bundle_id, dir = %reports_dir.display(), "Report store installed");
        *self.layout.write().await = Some(Layout {
            bundle_id: bundle_id.to_string(),
            reports_dir,
        });
        Ok(())
    }

    async fn report_count(&self) -> Result<usize> {
        Ok(self.report_ids().await?.len())
    }

    async fn report_ids(&self) -> Result<Vec<i64>> {
        let layout = self.layout().await?;

        let mut entries = match tokio::fs::read_dir(&layout.reports_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to list {}", layout.reports_dir.display())
                })
            }
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .context("Failed to read report directory entry")?
        {
            let name = entry.file_name();
            if let Some(id) = parse_report_filename(&name.to_string_lossy(), &layout.bundle_id) {
                ids.push(id);
            }
        }

        ids.sort_unstable();
        debug!(count = ids.len(), "Listed crash reports");
        Ok(ids)
    }

    async fn read_report(&self, id: i64) -> Result<Option<Vec<u8>>> {
        let path = self.layout().await?.report_path(id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    async fn delete_report(&self, id: i64) -> Result<()> {
        let path = self.layout().await?.report_path(id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(id, "Deleted crash report");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to delete {}", path.display())),
        }
    }

    async fn delete_all_reports(&self) -> Result<()> {
        for id in self.report_ids().await? {
            self.delete_report(id).await?;
        }
        Ok(())
    }
}

/// Parse a file name like `com.example.MyApp-report-0000000000000001.json`
/// into its report id. Returns `None` for any other file.
fn parse_report_filename(name: &str, bundle_id: &str) -> Option<i64> {
    let hex = name
        .strip_prefix(bundle_id)?
        .strip_prefix("-report-")?
        .strip_suffix(".json")?;
    if hex.len() != 16 {
        return None;
    }
    // Ids are written as the two's complement bit pattern
    u64::from_str_radix(hex, 16).ok().map(|id| id as i64)
}
