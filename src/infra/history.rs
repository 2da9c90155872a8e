// ============================================================
// Layer 6 — Training History Log
// ============================================================
// Appends one CSV row per successful training run next to the
// artifact, so operators can see how accuracy moved between
// retrains without keeping every old artifact around.
//
// Output file: <artifact dir>/training_history.csv
//
// Example:
//   created_at,accuracy,train_samples,test_samples,algorithm,source
//   2026-10-14T09:12:03.120Z,0.966667,120,30,random_forest,https://…/iris.data
//
// The artifact is already committed when this runs, so the
// pipeline treats a failure here as a warning, not an error.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

pub const HISTORY_FILE_NAME: &str = "training_history.csv";

const HEADER: &str = "created_at,accuracy,train_samples,test_samples,algorithm,source";

/// One training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecord {
    pub created_at:    DateTime<Utc>,
    pub accuracy:      f64,
    pub train_samples: usize,
    pub test_samples:  usize,
    pub algorithm:     String,
    pub source:        String,
}

/// Append-only CSV log of training runs.
pub struct TrainingHistory {
    csv_path: PathBuf,
}

impl TrainingHistory {
    /// History file living beside the artifact at `artifact_location`.
    pub fn beside(artifact_location: &Path) -> Self {
        let dir = artifact_location
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Self { csv_path: dir.join(HISTORY_FILE_NAME) }
    }

    /// Append `record`, writing the header first if the file is new.
    pub fn append(&self, record: &TrainingRecord) -> Result<()> {
        if let Some(dir) = self.csv_path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create '{}'", dir.display()))?;
        }

        let is_new = !self.csv_path.exists();
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        if is_new {
            writeln!(f, "{HEADER}")?;
        }

        writeln!(
            f,
            "{},{:.6},{},{},{},{}",
            record.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            record.accuracy,
            record.train_samples,
            record.test_samples,
            csv_field(&record.algorithm),
            csv_field(&record.source),
        )?;

        tracing::debug!(
            "Logged training run: accuracy={:.4} to '{}'",
            record.accuracy,
            self.csv_path.display()
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

/// Quote a field if it contains a delimiter, quote or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn record(accuracy: f64, source: &str) -> TrainingRecord {
        TrainingRecord {
            created_at:    Utc::now(),
            accuracy,
            train_samples: 120,
            test_samples:  30,
            algorithm:     "random_forest".into(),
            source:        source.into(),
        }
    }

    #[test]
    fn test_appends_rows_under_single_header() {
        let dir     = tempfile::tempdir().unwrap();
        let history = TrainingHistory::beside(&dir.path().join("models/model.json"));

        history.append(&record(0.9, "iris.data")).unwrap();
        history.append(&record(0.95, "iris.data")).unwrap();

        let text  = fs::read_to_string(history.csv_path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], HEADER);
        assert!(lines[2].contains(",0.950000,120,30,random_forest,iris.data"));
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
