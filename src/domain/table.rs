// ============================================================
// Layer 3 — Labeled Table Domain Types
// ============================================================
// A LabeledTable is the parsed form of a classification
// dataset: rows of D numeric features plus one categorical
// label. The invariant (every row has exactly D features, at
// least one row) is checked once in the constructor; fields
// are private afterwards so nothing can break it.
//
// A Split is the train/test partition produced by the
// splitter. It keeps the original row indices of each side
// so callers can verify the partition even when the dataset
// contains duplicate rows (the public iris file does).
//
// Reference: Rust Book §5 (Structs), §8 (Collections)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::error::{PipelineError, PipelineResult};

/// One observation: a feature vector and its class label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub features: Vec<f64>,
    pub label:    String,
}

impl Row {
    pub fn new(features: Vec<f64>, label: impl Into<String>) -> Self {
        Self { features, label: label.into() }
    }
}

/// An immutable, non-empty table of rows sharing one feature dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledTable {
    rows:          Vec<Row>,
    feature_count: usize,
}

impl LabeledTable {
    /// Build a table, rejecting empty input and ragged rows.
    pub fn new(rows: Vec<Row>) -> PipelineResult<Self> {
        let first = rows.first().ok_or_else(|| {
            PipelineError::ParseError("dataset contains no rows".to_string())
        })?;
        let feature_count = first.features.len();

        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.features.len() != feature_count)
        {
            return Err(PipelineError::DimensionMismatch(format!(
                "row {} has {} features, expected {}",
                idx + 1,
                row.features.len(),
                feature_count
            )));
        }

        Ok(Self { rows, feature_count })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Feature dimension D shared by every row.
    pub fn feature_count(&self) -> usize {
        self.feature_count
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Feature vectors in row order.
    pub fn features(&self) -> Vec<Vec<f64>> {
        self.rows.iter().map(|r| r.features.clone()).collect()
    }

    /// Labels in row order, parallel to `features()`.
    pub fn labels(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.label.clone()).collect()
    }

    /// Number of rows per class, ordered by label.
    pub fn class_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for row in &self.rows {
            *counts.entry(row.label.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Copy out the rows at `indices`, in the order given.
    ///
    /// The result may be empty; it is only used for split halves, which
    /// are never empty when the splitter succeeds.
    pub fn select(&self, indices: &[usize]) -> LabeledTable {
        LabeledTable {
            rows:          indices.iter().map(|&i| self.rows[i].clone()).collect(),
            feature_count: self.feature_count,
        }
    }
}

/// Disjoint train/test partition of one LabeledTable.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub train:         LabeledTable,
    pub test:          LabeledTable,
    /// Original row positions that went to `train`, ascending.
    pub train_indices: Vec<usize>,
    /// Original row positions that went to `test`, ascending.
    pub test_indices:  Vec<usize>,
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_table() {
        let err = LabeledTable::new(Vec::new()).unwrap_err();
        assert_eq!(err.kind(), crate::domain::error::ErrorKind::ParseError);
    }

    #[test]
    fn test_rejects_ragged_rows() {
        let rows = vec![
            Row::new(vec![1.0, 2.0], "a"),
            Row::new(vec![1.0], "b"),
        ];
        let err = LabeledTable::new(rows).unwrap_err();
        assert_eq!(err.kind(), crate::domain::error::ErrorKind::DimensionMismatch);
    }

    #[test]
    fn test_class_counts_are_sorted_by_label() {
        let rows = vec![
            Row::new(vec![1.0], "zeta"),
            Row::new(vec![2.0], "alpha"),
            Row::new(vec![3.0], "zeta"),
        ];
        let table  = LabeledTable::new(rows).unwrap();
        let counts: Vec<_> = table.class_counts().into_iter().collect();
        assert_eq!(counts, vec![("alpha", 1), ("zeta", 2)]);
    }

    #[test]
    fn test_select_keeps_dimension() {
        let rows = vec![
            Row::new(vec![1.0, 1.0], "a"),
            Row::new(vec![2.0, 2.0], "b"),
            Row::new(vec![3.0, 3.0], "a"),
        ];
        let table  = LabeledTable::new(rows).unwrap();
        let picked = table.select(&[2, 0]);
        assert_eq!(picked.len(), 2);
        assert_eq!(picked.feature_count(), 2);
        assert_eq!(picked.rows()[0].features, vec![3.0, 3.0]);
    }
}
