// ============================================================
// Layer 4 — Stratified Train/Test Splitter
// ============================================================
// Splits a LabeledTable into a training set (used to fit the
// estimator) and a test set (used to measure accuracy on rows
// the model has never seen).
//
// Why stratify?
//   Datasets are often ordered by class (the iris file lists
//   all setosa rows first). A plain shuffle-and-cut can leave
//   a class under-represented in the test set, which makes the
//   reported accuracy noisy. Stratifying keeps each class's
//   share the same on both sides.
//
// Allocation per class with n rows:
//   n_test = round(n * test_fraction), clamped to [1, n - 1]
//   so every class appears in both train and test. That is
//   only possible with n >= 2, so singleton classes are an
//   InsufficientClassSamples error.
//
// Determinism:
//   Classes are visited in label order with a single StdRng
//   seeded from `seed`. Each class's row indices are shuffled
//   (Fisher-Yates via rand::seq::SliceRandom) and the first
//   n_test go to test. Both halves are emitted in original
//   row order, so the same (table, fraction, seed) always
//   gives the same partition.
//
// Reference: Rust Book §8 (Vectors)
//            rand crate documentation

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::table::{LabeledTable, Split};

/// Stratified, seeded split of `table` into (train, test).
pub fn stratified_split(
    table:         &LabeledTable,
    test_fraction: f64,
    seed:          u64,
) -> PipelineResult<Split> {
    // `!(x > 0 && x < 1)` also rejects NaN
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(PipelineError::InvalidParameter(format!(
            "test fraction must lie strictly between 0 and 1, got {test_fraction}"
        )));
    }

    // Row indices grouped by label, each group in original order
    let mut by_class: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (idx, row) in table.rows().iter().enumerate() {
        by_class.entry(row.label.as_str()).or_default().push(idx);
    }

    if let Some((label, members)) = by_class.iter().find(|(_, m)| m.len() < 2) {
        return Err(PipelineError::InsufficientClassSamples(format!(
            "class '{label}' has {} sample(s); stratified splitting needs at least 2 per class",
            members.len()
        )));
    }

    let mut rng           = StdRng::seed_from_u64(seed);
    let mut train_indices = Vec::with_capacity(table.len());
    let mut test_indices  = Vec::new();

    for (label, mut members) in by_class {
        let n      = members.len();
        let n_test = ((n as f64) * test_fraction).round() as usize;
        let n_test = n_test.clamp(1, n - 1);

        members.shuffle(&mut rng);
        let train_part = members.split_off(n_test);

        tracing::debug!("Class '{}': {} train, {} test", label, train_part.len(), members.len());

        test_indices.extend(members);
        train_indices.extend(train_part);
    }

    train_indices.sort_unstable();
    test_indices.sort_unstable();

    tracing::debug!(
        "Dataset split: {} training, {} test ({:.0}% / {:.0}%)",
        train_indices.len(),
        test_indices.len(),
        100.0 * train_indices.len() as f64 / table.len() as f64,
        100.0 * test_indices.len()  as f64 / table.len() as f64,
    );

    Ok(Split {
        train: table.select(&train_indices),
        test:  table.select(&test_indices),
        train_indices,
        test_indices,
    })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorKind;
    use crate::domain::table::Row;

    /// `per_class` rows for each label, feature = running row number.
    fn table(labels: &[(&str, usize)]) -> LabeledTable {
        let mut rows = Vec::new();
        for (label, count) in labels {
            for _ in 0..*count {
                rows.push(Row::new(vec![rows.len() as f64], *label));
            }
        }
        LabeledTable::new(rows).unwrap()
    }

    #[test]
    fn test_iris_sized_split() {
        let t     = table(&[("setosa", 50), ("versicolor", 50), ("virginica", 50)]);
        let split = stratified_split(&t, 0.2, 42).unwrap();

        assert_eq!(split.test.len(), 30);
        assert_eq!(split.train.len(), 120);
        for count in split.test.class_counts().values() {
            assert_eq!(*count, 10);
        }
        for count in split.train.class_counts().values() {
            assert_eq!(*count, 40);
        }
    }

    #[test]
    fn test_partition_is_disjoint_and_complete() {
        let t     = table(&[("a", 7), ("b", 13), ("c", 2)]);
        let split = stratified_split(&t, 0.3, 9).unwrap();

        let mut all: Vec<usize> = split.train_indices.iter().chain(&split.test_indices).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..t.len()).collect::<Vec<_>>());

        for idx in &split.test_indices {
            assert!(!split.train_indices.contains(idx));
        }
    }

    #[test]
    fn test_same_seed_same_partition() {
        let t = table(&[("a", 20), ("b", 30)]);
        let first  = stratified_split(&t, 0.25, 7).unwrap();
        let second = stratified_split(&t, 0.25, 7).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_different_seed_changes_partition() {
        let t = table(&[("a", 50), ("b", 50)]);
        let first  = stratified_split(&t, 0.5, 1).unwrap();
        let second = stratified_split(&t, 0.5, 2).unwrap();
        assert_ne!(first.test_indices, second.test_indices);
    }

    #[test]
    fn test_small_classes_keep_both_sides() {
        // 3 classes x 2 rows at 0.4: each class sends exactly one row to test
        let t     = table(&[("a", 2), ("b", 2), ("c", 2)]);
        let split = stratified_split(&t, 0.4, 42).unwrap();
        assert_eq!(split.test.len(), 3);
        assert_eq!(split.train.len(), 3);
    }

    #[test]
    fn test_rejects_fraction_out_of_range() {
        let t = table(&[("a", 4), ("b", 4)]);
        for bad in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            let err = stratified_split(&t, bad, 0).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        }
    }

    #[test]
    fn test_singleton_class_is_rejected() {
        let t   = table(&[("a", 10), ("lonely", 1)]);
        let err = stratified_split(&t, 0.2, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientClassSamples);
        assert!(err.detail().contains("lonely"));
    }
}
