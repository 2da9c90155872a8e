// Shared fixtures for the application-layer unit tests.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::domain::artifact::ModelArtifact;
use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::table::{LabeledTable, Row};
use crate::domain::traits::{ArtifactStore, DatasetSource};
use crate::infra::artifact_store::FsArtifactStore;

pub const SPECIES: [&str; 3] = ["Iris-setosa", "Iris-versicolor", "Iris-virginica"];

/// 150 rows, 50 per species, four well-separated features.
pub fn iris_like() -> LabeledTable {
    let rows = SPECIES
        .iter()
        .enumerate()
        .flat_map(|(c, species)| {
            let base = c as f64;
            (0..50).map(move |i| {
                let jitter = (i % 10) as f64 * 0.05;
                Row::new(
                    vec![
                        4.5 + base * 1.5 + jitter,
                        3.0 + base * 0.4 + jitter,
                        1.5 + base * 2.0 + jitter,
                        0.2 + base * 0.9 + jitter,
                    ],
                    *species,
                )
            })
        })
        .collect();
    LabeledTable::new(rows).unwrap()
}

/// A DatasetSource that always returns the same table.
pub struct StaticSource {
    pub table:   PipelineResult<LabeledTable>,
    pub fetches: AtomicUsize,
}

impl StaticSource {
    pub fn ok(table: LabeledTable) -> Self {
        Self { table: Ok(table), fetches: AtomicUsize::new(0) }
    }

    pub fn failing(err: PipelineError) -> Self {
        Self { table: Err(err), fetches: AtomicUsize::new(0) }
    }
}

impl DatasetSource for StaticSource {
    fn fetch(&self, _locator: &str) -> PipelineResult<LabeledTable> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.table.clone()
    }
}

impl DatasetSource for Arc<StaticSource> {
    fn fetch(&self, locator: &str) -> PipelineResult<LabeledTable> {
        self.as_ref().fetch(locator)
    }
}

/// Filesystem store that counts calls.
#[derive(Default)]
pub struct CountingStore {
    inner:      FsArtifactStore,
    pub saves:  AtomicUsize,
    pub loads:  AtomicUsize,
    pub checks: AtomicUsize,
}

impl CountingStore {
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl ArtifactStore for CountingStore {
    fn save(&self, artifact: &ModelArtifact, location: &Path) -> PipelineResult<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.inner.save(artifact, location)
    }

    fn load(&self, location: &Path) -> PipelineResult<ModelArtifact> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.inner.load(location)
    }

    fn exists(&self, location: &Path) -> bool {
        self.checks.fetch_add(1, Ordering::SeqCst);
        self.inner.exists(location)
    }
}
