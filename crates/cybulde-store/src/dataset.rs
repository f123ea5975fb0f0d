//! Sample dataset loading and random sampling.
//!
//! The dataset is a Parquet export of the test split with at least a `text`
//! column. Each distinct path is read at most once per [`DatasetCache`]; the
//! cache is handed to [`DatasetSampler`] explicitly rather than living in a
//! global.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, TryLockError};

use arrow::array::{Array, LargeStringArray, StringArray};
use arrow::record_batch::RecordBatch;
use cybulde_core::dataset::{TEXT_COLUMN, is_text_type};
use parquet::arrow::ProjectionMask;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::StoreError;

/// Text rows of a loaded dataset, in file order. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    path: PathBuf,
    texts: Vec<String>,
}

impl Dataset {
    pub fn from_texts(path: impl Into<PathBuf>, texts: Vec<String>) -> Self {
        Self {
            path: path.into(),
            texts,
        }
    }

    /// Read the `text` column of a Parquet file.
    ///
    /// Null texts are dropped. Fails with [`StoreError::NotFound`] if the file
    /// does not exist and [`StoreError::Schema`] if the column is missing or
    /// not a string column.
    pub fn read(path: &Path) -> Result<Self, StoreError> {
        if !path.is_file() {
            return Err(StoreError::NotFound(path.to_path_buf()));
        }

        let file = std::fs::File::open(path)?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

        // Only decode the text column.
        let text_idx = text_column_index(path, builder.schema())?;
        let mask = ProjectionMask::roots(builder.parquet_schema(), [text_idx]);
        let reader = builder.with_projection(mask).build()?;

        let mut texts = Vec::new();
        let mut nulls = 0usize;
        for batch in reader {
            nulls += append_texts(path, &batch?, &mut texts)?;
        }

        if nulls > 0 {
            warn!(path = %path.display(), nulls, "dropped rows with null text");
        }
        info!(path = %path.display(), rows = texts.len(), "loaded dataset");

        Ok(Self {
            path: path.to_path_buf(),
            texts,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

fn text_column_index(path: &Path, schema: &arrow::datatypes::Schema) -> Result<usize, StoreError> {
    let schema_err = || StoreError::Schema {
        path: path.to_path_buf(),
        column: TEXT_COLUMN.to_string(),
    };
    let idx = schema.index_of(TEXT_COLUMN).map_err(|_| schema_err())?;
    if !is_text_type(schema.field(idx).data_type()) {
        return Err(schema_err());
    }
    Ok(idx)
}

/// Append non-null texts from `batch`, returning the number of nulls skipped.
///
/// Handles both `Utf8` (StringArray) and `LargeUtf8` (LargeStringArray).
fn append_texts(
    path: &Path,
    batch: &RecordBatch,
    out: &mut Vec<String>,
) -> Result<usize, StoreError> {
    let col = batch
        .column_by_name(TEXT_COLUMN)
        .ok_or_else(|| StoreError::Schema {
            path: path.to_path_buf(),
            column: TEXT_COLUMN.to_string(),
        })?;

    let before = out.len();
    if let Some(arr) = col.as_any().downcast_ref::<StringArray>() {
        out.extend(arr.iter().flatten().map(str::to_string));
    } else if let Some(arr) = col.as_any().downcast_ref::<LargeStringArray>() {
        out.extend(arr.iter().flatten().map(str::to_string));
    } else {
        return Err(StoreError::Schema {
            path: path.to_path_buf(),
            column: TEXT_COLUMN.to_string(),
        });
    }
    Ok(col.len() - (out.len() - before))
}

type Slot = Arc<Mutex<Option<Arc<Dataset>>>>;

/// Loaded datasets keyed by path.
///
/// Every path gets its own slot. The map lock is only held to find or insert
/// a slot; the read happens under the slot lock, so each path is read at most
/// once even with concurrent callers while other paths stay available.
/// Failed loads leave the slot empty. Entries are never evicted.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: Mutex<HashMap<PathBuf, Slot>>,
    loads: AtomicUsize,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset for `path`, reading it on first use.
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<Dataset>, StoreError> {
        let slot = self.slot(path);
        // A slot only ever goes from empty to loaded, so a poisoned lock still
        // guards a consistent value.
        let mut loaded = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(dataset) = loaded.as_ref() {
            debug!(path = %path.display(), "dataset cache hit");
            return Ok(Arc::clone(dataset));
        }

        self.loads.fetch_add(1, Ordering::Relaxed);
        let dataset = Arc::new(Dataset::read(path)?);
        *loaded = Some(Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Number of times a dataset file was actually read.
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    /// Whether `path` is loaded. A path still being read is not.
    pub fn contains(&self, path: &Path) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .is_some_and(is_loaded)
    }

    /// Number of loaded datasets.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|slot| is_loaded(slot))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, path: &Path) -> Slot {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(entries.entry(path.to_path_buf()).or_default())
    }
}

fn is_loaded(slot: &Slot) -> bool {
    match slot.try_lock() {
        Ok(loaded) => loaded.is_some(),
        Err(TryLockError::Poisoned(e)) => e.into_inner().is_some(),
        Err(TryLockError::WouldBlock) => false,
    }
}

/// Draws random text rows from cached datasets.
#[derive(Debug, Clone)]
pub struct DatasetSampler {
    cache: Arc<DatasetCache>,
}

impl DatasetSampler {
    pub fn new(cache: Arc<DatasetCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &DatasetCache {
        &self.cache
    }

    /// Load a dataset, memoized per path.
    pub fn load(&self, path: &Path) -> Result<Arc<Dataset>, StoreError> {
        self.cache.get_or_load(path)
    }

    /// Draw `n` distinct rows uniformly at random, without replacement.
    ///
    /// Clamped to the dataset size: asking for more rows than exist returns
    /// every row once.
    pub fn sample(&self, dataset: &Dataset, n: usize) -> Sample {
        self.sample_with(dataset, n, &mut rand::rng())
    }

    /// [`sample`](Self::sample) with a caller-supplied RNG.
    pub fn sample_with<R: Rng + ?Sized>(&self, dataset: &Dataset, n: usize, rng: &mut R) -> Sample {
        let amount = n.min(dataset.len());
        if amount < n {
            debug!(
                requested = n,
                available = dataset.len(),
                "sample size clamped to dataset size"
            );
        }

        let texts: Vec<String> = rand::seq::index::sample(rng, dataset.len(), amount)
            .into_iter()
            .map(|i| dataset.texts[i].clone())
            .collect();
        Sample {
            texts: texts.into_iter(),
        }
    }
}

/// A drawn sample. Yields each text once; cannot be restarted.
#[derive(Debug)]
pub struct Sample {
    texts: std::vec::IntoIter<String>,
}

impl Iterator for Sample {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.texts.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.texts.size_hint()
    }
}

impl ExactSizeIterator for Sample {}
