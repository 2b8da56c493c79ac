// crates/wordlink-store/src/record.rs
//
// RecordStore: per-word vector lookup over a `VectorRecordSource`.
//
// The alternate storage layout ships one small binary record per baseform
// instead of sorted shards. Lookups are cached per word with the same
// single-flight cell discipline as the chunk store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;

use wordlink_core::codec::decode_vector_record;
use wordlink_core::error::WordlinkError;
use wordlink_core::traits::VectorRecordSource;
use wordlink_core::vector::WordVector;

type RecordCell = Arc<OnceCell<Option<WordVector>>>;

/// Cached per-word vector store.
pub struct RecordStore {
    source: Arc<dyn VectorRecordSource>,
    dims: usize,
    cells: Mutex<HashMap<String, RecordCell>>,
}

impl RecordStore {
    pub fn new(source: Arc<dyn VectorRecordSource>, dims: usize) -> Self {
        Self {
            source,
            dims,
            cells: Mutex::new(HashMap::new()),
        }
    }

    /// Number of words resolved to a vector.
    pub fn cached_count(&self) -> usize {
        let cells = self.cells.lock().unwrap_or_else(|e| e.into_inner());
        cells
            .values()
            .filter(|cell| matches!(cell.get(), Some(Some(_))))
            .count()
    }

    /// Resolve `baseform` to its vector.
    ///
    /// A missing record is `NotFound` and is remembered; a malformed record
    /// is `MalformedData` and is not.
    pub async fn vector_for(&self, baseform: &str) -> Result<WordVector, WordlinkError> {
        let cell = {
            let mut cells = self.cells.lock().unwrap_or_else(|e| e.into_inner());
            cells.entry(baseform.to_string()).or_default().clone()
        };

        let vector = cell
            .get_or_try_init(|| async {
                match self.source.fetch_record(baseform).await? {
                    Some(bytes) => {
                        let values = decode_vector_record(&bytes, self.dims)?;
                        Ok::<_, WordlinkError>(Some(WordVector::new(values)))
                    }
                    None => Ok(None),
                }
            })
            .await?;

        vector
            .clone()
            .ok_or_else(|| WordlinkError::NotFound(format!("no vector record for \"{}\"", baseform)))
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("dims", &self.dims)
            .field("cached", &self.cached_count())
            .finish()
    }
}
