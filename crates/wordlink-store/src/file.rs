// crates/wordlink-store/src/file.rs
//
// Filesystem-backed sources. Layout under the data directory:
//
//   common_words.txt              newline-delimited word list
//   word_baseform.json            { "surface": "baseform", ... }
//   chunks/embeddings_chunk_N.gz     shard N, gzipped JSON
//   chunks/embeddings_chunk_N.json   shard N, plain JSON
//   words/<baseform>.vec          per-word binary record

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use wordlink_core::error::WordlinkError;
use wordlink_core::traits::{LexiconSource, ShardSource, VectorRecordSource};

pub(crate) const WORD_LIST_FILE: &str = "common_words.txt";
pub(crate) const BASEFORM_FILE: &str = "word_baseform.json";

/// Relative paths tried for shard `index`, in order.
pub(crate) fn shard_paths(index: usize) -> [String; 2] {
    [
        format!("chunks/embeddings_chunk_{}.gz", index),
        format!("chunks/embeddings_chunk_{}.json", index),
    ]
}

/// Relative path of the record for `baseform`, or `None` if the name could
/// escape the words directory.
pub(crate) fn record_path(baseform: &str) -> Option<String> {
    if baseform.is_empty() || baseform.contains(['/', '\\']) || baseform.starts_with('.') {
        return None;
    }
    Some(format!("words/{}.vec", baseform))
}

/// Sources rooted at a local data directory.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// The data directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read a file, mapping "not found" to `Ok(None)`.
    async fn read_optional(&self, relative: &str) -> Result<Option<Vec<u8>>, WordlinkError> {
        let path = self.root.join(relative);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(WordlinkError::FetchFailed(format!(
                "reading {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn read_required(&self, relative: &str) -> Result<String, WordlinkError> {
        let path = self.root.join(relative);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| WordlinkError::FetchFailed(format!("reading {}: {}", path.display(), e)))
    }
}

#[async_trait]
impl ShardSource for FileSource {
    async fn fetch_shard(&self, index: usize) -> Result<Option<Vec<u8>>, WordlinkError> {
        for relative in shard_paths(index) {
            if let Some(bytes) = self.read_optional(&relative).await? {
                return Ok(Some(bytes));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl LexiconSource for FileSource {
    async fn fetch_word_list(&self) -> Result<String, WordlinkError> {
        self.read_required(WORD_LIST_FILE).await
    }

    async fn fetch_baseforms(&self) -> Result<String, WordlinkError> {
        self.read_required(BASEFORM_FILE).await
    }
}

#[async_trait]
impl VectorRecordSource for FileSource {
    async fn fetch_record(&self, baseform: &str) -> Result<Option<Vec<u8>>, WordlinkError> {
        match record_path(baseform) {
            Some(relative) => self.read_optional(&relative).await,
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkStore;
    use crate::payload::tests::{gzip, shard_json};
    use std::sync::Arc;

    #[tokio::test]
    async fn reads_layout_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("chunks")).unwrap();
        std::fs::create_dir_all(dir.path().join("words")).unwrap();
        std::fs::write(dir.path().join(WORD_LIST_FILE), "cat\ndog\n").unwrap();
        std::fs::write(dir.path().join(BASEFORM_FILE), r#"{"cat":"cat"}"#).unwrap();
        std::fs::write(dir.path().join("chunks/embeddings_chunk_0.json"), b"{}").unwrap();
        std::fs::write(dir.path().join("words/cat.vec"), [1u8, 2, 3]).unwrap();

        let source = FileSource::new(dir.path());
        assert_eq!(source.fetch_word_list().await.unwrap(), "cat\ndog\n");
        assert_eq!(source.fetch_baseforms().await.unwrap(), r#"{"cat":"cat"}"#);
        assert_eq!(source.fetch_shard(0).await.unwrap(), Some(b"{}".to_vec()));
        assert_eq!(source.fetch_shard(1).await.unwrap(), None);
        assert_eq!(source.fetch_record("cat").await.unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(source.fetch_record("dog").await.unwrap(), None);
    }

    #[tokio::test]
    async fn gzipped_shard_is_preferred() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("chunks")).unwrap();
        std::fs::write(dir.path().join("chunks/embeddings_chunk_2.gz"), [0x1f, 0x8b, 9]).unwrap();
        std::fs::write(dir.path().join("chunks/embeddings_chunk_2.json"), b"{}").unwrap();

        let source = FileSource::new(dir.path());
        assert_eq!(source.fetch_shard(2).await.unwrap(), Some(vec![0x1f, 0x8b, 9]));
    }

    #[tokio::test]
    async fn chunk_store_reads_gzipped_shard_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("chunks")).unwrap();
        let payload = gzip(&shard_json(&[("cat", vec![1.0, 0.0]), ("dog", vec![0.0, 1.0])]));
        std::fs::write(dir.path().join("chunks/embeddings_chunk_0.gz"), payload).unwrap();

        let store = ChunkStore::new(Arc::new(FileSource::new(dir.path())), 2, 1);
        assert_eq!(store.locate_and_decode("cat").await.unwrap().as_slice(), &[1.0, 0.0]);
        assert_eq!(store.locate_and_decode("dog").await.unwrap().as_slice(), &[0.0, 1.0]);
    }

    #[tokio::test]
    async fn missing_lexicon_is_fetch_failure() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSource::new(dir.path());
        let err = source.fetch_word_list().await.unwrap_err();
        assert!(matches!(err, WordlinkError::FetchFailed(_)));
    }

    #[test]
    fn record_path_rejects_traversal() {
        assert_eq!(record_path("cat").as_deref(), Some("words/cat.vec"));
        assert!(record_path("../etc/passwd").is_none());
        assert!(record_path("a/b").is_none());
        assert!(record_path("").is_none());
    }
}
