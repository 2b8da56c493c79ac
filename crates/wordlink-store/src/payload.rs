// crates/wordlink-store/src/payload.rs
//
// Shard payload decoding.
//
// Wire format: a JSON object mapping word -> base64 string of little-endian
// half-precision floats (`dims * 2` bytes), optionally gzipped. Decoded into a `DecodedShard`
// whose entries are sorted by word so the chunk store can compare a probe
// word against the shard's range and binary-search inside it.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::io::Read;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::GzDecoder;

use wordlink_core::codec::decode_f16_le;
use wordlink_core::error::WordlinkError;
use wordlink_core::vector::WordVector;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Inflate a gzipped payload; anything else passes through.
fn inflate(index: usize, bytes: &[u8]) -> Result<Cow<'_, [u8]>, WordlinkError> {
    if !bytes.starts_with(&GZIP_MAGIC) {
        return Ok(Cow::Borrowed(bytes));
    }
    let mut inflated = Vec::with_capacity(bytes.len() * 4);
    GzDecoder::new(bytes)
        .read_to_end(&mut inflated)
        .map_err(|e| WordlinkError::MalformedData(format!("shard {}: bad gzip stream: {}", index, e)))?;
    Ok(Cow::Owned(inflated))
}

/// A decoded, validated shard of the vocabulary.
#[derive(Debug, Clone)]
pub struct DecodedShard {
    /// Shard index in the shard sequence.
    pub index: usize,
    /// `(word, vector)` pairs in ascending word order. Never empty.
    entries: Vec<(String, WordVector)>,
}

impl DecodedShard {
    /// Decode a raw shard payload.
    ///
    /// Gzipped payloads are inflated first.
    /// Returns `Ok(None)` for a zero-length payload or one with no valid
    /// entries; both mean "absent" to the chunk store. Entries whose vector
    /// has the wrong byte length are dropped with a warning.
    pub fn decode(index: usize, bytes: &[u8], dims: usize) -> Result<Option<Self>, WordlinkError> {
        let bytes = inflate(index, bytes)?;
        let bytes = bytes.as_ref();
        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(None);
        }

        // BTreeMap gives ascending word order regardless of the order the
        // producer wrote the keys in.
        let raw: BTreeMap<String, String> = serde_json::from_slice(bytes)?;

        let mut entries = Vec::with_capacity(raw.len());
        for (word, encoded) in raw {
            let decoded = STANDARD
                .decode(encoded.as_bytes())
                .map_err(WordlinkError::from)
                .and_then(|packed| decode_f16_le(&packed, dims));
            match decoded {
                Ok(values) => entries.push((word, WordVector::new(values))),
                Err(e) => {
                    tracing::warn!("Shard {}: dropping entry \"{}\": {}", index, word, e);
                }
            }
        }

        if entries.is_empty() {
            return Ok(None);
        }

        Ok(Some(Self { index, entries }))
    }

    /// First (smallest) word in the shard.
    pub fn first_word(&self) -> &str {
        &self.entries[0].0
    }

    /// Last (largest) word in the shard.
    pub fn last_word(&self) -> &str {
        &self.entries[self.entries.len() - 1].0
    }

    /// Where `word` falls relative to this shard's range.
    ///
    /// `Less` if it sorts before the first word, `Greater` if after the last
    /// word, `Equal` if the shard's range covers it.
    pub fn compare_word(&self, word: &str) -> Ordering {
        if word < self.first_word() {
            Ordering::Less
        } else if word > self.last_word() {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }

    /// Look up a word inside the shard.
    pub fn get(&self, word: &str) -> Option<&WordVector> {
        self.entries
            .binary_search_by(|(w, _)| w.as_str().cmp(word))
            .ok()
            .map(|i| &self.entries[i].1)
    }

    /// Number of words in the shard.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: empty payloads decode to `None`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over words in ascending order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(w, _)| w.as_str())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use half::f16;
    use std::io::Write;

    /// Build a shard payload from `(word, values)` pairs.
    pub(crate) fn shard_json(entries: &[(&str, Vec<f32>)]) -> Vec<u8> {
        let map: BTreeMap<String, String> = entries
            .iter()
            .map(|(word, values)| {
                let packed: Vec<u8> = values
                    .iter()
                    .flat_map(|v| f16::from_f32(*v).to_le_bytes())
                    .collect();
                (word.to_string(), STANDARD.encode(packed))
            })
            .collect();
        serde_json::to_vec(&map).unwrap()
    }

    #[test]
    fn test_decode_sorts_and_bounds() {
        let bytes = shard_json(&[
            ("cherry", vec![1.0, 0.0]),
            ("apple", vec![0.0, 1.0]),
            ("banana", vec![0.5, 0.5]),
        ]);
        let shard = DecodedShard::decode(3, &bytes, 2).unwrap().unwrap();
        assert_eq!(shard.index, 3);
        assert_eq!(shard.first_word(), "apple");
        assert_eq!(shard.last_word(), "cherry");
        assert_eq!(shard.words().collect::<Vec<_>>(), vec!["apple", "banana", "cherry"]);
        assert_eq!(shard.get("banana").unwrap().as_slice(), &[0.5, 0.5]);
        assert!(shard.get("blueberry").is_none());
    }

    /// Gzip a payload the way the shard producer does.
    pub(crate) fn gzip(bytes: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(bytes).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_decode_gzipped_shard() {
        let bytes = gzip(&shard_json(&[("cat", vec![1.0, 0.0]), ("dog", vec![0.0, 1.0])]));
        assert_eq!(&bytes[..2], &GZIP_MAGIC);
        let shard = DecodedShard::decode(0, &bytes, 2).unwrap().unwrap();
        assert_eq!(shard.first_word(), "cat");
        assert_eq!(shard.get("dog").unwrap().as_slice(), &[0.0, 1.0]);
    }

    #[test]
    fn test_truncated_gzip_is_malformed() {
        let bytes = gzip(&shard_json(&[("cat", vec![1.0, 0.0])]));
        let err = DecodedShard::decode(0, &bytes[..bytes.len() / 2], 2).unwrap_err();
        assert!(matches!(err, WordlinkError::MalformedData(_)));
    }

    #[test]
    fn test_compare_word() {
        let bytes = shard_json(&[("bee", vec![1.0]), ("dog", vec![1.0])]);
        let shard = DecodedShard::decode(0, &bytes, 1).unwrap().unwrap();
        assert_eq!(shard.compare_word("ant"), Ordering::Less);
        assert_eq!(shard.compare_word("bee"), Ordering::Equal);
        assert_eq!(shard.compare_word("cat"), Ordering::Equal);
        assert_eq!(shard.compare_word("dog"), Ordering::Equal);
        assert_eq!(shard.compare_word("eel"), Ordering::Greater);
    }

    #[test]
    fn test_empty_payloads_are_absent() {
        assert!(DecodedShard::decode(0, b"", 2).unwrap().is_none());
        assert!(DecodedShard::decode(0, b"{}", 2).unwrap().is_none());
    }

    #[test]
    fn test_wrong_size_entries_dropped() {
        let mut map = BTreeMap::new();
        map.insert("good".to_string(), STANDARD.encode([0x00, 0x3c, 0x00, 0x3c]));
        map.insert("short".to_string(), STANDARD.encode([0x00, 0x3c]));
        map.insert("junk".to_string(), "!!!not base64".to_string());
        let bytes = serde_json::to_vec(&map).unwrap();

        let shard = DecodedShard::decode(0, &bytes, 2).unwrap().unwrap();
        assert_eq!(shard.len(), 1);
        assert_eq!(shard.get("good").unwrap().as_slice(), &[1.0, 1.0]);
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let err = DecodedShard::decode(0, b"[1, 2", 2).unwrap_err();
        assert!(matches!(err, WordlinkError::MalformedData(_)));
    }
}
