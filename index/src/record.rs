use serde::{Deserialize, Serialize};

/// One narrative from the corpus together with its precomputed embedding.
///
/// Deserialization is deliberately lenient: every field defaults, so a
/// partially-written element still parses, and an element that does not
/// parse at all degrades to `NarrativeRecord::default()` (no embedding).
/// Records without a usable embedding are excluded by the matcher rather
/// than rejected at load time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NarrativeRecord {
    #[serde(default)]
    pub text: String,
    /// Embedding vector; `None` when absent, null, or not an array of
    /// numbers in the source JSON.
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
    /// Source file the narrative came from. Provenance only; matching
    /// never consults it.
    #[serde(
        default,
        rename = "fileName",
        skip_serializing_if = "Option::is_none"
    )]
    pub file_name: Option<String>,
}

impl NarrativeRecord {
    /// A record is a match candidate iff it carries an embedding.
    pub fn has_embedding(&self) -> bool {
        self.embedding.is_some()
    }
}

/// The loaded corpus: an ordered, read-only sequence of records.
///
/// Built once (see [`SearchIndex::load`]) and held for the process
/// lifetime. Records are not exposed mutably, so the index can be shared
/// across threads by reference without locking.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    records: Vec<NarrativeRecord>,
}

impl SearchIndex {
    pub fn new(records: Vec<NarrativeRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[NarrativeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
