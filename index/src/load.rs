use std::io;
use std::path::{Path, PathBuf};

use crate::record::{NarrativeRecord, SearchIndex};

/// Errors from reading the on-disk JSON index.
///
/// Distinguishable by the caller: a missing file and a corrupt file call
/// for different operator responses, so they never collapse into one kind.
#[derive(Debug, thiserror::Error)]
pub enum IndexLoadError {
    #[error("index file not found: {path}")]
    NotFound { path: PathBuf },
    #[error("failed to read index file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("index file {path} is not a JSON array")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl SearchIndex {
    /// Load the index from a JSON file whose root is an array of records.
    ///
    /// Individual malformed elements are tolerated: each one degrades to a
    /// default record with no embedding, which the matcher later filters
    /// out. Only a missing/unreadable file or a root that is not a JSON
    /// array fails the load.
    pub fn load(path: &Path) -> Result<SearchIndex, IndexLoadError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(IndexLoadError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => {
                return Err(IndexLoadError::Io {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };

        let elements: Vec<serde_json::Value> =
            serde_json::from_str(&raw).map_err(|e| IndexLoadError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?;

        let records = elements
            .into_iter()
            .map(|v| serde_json::from_value::<NarrativeRecord>(v).unwrap_or_default())
            .collect();
        Ok(SearchIndex::new(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_index(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = SearchIndex::load(&tmp.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, IndexLoadError::NotFound { .. }));
    }

    #[test]
    fn load_invalid_json_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = write_index(&tmp, "bad.json", "{not json");
        let err = SearchIndex::load(&path).unwrap_err();
        assert!(matches!(err, IndexLoadError::Parse { .. }));
    }

    #[test]
    fn load_non_array_root_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = write_index(&tmp, "obj.json", r#"{"text":"a","embedding":[1.0]}"#);
        let err = SearchIndex::load(&path).unwrap_err();
        assert!(matches!(err, IndexLoadError::Parse { .. }));
    }

    #[test]
    fn load_well_formed_index() {
        let tmp = TempDir::new().unwrap();
        let path = write_index(
            &tmp,
            "ok.json",
            r#"[
                {"text":"A","embedding":[1.0,0.0]},
                {"text":"B","embedding":[0.0,1.0],"fileName":"b.txt"}
            ]"#,
        );
        let index = SearchIndex::load(&path).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.records()[0].text, "A");
        assert_eq!(index.records()[1].file_name.as_deref(), Some("b.txt"));
    }

    #[test]
    fn load_tolerates_malformed_elements() {
        let tmp = TempDir::new().unwrap();
        // Element 1 has a non-array embedding, element 2 is not an object.
        let path = write_index(
            &tmp,
            "mixed.json",
            r#"[
                {"text":"ok","embedding":[0.5,0.5]},
                {"text":"bad","embedding":"oops"},
                42,
                {"text":"no-vec"}
            ]"#,
        );
        let index = SearchIndex::load(&path).unwrap();
        assert_eq!(index.len(), 4);
        let usable: Vec<_> = index
            .records()
            .iter()
            .filter(|r| r.has_embedding())
            .collect();
        assert_eq!(usable.len(), 1);
        assert_eq!(usable[0].text, "ok");
    }

    #[test]
    fn load_empty_array_is_ok() {
        let tmp = TempDir::new().unwrap();
        let path = write_index(&tmp, "empty.json", "[]");
        let index = SearchIndex::load(&path).unwrap();
        assert!(index.is_empty());
    }
}
