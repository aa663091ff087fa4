use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use axum::Json;
use axum::extract::State;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use crate::error::QuizError;
use crate::model::WordEntry;

lazy_static! {
    static ref LIST_NAME_RE: Regex = Regex::new(r"^[^/\\]+\.csv$").unwrap();
}

// Column names match the upload format; absent columns deserialize to "".
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    word: String,
    #[serde(default, rename = "meaning(KOR)")]
    meaning: String,
}

/// In-memory word lists keyed by CSV filename. Lists load lazily on first
/// request and stay cached for the process lifetime: re-uploading a file under
/// an existing name has no effect until restart.
pub struct WordStore {
    dir: PathBuf,
    cache: RwLock<HashMap<String, Arc<Vec<WordEntry>>>>,
}

impl WordStore {
    pub fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(WordStore {
            dir,
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// Names of the `.csv` files in the problems directory, sorted.
    pub fn available_lists(&self) -> Result<Vec<String>, QuizError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let name = entry?.file_name().to_string_lossy().into_owned();
            if name.ends_with(".csv") {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn get_list(&self, name: &str) -> Result<Arc<Vec<WordEntry>>, QuizError> {
        validate_list_name(name)?;

        if let Some(list) = self.cache.read().unwrap().get(name) {
            return Ok(Arc::clone(list));
        }

        let list = Arc::new(self.load_csv(name)?);
        // Concurrent first loads of the same name race; the last insert wins.
        self.cache
            .write()
            .unwrap()
            .insert(name.to_string(), Arc::clone(&list));
        Ok(list)
    }

    fn load_csv(&self, name: &str) -> Result<Vec<WordEntry>, QuizError> {
        let path = self.dir.join(name);
        if !path.exists() {
            return Err(QuizError::ListNotFound(name.to_string()));
        }

        let raw = fs::read_to_string(&path)?;
        // Spreadsheet exports often carry a UTF-8 BOM in front of the header.
        let raw = raw.trim_start_matches('\u{feff}');

        let mut reader = csv::Reader::from_reader(raw.as_bytes());
        let mut words = Vec::new();
        for row in reader.deserialize::<CsvRow>() {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    log::debug!("Skipping malformed row in {}: {}", name, e);
                    continue;
                }
            };
            let word = row.word.trim();
            let meaning = row.meaning.trim();
            if word.is_empty() || meaning.is_empty() {
                continue;
            }
            words.push(WordEntry {
                word: word.to_string(),
                meaning: meaning.to_string(),
            });
        }

        log::info!("Loaded {} words from {}", words.len(), name);
        Ok(words)
    }

    /// Writes an uploaded CSV verbatim into the problems directory.
    /// Overwriting an existing name is allowed; the cached list, if any,
    /// keeps serving the old contents.
    pub fn save_upload(&self, name: &str, bytes: &[u8]) -> Result<(), QuizError> {
        validate_list_name(name)?;
        fs::write(self.dir.join(name), bytes)?;
        Ok(())
    }
}

pub fn validate_list_name(name: &str) -> Result<(), QuizError> {
    if LIST_NAME_RE.is_match(name) && !name.contains("..") {
        Ok(())
    } else {
        Err(QuizError::InvalidListName(name.to_string()))
    }
}

pub async fn list_files(
    State(store): State<Arc<WordStore>>,
) -> Result<Json<Vec<String>>, QuizError> {
    Ok(Json(store.available_lists()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(files: &[(&str, &str)]) -> (tempfile::TempDir, WordStore) {
        let dir = tempfile::tempdir().unwrap();
        for (name, contents) in files {
            fs::write(dir.path().join(name), contents).unwrap();
        }
        let store = WordStore::new(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn loads_and_trims_rows() {
        let (_dir, store) = store_with(&[(
            "words.csv",
            "\u{feff}word,meaning(KOR)\n apple , 사과 \nbanana,바나나\n",
        )]);

        let list = store.get_list("words.csv").unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].word, "apple");
        assert_eq!(list[0].meaning, "사과");
    }

    #[test]
    fn rows_missing_either_field_are_dropped() {
        let (_dir, store) = store_with(&[(
            "words.csv",
            "word,meaning(KOR)\n,orphan\npear,\nplum,자두\n",
        )]);

        let list = store.get_list("words.csv").unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].word, "plum");
    }

    #[test]
    fn missing_list_is_not_found() {
        let (_dir, store) = store_with(&[]);
        assert!(matches!(
            store.get_list("nope.csv"),
            Err(QuizError::ListNotFound(_))
        ));
    }

    #[test]
    fn cached_list_survives_a_rewrite() {
        let (dir, store) = store_with(&[("words.csv", "word,meaning(KOR)\nold,이전\n")]);

        let first = store.get_list("words.csv").unwrap();
        assert_eq!(first[0].word, "old");

        fs::write(
            dir.path().join("words.csv"),
            "word,meaning(KOR)\nnew,새로운\n",
        )
        .unwrap();

        let second = store.get_list("words.csv").unwrap();
        assert_eq!(second[0].word, "old");
    }

    #[test]
    fn path_traversal_names_are_rejected() {
        let (_dir, store) = store_with(&[]);
        for name in ["../outside.csv", "dir/inside.csv", "no-extension", "..csv"] {
            assert!(
                matches!(store.get_list(name), Err(QuizError::InvalidListName(_))),
                "accepted {:?}",
                name
            );
        }
    }

    #[test]
    fn available_lists_are_sorted_and_csv_only() {
        let (_dir, store) = store_with(&[
            ("b.csv", "word,meaning(KOR)\n"),
            ("a.csv", "word,meaning(KOR)\n"),
            ("notes.txt", "ignore me"),
        ]);

        assert_eq!(store.available_lists().unwrap(), vec!["a.csv", "b.csv"]);
    }

    #[test]
    fn uploaded_bytes_round_trip() {
        let (_dir, store) = store_with(&[]);
        store
            .save_upload("fresh.csv", "word,meaning(KOR)\ncat,고양이\n".as_bytes())
            .unwrap();

        let list = store.get_list("fresh.csv").unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].meaning, "고양이");
    }
}
