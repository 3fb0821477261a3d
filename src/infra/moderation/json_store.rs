// JSON-file banned vocabulary store. Persists the whole vocabulary in a
// single JSON file as a map keyed on the normalized form:
// { "normalized": { "word": ..., "word_type": ..., "note": ... } }
//
// The file is rewritten on every mutation; reads are served from the cache.
// Suited to small curated word lists that get edited rarely.

#![allow(dead_code)]

use crate::core::moderation::{BannedWord, BannedWordStore, ModerationError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use tokio::sync::RwLock;

#[derive(Debug, Serialize, Deserialize, Default)]
struct JsonStoreData {
    pub words: HashMap<String, BannedWord>,
}

pub struct JsonBannedWordStore {
    path: PathBuf,
    cache: RwLock<JsonStoreData>,
}

impl JsonBannedWordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cache: JsonStoreData = if path.exists() {
            let file = File::open(&path).expect("Failed to open banned word JSON file");
            let reader = BufReader::new(file);
            serde_json::from_reader(reader).unwrap_or_default()
        } else {
            JsonStoreData::default()
        };

        Self {
            path,
            cache: RwLock::new(cache),
        }
    }

    async fn persist(&self) -> Result<(), ModerationError> {
        let cache = self.cache.read().await;
        let file = File::create(&self.path)
            .map_err(|e| ModerationError::StorageUnavailable(e.to_string()))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &*cache)
            .map_err(|e| ModerationError::StorageUnavailable(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl BannedWordStore for JsonBannedWordStore {
    async fn list_words(&self) -> Result<Vec<BannedWord>, ModerationError> {
        let cache = self.cache.read().await;
        let mut words: Vec<BannedWord> = cache.words.values().cloned().collect();
        words.sort_by(|a, b| a.word.cmp(&b.word));
        Ok(words)
    }

    async fn insert_word(&self, word: BannedWord) -> Result<(), ModerationError> {
        let key = word.normalized();
        {
            let mut cache = self.cache.write().await;
            if cache.words.contains_key(&key) {
                return Err(ModerationError::DuplicateWord(word.word));
            }
            cache.words.insert(key, word);
        }
        self.persist().await
    }

    async fn remove_word(&self, word: &str) -> Result<bool, ModerationError> {
        let removed = {
            let mut cache = self.cache.write().await;
            cache.words.remove(&word.to_lowercase()).is_some()
        };
        if removed {
            self.persist().await?;
        }
        Ok(removed)
    }
}
