use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::{distributions::Alphanumeric, thread_rng, Rng};
use serde::{Deserialize, Serialize};

use crate::search::SearchFilters;

const MAX_ENTRIES: usize = 8;
const ID_LEN: usize = 9;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentSearch {
    #[serde(flatten)]
    pub filters: SearchFilters,
    pub id: String,
    pub timestamp: i64,
}

/// Capped, de-duplicated list of past searches, mirrored to a JSON file
/// after every change.
pub struct HistoryStore {
    path: PathBuf,
    entries: Vec<RecentSearch>,
}

impl HistoryStore {
    /// Read the history file at `path`. Missing or corrupt data means an
    /// empty history, never an error.
    pub fn load(path: PathBuf) -> Self {
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    eprintln!("Failed to parse search history: {}. Starting fresh.", e);
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };

        HistoryStore { path, entries }
    }

    pub fn entries(&self) -> &[RecentSearch] {
        &self.entries
    }

    /// Record a successful search: newest first, older entries for the same
    /// product name (case-insensitive) dropped, capped at 8, persisted.
    pub fn record(&mut self, filters: SearchFilters) -> &[RecentSearch] {
        let key = filters.product_name.to_lowercase();
        self.entries
            .retain(|e| e.filters.product_name.to_lowercase() != key);

        self.entries.insert(
            0,
            RecentSearch {
                filters,
                id: random_id(),
                timestamp: now_millis(),
            },
        );
        self.entries.truncate(MAX_ENTRIES);
        self.persist();

        &self.entries
    }

    fn persist(&self) {
        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        match serde_json::to_string(&self.entries) {
            Ok(json) => {
                if let Err(e) = fs::write(&self.path, json) {
                    eprintln!("Failed to write search history: {}", e);
                }
            }
            Err(e) => eprintln!("Failed to serialize search history: {}", e),
        }
    }
}

fn random_id() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LEN)
        .map(char::from)
        .collect()
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
