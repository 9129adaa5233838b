//! Question source built from the municipal waste-sorting dictionary CSV.
//!
//! The dictionary lists one item per row with its detailed category and a
//! disposal hint. Rows are turned into [`QuizItem`]s with a coarse category
//! derived by [`coarse_category`].

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use serde::Deserialize;

use crate::error::FetchError;
use crate::item::{coarse_category, QuizItem};
use crate::source::QuestionSource;

static DATA_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/dictionary/data");

const BUNDLED_FILE: &str = "hiraizumi_garbage_dic.csv";
const REQUIRED_HEADERS: [&str; 4] = ["_id", "品名", "ゴミの種類", "出し方の注意点"];

pub const CACHE_TTL: Duration = Duration::from_secs(60 * 10);

#[derive(Debug, Deserialize)]
struct Row {
    #[serde(rename = "品名", default)]
    name: String,
    #[serde(rename = "ゴミの種類", default)]
    category: String,
    #[serde(rename = "出し方の注意点", default)]
    note: String,
}

/// Parse dictionary text into quiz items, dropping incomplete and repeated rows.
pub fn parse_dictionary(text: &str) -> Result<Vec<QuizItem>, FetchError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let missing: Vec<&str> = REQUIRED_HEADERS
        .iter()
        .copied()
        .filter(|h| !headers.iter().any(|have| have == *h))
        .collect();
    if !missing.is_empty() {
        return Err(FetchError::Dictionary(format!(
            "missing headers: {}",
            missing.join(", ")
        )));
    }

    let mut seen = HashSet::new();
    let mut items = Vec::new();
    for row in reader.deserialize::<Row>() {
        let row = row?;
        let name = row.name.trim();
        let full = row.category.trim();
        if name.is_empty() || full.is_empty() {
            continue;
        }
        if !seen.insert((name.to_string(), full.to_string())) {
            continue;
        }

        let note = row.note.trim();
        items.push(QuizItem {
            item: name.to_string(),
            category: coarse_category(full).to_string(),
            full_category: Some(full.to_string()),
            note: (!note.is_empty()).then(|| note.to_string()),
        });
    }

    Ok(items)
}

fn read_dictionary_file(path: &Path) -> Result<String, FetchError> {
    let bytes = std::fs::read(path)?;
    String::from_utf8(bytes)
        .map_err(|_| FetchError::Dictionary(format!("{} is not valid UTF-8", path.display())))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictionaryOrigin {
    Bundled,
    File(PathBuf),
}

/// Shuffled, limited questions drawn from a dictionary, re-read at most
/// once per [`CACHE_TTL`].
#[derive(Debug)]
pub struct DictionarySource {
    origin: DictionaryOrigin,
    ttl: Duration,
    cache: Mutex<Option<(Instant, Vec<QuizItem>)>>,
}

impl DictionarySource {
    pub fn bundled() -> Self {
        Self::with_origin(DictionaryOrigin::Bundled)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        Self::with_origin(DictionaryOrigin::File(path.as_ref().to_path_buf()))
    }

    fn with_origin(origin: DictionaryOrigin) -> Self {
        Self {
            origin,
            ttl: CACHE_TTL,
            cache: Mutex::new(None),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn origin(&self) -> &DictionaryOrigin {
        &self.origin
    }

    fn load(&self) -> Result<Vec<QuizItem>, FetchError> {
        match &self.origin {
            DictionaryOrigin::Bundled => {
                let text = DATA_DIR
                    .get_file(BUNDLED_FILE)
                    .and_then(|f| f.contents_utf8())
                    .ok_or_else(|| FetchError::Dictionary("bundled dictionary missing".into()))?;
                parse_dictionary(text)
            }
            DictionaryOrigin::File(path) => parse_dictionary(&read_dictionary_file(path)?),
        }
    }

    /// Full dataset, served from the cache while it is fresh.
    pub fn dataset(&self) -> Result<Vec<QuizItem>, FetchError> {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some((loaded_at, items)) = cache.as_ref() {
            if loaded_at.elapsed() < self.ttl {
                return Ok(items.clone());
            }
        }

        let items = self.load()?;
        tracing::info!(origin = ?self.origin, count = items.len(), "dictionary loaded");
        *cache = Some((Instant::now(), items.clone()));
        Ok(items)
    }
}

impl QuestionSource for DictionarySource {
    fn fetch(&self, limit: usize) -> Result<Vec<QuizItem>, FetchError> {
        let mut items = self.dataset()?;
        items.shuffle(&mut rand::thread_rng());
        if limit > 0 {
            items.truncate(limit);
        }
        Ok(items)
    }
}
