use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::{
    hash::Hash,
    io::ErrorKind,
    sync::{Arc, RwLock},
    time::Instant,
};

use crate::parse_tags;

#[derive(Debug, Clone, Eq, Default, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,

    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,

    /// Link liveness as reported by the checker, e.g. "active" or "broken".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Hash for Bookmark {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

impl PartialEq for Bookmark {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Bookmark {
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
}

/// A highlighted occurrence inside one field. Offsets are byte offsets
/// into the original (not lower-cased) field text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMatches {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub title: Vec<MatchSpan>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub url: Vec<MatchSpan>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub description: Vec<MatchSpan>,
}

impl FieldMatches {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.url.is_empty() && self.description.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Local,
    Ai,
}

/// A bookmark annotated by one of the search engines. The annotations are
/// transient: they never reach the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredBookmark {
    #[serde(flatten)]
    pub bookmark: Bookmark,

    #[serde(rename = "_score")]
    pub score: i64,

    #[serde(
        rename = "_matches",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub matches: Option<FieldMatches>,

    #[serde(
        rename = "_searchType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub search_type: Option<SearchType>,

    #[serde(rename = "_aiRank", default, skip_serializing_if = "Option::is_none")]
    pub ai_rank: Option<usize>,
}

impl ScoredBookmark {
    pub fn new(bookmark: Bookmark, score: i64) -> Self {
        Self {
            bookmark,
            score,
            matches: None,
            search_type: None,
            ai_rank: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.bookmark.id
    }
}

/// Read side of the bookmark database. Search only ever sees snapshots
/// taken through this trait.
pub trait RecordStore: Send + Sync {
    fn all(&self) -> Vec<Bookmark>;
    fn get(&self, id: &str) -> Option<Bookmark>;
}

#[derive(Debug, Clone, Default)]
pub struct BackendCsv {
    list: Arc<RwLock<Vec<Bookmark>>>,
    path: String,
}

const CSV_HEADERS: [&str; 6] = ["id", "url", "title", "description", "tags", "status"];

impl BackendCsv {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        if let Err(err) = std::fs::metadata(path) {
            match err.kind() {
                ErrorKind::NotFound => {
                    log::info!("Creating new database at {path}");
                    let mut csv_wrt = csv::Writer::from_path(path)?;
                    csv_wrt.write_record(CSV_HEADERS)?;
                    csv_wrt.flush()?;
                }
                _ => Err(err)?,
            }
        }

        let now = Instant::now();
        let mut csv_reader = csv::Reader::from_path(path)?;

        let mut bmarks = vec![];
        for record in csv_reader.records() {
            let record = record?;
            let field = |idx: usize, name: &str| {
                record
                    .get(idx)
                    .map(|s| s.to_string())
                    .ok_or(anyhow!("couldnt get record {name}"))
            };

            let id = field(0, "id")?;
            let url = field(1, "url")?;
            let title = field(2, "title")?;
            let description = field(3, "description")?;
            let tags = parse_tags(field(4, "tags")?);
            let status = field(5, "status")?;

            bmarks.push(Bookmark {
                id,
                title,
                url,
                description: if description.is_empty() {
                    None
                } else {
                    Some(description)
                },
                tags,
                status: if status.is_empty() { None } else { Some(status) },
            });
        }

        log::debug!(
            "took {}ms to read csv",
            now.elapsed().as_micros() as f64 / 1000.0
        );

        Ok(BackendCsv {
            list: Arc::new(RwLock::new(bmarks)),
            path: path.to_string(),
        })
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let bmarks = self
            .list
            .read()
            .map_err(|_| anyhow!("bookmark list lock poisoned"))?;

        let temp_path = format!("{}-tmp", &self.path);
        let mut csv_wrt = csv::Writer::from_path(&temp_path)?;
        csv_wrt.write_record(CSV_HEADERS)?;
        for bmark in bmarks.iter() {
            csv_wrt.write_record([
                bmark.id.as_str(),
                bmark.url.as_str(),
                bmark.title.as_str(),
                bmark.description(),
                bmark.tags.join(",").as_str(),
                bmark.status.as_deref().unwrap_or_default(),
            ])?;
        }
        csv_wrt.flush()?;
        std::fs::rename(&temp_path, &self.path)?;

        Ok(())
    }

    /// Inserts a bookmark or replaces the one with the same id, then saves.
    pub fn upsert(&self, bookmark: Bookmark) -> anyhow::Result<Bookmark> {
        {
            let mut bmarks = self
                .list
                .write()
                .map_err(|_| anyhow!("bookmark list lock poisoned"))?;

            match bmarks.iter().position(|b| b.id == bookmark.id) {
                Some(idx) => bmarks[idx] = bookmark.clone(),
                None => bmarks.push(bookmark.clone()),
            }
        }

        self.save()?;

        Ok(bookmark)
    }
}

impl RecordStore for BackendCsv {
    fn all(&self) -> Vec<Bookmark> {
        self.list
            .read()
            .map(|list| list.clone())
            .unwrap_or_default()
    }

    fn get(&self, id: &str) -> Option<Bookmark> {
        self.list
            .read()
            .ok()
            .and_then(|list| list.iter().find(|b| b.id == id).cloned())
    }
}
