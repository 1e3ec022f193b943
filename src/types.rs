use serde::{Deserialize, Serialize};

/// One searchable page from the prebuilt index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexRecord {
    pub title: String,
    pub content: String,
    pub url: String,
}

/// Search corpus: records in index order (position is identity)
pub type SearchIndex = Vec<IndexRecord>;

/// Searchable field of an IndexRecord
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Title,
    Content,
}

/// Matched character positions inside one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSpan {
    pub key: Field,
    pub indices: Vec<u32>,
}

/// Result row handed to the renderer, whichever resolver produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub title: String,
    pub url: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<MatchSpan>,
}

impl ResultRecord {
    /// Passthrough of a matched index record
    pub fn from_record(record: &IndexRecord, score: f32, matches: Vec<MatchSpan>) -> Self {
        ResultRecord {
            title: record.title.clone(),
            url: record.url.clone(),
            content: record.content.clone(),
            score: Some(score),
            matches,
        }
    }
}

/// Which resolver answered a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedBy {
    Synonym,
    Fuzzy,
}

/// Outcome of resolving one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub query: String,
    pub resolved_by: ResolvedBy,
    pub results: Vec<ResultRecord>,
}
