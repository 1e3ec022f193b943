use thiserror::Error;

/// The search index could not be retrieved or decoded
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("index request failed: {0}")]
    Fetch(String),

    #[error("index request returned HTTP {0}")]
    Status(u16),

    #[error("index is not a JSON array of records: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A highlight pattern could not be built for a query
#[derive(Error, Debug)]
pub enum MatchError {
    #[error("invalid highlight pattern: {0}")]
    Pattern(#[from] regex::Error),
}

#[derive(Error, Debug)]
pub enum SearchError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Match(#[from] MatchError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("search session is not ready")]
    NotReady,
}

impl SearchError {
    /// The index itself could not be loaded (as opposed to misuse)
    pub fn is_load(&self) -> bool {
        matches!(self, Self::Load(_))
    }

    /// Text safe to show in the page
    pub fn user_message(&self) -> String {
        match self {
            Self::Load(_) => "検索データの読み込みに失敗しました。".to_string(),
            Self::Match(_) => "検索語を解釈できませんでした。".to_string(),
            Self::Config(msg) => format!("設定エラー: {}", msg),
            Self::NotReady => "検索データを読み込み中です。".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
