use crate::error::{Result, SearchError};
use serde::{Deserialize, Serialize};

const DEFAULT_TITLE_WEIGHT: f32 = 0.7;
const DEFAULT_CONTENT_WEIGHT: f32 = 0.3;
const DEFAULT_THRESHOLD: f32 = 0.4;
const DEFAULT_DEBOUNCE_MS: u32 = 200;
const DEFAULT_SNIPPET_CHARS: usize = 150;

/// Field weights for the fuzzy resolver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldWeights {
    pub title: f32,
    pub content: f32,
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE_WEIGHT,
            content: DEFAULT_CONTENT_WEIGHT,
        }
    }
}

/// Static texts written into the results container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub no_results: String,
    pub load_error: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            no_results: "該当する結果がありません。".to_string(),
            load_error: "検索データの読み込みに失敗しました。".to_string(),
        }
    }
}

/// Search and rendering options passed from JavaScript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub weights: FieldWeights,
    /// Looseness tolerated by the fuzzy matcher, 0.0 (exact) to 1.0 (anything)
    pub threshold: f32,
    /// Attach matched character positions to fuzzy results
    pub include_matches: bool,
    /// Maximum number of fuzzy results (None = all)
    pub limit: Option<usize>,
    pub debounce_ms: u32,
    /// Snippet budget in characters
    pub snippet_chars: usize,
    pub highlight: bool,
    pub badges: bool,
    pub messages: Messages,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            weights: FieldWeights::default(),
            threshold: DEFAULT_THRESHOLD,
            include_matches: true,
            limit: None,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            snippet_chars: DEFAULT_SNIPPET_CHARS,
            highlight: true,
            badges: true,
            messages: Messages::default(),
        }
    }
}

impl SearchConfig {
    /// Parse a config JSON string; blank input yields the defaults
    pub fn from_json(config_json: &str) -> Result<Self> {
        if config_json.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: SearchConfig = serde_json::from_str(config_json)
            .map_err(|e| SearchError::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(SearchError::Config(format!(
                "threshold must be within 0..=1, got {}",
                self.threshold
            )));
        }
        let FieldWeights { title, content } = self.weights;
        if title < 0.0 || content < 0.0 || title + content <= 0.0 {
            return Err(SearchError::Config(
                "field weights must be non-negative and not all zero".to_string(),
            ));
        }
        if self.snippet_chars == 0 {
            return Err(SearchError::Config(
                "snippet_chars must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Page wiring for the DOM widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    pub input_id: String,
    pub results_id: String,
    pub clear_button_id: Option<String>,
    /// Same-origin location of the JSON index (None = host supplies it)
    pub index_url: Option<String>,
    pub search: SearchConfig,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            input_id: "q".to_string(),
            results_id: "searchResults".to_string(),
            clear_button_id: None,
            index_url: Some("./search_index.json".to_string()),
            search: SearchConfig::default(),
        }
    }
}

impl WidgetConfig {
    pub fn from_json(config_json: &str) -> Result<Self> {
        if config_json.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: WidgetConfig = serde_json::from_str(config_json)
            .map_err(|e| SearchError::Config(format!("failed to parse widget config: {}", e)))?;
        config.search.validate()?;
        Ok(config)
    }
}
