use std::cell::RefCell;
use wasm_bindgen::prelude::*;

pub mod config;
pub mod console;
pub mod dispatch;
pub mod error;
pub mod index;
pub mod parse;
pub mod rank;
pub mod render;
pub mod synonyms;
pub mod types;
#[cfg(target_arch = "wasm32")]
pub mod widget;

use crate::config::SearchConfig;
use crate::dispatch::SearchSession;
use crate::error::SearchError;

// Use thread_local with RefCell for lazy initialization from JS
thread_local! {
    static SESSION: RefCell<Option<SearchSession>> = const { RefCell::new(None) };
}

fn to_js(err: SearchError) -> JsError {
    JsError::new(&err.to_string())
}

fn with_session<T>(f: impl FnOnce(&SearchSession) -> T) -> Result<T, SearchError> {
    SESSION.with(|session| match session.borrow().as_ref() {
        Some(s) => Ok(f(s)),
        None => Err(SearchError::NotReady),
    })
}

/// Build a session from raw index JSON and config JSON ("" for defaults)
pub fn build_session(index_json: &str, config_json: &str) -> Result<SearchSession, SearchError> {
    let config = SearchConfig::from_json(config_json)?;
    let corpus = index::parse_index(index_json)?;
    Ok(SearchSession::new(corpus, config))
}

/// Initialize the search session with the index and config from JavaScript
/// index_json: JSON array of {title, content, url}
/// config_json: JSON SearchConfig, or "" for defaults
#[wasm_bindgen]
pub fn init_session(index_json: &str, config_json: &str) -> Result<(), JsError> {
    let built = build_session(index_json, config_json).map_err(to_js)?;
    SESSION.with(|session| {
        *session.borrow_mut() = Some(built);
    });
    Ok(())
}

/// Check if the session has been initialized
#[wasm_bindgen]
pub fn is_session_ready() -> bool {
    SESSION.with(|session| session.borrow().is_some())
}

/// Resolve a query and return the Resolution as JSON ("null" for blank queries)
#[wasm_bindgen]
pub fn search_records(query: &str) -> Result<String, JsError> {
    let resolution = with_session(|s| s.resolve(query)).map_err(to_js)?;
    Ok(serde_json::to_string(&resolution).unwrap_or_else(|_| "null".to_string()))
}

/// Resolve a query and return the results container HTML
#[wasm_bindgen]
pub fn render_search(query: &str) -> Result<String, JsError> {
    with_session(|s| s.render(query)).map_err(to_js)
}

/// Get total number of indexed records
#[wasm_bindgen]
pub fn get_record_count() -> Result<usize, JsError> {
    with_session(|s| s.record_count()).map_err(to_js)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{InputOutcome, SearchController};
    use crate::types::{Resolution, ResolvedBy};

    const TEST_INDEX: &str = r#"[
        {"title": "リオレウス", "content": "種別: 飛竜種 空の王者と呼ばれる火竜。", "url": "/a"},
        {"title": "ティガレックス", "content": "種別: 飛竜種 轟竜。", "url": "/t"},
        {"title": "Great Jaggi", "content": "Leader of the Jaggi pack.", "url": "/jaggi"}
    ]"#;

    fn setup_test_session() {
        init_session(TEST_INDEX, "").expect("Failed to initialize test session");
    }

    #[test]
    fn test_search_records_synonym() {
        setup_test_session();
        let json = search_records("リオレウス").unwrap();
        let resolution: Resolution = serde_json::from_str(&json).unwrap();
        assert_eq!(resolution.resolved_by, ResolvedBy::Synonym);
        assert_eq!(resolution.results.len(), 1);
        assert_eq!(resolution.results[0].title, "リオレウス");
        assert_eq!(resolution.results[0].content, "種別: 飛竜種");
    }

    #[test]
    fn test_search_records_fuzzy() {
        setup_test_session();
        let json = search_records("great jaggi").unwrap();
        let resolution: Resolution = serde_json::from_str(&json).unwrap();
        assert_eq!(resolution.resolved_by, ResolvedBy::Fuzzy);
        assert_eq!(resolution.results[0].url, "/jaggi");
        assert!(resolution.results[0].score.unwrap() > 0.0);
    }

    #[test]
    fn test_search_records_blank() {
        setup_test_session();
        assert_eq!(search_records("  ").unwrap(), "null");
    }

    #[test]
    fn test_record_count() {
        setup_test_session();
        assert_eq!(get_record_count().unwrap(), 3);
        assert!(is_session_ready());
    }

    #[test]
    fn test_build_session_rejects_bad_index() {
        let err = build_session("{", "").unwrap_err();
        assert!(matches!(err, SearchError::Load(_)));
    }

    #[test]
    fn test_build_session_rejects_bad_config() {
        let err = build_session(TEST_INDEX, r#"{"snippet_chars": 0}"#).unwrap_err();
        assert!(matches!(err, SearchError::Config(_)));
    }

    // End-to-end: synonym key typed into the box renders the synonym hit only
    #[test]
    fn test_scenario_synonym_render() {
        let index = r#"[{"title": "リオレウス", "content": "種別: 飛竜種 ...", "url": "/a"}]"#;
        let mut controller = SearchController::new(SearchConfig::default());
        controller.load(index).unwrap();
        let outcome = controller.input("リオレウス");
        let Some(InputOutcome::Scheduled { ticket, .. }) = outcome else {
            panic!("expected a scheduled resolution");
        };
        let html = controller.fire(ticket).unwrap().html;
        assert_eq!(html.matches(r#"class="result""#).count(), 1);
        assert!(html.contains(r##"<a href="#"><mark>リオレウス</mark></a>"##));
        assert!(html.contains(r#"<span class="badge">飛竜種</span>"#));
        assert!(html.contains("<p>種別: 飛竜種</p>"));
        assert!(!html.contains(r#"href="/a""#));
    }

    // End-to-end: empty query leaves the container empty
    #[test]
    fn test_scenario_empty_query() {
        setup_test_session();
        assert_eq!(render_search("").unwrap(), "");

        let mut controller = SearchController::new(SearchConfig::default());
        controller.load(TEST_INDEX).unwrap();
        assert_eq!(controller.input(""), Some(InputOutcome::Cleared));
        assert!(!controller.has_pending());
    }

    // End-to-end: failed load shows the message and ignores later input
    #[test]
    fn test_scenario_load_failure() {
        let mut controller = SearchController::new(SearchConfig::default());
        let err = controller.load("<html>502 Bad Gateway</html>").unwrap_err();
        assert_eq!(err.user_message(), "検索データの読み込みに失敗しました。");
        assert!(controller.is_failed());
        assert_eq!(controller.input("リオレウス"), None);
        assert_eq!(controller.input(""), None);
    }

    #[test]
    fn test_render_content_substring() {
        setup_test_session();
        let html = render_search("王者").unwrap();
        assert_eq!(html.matches(r#"class="result""#).count(), 1);
        assert!(html.contains(r#"<a href="/a">"#));
        assert!(html.contains("空の<mark>王者</mark>と呼ばれる"));
    }

    #[test]
    fn test_render_no_results_placeholder() {
        setup_test_session();
        assert_eq!(
            render_search("zzzzqqq").unwrap(),
            "<p>該当する結果がありません。</p>"
        );
    }
}
