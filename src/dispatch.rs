use crate::config::SearchConfig;
use crate::console;
use crate::error::{LoadError, Result, SearchError};
use crate::index;
use crate::parse;
use crate::rank;
use crate::render;
use crate::synonyms::{self, SynonymEntry, SYNONYMS};
use crate::types::{Resolution, ResolvedBy, SearchIndex};

/// Identifies one scheduled resolution; only the newest ticket is live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// What the caller should do after an input event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// Query is blank: clear results now, nothing scheduled
    Cleared,
    /// Start a timer and call `fire(ticket)` when it elapses
    Scheduled { ticket: Ticket, delay_ms: u32 },
}

/// IME key code reported while a composition is in progress
const KEY_CODE_COMPOSING: u32 = 229;

/// True when a keydown should move focus to the first result. Enter that
/// confirms an IME conversion belongs to the input method, not the widget.
pub fn is_result_focus_key(key: &str, is_composing: bool, key_code: u32) -> bool {
    key == "Enter" && !is_composing && key_code != KEY_CODE_COMPOSING
}

/// HTML produced for one fired ticket, with the query it answers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub query: String,
    pub html: String,
}

/// Debounce state machine with a single pending slot
#[derive(Debug)]
pub struct QueryDispatcher {
    delay_ms: u32,
    generation: u64,
    pending: Option<(Ticket, String)>,
}

impl QueryDispatcher {
    pub fn new(delay_ms: u32) -> Self {
        QueryDispatcher {
            delay_ms,
            generation: 0,
            pending: None,
        }
    }

    /// Record a new input value, superseding whatever was pending
    pub fn on_input(&mut self, raw: &str) -> InputOutcome {
        self.pending = None;
        let query = parse::normalize_query(raw);
        if query.is_empty() {
            return InputOutcome::Cleared;
        }
        self.generation += 1;
        let ticket = Ticket(self.generation);
        self.pending = Some((ticket, query.to_string()));
        InputOutcome::Scheduled {
            ticket,
            delay_ms: self.delay_ms,
        }
    }

    /// Take the pending query if `ticket` is still the live one
    pub fn fire(&mut self, ticket: Ticket) -> Option<String> {
        if self.pending.as_ref().is_some_and(|(live, _)| *live == ticket) {
            self.pending.take().map(|(_, query)| query)
        } else {
            None
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Loaded corpus plus the synonym table; resolves one query at a time
#[derive(Debug)]
pub struct SearchSession {
    corpus: SearchIndex,
    synonyms: &'static [SynonymEntry],
    config: SearchConfig,
}

impl SearchSession {
    pub fn new(corpus: SearchIndex, config: SearchConfig) -> Self {
        Self::with_synonyms(corpus, config, SYNONYMS)
    }

    pub fn with_synonyms(
        corpus: SearchIndex,
        config: SearchConfig,
        synonyms: &'static [SynonymEntry],
    ) -> Self {
        SearchSession {
            corpus,
            synonyms,
            config,
        }
    }

    pub fn record_count(&self) -> usize {
        self.corpus.len()
    }

    /// Synonym hits win outright; otherwise rank the corpus. None for blank queries.
    pub fn resolve(&self, raw: &str) -> Option<Resolution> {
        let query = parse::normalize_query(raw);
        if query.is_empty() {
            return None;
        }

        let synonym_hits = synonyms::resolve(query, self.synonyms);
        if !synonym_hits.is_empty() {
            return Some(Resolution {
                query: query.to_string(),
                resolved_by: ResolvedBy::Synonym,
                results: synonym_hits,
            });
        }

        Some(Resolution {
            query: query.to_string(),
            resolved_by: ResolvedBy::Fuzzy,
            results: rank::fuzzy_search(&self.corpus, query, &self.config),
        })
    }

    /// Resolve and render; blank queries render an empty container
    pub fn render(&self, raw: &str) -> String {
        match self.resolve(raw) {
            Some(resolution) => render::render_results(
                &resolution.results,
                Some(&resolution.query),
                &self.config,
            ),
            None => String::new(),
        }
    }
}

#[derive(Debug)]
enum Phase {
    Loading,
    Ready(SearchSession),
    Failed,
}

/// Session lifecycle as seen by the page: load once, then dispatch input
#[derive(Debug)]
pub struct SearchController {
    phase: Phase,
    dispatcher: QueryDispatcher,
    config: SearchConfig,
}

impl SearchController {
    pub fn new(config: SearchConfig) -> Self {
        SearchController {
            dispatcher: QueryDispatcher::new(config.debounce_ms),
            phase: Phase::Loading,
            config,
        }
    }

    /// Install the corpus from index JSON; a bad index halts the controller
    pub fn load(&mut self, index_json: &str) -> Result<usize> {
        if !matches!(self.phase, Phase::Loading) {
            return Err(SearchError::Config("index already loaded".to_string()));
        }
        match index::parse_index(index_json) {
            Ok(corpus) => {
                let count = corpus.len();
                self.phase = Phase::Ready(SearchSession::new(corpus, self.config.clone()));
                Ok(count)
            }
            Err(e) => {
                self.fail(&e);
                Err(e.into())
            }
        }
    }

    /// Enter the terminal failed state; returns the text to show
    pub fn fail(&mut self, err: &LoadError) -> String {
        console::error(&format!("[index] {}", err));
        self.dispatcher.cancel();
        self.phase = Phase::Failed;
        self.config.messages.load_error.clone()
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.phase, Phase::Ready(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.phase, Phase::Failed)
    }

    pub fn session(&self) -> Option<&SearchSession> {
        match &self.phase {
            Phase::Ready(session) => Some(session),
            _ => None,
        }
    }

    /// Feed an input value; None means the event is ignored
    pub fn input(&mut self, raw: &str) -> Option<InputOutcome> {
        if !self.is_ready() {
            return None;
        }
        Some(self.dispatcher.on_input(raw))
    }

    /// Timer callback: rendered HTML for the live ticket, None if superseded
    pub fn fire(&mut self, ticket: Ticket) -> Option<Rendered> {
        let query = self.dispatcher.fire(ticket)?;
        let html = self.session()?.render(&query);
        Some(Rendered { query, html })
    }

    /// Clear button: drop any pending resolution. Returns false once loading
    /// has failed, when the page must keep showing the load error.
    pub fn clear(&mut self) -> bool {
        self.dispatcher.cancel();
        !self.is_failed()
    }

    pub fn has_pending(&self) -> bool {
        self.dispatcher.is_pending()
    }
}
