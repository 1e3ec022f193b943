use crate::config::SearchConfig;
use crate::types::{Field, IndexRecord, MatchSpan, ResultRecord};
use nucleo_matcher::pattern::{AtomKind, CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32Str};

/// Patterns for one query: an exact substring pattern for zero-discrepancy
/// hits, and a fuzzy pattern whose score relative to a perfect hit gives a
/// 0..=1 quality for everything else
pub struct FieldScorer {
    exact: Pattern,
    fuzzy: Pattern,
    perfect: u32,
    include_matches: bool,
}

/// Quality of one field match and, if requested, its character positions
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMatch {
    pub quality: f32,
    pub indices: Vec<u32>,
}

impl FieldScorer {
    pub fn new(query: &str, include_matches: bool, matcher: &mut Matcher) -> Self {
        let exact = Pattern::new(
            query,
            CaseMatching::Ignore,
            Normalization::Smart,
            AtomKind::Substring,
        );
        let fuzzy = Pattern::new(
            query,
            CaseMatching::Ignore,
            Normalization::Smart,
            AtomKind::Fuzzy,
        );
        let mut buf = Vec::new();
        let perfect = fuzzy
            .score(Utf32Str::new(query, &mut buf), matcher)
            .unwrap_or(0);
        FieldScorer {
            exact,
            fuzzy,
            perfect,
            include_matches,
        }
    }

    /// Score a haystack; None when the pattern does not match at all
    pub fn score(&self, haystack: &str, matcher: &mut Matcher) -> Option<FieldMatch> {
        if haystack.is_empty() {
            return None;
        }
        let mut buf = Vec::new();
        let utf32 = Utf32Str::new(haystack, &mut buf);

        // Every term appears verbatim: no discrepancy, wherever it sits.
        // Mid-text hits in unsegmented (e.g. Japanese) text earn no boundary
        // bonus, so the fuzzy ratio alone would undervalue them.
        if let Some(indices) = self.run(&self.exact, utf32, matcher) {
            return Some(FieldMatch {
                quality: 1.0,
                indices,
            });
        }

        let mut indices = Vec::new();
        let raw = if self.include_matches {
            self.fuzzy.indices(utf32, matcher, &mut indices)?
        } else {
            self.fuzzy.score(utf32, matcher)?
        };
        indices.sort_unstable();
        indices.dedup();
        let quality = if self.perfect == 0 {
            1.0
        } else {
            (raw as f32 / self.perfect as f32).min(1.0)
        };
        Some(FieldMatch { quality, indices })
    }

    /// Match positions of `pattern` (empty when not requested), None on no match
    fn run(
        &self,
        pattern: &Pattern,
        haystack: Utf32Str<'_>,
        matcher: &mut Matcher,
    ) -> Option<Vec<u32>> {
        let mut indices = Vec::new();
        if self.include_matches {
            pattern.indices(haystack, matcher, &mut indices)?;
            indices.sort_unstable();
            indices.dedup();
        } else {
            pattern.score(haystack, matcher)?;
        }
        Some(indices)
    }
}

/// Score one record; None when no field is within the looseness threshold
fn score_record(
    record: &IndexRecord,
    scorer: &FieldScorer,
    matcher: &mut Matcher,
    config: &SearchConfig,
) -> Option<(f32, Vec<MatchSpan>)> {
    let fields = [
        (Field::Title, record.title.as_str(), config.weights.title),
        (Field::Content, record.content.as_str(), config.weights.content),
    ];
    let total_weight = config.weights.title + config.weights.content;

    let mut weighted = 0.0;
    let mut matched_any = false;
    let mut spans = Vec::new();

    for (field, text, weight) in fields {
        let Some(hit) = scorer.score(text, matcher) else {
            continue;
        };
        // Looseness is how far a field falls short of a perfect hit
        if 1.0 - hit.quality > config.threshold {
            continue;
        }
        matched_any = true;
        weighted += weight * hit.quality;
        if config.include_matches && !hit.indices.is_empty() {
            spans.push(MatchSpan {
                key: field,
                indices: hit.indices,
            });
        }
    }

    if !matched_any {
        return None;
    }
    Some((weighted / total_weight, spans))
}

#[cfg(not(feature = "native"))]
fn score_corpus(
    corpus: &[IndexRecord],
    query: &str,
    config: &SearchConfig,
) -> Vec<(f32, usize, Vec<MatchSpan>)> {
    let mut matcher = Matcher::new(Config::DEFAULT);
    let scorer = FieldScorer::new(query, config.include_matches, &mut matcher);
    corpus
        .iter()
        .enumerate()
        .filter_map(|(pos, record)| {
            let (score, spans) = score_record(record, &scorer, &mut matcher, config)?;
            Some((score, pos, spans))
        })
        .collect()
}

#[cfg(feature = "native")]
fn score_corpus(
    corpus: &[IndexRecord],
    query: &str,
    config: &SearchConfig,
) -> Vec<(f32, usize, Vec<MatchSpan>)> {
    use rayon::prelude::*;

    let scorer = FieldScorer::new(
        query,
        config.include_matches,
        &mut Matcher::new(Config::DEFAULT),
    );
    corpus
        .par_iter()
        .enumerate()
        .map_init(
            || Matcher::new(Config::DEFAULT),
            |matcher, (pos, record)| {
                let (score, spans) = score_record(record, &scorer, matcher, config)?;
                Some((score, pos, spans))
            },
        )
        .flatten()
        .collect()
}

/// Rank the corpus against a non-blank query, best match first
pub fn fuzzy_search(
    corpus: &[IndexRecord],
    query: &str,
    config: &SearchConfig,
) -> Vec<ResultRecord> {
    let scored = score_corpus(corpus, query, config);
    let limit = config.limit.unwrap_or(scored.len());

    top_n(scored, limit)
        .into_iter()
        .map(|(score, pos, spans)| ResultRecord::from_record(&corpus[pos], score, spans))
        .collect()
}

/// Get the N highest scoring entries, ties broken by corpus position
pub fn top_n<T>(mut ranked: Vec<(f32, usize, T)>, n: usize) -> Vec<(f32, usize, T)> {
    ranked.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.1.cmp(&b.1))
    });
    ranked.truncate(n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, content: &str, url: &str) -> IndexRecord {
        IndexRecord {
            title: title.to_string(),
            content: content.to_string(),
            url: url.to_string(),
        }
    }

    fn corpus() -> Vec<IndexRecord> {
        vec![
            record("Rathalos", "Flying wyvern. King of the skies.", "/rathalos"),
            record("Rathian", "Flying wyvern. Queen of the land.", "/rathian"),
            record("Yian Kut-Ku", "Bird wyvern with large ears.", "/kutku"),
            record("Great Jaggi", "Leader of the Jaggi pack.", "/jaggi"),
        ]
    }

    #[test]
    fn test_top_n() {
        let scores = vec![(1.0, 0, ()), (3.0, 1, ()), (2.0, 2, ()), (3.0, 3, ())];
        let top = top_n(scores, 3);
        let order: Vec<usize> = top.iter().map(|(_, pos, _)| *pos).collect();
        assert_eq!(order, vec![1, 3, 2]);
    }

    #[test]
    fn test_exact_title_ranks_first() {
        let results = fuzzy_search(&corpus(), "rathalos", &SearchConfig::default());
        assert!(!results.is_empty());
        assert_eq!(results[0].title, "Rathalos");
        assert!(results[0].score.unwrap() > 0.0);
    }

    #[test]
    fn test_unrelated_query_has_no_results() {
        let results = fuzzy_search(&corpus(), "zinogre", &SearchConfig::default());
        assert!(results.is_empty());
    }

    #[test]
    fn test_content_only_match() {
        let results = fuzzy_search(&corpus(), "ears", &SearchConfig::default());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Yian Kut-Ku");
        assert_eq!(results[0].matches[0].key, Field::Content);
    }

    #[test]
    fn test_title_outweighs_content() {
        let corpus = vec![
            record("Jaggia", "Small bird wyvern.", "/jaggia"),
            record("Great Jaggi", "Leader of the pack.", "/jaggi"),
            record("Baggi", "Relative of the jaggi.", "/baggi"),
        ];
        let results = fuzzy_search(&corpus, "jaggi", &SearchConfig::default());
        let last = results.last().unwrap();
        assert_eq!(last.title, "Baggi");
    }

    #[test]
    fn test_match_positions() {
        let results = fuzzy_search(&corpus(), "rathian", &SearchConfig::default());
        let top = &results[0];
        assert_eq!(top.title, "Rathian");
        let title_span = top.matches.iter().find(|m| m.key == Field::Title).unwrap();
        assert_eq!(title_span.indices, vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_matches_omitted_when_disabled() {
        let config = SearchConfig {
            include_matches: false,
            ..SearchConfig::default()
        };
        let results = fuzzy_search(&corpus(), "rathalos", &config);
        assert!(results.iter().all(|r| r.matches.is_empty()));
    }

    #[test]
    fn test_limit() {
        let config = SearchConfig {
            limit: Some(1),
            ..SearchConfig::default()
        };
        let results = fuzzy_search(&corpus(), "wyvern", &config);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_zero_threshold_is_stricter() {
        let strict = SearchConfig {
            threshold: 0.0,
            ..SearchConfig::default()
        };
        let loose = SearchConfig {
            threshold: 1.0,
            ..SearchConfig::default()
        };
        let strict_hits = fuzzy_search(&corpus(), "rtls", &strict).len();
        let loose_hits = fuzzy_search(&corpus(), "rtls", &loose).len();
        assert!(strict_hits <= loose_hits);
        assert!(loose_hits >= 1);
    }

    #[test]
    fn test_japanese_substring_inside_content() {
        let corpus = vec![record(
            "リオレウス",
            "種別: 飛竜種 空の王者と呼ばれる火竜。",
            "/a",
        )];
        for query in ["火竜", "王者", "飛竜種"] {
            let results = fuzzy_search(&corpus, query, &SearchConfig::default());
            assert_eq!(results.len(), 1, "query {}", query);
            let span = &results[0].matches[0];
            assert_eq!(span.key, Field::Content);
            assert_eq!(span.indices.len(), query.chars().count());
        }
    }

    #[test]
    fn test_exact_substring_has_full_quality() {
        let mut matcher = Matcher::new(Config::DEFAULT);
        let scorer = FieldScorer::new("火竜", true, &mut matcher);
        let hit = scorer
            .score("空の王者と呼ばれる火竜。", &mut matcher)
            .unwrap();
        assert_eq!(hit.quality, 1.0);
        assert_eq!(hit.indices, vec![9, 10]);
    }

    #[test]
    fn test_japanese_titles() {
        let corpus = vec![
            record("リオレウス", "種別: 飛竜種", "/a"),
            record("リオレイア", "種別: 飛竜種", "/b"),
            record("ドスジャギィ", "種別: 鳥竜種", "/c"),
        ];
        let results = fuzzy_search(&corpus, "リオレイア", &SearchConfig::default());
        assert_eq!(results[0].title, "リオレイア");
        assert!(results.iter().all(|r| r.title != "ドスジャギィ"));
    }
}
