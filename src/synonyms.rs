use crate::types::ResultRecord;

/// Trigger substring and the category it stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynonymEntry {
    pub key: &'static str,
    pub label: &'static str,
}

/// Synonym table, checked in order
pub const SYNONYMS: &[SynonymEntry] = &[
    SynonymEntry {
        key: "リオレウス",
        label: "飛竜種",
    },
    SynonymEntry {
        key: "イャンクック",
        label: "鳥竜種",
    },
];

/// Prefix the renderer reads category badges from
pub const CATEGORY_PREFIX: &str = "種別: ";

impl SynonymEntry {
    pub fn to_result(&self) -> ResultRecord {
        ResultRecord {
            title: self.key.to_string(),
            url: "#".to_string(),
            content: format!("{}{}", CATEGORY_PREFIX, self.label),
            score: None,
            matches: Vec::new(),
        }
    }
}

/// Every entry whose key occurs in the query (case-sensitive, unanchored)
pub fn resolve(query: &str, table: &[SynonymEntry]) -> Vec<ResultRecord> {
    table
        .iter()
        .filter(|entry| query.contains(entry.key))
        .map(SynonymEntry::to_result)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_key() {
        let results = resolve("リオレウス", SYNONYMS);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "リオレウス");
        assert_eq!(results[0].content, "種別: 飛竜種");
        assert_eq!(results[0].url, "#");
    }

    #[test]
    fn test_substring_inside_longer_query() {
        let results = resolve("リオレウス亜種の弱点", SYNONYMS);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "リオレウス");
    }

    #[test]
    fn test_multiple_hits_keep_table_order() {
        let results = resolve("イャンクックとリオレウス", SYNONYMS);
        let titles: Vec<&str> = results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["リオレウス", "イャンクック"]);
    }

    #[test]
    fn test_no_hit() {
        assert!(resolve("ナルガクルガ", SYNONYMS).is_empty());
    }

    #[test]
    fn test_case_sensitive() {
        let table = [SynonymEntry {
            key: "Rathalos",
            label: "Flying Wyvern",
        }];
        assert!(resolve("rathalos", &table).is_empty());
        assert_eq!(resolve("Rathalos", &table).len(), 1);
    }
}
