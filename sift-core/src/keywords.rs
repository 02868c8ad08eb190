//! Ordered keyword → category lookup used by the classifier.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordEntry {
    /// Lower-cased substring to look for
    pub keyword: String,
    pub category: String,
}

/// Case-insensitive substring table. Entries are scanned in insertion order
/// and the first hit wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeywordTable {
    entries: Vec<KeywordEntry>,
}

impl KeywordTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a keyword. Keywords are lower-cased but keep their spaces, so
    /// `" ee "` only matches a separate word. Blank keywords are ignored and
    /// `false` is returned. Re-adding a keyword replaces its category but
    /// keeps its position.
    pub fn insert(&mut self, keyword: &str, category: impl Into<String>) -> bool {
        if keyword.trim().is_empty() {
            return false;
        }
        let keyword = keyword.to_lowercase();
        let category = category.into();
        match self.entries.iter_mut().find(|e| e.keyword == keyword) {
            Some(existing) => existing.category = category,
            None => self.entries.push(KeywordEntry { keyword, category }),
        }
        true
    }

    /// Category of the first keyword contained in `text`.
    /// `text` must already be lower-cased.
    pub fn first_match(&self, text: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| text.contains(e.keyword.as_str()))
            .map(|e| e.category.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeywordEntry> {
        self.entries.iter()
    }

    /// True if `label` is one of the table's categories
    pub fn has_category(&self, label: &str) -> bool {
        self.entries.iter().any(|e| e.category == label)
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for KeywordTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = KeywordTable::new();
        for (keyword, category) in iter {
            table.insert(keyword.as_ref(), category);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_wins() {
        let table: KeywordTable = [("tesco", "Groceries"), ("tesco express", "Convenience")]
            .into_iter()
            .collect();
        assert_eq!(table.first_match("tesco express london"), Some("Groceries"));
    }

    #[test]
    fn test_keywords_are_lowercased() {
        let table: KeywordTable = [("ACME", "Work")].into_iter().collect();
        assert_eq!(table.iter().next().unwrap().keyword, "acme");
        assert_eq!(table.first_match("acme corp"), Some("Work"));
        assert_eq!(table.first_match("nothing here"), None);
    }

    #[test]
    fn test_padded_keyword_keeps_its_spaces() {
        let table: KeywordTable = [(" EE ", "Phone")].into_iter().collect();
        assert_eq!(table.iter().next().unwrap().keyword, " ee ");
        assert_eq!(table.first_match("coffee house"), None);
        assert_eq!(table.first_match("dd ee mobile"), Some("Phone"));
    }

    #[test]
    fn test_duplicate_keyword_keeps_position() {
        let mut table = KeywordTable::new();
        table.insert("uber", "Transport");
        table.insert("uber eats", "Takeaway");
        table.insert("uber", "Taxi");
        assert_eq!(table.len(), 2);
        assert_eq!(table.first_match("uber eats order"), Some("Taxi"));
    }

    #[test]
    fn test_blank_keyword_rejected() {
        let mut table = KeywordTable::new();
        assert!(!table.insert("   ", "Anything"));
        assert!(table.is_empty());
    }
}
