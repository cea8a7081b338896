//! Skill extraction: finds which vocabulary phrases occur in a free-text document.

use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::matching::vocabulary::SkillVocabulary;

/// How a vocabulary phrase must appear in the text to count as present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Any contiguous occurrence counts, so "java" is found inside "javascript".
    /// This is the legacy behavior and stays the default for result compatibility.
    #[default]
    Substring,
    /// The occurrence must not touch another word character on either side.
    /// `+` and `#` count as word characters so "c" is not found inside "c++".
    WordBoundary,
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "substring" => Ok(MatchMode::Substring),
            "word_boundary" | "word-boundary" => Ok(MatchMode::WordBoundary),
            other => Err(format!(
                "unknown skill match mode '{other}' (expected 'substring' or 'word_boundary')"
            )),
        }
    }
}

/// The skills found in one document. Iteration is in ascending lexicographic
/// order, which makes joins and tie-breaks reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillSet(BTreeSet<String>);

impl SkillSet {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn contains(&self, skill: &str) -> bool {
        self.0.contains(skill)
    }

    /// Skills present in both sets, sorted.
    pub fn intersection(&self, other: &SkillSet) -> Vec<String> {
        self.0.intersection(&other.0).cloned().collect()
    }

    /// Skills in `self` but not in `other`, sorted.
    pub fn difference(&self, other: &SkillSet) -> Vec<String> {
        self.0.difference(&other.0).cloned().collect()
    }

    /// Space-separated join in iteration order.
    pub fn joined(&self) -> String {
        self.iter().collect::<Vec<_>>().join(" ")
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for SkillSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        SkillSet(iter.into_iter().map(Into::into).collect())
    }
}

/// Scans text for vocabulary phrases, case-insensitively.
#[derive(Debug, Clone)]
pub struct SkillExtractor {
    vocabulary: Arc<SkillVocabulary>,
    mode: MatchMode,
}

impl SkillExtractor {
    pub fn new(vocabulary: Arc<SkillVocabulary>, mode: MatchMode) -> Self {
        Self { vocabulary, mode }
    }

    pub fn vocabulary(&self) -> &SkillVocabulary {
        &self.vocabulary
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Returns the vocabulary phrases present in `text`. Never fails; empty or
    /// skill-free text yields an empty set.
    pub fn extract(&self, text: &str) -> SkillSet {
        if text.is_empty() {
            return SkillSet::default();
        }

        let haystack = text.to_lowercase();
        self.vocabulary
            .phrases()
            .iter()
            .filter(|phrase| match self.mode {
                MatchMode::Substring => haystack.contains(phrase.as_str()),
                MatchMode::WordBoundary => contains_bounded(&haystack, phrase),
            })
            .cloned()
            .collect()
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '+' || c == '#'
}

fn contains_bounded(haystack: &str, phrase: &str) -> bool {
    haystack.match_indices(phrase).any(|(start, matched)| {
        let end = start + matched.len();
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !is_word_char(c));
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !is_word_char(c));
        before_ok && after_ok
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor(mode: MatchMode) -> SkillExtractor {
        SkillExtractor::new(Arc::new(SkillVocabulary::default()), mode)
    }

    fn skills(set: &SkillSet) -> Vec<&str> {
        set.iter().collect()
    }

    #[test]
    fn test_extract_is_case_insensitive() {
        let found = extractor(MatchMode::Substring).extract("Senior PYTHON dev, knows Django");
        assert!(found.contains("python"));
        assert!(found.contains("django"));
    }

    #[test]
    fn test_extract_empty_text_returns_empty_set() {
        assert!(extractor(MatchMode::Substring).extract("").is_empty());
    }

    #[test]
    fn test_extract_skill_free_text_returns_empty_set() {
        let found = extractor(MatchMode::WordBoundary).extract("Enjoys hiking and woodworking.");
        assert!(found.is_empty());
    }

    #[test]
    fn test_extract_returns_subset_of_vocabulary() {
        let ex = extractor(MatchMode::Substring);
        let found = ex.extract("Machine learning with TensorFlow, pandas, NumPy on Linux");
        for skill in found.iter() {
            assert!(ex.vocabulary().contains(skill), "{skill} not in vocabulary");
        }
    }

    #[test]
    fn test_substring_mode_finds_java_inside_javascript() {
        let found = extractor(MatchMode::Substring).extract("JavaScript only");
        assert!(found.contains("javascript"));
        assert!(found.contains("java"));
    }

    #[test]
    fn test_word_boundary_mode_rejects_java_inside_javascript() {
        let found = extractor(MatchMode::WordBoundary).extract("JavaScript only");
        assert_eq!(skills(&found), vec!["javascript"]);
    }

    #[test]
    fn test_word_boundary_mode_handles_symbols() {
        let found = extractor(MatchMode::WordBoundary).extract("Modern C++, some Node.js");
        assert!(found.contains("c++"));
        assert!(found.contains("node"));
        assert!(!found.contains("c"));
    }

    #[test]
    fn test_word_boundary_mode_finds_later_occurrence() {
        // first "sql" is inside "mysql", second stands alone
        let found = extractor(MatchMode::WordBoundary).extract("mysql and sql");
        assert!(found.contains("sql"));
        assert!(found.contains("mysql"));
    }

    #[test]
    fn test_skill_set_iterates_sorted() {
        let set: SkillSet = ["sql", "django", "python"].into_iter().collect();
        assert_eq!(skills(&set), vec!["django", "python", "sql"]);
        assert_eq!(set.joined(), "django python sql");
    }

    #[test]
    fn test_skill_set_intersection_and_difference() {
        let resume: SkillSet = ["python", "sql", "git"].into_iter().collect();
        let jd: SkillSet = ["sql", "java", "python"].into_iter().collect();
        assert_eq!(resume.intersection(&jd), vec!["python", "sql"]);
        assert_eq!(jd.difference(&resume), vec!["java"]);
    }

    #[test]
    fn test_match_mode_from_str() {
        assert_eq!("substring".parse::<MatchMode>(), Ok(MatchMode::Substring));
        assert_eq!(
            "Word_Boundary".parse::<MatchMode>(),
            Ok(MatchMode::WordBoundary)
        );
        assert!("fuzzy".parse::<MatchMode>().is_err());
    }
}
