//! Skill vocabulary: the fixed, ordered list of phrases extraction looks for.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};

/// Built-in vocabulary, in lookup order.
pub const DEFAULT_SKILLS: &[&str] = &[
    "python",
    "java",
    "c",
    "c++",
    "sql",
    "mysql",
    "mongodb",
    "javascript",
    "html",
    "css",
    "react",
    "node",
    "django",
    "flask",
    "machine learning",
    "deep learning",
    "data analysis",
    "excel",
    "power bi",
    "tableau",
    "nlp",
    "data science",
    "communication",
    "teamwork",
    "leadership",
    "project management",
    "azure",
    "tensorflow",
    "pandas",
    "numpy",
    "matplotlib",
    "git",
    "github",
    "linux",
];

/// Ordered, deduplicated set of lowercase skill phrases. Immutable once built.
#[derive(Debug, Clone)]
pub struct SkillVocabulary {
    phrases: Vec<String>,
}

impl Default for SkillVocabulary {
    fn default() -> Self {
        Self::new(DEFAULT_SKILLS.iter().copied())
    }
}

impl SkillVocabulary {
    /// Builds a vocabulary from arbitrary phrases. Each phrase is trimmed and
    /// lowercased; blanks are dropped and later duplicates are ignored.
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let phrases = phrases
            .into_iter()
            .map(|p| p.as_ref().trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .filter(|p| seen.insert(p.clone()))
            .collect();

        Self { phrases }
    }

    /// Loads a vocabulary file: one phrase per line, `#` starts a comment line.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read skill vocabulary '{}'", path.display()))?;

        let vocabulary = Self::new(
            raw.lines()
                .map(str::trim)
                .filter(|line| !line.starts_with('#')),
        );

        if vocabulary.is_empty() {
            anyhow::bail!("Skill vocabulary '{}' contains no phrases", path.display());
        }
        Ok(vocabulary)
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    #[cfg(test)]
    pub fn contains(&self, phrase: &str) -> bool {
        self.phrases.iter().any(|p| p == phrase)
    }
}
