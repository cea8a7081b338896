//! Match engine: compares a resume against a job description.
//!
//! Algorithm (per `analyze` call):
//! 1. Extract the skill set of each document.
//! 2. matched = resume ∩ jd, missing = jd − resume (both sorted).
//! 3. Overall similarity = cosine of the embeddings of each set's
//!    space-joined skills; an empty set contributes the zero vector and is
//!    never sent to the provider.
//! 4. For every jd skill, the resume skill with the highest cosine
//!    similarity. Ties keep the first resume skill in sorted order.
//!
//! Every distinct string is embedded at most once per call (`EmbeddingCache`),
//! so a table of n jd skills by m resume skills costs n + m provider calls,
//! not n·m.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;

use crate::embedding::{Embedding, EmbeddingError, EmbeddingProvider};
use crate::matching::extractor::{SkillExtractor, SkillSet};
use crate::matching::similarity::{cosine_similarity, to_percentage};

/// `match_level` reported when the resume has no skills to compare against.
pub const NO_MATCH_SENTINEL: f64 = -100.0;

/// One row of the semantic match table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    #[serde(rename = "jd_skill")]
    pub job_skill: String,
    /// `None` only when the resume has no skills.
    pub closest_resume_skill: Option<String>,
    /// 0 – 100, or `NO_MATCH_SENTINEL` when there is no candidate.
    #[serde(rename = "match_level")]
    pub match_score: f64,
}

/// Full result of one resume-vs-JD comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub matched: Vec<String>,
    pub missing: Vec<String>,
    #[serde(rename = "similarity")]
    pub overall_similarity: f64, // 0 – 100
    pub semantic_matches: Vec<MatchRecord>,
    pub resume_skills: Vec<String>,
    pub jd_skills: Vec<String>,
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Embedding provider failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Analysis deadline exceeded after {completed} embedding calls")]
    DeadlineExceeded { completed: usize },
}

/// Per-call memo of embeddings keyed by the exact embedded string.
/// Dropped when the call returns; never shared between requests.
struct EmbeddingCache<'a> {
    provider: &'a dyn EmbeddingProvider,
    deadline: Option<Instant>,
    entries: HashMap<String, Arc<Embedding>>,
    hits: usize,
}

impl<'a> EmbeddingCache<'a> {
    fn new(provider: &'a dyn EmbeddingProvider, deadline: Option<Instant>) -> Self {
        Self {
            provider,
            deadline,
            entries: HashMap::new(),
            hits: 0,
        }
    }

    async fn get(&mut self, text: &str) -> Result<Arc<Embedding>, AnalysisError> {
        if let Some(hit) = self.entries.get(text) {
            self.hits += 1;
            return Ok(hit.clone());
        }

        // only provider calls are bounded by the deadline; cached lookups are free
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(AnalysisError::DeadlineExceeded {
                completed: self.entries.len(),
            });
        }

        let embedding = Arc::new(self.provider.embed(text).await?);
        self.entries.insert(text.to_owned(), embedding.clone());
        Ok(embedding)
    }

    async fn get_set(&mut self, skills: &SkillSet) -> Result<Arc<Embedding>, AnalysisError> {
        if skills.is_empty() {
            return Ok(Arc::new(Embedding::zeros(self.provider.dimension())));
        }
        self.get(&skills.joined()).await
    }

    fn misses(&self) -> usize {
        self.entries.len()
    }
}

/// Orchestrates extraction, exact comparison, and semantic scoring.
pub struct MatchEngine {
    extractor: SkillExtractor,
    provider: Arc<dyn EmbeddingProvider>,
}

impl MatchEngine {
    pub fn new(extractor: SkillExtractor, provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            extractor,
            provider,
        }
    }

    pub fn extractor(&self) -> &SkillExtractor {
        &self.extractor
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub async fn analyze(
        &self,
        resume_text: &str,
        jd_text: &str,
    ) -> Result<AnalysisResult, AnalysisError> {
        self.analyze_with_deadline(resume_text, jd_text, None).await
    }

    /// Like `analyze`, but stops before any further provider call once
    /// `deadline` has passed.
    pub async fn analyze_with_deadline(
        &self,
        resume_text: &str,
        jd_text: &str,
        deadline: Option<Instant>,
    ) -> Result<AnalysisResult, AnalysisError> {
        let resume_skills = self.extractor.extract(resume_text);
        let jd_skills = self.extractor.extract(jd_text);
        debug!(
            resume_skills = resume_skills.len(),
            jd_skills = jd_skills.len(),
            "skills extracted"
        );

        let matched = resume_skills.intersection(&jd_skills);
        let missing = jd_skills.difference(&resume_skills);

        let mut cache = EmbeddingCache::new(self.provider.as_ref(), deadline);

        let resume_emb = cache.get_set(&resume_skills).await?;
        let jd_emb = cache.get_set(&jd_skills).await?;
        let overall_similarity =
            to_percentage(cosine_similarity(resume_emb.as_slice(), jd_emb.as_slice()));

        let semantic_matches = semantic_table(&mut cache, &resume_skills, &jd_skills).await?;

        debug!(
            provider_calls = cache.misses(),
            cache_hits = cache.hits,
            overall_similarity,
            "analysis complete"
        );

        Ok(AnalysisResult {
            matched,
            missing,
            overall_similarity,
            semantic_matches,
            resume_skills: resume_skills.to_vec(),
            jd_skills: jd_skills.to_vec(),
        })
    }
}

async fn semantic_table(
    cache: &mut EmbeddingCache<'_>,
    resume_skills: &SkillSet,
    jd_skills: &SkillSet,
) -> Result<Vec<MatchRecord>, AnalysisError> {
    let mut records = Vec::with_capacity(jd_skills.len());

    for jd_skill in jd_skills.iter() {
        if resume_skills.is_empty() {
            records.push(MatchRecord {
                job_skill: jd_skill.to_string(),
                closest_resume_skill: None,
                match_score: NO_MATCH_SENTINEL,
            });
            continue;
        }

        let jd_emb = cache.get(jd_skill).await?;
        let mut best: Option<(&str, f32)> = None;

        for resume_skill in resume_skills.iter() {
            let resume_emb = cache.get(resume_skill).await?;
            let sim = cosine_similarity(jd_emb.as_slice(), resume_emb.as_slice());
            // strict > keeps the earliest skill on ties
            if best.map_or(true, |(_, best_sim)| sim > best_sim) {
                best = Some((resume_skill, sim));
            }
        }

        let (closest, sim) = match best {
            Some((skill, sim)) => (Some(skill.to_string()), to_percentage(sim)),
            None => (None, NO_MATCH_SENTINEL),
        };
        records.push(MatchRecord {
            job_skill: jd_skill.to_string(),
            closest_resume_skill: closest,
            match_score: sim,
        });
    }

    Ok(records)
}
