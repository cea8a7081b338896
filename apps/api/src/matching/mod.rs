// Skill matching: vocabulary → extraction → exact + semantic comparison.
// The engine is the only place that talks to the embedding provider.

pub mod engine;
pub mod extractor;
pub mod handlers;
pub mod similarity;
pub mod vocabulary;
