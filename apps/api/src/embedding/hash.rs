use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use siphasher::sip::SipHasher13;

use super::{Embedding, EmbeddingError, EmbeddingProvider};

/// Fixed keys so vectors are stable across runs and Rust versions.
/// Changing them changes every embedding.
const HASH_SEED_K0: u64 = 0x5b1f_0c3a_77e2_9d41;
const HASH_SEED_K1: u64 = 0xa4c8_16f0_3e95_b27d;

const WORD_WEIGHT: f32 = 1.0;
const TRIGRAM_WEIGHT: f32 = 0.5;

/// Deterministic local embedder based on feature hashing.
///
/// Each lowercase word contributes itself plus its padded character trigrams,
/// so phrases that share words or word fragments ("sql" / "mysql",
/// "machine learning" / "deep learning") land closer together than unrelated
/// ones. No model files, no network.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn hash(token: &str) -> u64 {
        let mut hasher = SipHasher13::new_with_keys(HASH_SEED_K0, HASH_SEED_K1);
        token.hash(&mut hasher);
        hasher.finish()
    }

    fn add(&self, vector: &mut [f32], token: &str, weight: f32) {
        let h = Self::hash(token);
        let idx = (h % self.dimension as u64) as usize;
        // top bit picks the sign so collisions partly cancel instead of piling up
        let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
        vector[idx] += sign * weight;
    }

    fn encode(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        let lowered = text.to_lowercase();

        for word in lowered.split_whitespace() {
            self.add(&mut vector, &format!("w:{word}"), WORD_WEIGHT);

            let padded: Vec<char> = format!("^{word}$").chars().collect();
            for window in padded.windows(3) {
                let trigram: String = window.iter().collect();
                self.add(&mut vector, &format!("t:{trigram}"), TRIGRAM_WEIGHT);
            }
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    fn name(&self) -> &'static str {
        "hash"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        Ok(Embedding::new(self.encode(text)))
    }
}
