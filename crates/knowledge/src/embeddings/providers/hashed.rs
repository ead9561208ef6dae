//! Offline hashing embedder.
//!
//! Words and their character trigrams are hashed into a fixed number of
//! buckets with a sign bit, then the vector is scaled to unit length. Texts
//! that share vocabulary land close together, which is enough for working
//! without a model server and for deterministic tests.

use std::collections::HashMap;

use studybuddy_core::AppResult;
use unicode_segmentation::UnicodeSegmentation;

use crate::embeddings::provider::EmbeddingProvider;

const MODEL_NAME: &str = "hashed-trigram-v1";

#[derive(Debug)]
pub struct HashedProvider {
    dimensions: usize,
}

impl HashedProvider {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        let mut counts: HashMap<String, u32> = HashMap::new();
        for word in text.unicode_words() {
            let word = word.to_lowercase();
            if word.chars().count() < 2 {
                continue;
            }
            *counts.entry(word).or_insert(0) += 1;
        }

        for (word, count) in &counts {
            let weight = 1.0 + (*count as f32).ln();
            self.add_feature(&mut vector, word.as_bytes(), weight);

            let padded: Vec<char> = std::iter::once('^')
                .chain(word.chars())
                .chain(std::iter::once('$'))
                .collect();
            for tri in padded.windows(3) {
                let gram: String = tri.iter().collect();
                self.add_feature(&mut vector, gram.as_bytes(), weight * 0.5);
            }
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }

        vector
    }

    fn add_feature(&self, vector: &mut [f32], feature: &[u8], weight: f32) {
        let hash = fnv1a(feature);
        let bucket = (hash % self.dimensions as u64) as usize;
        let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325u64, |hash, b| {
        (hash ^ *b as u64).wrapping_mul(0x0100_0000_01b3)
    })
}

#[async_trait::async_trait]
impl EmbeddingProvider for HashedProvider {
    fn provider_name(&self) -> &str {
        "hashed"
    }

    fn model_name(&self) -> &str {
        MODEL_NAME
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn test_unit_length_and_dimensions() {
        let provider = HashedProvider::new(384);
        let embedding = provider.embed("Paging divides memory into frames").await.unwrap();

        assert_eq!(embedding.len(), 384);
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[tokio::test]
    async fn test_deterministic() {
        let provider = HashedProvider::new(384);
        let a = provider.embed("deterministic test").await.unwrap();
        let b = provider.embed("deterministic test").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_shared_vocabulary_scores_higher() {
        let provider = HashedProvider::new(384);
        let query = provider.embed("deadlock prevention").await.unwrap();
        let related = provider
            .embed("Deadlock prevention breaks one of the four conditions")
            .await
            .unwrap();
        let unrelated = provider
            .embed("Photosynthesis converts light into chemical energy")
            .await
            .unwrap();

        assert!(cosine(&query, &related) > cosine(&query, &unrelated));
    }

    #[tokio::test]
    async fn test_empty_text_is_zero_vector() {
        let provider = HashedProvider::new(16);
        let embedding = provider.embed("").await.unwrap();
        assert!(embedding.iter().all(|&x| x == 0.0));
    }
}
