//! Sentence embedding and vector helpers.

use unicode_segmentation::UnicodeSegmentation;

use crate::error::{ChunkError, ChunkResult};

/// Maps sentences to fixed-length vectors.
///
/// Implementations must be safe to call concurrently.
pub trait Embedder: Send + Sync {
    /// Length of every vector this embedder returns.
    fn dimension(&self) -> usize;

    /// Embed a batch of sentences, one vector per sentence, in order.
    fn embed(&self, sentences: &[String]) -> ChunkResult<Vec<Vec<f32>>>;
}

/// Feature-hashing bag-of-words embedder.
///
/// Each lower-cased word is hashed into one of `dimension` buckets with a
/// hash-derived sign, and the result is L2-normalized. Sentences sharing
/// vocabulary land close together, which is enough signal for similarity
/// grouping without a neural model.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    /// Create an embedder with the default dimension (256).
    pub fn new() -> Self {
        Self { dimension: 256 }
    }

    pub fn with_dimension(dimension: usize) -> ChunkResult<Self> {
        if dimension == 0 {
            return Err(ChunkError::invalid("embedding dimension must be greater than zero"));
        }
        Ok(Self { dimension })
    }

    fn embed_one(&self, sentence: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        for word in sentence.unicode_words() {
            let hash = fnv1a(word.to_lowercase().as_bytes());
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }
        normalize(&mut vector);
        vector
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl Embedder for HashingEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, sentences: &[String]) -> ChunkResult<Vec<Vec<f32>>> {
        Ok(sentences.iter().map(|s| self.embed_one(s)).collect())
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET, |hash, &b| (hash ^ u64::from(b)).wrapping_mul(PRIME))
}

/// Scale `vector` to unit length in place; zero vectors are left alone.
pub fn normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}

/// Cosine similarity in [-1, 1]; 0.0 when either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// Mean-pooled centroid of a set of equally sized vectors.
pub fn mean_pool<'a, I>(vectors: I) -> Vec<f32>
where
    I: IntoIterator<Item = &'a Vec<f32>>,
{
    let mut sum: Vec<f32> = Vec::new();
    let mut count = 0usize;
    for vector in vectors {
        if sum.is_empty() {
            sum = vec![0.0; vector.len()];
        }
        for (acc, v) in sum.iter_mut().zip(vector.iter()) {
            *acc += v;
        }
        count += 1;
    }
    if count > 0 {
        for acc in sum.iter_mut() {
            *acc /= count as f32;
        }
    }
    sum
}

/// Check an embedder answered with one vector per input.
pub(crate) fn check_batch(vectors: &[Vec<f32>], expected: usize) -> ChunkResult<()> {
    if vectors.len() != expected {
        return Err(ChunkError::model(
            "embedder",
            format!("returned {} vectors for {} sentences", vectors.len(), expected),
        ));
    }
    Ok(())
}
