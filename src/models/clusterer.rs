//! Vector clustering.

use crate::error::{ChunkError, ChunkResult};

/// Partitions vectors into `k` groups.
pub trait Clusterer: Send + Sync {
    /// Return one label in `0..k` per input vector, in input order.
    fn cluster(&self, vectors: &[Vec<f32>], k: usize) -> ChunkResult<Vec<usize>>;
}

/// Lloyd's k-means with deterministic farthest-point seeding.
///
/// Seeding starts from the first vector and repeatedly adds the vector
/// farthest from every chosen centroid, so the same input always yields the
/// same labels.
#[derive(Debug, Clone)]
pub struct KMeansClusterer {
    max_iterations: usize,
}

impl KMeansClusterer {
    pub fn new() -> Self {
        Self { max_iterations: 50 }
    }

    pub fn with_max_iterations(max_iterations: usize) -> Self {
        Self {
            max_iterations: max_iterations.max(1),
        }
    }

    fn seed(&self, vectors: &[Vec<f32>], k: usize) -> Vec<Vec<f32>> {
        let mut centroids = vec![vectors[0].clone()];
        let mut nearest: Vec<f32> = vectors
            .iter()
            .map(|v| squared_distance(v, &centroids[0]))
            .collect();

        while centroids.len() < k {
            let (farthest, _) = nearest
                .iter()
                .enumerate()
                .fold((0, f32::MIN), |best, (i, &d)| if d > best.1 { (i, d) } else { best });
            let chosen = vectors[farthest].clone();
            for (i, v) in vectors.iter().enumerate() {
                nearest[i] = nearest[i].min(squared_distance(v, &chosen));
            }
            centroids.push(chosen);
        }

        centroids
    }
}

impl Default for KMeansClusterer {
    fn default() -> Self {
        Self::new()
    }
}

impl Clusterer for KMeansClusterer {
    fn cluster(&self, vectors: &[Vec<f32>], k: usize) -> ChunkResult<Vec<usize>> {
        if vectors.is_empty() {
            return Ok(vec![]);
        }
        if k == 0 || k > vectors.len() {
            return Err(ChunkError::invalid(format!(
                "cannot form {} clusters from {} vectors",
                k,
                vectors.len()
            )));
        }
        let dimension = vectors[0].len();
        if vectors.iter().any(|v| v.len() != dimension) {
            return Err(ChunkError::invalid("vectors have mismatched dimensions"));
        }

        let mut centroids = self.seed(vectors, k);
        let mut labels = vec![usize::MAX; vectors.len()];

        for _ in 0..self.max_iterations {
            // Assign each vector to its nearest centroid
            let mut changed = false;
            for (i, vector) in vectors.iter().enumerate() {
                let label = nearest_centroid(vector, &centroids);
                if labels[i] != label {
                    labels[i] = label;
                    changed = true;
                }
            }
            if !changed {
                break;
            }

            // Update centroids; an emptied cluster keeps its previous centroid
            for (cluster, centroid) in centroids.iter_mut().enumerate() {
                let mut sum = vec![0.0f32; dimension];
                let mut members = 0usize;
                let assigned = vectors
                    .iter()
                    .zip(&labels)
                    .filter(|(_, label)| **label == cluster);
                for (vector, _) in assigned {
                    for (acc, v) in sum.iter_mut().zip(vector) {
                        *acc += v;
                    }
                    members += 1;
                }
                if members > 0 {
                    for acc in sum.iter_mut() {
                        *acc /= members as f32;
                    }
                    *centroid = sum;
                }
            }
        }

        Ok(labels)
    }
}

fn nearest_centroid(vector: &[f32], centroids: &[Vec<f32>]) -> usize {
    let mut best = 0;
    let mut best_distance = f32::MAX;
    for (i, centroid) in centroids.iter().enumerate() {
        let distance = squared_distance(vector, centroid);
        if distance < best_distance {
            best_distance = distance;
            best = i;
        }
    }
    best
}

fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
