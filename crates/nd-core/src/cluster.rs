//! Density clustering over cosine distance.
//!
//! A document is *core* when at least `min_samples` other documents lie
//! within cosine distance `eps`. Clusters grow transitively through core
//! documents; non-core documents reached from a core join the first cluster
//! that reaches them. Everything else is noise. No randomness: labels follow
//! the index order of the first core document of each cluster.

use crate::config::EngineConfig;
use crate::constants::EPSILON;

/// A surviving cluster: member document indices plus the centroid vector.
#[derive(Clone, Debug, PartialEq)]
pub struct Cluster {
    /// Ascending document indices.
    pub members: Vec<usize>,
    pub centroid: Vec<f64>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Highest-weight centroid terms: the top `limit`, then only those above `floor`.
    /// Ties keep vocabulary order.
    pub fn top_terms(&self, vocabulary: &[String], limit: usize, floor: f64) -> Vec<String> {
        let mut idx: Vec<usize> = (0..self.centroid.len()).collect();
        idx.sort_by(|&a, &b| {
            self.centroid[b]
                .partial_cmp(&self.centroid[a])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });
        idx.into_iter()
            .take(limit)
            .filter(|&i| self.centroid[i] > floor)
            .filter_map(|i| vocabulary.get(i).cloned())
            .collect()
    }
}

/// Cosine similarity; zero vectors are dissimilar to everything.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if na < EPSILON || nb < EPSILON {
        return 0.0;
    }
    dot / (na * nb)
}

#[derive(Clone, Debug)]
pub struct DensityClusterer {
    pub eps: f64,
    pub min_samples: usize,
    pub min_cluster_size: usize,
}

impl Default for DensityClusterer {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl DensityClusterer {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            eps: config.eps,
            min_samples: config.min_samples,
            min_cluster_size: config.min_cluster_size,
        }
    }

    /// Indices of the other rows within `eps` cosine distance of row `i`.
    fn neighbors(&self, rows: &[Vec<f64>], i: usize) -> Vec<usize> {
        (0..rows.len())
            .filter(|&j| j != i && 1.0 - cosine_similarity(&rows[i], &rows[j]) <= self.eps + EPSILON)
            .collect()
    }

    /// Per-row cluster label; `None` is noise.
    pub fn labels(&self, rows: &[Vec<f64>]) -> Vec<Option<usize>> {
        let n = rows.len();
        let neighborhoods: Vec<Vec<usize>> = (0..n).map(|i| self.neighbors(rows, i)).collect();
        let is_core: Vec<bool> = neighborhoods
            .iter()
            .map(|nb| nb.len() >= self.min_samples)
            .collect();

        let mut labels: Vec<Option<usize>> = vec![None; n];
        let mut next_label = 0;

        for seed in 0..n {
            if labels[seed].is_some() || !is_core[seed] {
                continue;
            }
            let label = next_label;
            next_label += 1;
            labels[seed] = Some(label);

            let mut frontier = vec![seed];
            while let Some(p) = frontier.pop() {
                for &q in &neighborhoods[p] {
                    if labels[q].is_none() {
                        labels[q] = Some(label);
                        if is_core[q] {
                            frontier.push(q);
                        }
                    }
                }
            }
        }

        labels
    }

    /// Clusters of at least `min_cluster_size` members, in label order.
    pub fn cluster(&self, rows: &[Vec<f64>]) -> Vec<Cluster> {
        let labels = self.labels(rows);
        let n_labels = labels.iter().flatten().max().map_or(0, |m| m + 1);

        let mut groups: Vec<Vec<usize>> = vec![Vec::new(); n_labels];
        for (i, label) in labels.iter().enumerate() {
            if let Some(l) = label {
                groups[*l].push(i);
            }
        }

        groups
            .into_iter()
            .filter(|members| members.len() >= self.min_cluster_size)
            .map(|members| {
                let centroid = centroid(rows, &members);
                Cluster { members, centroid }
            })
            .collect()
    }
}

fn centroid(rows: &[Vec<f64>], members: &[usize]) -> Vec<f64> {
    let dim = rows.first().map_or(0, Vec::len);
    let mut c = vec![0.0; dim];
    for &m in members {
        for (acc, x) in c.iter_mut().zip(&rows[m]) {
            *acc += x;
        }
    }
    let k = members.len().max(1) as f64;
    c.iter_mut().for_each(|x| *x /= k);
    c
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit(v: &[f64]) -> Vec<f64> {
        let n = v.iter().map(|x| x * x).sum::<f64>().sqrt();
        v.iter().map(|x| x / n).collect()
    }

    #[test]
    fn test_cosine_similarity() {
        assert_relative_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]), 1.0);
        assert_relative_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_two_dense_groups_and_noise() {
        let rows = vec![
            unit(&[1.0, 0.0, 0.0]),
            unit(&[0.95, 0.05, 0.0]),
            unit(&[0.9, 0.1, 0.0]),
            unit(&[1.0, 0.02, 0.0]),
            unit(&[0.0, 0.0, 1.0]),
            unit(&[0.0, 0.05, 1.0]),
            unit(&[0.02, 0.0, 1.0]),
            unit(&[0.0, 0.02, 0.95]),
            unit(&[0.0, 1.0, 0.0]),
        ];
        let clusterer = DensityClusterer::default();
        let labels = clusterer.labels(&rows);
        assert_eq!(&labels[0..4], &[Some(0); 4]);
        assert_eq!(&labels[4..8], &[Some(1); 4]);
        assert_eq!(labels[8], None);

        let clusters = clusterer.cluster(&rows);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].members, vec![0, 1, 2, 3]);
        assert_eq!(clusters[1].members, vec![4, 5, 6, 7]);
    }

    #[test]
    fn test_requires_min_samples_other_documents() {
        // Three identical rows: each has only two other neighbors.
        let rows = vec![vec![1.0, 0.0]; 3];
        assert_eq!(DensityClusterer::default().labels(&rows), vec![None; 3]);
        // A fourth makes every row core.
        let rows = vec![vec![1.0, 0.0]; 4];
        assert_eq!(DensityClusterer::default().labels(&rows), vec![Some(0); 4]);
    }

    #[test]
    fn test_zero_rows_are_noise() {
        let mut rows = vec![vec![1.0, 0.0]; 4];
        rows.push(vec![0.0, 0.0]);
        let labels = DensityClusterer::default().labels(&rows);
        assert_eq!(labels[4], None);
    }

    #[test]
    fn test_small_clusters_discarded() {
        let clusterer = DensityClusterer {
            eps: 0.3,
            min_samples: 1,
            min_cluster_size: 3,
        };
        let rows = vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0], vec![0.0, 1.0], vec![0.0, 1.0]];
        let clusters = clusterer.cluster(&rows);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].members, vec![2, 3, 4]);
    }

    #[test]
    fn test_top_terms_limit_and_floor() {
        let cluster = Cluster {
            members: vec![0],
            centroid: vec![0.5, 0.005, 0.3, 0.3],
        };
        let vocab: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        assert_eq!(cluster.top_terms(&vocab, 10, 0.01), vec!["a", "c", "d"]);
        assert_eq!(cluster.top_terms(&vocab, 2, 0.01), vec!["a", "c"]);
    }

    #[test]
    fn test_deterministic() {
        let rows: Vec<Vec<f64>> = (0..12)
            .map(|i| unit(&[(i % 3) as f64 + 0.1, ((i + 1) % 3) as f64, 0.2]))
            .collect();
        let c = DensityClusterer::default();
        assert_eq!(c.labels(&rows), c.labels(&rows));
    }
}
