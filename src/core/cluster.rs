//! Ordered 1-D clustering
//!
//! k-means with k-means++ seeding on a single coordinate. Labels out of
//! k-means are arbitrary, so clusters are sorted by centroid before use and
//! cluster 0 is always the smallest.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::ClusterConfig;
use crate::error::{FeatureError, Result};

/// Clusters per coordinate
pub const K: usize = 3;

/// One fitted cluster after ordering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterSummary {
    pub centroid: f64,
    pub count: usize,
}

/// Raw k-means output; label `i` refers to `centroids[i]`
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    pub centroids: Vec<f64>,
    pub labels: Vec<usize>,
    pub inertia: f64,
}

fn nearest(value: f64, centroids: &[f64]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (i, c) in centroids.iter().enumerate() {
        let d = (value - c).powi(2);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

/// Pick the point farthest from its nearest centroid
fn farthest_point(values: &[f64], centroids: &[f64]) -> f64 {
    values
        .iter()
        .copied()
        .max_by(|a, b| {
            nearest(*a, centroids)
                .1
                .total_cmp(&nearest(*b, centroids).1)
        })
        .unwrap_or(0.0)
}

/// k-means++: each new center is drawn with probability proportional to
/// its squared distance from the nearest chosen center
fn seed_centroids<R: Rng>(values: &[f64], k: usize, rng: &mut R) -> Vec<f64> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(values[rng.gen_range(0..values.len())]);

    while centroids.len() < k {
        let weights: Vec<f64> = values.iter().map(|v| nearest(*v, &centroids).1).collect();
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            centroids.push(farthest_point(values, &centroids));
            continue;
        }

        let target = rng.gen::<f64>() * total;
        let mut cumulative = 0.0;
        let mut chosen = None;
        for (v, w) in values.iter().zip(&weights) {
            if *w <= 0.0 {
                continue;
            }
            cumulative += w;
            if target < cumulative {
                chosen = Some(*v);
                break;
            }
        }
        centroids.push(chosen.unwrap_or_else(|| farthest_point(values, &centroids)));
    }

    centroids
}

fn assign(values: &[f64], centroids: &[f64]) -> (Vec<usize>, f64) {
    let mut inertia = 0.0;
    let labels = values
        .iter()
        .map(|v| {
            let (label, d) = nearest(*v, centroids);
            inertia += d;
            label
        })
        .collect();
    (labels, inertia)
}

fn variance(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}

/// One Lloyd run from k-means++ seeds
pub fn kmeans_1d<R: Rng>(values: &[f64], k: usize, config: &ClusterConfig, rng: &mut R) -> KMeansFit {
    let mut centroids = seed_centroids(values, k, rng);
    // Convergence threshold scales with the data spread
    let tolerance = config.tolerance * variance(values);

    for _ in 0..config.max_iter {
        let (labels, _) = assign(values, &centroids);

        let mut sums = vec![0.0; k];
        let mut counts = vec![0usize; k];
        for (v, &label) in values.iter().zip(&labels) {
            sums[label] += v;
            counts[label] += 1;
        }

        let mut next: Vec<f64> = (0..k)
            .map(|i| {
                if counts[i] > 0 {
                    sums[i] / counts[i] as f64
                } else {
                    f64::NAN
                }
            })
            .collect();
        for i in 0..k {
            if next[i].is_nan() {
                let placed: Vec<f64> = next.iter().copied().filter(|c| !c.is_nan()).collect();
                next[i] = farthest_point(values, &placed);
            }
        }

        let shift: f64 = centroids
            .iter()
            .zip(&next)
            .map(|(a, b)| (a - b).powi(2))
            .sum();
        centroids = next;
        if shift <= tolerance {
            break;
        }
    }

    let (labels, inertia) = assign(values, &centroids);
    KMeansFit {
        centroids,
        labels,
        inertia,
    }
}

/// Sort clusters by ascending centroid and count their members
pub fn relabel_by_centroid(fit: &KMeansFit) -> Vec<ClusterSummary> {
    let mut clusters: Vec<ClusterSummary> = fit
        .centroids
        .iter()
        .enumerate()
        .map(|(i, &centroid)| ClusterSummary {
            centroid,
            count: fit.labels.iter().filter(|&&l| l == i).count(),
        })
        .collect();
    clusters.sort_by(|a, b| a.centroid.total_cmp(&b.centroid));
    clusters
}

/// Best of `n_init` seeded runs, ordered by centroid
pub fn ordered_clusters(values: &[f64], config: &ClusterConfig) -> Result<Vec<ClusterSummary>> {
    let mut distinct = values.to_vec();
    distinct.sort_by(f64::total_cmp);
    distinct.dedup();
    if distinct.len() < K {
        return Err(FeatureError::DegenerateFormation(format!(
            "{} distinct values cannot form {} clusters",
            distinct.len(),
            K
        )));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut best: Option<KMeansFit> = None;
    for _ in 0..config.n_init.max(1) {
        let fit = kmeans_1d(values, K, config, &mut rng);
        if best.as_ref().map_or(true, |b| fit.inertia < b.inertia) {
            best = Some(fit);
        }
    }

    best.map(|fit| relabel_by_centroid(&fit))
        .ok_or_else(|| FeatureError::DegenerateFormation("no clustering run completed".to_string()))
}
