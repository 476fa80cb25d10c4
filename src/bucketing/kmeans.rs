//! Seeded iterative vector quantization.
//!
//! Each round assigns every point to its nearest centroid under Euclidean
//! distance (ties go to the lowest centroid index), then moves each centroid
//! to the mean of its points. A centroid that attracted no points is moved
//! onto a randomly drawn point instead. The reseed can reshuffle the
//! partition in later rounds; the loop is bounded by the round budget, not
//! by convergence.
//!
//! The generator is only touched for the initial centroid sample and for
//! reseeds, so a fixed `(features, k, iterations, seed)` always yields the
//! same labels and centroids, with or without parallel assignment.

use ndarray::{Array2, ArrayView1, ArrayView2};
use rand::seq::index;
use rand::Rng;
use rayon::prelude::*;

use super::config::{BucketingConfig, ConfigError};
use super::error::BucketingError;

/// Per-round statistics handed to progress callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundStats {
    /// Zero-based round index.
    pub round: usize,
    /// Points whose label differs from the previous round.
    pub changed: usize,
    /// Empty clusters that were reseeded this round.
    pub reseeded: usize,
}

/// Output of a clustering run.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    /// Centroid index per point.
    pub labels: Vec<usize>,
    /// `[k, d]` centroid matrix.
    pub centers: Array2<f32>,
    /// Rounds actually executed.
    pub rounds: usize,
}

impl KMeansFit {
    /// Realized cluster count.
    pub fn k(&self) -> usize {
        self.centers.nrows()
    }
}

/// Clustering parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KMeans {
    k: usize,
    iterations: usize,
    parallel: bool,
    early_stop: bool,
}

impl KMeans {
    /// Sequential clustering into `k` groups over `iterations` rounds.
    pub fn new(k: usize, iterations: usize) -> Self {
        Self {
            k,
            iterations,
            parallel: false,
            early_stop: false,
        }
    }

    /// Parameters taken from a bucketing configuration.
    pub fn from_config(config: &BucketingConfig) -> Self {
        Self {
            k: config.num_buckets,
            iterations: config.iterations,
            parallel: config.parallel,
            early_stop: config.early_stop,
        }
    }

    /// Builder method: toggle parallel assignment.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Builder method: toggle fixed-point early stopping.
    pub fn with_early_stop(mut self, early_stop: bool) -> Self {
        self.early_stop = early_stop;
        self
    }

    /// Cluster the rows of `x`.
    pub fn fit<R: Rng + ?Sized>(&self, x: ArrayView2<f32>, rng: &mut R) -> Result<KMeansFit, BucketingError> {
        self.fit_with_progress(x, rng, |_| {})
    }

    /// Cluster the rows of `x`, reporting each finished round to `progress`.
    pub fn fit_with_progress<R, F>(
        &self,
        x: ArrayView2<f32>,
        rng: &mut R,
        mut progress: F,
    ) -> Result<KMeansFit, BucketingError>
    where
        R: Rng + ?Sized,
        F: FnMut(&RoundStats),
    {
        let n = x.nrows();
        if n == 0 {
            return Err(BucketingError::EmptyPopulation);
        }
        if self.k == 0 {
            return Err(ConfigError::ZeroBuckets.into());
        }
        if self.k > n {
            log::warn!("clamping k from {} to population size {}", self.k, n);
        }
        let k = self.k.min(n);

        let mut centers = Array2::<f32>::zeros((k, x.ncols()));
        for (c, i) in index::sample(rng, n, k).iter().enumerate() {
            centers.row_mut(c).assign(&x.row(i));
        }

        let mut labels = vec![0usize; n];
        let mut rounds = 0;
        let mut prev_reseeded = false;

        for round in 0..self.iterations {
            let next = assign(x, centers.view(), self.parallel);
            let changed = next.iter().zip(&labels).filter(|(a, b)| a != b).count();
            labels = next;

            let reseeded = update_centers(x, &labels, &mut centers, rng);
            rounds = round + 1;

            let stats = RoundStats { round, changed, reseeded };
            log::debug!("round {:>4} changed {:>8} reseeded {:>4}", round, changed, reseeded);
            progress(&stats);

            // Identical labels twice with no reseeds means every later round
            // repeats this one without touching the generator.
            if self.early_stop && round > 0 && changed == 0 && reseeded == 0 && !prev_reseeded {
                break;
            }
            prev_reseeded = reseeded > 0;
        }

        Ok(KMeansFit { labels, centers, rounds })
    }
}

/// Euclidean distance between two equal-length vectors.
#[inline]
pub fn euclidean(a: ArrayView1<f32>, b: ArrayView1<f32>) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum::<f32>()
        .sqrt()
}

/// Index of the closest centroid, lowest index on ties.
pub fn nearest_center(point: ArrayView1<f32>, centers: ArrayView2<f32>) -> usize {
    let mut best = 0;
    let mut best_dist = f32::INFINITY;
    for (c, center) in centers.outer_iter().enumerate() {
        let dist = euclidean(point, center);
        if dist < best_dist {
            best_dist = dist;
            best = c;
        }
    }
    best
}

/// Nearest-centroid label for every row of `x`.
pub fn assign(x: ArrayView2<f32>, centers: ArrayView2<f32>, parallel: bool) -> Vec<usize> {
    if parallel {
        (0..x.nrows())
            .into_par_iter()
            .map(|i| nearest_center(x.row(i), centers))
            .collect()
    } else {
        x.outer_iter().map(|row| nearest_center(row, centers)).collect()
    }
}

/// Moves each centroid to the mean of its points; empty clusters take a
/// random point. Returns the number of reseeded clusters.
fn update_centers<R: Rng + ?Sized>(
    x: ArrayView2<f32>,
    labels: &[usize],
    centers: &mut Array2<f32>,
    rng: &mut R,
) -> usize {
    let k = centers.nrows();
    let mut sums = Array2::<f32>::zeros(centers.raw_dim());
    let mut counts = vec![0usize; k];

    for (row, &label) in x.outer_iter().zip(labels) {
        let mut acc = sums.row_mut(label);
        acc += &row;
        counts[label] += 1;
    }

    let mut reseeded = 0;
    for c in 0..k {
        if counts[c] > 0 {
            let count = counts[c] as f32;
            centers.row_mut(c).assign(&sums.row(c).mapv(|v| v / count));
        } else {
            let pick = rng.gen_range(0..x.nrows());
            centers.row_mut(c).assign(&x.row(pick));
            reseeded += 1;
        }
    }
    reseeded
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn two_blobs() -> Array2<f32> {
        array![
            [0.0, 0.0],
            [0.1, 0.0],
            [0.0, 0.1],
            [10.0, 10.0],
            [10.1, 10.0],
            [10.0, 10.1],
        ]
    }

    #[test]
    fn test_separates_blobs() {
        let x = two_blobs();
        let mut rng = StdRng::seed_from_u64(42);
        let fit = KMeans::new(2, 20).fit(x.view(), &mut rng).unwrap();

        assert_eq!(fit.k(), 2);
        assert_eq!(fit.labels.len(), 6);
        assert_eq!(fit.labels[0], fit.labels[1]);
        assert_eq!(fit.labels[0], fit.labels[2]);
        assert_eq!(fit.labels[3], fit.labels[4]);
        assert_eq!(fit.labels[3], fit.labels[5]);
        assert_ne!(fit.labels[0], fit.labels[3]);
    }

    #[test]
    fn test_deterministic_for_seed() {
        let x = two_blobs();
        let a = KMeans::new(3, 10).fit(x.view(), &mut StdRng::seed_from_u64(7)).unwrap();
        let b = KMeans::new(3, 10).fit(x.view(), &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let x = two_blobs();
        let seq = KMeans::new(3, 10).fit(x.view(), &mut StdRng::seed_from_u64(9)).unwrap();
        let par = KMeans::new(3, 10)
            .with_parallel(true)
            .fit(x.view(), &mut StdRng::seed_from_u64(9))
            .unwrap();
        assert_eq!(seq, par);
    }

    #[test]
    fn test_early_stop_preserves_output() {
        let x = two_blobs();
        let full = KMeans::new(2, 50).fit(x.view(), &mut StdRng::seed_from_u64(3)).unwrap();
        let early = KMeans::new(2, 50)
            .with_early_stop(true)
            .fit(x.view(), &mut StdRng::seed_from_u64(3))
            .unwrap();
        assert_eq!(full.labels, early.labels);
        assert_eq!(full.centers, early.centers);
        assert_eq!(full.rounds, 50);
        assert!(early.rounds < 50);
    }

    #[test]
    fn test_k_clamped_to_population() {
        let x = two_blobs();
        let fit = KMeans::new(10, 5).fit(x.view(), &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(fit.k(), 6);
        let mut labels = fit.labels.clone();
        labels.sort_unstable();
        labels.dedup();
        assert!(labels.iter().all(|&l| l < 6));
    }

    #[test]
    fn test_zero_iterations_returns_initial_sample() {
        let x = two_blobs();
        let fit = KMeans::new(2, 0).fit(x.view(), &mut StdRng::seed_from_u64(5)).unwrap();
        assert_eq!(fit.rounds, 0);
        assert_eq!(fit.labels, vec![0; 6]);
        for center in fit.centers.outer_iter() {
            assert!(x.outer_iter().any(|row| row == center));
        }
    }

    #[test]
    fn test_empty_population_rejected() {
        let x = Array2::<f32>::zeros((0, 4));
        let err = KMeans::new(2, 5).fit(x.view(), &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert_eq!(err, BucketingError::EmptyPopulation);
    }

    #[test]
    fn test_zero_k_rejected() {
        let x = two_blobs();
        let err = KMeans::new(0, 5).fit(x.view(), &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert_eq!(err, BucketingError::Config(ConfigError::ZeroBuckets));
    }

    #[test]
    fn test_nearest_center_ties_to_lowest_index() {
        let centers = array![[1.0, 0.0], [-1.0, 0.0], [0.0, 5.0]];
        let point = array![0.0, 0.0];
        assert_eq!(nearest_center(point.view(), centers.view()), 0);
    }

    #[test]
    fn test_duplicate_points_reseed_empty_clusters() {
        // Three identical points and k = 2: one centroid always loses the
        // tie and gets reseeded every round.
        let x = array![[1.0, 1.0], [1.0, 1.0], [1.0, 1.0]];
        let mut reseeds = 0;
        let fit = KMeans::new(2, 4)
            .fit_with_progress(x.view(), &mut StdRng::seed_from_u64(11), |s| reseeds += s.reseeded)
            .unwrap();
        assert_eq!(fit.labels, vec![0, 0, 0]);
        assert_eq!(reseeds, 4);
        assert_eq!(fit.rounds, 4);
    }

    #[test]
    fn test_progress_reports_each_round() {
        let x = two_blobs();
        let mut seen = Vec::new();
        KMeans::new(2, 5)
            .fit_with_progress(x.view(), &mut StdRng::seed_from_u64(2), |s| seen.push(s.round))
            .unwrap();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }
}
