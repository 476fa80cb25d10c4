//! River bucketing: features for a hand population, clustered into buckets.
//!
//! Run once per board (offline), then use [`BucketResult::labels`] or a
//! [`BucketMap`] to turn hands into bucket ids when building range vectors.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rustc_hash::FxHashMap;

use super::config::BucketingConfig;
use super::error::BucketingError;
use super::features::feature_matrix;
use super::kmeans::{KMeans, RoundStats};
use crate::cards::{Board, Hand};

/// Result of clustering a hand population.
///
/// `labels.len() == features.nrows()`, `centers.nrows() == k`, and every
/// label indexes a row of `centers`. Results from [`bucket_hands_on_river`]
/// always hold; a hand-built value that breaks the label bound makes
/// [`cluster_sizes`](Self::cluster_sizes) and
/// [`bucket_range`](Self::bucket_range) panic.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketResult {
    /// Bucket id per input hand.
    pub labels: Vec<usize>,
    /// `[k, FEATURE_DIM]` bucket centroids.
    pub centers: Array2<f32>,
    /// Realized bucket count, at most the requested count.
    pub k: usize,
    /// `[N, FEATURE_DIM]` features the clustering ran on.
    pub features: Array2<f32>,
    /// Refinement rounds actually executed.
    pub rounds: usize,
}

impl BucketResult {
    /// Number of clustered hands.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True if no hands were clustered. Never the case for a successful run.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Bucket of the `i`-th input hand.
    pub fn bucket_of(&self, i: usize) -> Option<usize> {
        self.labels.get(i).copied()
    }

    /// Number of hands in each bucket.
    ///
    /// # Panics
    ///
    /// If a label is `>= k`.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.k];
        for &label in &self.labels {
            sizes[label] += 1;
        }
        sizes
    }

    /// Sums per-hand weights into a length-`k` range vector indexed by bucket.
    ///
    /// # Panics
    ///
    /// If a label is `>= k`.
    pub fn bucket_range(&self, hand_weights: &[f32]) -> Result<Vec<f32>, BucketingError> {
        if hand_weights.len() != self.labels.len() {
            return Err(BucketingError::LengthMismatch {
                expected: self.labels.len(),
                got: hand_weights.len(),
            });
        }
        let mut range = vec![0.0f32; self.k];
        for (&label, &w) in self.labels.iter().zip(hand_weights) {
            range[label] += w;
        }
        Ok(range)
    }
}

/// Bucket id per hand, in input order.
pub fn hand_to_bucket_map(labels: &[usize]) -> Vec<usize> {
    labels.to_vec()
}

/// Cluster `hands` on `board` into at most `config.num_buckets` buckets.
pub fn bucket_hands_on_river(
    board: &Board,
    hands: &[Hand],
    config: &BucketingConfig,
) -> Result<BucketResult, BucketingError> {
    bucket_hands_with_progress(board, hands, config, |_| {})
}

/// Same as [`bucket_hands_on_river`], reporting each clustering round.
pub fn bucket_hands_with_progress<F: FnMut(&RoundStats)>(
    board: &Board,
    hands: &[Hand],
    config: &BucketingConfig,
    progress: F,
) -> Result<BucketResult, BucketingError> {
    config.validate()?;
    if hands.is_empty() {
        return Err(BucketingError::EmptyPopulation);
    }

    let features = feature_matrix(board, hands);
    let mut rng = StdRng::seed_from_u64(config.seed);
    let fit = KMeans::from_config(config).fit_with_progress(features.view(), &mut rng, progress)?;

    log::info!(
        "bucketed {} hands on [{}] into {} buckets ({} rounds)",
        hands.len(),
        board,
        fit.k(),
        fit.rounds
    );

    Ok(BucketResult {
        k: fit.k(),
        labels: fit.labels,
        centers: fit.centers,
        features,
        rounds: fit.rounds,
    })
}

/// Hand -> bucket lookup built from a clustered population.
#[derive(Debug, Clone, Default)]
pub struct BucketMap {
    buckets: FxHashMap<Hand, usize>,
    num_buckets: usize,
}

impl BucketMap {
    /// Pair each hand with its label. Hands and labels must line up.
    pub fn new(hands: &[Hand], result: &BucketResult) -> Result<Self, BucketingError> {
        if hands.len() != result.labels.len() {
            return Err(BucketingError::LengthMismatch {
                expected: result.labels.len(),
                got: hands.len(),
            });
        }
        let mut buckets = FxHashMap::with_capacity_and_hasher(hands.len(), Default::default());
        for (hand, &label) in hands.iter().zip(&result.labels) {
            buckets.insert(*hand, label);
        }
        Ok(Self {
            buckets,
            num_buckets: result.k,
        })
    }

    /// Bucket of `hand`, if it was part of the clustered population.
    ///
    /// Lookup is by exact card order as enumerated.
    pub fn get(&self, hand: &Hand) -> Option<usize> {
        self.buckets.get(hand).copied()
    }

    /// Number of buckets.
    pub fn num_buckets(&self) -> usize {
        self.num_buckets
    }

    /// Number of hands with a known bucket.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// True if the map holds no hands.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucketing::features::FEATURE_DIM;

    fn sample_board() -> Board {
        Board::from_ids(&[0, 12, 25, 38, 51]).unwrap()
    }

    fn sample_hands() -> Vec<Hand> {
        [
            [2, 3, 4, 5],
            [6, 7, 8, 9],
            [10, 11, 13, 14],
            [15, 16, 17, 18],
            [19, 20, 21, 22],
        ]
        .into_iter()
        .map(|ids| Hand::try_from_ids(ids).unwrap())
        .collect()
    }

    #[test]
    fn test_bucket_shapes() {
        let config = BucketingConfig::default().with_buckets(3).with_seed(123);
        let res = bucket_hands_on_river(&sample_board(), &sample_hands(), &config).unwrap();

        assert_eq!(res.labels.len(), 5);
        assert_eq!(res.k, 3);
        assert_eq!(res.centers.dim(), (3, FEATURE_DIM));
        assert_eq!(res.features.nrows(), 5);
        assert!(res.labels.iter().all(|&l| l < res.k));
    }

    #[test]
    fn test_k_larger_than_population() {
        let config = BucketingConfig::default().with_buckets(50);
        let res = bucket_hands_on_river(&sample_board(), &sample_hands(), &config).unwrap();
        assert_eq!(res.k, 5);
        assert_eq!(res.centers.nrows(), 5);
    }

    #[test]
    fn test_repeatable() {
        let board = sample_board();
        let hands = Hand::enumerate_excluding(&board)
            .into_iter()
            .step_by(997)
            .collect::<Vec<_>>();
        let config = BucketingConfig::default().with_buckets(8).with_iterations(20).with_seed(5);

        let a = bucket_hands_on_river(&board, &hands, &config).unwrap();
        let b = bucket_hands_on_river(&board, &hands, &config).unwrap();
        assert_eq!(a, b);

        let c = bucket_hands_on_river(&board, &hands, &config.clone().with_parallel(false)).unwrap();
        assert_eq!(a.labels, c.labels);
        assert_eq!(a.centers, c.centers);
    }

    #[test]
    fn test_empty_population() {
        let config = BucketingConfig::default();
        assert_eq!(
            bucket_hands_on_river(&sample_board(), &[], &config),
            Err(BucketingError::EmptyPopulation)
        );
    }

    #[test]
    fn test_bucket_range_aggregates_weights() {
        let config = BucketingConfig::default().with_buckets(2).with_seed(1);
        let res = bucket_hands_on_river(&sample_board(), &sample_hands(), &config).unwrap();

        let range = res.bucket_range(&[1.0; 5]).unwrap();
        assert_eq!(range.len(), res.k);
        assert_eq!(range.iter().sum::<f32>(), 5.0);
        let sizes: Vec<f32> = res.cluster_sizes().into_iter().map(|s| s as f32).collect();
        assert_eq!(range, sizes);

        assert_eq!(
            res.bucket_range(&[1.0; 3]),
            Err(BucketingError::LengthMismatch { expected: 5, got: 3 })
        );
    }

    #[test]
    #[should_panic]
    fn test_label_outside_k_panics() {
        let res = BucketResult {
            labels: vec![0, 2],
            centers: Array2::zeros((2, FEATURE_DIM)),
            k: 2,
            features: Array2::zeros((2, FEATURE_DIM)),
            rounds: 0,
        };
        res.cluster_sizes();
    }

    #[test]
    fn test_bucket_map_lookup() {
        let hands = sample_hands();
        let config = BucketingConfig::default().with_buckets(2);
        let res = bucket_hands_on_river(&sample_board(), &hands, &config).unwrap();
        let map = BucketMap::new(&hands, &res).unwrap();

        assert_eq!(map.len(), 5);
        assert_eq!(map.num_buckets(), res.k);
        for (i, hand) in hands.iter().enumerate() {
            assert_eq!(map.get(hand), res.bucket_of(i));
        }
        assert_eq!(hand_to_bucket_map(&res.labels), res.labels);
        assert!(map.get(&Hand::try_from_ids([40, 41, 42, 43]).unwrap()).is_none());
    }
}
