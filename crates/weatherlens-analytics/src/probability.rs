//! Inverse-distance season probabilities.
//!
//! Each centroid's weight is `1 / |predicted - centroid.temp|` and the
//! probabilities are the normalised weights. Centroids sitting exactly on the
//! predicted temperature take all of the probability between them.
//!
//! Weights are taken relative to the nearest centroid (`d_min / d`), which
//! keeps them in `(0, 1]` for subnormal distances and distances too large to
//! represent.

use std::collections::BTreeMap;

use serde::Serialize;
use weatherlens_client::Centroid;

use crate::error::ProbabilityError;

/// Distance and probability per cluster name.
///
/// Both maps always share the same key set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeasonProbabilities {
    pub distances: BTreeMap<String, f64>,
    pub probabilities: BTreeMap<String, f64>,
}

impl SeasonProbabilities {
    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Cluster with the highest probability, first by name on ties
    pub fn most_likely(&self) -> Option<(&str, f64)> {
        self.probabilities
            .iter()
            .fold(None, |best: Option<(&str, f64)>, (name, &p)| match best {
                Some((_, bp)) if bp >= p => best,
                _ => Some((name.as_str(), p)),
            })
    }
}

/// Compute distances and probabilities, rejecting degenerate input.
pub fn try_season_probabilities(
    centroids: &[Centroid],
    predicted_temp: f64,
) -> Result<SeasonProbabilities, ProbabilityError> {
    if centroids.is_empty() {
        return Err(ProbabilityError::NoCentroids);
    }
    if !predicted_temp.is_finite() {
        return Err(ProbabilityError::NonFiniteTemperature(predicted_temp));
    }

    // Later centroids with a repeated name replace earlier ones.
    let mut distances = BTreeMap::new();
    let mut half_distances = BTreeMap::new();
    for centroid in centroids {
        if !centroid.temp.is_finite() {
            return Err(ProbabilityError::NonFiniteCentroid {
                cluster: centroid.cluster_name.clone(),
            });
        }
        distances.insert(
            centroid.cluster_name.clone(),
            (predicted_temp - centroid.temp).abs(),
        );
        half_distances.insert(
            centroid.cluster_name.clone(),
            (predicted_temp / 2.0 - centroid.temp / 2.0).abs(),
        );
    }

    let exact = distances.values().filter(|&&d| d == 0.0).count();
    let probabilities = if exact > 0 {
        let share = 1.0 / exact as f64;
        distances
            .iter()
            .map(|(name, &d)| (name.clone(), if d == 0.0 { share } else { 0.0 }))
            .collect()
    } else {
        let weights = if distances.values().any(|d| d.is_finite()) {
            // An overflowed distance gets weight 0 here.
            relative_weights(&distances)
        } else {
            // Every distance overflowed; halves are finite and keep the ratios.
            relative_weights(&half_distances)
        };
        let total: f64 = weights.values().sum();
        weights
            .into_iter()
            .map(|(name, w)| (name, w / total))
            .collect()
    };

    Ok(SeasonProbabilities {
        distances,
        probabilities,
    })
}

/// `d_min / d` per cluster. All distances must be positive.
fn relative_weights(distances: &BTreeMap<String, f64>) -> BTreeMap<String, f64> {
    let nearest = distances.values().copied().fold(f64::INFINITY, f64::min);
    distances
        .iter()
        .map(|(name, &d)| (name.clone(), nearest / d))
        .collect()
}

/// Like [`try_season_probabilities`], but degenerate input yields empty maps.
pub fn season_probabilities(centroids: &[Centroid], predicted_temp: f64) -> SeasonProbabilities {
    try_season_probabilities(centroids, predicted_temp).unwrap_or_else(|e| {
        tracing::warn!("Season probabilities unavailable: {}", e);
        SeasonProbabilities::default()
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn centroids(temps: &[f64]) -> Vec<Centroid> {
        temps
            .iter()
            .enumerate()
            .map(|(i, &t)| Centroid::new(format!("cluster_{}", i), t))
            .collect()
    }

    fn sum(result: &SeasonProbabilities) -> f64 {
        result.probabilities.values().sum()
    }

    #[test]
    fn test_equidistant_split_evenly() {
        let result = try_season_probabilities(&centroids(&[10.0, 20.0]), 15.0).unwrap();

        assert_eq!(result.distances["cluster_0"], 5.0);
        assert_eq!(result.distances["cluster_1"], 5.0);
        assert_eq!(result.probabilities["cluster_0"], 0.5);
        assert_eq!(result.probabilities["cluster_1"], 0.5);
    }

    #[test]
    fn test_zero_distance_takes_everything() {
        let result = try_season_probabilities(&centroids(&[0.0, 10.0, 20.0]), 20.0).unwrap();

        assert_eq!(result.distances["cluster_0"], 20.0);
        assert_eq!(result.distances["cluster_1"], 10.0);
        assert_eq!(result.distances["cluster_2"], 0.0);
        assert_eq!(result.probabilities["cluster_2"], 1.0);
        assert_eq!(result.probabilities["cluster_0"], 0.0);
        assert_eq!(result.probabilities["cluster_1"], 0.0);
    }

    #[test]
    fn test_shared_zero_distance_split() {
        let cs = vec![
            Centroid::new("spring", 18.0),
            Centroid::new("autumn", 18.0),
            Centroid::new("winter", 5.0),
        ];
        let result = try_season_probabilities(&cs, 18.0).unwrap();
        assert_eq!(result.probabilities["spring"], 0.5);
        assert_eq!(result.probabilities["autumn"], 0.5);
        assert_eq!(result.probabilities["winter"], 0.0);
    }

    #[test]
    fn test_closer_centroid_more_likely() {
        let result = try_season_probabilities(&centroids(&[10.0, 20.0, 30.0]), 18.0).unwrap();

        // weights 1/8, 1/2, 1/12
        let total = 1.0 / 8.0 + 1.0 / 2.0 + 1.0 / 12.0;
        assert!((result.probabilities["cluster_1"] - 0.5 / total).abs() < 1e-12);
        assert_eq!(result.most_likely().map(|(n, _)| n), Some("cluster_1"));
    }

    #[test]
    fn test_sum_to_one() {
        let cases: &[(&[f64], f64)] = &[
            (&[12.3, 19.8, 27.1, 33.4], 21.7),
            (&[-5.0, 0.5], 100.0),
            (&[1e-6, 2e-6, 3e-6], 2.5e-6),
            (&[17.0], 3.0),
            (&[14.9, 22.2, 29.5, 18.4], -12.0),
        ];

        for (temps, predicted) in cases {
            let result = try_season_probabilities(&centroids(temps), *predicted).unwrap();
            assert!(
                (sum(&result) - 1.0).abs() < 1e-9,
                "sum for {:?} at {} was {}",
                temps,
                predicted,
                sum(&result)
            );
            assert!(result.probabilities.values().all(|&p| (0.0..=1.0).contains(&p)));
        }
    }

    #[test]
    fn test_subnormal_distance() {
        let result = try_season_probabilities(&centroids(&[0.0, 10.0]), 1e-310).unwrap();

        assert!((sum(&result) - 1.0).abs() < 1e-9);
        assert_eq!(result.probabilities["cluster_0"], 1.0);
        assert!(result.probabilities["cluster_1"] < 1e-300);
    }

    #[test]
    fn test_overflowing_distances() {
        let result =
            try_season_probabilities(&centroids(&[-1.5e308, -1.6e308]), 1.5e308).unwrap();

        assert!(result.distances.values().all(|d| d.is_infinite()));
        assert!((sum(&result) - 1.0).abs() < 1e-9);
        // 1.5e308 and 1.55e308 away once halved
        let expected = 1.0 / (1.0 + 1.5 / 1.55);
        assert!((result.probabilities["cluster_0"] - expected).abs() < 1e-9);
        assert_eq!(result.most_likely().map(|(n, _)| n), Some("cluster_0"));
    }

    #[test]
    fn test_one_overflowing_distance() {
        let result = try_season_probabilities(&centroids(&[-1.7e308, 1.0e308]), 1.7e308).unwrap();

        assert!(result.distances["cluster_0"].is_infinite());
        assert_eq!(result.probabilities["cluster_0"], 0.0);
        assert_eq!(result.probabilities["cluster_1"], 1.0);
    }

    #[test]
    fn test_keys_match() {
        let result = try_season_probabilities(&centroids(&[1.0, 2.0, 3.0, 4.0]), 2.2).unwrap();
        let distance_keys: Vec<_> = result.distances.keys().collect();
        let probability_keys: Vec<_> = result.probabilities.keys().collect();
        assert_eq!(distance_keys, probability_keys);
    }

    #[test]
    fn test_duplicate_names_keep_last() {
        let cs = vec![
            Centroid::new("cluster_0", 10.0),
            Centroid::new("cluster_0", 12.0),
            Centroid::new("cluster_1", 20.0),
        ];
        let result = try_season_probabilities(&cs, 14.0).unwrap();
        assert_eq!(result.distances.len(), 2);
        assert_eq!(result.distances["cluster_0"], 2.0);
    }

    #[test]
    fn test_empty_centroids() {
        assert_eq!(
            try_season_probabilities(&[], 12.0),
            Err(ProbabilityError::NoCentroids)
        );

        let result = season_probabilities(&[], 12.0);
        assert!(result.distances.is_empty());
        assert!(result.probabilities.is_empty());
    }

    #[test]
    fn test_non_finite_temperature() {
        let cs = centroids(&[10.0, 20.0]);
        assert!(matches!(
            try_season_probabilities(&cs, f64::NAN),
            Err(ProbabilityError::NonFiniteTemperature(_))
        ));
        assert!(season_probabilities(&cs, f64::INFINITY).is_empty());
    }

    #[test]
    fn test_non_finite_centroid() {
        let cs = vec![Centroid::new("cluster_0", f64::NAN)];
        assert_eq!(
            try_season_probabilities(&cs, 1.0),
            Err(ProbabilityError::NonFiniteCentroid {
                cluster: "cluster_0".into()
            })
        );
    }

    #[test]
    fn test_repeatable() {
        let cs = centroids(&[11.0, 16.5, 24.0, 29.0]);
        assert_eq!(
            season_probabilities(&cs, 20.25),
            season_probabilities(&cs, 20.25)
        );
    }
}
