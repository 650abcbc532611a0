use crate::{
    error::{AppError, AppResult},
    models::{IdIndex, SimilarityMatrix},
};

use super::features::FeatureMatrix;

/// Pairwise cosine similarity between every pair of feature rows.
///
/// Self-similarity is always 1.0. A zero feature row has similarity 0.0
/// to every other row. Values are clamped to [0, 1] and the result is
/// symmetric by construction: only the upper triangle is computed.
pub fn cosine_pairwise(features: &FeatureMatrix, labels: IdIndex) -> AppResult<SimilarityMatrix> {
    if labels.len() != features.rows() {
        return Err(AppError::FeatureBuild(format!(
            "{} labels for {} feature rows",
            labels.len(),
            features.rows()
        )));
    }

    let n = features.rows();
    let norms: Vec<f64> = (0..n)
        .map(|i| features.row(i).iter().map(|v| v * v).sum::<f64>().sqrt())
        .collect();

    let mut values = vec![0.0; n * n];
    for i in 0..n {
        values[i * n + i] = 1.0;
        if norms[i] == 0.0 {
            continue;
        }
        for j in (i + 1)..n {
            if norms[j] == 0.0 {
                continue;
            }
            let dot: f64 = features
                .row(i)
                .iter()
                .zip(features.row(j))
                .map(|(a, b)| a * b)
                .sum();
            let similarity = (dot / (norms[i] * norms[j])).clamp(0.0, 1.0);
            values[i * n + j] = similarity;
            values[j * n + i] = similarity;
        }
    }

    Ok(SimilarityMatrix::from_parts(labels, values))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: &[&[f64]]) -> FeatureMatrix {
        let cols = rows.first().map_or(0, |r| r.len());
        let mut m = FeatureMatrix::zeros(rows.len(), cols);
        for (i, row) in rows.iter().enumerate() {
            m.row_mut(i).copy_from_slice(row);
        }
        m
    }

    fn labels(n: i64) -> IdIndex {
        (1..=n).collect()
    }

    #[test]
    fn test_matrix_properties() {
        let features = matrix(&[&[1.0, 0.0, 2.0], &[0.5, 0.5, 0.0], &[3.0, 0.1, 1.0], &[0.0, 0.0, 0.0]]);
        let sim = cosine_pairwise(&features, labels(4)).unwrap();

        for i in 1..=4 {
            assert_eq!(sim.get(i, i), Some(1.0));
            for j in 1..=4 {
                let v = sim.get(i, j).unwrap();
                assert_eq!(v, sim.get(j, i).unwrap());
                assert!((0.0..=1.0).contains(&v));
            }
        }
    }

    #[test]
    fn test_parallel_vectors_fully_similar() {
        let features = matrix(&[&[1.0, 2.0], &[2.0, 4.0], &[2.0, -1.0]]);
        let sim = cosine_pairwise(&features, labels(3)).unwrap();
        assert!((sim.get(1, 2).unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(sim.get(1, 3), Some(0.0));
    }

    #[test]
    fn test_zero_vectors_only_match_themselves() {
        let features = matrix(&[&[0.0, 0.0], &[0.0, 0.0], &[1.0, 0.0]]);
        let sim = cosine_pairwise(&features, labels(3)).unwrap();
        assert_eq!(sim.get(1, 1), Some(1.0));
        assert_eq!(sim.get(1, 2), Some(0.0));
        assert_eq!(sim.get(1, 3), Some(0.0));
    }

    #[test]
    fn test_label_count_mismatch() {
        let features = matrix(&[&[1.0]]);
        let result = cosine_pairwise(&features, labels(2));
        assert!(matches!(result, Err(AppError::FeatureBuild(_))));
    }
}
