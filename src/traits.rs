//! Core traits for clustering estimators and transformers.
//!
//! These traits define the API contracts shared by every algorithm in the crate.

use crate::error::Result;
use crate::primitives::Matrix;

/// Trait for unsupervised learning models.
///
/// # Examples
///
/// ```
/// use divclust::prelude::*;
///
/// // Two clear clusters
/// let data = Matrix::from_vec(6, 2, vec![
///     0.0, 0.0, 0.1, 0.1, 0.2, 0.0,
///     10.0, 10.0, 10.1, 10.1, 10.0, 10.2,
/// ]).unwrap();
///
/// let mut kmedoids = KMedoids::new(2).with_random_state(42);
/// kmedoids.fit(&data).unwrap();
/// let labels = kmedoids.predict(&data);
/// assert_eq!(labels.len(), 6);
/// ```
pub trait UnsupervisedEstimator {
    /// The type of labels/clusters produced.
    type Labels;

    /// Fits the model to data.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting fails (empty data, invalid parameters, etc.).
    fn fit(&mut self, x: &Matrix<f64>) -> Result<()>;

    /// Predicts cluster assignments.
    fn predict(&self, x: &Matrix<f64>) -> Self::Labels;
}

/// Trait for data transformers (scalers).
///
/// ```text
/// let mut scaler = StandardScaler::new();
/// let x_scaled = scaler.fit_transform(&x)?;
/// let x_test_scaled = scaler.transform(&x_test)?;
/// ```
pub trait Transformer {
    /// Fits the transformer to data.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting fails.
    fn fit(&mut self, x: &Matrix<f64>) -> Result<()>;

    /// Transforms data using fitted parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if transformer is not fitted.
    fn transform(&self, x: &Matrix<f64>) -> Result<Matrix<f64>>;

    /// Fits and transforms in one step.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting fails.
    fn fit_transform(&mut self, x: &Matrix<f64>) -> Result<Matrix<f64>> {
        self.fit(x)?;
        self.transform(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DivclustError;

    // Mock transformer to test trait default methods
    struct MockTransformer {
        fitted: bool,
        scale: f64,
    }

    impl Transformer for MockTransformer {
        fn fit(&mut self, x: &Matrix<f64>) -> Result<()> {
            if x.n_rows() == 0 {
                return Err(DivclustError::invalid_input("empty"));
            }
            self.fitted = true;
            self.scale = 2.0;
            Ok(())
        }

        fn transform(&self, x: &Matrix<f64>) -> Result<Matrix<f64>> {
            if !self.fitted {
                return Err("not fitted".into());
            }
            Ok(x.mul_scalar(self.scale))
        }
    }

    #[test]
    fn test_fit_transform_default_fits_first() {
        let mut t = MockTransformer {
            fitted: false,
            scale: 1.0,
        };
        let x = Matrix::from_vec(1, 2, vec![1.0, 2.0]).expect("valid");
        let out = t.fit_transform(&x).expect("fit_transform succeeds");
        assert_eq!(out.as_slice(), &[2.0, 4.0]);
    }

    #[test]
    fn test_fit_transform_propagates_fit_error() {
        let mut t = MockTransformer {
            fitted: false,
            scale: 1.0,
        };
        let x = Matrix::zeros(0, 2);
        assert!(t.fit_transform(&x).is_err());
        assert!(!t.fitted);
    }
}
