//! Observation tables: row ids plus named numeric feature columns.
//!
//! Every subset handed around by the tree builder is derived by id
//! membership, so a table can be reordered or filtered by a collaborator
//! without losing track of which rows it holds.

use crate::error::{DivclustError, Result};
use crate::primitives::Matrix;
use std::collections::HashSet;

/// An ordered table of observations keyed by a unique string id.
///
/// # Examples
///
/// ```
/// use divclust::data::ObservationTable;
/// use divclust::primitives::Matrix;
///
/// let features = Matrix::from_vec(3, 2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
/// let table = ObservationTable::new(
///     vec!["a".into(), "b".into(), "c".into()],
///     vec!["x".into(), "y".into()],
///     features,
/// ).expect("valid table");
/// assert_eq!(table.n_rows(), 3);
/// assert_eq!(table.n_features(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationTable {
    ids: Vec<String>,
    feature_names: Vec<String>,
    features: Matrix<f64>,
}

impl ObservationTable {
    /// Creates a table from ids, feature names and a feature matrix.
    ///
    /// # Errors
    ///
    /// Returns an error if lengths disagree, if ids or names are duplicated
    /// or empty, or if any feature value is not finite.
    pub fn new(ids: Vec<String>, feature_names: Vec<String>, features: Matrix<f64>) -> Result<Self> {
        let (n_rows, n_cols) = features.shape();
        if ids.len() != n_rows {
            return Err(DivclustError::DimensionMismatch {
                expected: format!("{} ids", n_rows),
                actual: format!("{} ids", ids.len()),
            });
        }
        if feature_names.len() != n_cols {
            return Err(DivclustError::DimensionMismatch {
                expected: format!("{n_cols} feature names"),
                actual: format!("{} feature names", feature_names.len()),
            });
        }

        let mut seen = HashSet::with_capacity(ids.len());
        for id in &ids {
            if !seen.insert(id.as_str()) {
                return Err(DivclustError::invalid_input(format!("duplicate row id '{id}'")));
            }
        }

        let mut names = HashSet::with_capacity(feature_names.len());
        for name in &feature_names {
            if name.is_empty() {
                return Err(DivclustError::invalid_input("feature names cannot be empty"));
            }
            if !names.insert(name.as_str()) {
                return Err(DivclustError::invalid_input(format!(
                    "duplicate feature name '{name}'"
                )));
            }
        }

        if !features.is_finite() {
            return Err(DivclustError::invalid_input("feature values must be finite"));
        }

        Ok(Self {
            ids,
            feature_names,
            features,
        })
    }

    /// Creates a table with generated feature names `x0, x1, ...`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`ObservationTable::new`].
    pub fn from_matrix(ids: Vec<String>, features: Matrix<f64>) -> Result<Self> {
        let names = (0..features.n_cols()).map(|j| format!("x{j}")).collect();
        Self::new(ids, names, features)
    }

    /// Returns the shape as (`n_rows`, `n_features`).
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        self.features.shape()
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.ids.len()
    }

    /// Returns the number of feature columns.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Returns true if the table holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Row ids in table order.
    #[must_use]
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Feature column names in column order.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Feature matrix (one row per id).
    #[must_use]
    pub fn features(&self) -> &Matrix<f64> {
        &self.features
    }

    /// Boolean mask over rows: `true` where the row id is in `members`.
    #[must_use]
    pub fn mask_ids(&self, members: &HashSet<&str>) -> Vec<bool> {
        self.ids.iter().map(|id| members.contains(id.as_str())).collect()
    }

    /// Returns the rows whose id is in `members`, keeping this table's row order.
    #[must_use]
    pub fn select_ids(&self, members: &HashSet<&str>) -> Self {
        let indices: Vec<usize> = self
            .mask_ids(members)
            .into_iter()
            .enumerate()
            .filter_map(|(i, keep)| keep.then_some(i))
            .collect();
        self.select_positions(&indices)
    }

    /// Returns the rows at the given positions, in the given order.
    ///
    /// # Panics
    ///
    /// Panics if a position is out of bounds.
    #[must_use]
    pub fn select_positions(&self, indices: &[usize]) -> Self {
        Self {
            ids: indices.iter().map(|&i| self.ids[i].clone()).collect(),
            feature_names: self.feature_names.clone(),
            features: self.features.select_rows(indices),
        }
    }

    /// Same ids and names with a replacement feature matrix of identical shape.
    ///
    /// # Errors
    ///
    /// Returns an error if the shape differs.
    pub fn with_features(&self, features: Matrix<f64>) -> Result<Self> {
        if features.shape() != self.features.shape() {
            return Err(DivclustError::DimensionMismatch {
                expected: format!("{}x{}", self.n_rows(), self.n_features()),
                actual: format!("{}x{}", features.n_rows(), features.n_cols()),
            });
        }
        Ok(Self {
            ids: self.ids.clone(),
            feature_names: self.feature_names.clone(),
            features,
        })
    }
}
