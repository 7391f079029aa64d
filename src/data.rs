//! Samples drawn from an instantiated model
//!
//! A [`Dataset`] is the column-major sample the statistical oracle tests
//! against: named columns, each either discrete (category codes) or
//! continuous. How the sample is generated (Bayes net forward sampling,
//! SEM simulation) is a collaborator concern; this module only holds the
//! accessors the oracle needs.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One column of a dataset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Column {
    /// Category codes in `0..categories`.
    Discrete { categories: usize, values: Vec<usize> },
    /// Real-valued measurements.
    Continuous(Vec<f64>),
}

impl Column {
    /// Number of sample units in the column.
    pub fn len(&self) -> usize {
        match self {
            Column::Discrete { values, .. } => values.len(),
            Column::Continuous(values) => values.len(),
        }
    }

    /// Whether the column has no sample units.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The generative type of a dataset, as seen by the statistical oracle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleKind {
    /// All columns discrete (Bayes-net-generated).
    Discrete,
    /// All columns continuous (SEM-generated).
    Continuous,
    /// Columns of both types; no single test applies.
    Mixed,
    /// No columns at all.
    Empty,
}

/// Errors from dataset construction and lookup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DatasetError {
    /// Column length disagrees with the dataset's row count.
    #[error("column '{name}' has {got} rows, expected {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    /// A column with this name already exists.
    #[error("column '{0}' already exists in dataset")]
    DuplicateColumn(String),

    /// A discrete value is outside `0..categories`.
    #[error("column '{name}' has value {value} outside 0..{categories}")]
    ValueOutOfRange {
        name: String,
        value: usize,
        categories: usize,
    },
}

/// A column-major dataset keyed by variable name.
///
/// Reconstruction goes through [`Dataset::new`] and the `add_*` builders,
/// so only `Serialize` is derived.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Dataset {
    names: Vec<String>,
    columns: Vec<Column>,
    #[serde(skip)]
    index: FxHashMap<String, usize>,
    rows: usize,
}

impl Dataset {
    /// Create an empty dataset with a fixed number of sample units.
    pub fn new(rows: usize) -> Self {
        Dataset {
            names: Vec::new(),
            columns: Vec::new(),
            index: FxHashMap::default(),
            rows,
        }
    }

    /// Add a discrete column of category codes in `0..categories`.
    pub fn add_discrete(
        &mut self,
        name: impl Into<String>,
        categories: usize,
        values: Vec<usize>,
    ) -> Result<(), DatasetError> {
        let name = name.into();
        if let Some(&v) = values.iter().find(|&&v| v >= categories) {
            return Err(DatasetError::ValueOutOfRange {
                name,
                value: v,
                categories,
            });
        }
        self.add_column(name, Column::Discrete { categories, values })
    }

    /// Add a continuous column.
    pub fn add_continuous(
        &mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<(), DatasetError> {
        self.add_column(name.into(), Column::Continuous(values))
    }

    fn add_column(&mut self, name: String, column: Column) -> Result<(), DatasetError> {
        if self.index.contains_key(&name) {
            return Err(DatasetError::DuplicateColumn(name));
        }
        if column.len() != self.rows {
            return Err(DatasetError::LengthMismatch {
                name,
                expected: self.rows,
                got: column.len(),
            });
        }
        self.index.insert(name.clone(), self.columns.len());
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    /// Number of sample units.
    pub fn num_rows(&self) -> usize {
        self.rows
    }

    /// Number of variables.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Variable names, in insertion order.
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|n| n.as_str())
    }

    /// Look up a column by variable name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.index.get(name).map(|&i| &self.columns[i])
    }

    /// The generative type of this sample.
    pub fn kind(&self) -> SampleKind {
        let mut discrete = false;
        let mut continuous = false;
        for column in &self.columns {
            match column {
                Column::Discrete { .. } => discrete = true,
                Column::Continuous(_) => continuous = true,
            }
        }
        match (discrete, continuous) {
            (true, false) => SampleKind::Discrete,
            (false, true) => SampleKind::Continuous,
            (true, true) => SampleKind::Mixed,
            (false, false) => SampleKind::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_reflects_columns() {
        let mut data = Dataset::new(3);
        assert_eq!(data.kind(), SampleKind::Empty);

        data.add_discrete("a", 2, vec![0, 1, 0]).unwrap();
        assert_eq!(data.kind(), SampleKind::Discrete);

        data.add_continuous("b", vec![0.1, 0.2, 0.3]).unwrap();
        assert_eq!(data.kind(), SampleKind::Mixed);
    }

    #[test]
    fn length_mismatch_rejected() {
        let mut data = Dataset::new(4);
        let err = data.add_continuous("a", vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, DatasetError::LengthMismatch { .. }));
    }

    #[test]
    fn out_of_range_code_rejected() {
        let mut data = Dataset::new(2);
        let err = data.add_discrete("a", 2, vec![0, 2]).unwrap_err();
        assert!(matches!(err, DatasetError::ValueOutOfRange { .. }));
    }

    #[test]
    fn duplicate_column_rejected() {
        let mut data = Dataset::new(1);
        data.add_continuous("a", vec![1.0]).unwrap();
        let err = data.add_continuous("a", vec![2.0]).unwrap_err();
        assert_eq!(err, DatasetError::DuplicateColumn("a".to_string()));
    }

    #[test]
    fn lookup_by_name() {
        let mut data = Dataset::new(2);
        data.add_discrete("x", 3, vec![2, 1]).unwrap();
        assert!(data.column("x").is_some());
        assert!(data.column("y").is_none());
        assert_eq!(data.num_rows(), 2);
        assert_eq!(data.num_columns(), 1);
    }
}
