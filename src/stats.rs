//! Conditional-independence tests
//!
//! The two statistical oracles the laboratory evaluates independence
//! hypotheses with:
//! - [`ChiSquareTest`] — Pearson X² over conditioning strata, for discrete
//!   (Bayes-net-generated) samples
//! - [`FisherZTest`] — Fisher's z-transform of the partial correlation,
//!   for continuous (SEM-generated) samples
//!
//! Both accept an empty conditioning set transparently (it degenerates to
//! the unconditional test) and report a `(p-value, verdict)` pair; the
//! verdict is `independent` when the p-value exceeds the significance
//! level α.

use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::data::{Column, Dataset};
use crate::error::{LabError, Result};

/// Default significance level for statistical verdicts.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Result of a statistical independence test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TestResult {
    /// p-value of the null hypothesis of independence, in [0, 1].
    pub p_value: f64,
    /// Whether the test failed to reject independence at level α.
    pub independent: bool,
}

/// A conditional-independence test over a dataset.
pub trait IndependenceTest {
    /// Test X ⊥⊥ Y | Z against the sample.
    fn evaluate(&self, data: &Dataset, x: &str, y: &str, z: &[String]) -> Result<TestResult>;
}

// ============================================================================
// Chi-square (discrete)
// ============================================================================

/// Pearson chi-square test of conditional independence for discrete data.
///
/// The sample is partitioned into strata by the joint assignment of the
/// conditioning variables; X² and the degrees of freedom are summed over
/// strata. Categories with a zero marginal in a stratum do not contribute
/// degrees of freedom.
#[derive(Clone, Copy, Debug)]
pub struct ChiSquareTest {
    alpha: f64,
}

impl ChiSquareTest {
    /// Create a test at the given significance level.
    pub fn new(alpha: f64) -> Self {
        ChiSquareTest { alpha }
    }
}

impl Default for ChiSquareTest {
    fn default() -> Self {
        Self::new(DEFAULT_ALPHA)
    }
}

impl IndependenceTest for ChiSquareTest {
    fn evaluate(&self, data: &Dataset, x: &str, y: &str, z: &[String]) -> Result<TestResult> {
        let (x_card, x_values) = discrete_column(data, x)?;
        let (y_card, y_values) = discrete_column(data, y)?;
        let z_columns: Vec<&[usize]> = z
            .iter()
            .map(|name| discrete_column(data, name).map(|(_, v)| v))
            .collect::<Result<_>>()?;

        // One contingency table per conditioning-assignment stratum.
        let mut strata: FxHashMap<Vec<usize>, Vec<Vec<f64>>> = FxHashMap::default();
        for row in 0..data.num_rows() {
            let key: Vec<usize> = z_columns.iter().map(|col| col[row]).collect();
            let table = strata
                .entry(key)
                .or_insert_with(|| vec![vec![0.0; y_card]; x_card]);
            table[x_values[row]][y_values[row]] += 1.0;
        }

        let mut statistic = 0.0;
        let mut df = 0usize;
        for table in strata.values() {
            let row_totals: Vec<f64> = table.iter().map(|r| r.iter().sum()).collect();
            let col_totals: Vec<f64> = (0..y_card)
                .map(|j| table.iter().map(|r| r[j]).sum())
                .collect();
            let total: f64 = row_totals.iter().sum();
            if total == 0.0 {
                continue;
            }

            let live_rows = row_totals.iter().filter(|&&t| t > 0.0).count();
            let live_cols = col_totals.iter().filter(|&&t| t > 0.0).count();
            if live_rows < 2 || live_cols < 2 {
                continue;
            }
            df += (live_rows - 1) * (live_cols - 1);

            for (i, row) in table.iter().enumerate() {
                for (j, &observed) in row.iter().enumerate() {
                    let expected = row_totals[i] * col_totals[j] / total;
                    if expected > 0.0 {
                        statistic += (observed - expected).powi(2) / expected;
                    }
                }
            }
        }

        // No stratum carried information: independence is not rejectable.
        if df == 0 {
            return Ok(TestResult {
                p_value: 1.0,
                independent: true,
            });
        }

        let p_value = ChiSquared::new(df as f64)
            .map(|chi2| 1.0 - chi2.cdf(statistic))
            .unwrap_or(1.0);
        trace!(x, y, ?z, statistic, df, p_value, "chi-square evaluated");
        Ok(TestResult {
            p_value,
            independent: p_value > self.alpha,
        })
    }
}

fn discrete_column<'a>(data: &'a Dataset, name: &str) -> Result<(usize, &'a [usize])> {
    match data.column(name) {
        Some(Column::Discrete { categories, values }) => Ok((*categories, values)),
        Some(Column::Continuous(_)) => Err(LabError::UnsupportedSampleType(format!(
            "column '{}' is continuous but the chi-square test requires discrete data",
            name
        ))),
        None => Err(LabError::UnknownVariable(name.to_string())),
    }
}

// ============================================================================
// Fisher Z (continuous)
// ============================================================================

/// Fisher-Z test of conditional independence for continuous data.
///
/// Computes the partial correlation of X and Y given Z from the inverse of
/// their correlation matrix, then applies Fisher's z-transform with
/// n − |Z| − 3 effective degrees of freedom.
#[derive(Clone, Copy, Debug)]
pub struct FisherZTest {
    alpha: f64,
}

impl FisherZTest {
    /// Create a test at the given significance level.
    pub fn new(alpha: f64) -> Self {
        FisherZTest { alpha }
    }
}

impl Default for FisherZTest {
    fn default() -> Self {
        Self::new(DEFAULT_ALPHA)
    }
}

impl IndependenceTest for FisherZTest {
    fn evaluate(&self, data: &Dataset, x: &str, y: &str, z: &[String]) -> Result<TestResult> {
        let n = data.num_rows();
        let k = z.len();
        if n < k + 4 {
            return Err(LabError::DegenerateSample(format!(
                "{} rows cannot support a Fisher-Z test with {} conditioning variables",
                n, k
            )));
        }

        let mut columns: Vec<&[f64]> = Vec::with_capacity(k + 2);
        columns.push(continuous_column(data, x)?);
        columns.push(continuous_column(data, y)?);
        for name in z {
            columns.push(continuous_column(data, name)?);
        }

        let corr = correlation_matrix(&columns)?;
        let precision = invert(corr)?;
        let r = -precision[0][1] / (precision[0][0] * precision[1][1]).sqrt();
        let r = r.clamp(-0.999_999_9, 0.999_999_9);

        let z_stat = 0.5 * ((1.0 + r) / (1.0 - r)).ln() * ((n - k - 3) as f64).sqrt();
        let p_value = Normal::new(0.0, 1.0)
            .map(|normal| 2.0 * (1.0 - normal.cdf(z_stat.abs())))
            .unwrap_or(1.0);
        trace!(x, y, ?z, r, z_stat, p_value, "fisher-z evaluated");
        Ok(TestResult {
            p_value,
            independent: p_value > self.alpha,
        })
    }
}

fn continuous_column<'a>(data: &'a Dataset, name: &str) -> Result<&'a [f64]> {
    match data.column(name) {
        Some(Column::Continuous(values)) => Ok(values),
        Some(Column::Discrete { .. }) => Err(LabError::UnsupportedSampleType(format!(
            "column '{}' is discrete but the Fisher-Z test requires continuous data",
            name
        ))),
        None => Err(LabError::UnknownVariable(name.to_string())),
    }
}

/// Pearson correlation matrix of the given columns.
fn correlation_matrix(columns: &[&[f64]]) -> Result<Vec<Vec<f64>>> {
    let n = columns[0].len() as f64;
    let means: Vec<f64> = columns.iter().map(|c| c.iter().sum::<f64>() / n).collect();
    let m = columns.len();

    let mut cov = vec![vec![0.0; m]; m];
    for i in 0..m {
        for j in i..m {
            let s: f64 = columns[i]
                .iter()
                .zip(columns[j])
                .map(|(a, b)| (a - means[i]) * (b - means[j]))
                .sum();
            cov[i][j] = s / n;
            cov[j][i] = cov[i][j];
        }
    }

    let mut corr = vec![vec![0.0; m]; m];
    for i in 0..m {
        if cov[i][i] <= 0.0 {
            return Err(LabError::DegenerateSample(format!(
                "column {} has zero variance",
                i
            )));
        }
        for j in 0..m {
            corr[i][j] = cov[i][j] / (cov[i][i] * cov[j][j]).sqrt();
        }
    }
    Ok(corr)
}

/// Gauss-Jordan inverse; fails on an effectively singular matrix.
fn invert(mut m: Vec<Vec<f64>>) -> Result<Vec<Vec<f64>>> {
    let size = m.len();
    let mut inv = vec![vec![0.0; size]; size];
    for (i, row) in inv.iter_mut().enumerate() {
        row[i] = 1.0;
    }

    for col in 0..size {
        // Partial pivoting.
        let pivot_row = (col..size)
            .max_by(|&a, &b| m[a][col].abs().total_cmp(&m[b][col].abs()))
            .unwrap_or(col);
        if m[pivot_row][col].abs() < 1e-12 {
            return Err(LabError::DegenerateSample(
                "correlation matrix is singular".to_string(),
            ));
        }
        m.swap(col, pivot_row);
        inv.swap(col, pivot_row);

        let pivot = m[col][col];
        for j in 0..size {
            m[col][j] /= pivot;
            inv[col][j] /= pivot;
        }
        for row in 0..size {
            if row != col {
                let factor = m[row][col];
                for j in 0..size {
                    m[row][j] -= factor * m[col][j];
                    inv[row][j] -= factor * inv[col][j];
                }
            }
        }
    }
    Ok(inv)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discrete_pair(x: Vec<usize>, y: Vec<usize>) -> Dataset {
        let mut data = Dataset::new(x.len());
        data.add_discrete("x", 2, x).unwrap();
        data.add_discrete("y", 2, y).unwrap();
        data
    }

    #[test]
    fn chi_square_detects_perfect_dependence() {
        let x: Vec<usize> = (0..40).map(|i| i % 2).collect();
        let data = discrete_pair(x.clone(), x);
        let result = ChiSquareTest::default()
            .evaluate(&data, "x", "y", &[])
            .unwrap();
        assert!(!result.independent);
        assert!(result.p_value < 0.001);
    }

    #[test]
    fn chi_square_accepts_balanced_independence() {
        // Ten observations in each of the four cells.
        let x: Vec<usize> = (0..40).map(|i| i / 20).collect();
        let y: Vec<usize> = (0..40).map(|i| (i / 10) % 2).collect();
        let data = discrete_pair(x, y);
        let result = ChiSquareTest::default()
            .evaluate(&data, "x", "y", &[])
            .unwrap();
        assert!(result.independent);
        assert_eq!(result.p_value, 1.0);
    }

    #[test]
    fn chi_square_conditioning_screens_off_common_cause() {
        // x and y are both copies of z: dependent marginally, but constant
        // within each stratum of z.
        let z: Vec<usize> = (0..40).map(|i| i % 2).collect();
        let mut data = Dataset::new(40);
        data.add_discrete("x", 2, z.clone()).unwrap();
        data.add_discrete("y", 2, z.clone()).unwrap();
        data.add_discrete("z", 2, z).unwrap();

        let test = ChiSquareTest::default();
        let marginal = test.evaluate(&data, "x", "y", &[]).unwrap();
        assert!(!marginal.independent);

        let conditional = test
            .evaluate(&data, "x", "y", &["z".to_string()])
            .unwrap();
        assert!(conditional.independent);
        assert_eq!(conditional.p_value, 1.0);
    }

    #[test]
    fn chi_square_rejects_continuous_column() {
        let mut data = Dataset::new(3);
        data.add_discrete("x", 2, vec![0, 1, 0]).unwrap();
        data.add_continuous("y", vec![0.0, 1.0, 2.0]).unwrap();
        let err = ChiSquareTest::default()
            .evaluate(&data, "x", "y", &[])
            .unwrap_err();
        assert!(matches!(err, LabError::UnsupportedSampleType(_)));
    }

    #[test]
    fn fisher_z_detects_linear_dependence() {
        let x: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 1.0).collect();
        let mut data = Dataset::new(30);
        data.add_continuous("x", x).unwrap();
        data.add_continuous("y", y).unwrap();

        let result = FisherZTest::default()
            .evaluate(&data, "x", "y", &[])
            .unwrap();
        assert!(!result.independent);
        assert!(result.p_value < 1e-6);
    }

    #[test]
    fn fisher_z_accepts_orthogonal_series() {
        // An alternating series is nearly uncorrelated with a linear trend.
        let x: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let y: Vec<f64> = (0..30).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let mut data = Dataset::new(30);
        data.add_continuous("x", x).unwrap();
        data.add_continuous("y", y).unwrap();

        let result = FisherZTest::default()
            .evaluate(&data, "x", "y", &[])
            .unwrap();
        assert!(result.independent);
        assert!(result.p_value > 0.5);
    }

    #[test]
    fn fisher_z_conditioning_screens_off_mediator() {
        // x -> z -> y with block-orthogonal disturbances: the partial
        // correlation of x and y given z is exactly zero by construction.
        let e1 = [1.0, -1.0, -1.0, 1.0];
        let e2 = [1.0, -3.0, 3.0, -1.0];
        let n = 32;
        let x: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let z: Vec<f64> = (0..n).map(|i| i as f64 + e1[i % 4]).collect();
        let y: Vec<f64> = (0..n).map(|i| z[i] + e2[i % 4]).collect();

        let mut data = Dataset::new(n);
        data.add_continuous("x", x).unwrap();
        data.add_continuous("y", y).unwrap();
        data.add_continuous("z", z).unwrap();

        let test = FisherZTest::default();
        let marginal = test.evaluate(&data, "x", "y", &[]).unwrap();
        assert!(!marginal.independent);

        let conditional = test
            .evaluate(&data, "x", "y", &["z".to_string()])
            .unwrap();
        assert!(conditional.independent);
        assert!(conditional.p_value > 0.9);
    }

    #[test]
    fn fisher_z_needs_enough_rows() {
        let mut data = Dataset::new(4);
        data.add_continuous("x", vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        data.add_continuous("y", vec![4.0, 3.0, 2.0, 1.0]).unwrap();
        data.add_continuous("z", vec![1.0, 1.0, 2.0, 2.0]).unwrap();

        let err = FisherZTest::default()
            .evaluate(&data, "x", "y", &["z".to_string()])
            .unwrap_err();
        assert!(matches!(err, LabError::DegenerateSample(_)));
    }

    #[test]
    fn unknown_column_is_reported() {
        let data = Dataset::new(0);
        let err = ChiSquareTest::default()
            .evaluate(&data, "x", "y", &[])
            .unwrap_err();
        assert_eq!(err, LabError::UnknownVariable("x".to_string()));
    }

    #[test]
    fn invert_recovers_identity() {
        let m = vec![vec![2.0, 0.0], vec![0.0, 4.0]];
        let inv = invert(m).unwrap();
        assert!((inv[0][0] - 0.5).abs() < 1e-12);
        assert!((inv[1][1] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn invert_rejects_singular() {
        let m = vec![vec![1.0, 1.0], vec![1.0, 1.0]];
        assert!(matches!(
            invert(m),
            Err(LabError::DegenerateSample(_))
        ));
    }
}
