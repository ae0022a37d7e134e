//! Statistical tests used by the drift suite.
//!
//! - Numerical columns: two-sample Kolmogorov-Smirnov.
//! - Categorical columns (class labels): chi-square goodness of fit of the
//!   current class counts against the reference class proportions.
//!
//! Both return a p-value; a column drifts when `p < threshold`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Which test produced a column result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatTest {
    KolmogorovSmirnov,
    ChiSquare,
}

impl StatTest {
    pub fn name(&self) -> &'static str {
        match self {
            StatTest::KolmogorovSmirnov => "K-S p_value",
            StatTest::ChiSquare => "chi-square p_value",
        }
    }
}

/// Outcome of one test on one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestOutcome {
    pub statistic: f64,
    pub p_value: f64,
}

impl TestOutcome {
    pub fn drifted(&self, threshold: f64) -> bool {
        self.p_value < threshold
    }
}

/// Two-sample Kolmogorov-Smirnov test.
///
/// D is the largest gap between the two empirical CDFs. Tied values are
/// consumed together on both sides so identical samples give D = 0.
/// NaN values carry no ordering and are dropped from both samples.
pub fn ks_two_sample(reference: &[f64], current: &[f64]) -> TestOutcome {
    let mut a: Vec<f64> = reference.iter().copied().filter(|v| !v.is_nan()).collect();
    let mut b: Vec<f64> = current.iter().copied().filter(|v| !v.is_nan()).collect();
    if a.is_empty() || b.is_empty() {
        return TestOutcome {
            statistic: 0.0,
            p_value: 1.0,
        };
    }

    a.sort_by(f64::total_cmp);
    b.sort_by(f64::total_cmp);

    let n = a.len() as f64;
    let m = b.len() as f64;
    let (mut i, mut j) = (0usize, 0usize);
    let mut d_max = 0.0f64;

    while i < a.len() && j < b.len() {
        let x = a[i].min(b[j]);
        while i < a.len() && a[i] <= x {
            i += 1;
        }
        while j < b.len() && b[j] <= x {
            j += 1;
        }
        d_max = d_max.max((i as f64 / n - j as f64 / m).abs());
    }

    let n_eff = n * m / (n + m);
    let sqrt_n = n_eff.sqrt();
    // Stephens' small-sample correction.
    let lambda = (sqrt_n + 0.12 + 0.11 / sqrt_n) * d_max;

    TestOutcome {
        statistic: d_max,
        p_value: ks_p_value(lambda),
    }
}

/// Survival function of the Kolmogorov distribution.
///
/// P(K > λ) = 2 Σ_{k≥1} (-1)^{k+1} exp(-2 k² λ²)
pub fn ks_p_value(lambda: f64) -> f64 {
    // The series converges too slowly near zero; the limit there is 1.
    if lambda < 0.2 {
        return 1.0;
    }
    let mut p = 0.0;
    for k in 1..=100 {
        let sign = if k % 2 == 1 { 1.0 } else { -1.0 };
        let term = sign * (-2.0 * f64::from(k).powi(2) * lambda.powi(2)).exp();
        p += term;
        if term.abs() < 1e-12 {
            break;
        }
    }
    (2.0 * p).clamp(0.0, 1.0)
}

/// Chi-square goodness of fit of `current` class counts against the class
/// proportions observed in `reference`.
///
/// A class present in `current` but never seen in `reference` cannot have
/// an expected count; it is treated as certain drift (p = 0).
pub fn chi_square(reference: &[u32], current: &[u32]) -> TestOutcome {
    if reference.is_empty() || current.is_empty() {
        return TestOutcome {
            statistic: 0.0,
            p_value: 1.0,
        };
    }

    let ref_counts = class_counts(reference);
    let cur_counts = class_counts(current);

    if cur_counts.keys().any(|class| !ref_counts.contains_key(class)) {
        return TestOutcome {
            statistic: f64::MAX,
            p_value: 0.0,
        };
    }

    let total_ref = reference.len() as f64;
    let total_cur = current.len() as f64;

    let mut statistic = 0.0;
    for (class, &ref_count) in &ref_counts {
        let expected = ref_count as f64 / total_ref * total_cur;
        let observed = cur_counts.get(class).copied().unwrap_or(0) as f64;
        statistic += (observed - expected).powi(2) / expected;
    }

    let df = ref_counts.len().saturating_sub(1);
    let p_value = if df == 0 {
        1.0
    } else {
        ChiSquared::new(df as f64).map_or(1.0, |dist| dist.sf(statistic))
    };

    TestOutcome { statistic, p_value }
}

fn class_counts(labels: &[u32]) -> BTreeMap<u32, usize> {
    let mut counts = BTreeMap::new();
    for &label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }
    counts
}
