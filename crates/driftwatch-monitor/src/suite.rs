//! The drift suite: feature drift and label drift in one pass over two
//! comparison tables.

use tracing::debug;

use driftwatch_core::config::DriftConfig;

use crate::comparison::{ColumnMapping, ComparisonTable};
use crate::report::{ColumnDrift, ColumnType, DatasetDriftResult, Metric, TargetDriftResult};
use crate::stattest::{StatTest, chi_square, ks_two_sample};

/// Run every metric of the suite. The `DataDrift` metric comes first.
pub fn run_suite(
    reference: &ComparisonTable,
    current: &ComparisonTable,
    mapping: &ColumnMapping,
    settings: &DriftConfig,
) -> Vec<Metric> {
    vec![
        Metric::DataDrift(dataset_drift(reference, current, mapping, settings)),
        Metric::TargetDrift(target_drift(reference, current, mapping, settings)),
    ]
}

/// K-S test per numerical feature, then the dataset-level share rule.
pub fn dataset_drift(
    reference: &ComparisonTable,
    current: &ComparisonTable,
    mapping: &ColumnMapping,
    settings: &DriftConfig,
) -> DatasetDriftResult {
    let threshold = settings.stattest_threshold;
    let columns: Vec<ColumnDrift> = mapping
        .numerical_features
        .iter()
        .filter_map(|name| {
            let ref_values = reference.column(name)?;
            let cur_values = current.column(name)?;
            let outcome = ks_two_sample(ref_values, cur_values);
            debug!(
                column = %name,
                statistic = outcome.statistic,
                p_value = outcome.p_value,
                "feature drift test"
            );
            Some(ColumnDrift {
                column: name.clone(),
                column_type: ColumnType::Numerical,
                stattest: StatTest::KolmogorovSmirnov,
                statistic: outcome.statistic,
                p_value: outcome.p_value,
                threshold,
                drift_detected: outcome.drifted(threshold),
            })
        })
        .collect();

    let number_of_columns = columns.len();
    let number_of_drifted_columns = columns.iter().filter(|c| c.drift_detected).count();
    let share_of_drifted_columns = if number_of_columns == 0 {
        0.0
    } else {
        number_of_drifted_columns as f64 / number_of_columns as f64
    };

    DatasetDriftResult {
        dataset_drift: number_of_columns > 0 && share_of_drifted_columns >= settings.drift_share,
        drift_share: settings.drift_share,
        number_of_columns,
        number_of_drifted_columns,
        share_of_drifted_columns,
        columns,
    }
}

/// Chi-square on the target and prediction columns.
pub fn target_drift(
    reference: &ComparisonTable,
    current: &ComparisonTable,
    mapping: &ColumnMapping,
    settings: &DriftConfig,
) -> TargetDriftResult {
    let threshold = settings.stattest_threshold;
    let label_drift = |name: &str, ref_labels: &[u32], cur_labels: &[u32]| {
        let outcome = chi_square(ref_labels, cur_labels);
        ColumnDrift {
            column: name.to_string(),
            column_type: ColumnType::Categorical,
            stattest: StatTest::ChiSquare,
            statistic: outcome.statistic,
            p_value: outcome.p_value,
            threshold,
            drift_detected: outcome.drifted(threshold),
        }
    };

    TargetDriftResult {
        target: label_drift(&mapping.target, &reference.target, &current.target),
        prediction: label_drift(
            &mapping.prediction,
            &reference.prediction,
            &current.prediction,
        ),
    }
}
