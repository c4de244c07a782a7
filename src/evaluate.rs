//! Scores saved artifacts against a labelled dataset.
//!
//! Every row goes through the same reconciliation path as a live prediction,
//! so the figures reflect what `predict` would return.

use crate::artifact::ArtifactPair;
use crate::dataset::{crop_labels, Table, WATER_NEED_COLUMN};
use crate::error::{EvaluateError, SchemaError};
use crate::metrics::Metrics;
use crate::predictor::decode_label;
use crate::reconcile::{reconcile, rows_to_matrix};

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    pub n_rows: usize,
    /// Share of rows whose crop was predicted exactly, in `[0, 1]`.
    pub crop_accuracy: f64,
    pub water_mae: f64,
}

pub fn evaluate(pair: &ArtifactPair, table: &Table) -> Result<EvaluationReport, EvaluateError> {
    if table.is_empty() {
        return Err(SchemaError::Empty.into());
    }
    let truth_crop = crop_labels(table)?;
    let truth_water = table
        .required_f64(WATER_NEED_COLUMN)
        .ok_or(SchemaError::MissingWaterNeed)??;

    let rows = (0..table.n_rows())
        .filter_map(|i| table.record(i))
        .map(|record| reconcile(pair.features(), &record))
        .collect::<Vec<_>>();
    let x = rows_to_matrix(&rows)?;

    let raw_crop = pair.crop().pipeline().predict(&x)?;
    let predicted_crop = raw_crop
        .into_iter()
        .map(|raw| decode_label(pair.crop().label_encoder(), raw))
        .collect::<Result<Vec<_>, _>>()?;
    let predicted_water = pair.water().pipeline().predict(&x)?;

    let report = EvaluationReport {
        n_rows: rows.len(),
        crop_accuracy: Metrics::accuracy(&truth_crop, &predicted_crop),
        water_mae: Metrics::mae(&truth_water, &predicted_water),
    };
    log::info!(
        "evaluated {} rows: accuracy {:.4}, water MAE {:.4}",
        report.n_rows,
        report.crop_accuracy,
        report.water_mae
    );
    Ok(report)
}
