//! Training-side dataset adapter.
//!
//! Discovers a CSV dataset, decides which column convention it follows
//! ([`SchemaKind`]), and turns it into a feature matrix plus the crop and
//! water-need targets. When the table has no observed `water_need`, the target
//! is synthesized from rainfall (or, failing that, humidity) by inverse
//! min-max normalization into `[0.1, 1.0]`.

use ndarray::Array2;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::DATASET_CANDIDATES;
use crate::error::SchemaError;

pub mod split;
pub mod table;

pub use split::{take, train_test_split, Split};
pub use table::Table;

/// Columns accepted as the crop label, in preference order.
pub const CROP_LABEL_COLUMNS: [&str; 2] = ["label", "crop_type"];
pub const WATER_NEED_COLUMN: &str = "water_need";

/// Lower bound of a synthesized water need; also the value for a constant source column.
pub const SYNTHETIC_WATER_MIN: f64 = 0.1;
pub const SYNTHETIC_WATER_MAX: f64 = 1.0;

const AGRONOMIC_FEATURES: [&str; 7] = ["N", "P", "K", "temperature", "humidity", "ph", "rainfall"];
const SENSOR_FEATURES: [&str; 5] = ["temperature", "humidity", "soil", "ph", "npk"];

/// Known column conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    /// Separate `N`, `P`, `K` nutrients plus weather columns.
    Agronomic,
    /// Field sensor readings with one combined `npk` value.
    Sensor,
}

impl SchemaKind {
    /// Agronomic when all of `N`, `P` and `K` are present.
    pub fn detect(table: &Table) -> Self {
        if ["N", "P", "K"].iter().all(|c| table.has_column(c)) {
            SchemaKind::Agronomic
        } else {
            SchemaKind::Sensor
        }
    }

    /// Full feature list of the convention, in model order.
    pub fn candidate_features(&self) -> &'static [&'static str] {
        match self {
            SchemaKind::Agronomic => &AGRONOMIC_FEATURES,
            SchemaKind::Sensor => &SENSOR_FEATURES,
        }
    }

    /// Candidate features the table actually has.
    pub fn available_features(&self, table: &Table) -> Vec<String> {
        self.candidate_features()
            .iter()
            .filter(|c| table.has_column(c))
            .map(|c| c.to_string())
            .collect()
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaKind::Agronomic => write!(f, "agronomic"),
            SchemaKind::Sensor => write!(f, "sensor"),
        }
    }
}

/// Where the water-need target came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaterSource {
    Observed,
    FromRainfall,
    FromHumidity,
}

impl WaterSource {
    pub fn is_synthetic(&self) -> bool {
        !matches!(self, WaterSource::Observed)
    }
}

/// Output of [`adapt`].
#[derive(Debug, Clone)]
pub struct AdaptedDataset {
    pub schema: SchemaKind,
    /// Feature names, aligned with the columns of `x`.
    pub features: Vec<String>,
    /// Raw features, NaN where a cell was missing.
    pub x: Array2<f64>,
    pub crop: Vec<String>,
    pub water: Vec<f64>,
    pub water_source: WaterSource,
}

impl AdaptedDataset {
    pub fn n_rows(&self) -> usize {
        self.x.nrows()
    }

    pub fn is_synthetic(&self) -> bool {
        self.water_source.is_synthetic()
    }
}

/// First dataset candidate that exists in `data_dir`.
pub fn find_dataset<P: AsRef<Path>>(data_dir: P) -> Result<PathBuf, SchemaError> {
    let data_dir = data_dir.as_ref();
    DATASET_CANDIDATES
        .iter()
        .map(|name| data_dir.join(name))
        .find(|path| path.is_file())
        .ok_or_else(|| SchemaError::DatasetNotFound {
            dir: data_dir.to_path_buf(),
            candidates: DATASET_CANDIDATES.iter().map(|c| c.to_string()).collect(),
        })
}

/// Crop labels from `label`, else `crop_type`.
pub fn crop_labels(table: &Table) -> Result<Vec<String>, SchemaError> {
    let (column, cells) = CROP_LABEL_COLUMNS
        .iter()
        .find_map(|c| table.column(c).map(|cells| (*c, cells)))
        .ok_or(SchemaError::MissingCropLabel)?;

    cells
        .into_iter()
        .enumerate()
        .map(|(i, cell)| {
            if cell.is_empty() {
                Err(SchemaError::MissingTarget {
                    column: column.to_string(),
                    row: i + 1,
                })
            } else {
                Ok(cell.to_string())
            }
        })
        .collect()
}

/// Map `values` linearly onto `[0.1, 1.0]`, highest value to the lowest need.
///
/// A constant column has no spread and maps every row to `0.1`.
pub fn inverse_normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if range.is_nan() || range <= 0.0 {
        return vec![SYNTHETIC_WATER_MIN; values.len()];
    }

    let span = SYNTHETIC_WATER_MAX - SYNTHETIC_WATER_MIN;
    values
        .iter()
        .map(|v| (1.0 - (v - min) / range) * span + SYNTHETIC_WATER_MIN)
        .collect()
}

/// Water-need target: observed, else derived from rainfall, else humidity.
pub fn water_target(table: &Table) -> Result<(Vec<f64>, WaterSource), SchemaError> {
    if let Some(values) = table.required_f64(WATER_NEED_COLUMN) {
        return Ok((values?, WaterSource::Observed));
    }
    if let Some(values) = table.required_f64("rainfall") {
        return Ok((inverse_normalize(&values?), WaterSource::FromRainfall));
    }
    if let Some(values) = table.required_f64("humidity") {
        return Ok((inverse_normalize(&values?), WaterSource::FromHumidity));
    }
    Err(SchemaError::NoWaterSource)
}

/// Turn a raw table into features and both targets.
pub fn adapt(table: &Table) -> Result<AdaptedDataset, SchemaError> {
    if table.is_empty() {
        return Err(SchemaError::Empty);
    }

    let schema = SchemaKind::detect(table);
    let features = schema.available_features(table);
    if features.is_empty() {
        return Err(SchemaError::NoFeatureColumns);
    }
    log::info!("detected {} schema, features: {:?}", schema, features);

    let crop = crop_labels(table)?;
    let (water, water_source) = water_target(table)?;
    if water_source.is_synthetic() {
        log::warn!(
            "no '{}' column; water-need target synthesized ({:?}), not fit for ground-truth evaluation",
            WATER_NEED_COLUMN,
            water_source
        );
    }

    let n_rows = table.n_rows();
    let mut x = Array2::<f64>::zeros((n_rows, features.len()));
    for (j, name) in features.iter().enumerate() {
        let column = table
            .column_f64(name)
            .ok_or(SchemaError::NoFeatureColumns)??;
        for (i, value) in column.into_iter().enumerate() {
            x[[i, j]] = value;
        }
    }

    Ok(AdaptedDataset {
        schema,
        features,
        x,
        crop,
        water,
        water_source,
    })
}
