//! Feature reconciliation.
//!
//! Maps an arbitrary JSON record onto the exact, ordered feature row an
//! artifact was trained on. Each expected feature is resolved in order:
//!
//! 1. exact key,
//! 2. case-insensitive key (first match in document order),
//! 3. for `N`/`P`/`K`, a single combined nutrient value under `npk`,
//! 4. otherwise missing.
//!
//! Missing features become NaN in the matrix and are filled by the pipeline's
//! imputer. They are never replaced with zero here.

use ndarray::Array2;
use serde_json::{Map, Value};

use crate::model::ModelError;

/// One inference request: string keys to JSON scalars.
pub type InputRecord = Map<String, Value>;

/// Features that may be supplied as one combined nutrient reading.
pub const NUTRIENT_TRIPLE: [&str; 3] = ["N", "P", "K"];
/// Key carrying the combined nutrient reading, matched case-insensitively.
pub const COMBINED_NUTRIENT_KEY: &str = "npk";

/// A resolved feature value before it reaches the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Number(f64),
    Missing,
    /// Present but not coercible to a number; left for the pipeline to reject.
    Unparsed(String),
}

impl FeatureValue {
    /// Coerce a JSON value the way a lenient float conversion would.
    pub fn coerce(value: &Value) -> Self {
        match value {
            Value::Null => FeatureValue::Missing,
            Value::Bool(b) => FeatureValue::Number(if *b { 1.0 } else { 0.0 }),
            Value::Number(n) => n
                .as_f64()
                .map(FeatureValue::Number)
                .unwrap_or_else(|| FeatureValue::Unparsed(n.to_string())),
            Value::String(s) => match parse_number(s) {
                Some(v) if v.is_nan() => FeatureValue::Missing,
                Some(v) => FeatureValue::Number(v),
                None => FeatureValue::Unparsed(s.clone()),
            },
            other => FeatureValue::Unparsed(other.to_string()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FeatureValue::Missing)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(v) => Some(*v),
            _ => None,
        }
    }
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok()
}

/// How a feature value was found in the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Exact,
    /// Matched through a differently-cased key.
    CaseInsensitive(String),
    /// Derived from the combined nutrient key.
    Synonym(String),
    Missing,
}

/// A feature row aligned with an artifact's feature list.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    names: Vec<String>,
    values: Vec<FeatureValue>,
    sources: Vec<Resolution>,
}

impl FeatureRow {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[FeatureValue] {
        &self.values
    }

    pub fn sources(&self) -> &[Resolution] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value for a named feature.
    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.values[i])
    }

    /// Number of features that resolved to missing.
    pub fn n_missing(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }

    /// A single-row matrix with NaN for missing features.
    ///
    /// Fails on the first value that could not be coerced to a number.
    pub fn to_matrix(&self) -> Result<Array2<f64>, ModelError> {
        let row = self
            .names
            .iter()
            .zip(&self.values)
            .map(|(name, value)| match value {
                FeatureValue::Number(v) => Ok(*v),
                FeatureValue::Missing => Ok(f64::NAN),
                FeatureValue::Unparsed(raw) => Err(ModelError::NonNumeric {
                    feature: name.clone(),
                    value: raw.clone(),
                }),
            })
            .collect::<Result<Vec<f64>, _>>()?;

        let n = row.len();
        Array2::from_shape_vec((1, n), row)
            .map_err(|e| ModelError::Predict(e.to_string()))
    }
}

/// Resolve every expected feature from `record`.
pub fn reconcile<S: AsRef<str>>(features: &[S], record: &InputRecord) -> FeatureRow {
    let mut names = Vec::with_capacity(features.len());
    let mut values = Vec::with_capacity(features.len());
    let mut sources = Vec::with_capacity(features.len());

    for feature in features {
        let feature = feature.as_ref();
        let (value, source) = resolve(feature, record);
        log::debug!("feature '{}' resolved via {:?}: {:?}", feature, source, value);
        names.push(feature.to_string());
        values.push(value);
        sources.push(source);
    }

    FeatureRow {
        names,
        values,
        sources,
    }
}

fn resolve(feature: &str, record: &InputRecord) -> (FeatureValue, Resolution) {
    if let Some(value) = record.get(feature) {
        return (FeatureValue::coerce(value), Resolution::Exact);
    }

    if let Some((key, value)) = find_case_insensitive(record, feature) {
        return (
            FeatureValue::coerce(value),
            Resolution::CaseInsensitive(key.to_string()),
        );
    }

    if NUTRIENT_TRIPLE.contains(&feature) {
        if let Some((key, value)) = find_case_insensitive(record, COMBINED_NUTRIENT_KEY) {
            // an unreadable combined value counts as missing, not as a raw passthrough
            let value = match FeatureValue::coerce(value) {
                FeatureValue::Unparsed(_) => FeatureValue::Missing,
                other => other,
            };
            return (value, Resolution::Synonym(key.to_string()));
        }
    }

    (FeatureValue::Missing, Resolution::Missing)
}

fn find_case_insensitive<'a>(record: &'a InputRecord, name: &str) -> Option<(&'a str, &'a Value)> {
    let wanted = name.to_lowercase();
    record
        .iter()
        .find(|(key, _)| key.to_lowercase() == wanted)
        .map(|(key, value)| (key.as_str(), value))
}

/// Stack reconciled rows into one matrix; all rows must share a width.
pub fn rows_to_matrix(rows: &[FeatureRow]) -> Result<Array2<f64>, ModelError> {
    let width = rows.first().map(FeatureRow::len).unwrap_or(0);
    let mut data = Vec::with_capacity(rows.len() * width);
    for row in rows {
        if row.len() != width {
            return Err(ModelError::Predict(format!(
                "ragged feature rows: expected {} values, got {}",
                width,
                row.len()
            )));
        }
        data.extend(row.to_matrix()?.iter().copied());
    }
    Array2::from_shape_vec((rows.len(), width), data)
        .map_err(|e| ModelError::Predict(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SENSOR: [&str; 5] = ["temperature", "humidity", "soil", "ph", "npk"];
    const AGRONOMIC: [&str; 7] = ["N", "P", "K", "temperature", "humidity", "ph", "rainfall"];

    fn record(value: Value) -> InputRecord {
        match value {
            Value::Object(map) => map,
            _ => panic!("test record must be an object"),
        }
    }

    fn numbers(row: &FeatureRow) -> Vec<Option<f64>> {
        row.values().iter().map(FeatureValue::as_f64).collect()
    }

    #[test]
    fn test_reconcile_exact_keys_in_feature_order() {
        // keys deliberately out of feature order, plus an extra key
        let rec = record(json!({
            "npk": 40, "ph": 6.5, "soil": 6, "humidity": 80, "temperature": 25, "farm": "north"
        }));
        let row = reconcile(&SENSOR, &rec);

        assert_eq!(row.names(), SENSOR);
        assert_eq!(
            numbers(&row),
            vec![Some(25.0), Some(80.0), Some(6.0), Some(6.5), Some(40.0)]
        );
        assert!(row.sources().iter().all(|s| *s == Resolution::Exact));
    }

    #[test]
    fn test_reconcile_case_insensitive_matches_exact() {
        let exact = reconcile(&SENSOR, &record(json!({"temperature": 25, "ph": 6.5})));
        let cased = reconcile(&SENSOR, &record(json!({"Temperature": 25, "PH": 6.5})));

        assert_eq!(exact.values(), cased.values());
        assert_eq!(
            cased.sources()[0],
            Resolution::CaseInsensitive("Temperature".to_string())
        );
    }

    #[test]
    fn test_reconcile_exact_key_beats_case_insensitive() {
        let rec = record(json!({"PH": 9.0, "ph": 6.5}));
        let row = reconcile(&["ph"], &rec);
        assert_eq!(numbers(&row), vec![Some(6.5)]);
    }

    #[test]
    fn test_reconcile_colliding_keys_first_seen_wins() {
        let rec = record(json!({"Ph": 5.0, "PH": 9.0}));
        let row = reconcile(&["ph"], &rec);
        assert_eq!(numbers(&row), vec![Some(5.0)]);
    }

    #[test]
    fn test_reconcile_npk_fills_nutrient_triple() {
        let rec = record(json!({"temperature": 25, "npk": "40"}));
        let row = reconcile(&AGRONOMIC, &rec);

        for name in NUTRIENT_TRIPLE {
            assert_eq!(row.get(name), Some(&FeatureValue::Number(40.0)));
        }
        assert_eq!(row.sources()[0], Resolution::Synonym("npk".to_string()));
        assert_eq!(row.get("rainfall"), Some(&FeatureValue::Missing));
    }

    #[test]
    fn test_reconcile_individual_nutrient_beats_npk() {
        let rec = record(json!({"n": 90, "NPK": 40}));
        let row = reconcile(&AGRONOMIC, &rec);

        assert_eq!(row.get("N"), Some(&FeatureValue::Number(90.0)));
        assert_eq!(row.get("P"), Some(&FeatureValue::Number(40.0)));
        assert_eq!(row.sources()[1], Resolution::Synonym("NPK".to_string()));
    }

    #[test]
    fn test_reconcile_unparseable_npk_is_missing() {
        let rec = record(json!({"npk": "high"}));
        let row = reconcile(&AGRONOMIC, &rec);
        assert_eq!(row.get("K"), Some(&FeatureValue::Missing));
    }

    #[test]
    fn test_reconcile_absent_feature_is_missing_not_zero() {
        let row = reconcile(&SENSOR, &record(json!({"temperature": 25})));

        assert_eq!(row.get("soil"), Some(&FeatureValue::Missing));
        assert_eq!(row.n_missing(), 4);

        let matrix = row.to_matrix().unwrap();
        assert_eq!(matrix.dim(), (1, 5));
        assert_eq!(matrix[[0, 0]], 25.0);
        assert!(matrix[[0, 2]].is_nan());
    }

    #[test]
    fn test_reconcile_empty_record_all_missing() {
        let row = reconcile(&SENSOR, &InputRecord::new());
        assert_eq!(row.n_missing(), SENSOR.len());
        assert!(row.sources().iter().all(|s| *s == Resolution::Missing));
    }

    #[test]
    fn test_coerce_values() {
        assert_eq!(FeatureValue::coerce(&json!(" 6.5 ")), FeatureValue::Number(6.5));
        assert_eq!(FeatureValue::coerce(&json!(7)), FeatureValue::Number(7.0));
        assert_eq!(FeatureValue::coerce(&json!(true)), FeatureValue::Number(1.0));
        assert_eq!(FeatureValue::coerce(&Value::Null), FeatureValue::Missing);
        assert_eq!(FeatureValue::coerce(&json!("nan")), FeatureValue::Missing);
        assert_eq!(
            FeatureValue::coerce(&json!("loamy")),
            FeatureValue::Unparsed("loamy".to_string())
        );
    }

    #[test]
    fn test_unparsed_value_fails_at_matrix_conversion() {
        let row = reconcile(&SENSOR, &record(json!({"soil": "loamy"})));
        assert_eq!(row.get("soil"), Some(&FeatureValue::Unparsed("loamy".to_string())));

        let err = row.to_matrix().unwrap_err();
        assert!(matches!(err, ModelError::NonNumeric { ref feature, .. } if feature == "soil"));
        assert!(err.to_string().contains("loamy"));
    }

    #[test]
    fn test_rows_to_matrix_stacks_rows() {
        let rows = vec![
            reconcile(&["ph", "soil"], &record(json!({"ph": 6.0, "soil": 3}))),
            reconcile(&["ph", "soil"], &record(json!({"ph": 7.0}))),
        ];
        let x = rows_to_matrix(&rows).unwrap();
        assert_eq!(x.dim(), (2, 2));
        assert_eq!(x[[1, 0]], 7.0);
        assert!(x[[1, 1]].is_nan());
    }
}
