//! Feature encoding for obesity level inference.
//!
//! Turns a validated [`RawInput`] into the numeric row layout the scaler
//! and model were fitted on. The column layout itself is loaded from the
//! training schema, never hardcoded here.

use crate::types::input::{Frequency, Gender, RawInput, TransportMode, YesNo};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Prefix of the one-hot transport indicator columns
pub const TRANSPORT_PREFIX: &str = "MTRANS_";

/// Columns the encoder knows how to produce, in encoding order
const ENCODED_COLUMNS: [&str; 20] = [
    "Age",
    "Gender",
    "Height",
    "Weight",
    "family_history_with_overweight",
    "FAVC",
    "FCVC",
    "NCP",
    "CAEC",
    "CH2O",
    "CALC",
    "SCC",
    "FAF",
    "TUE",
    "SMOKE",
    "MTRANS_Automobile",
    "MTRANS_Bike",
    "MTRANS_Motorbike",
    "MTRANS_Public_Transportation",
    "MTRANS_Walking",
];

/// Ordered numeric row aligned with the training schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub columns: Arc<[String]>,
    pub values: Vec<f64>,
}

impl FeatureRow {
    /// Value of a named column, if the schema has it
    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.values[i])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate `(column, value)` pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

fn gender_code(gender: Gender) -> f64 {
    match gender {
        Gender::Male => 1.0,
        Gender::Female => 0.0,
    }
}

fn flag_code(flag: YesNo) -> f64 {
    match flag {
        YesNo::Yes => 1.0,
        YesNo::No => 0.0,
    }
}

fn frequency_rank(freq: Frequency) -> f64 {
    match freq {
        Frequency::No => 0.0,
        Frequency::Sometimes => 1.0,
        Frequency::Frequently => 2.0,
        Frequency::Always => 3.0,
    }
}

/// Name of the indicator column for a transport mode
pub fn transport_column(mode: TransportMode) -> String {
    format!("{}{}", TRANSPORT_PREFIX, mode.as_str())
}

/// Encoder that maps inputs onto the training column schema.
///
/// Holds the schema and is otherwise stateless; encoding is a pure function
/// of the input.
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    schema: Arc<[String]>,
}

impl FeatureEncoder {
    /// Create an encoder for the given training schema.
    ///
    /// Columns the schema expects but the encoder never produces (and the
    /// reverse) are logged, since they are zero-filled or dropped silently.
    pub fn new(schema: Vec<String>) -> Self {
        for column in schema.iter() {
            if !ENCODED_COLUMNS.contains(&column.as_str()) {
                warn!(column = %column, "Schema column is never encoded, will be zero-filled");
            }
        }
        for column in ENCODED_COLUMNS {
            if !schema.iter().any(|c| c == column) {
                warn!(column = %column, "Encoded column is not in schema, will be dropped");
            }
        }

        Self {
            schema: schema.into(),
        }
    }

    /// Encode an input into named columns, before reindexing.
    fn encode_columns(&self, input: &RawInput) -> HashMap<String, f64> {
        let mut columns = HashMap::with_capacity(ENCODED_COLUMNS.len());

        // Numeric pass-through
        columns.insert("Age".to_string(), input.age);
        columns.insert("Height".to_string(), input.height);
        columns.insert("Weight".to_string(), input.weight);
        columns.insert("FCVC".to_string(), input.fcvc);
        columns.insert("NCP".to_string(), input.ncp);
        columns.insert("CH2O".to_string(), input.ch2o);
        columns.insert("FAF".to_string(), input.faf);
        columns.insert("TUE".to_string(), input.tue);

        // Binary
        columns.insert("Gender".to_string(), gender_code(input.gender));
        columns.insert(
            "family_history_with_overweight".to_string(),
            flag_code(input.family_history_with_overweight),
        );
        columns.insert("FAVC".to_string(), flag_code(input.favc));
        columns.insert("SMOKE".to_string(), flag_code(input.smoke));
        columns.insert("SCC".to_string(), flag_code(input.scc));

        // Ordinal
        columns.insert("CAEC".to_string(), frequency_rank(input.caec));
        columns.insert("CALC".to_string(), frequency_rank(input.calc));

        // One-hot transport; an unmatched mode leaves every indicator at 0
        for mode in TransportMode::ALL {
            let hot = input.mtrans == Some(mode);
            columns.insert(transport_column(mode), if hot { 1.0 } else { 0.0 });
        }

        columns
    }

    /// Encode an input into a row in exact schema order.
    pub fn encode(&self, input: &RawInput) -> FeatureRow {
        let encoded = self.encode_columns(input);
        let values = self
            .schema
            .iter()
            .map(|column| encoded.get(column).copied().unwrap_or(0.0))
            .collect();

        FeatureRow {
            columns: self.schema.clone(),
            values,
        }
    }

    /// Number of columns in every encoded row.
    pub fn feature_count(&self) -> usize {
        self.schema.len()
    }

    /// Training schema column names, in order.
    pub fn feature_names(&self) -> &[String] {
        &self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::input::FormInput;

    fn training_schema() -> Vec<String> {
        [
            "Gender",
            "Age",
            "Height",
            "Weight",
            "family_history_with_overweight",
            "FAVC",
            "FCVC",
            "NCP",
            "CAEC",
            "SMOKE",
            "CH2O",
            "SCC",
            "FAF",
            "TUE",
            "CALC",
            "MTRANS_Automobile",
            "MTRANS_Bike",
            "MTRANS_Motorbike",
            "MTRANS_Public_Transportation",
            "MTRANS_Walking",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn sample_input() -> RawInput {
        RawInput {
            age: 25.0,
            gender: Gender::Male,
            height: 1.75,
            weight: 70.0,
            family_history_with_overweight: YesNo::Yes,
            favc: YesNo::Yes,
            fcvc: 2.0,
            ncp: 3.0,
            caec: Frequency::Sometimes,
            ch2o: 2.0,
            calc: Frequency::No,
            scc: YesNo::No,
            faf: 1.0,
            tue: 1.0,
            smoke: YesNo::No,
            mtrans: Some(TransportMode::PublicTransportation),
        }
    }

    #[test]
    fn test_row_follows_schema_order() {
        let schema = training_schema();
        let encoder = FeatureEncoder::new(schema.clone());

        let row = encoder.encode(&sample_input());

        assert_eq!(row.len(), encoder.feature_count());
        assert_eq!(row.columns.to_vec(), schema);
        assert_eq!(row.values[0], 1.0); // Gender
        assert_eq!(row.values[1], 25.0); // Age
    }

    #[test]
    fn test_sample_encoding() {
        let encoder = FeatureEncoder::new(training_schema());
        let row = encoder.encode(&sample_input());

        assert_eq!(row.get("Gender"), Some(1.0));
        assert_eq!(row.get("family_history_with_overweight"), Some(1.0));
        assert_eq!(row.get("FAVC"), Some(1.0));
        assert_eq!(row.get("CAEC"), Some(1.0));
        assert_eq!(row.get("CALC"), Some(0.0));
        assert_eq!(row.get("SCC"), Some(0.0));
        assert_eq!(row.get("SMOKE"), Some(0.0));
        assert_eq!(row.get("MTRANS_Public_Transportation"), Some(1.0));
        assert_eq!(row.get("MTRANS_Automobile"), Some(0.0));
        assert_eq!(row.get("MTRANS_Bike"), Some(0.0));
        assert_eq!(row.get("MTRANS_Motorbike"), Some(0.0));
        assert_eq!(row.get("MTRANS_Walking"), Some(0.0));
        assert_eq!(row.get("Height"), Some(1.75));
        assert_eq!(row.get("Weight"), Some(70.0));
        assert_eq!(row.get("FCVC"), Some(2.0));
        assert_eq!(row.get("NCP"), Some(3.0));
        assert_eq!(row.get("CH2O"), Some(2.0));
        assert_eq!(row.get("FAF"), Some(1.0));
        assert_eq!(row.get("TUE"), Some(1.0));
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let encoder = FeatureEncoder::new(training_schema());
        let input = sample_input();
        assert_eq!(encoder.encode(&input), encoder.encode(&input));
    }

    #[test]
    fn test_binary_fields() {
        let encoder = FeatureEncoder::new(training_schema());
        let mut input = sample_input();
        input.gender = Gender::Female;
        input.family_history_with_overweight = YesNo::No;
        input.favc = YesNo::No;
        input.smoke = YesNo::Yes;
        input.scc = YesNo::Yes;

        let row = encoder.encode(&input);
        assert_eq!(row.get("Gender"), Some(0.0));
        assert_eq!(row.get("family_history_with_overweight"), Some(0.0));
        assert_eq!(row.get("FAVC"), Some(0.0));
        assert_eq!(row.get("SMOKE"), Some(1.0));
        assert_eq!(row.get("SCC"), Some(1.0));
    }

    #[test]
    fn test_ordinal_fields_are_monotonic() {
        let encoder = FeatureEncoder::new(training_schema());
        let mut previous: Option<(f64, f64)> = None;

        for freq in Frequency::ALL {
            let mut input = sample_input();
            input.caec = freq;
            input.calc = freq;
            let row = encoder.encode(&input);
            let caec = row.get("CAEC").unwrap();
            let calc = row.get("CALC").unwrap();

            if let Some((prev_caec, prev_calc)) = previous {
                assert!(caec > prev_caec);
                assert!(calc > prev_calc);
            }
            previous = Some((caec, calc));
        }

        let mut input = sample_input();
        input.caec = Frequency::Always;
        assert_eq!(encoder.encode(&input).get("CAEC"), Some(3.0));
        input.caec = Frequency::No;
        assert_eq!(encoder.encode(&input).get("CAEC"), Some(0.0));
    }

    #[test]
    fn test_transport_one_hot_exclusive() {
        let encoder = FeatureEncoder::new(training_schema());

        for mode in TransportMode::ALL {
            let mut input = sample_input();
            input.mtrans = Some(mode);
            let row = encoder.encode(&input);

            let hot: Vec<&str> = row
                .iter()
                .filter(|(c, v)| c.starts_with(TRANSPORT_PREFIX) && *v == 1.0)
                .map(|(c, _)| c)
                .collect();
            assert_eq!(hot, vec![transport_column(mode).as_str()]);
        }

        let mut input = sample_input();
        input.mtrans = Some(TransportMode::Walking);
        let row = encoder.encode(&input);
        assert_eq!(row.get("MTRANS_Walking"), Some(1.0));
        assert_eq!(row.get("MTRANS_Automobile"), Some(0.0));
        assert_eq!(row.get("MTRANS_Bike"), Some(0.0));
        assert_eq!(row.get("MTRANS_Motorbike"), Some(0.0));
        assert_eq!(row.get("MTRANS_Public_Transportation"), Some(0.0));
    }

    #[test]
    fn test_unknown_transport_sets_no_indicator() {
        let encoder = FeatureEncoder::new(training_schema());
        let form = FormInput {
            mtrans: "Horse".to_string(),
            ..FormInput::default()
        };
        let input = RawInput::try_from(form).unwrap();

        let row = encoder.encode(&input);
        let indicator_sum: f64 = row
            .iter()
            .filter(|(c, _)| c.starts_with(TRANSPORT_PREFIX))
            .map(|(_, v)| v)
            .sum();
        assert_eq!(indicator_sum, 0.0);
    }

    #[test]
    fn test_missing_columns_zero_filled_and_extras_dropped() {
        let schema = vec![
            "Age".to_string(),
            "BMI".to_string(),
            "MTRANS_Public_Transportation".to_string(),
        ];
        let encoder = FeatureEncoder::new(schema);

        let row = encoder.encode(&sample_input());

        assert_eq!(row.values, vec![25.0, 0.0, 1.0]);
        assert_eq!(row.get("Weight"), None);
    }
}
