//! Form submission and validated input records

use crate::error::InputError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Biological sex as collected by the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

/// Yes/No flag answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YesNo {
    Yes,
    No,
}

/// Ordered frequency answers used by CAEC and CALC
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Frequency {
    No,
    Sometimes,
    Frequently,
    Always,
}

/// Main transport mode (MTRANS)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportMode {
    Automobile,
    Motorbike,
    Bike,
    #[serde(rename = "Public_Transportation")]
    PublicTransportation,
    Walking,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl YesNo {
    pub const ALL: [YesNo; 2] = [YesNo::Yes, YesNo::No];

    pub fn as_str(&self) -> &'static str {
        match self {
            YesNo::Yes => "Yes",
            YesNo::No => "No",
        }
    }
}

impl Frequency {
    pub const ALL: [Frequency; 4] = [
        Frequency::No,
        Frequency::Sometimes,
        Frequency::Frequently,
        Frequency::Always,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::No => "No",
            Frequency::Sometimes => "Sometimes",
            Frequency::Frequently => "Frequently",
            Frequency::Always => "Always",
        }
    }
}

impl TransportMode {
    /// Form order of the transport choices
    pub const ALL: [TransportMode; 5] = [
        TransportMode::Automobile,
        TransportMode::Motorbike,
        TransportMode::Bike,
        TransportMode::PublicTransportation,
        TransportMode::Walking,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Automobile => "Automobile",
            TransportMode::Motorbike => "Motorbike",
            TransportMode::Bike => "Bike",
            TransportMode::PublicTransportation => "Public_Transportation",
            TransportMode::Walking => "Walking",
        }
    }
}

macro_rules! impl_category {
    ($ty:ty) => {
        impl FromStr for $ty {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty>::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or(())
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

impl_category!(Gender);
impl_category!(YesNo);
impl_category!(Frequency);
impl_category!(TransportMode);

/// Untyped submission as it arrives from the HTML form or the JSON API.
///
/// Field names follow the column names of the training data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormInput {
    #[serde(rename = "Age")]
    pub age: f64,
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Height")]
    pub height: f64,
    #[serde(rename = "Weight")]
    pub weight: f64,
    pub family_history_with_overweight: String,
    #[serde(rename = "FAVC")]
    pub favc: String,
    #[serde(rename = "FCVC")]
    pub fcvc: f64,
    #[serde(rename = "NCP")]
    pub ncp: f64,
    #[serde(rename = "CAEC")]
    pub caec: String,
    #[serde(rename = "CH2O")]
    pub ch2o: f64,
    #[serde(rename = "CALC")]
    pub calc: String,
    #[serde(rename = "SCC")]
    pub scc: String,
    #[serde(rename = "FAF")]
    pub faf: f64,
    #[serde(rename = "TUE")]
    pub tue: f64,
    #[serde(rename = "SMOKE")]
    pub smoke: String,
    #[serde(rename = "MTRANS")]
    pub mtrans: String,
}

impl Default for FormInput {
    /// The values the form is pre-filled with
    fn default() -> Self {
        Self {
            age: 25.0,
            gender: "Male".to_string(),
            height: 1.75,
            weight: 70.0,
            family_history_with_overweight: "Yes".to_string(),
            favc: "Yes".to_string(),
            fcvc: 2.0,
            ncp: 3.0,
            caec: "No".to_string(),
            ch2o: 2.0,
            calc: "No".to_string(),
            scc: "Yes".to_string(),
            faf: 1.0,
            tue: 1.0,
            smoke: "Yes".to_string(),
            mtrans: "Automobile".to_string(),
        }
    }
}

/// Inclusive numeric range accepted by a form field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRange {
    pub field: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    /// Slider-style fields only accept `min + k * step`
    pub discrete: bool,
}

/// Tolerance when matching a value to the step grid
const STEP_EPSILON: f64 = 1e-6;

pub const AGE_RANGE: FieldRange = FieldRange { field: "Age", min: 1.0, max: 100.0, step: 1.0, discrete: true };
pub const HEIGHT_RANGE: FieldRange = FieldRange { field: "Height", min: 1.0, max: 2.5, step: 0.01, discrete: false };
pub const WEIGHT_RANGE: FieldRange = FieldRange { field: "Weight", min: 20.0, max: 200.0, step: 0.1, discrete: false };
pub const FCVC_RANGE: FieldRange = FieldRange { field: "FCVC", min: 1.0, max: 3.0, step: 1.0, discrete: true };
pub const NCP_RANGE: FieldRange = FieldRange { field: "NCP", min: 1.0, max: 4.0, step: 1.0, discrete: true };
pub const CH2O_RANGE: FieldRange = FieldRange { field: "CH2O", min: 1.0, max: 3.0, step: 0.5, discrete: true };
pub const FAF_RANGE: FieldRange = FieldRange { field: "FAF", min: 0.0, max: 3.0, step: 1.0, discrete: true };
pub const TUE_RANGE: FieldRange = FieldRange { field: "TUE", min: 0.0, max: 2.0, step: 1.0, discrete: true };

impl FieldRange {
    fn check(&self, value: f64) -> Result<f64, InputError> {
        if !(value.is_finite() && value >= self.min && value <= self.max) {
            return Err(InputError::OutOfRange {
                field: self.field,
                value,
                min: self.min,
                max: self.max,
            });
        }

        if self.discrete {
            let steps = (value - self.min) / self.step;
            if (steps - steps.round()).abs() > STEP_EPSILON {
                return Err(InputError::OffStep {
                    field: self.field,
                    value,
                    step: self.step,
                });
            }
        }

        Ok(value)
    }
}

fn parse_category<T: FromStr>(field: &'static str, value: &str) -> Result<T, InputError> {
    value.trim().parse().map_err(|_| InputError::InvalidCategory {
        field,
        value: value.to_string(),
    })
}

/// Validated lifestyle and health attributes of one submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInput {
    #[serde(rename = "Age")]
    pub age: f64,
    #[serde(rename = "Gender")]
    pub gender: Gender,
    /// Height in meters
    #[serde(rename = "Height")]
    pub height: f64,
    /// Weight in kilograms
    #[serde(rename = "Weight")]
    pub weight: f64,
    pub family_history_with_overweight: YesNo,
    /// Frequent consumption of high-calorie food
    #[serde(rename = "FAVC")]
    pub favc: YesNo,
    /// Vegetable consumption frequency (1 = never, 3 = always)
    #[serde(rename = "FCVC")]
    pub fcvc: f64,
    /// Main meals per day
    #[serde(rename = "NCP")]
    pub ncp: f64,
    /// Eating between meals
    #[serde(rename = "CAEC")]
    pub caec: Frequency,
    /// Daily water intake in liters
    #[serde(rename = "CH2O")]
    pub ch2o: f64,
    /// Alcohol consumption
    #[serde(rename = "CALC")]
    pub calc: Frequency,
    /// Calorie consumption monitoring
    #[serde(rename = "SCC")]
    pub scc: YesNo,
    /// Physical activity frequency
    #[serde(rename = "FAF")]
    pub faf: f64,
    /// Time using technology devices
    #[serde(rename = "TUE")]
    pub tue: f64,
    #[serde(rename = "SMOKE")]
    pub smoke: YesNo,
    /// Main transport; `None` when the submitted value matched no known mode
    #[serde(rename = "MTRANS")]
    pub mtrans: Option<TransportMode>,
}

impl TryFrom<FormInput> for RawInput {
    type Error = InputError;

    fn try_from(form: FormInput) -> Result<Self, Self::Error> {
        let mtrans = match form.mtrans.trim().parse::<TransportMode>() {
            Ok(mode) => Some(mode),
            Err(()) => {
                warn!(value = %form.mtrans, "Unknown transport mode, encoding without indicator");
                None
            }
        };

        Ok(Self {
            age: AGE_RANGE.check(form.age)?,
            gender: parse_category("Gender", &form.gender)?,
            height: HEIGHT_RANGE.check(form.height)?,
            weight: WEIGHT_RANGE.check(form.weight)?,
            family_history_with_overweight: parse_category(
                "family_history_with_overweight",
                &form.family_history_with_overweight,
            )?,
            favc: parse_category("FAVC", &form.favc)?,
            fcvc: FCVC_RANGE.check(form.fcvc)?,
            ncp: NCP_RANGE.check(form.ncp)?,
            caec: parse_category("CAEC", &form.caec)?,
            ch2o: CH2O_RANGE.check(form.ch2o)?,
            calc: parse_category("CALC", &form.calc)?,
            scc: parse_category("SCC", &form.scc)?,
            faf: FAF_RANGE.check(form.faf)?,
            tue: TUE_RANGE.check(form.tue)?,
            smoke: parse_category("SMOKE", &form.smoke)?,
            mtrans,
        })
    }
}
