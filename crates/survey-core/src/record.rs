//! Survey record model.
//!
//! Records arrive from the spreadsheet gateway as JSON objects keyed by the
//! sheet header names (`SNo`, `GaliNo`, `HouseNo`, ...). Every cell is
//! optional and keeps its JSON scalar type, so a number stored in the sheet
//! round-trips to the exported workbook as a number. A cell holding an array
//! or object is kept as its JSON text rather than failing the whole row.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Sheet header keys in canonical column order.
pub const FIELD_KEYS: [&str; 20] = [
    "SNo",
    "GaliNo",
    "HouseNo",
    "Name",
    "Relation",
    "DOB",
    "Age",
    "AadharNo",
    "PhoneNo",
    "Married",
    "Education",
    "Caste",
    "RationCard",
    "FamilyPlanning",
    "Occupation",
    "Disabled",
    "Nasha",
    "Mediclaim",
    "Diseases",
    "Owner",
];

/// A single cell value as stored by the gateway.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Boolean cell.
    Flag(bool),
    /// Numeric cell.
    Number(serde_json::Number),
    /// Free-form text cell.
    Text(String),
}

impl FieldValue {
    /// Convert an arbitrary JSON value into a cell. `null` yields `None`;
    /// arrays and objects are kept as their JSON text.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(Self::Flag(*b)),
            Value::Number(n) => Some(Self::Number(n.clone())),
            Value::String(s) => Some(Self::Text(s.clone())),
            other => Some(Self::Text(other.to_string())),
        }
    }

    /// Display form used by the table, the filters, and the document export.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(s) => Cow::Borrowed(s),
            Self::Number(n) => Cow::Owned(format_number(n)),
            Self::Flag(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
        }
    }

    /// Numeric interpretation: numbers as-is, numeric text parsed after
    /// trimming, booleans as 0/1. Anything else is `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            Self::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
            }
            Self::Flag(b) => Some(if *b { 1.0 } else { 0.0 }),
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value).ok_or_else(|| D::Error::custom("cell is null"))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

/// Integral floats print without a trailing `.0` (a sheet stores `42` as
/// `42.0` once it has passed through a float column).
fn format_number(n: &serde_json::Number) -> String {
    if n.is_f64() {
        if let Some(f) = n.as_f64() {
            #[allow(clippy::cast_possible_truncation)]
            if f.fract() == 0.0 && f.abs() < 1e15 {
                return format!("{}", f as i64);
            }
        }
    }
    n.to_string()
}

/// One survey entry: a resident of a household.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SurveyRecord {
    /// Sequence number assigned by the sheet.
    #[serde(rename = "SNo", skip_serializing_if = "Option::is_none")]
    pub sno: Option<FieldValue>,
    /// Street (gali) identifier.
    #[serde(rename = "GaliNo", skip_serializing_if = "Option::is_none")]
    pub gali_no: Option<FieldValue>,
    /// House identifier.
    #[serde(rename = "HouseNo", skip_serializing_if = "Option::is_none")]
    pub house_no: Option<FieldValue>,
    /// Resident name.
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<FieldValue>,
    /// Relation to the head of household.
    #[serde(rename = "Relation", skip_serializing_if = "Option::is_none")]
    pub relation: Option<FieldValue>,
    /// Date of birth, as stored (ISO date or timestamp).
    #[serde(rename = "DOB", skip_serializing_if = "Option::is_none")]
    pub dob: Option<FieldValue>,
    /// Age in years at entry time.
    #[serde(rename = "Age", skip_serializing_if = "Option::is_none")]
    pub age: Option<FieldValue>,
    /// National ID (Aadhaar) number.
    #[serde(rename = "AadharNo", skip_serializing_if = "Option::is_none")]
    pub aadhar_no: Option<FieldValue>,
    /// Phone number.
    #[serde(rename = "PhoneNo", skip_serializing_if = "Option::is_none")]
    pub phone_no: Option<FieldValue>,
    /// Marital status.
    #[serde(rename = "Married", skip_serializing_if = "Option::is_none")]
    pub married: Option<FieldValue>,
    /// Education level.
    #[serde(rename = "Education", skip_serializing_if = "Option::is_none")]
    pub education: Option<FieldValue>,
    /// Caste category.
    #[serde(rename = "Caste", skip_serializing_if = "Option::is_none")]
    pub caste: Option<FieldValue>,
    /// Ration card number.
    #[serde(rename = "RationCard", skip_serializing_if = "Option::is_none")]
    pub ration_card: Option<FieldValue>,
    /// Family planning status.
    #[serde(rename = "FamilyPlanning", skip_serializing_if = "Option::is_none")]
    pub family_planning: Option<FieldValue>,
    /// Occupation.
    #[serde(rename = "Occupation", skip_serializing_if = "Option::is_none")]
    pub occupation: Option<FieldValue>,
    /// Disability status.
    #[serde(rename = "Disabled", skip_serializing_if = "Option::is_none")]
    pub disabled: Option<FieldValue>,
    /// Substance use (nasha) status.
    #[serde(rename = "Nasha", skip_serializing_if = "Option::is_none")]
    pub nasha: Option<FieldValue>,
    /// Medical insurance (mediclaim) status.
    #[serde(rename = "Mediclaim", skip_serializing_if = "Option::is_none")]
    pub mediclaim: Option<FieldValue>,
    /// Known diseases.
    #[serde(rename = "Diseases", skip_serializing_if = "Option::is_none")]
    pub diseases: Option<FieldValue>,
    /// House ownership status.
    #[serde(rename = "Owner", skip_serializing_if = "Option::is_none")]
    pub owner: Option<FieldValue>,
    /// Columns the sheet carries beyond the known header set, in the order
    /// the gateway sent them (`serde_json` is built with `preserve_order`).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// Every key of the source object, in the order the gateway sent them.
    #[serde(skip)]
    pub columns: Vec<String>,
}

impl<'de> Deserialize<'de> for SurveyRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object = Map::<String, Value>::deserialize(deserializer)?;
        let mut record = Self::default();
        record.columns.reserve(object.len());
        for (key, value) in object {
            match record.slot_mut(&key) {
                Some(slot) => *slot = FieldValue::from_json(&value),
                None => {
                    let _ = record.extra.insert(key.clone(), value);
                }
            }
            record.columns.push(key);
        }
        Ok(record)
    }
}

impl SurveyRecord {
    /// Look up a known field by its sheet header key.
    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        let slot = match key {
            "SNo" => &self.sno,
            "GaliNo" => &self.gali_no,
            "HouseNo" => &self.house_no,
            "Name" => &self.name,
            "Relation" => &self.relation,
            "DOB" => &self.dob,
            "Age" => &self.age,
            "AadharNo" => &self.aadhar_no,
            "PhoneNo" => &self.phone_no,
            "Married" => &self.married,
            "Education" => &self.education,
            "Caste" => &self.caste,
            "RationCard" => &self.ration_card,
            "FamilyPlanning" => &self.family_planning,
            "Occupation" => &self.occupation,
            "Disabled" => &self.disabled,
            "Nasha" => &self.nasha,
            "Mediclaim" => &self.mediclaim,
            "Diseases" => &self.diseases,
            "Owner" => &self.owner,
            _ => return None,
        };
        slot.as_ref()
    }

    fn slot_mut(&mut self, key: &str) -> Option<&mut Option<FieldValue>> {
        let slot = match key {
            "SNo" => &mut self.sno,
            "GaliNo" => &mut self.gali_no,
            "HouseNo" => &mut self.house_no,
            "Name" => &mut self.name,
            "Relation" => &mut self.relation,
            "DOB" => &mut self.dob,
            "Age" => &mut self.age,
            "AadharNo" => &mut self.aadhar_no,
            "PhoneNo" => &mut self.phone_no,
            "Married" => &mut self.married,
            "Education" => &mut self.education,
            "Caste" => &mut self.caste,
            "RationCard" => &mut self.ration_card,
            "FamilyPlanning" => &mut self.family_planning,
            "Occupation" => &mut self.occupation,
            "Disabled" => &mut self.disabled,
            "Nasha" => &mut self.nasha,
            "Mediclaim" => &mut self.mediclaim,
            "Diseases" => &mut self.diseases,
            "Owner" => &mut self.owner,
            _ => return None,
        };
        Some(slot)
    }

    /// Look up any field, known or extra. Extra values are converted on the fly.
    pub fn value(&self, key: &str) -> Option<Cow<'_, FieldValue>> {
        if let Some(v) = self.field(key) {
            return Some(Cow::Borrowed(v));
        }
        self.extra
            .get(key)
            .and_then(FieldValue::from_json)
            .map(Cow::Owned)
    }

    /// Display text of a field; absent fields are the empty string.
    pub fn text(&self, key: &str) -> String {
        self.value(key)
            .map(|v| v.as_text().into_owned())
            .unwrap_or_default()
    }

    /// All populated fields in canonical order, followed by extra columns.
    pub fn fields(&self) -> Vec<(&str, FieldValue)> {
        let known = FIELD_KEYS
            .iter()
            .filter_map(|key| self.field(key).map(|v| (*key, v.clone())));
        let extra = self
            .extra
            .iter()
            .filter_map(|(key, v)| FieldValue::from_json(v).map(|v| (key.as_str(), v)));
        known.chain(extra).collect()
    }

    /// All populated fields in the order the gateway sent them. Fields set
    /// after deserialization follow in canonical order.
    pub fn fields_in_source_order(&self) -> Vec<(&str, FieldValue)> {
        let mut out: Vec<(&str, FieldValue)> = self
            .columns
            .iter()
            .filter_map(|key| self.value(key).map(|v| (key.as_str(), v.into_owned())))
            .collect();
        for (key, value) in self.fields() {
            if !out.iter().any(|(k, _)| *k == key) {
                out.push((key, value));
            }
        }
        out
    }

    /// Ordering key derived from `SNo`. Missing or non-numeric counts as zero.
    pub fn sequence_key(&self) -> f64 {
        self.sno.as_ref().and_then(FieldValue::as_f64).unwrap_or(0.0)
    }
}

/// Sort records by sequence number, highest first. The sort is stable, so
/// records sharing a key keep their gateway order.
pub fn sort_by_sequence_desc(records: &mut [SurveyRecord]) {
    records.sort_by(|a, b| {
        b.sequence_key()
            .partial_cmp(&a.sequence_key())
            .unwrap_or(Ordering::Equal)
    });
}
